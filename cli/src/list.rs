#![deny(missing_docs)]

//! # List Command
//!
//! Prints every handler found in a source file with its method and path.

use crate::error::CliResult;
use opdoc_core::extract_handlers;
use opdoc_core::handler::Handler;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Arguments for the list command.
#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    /// Rust source file containing handlers.
    pub source: PathBuf,
}

/// Executes the list command, writing one line per handler.
///
/// Handlers that cannot be read are listed as `INVALID` with the reason.
pub fn execute(args: &ListArgs, out: &mut impl Write) -> CliResult<()> {
    let code = fs::read_to_string(&args.source)?;
    let handlers = extract_handlers(&code);
    tracing::debug!(source = %args.source.display(), count = handlers.len(), "handlers found");

    for extracted in &handlers {
        match &extracted.handler {
            Ok(handler) => writeln!(
                out,
                "{:<7} {:<30} {}",
                handler.http_method(),
                handler.path().unwrap_or("-"),
                handler.name()
            )?,
            Err(e) => writeln!(out, "{:<7} {:<30} {} ({})", "INVALID", "-", extracted.name, e)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_handlers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            #[get("/pets")]
            fn list_pets() {{}}
            #[delete("/pets/{{id}}")]
            fn delete_pet(Path(id): Path<u64>) {{}}
            #[get("/broken")]
            #[api_error(reason = "no code")]
            fn broken() {{}}
            fn helper() {{}}
            "#
        )
        .unwrap();

        let mut out = Vec::new();
        execute(
            &ListArgs {
                source: file.path().to_path_buf(),
            },
            &mut out,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("GET"));
        assert!(lines[0].ends_with("list_pets"));
        assert!(lines[1].contains("/pets/{id}"));
        assert!(lines[1].starts_with("DELETE"));
        assert!(lines[2].starts_with("INVALID"));
        assert!(lines[2].contains("broken"));
    }
}
