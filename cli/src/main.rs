#![deny(missing_docs)]

//! # Opdoc CLI
//!
//! Command Line Interface for the operation documentation reader.
//!
//! Supported Commands:
//! - `list`: Prints the handlers found in a Rust source file.
//! - `read`: Reads the documented operations of those handlers.

use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::io;

mod error;
mod list;
mod logging;
mod read;

#[derive(Parser, Debug)]
#[clap(author, version, about = "API operation documentation reader")]
struct Cli {
    /// Log debug diagnostics to stderr.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List handlers in a source file.
    List(list::ListArgs),
    /// Read operations from the handlers in a source file.
    Read(read::ReadArgs),
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut out = io::stdout().lock();
    match &cli.command {
        Commands::List(args) => list::execute(args, &mut out)?,
        Commands::Read(args) => read::execute(args, &mut out)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_read_arguments() {
        let cli = Cli::try_parse_from([
            "opdoc",
            "-v",
            "read",
            "src/pets.rs",
            "--handler",
            "get_pet",
            "--format",
            "yaml",
            "--no-debug-names",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Read(args) = cli.command else {
            panic!("expected read command");
        };
        assert_eq!(args.handler.as_deref(), Some("get_pet"));
        assert_eq!(args.format, read::OutputFormat::Yaml);
        assert!(args.no_debug_names);
    }
}
