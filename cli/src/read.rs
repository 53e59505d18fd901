#![deny(missing_docs)]

//! # Read Command
//!
//! Reads the operations of the handlers in a source file and prints them as
//! JSON or YAML.
//!
//! The exception table combines `#[response_status]` types found in the source
//! with the config file's `exceptions`. Config entries win on conflict.
//!
//! A handler that cannot be read is reported under `failures` and the others
//! are still documented.

use crate::error::{CliError, CliResult};
use opdoc_core::{
    extract_handlers, AppResult, DocumentationContext, ExceptionStatusTable, ExtractedHandler,
    OpdocConfig, Operation, OperationReader, SourceHandler,
};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Output encodings.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Arguments for the read command.
#[derive(clap::Args, Debug, Clone)]
pub struct ReadArgs {
    /// Rust source file containing handlers.
    pub source: PathBuf,

    /// YAML or JSON config file.
    #[clap(long, env = "OPDOC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only read the handler with this name.
    #[clap(long)]
    pub handler: Option<String>,

    /// Output format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Use positional names instead of names from the handler signature.
    #[clap(long)]
    pub no_debug_names: bool,
}

/// The document printed by the command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadOutput {
    #[serde(flatten)]
    context: DocumentationContext,
    operations: Vec<DocumentedOperation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<HandlerFailure>,
}

#[derive(Debug, Serialize)]
struct DocumentedOperation {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(flatten)]
    operation: Operation,
}

#[derive(Debug, Serialize)]
struct HandlerFailure {
    handler: String,
    error: String,
}

/// Executes the read command.
pub fn execute(args: &ReadArgs, out: &mut impl Write) -> CliResult<()> {
    let config = match &args.config {
        Some(path) => OpdocConfig::load(path)?,
        None => OpdocConfig::default(),
    };

    let code = fs::read_to_string(&args.source)?;
    let handlers = select_handlers(extract_handlers(&code), args.handler.as_deref())?;

    let mut statuses: ExceptionStatusTable = config.exception_table().clone();
    statuses.merge(&ExceptionStatusTable::from_source(&code)?);

    let mut options = config.reader_options();
    if args.no_debug_names {
        options.debug_parameter_names = false;
    }

    let reader = OperationReader::new(statuses).with_options(options);
    let context = config.documentation_context();

    let mut operations = Vec::new();
    let mut failures = Vec::new();
    for extracted in handlers {
        match document(&reader, &context, extracted.handler) {
            Ok(documented) => operations.push(documented),
            Err(e) => {
                tracing::warn!(handler = %extracted.name, error = %e, "handler not documented");
                failures.push(HandlerFailure {
                    handler: extracted.name,
                    error: e.to_string(),
                });
            }
        }
    }

    let output = ReadOutput {
        context,
        operations,
        failures,
    };
    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &output)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => serde_yaml::to_writer(&mut *out, &output)?,
    }
    Ok(())
}

fn document(
    reader: &OperationReader,
    context: &DocumentationContext,
    handler: AppResult<SourceHandler>,
) -> AppResult<DocumentedOperation> {
    let handler = handler?;
    let operation = reader.read_operation(
        context,
        &handler,
        &handler.route_condition(),
        handler.http_method(),
    )?;
    Ok(DocumentedOperation {
        path: handler.path().map(str::to_string),
        operation,
    })
}

fn select_handlers(
    handlers: Vec<ExtractedHandler>,
    only: Option<&str>,
) -> CliResult<Vec<ExtractedHandler>> {
    let Some(name) = only else {
        return Ok(handlers);
    };
    let selected: Vec<_> = handlers.into_iter().filter(|h| h.name == name).collect();
    if selected.is_empty() {
        return Err(CliError::General(format!("No handler named '{}'", name)));
    }
    Ok(selected)
}
