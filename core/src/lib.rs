#![deny(missing_docs)]

//! # Opdoc Core
//!
//! Reads API operation documentation from endpoint handlers: parameter names,
//! locations and types, the response class, and the error responses a handler
//! may produce.

/// Shared error types.
pub mod error;

/// Type normalization logic (Rust -> documentation data types).
pub mod type_mapping;

/// Handler capability trait and attribute model.
pub mod handler;

/// Error type to HTTP status mapping.
pub mod status;

/// AST Parsing logic.
pub mod parser;

/// Operation reading and the documentation model.
pub mod operation;

/// File-backed configuration.
pub mod config;

pub use config::OpdocConfig;
pub use error::{AppError, AppResult};
pub use handler::{FormalParameter, Handler, HandlerSpec};
pub use operation::{
    DocumentationContext, ErrorDescriptor, HttpMethod, Operation, OperationReader, ParamType,
    ParameterDescriptor, ReaderOptions, RouteCondition,
};
pub use parser::{extract_handlers, ExtractedHandler, SourceHandler};
pub use status::ExceptionStatusTable;
pub use type_mapping::{DataType, RustTypeMapper, TypeMapper};
