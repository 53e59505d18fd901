#![deny(missing_docs)]

//! # Operation Module
//!
//! Turns a [`Handler`](crate::handler::Handler) into an [`Operation`]: the
//! documented view of one endpoint with its named, classified parameters and
//! the error responses it may produce.

pub mod classifier;
pub mod errors;
pub mod models;
pub mod names;
pub mod reader;

pub use errors::{merge_error_responses, ErrorStrategy, DEFAULT_STRATEGIES};
pub use models::{
    DocumentationContext, ErrorDescriptor, HttpMethod, Operation, ParamType, ParameterDescriptor,
    RouteCondition,
};
pub use reader::{OperationReader, ReaderOptions};
