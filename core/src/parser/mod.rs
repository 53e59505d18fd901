#![deny(missing_docs)]

//! # Parser Module
//!
//! Reads handlers from Rust source using the rust-analyzer syntax library.
//! Extracts handler functions, their parameters, and the documentation and
//! binding attributes attached to both.

pub mod attributes;
pub mod handlers;

pub use handlers::{extract_handlers, ExtractedHandler, SourceHandler};
