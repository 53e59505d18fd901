#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use opdoc_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Failure inside the core library.
    #[display("{}", _0)]
    Core(AppError),

    /// Output could not be encoded.
    #[from(ignore)]
    #[display("Serialization failed: {}", _0)]
    Serialize(String),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialize(e.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Serialize(e.to_string())
    }
}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_message() {
        let err: CliError = AppError::InvalidHandler("get_pet".into()).into();
        assert_eq!(err.to_string(), "Invalid Handler: get_pet");
    }

    #[test]
    fn test_serialize_error_conversion() {
        let raw = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CliError = raw.into();
        assert!(matches!(err, CliError::Serialize(_)));
    }
}
