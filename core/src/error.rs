//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Only structural failures are errors. Missing names, unmapped error types and
//! unclassifiable parameters degrade to defaults inside the operation reader.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The handler could not be introspected; no partial operation is produced.
    #[from(ignore)]
    #[display("Invalid Handler: {_0}")]
    InvalidHandler(String),

    /// A configuration file could not be read or decoded.
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::NotFound, "missing");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_invalid_handler_display() {
        let app_err = AppError::InvalidHandler("handler has no name".into());
        assert_eq!(
            format!("{}", app_err),
            "Invalid Handler: handler has no name"
        );
    }
}
