#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use apigraph_core::AppError;
use derive_more::{Display, From};

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Transport failure talking to a remote endpoint.
    #[from(ignore)]
    #[display("HTTP Error: {}", _0)]
    Http(String),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// `Http` and `General` carry rendered messages, so there is no `source()`.
impl std::error::Error for CliError {}

impl From<CliError> for AppError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Io(e) => AppError::Io(e),
            other => AppError::General(other.to_string()),
        }
    }
}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_into_app_error() {
        let err: AppError = CliError::Http("timed out".into()).into();
        assert_eq!(err.to_string(), "General Error: HTTP Error: timed out");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AppError = CliError::from(io).into();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_message_variants_have_no_source() {
        use std::error::Error;
        assert!(CliError::Http("refused".into()).source().is_none());
        assert!(CliError::General("bad name".into()).source().is_none());
    }
}
