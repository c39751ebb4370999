//! Error types and exit codes for frontfill
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (including runs where at least one file failed)
//! - 2: Usage error (bad flags/args, invalid config values)
//! - 3: Data error (missing directory, unreadable config)
//! - 130: Interrupted

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the frontfill binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data error - missing directory, unreadable config (3)
    Data = 3,
    /// Interrupted by the user (130)
    Interrupted = 130,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during frontfill operations
#[derive(Error, Debug)]
pub enum FrontfillError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // Data errors (exit code 3)
    #[error("directory not found: {path:?}")]
    DirectoryNotFound { path: PathBuf },

    #[error("invalid config in {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("oracle error: {0}")]
    Oracle(String),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{failed} of {total} files failed")]
    FilesFailed { failed: usize, total: usize },

    #[error("{0}")]
    Other(String),

    #[error("interrupted")]
    Interrupted,
}

impl FrontfillError {
    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        FrontfillError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        FrontfillError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an oracle error from anything displayable
    pub fn oracle(error: impl std::fmt::Display) -> Self {
        FrontfillError::Oracle(error.to_string())
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            FrontfillError::UnknownFormat(_)
            | FrontfillError::UsageError(_)
            | FrontfillError::InvalidValue { .. }
            | FrontfillError::MissingConfig(_) => ExitCode::Usage,

            FrontfillError::DirectoryNotFound { .. } | FrontfillError::InvalidConfig { .. } => {
                ExitCode::Data
            }

            FrontfillError::Io(_)
            | FrontfillError::Json(_)
            | FrontfillError::Oracle(_)
            | FrontfillError::FailedOperationWithTarget { .. }
            | FrontfillError::FilesFailed { .. }
            | FrontfillError::Other(_) => ExitCode::Failure,

            FrontfillError::Interrupted => ExitCode::Interrupted,
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            FrontfillError::UnknownFormat(_) => "unknown_format",
            FrontfillError::UsageError(_) => "usage_error",
            FrontfillError::InvalidValue { .. } => "invalid_value",
            FrontfillError::MissingConfig(_) => "missing_config",
            FrontfillError::DirectoryNotFound { .. } => "directory_not_found",
            FrontfillError::InvalidConfig { .. } => "invalid_config",
            FrontfillError::Io(_) => "io_error",
            FrontfillError::Json(_) => "json_error",
            FrontfillError::Oracle(_) => "oracle_error",
            FrontfillError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            FrontfillError::FilesFailed { .. } => "files_failed",
            FrontfillError::Other(_) => "other",
            FrontfillError::Interrupted => "interrupted",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for frontfill operations
pub type Result<T> = std::result::Result<T, FrontfillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            FrontfillError::UsageError("x".into()).exit_code(),
            ExitCode::Usage
        );
        assert_eq!(
            FrontfillError::DirectoryNotFound {
                path: PathBuf::from("nope")
            }
            .exit_code(),
            ExitCode::Data
        );
        assert_eq!(
            FrontfillError::FilesFailed {
                failed: 1,
                total: 3
            }
            .exit_code(),
            ExitCode::Failure
        );
        assert_eq!(FrontfillError::Interrupted.exit_code() as i32, 130);
    }

    #[test]
    fn test_to_json_envelope() {
        let json = FrontfillError::invalid_value("max_title_words", 0).to_json();
        assert_eq!(json["error"]["code"], 2);
        assert_eq!(json["error"]["type"], "invalid_value");
        assert_eq!(json["error"]["message"], "invalid max_title_words: 0");
    }
}
