//! Error types.
//!
//! - `SosError`: domain conditions raised by the share-of-search core
//! - `AppError`: what the binary reports (message + process exit code)

use thiserror::Error;

/// Domain errors raised by the share-of-search transforms.
///
/// Data conditions such as an empty input series, a zero-total row or an
/// undefined year-over-year ratio are *not* errors: they surface as an empty
/// output, an excluded row, or an absent value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SosError {
    #[error("Invalid keyword set: {0}")]
    InvalidKeywordSet(String),

    #[error("Keyword `{0}` is not a column of the interest series.")]
    MissingKeyword(String),

    #[error("Unrecognized granularity `{0}` (expected one of: month, quarter, year).")]
    UnrecognizedGranularity(String),

    #[error("Expected a {expected} series, got a {actual} series.")]
    GranularityMismatch { expected: String, actual: String },

    #[error("Invalid interest series: {0}")]
    InvalidSeries(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<SosError> for AppError {
    fn from(err: SosError) -> Self {
        AppError::new(2, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_usage_exit_code() {
        let err: AppError = SosError::InvalidKeywordSet("too many".to_string()).into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.message(), "Invalid keyword set: too many");
    }
}
