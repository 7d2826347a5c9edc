//! # Store Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Storage      │  │  Configuration  │  │      Session            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Io             │  │  InvalidConfig  │  │  SubmissionRejected     │ │
//! │  │  Serialization  │  │  ConfigLoad...  │  │  Core                   │ │
//! │  │  Unavailable    │  │                 │  │  ChannelClosed          │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage errors rarely reach a caller: the application slot logs them and
//! reports "no data" or "not saved" instead.

use goldloan_core::{CoreError, ValidationReport, SUBMIT_REJECTED_NOTICE};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// File system failure in a storage backend.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the operation (quota, read-only, disabled).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// Submission was blocked by outstanding violations.
    #[error("{}", SUBMIT_REJECTED_NOTICE)]
    SubmissionRejected(ValidationReport),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// The autosave task is no longer running.
    #[error("Autosave task has stopped")]
    ChannelClosed,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl StoreError {
    /// The report attached to a rejected submission.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            StoreError::SubmissionRejected(report) => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_is_the_notice() {
        let err = StoreError::SubmissionRejected(ValidationReport::default());
        assert_eq!(
            err.to_string(),
            "Please fix the validation errors before submitting."
        );
        assert!(err.report().is_some());
    }

    #[test]
    fn test_toml_error_is_config_load() {
        let err: StoreError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, StoreError::ConfigLoadFailed(_)));
    }
}
