// src/errors.rs

//! Crate-wide error types.
//!
//! - [`CmdgateError`] covers the CLI shell (config loading, scenario lookup).
//! - [`OperationError`] is what operation functions hand back to a command.
//!   It never escapes a command: the task observer turns it into state.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmdgateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CmdgateError>;

/// Failure returned by an operation function.
///
/// `Canceled` is the conventional cancellation signal: an operation that sees
/// its token fire should return it so the run is recorded as canceled rather
/// than faulted. Any other failure goes through `Failed`, which makes `?`
/// work on `anyhow::Result` (and anything using `anyhow::Context`).
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("operation was canceled")]
    Canceled,

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl OperationError {
    /// True if this is the cancellation signal, either directly or somewhere
    /// in the chain of a wrapped failure.
    pub fn is_cancellation(&self) -> bool {
        match self {
            OperationError::Canceled => true,
            OperationError::Failed(err) => err
                .chain()
                .any(|cause| {
                    matches!(
                        cause.downcast_ref::<OperationError>(),
                        Some(OperationError::Canceled)
                    )
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn plain_failure_is_not_cancellation() {
        let err = OperationError::from(anyhow::anyhow!("disk full"));
        assert!(!err.is_cancellation());
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn wrapped_cancellation_is_detected() {
        let inner: std::result::Result<(), OperationError> = Err(OperationError::Canceled);
        let wrapped = inner.context("copying batch 3").unwrap_err();
        let err = OperationError::Failed(wrapped);
        assert!(err.is_cancellation());
    }
}
