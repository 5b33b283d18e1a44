//! Daemon error types.

use gale_domain::DomainError;
use gale_exec::ExecError;
use gale_indicators::IndicatorError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Indicator pipeline error
    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    /// Execution error
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
