//! Execution layer error types.

use thiserror::Error;

/// Errors that can occur talking to an exchange.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Transport-level failure (connection, TLS, DNS)
    #[error("Exchange request failed: {0}")]
    RequestFailed(String),

    /// Exchange returned a non-success business code
    #[error("Exchange API error {code}: {msg}")]
    Api { code: i64, msg: String },

    /// Order was rejected by the exchange
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Response body could not be decoded
    #[error("Malformed exchange response: {0}")]
    Parse(String),

    /// Request signing failed
    #[error("Request signing error: {0}")]
    Signature(String),

    /// Timeout waiting for the exchange
    #[error("Timeout: {0}")]
    Timeout(String),

    /// A parameter failed validation before submission
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] gale_domain::DomainError),
}

/// Result type for execution operations.
pub type ExecResult<T> = Result<T, ExecError>;
