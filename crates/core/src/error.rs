//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (validation, stream invariants,
/// conflicts). Storage and publication concerns have their own error types in
/// the crates that talk to those collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required value was missing at a construction or method boundary.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A scalar was constructed with an out-of-domain value.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// An entry's stream identifier does not match the stream it is validated against.
    #[error("invalid stream identity: {0}")]
    InvalidStreamIdentity(String),

    /// An entry's sequence breaks the 0-based, contiguous, step-1 ordering.
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    /// An operation is not allowed in the current state, or a collaborator
    /// returned a structurally impossible result.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Optimistic concurrency check failed (stale sequence).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    pub fn invalid_stream_identity(msg: impl Into<String>) -> Self {
        Self::InvalidStreamIdentity(msg.into())
    }

    pub fn invalid_sequence(msg: impl Into<String>) -> Self {
        Self::InvalidSequence(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
