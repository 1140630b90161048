use thiserror::Error;

use streamkeep_core::{DomainError, ForgettablePayloadId, ForgettablePayloadSequence};
use streamkeep_events::HookError;

/// Failure reported by a payload storage collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadStoreError {
    /// The stored sequence is not the one the update was based on.
    #[error(
        "concurrency conflict on payload {payload_id}: expected stored sequence {expected}, found {actual}"
    )]
    Conflict {
        payload_id: ForgettablePayloadId,
        expected: ForgettablePayloadSequence,
        actual: ForgettablePayloadSequence,
    },

    #[error("payload already stored: {0}")]
    DuplicatePayload(ForgettablePayloadId),

    #[error("payload not stored: {0}")]
    NotFound(ForgettablePayloadId),

    #[error("payload store backend error: {0}")]
    Backend(String),
}

/// Failure of a payload lifecycle operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForgettablePayloadError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] PayloadStoreError),

    #[error("payload operation cancelled")]
    Cancelled,
}

impl From<ForgettablePayloadError> for HookError {
    fn from(err: ForgettablePayloadError) -> Self {
        match err {
            ForgettablePayloadError::Domain(e) => HookError::Domain(e),
            ForgettablePayloadError::Cancelled => HookError::Cancelled,
            ForgettablePayloadError::Store(e) => HookError::failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_errors_keep_their_kind() {
        let domain: HookError =
            ForgettablePayloadError::Domain(DomainError::invalid_operation("placeholder")).into();
        assert!(matches!(domain, HookError::Domain(DomainError::InvalidOperation(_))));

        let cancelled: HookError = ForgettablePayloadError::Cancelled.into();
        assert!(cancelled.is_cancelled());

        let id = ForgettablePayloadId::new();
        let store: HookError =
            ForgettablePayloadError::Store(PayloadStoreError::DuplicatePayload(id)).into();
        assert!(matches!(store, HookError::Failed(_)));
        assert!(store.to_string().contains(&id.to_string()));
    }
}
