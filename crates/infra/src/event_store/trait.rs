use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use streamkeep_core::{DomainError, StreamId};
use streamkeep_events::{AppendableEventStream, EventStream, PublishableEventStream};

/// Event store operation error.
///
/// These are **infrastructure errors** (storage, concurrency) as opposed to
/// domain errors (validation, invariants), which are wrapped unchanged.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The durable head moved since the stream was loaded.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("event store backend error: {0}")]
    Backend(String),
}

/// Durable, append-only storage of event streams.
///
/// ## Append Semantics
///
/// `append()`:
/// - Compares the stream's committed head against the durable head and rejects
///   with [`EventStoreError::Concurrency`] when they differ
/// - Checks that the pending entries continue the durable sequence
///   (final guard against concurrent writers)
/// - Persists all pending entries or none of them
/// - Returns the [`PublishableEventStream`] only once the write is confirmed
///
/// ## Load Semantics
///
/// `load()` returns the full committed history in sequence order, or an empty
/// stream with the given id if nothing was ever stored.
#[async_trait]
pub trait EventStreamWriter: Send + Sync {
    async fn append(
        &self,
        stream: AppendableEventStream,
    ) -> Result<PublishableEventStream, EventStoreError>;

    async fn load(&self, stream_id: StreamId) -> Result<EventStream, EventStoreError>;
}

#[async_trait]
impl<S> EventStreamWriter for Arc<S>
where
    S: EventStreamWriter + ?Sized,
{
    async fn append(
        &self,
        stream: AppendableEventStream,
    ) -> Result<PublishableEventStream, EventStoreError> {
        (**self).append(stream).await
    }

    async fn load(&self, stream_id: StreamId) -> Result<EventStream, EventStoreError> {
        (**self).load(stream_id).await
    }
}
