//! Publication of durable entries to consumers.
//!
//! Entries are **stored first**, then published. A publisher only ever sees
//! entries from a [`PublishableEventStream`](streamkeep_events::PublishableEventStream),
//! so nothing is announced before it is durable.
//!
//! ## Delivery Guarantees
//!
//! - Entries of one call are delivered in sequence order
//! - At-least-once: a failed publish may be retried, consumers must be idempotent

pub mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use streamkeep_events::EventStreamEntry;

pub use in_memory::{InMemoryEntryPublisher, Subscription};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publisher lock poisoned")]
    Poisoned,

    #[error("publisher backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait EntryPublisher: Send + Sync {
    /// Publish entries in the order given, which must be sequence order.
    async fn publish(&self, entries: &[EventStreamEntry]) -> Result<(), PublishError>;
}

#[async_trait]
impl<P> EntryPublisher for Arc<P>
where
    P: EntryPublisher + ?Sized,
{
    async fn publish(&self, entries: &[EventStreamEntry]) -> Result<(), PublishError> {
        (**self).publish(entries).await
    }
}
