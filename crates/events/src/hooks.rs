//! Extension points of the commit and read pipelines.
//!
//! Hooks are registered explicitly with the pipeline; nothing is discovered
//! implicitly. Three points exist:
//!
//! - [`PrePublishHook`]: runs for each about-to-be-published event before the
//!   commit goes durable. A failure aborts the commit.
//! - [`PostPublishHook`]: runs for each event after it was published.
//! - [`PostDeserializationHook`]: runs synchronously for each decoded event on
//!   read. Must not perform I/O.

use async_trait::async_trait;
use thiserror::Error;

use streamkeep_core::{CancellationFlag, DomainError};

use crate::envelope::EventWithMetadata;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("hook cancelled")]
    Cancelled,

    #[error("hook failed: {0}")]
    Failed(#[source] BoxError),

    #[error("{} hook operations failed: {}", .0.len(), join_failures(.0))]
    Aggregate(Vec<HookError>),
}

impl HookError {
    pub fn failed(err: impl Into<BoxError>) -> Self {
        Self::Failed(err.into())
    }

    /// Collapse independent failures: none → `None`, one → itself, more → `Aggregate`.
    pub fn from_failures(mut failures: Vec<HookError>) -> Option<Self> {
        match failures.len() {
            0 => None,
            1 => failures.pop(),
            _ => Some(Self::Aggregate(failures)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, HookError::Cancelled)
    }
}

fn join_failures(failures: &[HookError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
pub trait PrePublishHook<E>: Send + Sync
where
    E: Send + Sync,
{
    async fn before_publish(
        &self,
        event: &EventWithMetadata<E>,
        cancellation: &CancellationFlag,
    ) -> Result<(), HookError>;
}

#[async_trait]
pub trait PostPublishHook<E>: Send + Sync
where
    E: Send + Sync,
{
    async fn after_publish(&self, event: &EventWithMetadata<E>) -> Result<(), HookError>;
}

pub trait PostDeserializationHook<E>: Send + Sync {
    fn after_deserialization(&self, event: &E) -> Result<(), HookError>;
}
