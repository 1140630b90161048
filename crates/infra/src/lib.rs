//! Infrastructure layer: event store, publisher, commit pipeline, config.

pub mod config;
pub mod event_store;
pub mod pipeline;
pub mod publisher;


pub use config::{CleanupConfig, StreamkeepConfig};
pub use event_store::{EventStoreError, EventStreamWriter, InMemoryEventStreamWriter};
pub use pipeline::{EventStreamPipeline, PipelineError, TypedEventStream};
pub use publisher::{EntryPublisher, InMemoryEntryPublisher, PublishError, Subscription};
