//! Event streams: entries, the append-only aggregate, publication staging,
//! codecs and pipeline hooks.

pub mod codec;
pub mod descriptor;
pub mod entries;
pub mod entry;
pub mod envelope;
pub mod event;
pub mod hooks;
pub mod staged;
pub mod stream;

#[cfg(test)]
mod test_support;

pub use codec::{CodecError, EventCodec, JsonEventCodec};
pub use descriptor::EventDescriptor;
pub use entries::EventStreamEntries;
pub use entry::EventStreamEntry;
pub use envelope::{EventMetadata, EventWithMetadata};
pub use event::DomainEvent;
pub use hooks::{BoxError, HookError, PostDeserializationHook, PostPublishHook, PrePublishHook};
pub use staged::{AppendableEventStream, PublishableEventStream};
pub use stream::EventStream;
