use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use streamkeep_core::{DomainError, EntrySequence, ExpectedSequence, StreamId};
use streamkeep_events::{
    AppendableEventStream, EventStream, EventStreamEntries, EventStreamEntry,
    PublishableEventStream,
};

use super::r#trait::{EventStoreError, EventStreamWriter};

/// In-memory append-only event store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryEventStreamWriter {
    streams: RwLock<HashMap<StreamId, Vec<EventStreamEntry>>>,
}

impl InMemoryEventStreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams holding at least one durable entry.
    pub fn len(&self) -> usize {
        self.streams.read().map(|streams| streams.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> EventStoreError {
        EventStoreError::Backend("lock poisoned".to_string())
    }
}

#[async_trait]
impl EventStreamWriter for InMemoryEventStreamWriter {
    async fn append(
        &self,
        stream: AppendableEventStream,
    ) -> Result<PublishableEventStream, EventStoreError> {
        let stream_id = stream.stream_id();
        let pending = stream.entries_to_append();
        if pending.is_empty() {
            return Err(EventStoreError::InvalidAppend(format!(
                "stream {stream_id} has nothing to append"
            )));
        }

        {
            let mut streams = self.streams.write().map_err(|_| Self::poisoned())?;
            let durable_head = streams
                .get(&stream_id)
                .and_then(|stored| stored.last())
                .map(EventStreamEntry::sequence);

            ExpectedSequence::from_head(stream.committed_head())
                .check(durable_head)
                .map_err(|e| match e {
                    DomainError::Conflict(msg) => {
                        EventStoreError::Concurrency(format!("stream {stream_id}: {msg}"))
                    }
                    other => EventStoreError::Domain(other),
                })?;

            let mut expected = match durable_head {
                Some(head) => head.next()?,
                None => EntrySequence::zero(),
            };
            for entry in pending {
                if entry.stream_id() != stream_id || entry.sequence() != expected {
                    return Err(EventStoreError::InvalidAppend(format!(
                        "entry {} at sequence {} does not continue stream {stream_id} at {expected}",
                        entry.entry_id(),
                        entry.sequence()
                    )));
                }
                expected = expected.next()?;
            }

            streams
                .entry(stream_id)
                .or_default()
                .extend(pending.iter().cloned());
            debug!(stream_id = %stream_id, appended = pending.len(), "entries stored");
        }

        Ok(stream.into_publishable())
    }

    async fn load(&self, stream_id: StreamId) -> Result<EventStream, EventStoreError> {
        let streams = self.streams.read().map_err(|_| Self::poisoned())?;
        match streams.get(&stream_id) {
            Some(entries) => {
                let entries = EventStreamEntries::new(entries.clone())?;
                Ok(EventStream::from_entries(stream_id, entries)?)
            }
            None => Ok(EventStream::new_event_stream(Some(stream_id))),
        }
    }
}
