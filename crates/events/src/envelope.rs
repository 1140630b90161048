use serde::{Deserialize, Serialize};

use streamkeep_core::{CausationId, CorrelationId, CreationTime, EntryId, EntrySequence, StreamId};

use crate::entry::EventStreamEntry;

/// Stream and causal metadata of one entry, detached from its serialized content.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub stream_id: StreamId,
    pub entry_id: EntryId,
    pub sequence: EntrySequence,
    pub causation_id: CausationId,
    pub correlation_id: CorrelationId,
    pub creation_time: CreationTime,
}

impl EventMetadata {
    pub fn of(entry: &EventStreamEntry) -> Self {
        Self {
            stream_id: entry.stream_id(),
            entry_id: entry.entry_id(),
            sequence: entry.sequence(),
            causation_id: entry.causation_id(),
            correlation_id: entry.correlation_id(),
            creation_time: entry.creation_time(),
        }
    }
}

/// A typed domain event paired with the metadata of the entry that carries it.
///
/// This is what hooks see: the event itself (to find attached payloads) and
/// the entry identity (to associate those payloads with).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWithMetadata<E> {
    event: E,
    metadata: EventMetadata,
}

impl<E> EventWithMetadata<E> {
    pub fn new(event: E, metadata: EventMetadata) -> Self {
        Self { event, metadata }
    }

    pub fn event(&self) -> &E {
        &self.event
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    pub fn stream_id(&self) -> StreamId {
        self.metadata.stream_id
    }

    pub fn entry_id(&self) -> EntryId {
        self.metadata.entry_id
    }

    pub fn sequence(&self) -> EntrySequence {
        self.metadata.sequence
    }

    pub fn into_event(self) -> E {
        self.event
    }
}
