use serde::{Deserialize, Serialize};

use streamkeep_core::{CausationId, CorrelationId, CreationTime, EntryId, EntrySequence, StreamId};

use crate::descriptor::EventDescriptor;

/// One stored record within a stream: an event descriptor plus ordering and
/// causal metadata.
///
/// An entry on its own makes no ordering claim. Ordering is validated by the
/// collection it is placed into ([`EventStreamEntries`](crate::EventStreamEntries))
/// or the stream it is appended to ([`EventStream`](crate::EventStream)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStreamEntry {
    stream_id: StreamId,
    entry_id: EntryId,
    sequence: EntrySequence,
    descriptor: EventDescriptor,
    causation_id: CausationId,
    creation_time: CreationTime,
    correlation_id: CorrelationId,
}

impl EventStreamEntry {
    pub fn new(
        stream_id: StreamId,
        entry_id: EntryId,
        sequence: EntrySequence,
        descriptor: EventDescriptor,
        causation_id: CausationId,
        creation_time: CreationTime,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            stream_id,
            entry_id,
            sequence,
            descriptor,
            causation_id,
            creation_time,
            correlation_id,
        }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    pub fn sequence(&self) -> EntrySequence {
        self.sequence
    }

    pub fn descriptor(&self) -> &EventDescriptor {
        &self.descriptor
    }

    pub fn causation_id(&self) -> CausationId {
        self.causation_id
    }

    pub fn creation_time(&self) -> CreationTime {
        self.creation_time
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }
}
