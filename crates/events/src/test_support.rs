//! Entry builders shared by this crate's unit tests.

use streamkeep_core::{
    CausationId, CorrelationId, CreationTime, EntryId, EntrySequence, SerializationFormat,
    SerializedContent, StreamId, TypeIdentifier, TypeIdentifierFormat,
};

use crate::descriptor::EventDescriptor;
use crate::entries::EventStreamEntries;
use crate::entry::EventStreamEntry;

pub(crate) fn descriptor() -> EventDescriptor {
    EventDescriptor::new(
        SerializedContent::new("{\"kind\":\"test\"}").unwrap(),
        SerializationFormat::new("json").unwrap(),
        TypeIdentifier::new("test.event").unwrap(),
        TypeIdentifierFormat::new("event-type").unwrap(),
    )
}

pub(crate) fn entry(stream_id: StreamId, sequence: u32) -> EventStreamEntry {
    let correlation = CorrelationId::new();
    EventStreamEntry::new(
        stream_id,
        EntryId::new(),
        EntrySequence::new(sequence),
        descriptor(),
        CausationId::from(correlation),
        CreationTime::now(),
        correlation,
    )
}

pub(crate) fn entries_for(stream_id: StreamId, len: u32) -> EventStreamEntries {
    EventStreamEntries::new((0..len).map(|seq| entry(stream_id, seq)).collect()).unwrap()
}
