//! The event stream aggregate.

use streamkeep_core::{AggregateRoot, DomainError, DomainResult, EntrySequence, StreamId};
use tracing::debug;

use crate::entries::{EventStreamEntries, validate_contiguous, validate_stream_identity};
use crate::entry::EventStreamEntry;
use crate::staged::AppendableEventStream;

/// Aggregate root: one append-only stream.
///
/// `entries` is committed history; `entries_to_append` collects what the
/// current unit of work proposes. Appending only validates and buffers: nothing
/// is durable until a writer persists the buffer (see
/// [`AppendableEventStream`] / [`PublishableEventStream`](crate::PublishableEventStream)).
///
/// A stream is owned by one logical flow at a time; concurrent writers are
/// detected by the durable writer's head check, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStream {
    stream_id: StreamId,
    entries: EventStreamEntries,
    entries_to_append: Vec<EventStreamEntry>,
}

impl EventStream {
    /// Empty stream with the supplied identity, or a fresh one.
    pub fn new_event_stream(stream_id: Option<StreamId>) -> Self {
        Self {
            stream_id: stream_id.unwrap_or_default(),
            entries: EventStreamEntries::empty(),
            entries_to_append: Vec::new(),
        }
    }

    /// Rehydrate a stream from its committed history.
    pub fn from_entries(stream_id: StreamId, entries: EventStreamEntries) -> DomainResult<Self> {
        validate_stream_identity(stream_id, entries.as_slice())?;
        Ok(Self {
            stream_id,
            entries,
            entries_to_append: Vec::new(),
        })
    }

    pub(crate) fn from_parts(
        stream_id: StreamId,
        entries: EventStreamEntries,
        entries_to_append: Vec<EventStreamEntry>,
    ) -> Self {
        Self {
            stream_id,
            entries,
            entries_to_append,
        }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Committed history.
    pub fn entries(&self) -> &EventStreamEntries {
        &self.entries
    }

    /// Entries proposed in the current unit of work, not yet durable.
    pub fn entries_to_append(&self) -> &[EventStreamEntry] {
        &self.entries_to_append
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.entries_to_append.is_empty()
    }

    /// Sequence of the newest entry, pending ones included; `None` for an empty stream.
    pub fn current_sequence(&self) -> Option<EntrySequence> {
        self.entries_to_append
            .last()
            .map(EventStreamEntry::sequence)
            .or_else(|| self.entries.last_sequence())
    }

    /// Sequence the next appended entry must carry.
    pub fn next_sequence(&self) -> DomainResult<EntrySequence> {
        match self.current_sequence() {
            Some(current) => current.next(),
            None => Ok(EntrySequence::zero()),
        }
    }

    /// Validate and buffer new entries.
    ///
    /// Every entry must belong to this stream (checked first for the whole
    /// batch) and carry the sequences `next, next + 1, …`. On error the stream
    /// is left unchanged.
    pub fn append_entries(
        &mut self,
        new_entries: impl IntoIterator<Item = EventStreamEntry>,
    ) -> DomainResult<()> {
        let new_entries: Vec<EventStreamEntry> = new_entries.into_iter().collect();
        if new_entries.is_empty() {
            return Err(DomainError::invalid_argument("no entries to append"));
        }

        let expected_next = self.next_sequence()?;
        validate_stream_identity(self.stream_id, &new_entries)?;
        validate_contiguous(expected_next, &new_entries)?;

        debug!(
            stream_id = %self.stream_id,
            first_sequence = %expected_next,
            count = new_entries.len(),
            "entries buffered for append"
        );
        self.entries_to_append.extend(new_entries);
        Ok(())
    }

    /// Hand the buffered entries off for durable persistence.
    pub fn into_appendable(self) -> AppendableEventStream {
        AppendableEventStream::new(self)
    }
}

impl AggregateRoot for EventStream {
    type Id = StreamId;

    fn id(&self) -> &Self::Id {
        &self.stream_id
    }

    fn version(&self) -> u64 {
        (self.entries.len() + self.entries_to_append.len()) as u64
    }
}
