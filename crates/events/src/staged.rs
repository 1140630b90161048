//! Typed stages between "appended locally" and "eligible for publication".
//!
//! ```text
//! EventStream ──into_appendable()──▶ AppendableEventStream ──into_publishable()──▶ PublishableEventStream
//!   (buffering)                        (validated, handed off)                      (durable, publish these)
//! ```
//!
//! Publication APIs only accept [`PublishableEventStream`], and only a durable
//! writer that has confirmed persistence should call
//! [`AppendableEventStream::into_publishable`]. That keeps "publish before
//! durable" out of reach of ordinary code, and because `events_to_publish` is
//! exactly the buffered entries, nothing durable is silently left unpublished.

use streamkeep_core::{DomainResult, EntrySequence, StreamId};

use crate::entries::EventStreamEntries;
use crate::entry::EventStreamEntry;
use crate::stream::EventStream;

/// An event stream whose pending entries passed local validation and are
/// handed off for durable persistence. Performs no I/O itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendableEventStream {
    stream: EventStream,
}

impl AppendableEventStream {
    pub(crate) fn new(stream: EventStream) -> Self {
        Self { stream }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream.stream_id()
    }

    /// Sequence the next locally appended entry must carry.
    ///
    /// Fails only when the stream already ends at the largest sequence.
    pub fn next_sequence(&self) -> DomainResult<EntrySequence> {
        self.stream.next_sequence()
    }

    /// Sequence of the last committed entry; what the durable head must match.
    pub fn committed_head(&self) -> Option<EntrySequence> {
        self.stream.entries().last_sequence()
    }

    pub fn committed_entries(&self) -> &EventStreamEntries {
        self.stream.entries()
    }

    pub fn entries_to_append(&self) -> &[EventStreamEntry] {
        self.stream.entries_to_append()
    }

    pub fn as_event_stream(&self) -> &EventStream {
        &self.stream
    }

    /// Same rules as [`EventStream::append_entries`], checked against
    /// [`next_sequence`](Self::next_sequence).
    pub fn append_entries(
        &mut self,
        new_entries: impl IntoIterator<Item = EventStreamEntry>,
    ) -> DomainResult<()> {
        self.stream.append_entries(new_entries)
    }

    /// Promote after the durable writer confirmed persistence of
    /// [`entries_to_append`](Self::entries_to_append).
    pub fn into_publishable(self) -> PublishableEventStream {
        PublishableEventStream { appendable: self }
    }
}

/// A stream whose pending entries are durable and now eligible for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishableEventStream {
    appendable: AppendableEventStream,
}

impl PublishableEventStream {
    pub fn stream_id(&self) -> StreamId {
        self.appendable.stream_id()
    }

    /// Entries this unit of work is responsible for publishing, in sequence
    /// order. Never includes inherited history.
    pub fn events_to_publish(&self) -> &[EventStreamEntry] {
        self.appendable.entries_to_append()
    }

    /// Full durable history: inherited entries followed by the newly persisted ones.
    pub fn entries(&self) -> EventStreamEntries {
        let mut all = self.appendable.committed_entries().as_slice().to_vec();
        all.extend_from_slice(self.events_to_publish());
        EventStreamEntries::from_validated(all)
    }

    pub fn as_appendable(&self) -> &AppendableEventStream {
        &self.appendable
    }

    /// The stream as it now stands: everything committed, nothing pending.
    pub fn into_event_stream(self) -> EventStream {
        let stream_id = self.stream_id();
        let entries = self.entries();
        EventStream::from_parts(stream_id, entries, Vec::new())
    }
}
