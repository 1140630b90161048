//! Validated, ordered entry collections.

use serde::Serialize;

use streamkeep_core::{DomainError, DomainResult, EntrySequence, StreamId};

use crate::entry::EventStreamEntry;

/// Ordered, immutable collection of entries belonging to one stream.
///
/// Invariants (checked in this order by [`EventStreamEntries::new`]):
/// 1. every entry carries the same `StreamId`;
/// 2. sequences run `0, 1, 2, …` in the order supplied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct EventStreamEntries(Vec<EventStreamEntry>);

impl EventStreamEntries {
    pub fn new(entries: Vec<EventStreamEntry>) -> DomainResult<Self> {
        if let Some(first) = entries.first() {
            validate_stream_identity(first.stream_id(), &entries)?;
            validate_contiguous(EntrySequence::zero(), &entries)?;
        }
        Ok(Self(entries))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Join two runs that are already known to be valid and adjacent.
    pub(crate) fn from_validated(entries: Vec<EventStreamEntry>) -> Self {
        Self(entries)
    }

    /// Sequence of the first entry (0 for the empty collection).
    pub fn minimum_sequence(&self) -> EntrySequence {
        self.0
            .first()
            .map(EventStreamEntry::sequence)
            .unwrap_or_else(EntrySequence::zero)
    }

    /// Sequence of the last entry (0 for the empty collection).
    pub fn maximum_sequence(&self) -> EntrySequence {
        self.0
            .last()
            .map(EventStreamEntry::sequence)
            .unwrap_or_else(EntrySequence::zero)
    }

    /// Sequence of the last entry, `None` when there are no entries.
    pub fn last_sequence(&self) -> Option<EntrySequence> {
        self.0.last().map(EventStreamEntry::sequence)
    }

    pub fn stream_id(&self) -> Option<StreamId> {
        self.0.first().map(EventStreamEntry::stream_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, EventStreamEntry> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[EventStreamEntry] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<EventStreamEntry> {
        self.0
    }
}

impl IntoIterator for EventStreamEntries {
    type Item = EventStreamEntry;
    type IntoIter = std::vec::IntoIter<EventStreamEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventStreamEntries {
    type Item = &'a EventStreamEntry;
    type IntoIter = core::slice::Iter<'a, EventStreamEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub(crate) fn validate_stream_identity(
    expected: StreamId,
    entries: &[EventStreamEntry],
) -> DomainResult<()> {
    for (idx, entry) in entries.iter().enumerate() {
        if entry.stream_id() != expected {
            return Err(DomainError::invalid_stream_identity(format!(
                "entry {} at index {idx} belongs to stream {}, expected {expected}",
                entry.entry_id(),
                entry.stream_id()
            )));
        }
    }
    Ok(())
}

pub(crate) fn validate_contiguous(
    start: EntrySequence,
    entries: &[EventStreamEntry],
) -> DomainResult<()> {
    let start = u64::from(start.value());
    for (idx, entry) in entries.iter().enumerate() {
        let expected = start + idx as u64;
        let found = u64::from(entry.sequence().value());
        if found != expected {
            return Err(DomainError::invalid_sequence(format!(
                "entry {} at index {idx} has sequence {found}, expected {expected}",
                entry.entry_id()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{entries_for, entry};

    #[test]
    fn empty_collection_reports_zero_bounds() {
        let entries = EventStreamEntries::new(vec![]).unwrap();
        assert!(entries.is_empty());
        assert_eq!(entries.minimum_sequence(), EntrySequence::zero());
        assert_eq!(entries.maximum_sequence(), EntrySequence::zero());
        assert_eq!(entries.last_sequence(), None);
        assert_eq!(entries.stream_id(), None);
    }

    #[test]
    fn collection_must_start_at_zero() {
        let stream_id = StreamId::new();
        let err = EventStreamEntries::new(vec![entry(stream_id, 1), entry(stream_id, 2)]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidSequence(_)));
    }

    #[test]
    fn identity_is_checked_before_sequence() {
        let stream_id = StreamId::new();
        // Both violations present: a foreign stream id and a gap.
        let err = EventStreamEntries::new(vec![
            entry(stream_id, 0),
            entry(stream_id, 2),
            entry(StreamId::new(), 3),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStreamIdentity(_)));
    }

    #[test]
    fn duplicate_sequence_is_rejected() {
        let stream_id = StreamId::new();
        let err = EventStreamEntries::new(vec![
            entry(stream_id, 0),
            entry(stream_id, 1),
            entry(stream_id, 1),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidSequence(_)));
    }

    #[test]
    fn iterates_in_supplied_order() {
        let entries = entries_for(StreamId::new(), 4);
        let sequences: Vec<u32> = entries.iter().map(|e| e.sequence().value()).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: contiguous runs from 0 are accepted and report their bounds.
            #[test]
            fn contiguous_runs_are_accepted(len in 1u32..64) {
                let entries = entries_for(StreamId::new(), len);
                prop_assert_eq!(entries.len(), len as usize);
                prop_assert_eq!(entries.minimum_sequence(), entries.as_slice()[0].sequence());
                prop_assert_eq!(
                    entries.maximum_sequence(),
                    entries.as_slice()[len as usize - 1].sequence()
                );
                prop_assert_eq!(entries.maximum_sequence().value(), len - 1);
            }

            /// Property: a foreign stream id at any position is rejected.
            #[test]
            fn foreign_stream_anywhere_is_rejected(len in 2u32..32, pos in 0usize..32) {
                let stream_id = StreamId::new();
                let pos = pos % len as usize;
                let mut raw = entries_for(stream_id, len).into_vec();
                raw[pos] = entry(StreamId::new(), pos as u32);

                let err = EventStreamEntries::new(raw).unwrap_err();
                prop_assert!(matches!(err, DomainError::InvalidStreamIdentity(_)));
            }

            /// Property: any broken step at any position is rejected.
            #[test]
            fn broken_step_anywhere_is_rejected(len in 1u32..32, pos in 0usize..32, bump in 1u32..5) {
                let stream_id = StreamId::new();
                let pos = pos % len as usize;
                let mut raw = entries_for(stream_id, len).into_vec();
                raw[pos] = entry(stream_id, pos as u32 + bump);

                let err = EventStreamEntries::new(raw).unwrap_err();
                prop_assert!(matches!(err, DomainError::InvalidSequence(_)));
            }

            /// Property: swapping two distinct positions breaks contiguity.
            #[test]
            fn permutations_are_rejected(len in 2u32..32, a in 0usize..32, b in 0usize..32) {
                let a = a % len as usize;
                let b = b % len as usize;
                prop_assume!(a != b);

                let mut raw = entries_for(StreamId::new(), len).into_vec();
                raw.swap(a, b);

                let err = EventStreamEntries::new(raw).unwrap_err();
                prop_assert!(matches!(err, DomainError::InvalidSequence(_)));
            }
        }
    }
}
