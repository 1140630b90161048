use serde::{Deserialize, Serialize};

use streamkeep_core::{
    DomainError, DomainResult, EntryId, ForgettablePayloadId, ForgettablePayloadSequence,
    PayloadCreationTime, PayloadLastModifiedTime, StreamId, ValueObject,
};

use crate::state::ForgettablePayloadState;

/// Association and lifecycle record of a forgettable payload.
///
/// Every update goes through [`create_updated`](Self::create_updated), which
/// bumps `payload_sequence` by one. Storage uses that sequence for optimistic
/// concurrency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredMetadata")]
pub struct ForgettablePayloadMetadata {
    event_stream_id: StreamId,
    event_stream_entry_id: EntryId,
    payload_id: ForgettablePayloadId,
    payload_state: ForgettablePayloadState,
    payload_creation_time: PayloadCreationTime,
    payload_last_modified_time: PayloadLastModifiedTime,
    payload_sequence: ForgettablePayloadSequence,
}

impl ForgettablePayloadMetadata {
    /// Fresh metadata for a payload just associated with an entry.
    pub fn created(
        event_stream_id: StreamId,
        event_stream_entry_id: EntryId,
        payload_id: ForgettablePayloadId,
    ) -> Self {
        let now = PayloadCreationTime::now();
        Self {
            event_stream_id,
            event_stream_entry_id,
            payload_id,
            payload_state: ForgettablePayloadState::Created,
            payload_creation_time: now,
            payload_last_modified_time: PayloadLastModifiedTime::new(now.as_datetime())
                .unwrap_or_else(|_| PayloadLastModifiedTime::now()),
            payload_sequence: ForgettablePayloadSequence::zero(),
        }
    }

    /// Rebuild metadata read back from storage.
    pub fn restore(
        event_stream_id: StreamId,
        event_stream_entry_id: EntryId,
        payload_id: ForgettablePayloadId,
        payload_state: ForgettablePayloadState,
        payload_creation_time: PayloadCreationTime,
        payload_last_modified_time: PayloadLastModifiedTime,
        payload_sequence: ForgettablePayloadSequence,
    ) -> DomainResult<Self> {
        if payload_last_modified_time.as_datetime() < payload_creation_time.as_datetime() {
            return Err(DomainError::invalid_value(format!(
                "payload {payload_id} last modified ({payload_last_modified_time}) before creation ({payload_creation_time})"
            )));
        }
        Ok(Self {
            event_stream_id,
            event_stream_entry_id,
            payload_id,
            payload_state,
            payload_creation_time,
            payload_last_modified_time,
            payload_sequence,
        })
    }

    /// Copy with a new state, `last_modified = now` and `sequence + 1`.
    ///
    /// Identity fields and the creation time are preserved. Backward
    /// transitions and any transition out of `Forgotten` are rejected.
    pub fn create_updated(&self, new_state: ForgettablePayloadState) -> DomainResult<Self> {
        if !self.payload_state.can_transition_to(new_state) {
            return Err(DomainError::invalid_operation(format!(
                "payload {} cannot move from {} to {}",
                self.payload_id, self.payload_state, new_state
            )));
        }

        let now = PayloadLastModifiedTime::now();
        let payload_last_modified_time =
            if now.as_datetime() < self.payload_last_modified_time.as_datetime() {
                self.payload_last_modified_time
            } else {
                now
            };

        Ok(Self {
            payload_state: new_state,
            payload_last_modified_time,
            payload_sequence: self.payload_sequence.next()?,
            ..self.clone()
        })
    }

    pub fn event_stream_id(&self) -> StreamId {
        self.event_stream_id
    }

    pub fn event_stream_entry_id(&self) -> EntryId {
        self.event_stream_entry_id
    }

    pub fn payload_id(&self) -> ForgettablePayloadId {
        self.payload_id
    }

    pub fn payload_state(&self) -> ForgettablePayloadState {
        self.payload_state
    }

    pub fn payload_creation_time(&self) -> PayloadCreationTime {
        self.payload_creation_time
    }

    pub fn payload_last_modified_time(&self) -> PayloadLastModifiedTime {
        self.payload_last_modified_time
    }

    pub fn payload_sequence(&self) -> ForgettablePayloadSequence {
        self.payload_sequence
    }
}

impl ValueObject for ForgettablePayloadMetadata {}

/// Wire shape of [`ForgettablePayloadMetadata`], checked through `restore`.
#[derive(Deserialize)]
struct StoredMetadata {
    event_stream_id: StreamId,
    event_stream_entry_id: EntryId,
    payload_id: ForgettablePayloadId,
    payload_state: ForgettablePayloadState,
    payload_creation_time: PayloadCreationTime,
    payload_last_modified_time: PayloadLastModifiedTime,
    payload_sequence: ForgettablePayloadSequence,
}

impl TryFrom<StoredMetadata> for ForgettablePayloadMetadata {
    type Error = DomainError;

    fn try_from(stored: StoredMetadata) -> Result<Self, Self::Error> {
        Self::restore(
            stored.event_stream_id,
            stored.event_stream_entry_id,
            stored.payload_id,
            stored.payload_state,
            stored.payload_creation_time,
            stored.payload_last_modified_time,
            stored.payload_sequence,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ForgettablePayloadState::*;

    fn fresh() -> ForgettablePayloadMetadata {
        ForgettablePayloadMetadata::created(
            StreamId::new(),
            EntryId::new(),
            ForgettablePayloadId::new(),
        )
    }

    #[test]
    fn created_metadata_starts_at_sequence_zero() {
        let metadata = fresh();
        assert_eq!(metadata.payload_state(), Created);
        assert_eq!(metadata.payload_sequence(), ForgettablePayloadSequence::zero());
        assert_eq!(
            metadata.payload_creation_time().as_datetime(),
            metadata.payload_last_modified_time().as_datetime()
        );
    }

    #[test]
    fn create_updated_preserves_identity_and_bumps_sequence() {
        let original = fresh();
        let before = chrono::Utc::now();
        let claimed = original.create_updated(CreatedAndClaimed).unwrap();
        let after = chrono::Utc::now();

        assert_eq!(claimed.event_stream_id(), original.event_stream_id());
        assert_eq!(claimed.event_stream_entry_id(), original.event_stream_entry_id());
        assert_eq!(claimed.payload_id(), original.payload_id());
        assert_eq!(claimed.payload_creation_time(), original.payload_creation_time());
        assert_eq!(claimed.payload_state(), CreatedAndClaimed);
        assert_eq!(claimed.payload_sequence().value(), 1);
        let modified = claimed.payload_last_modified_time().as_datetime();
        assert!(modified >= original.payload_last_modified_time().as_datetime());
        assert!(modified >= before && modified <= after);
        assert!(after - modified < chrono::Duration::milliseconds(50));

        let forgotten = claimed.create_updated(Forgotten).unwrap();
        assert_eq!(forgotten.payload_sequence().value(), 2);
    }

    #[test]
    fn create_updated_leaves_the_original_untouched() {
        let original = fresh();
        let _ = original.create_updated(Forgotten).unwrap();
        assert_eq!(original.payload_state(), Created);
        assert_eq!(original.payload_sequence().value(), 0);
    }

    #[test]
    fn forgotten_is_terminal() {
        let forgotten = fresh().create_updated(Forgotten).unwrap();
        for next in [Created, CreatedAndClaimed, Forgotten] {
            let err = forgotten.create_updated(next).unwrap_err();
            assert!(matches!(err, DomainError::InvalidOperation(_)));
        }
    }

    #[test]
    fn restore_rejects_modification_before_creation() {
        let created = PayloadCreationTime::parse_rfc3339("2024-05-01T10:00:00Z").unwrap();
        let modified = PayloadLastModifiedTime::parse_rfc3339("2024-05-01T09:00:00Z").unwrap();

        let err = ForgettablePayloadMetadata::restore(
            StreamId::new(),
            EntryId::new(),
            ForgettablePayloadId::new(),
            Created,
            created,
            modified,
            ForgettablePayloadSequence::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_state() -> impl Strategy<Value = ForgettablePayloadState> {
            prop_oneof![Just(Created), Just(CreatedAndClaimed), Just(Forgotten)]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// Property: each accepted update bumps the sequence by exactly one;
            /// rejected updates change nothing.
            #[test]
            fn sequence_counts_accepted_updates(requested in prop::collection::vec(any_state(), 0..8)) {
                let mut current = fresh();
                let mut accepted = 0u32;
                for next in requested {
                    match current.create_updated(next) {
                        Ok(updated) => {
                            prop_assert!(current.payload_state().can_transition_to(next));
                            prop_assert_eq!(updated.payload_id(), current.payload_id());
                            current = updated;
                            accepted += 1;
                        }
                        Err(_) => prop_assert!(!current.payload_state().can_transition_to(next)),
                    }
                }
                prop_assert_eq!(current.payload_sequence().value(), accepted);
                prop_assert!(accepted <= 2);
            }
        }
    }

    #[test]
    fn serde_keeps_every_field() {
        let metadata = fresh().create_updated(CreatedAndClaimed).unwrap();
        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"payload_state\":\"CreatedAndClaimed\""));
        let back: ForgettablePayloadMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metadata);
    }

    #[test]
    fn deserialize_rejects_modification_before_creation() {
        let mut value = serde_json::to_value(fresh()).unwrap();
        value["payload_creation_time"] = "2024-05-01T10:00:00Z".into();
        value["payload_last_modified_time"] = "2024-05-01T09:00:00Z".into();

        let err = serde_json::from_value::<ForgettablePayloadMetadata>(value).unwrap_err();
        assert!(err.to_string().contains("before creation"));
    }
}
