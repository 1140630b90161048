use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use streamkeep_core::{ForgettablePayloadId, ForgettablePayloadSequence, PayloadCreationTime};

use crate::descriptor::ForgettablePayloadDescriptor;
use crate::error::PayloadStoreError;
use crate::metadata::ForgettablePayloadMetadata;
use crate::state::ForgettablePayloadState;
use crate::store::{
    ForgettablePayloadDescriptorLoader, ForgettablePayloadStorageWriter, UnclaimedPayloadQuery,
};

/// In-memory payload store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryForgettablePayloadStore {
    payloads: RwLock<HashMap<ForgettablePayloadId, ForgettablePayloadDescriptor>>,
}

impl InMemoryForgettablePayloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.payloads.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> PayloadStoreError {
        PayloadStoreError::Backend("lock poisoned".to_string())
    }

    fn check_successor(
        stored: &ForgettablePayloadMetadata,
        next: &ForgettablePayloadMetadata,
    ) -> Result<(), PayloadStoreError> {
        let actual = stored.payload_sequence();
        let based_on = next.payload_sequence().value().checked_sub(1);
        if based_on != Some(actual.value()) {
            return Err(PayloadStoreError::Conflict {
                payload_id: next.payload_id(),
                expected: ForgettablePayloadSequence::new(based_on.unwrap_or(0)),
                actual,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ForgettablePayloadStorageWriter for InMemoryForgettablePayloadStore {
    async fn insert(&self, descriptor: &ForgettablePayloadDescriptor) -> Result<(), PayloadStoreError> {
        let payload_id = descriptor.metadata().payload_id();
        let mut payloads = self.payloads.write().map_err(|_| Self::poisoned())?;
        if payloads.contains_key(&payload_id) {
            return Err(PayloadStoreError::DuplicatePayload(payload_id));
        }
        payloads.insert(payload_id, descriptor.clone());
        Ok(())
    }

    async fn update_metadata(&self, metadata: &ForgettablePayloadMetadata) -> Result<(), PayloadStoreError> {
        let payload_id = metadata.payload_id();
        let mut payloads = self.payloads.write().map_err(|_| Self::poisoned())?;
        let stored = payloads
            .get_mut(&payload_id)
            .ok_or(PayloadStoreError::NotFound(payload_id))?;

        Self::check_successor(stored.metadata(), metadata)?;
        *stored = stored.with_metadata(metadata.clone());
        Ok(())
    }

    async fn replace_content_with_forgotten_marker(
        &self,
        forgotten: &ForgettablePayloadDescriptor,
    ) -> Result<(), PayloadStoreError> {
        let payload_id = forgotten.metadata().payload_id();
        let mut payloads = self.payloads.write().map_err(|_| Self::poisoned())?;
        let stored = payloads
            .get_mut(&payload_id)
            .ok_or(PayloadStoreError::NotFound(payload_id))?;

        Self::check_successor(stored.metadata(), forgotten.metadata())?;
        *stored = forgotten.clone();
        Ok(())
    }
}

#[async_trait]
impl ForgettablePayloadDescriptorLoader for InMemoryForgettablePayloadStore {
    async fn load(
        &self,
        payload_id: ForgettablePayloadId,
    ) -> Result<Option<ForgettablePayloadDescriptor>, PayloadStoreError> {
        let payloads = self.payloads.read().map_err(|_| Self::poisoned())?;
        Ok(payloads.get(&payload_id).cloned())
    }
}

#[async_trait]
impl UnclaimedPayloadQuery for InMemoryForgettablePayloadStore {
    async fn find_unclaimed_created_before(
        &self,
        cutoff: PayloadCreationTime,
    ) -> Result<Vec<ForgettablePayloadMetadata>, PayloadStoreError> {
        let payloads = self.payloads.read().map_err(|_| Self::poisoned())?;
        let mut unclaimed: Vec<_> = payloads
            .values()
            .map(ForgettablePayloadDescriptor::metadata)
            .filter(|m| m.payload_state() == ForgettablePayloadState::Created)
            .filter(|m| m.payload_creation_time() < cutoff)
            .cloned()
            .collect();
        unclaimed.sort_by_key(|m| m.payload_creation_time());
        Ok(unclaimed)
    }
}
