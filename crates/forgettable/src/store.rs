//! Storage collaborator contracts for forgettable payloads.

use async_trait::async_trait;

use streamkeep_core::{ForgettablePayloadId, PayloadCreationTime};

use crate::descriptor::ForgettablePayloadDescriptor;
use crate::error::PayloadStoreError;
use crate::metadata::ForgettablePayloadMetadata;

#[async_trait]
pub trait ForgettablePayloadStorageWriter: Send + Sync {
    /// Store a new payload. A second insert with the same id is a
    /// [`PayloadStoreError::DuplicatePayload`].
    async fn insert(&self, descriptor: &ForgettablePayloadDescriptor) -> Result<(), PayloadStoreError>;

    /// Replace the stored metadata, keeping the content.
    ///
    /// The stored sequence must be exactly one below `metadata`'s sequence,
    /// else the write is rejected with [`PayloadStoreError::Conflict`].
    async fn update_metadata(&self, metadata: &ForgettablePayloadMetadata) -> Result<(), PayloadStoreError>;

    /// Replace metadata and content with a forgotten marker in one write,
    /// under the same optimistic check as [`update_metadata`](Self::update_metadata).
    async fn replace_content_with_forgotten_marker(
        &self,
        forgotten: &ForgettablePayloadDescriptor,
    ) -> Result<(), PayloadStoreError>;
}

#[async_trait]
pub trait ForgettablePayloadDescriptorLoader: Send + Sync {
    async fn load(
        &self,
        payload_id: ForgettablePayloadId,
    ) -> Result<Option<ForgettablePayloadDescriptor>, PayloadStoreError>;
}

#[async_trait]
pub trait UnclaimedPayloadQuery: Send + Sync {
    /// Metadata of payloads still `Created` whose creation time is before `cutoff`.
    async fn find_unclaimed_created_before(
        &self,
        cutoff: PayloadCreationTime,
    ) -> Result<Vec<ForgettablePayloadMetadata>, PayloadStoreError>;
}
