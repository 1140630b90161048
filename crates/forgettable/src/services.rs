//! Claiming and forgetting, the two writes a payload sees after insertion.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use streamkeep_core::{DomainError, ForgettablePayloadId, ForgettingReason, ForgettingRequestedBy};

use crate::converter::ForgettablePayloadContentConverter;
use crate::descriptor::ForgettablePayloadDescriptor;
use crate::error::ForgettablePayloadError;
use crate::forgotten::ForgottenPayload;
use crate::metadata::ForgettablePayloadMetadata;
use crate::state::ForgettablePayloadState;
use crate::store::{ForgettablePayloadDescriptorLoader, ForgettablePayloadStorageWriter};

#[async_trait]
pub trait ForgettablePayloadClaimingService: Send + Sync {
    /// Move a stored payload to `CreatedAndClaimed`.
    ///
    /// Claiming an already-claimed payload returns its metadata unchanged.
    async fn claim(
        &self,
        payload_id: ForgettablePayloadId,
    ) -> Result<ForgettablePayloadMetadata, ForgettablePayloadError>;
}

#[async_trait]
pub trait ForgettablePayloadForgettingService: Send + Sync {
    /// Replace a payload's content with a [`ForgottenPayload`] marker.
    ///
    /// Forgetting an already-forgotten payload returns the stored descriptor.
    async fn forget(
        &self,
        payload_id: ForgettablePayloadId,
        reason: ForgettingReason,
        requested_by: ForgettingRequestedBy,
    ) -> Result<ForgettablePayloadDescriptor, ForgettablePayloadError>;

    /// Forget only if the payload is still `Created`; `None` when it is not.
    async fn forget_unclaimed(
        &self,
        payload_id: ForgettablePayloadId,
        reason: ForgettingReason,
        requested_by: ForgettingRequestedBy,
    ) -> Result<Option<ForgettablePayloadDescriptor>, ForgettablePayloadError>;
}

async fn load_existing<S>(
    store: &S,
    payload_id: ForgettablePayloadId,
) -> Result<ForgettablePayloadDescriptor, ForgettablePayloadError>
where
    S: ForgettablePayloadDescriptorLoader + ?Sized,
{
    store
        .load(payload_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("forgettable payload {payload_id}")).into())
}

/// Claiming service on top of a payload store.
#[derive(Debug)]
pub struct StoreClaimingService<S> {
    store: Arc<S>,
}

impl<S> StoreClaimingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> ForgettablePayloadClaimingService for StoreClaimingService<S>
where
    S: ForgettablePayloadStorageWriter + ForgettablePayloadDescriptorLoader + 'static,
{
    async fn claim(
        &self,
        payload_id: ForgettablePayloadId,
    ) -> Result<ForgettablePayloadMetadata, ForgettablePayloadError> {
        let stored = load_existing(self.store.as_ref(), payload_id).await?;
        let metadata = stored.metadata();

        match metadata.payload_state() {
            ForgettablePayloadState::CreatedAndClaimed => {
                debug!(payload_id = %payload_id, "payload already claimed");
                Ok(metadata.clone())
            }
            ForgettablePayloadState::Forgotten => Err(DomainError::invalid_operation(format!(
                "payload {payload_id} is forgotten and cannot be claimed"
            ))
            .into()),
            ForgettablePayloadState::Created => {
                let claimed = metadata.create_updated(ForgettablePayloadState::CreatedAndClaimed)?;
                self.store.update_metadata(&claimed).await?;
                info!(
                    payload_id = %payload_id,
                    stream_id = %claimed.event_stream_id(),
                    sequence = %claimed.payload_sequence(),
                    "payload claimed"
                );
                Ok(claimed)
            }
        }
    }
}

/// Forgetting service on top of a payload store.
#[derive(Debug)]
pub struct StoreForgettingService<S> {
    store: Arc<S>,
}

impl<S> StoreForgettingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> StoreForgettingService<S>
where
    S: ForgettablePayloadStorageWriter + ForgettablePayloadDescriptorLoader + 'static,
{
    async fn replace_with_marker(
        &self,
        stored: &ForgettablePayloadDescriptor,
        reason: ForgettingReason,
        requested_by: ForgettingRequestedBy,
    ) -> Result<ForgettablePayloadDescriptor, ForgettablePayloadError> {
        let marker = ForgottenPayload::new(reason, requested_by);
        let metadata = stored
            .metadata()
            .create_updated(ForgettablePayloadState::Forgotten)?;
        let forgotten = ForgettablePayloadDescriptor::new(metadata, marker.to_content_descriptor()?);

        self.store
            .replace_content_with_forgotten_marker(&forgotten)
            .await?;

        info!(
            payload_id = %forgotten.metadata().payload_id(),
            stream_id = %forgotten.metadata().event_stream_id(),
            requested_by = %marker.forgetting_requested_by(),
            reason = %marker.forgetting_reason(),
            "payload forgotten"
        );
        Ok(forgotten)
    }
}

#[async_trait]
impl<S> ForgettablePayloadForgettingService for StoreForgettingService<S>
where
    S: ForgettablePayloadStorageWriter + ForgettablePayloadDescriptorLoader + 'static,
{
    async fn forget(
        &self,
        payload_id: ForgettablePayloadId,
        reason: ForgettingReason,
        requested_by: ForgettingRequestedBy,
    ) -> Result<ForgettablePayloadDescriptor, ForgettablePayloadError> {
        let stored = load_existing(self.store.as_ref(), payload_id).await?;
        if stored.metadata().payload_state().is_terminal() {
            debug!(payload_id = %payload_id, "payload already forgotten");
            return Ok(stored);
        }
        self.replace_with_marker(&stored, reason, requested_by).await
    }

    async fn forget_unclaimed(
        &self,
        payload_id: ForgettablePayloadId,
        reason: ForgettingReason,
        requested_by: ForgettingRequestedBy,
    ) -> Result<Option<ForgettablePayloadDescriptor>, ForgettablePayloadError> {
        let stored = load_existing(self.store.as_ref(), payload_id).await?;
        if stored.metadata().payload_state() != ForgettablePayloadState::Created {
            return Ok(None);
        }
        self.replace_with_marker(&stored, reason, requested_by)
            .await
            .map(Some)
    }
}

/// The collaborators a deserialized payload handle needs to reach its content.
pub struct ForgettablePayloadServices<T> {
    pub loader: Arc<dyn ForgettablePayloadDescriptorLoader>,
    pub forgetting: Arc<dyn ForgettablePayloadForgettingService>,
    pub claiming: Arc<dyn ForgettablePayloadClaimingService>,
    pub converter: Arc<dyn ForgettablePayloadContentConverter<T>>,
}

impl<T> Clone for ForgettablePayloadServices<T> {
    fn clone(&self) -> Self {
        Self {
            loader: Arc::clone(&self.loader),
            forgetting: Arc::clone(&self.forgetting),
            claiming: Arc::clone(&self.claiming),
            converter: Arc::clone(&self.converter),
        }
    }
}

/// The untyped part of [`ForgettablePayloadServices`], shared by every payload type.
#[derive(Clone)]
pub struct ForgettablePayloadCollaborators {
    pub loader: Arc<dyn ForgettablePayloadDescriptorLoader>,
    pub forgetting: Arc<dyn ForgettablePayloadForgettingService>,
    pub claiming: Arc<dyn ForgettablePayloadClaimingService>,
}

impl ForgettablePayloadCollaborators {
    /// Loader, claiming and forgetting all backed by the same store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ForgettablePayloadStorageWriter + ForgettablePayloadDescriptorLoader + 'static,
    {
        Self {
            loader: store.clone(),
            forgetting: Arc::new(StoreForgettingService::new(store.clone())),
            claiming: Arc::new(StoreClaimingService::new(store)),
        }
    }

    pub fn with_converter<T>(
        &self,
        converter: Arc<dyn ForgettablePayloadContentConverter<T>>,
    ) -> ForgettablePayloadServices<T> {
        ForgettablePayloadServices {
            loader: Arc::clone(&self.loader),
            forgetting: Arc::clone(&self.forgetting),
            claiming: Arc::clone(&self.claiming),
            converter,
        }
    }
}
