//! The in-event handle to a forgettable payload.
//!
//! An event carries a `ForgettablePayload<T>`; only its id is serialized into
//! the event content. The handle is created in-process with its content,
//! associated with the owning entry by the pre-publish hook, and after
//! deserialization becomes a placeholder until services are assigned.
//!
//! Clones share one underlying state, so a payload reused across a retried
//! publish is recognized as the same instance.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use streamkeep_core::{
    DomainError, DomainResult, EntryId, ForgettablePayloadId, ForgettingReason,
    ForgettingRequestedBy, StreamId,
};

use crate::converter::ForgettablePayloadContentConverter;
use crate::descriptor::ForgettablePayloadDescriptor;
use crate::error::ForgettablePayloadError;
use crate::forgotten::ForgottenPayload;
use crate::metadata::ForgettablePayloadMetadata;
use crate::services::{ForgettablePayloadCollaborators, ForgettablePayloadServices};
use crate::state::ForgettablePayloadState;

/// What a payload resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadContent<T> {
    Available(T),
    Forgotten(ForgottenPayload),
}

impl<T> PayloadContent<T> {
    pub fn available(self) -> Option<T> {
        match self {
            PayloadContent::Available(value) => Some(value),
            PayloadContent::Forgotten(_) => None,
        }
    }

    pub fn is_forgotten(&self) -> bool {
        matches!(self, PayloadContent::Forgotten(_))
    }
}

struct PayloadState<T> {
    metadata: Option<ForgettablePayloadMetadata>,
    content: Option<T>,
    forgotten: Option<ForgottenPayload>,
    services: Option<ForgettablePayloadServices<T>>,
}

pub struct ForgettablePayload<T> {
    payload_id: ForgettablePayloadId,
    state: Arc<Mutex<PayloadState<T>>>,
}

impl<T> ForgettablePayload<T> {
    /// A new in-process payload, not yet associated with any entry.
    pub fn create(payload: T) -> Self {
        Self::with_state(
            ForgettablePayloadId::new(),
            PayloadState {
                metadata: None,
                content: Some(payload),
                forgotten: None,
                services: None,
            },
        )
    }

    /// A deserialized reference with no content and no services.
    pub fn placeholder(payload_id: ForgettablePayloadId) -> Self {
        Self::with_state(
            payload_id,
            PayloadState {
                metadata: None,
                content: None,
                forgotten: None,
                services: None,
            },
        )
    }

    fn with_state(payload_id: ForgettablePayloadId, state: PayloadState<T>) -> Self {
        Self {
            payload_id,
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, PayloadState<T>>> {
        self.state.lock().map_err(|_| {
            DomainError::invalid_operation(format!(
                "payload {} state lock poisoned",
                self.payload_id
            ))
        })
    }

    pub fn payload_id(&self) -> ForgettablePayloadId {
        self.payload_id
    }

    /// The last metadata this handle saw, if it was ever associated or loaded.
    pub fn metadata(&self) -> Option<ForgettablePayloadMetadata> {
        self.lock().ok().and_then(|s| s.metadata.clone())
    }

    pub fn is_placeholder(&self) -> bool {
        self.lock()
            .map(|s| s.content.is_none() && s.forgotten.is_none() && s.metadata.is_none())
            .unwrap_or(false)
    }

    pub fn has_services(&self) -> bool {
        self.lock().map(|s| s.services.is_some()).unwrap_or(false)
    }

    /// Associate the payload with its owning entry.
    ///
    /// The first call returns the descriptor to insert (state `Created`,
    /// sequence 0). Later calls on the same instance return `None` so a
    /// retried publish does not insert twice.
    pub fn try_create_metadata_for_event_stream_id_and_entry_id(
        &self,
        event_stream_id: StreamId,
        event_stream_entry_id: EntryId,
        converter: &dyn ForgettablePayloadContentConverter<T>,
    ) -> DomainResult<Option<ForgettablePayloadDescriptor>> {
        let mut state = self.lock()?;
        if state.metadata.is_some() {
            debug!(payload_id = %self.payload_id, "payload already associated");
            return Ok(None);
        }
        let Some(content) = state.content.as_ref() else {
            return Err(DomainError::invalid_operation(format!(
                "payload {} has no in-process content to store",
                self.payload_id
            )));
        };

        let content = converter.to_content_descriptor(content).map_err(|e| {
            DomainError::invalid_operation(format!(
                "content conversion of payload {} failed: {e}",
                self.payload_id
            ))
        })?;
        let metadata = ForgettablePayloadMetadata::created(
            event_stream_id,
            event_stream_entry_id,
            self.payload_id,
        );
        state.metadata = Some(metadata.clone());
        Ok(Some(ForgettablePayloadDescriptor::new(metadata, content)))
    }

    /// Undo an association whose descriptor never reached storage.
    ///
    /// Only clears the association if it is still the given one.
    pub fn release_unstored_metadata(&self, metadata: &ForgettablePayloadMetadata) {
        if let Ok(mut state) = self.lock() {
            if state.metadata.as_ref() == Some(metadata) {
                state.metadata = None;
            }
        }
    }

    /// Record metadata returned by a lifecycle write.
    pub fn record_metadata(&self, metadata: ForgettablePayloadMetadata) -> DomainResult<()> {
        if metadata.payload_id() != self.payload_id {
            return Err(DomainError::invalid_argument(format!(
                "metadata of payload {} recorded on payload {}",
                metadata.payload_id(),
                self.payload_id
            )));
        }
        self.lock()?.metadata = Some(metadata);
        Ok(())
    }

    pub fn assign_services(&self, services: ForgettablePayloadServices<T>) -> DomainResult<()> {
        self.lock()?.services = Some(services);
        Ok(())
    }

    fn services(&self) -> DomainResult<ForgettablePayloadServices<T>> {
        self.lock()?.services.clone().ok_or_else(|| {
            DomainError::invalid_operation(format!(
                "payload {} has no services assigned",
                self.payload_id
            ))
        })
    }

    /// Claim through the assigned claiming service.
    pub async fn claim(&self) -> Result<ForgettablePayloadMetadata, ForgettablePayloadError> {
        let services = self.services()?;
        let metadata = services.claiming.claim(self.payload_id).await?;
        self.record_metadata(metadata.clone())?;
        Ok(metadata)
    }

    /// Forget through the assigned forgetting service and drop cached content.
    pub async fn forget(
        &self,
        reason: ForgettingReason,
        requested_by: ForgettingRequestedBy,
    ) -> Result<ForgottenPayload, ForgettablePayloadError> {
        let services = self.services()?;
        let descriptor = services
            .forgetting
            .forget(self.payload_id, reason, requested_by)
            .await?;
        let marker = ForgottenPayload::from_content_descriptor(descriptor.content())?;

        let mut state = self.lock()?;
        state.metadata = Some(descriptor.to_metadata());
        state.content = None;
        state.forgotten = Some(marker.clone());
        Ok(marker)
    }
}

impl<T: Clone> ForgettablePayload<T> {
    /// The payload content, loading it through the assigned services when
    /// nothing is cached.
    pub async fn get_payload(&self) -> Result<PayloadContent<T>, ForgettablePayloadError> {
        {
            let state = self.lock()?;
            if let Some(marker) = &state.forgotten {
                return Ok(PayloadContent::Forgotten(marker.clone()));
            }
            if let Some(content) = &state.content {
                return Ok(PayloadContent::Available(content.clone()));
            }
        }

        let services = self.services()?;
        let descriptor = services.loader.load(self.payload_id).await?.ok_or_else(|| {
            DomainError::not_found(format!("forgettable payload {}", self.payload_id))
        })?;

        let mut state = self.lock()?;
        state.metadata = Some(descriptor.to_metadata());
        if descriptor.metadata().payload_state() == ForgettablePayloadState::Forgotten {
            let marker = ForgottenPayload::from_content_descriptor(descriptor.content())?;
            state.forgotten = Some(marker.clone());
            return Ok(PayloadContent::Forgotten(marker));
        }

        let content = services.converter.from_content_descriptor(descriptor.content())?;
        state.content = Some(content.clone());
        Ok(PayloadContent::Available(content))
    }
}

impl<T> Clone for ForgettablePayload<T> {
    fn clone(&self) -> Self {
        Self {
            payload_id: self.payload_id,
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> PartialEq for ForgettablePayload<T> {
    fn eq(&self, other: &Self) -> bool {
        self.payload_id == other.payload_id
    }
}

impl<T> Eq for ForgettablePayload<T> {}

impl<T> core::fmt::Debug for ForgettablePayload<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self
            .lock()
            .ok()
            .and_then(|s| s.metadata.as_ref().map(|m| m.payload_state()));
        f.debug_struct("ForgettablePayload")
            .field("payload_id", &self.payload_id)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize, Deserialize)]
struct PayloadReference {
    payload_id: ForgettablePayloadId,
}

impl<T> Serialize for ForgettablePayload<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PayloadReference {
            payload_id: self.payload_id,
        }
        .serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for ForgettablePayload<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let reference = PayloadReference::deserialize(deserializer)?;
        Ok(Self::placeholder(reference.payload_id))
    }
}

/// Type-erased view of a payload, as returned by a finder.
///
/// Binds a [`ForgettablePayload<T>`] to the converter for its `T`, so hooks can
/// store and rehydrate payloads of any type attached to one event.
pub trait ForgettablePayloadHandle: Send + Sync {
    fn payload_id(&self) -> ForgettablePayloadId;

    fn try_create_metadata_for_event_stream_id_and_entry_id(
        &self,
        event_stream_id: StreamId,
        event_stream_entry_id: EntryId,
    ) -> DomainResult<Option<ForgettablePayloadDescriptor>>;

    fn release_unstored_metadata(&self, metadata: &ForgettablePayloadMetadata);

    fn record_metadata(&self, metadata: ForgettablePayloadMetadata) -> DomainResult<()>;

    fn assign_collaborators(&self, collaborators: &ForgettablePayloadCollaborators) -> DomainResult<()>;
}

struct ConvertingHandle<T> {
    payload: ForgettablePayload<T>,
    converter: Arc<dyn ForgettablePayloadContentConverter<T>>,
}

impl<T> ForgettablePayload<T>
where
    T: Send + 'static,
{
    pub fn handle(
        &self,
        converter: Arc<dyn ForgettablePayloadContentConverter<T>>,
    ) -> Box<dyn ForgettablePayloadHandle> {
        Box::new(ConvertingHandle {
            payload: self.clone(),
            converter,
        })
    }
}

impl<T> ForgettablePayloadHandle for ConvertingHandle<T>
where
    T: Send + 'static,
{
    fn payload_id(&self) -> ForgettablePayloadId {
        self.payload.payload_id()
    }

    fn try_create_metadata_for_event_stream_id_and_entry_id(
        &self,
        event_stream_id: StreamId,
        event_stream_entry_id: EntryId,
    ) -> DomainResult<Option<ForgettablePayloadDescriptor>> {
        self.payload.try_create_metadata_for_event_stream_id_and_entry_id(
            event_stream_id,
            event_stream_entry_id,
            self.converter.as_ref(),
        )
    }

    fn release_unstored_metadata(&self, metadata: &ForgettablePayloadMetadata) {
        self.payload.release_unstored_metadata(metadata);
    }

    fn record_metadata(&self, metadata: ForgettablePayloadMetadata) -> DomainResult<()> {
        self.payload.record_metadata(metadata)
    }

    fn assign_collaborators(&self, collaborators: &ForgettablePayloadCollaborators) -> DomainResult<()> {
        self.payload
            .assign_services(collaborators.with_converter(Arc::clone(&self.converter)))
    }
}
