//! Pipeline hooks that drive the payload lifecycle around publication.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use streamkeep_core::{CancellationFlag, EntryId, StreamId};
use streamkeep_events::{
    EventWithMetadata, HookError, PostDeserializationHook, PostPublishHook, PrePublishHook,
};

use crate::error::{ForgettablePayloadError, PayloadStoreError};
use crate::finder::ForgettablePayloadFinder;
use crate::payload::ForgettablePayloadHandle;
use crate::services::{ForgettablePayloadClaimingService, ForgettablePayloadCollaborators};
use crate::store::ForgettablePayloadStorageWriter;

/// Stores every payload attached to an event before the event goes durable.
///
/// Stores run concurrently; the hook completes once all of them have
/// completed or failed. After cancellation no new insert is issued.
pub struct ForgettablePayloadPrePublishHook<E> {
    finder: Arc<dyn ForgettablePayloadFinder<E>>,
    writer: Arc<dyn ForgettablePayloadStorageWriter>,
}

impl<E> ForgettablePayloadPrePublishHook<E> {
    pub fn new(
        finder: Arc<dyn ForgettablePayloadFinder<E>>,
        writer: Arc<dyn ForgettablePayloadStorageWriter>,
    ) -> Self {
        Self { finder, writer }
    }

    async fn store(
        &self,
        handle: &dyn ForgettablePayloadHandle,
        stream_id: StreamId,
        entry_id: EntryId,
        cancellation: &CancellationFlag,
    ) -> Result<(), ForgettablePayloadError> {
        if cancellation.is_cancelled() {
            return Err(ForgettablePayloadError::Cancelled);
        }
        let Some(descriptor) =
            handle.try_create_metadata_for_event_stream_id_and_entry_id(stream_id, entry_id)?
        else {
            return Ok(());
        };

        let outcome = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(ForgettablePayloadError::Cancelled),
            inserted = self.writer.insert(&descriptor) => match inserted {
                Ok(()) => Ok(()),
                Err(PayloadStoreError::DuplicatePayload(payload_id)) => {
                    debug!(payload_id = %payload_id, "payload was stored by an earlier attempt");
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
        };

        if outcome.is_err() {
            handle.release_unstored_metadata(descriptor.metadata());
        } else {
            debug!(
                payload_id = %descriptor.metadata().payload_id(),
                stream_id = %stream_id,
                entry_id = %entry_id,
                "payload stored"
            );
        }
        outcome
    }
}

#[async_trait]
impl<E> PrePublishHook<E> for ForgettablePayloadPrePublishHook<E>
where
    E: Send + Sync + 'static,
{
    async fn before_publish(
        &self,
        event: &EventWithMetadata<E>,
        cancellation: &CancellationFlag,
    ) -> Result<(), HookError> {
        if cancellation.is_cancelled() {
            return Err(HookError::Cancelled);
        }
        let handles = self.finder.find(event.event());
        if handles.is_empty() {
            return Ok(());
        }

        let (stream_id, entry_id) = (event.stream_id(), event.entry_id());
        let outcomes = join_all(
            handles
                .iter()
                .map(|h| self.store(h.as_ref(), stream_id, entry_id, cancellation)),
        )
        .await;

        if cancellation.is_cancelled() {
            return Err(HookError::Cancelled);
        }
        let failures: Vec<HookError> = outcomes
            .into_iter()
            .filter_map(Result::err)
            .map(HookError::from)
            .collect();
        match HookError::from_failures(failures) {
            None => Ok(()),
            Some(err) => {
                warn!(stream_id = %stream_id, entry_id = %entry_id, error = %err, "payload store failed");
                Err(err)
            }
        }
    }
}

/// Claims every payload attached to an event once the event is published.
pub struct ForgettablePayloadClaimingHook<E> {
    finder: Arc<dyn ForgettablePayloadFinder<E>>,
    claiming: Arc<dyn ForgettablePayloadClaimingService>,
}

impl<E> ForgettablePayloadClaimingHook<E> {
    pub fn new(
        finder: Arc<dyn ForgettablePayloadFinder<E>>,
        claiming: Arc<dyn ForgettablePayloadClaimingService>,
    ) -> Self {
        Self { finder, claiming }
    }

    async fn claim(&self, handle: &dyn ForgettablePayloadHandle) -> Result<(), ForgettablePayloadError> {
        let metadata = self.claiming.claim(handle.payload_id()).await?;
        handle.record_metadata(metadata)?;
        Ok(())
    }
}

#[async_trait]
impl<E> PostPublishHook<E> for ForgettablePayloadClaimingHook<E>
where
    E: Send + Sync + 'static,
{
    async fn after_publish(&self, event: &EventWithMetadata<E>) -> Result<(), HookError> {
        let handles = self.finder.find(event.event());
        let outcomes = join_all(handles.iter().map(|h| self.claim(h.as_ref()))).await;

        let failures = outcomes
            .into_iter()
            .filter_map(Result::err)
            .map(HookError::from)
            .collect();
        HookError::from_failures(failures).map_or(Ok(()), Err)
    }
}

/// Reattaches storage collaborators to payload placeholders of a decoded event.
pub struct ForgettablePayloadPostDeserializationHook<E> {
    finder: Arc<dyn ForgettablePayloadFinder<E>>,
    collaborators: ForgettablePayloadCollaborators,
}

impl<E> ForgettablePayloadPostDeserializationHook<E> {
    pub fn new(
        finder: Arc<dyn ForgettablePayloadFinder<E>>,
        collaborators: ForgettablePayloadCollaborators,
    ) -> Self {
        Self {
            finder,
            collaborators,
        }
    }
}

impl<E> PostDeserializationHook<E> for ForgettablePayloadPostDeserializationHook<E> {
    fn after_deserialization(&self, event: &E) -> Result<(), HookError> {
        for handle in self.finder.find(event) {
            handle.assign_collaborators(&self.collaborators)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use streamkeep_core::{CausationId, CorrelationId, CreationTime, EntrySequence};
    use streamkeep_events::EventMetadata;

    use crate::descriptor::ForgettablePayloadDescriptor;
    use crate::memory::InMemoryForgettablePayloadStore;
    use crate::metadata::ForgettablePayloadMetadata;
    use crate::payload::PayloadContent;
    use crate::state::ForgettablePayloadState;
    use crate::store::ForgettablePayloadDescriptorLoader;
    use crate::test_support::{CustomerRegistered, customer_finder, registered};

    fn with_metadata(event: CustomerRegistered) -> EventWithMetadata<CustomerRegistered> {
        EventWithMetadata::new(
            event,
            EventMetadata {
                stream_id: StreamId::new(),
                entry_id: EntryId::new(),
                sequence: EntrySequence::zero(),
                causation_id: CausationId::new(),
                correlation_id: CorrelationId::new(),
                creation_time: CreationTime::now(),
            },
        )
    }

    /// Writer that fails every insert.
    struct FailingWriter;

    #[async_trait]
    impl ForgettablePayloadStorageWriter for FailingWriter {
        async fn insert(&self, _: &ForgettablePayloadDescriptor) -> Result<(), PayloadStoreError> {
            Err(PayloadStoreError::Backend("disk full".to_string()))
        }

        async fn update_metadata(&self, _: &ForgettablePayloadMetadata) -> Result<(), PayloadStoreError> {
            Ok(())
        }

        async fn replace_content_with_forgotten_marker(
            &self,
            _: &ForgettablePayloadDescriptor,
        ) -> Result<(), PayloadStoreError> {
            Ok(())
        }
    }

    /// Writer whose inserts never complete.
    struct StalledWriter;

    #[async_trait]
    impl ForgettablePayloadStorageWriter for StalledWriter {
        async fn insert(&self, _: &ForgettablePayloadDescriptor) -> Result<(), PayloadStoreError> {
            std::future::pending().await
        }

        async fn update_metadata(&self, _: &ForgettablePayloadMetadata) -> Result<(), PayloadStoreError> {
            Ok(())
        }

        async fn replace_content_with_forgotten_marker(
            &self,
            _: &ForgettablePayloadDescriptor,
        ) -> Result<(), PayloadStoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn stores_every_attached_payload_in_created_state() {
        let store = Arc::new(InMemoryForgettablePayloadStore::new());
        let hook = ForgettablePayloadPrePublishHook::new(customer_finder(), store.clone());
        let event = with_metadata(registered());

        hook.before_publish(&event, &CancellationFlag::new()).await.unwrap();

        for payload_id in [
            event.event().contact.payload_id(),
            event.event().address.payload_id(),
        ] {
            let stored = store.load(payload_id).await.unwrap().unwrap();
            assert_eq!(stored.metadata().payload_state(), ForgettablePayloadState::Created);
            assert_eq!(stored.metadata().event_stream_id(), event.stream_id());
            assert_eq!(stored.metadata().event_stream_entry_id(), event.entry_id());
        }
    }

    #[tokio::test]
    async fn retried_publish_does_not_insert_twice() {
        let store = Arc::new(InMemoryForgettablePayloadStore::new());
        let hook = ForgettablePayloadPrePublishHook::new(customer_finder(), store.clone());
        let event = with_metadata(registered());

        hook.before_publish(&event, &CancellationFlag::new()).await.unwrap();
        hook.before_publish(&event, &CancellationFlag::new()).await.unwrap();

        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn every_store_failure_is_reported() {
        let hook = ForgettablePayloadPrePublishHook::new(customer_finder(), Arc::new(FailingWriter));
        let event = with_metadata(registered());

        let err = hook
            .before_publish(&event, &CancellationFlag::new())
            .await
            .unwrap_err();
        match err {
            HookError::Aggregate(failures) => {
                assert_eq!(failures.len(), 2);
                assert!(failures.iter().all(|f| matches!(f, HookError::Failed(_))));
            }
            other => panic!("expected aggregate failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_store_can_be_retried() {
        let event = with_metadata(registered());
        let failing = ForgettablePayloadPrePublishHook::new(customer_finder(), Arc::new(FailingWriter));
        assert!(failing.before_publish(&event, &CancellationFlag::new()).await.is_err());

        let store = Arc::new(InMemoryForgettablePayloadStore::new());
        let hook = ForgettablePayloadPrePublishHook::new(customer_finder(), store.clone());
        hook.before_publish(&event, &CancellationFlag::new()).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn cancelled_before_start_issues_no_io() {
        let store = Arc::new(InMemoryForgettablePayloadStore::new());
        let hook = ForgettablePayloadPrePublishHook::new(customer_finder(), store.clone());
        let cancellation = CancellationFlag::new();
        cancellation.cancel();

        let err = hook
            .before_publish(&with_metadata(registered()), &cancellation)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn cancellation_interrupts_pending_stores() {
        let hook = Arc::new(ForgettablePayloadPrePublishHook::new(
            customer_finder(),
            Arc::new(StalledWriter),
        ));
        let cancellation = CancellationFlag::new();

        let task = {
            let hook = hook.clone();
            let cancellation = cancellation.clone();
            tokio::spawn(async move {
                hook.before_publish(&with_metadata(registered()), &cancellation)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancellation.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn claiming_hook_claims_stored_payloads() {
        let store = Arc::new(InMemoryForgettablePayloadStore::new());
        let collaborators = ForgettablePayloadCollaborators::from_store(store.clone());
        let pre = ForgettablePayloadPrePublishHook::new(customer_finder(), store.clone());
        let post = ForgettablePayloadClaimingHook::new(customer_finder(), collaborators.claiming);
        let event = with_metadata(registered());

        pre.before_publish(&event, &CancellationFlag::new()).await.unwrap();
        post.after_publish(&event).await.unwrap();

        let contact = &event.event().contact;
        let stored = store.load(contact.payload_id()).await.unwrap().unwrap();
        assert_eq!(stored.metadata().payload_state(), ForgettablePayloadState::CreatedAndClaimed);
        assert_eq!(contact.metadata().unwrap(), stored.to_metadata());
    }

    #[tokio::test]
    async fn claiming_an_unstored_payload_fails() {
        let store = Arc::new(InMemoryForgettablePayloadStore::new());
        let collaborators = ForgettablePayloadCollaborators::from_store(store);
        let post = ForgettablePayloadClaimingHook::new(customer_finder(), collaborators.claiming);

        let err = post.after_publish(&with_metadata(registered())).await.unwrap_err();
        assert!(matches!(err, HookError::Aggregate(ref f) if f.len() == 2));
    }

    #[tokio::test]
    async fn post_deserialization_hook_rehydrates_placeholders() {
        let store = Arc::new(InMemoryForgettablePayloadStore::new());
        let collaborators = ForgettablePayloadCollaborators::from_store(store.clone());
        let pre = ForgettablePayloadPrePublishHook::new(customer_finder(), store.clone());
        let event = with_metadata(registered());
        pre.before_publish(&event, &CancellationFlag::new()).await.unwrap();

        let json = serde_json::to_string(event.event()).unwrap();
        let decoded: CustomerRegistered = serde_json::from_str(&json).unwrap();
        assert!(!decoded.contact.has_services());

        ForgettablePayloadPostDeserializationHook::new(customer_finder(), collaborators)
            .after_deserialization(&decoded)
            .unwrap();

        assert!(decoded.contact.has_services());
        assert!(matches!(
            decoded.contact.get_payload().await.unwrap(),
            PayloadContent::Available(c) if c.email == "ada@example.com"
        ));
    }
}
