//! Commit and read pipeline for event streams.
//!
//! The `EventStreamPipeline` composes an [`EventStreamWriter`], an
//! [`EntryPublisher`], an [`EventCodec`] and the registered hooks.
//!
//! ## Commit Flow
//!
//! ```text
//! typed events + causal context
//!   ↓
//! 1. Encode and stamp entries (sequence, causation/correlation ids, time)
//!   ↓
//! 2. Validate and buffer on the stream (identity, contiguity)
//!   ↓
//! 3. Pre-publish hooks (e.g. store forgettable payloads as `Created`)
//!   ↓
//! 4. Durable append (optimistic check against the stored head)
//!   ↓
//! 5. Publish exactly the newly durable entries, in sequence order
//!   ↓
//! 6. Post-publish hooks (e.g. claim the stored payloads)
//! ```
//!
//! A failure in steps 1–4 leaves nothing durable and nothing published.
//! Payloads stored in step 3 for a commit that then fails stay unclaimed and
//! are forgotten by the cleanup job.
//!
//! A failure in step 5 leaves durable entries that nobody has seen yet.
//! `PipelineError::Publish` hands back the `PublishableEventStream`; pass it
//! to `retry_publish()`, which repeats steps 5 and 6. Retry before the
//! unclaimed cleanup timeout elapses, or the payloads of those entries are
//! forgotten.
//!
//! ## Read Flow
//!
//! `load()` decodes every entry and runs the post-deserialization hooks on it
//! (e.g. reattach payload placeholders to their storage).

use std::sync::Arc;

use thiserror::Error;
use tracing::{Instrument, debug, warn};

use streamkeep_core::{
    CancellationFlag, CausalContext, CreationTime, DomainError, EntryId, StreamId,
};
use streamkeep_events::{
    CodecError, DomainEvent, EventCodec, EventMetadata, EventStream, EventStreamEntry,
    EventWithMetadata, HookError, PostDeserializationHook, PostPublishHook, PrePublishHook,
    PublishableEventStream,
};
use streamkeep_observability::causal_span;

use crate::event_store::{EventStoreError, EventStreamWriter};
use crate::publisher::{EntryPublisher, PublishError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Nothing was stored or published.
    #[error("pre-publish hook failed: {0}")]
    PrePublish(#[source] HookError),

    /// Nothing was stored or published.
    #[error("commit cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(#[from] EventStoreError),

    /// The entries are durable but unpublished; `publishable` holds them
    /// for [`EventStreamPipeline::retry_publish`].
    #[error("stream {stream_id} stored but not published: {source}")]
    Publish {
        stream_id: StreamId,
        publishable: Box<PublishableEventStream>,
        #[source]
        source: PublishError,
    },

    /// The entries are durable and published.
    #[error("stream {stream_id} published, post-publish hook failed: {source}")]
    PostPublish {
        stream_id: StreamId,
        #[source]
        source: HookError,
    },

    #[error("post-deserialization hook failed: {0}")]
    PostDeserialization(#[source] HookError),
}

impl PipelineError {
    /// The durable entries still awaiting publication, if this is a
    /// publication failure.
    pub fn into_unpublished(self) -> Option<PublishableEventStream> {
        match self {
            PipelineError::Publish { publishable, .. } => Some(*publishable),
            _ => None,
        }
    }
}

/// An event stream together with its decoded events.
#[derive(Debug, Clone)]
pub struct TypedEventStream<E> {
    stream: EventStream,
    events: Vec<EventWithMetadata<E>>,
}

impl<E> TypedEventStream<E> {
    pub fn stream(&self) -> &EventStream {
        &self.stream
    }

    pub fn events(&self) -> &[EventWithMetadata<E>] {
        &self.events
    }

    pub fn into_parts(self) -> (EventStream, Vec<EventWithMetadata<E>>) {
        (self.stream, self.events)
    }
}

pub struct EventStreamPipeline<E>
where
    E: DomainEvent,
{
    writer: Arc<dyn EventStreamWriter>,
    publisher: Arc<dyn EntryPublisher>,
    codec: Arc<dyn EventCodec<E>>,
    pre_publish_hooks: Vec<Arc<dyn PrePublishHook<E>>>,
    post_publish_hooks: Vec<Arc<dyn PostPublishHook<E>>>,
    post_deserialization_hooks: Vec<Arc<dyn PostDeserializationHook<E>>>,
}

impl<E> EventStreamPipeline<E>
where
    E: DomainEvent,
{
    pub fn new(
        writer: Arc<dyn EventStreamWriter>,
        publisher: Arc<dyn EntryPublisher>,
        codec: Arc<dyn EventCodec<E>>,
    ) -> Self {
        Self {
            writer,
            publisher,
            codec,
            pre_publish_hooks: Vec::new(),
            post_publish_hooks: Vec::new(),
            post_deserialization_hooks: Vec::new(),
        }
    }

    pub fn with_pre_publish_hook(mut self, hook: Arc<dyn PrePublishHook<E>>) -> Self {
        self.pre_publish_hooks.push(hook);
        self
    }

    pub fn with_post_publish_hook(mut self, hook: Arc<dyn PostPublishHook<E>>) -> Self {
        self.post_publish_hooks.push(hook);
        self
    }

    pub fn with_post_deserialization_hook(
        mut self,
        hook: Arc<dyn PostDeserializationHook<E>>,
    ) -> Self {
        self.post_deserialization_hooks.push(hook);
        self
    }

    /// Load a stream and decode its events.
    pub async fn load(&self, stream_id: StreamId) -> Result<TypedEventStream<E>, PipelineError> {
        let stream = self.writer.load(stream_id).await?;

        let events = self.decode_all(stream.entries())?;

        debug!(stream_id = %stream_id, entries = events.len(), "stream loaded");
        Ok(TypedEventStream { stream, events })
    }

    /// Append `events` to `stream` within the given causal flow.
    pub async fn commit(
        &self,
        stream: EventStream,
        events: Vec<E>,
        context: &CausalContext,
        cancellation: &CancellationFlag,
    ) -> Result<TypedEventStream<E>, PipelineError> {
        let span = causal_span(context);
        self.commit_in_flow(stream, events, context, cancellation)
            .instrument(span)
            .await
    }

    /// [`commit`](Self::commit) in the ambient causal flow.
    pub async fn commit_in_current_context(
        &self,
        stream: EventStream,
        events: Vec<E>,
        cancellation: &CancellationFlag,
    ) -> Result<TypedEventStream<E>, PipelineError> {
        let context = CausalContext::current();
        self.commit(stream, events, &context, cancellation).await
    }

    async fn commit_in_flow(
        &self,
        mut stream: EventStream,
        events: Vec<E>,
        context: &CausalContext,
        cancellation: &CancellationFlag,
    ) -> Result<TypedEventStream<E>, PipelineError> {
        if events.is_empty() {
            return Err(DomainError::invalid_argument("no events to commit").into());
        }

        // 1) Encode and stamp
        let entries = self.stamp(&stream, &events, context)?;

        // 2) Validate and buffer
        stream.append_entries(entries.iter().cloned())?;
        let staged: Vec<EventWithMetadata<E>> = events
            .into_iter()
            .zip(&entries)
            .map(|(event, entry)| EventWithMetadata::new(event, EventMetadata::of(entry)))
            .collect();

        // 3) Pre-publish hooks
        for event in &staged {
            for hook in &self.pre_publish_hooks {
                hook.before_publish(event, cancellation)
                    .await
                    .map_err(|e| match e {
                        HookError::Cancelled => PipelineError::Cancelled,
                        other => PipelineError::PrePublish(other),
                    })?;
            }
        }
        if cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        // 4) Durable append
        let publishable = self.writer.append(stream.into_appendable()).await?;

        self.publish_and_notify(publishable, staged).await
    }

    /// Publish durable entries whose publication failed, then run the
    /// post-publish hooks on them.
    pub async fn retry_publish(
        &self,
        publishable: PublishableEventStream,
    ) -> Result<TypedEventStream<E>, PipelineError> {
        let staged = self.decode_all(publishable.events_to_publish())?;
        self.publish_and_notify(publishable, staged).await
    }

    async fn publish_and_notify(
        &self,
        publishable: PublishableEventStream,
        staged: Vec<EventWithMetadata<E>>,
    ) -> Result<TypedEventStream<E>, PipelineError> {
        let stream_id = publishable.stream_id();

        // 5) Publish what this commit made durable
        if let Err(source) = self.publisher.publish(publishable.events_to_publish()).await {
            warn!(
                stream_id = %stream_id,
                pending = publishable.events_to_publish().len(),
                error = %source,
                "entries stored but not published"
            );
            return Err(PipelineError::Publish {
                stream_id,
                publishable: Box::new(publishable),
                source,
            });
        }
        debug!(
            stream_id = %stream_id,
            published = publishable.events_to_publish().len(),
            "commit published"
        );

        // 6) Post-publish hooks
        let mut failures = Vec::new();
        for event in &staged {
            for hook in &self.post_publish_hooks {
                if let Err(e) = hook.after_publish(event).await {
                    failures.push(e);
                }
            }
        }
        if let Some(source) = HookError::from_failures(failures) {
            warn!(stream_id = %stream_id, error = %source, "post-publish hook failed");
            return Err(PipelineError::PostPublish { stream_id, source });
        }

        Ok(TypedEventStream {
            stream: publishable.into_event_stream(),
            events: staged,
        })
    }

    fn decode_all<'a>(
        &self,
        entries: impl IntoIterator<Item = &'a EventStreamEntry>,
    ) -> Result<Vec<EventWithMetadata<E>>, PipelineError> {
        let mut events = Vec::new();
        for entry in entries {
            let event = self.codec.decode(entry.descriptor())?;
            for hook in &self.post_deserialization_hooks {
                hook.after_deserialization(&event)
                    .map_err(PipelineError::PostDeserialization)?;
            }
            events.push(EventWithMetadata::new(event, EventMetadata::of(entry)));
        }
        Ok(events)
    }

    fn stamp(
        &self,
        stream: &EventStream,
        events: &[E],
        context: &CausalContext,
    ) -> Result<Vec<EventStreamEntry>, PipelineError> {
        let correlation_id = context.correlation_id();
        let causation_id = context.causation_id();
        let mut sequence = stream.next_sequence()?;

        let mut entries = Vec::with_capacity(events.len());
        for (idx, event) in events.iter().enumerate() {
            if idx > 0 {
                sequence = sequence.next()?;
            }
            entries.push(EventStreamEntry::new(
                stream.stream_id(),
                EntryId::new(),
                sequence,
                self.codec.encode(event)?,
                causation_id,
                CreationTime::now(),
                correlation_id,
            ));
        }
        Ok(entries)
    }
}
