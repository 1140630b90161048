//! In-memory entry publisher for tests/dev.

use std::sync::mpsc::{self, Receiver};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use streamkeep_events::EventStreamEntry;

use super::{EntryPublisher, PublishError};

/// A subscription to published entries.
///
/// Each subscription gets a copy of every entry published after it was
/// created, in publication order.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<EventStreamEntry>,
}

impl Subscription {
    /// Block until the next entry is available.
    pub fn recv(&self) -> Result<EventStreamEntry, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an entry without blocking.
    pub fn try_recv(&self) -> Result<EventStreamEntry, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for an entry.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EventStreamEntry, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything received so far, without blocking.
    pub fn drain(&self) -> Vec<EventStreamEntry> {
        self.receiver.try_iter().collect()
    }
}

/// In-memory fan-out publisher.
///
/// - No IO
/// - Best-effort fan-out; dropped subscriptions are pruned on publish
#[derive(Debug, Default)]
pub struct InMemoryEntryPublisher {
    subscribers: Mutex<Vec<mpsc::Sender<EventStreamEntry>>>,
}

impl InMemoryEntryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it just never receives.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription { receiver: rx }
    }
}

#[async_trait]
impl EntryPublisher for InMemoryEntryPublisher {
    async fn publish(&self, entries: &[EventStreamEntry]) -> Result<(), PublishError> {
        let mut subs = self.subscribers.lock().map_err(|_| PublishError::Poisoned)?;
        for entry in entries {
            subs.retain(|tx| tx.send(entry.clone()).is_ok());
        }
        debug!(published = entries.len(), subscribers = subs.len(), "entries published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamkeep_core::{
        CausationId, CorrelationId, CreationTime, EntryId, EntrySequence, SerializationFormat,
        SerializedContent, StreamId, TypeIdentifier, TypeIdentifierFormat,
    };
    use streamkeep_events::EventDescriptor;

    fn entry(stream_id: StreamId, sequence: u32) -> EventStreamEntry {
        EventStreamEntry::new(
            stream_id,
            EntryId::new(),
            EntrySequence::new(sequence),
            EventDescriptor::new(
                SerializedContent::new("{}").unwrap(),
                SerializationFormat::new("json").unwrap(),
                TypeIdentifier::new("test.event").unwrap(),
                TypeIdentifierFormat::new("event-type").unwrap(),
            ),
            CausationId::new(),
            CreationTime::now(),
            CorrelationId::new(),
        )
    }

    #[tokio::test]
    async fn every_subscriber_sees_entries_in_order() {
        let publisher = InMemoryEntryPublisher::new();
        let first = publisher.subscribe();
        let second = publisher.subscribe();
        let stream_id = StreamId::new();

        publisher
            .publish(&[entry(stream_id, 0), entry(stream_id, 1), entry(stream_id, 2)])
            .await
            .unwrap();

        for sub in [first, second] {
            let seen: Vec<u32> = sub.drain().iter().map(|e| e.sequence().value()).collect();
            assert_eq!(seen, vec![0, 1, 2]);
        }
    }

    #[tokio::test]
    async fn dropped_subscriptions_do_not_fail_publication() {
        let publisher = InMemoryEntryPublisher::new();
        drop(publisher.subscribe());
        let live = publisher.subscribe();

        publisher.publish(&[entry(StreamId::new(), 0)]).await.unwrap();
        assert_eq!(live.drain().len(), 1);
    }
}
