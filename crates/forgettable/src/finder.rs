use crate::payload::ForgettablePayloadHandle;

/// Locates the forgettable payloads attached to an event.
///
/// The result may be empty; absence of a payload is expressed by leaving it
/// out, never by a missing entry.
pub trait ForgettablePayloadFinder<E>: Send + Sync {
    fn find(&self, event: &E) -> Vec<Box<dyn ForgettablePayloadHandle>>;
}

impl<E, F> ForgettablePayloadFinder<E> for F
where
    F: Fn(&E) -> Vec<Box<dyn ForgettablePayloadHandle>> + Send + Sync,
{
    fn find(&self, event: &E) -> Vec<Box<dyn ForgettablePayloadHandle>> {
        self(event)
    }
}
