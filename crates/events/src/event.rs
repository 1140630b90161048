/// A domain event that can be written to a stream.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **self-describing** (a stable type identifier travels with the content)
/// - designed to be **append-only**
pub trait DomainEvent: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event type identifier (e.g. "customer.registered").
    fn event_type(&self) -> &'static str;
}
