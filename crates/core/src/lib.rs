//! `streamkeep-core`: scalar building blocks of the event stream model.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! validated identifiers, sequences, timestamps and text wrappers, the domain
//! error model, and the causal context that carries causation/correlation ids
//! through a flow of work.

pub mod aggregate;
pub mod cancellation;
pub mod context;
pub mod error;
pub mod id;
pub mod sequence;
pub mod text;
pub mod time;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedSequence};
pub use cancellation::CancellationFlag;
pub use context::CausalContext;
pub use error::{DomainError, DomainResult};
pub use id::{CausationId, CorrelationId, EntryId, ForgettablePayloadId, StreamId};
pub use sequence::{EntrySequence, ForgettablePayloadSequence};
pub use text::{
    ForgettingReason, ForgettingRequestedBy, SerializationFormat, SerializedContent,
    TypeIdentifier, TypeIdentifierFormat,
};
pub use time::{CreationTime, ForgettingTime, PayloadCreationTime, PayloadLastModifiedTime};
pub use value_object::ValueObject;
