//! Forgettable payloads: event content that can be erased later without
//! rewriting the event stream.
//!
//! An event references a payload by id. The payload itself lives in a payload
//! store and moves through `Created → CreatedAndClaimed → Forgotten`:
//!
//! - the pre-publish hook stores it (`Created`) before the event is committed,
//! - the claiming hook claims it once the event is published,
//! - forgetting replaces its content with a [`ForgottenPayload`] marker,
//! - the [`UnclaimedPayloadCleanupJob`] forgets payloads whose event was never
//!   published.

pub mod cleanup;
pub mod converter;
pub mod descriptor;
pub mod error;
pub mod finder;
pub mod forgotten;
pub mod hooks;
pub mod memory;
pub mod metadata;
pub mod payload;
pub mod services;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;

pub use cleanup::{CleanupReport, UNCLAIMED_CLEANUP_REQUESTED_BY, UnclaimedPayloadCleanupJob};
pub use converter::{ForgettablePayloadContentConverter, JsonPayloadContentConverter};
pub use descriptor::{ForgettablePayloadContentDescriptor, ForgettablePayloadDescriptor};
pub use error::{ForgettablePayloadError, PayloadStoreError};
pub use finder::ForgettablePayloadFinder;
pub use forgotten::{FORGOTTEN_PAYLOAD_TYPE_IDENTIFIER, ForgottenPayload};
pub use hooks::{
    ForgettablePayloadClaimingHook, ForgettablePayloadPostDeserializationHook,
    ForgettablePayloadPrePublishHook,
};
pub use memory::InMemoryForgettablePayloadStore;
pub use metadata::ForgettablePayloadMetadata;
pub use payload::{ForgettablePayload, ForgettablePayloadHandle, PayloadContent};
pub use services::{
    ForgettablePayloadClaimingService, ForgettablePayloadCollaborators,
    ForgettablePayloadForgettingService, ForgettablePayloadServices, StoreClaimingService,
    StoreForgettingService,
};
pub use state::ForgettablePayloadState;
pub use store::{
    ForgettablePayloadDescriptorLoader, ForgettablePayloadStorageWriter, UnclaimedPayloadQuery,
};
