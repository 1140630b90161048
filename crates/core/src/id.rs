//! Strongly-typed identifiers used across the event stream and payload model.
//!
//! Every identifier wraps a UUID and rejects the nil UUID: an identifier that
//! identifies nothing is never a valid value.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Identifier of one logical event stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct StreamId(Uuid);

/// Identifier of one entry within a stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct EntryId(Uuid);

/// Identifier of the operation that caused an entry to be written.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct CausationId(Uuid);

/// Identifier of the broader business transaction an entry belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct CorrelationId(Uuid);

/// Identifier of one forgettable payload instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct ForgettablePayloadId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID, rejecting the nil UUID.
            pub fn from_uuid(uuid: Uuid) -> Result<Self, DomainError> {
                if uuid.is_nil() {
                    return Err(DomainError::invalid_value(format!(
                        "{} must not be empty",
                        $name
                    )));
                }
                Ok(Self(uuid))
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl TryFrom<Uuid> for $t {
            type Error = DomainError;

            fn try_from(value: Uuid) -> Result<Self, Self::Error> {
                Self::from_uuid(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_value(format!("{}: {}", $name, e)))?;
                Self::from_uuid(uuid)
            }
        }

        impl ValueObject for $t {}
    };
}

impl_uuid_newtype!(StreamId, "StreamId");
impl_uuid_newtype!(EntryId, "EntryId");
impl_uuid_newtype!(CausationId, "CausationId");
impl_uuid_newtype!(CorrelationId, "CorrelationId");
impl_uuid_newtype!(ForgettablePayloadId, "ForgettablePayloadId");

impl From<CorrelationId> for CausationId {
    /// A root operation is its own cause: the correlation id doubles as causation id.
    fn from(value: CorrelationId) -> Self {
        Self(value.0)
    }
}
