//! Monotonic counters: stream entry ordering and payload optimistic concurrency.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Zero-based position of an entry within its stream; the sole ordering key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntrySequence(u32);

/// Optimistic-concurrency counter of a payload's metadata (+1 per update).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForgettablePayloadSequence(u32);

macro_rules! impl_sequence_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            pub const fn zero() -> Self {
                Self(0)
            }

            pub const fn value(self) -> u32 {
                self.0
            }

            /// The following sequence; fails instead of wrapping at `u32::MAX`.
            pub fn next(self) -> Result<Self, DomainError> {
                self.0.checked_add(1).map(Self).ok_or_else(|| {
                    DomainError::invalid_value(format!("{} overflow at {}", $name, self.0))
                })
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ValueObject for $t {}
    };
}

impl_sequence_newtype!(EntrySequence, "EntrySequence");
impl_sequence_newtype!(ForgettablePayloadSequence, "ForgettablePayloadSequence");
