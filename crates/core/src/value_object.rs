//! Value object trait: equality by value, not identity.
//!
//! Every scalar in this crate (identifiers, sequences, timestamps, text
//! wrappers) is a value object: validated once at construction, immutable
//! afterwards, and compared by its contents.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// construct a new one; construction is where validation happens, so a value
/// object that exists is always valid.
///
/// ```ignore
/// let a = EntrySequence::new(3);
/// let b = EntrySequence::new(3);
/// assert_eq!(a, b); // equal by value, not identity
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
