//! Aggregate root trait and optimistic concurrency expectations.

use crate::error::{DomainError, DomainResult};
use crate::sequence::EntrySequence;

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// For an event stream this is the number of entries it holds, committed
    /// and pending alike.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation about a stream's durable head.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedSequence {
    /// Skip the check (migrations, imports).
    Any,
    /// The stream must not have any durable entries yet.
    Empty,
    /// The last durable entry must carry exactly this sequence.
    At(EntrySequence),
}

impl ExpectedSequence {
    /// Expectation derived from a known head (`None` for an empty stream).
    pub fn from_head(head: Option<EntrySequence>) -> Self {
        match head {
            Some(sequence) => Self::At(sequence),
            None => Self::Empty,
        }
    }

    pub fn matches(self, actual: Option<EntrySequence>) -> bool {
        match (self, actual) {
            (ExpectedSequence::Any, _) => true,
            (ExpectedSequence::Empty, None) => true,
            (ExpectedSequence::At(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }

    pub fn check(self, actual: Option<EntrySequence>) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual:?})"
            )))
        }
    }
}
