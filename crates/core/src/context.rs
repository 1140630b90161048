//! Causal context: causation and correlation ids for one logical flow.
//!
//! A [`CausalContext`] is an explicit value threaded through every call that
//! produces or consumes causal metadata. Each context owns two set-once slots:
//!
//! - **correlation**: the business transaction. Reading an unset slot generates
//!   a fresh id and stores it, so the flow stays self-consistent afterwards.
//! - **causation**: what directly triggered the current work. Reading an unset
//!   slot yields the current correlation id without occupying the slot.
//!
//! Writing a slot succeeds when it is unset or already holds the same value;
//! writing a different value fails with `InvalidOperation`.
//!
//! Cloning a context shares the flow. [`CausalContext::fork`] derives a child
//! flow that inherits everything set so far; the child's own writes never reach
//! the parent or its siblings.
//!
//! For code that cannot take the context as a parameter, [`CausalContext::scope`]
//! installs it as a tokio task-local and [`CausalContext::current`] reads it back.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use tokio::task::JoinHandle;

use crate::error::{DomainError, DomainResult};
use crate::id::{CausationId, CorrelationId};

tokio::task_local! {
    static CURRENT: CausalContext;
}

#[derive(Debug, Default)]
struct Slots {
    correlation: OnceLock<CorrelationId>,
    causation: OnceLock<CausationId>,
}

/// Causation/correlation ids of one logical flow of execution.
#[derive(Debug, Clone, Default)]
pub struct CausalContext {
    slots: Arc<Slots>,
}

impl CausalContext {
    /// A root flow with both slots unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flow continuing work started elsewhere (e.g. handling an incoming message).
    pub fn with_ids(correlation_id: CorrelationId, causation_id: Option<CausationId>) -> Self {
        let slots = Slots::default();
        let _ = slots.correlation.set(correlation_id);
        if let Some(causation_id) = causation_id {
            let _ = slots.causation.set(causation_id);
        }
        Self {
            slots: Arc::new(slots),
        }
    }

    pub fn correlation_id(&self) -> CorrelationId {
        *self.slots.correlation.get_or_init(CorrelationId::new)
    }

    pub fn causation_id(&self) -> CausationId {
        match self.slots.causation.get() {
            Some(id) => *id,
            None => CausationId::from(self.correlation_id()),
        }
    }

    pub fn is_correlation_set(&self) -> bool {
        self.slots.correlation.get().is_some()
    }

    pub fn is_causation_set(&self) -> bool {
        self.slots.causation.get().is_some()
    }

    pub fn set_correlation_id(&self, id: CorrelationId) -> DomainResult<()> {
        set_once(&self.slots.correlation, id, "correlation id")
    }

    pub fn set_causation_id(&self, id: CausationId) -> DomainResult<()> {
        set_once(&self.slots.causation, id, "causation id")
    }

    /// Derive a child flow.
    ///
    /// The parent's correlation id is materialized first so every child of one
    /// flow shares it.
    pub fn fork(&self) -> Self {
        let child = Slots::default();
        let _ = child.correlation.set(self.correlation_id());
        if let Some(causation) = self.slots.causation.get() {
            let _ = child.causation.set(*causation);
        }
        Self {
            slots: Arc::new(child),
        }
    }

    /// Run `future` with this context installed as the ambient context.
    pub async fn scope<F>(self, future: F) -> F::Output
    where
        F: Future,
    {
        CURRENT.scope(self, future).await
    }

    /// The ambient context, if one is installed for the current task.
    pub fn try_current() -> Option<Self> {
        CURRENT.try_with(Clone::clone).ok()
    }

    /// The ambient context, or a new root flow outside of any scope.
    pub fn current() -> Self {
        Self::try_current().unwrap_or_default()
    }

    /// Spawn `future` as a continuation of the ambient flow.
    ///
    /// The task runs in a fork of the current context: it sees everything set
    /// so far, and its own writes stay local to it.
    pub fn spawn_child<F>(future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let child = Self::current().fork();
        tokio::spawn(child.scope(future))
    }
}

fn set_once<T>(slot: &OnceLock<T>, value: T, name: &str) -> DomainResult<()>
where
    T: Copy + PartialEq + core::fmt::Display,
{
    let existing = *slot.get_or_init(|| value);
    if existing == value {
        Ok(())
    } else {
        Err(DomainError::invalid_operation(format!(
            "{name} is already set to {existing}; refusing to overwrite it with {value}"
        )))
    }
}
