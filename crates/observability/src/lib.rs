//! Tracing and logging setup shared by streamkeep hosts.

/// Subscriber initialization and its configuration.
pub mod logging;

/// Spans carrying causal ids.
pub mod span;

pub use logging::{LogFormat, LoggingConfig, init};
pub use span::causal_span;
