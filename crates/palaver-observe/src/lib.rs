//! Observability setup for Palaver: the global tracing subscriber.

pub mod tracing_setup;
