//! Observability wiring for Siteforge.

pub mod tracing_setup;
