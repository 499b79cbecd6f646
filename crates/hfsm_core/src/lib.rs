//! Ambient infrastructure for hosts driving hfsm trees.
//!
//! # Modules
//!
//! - [`telemetry`] - Tracing subscriber configuration ([`TracingConfig`])

pub mod telemetry;

pub use telemetry::{TracingConfig, TracingFormat};
