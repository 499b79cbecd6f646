//! # hfsm Internal Library
//!
//! Re-exports the core hfsm crates for convenience.

/// Layer 1: Node contract, values, slots and leaf tasks.
pub use hfsm_node;

/// Layer 2: Graphs, wrappers, switches and the executor.
pub use hfsm_graph;

/// Layer 2: Reusable behavior definitions.
pub use hfsm_agent;

/// Ambient infrastructure: tracing setup.
pub use hfsm_core;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hfsm_agent::{Behavior, BehaviorExt};
    pub use hfsm_core::{TracingConfig, TracingFormat};
    pub use hfsm_graph::prelude::*;
    pub use hfsm_node::prelude::*;
}
