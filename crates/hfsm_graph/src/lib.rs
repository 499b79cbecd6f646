//! Composite nodes and execution for hfsm (Layer 2).
//!
//! `hfsm_graph` composes the nodes of `hfsm_node` into hierarchical state
//! machines that are stepped once per external tick.
//!
//! # Core Concepts
//!
//! - [`NodeGraph`] - Named children connected by internal and external transitions
//! - [`NodeWrapper`] - Wrapper logic that can intercept a wrapped node
//! - [`SwitchNode`] - Re-selects its active candidate from the payload every tick
//! - [`Executor`] - Owns one agent's root memory and drives it
//!
//! # Example
//!
//! ```
//! use hfsm_graph::prelude::*;
//! use hfsm_node::prelude::*;
//!
//! struct Unit {
//!     energy: u32,
//! }
//!
//! let work = LeafTask::builder("Work")
//!     .slot("Tired")
//!     .on_tick(|args: TickArgs<'_, Unit, (), ()>| (args.payload.energy < 10).then_some("Tired"))
//!     .build()
//!     .unwrap();
//! let sleep = LeafTask::builder("Sleep")
//!     .slot("Rested")
//!     .on_tick(|args: TickArgs<'_, Unit, (), ()>| (args.payload.energy > 90).then_some("Rested"))
//!     .build()
//!     .unwrap();
//!
//! let mut builder = NodeGraph::builder("Day");
//! builder
//!     .add_node("Work", work)
//!     .add_node("Sleep", sleep)
//!     .add_internal_transition("GoToBed", "Work", "Tired", "Sleep")
//!     .add_internal_transition("WakeUp", "Sleep", "Rested", "Work")
//!     .initial_node("Work");
//!
//! let mut executor = Executor::new(builder.build().unwrap());
//! executor.start_default(&Unit { energy: 50 }).unwrap();
//! executor.tick(&Unit { energy: 5 }).unwrap();
//!
//! let memory = executor.memory().unwrap().downcast_ref::<GraphMemory>().unwrap();
//! assert_eq!(memory.current_node(), "Sleep");
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`hfsm_node`): node contract and leaf tasks
//! - **Layer 2** (`hfsm_graph`): composite nodes and execution (this crate)
//! - **Layer 2** (`hfsm_agent`): reusable behavior definitions

/// Driving a tree from the outside.
pub mod executor;

/// Graph nodes and their builder.
pub mod graph;

/// Switch nodes.
pub mod switch;

/// Transitions and transition functions.
pub mod transition;

/// Wrapper nodes.
pub mod wrapper;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::executor::{ExecutionError, Executor};
    pub use crate::graph::{GraphBuilder, GraphMemory, NodeGraph};
    pub use crate::switch::{SwitchBuilder, SwitchKey, SwitchMemory, SwitchNode};
    pub use crate::transition::{Destination, Transition, TransitionFn, TransitionKey};
    pub use crate::wrapper::{NodeWrapper, WrapperBuilder, WrapperMemory};
}

// Re-export key types at crate root for convenience
pub use executor::{ExecutionError, Executor};
pub use graph::{GraphBuilder, GraphMemory, NodeGraph};
pub use switch::SwitchNode;
pub use wrapper::NodeWrapper;
