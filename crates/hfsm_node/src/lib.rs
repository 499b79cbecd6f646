//! The node contract of hfsm (Layer 1).
//!
//! `hfsm_node` provides the primitives every hierarchical state machine is
//! built from:
//!
//! - [`value`] - Type-erased values, memory and runtime type information
//! - [`slot`] - Slots, the named exit points a node fires
//! - [`context`] - The per-tick context and the graph stack
//! - [`node`] - The [`Node`](node::Node) trait and abort reasons
//! - [`leaf`] - Leaf tasks written as closures
//! - [`error`] - Runtime and construction errors
//!
//! # Architecture
//!
//! - **Layer 1** (`hfsm_node`): node contract and leaf tasks (this crate)
//! - **Layer 2** (`hfsm_graph`): graphs, wrappers, switches and the executor
//! - **Layer 2** (`hfsm_agent`): reusable behavior definitions
//!
//! # Example
//!
//! ```
//! use hfsm_node::prelude::*;
//!
//! let idle = LeafTask::builder("Idle")
//!     .slot("Wake")
//!     .on_tick(|args: TickArgs<'_, bool, (), ()>| args.payload.then_some("Wake"))
//!     .build()
//!     .unwrap();
//!
//! let mut memory = idle.start(Value::unit(), &false).unwrap();
//! let fired = idle.tick(&NodeContext::new(&true), &mut memory).unwrap();
//! assert_eq!(fired.map(|slot| slot.key()), Some("Wake"));
//! ```

/// The per-tick context and graph stack frames.
pub mod context;

/// Runtime and construction errors.
pub mod error;

/// Leaf tasks built from closures.
pub mod leaf;

/// The node contract.
pub mod node;

/// Slots and slot declarations.
pub mod slot;

/// Type-erased values and memory.
pub mod value;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::context::{GraphStackFrame, NodeContext};
    pub use crate::error::{BuildError, KeyKind, NodeError, ValidationError, ValidationErrorKind};
    pub use crate::leaf::{IntoTickResult, LeafTask, LeafTaskBuilder, ReadyLeafTask, TickArgs};
    pub use crate::node::{AbortReason, Node, NodeKey, NodeRef};
    pub use crate::slot::{Slot, SlotKey, SlotSpec};
    pub use crate::value::{Memory, TypeInfo, Value};
}
