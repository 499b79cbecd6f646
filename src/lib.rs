//! Hierarchical finite state machines for agents stepped once per tick.
//!
//! Behaviors are composed from leaf tasks, graphs of named children,
//! wrappers that can intercept the node they decorate, and switches that
//! re-select their active candidate every tick. One immutable tree is shared
//! by any number of agents; each agent owns only its memory.

pub use hfsm_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hfsm_internal::prelude::*;
}
