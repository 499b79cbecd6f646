//! The node contract shared by every kind of node.
//!
//! A node is a stateless, shareable description of behavior. All per-agent
//! state lives in the [`Memory`] returned by [`Node::start`], which the owner
//! hands back on every [`Node::tick`] and [`Node::abort`].

use core::fmt;
use std::sync::Arc;

use crate::context::NodeContext;
use crate::error::NodeError;
use crate::slot::{Slot, SlotSpec};
use crate::value::{Memory, TypeInfo, Value};

/// Key of a node inside a graph.
pub type NodeKey = &'static str;

/// Why a node is being cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// The wrapper logic fired; the wrapped node is cancelled.
    AbortedByWrapper,
    /// The wrapped node fired; the wrapper logic is cancelled.
    AbortedByWrapped,
    /// A switch selected another candidate.
    AbortedBySwitch,
    /// The agent running the tree is gone.
    AbortedByDeath,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbortedByWrapper => f.write_str("AbortedByWrapper"),
            Self::AbortedByWrapped => f.write_str("AbortedByWrapped"),
            Self::AbortedBySwitch => f.write_str("AbortedBySwitch"),
            Self::AbortedByDeath => f.write_str("AbortedByDeath"),
        }
    }
}

/// A unit of behavior that can be started, ticked and aborted.
///
/// Implemented by leaf tasks, graphs, wrappers and switches, and by any user
/// type that needs full control. Implementations must keep per-agent state
/// in [`Memory`] only, so that one instance can drive many agents at once.
///
/// `P` is the payload type read by the whole tree.
///
/// # Example
///
/// ```
/// use hfsm_node::prelude::*;
///
/// struct Countdown;
///
/// impl Node<()> for Countdown {
///     fn name(&self) -> &str {
///         "Countdown"
///     }
///
///     fn input_type(&self) -> Option<TypeInfo> {
///         Some(TypeInfo::of::<u32>())
///     }
///
///     fn slots(&self) -> &[SlotSpec] {
///         const SLOTS: &[SlotSpec] = &[];
///         SLOTS
///     }
///
///     fn start(&self, input: Value, _payload: &()) -> Result<Memory, NodeError> {
///         let found = input.type_info();
///         let remaining = input.downcast::<u32>().map_err(|_| NodeError::InputMismatch {
///             node: self.name().to_string(),
///             expected: TypeInfo::of::<u32>(),
///             found,
///         })?;
///         Ok(Memory::new(remaining))
///     }
///
///     fn tick(&self, _ctx: &NodeContext<'_, ()>, memory: &mut Memory) -> Result<Option<Slot>, NodeError> {
///         if let Some(remaining) = memory.downcast_mut::<u32>() {
///             *remaining = remaining.saturating_sub(1);
///         }
///         Ok(None)
///     }
///
///     fn abort(&self, _reason: AbortReason, _memory: &mut Memory, _payload: &()) -> Result<(), NodeError> {
///         Ok(())
///     }
/// }
/// ```
pub trait Node<P>: Send + Sync + 'static {
    /// Human-readable name, used in errors and traces.
    fn name(&self) -> &str;

    /// Type of the input accepted by [`start`](Self::start).
    ///
    /// `None` means the input is ignored and any value is accepted.
    fn input_type(&self) -> Option<TypeInfo>;

    /// Slots this node can fire.
    fn slots(&self) -> &[SlotSpec];

    /// Input used when the node is entered without a transition function and
    /// without a container default.
    fn default_input(&self) -> Option<Value> {
        None
    }

    /// Starts the node and returns its fresh memory.
    fn start(&self, input: Value, payload: &P) -> Result<Memory, NodeError>;

    /// Advances the node by one step, mutating `memory` in place.
    ///
    /// Returns the fired slot, or `None` to keep running.
    fn tick(&self, ctx: &NodeContext<'_, P>, memory: &mut Memory)
    -> Result<Option<Slot>, NodeError>;

    /// Cancels the node. Composites forward this to their active children.
    fn abort(&self, reason: AbortReason, memory: &mut Memory, payload: &P)
    -> Result<(), NodeError>;
}

/// A shared, type-erased node.
pub type NodeRef<P> = Arc<dyn Node<P>>;

/// Looks up the declared shape of `key` among `slots`.
#[must_use]
pub fn find_slot<'a>(slots: &'a [SlotSpec], key: &str) -> Option<&'a SlotSpec> {
    slots.iter().find(|spec| spec.key() == key)
}

/// Downcasts `memory` to the type a node created, or reports a mismatch.
pub fn memory_mut<'m, T: 'static>(node: &str, memory: &'m mut Memory) -> Result<&'m mut T, NodeError> {
    let found = memory.type_name();
    memory
        .downcast_mut::<T>()
        .ok_or_else(|| NodeError::MemoryMismatch {
            node: node.to_string(),
            expected: core::any::type_name::<T>(),
            found,
        })
}

/// Takes `input` as a `T`, or reports a mismatch.
pub fn take_input<T: Clone + Send + Sync + 'static>(node: &str, input: Value) -> Result<T, NodeError> {
    let found = input.type_info();
    input.downcast::<T>().map_err(|_| NodeError::InputMismatch {
        node: node.to_string(),
        expected: TypeInfo::of::<T>(),
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_reason_display() {
        assert_eq!(AbortReason::AbortedByWrapper.to_string(), "AbortedByWrapper");
        assert_eq!(AbortReason::AbortedByWrapped.to_string(), "AbortedByWrapped");
        assert_eq!(AbortReason::AbortedBySwitch.to_string(), "AbortedBySwitch");
        assert_eq!(AbortReason::AbortedByDeath.to_string(), "AbortedByDeath");
    }

    #[test]
    fn memory_mut_reports_mismatch() {
        let mut memory = Memory::new(1_u8);
        assert!(memory_mut::<u8>("A", &mut memory).is_ok());
        let err = memory_mut::<String>("A", &mut memory).unwrap_err();
        assert!(matches!(err, NodeError::MemoryMismatch { ref node, .. } if node == "A"));
    }

    #[test]
    fn take_input_reports_mismatch() {
        assert_eq!(take_input::<u32>("B", Value::new(5_u32)).unwrap(), 5);
        let err = take_input::<u32>("B", Value::unit()).unwrap_err();
        assert!(matches!(
            err,
            NodeError::InputMismatch { expected, found, .. }
                if expected == TypeInfo::of::<u32>() && found.is_unit()
        ));
    }

    #[test]
    fn find_slot_by_key() {
        let slots = [SlotSpec::empty("A"), SlotSpec::with_args::<u8>("B")];
        assert_eq!(find_slot(&slots, "B").map(SlotSpec::key), Some("B"));
        assert!(find_slot(&slots, "C").is_none());
    }
}
