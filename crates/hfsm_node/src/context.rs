//! The per-tick context handed to nodes.
//!
//! A [`NodeContext`] carries the read-only payload, the stack of graph frames
//! entered so far, and the immediate-transition flag. Graphs never mutate the
//! context they receive: entering a child pushes a frame onto a new context
//! via [`NodeContext::push_stack_frame`].

use core::cell::Cell;
use std::sync::Arc;

use crate::slot::SlotKey;

/// One level of graph nesting: which graph is executing which child, and the
/// slots of that child that have a transition registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStackFrame {
    /// Name of the graph.
    pub graph_name: &'static str,
    /// Key of the active child node.
    pub node_name: &'static str,
    /// Slots of the active child that lead somewhere.
    pub registered_slots: Arc<[SlotKey]>,
}

impl GraphStackFrame {
    /// Creates a frame.
    #[must_use]
    pub fn new(
        graph_name: &'static str,
        node_name: &'static str,
        registered_slots: Arc<[SlotKey]>,
    ) -> Self {
        Self {
            graph_name,
            node_name,
            registered_slots,
        }
    }

    /// Returns `true` if `slot` has a transition registered in this frame.
    #[must_use]
    pub fn has_slot(&self, slot: &str) -> bool {
        self.registered_slots.iter().any(|registered| *registered == slot)
    }
}

/// Context for one tick of one node.
///
/// # Example
///
/// ```
/// use hfsm_node::context::{GraphStackFrame, NodeContext};
///
/// let payload = 3_u32;
/// let root = NodeContext::new(&payload);
/// let inner = root.push_stack_frame(GraphStackFrame::new("Main", "Idle", ["Go"].into()));
///
/// assert!(inner.slot_is_enabled("Go"));
/// assert!(!root.slot_is_enabled("Go"));
/// assert_eq!(inner.stack().len(), 1);
/// ```
pub struct NodeContext<'p, P> {
    payload: &'p P,
    stack: Vec<GraphStackFrame>,
    immediate: Cell<bool>,
}

impl<'p, P> NodeContext<'p, P> {
    /// Creates a root context with an empty stack.
    #[must_use]
    pub fn new(payload: &'p P) -> Self {
        Self::with_stack(payload, Vec::new())
    }

    /// Creates a context with the given stack, outermost frame first.
    #[must_use]
    pub fn with_stack(payload: &'p P, stack: Vec<GraphStackFrame>) -> Self {
        Self {
            payload,
            stack,
            immediate: Cell::new(false),
        }
    }

    /// Returns `true` if the innermost frame registers a transition for
    /// `slot`. Outer frames are not consulted.
    #[must_use]
    pub fn slot_is_enabled(&self, slot: &str) -> bool {
        self.stack.last().is_some_and(|frame| frame.has_slot(slot))
    }

    /// Returns the frames entered so far, outermost first.
    #[must_use]
    pub fn stack(&self) -> &[GraphStackFrame] {
        &self.stack
    }

    /// Returns the innermost frame.
    #[must_use]
    pub fn current_frame(&self) -> Option<&GraphStackFrame> {
        self.stack.last()
    }

    /// Returns the payload.
    #[must_use]
    pub fn payload(&self) -> &'p P {
        self.payload
    }

    /// Asks the enclosing graph to run the destination of the next transition
    /// within the same tick.
    pub fn allow_immediate_transition(&self) {
        self.immediate.set(true);
    }

    /// Returns `true` once [`allow_immediate_transition`](Self::allow_immediate_transition)
    /// was called on this context.
    #[must_use]
    pub fn is_immediate_transition_allowed(&self) -> bool {
        self.immediate.get()
    }

    /// Returns a new context with `frame` appended. The receiver is left
    /// unchanged and the new context starts with the immediate flag unset.
    #[must_use]
    pub fn push_stack_frame(&self, frame: GraphStackFrame) -> NodeContext<'p, P> {
        tracing::trace!(
            graph = frame.graph_name,
            node = frame.node_name,
            depth = self.stack.len() + 1,
            "entering stack frame"
        );
        let mut stack = Vec::with_capacity(self.stack.len() + 1);
        stack.extend_from_slice(&self.stack);
        stack.push(frame);
        NodeContext::with_stack(self.payload, stack)
    }

    /// Returns a context with the same stack and an unset immediate flag.
    ///
    /// Composites ticking several children at one depth give each child its
    /// own sibling. Only the child that fires forwards its flag.
    #[must_use]
    pub fn sibling(&self) -> NodeContext<'p, P> {
        NodeContext::with_stack(self.payload, self.stack.clone())
    }
}

impl<P> core::fmt::Debug for NodeContext<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeContext")
            .field("stack", &self.stack)
            .field("immediate", &self.immediate.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(graph: &'static str, node: &'static str, slots: &[SlotKey]) -> GraphStackFrame {
        GraphStackFrame::new(graph, node, slots.into())
    }

    #[test]
    fn empty_stack_enables_nothing() {
        let ctx = NodeContext::new(&());
        assert!(!ctx.slot_is_enabled("Go"));
        assert!(ctx.current_frame().is_none());
    }

    #[test]
    fn only_innermost_frame_is_consulted() {
        let ctx = NodeContext::new(&());
        let outer = ctx.push_stack_frame(frame("Outer", "Sub", &["Exit"]));
        let inner = outer.push_stack_frame(frame("Sub", "Leaf", &["Go"]));

        assert!(inner.slot_is_enabled("Go"));
        assert!(!inner.slot_is_enabled("Exit"));
        assert!(outer.slot_is_enabled("Exit"));
    }

    #[test]
    fn push_leaves_receiver_unchanged() {
        let ctx = NodeContext::new(&5_i32);
        let pushed = ctx.push_stack_frame(frame("G", "A", &[]));

        assert!(ctx.stack().is_empty());
        assert_eq!(pushed.stack().len(), 1);
        assert_eq!(pushed.stack()[0].node_name, "A");
        assert_eq!(*pushed.payload(), 5);
    }

    #[test]
    fn immediate_flag_is_per_context() {
        let ctx = NodeContext::new(&());
        let inner = ctx.push_stack_frame(frame("G", "A", &[]));
        inner.allow_immediate_transition();

        assert!(inner.is_immediate_transition_allowed());
        assert!(!ctx.is_immediate_transition_allowed());
        assert!(!inner.push_stack_frame(frame("H", "B", &[])).is_immediate_transition_allowed());
    }

    #[test]
    fn sibling_keeps_stack_and_resets_flag() {
        let ctx = NodeContext::new(&());
        let inner = ctx.push_stack_frame(frame("G", "A", &["Go"]));
        inner.allow_immediate_transition();

        let sibling = inner.sibling();

        assert!(!sibling.is_immediate_transition_allowed());
        assert!(sibling.slot_is_enabled("Go"));
        assert_eq!(sibling.stack(), inner.stack());
        assert!(inner.is_immediate_transition_allowed());
    }
}
