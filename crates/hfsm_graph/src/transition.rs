//! Transitions between the children of a graph.
//!
//! A transition maps one slot of one child to either another child of the
//! same graph (internal) or one of the graph's own slots (external). An
//! optional [`TransitionFn`] converts the fired slot's arguments into the
//! destination's input or the outgoing slot's arguments.

use core::fmt;

use hashbrown::HashMap;
use hfsm_node::error::NodeError;
use hfsm_node::node::NodeKey;
use hfsm_node::slot::SlotKey;
use hfsm_node::value::{TypeInfo, Value};

/// Name of a transition. Unique within a graph.
pub type TransitionKey = &'static str;

// ─────────────────────────────────────────────────────────────────────────────
// TransitionFn
// ─────────────────────────────────────────────────────────────────────────────

/// A typed `A -> B` conversion applied to erased values.
///
/// The argument and output types are recorded so graph builders can check
/// them against slot declarations and node inputs before anything runs.
pub struct TransitionFn {
    arg: TypeInfo,
    output: TypeInfo,
    fun: Box<dyn Fn(Value) -> Result<Value, Value> + Send + Sync>,
}

impl TransitionFn {
    /// Wraps a typed function.
    #[must_use]
    pub fn new<A, B, F>(fun: F) -> Self
    where
        A: Clone + Send + Sync + 'static,
        B: Clone + Send + Sync + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        Self {
            arg: TypeInfo::of::<A>(),
            output: TypeInfo::of::<B>(),
            fun: Box::new(move |value: Value| value.downcast::<A>().map(|arg| Value::new(fun(arg)))),
        }
    }

    /// Returns the argument type.
    #[must_use]
    pub fn arg_type(&self) -> TypeInfo {
        self.arg
    }

    /// Returns the output type.
    #[must_use]
    pub fn output_type(&self) -> TypeInfo {
        self.output
    }

    /// Applies the function, giving the value back if it has the wrong type.
    pub fn try_apply(&self, args: Value) -> Result<Value, Value> {
        (self.fun)(args)
    }

    /// Applies the function to the arguments of the fired `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::ArgsMismatch`] if `args` is not of the argument
    /// type.
    pub fn apply(&self, slot: SlotKey, args: Value) -> Result<Value, NodeError> {
        let found = args.type_info();
        self.try_apply(args).map_err(|_| NodeError::ArgsMismatch {
            slot,
            expected: self.arg,
            found,
        })
    }
}

impl fmt::Debug for TransitionFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitionFn({} -> {})", self.arg, self.output)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transition
// ─────────────────────────────────────────────────────────────────────────────

/// Where a transition leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Another child of the same graph: the graph stays active.
    Node(NodeKey),
    /// One of the graph's own slots: the graph fires it to its parent.
    Slot(SlotKey),
}

/// A registered `(source node, source slot) -> destination` rule.
#[derive(Debug)]
pub struct Transition {
    pub(crate) key: TransitionKey,
    pub(crate) source_node: NodeKey,
    pub(crate) source_slot: SlotKey,
    pub(crate) destination: Destination,
    pub(crate) fun: Option<TransitionFn>,
}

impl Transition {
    /// Returns the transition key.
    #[must_use]
    pub fn key(&self) -> TransitionKey {
        self.key
    }

    /// Returns the child whose slot triggers this transition.
    #[must_use]
    pub fn source_node(&self) -> NodeKey {
        self.source_node
    }

    /// Returns the slot that triggers this transition.
    #[must_use]
    pub fn source_slot(&self) -> SlotKey {
        self.source_slot
    }

    /// Returns the destination.
    #[must_use]
    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Returns the conversion function, if any.
    #[must_use]
    pub fn fun(&self) -> Option<&TransitionFn> {
        self.fun.as_ref()
    }

    /// Returns `true` if the destination is a child of the same graph.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self.destination, Destination::Node(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TransitionIndex
// ─────────────────────────────────────────────────────────────────────────────

/// Lookup from `(node, slot)` to the position of its transition.
///
/// Built once when a graph is built; read on every tick.
#[derive(Debug, Default)]
pub(crate) struct TransitionIndex {
    entries: HashMap<NodeKey, HashMap<SlotKey, usize>>,
}

impl TransitionIndex {
    /// Registers `position` for `(node, slot)`, returning the position
    /// already registered there, if any.
    pub(crate) fn insert(&mut self, node: NodeKey, slot: SlotKey, position: usize) -> Option<usize> {
        let slots = self.entries.entry(node).or_default();
        match slots.get(slot) {
            Some(existing) => Some(*existing),
            None => {
                slots.insert(slot, position);
                None
            }
        }
    }

    pub(crate) fn get(&self, node: &str, slot: &str) -> Option<usize> {
        self.entries.get(node)?.get(slot).copied()
    }
}
