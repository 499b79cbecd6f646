//! Graph nodes: named children connected by transitions.
//!
//! A [`NodeGraph`] is itself a [`Node`]: it keeps exactly one child active,
//! ticks it, and resolves the slot it fires through a transition index built
//! once by [`GraphBuilder::build`]. Graphs nest arbitrarily; each level pushes
//! a [`GraphStackFrame`] onto the context it hands its child.
//!
//! # Example
//!
//! ```
//! use hfsm_graph::prelude::*;
//! use hfsm_node::prelude::*;
//!
//! let produce = LeafTask::builder("Produce")
//!     .slot_with_args::<u32>("Go")
//!     .on_tick(|_: TickArgs<'_, (), (), ()>| Some(Slot::with_args("Go", 4_u32)))
//!     .build()
//!     .unwrap();
//! let consume = LeafTask::builder("Consume")
//!     .on_start(|n: u32, _: &(), _: &()| n)
//!     .on_tick(|_: TickArgs<'_, (), u32, ()>| None::<Slot>)
//!     .build()
//!     .unwrap();
//!
//! let mut builder = NodeGraph::builder("Pipeline");
//! builder
//!     .add_node("A", produce)
//!     .add_node_with_input("B", consume, 0_u32)
//!     .add_internal_transition_with("AToB", "A", "Go", "B", |n: u32| n + 1)
//!     .initial_node("A");
//! let graph = builder.build().unwrap();
//!
//! let mut memory = graph.start(Value::unit(), &()).unwrap();
//! graph.tick(&NodeContext::new(&()), &mut memory).unwrap();
//!
//! let state = memory.downcast_ref::<GraphMemory>().unwrap();
//! assert_eq!(state.current_node(), "B");
//! assert_eq!(state.current_node_memory().downcast_ref::<u32>(), Some(&5));
//! ```

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use hfsm_node::context::{GraphStackFrame, NodeContext};
use hfsm_node::error::{BuildError, KeyKind, NodeError, ValidationError};
use hfsm_node::node::{AbortReason, Node, NodeKey, NodeRef, find_slot, memory_mut};
use hfsm_node::slot::{Slot, SlotKey, SlotSpec};
use hfsm_node::value::{Memory, TypeInfo, Value};

use crate::transition::{Destination, Transition, TransitionFn, TransitionIndex, TransitionKey};

// ─────────────────────────────────────────────────────────────────────────────
// Memory
// ─────────────────────────────────────────────────────────────────────────────

/// Memory of a [`NodeGraph`]: the active child and that child's memory.
#[derive(Debug)]
pub struct GraphMemory {
    current_node: NodeKey,
    current_node_memory: Memory,
}

impl GraphMemory {
    /// Returns the key of the active child.
    #[must_use]
    pub fn current_node(&self) -> NodeKey {
        self.current_node
    }

    /// Returns the memory of the active child.
    #[must_use]
    pub fn current_node_memory(&self) -> &Memory {
        &self.current_node_memory
    }

    /// Mutably borrows the memory of the active child.
    pub fn current_node_memory_mut(&mut self) -> &mut Memory {
        &mut self.current_node_memory
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NodeContainer
// ─────────────────────────────────────────────────────────────────────────────

/// A child of a graph together with its graph-specific settings.
struct NodeContainer<P> {
    key: NodeKey,
    node: NodeRef<P>,
    /// Explicit default, else the node's own default.
    default_input: Option<Value>,
    /// Slots of this child with a registered transition, in registration order.
    registered_slots: Arc<[SlotKey]>,
}

impl<P> NodeContainer<P> {
    fn start_input(&self) -> Value {
        self.default_input.clone().unwrap_or_else(Value::unit)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NodeGraph
// ─────────────────────────────────────────────────────────────────────────────

/// A node made of named children and transitions between them.
pub struct NodeGraph<P> {
    name: &'static str,
    nodes: HashMap<NodeKey, NodeContainer<P>>,
    transitions: Vec<Transition>,
    index: TransitionIndex,
    slots: Vec<SlotSpec>,
    slot_defaults: HashMap<SlotKey, Value>,
    initial_node: NodeKey,
    initial_fun: Option<TransitionFn>,
    default_input: Option<Value>,
    max_immediate_transitions: usize,
}

impl<P: 'static> NodeGraph<P> {
    /// Default bound on immediate transitions chained within one tick.
    pub const DEFAULT_MAX_IMMEDIATE_TRANSITIONS: usize = 16;

    /// Starts building a graph.
    #[must_use]
    pub fn builder(name: &'static str) -> GraphBuilder<P> {
        GraphBuilder::new(name)
    }

    /// Returns the number of children.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of transitions.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Returns the child registered under `key`.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&NodeRef<P>> {
        self.nodes.get(key).map(|container| &container.node)
    }

    /// Returns the key of the child started first.
    #[must_use]
    pub fn initial_node(&self) -> NodeKey {
        self.initial_node
    }

    /// Returns the transition registered for `slot` of `node`.
    #[must_use]
    pub fn transition(&self, node: &str, slot: &str) -> Option<&Transition> {
        self.index
            .get(node, slot)
            .and_then(|position| self.transitions.get(position))
    }

    /// Returns the slots of `node` that have a transition registered.
    #[must_use]
    pub fn registered_slots(&self, node: &str) -> Option<&[SlotKey]> {
        self.nodes
            .get(node)
            .map(|container| &*container.registered_slots)
    }

    /// Returns the bound on immediate transitions chained within one tick.
    #[must_use]
    pub fn max_immediate_transitions(&self) -> usize {
        self.max_immediate_transitions
    }

    fn container(&self, key: &str) -> Result<&NodeContainer<P>, NodeError> {
        self.nodes.get(key).ok_or_else(|| NodeError::UnknownNode {
            graph: self.name.to_string(),
            node: key.to_string(),
        })
    }

    fn slot_default(&self, slot: &str) -> Value {
        self.slot_defaults
            .get(slot)
            .cloned()
            .unwrap_or_else(Value::unit)
    }
}

impl<P: 'static> Node<P> for NodeGraph<P> {
    fn name(&self) -> &str {
        self.name
    }

    fn input_type(&self) -> Option<TypeInfo> {
        self.initial_fun.as_ref().map(TransitionFn::arg_type)
    }

    fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    fn default_input(&self) -> Option<Value> {
        self.default_input.clone()
    }

    fn start(&self, input: Value, payload: &P) -> Result<Memory, NodeError> {
        let container = self.container(self.initial_node)?;
        let start_input = match &self.initial_fun {
            Some(fun) => {
                let found = input.type_info();
                fun.try_apply(input)
                    .map_err(|_| NodeError::InputMismatch {
                        node: self.name.to_string(),
                        expected: fun.arg_type(),
                        found,
                    })?
            }
            None => container.start_input(),
        };
        let current_node_memory = container.node.start(start_input, payload)?;

        tracing::debug!(graph = self.name, node = container.key, "graph started");

        Ok(Memory::new(GraphMemory {
            current_node: container.key,
            current_node_memory,
        }))
    }

    fn tick(
        &self,
        ctx: &NodeContext<'_, P>,
        memory: &mut Memory,
    ) -> Result<Option<Slot>, NodeError> {
        let memory = memory_mut::<GraphMemory>(self.name, memory)?;
        let mut chained = 0;

        loop {
            let container = self.container(memory.current_node)?;
            let inner = ctx.push_stack_frame(GraphStackFrame::new(
                self.name,
                container.key,
                Arc::clone(&container.registered_slots),
            ));

            let Some(fired) = container
                .node
                .tick(&inner, &mut memory.current_node_memory)?
            else {
                return Ok(None);
            };

            let Some(transition) = self.transition(container.key, fired.key()) else {
                tracing::trace!(
                    graph = self.name,
                    node = container.key,
                    slot = fired.key(),
                    "slot has no transition"
                );
                return Ok(None);
            };

            match transition.destination {
                Destination::Node(dest) => {
                    let target = self.container(dest)?;
                    let input = match &transition.fun {
                        Some(fun) => fun.apply(fired.key(), fired.into_value())?,
                        None => target.start_input(),
                    };
                    let target_memory = target.node.start(input, ctx.payload())?;

                    tracing::debug!(
                        graph = self.name,
                        transition = transition.key,
                        from = container.key,
                        to = target.key,
                        "internal transition"
                    );

                    // The displaced child is dropped without an abort.
                    memory.current_node = target.key;
                    memory.current_node_memory = target_memory;

                    if !inner.is_immediate_transition_allowed() {
                        return Ok(None);
                    }
                    if chained >= self.max_immediate_transitions {
                        tracing::warn!(
                            graph = self.name,
                            node = target.key,
                            limit = self.max_immediate_transitions,
                            "immediate transition budget exhausted, deferring to next tick"
                        );
                        return Ok(None);
                    }
                    chained += 1;
                }
                Destination::Slot(dest) => {
                    let args = match &transition.fun {
                        Some(fun) => fun.apply(fired.key(), fired.into_value())?,
                        None => self.slot_default(dest),
                    };
                    if inner.is_immediate_transition_allowed() {
                        ctx.allow_immediate_transition();
                    }

                    tracing::debug!(
                        graph = self.name,
                        transition = transition.key,
                        from = container.key,
                        slot = dest,
                        "external transition"
                    );

                    return Ok(Some(Slot::with_value(dest, args)));
                }
            }
        }
    }

    fn abort(&self, reason: AbortReason, memory: &mut Memory, payload: &P) -> Result<(), NodeError> {
        let memory = memory_mut::<GraphMemory>(self.name, memory)?;
        let container = self.container(memory.current_node)?;
        tracing::debug!(graph = self.name, node = container.key, %reason, "graph aborted");
        container
            .node
            .abort(reason, &mut memory.current_node_memory, payload)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphBuilder
// ─────────────────────────────────────────────────────────────────────────────

struct NodeEntry<P> {
    key: NodeKey,
    node: NodeRef<P>,
    default_input: Option<Value>,
}

struct GraphSlot {
    spec: SlotSpec,
    default_args: Option<Value>,
}

/// Builder for a [`NodeGraph`].
///
/// Methods chain on `&mut Self`; [`build`](Self::build) validates everything
/// at once and reports every problem found.
pub struct GraphBuilder<P> {
    name: &'static str,
    nodes: Vec<NodeEntry<P>>,
    slots: Vec<GraphSlot>,
    transitions: Vec<Transition>,
    initial_node: Option<NodeKey>,
    initial_fun: Option<TransitionFn>,
    default_input: Option<Value>,
    max_immediate_transitions: usize,
}

impl<P: 'static> GraphBuilder<P> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            nodes: Vec::new(),
            slots: Vec::new(),
            transitions: Vec::new(),
            initial_node: None,
            initial_fun: None,
            default_input: None,
            max_immediate_transitions: NodeGraph::<P>::DEFAULT_MAX_IMMEDIATE_TRANSITIONS,
        }
    }

    /// Returns the name of the graph being built.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Children
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a child under `key`.
    pub fn add_node(&mut self, key: NodeKey, node: impl Node<P>) -> &mut Self {
        self.add_shared_node(key, Arc::new(node))
    }

    /// Adds a child under `key` with the input used when it is entered
    /// without a transition function.
    pub fn add_node_with_input<T>(&mut self, key: NodeKey, node: impl Node<P>, input: T) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.nodes.push(NodeEntry {
            key,
            node: Arc::new(node),
            default_input: Some(Value::new(input)),
        });
        self
    }

    /// Adds an already shared child. The same instance may appear under
    /// several keys and in several graphs.
    pub fn add_shared_node(&mut self, key: NodeKey, node: NodeRef<P>) -> &mut Self {
        self.nodes.push(NodeEntry {
            key,
            node,
            default_input: None,
        });
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Slots
    // ─────────────────────────────────────────────────────────────────────────

    /// Declares a graph slot without arguments.
    pub fn add_slot(&mut self, key: SlotKey) -> &mut Self {
        self.slots.push(GraphSlot {
            spec: SlotSpec::empty(key),
            default_args: None,
        });
        self
    }

    /// Declares a graph slot carrying arguments of type `A`. Every external
    /// transition into it needs a function.
    pub fn add_slot_with_args<A: 'static>(&mut self, key: SlotKey) -> &mut Self {
        self.slots.push(GraphSlot {
            spec: SlotSpec::with_args::<A>(key),
            default_args: None,
        });
        self
    }

    /// Declares a graph slot carrying arguments of type `A`, fired with
    /// `default` by external transitions without a function.
    pub fn add_slot_with_default<A>(&mut self, key: SlotKey, default: A) -> &mut Self
    where
        A: Clone + Send + Sync + 'static,
    {
        self.slots.push(GraphSlot {
            spec: SlotSpec::with_args::<A>(key),
            default_args: Some(Value::new(default)),
        });
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Moves to child `dest` when `source` fires `slot`; `dest` starts with
    /// its default input.
    pub fn add_internal_transition(
        &mut self,
        key: TransitionKey,
        source: NodeKey,
        slot: SlotKey,
        dest: NodeKey,
    ) -> &mut Self {
        self.push_transition(key, source, slot, Destination::Node(dest), None)
    }

    /// Moves to child `dest` when `source` fires `slot`; `dest` starts with
    /// `fun(slot args)`.
    pub fn add_internal_transition_with<A, B, F>(
        &mut self,
        key: TransitionKey,
        source: NodeKey,
        slot: SlotKey,
        dest: NodeKey,
        fun: F,
    ) -> &mut Self
    where
        A: Clone + Send + Sync + 'static,
        B: Clone + Send + Sync + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let fun = TransitionFn::new(fun);
        self.push_transition(key, source, slot, Destination::Node(dest), Some(fun))
    }

    /// Fires the graph's own slot `dest` when `source` fires `slot`, with the
    /// slot's default arguments.
    pub fn add_external_transition(
        &mut self,
        key: TransitionKey,
        source: NodeKey,
        slot: SlotKey,
        dest: SlotKey,
    ) -> &mut Self {
        self.push_transition(key, source, slot, Destination::Slot(dest), None)
    }

    /// Fires the graph's own slot `dest` with `fun(slot args)` when `source`
    /// fires `slot`.
    pub fn add_external_transition_with<A, B, F>(
        &mut self,
        key: TransitionKey,
        source: NodeKey,
        slot: SlotKey,
        dest: SlotKey,
        fun: F,
    ) -> &mut Self
    where
        A: Clone + Send + Sync + 'static,
        B: Clone + Send + Sync + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let fun = TransitionFn::new(fun);
        self.push_transition(key, source, slot, Destination::Slot(dest), Some(fun))
    }

    fn push_transition(
        &mut self,
        key: TransitionKey,
        source_node: NodeKey,
        source_slot: SlotKey,
        destination: Destination,
        fun: Option<TransitionFn>,
    ) -> &mut Self {
        self.transitions.push(Transition {
            key,
            source_node,
            source_slot,
            destination,
            fun,
        });
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Start
    // ─────────────────────────────────────────────────────────────────────────

    /// Sets the child started first, with its default input.
    pub fn initial_node(&mut self, key: NodeKey) -> &mut Self {
        self.initial_node = Some(key);
        self.initial_fun = None;
        self
    }

    /// Sets the child started first, with `fun(graph input)` as its input.
    pub fn initial_node_with<A, B, F>(&mut self, key: NodeKey, fun: F) -> &mut Self
    where
        A: Clone + Send + Sync + 'static,
        B: Clone + Send + Sync + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.initial_node = Some(key);
        self.initial_fun = Some(TransitionFn::new(fun));
        self
    }

    /// Sets the input a parent uses when it enters this graph without a
    /// transition function.
    pub fn default_input<T>(&mut self, input: T) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.default_input = Some(Value::new(input));
        self
    }

    /// Bounds how many immediate transitions may chain within one tick.
    pub fn max_immediate_transitions(&mut self, max: usize) -> &mut Self {
        self.max_immediate_transitions = max;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Build
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates the graph and builds its transition index.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] listing every [`ValidationError`] found:
    /// duplicate keys, dangling references, type mismatches between slots,
    /// functions and inputs, and a missing initial node.
    pub fn build(mut self) -> Result<NodeGraph<P>, BuildError> {
        let mut errors = Vec::new();

        let mut containers: HashMap<NodeKey, NodeContainer<P>> = HashMap::new();
        for entry in core::mem::take(&mut self.nodes) {
            if containers.contains_key(entry.key) {
                errors.push(ValidationError::DuplicateKey {
                    kind: KeyKind::Node,
                    key: entry.key.to_string(),
                });
                continue;
            }
            if let (Some(default), Some(expected)) = (&entry.default_input, entry.node.input_type())
                && default.type_info() != expected
            {
                errors.push(ValidationError::ArityMismatch {
                    context: format!("default input of node '{}'", entry.key),
                    expected,
                    found: default.type_info(),
                });
            }
            let default_input = entry.default_input.or_else(|| entry.node.default_input());
            containers.insert(
                entry.key,
                NodeContainer {
                    key: entry.key,
                    node: entry.node,
                    default_input,
                    registered_slots: Arc::from([]),
                },
            );
        }

        let mut slots: HashMap<SlotKey, &GraphSlot> = HashMap::new();
        for slot in &self.slots {
            if slots.insert(slot.spec.key(), slot).is_some() {
                errors.push(ValidationError::DuplicateKey {
                    kind: KeyKind::Slot,
                    key: slot.spec.key().to_string(),
                });
            }
        }

        let mut index = TransitionIndex::default();
        let mut transition_keys = HashSet::new();
        for (position, transition) in self.transitions.iter().enumerate() {
            if !transition_keys.insert(transition.key) {
                errors.push(ValidationError::DuplicateKey {
                    kind: KeyKind::Transition,
                    key: transition.key.to_string(),
                });
                continue;
            }
            if let Some(existing) =
                index.insert(transition.source_node, transition.source_slot, position)
            {
                errors.push(ValidationError::SlotAlreadyBound {
                    node: transition.source_node,
                    slot: transition.source_slot,
                    existing: self.transitions[existing].key,
                    duplicate: transition.key,
                });
                continue;
            }
            validate_transition(transition, &containers, &slots, &mut errors);
        }

        self.validate_initial(&containers, &mut errors);

        if let Some(default) = &self.default_input
            && let Some(fun) = &self.initial_fun
            && default.type_info() != fun.arg_type()
        {
            errors.push(ValidationError::ArityMismatch {
                context: format!("default input of graph '{}'", self.name),
                expected: fun.arg_type(),
                found: default.type_info(),
            });
        }

        BuildError::check(self.name, errors)?;

        for container in containers.values_mut() {
            let registered: Vec<SlotKey> = self
                .transitions
                .iter()
                .filter(|transition| transition.source_node == container.key)
                .map(|transition| transition.source_slot)
                .collect();
            container.registered_slots = registered.into();
        }

        let slot_defaults = self
            .slots
            .iter()
            .filter_map(|slot| Some((slot.spec.key(), slot.default_args.clone()?)))
            .collect();
        let slot_specs = self.slots.iter().map(|slot| slot.spec).collect();
        let initial_node = self.initial_node.ok_or(BuildError {
            name: self.name,
            errors: vec![ValidationError::Missing {
                what: "initial node",
            }],
        })?;

        tracing::trace!(
            graph = self.name,
            nodes = containers.len(),
            transitions = self.transitions.len(),
            "graph built"
        );

        Ok(NodeGraph {
            name: self.name,
            nodes: containers,
            transitions: self.transitions,
            index,
            slots: slot_specs,
            slot_defaults,
            initial_node,
            initial_fun: self.initial_fun,
            default_input: self.default_input,
            max_immediate_transitions: self.max_immediate_transitions,
        })
    }

    /// Validates the initial node and the way its input is produced.
    fn validate_initial(
        &self,
        containers: &HashMap<NodeKey, NodeContainer<P>>,
        errors: &mut Vec<ValidationError>,
    ) {
        let Some(initial) = self.initial_node else {
            errors.push(ValidationError::Missing {
                what: "initial node",
            });
            return;
        };
        let Some(container) = containers.get(initial) else {
            errors.push(ValidationError::DanglingReference {
                referrer: format!("initial node of '{}'", self.name),
                kind: KeyKind::Node,
                key: initial.to_string(),
            });
            return;
        };
        let referrer = format!("initial node of '{}'", self.name);
        check_input(container, self.initial_fun.as_ref(), referrer, errors);
    }
}

/// Validates one transition against the children and slots of its graph.
///
/// # Rules
///
/// - the source child exists and declares the source slot
/// - a function takes the source slot's argument type
/// - internal: the destination child exists and receives an input of its
///   type, from the function or from its default
/// - external: the destination slot exists and receives arguments of its
///   type, from the function or from its default
fn validate_transition<P: 'static>(
    transition: &Transition,
    containers: &HashMap<NodeKey, NodeContainer<P>>,
    slots: &HashMap<SlotKey, &GraphSlot>,
    errors: &mut Vec<ValidationError>,
) {
    match containers.get(transition.source_node) {
        None => errors.push(ValidationError::DanglingReference {
            referrer: transition.key.to_string(),
            kind: KeyKind::Node,
            key: transition.source_node.to_string(),
        }),
        Some(source) => match find_slot(source.node.slots(), transition.source_slot) {
            None => errors.push(ValidationError::DanglingReference {
                referrer: transition.key.to_string(),
                kind: KeyKind::Slot,
                key: format!("{}.{}", transition.source_node, transition.source_slot),
            }),
            Some(spec) => {
                if let Some(fun) = &transition.fun
                    && fun.arg_type() != spec.value_type()
                {
                    errors.push(ValidationError::ArityMismatch {
                        context: format!("argument of transition '{}'", transition.key),
                        expected: spec.value_type(),
                        found: fun.arg_type(),
                    });
                }
            }
        },
    }

    match transition.destination {
        Destination::Node(dest) => match containers.get(dest) {
            None => errors.push(ValidationError::DanglingReference {
                referrer: transition.key.to_string(),
                kind: KeyKind::Node,
                key: dest.to_string(),
            }),
            Some(container) => check_input(
                container,
                transition.fun.as_ref(),
                transition.key.to_string(),
                errors,
            ),
        },
        Destination::Slot(dest) => match slots.get(dest) {
            None => errors.push(ValidationError::DanglingReference {
                referrer: transition.key.to_string(),
                kind: KeyKind::Slot,
                key: dest.to_string(),
            }),
            Some(slot) => match &transition.fun {
                Some(fun) if fun.output_type() != slot.spec.value_type() => {
                    errors.push(ValidationError::ArityMismatch {
                        context: format!("output of transition '{}'", transition.key),
                        expected: slot.spec.value_type(),
                        found: fun.output_type(),
                    });
                }
                None => {
                    if let Some(expected) = slot.spec.args_type()
                        && slot.default_args.is_none()
                    {
                        errors.push(ValidationError::MissingSlotArgs {
                            slot: dest,
                            transition: transition.key,
                            expected,
                        });
                    }
                }
                Some(_) => {}
            },
        },
    }
}

/// Checks that entering `container` through `fun` (or its default input)
/// yields the input type it expects.
fn check_input<P: 'static>(
    container: &NodeContainer<P>,
    fun: Option<&TransitionFn>,
    referrer: String,
    errors: &mut Vec<ValidationError>,
) {
    let Some(expected) = container.node.input_type() else {
        return;
    };
    match fun {
        Some(fun) if fun.output_type() != expected => {
            errors.push(ValidationError::ArityMismatch {
                context: format!("input of node '{}' from '{}'", container.key, referrer),
                expected,
                found: fun.output_type(),
            });
        }
        Some(_) => {}
        // Explicit defaults were already checked against the input type.
        None if container.default_input.is_some() || expected.is_unit() => {}
        None => errors.push(ValidationError::MissingInput {
            node: container.key,
            referrer,
            expected,
        }),
    }
}
