//! Switches: pick one of several candidates on every tick.
//!
//! A [`SwitchNode`] asks its director which candidate should be active, from
//! the payload alone. Whenever the answer changes, the old candidate is
//! aborted with [`AbortReason::AbortedBySwitch`] and the new one is started
//! with the arguments the switch itself was started with.

use core::fmt::Debug;
use core::hash::Hash;
use std::sync::Arc;

use hashbrown::HashMap;
use hfsm_node::context::NodeContext;
use hfsm_node::error::{BuildError, KeyKind, NodeError, ValidationError};
use hfsm_node::node::{AbortReason, Node, NodeRef, memory_mut};
use hfsm_node::slot::{Slot, SlotSpec};
use hfsm_node::value::{Memory, TypeInfo, Value};

/// Keys a switch can select candidates by.
pub trait SwitchKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T: Eq + Hash + Clone + Debug + Send + Sync + 'static> SwitchKey for T {}

/// Memory of a [`SwitchNode`].
#[derive(Debug)]
pub struct SwitchMemory<K> {
    current_node_key: K,
    current_node_memory: Memory,
    start_args: Value,
    restart_pending: bool,
}

impl<K> SwitchMemory<K> {
    /// Returns the key of the active candidate.
    #[must_use]
    pub fn current_node_key(&self) -> &K {
        &self.current_node_key
    }

    /// Returns the memory of the active candidate.
    #[must_use]
    pub fn current_node_memory(&self) -> &Memory {
        &self.current_node_memory
    }

    /// Returns the arguments the switch was started with.
    #[must_use]
    pub fn start_args(&self) -> &Value {
        &self.start_args
    }

    /// Returns `true` while the active candidate still has to be started.
    ///
    /// Set when a candidate change aborted the old candidate but starting the
    /// new one failed. The next tick retries the start.
    #[must_use]
    pub fn is_restart_pending(&self) -> bool {
        self.restart_pending
    }
}

type Director<P, K> = Box<dyn Fn(&P) -> K + Send + Sync>;

/// A node that delegates to the candidate chosen by a director.
///
/// Construction arguments of the director are whatever its closure
/// captures.
///
/// # Example
///
/// ```
/// use hfsm_graph::prelude::*;
/// use hfsm_node::prelude::*;
///
/// fn idle(name: &'static str) -> LeafTask<u8> {
///     LeafTask::builder(name)
///         .on_tick(|_: TickArgs<'_, u8, (), ()>| None::<Slot>)
///         .build()
///         .unwrap()
/// }
///
/// let threshold = 3;
/// let switch = SwitchNode::builder("Mood", move |energy: &u8| *energy > threshold)
///     .case(true, idle("Play"))
///     .case(false, idle("Rest"))
///     .build()
///     .unwrap();
///
/// let memory = switch.start(Value::unit(), &5).unwrap();
/// let state = memory.downcast_ref::<SwitchMemory<bool>>().unwrap();
/// assert!(*state.current_node_key());
/// ```
pub struct SwitchNode<P, K> {
    name: &'static str,
    director: Director<P, K>,
    candidates: HashMap<K, NodeRef<P>>,
    slots: Vec<SlotSpec>,
    input_type: Option<TypeInfo>,
}

impl<P: 'static, K: SwitchKey> SwitchNode<P, K> {
    /// Starts building a switch.
    #[must_use]
    pub fn builder<F>(name: &'static str, director: F) -> SwitchBuilder<P, K>
    where
        F: Fn(&P) -> K + Send + Sync + 'static,
    {
        SwitchBuilder {
            name,
            director: Box::new(director),
            cases: Vec::new(),
        }
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.candidates.len()
    }

    fn candidate(&self, key: &K) -> Result<&NodeRef<P>, NodeError> {
        self.candidates
            .get(key)
            .ok_or_else(|| NodeError::UnknownCase {
                switch: self.name.to_string(),
                case: format!("{key:?}"),
            })
    }
}

impl<P: 'static, K: SwitchKey> Node<P> for SwitchNode<P, K> {
    fn name(&self) -> &str {
        self.name
    }

    fn input_type(&self) -> Option<TypeInfo> {
        self.input_type
    }

    fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    fn start(&self, input: Value, payload: &P) -> Result<Memory, NodeError> {
        let key = (self.director)(payload);
        let current_node_memory = self.candidate(&key)?.start(input.clone(), payload)?;

        tracing::debug!(switch = self.name, case = ?key, "switch started");

        Ok(Memory::new(SwitchMemory {
            current_node_key: key,
            current_node_memory,
            start_args: input,
            restart_pending: false,
        }))
    }

    fn tick(
        &self,
        ctx: &NodeContext<'_, P>,
        memory: &mut Memory,
    ) -> Result<Option<Slot>, NodeError> {
        let memory = memory_mut::<SwitchMemory<K>>(self.name, memory)?;
        let key = (self.director)(ctx.payload());

        if key != memory.current_node_key || memory.restart_pending {
            let next = self.candidate(&key)?;
            if !memory.restart_pending {
                self.candidate(&memory.current_node_key)?.abort(
                    AbortReason::AbortedBySwitch,
                    &mut memory.current_node_memory,
                    ctx.payload(),
                )?;
            }

            tracing::debug!(
                switch = self.name,
                from = ?memory.current_node_key,
                to = ?key,
                "switch changed candidate"
            );

            // The old candidate is gone; never abort it again.
            memory.current_node_key = key;
            memory.current_node_memory = Memory::empty();
            memory.restart_pending = true;
            memory.current_node_memory = next.start(memory.start_args.clone(), ctx.payload())?;
            memory.restart_pending = false;
        }

        self.candidate(&memory.current_node_key)?
            .tick(ctx, &mut memory.current_node_memory)
    }

    fn abort(&self, reason: AbortReason, memory: &mut Memory, payload: &P) -> Result<(), NodeError> {
        let memory = memory_mut::<SwitchMemory<K>>(self.name, memory)?;
        if memory.restart_pending {
            tracing::trace!(switch = self.name, %reason, "no started candidate to abort");
            return Ok(());
        }
        self.candidate(&memory.current_node_key)?
            .abort(reason, &mut memory.current_node_memory, payload)
    }
}

/// Builder for a [`SwitchNode`].
#[must_use]
pub struct SwitchBuilder<P, K> {
    name: &'static str,
    director: Director<P, K>,
    cases: Vec<(K, NodeRef<P>)>,
}

impl<P: 'static, K: SwitchKey> SwitchBuilder<P, K> {
    /// Registers the candidate selected by `key`.
    pub fn case(self, key: K, node: impl Node<P>) -> Self {
        self.shared_case(key, Arc::new(node))
    }

    /// Registers an already shared candidate.
    pub fn shared_case(mut self, key: K, node: NodeRef<P>) -> Self {
        self.cases.push((key, node));
        self
    }

    /// Validates the candidates and returns the switch.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if there are no candidates, if a key is
    /// registered twice, if candidates expose the same slot key with
    /// different argument types, or if they expect different inputs.
    pub fn build(self) -> Result<SwitchNode<P, K>, BuildError> {
        let mut errors = Vec::new();

        if self.cases.is_empty() {
            errors.push(ValidationError::Missing { what: "switch case" });
        }

        let mut candidates = HashMap::new();
        let mut slots: Vec<SlotSpec> = Vec::new();
        let mut input_type: Option<(TypeInfo, &str)> = None;

        for (key, node) in &self.cases {
            if candidates.contains_key(key) {
                errors.push(ValidationError::DuplicateKey {
                    kind: KeyKind::Case,
                    key: format!("{key:?}"),
                });
                continue;
            }

            for spec in node.slots() {
                match slots.iter().find(|seen| seen.key() == spec.key()) {
                    Some(seen) if seen.value_type() != spec.value_type() => {
                        errors.push(ValidationError::ArityMismatch {
                            context: format!("slot '{}' of case {key:?}", spec.key()),
                            expected: seen.value_type(),
                            found: spec.value_type(),
                        });
                    }
                    Some(_) => {}
                    None => slots.push(*spec),
                }
            }

            if let Some(found) = node.input_type() {
                match input_type {
                    Some((expected, first)) if expected != found => {
                        errors.push(ValidationError::ArityMismatch {
                            context: format!(
                                "input of case {key:?} (first set by '{first}')"
                            ),
                            expected,
                            found,
                        });
                    }
                    Some(_) => {}
                    None => input_type = Some((found, node.name())),
                }
            }

            candidates.insert(key.clone(), Arc::clone(node));
        }

        BuildError::check(self.name, errors)?;

        Ok(SwitchNode {
            name: self.name,
            director: self.director,
            candidates,
            slots,
            input_type: input_type.map(|(found, _)| found),
        })
    }
}
