//! Shared test utilities for `hfsm_graph` integration tests.
//!
//! This module provides a scriptable [`Probe`] node and the [`CallLog`] it
//! records into. Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not every item is used by every test binary"
)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use hfsm_node::prelude::*;

// ═══════════════════════════════════════════════════════════════════════════════
// CALL LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// One recorded call into a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `start`, with the input if it was a `u32`.
    Start(&'static str, Option<u32>),
    /// `tick`.
    Tick(&'static str),
    /// `abort`.
    Abort(&'static str, AbortReason),
}

/// Ordered record of calls shared by many probes.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Returns every call so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns and forgets every call so far.
    pub fn take(&self) -> Vec<Call> {
        core::mem::take(&mut *self.calls.lock().unwrap())
    }

    /// Returns the aborts so far.
    pub fn aborts(&self) -> Vec<(&'static str, AbortReason)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Abort(node, reason) => Some((node, reason)),
                _ => None,
            })
            .collect()
    }

    /// Returns the starts so far.
    pub fn starts(&self) -> Vec<(&'static str, Option<u32>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Start(node, input) => Some((node, input)),
                _ => None,
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROBE NODE
// ═══════════════════════════════════════════════════════════════════════════════

/// One scripted tick outcome.
#[derive(Clone)]
struct Step {
    slot: Option<Slot>,
    immediate: bool,
}

/// Memory of a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeMemory {
    pub input: Option<u32>,
    pub ticks: u32,
}

/// A node that records every call and fires slots from a script.
///
/// Clones share the log, the script and the last seen stack, so a test can
/// keep one clone while the graph owns another. Works with any payload.
#[derive(Clone)]
pub struct Probe {
    name: &'static str,
    slots: Vec<SlotSpec>,
    input: Option<TypeInfo>,
    log: CallLog,
    script: Arc<Mutex<VecDeque<Step>>>,
    last_stack: Arc<Mutex<Vec<GraphStackFrame>>>,
}

impl Probe {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            slots: Vec::new(),
            input: Some(TypeInfo::unit()),
            log: log.clone(),
            script: Arc::default(),
            last_stack: Arc::default(),
        }
    }

    /// Declares an empty slot.
    pub fn slot(mut self, key: SlotKey) -> Self {
        self.slots.push(SlotSpec::empty(key));
        self
    }

    /// Declares a slot carrying `T`.
    pub fn slot_with_args<T: 'static>(mut self, key: SlotKey) -> Self {
        self.slots.push(SlotSpec::with_args::<T>(key));
        self
    }

    /// Makes the probe take a `T` as start input.
    pub fn input<T: 'static>(mut self) -> Self {
        self.input = Some(TypeInfo::of::<T>());
        self
    }

    /// Makes the probe accept and ignore any input.
    pub fn any_input(mut self) -> Self {
        self.input = None;
        self
    }

    /// Queues a tick that fires nothing.
    pub fn then_idle(&self) -> &Self {
        self.push(None, false)
    }

    /// Queues a tick that fires `slot`.
    pub fn then_fire(&self, slot: impl Into<Slot>) -> &Self {
        self.push(Some(slot.into()), false)
    }

    /// Queues a tick that fires `slot` and allows an immediate transition.
    pub fn then_fire_immediately(&self, slot: impl Into<Slot>) -> &Self {
        self.push(Some(slot.into()), true)
    }

    /// Returns the stack seen on the most recent tick.
    pub fn last_stack(&self) -> Vec<GraphStackFrame> {
        self.last_stack.lock().unwrap().clone()
    }

    fn push(&self, slot: Option<Slot>, immediate: bool) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Step { slot, immediate });
        self
    }
}

impl<P: 'static> Node<P> for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn input_type(&self) -> Option<TypeInfo> {
        self.input
    }

    fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    fn start(&self, input: Value, _payload: &P) -> Result<Memory, NodeError> {
        if let Some(expected) = self.input
            && input.type_info() != expected
        {
            return Err(NodeError::InputMismatch {
                node: self.name.to_string(),
                expected,
                found: input.type_info(),
            });
        }
        let input = input.downcast_ref::<u32>().copied();
        self.log.record(Call::Start(self.name, input));
        Ok(Memory::new(ProbeMemory { input, ticks: 0 }))
    }

    fn tick(
        &self,
        ctx: &NodeContext<'_, P>,
        memory: &mut Memory,
    ) -> Result<Option<Slot>, NodeError> {
        self.log.record(Call::Tick(self.name));
        *self.last_stack.lock().unwrap() = ctx.stack().to_vec();
        if let Some(memory) = memory.downcast_mut::<ProbeMemory>() {
            memory.ticks += 1;
        }

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step { slot, immediate }) => {
                if immediate {
                    ctx.allow_immediate_transition();
                }
                Ok(slot)
            }
            None => Ok(None),
        }
    }

    fn abort(&self, reason: AbortReason, _memory: &mut Memory, _payload: &P) -> Result<(), NodeError> {
        self.log.record(Call::Abort(self.name, reason));
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMORY HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Returns the active child of a graph memory.
pub fn current_node(memory: &Memory) -> NodeKey {
    memory
        .downcast_ref::<hfsm_graph::GraphMemory>()
        .expect("graph memory")
        .current_node()
}

/// Returns the probe memory of the active child of a graph memory.
pub fn current_probe(memory: &Memory) -> ProbeMemory {
    memory
        .downcast_ref::<hfsm_graph::GraphMemory>()
        .expect("graph memory")
        .current_node_memory()
        .downcast_ref::<ProbeMemory>()
        .expect("probe memory")
        .clone()
}
