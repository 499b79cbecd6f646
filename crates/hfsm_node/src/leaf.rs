//! Leaf tasks: user behavior written as plain closures.
//!
//! A leaf is assembled with [`LeafTask::builder`]:
//!
//! 1. declare slots with [`slot`](LeafTaskBuilder::slot) and
//!    [`slot_with_args`](LeafTaskBuilder::slot_with_args),
//! 2. optionally compute a constant state once with
//!    [`create`](LeafTaskBuilder::create),
//! 3. optionally build the memory from the start input with
//!    [`on_start`](LeafTaskBuilder::on_start),
//! 4. provide the tick logic with [`on_tick`](LeafTaskBuilder::on_tick),
//! 5. optionally handle cancellation with [`on_abort`](ReadyLeafTask::on_abort),
//!    then [`build`](ReadyLeafTask::build).
//!
//! # Example
//!
//! ```
//! use hfsm_node::prelude::*;
//!
//! struct Unit {
//!     cargo: u32,
//! }
//!
//! let harvest = LeafTask::builder("Harvest")
//!     .slot_with_args::<u32>("Full")
//!     .create(|| 50_u32)
//!     .on_start(|rate: u32, _capacity: &u32, _unit: &Unit| rate)
//!     .on_tick(|args: TickArgs<'_, Unit, u32, u32>| {
//!         (args.payload.cargo >= *args.constant_state)
//!             .then(|| Slot::with_args("Full", args.payload.cargo))
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(harvest.name(), "Harvest");
//! ```

use crate::context::NodeContext;
use crate::error::{BuildError, KeyKind, NodeError, ValidationError};
use crate::node::{AbortReason, Node, find_slot, memory_mut, take_input};
use crate::slot::{Slot, SlotKey, SlotSpec};
use crate::value::{Memory, TypeInfo, Value};

/// Everything a leaf's tick logic can see.
///
/// The payload is a separate field, so its contents can never shadow the
/// context, the memory or the constant state.
pub struct TickArgs<'a, P, M, C> {
    /// The current context.
    pub context: &'a NodeContext<'a, P>,
    /// The leaf's memory, mutable in place.
    pub memory: &'a mut M,
    /// The state computed once at construction.
    pub constant_state: &'a C,
    /// The payload of the current tick.
    pub payload: &'a P,
}

/// Return types accepted from tick logic.
pub trait IntoTickResult {
    /// Converts into the result of [`Node::tick`].
    fn into_tick_result(self) -> Result<Option<Slot>, NodeError>;
}

impl IntoTickResult for Option<Slot> {
    fn into_tick_result(self) -> Result<Option<Slot>, NodeError> {
        Ok(self)
    }
}

impl IntoTickResult for Option<SlotKey> {
    fn into_tick_result(self) -> Result<Option<Slot>, NodeError> {
        Ok(self.map(Slot::empty))
    }
}

impl<E: Into<NodeError>> IntoTickResult for Result<Option<Slot>, E> {
    fn into_tick_result(self) -> Result<Option<Slot>, NodeError> {
        self.map_err(Into::into)
    }
}

type StartFn<P, I, C, M> = Box<dyn Fn(I, &C, &P) -> M + Send + Sync>;
type TickFn<P, M, C> =
    Box<dyn for<'a> Fn(TickArgs<'a, P, M, C>) -> Result<Option<Slot>, NodeError> + Send + Sync>;
type AbortFn<P, M> = Box<dyn Fn(AbortReason, &mut M, &P) + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// LeafTask
// ─────────────────────────────────────────────────────────────────────────────

/// A node whose behavior is a set of closures.
///
/// - `P`: payload type.
/// - `I`: start input type (`()` without [`on_start`](LeafTaskBuilder::on_start)).
/// - `C`: constant state type (`()` without [`create`](LeafTaskBuilder::create)).
/// - `M`: memory type (`()` without [`on_start`](LeafTaskBuilder::on_start)).
pub struct LeafTask<P, I = (), C = (), M = ()> {
    name: &'static str,
    slots: Vec<SlotSpec>,
    constant_state: C,
    start: StartFn<P, I, C, M>,
    tick: TickFn<P, M, C>,
    abort: Option<AbortFn<P, M>>,
}

impl<P: 'static> LeafTask<P> {
    /// Starts building a leaf task.
    #[must_use]
    pub fn builder(name: &'static str) -> LeafTaskBuilder<P> {
        LeafTaskBuilder {
            name,
            slots: Vec::new(),
            constant_state: (),
            start: Box::new(|(), _: &(), _: &P| ()),
        }
    }
}

impl<P, I, C, M> LeafTask<P, I, C, M> {
    /// Returns the state computed once at construction.
    #[must_use]
    pub fn constant_state(&self) -> &C {
        &self.constant_state
    }

    fn check_fired(&self, slot: &Slot) -> Result<(), NodeError> {
        let Some(spec) = find_slot(&self.slots, slot.key()) else {
            return Err(NodeError::UndeclaredSlot {
                node: self.name.to_string(),
                slot: slot.key(),
            });
        };
        if spec.value_type() != slot.value_type() {
            return Err(NodeError::ArgsMismatch {
                slot: slot.key(),
                expected: spec.value_type(),
                found: slot.value_type(),
            });
        }
        Ok(())
    }
}

impl<P, I, C, M> Node<P> for LeafTask<P, I, C, M>
where
    P: 'static,
    I: Clone + Send + Sync + 'static,
    C: Send + Sync + 'static,
    M: Send + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn input_type(&self) -> Option<TypeInfo> {
        Some(TypeInfo::of::<I>())
    }

    fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    fn start(&self, input: Value, payload: &P) -> Result<Memory, NodeError> {
        let input = take_input::<I>(self.name, input)?;
        Ok(Memory::new((self.start)(input, &self.constant_state, payload)))
    }

    fn tick(
        &self,
        ctx: &NodeContext<'_, P>,
        memory: &mut Memory,
    ) -> Result<Option<Slot>, NodeError> {
        let memory = memory_mut::<M>(self.name, memory)?;
        let fired = (self.tick)(TickArgs {
            context: ctx,
            memory,
            constant_state: &self.constant_state,
            payload: ctx.payload(),
        })?;
        if let Some(slot) = &fired {
            self.check_fired(slot)?;
            tracing::trace!(node = self.name, slot = slot.key(), "leaf fired slot");
        }
        Ok(fired)
    }

    fn abort(&self, reason: AbortReason, memory: &mut Memory, payload: &P) -> Result<(), NodeError> {
        if let Some(abort) = &self.abort {
            abort(reason, memory_mut::<M>(self.name, memory)?, payload);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for a [`LeafTask`] before its tick logic is known.
#[must_use]
pub struct LeafTaskBuilder<P, I = (), C = (), M = ()> {
    name: &'static str,
    slots: Vec<SlotSpec>,
    constant_state: C,
    start: StartFn<P, I, C, M>,
}

impl<P, I, C, M> LeafTaskBuilder<P, I, C, M> {
    /// Declares a slot without arguments.
    pub fn slot(mut self, key: SlotKey) -> Self {
        self.slots.push(SlotSpec::empty(key));
        self
    }

    /// Declares a slot carrying arguments of type `A`.
    pub fn slot_with_args<A: 'static>(mut self, key: SlotKey) -> Self {
        self.slots.push(SlotSpec::with_args::<A>(key));
        self
    }

    /// Sets the tick logic.
    ///
    /// The closure may return `Option<Slot>`, `Option<&'static str>` or
    /// `Result<Option<Slot>, E>` with `E: Into<NodeError>`.
    pub fn on_tick<F, R>(self, tick: F) -> ReadyLeafTask<P, I, C, M>
    where
        F: for<'a> Fn(TickArgs<'a, P, M, C>) -> R + Send + Sync + 'static,
        R: IntoTickResult,
    {
        let tick: TickFn<P, M, C> =
            Box::new(move |args: TickArgs<'_, P, M, C>| tick(args).into_tick_result());
        ReadyLeafTask {
            name: self.name,
            slots: self.slots,
            constant_state: self.constant_state,
            start: self.start,
            tick,
            abort: None,
        }
    }
}

impl<P: 'static> LeafTaskBuilder<P> {
    /// Computes the constant state once, now.
    pub fn create<C, F>(self, create: F) -> LeafTaskBuilder<P, (), C, ()>
    where
        C: Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        let start = self.start;
        LeafTaskBuilder {
            name: self.name,
            slots: self.slots,
            constant_state: create(),
            start: Box::new(move |input: (), _: &C, payload: &P| start(input, &(), payload)),
        }
    }
}

impl<P: 'static, C> LeafTaskBuilder<P, (), C, ()> {
    /// Sets the start logic, which turns the start input into fresh memory.
    pub fn on_start<I, M, F>(self, start: F) -> LeafTaskBuilder<P, I, C, M>
    where
        F: Fn(I, &C, &P) -> M + Send + Sync + 'static,
    {
        LeafTaskBuilder {
            name: self.name,
            slots: self.slots,
            constant_state: self.constant_state,
            start: Box::new(start),
        }
    }
}

/// Builder for a [`LeafTask`] whose tick logic is set.
#[must_use]
pub struct ReadyLeafTask<P, I, C, M> {
    name: &'static str,
    slots: Vec<SlotSpec>,
    constant_state: C,
    start: StartFn<P, I, C, M>,
    tick: TickFn<P, M, C>,
    abort: Option<AbortFn<P, M>>,
}

impl<P, I, C, M> ReadyLeafTask<P, I, C, M> {
    /// Declares a slot without arguments.
    pub fn slot(mut self, key: SlotKey) -> Self {
        self.slots.push(SlotSpec::empty(key));
        self
    }

    /// Declares a slot carrying arguments of type `A`.
    pub fn slot_with_args<A: 'static>(mut self, key: SlotKey) -> Self {
        self.slots.push(SlotSpec::with_args::<A>(key));
        self
    }

    /// Sets the cancellation logic.
    pub fn on_abort<F>(mut self, abort: F) -> Self
    where
        F: Fn(AbortReason, &mut M, &P) + Send + Sync + 'static,
    {
        self.abort = Some(Box::new(abort));
        self
    }

    /// Validates the slot declarations and returns the task.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if a slot key is declared twice.
    pub fn build(self) -> Result<LeafTask<P, I, C, M>, BuildError> {
        let mut errors = Vec::new();
        for (index, spec) in self.slots.iter().enumerate() {
            if self.slots[..index].iter().any(|seen| seen.key() == spec.key()) {
                errors.push(ValidationError::DuplicateKey {
                    kind: KeyKind::Slot,
                    key: spec.key().to_string(),
                });
            }
        }
        BuildError::check(self.name, errors)?;

        Ok(LeafTask {
            name: self.name,
            slots: self.slots,
            constant_state: self.constant_state,
            start: self.start,
            tick: self.tick,
            abort: self.abort,
        })
    }
}
