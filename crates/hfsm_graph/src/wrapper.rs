//! Wrappers: logic layered on top of another node.
//!
//! A [`NodeWrapper`] runs its own logic (any node, usually a leaf task)
//! alongside a wrapped node. On each tick the wrapper logic goes first and
//! may intercept: when it fires, the wrapped node is aborted with
//! [`AbortReason::AbortedByWrapper`]. When the wrapped node fires instead, the
//! wrapper logic is aborted with [`AbortReason::AbortedByWrapped`] and the
//! wrapped slot passes through unchanged.

use hfsm_node::context::NodeContext;
use hfsm_node::error::{BuildError, KeyKind, NodeError, ValidationError};
use hfsm_node::node::{AbortReason, Node, NodeRef, memory_mut};
use hfsm_node::slot::{Slot, SlotSpec};
use hfsm_node::value::{Memory, TypeInfo, Value};
use std::sync::Arc;

use crate::transition::TransitionFn;

/// Memory of a [`NodeWrapper`]: one memory per side.
#[derive(Debug)]
pub struct WrapperMemory {
    wrapped_memory: Memory,
    wrapper_memory: Memory,
}

impl WrapperMemory {
    /// Returns the memory of the wrapped node.
    #[must_use]
    pub fn wrapped_memory(&self) -> &Memory {
        &self.wrapped_memory
    }

    /// Returns the memory of the wrapper logic.
    #[must_use]
    pub fn wrapper_memory(&self) -> &Memory {
        &self.wrapper_memory
    }
}

/// A node that layers wrapper logic on top of a wrapped node.
///
/// Exposes the union of both sides' slots.
pub struct NodeWrapper<P> {
    name: &'static str,
    wrapper: NodeRef<P>,
    wrapped: NodeRef<P>,
    preprocess_input: Option<TransitionFn>,
    slots: Vec<SlotSpec>,
}

impl<P: 'static> NodeWrapper<P> {
    /// Starts building a wrapper around `wrapped`.
    #[must_use]
    pub fn builder(
        name: &'static str,
        wrapper: impl Node<P>,
        wrapped: impl Node<P>,
    ) -> WrapperBuilder<P> {
        WrapperBuilder {
            name,
            wrapper: Arc::new(wrapper),
            wrapped: Arc::new(wrapped),
            preprocess_input: None,
        }
    }

    /// Starts building a wrapper from already shared nodes.
    #[must_use]
    pub fn shared(name: &'static str, wrapper: NodeRef<P>, wrapped: NodeRef<P>) -> WrapperBuilder<P> {
        WrapperBuilder {
            name,
            wrapper,
            wrapped,
            preprocess_input: None,
        }
    }

    /// Input handed to the wrapper logic: the wrapper's own input, or unit
    /// when the logic takes none.
    fn wrapper_input(&self, input: Value) -> Value {
        match self.wrapper.input_type() {
            Some(expected) if expected.is_unit() => Value::unit(),
            _ => input,
        }
    }
}

impl<P: 'static> Node<P> for NodeWrapper<P> {
    fn name(&self) -> &str {
        self.name
    }

    fn input_type(&self) -> Option<TypeInfo> {
        match &self.preprocess_input {
            Some(fun) => Some(fun.arg_type()),
            None => self.wrapped.input_type(),
        }
    }

    fn slots(&self) -> &[SlotSpec] {
        &self.slots
    }

    fn default_input(&self) -> Option<Value> {
        match &self.preprocess_input {
            Some(_) => None,
            None => self.wrapped.default_input(),
        }
    }

    fn start(&self, input: Value, payload: &P) -> Result<Memory, NodeError> {
        let wrapped_input = match &self.preprocess_input {
            Some(fun) => {
                let found = input.type_info();
                fun.try_apply(input.clone())
                    .map_err(|_| NodeError::InputMismatch {
                        node: self.name.to_string(),
                        expected: fun.arg_type(),
                        found,
                    })?
            }
            None => input.clone(),
        };
        let wrapped_memory = self.wrapped.start(wrapped_input, payload)?;
        let wrapper_memory = self.wrapper.start(self.wrapper_input(input), payload)?;

        Ok(Memory::new(WrapperMemory {
            wrapped_memory,
            wrapper_memory,
        }))
    }

    fn tick(
        &self,
        ctx: &NodeContext<'_, P>,
        memory: &mut Memory,
    ) -> Result<Option<Slot>, NodeError> {
        let memory = memory_mut::<WrapperMemory>(self.name, memory)?;

        let wrapper_ctx = ctx.sibling();
        if let Some(slot) = self.wrapper.tick(&wrapper_ctx, &mut memory.wrapper_memory)? {
            tracing::debug!(
                wrapper = self.name,
                slot = slot.key(),
                wrapped = self.wrapped.name(),
                "wrapper intercepted"
            );
            self.wrapped.abort(
                AbortReason::AbortedByWrapper,
                &mut memory.wrapped_memory,
                ctx.payload(),
            )?;
            forward_immediate(&wrapper_ctx, ctx);
            return Ok(Some(slot));
        }

        let wrapped_ctx = ctx.sibling();
        if let Some(slot) = self.wrapped.tick(&wrapped_ctx, &mut memory.wrapped_memory)? {
            self.wrapper.abort(
                AbortReason::AbortedByWrapped,
                &mut memory.wrapper_memory,
                ctx.payload(),
            )?;
            forward_immediate(&wrapped_ctx, ctx);
            return Ok(Some(slot));
        }

        Ok(None)
    }

    fn abort(&self, reason: AbortReason, memory: &mut Memory, payload: &P) -> Result<(), NodeError> {
        let memory = memory_mut::<WrapperMemory>(self.name, memory)?;
        let wrapper = self.wrapper.abort(reason, &mut memory.wrapper_memory, payload);
        let wrapped = self.wrapped.abort(reason, &mut memory.wrapped_memory, payload);
        wrapper.and(wrapped)
    }
}

/// Raises the immediate flag on `outer` if the side that fired asked for it.
fn forward_immediate<P>(side: &NodeContext<'_, P>, outer: &NodeContext<'_, P>) {
    if side.is_immediate_transition_allowed() {
        outer.allow_immediate_transition();
    }
}

/// Builder for a [`NodeWrapper`].
#[must_use]
pub struct WrapperBuilder<P> {
    name: &'static str,
    wrapper: NodeRef<P>,
    wrapped: NodeRef<P>,
    preprocess_input: Option<TransitionFn>,
}

impl<P: 'static> WrapperBuilder<P> {
    /// Converts the wrapper's input before it reaches the wrapped node.
    pub fn preprocess_input<A, B, F>(mut self, fun: F) -> Self
    where
        A: Clone + Send + Sync + 'static,
        B: Clone + Send + Sync + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.preprocess_input = Some(TransitionFn::new(fun));
        self
    }

    /// Validates the combination and returns the wrapper.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if both sides expose a slot with the same key,
    /// if the preprocessing function does not produce the wrapped node's
    /// input, or if the wrapper logic expects a different input than the
    /// wrapper receives.
    pub fn build(self) -> Result<NodeWrapper<P>, BuildError> {
        let mut errors = Vec::new();

        let mut slots = self.wrapper.slots().to_vec();
        for spec in self.wrapped.slots() {
            if slots.iter().any(|seen| seen.key() == spec.key()) {
                errors.push(ValidationError::DuplicateKey {
                    kind: KeyKind::Slot,
                    key: spec.key().to_string(),
                });
            } else {
                slots.push(*spec);
            }
        }

        if let Some(fun) = &self.preprocess_input
            && let Some(expected) = self.wrapped.input_type()
            && fun.output_type() != expected
        {
            errors.push(ValidationError::ArityMismatch {
                context: format!("preprocessed input of '{}'", self.wrapped.name()),
                expected,
                found: fun.output_type(),
            });
        }

        let input = match &self.preprocess_input {
            Some(fun) => Some(fun.arg_type()),
            None => self.wrapped.input_type(),
        };
        if let Some(logic) = self.wrapper.input_type()
            && !logic.is_unit()
            && input != Some(logic)
        {
            errors.push(ValidationError::ArityMismatch {
                context: format!("input of wrapper logic '{}'", self.wrapper.name()),
                expected: logic,
                found: input.unwrap_or_else(TypeInfo::unit),
            });
        }

        BuildError::check(self.name, errors)?;

        Ok(NodeWrapper {
            name: self.name,
            wrapper: self.wrapper,
            wrapped: self.wrapped,
            preprocess_input: self.preprocess_input,
            slots,
        })
    }
}
