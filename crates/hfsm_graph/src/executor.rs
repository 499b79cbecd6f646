//! Driving a node tree from the outside.
//!
//! The [`Executor`] owns everything one agent needs across ticks: a shared
//! root node and that root's memory. The host calls
//! [`start`](Executor::start) once, [`tick`](Executor::tick) on every external
//! tick and [`abort`](Executor::abort) when the agent goes away. Many
//! executors can share one root node, on any number of threads.
//!
//! # Example
//!
//! ```
//! use hfsm_graph::prelude::*;
//! use hfsm_node::prelude::*;
//!
//! let wait = LeafTask::builder("Wait")
//!     .slot("Done")
//!     .on_start(|ticks: u32, _: &(), _: &()| ticks)
//!     .on_tick(|args: TickArgs<'_, (), u32, ()>| {
//!         *args.memory = args.memory.saturating_sub(1);
//!         (*args.memory == 0).then_some("Done")
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut executor = Executor::new(wait);
//! executor.start(Value::new(2_u32), &()).unwrap();
//! assert!(executor.tick(&()).unwrap().is_none());
//! assert_eq!(executor.tick(&()).unwrap().map(|slot| slot.key()), Some("Done"));
//! assert_eq!(executor.ticks(), 2);
//! ```

use std::sync::Arc;

use hfsm_node::context::NodeContext;
use hfsm_node::error::NodeError;
use hfsm_node::node::{AbortReason, Node, NodeRef};
use hfsm_node::slot::Slot;
use hfsm_node::value::{Memory, Value};

/// Errors that can occur while driving a tree.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// `tick` or `abort` was called before `start`.
    #[error("'{0}' has not been started")]
    NotStarted(String),

    /// `start` was called while the tree was running.
    #[error("'{0}' is already running")]
    AlreadyStarted(String),

    /// A node failed.
    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Runs one agent's instance of a node tree.
pub struct Executor<P> {
    root: NodeRef<P>,
    memory: Option<Memory>,
    ticks: u64,
}

impl<P: 'static> Executor<P> {
    /// Creates an executor for a root node it owns.
    #[must_use]
    pub fn new(root: impl Node<P>) -> Self {
        Self::shared(Arc::new(root))
    }

    /// Creates an executor for a root node shared with other executors.
    #[must_use]
    pub fn shared(root: NodeRef<P>) -> Self {
        Self {
            root,
            memory: None,
            ticks: 0,
        }
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> &NodeRef<P> {
        &self.root
    }

    /// Returns `true` between `start` and `abort`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.memory.is_some()
    }

    /// Returns the root's memory while running.
    #[must_use]
    pub fn memory(&self) -> Option<&Memory> {
        self.memory.as_ref()
    }

    /// Returns the number of ticks since the last start.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Starts the root with `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::AlreadyStarted`] while running, or the
    /// root's start error.
    pub fn start(&mut self, input: Value, payload: &P) -> Result<(), ExecutionError> {
        if self.memory.is_some() {
            return Err(ExecutionError::AlreadyStarted(self.root.name().to_string()));
        }
        let memory = self.root.start(input, payload)?;
        tracing::info!(root = self.root.name(), "executor started");
        self.memory = Some(memory);
        self.ticks = 0;
        Ok(())
    }

    /// Starts the root with its default input, or unit.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub fn start_default(&mut self, payload: &P) -> Result<(), ExecutionError> {
        let input = self.root.default_input().unwrap_or_else(Value::unit);
        self.start(input, payload)
    }

    /// Ticks the root once.
    ///
    /// Returns the slot the root fired, if any. The tree keeps running
    /// either way; the host decides what a root-level slot means.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::NotStarted`] before `start`, or the first
    /// node error raised during the tick.
    pub fn tick(&mut self, payload: &P) -> Result<Option<Slot>, ExecutionError> {
        let Some(memory) = self.memory.as_mut() else {
            return Err(ExecutionError::NotStarted(self.root.name().to_string()));
        };
        self.ticks += 1;

        let span = tracing::debug_span!("tick", root = self.root.name(), tick = self.ticks);
        let _enter = span.enter();

        let ctx = NodeContext::new(payload);
        let fired = self.root.tick(&ctx, memory)?;
        if let Some(slot) = &fired {
            tracing::debug!(slot = slot.key(), "root fired slot");
        }
        Ok(fired)
    }

    /// Aborts the root and drops its memory.
    ///
    /// The executor is stopped afterwards even if the abort fails.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::NotStarted`] before `start`, or the abort
    /// error of the tree.
    pub fn abort(&mut self, reason: AbortReason, payload: &P) -> Result<(), ExecutionError> {
        let Some(mut memory) = self.memory.take() else {
            return Err(ExecutionError::NotStarted(self.root.name().to_string()));
        };
        tracing::info!(root = self.root.name(), %reason, ticks = self.ticks, "executor aborted");
        self.root.abort(reason, &mut memory, payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hfsm_node::leaf::{LeafTask, TickArgs};

    fn idle() -> LeafTask<()> {
        LeafTask::builder("Idle")
            .on_tick(|_: TickArgs<'_, (), (), ()>| None::<Slot>)
            .build()
            .unwrap()
    }

    #[test]
    fn tick_before_start_fails() {
        let mut executor = Executor::new(idle());
        assert!(matches!(executor.tick(&()), Err(ExecutionError::NotStarted(_))));
        assert!(matches!(
            executor.abort(AbortReason::AbortedByDeath, &()),
            Err(ExecutionError::NotStarted(_))
        ));
    }

    #[test]
    fn double_start_fails() {
        let mut executor = Executor::new(idle());
        executor.start_default(&()).unwrap();
        let err = executor.start_default(&()).unwrap_err();
        assert_eq!(err.to_string(), "'Idle' is already running");
    }

    #[test]
    fn abort_stops_and_allows_restart() {
        let mut executor = Executor::new(idle());
        executor.start_default(&()).unwrap();
        executor.tick(&()).unwrap();
        executor.abort(AbortReason::AbortedByDeath, &()).unwrap();

        assert!(!executor.is_running());
        assert!(executor.memory().is_none());

        executor.start_default(&()).unwrap();
        assert!(executor.is_running());
        assert_eq!(executor.ticks(), 0);
    }

    #[test]
    fn start_errors_leave_executor_stopped() {
        let mut executor = Executor::new(idle());
        let err = executor.start(Value::new(1_u8), &()).unwrap_err();
        assert!(matches!(err, ExecutionError::Node(NodeError::InputMismatch { .. })));
        assert!(!executor.is_running());
    }
}
