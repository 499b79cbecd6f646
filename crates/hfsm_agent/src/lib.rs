//! Behavior trait for defining reusable state machines.
//!
//! The `Behavior` trait encapsulates a graph definition together with the
//! arguments it is built from. Higher layers (unit AI, bosses, scripted
//! sequences) implement this trait once and instantiate it with different
//! parameters.
//!
//! # Architecture
//!
//! This crate provides the pattern definition layer:
//!
//! - **`hfsm_node`**: Node contract, leaf tasks, values and slots
//! - **`hfsm_graph`**: Graphs, wrappers, switches and the executor
//! - **`hfsm_agent`**: Reusable behavior definitions (this crate)
//!
//! # Example
//!
//! ```
//! use hfsm_agent::{Behavior, BehaviorExt};
//! use hfsm_graph::GraphBuilder;
//! use hfsm_node::prelude::*;
//!
//! struct Patrol {
//!     stops: u32,
//! }
//!
//! impl Behavior<()> for Patrol {
//!     fn build(&self, graph: &mut GraphBuilder<()>) -> Result<(), BuildError> {
//!         let stops = self.stops;
//!         let walk = LeafTask::builder("Walk")
//!             .slot("Arrived")
//!             .on_start(|_: (), _: &(), _: &()| 0_u32)
//!             .on_tick(move |args: TickArgs<'_, (), u32, ()>| {
//!                 *args.memory += 1;
//!                 (*args.memory >= stops).then_some("Arrived")
//!             })
//!             .build()?;
//!
//!         graph
//!             .add_node("Walk", walk)
//!             .add_slot("Done")
//!             .add_external_transition("Finish", "Walk", "Arrived", "Done")
//!             .initial_node("Walk");
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "Patrol"
//!     }
//! }
//!
//! let graph = Patrol { stops: 3 }.to_graph().unwrap();
//! assert_eq!(graph.node_count(), 1);
//! ```

use std::sync::Arc;

use hfsm_graph::graph::{GraphBuilder, NodeGraph};
use hfsm_node::error::BuildError;
use hfsm_node::node::NodeRef;

/// Defines a behavior as a graph of nodes.
///
/// Construction arguments are fields of the implementing type; `build` reads
/// them to decide which children, transitions and slots the graph gets.
///
/// # Design Notes
///
/// - Behaviors are **builders**, not executors. They construct graphs that
///   are driven by an [`Executor`](hfsm_graph::Executor) or embedded as
///   children of other graphs.
/// - Behaviors are `Send + Sync` so definitions can be shared between
///   threads that build graphs.
/// - `build` only fails when a child it constructs fails to build. Problems
///   of the graph itself are collected by the builder and reported by
///   [`BehaviorExt::to_graph`] all at once.
pub trait Behavior<P: 'static>: Send + Sync + 'static {
    /// Adds this behavior's children, slots and transitions to `graph`.
    ///
    /// # Errors
    ///
    /// Returns the [`BuildError`] of a child node that failed to build.
    fn build(&self, graph: &mut GraphBuilder<P>) -> Result<(), BuildError>;

    /// Returns the name of the graph built from this behavior.
    ///
    /// Defaults to the type name.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Extension trait for creating graphs from behaviors.
pub trait BehaviorExt<P: 'static>: Behavior<P> {
    /// Builds and validates the behavior's graph.
    ///
    /// # Errors
    ///
    /// Returns the [`BuildError`] of a child, or of the graph if `build` left
    /// it invalid.
    fn to_graph(&self) -> Result<NodeGraph<P>, BuildError> {
        let mut graph = NodeGraph::builder(self.name());
        self.build(&mut graph)?;
        let graph = graph.build()?;
        tracing::debug!(
            behavior = self.name(),
            nodes = graph.node_count(),
            transitions = graph.transition_count(),
            "behavior built"
        );
        Ok(graph)
    }

    /// Builds the behavior's graph as a node that can be shared between
    /// executors or added to other graphs.
    ///
    /// # Errors
    ///
    /// See [`to_graph`](Self::to_graph).
    fn into_node(&self) -> Result<NodeRef<P>, BuildError> {
        Ok(Arc::new(self.to_graph()?))
    }
}

// Blanket implementation for all behaviors
impl<P: 'static, T: Behavior<P>> BehaviorExt<P> for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use hfsm_graph::{Executor, GraphMemory};
    use hfsm_node::prelude::*;

    fn step(name: &'static str) -> LeafTask<bool> {
        LeafTask::builder(name)
            .slot("Next")
            .on_tick(|args: TickArgs<'_, bool, (), ()>| args.payload.then_some("Next"))
            .build()
            .unwrap()
    }

    struct ThreeSteps;

    impl Behavior<bool> for ThreeSteps {
        fn build(&self, graph: &mut GraphBuilder<bool>) -> Result<(), BuildError> {
            graph
                .add_node("One", step("One"))
                .add_node("Two", step("Two"))
                .add_node("Three", step("Three"))
                .add_slot("Done")
                .add_internal_transition("OneToTwo", "One", "Next", "Two")
                .add_internal_transition("TwoToThree", "Two", "Next", "Three")
                .add_external_transition("Finish", "Three", "Next", "Done")
                .initial_node("One");
            Ok(())
        }

        fn name(&self) -> &'static str {
            "ThreeSteps"
        }
    }

    #[test]
    fn behavior_builds_graph() {
        let graph = ThreeSteps.to_graph().unwrap();

        assert_eq!(graph.name(), "ThreeSteps");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.transition_count(), 3);
        assert_eq!(graph.initial_node(), "One");
    }

    #[test]
    fn behavior_node_runs_in_executor() {
        let mut executor = Executor::shared(ThreeSteps.into_node().unwrap());

        executor.start_default(&false).unwrap();
        assert!(executor.tick(&true).unwrap().is_none());
        assert!(executor.tick(&false).unwrap().is_none());
        assert!(executor.tick(&true).unwrap().is_none());
        assert_eq!(
            executor.tick(&true).unwrap().map(|slot| slot.key()),
            Some("Done")
        );

        let memory = executor.memory().unwrap().downcast_ref::<GraphMemory>().unwrap();
        assert_eq!(memory.current_node(), "Three");
    }

    #[test]
    fn construction_arguments_shape_the_graph() {
        struct Chain {
            length: usize,
        }

        const NAMES: [&str; 4] = ["S0", "S1", "S2", "S3"];
        const EDGES: [&str; 3] = ["E0", "E1", "E2"];

        impl Behavior<bool> for Chain {
            fn build(&self, graph: &mut GraphBuilder<bool>) -> Result<(), BuildError> {
                for (index, &name) in NAMES.iter().take(self.length).enumerate() {
                    graph.add_node(name, step(name));
                    if index > 0 {
                        graph.add_internal_transition(EDGES[index - 1], NAMES[index - 1], "Next", name);
                    }
                }
                graph.initial_node(NAMES[0]);
                Ok(())
            }
        }

        assert_eq!(Chain { length: 2 }.to_graph().unwrap().node_count(), 2);
        assert_eq!(Chain { length: 4 }.to_graph().unwrap().transition_count(), 3);
    }

    #[test]
    fn behavior_default_name() {
        struct Unnamed;

        impl Behavior<bool> for Unnamed {
            fn build(&self, graph: &mut GraphBuilder<bool>) -> Result<(), BuildError> {
                graph.add_node("Only", step("Only")).initial_node("Only");
                Ok(())
            }
        }

        assert!(Unnamed.name().contains("Unnamed"));
        assert!(Unnamed.to_graph().unwrap().name().contains("Unnamed"));
    }

    #[test]
    fn invalid_behavior_reports_build_error() {
        struct Broken;

        impl Behavior<bool> for Broken {
            fn build(&self, graph: &mut GraphBuilder<bool>) -> Result<(), BuildError> {
                graph.add_node("Only", step("Only"));
                Ok(())
            }

            fn name(&self) -> &'static str {
                "Broken"
            }
        }

        let err = match Broken.into_node() {
            Ok(_) => panic!("behavior should not build"),
            Err(err) => err,
        };
        assert_eq!(err.name, "Broken");
        assert!(err.has_kind(ValidationErrorKind::Incomplete));
    }
}
