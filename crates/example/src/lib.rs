//! Example worker unit built with hfsm.
//!
//! A unit hauls ore from a mine to its base. It flees home while an enemy is
//! near, breaks off to eat when it gets hungry, and retires once the mine is
//! empty.
//!
//! # Architecture
//!
//! ```text
//! ┌ Worker ──────────────────────────────────────────────────────────┐
//! │                                                                  │
//! │  ┌ Duty (wrapper: Hunger) ────────────────────┐   Starving       │
//! │  │ ┌ Switch: threatened? ───────────────────┐ │ ──────────▶ Eat  │
//! │  │ │ no:  Harvest graph                     │ │ ◀────────── │    │
//! │  │ │      GoToMine ▶ Mine ▶ GoHome ▶ Deliver│ │      Fed         │
//! │  │ │         ▲                        │     │ │                  │
//! │  │ │         └────────────────────────┘     │ │                  │
//! │  │ │ yes: Flee                              │ │                  │
//! │  │ └────────────────────────────────────────┘ │                  │
//! │  └────────────────────────────────────────────┘                  │
//! │                  │ Exhausted                                     │
//! │                  ▼                                               │
//! │              (Retired)                                           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod tasks;
mod unit;

pub use tasks::Pickaxe;
pub use unit::{HOME, MINE, Unit};

use hfsm_agent::{Behavior, BehaviorExt};
use hfsm_graph::prelude::*;
use hfsm_node::prelude::*;

/// What the unit is doing when not eating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Duty {
    /// Haul ore.
    Work,
    /// Run home.
    Flee,
}

/// The mining loop: walk out, dig, walk back, deliver.
///
/// Leaves through `Exhausted` once the mine is empty.
#[derive(Debug, Clone, Copy)]
pub struct Harvest {
    /// How the unit digs.
    pub pickaxe: Pickaxe,
    /// Loads above this are carried home at half speed.
    pub heavy_load: u32,
}

impl Behavior<Unit> for Harvest {
    fn build(&self, graph: &mut GraphBuilder<Unit>) -> Result<(), BuildError> {
        let heavy_load = self.heavy_load;

        graph
            .add_node("GoToMine", tasks::go_to_mine()?)
            .add_node("Mine", tasks::mine(self.pickaxe)?)
            .add_node("GoHome", tasks::go_home()?)
            .add_node("Deliver", tasks::deliver()?)
            .add_slot("Exhausted")
            .add_internal_transition("StartDigging", "GoToMine", "Arrived", "Mine")
            .add_internal_transition_with("Haul", "Mine", "Full", "GoHome", move |load: u32| {
                if load > heavy_load { 1_u32 } else { 2 }
            })
            .add_internal_transition("Unload", "GoHome", "Home", "Deliver")
            .add_internal_transition("HeadOut", "Deliver", "Delivered", "GoToMine")
            .add_external_transition("MineEmpty", "Mine", "Depleted", "Exhausted")
            .initial_node("GoToMine");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Harvest"
    }
}

/// The whole unit.
#[derive(Debug, Clone, Copy)]
pub struct Worker {
    /// The mining loop run while no enemy is near.
    pub harvest: Harvest,
    /// Food level below which the unit stops to eat.
    pub hunger_threshold: u32,
}

impl Default for Worker {
    fn default() -> Self {
        Self {
            harvest: Harvest {
                pickaxe: Pickaxe {
                    rate: 2,
                    capacity: 6,
                },
                heavy_load: 4,
            },
            hunger_threshold: 5,
        }
    }
}

impl Behavior<Unit> for Worker {
    fn build(&self, graph: &mut GraphBuilder<Unit>) -> Result<(), BuildError> {
        let duty = SwitchNode::builder("Duty", |unit: &Unit| {
            if unit.threatened() {
                Duty::Flee
            } else {
                Duty::Work
            }
        })
        .shared_case(Duty::Work, self.harvest.into_node()?)
        .case(Duty::Flee, tasks::flee()?)
        .build()?;
        let fed_duty = NodeWrapper::builder("FedDuty", tasks::hunger(self.hunger_threshold)?, duty)
            .build()?;

        graph
            .add_node("Duty", fed_duty)
            .add_node("Eat", tasks::eat()?)
            .add_slot("Retired")
            .add_internal_transition("Starve", "Duty", "Starving", "Eat")
            .add_internal_transition("BackToWork", "Eat", "Fed", "Duty")
            .add_external_transition("Retire", "Duty", "Exhausted", "Retired")
            .initial_node("Duty");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Worker"
    }
}

/// Builds a worker and drives it for up to `max_ticks`, with an enemy near
/// during `threat` ticks.
///
/// The host burns one food per tick before ticking the tree. Returns the
/// number of ticks run.
///
/// # Errors
///
/// Returns the first build or execution error.
pub fn simulate(
    worker: &Worker,
    unit: &Unit,
    max_ticks: u64,
    threat: core::ops::Range<u64>,
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut executor = Executor::shared(worker.into_node()?);
    executor.start_default(unit)?;

    while executor.ticks() < max_ticks {
        unit.set_threatened(threat.contains(&executor.ticks()));
        unit.metabolize();

        if let Some(slot) = executor.tick(unit)? {
            tracing::info!(slot = slot.key(), ticks = executor.ticks(), "worker left its root graph");
            break;
        }
    }

    executor.abort(AbortReason::AbortedByDeath, unit)?;
    Ok(executor.ticks())
}
