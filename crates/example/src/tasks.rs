//! Leaf tasks of the worker unit.

use hfsm_node::prelude::*;

use crate::unit::{HOME, MINE, Unit};

/// Constant state of [`mine`].
#[derive(Debug, Clone, Copy)]
pub struct Pickaxe {
    /// Ore dug per tick.
    pub rate: u32,
    /// Ore carried per trip.
    pub capacity: u32,
}

/// Walks to the mine, then fires `Arrived`.
pub fn go_to_mine() -> Result<LeafTask<Unit>, BuildError> {
    LeafTask::builder("GoToMine")
        .slot("Arrived")
        .on_tick(|args: TickArgs<'_, Unit, (), ()>| {
            args.payload.step_towards(MINE, 2).then_some("Arrived")
        })
        .build()
}

/// Digs until the load is full (`Full` with the load) or the mine runs dry
/// (`Depleted`).
pub fn mine(pickaxe: Pickaxe) -> Result<LeafTask<Unit, (), Pickaxe>, BuildError> {
    LeafTask::builder("Mine")
        .slot_with_args::<u32>("Full")
        .slot("Depleted")
        .create(move || pickaxe)
        .on_tick(|args: TickArgs<'_, Unit, (), Pickaxe>| {
            let pickaxe = args.constant_state;
            let carried = args.payload.dig(pickaxe.rate, pickaxe.capacity);
            if carried >= pickaxe.capacity || (args.payload.ore_left() == 0 && carried > 0) {
                Some(Slot::with_args("Full", carried))
            } else if args.payload.ore_left() == 0 {
                Some(Slot::empty("Depleted"))
            } else {
                None
            }
        })
        .build()
}

/// Walks home at the stride it is started with, then fires `Home`.
pub fn go_home() -> Result<LeafTask<Unit, u32, (), u32>, BuildError> {
    LeafTask::builder("GoHome")
        .slot("Home")
        .on_start(|stride: u32, _: &(), _: &Unit| stride)
        .on_tick(|args: TickArgs<'_, Unit, u32, ()>| {
            args.payload.step_towards(HOME, *args.memory).then_some("Home")
        })
        .build()
}

/// Unloads the ore and fires `Delivered`, heading out again in the same tick.
pub fn deliver() -> Result<LeafTask<Unit>, BuildError> {
    LeafTask::builder("Deliver")
        .slot_with_args::<u32>("Delivered")
        .on_tick(|args: TickArgs<'_, Unit, (), ()>| {
            let load = args.payload.unload();
            tracing::info!(load, banked = args.payload.banked(), "ore delivered");
            args.context.allow_immediate_transition();
            Some(Slot::with_args("Delivered", load))
        })
        .build()
}

/// Runs home and stays there. Never fires.
pub fn flee() -> Result<LeafTask<Unit>, BuildError> {
    LeafTask::builder("Flee")
        .on_tick(|args: TickArgs<'_, Unit, (), ()>| {
            args.payload.step_towards(HOME, 3);
            None::<Slot>
        })
        .build()
}

/// Wrapper logic firing `Starving` once food drops below `threshold`.
pub fn hunger(threshold: u32) -> Result<LeafTask<Unit>, BuildError> {
    LeafTask::builder("Hunger")
        .slot("Starving")
        .on_tick(move |args: TickArgs<'_, Unit, (), ()>| {
            (args.payload.food() < threshold).then_some("Starving")
        })
        .build()
}

/// Eats a few food per tick and fires `Fed` once full.
pub fn eat() -> Result<LeafTask<Unit>, BuildError> {
    LeafTask::builder("Eat")
        .slot("Fed")
        .on_tick(|args: TickArgs<'_, Unit, (), ()>| args.payload.eat(4).then_some("Fed"))
        .on_abort(|reason, _: &mut (), unit: &Unit| {
            tracing::debug!(%reason, food = unit.food(), "meal interrupted");
        })
        .build()
}
