//! The payload: one worker unit and the patch of world it sees.

use std::cell::Cell;

/// Position of the unit's home base.
pub const HOME: i32 = 0;

/// Position of the mine.
pub const MINE: i32 = 6;

/// A worker unit.
///
/// Nodes only see the unit through a shared reference, so everything the
/// behavior changes lives in cells. The host changes the rest between ticks.
#[derive(Debug)]
pub struct Unit {
    position: Cell<i32>,
    carried: Cell<u32>,
    banked: Cell<u32>,
    food: Cell<u32>,
    ore_left: Cell<u32>,
    threatened: Cell<bool>,
}

impl Unit {
    /// Most food a unit can hold.
    pub const MAX_FOOD: u32 = 20;

    /// Creates a unit standing at home next to a mine holding `ore` units.
    #[must_use]
    pub fn new(ore: u32) -> Self {
        Self {
            position: Cell::new(HOME),
            carried: Cell::new(0),
            banked: Cell::new(0),
            food: Cell::new(Self::MAX_FOOD),
            ore_left: Cell::new(ore),
            threatened: Cell::new(false),
        }
    }

    /// Returns the current position.
    #[must_use]
    pub fn position(&self) -> i32 {
        self.position.get()
    }

    /// Moves up to `stride` steps towards `target` and returns `true` once
    /// the unit stands on it.
    pub fn step_towards(&self, target: i32, stride: u32) -> bool {
        let position = self.position.get();
        let stride = i32::try_from(stride).unwrap_or(i32::MAX);
        let next = if position < target {
            position.saturating_add(stride).min(target)
        } else {
            position.saturating_sub(stride).max(target)
        };
        self.position.set(next);
        next == target
    }

    /// Returns the ore the unit is carrying.
    #[must_use]
    pub fn carried(&self) -> u32 {
        self.carried.get()
    }

    /// Returns the ore delivered to the base so far.
    #[must_use]
    pub fn banked(&self) -> u32 {
        self.banked.get()
    }

    /// Returns the ore left in the mine.
    #[must_use]
    pub fn ore_left(&self) -> u32 {
        self.ore_left.get()
    }

    /// Digs up to `amount` ore, bounded by what the mine holds and what
    /// still fits in a load of `capacity`. Returns the ore carried afterwards.
    pub fn dig(&self, amount: u32, capacity: u32) -> u32 {
        let room = capacity.saturating_sub(self.carried.get());
        let dug = amount.min(room).min(self.ore_left.get());
        self.ore_left.set(self.ore_left.get() - dug);
        self.carried.set(self.carried.get() + dug);
        self.carried.get()
    }

    /// Moves the carried ore into the bank and returns how much that was.
    pub fn unload(&self) -> u32 {
        let load = self.carried.replace(0);
        self.banked.set(self.banked.get() + load);
        load
    }

    /// Returns the food left.
    #[must_use]
    pub fn food(&self) -> u32 {
        self.food.get()
    }

    /// Burns one unit of food. Called by the host once per tick.
    pub fn metabolize(&self) {
        self.food.set(self.food.get().saturating_sub(1));
    }

    /// Eats up to `amount` food and returns `true` once full.
    pub fn eat(&self, amount: u32) -> bool {
        let food = self.food.get().saturating_add(amount).min(Self::MAX_FOOD);
        self.food.set(food);
        food == Self::MAX_FOOD
    }

    /// Returns `true` while an enemy is near.
    #[must_use]
    pub fn threatened(&self) -> bool {
        self.threatened.get()
    }

    /// Marks an enemy as near or gone.
    pub fn set_threatened(&self, threatened: bool) {
        self.threatened.set(threatened);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_towards_stops_on_target() {
        let unit = Unit::new(0);
        assert!(!unit.step_towards(MINE, 4));
        assert_eq!(unit.position(), 4);
        assert!(unit.step_towards(MINE, 4));
        assert_eq!(unit.position(), MINE);
        assert!(!unit.step_towards(HOME, 5));
        assert!(unit.step_towards(HOME, 5));
    }

    #[test]
    fn dig_respects_capacity_and_mine() {
        let unit = Unit::new(5);
        assert_eq!(unit.dig(3, 4), 3);
        assert_eq!(unit.dig(3, 4), 4);
        assert_eq!(unit.ore_left(), 1);
        assert_eq!(unit.unload(), 4);
        assert_eq!(unit.dig(3, 4), 1);
        assert_eq!(unit.ore_left(), 0);
        assert_eq!(unit.banked(), 4);
    }

    #[test]
    fn food_is_bounded() {
        let unit = Unit::new(0);
        unit.metabolize();
        assert_eq!(unit.food(), Unit::MAX_FOOD - 1);
        assert!(unit.eat(5));
        assert_eq!(unit.food(), Unit::MAX_FOOD);
    }
}
