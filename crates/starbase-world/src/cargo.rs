//! Cargo records and the per-station inventory that holds them.
//!
//! Every mutation of a cargo amount is clamped so that
//! `0 <= amount <= max` holds at all times. Requirement edges link a
//! dependent cargo to the cargo it consumes: raising the dependent draws
//! the same number of units from each requirement, lowering it returns
//! them. [`Inventory::apply_change`] shrinks a requested change until no
//! requirement would leave its own bounds.

use serde::{Deserialize, Serialize};
use starbase_types::CargoView;

use crate::error::WorldError;
use crate::item::Item;

/// One tradeable good stocked by a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cargo {
    /// Item name.
    pub item: String,
    /// Weight of one unit.
    pub weight: i64,
    /// Signed units produced (positive) or consumed (negative) per day.
    pub daily_change: i64,
    /// Unit price at this station.
    pub price: i64,
    amount: i64,
    max: i64,
    requirements: Vec<usize>,
}

impl Cargo {
    /// Stock `item` with capacity `max` and an initial `amount`. The
    /// capacity is floored at zero and the amount clamped into
    /// `[0, max]`. The price starts at the item's base price.
    pub fn new(item: &Item, max: i64, amount: i64) -> Self {
        let max = max.max(0);
        Self {
            item: item.name.clone(),
            weight: item.weight,
            daily_change: 0,
            price: item.base_price,
            amount: amount.clamp(0, max),
            max,
            requirements: Vec::new(),
        }
    }

    /// Set the signed daily production rate.
    #[must_use]
    pub const fn with_daily_change(mut self, daily_change: i64) -> Self {
        self.daily_change = daily_change;
        self
    }

    /// Set the unit price, floored at zero.
    #[must_use]
    pub fn with_price(mut self, price: i64) -> Self {
        self.price = price.max(0);
        self
    }

    /// Units currently in stock.
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Stock capacity.
    pub const fn max(&self) -> i64 {
        self.max
    }

    /// Units that can still be added before reaching capacity.
    pub const fn free_capacity(&self) -> i64 {
        self.max.saturating_sub(self.amount)
    }

    /// Inventory slots this cargo consumes when produced.
    pub fn requirements(&self) -> &[usize] {
        &self.requirements
    }

    /// The portion of `change` that keeps the amount within `[0, max]`.
    pub const fn clamp_change(&self, change: i64) -> i64 {
        let target = self.amount.saturating_add(change);
        let clamped = if target < 0 {
            0
        } else if target > self.max {
            self.max
        } else {
            target
        };
        clamped.saturating_sub(self.amount)
    }

    /// Apply `change` after clamping it into bounds. Returns the change
    /// actually applied.
    pub const fn adjust(&mut self, change: i64) -> i64 {
        let applied = self.clamp_change(change);
        self.amount = self.amount.saturating_add(applied);
        applied
    }

    /// Build the display projection.
    pub fn view(&self) -> CargoView {
        CargoView {
            item: self.item.clone(),
            amount: self.amount,
            max: self.max,
            daily_change: self.daily_change,
            price: self.price,
        }
    }
}

/// The cargo list of one station, with requirement edges between slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    cargo: Vec<Cargo>,
}

impl Inventory {
    /// Create an empty inventory.
    pub const fn new() -> Self {
        Self { cargo: Vec::new() }
    }

    /// Append a cargo record and return its slot.
    pub fn push(&mut self, cargo: Cargo) -> usize {
        let slot = self.cargo.len();
        self.cargo.push(cargo);
        slot
    }

    /// Record that producing the cargo in slot `dependent` consumes the
    /// cargo in slot `requirement`. Returns `false` if the edge already
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidRequirement`] for a self-edge or a slot
    /// outside the inventory.
    pub fn add_requirement(
        &mut self,
        dependent: usize,
        requirement: usize,
    ) -> Result<bool, WorldError> {
        let invalid = WorldError::InvalidRequirement {
            dependent,
            requirement,
        };
        if dependent == requirement || requirement >= self.cargo.len() {
            return Err(invalid);
        }
        let Some(cargo) = self.cargo.get_mut(dependent) else {
            return Err(invalid);
        };
        if cargo.requirements.contains(&requirement) {
            return Ok(false);
        }
        cargo.requirements.push(requirement);
        Ok(true)
    }

    /// The cargo in `slot`.
    pub fn get(&self, slot: usize) -> Option<&Cargo> {
        self.cargo.get(slot)
    }

    /// The cargo in `slot`, mutably. Amount and capacity stay clamped
    /// through [`Cargo::adjust`].
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Cargo> {
        self.cargo.get_mut(slot)
    }

    /// The slot stocking `item`.
    pub fn slot_of(&self, item: &str) -> Option<usize> {
        self.cargo.iter().position(|c| c.item == item)
    }

    /// The cargo stocking `item`.
    pub fn find(&self, item: &str) -> Option<&Cargo> {
        self.cargo.iter().find(|c| c.item == item)
    }

    /// Number of cargo records.
    pub const fn len(&self) -> usize {
        self.cargo.len()
    }

    /// Whether the inventory stocks nothing.
    pub const fn is_empty(&self) -> bool {
        self.cargo.is_empty()
    }

    /// Iterate over cargo records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Cargo> {
        self.cargo.iter()
    }

    /// Display projections of every cargo record.
    pub fn views(&self) -> Vec<CargoView> {
        self.cargo.iter().map(Cargo::view).collect()
    }

    /// Apply a production `change` to the cargo in `slot`, honoring its
    /// requirement edges. Returns the change actually applied.
    ///
    /// 1. Clamp `change` so the cargo stays within `[0, max]`.
    /// 2. For each requirement, shrink `change` so that applying `-change`
    ///    to the requirement keeps it within its own `[0, max]`.
    /// 3. Add `change` to the cargo and subtract it from every requirement.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownCargo`] for a slot outside the
    /// inventory, [`WorldError::InvalidRequirement`] for a dangling edge,
    /// or [`WorldError::ArithmeticOverflow`] if an amount would overflow.
    pub fn apply_change(&mut self, slot: usize, change: i64) -> Result<i64, WorldError> {
        let len = self.cargo.len();
        let cargo = self
            .cargo
            .get(slot)
            .ok_or(WorldError::UnknownCargo { index: slot, len })?;

        let mut change = cargo.clamp_change(change);
        for &requirement in &cargo.requirements {
            let required = self
                .cargo
                .get(requirement)
                .ok_or(WorldError::InvalidRequirement {
                    dependent: slot,
                    requirement,
                })?;
            change = if change > 0 {
                change.min(required.amount)
            } else {
                change.max(required.amount.saturating_sub(required.max))
            };
        }
        if change == 0 {
            return Ok(0);
        }

        let requirements = cargo.requirements.clone();
        for requirement in requirements {
            let required = self
                .cargo
                .get_mut(requirement)
                .ok_or(WorldError::InvalidRequirement {
                    dependent: slot,
                    requirement,
                })?;
            required.amount = required
                .amount
                .checked_sub(change)
                .ok_or(WorldError::ArithmeticOverflow)?;
        }
        let cargo = self
            .cargo
            .get_mut(slot)
            .ok_or(WorldError::UnknownCargo { index: slot, len })?;
        cargo.amount = cargo
            .amount
            .checked_add(change)
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(change)
    }
}

impl From<Vec<Cargo>> for Inventory {
    fn from(cargo: Vec<Cargo>) -> Self {
        Self { cargo }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cargo(name: &str, max: i64, amount: i64) -> Cargo {
        Cargo::new(&Item::new(name, 1, 10), max, amount)
    }

    #[test]
    fn construction_clamps_amount() {
        assert_eq!(cargo("Fuel", 100, 150).amount(), 100);
        assert_eq!(cargo("Fuel", 100, -5).amount(), 0);
        let broken = cargo("Fuel", -10, 5);
        assert_eq!(broken.max(), 0);
        assert_eq!(broken.amount(), 0);
    }

    #[test]
    fn adjust_clamps_both_ends() {
        let mut fuel = cargo("Fuel", 100, 90);
        assert_eq!(fuel.adjust(25), 10);
        assert_eq!(fuel.amount(), 100);
        assert_eq!(fuel.adjust(-250), -100);
        assert_eq!(fuel.amount(), 0);
        assert_eq!(fuel.adjust(i64::MAX), 100);
        assert_eq!(fuel.adjust(i64::MIN), -100);
    }

    #[test]
    fn requirement_edges_validated() {
        let mut inventory = Inventory::from(vec![cargo("Ore", 100, 50), cargo("Metal", 100, 0)]);
        assert_eq!(inventory.add_requirement(1, 0).ok(), Some(true));
        assert_eq!(inventory.add_requirement(1, 0).ok(), Some(false));
        assert!(inventory.add_requirement(1, 1).is_err());
        assert!(inventory.add_requirement(1, 7).is_err());
        assert!(inventory.add_requirement(7, 1).is_err());
    }

    #[test]
    fn production_consumes_requirements() {
        let mut inventory = Inventory::from(vec![cargo("Ore", 100, 30), cargo("Metal", 100, 0)]);
        assert!(inventory.add_requirement(1, 0).is_ok());

        assert_eq!(inventory.apply_change(1, 20).ok(), Some(20));
        assert_eq!(inventory.get(0).map(Cargo::amount), Some(10));
        assert_eq!(inventory.get(1).map(Cargo::amount), Some(20));

        // Only 10 ore left: production is limited by the requirement.
        assert_eq!(inventory.apply_change(1, 20).ok(), Some(10));
        assert_eq!(inventory.get(0).map(Cargo::amount), Some(0));
        assert_eq!(inventory.get(1).map(Cargo::amount), Some(30));

        // Nothing left to consume.
        assert_eq!(inventory.apply_change(1, 5).ok(), Some(0));
    }

    #[test]
    fn consumption_returns_stock_within_capacity() {
        let mut inventory = Inventory::from(vec![cargo("Ore", 100, 95), cargo("Metal", 100, 50)]);
        assert!(inventory.add_requirement(1, 0).is_ok());

        // Returning 20 ore would overflow its capacity; only 5 fit.
        assert_eq!(inventory.apply_change(1, -20).ok(), Some(-5));
        assert_eq!(inventory.get(0).map(Cargo::amount), Some(100));
        assert_eq!(inventory.get(1).map(Cargo::amount), Some(45));
    }

    #[test]
    fn tightest_requirement_wins() {
        let mut inventory = Inventory::from(vec![
            cargo("Ore", 100, 40),
            cargo("Water", 100, 7),
            cargo("Metal", 100, 0),
        ]);
        assert!(inventory.add_requirement(2, 0).is_ok());
        assert!(inventory.add_requirement(2, 1).is_ok());
        assert_eq!(inventory.apply_change(2, 25).ok(), Some(7));
        assert_eq!(inventory.get(0).map(Cargo::amount), Some(33));
        assert_eq!(inventory.get(1).map(Cargo::amount), Some(0));
        assert_eq!(inventory.get(2).map(Cargo::amount), Some(7));
    }

    #[test]
    fn unknown_slot_is_an_error() {
        let mut inventory = Inventory::new();
        assert!(matches!(
            inventory.apply_change(3, 1),
            Err(WorldError::UnknownCargo { index: 3, len: 0 })
        ));
    }

    #[test]
    fn views_mirror_cargo() {
        let inventory = Inventory::from(vec![cargo("Fuel", 1_000, 500).with_daily_change(100)]);
        let views = inventory.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views.first().map(|v| v.amount), Some(500));
        assert_eq!(views.first().map(|v| v.daily_change), Some(100));
        assert_eq!(inventory.slot_of("Fuel"), Some(0));
        assert!(inventory.find("Ore").is_none());
    }
}
