//! Mobile inventories carried by ships.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// A ship's cargo hold and purse.
///
/// Capacity is measured in item weight units. The hold never stores more
/// weight than its capacity and never spends more credits than it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    /// Name of the ship template the hold was built from.
    pub name: String,
    capacity: i64,
    credits: i64,
    used: i64,
    items: BTreeMap<String, Stowed>,
}

/// Quantity and unit weight of one item in a hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Stowed {
    quantity: i64,
    weight: i64,
}

impl Hold {
    /// Create an empty hold. Negative capacity or credits are raised to
    /// zero.
    pub fn new(name: impl Into<String>, capacity: i64, credits: i64) -> Self {
        Self {
            name: name.into(),
            capacity: capacity.max(0),
            credits: credits.max(0),
            used: 0,
            items: BTreeMap::new(),
        }
    }

    /// Total weight the hold can carry.
    pub const fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Credit balance.
    pub const fn credits(&self) -> i64 {
        self.credits
    }

    /// Weight currently stowed.
    pub const fn used_weight(&self) -> i64 {
        self.used
    }

    /// Weight still available.
    pub const fn free_weight(&self) -> i64 {
        self.capacity.saturating_sub(self.used)
    }

    /// Units of `item` aboard.
    pub fn quantity(&self, item: &str) -> i64 {
        self.items.get(item).map_or(0, |s| s.quantity)
    }

    /// Iterate over `(item, quantity)` pairs in item order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.items.iter().map(|(name, s)| (name.as_str(), s.quantity))
    }

    /// Stow `quantity` units and pay `cost`. The caller has already
    /// checked weight and credits.
    pub(crate) fn load(
        &mut self,
        item: &str,
        weight: i64,
        quantity: i64,
        cost: i64,
    ) -> Result<(), WorldError> {
        let added = weight
            .checked_mul(quantity)
            .ok_or(WorldError::ArithmeticOverflow)?;
        let used = self
            .used
            .checked_add(added)
            .ok_or(WorldError::ArithmeticOverflow)?;
        let credits = self
            .credits
            .checked_sub(cost)
            .ok_or(WorldError::ArithmeticOverflow)?;
        let stowed = self.items.entry(item.to_owned()).or_insert(Stowed {
            quantity: 0,
            weight,
        });
        stowed.quantity = stowed
            .quantity
            .checked_add(quantity)
            .ok_or(WorldError::ArithmeticOverflow)?;
        self.used = used;
        self.credits = credits;
        Ok(())
    }

    /// Remove `quantity` units and receive `income`. The caller has already
    /// checked the quantity aboard.
    pub(crate) fn unload(
        &mut self,
        item: &str,
        quantity: i64,
        income: i64,
    ) -> Result<(), WorldError> {
        let Some(stowed) = self.items.get_mut(item) else {
            return Err(WorldError::UnknownItem(item.to_owned()));
        };
        let freed = stowed
            .weight
            .checked_mul(quantity)
            .ok_or(WorldError::ArithmeticOverflow)?;
        stowed.quantity = stowed.quantity.saturating_sub(quantity).max(0);
        if stowed.quantity == 0 {
            self.items.remove(item);
        }
        self.used = self.used.saturating_sub(freed).max(0);
        self.credits = self
            .credits
            .checked_add(income)
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(())
    }
}
