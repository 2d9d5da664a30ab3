//! The item registry: every tradeable good, keyed by name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// A tradeable good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item name.
    pub name: String,
    /// Weight of one unit, in hold capacity units.
    pub weight: i64,
    /// Reference price of one unit, before per-station variance.
    pub base_price: i64,
}

impl Item {
    /// Create an item. Negative weights and prices are raised to zero.
    pub fn new(name: impl Into<String>, weight: i64, base_price: i64) -> Self {
        Self {
            name: name.into(),
            weight: weight.max(0),
            base_price: base_price.max(0),
        }
    }
}

/// Read-only lookup of items by name.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    items: BTreeMap<String, Item>,
}

impl ItemRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Register an item.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateName`] if an item with the same name
    /// is already registered.
    pub fn insert(&mut self, item: Item) -> Result<(), WorldError> {
        if self.items.contains_key(&item.name) {
            return Err(WorldError::DuplicateName(item.name));
        }
        self.items.insert(item.name.clone(), item);
        Ok(())
    }

    /// Look up an item by name.
    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    /// Look up an item that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownItem`] if the name is not registered.
    pub fn require(&self, name: &str) -> Result<&Item, WorldError> {
        self.get(name)
            .ok_or_else(|| WorldError::UnknownItem(name.to_owned()))
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items are registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over items in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_items_rejected() {
        let mut registry = ItemRegistry::new();
        assert!(registry.insert(Item::new("Fuel", 1, 10)).is_ok());
        assert!(matches!(
            registry.insert(Item::new("Fuel", 2, 20)),
            Err(WorldError::DuplicateName(_))
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Fuel").map(|i| i.weight), Some(1));
    }

    #[test]
    fn require_reports_unknown_items() {
        let registry = ItemRegistry::new();
        assert!(matches!(
            registry.require("Ore"),
            Err(WorldError::UnknownItem(name)) if name == "Ore"
        ));
    }

    #[test]
    fn negative_attributes_floor_at_zero() {
        let item = Item::new("Scrap", -3, -1);
        assert_eq!(item.weight, 0);
        assert_eq!(item.base_price, 0);
    }
}
