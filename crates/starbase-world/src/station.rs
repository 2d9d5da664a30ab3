//! Ports and bases: stations that stock cargo.
//!
//! Each [`Station`] guards its [`Inventory`] with its own `RwLock`. Tick
//! passes and trades take the write lock for the whole of one mutation;
//! displays and price queries take the read lock. A poisoned lock means a
//! thread panicked mid-mutation and is reported as
//! [`WorldError::LockPoisoned`].

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use starbase_types::{CargoView, PlanetId, StationId, StationKind, SystemId};

use crate::cargo::Inventory;
use crate::error::WorldError;
use crate::ordered_index::OrderedIndex;

/// Where a station is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    /// Directly in a system (bases).
    System(SystemId),
    /// On a planet (ports).
    Planet {
        /// The planet's system.
        system: SystemId,
        /// The planet.
        planet: PlanetId,
    },
}

impl Anchor {
    /// The system the station is in.
    pub const fn system(self) -> SystemId {
        match self {
            Self::System(system) | Self::Planet { system, .. } => system,
        }
    }
}

/// A port or base with a lock-guarded inventory.
#[derive(Debug)]
pub struct Station {
    /// Station identifier.
    pub id: StationId,
    /// Port or base.
    pub kind: StationKind,
    /// Unique display name within its collection.
    pub name: String,
    /// Name of the template the station was built from.
    pub template: String,
    /// Where the station is built.
    pub anchor: Anchor,
    inventory: RwLock<Inventory>,
}

impl Station {
    /// Create a station holding `inventory`.
    pub fn new(
        id: StationId,
        kind: StationKind,
        name: String,
        template: String,
        anchor: Anchor,
        inventory: Inventory,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            template,
            anchor,
            inventory: RwLock::new(inventory),
        }
    }

    /// Take the inventory read lock.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::LockPoisoned`] if a writer panicked.
    pub fn read(&self) -> Result<RwLockReadGuard<'_, Inventory>, WorldError> {
        let Ok(guard) = self.inventory.read() else {
            return Err(WorldError::LockPoisoned("station inventory"));
        };
        Ok(guard)
    }

    /// Take the inventory write lock.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::LockPoisoned`] if a writer panicked.
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, Inventory>, WorldError> {
        let Ok(guard) = self.inventory.write() else {
            return Err(WorldError::LockPoisoned("station inventory"));
        };
        Ok(guard)
    }

    /// Snapshot of the cargo list for a trade menu, taken under the read
    /// lock.
    pub fn cargo_view(&self) -> Result<Vec<CargoView>, WorldError> {
        Ok(self.read()?.views())
    }
}

/// One category of stations (all ports or all bases).
#[derive(Debug)]
pub struct Stations {
    kind: StationKind,
    list: Vec<Arc<Station>>,
    by_id: OrderedIndex<StationId, usize>,
    by_name: BTreeMap<String, usize>,
}

impl Stations {
    /// Create an empty collection.
    pub const fn new(kind: StationKind) -> Self {
        Self {
            kind,
            list: Vec::new(),
            by_id: OrderedIndex::unique(),
            by_name: BTreeMap::new(),
        }
    }

    /// The category held.
    pub const fn kind(&self) -> StationKind {
        self.kind
    }

    /// Add a station.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateKey`] for a reused identifier or
    /// [`WorldError::DuplicateName`] for a reused name. The collection is
    /// unchanged on error.
    pub fn insert(&mut self, station: Station) -> Result<Arc<Station>, WorldError> {
        if self.by_id.contains_key(&station.id) {
            return Err(WorldError::DuplicateKey(station.id.to_string()));
        }
        if self.by_name.contains_key(&station.name) {
            return Err(WorldError::DuplicateName(station.name));
        }
        let slot = self.list.len();
        self.by_id.insert(station.id, slot)?;
        self.by_name.insert(station.name.clone(), slot);
        let station = Arc::new(station);
        self.list.push(Arc::clone(&station));
        Ok(station)
    }

    /// Look up a station by identifier.
    pub fn get(&self, id: StationId) -> Option<&Arc<Station>> {
        self.by_id.get(&id).and_then(|slot| self.list.get(*slot))
    }

    /// Look up a station by display name.
    pub fn by_name(&self, name: &str) -> Option<&Arc<Station>> {
        self.by_name.get(name).and_then(|slot| self.list.get(*slot))
    }

    /// Whether the identifier is taken.
    pub fn contains(&self, id: StationId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Number of stations.
    pub const fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the collection is empty.
    pub const fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate over stations in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Station>> {
        self.list.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cargo::Cargo;
    use crate::item::Item;

    fn station(raw: u32, name: &str) -> Station {
        let fuel = Item::new("Fuel", 1, 10);
        Station::new(
            StationId::new(raw),
            StationKind::Base,
            name.to_owned(),
            "Depot".to_owned(),
            Anchor::System(SystemId::new(7)),
            Inventory::from(vec![Cargo::new(&fuel, 100, 40)]),
        )
    }

    #[test]
    fn anchors_resolve_to_system() {
        let planet = Anchor::Planet {
            system: SystemId::new(3),
            planet: PlanetId::new(4),
        };
        assert_eq!(planet.system(), SystemId::new(3));
        assert_eq!(Anchor::System(SystemId::new(9)).system(), SystemId::new(9));
    }

    #[test]
    fn collection_rejects_duplicates() {
        let mut stations = Stations::new(StationKind::Base);
        assert!(stations.insert(station(1, "Alpha")).is_ok());
        assert!(matches!(
            stations.insert(station(1, "Beta")),
            Err(WorldError::DuplicateKey(_))
        ));
        assert!(matches!(
            stations.insert(station(2, "Alpha")),
            Err(WorldError::DuplicateName(_))
        ));
        assert_eq!(stations.len(), 1);
        assert!(stations.by_name("Alpha").is_some());
        assert!(stations.get(StationId::new(1)).is_some());
    }

    #[test]
    fn cargo_view_reads_under_lock() {
        let base = station(1, "Alpha");
        if let Ok(mut inventory) = base.write() {
            assert_eq!(inventory.apply_change(0, 5).ok(), Some(5));
        }
        let view = base.cargo_view();
        assert_eq!(
            view.ok().and_then(|v| v.first().map(|c| c.amount)),
            Some(45)
        );
    }
}
