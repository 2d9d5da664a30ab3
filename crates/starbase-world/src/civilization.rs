//! Civilizations and the systems they own.
//!
//! A civilization's owned set only grows. The authoritative owner of each
//! system is recorded on the [`System`] itself; the list kept here is the
//! civilization's view of the same relation, in claim order.
//!
//! [`System`]: crate::system::System

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use starbase_types::{CivilizationId, SystemId};

use crate::error::WorldError;
use crate::ordered_index::OrderedIndex;

/// A civilization competing for systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Civilization {
    /// Civilization identifier.
    pub id: CivilizationId,
    /// Unique display name.
    pub name: String,
    /// Relative expansion strength.
    pub power: u32,
    home: Option<SystemId>,
    owned: Vec<SystemId>,
}

impl Civilization {
    /// Create a civilization with no home and no systems.
    pub const fn new(id: CivilizationId, name: String, power: u32) -> Self {
        Self {
            id,
            name,
            power,
            home: None,
            owned: Vec::new(),
        }
    }

    /// The home system, once settled.
    pub const fn home(&self) -> Option<SystemId> {
        self.home
    }

    /// Systems owned, in claim order. The home system comes first.
    pub fn owned(&self) -> &[SystemId] {
        &self.owned
    }

    /// Number of systems owned.
    pub const fn owned_count(&self) -> usize {
        self.owned.len()
    }

    /// Whether `system` belongs to this civilization.
    pub fn owns(&self, system: SystemId) -> bool {
        self.owned.contains(&system)
    }

    pub(crate) fn settle(&mut self, home: SystemId) {
        self.home = Some(home);
        self.record_claim(home);
    }

    pub(crate) fn record_claim(&mut self, system: SystemId) {
        if !self.owned.contains(&system) {
            self.owned.push(system);
        }
    }
}

/// Every civilization, indexed by identifier and name.
#[derive(Debug, Clone)]
pub struct Civilizations {
    list: Vec<Civilization>,
    by_id: OrderedIndex<CivilizationId, usize>,
    by_name: BTreeMap<String, usize>,
}

impl Civilizations {
    /// Create an empty collection.
    pub const fn new() -> Self {
        Self {
            list: Vec::new(),
            by_id: OrderedIndex::unique(),
            by_name: BTreeMap::new(),
        }
    }

    /// Add a civilization.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateKey`] for a reused identifier or
    /// [`WorldError::DuplicateName`] for a reused name.
    pub fn insert(&mut self, civilization: Civilization) -> Result<CivilizationId, WorldError> {
        let id = civilization.id;
        if self.by_id.contains_key(&id) {
            return Err(WorldError::DuplicateKey(id.to_string()));
        }
        if self.by_name.contains_key(&civilization.name) {
            return Err(WorldError::DuplicateName(civilization.name));
        }
        let slot = self.list.len();
        self.by_id.insert(id, slot)?;
        self.by_name.insert(civilization.name.clone(), slot);
        self.list.push(civilization);
        Ok(id)
    }

    /// Look up a civilization by identifier.
    pub fn get(&self, id: CivilizationId) -> Option<&Civilization> {
        self.by_id.get(&id).and_then(|slot| self.list.get(*slot))
    }

    /// Look up a civilization mutably.
    pub fn get_mut(&mut self, id: CivilizationId) -> Option<&mut Civilization> {
        let slot = *self.by_id.get(&id)?;
        self.list.get_mut(slot)
    }

    /// Look up a civilization by display name.
    pub fn by_name(&self, name: &str) -> Option<&Civilization> {
        self.by_name.get(name).and_then(|slot| self.list.get(*slot))
    }

    /// The identifier index, for collision checks during allocation.
    pub const fn id_index(&self) -> &OrderedIndex<CivilizationId, usize> {
        &self.by_id
    }

    /// Sum of every civilization's power.
    pub fn total_power(&self) -> u64 {
        self.list
            .iter()
            .map(|c| u64::from(c.power))
            .fold(0, u64::saturating_add)
    }

    /// Number of civilizations.
    pub const fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether there are no civilizations.
    pub const fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Civilization> {
        self.list.iter()
    }
}

impl Default for Civilizations {
    fn default() -> Self {
        Self::new()
    }
}
