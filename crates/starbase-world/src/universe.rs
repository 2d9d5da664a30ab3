//! The universe: one explicit context object for the whole simulation.
//!
//! A [`Universe`] owns the sector store, the civilizations, both station
//! collections, and the item registry. It is built once by the generator
//! with exclusive (`&mut`) access and then shared behind an `Arc` with the
//! tick workers and the command layer.
//!
//! # Locking
//!
//! - The sector store and civilizations are immutable after generation and
//!   need no lock.
//! - Each station collection sits behind an `RwLock`. Tick passes hold the
//!   read lock for a whole pass; [`Universe::add_station`] takes the write
//!   lock. When both collections are needed, ports are locked before bases.
//! - Each station's inventory has its own `RwLock` (see [`Station`]).

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::Rng;
use serde::{Deserialize, Serialize};
use starbase_types::{
    CargoView, CivilizationId, StationId, StationKind, SystemId, SystemSummary, TradeReceipt,
};
use tracing::debug;

use crate::civilization::{Civilization, Civilizations};
use crate::error::WorldError;
use crate::hold::Hold;
use crate::item::ItemRegistry;
use crate::ordered_index::MAX_ALLOCATION_ATTEMPTS;
use crate::sector_store::SectorStore;
use crate::station::{Anchor, Station, Stations};
use crate::system::System;
use crate::trade;

/// Aggregate counts describing a universe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseStats {
    /// Number of systems.
    pub systems: usize,
    /// Number of distinct symmetric links.
    pub links: usize,
    /// Number of stars.
    pub stars: usize,
    /// Number of planets.
    pub planets: usize,
    /// Number of ports.
    pub ports: usize,
    /// Number of bases.
    pub bases: usize,
    /// Number of civilizations.
    pub civilizations: usize,
    /// Number of systems owned by some civilization.
    pub owned_systems: usize,
}

/// The simulated galaxy and everything in it.
#[derive(Debug)]
pub struct Universe {
    sectors: SectorStore,
    civilizations: Civilizations,
    ports: RwLock<Stations>,
    bases: RwLock<Stations>,
    items: ItemRegistry,
}

impl Universe {
    /// Create an empty universe trading the goods in `items`.
    pub const fn new(items: ItemRegistry) -> Self {
        Self {
            sectors: SectorStore::new(),
            civilizations: Civilizations::new(),
            ports: RwLock::new(Stations::new(StationKind::Port)),
            bases: RwLock::new(Stations::new(StationKind::Base)),
            items,
        }
    }

    // -------------------------------------------------------------------
    // Component access
    // -------------------------------------------------------------------

    /// The spatial store of systems.
    pub const fn sectors(&self) -> &SectorStore {
        &self.sectors
    }

    /// The spatial store, mutably. Only the generator holds `&mut Universe`.
    pub const fn sectors_mut(&mut self) -> &mut SectorStore {
        &mut self.sectors
    }

    /// Every civilization.
    pub const fn civilizations(&self) -> &Civilizations {
        &self.civilizations
    }

    /// The item registry.
    pub const fn items(&self) -> &ItemRegistry {
        &self.items
    }

    /// Take the read lock on one station collection.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::LockPoisoned`] if a writer panicked.
    pub fn stations(&self, kind: StationKind) -> Result<RwLockReadGuard<'_, Stations>, WorldError> {
        let Ok(guard) = self.collection(kind).read() else {
            return Err(WorldError::LockPoisoned("station collection"));
        };
        Ok(guard)
    }

    fn stations_mut(
        &self,
        kind: StationKind,
    ) -> Result<RwLockWriteGuard<'_, Stations>, WorldError> {
        let Ok(guard) = self.collection(kind).write() else {
            return Err(WorldError::LockPoisoned("station collection"));
        };
        Ok(guard)
    }

    const fn collection(&self, kind: StationKind) -> &RwLock<Stations> {
        match kind {
            StationKind::Port => &self.ports,
            StationKind::Base => &self.bases,
        }
    }

    // -------------------------------------------------------------------
    // Civilizations and ownership
    // -------------------------------------------------------------------

    /// Register a civilization.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateKey`] or [`WorldError::DuplicateName`].
    pub fn add_civilization(
        &mut self,
        civilization: Civilization,
    ) -> Result<CivilizationId, WorldError> {
        self.civilizations.insert(civilization)
    }

    /// Claim `system` as the home of `civilization`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CivilizationNotFound`],
    /// [`WorldError::SystemNotFound`], or [`WorldError::AlreadyOwned`].
    pub fn settle(
        &mut self,
        civilization: CivilizationId,
        system: SystemId,
    ) -> Result<(), WorldError> {
        if self.civilizations.get(civilization).is_none() {
            return Err(WorldError::CivilizationNotFound(civilization));
        }
        self.sectors.claim(system, civilization)?;
        if let Some(civ) = self.civilizations.get_mut(civilization) {
            civ.settle(system);
        }
        debug!(civilization = %civilization, system = %system, "home settled");
        Ok(())
    }

    /// Claim `system` for `civilization`. Ownership is permanent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CivilizationNotFound`],
    /// [`WorldError::SystemNotFound`], or [`WorldError::AlreadyOwned`].
    pub fn claim(
        &mut self,
        civilization: CivilizationId,
        system: SystemId,
    ) -> Result<(), WorldError> {
        if self.civilizations.get(civilization).is_none() {
            return Err(WorldError::CivilizationNotFound(civilization));
        }
        self.sectors.claim(system, civilization)?;
        if let Some(civ) = self.civilizations.get_mut(civilization) {
            civ.record_claim(system);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Stations
    // -------------------------------------------------------------------

    /// Draw a station identifier unused by either collection.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::IdSpaceExhausted`] after repeated collisions,
    /// or [`WorldError::LockPoisoned`].
    pub fn allocate_station_id<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<StationId, WorldError> {
        let ports = self.stations(StationKind::Port)?;
        let bases = self.stations(StationKind::Base)?;
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let candidate = StationId::new(rng.random());
            if !ports.contains(candidate) && !bases.contains(candidate) {
                return Ok(candidate);
            }
        }
        Err(WorldError::IdSpaceExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }

    /// Add a station to its collection under the collection write lock.
    ///
    /// The anchor must exist. Recording the station on its system or planet
    /// is the caller's job (see [`Universe::build_station`]).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SystemNotFound`] or [`WorldError::PlanetNotFound`]
    /// for a dangling anchor, [`WorldError::DuplicateKey`] if either
    /// collection already uses the identifier, [`WorldError::DuplicateName`],
    /// or [`WorldError::LockPoisoned`].
    pub fn add_station(&self, station: Station) -> Result<Arc<Station>, WorldError> {
        self.check_anchor(station.anchor)?;
        // Ports before bases.
        let (mut own, other) = match station.kind {
            StationKind::Port => {
                let own = self.stations_mut(StationKind::Port)?;
                let other = self.stations(StationKind::Base)?;
                (own, other)
            }
            StationKind::Base => {
                let other = self.stations(StationKind::Port)?;
                let own = self.stations_mut(StationKind::Base)?;
                (own, other)
            }
        };
        if other.contains(station.id) {
            return Err(WorldError::DuplicateKey(station.id.to_string()));
        }
        drop(other);
        own.insert(station)
    }

    /// Add a station during generation and record it on its system (bases)
    /// or planet (ports).
    ///
    /// # Errors
    ///
    /// As [`Universe::add_station`].
    pub fn build_station(&mut self, station: Station) -> Result<Arc<Station>, WorldError> {
        let anchor = station.anchor;
        let station = self.add_station(station)?;
        let system = self
            .sectors
            .get_mut(anchor.system())
            .ok_or(WorldError::SystemNotFound(anchor.system()))?;
        match anchor {
            Anchor::System(_) => system.bases.push(station.id),
            Anchor::Planet { system: sid, planet } => {
                system
                    .planet_mut(planet)
                    .ok_or(WorldError::PlanetNotFound { system: sid, planet })?
                    .ports
                    .push(station.id);
            }
        }
        Ok(station)
    }

    fn check_anchor(&self, anchor: Anchor) -> Result<(), WorldError> {
        let system = self
            .sectors
            .get(anchor.system())
            .ok_or(WorldError::SystemNotFound(anchor.system()))?;
        if let Anchor::Planet { system: sid, planet } = anchor
            && system.planet(planet).is_none()
        {
            return Err(WorldError::PlanetNotFound { system: sid, planet });
        }
        Ok(())
    }

    /// Look up a station by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StationNotFound`] or [`WorldError::LockPoisoned`].
    pub fn station(&self, kind: StationKind, id: StationId) -> Result<Arc<Station>, WorldError> {
        self.stations(kind)?
            .get(id)
            .cloned()
            .ok_or(WorldError::StationNotFound { kind, id })
    }

    /// Look up a station by display name.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::LockPoisoned`].
    pub fn station_by_name(
        &self,
        kind: StationKind,
        name: &str,
    ) -> Result<Option<Arc<Station>>, WorldError> {
        Ok(self.stations(kind)?.by_name(name).cloned())
    }

    /// The cargo list of a station, read under its inventory lock.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StationNotFound`] or [`WorldError::LockPoisoned`].
    pub fn cargo_view(
        &self,
        kind: StationKind,
        id: StationId,
    ) -> Result<Vec<CargoView>, WorldError> {
        self.station(kind, id)?.cargo_view()
    }

    /// Move cargo from a station onto `hold`. See [`trade::buy`].
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StationNotFound`] or any error of
    /// [`trade::buy`].
    pub fn buy_cargo(
        &self,
        kind: StationKind,
        id: StationId,
        hold: &mut Hold,
        item: &str,
        quantity: i64,
    ) -> Result<TradeReceipt, WorldError> {
        let station = self.station(kind, id)?;
        trade::buy(&station, hold, item, quantity)
    }

    /// Move cargo from `hold` onto a station. See [`trade::sell`].
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StationNotFound`] or any error of
    /// [`trade::sell`].
    pub fn sell_cargo(
        &self,
        kind: StationKind,
        id: StationId,
        hold: &mut Hold,
        item: &str,
        quantity: i64,
    ) -> Result<TradeReceipt, WorldError> {
        let station = self.station(kind, id)?;
        trade::sell(&station, hold, item, quantity)
    }

    // -------------------------------------------------------------------
    // Lookup and navigation
    // -------------------------------------------------------------------

    /// Look up a system by identifier.
    pub fn system(&self, id: SystemId) -> Option<&System> {
        self.sectors.get(id)
    }

    /// Look up a system by display name.
    pub fn system_by_name(&self, name: &str) -> Option<&System> {
        self.sectors.by_name(name)
    }

    /// Navigation projection of a system.
    pub fn summary(&self, id: SystemId) -> Option<SystemSummary> {
        self.sectors.get(id).map(System::summary)
    }

    /// Look up a civilization by identifier.
    pub fn civilization(&self, id: CivilizationId) -> Option<&Civilization> {
        self.civilizations.get(id)
    }

    /// Look up a civilization by display name.
    pub fn civilization_by_name(&self, name: &str) -> Option<&Civilization> {
        self.civilizations.by_name(name)
    }

    /// The civilization owning `system`, if any.
    pub fn civilization_of(&self, system: SystemId) -> Option<&Civilization> {
        self.sectors
            .get(system)
            .and_then(System::owner)
            .and_then(|owner| self.civilizations.get(owner))
    }

    /// Systems within `radius` ticks of `origin`, excluding `origin`.
    pub fn neighbors(&self, origin: SystemId, radius: i64) -> Vec<&System> {
        self.sectors.neighbors(origin, radius)
    }

    /// Distance between two systems in ticks, rounded toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SystemNotFound`] if either system is unknown.
    pub fn distance(&self, a: SystemId, b: SystemId) -> Result<i64, WorldError> {
        self.sectors.distance(a, b)
    }

    /// Aggregate counts.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::LockPoisoned`].
    pub fn stats(&self) -> Result<UniverseStats, WorldError> {
        let link_ends: usize = self.sectors.iter().map(|s| s.links().len()).sum();
        Ok(UniverseStats {
            systems: self.sectors.len(),
            links: link_ends.checked_div(2).unwrap_or(0),
            stars: self.sectors.iter().map(|s| s.stars.len()).sum(),
            planets: self.sectors.iter().map(|s| s.planets.len()).sum(),
            ports: self.stations(StationKind::Port)?.len(),
            bases: self.stations(StationKind::Base)?.len(),
            civilizations: self.civilizations.len(),
            owned_systems: self.sectors.owned_count(),
        })
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new(ItemRegistry::new())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use starbase_types::{PlanetId, PlanetType, Position};

    use super::*;
    use crate::cargo::{Cargo, Inventory};
    use crate::item::Item;
    use crate::planet::Planet;

    fn universe() -> Universe {
        let mut items = ItemRegistry::new();
        assert!(items.insert(Item::new("Fuel", 1, 4)).is_ok());
        let mut universe = Universe::new(items);
        let mut home = System::new(SystemId::new(1), "Home".to_owned(), 0, Position::ORIGIN);
        home.planets.push(Planet::new(
            PlanetId::new(5),
            "Home I".to_owned(),
            PlanetType::Ocean,
            12_000,
            1.0,
        ));
        assert!(universe.sectors_mut().insert(home).is_ok());
        let far = System::new(SystemId::new(2), "Far".to_owned(), 0, Position::new(30, 40));
        assert!(universe.sectors_mut().insert(far).is_ok());
        universe
    }

    fn fuel_station(id: u32, kind: StationKind, anchor: Anchor) -> Station {
        let fuel = Item::new("Fuel", 1, 4);
        Station::new(
            StationId::new(id),
            kind,
            format!("Station {id}"),
            "Depot".to_owned(),
            anchor,
            Inventory::from(vec![Cargo::new(&fuel, 1_000, 500)]),
        )
    }

    #[test]
    fn built_stations_are_recorded_on_anchor() {
        let mut universe = universe();
        let port_anchor = Anchor::Planet {
            system: SystemId::new(1),
            planet: PlanetId::new(5),
        };
        let port = universe.build_station(fuel_station(10, StationKind::Port, port_anchor));
        assert!(port.is_ok());
        let base_anchor = Anchor::System(SystemId::new(2));
        let base = universe.build_station(fuel_station(11, StationKind::Base, base_anchor));
        assert!(base.is_ok());

        let home = universe.system(SystemId::new(1));
        assert_eq!(home.map(|s| s.ports().collect::<Vec<_>>()), Some(vec![StationId::new(10)]));
        let far = universe.system(SystemId::new(2));
        assert_eq!(far.map(|s| s.bases.clone()), Some(vec![StationId::new(11)]));

        let stats = universe.stats().ok();
        assert_eq!(stats.map(|s| (s.ports, s.bases)), Some((1, 1)));
    }

    #[test]
    fn station_ids_are_unique_across_collections() {
        let universe = universe();
        assert!(universe
            .add_station(fuel_station(10, StationKind::Base, Anchor::System(SystemId::new(1))))
            .is_ok());
        let port_anchor = Anchor::Planet {
            system: SystemId::new(1),
            planet: PlanetId::new(5),
        };
        assert!(matches!(
            universe.add_station(fuel_station(10, StationKind::Port, port_anchor)),
            Err(WorldError::DuplicateKey(_))
        ));

        let mut rng = StdRng::seed_from_u64(5);
        let fresh = universe.allocate_station_id(&mut rng);
        assert!(fresh.is_ok_and(|id| id != StationId::new(10)));
    }

    #[test]
    fn dangling_anchors_rejected() {
        let universe = universe();
        assert!(matches!(
            universe.add_station(fuel_station(
                1,
                StationKind::Base,
                Anchor::System(SystemId::new(99))
            )),
            Err(WorldError::SystemNotFound(_))
        ));
        let bad_planet = Anchor::Planet {
            system: SystemId::new(1),
            planet: PlanetId::new(77),
        };
        assert!(matches!(
            universe.add_station(fuel_station(2, StationKind::Port, bad_planet)),
            Err(WorldError::PlanetNotFound { .. })
        ));
    }

    #[test]
    fn ownership_flows_through_universe() {
        let mut universe = universe();
        let civ = Civilization::new(CivilizationId::new(3), "Vega".to_owned(), 10);
        assert!(universe.add_civilization(civ).is_ok());
        assert!(universe.settle(CivilizationId::new(3), SystemId::new(1)).is_ok());
        assert!(universe.claim(CivilizationId::new(3), SystemId::new(2)).is_ok());
        assert!(matches!(
            universe.claim(CivilizationId::new(9), SystemId::new(2)),
            Err(WorldError::CivilizationNotFound(_))
        ));
        assert!(matches!(
            universe.claim(CivilizationId::new(3), SystemId::new(2)),
            Err(WorldError::AlreadyOwned { .. })
        ));
        let owner = universe.civilization_of(SystemId::new(2));
        assert_eq!(owner.map(|c| c.name.as_str()), Some("Vega"));
        assert_eq!(
            universe.civilization_by_name("Vega").and_then(Civilization::home),
            Some(SystemId::new(1))
        );
        assert_eq!(universe.stats().ok().map(|s| s.owned_systems), Some(2));
    }

    #[test]
    fn trades_go_through_station_lookup() {
        let universe = universe();
        assert!(universe
            .add_station(fuel_station(10, StationKind::Base, Anchor::System(SystemId::new(1))))
            .is_ok());
        let mut hold = Hold::new("Courier", 100, 100);
        let receipt =
            universe.buy_cargo(StationKind::Base, StationId::new(10), &mut hold, "Fuel", 30);
        assert_eq!(receipt.ok().map(|r| r.quantity), Some(25));
        let view = universe.cargo_view(StationKind::Base, StationId::new(10));
        assert_eq!(view.ok().and_then(|v| v.first().map(|c| c.amount)), Some(475));
        assert!(matches!(
            universe.sell_cargo(StationKind::Port, StationId::new(10), &mut hold, "Fuel", 1),
            Err(WorldError::StationNotFound { .. })
        ));
    }

    #[test]
    fn navigation_queries() {
        let mut universe = universe();
        assert_eq!(universe.distance(SystemId::new(1), SystemId::new(2)).ok(), Some(50));
        assert_eq!(universe.neighbors(SystemId::new(1), 50).len(), 1);
        assert!(universe.neighbors(SystemId::new(1), 49).is_empty());
        let linked = universe.sectors_mut().link(SystemId::new(1), SystemId::new(2));
        assert_eq!(linked.ok(), Some(true));
        assert_eq!(universe.stats().ok().map(|s| s.links), Some(1));
        assert_eq!(
            universe.summary(SystemId::new(2)).map(|s| s.links),
            Some(vec![SystemId::new(1)])
        );
        assert!(universe.system_by_name("Far").is_some());
    }
}
