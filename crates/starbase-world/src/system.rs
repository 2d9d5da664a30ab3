//! Star systems: the nodes of the galaxy.
//!
//! A [`System`] owns its stars and planets and records the identifiers of
//! its links, its bases, and its owning civilization. Position, links, and
//! ownership are private: they change only through the [`SectorStore`],
//! which keeps the x-axis index, link symmetry, and ownership monotonicity
//! consistent.
//!
//! [`SectorStore`]: crate::sector_store::SectorStore

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use starbase_types::{CivilizationId, PlanetId, Position, StationId, SystemId, SystemSummary};

use crate::planet::Planet;
use crate::star::Star;

/// A star system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    /// System identifier.
    pub id: SystemId,
    /// Unique display name.
    pub name: String,
    /// Index of the generation-time constellation this system belongs to.
    pub constellation: u32,
    /// Stars, primary first.
    pub stars: Vec<Star>,
    /// Planets in orbital order around the primary.
    pub planets: Vec<Planet>,
    /// Bases anchored directly on this system.
    pub bases: Vec<StationId>,
    position: Position,
    links: BTreeSet<SystemId>,
    owner: Option<CivilizationId>,
}

impl System {
    /// Create an empty, unowned, unlinked system at `position`.
    pub const fn new(id: SystemId, name: String, constellation: u32, position: Position) -> Self {
        Self {
            id,
            name,
            constellation,
            stars: Vec::new(),
            planets: Vec::new(),
            bases: Vec::new(),
            position,
            links: BTreeSet::new(),
            owner: None,
        }
    }

    /// Location in the galactic plane.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Polar radius from the galactic origin, in ticks.
    pub fn radius(&self) -> i64 {
        self.position.radius()
    }

    /// Polar angle from the galactic origin, in radians.
    pub fn angle(&self) -> f64 {
        self.position.angle()
    }

    /// Systems directly linked to this one.
    pub const fn links(&self) -> &BTreeSet<SystemId> {
        &self.links
    }

    /// Whether a direct link to `other` exists.
    pub fn is_linked(&self, other: SystemId) -> bool {
        self.links.contains(&other)
    }

    /// The owning civilization, if claimed.
    pub const fn owner(&self) -> Option<CivilizationId> {
        self.owner
    }

    /// The primary star, if any.
    pub fn primary(&self) -> Option<&Star> {
        self.stars.first()
    }

    /// Look up one of this system's planets.
    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    /// Look up one of this system's planets mutably.
    pub fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.iter_mut().find(|p| p.id == id)
    }

    /// Every port anchored on any planet in this system.
    pub fn ports(&self) -> impl Iterator<Item = StationId> + '_ {
        self.planets.iter().flat_map(|p| p.ports.iter().copied())
    }

    /// Aggregate suitability-for-life score: the sum of star contributions
    /// plus planet life levels. Informational only.
    pub fn habitability(&self) -> f64 {
        let stars: f64 = self.stars.iter().map(Star::habitability).sum();
        let life: f64 = self.planets.iter().map(|p| f64::from(p.life_level)).sum();
        stars + life
    }

    /// Build the navigation display projection.
    pub fn summary(&self) -> SystemSummary {
        SystemSummary {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            owner: self.owner,
            habitability: self.habitability(),
            links: self.links.iter().copied().collect(),
            star_count: u32::try_from(self.stars.len()).unwrap_or(u32::MAX),
            planet_count: u32::try_from(self.planets.len()).unwrap_or(u32::MAX),
        }
    }

    pub(crate) const fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn add_link(&mut self, other: SystemId) -> bool {
        self.links.insert(other)
    }

    pub(crate) const fn set_owner(&mut self, owner: CivilizationId) {
        self.owner = Some(owner);
    }
}
