//! Procedural galaxy generation.
//!
//! Generation runs once at startup, single-threaded, with exclusive access
//! to the [`Universe`]. The phases run in order from one seeded RNG, so a
//! seed fully determines the galaxy:
//!
//! 1. [`layout_constellations`] -- place and link systems
//! 2. [`populate_bodies`] -- stars, planets, and life
//! 3. [`build_stations`] -- ports on planets, bases in systems
//! 4. [`spawn_civilizations`] -- home systems, then growth to the target
//!    habitation fraction
//!
//! Every rejection-sampling loop is bounded by `galaxy.max_attempts` and
//! fails with a typed [`GenerationError`] instead of spinning.

mod bodies;
mod civilization;
mod constellation;
mod stations;

pub use bodies::populate_bodies;
pub use civilization::spawn_civilizations;
pub use constellation::layout_constellations;
pub use stations::{build_inventory, build_stations};

use rand::SeedableRng;
use rand::rngs::StdRng;
use starbase_world::{Universe, WorldError};
use tracing::info;

use crate::catalog::{CatalogError, ResolvedCatalog};
use crate::config::SimulationConfig;

/// Errors that abort generation. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No acceptable position was found for a new system.
    #[error(
        "no position found for a system of constellation {constellation} after {attempts} attempts"
    )]
    PlacementExhausted {
        /// The constellation being laid out.
        constellation: u32,
        /// Attempts made.
        attempts: u32,
    },

    /// No unowned, isolated system was found for a civilization's home.
    #[error("no home system found for civilization {civilization} after {attempts} attempts")]
    HomeSystemNotFound {
        /// The civilization being settled.
        civilization: String,
        /// Attempts made.
        attempts: u32,
    },

    /// Growth stopped claiming systems before the habitation target.
    #[error("growth stalled at {owned} of {target} owned systems after {attempts} idle rounds")]
    GrowthStalled {
        /// Systems owned when growth gave up.
        owned: usize,
        /// Systems that should have been owned.
        target: usize,
        /// Consecutive rounds without a claim.
        attempts: u32,
    },

    /// Civilizations must grow but none has any power.
    #[error("{civilizations} civilizations have zero total power")]
    NoPower {
        /// Number of civilizations.
        civilizations: usize,
    },

    /// A template lookup failed.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },

    /// A galaxy-state operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Generate a complete universe from `config` and the resolved catalog.
///
/// # Errors
///
/// Returns the first [`GenerationError`] of any phase.
pub fn generate(
    config: &SimulationConfig,
    catalog: &ResolvedCatalog,
) -> Result<Universe, GenerationError> {
    let mut rng = StdRng::seed_from_u64(config.galaxy.seed);
    let mut universe = Universe::new(catalog.items.clone());

    info!(seed = config.galaxy.seed, "generating galaxy");
    let links = layout_constellations(&mut universe, &config.galaxy, &mut rng)?;
    info!(systems = universe.sectors().len(), links, "constellations laid out");

    let planets = populate_bodies(&mut universe, catalog, &mut rng)?;
    info!(planets, "bodies populated");

    let built = build_stations(&mut universe, catalog, &config.economy, &mut rng)?;
    info!(stations = built, "stations built");

    spawn_civilizations(
        &mut universe,
        &catalog.civilizations,
        &config.civilizations,
        config.galaxy.max_attempts,
        &mut rng,
    )?;
    let stats = universe.stats()?;
    info!(
        systems = stats.systems,
        links = stats.links,
        stars = stats.stars,
        planets = stats.planets,
        ports = stats.ports,
        bases = stats.bases,
        civilizations = stats.civilizations,
        owned = stats.owned_systems,
        "galaxy generated"
    );
    Ok(universe)
}
