//! Constellation layout: placing and linking systems.
//!
//! The first system of the first constellation sits at the origin. Every
//! later constellation starts at a point found by polar steps of growing
//! radius away from a random earlier anchor, retried while the point has a
//! neighbor closer than `constellation_spacing`. The rest of a
//! constellation grows around a frontier set: each new system attaches to a
//! random frontier member (falling back to the anchor once the frontier is
//! empty), and the member then retires with `frontier_retire_chance`.

use std::f64::consts::TAU;

use rand::Rng;
use starbase_types::{Position, SystemId};
use starbase_world::{SectorStore, System, Universe, WorldError, allocate_key};
use tracing::debug;

use super::GenerationError;
use crate::config::GalaxyConfig;

const NAME_PREFIXES: &[&str] = &[
    "Al", "Bel", "Cor", "Dra", "El", "Fen", "Gal", "Hy", "Ir", "Jor", "Kel", "Lyr", "Mir", "Nor",
    "Ori", "Pol", "Qua", "Rig", "Sar", "Tau", "Ul", "Veg", "Xan", "Zet",
];

const NAME_SUFFIXES: &[&str] = &[
    "aris", "ba", "cor", "dine", "gar", "heim", "ion", "is", "kar", "lon", "mos", "nus", "os",
    "phei", "ra", "tis",
];

/// Random draws made for a fresh name before falling back to numbering.
const NAME_ATTEMPTS: u32 = 16;

/// Lay out every constellation. Returns the number of links created.
///
/// # Errors
///
/// Returns [`GenerationError::PlacementExhausted`] if a constellation
/// anchor or member cannot be placed within `max_attempts` draws.
pub fn layout_constellations<R: Rng + ?Sized>(
    universe: &mut Universe,
    config: &GalaxyConfig,
    rng: &mut R,
) -> Result<usize, GenerationError> {
    let mut anchors: Vec<SystemId> = Vec::new();
    let mut links = 0_usize;
    let max_members = config.max_systems_per_constellation.max(1);

    for constellation in 0..config.constellations {
        let count = rng.random_range(1..=max_members);

        let (position, parent) = if anchors.is_empty() && universe.sectors().is_empty() {
            (Position::ORIGIN, None)
        } else {
            let (position, parent) =
                anchor_position(universe.sectors(), &anchors, config, constellation, rng)?;
            (position, Some(parent))
        };
        let first = add_system(universe, constellation, position, rng)?;
        if let Some(parent) = parent
            && universe.sectors_mut().link(parent, first)?
        {
            links = links.saturating_add(1);
        }

        let mut frontier = vec![first];
        for _ in 1..count {
            let pick = if frontier.is_empty() {
                None
            } else {
                Some(rng.random_range(0..frontier.len()))
            };
            let parent = pick.and_then(|i| frontier.get(i).copied()).unwrap_or(first);
            let position = member_position(universe.sectors(), parent, config, constellation, rng)?;
            let child = add_system(universe, constellation, position, rng)?;
            if universe.sectors_mut().link(parent, child)? {
                links = links.saturating_add(1);
            }
            frontier.push(child);
            if let Some(i) = pick
                && rng.random_bool(config.frontier_retire_chance.clamp(0.0, 1.0))
            {
                frontier.swap_remove(i);
            }
        }

        debug!(constellation, systems = count, anchor = %first, "constellation placed");
        anchors.push(first);
    }
    Ok(links)
}

/// Find a start point for a new constellation: repeated polar steps of
/// growing radius from a random earlier anchor until the point is clear of
/// every system by `constellation_spacing`. Returns the point and the
/// anchor it was stepped from.
fn anchor_position<R: Rng + ?Sized>(
    sectors: &SectorStore,
    anchors: &[SystemId],
    config: &GalaxyConfig,
    constellation: u32,
    rng: &mut R,
) -> Result<(Position, SystemId), GenerationError> {
    let exhausted = GenerationError::PlacementExhausted {
        constellation,
        attempts: config.max_attempts,
    };
    let from = if anchors.is_empty() {
        sectors.by_slot(rng.random_range(0..sectors.len().max(1)))
    } else {
        anchors
            .get(rng.random_range(0..anchors.len()))
            .and_then(|id| sectors.get(*id))
    };
    let Some(from) = from else {
        return Err(exhausted);
    };
    let origin = from.position();
    let spacing = config.constellation_spacing();
    let step = config.constellation_step().max(1);

    let mut radius = 0_i64;
    for _ in 0..config.max_attempts {
        radius = radius.saturating_add(rng.random_range(1..=step));
        let candidate = origin.step(radius, rng.random_range(0.0..TAU));
        if sectors.is_x_free(candidate.x) && !sectors.any_within(candidate, spacing) {
            return Ok((candidate, from.id));
        }
    }
    Err(exhausted)
}

/// Find a point near `parent` for a new constellation member, at a link
/// distance from it and clear of every system by `min_system_spacing`.
fn member_position<R: Rng + ?Sized>(
    sectors: &SectorStore,
    parent: SystemId,
    config: &GalaxyConfig,
    constellation: u32,
    rng: &mut R,
) -> Result<Position, GenerationError> {
    let origin = sectors
        .get(parent)
        .map(System::position)
        .ok_or(WorldError::SystemNotFound(parent))?;
    let low = config.link_distance_min().min(config.link_distance_max()).max(1);
    let high = config.link_distance_max().max(low);
    let spacing = config.min_system_spacing();

    for _ in 0..config.max_attempts {
        let distance = rng.random_range(low..=high);
        let candidate = origin.step(distance, rng.random_range(0.0..TAU));
        if sectors.is_x_free(candidate.x) && !sectors.any_within(candidate, spacing) {
            return Ok(candidate);
        }
    }
    Err(GenerationError::PlacementExhausted {
        constellation,
        attempts: config.max_attempts,
    })
}

fn add_system<R: Rng + ?Sized>(
    universe: &mut Universe,
    constellation: u32,
    position: Position,
    rng: &mut R,
) -> Result<SystemId, GenerationError> {
    let id: SystemId = allocate_key(universe.sectors().id_index(), rng)?;
    let name = system_name(universe.sectors(), rng);
    let system = System::new(id, name, constellation, position);
    Ok(universe.sectors_mut().insert(system)?)
}

/// A display name not yet used by any system.
fn system_name<R: Rng + ?Sized>(sectors: &SectorStore, rng: &mut R) -> String {
    let mut base = String::new();
    for _ in 0..NAME_ATTEMPTS {
        let prefix = NAME_PREFIXES
            .get(rng.random_range(0..NAME_PREFIXES.len()))
            .copied()
            .unwrap_or("Nova");
        let suffix = NAME_SUFFIXES
            .get(rng.random_range(0..NAME_SUFFIXES.len()))
            .copied()
            .unwrap_or("");
        base = format!("{prefix}{suffix}");
        if sectors.by_name(&base).is_none() {
            return base;
        }
    }
    // Every draw collided: number the last one.
    let mut ordinal = 2_usize;
    loop {
        let candidate = format!("{base} {ordinal}");
        if sectors.by_name(&candidate).is_none() {
            return candidate;
        }
        ordinal = ordinal.saturating_add(1);
    }
}
