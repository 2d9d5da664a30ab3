//! Civilization spawn and growth.
//!
//! Each civilization first settles a home system: its configured one when
//! that system exists and qualifies, otherwise a randomly sampled one. A
//! home must be unowned with no owned system within `min_home_distance`.
//!
//! Growth then runs in rounds until the owned fraction reaches
//! `habitation_percent`. In each round every civilization grows with
//! probability `power / total_power`: it picks one of its systems and
//! searches outward in fixed radius steps for an unowned neighbor, claims
//! it, and links it to the parent.

use rand::Rng;
use starbase_types::{CivilizationId, SystemId};
use starbase_world::{Civilization, SectorStore, Universe, WorldError, allocate_key};
use tracing::{debug, info, warn};

use super::GenerationError;
use crate::catalog::CivilizationTemplate;
use crate::config::CivilizationConfig;

/// Create, settle, and grow every civilization.
///
/// # Errors
///
/// Returns [`GenerationError::HomeSystemNotFound`] if no home qualifies
/// within `max_attempts` draws, [`GenerationError::NoPower`] if growth is
/// needed but every civilization has zero power, or
/// [`GenerationError::GrowthStalled`] after `max_attempts` consecutive
/// rounds without a claim.
pub fn spawn_civilizations<R: Rng + ?Sized>(
    universe: &mut Universe,
    templates: &[CivilizationTemplate],
    config: &CivilizationConfig,
    max_attempts: u32,
    rng: &mut R,
) -> Result<(), GenerationError> {
    if templates.is_empty() {
        info!("no civilizations configured");
        return Ok(());
    }

    let mut civilizations = Vec::with_capacity(templates.len());
    for template in templates {
        let id: CivilizationId = allocate_key(universe.civilizations().id_index(), rng)?;
        let civilization = Civilization::new(id, template.name.clone(), template.power);
        universe.add_civilization(civilization)?;
        civilizations.push(id);
    }

    for (&id, template) in civilizations.iter().zip(templates) {
        let home = choose_home(universe.sectors(), template, config, max_attempts, rng)?;
        universe.settle(id, home)?;
        info!(civilization = %template.name, home = %home, "civilization settled");
    }

    grow(universe, &civilizations, config, max_attempts, rng)
}

/// Number of systems that should be owned once growth finishes.
fn habitation_target(systems: usize, percent: u32) -> usize {
    let percent = usize::try_from(percent.min(100)).unwrap_or(100);
    systems.saturating_mul(percent).div_ceil(100)
}

fn choose_home<R: Rng + ?Sized>(
    sectors: &SectorStore,
    template: &CivilizationTemplate,
    config: &CivilizationConfig,
    max_attempts: u32,
    rng: &mut R,
) -> Result<SystemId, GenerationError> {
    let spacing = config.min_home_distance();
    if let Some(name) = &template.home {
        match sectors.by_name(name) {
            Some(system) if is_valid_home(sectors, system.id, spacing) => return Ok(system.id),
            Some(_) => {
                warn!(
                    civilization = %template.name,
                    home = %name,
                    "configured home is taken or crowded, sampling another"
                );
            }
            None => {
                warn!(
                    civilization = %template.name,
                    home = %name,
                    "configured home does not exist, sampling another"
                );
            }
        }
    }

    if !sectors.is_empty() {
        for _ in 0..max_attempts {
            let Some(candidate) = sectors.by_slot(rng.random_range(0..sectors.len())) else {
                continue;
            };
            if is_valid_home(sectors, candidate.id, spacing) {
                return Ok(candidate.id);
            }
        }
    }
    Err(GenerationError::HomeSystemNotFound {
        civilization: template.name.clone(),
        attempts: max_attempts,
    })
}

/// Unowned, with no owned system within `spacing` ticks.
fn is_valid_home(sectors: &SectorStore, system: SystemId, spacing: i64) -> bool {
    sectors.get(system).is_some_and(|s| s.owner().is_none())
        && !sectors
            .neighbors(system, spacing)
            .iter()
            .any(|s| s.owner().is_some())
}

fn grow<R: Rng + ?Sized>(
    universe: &mut Universe,
    civilizations: &[CivilizationId],
    config: &CivilizationConfig,
    max_attempts: u32,
    rng: &mut R,
) -> Result<(), GenerationError> {
    let target = habitation_target(universe.sectors().len(), config.habitation_percent);
    let mut owned = universe.sectors().owned_count();
    if owned >= target {
        return Ok(());
    }
    let total = universe.civilizations().total_power();
    if total == 0 {
        return Err(GenerationError::NoPower {
            civilizations: civilizations.len(),
        });
    }

    let mut idle = 0_u32;
    while owned < target {
        let mut claimed = false;
        for &id in civilizations {
            if owned >= target {
                break;
            }
            let power = universe
                .civilization(id)
                .map(|c| u64::from(c.power))
                .ok_or(WorldError::CivilizationNotFound(id))?;
            if rng.random_range(0..total) >= power {
                continue;
            }
            if let Some(system) = expand(universe, id, config, rng)? {
                debug!(civilization = %id, system = %system, owned, target, "system claimed");
                owned = owned.saturating_add(1);
                claimed = true;
            }
        }
        if claimed {
            idle = 0;
        } else {
            idle = idle.saturating_add(1);
            if idle >= max_attempts {
                return Err(GenerationError::GrowthStalled {
                    owned,
                    target,
                    attempts: idle,
                });
            }
        }
    }
    info!(owned, target, "civilization growth complete");
    Ok(())
}

/// Grow one civilization by a single system. Returns the system claimed,
/// or `None` if the chosen parent has no unowned neighbor in range.
fn expand<R: Rng + ?Sized>(
    universe: &mut Universe,
    civilization: CivilizationId,
    config: &CivilizationConfig,
    rng: &mut R,
) -> Result<Option<SystemId>, GenerationError> {
    let owned = universe
        .civilization(civilization)
        .map(Civilization::owned)
        .ok_or(WorldError::CivilizationNotFound(civilization))?;
    if owned.is_empty() {
        return Ok(None);
    }
    let Some(&parent) = owned.get(rng.random_range(0..owned.len())) else {
        return Ok(None);
    };

    let step = config.growth_radius_step();
    let max = config.max_growth_radius();
    let mut radius = step;
    while radius <= max {
        let free: Vec<SystemId> = universe
            .neighbors(parent, radius)
            .iter()
            .filter(|s| s.owner().is_none())
            .map(|s| s.id)
            .collect();
        if let Some(&child) = free.get(rng.random_range(0..free.len().max(1))) {
            universe.claim(civilization, child)?;
            universe.sectors_mut().link(parent, child)?;
            return Ok(Some(child));
        }
        radius = radius.saturating_add(step);
    }
    Ok(None)
}
