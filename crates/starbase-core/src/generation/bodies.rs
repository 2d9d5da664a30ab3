//! Stars, planets, and native life.
//!
//! Every system receives one to three stars, primary first, and up to
//! eight planets orbiting the primary at increasing distances. Planet types
//! are drawn from the catalog's planet frequencies; a terrestrial or ocean
//! world inside the primary's habitable zone carries native life.

use rand::Rng;
use starbase_types::{PlanetId, PlanetType, SystemId};
use starbase_world::{
    MAX_LIFE_LEVEL, OrderedIndex, Planet, Star, Universe, WorldError, allocate_key, orbital_numeral,
    pick_weighted,
};

use super::GenerationError;
use crate::catalog::{PlanetBlueprint, ResolvedCatalog};

/// Relative frequency of one, two, and three stars.
const STAR_COUNT_WEIGHTS: [(usize, u32); 3] = [(1, 60), (2, 30), (3, 10)];

/// Most planets a system can hold.
const MAX_PLANETS: usize = 8;

/// Planet types used when the catalog defines none.
const FALLBACK_PLANETS: [(PlanetType, u32); 6] = [
    (PlanetType::Terrestrial, 3),
    (PlanetType::Ocean, 1),
    (PlanetType::Barren, 4),
    (PlanetType::Lava, 1),
    (PlanetType::Ice, 2),
    (PlanetType::GasGiant, 3),
];

/// Diameter range in kilometres for planet types the catalog does not size.
const fn fallback_diameter(kind: PlanetType) -> (u32, u32) {
    match kind {
        PlanetType::Terrestrial | PlanetType::Ocean => (6_000, 16_000),
        PlanetType::Barren | PlanetType::Lava => (2_000, 12_000),
        PlanetType::Ice => (3_000, 50_000),
        PlanetType::GasGiant => (40_000, 150_000),
    }
}

/// Add stars and planets to every system. Returns the number of planets
/// created.
///
/// # Errors
///
/// Returns [`GenerationError::World`] if planet identifiers run out.
pub fn populate_bodies<R: Rng + ?Sized>(
    universe: &mut Universe,
    catalog: &ResolvedCatalog,
    rng: &mut R,
) -> Result<usize, GenerationError> {
    let ids: Vec<SystemId> = universe.sectors().iter().map(|s| s.id).collect();
    let mut planet_ids: OrderedIndex<PlanetId, SystemId> = OrderedIndex::unique();
    let mut created = 0_usize;

    for id in ids {
        let system = universe
            .sectors_mut()
            .get_mut(id)
            .ok_or(WorldError::SystemNotFound(id))?;

        let stars = pick_weighted(rng, &STAR_COUNT_WEIGHTS).unwrap_or(1);
        system.stars = (0..stars).map(|_| Star::random(rng)).collect();
        let Some(primary) = system.stars.first() else {
            continue;
        };

        let count = rng.random_range(0..=MAX_PLANETS);
        // First orbit sits somewhere inside the habitable zone's inner edge,
        // each further orbit 1.4 to 2.0 times the previous one.
        let mut orbit = primary.habitable_inner * rng.random_range(0.2..0.9);
        let mut planets = Vec::with_capacity(count);
        for position in 1..=count {
            let planet_id: PlanetId = allocate_key(&planet_ids, rng)?;
            planet_ids.insert(planet_id, id)?;

            let (kind, (low, high)) = planet_kind(&catalog.planets, rng);
            let diameter = rng.random_range(low..=high.max(low));
            let name = format!("{} {}", system.name, orbital_numeral(position));
            let mut planet = Planet::new(planet_id, name, kind, diameter, orbit);
            if kind.supports_life() && primary.in_habitable_zone(orbit) {
                planet.life_level = rng.random_range(1..=MAX_LIFE_LEVEL);
            }
            planets.push(planet);
            orbit *= rng.random_range(1.4..2.0);
        }
        created = created.saturating_add(planets.len());
        system.planets = planets;
    }
    Ok(created)
}

/// Draw a planet type and its diameter range.
fn planet_kind<R: Rng + ?Sized>(
    blueprints: &[PlanetBlueprint],
    rng: &mut R,
) -> (PlanetType, (u32, u32)) {
    let table: Vec<(usize, u32)> = blueprints
        .iter()
        .enumerate()
        .map(|(i, b)| (i, b.frequency))
        .collect();
    if let Some(blueprint) = pick_weighted(rng, &table).and_then(|i| blueprints.get(i)) {
        return (
            blueprint.kind,
            (blueprint.min_diameter_km, blueprint.max_diameter_km),
        );
    }
    let kind = pick_weighted(rng, &FALLBACK_PLANETS).unwrap_or(PlanetType::Barren);
    (kind, fallback_diameter(kind))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use starbase_types::Position;
    use starbase_world::System;

    use super::*;

    fn universe(systems: u32) -> Universe {
        let mut universe = Universe::default();
        for i in 0..systems {
            let x = i64::from(i).saturating_mul(100_000);
            let system = System::new(SystemId::new(i), format!("S{i}"), 0, Position::new(x, 0));
            assert!(universe.sectors_mut().insert(system).is_ok());
        }
        universe
    }

    #[test]
    fn every_system_gets_stars_and_ordered_orbits() {
        let mut universe = universe(40);
        let mut rng = StdRng::seed_from_u64(21);
        let planets = populate_bodies(&mut universe, &ResolvedCatalog::default(), &mut rng);
        let stats = universe.stats();
        assert_eq!(planets.ok(), stats.ok().map(|s| s.planets));

        for system in universe.sectors().iter() {
            assert!((1..=3).contains(&system.stars.len()));
            assert!(system.planets.len() <= MAX_PLANETS);
            for pair in system.planets.windows(2) {
                if let [inner, outer] = pair {
                    assert!(inner.orbit_au < outer.orbit_au);
                }
            }
        }
    }

    #[test]
    fn planet_names_carry_system_and_numeral() {
        let mut universe = universe(20);
        let mut rng = StdRng::seed_from_u64(22);
        assert!(populate_bodies(&mut universe, &ResolvedCatalog::default(), &mut rng).is_ok());
        for system in universe.sectors().iter() {
            for (i, planet) in system.planets.iter().enumerate() {
                let expected = format!("{} {}", system.name, orbital_numeral(i.saturating_add(1)));
                assert_eq!(planet.name, expected);
            }
        }
    }

    #[test]
    fn life_only_in_habitable_zone_of_suitable_worlds() {
        let mut universe = universe(60);
        let mut rng = StdRng::seed_from_u64(23);
        assert!(populate_bodies(&mut universe, &ResolvedCatalog::default(), &mut rng).is_ok());
        for system in universe.sectors().iter() {
            let Some(primary) = system.primary() else {
                continue;
            };
            for planet in &system.planets {
                if planet.is_inhabited() {
                    assert!(planet.kind.supports_life());
                    assert!(primary.in_habitable_zone(planet.orbit_au));
                    assert!(planet.life_level <= MAX_LIFE_LEVEL);
                }
            }
        }
    }

    #[test]
    fn catalog_frequencies_drive_planet_types() {
        let catalog = ResolvedCatalog {
            planets: vec![PlanetBlueprint {
                kind: PlanetType::Ice,
                frequency: 1,
                min_diameter_km: 5_000,
                max_diameter_km: 6_000,
                ports: Vec::new(),
            }],
            ..ResolvedCatalog::default()
        };
        let mut universe = universe(20);
        let mut rng = StdRng::seed_from_u64(24);
        assert!(populate_bodies(&mut universe, &catalog, &mut rng).is_ok());
        for planet in universe.sectors().iter().flat_map(|s| &s.planets) {
            assert_eq!(planet.kind, PlanetType::Ice);
            assert!((5_000..=6_000).contains(&planet.diameter_km));
        }
    }

    #[test]
    fn planet_ids_are_unique_across_the_galaxy() {
        let mut universe = universe(50);
        let mut rng = StdRng::seed_from_u64(25);
        assert!(populate_bodies(&mut universe, &ResolvedCatalog::default(), &mut rng).is_ok());
        let mut ids: Vec<PlanetId> = universe
            .sectors()
            .iter()
            .flat_map(|s| s.planets.iter().map(|p| p.id))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
