//! Ports and bases.
//!
//! Ports are built on planets whose type template lists them, bases
//! directly in systems. Each eligible anchor rolls once against the
//! template's percent chance. Prices and starting stock vary around the
//! template values by the configured percentages.

use rand::Rng;
use starbase_types::{PlanetId, PlanetType, StationKind, SystemId};
use starbase_world::{Anchor, Cargo, Inventory, Station, Universe, WorldError};
use tracing::debug;

use super::GenerationError;
use crate::catalog::{ResolvedCatalog, StationBlueprint};
use crate::config::EconomyConfig;

/// Build the inventory of one new station from its template.
///
/// # Errors
///
/// Returns [`WorldError::InvalidRequirement`] if a requirement index points
/// outside the template's cargo list.
pub fn build_inventory<R: Rng + ?Sized>(
    blueprint: &StationBlueprint,
    economy: &EconomyConfig,
    rng: &mut R,
) -> Result<Inventory, WorldError> {
    let mut inventory = Inventory::new();
    for line in &blueprint.cargo {
        let amount = vary(line.amount, economy.stock_variance_percent, rng);
        let price = vary(line.item.base_price, economy.price_variance_percent, rng);
        let cargo = Cargo::new(&line.item, line.max, amount)
            .with_daily_change(line.daily_change)
            .with_price(price);
        inventory.push(cargo);
    }
    for (slot, line) in blueprint.cargo.iter().enumerate() {
        for &requirement in &line.requires {
            inventory.add_requirement(slot, requirement)?;
        }
    }
    Ok(inventory)
}

/// Shift `value` by a random amount of at most `percent` percent either way.
fn vary<R: Rng + ?Sized>(value: i64, percent: u32, rng: &mut R) -> i64 {
    let percent = i64::from(percent.min(100));
    if percent == 0 {
        return value;
    }
    let factor = rng.random_range(-percent..=percent);
    value.saturating_add(value.saturating_mul(factor) / 100)
}

/// Build every port and base. Returns the number of stations created.
///
/// # Errors
///
/// Returns [`GenerationError::Catalog`] if a planet template names a port
/// template that does not exist, or [`GenerationError::World`] if station
/// identifiers run out or a station cannot be registered.
pub fn build_stations<R: Rng + ?Sized>(
    universe: &mut Universe,
    catalog: &ResolvedCatalog,
    economy: &EconomyConfig,
    rng: &mut R,
) -> Result<usize, GenerationError> {
    let systems: Vec<SystemId> = universe.sectors().iter().map(|s| s.id).collect();
    let mut built = 0_usize;

    for system_id in systems {
        let system = universe
            .sectors()
            .get(system_id)
            .ok_or(WorldError::SystemNotFound(system_id))?;
        let system_name = system.name.clone();
        let planets: Vec<(PlanetId, String, PlanetType)> = system
            .planets
            .iter()
            .map(|p| (p.id, p.name.clone(), p.kind))
            .collect();

        for (planet, planet_name, kind) in planets {
            for template in port_templates(catalog, kind) {
                let blueprint = catalog.station(StationKind::Port, template)?;
                if !roll(blueprint.chance, rng) {
                    continue;
                }
                let anchor = Anchor::Planet {
                    system: system_id,
                    planet,
                };
                build_one(universe, blueprint, anchor, &planet_name, economy, rng)?;
                built = built.saturating_add(1);
            }
        }

        for blueprint in &catalog.bases {
            if !roll(blueprint.chance, rng) {
                continue;
            }
            build_one(universe, blueprint, Anchor::System(system_id), &system_name, economy, rng)?;
            built = built.saturating_add(1);
        }
    }
    Ok(built)
}

/// Port template names listed by every planet template of `kind`, in
/// catalog order without repeats.
fn port_templates(catalog: &ResolvedCatalog, kind: PlanetType) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for name in catalog
        .planets
        .iter()
        .filter(|p| p.kind == kind)
        .flat_map(|p| p.ports.iter())
    {
        if !names.contains(&name.as_str()) {
            names.push(name);
        }
    }
    names
}

fn roll<R: Rng + ?Sized>(chance: u32, rng: &mut R) -> bool {
    chance >= 100 || rng.random_range(0..100) < chance
}

fn build_one<R: Rng + ?Sized>(
    universe: &mut Universe,
    blueprint: &StationBlueprint,
    anchor: Anchor,
    anchor_name: &str,
    economy: &EconomyConfig,
    rng: &mut R,
) -> Result<(), GenerationError> {
    let id = universe.allocate_station_id(rng)?;
    let inventory = build_inventory(blueprint, economy, rng)?;
    let name = format!("{anchor_name} {}", blueprint.name);
    let station = Station::new(id, blueprint.kind, name, blueprint.name.clone(), anchor, inventory);
    let station = universe.build_station(station)?;
    debug!(kind = %station.kind, station = %station.name, id = %station.id, "station built");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use starbase_types::Position;
    use starbase_world::{Item, Planet, System};

    use super::*;
    use crate::catalog::{CargoBlueprint, PlanetBlueprint};

    fn refinery() -> StationBlueprint {
        let ore = Item::new("Ore", 2, 10);
        let fuel = Item::new("Fuel", 1, 50);
        StationBlueprint {
            kind: StationKind::Port,
            name: "Refinery".to_owned(),
            chance: 100,
            cargo: vec![
                CargoBlueprint {
                    item: ore,
                    max: 1_000,
                    amount: 400,
                    daily_change: 0,
                    requires: Vec::new(),
                },
                CargoBlueprint {
                    item: fuel,
                    max: 500,
                    amount: 100,
                    daily_change: 50,
                    requires: vec![0],
                },
            ],
        }
    }

    fn depot() -> StationBlueprint {
        StationBlueprint {
            kind: StationKind::Base,
            name: "Depot".to_owned(),
            chance: 100,
            cargo: Vec::new(),
        }
    }

    fn catalog() -> ResolvedCatalog {
        ResolvedCatalog {
            ports: vec![refinery()],
            bases: vec![depot()],
            planets: vec![PlanetBlueprint {
                kind: PlanetType::Barren,
                frequency: 1,
                min_diameter_km: 2_000,
                max_diameter_km: 4_000,
                ports: vec!["Refinery".to_owned()],
            }],
            ..ResolvedCatalog::default()
        }
    }

    fn universe() -> Universe {
        let mut universe = Universe::default();
        for i in 0..3_u32 {
            let mut system = System::new(
                SystemId::new(i),
                format!("S{i}"),
                0,
                Position::new(i64::from(i).saturating_mul(10_000), 0),
            );
            system.planets.push(Planet::new(
                PlanetId::new(i),
                format!("S{i} I"),
                PlanetType::Barren,
                3_000,
                1.0,
            ));
            system.planets.push(Planet::new(
                PlanetId::new(i.saturating_add(100)),
                format!("S{i} II"),
                PlanetType::GasGiant,
                90_000,
                5.0,
            ));
            assert!(universe.sectors_mut().insert(system).is_ok());
        }
        universe
    }

    #[test]
    fn inventory_follows_the_template() {
        let mut rng = StdRng::seed_from_u64(31);
        let economy = EconomyConfig {
            price_variance_percent: 0,
            stock_variance_percent: 0,
            ..EconomyConfig::default()
        };
        let inventory = build_inventory(&refinery(), &economy, &mut rng);
        assert!(inventory.is_ok());
        let inventory = inventory.unwrap_or_default();
        assert_eq!(inventory.len(), 2);
        let fuel = inventory.find("Fuel");
        assert_eq!(fuel.map(Cargo::amount), Some(100));
        assert_eq!(fuel.map(|c| c.price), Some(50));
        assert_eq!(fuel.map(|c| c.daily_change), Some(50));
        assert_eq!(fuel.map(Cargo::requirements), Some(&[0_usize][..]));
    }

    #[test]
    fn variance_stays_within_percent() {
        let mut rng = StdRng::seed_from_u64(32);
        for _ in 0..200 {
            let v = vary(1_000, 20, &mut rng);
            assert!((800..=1_200).contains(&v));
        }
        assert_eq!(vary(1_000, 0, &mut rng), 1_000);
    }

    #[test]
    fn ports_land_on_listed_planets_and_bases_in_systems() {
        let mut universe = universe();
        let mut rng = StdRng::seed_from_u64(33);
        let built = build_stations(&mut universe, &catalog(), &EconomyConfig::default(), &mut rng);
        // One port per barren planet, one base per system.
        assert_eq!(built.ok(), Some(6));

        for system in universe.sectors().iter() {
            assert_eq!(system.bases.len(), 1);
            for planet in &system.planets {
                let expected = usize::from(planet.kind == PlanetType::Barren);
                assert_eq!(planet.ports.len(), expected);
            }
        }
        let port = universe.station_by_name(StationKind::Port, "S1 I Refinery");
        assert!(port.is_ok_and(|p| p.is_some_and(|p| p.template == "Refinery")));
        let base = universe.station_by_name(StationKind::Base, "S2 Depot");
        assert!(base.is_ok_and(|b| b.is_some()));
    }

    #[test]
    fn zero_chance_builds_nothing() {
        let mut catalog = catalog();
        for blueprint in catalog.ports.iter_mut().chain(catalog.bases.iter_mut()) {
            blueprint.chance = 0;
        }
        let mut universe = universe();
        let mut rng = StdRng::seed_from_u64(34);
        let built = build_stations(&mut universe, &catalog, &EconomyConfig::default(), &mut rng);
        assert_eq!(built.ok(), Some(0));
    }
}
