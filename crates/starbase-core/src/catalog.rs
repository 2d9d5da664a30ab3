//! Type templates: items, stations, planets, ships, and civilizations.
//!
//! The [`Catalog`] is deserialized straight from the `catalog` section of
//! the configuration file. [`Catalog::resolve`] checks every cross
//! reference once, before generation begins. Bad records are skipped with
//! a warning rather than failing the load:
//!
//! - duplicate item, template, or civilization names (first one wins)
//! - cargo referencing an unknown item, or listed twice in one template
//! - requirements naming an item the template does not stock, or itself
//! - planet templates naming an unknown port template
//!
//! The resolved catalog is read-only from then on.

use serde::Deserialize;
use starbase_types::{PlanetType, StationKind};
use starbase_world::{Hold, Item, ItemRegistry};
use tracing::{debug, warn};

/// Errors raised when looking up a resolved template.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No station template of this kind has the name.
    #[error("unknown {kind} template: {name}")]
    UnknownStationTemplate {
        /// Port or base.
        kind: StationKind,
        /// The requested template name.
        name: String,
    },

    /// No ship template has the name.
    #[error("unknown ship template: {0}")]
    UnknownShip(String),
}

// ---------------------------------------------------------------------------
// Raw templates (as written in the configuration file)
// ---------------------------------------------------------------------------

/// Every type template, as loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    /// Tradeable goods.
    #[serde(default)]
    pub items: Vec<ItemTemplate>,

    /// Port templates (built on planets).
    #[serde(default)]
    pub ports: Vec<StationTemplate>,

    /// Base templates (built in systems).
    #[serde(default)]
    pub bases: Vec<StationTemplate>,

    /// Planet type templates.
    #[serde(default)]
    pub planets: Vec<PlanetTemplate>,

    /// Ship templates for mobile holds.
    #[serde(default)]
    pub ships: Vec<ShipTemplate>,

    /// Predefined civilizations.
    #[serde(default)]
    pub civilizations: Vec<CivilizationTemplate>,
}

/// A tradeable good.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemTemplate {
    /// Unique item name.
    pub name: String,
    /// Weight of one unit.
    #[serde(default = "default_weight")]
    pub weight: i64,
    /// Base price of one unit.
    #[serde(default)]
    pub price: i64,
}

/// A port or base template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationTemplate {
    /// Unique template name.
    pub name: String,
    /// Percent chance that an eligible anchor receives this station.
    #[serde(default = "default_chance")]
    pub chance: u32,
    /// Cargo stocked by stations built from this template.
    #[serde(default)]
    pub cargo: Vec<CargoTemplate>,
}

/// One cargo line of a station template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CargoTemplate {
    /// Item name.
    pub item: String,
    /// Stock capacity.
    pub max: i64,
    /// Starting stock before variance.
    #[serde(default)]
    pub amount: i64,
    /// Signed units produced per day.
    #[serde(default)]
    pub daily_change: i64,
    /// Items this cargo consumes when produced.
    #[serde(default)]
    pub requires: Vec<String>,
}

/// A planet type template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanetTemplate {
    /// Planet type.
    pub kind: PlanetType,
    /// Relative frequency among planet templates.
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    /// Smallest diameter in kilometres.
    #[serde(default = "default_min_diameter_km")]
    pub min_diameter_km: u32,
    /// Largest diameter in kilometres.
    #[serde(default = "default_max_diameter_km")]
    pub max_diameter_km: u32,
    /// Port templates that may be built on this planet type.
    #[serde(default)]
    pub ports: Vec<String>,
}

/// A ship template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShipTemplate {
    /// Unique ship name.
    pub name: String,
    /// Hold capacity in weight units.
    pub capacity: i64,
    /// Starting credits.
    #[serde(default)]
    pub credits: i64,
}

/// A predefined civilization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CivilizationTemplate {
    /// Unique civilization name.
    pub name: String,
    /// Relative expansion strength.
    #[serde(default = "default_power")]
    pub power: u32,
    /// Fixed home system name, if any.
    #[serde(default)]
    pub home: Option<String>,
}

const fn default_weight() -> i64 {
    1
}

const fn default_chance() -> u32 {
    100
}

const fn default_frequency() -> u32 {
    1
}

const fn default_min_diameter_km() -> u32 {
    2_000
}

const fn default_max_diameter_km() -> u32 {
    20_000
}

const fn default_power() -> u32 {
    10
}

// ---------------------------------------------------------------------------
// Resolved templates
// ---------------------------------------------------------------------------

/// A cargo line whose item and requirements have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoBlueprint {
    /// The stocked item.
    pub item: Item,
    /// Stock capacity, at least zero.
    pub max: i64,
    /// Starting stock before variance.
    pub amount: i64,
    /// Signed units produced per day.
    pub daily_change: i64,
    /// Indexes into the template's cargo list.
    pub requires: Vec<usize>,
}

/// A station template whose cargo lines have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationBlueprint {
    /// Port or base.
    pub kind: StationKind,
    /// Template name.
    pub name: String,
    /// Percent spawn chance, at most 100.
    pub chance: u32,
    /// Checked cargo lines.
    pub cargo: Vec<CargoBlueprint>,
}

/// A planet template whose port references have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanetBlueprint {
    /// Planet type.
    pub kind: PlanetType,
    /// Relative frequency.
    pub frequency: u32,
    /// Smallest diameter in kilometres.
    pub min_diameter_km: u32,
    /// Largest diameter in kilometres, at least the minimum.
    pub max_diameter_km: u32,
    /// Names of port templates known to exist.
    pub ports: Vec<String>,
}

/// The catalog after every cross reference has been checked.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCatalog {
    /// Item registry.
    pub items: ItemRegistry,
    /// Port templates.
    pub ports: Vec<StationBlueprint>,
    /// Base templates.
    pub bases: Vec<StationBlueprint>,
    /// Planet templates.
    pub planets: Vec<PlanetBlueprint>,
    /// Ship templates.
    pub ships: Vec<ShipTemplate>,
    /// Civilizations.
    pub civilizations: Vec<CivilizationTemplate>,
}

impl ResolvedCatalog {
    /// Station templates of one kind.
    pub fn stations(&self, kind: StationKind) -> &[StationBlueprint] {
        match kind {
            StationKind::Port => &self.ports,
            StationKind::Base => &self.bases,
        }
    }

    /// Look up a station template by kind and name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownStationTemplate`] if no template of
    /// that kind has the name.
    pub fn station(
        &self,
        kind: StationKind,
        name: &str,
    ) -> Result<&StationBlueprint, CatalogError> {
        self.stations(kind)
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| CatalogError::UnknownStationTemplate {
                kind,
                name: name.to_owned(),
            })
    }

    /// Build an empty mobile hold from a ship template.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownShip`] if no ship has the name.
    pub fn hold(&self, ship: &str) -> Result<Hold, CatalogError> {
        self.ships
            .iter()
            .find(|s| s.name == ship)
            .map(|s| Hold::new(s.name.clone(), s.capacity, s.credits))
            .ok_or_else(|| CatalogError::UnknownShip(ship.to_owned()))
    }
}

impl Catalog {
    /// Check every cross reference and build the read-only catalog.
    pub fn resolve(&self) -> ResolvedCatalog {
        let items = self.resolve_items();
        let ports = resolve_stations(StationKind::Port, &self.ports, &items);
        let bases = resolve_stations(StationKind::Base, &self.bases, &items);
        let planets = self.resolve_planets(&ports);
        let ships = dedup_by_name("ship", &self.ships, |s| &s.name);
        let civilizations = dedup_by_name("civilization", &self.civilizations, |c| &c.name);
        debug!(
            items = items.len(),
            ports = ports.len(),
            bases = bases.len(),
            planets = planets.len(),
            ships = ships.len(),
            civilizations = civilizations.len(),
            "catalog resolved"
        );
        ResolvedCatalog {
            items,
            ports,
            bases,
            planets,
            ships,
            civilizations,
        }
    }

    fn resolve_items(&self) -> ItemRegistry {
        let mut registry = ItemRegistry::new();
        for template in &self.items {
            if template.weight < 0 || template.price < 0 {
                warn!(item = %template.name, "negative weight or price raised to zero");
            }
            let item = Item::new(template.name.clone(), template.weight, template.price);
            if let Err(e) = registry.insert(item) {
                warn!(item = %template.name, error = %e, "skipping item");
            }
        }
        registry
    }

    fn resolve_planets(&self, ports: &[StationBlueprint]) -> Vec<PlanetBlueprint> {
        self.planets
            .iter()
            .map(|template| {
                let known: Vec<String> = template
                    .ports
                    .iter()
                    .filter(|name| {
                        let exists = ports.iter().any(|p| &p.name == *name);
                        if !exists {
                            warn!(
                                planet = %template.kind,
                                port = %name,
                                "skipping unknown port template"
                            );
                        }
                        exists
                    })
                    .cloned()
                    .collect();
                PlanetBlueprint {
                    kind: template.kind,
                    frequency: template.frequency,
                    min_diameter_km: template.min_diameter_km.min(template.max_diameter_km),
                    max_diameter_km: template.max_diameter_km.max(template.min_diameter_km),
                    ports: known,
                }
            })
            .collect()
    }
}

fn resolve_stations(
    kind: StationKind,
    templates: &[StationTemplate],
    items: &ItemRegistry,
) -> Vec<StationBlueprint> {
    let mut resolved: Vec<StationBlueprint> = Vec::new();
    for template in templates {
        if resolved.iter().any(|t| t.name == template.name) {
            warn!(kind = %kind, template = %template.name, "skipping duplicate template");
            continue;
        }
        if template.chance > 100 {
            warn!(
                kind = %kind,
                template = %template.name,
                chance = template.chance,
                "chance capped at 100"
            );
        }
        resolved.push(StationBlueprint {
            kind,
            name: template.name.clone(),
            chance: template.chance.min(100),
            cargo: resolve_cargo(kind, template, items),
        });
    }
    resolved
}

fn resolve_cargo(
    kind: StationKind,
    template: &StationTemplate,
    items: &ItemRegistry,
) -> Vec<CargoBlueprint> {
    // First pass: keep lines with a known, not yet listed item.
    let mut kept: Vec<(&CargoTemplate, Item)> = Vec::new();
    for line in &template.cargo {
        let Some(item) = items.get(&line.item) else {
            warn!(
                kind = %kind,
                template = %template.name,
                item = %line.item,
                "skipping cargo with unknown item"
            );
            continue;
        };
        if kept.iter().any(|(_, i)| i.name == line.item) {
            warn!(
                kind = %kind,
                template = %template.name,
                item = %line.item,
                "skipping duplicate cargo line"
            );
            continue;
        }
        kept.push((line, item.clone()));
    }

    // Second pass: requirements become indexes into the kept lines.
    kept.iter()
        .enumerate()
        .map(|(slot, (line, item))| {
            let mut requires = Vec::new();
            for name in &line.requires {
                match kept.iter().position(|(_, i)| &i.name == name) {
                    Some(required) if required == slot => {
                        warn!(template = %template.name, item = %name, "skipping self-requirement");
                    }
                    Some(required) => {
                        if !requires.contains(&required) {
                            requires.push(required);
                        }
                    }
                    None => {
                        warn!(
                            template = %template.name,
                            item = %line.item,
                            requires = %name,
                            "skipping requirement not stocked by template"
                        );
                    }
                }
            }
            CargoBlueprint {
                item: item.clone(),
                max: line.max.max(0),
                amount: line.amount,
                daily_change: line.daily_change,
                requires,
            }
        })
        .collect()
}

fn dedup_by_name<T: Clone>(what: &str, templates: &[T], name: impl Fn(&T) -> &String) -> Vec<T> {
    let mut kept: Vec<T> = Vec::new();
    for template in templates {
        if kept.iter().any(|k| name(k) == name(template)) {
            warn!(kind = what, name = %name(template), "skipping duplicate");
            continue;
        }
        kept.push(template.clone());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let yaml = r"
items:
  - { name: Ore, weight: 4, price: 10 }
  - { name: Metal, weight: 2, price: 40 }
  - { name: Ore, weight: 9, price: 99 }
ports:
  - name: Refinery
    chance: 150
    cargo:
      - { item: Ore, max: 500, amount: 200, daily_change: -50 }
      - { item: Metal, max: 300, daily_change: 50, requires: [Ore, Metal, Silk] }
      - { item: Silk, max: 10 }
      - { item: Ore, max: 1 }
  - name: Refinery
planets:
  - kind: barren
    frequency: 3
    min_diameter_km: 9000
    max_diameter_km: 3000
    ports: [Refinery, Shipyard]
ships:
  - { name: Hauler, capacity: 400, credits: 1000 }
civilizations:
  - { name: Vega, power: 50 }
  - { name: Vega, power: 10 }
  - { name: Sol, power: 50, home: Terra }
";
        serde_yml::from_str(yaml).unwrap_or_default()
    }

    #[test]
    fn duplicates_are_dropped() {
        let resolved = catalog().resolve();
        assert_eq!(resolved.items.len(), 2);
        assert_eq!(resolved.items.get("Ore").map(|i| i.weight), Some(4));
        assert_eq!(resolved.ports.len(), 1);
        assert_eq!(resolved.civilizations.len(), 2);
    }

    #[test]
    fn cargo_lines_are_checked() {
        let resolved = catalog().resolve();
        let refinery = resolved.station(StationKind::Port, "Refinery");
        assert!(refinery.is_ok());
        let Ok(refinery) = refinery else { return };
        assert_eq!(refinery.chance, 100);
        let items: Vec<&str> = refinery.cargo.iter().map(|c| c.item.name.as_str()).collect();
        assert_eq!(items, vec!["Ore", "Metal"]);
        // Metal requires Ore only: the self edge and the unknown item are gone.
        assert_eq!(refinery.cargo.get(1).map(|c| c.requires.clone()), Some(vec![0]));
    }

    #[test]
    fn planet_ports_are_checked() {
        let resolved = catalog().resolve();
        let barren = resolved.planets.first();
        assert_eq!(barren.map(|p| p.ports.clone()), Some(vec!["Refinery".to_owned()]));
        assert_eq!(barren.map(|p| (p.min_diameter_km, p.max_diameter_km)), Some((3000, 9000)));
    }

    #[test]
    fn template_lookups() {
        let resolved = catalog().resolve();
        assert!(matches!(
            resolved.station(StationKind::Base, "Refinery"),
            Err(CatalogError::UnknownStationTemplate { .. })
        ));
        let hold = resolved.hold("Hauler");
        assert_eq!(hold.as_ref().ok().map(Hold::capacity), Some(400));
        assert_eq!(hold.ok().map(|h| h.credits()), Some(1000));
        assert!(matches!(resolved.hold("Dinghy"), Err(CatalogError::UnknownShip(_))));
    }

    #[test]
    fn empty_catalog_resolves() {
        let resolved = Catalog::default().resolve();
        assert!(resolved.items.is_empty());
        assert!(resolved.stations(StationKind::Port).is_empty());
    }
}
