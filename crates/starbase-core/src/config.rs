//! Configuration loading and typed config structures for the Starbase
//! simulation.
//!
//! The canonical configuration lives in `starbase-config.yaml` at the
//! project root. Every field has a default, so an empty document is a
//! valid configuration. [`SimulationConfig::validate`] rejects values the
//! generator or the tick engine cannot work with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use starbase_types::{StationKind, light_years};
use tracing::warn;

use crate::catalog::Catalog;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "STARBASE_CONFIG";

/// Environment variable overriding `galaxy.seed`.
pub const SEED_ENV: &str = "STARBASE_SEED";

/// Configuration file used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "starbase-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is outside the range the simulation supports.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `starbase-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Galaxy layout parameters.
    #[serde(default)]
    pub galaxy: GalaxyConfig,

    /// Civilization spawn and growth parameters.
    #[serde(default)]
    pub civilizations: CivilizationConfig,

    /// Tick timing and trade variance.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Type templates: items, stations, planets, ships, civilizations.
    #[serde(default)]
    pub catalog: Catalog,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `STARBASE_SEED`, when set to an integer, overrides `galaxy.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// The configuration file to load: `STARBASE_CONFIG` or the default.
    pub fn path_from_env() -> PathBuf {
        std::env::var(CONFIG_ENV).map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Override values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        let seed = std::env::var(SEED_ENV).ok();
        self.galaxy.override_seed(seed.as_deref());
    }

    /// Check every value the generator and tick engine depend on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let galaxy = &self.galaxy;
        if galaxy.max_attempts == 0 {
            return Err(invalid("galaxy.max_attempts", "must be at least 1"));
        }
        if galaxy.link_distance_min_ly > galaxy.link_distance_max_ly {
            return Err(invalid(
                "galaxy.link_distance_min_ly",
                format!(
                    "{} exceeds link_distance_max_ly {}",
                    galaxy.link_distance_min_ly, galaxy.link_distance_max_ly
                ),
            ));
        }
        if galaxy.link_distance_min_ly < 0.0 {
            return Err(invalid("galaxy.link_distance_min_ly", "must not be negative"));
        }
        if !(0.0..=1.0).contains(&galaxy.frontier_retire_chance) {
            return Err(invalid(
                "galaxy.frontier_retire_chance",
                "must be between 0 and 1",
            ));
        }

        let civs = &self.civilizations;
        if civs.habitation_percent > 100 {
            return Err(invalid(
                "civilizations.habitation_percent",
                format!("{} exceeds 100", civs.habitation_percent),
            ));
        }
        if civs.growth_radius_step_ly <= 0.0 {
            return Err(invalid(
                "civilizations.growth_radius_step_ly",
                "must be positive",
            ));
        }

        let economy = &self.economy;
        for (field, category) in [
            ("economy.ports.ticks_per_day", &economy.ports),
            ("economy.bases.ticks_per_day", &economy.bases),
        ] {
            if category.ticks_per_day == 0 {
                return Err(invalid(field, "must be at least 1"));
            }
            if economy.day_length_ms < u64::from(category.ticks_per_day) {
                return Err(invalid(
                    "economy.day_length_ms",
                    format!(
                        "{} ms is shorter than {} ticks of 1 ms",
                        economy.day_length_ms, category.ticks_per_day
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Galaxy
// ---------------------------------------------------------------------------

/// Galaxy layout configuration. Distances are in light-years.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GalaxyConfig {
    /// Random seed; the whole generation is reproducible from it.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of constellations to lay out.
    #[serde(default = "default_constellations")]
    pub constellations: u32,

    /// Upper bound on systems per constellation (at least one is placed).
    #[serde(default = "default_max_systems_per_constellation")]
    pub max_systems_per_constellation: u32,

    /// Minimum clearance between a new constellation's anchor and any
    /// existing system.
    #[serde(default = "default_constellation_spacing_ly")]
    pub constellation_spacing_ly: f64,

    /// Largest radial increment of one polar step when searching for a new
    /// constellation anchor.
    #[serde(default = "default_constellation_step_ly")]
    pub constellation_step_ly: f64,

    /// Shortest offset between a new system and the frontier system it
    /// attaches to.
    #[serde(default = "default_link_distance_min_ly")]
    pub link_distance_min_ly: f64,

    /// Longest offset between a new system and its frontier system.
    #[serde(default = "default_link_distance_max_ly")]
    pub link_distance_max_ly: f64,

    /// Minimum clearance between any two systems inside a constellation.
    #[serde(default = "default_min_system_spacing_ly")]
    pub min_system_spacing_ly: f64,

    /// Probability that a frontier system retires after a new system
    /// attaches to it.
    #[serde(default = "default_frontier_retire_chance")]
    pub frontier_retire_chance: f64,

    /// Bound on every rejection-sampling loop.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl GalaxyConfig {
    /// Replace the seed with `raw` when it parses as an integer. Returns
    /// whether the seed changed.
    pub fn override_seed(&mut self, raw: Option<&str>) -> bool {
        let Some(raw) = raw else {
            return false;
        };
        match raw.trim().parse::<u64>() {
            Ok(seed) => {
                self.seed = seed;
                true
            }
            Err(e) => {
                warn!(value = raw, error = %e, "ignoring unparsable {SEED_ENV}");
                false
            }
        }
    }

    /// [`Self::constellation_spacing_ly`] in ticks.
    pub fn constellation_spacing(&self) -> i64 {
        light_years(self.constellation_spacing_ly)
    }

    /// [`Self::constellation_step_ly`] in ticks.
    pub fn constellation_step(&self) -> i64 {
        light_years(self.constellation_step_ly)
    }

    /// [`Self::link_distance_min_ly`] in ticks.
    pub fn link_distance_min(&self) -> i64 {
        light_years(self.link_distance_min_ly)
    }

    /// [`Self::link_distance_max_ly`] in ticks.
    pub fn link_distance_max(&self) -> i64 {
        light_years(self.link_distance_max_ly)
    }

    /// [`Self::min_system_spacing_ly`] in ticks.
    pub fn min_system_spacing(&self) -> i64 {
        light_years(self.min_system_spacing_ly)
    }
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            constellations: default_constellations(),
            max_systems_per_constellation: default_max_systems_per_constellation(),
            constellation_spacing_ly: default_constellation_spacing_ly(),
            constellation_step_ly: default_constellation_step_ly(),
            link_distance_min_ly: default_link_distance_min_ly(),
            link_distance_max_ly: default_link_distance_max_ly(),
            min_system_spacing_ly: default_min_system_spacing_ly(),
            frontier_retire_chance: default_frontier_retire_chance(),
            max_attempts: default_max_attempts(),
        }
    }
}

// ---------------------------------------------------------------------------
// Civilizations
// ---------------------------------------------------------------------------

/// Civilization spawn and growth configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CivilizationConfig {
    /// Percentage of all systems that civilizations grow to own.
    #[serde(default = "default_habitation_percent")]
    pub habitation_percent: u32,

    /// A home system must have no owned system within this distance.
    #[serde(default = "default_min_home_distance_ly")]
    pub min_home_distance_ly: f64,

    /// Increment of the expanding growth search radius.
    #[serde(default = "default_growth_radius_step_ly")]
    pub growth_radius_step_ly: f64,

    /// Largest growth search radius tried from one parent system.
    #[serde(default = "default_max_growth_radius_ly")]
    pub max_growth_radius_ly: f64,
}

impl CivilizationConfig {
    /// [`Self::min_home_distance_ly`] in ticks.
    pub fn min_home_distance(&self) -> i64 {
        light_years(self.min_home_distance_ly)
    }

    /// [`Self::growth_radius_step_ly`] in ticks, at least one.
    pub fn growth_radius_step(&self) -> i64 {
        light_years(self.growth_radius_step_ly).max(1)
    }

    /// [`Self::max_growth_radius_ly`] in ticks.
    pub fn max_growth_radius(&self) -> i64 {
        light_years(self.max_growth_radius_ly)
    }
}

impl Default for CivilizationConfig {
    fn default() -> Self {
        Self {
            habitation_percent: default_habitation_percent(),
            min_home_distance_ly: default_min_home_distance_ly(),
            growth_radius_step_ly: default_growth_radius_step_ly(),
            max_growth_radius_ly: default_max_growth_radius_ly(),
        }
    }
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

/// Tick timing and trade variance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Real-time length of one simulated day in milliseconds.
    #[serde(default = "default_day_length_ms")]
    pub day_length_ms: u64,

    /// Port tick settings.
    #[serde(default = "default_port_ticks")]
    pub ports: TickCategoryConfig,

    /// Base tick settings.
    #[serde(default = "default_base_ticks")]
    pub bases: TickCategoryConfig,

    /// Maximum deviation of a station's unit price from the item's base
    /// price, in percent.
    #[serde(default = "default_price_variance_percent")]
    pub price_variance_percent: u32,

    /// Maximum deviation of a cargo's starting amount from its template,
    /// in percent.
    #[serde(default = "default_stock_variance_percent")]
    pub stock_variance_percent: u32,
}

impl EconomyConfig {
    /// Settings for one station category.
    pub const fn category(&self, kind: StationKind) -> &TickCategoryConfig {
        match kind {
            StationKind::Port => &self.ports,
            StationKind::Base => &self.bases,
        }
    }

    /// Ticks per simulated day for one station category.
    pub const fn ticks_per_day(&self, kind: StationKind) -> u32 {
        self.category(kind).ticks_per_day
    }

    /// Real-time interval between two ticks of one category: the day length
    /// divided by the category's ticks per day.
    pub fn interval(&self, kind: StationKind) -> Duration {
        let ticks = u64::from(self.ticks_per_day(kind));
        Duration::from_millis(self.day_length_ms.checked_div(ticks).unwrap_or(self.day_length_ms))
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            day_length_ms: default_day_length_ms(),
            ports: default_port_ticks(),
            bases: default_base_ticks(),
            price_variance_percent: default_price_variance_percent(),
            stock_variance_percent: default_stock_variance_percent(),
        }
    }
}

/// Tick settings for one station category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TickCategoryConfig {
    /// Number of ticks per simulated day.
    #[serde(default = "default_ticks_per_day")]
    pub ticks_per_day: u32,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when
    /// set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_constellations() -> u32 {
    8
}

const fn default_max_systems_per_constellation() -> u32 {
    16
}

const fn default_constellation_spacing_ly() -> f64 {
    25.0
}

const fn default_constellation_step_ly() -> f64 {
    10.0
}

const fn default_link_distance_min_ly() -> f64 {
    1.0
}

const fn default_link_distance_max_ly() -> f64 {
    6.0
}

const fn default_min_system_spacing_ly() -> f64 {
    0.5
}

const fn default_frontier_retire_chance() -> f64 {
    0.35
}

const fn default_max_attempts() -> u32 {
    10_000
}

const fn default_habitation_percent() -> u32 {
    40
}

const fn default_min_home_distance_ly() -> f64 {
    20.0
}

const fn default_growth_radius_step_ly() -> f64 {
    2.0
}

const fn default_max_growth_radius_ly() -> f64 {
    200.0
}

const fn default_day_length_ms() -> u64 {
    3_600_000
}

const fn default_ticks_per_day() -> u32 {
    144
}

const fn default_port_ticks() -> TickCategoryConfig {
    TickCategoryConfig { ticks_per_day: 144 }
}

const fn default_base_ticks() -> TickCategoryConfig {
    TickCategoryConfig { ticks_per_day: 24 }
}

const fn default_price_variance_percent() -> u32 {
    20
}

const fn default_stock_variance_percent() -> u32 {
    25
}

fn default_log_level() -> String {
    "info".to_owned()
}
