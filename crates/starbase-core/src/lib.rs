//! Configuration, generation, and the running economy of the Starbase
//! galaxy simulation.
//!
//! Startup loads a [`SimulationConfig`], resolves its catalog, and runs
//! [`generate`] once to build the [`Universe`]. The universe then moves
//! into an `Arc` shared by the [`Scheduler`]'s tick workers and any
//! external callers.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `starbase-config.yaml` with
//!   environment overrides.
//! - [`catalog`] -- Item, station, planet, ship, and civilization templates.
//! - [`generation`] -- Constellation layout, bodies, stations, and
//!   civilization spawn and growth.
//! - [`economy`] -- Per-tick cargo production with rounding carry.
//! - [`scheduler`] -- One background ticker thread per station category.
//!
//! [`Universe`]: starbase_world::Universe
//! [`SimulationConfig`]: config::SimulationConfig
//! [`generate`]: generation::generate
//! [`Scheduler`]: scheduler::Scheduler

pub mod catalog;
pub mod config;
pub mod economy;
pub mod generation;
pub mod scheduler;

pub use catalog::{Catalog, CatalogError, ResolvedCatalog};
pub use config::{ConfigError, SimulationConfig};
pub use economy::{EconomyError, PassSummary, StationTick, cargo_change, run_pass, tick_station};
pub use generation::{GenerationError, generate};
pub use scheduler::{Scheduler, SchedulerError, WorkerReport};
