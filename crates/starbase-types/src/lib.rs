//! Shared type definitions for the Starbase galaxy simulation.
//!
//! This crate is the single source of truth for identifiers, enumerations,
//! and the read-only views exchanged with the command layer. Types defined
//! here flow downstream to `TypeScript` via `ts-rs` for client displays.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe `u32` wrappers for all entity identifiers
//! - [`enums`] -- Stellar classification, planet types, station kinds
//! - [`structs`] -- Coordinates and display/trade projections

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{LuminosityClass, PlanetType, SpectralClass, StationKind};
pub use ids::{CivilizationId, PlanetId, StationId, SystemId};
pub use structs::{
    CargoView, Position, SystemSummary, TICKS_PER_LIGHT_YEAR, TradeReceipt, light_years,
};
