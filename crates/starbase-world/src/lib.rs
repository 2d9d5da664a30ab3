//! Galaxy state for the Starbase simulation.
//!
//! Everything the generator builds and the tick engine mutates lives here.
//! The crate is synchronous and thread-safe: spatial data is immutable once
//! generation hands the [`Universe`] over to an `Arc`, and cargo
//! inventories are the only steady-state mutable state, each behind its
//! station's `RwLock`.
//!
//! # Modules
//!
//! - [`ordered_index`] -- Sorted unique/multi index with predecessor lookup
//! - [`sector_store`] -- All systems, x-indexed for radius queries
//! - [`system`], [`star`], [`planet`] -- Stellar bodies and derived physics
//! - [`civilization`] -- Civilizations and their owned systems
//! - [`item`], [`cargo`] -- Goods and clamped, requirement-linked cargo
//! - [`station`] -- Ports and bases with lock-guarded inventories
//! - [`hold`], [`trade`] -- Ship holds and station trades
//! - [`universe`] -- The context object tying it all together
//! - [`error`] -- [`WorldError`]

pub mod cargo;
pub mod civilization;
pub mod error;
pub mod hold;
pub mod item;
pub mod ordered_index;
pub mod planet;
pub mod sector_store;
pub mod star;
pub mod station;
pub mod system;
pub mod trade;
pub mod universe;

pub use cargo::{Cargo, Inventory};
pub use civilization::{Civilization, Civilizations};
pub use error::WorldError;
pub use hold::Hold;
pub use item::{Item, ItemRegistry};
pub use ordered_index::{IndexMode, MAX_ALLOCATION_ATTEMPTS, OrderedIndex, allocate_key};
pub use planet::{MAX_LIFE_LEVEL, Planet, orbital_numeral};
pub use sector_store::SectorStore;
pub use star::{Star, pick_weighted};
pub use station::{Anchor, Station, Stations};
pub use system::System;
pub use universe::{Universe, UniverseStats};
