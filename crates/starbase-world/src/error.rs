//! Error types for the `starbase-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use starbase_types::{CivilizationId, PlanetId, StationId, StationKind, SystemId};

/// Errors that can occur during galaxy-state operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A system was not found in the sector store.
    #[error("system not found: {0}")]
    SystemNotFound(SystemId),

    /// A planet was not found in its system.
    #[error("planet {planet} not found in system {system}")]
    PlanetNotFound {
        /// The system searched.
        system: SystemId,
        /// The missing planet.
        planet: PlanetId,
    },

    /// A station was not found in its collection.
    #[error("{kind} not found: {id}")]
    StationNotFound {
        /// Which collection was searched.
        kind: StationKind,
        /// The missing station.
        id: StationId,
    },

    /// A civilization was not found.
    #[error("civilization not found: {0}")]
    CivilizationNotFound(CivilizationId),

    /// A unique ordered index already holds the key.
    #[error("duplicate key in unique index: {0}")]
    DuplicateKey(String),

    /// Another system already occupies this x-coordinate.
    #[error("x-coordinate {x} already taken by system {existing}")]
    DuplicateCoordinate {
        /// The contested coordinate.
        x: i64,
        /// The system holding it.
        existing: SystemId,
    },

    /// A display name is already in use within its collection.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// The system already belongs to a civilization. Ownership never changes
    /// once assigned.
    #[error("system {system} is already owned by civilization {owner}")]
    AlreadyOwned {
        /// The contested system.
        system: SystemId,
        /// Its current owner.
        owner: CivilizationId,
    },

    /// The station does not list the requested item.
    #[error("station {station} does not trade {item}")]
    ItemNotTraded {
        /// The station.
        station: StationId,
        /// The requested item.
        item: String,
    },

    /// The item is not in the registry.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// A requirement edge is malformed (self-reference or out of range).
    #[error("invalid requirement edge {dependent} -> {requirement}")]
    InvalidRequirement {
        /// Index of the dependent cargo.
        dependent: usize,
        /// Index of the required cargo.
        requirement: usize,
    },

    /// A cargo slot index is outside the inventory.
    #[error("cargo slot {index} out of range (inventory holds {len})")]
    UnknownCargo {
        /// The requested slot.
        index: usize,
        /// Number of cargo records in the inventory.
        len: usize,
    },

    /// A trade quantity was negative.
    #[error("invalid trade quantity: {0}")]
    InvalidQuantity(i64),

    /// Random identifier allocation kept colliding with existing keys.
    #[error("identifier space exhausted after {attempts} attempts")]
    IdSpaceExhausted {
        /// Number of draws attempted.
        attempts: u32,
    },

    /// A lock was poisoned by a panicking thread.
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
