//! Type-safe identifier wrappers around `u32`.
//!
//! Every entity in the galaxy has a strongly-typed ID to prevent accidental
//! mixing of identifiers at compile time. Raw values are drawn at random by
//! the generator and checked for uniqueness against an ordered index, so an
//! identifier says nothing about creation order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Wrap a raw identifier value.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Return the inner `u32` value.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a star system (node in the spatial store).
    SystemId
}

define_id! {
    /// Unique identifier for a planet orbiting a system's primary star.
    PlanetId
}

define_id! {
    /// Unique identifier for a trading station (port or base).
    StationId
}

define_id! {
    /// Unique identifier for a civilization.
    CivilizationId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_roundtrip_serde() {
        let original = SystemId::new(90_210);
        let json = serde_json::to_string(&original).ok();
        assert_eq!(json.as_deref(), Some("90210"));
        let restored: Result<SystemId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_raw() {
        let id = StationId::from(7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(u32::from(id), 7);
    }

    #[test]
    fn ids_order_by_raw_value() {
        assert!(CivilizationId::new(3) < CivilizationId::new(11));
    }
}
