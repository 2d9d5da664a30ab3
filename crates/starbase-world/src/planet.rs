//! Planets orbiting a system's primary star.

use serde::{Deserialize, Serialize};
use starbase_types::{PlanetId, PlanetType, StationId};

/// Highest life level a planet can carry.
pub const MAX_LIFE_LEVEL: u8 = 10;

/// A planet and the ports built on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Planet identifier.
    pub id: PlanetId,
    /// Unique display name (system name plus orbital numeral).
    pub name: String,
    /// Broad planet type.
    pub kind: PlanetType,
    /// Equatorial diameter in kilometres.
    pub diameter_km: u32,
    /// Orbital distance from the primary star in AU.
    pub orbit_au: f64,
    /// Native life level, 0 (sterile) to [`MAX_LIFE_LEVEL`].
    pub life_level: u8,
    /// Ports anchored on this planet.
    pub ports: Vec<StationId>,
}

impl Planet {
    /// Create a sterile planet with no ports.
    pub const fn new(
        id: PlanetId,
        name: String,
        kind: PlanetType,
        diameter_km: u32,
        orbit_au: f64,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            diameter_km,
            orbit_au,
            life_level: 0,
            ports: Vec::new(),
        }
    }

    /// Whether anything lives here.
    pub const fn is_inhabited(&self) -> bool {
        self.life_level > 0
    }
}

/// Roman numeral for an orbital position (1-based), as used in planet names.
pub fn orbital_numeral(position: usize) -> String {
    const NUMERALS: [(usize, &str); 9] = [
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut remaining = position;
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while remaining >= value {
            out.push_str(numeral);
            remaining = remaining.saturating_sub(value);
        }
    }
    out
}
