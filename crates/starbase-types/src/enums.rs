//! Enumeration types for the Starbase galaxy simulation.
//!
//! Stellar classification follows the Morgan-Keenan scheme: a spectral
//! class (temperature) plus a luminosity class (size). Planet types and
//! station kinds are the keys the catalog's type templates refer to.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Stars
// ---------------------------------------------------------------------------

/// Harvard spectral class of a star, hottest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum SpectralClass {
    /// Blue, above 30,000 K.
    O,
    /// Blue-white, 10,000 to 30,000 K.
    B,
    /// White, 7,500 to 10,000 K.
    A,
    /// Yellow-white, 6,000 to 7,500 K.
    F,
    /// Yellow, 5,200 to 6,000 K.
    G,
    /// Orange, 3,700 to 5,200 K.
    K,
    /// Red, 2,400 to 3,700 K.
    M,
}

impl SpectralClass {
    /// Every spectral class, hottest first.
    pub const ALL: [Self; 7] = [Self::O, Self::B, Self::A, Self::F, Self::G, Self::K, Self::M];
}

impl core::fmt::Display for SpectralClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let letter = match self {
            Self::O => "O",
            Self::B => "B",
            Self::A => "A",
            Self::F => "F",
            Self::G => "G",
            Self::K => "K",
            Self::M => "M",
        };
        f.write_str(letter)
    }
}

/// Yerkes luminosity class of a star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum LuminosityClass {
    /// Luminous supergiant.
    Ia,
    /// Less luminous supergiant.
    Ib,
    /// Bright giant.
    II,
    /// Normal giant.
    III,
    /// Subgiant.
    IV,
    /// Main-sequence dwarf.
    V,
    /// White dwarf remnant.
    D,
}

impl LuminosityClass {
    /// Every luminosity class, brightest first.
    pub const ALL: [Self; 7] = [
        Self::Ia,
        Self::Ib,
        Self::II,
        Self::III,
        Self::IV,
        Self::V,
        Self::D,
    ];
}

impl core::fmt::Display for LuminosityClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let numeral = match self {
            Self::Ia => "Ia",
            Self::Ib => "Ib",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
            Self::V => "V",
            Self::D => "D",
        };
        f.write_str(numeral)
    }
}

// ---------------------------------------------------------------------------
// Planets
// ---------------------------------------------------------------------------

/// Broad planet type, used as the key of planet templates in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PlanetType {
    /// Rocky world with a solid surface and thin-to-moderate atmosphere.
    Terrestrial,
    /// Rocky world covered by a global ocean.
    Ocean,
    /// Airless cratered rock.
    Barren,
    /// Tidally heated or star-scorched molten surface.
    Lava,
    /// Frozen world beyond the snow line.
    Ice,
    /// Hydrogen-helium giant.
    GasGiant,
}

impl PlanetType {
    /// Whether this planet type can host native life when it orbits inside
    /// the primary star's habitable zone.
    pub const fn supports_life(self) -> bool {
        matches!(self, Self::Terrestrial | Self::Ocean)
    }
}

impl core::fmt::Display for PlanetType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Terrestrial => "terrestrial",
            Self::Ocean => "ocean",
            Self::Barren => "barren",
            Self::Lava => "lava",
            Self::Ice => "ice",
            Self::GasGiant => "gas giant",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Stations
// ---------------------------------------------------------------------------

/// The two categories of trading station. Each category has its own
/// collection in the universe and its own background tick worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StationKind {
    /// A trading port anchored on a planet.
    Port,
    /// A base anchored directly on a system.
    Base,
}

impl StationKind {
    /// Both station kinds, in worker start order.
    pub const ALL: [Self; 2] = [Self::Port, Self::Base];
}

impl core::fmt::Display for StationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Port => f.write_str("port"),
            Self::Base => f.write_str("base"),
        }
    }
}
