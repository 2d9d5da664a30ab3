//! Stars and their derived physical properties.
//!
//! A star is drawn from weighted spectral and luminosity class tables. Its
//! temperature, luminosity, habitable zone, and snow line are then derived
//! from the classes plus bounded randomness:
//!
//! - luminosity = main-sequence value for the spectral class, scaled by the
//!   luminosity-class factor, with +/-20% variance
//! - habitable zone inner edge = `sqrt(L / 1.1)` AU
//! - habitable zone outer edge = `sqrt(L / 0.53)` AU
//! - snow line = `2.7 * sqrt(L)` AU

use rand::Rng;
use serde::{Deserialize, Serialize};
use starbase_types::{LuminosityClass, SpectralClass};

/// Relative frequency of each spectral class, hottest first.
const SPECTRAL_WEIGHTS: [(SpectralClass, u32); 7] = [
    (SpectralClass::O, 1),
    (SpectralClass::B, 2),
    (SpectralClass::A, 4),
    (SpectralClass::F, 8),
    (SpectralClass::G, 15),
    (SpectralClass::K, 25),
    (SpectralClass::M, 45),
];

/// Relative frequency of each luminosity class.
const LUMINOSITY_WEIGHTS: [(LuminosityClass, u32); 7] = [
    (LuminosityClass::Ia, 1),
    (LuminosityClass::Ib, 1),
    (LuminosityClass::II, 2),
    (LuminosityClass::III, 8),
    (LuminosityClass::IV, 8),
    (LuminosityClass::V, 70),
    (LuminosityClass::D, 10),
];

/// Maximum relative deviation applied to derived luminosity.
const LUMINOSITY_VARIANCE: f64 = 0.2;

/// A star within a system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Harvard spectral class.
    pub spectral: SpectralClass,
    /// Yerkes luminosity class.
    pub class: LuminosityClass,
    /// Luminosity in solar units.
    pub luminosity: f64,
    /// Effective surface temperature in kelvin.
    pub temperature: u32,
    /// Inner edge of the habitable zone in AU.
    pub habitable_inner: f64,
    /// Outer edge of the habitable zone in AU.
    pub habitable_outer: f64,
    /// Distance beyond which volatiles freeze, in AU.
    pub snow_line: f64,
}

impl Star {
    /// Draw a random star from the class frequency tables.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let spectral = pick_weighted(rng, &SPECTRAL_WEIGHTS).unwrap_or(SpectralClass::M);
        let class = pick_weighted(rng, &LUMINOSITY_WEIGHTS).unwrap_or(LuminosityClass::V);
        Self::derive(spectral, class, rng)
    }

    /// Derive every physical property from the two classes.
    pub fn derive<R: Rng + ?Sized>(
        spectral: SpectralClass,
        class: LuminosityClass,
        rng: &mut R,
    ) -> Self {
        let (low, high) = temperature_range(spectral);
        let temperature = rng.random_range(low..=high);
        let variance = rng.random_range(-LUMINOSITY_VARIANCE..=LUMINOSITY_VARIANCE);
        let luminosity =
            main_sequence_luminosity(spectral) * class_factor(class) * (1.0 + variance);
        let root = luminosity.sqrt();
        Self {
            spectral,
            class,
            luminosity,
            temperature,
            habitable_inner: (luminosity / 1.1).sqrt(),
            habitable_outer: (luminosity / 0.53).sqrt(),
            snow_line: 2.7 * root,
        }
    }

    /// Whether an orbit at `distance_au` lies inside the habitable zone.
    pub fn in_habitable_zone(&self, distance_au: f64) -> bool {
        distance_au >= self.habitable_inner && distance_au <= self.habitable_outer
    }

    /// Contribution of this star to its system's habitability score.
    ///
    /// Long-lived, stable main-sequence G and K stars score highest.
    pub fn habitability(&self) -> f64 {
        let spectral = match self.spectral {
            SpectralClass::O => 0.0,
            SpectralClass::B => 0.5,
            SpectralClass::A => 2.0,
            SpectralClass::F => 6.0,
            SpectralClass::G => 10.0,
            SpectralClass::K => 7.0,
            SpectralClass::M => 3.0,
        };
        let stability = match self.class {
            LuminosityClass::V => 1.0,
            LuminosityClass::IV => 0.6,
            LuminosityClass::III => 0.3,
            LuminosityClass::D => 0.1,
            LuminosityClass::Ia | LuminosityClass::Ib | LuminosityClass::II => 0.05,
        };
        spectral * stability
    }
}

/// Temperature range in kelvin for a spectral class.
const fn temperature_range(spectral: SpectralClass) -> (u32, u32) {
    match spectral {
        SpectralClass::O => (30_000, 50_000),
        SpectralClass::B => (10_000, 30_000),
        SpectralClass::A => (7_500, 10_000),
        SpectralClass::F => (6_000, 7_500),
        SpectralClass::G => (5_200, 6_000),
        SpectralClass::K => (3_700, 5_200),
        SpectralClass::M => (2_400, 3_700),
    }
}

/// Typical main-sequence luminosity in solar units.
const fn main_sequence_luminosity(spectral: SpectralClass) -> f64 {
    match spectral {
        SpectralClass::O => 50_000.0,
        SpectralClass::B => 800.0,
        SpectralClass::A => 15.0,
        SpectralClass::F => 2.5,
        SpectralClass::G => 1.0,
        SpectralClass::K => 0.3,
        SpectralClass::M => 0.02,
    }
}

/// Luminosity multiplier of a luminosity class relative to the main sequence.
const fn class_factor(class: LuminosityClass) -> f64 {
    match class {
        LuminosityClass::Ia => 10_000.0,
        LuminosityClass::Ib => 3_000.0,
        LuminosityClass::II => 500.0,
        LuminosityClass::III => 60.0,
        LuminosityClass::IV => 3.0,
        LuminosityClass::V => 1.0,
        LuminosityClass::D => 0.001,
    }
}

/// Pick one entry from a weighted table. Returns `None` only for an empty
/// or all-zero table.
pub fn pick_weighted<T: Copy, R: Rng + ?Sized>(rng: &mut R, table: &[(T, u32)]) -> Option<T> {
    let total: u32 = table.iter().map(|(_, w)| *w).fold(0, u32::saturating_add);
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for (value, weight) in table {
        if roll < *weight {
            return Some(*value);
        }
        roll = roll.saturating_sub(*weight);
    }
    None
}
