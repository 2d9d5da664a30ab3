//! Core value structs shared between the simulation and its clients.
//!
//! [`Position`] is the fixed-point coordinate used by the spatial store.
//! The `*View` and receipt types are read-only projections handed to the
//! command layer for display and trade menus.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::StationKind;
use crate::ids::{CivilizationId, StationId, SystemId};

/// Number of coordinate ticks in one light-year.
pub const TICKS_PER_LIGHT_YEAR: i64 = 10_000;

/// Convert a distance in light-years into coordinate ticks, truncating
/// toward zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn light_years(ly: f64) -> i64 {
    (ly * TICKS_PER_LIGHT_YEAR as f64) as i64
}

/// A point in the galactic plane, in ticks (1/10000 light-year).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}

impl Position {
    /// The galactic origin.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a position from Cartesian coordinates.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The point reached by stepping `radius` ticks from `self` in the
    /// direction `angle` (radians). Fractions of a tick are truncated.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn step(self, radius: i64, angle: f64) -> Self {
        let r = radius as f64;
        Self {
            x: self.x.saturating_add((r * angle.cos()) as i64),
            y: self.y.saturating_add((r * angle.sin()) as i64),
        }
    }

    /// Squared Euclidean distance to `other`, widened so it cannot overflow.
    pub fn distance_squared(self, other: Self) -> i128 {
        let dx = i128::from(self.x).saturating_sub(i128::from(other.x));
        let dy = i128::from(self.y).saturating_sub(i128::from(other.y));
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance to `other` in ticks, rounded toward zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn distance(self, other: Self) -> i64 {
        let squared = self.distance_squared(other);
        let mut root = (squared as f64).sqrt() as i128;
        // Correct the float estimate so that root = floor(sqrt(squared)).
        while root > 0 && root.saturating_mul(root) > squared {
            root = root.saturating_sub(1);
        }
        while root.saturating_add(1).saturating_mul(root.saturating_add(1)) <= squared {
            root = root.saturating_add(1);
        }
        i64::try_from(root).unwrap_or(i64::MAX)
    }

    /// Whether `other` lies within `radius` ticks (inclusive) of `self`.
    pub fn is_within(self, other: Self, radius: i64) -> bool {
        let r = i128::from(radius.max(0));
        self.distance_squared(other) <= r.saturating_mul(r)
    }

    /// Polar radius from the galactic origin, rounded toward zero.
    pub fn radius(self) -> i64 {
        self.distance(Self::ORIGIN)
    }

    /// Polar angle from the galactic origin in radians, in `(-pi, pi]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn angle(self) -> f64 {
        (self.y as f64).atan2(self.x as f64)
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Read-only projection of one cargo record, as shown in a trade menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CargoView {
    /// Item name.
    pub item: String,
    /// Units currently in stock.
    pub amount: i64,
    /// Storage capacity for this item.
    pub max: i64,
    /// Signed production (positive) or consumption (negative) per day.
    pub daily_change: i64,
    /// Unit price in credits.
    pub price: i64,
}

/// Read-only projection of a system for navigation displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SystemSummary {
    /// System identifier.
    pub id: SystemId,
    /// Unique display name.
    pub name: String,
    /// Location in the galactic plane.
    pub position: Position,
    /// Owning civilization, if any.
    pub owner: Option<CivilizationId>,
    /// Aggregate suitability-for-life score (informational).
    pub habitability: f64,
    /// Systems reachable by a direct link.
    pub links: Vec<SystemId>,
    /// Number of stars in the system.
    pub star_count: u32,
    /// Number of planets in the system.
    pub planet_count: u32,
}

/// Outcome of moving cargo between a station and a mobile hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradeReceipt {
    /// The station traded with.
    pub station: StationId,
    /// Category of that station.
    pub kind: StationKind,
    /// Item name.
    pub item: String,
    /// Units actually moved (may be less than requested, possibly zero).
    pub quantity: i64,
    /// Unit price applied.
    pub unit_price: i64,
    /// Credits exchanged (`quantity * unit_price`).
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_rounds_toward_zero() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.distance(b), 5);
        let c = Position::new(1, 1);
        // sqrt(2) = 1.414...
        assert_eq!(a.distance(c), 1);
    }

    #[test]
    fn within_is_inclusive_and_exact() {
        let a = Position::new(0, 0);
        assert!(a.is_within(Position::new(3, 4), 5));
        assert!(!a.is_within(Position::new(3, 5), 5));
        assert!(a.is_within(a, 0));
    }

    #[test]
    fn large_coordinates_do_not_overflow() {
        let a = Position::new(i64::MIN / 2, 0);
        let b = Position::new(i64::MAX / 2, 0);
        assert!(a.distance(b) > 0);
    }

    #[test]
    fn step_follows_polar_direction() {
        let p = Position::ORIGIN.step(10_000, 0.0);
        assert_eq!(p, Position::new(10_000, 0));
        let q = Position::ORIGIN.step(10_000, core::f64::consts::FRAC_PI_2);
        assert_eq!(q.y, 10_000);
        assert!(q.x.abs() <= 1);
    }

    #[test]
    fn light_year_conversion() {
        assert_eq!(light_years(1.5), 15_000);
        assert_eq!(Position::new(0, light_years(2.0)).radius(), 20_000);
    }
}
