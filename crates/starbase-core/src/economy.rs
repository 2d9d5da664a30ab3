//! Economic tick engine: daily production spread over the ticks of a day.
//!
//! Each cargo record changes by `daily_change` units per simulated day. A
//! day has `ticks_per_day` ticks, so every tick applies the integer share
//! `daily_change / ticks_per_day` plus, on some ticks, one carry unit in the
//! sign of `daily_change`. The carry ticks are spaced evenly across the day
//! so that the changes of any full day add up to `daily_change` exactly.
//!
//! The computed change then goes through [`Inventory::apply_change`], which
//! clamps it to the cargo's `[0, max]` and to what its requirements can
//! supply or absorb. One station's whole tick runs under that station's
//! inventory write lock; a pass over a category holds the collection read
//! lock.
//!
//! [`Inventory::apply_change`]: starbase_world::Inventory::apply_change

use starbase_types::StationKind;
use starbase_world::{Station, Universe, WorldError};
use tracing::{debug, trace};

/// Errors raised by a tick pass.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// A day must have at least one tick.
    #[error("ticks per day must be positive")]
    InvalidTicksPerDay,

    /// A galaxy-state operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Outcome of one tick of one station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationTick {
    /// Cargo records whose amount changed.
    pub cargo_changed: usize,
    /// Sum of the changes applied to those records.
    pub net_units: i64,
}

/// Outcome of one pass over a station category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Stations ticked.
    pub stations: usize,
    /// Cargo records whose amount changed.
    pub cargo_changed: usize,
    /// Sum of the changes applied.
    pub net_units: i64,
}

/// The change a cargo with `daily_change` receives at `iteration`, before
/// any clamping. `iteration` is taken modulo `ticks_per_day`.
///
/// The remainder `daily_change % ticks_per_day` is distributed one unit at
/// a time: iteration `i` carries when `floor((i + 1) * r / T)` exceeds
/// `floor(i * r / T)`, which happens exactly `|r|` times per day.
pub fn cargo_change(daily_change: i64, iteration: u32, ticks_per_day: u32) -> i64 {
    let ticks = i64::from(ticks_per_day);
    let (Some(base), Some(remainder)) =
        (daily_change.checked_div(ticks), daily_change.checked_rem(ticks))
    else {
        return 0;
    };
    if remainder == 0 {
        return base;
    }

    let ticks = u128::from(ticks_per_day);
    let step = u128::from(iteration.checked_rem(ticks_per_day).unwrap_or(0));
    let spread = u128::from(remainder.unsigned_abs());
    let before = step.saturating_mul(spread).checked_div(ticks).unwrap_or(0);
    let after = step
        .saturating_add(1)
        .saturating_mul(spread)
        .checked_div(ticks)
        .unwrap_or(0);
    if after > before {
        base.saturating_add(daily_change.signum())
    } else {
        base
    }
}

/// Tick every producing cargo of one station under its write lock.
///
/// # Errors
///
/// Returns [`EconomyError::InvalidTicksPerDay`] for a zero-tick day, or
/// [`EconomyError::World`] for a poisoned lock or a dangling requirement.
pub fn tick_station(
    station: &Station,
    iteration: u32,
    ticks_per_day: u32,
) -> Result<StationTick, EconomyError> {
    if ticks_per_day == 0 {
        return Err(EconomyError::InvalidTicksPerDay);
    }
    let mut inventory = station.write()?;
    let mut outcome = StationTick::default();
    for slot in 0..inventory.len() {
        let Some(cargo) = inventory.get(slot) else {
            continue;
        };
        if cargo.daily_change == 0 {
            continue;
        }
        let change = cargo_change(cargo.daily_change, iteration, ticks_per_day);
        if change == 0 {
            continue;
        }
        let applied = inventory.apply_change(slot, change)?;
        if applied != 0 {
            outcome.cargo_changed = outcome.cargo_changed.saturating_add(1);
            outcome.net_units = outcome.net_units.saturating_add(applied);
        }
        if applied != change {
            trace!(station = %station.name, slot, change, applied, "tick clamped");
        }
    }
    Ok(outcome)
}

/// Tick every station of one category, holding the collection read lock
/// for the whole pass.
///
/// # Errors
///
/// Returns the first [`EconomyError`] of any station; stations after it
/// are not ticked in this pass.
pub fn run_pass(
    universe: &Universe,
    kind: StationKind,
    iteration: u32,
    ticks_per_day: u32,
) -> Result<PassSummary, EconomyError> {
    if ticks_per_day == 0 {
        return Err(EconomyError::InvalidTicksPerDay);
    }
    let stations = universe.stations(kind)?;
    let mut summary = PassSummary::default();
    for station in stations.iter() {
        let tick = tick_station(station, iteration, ticks_per_day)?;
        summary.stations = summary.stations.saturating_add(1);
        summary.cargo_changed = summary.cargo_changed.saturating_add(tick.cargo_changed);
        summary.net_units = summary.net_units.saturating_add(tick.net_units);
    }
    debug!(
        kind = %kind,
        iteration,
        stations = summary.stations,
        cargo_changed = summary.cargo_changed,
        net_units = summary.net_units,
        "tick pass complete"
    );
    Ok(summary)
}
