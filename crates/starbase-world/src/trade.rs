//! Moving cargo between a station and a ship's hold.
//!
//! Both directions run entirely under the station's inventory write lock,
//! so a trade and a tick on the same station never interleave. Requested
//! quantities are clamped rather than rejected:
//!
//! - buy: `min(requested, stock, free hold weight / unit weight,
//!   credits / unit price)`
//! - sell: `min(requested, held, station capacity - station stock)`
//!
//! A clamped quantity of zero is a valid, empty trade.

use starbase_types::TradeReceipt;
use tracing::debug;

use crate::error::WorldError;
use crate::hold::Hold;
use crate::station::Station;

/// Move up to `requested` units of `item` from `station` onto `hold`.
///
/// # Errors
///
/// Returns [`WorldError::InvalidQuantity`] for a negative request,
/// [`WorldError::ItemNotTraded`] if the station does not stock the item,
/// or [`WorldError::LockPoisoned`].
pub fn buy(
    station: &Station,
    hold: &mut Hold,
    item: &str,
    requested: i64,
) -> Result<TradeReceipt, WorldError> {
    if requested < 0 {
        return Err(WorldError::InvalidQuantity(requested));
    }
    let mut inventory = station.write()?;
    let slot = inventory
        .slot_of(item)
        .ok_or_else(|| not_traded(station, item))?;
    let len = inventory.len();
    let cargo = inventory
        .get_mut(slot)
        .ok_or(WorldError::UnknownCargo { index: slot, len })?;

    let by_weight = hold.free_weight().checked_div(cargo.weight).unwrap_or(i64::MAX);
    let by_credits = hold.credits().checked_div(cargo.price).unwrap_or(i64::MAX);
    let quantity = requested
        .min(cargo.amount())
        .min(by_weight)
        .min(by_credits)
        .max(0);
    let total = quantity
        .checked_mul(cargo.price)
        .ok_or(WorldError::ArithmeticOverflow)?;

    if quantity > 0 {
        hold.load(item, cargo.weight, quantity, total)?;
        cargo.adjust(quantity.saturating_neg());
    }
    debug!(station = %station.id, item, requested, quantity, total, "buy");
    Ok(receipt(station, item, quantity, cargo.price, total))
}

/// Move up to `requested` units of `item` from `hold` onto `station`,
/// crediting the hold at the station's price.
///
/// # Errors
///
/// Returns [`WorldError::InvalidQuantity`] for a negative request,
/// [`WorldError::ItemNotTraded`] if the station does not stock the item,
/// or [`WorldError::LockPoisoned`].
pub fn sell(
    station: &Station,
    hold: &mut Hold,
    item: &str,
    requested: i64,
) -> Result<TradeReceipt, WorldError> {
    if requested < 0 {
        return Err(WorldError::InvalidQuantity(requested));
    }
    let mut inventory = station.write()?;
    let slot = inventory
        .slot_of(item)
        .ok_or_else(|| not_traded(station, item))?;
    let len = inventory.len();
    let cargo = inventory
        .get_mut(slot)
        .ok_or(WorldError::UnknownCargo { index: slot, len })?;

    let quantity = requested
        .min(hold.quantity(item))
        .min(cargo.free_capacity())
        .max(0);
    let total = quantity
        .checked_mul(cargo.price)
        .ok_or(WorldError::ArithmeticOverflow)?;

    if quantity > 0 {
        hold.unload(item, quantity, total)?;
        cargo.adjust(quantity);
    }
    debug!(station = %station.id, item, requested, quantity, total, "sell");
    Ok(receipt(station, item, quantity, cargo.price, total))
}

fn not_traded(station: &Station, item: &str) -> WorldError {
    WorldError::ItemNotTraded {
        station: station.id,
        item: item.to_owned(),
    }
}

fn receipt(
    station: &Station,
    item: &str,
    quantity: i64,
    unit_price: i64,
    total: i64,
) -> TradeReceipt {
    TradeReceipt {
        station: station.id,
        kind: station.kind,
        item: item.to_owned(),
        quantity,
        unit_price,
        total,
    }
}
