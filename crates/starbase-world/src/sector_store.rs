//! Spatial sector store: every system, indexed for neighbor queries.
//!
//! Systems live in a dense arena. Three indexes point into it:
//!
//! - `by_id` -- [`OrderedIndex`] from [`SystemId`] to arena slot
//! - `by_x` -- unique [`OrderedIndex`] from x-coordinate to arena slot
//! - `by_name` -- display name to arena slot
//!
//! The x-axis index is what makes radius queries cheap: a query seeks to
//! `origin.x - radius`, walks forward while `x <= origin.x + radius`, and
//! applies a bounding-box test on y before the exact distance check. Cost
//! is `O(log n + k)` for `k` systems inside the x-band.
//!
//! Because the x index is unique, no two systems may share an x-coordinate.
//! Placement fails with [`WorldError::DuplicateCoordinate`]; choosing a new
//! coordinate is the caller's job.

use std::collections::BTreeMap;
use std::ops::Bound;

use starbase_types::{CivilizationId, Position, SystemId};
use tracing::debug;

use crate::error::WorldError;
use crate::ordered_index::OrderedIndex;
use crate::system::System;

/// The collection of all systems in the galaxy.
#[derive(Debug, Clone)]
pub struct SectorStore {
    systems: Vec<System>,
    by_id: OrderedIndex<SystemId, usize>,
    by_x: OrderedIndex<i64, usize>,
    by_name: BTreeMap<String, usize>,
}

impl SectorStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            systems: Vec::new(),
            by_id: OrderedIndex::unique(),
            by_x: OrderedIndex::unique(),
            by_name: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Insertion and placement
    // -------------------------------------------------------------------

    /// Add a system at the position it carries.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateCoordinate`] if another system holds
    /// the same x-coordinate, [`WorldError::DuplicateKey`] for a reused
    /// identifier, or [`WorldError::DuplicateName`] for a reused name. The
    /// store is unchanged on error.
    pub fn insert(&mut self, system: System) -> Result<SystemId, WorldError> {
        let id = system.id;
        let x = system.position().x;
        if self.by_id.contains_key(&id) {
            return Err(WorldError::DuplicateKey(id.to_string()));
        }
        if let Some(existing) = self.system_at_x(x) {
            return Err(WorldError::DuplicateCoordinate { x, existing });
        }
        if self.by_name.contains_key(&system.name) {
            return Err(WorldError::DuplicateName(system.name));
        }

        let slot = self.systems.len();
        self.by_id.insert(id, slot)?;
        self.by_x.insert(x, slot)?;
        self.by_name.insert(system.name.clone(), slot);
        self.systems.push(system);
        Ok(id)
    }

    /// Move an existing system to `position`, re-keying the x index.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SystemNotFound`] for an unknown system or
    /// [`WorldError::DuplicateCoordinate`] if a different system already
    /// holds `position.x`.
    pub fn place(&mut self, id: SystemId, position: Position) -> Result<(), WorldError> {
        let slot = self.slot(id)?;
        if let Some(existing) = self.system_at_x(position.x)
            && existing != id
        {
            return Err(WorldError::DuplicateCoordinate {
                x: position.x,
                existing,
            });
        }
        let old_x = self
            .systems
            .get(slot)
            .map(|s| s.position().x)
            .ok_or(WorldError::SystemNotFound(id))?;
        if old_x != position.x {
            self.by_x.remove(&old_x);
            self.by_x.insert(position.x, slot)?;
        }
        if let Some(system) = self.systems.get_mut(slot) {
            system.set_position(position);
        }
        Ok(())
    }

    /// The system holding x-coordinate `x`, if any.
    pub fn system_at_x(&self, x: i64) -> Option<SystemId> {
        self.by_x
            .get(&x)
            .and_then(|slot| self.systems.get(*slot))
            .map(|s| s.id)
    }

    /// Whether no system holds x-coordinate `x`.
    pub fn is_x_free(&self, x: i64) -> bool {
        !self.by_x.contains_key(&x)
    }

    // -------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------

    /// Look up a system by identifier.
    pub fn get(&self, id: SystemId) -> Option<&System> {
        self.by_id.get(&id).and_then(|slot| self.systems.get(*slot))
    }

    /// Look up a system mutably. Position, links, and ownership stay
    /// private to the store.
    pub fn get_mut(&mut self, id: SystemId) -> Option<&mut System> {
        let slot = *self.by_id.get(&id)?;
        self.systems.get_mut(slot)
    }

    /// Look up a system by its unique display name.
    pub fn by_name(&self, name: &str) -> Option<&System> {
        self.by_name.get(name).and_then(|slot| self.systems.get(*slot))
    }

    /// Whether the identifier is taken.
    pub fn contains(&self, id: SystemId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// The identifier index, for collision checks during allocation.
    pub const fn id_index(&self) -> &OrderedIndex<SystemId, usize> {
        &self.by_id
    }

    /// Number of systems.
    pub const fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether the store holds no systems.
    pub const fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Iterate over systems in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &System> {
        self.systems.iter()
    }

    /// Iterate over systems mutably, in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut System> {
        self.systems.iter_mut()
    }

    /// The system in insertion slot `slot`. Slots are dense, so a uniform
    /// draw from `0..len()` picks a uniformly random system.
    pub fn by_slot(&self, slot: usize) -> Option<&System> {
        self.systems.get(slot)
    }

    /// Iterate over systems in ascending x order.
    pub fn iter_by_x(&self) -> impl Iterator<Item = &System> {
        self.by_x.iter().filter_map(|(_, slot)| self.systems.get(*slot))
    }

    /// Number of systems owned by any civilization.
    pub fn owned_count(&self) -> usize {
        self.systems.iter().filter(|s| s.owner().is_some()).count()
    }

    // -------------------------------------------------------------------
    // Spatial queries
    // -------------------------------------------------------------------

    /// Every system whose distance from `point` is at most `radius` ticks,
    /// in ascending x order. An empty store or negative radius yields an
    /// empty result.
    pub fn systems_within(&self, point: Position, radius: i64) -> Vec<&System> {
        if radius < 0 || self.systems.is_empty() {
            return Vec::new();
        }
        let low_x = point.x.saturating_sub(radius);
        let high_x = point.x.saturating_add(radius);
        let low_y = point.y.saturating_sub(radius);
        let high_y = point.y.saturating_add(radius);

        let mut found = Vec::new();
        for (_, slot) in self.by_x.range(low_x..=high_x) {
            let Some(system) = self.systems.get(*slot) else {
                continue;
            };
            let pos = system.position();
            // Cheap bounding-box rejection before the exact check.
            if pos.y < low_y || pos.y > high_y {
                continue;
            }
            if point.is_within(pos, radius) {
                found.push(system);
            }
        }
        found
    }

    /// Systems within `radius` ticks of `origin`, excluding `origin` itself.
    /// An unknown origin yields an empty result.
    pub fn neighbors(&self, origin: SystemId, radius: i64) -> Vec<&System> {
        let Some(center) = self.get(origin) else {
            debug!(system = %origin, "neighbor query for unknown system");
            return Vec::new();
        };
        let mut found = self.systems_within(center.position(), radius);
        found.retain(|s| s.id != origin);
        found
    }

    /// Whether any system lies within `radius` ticks of `point`.
    pub fn any_within(&self, point: Position, radius: i64) -> bool {
        !self.systems_within(point, radius).is_empty()
    }

    /// The system closest to `point`.
    ///
    /// Walks outward from `point.x` in both directions along the x index,
    /// stopping each side once the x gap alone exceeds the best distance.
    pub fn nearest(&self, point: Position) -> Option<&System> {
        let mut best: Option<(&System, i128)> = None;
        for (_, slot) in self.by_x.range(..=point.x).rev() {
            let Some(system) = self.systems.get(*slot) else {
                continue;
            };
            if !improve_nearest(&mut best, point, system) {
                break;
            }
        }
        for (_, slot) in self.by_x.range((Bound::Excluded(point.x), Bound::Unbounded)) {
            let Some(system) = self.systems.get(*slot) else {
                continue;
            };
            if !improve_nearest(&mut best, point, system) {
                break;
            }
        }
        best.map(|(system, _)| system)
    }

    /// Euclidean distance between two systems in ticks, rounded toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SystemNotFound`] if either system is unknown.
    pub fn distance(&self, a: SystemId, b: SystemId) -> Result<i64, WorldError> {
        let pa = self.get(a).ok_or(WorldError::SystemNotFound(a))?.position();
        let pb = self.get(b).ok_or(WorldError::SystemNotFound(b))?.position();
        Ok(pa.distance(pb))
    }

    // -------------------------------------------------------------------
    // Relations
    // -------------------------------------------------------------------

    /// Add a symmetric link between `a` and `b`. Returns `false` if the link
    /// already existed or `a == b` (no self-links).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SystemNotFound`] if either system is unknown.
    pub fn link(&mut self, a: SystemId, b: SystemId) -> Result<bool, WorldError> {
        let slot_a = self.slot(a)?;
        let slot_b = self.slot(b)?;
        if a == b {
            return Ok(false);
        }
        let added_a = self
            .systems
            .get_mut(slot_a)
            .is_some_and(|s| s.add_link(b));
        let added_b = self
            .systems
            .get_mut(slot_b)
            .is_some_and(|s| s.add_link(a));
        Ok(added_a || added_b)
    }

    /// Assign `system` to `owner`. Ownership is monotonic: an owned system
    /// can never be reassigned or released.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SystemNotFound`] for an unknown system or
    /// [`WorldError::AlreadyOwned`] if the system already has an owner.
    pub fn claim(&mut self, system: SystemId, owner: CivilizationId) -> Result<(), WorldError> {
        let slot = self.slot(system)?;
        let target = self
            .systems
            .get_mut(slot)
            .ok_or(WorldError::SystemNotFound(system))?;
        if let Some(existing) = target.owner() {
            return Err(WorldError::AlreadyOwned {
                system,
                owner: existing,
            });
        }
        target.set_owner(owner);
        Ok(())
    }

    fn slot(&self, id: SystemId) -> Result<usize, WorldError> {
        self.by_id
            .get(&id)
            .copied()
            .ok_or(WorldError::SystemNotFound(id))
    }
}

/// Offer `system` as a nearest-point candidate. Returns `false` once the
/// x gap alone rules out every system further along the scan.
fn improve_nearest<'a>(
    best: &mut Option<(&'a System, i128)>,
    point: Position,
    system: &'a System,
) -> bool {
    let gap = i128::from(system.position().x).saturating_sub(i128::from(point.x));
    if let Some((_, current)) = *best
        && gap.saturating_mul(gap) > current
    {
        return false;
    }
    let d = point.distance_squared(system.position());
    if best.is_none_or(|(_, current)| d < current) {
        *best = Some((system, d));
    }
    true
}

impl Default for SectorStore {
    fn default() -> Self {
        Self::new()
    }
}
