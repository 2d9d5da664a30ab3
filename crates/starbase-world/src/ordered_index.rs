//! Sorted key/value index with unique or multi-value keys.
//!
//! [`OrderedIndex`] backs identifier lookup for systems, stations, and
//! civilizations, and the x-axis of the spatial store. It supports
//! insert, point lookup, predecessor lookup, removal, and in-order range
//! iteration, all in `O(log n)` (plus the size of the yielded range).
//!
//! In [`IndexMode::Unique`] a second insert of an existing key fails; in
//! [`IndexMode::Multi`] values for an equal key are kept in insertion order.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::ops::{Bound, RangeBounds};

use rand::Rng;

use crate::error::WorldError;

/// Number of random draws [`allocate_key`] makes before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 64;

/// How an [`OrderedIndex`] treats equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// At most one value per key; duplicate inserts are rejected.
    Unique,
    /// Any number of values per key, kept in insertion order.
    Multi,
}

/// A balanced-tree index from ordered keys to values.
#[derive(Debug, Clone)]
pub struct OrderedIndex<K, V> {
    mode: IndexMode,
    entries: BTreeMap<K, Vec<V>>,
    len: usize,
}

impl<K: Ord + Debug, V> OrderedIndex<K, V> {
    /// Create an empty index that rejects duplicate keys.
    pub const fn unique() -> Self {
        Self {
            mode: IndexMode::Unique,
            entries: BTreeMap::new(),
            len: 0,
        }
    }

    /// Create an empty index that keeps every value inserted under a key.
    pub const fn multi() -> Self {
        Self {
            mode: IndexMode::Multi,
            entries: BTreeMap::new(),
            len: 0,
        }
    }

    /// The duplicate-key policy of this index.
    pub const fn mode(&self) -> IndexMode {
        self.mode
    }

    /// Insert `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateKey`] in unique mode if `key` is
    /// already present. The index is unchanged in that case.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), WorldError> {
        if self.mode == IndexMode::Unique && self.entries.contains_key(&key) {
            return Err(WorldError::DuplicateKey(format!("{key:?}")));
        }
        self.entries.entry(key).or_default().push(value);
        self.len = self.len.saturating_add(1);
        Ok(())
    }

    /// The first value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).and_then(|values| values.first())
    }

    /// Every value stored under `key`, in insertion order.
    pub fn get_all(&self, key: &K) -> &[V] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether `key` has at least one value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// The entry with the greatest key strictly less than `key`.
    ///
    /// Returns `None` (the sentinel) when no smaller key exists.
    pub fn predecessor(&self, key: &K) -> Option<(&K, &V)> {
        self.entries
            .range((Bound::Unbounded, Bound::Excluded(key)))
            .next_back()
            .and_then(|(k, values)| values.first().map(|v| (k, v)))
    }

    /// The entry with the smallest key greater than or equal to `key`.
    pub fn ceiling(&self, key: &K) -> Option<(&K, &V)> {
        self.entries
            .range((Bound::Included(key), Bound::Unbounded))
            .next()
            .and_then(|(k, values)| values.first().map(|v| (k, v)))
    }

    /// Remove and return the first value stored under `key`. The key itself
    /// disappears once its last value is removed.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let values = self.entries.get_mut(key)?;
        let removed = if values.is_empty() {
            None
        } else {
            Some(values.remove(0))
        };
        if values.is_empty() {
            self.entries.remove(key);
        }
        if removed.is_some() {
            self.len = self.len.saturating_sub(1);
        }
        removed
    }

    /// Iterate in ascending key order over entries whose key falls in
    /// `range`. Multi-valued keys yield one item per value.
    pub fn range<R>(&self, range: R) -> impl DoubleEndedIterator<Item = (&K, &V)>
    where
        R: RangeBounds<K>,
    {
        self.entries
            .range(range)
            .flat_map(|(k, values)| values.iter().map(move |v| (k, v)))
    }

    /// Iterate over all entries in ascending key order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k, v)))
    }

    /// Number of stored values (not distinct keys).
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no values.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Draw random keys until one is found that `index` does not contain.
///
/// # Errors
///
/// Returns [`WorldError::IdSpaceExhausted`] after
/// [`MAX_ALLOCATION_ATTEMPTS`] consecutive collisions.
pub fn allocate_key<K, V, R>(index: &OrderedIndex<K, V>, rng: &mut R) -> Result<K, WorldError>
where
    K: Ord + Debug + From<u32>,
    R: Rng + ?Sized,
{
    for _ in 0..MAX_ALLOCATION_ATTEMPTS {
        let candidate = K::from(rng.random::<u32>());
        if !index.contains_key(&candidate) {
            return Ok(candidate);
        }
    }
    Err(WorldError::IdSpaceExhausted {
        attempts: MAX_ALLOCATION_ATTEMPTS,
    })
}
