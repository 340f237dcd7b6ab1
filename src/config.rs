//! Construction options and the one-time backend decision.

use crate::adaptive_map::AdaptiveMap;
use crate::comparer::{Comparer, Equality, Intrinsic};
use core::any::TypeId;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// Entry count at which the small map is promoted to a probe table. The
/// small map holds at most `PROMOTION_THRESHOLD - 1` entries.
pub const PROMOTION_THRESHOLD: usize = 3;

/// Largest capacity hint honored when presizing storage. Bigger hints
/// still pick the backend they ask for, but allocate only this much up
/// front and grow on demand after that.
pub const MAX_CAPACITY_HINT: usize = 1 << 16;

/// Storage strategy a map settled on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BackendKind {
    /// Dense entries indexed by hashbrown, keyed by intrinsic equality.
    Native,
    /// Linear scan over a short array.
    Small,
    /// Open-addressing table with prime lengths.
    Hash,
}

/// Key types that take the native path when no comparer is given.
pub(crate) fn is_native_key<K: 'static>() -> bool {
    let id = TypeId::of::<K>();
    id == TypeId::of::<String>() || id == TypeId::of::<&'static str>() || id == TypeId::of::<i32>()
}

/// Pick the backend for a new map. `native` is true only for a
/// native-eligible key type with no comparer. Decided once; only
/// `Small -> Hash` happens later, on promotion.
pub(crate) fn select_backend(capacity: usize, native: bool) -> BackendKind {
    if native {
        BackendKind::Native
    } else if capacity >= PROMOTION_THRESHOLD {
        BackendKind::Hash
    } else {
        BackendKind::Small
    }
}

/// Builder for `AdaptiveMap`.
///
/// ```
/// use adaptive_map::{AdaptiveMap, BackendKind, MapBuilder};
///
/// let m: AdaptiveMap<u64, &str> = MapBuilder::new().capacity(100).build();
/// assert_eq!(m.backend(), BackendKind::Hash);
/// ```
pub struct MapBuilder<K, S = RandomState> {
    capacity: usize,
    comparer: Option<Comparer<K>>,
    hasher: S,
}

impl<K> MapBuilder<K> {
    pub fn new() -> Self {
        Self {
            capacity: 0,
            comparer: None,
            hasher: RandomState::new(),
        }
    }
}

impl<K> Default for MapBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> MapBuilder<K, S> {
    /// Initial capacity hint. At or above `PROMOTION_THRESHOLD`, a
    /// non-native map starts out as a probe table.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Custom key equality. Disables the native fast path. Key types
    /// without `Eq`/`Hash` go through `AdaptiveMap::with_comparer` instead,
    /// since `build` requires both.
    pub fn comparer(mut self, comparer: Comparer<K>) -> Self {
        self.comparer = Some(comparer);
        self
    }

    /// Hasher used for intrinsic key hashing.
    pub fn hasher<S2>(self, hasher: S2) -> MapBuilder<K, S2> {
        MapBuilder {
            capacity: self.capacity,
            comparer: self.comparer,
            hasher,
        }
    }

    pub fn build<V>(self) -> AdaptiveMap<K, V, S>
    where
        K: Eq + Hash + 'static,
        S: BuildHasher,
    {
        let native = self.comparer.is_none() && is_native_key::<K>();
        let kind = select_backend(self.capacity, native);
        log::trace!(
            "adaptive map: {:?} backend for {}, capacity hint {}",
            kind,
            core::any::type_name::<K>(),
            self.capacity
        );
        let equality = match self.comparer {
            Some(c) => Equality::Custom(c),
            None => Equality::Intrinsic(Intrinsic::new()),
        };
        AdaptiveMap::from_parts(kind, self.capacity, equality, self.hasher)
    }
}

impl<K, S: fmt::Debug> fmt::Debug for MapBuilder<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapBuilder")
            .field("capacity", &self.capacity)
            .field("comparer", &self.comparer.is_some())
            .field("hasher", &self.hasher)
            .finish()
    }
}
