//! AdaptiveMap: one public contract over native, small-map, and
//! probe-table storage.

use crate::backend::{Backend, Mode, Upsert};
use crate::comparer::{Comparer, Equality};
use crate::config::{select_backend, BackendKind, MapBuilder, MAX_CAPACITY_HINT, PROMOTION_THRESHOLD};
use crate::entry::Entry;
use crate::epoch::Epoch;
use crate::error::{check_copy_target, MapError};
use crate::iter::{Cursor, IntoIter, Iter, IterMut, Keys, Values};
use crate::native_map::NativeMap;
use crate::probe_table::ProbeTable;
use crate::small_map::SmallMap;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use std::collections::hash_map::RandomState;

#[derive(Debug, Clone)]
pub(crate) enum Storage<K, V> {
    Native(NativeMap<K, V>),
    Small(SmallMap<K, V>),
    Hash(ProbeTable<K, V>),
}

impl<K, V> Storage<K, V> {
    fn kind(&self) -> BackendKind {
        match self {
            Storage::Native(_) => BackendKind::Native,
            Storage::Small(_) => BackendKind::Small,
            Storage::Hash(_) => BackendKind::Hash,
        }
    }

    pub(crate) fn backend<S>(&self) -> &dyn Backend<K, V, S> {
        match self {
            Storage::Native(m) => m,
            Storage::Small(m) => m,
            Storage::Hash(m) => m,
        }
    }

    fn backend_mut<S>(&mut self) -> &mut dyn Backend<K, V, S> {
        match self {
            Storage::Native(m) => m,
            Storage::Small(m) => m,
            Storage::Hash(m) => m,
        }
    }
}

/// Single-threaded associative container that picks its storage once, at
/// construction:
///
/// - `String`, `&'static str`, and `i32` keys without a custom comparer
///   use the native backend.
/// - Everything else starts as a linear small map and is promoted to an
///   open-addressing probe table when it reaches `PROMOTION_THRESHOLD`
///   entries (or starts as a probe table when the capacity hint is that
///   large).
///
/// All three behave identically through this type. A map built with a
/// comparer never touches the key type's own `Eq` or `Hash`, so keys
/// without them (floats, plain structs) work through `with_comparer`.
///
/// ```
/// use adaptive_map::AdaptiveMap;
///
/// let mut m: AdaptiveMap<String, i32> = AdaptiveMap::new();
/// m.add("a".to_string(), 1).unwrap();
/// m.insert("b".to_string(), 2);
/// assert_eq!(m.len(), 2);
/// assert_eq!(m[&"a".to_string()], 1);
/// assert!(m.remove(&"a".to_string()));
/// assert!(!m.contains_key(&"a".to_string()));
/// ```
#[derive(Clone)]
pub struct AdaptiveMap<K, V, S = RandomState> {
    storage: Storage<K, V>,
    equality: Equality<K, S>,
    hasher: S,
    len: usize,
    epoch: Epoch,
}

impl<K, V> AdaptiveMap<K, V>
where
    K: Eq + Hash + 'static,
{
    pub fn new() -> Self {
        MapBuilder::new().build()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        MapBuilder::new().capacity(capacity).build()
    }
}

impl<K, V> AdaptiveMap<K, V> {
    /// Map whose keys are compared and hashed only through `comparer`.
    ///
    /// ```
    /// use adaptive_map::{AdaptiveMap, FnEquality};
    /// use std::rc::Rc;
    ///
    /// // f64 is neither Eq nor Hash.
    /// let bits = FnEquality::new(|a: &f64, b: &f64| a.to_bits() == b.to_bits(), |k: &f64| k.to_bits() as u32);
    /// let mut m: AdaptiveMap<f64, &str> = AdaptiveMap::with_comparer(Rc::new(bits));
    /// m.insert(0.5, "half");
    /// assert_eq!(m.get(&0.5), Some(&"half"));
    /// ```
    pub fn with_comparer(comparer: Comparer<K>) -> Self {
        Self::with_capacity_and_comparer(0, comparer)
    }

    pub fn with_capacity_and_comparer(capacity: usize, comparer: Comparer<K>) -> Self {
        Self::with_capacity_comparer_and_hasher(capacity, comparer, RandomState::new())
    }
}

impl<K, V, S> AdaptiveMap<K, V, S>
where
    K: Eq + Hash + 'static,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        MapBuilder::new().hasher(hasher).build()
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        MapBuilder::new().capacity(capacity).hasher(hasher).build()
    }
}

impl<K, V, S> AdaptiveMap<K, V, S> {
    /// Comparer-driven map carrying an explicit hasher. The hasher is kept
    /// for `hasher()` but never consulted.
    pub fn with_capacity_comparer_and_hasher(capacity: usize, comparer: Comparer<K>, hasher: S) -> Self {
        let kind = select_backend(capacity, false);
        log::trace!(
            "adaptive map: {:?} backend for {} with custom comparer, capacity hint {}",
            kind,
            core::any::type_name::<K>(),
            capacity
        );
        Self::from_parts(kind, capacity, Equality::Custom(comparer), hasher)
    }

    pub(crate) fn from_parts(kind: BackendKind, capacity: usize, equality: Equality<K, S>, hasher: S) -> Self {
        // The hint only presizes; larger maps grow on demand.
        let capacity = capacity.min(MAX_CAPACITY_HINT);
        let storage = match kind {
            BackendKind::Native => Storage::Native(NativeMap::with_capacity(capacity)),
            BackendKind::Small => Storage::Small(SmallMap::with_capacity(capacity)),
            BackendKind::Hash => Storage::Hash(ProbeTable::sized_for(capacity)),
        };
        Self {
            storage,
            equality,
            hasher,
            len: 0,
            epoch: Epoch::new(),
        }
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Storage strategy currently in use.
    pub fn backend(&self) -> BackendKind {
        self.storage.kind()
    }

    /// Entries the current storage holds before it reallocates. For the
    /// probe table this is the prime table length.
    pub fn capacity(&self) -> usize {
        self.storage.backend::<S>().capacity()
    }

    pub fn comparer(&self) -> Option<&Comparer<K>> {
        self.equality.comparer()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub(crate) fn version(&self) -> u64 {
        self.epoch.version()
    }

    pub(crate) fn id(&self) -> u64 {
        self.epoch.id()
    }

    pub(crate) fn storage(&self) -> &Storage<K, V> {
        &self.storage
    }

    fn find_entry(&self, key: &K) -> Option<&Entry<K, V>> {
        let _g = self.epoch.enter();
        let ops = self.equality.ops(&self.hasher);
        let b = self.storage.backend::<S>();
        b.find(&ops, key).and_then(|pos| b.entry_at(pos))
    }

    /// Value for `key`, or `None` when absent.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_entry(key).map(|e| &e.value)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find_entry(key).map(Entry::pair)
    }

    /// Value for `key`; `KeyNotFound` when absent.
    pub fn try_get(&self, key: &K) -> Result<&V, MapError> {
        self.get(key).ok_or(MapError::KeyNotFound)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.epoch.enter();
        let ops = self.equality.ops(&self.hasher);
        let b = self.storage.backend_mut::<S>();
        let pos = b.find(&ops, key)?;
        b.entry_at_mut(pos).map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_entry(key).is_some()
    }

    /// Add a new entry. Fails with `DuplicateKey`, leaving the map
    /// untouched, when `key` is already present.
    pub fn add(&mut self, key: K, value: V) -> Result<(), MapError> {
        self.upsert(key, value, Mode::Unique).map(|_| ())
    }

    /// Insert or overwrite. Returns the previous value when `key` was
    /// already present, in which case the length is unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.upsert(key, value, Mode::Overwrite) {
            Ok(Upsert::Replaced(old)) => Some(old),
            _ => None,
        }
    }

    fn upsert(&mut self, key: K, value: V, mode: Mode) -> Result<Upsert<V>, MapError> {
        let outcome = {
            let _g = self.epoch.enter();
            let ops = self.equality.ops(&self.hasher);
            if let Storage::Small(small) = &mut self.storage {
                let count = small.len() + 1;
                if count >= PROMOTION_THRESHOLD && Backend::<K, V, S>::find(&*small, &ops, &key).is_none() {
                    // Size for the pending key so the insert below cannot grow.
                    let table = ProbeTable::from_unique(count, small.drain());
                    log::debug!(
                        "adaptive map: promoting small map to probe table of {} slots",
                        table.slots().len()
                    );
                    self.storage = Storage::Hash(table);
                }
            }
            self.storage.backend_mut::<S>().upsert(&ops, key, value, mode)
        };
        if let Ok(Upsert::Inserted) = outcome {
            self.len += 1;
            self.epoch.bump();
        }
        outcome
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.remove_entry(key).is_some()
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let removed = {
            let _g = self.epoch.enter();
            let ops = self.equality.ops(&self.hasher);
            self.storage.backend_mut::<S>().remove(&ops, key)
        };
        if removed.is_some() {
            self.len -= 1;
            self.epoch.bump();
        }
        removed.map(Entry::into_pair)
    }

    /// Remove every entry. The backend stays what it is.
    pub fn clear(&mut self) {
        self.storage.backend_mut::<S>().clear();
        if self.len != 0 {
            self.len = 0;
            self.epoch.bump();
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.storage, self.len)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.storage, self.len)
    }

    /// Read-only view of the keys.
    pub fn keys(&self) -> Keys<'_, K, V, S> {
        Keys::new(self)
    }

    /// Read-only view of the values.
    pub fn values(&self) -> Values<'_, K, V, S> {
        Values::new(self)
    }

    /// Detached enumerator that fails once the map changes shape.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.id(), self.version())
    }

    /// Clone every pair into `dest[index..]`. Nothing is written on error.
    pub fn copy_to(&self, dest: &mut [(K, V)], index: usize) -> Result<(), MapError>
    where
        K: Clone,
        V: Clone,
    {
        check_copy_target(dest, index, self.len)?;
        for (slot, (k, v)) in dest.iter_mut().skip(index).zip(self.iter()) {
            *slot = (k.clone(), v.clone());
        }
        Ok(())
    }
}

impl<K, V, S> Default for AdaptiveMap<K, V, S>
where
    K: Eq + Hash + 'static,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        MapBuilder::new().hasher(S::default()).build()
    }
}

impl<K, V, S> fmt::Debug for AdaptiveMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(Iter::new(&self.storage, self.len)).finish()
    }
}

impl<K, V, S> PartialEq for AdaptiveMap<K, V, S>
where
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V: Eq, S> Eq for AdaptiveMap<K, V, S> {}

impl<K, V, S> Index<&K> for AdaptiveMap<K, V, S> {
    type Output = V;

    /// Panics when `key` is absent; `try_get` is the fallible form.
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not found"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for AdaptiveMap<K, V, S> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for AdaptiveMap<K, V, S>
where
    K: Eq + Hash + 'static,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut m = Self::default();
        m.extend(iter);
        m
    }
}

impl<'a, K, V, S> IntoIterator for &'a AdaptiveMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        Iter::new(&self.storage, self.len)
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut AdaptiveMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        IterMut::new(&mut self.storage, self.len)
    }
}

impl<K, V, S> IntoIterator for AdaptiveMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.storage, self.len)
    }
}
