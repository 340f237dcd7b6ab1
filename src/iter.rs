//! Iterators, the detached `Cursor`, and the key/value views.
//!
//! Every traversal walks the active backend in storage order. Borrowing
//! iterators cannot see a mutation (the borrow forbids it). `Cursor` holds
//! no borrow, so it checks the map's version on every step instead.

use crate::adaptive_map::{AdaptiveMap, Storage};
use crate::entry::Entry;
use crate::error::{check_copy_target, MapError};
use core::iter::FusedIterator;
use core::slice;

enum Walk<'a, K, V> {
    Dense(slice::Iter<'a, Entry<K, V>>),
    Sparse(slice::Iter<'a, Option<Entry<K, V>>>),
}

/// Iterator over `(&K, &V)` pairs.
pub struct Iter<'a, K, V> {
    walk: Walk<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(storage: &'a Storage<K, V>, len: usize) -> Self {
        let walk = match storage {
            Storage::Native(m) => Walk::Dense(m.entries().iter()),
            Storage::Small(m) => Walk::Dense(m.entries().iter()),
            Storage::Hash(t) => Walk::Sparse(t.slots().iter()),
        };
        Self { walk, remaining: len }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = match &mut self.walk {
            Walk::Dense(it) => it.next(),
            Walk::Sparse(it) => it.find_map(Option::as_ref),
        }?;
        self.remaining -= 1;
        Some(e.pair())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        let walk = match &self.walk {
            Walk::Dense(it) => Walk::Dense(it.clone()),
            Walk::Sparse(it) => Walk::Sparse(it.clone()),
        };
        Self {
            walk,
            remaining: self.remaining,
        }
    }
}

enum WalkMut<'a, K, V> {
    Dense(slice::IterMut<'a, Entry<K, V>>),
    Sparse(slice::IterMut<'a, Option<Entry<K, V>>>),
}

/// Iterator over `(&K, &mut V)` pairs.
pub struct IterMut<'a, K, V> {
    walk: WalkMut<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(storage: &'a mut Storage<K, V>, len: usize) -> Self {
        let walk = match storage {
            Storage::Native(m) => WalkMut::Dense(m.entries_mut().iter_mut()),
            Storage::Small(m) => WalkMut::Dense(m.entries_mut().iter_mut()),
            Storage::Hash(t) => WalkMut::Sparse(t.slots_mut().iter_mut()),
        };
        Self { walk, remaining: len }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = match &mut self.walk {
            WalkMut::Dense(it) => it.next(),
            WalkMut::Sparse(it) => it.find_map(Option::as_mut),
        }?;
        self.remaining -= 1;
        Some(e.pair_mut())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

enum Drain<K, V> {
    Dense(std::vec::IntoIter<Entry<K, V>>),
    Sparse(std::iter::Flatten<std::vec::IntoIter<Option<Entry<K, V>>>>),
}

/// Owning iterator over `(K, V)` pairs.
pub struct IntoIter<K, V> {
    drain: Drain<K, V>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(storage: Storage<K, V>, len: usize) -> Self {
        let drain = match storage {
            Storage::Native(m) => Drain::Dense(m.into_entries().into_iter()),
            Storage::Small(m) => Drain::Dense(m.into_entries().into_iter()),
            Storage::Hash(t) => Drain::Sparse(t.into_slots().into_iter().flatten()),
        };
        Self {
            drain,
            remaining: len,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let e = match &mut self.drain {
            Drain::Dense(it) => it.next(),
            Drain::Sparse(it) => it.next(),
        }?;
        self.remaining -= 1;
        Some(e.into_pair())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Enumerator that does not borrow the map between steps.
///
/// It records which map created it and that map's structural version;
/// stepping it after an insert of a new key, a removal, or a non-empty
/// `clear` yields `ModifiedDuringEnumeration`. Overwriting an existing
/// value does not invalidate it. Stepping it against any other map,
/// clones included, yields `InvalidArgument`.
///
/// ```
/// use adaptive_map::{AdaptiveMap, MapError};
///
/// let mut m: AdaptiveMap<u32, u32> = (0..4).map(|i| (i, i)).collect();
/// let mut c = m.cursor();
/// assert!(c.next(&m).unwrap().is_some());
/// m.insert(9, 9);
/// assert_eq!(c.next(&m), Err(MapError::ModifiedDuringEnumeration));
/// ```
#[derive(Debug, Clone)]
pub struct Cursor {
    map: u64,
    version: u64,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(map: u64, version: u64) -> Self {
        Self { map, version, pos: 0 }
    }

    /// Advance to the next pair, or `Ok(None)` once exhausted.
    pub fn next<'m, K, V, S>(
        &mut self,
        map: &'m AdaptiveMap<K, V, S>,
    ) -> Result<Option<(&'m K, &'m V)>, MapError> {
        if map.id() != self.map {
            return Err(MapError::InvalidArgument {
                reason: "cursor belongs to a different map",
            });
        }
        if map.version() != self.version {
            return Err(MapError::ModifiedDuringEnumeration);
        }
        let b = map.storage().backend::<S>();
        while self.pos < b.positions() {
            let pos = self.pos;
            self.pos += 1;
            if let Some(e) = b.entry_at(pos) {
                return Ok(Some(e.pair()));
            }
        }
        Ok(None)
    }

    /// Restart from the beginning against `map`'s current shape.
    pub fn reset<K, V, S>(&mut self, map: &AdaptiveMap<K, V, S>) {
        self.map = map.id();
        self.version = map.version();
        self.pos = 0;
    }
}

/// Read-only view of a map's keys.
pub struct Keys<'a, K, V, S> {
    map: &'a AdaptiveMap<K, V, S>,
}

impl<'a, K, V, S> Keys<'a, K, V, S> {
    pub(crate) fn new(map: &'a AdaptiveMap<K, V, S>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Key lookup through the map, so a custom comparer applies.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn iter(&self) -> KeyIter<'a, K, V> {
        KeyIter {
            inner: self.map.iter(),
        }
    }

    /// Clone every key into `dest[index..]`. Nothing is written on error.
    pub fn copy_to(&self, dest: &mut [K], index: usize) -> Result<(), MapError>
    where
        K: Clone,
    {
        check_copy_target(dest, index, self.len())?;
        for (slot, k) in dest.iter_mut().skip(index).zip(self.iter()) {
            *slot = k.clone();
        }
        Ok(())
    }
}

impl<'a, K, V, S> IntoIterator for Keys<'a, K, V, S> {
    type Item = &'a K;
    type IntoIter = KeyIter<'a, K, V>;

    fn into_iter(self) -> KeyIter<'a, K, V> {
        self.iter()
    }
}

/// Iterator over `&K`.
pub struct KeyIter<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for KeyIter<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for KeyIter<'_, K, V> {}
impl<K, V> FusedIterator for KeyIter<'_, K, V> {}

/// Read-only view of a map's values.
pub struct Values<'a, K, V, S> {
    map: &'a AdaptiveMap<K, V, S>,
}

impl<'a, K, V, S> Values<'a, K, V, S> {
    pub(crate) fn new(map: &'a AdaptiveMap<K, V, S>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Linear scan; values are not indexed.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|v| v == value)
    }

    pub fn iter(&self) -> ValueIter<'a, K, V> {
        ValueIter {
            inner: self.map.iter(),
        }
    }

    /// Clone every value into `dest[index..]`. Nothing is written on error.
    pub fn copy_to(&self, dest: &mut [V], index: usize) -> Result<(), MapError>
    where
        V: Clone,
    {
        check_copy_target(dest, index, self.len())?;
        for (slot, v) in dest.iter_mut().skip(index).zip(self.iter()) {
            *slot = v.clone();
        }
        Ok(())
    }
}

impl<'a, K, V, S> IntoIterator for Values<'a, K, V, S> {
    type Item = &'a V;
    type IntoIter = ValueIter<'a, K, V>;

    fn into_iter(self) -> ValueIter<'a, K, V> {
        self.iter()
    }
}

/// Iterator over `&V`.
pub struct ValueIter<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for ValueIter<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValueIter<'_, K, V> {}
impl<K, V> FusedIterator for ValueIter<'_, K, V> {}
