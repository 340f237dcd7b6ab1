//! Native fast path: entries live in a dense `Vec` indexed by a
//! `hashbrown::HashTable`, keyed by the key type's own `Eq`/`Hash`.
//!
//! Only selected for key types whose intrinsic equality is the one the
//! caller wants (no custom comparer), so `KeyOps` always carries the
//! intrinsic functions here.

use crate::backend::{Backend, Mode, Upsert};
use crate::comparer::KeyOps;
use crate::entry::Entry;
use crate::error::MapError;
use hashbrown::hash_table;
use hashbrown::HashTable;

#[derive(Debug, Clone)]
pub(crate) struct NativeMap<K, V> {
    // Position in `entries` for every stored key.
    index: HashTable<usize>,
    entries: Vec<Entry<K, V>>,
}

impl<K, V> NativeMap<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashTable::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [Entry<K, V>] {
        &mut self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<Entry<K, V>> {
        self.entries
    }
}

impl<K, V, S> Backend<K, V, S> for NativeMap<K, V> {
    fn find(&self, ops: &KeyOps<'_, K, S>, key: &K) -> Option<usize> {
        let hash = ops.hash64(key);
        self.index
            .find(hash, |&i| {
                self.entries
                    .get(i)
                    .map(|e| ops.eq(&e.key, key))
                    .unwrap_or(false)
            })
            .copied()
    }

    fn entry_at(&self, pos: usize) -> Option<&Entry<K, V>> {
        self.entries.get(pos)
    }

    fn entry_at_mut(&mut self, pos: usize) -> Option<&mut Entry<K, V>> {
        self.entries.get_mut(pos)
    }

    fn upsert(
        &mut self,
        ops: &KeyOps<'_, K, S>,
        key: K,
        value: V,
        mode: Mode,
    ) -> Result<Upsert<V>, MapError> {
        let hash = ops.hash64(&key);
        let Self { index, entries } = self;
        match index.entry(
            hash,
            |&i| entries.get(i).map(|e| ops.eq(&e.key, &key)).unwrap_or(false),
            |&i| entries.get(i).map(|e| e.hash).unwrap_or(0),
        ) {
            hash_table::Entry::Occupied(o) => {
                let i = *o.get();
                match (mode, entries.get_mut(i)) {
                    (Mode::Overwrite, Some(e)) => {
                        Ok(Upsert::Replaced(core::mem::replace(&mut e.value, value)))
                    }
                    _ => Err(MapError::DuplicateKey),
                }
            }
            hash_table::Entry::Vacant(v) => {
                let _ = v.insert(entries.len());
                entries.push(Entry::new(hash, key, value));
                Ok(Upsert::Inserted)
            }
        }
    }

    fn remove(&mut self, ops: &KeyOps<'_, K, S>, key: &K) -> Option<Entry<K, V>> {
        let hash = ops.hash64(key);
        let Self { index, entries } = self;
        let (i, _) = index
            .find_entry(hash, |&i| {
                entries.get(i).map(|e| ops.eq(&e.key, key)).unwrap_or(false)
            })
            .ok()?
            .remove();
        let removed = entries.swap_remove(i);
        // The former last entry now lives at `i`; repoint its index slot.
        if let Some(moved) = entries.get(i) {
            let last = entries.len();
            if let Some(slot) = index.find_mut(moved.hash, |&j| j == last) {
                *slot = i;
            }
        }
        Some(removed)
    }

    fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }

    fn positions(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.index.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::{Equality, Intrinsic};
    use std::collections::hash_map::RandomState;

    #[test]
    fn upsert_find_and_overwrite() {
        let s = RandomState::new();
        let eq: Equality<String, RandomState> = Equality::Intrinsic(Intrinsic::new());
        let ops = eq.ops(&s);
        let mut m: NativeMap<String, i32> = NativeMap::with_capacity(0);
        assert_eq!(m.upsert(&ops, "a".to_string(), 1, Mode::Unique), Ok(Upsert::Inserted));
        assert_eq!(m.upsert(&ops, "a".to_string(), 2, Mode::Unique), Err(MapError::DuplicateKey));
        assert_eq!(m.upsert(&ops, "a".to_string(), 3, Mode::Overwrite), Ok(Upsert::Replaced(1)));
        let pos = m.find(&ops, &"a".to_string()).unwrap();
        assert_eq!(m.entries()[pos].value, 3);
        assert!(m.find(&ops, &"b".to_string()).is_none());
    }

    /// Removing from the middle moves the last entry; every survivor must
    /// stay reachable through the index.
    #[test]
    fn swap_remove_repoints_moved_entry() {
        let s = RandomState::new();
        let eq: Equality<i32, RandomState> = Equality::Intrinsic(Intrinsic::new());
        let ops = eq.ops(&s);
        let mut m: NativeMap<i32, i32> = NativeMap::with_capacity(8);
        for k in 0..8 {
            m.upsert(&ops, k, k * 10, Mode::Unique).unwrap();
        }
        for k in [0, 3, 7, 5] {
            let e = m.remove(&ops, &k).unwrap();
            assert_eq!(e.into_pair(), (k, k * 10));
            assert!(m.find(&ops, &k).is_none());
        }
        for k in [1, 2, 4, 6] {
            let pos = m.find(&ops, &k).unwrap();
            assert_eq!(m.entries()[pos].value, k * 10);
        }
        assert_eq!(m.entries().len(), 4);
        assert!(m.remove(&ops, &0).is_none());
    }

    #[test]
    fn clear_empties_index_and_entries() {
        let s = RandomState::new();
        let eq: Equality<i32, RandomState> = Equality::Intrinsic(Intrinsic::new());
        let ops = eq.ops(&s);
        let mut m: NativeMap<i32, i32> = NativeMap::with_capacity(0);
        m.upsert(&ops, 1, 1, Mode::Unique).unwrap();
        Backend::<i32, i32, RandomState>::clear(&mut m);
        assert!(m.entries().is_empty());
        assert!(m.find(&ops, &1).is_none());
    }
}
