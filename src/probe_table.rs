//! Open-addressing table with prime lengths and double-hashing probes.
//!
//! Invariants
//! - `slots.len()` is always a value produced by `primes::capacity_for`.
//! - For every stored key, walking `Probe::new(hash, slots.len())` reaches
//!   the key's slot before reaching an empty slot.
//! - The table is never full (see `primes::is_full`) after an insert
//!   completes; growth happens before the new entry is placed.
//!
//! There are no tombstones. Removing an entry rebuilds the whole table
//! without it, so probe chains are never broken. That makes removal
//! O(len) in exchange for lookups that always stop at the first empty slot.

use crate::backend::{Backend, Mode, Upsert};
use crate::comparer::KeyOps;
use crate::entry::Entry;
use crate::error::MapError;
use crate::primes::{capacity_for, is_full, Probe};

#[derive(Debug, Clone)]
pub(crate) struct ProbeTable<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    len: usize,
}

/// Outcome of walking a probe sequence for a key. `Vacant` carries the
/// hash it probed with, so an insert does not hash the key again.
enum Locate {
    Found(usize),
    Vacant(usize, u32),
}

impl<K, V> ProbeTable<K, V> {
    /// Empty table sized to take `count` entries without growing.
    pub(crate) fn sized_for(count: usize) -> Self {
        Self {
            slots: empty_slots(capacity_for(count)),
            len: 0,
        }
    }

    /// Build a table from entries whose keys are already known to be
    /// unique, sized for `count` entries.
    pub(crate) fn from_unique<I>(count: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = Entry<K, V>>,
    {
        let mut table = Self::sized_for(count);
        for e in entries {
            table.place(e);
        }
        table
    }

    pub(crate) fn slots(&self) -> &[Option<Entry<K, V>>] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Entry<K, V>>] {
        &mut self.slots
    }

    pub(crate) fn into_slots(self) -> Vec<Option<Entry<K, V>>> {
        self.slots
    }

    /// Insert-only placement using the stored hash. The caller guarantees
    /// the key is absent and the table has headroom.
    fn place(&mut self, entry: Entry<K, V>) {
        // Stored hashes were masked to 31 bits when computed.
        let hash = entry.hash as u32;
        let n = self.slots.len();
        for slot in Probe::new(hash, n) {
            if let Some(cell) = self.slots.get_mut(slot) {
                if cell.is_none() {
                    *cell = Some(entry);
                    self.len += 1;
                    return;
                }
            }
        }
        // Growth precedes every insert; reaching here means that broke.
        panic!("probe table full: {} slots, {} entries", n, self.len);
    }

    /// Replace the slot array with one sized for `count`, re-placing every
    /// surviving entry.
    fn rebuild(&mut self, count: usize, skip: Option<usize>) -> Option<Entry<K, V>> {
        let old_capacity = self.slots.len();
        let old = std::mem::replace(&mut self.slots, empty_slots(capacity_for(count)));
        self.len = 0;
        let mut removed = None;
        for (i, cell) in old.into_iter().enumerate() {
            let Some(e) = cell else { continue };
            if Some(i) == skip {
                removed = Some(e);
            } else {
                self.place(e);
            }
        }
        log::debug!(
            "probe table rebuilt: {} -> {} slots, {} entries",
            old_capacity,
            self.slots.len(),
            self.len
        );
        removed
    }

    fn locate<S>(&self, ops: &KeyOps<'_, K, S>, key: &K) -> Locate {
        let n = self.slots.len();
        let hash = ops.hash(key);
        for slot in Probe::new(hash, n) {
            match self.slots.get(slot) {
                Some(Some(e)) if ops.eq(&e.key, key) => return Locate::Found(slot),
                Some(Some(_)) => {}
                _ => return Locate::Vacant(slot, hash),
            }
        }
        panic!("probe table full: {} slots, {} entries", n, self.len);
    }
}

fn empty_slots<K, V>(n: usize) -> Vec<Option<Entry<K, V>>> {
    std::iter::repeat_with(|| None).take(n).collect()
}

impl<K, V, S> Backend<K, V, S> for ProbeTable<K, V> {
    fn find(&self, ops: &KeyOps<'_, K, S>, key: &K) -> Option<usize> {
        match self.locate(ops, key) {
            Locate::Found(slot) => Some(slot),
            Locate::Vacant(..) => None,
        }
    }

    fn entry_at(&self, pos: usize) -> Option<&Entry<K, V>> {
        self.slots.get(pos).and_then(Option::as_ref)
    }

    fn entry_at_mut(&mut self, pos: usize) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(pos).and_then(Option::as_mut)
    }

    fn upsert(
        &mut self,
        ops: &KeyOps<'_, K, S>,
        key: K,
        value: V,
        mode: Mode,
    ) -> Result<Upsert<V>, MapError> {
        match self.locate(ops, &key) {
            Locate::Found(slot) => match (mode, self.slots.get_mut(slot)) {
                (Mode::Overwrite, Some(Some(e))) => {
                    Ok(Upsert::Replaced(core::mem::replace(&mut e.value, value)))
                }
                _ => Err(MapError::DuplicateKey),
            },
            Locate::Vacant(slot, hash) => {
                let entry = Entry::new(u64::from(hash), key, value);
                let count = self.len + 1;
                // At the largest length there is nothing to grow into.
                if is_full(self.slots.len(), count) && capacity_for(count) != self.slots.len() {
                    self.rebuild(count, None);
                    self.place(entry);
                } else if let Some(cell) = self.slots.get_mut(slot) {
                    *cell = Some(entry);
                    self.len += 1;
                }
                Ok(Upsert::Inserted)
            }
        }
    }

    fn remove(&mut self, ops: &KeyOps<'_, K, S>, key: &K) -> Option<Entry<K, V>> {
        let slot = Backend::<K, V, S>::find(self, ops, key)?;
        self.rebuild(self.len - 1, Some(slot))
    }

    fn clear(&mut self) {
        self.slots = empty_slots(capacity_for(0));
        self.len = 0;
    }

    fn positions(&self) -> usize {
        self.slots.len()
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::{Equality, FnEquality, Intrinsic};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::collections::hash_map::RandomState;

    fn intrinsic() -> Equality<u32, RandomState> {
        Equality::Intrinsic(Intrinsic::new())
    }

    fn assert_reachable<K: core::fmt::Debug, V>(t: &ProbeTable<K, V>, ops: &KeyOps<'_, K, RandomState>) {
        for e in t.slots().iter().flatten() {
            assert!(
                Backend::<K, V, RandomState>::find(t, ops, &e.key).is_some(),
                "{:?} unreachable",
                e.key
            );
        }
    }

    #[test]
    fn grows_before_half_full() {
        let s = RandomState::new();
        let eq = intrinsic();
        let ops = eq.ops(&s);
        let mut t: ProbeTable<u32, u32> = ProbeTable::sized_for(0);
        assert_eq!(Backend::<u32, u32, RandomState>::capacity(&t), 3);
        for i in 0..50 {
            t.upsert(&ops, i, i * 2, Mode::Unique).unwrap();
            assert!(!is_full(t.slots().len(), t.len));
        }
        assert_eq!(t.len, 50);
        assert_eq!(t.slots().len(), capacity_for(50));
        for i in 0..50 {
            let pos = t.find(&ops, &i).unwrap();
            assert_eq!(Backend::<u32, u32, RandomState>::entry_at(&t, pos).unwrap().value, i * 2);
        }
        assert_reachable(&t, &ops);
    }

    #[test]
    fn overwrite_does_not_grow() {
        let s = RandomState::new();
        let eq = intrinsic();
        let ops = eq.ops(&s);
        let mut t: ProbeTable<u32, &str> = ProbeTable::sized_for(1);
        t.upsert(&ops, 1, "one", Mode::Overwrite).unwrap();
        let cap = t.slots().len();
        assert_eq!(t.upsert(&ops, 1, "uno", Mode::Overwrite), Ok(Upsert::Replaced("one")));
        assert_eq!(t.upsert(&ops, 1, "ein", Mode::Unique), Err(MapError::DuplicateKey));
        assert_eq!(t.len, 1);
        assert_eq!(t.slots().len(), cap);
    }

    #[test]
    fn remove_rebuilds_and_keeps_chains_intact() {
        // Constant hash: every key shares one probe chain.
        let c = FnEquality::new(|a: &u32, b: &u32| a == b, |_: &u32| 5u32);
        let ops: KeyOps<'_, u32, RandomState> = KeyOps::Custom(&c);
        let mut t: ProbeTable<u32, u32> = ProbeTable::sized_for(0);
        for i in 0..20 {
            t.upsert(&ops, i, i, Mode::Unique).unwrap();
        }
        for i in (0..20).step_by(3) {
            let e = t.remove(&ops, &i).unwrap();
            assert_eq!(e.key, i);
            assert!(t.find(&ops, &i).is_none());
        }
        for i in (0..20).filter(|i| i % 3 != 0) {
            let pos = t.find(&ops, &i).unwrap();
            assert_eq!(Backend::<u32, u32, RandomState>::entry_at(&t, pos).unwrap().value, i);
        }
        assert_eq!(t.len, 13);
        assert_eq!(t.slots().len(), capacity_for(13));
        assert!(t.remove(&ops, &0).is_none());
    }

    #[test]
    fn inserting_a_key_hashes_it_once() {
        let calls = Rc::new(Cell::new(0usize));
        let seen = Rc::clone(&calls);
        let c = FnEquality::new(
            |a: &u32, b: &u32| a == b,
            move |k: &u32| {
                seen.set(seen.get() + 1);
                *k
            },
        );
        let ops: KeyOps<'_, u32, RandomState> = KeyOps::Custom(&c);
        let mut t: ProbeTable<u32, u32> = ProbeTable::sized_for(0);
        t.upsert(&ops, 1, 1, Mode::Unique).unwrap();
        assert_eq!(calls.get(), 1);
        // Growth reuses stored hashes.
        for k in 2..=40 {
            t.upsert(&ops, k, k, Mode::Unique).unwrap();
        }
        assert_eq!(calls.get(), 40);
    }

    #[test]
    fn from_unique_places_everything() {
        let s = RandomState::new();
        let eq = intrinsic();
        let ops = eq.ops(&s);
        let entries = (0..3u32).map(|k| Entry::new(u64::from(ops.hash(&k)), k, k + 100));
        let t = ProbeTable::from_unique(4, entries);
        assert_eq!(t.len, 3);
        assert_eq!(t.slots().len(), 11);
        assert_reachable(&t, &ops);
    }

    #[test]
    fn clear_resets_to_smallest_table() {
        let s = RandomState::new();
        let eq = intrinsic();
        let ops = eq.ops(&s);
        let mut t: ProbeTable<u32, u32> = ProbeTable::sized_for(10);
        t.upsert(&ops, 7, 7, Mode::Unique).unwrap();
        Backend::<u32, u32, RandomState>::clear(&mut t);
        assert_eq!(t.len, 0);
        assert_eq!(t.slots().len(), 3);
        assert!(t.find(&ops, &7).is_none());
    }
}
