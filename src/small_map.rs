//! Linear-scan storage for maps below the promotion threshold.

use crate::backend::{Backend, Mode, Upsert};
use crate::comparer::KeyOps;
use crate::entry::Entry;
use crate::error::MapError;

/// Unordered entries packed into `[0, len)`; keys are unique.
#[derive(Debug, Clone)]
pub(crate) struct SmallMap<K, V> {
    entries: Vec<Entry<K, V>>,
}

impl<K, V> SmallMap<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
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

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Hand the entries over for promotion.
    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Entry<K, V>> {
        self.entries.drain(..)
    }

    fn push(&mut self, entry: Entry<K, V>) {
        // Double the backing array when full, starting from one slot.
        if self.entries.len() == self.entries.capacity() {
            let extra = self.entries.capacity().max(1);
            self.entries.reserve_exact(extra);
        }
        self.entries.push(entry);
    }
}

impl<K, V, S> Backend<K, V, S> for SmallMap<K, V> {
    fn find(&self, ops: &KeyOps<'_, K, S>, key: &K) -> Option<usize> {
        self.entries.iter().position(|e| ops.eq(&e.key, key))
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
        if let Some(pos) = Backend::<K, V, S>::find(self, ops, &key) {
            return match (mode, self.entries.get_mut(pos)) {
                (Mode::Overwrite, Some(e)) => Ok(Upsert::Replaced(core::mem::replace(&mut e.value, value))),
                _ => Err(MapError::DuplicateKey),
            };
        }
        let hash = u64::from(ops.hash(&key));
        self.push(Entry::new(hash, key, value));
        Ok(Upsert::Inserted)
    }

    fn remove(&mut self, ops: &KeyOps<'_, K, S>, key: &K) -> Option<Entry<K, V>> {
        let pos = Backend::<K, V, S>::find(self, ops, key)?;
        // Vec::remove shifts the tail left, keeping the prefix contiguous.
        Some(self.entries.remove(pos))
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn positions(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.entries.capacity()
    }
}
