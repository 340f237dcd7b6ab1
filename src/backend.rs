//! The internal contract every storage strategy implements.
//!
//! Backends address their entries by *position*: an index into their own
//! storage that stays valid until the next structural change. Lookups
//! resolve a key to a position; iteration and cursors walk positions
//! `0..positions()` and skip the ones that hold nothing.
//!
//! Backends never count. The map owns the element count and adjusts it
//! from what `upsert` and `remove` report.

use crate::comparer::KeyOps;
use crate::entry::Entry;
use crate::error::MapError;

/// How `upsert` treats a key that is already present.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Mode {
    /// Present key is an error; nothing changes.
    Unique,
    /// Present key gets its value replaced.
    Overwrite,
}

/// What a successful `upsert` did.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Upsert<V> {
    /// A new entry was stored; the map grew by one.
    Inserted,
    /// An existing value was replaced; the map did not grow.
    Replaced(V),
}

pub(crate) trait Backend<K, V, S> {
    fn find(&self, ops: &KeyOps<'_, K, S>, key: &K) -> Option<usize>;

    fn entry_at(&self, pos: usize) -> Option<&Entry<K, V>>;

    fn entry_at_mut(&mut self, pos: usize) -> Option<&mut Entry<K, V>>;

    fn upsert(
        &mut self,
        ops: &KeyOps<'_, K, S>,
        key: K,
        value: V,
        mode: Mode,
    ) -> Result<Upsert<V>, MapError>;

    fn remove(&mut self, ops: &KeyOps<'_, K, S>, key: &K) -> Option<Entry<K, V>>;

    fn clear(&mut self);

    /// Upper bound (exclusive) on valid positions.
    fn positions(&self) -> usize;

    /// Entries the backend can hold before it must reallocate.
    fn capacity(&self) -> usize;
}
