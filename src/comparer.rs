//! Key equality: a caller-supplied comparer, or the key type's own
//! `Eq` paired with the map's `BuildHasher`.

use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::rc::Rc;

/// Custom key equality for an `AdaptiveMap`.
///
/// `hash_key` must agree with `equals`: keys that compare equal must hash
/// equal. Supplying a comparer always routes the map through the small-map
/// and probe-table backends, even for key types with a native fast path.
pub trait KeyEquality<K> {
    fn equals(&self, a: &K, b: &K) -> bool;
    fn hash_key(&self, key: &K) -> u32;
}

/// Comparer assembled from two closures.
///
/// ```
/// use adaptive_map::{AdaptiveMap, FnEquality};
/// use std::rc::Rc;
///
/// let ci = FnEquality::new(
///     |a: &String, b: &String| a.eq_ignore_ascii_case(b),
///     |k: &String| k.to_ascii_lowercase().bytes().fold(17u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32)),
/// );
/// let mut m: AdaptiveMap<String, i32> = AdaptiveMap::with_comparer(Rc::new(ci));
/// m.insert("Key".to_string(), 1);
/// assert_eq!(m.get(&"KEY".to_string()), Some(&1));
/// ```
pub struct FnEquality<E, H> {
    eq: E,
    hash: H,
}

impl<E, H> FnEquality<E, H> {
    pub fn new(eq: E, hash: H) -> Self {
        Self { eq, hash }
    }
}

impl<E, H> fmt::Debug for FnEquality<E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnEquality")
    }
}

impl<K, E, H> KeyEquality<K> for FnEquality<E, H>
where
    E: Fn(&K, &K) -> bool,
    H: Fn(&K) -> u32,
{
    fn equals(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }

    fn hash_key(&self, key: &K) -> u32 {
        (self.hash)(key)
    }
}

/// Shared handle to a custom comparer.
pub type Comparer<K> = Rc<dyn KeyEquality<K>>;

/// Intrinsic equality and hashing, captured as plain function pointers
/// while `K: Eq + Hash` and `S: BuildHasher` are in scope. Maps built
/// around a comparer never hold one, so their keys need neither trait.
pub(crate) struct Intrinsic<K, S> {
    eq: fn(&K, &K) -> bool,
    hash: fn(&S, &K) -> u64,
}

impl<K, S> Intrinsic<K, S> {
    pub(crate) fn new() -> Self
    where
        K: Eq + Hash,
        S: BuildHasher,
    {
        Self {
            eq: |a, b| a == b,
            hash: |s, k| s.hash_one(k),
        }
    }
}

impl<K, S> Clone for Intrinsic<K, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, S> Copy for Intrinsic<K, S> {}

/// How a map compares and hashes its keys, fixed at construction.
pub(crate) enum Equality<K, S> {
    Custom(Comparer<K>),
    Intrinsic(Intrinsic<K, S>),
}

impl<K, S> Equality<K, S> {
    pub(crate) fn comparer(&self) -> Option<&Comparer<K>> {
        match self {
            Equality::Custom(c) => Some(c),
            Equality::Intrinsic(_) => None,
        }
    }

    /// Borrow as the per-operation view handed to backends.
    pub(crate) fn ops<'a>(&'a self, hasher: &'a S) -> KeyOps<'a, K, S> {
        match self {
            Equality::Custom(c) => KeyOps::Custom(&**c),
            Equality::Intrinsic(fns) => KeyOps::Intrinsic { fns: *fns, hasher },
        }
    }
}

impl<K, S> Clone for Equality<K, S> {
    fn clone(&self) -> Self {
        match self {
            Equality::Custom(c) => Equality::Custom(Rc::clone(c)),
            Equality::Intrinsic(fns) => Equality::Intrinsic(*fns),
        }
    }
}

/// Resolved hash/equality pair handed to the backends for one operation.
pub(crate) enum KeyOps<'a, K, S> {
    Custom(&'a dyn KeyEquality<K>),
    Intrinsic { fns: Intrinsic<K, S>, hasher: &'a S },
}

impl<'a, K, S> KeyOps<'a, K, S> {
    /// 31-bit hash: the sign bit is cleared so all probe arithmetic stays
    /// non-negative.
    #[inline]
    pub(crate) fn hash(&self, key: &K) -> u32 {
        let raw = match self {
            KeyOps::Custom(c) => c.hash_key(key),
            // Truncation to the low 32 bits is intended.
            KeyOps::Intrinsic { fns, hasher } => (fns.hash)(*hasher, key) as u32,
        };
        raw & 0x7FFF_FFFF
    }

    /// Full-width hash for the native backend, which is only ever built
    /// with intrinsic equality.
    #[inline]
    pub(crate) fn hash64(&self, key: &K) -> u64 {
        match self {
            KeyOps::Custom(c) => u64::from(c.hash_key(key)),
            KeyOps::Intrinsic { fns, hasher } => (fns.hash)(*hasher, key),
        }
    }

    #[inline]
    pub(crate) fn eq(&self, a: &K, b: &K) -> bool {
        match self {
            KeyOps::Custom(c) => c.equals(a, b),
            KeyOps::Intrinsic { fns, .. } => (fns.eq)(a, b),
        }
    }
}
