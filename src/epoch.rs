//! Per-map epoch: an identity and the structural version counter read by
//! cursors, plus a debug-only reentrancy guard.
//!
//! A custom comparer is user code that runs while a probe is walking the
//! table. If it calls back into the same map, the walk may observe a
//! half-built table. In debug builds entering twice panics; in release
//! builds the guard compiles to nothing and only the version remains.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub(crate) struct Epoch {
    // Distinct for every map, clones included.
    id: u64,
    version: u64,
    #[cfg(debug_assertions)]
    depth: Cell<u32>,
    // Single-threaded by design.
    _nosend: PhantomData<*mut ()>,
}

impl Epoch {
    pub(crate) fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            version: 0,
            #[cfg(debug_assertions)]
            depth: Cell::new(0),
            _nosend: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Current structural version.
    #[inline]
    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    /// Record a structural change, invalidating every outstanding cursor.
    #[inline]
    pub(crate) fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Enter a guarded section. In debug builds, panics if already entered.
    #[inline]
    pub(crate) fn enter(&self) -> EpochGuard<'_> {
        #[cfg(debug_assertions)]
        {
            let d = self.depth.get();
            assert!(d == 0, "reentrancy detected: map accessed from its own comparer");
            self.depth.set(d + 1);
            EpochGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            EpochGuard { _z: PhantomData }
        }
    }
}

impl Default for Epoch {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Epoch {
    // A clone is a fresh map: same version, new identity, no one inside it.
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            ..Self::new()
        }
    }
}

/// RAII guard returned by `Epoch::enter`.
pub(crate) struct EpochGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a Epoch,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for EpochGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let d = self.owner.depth.get();
            debug_assert!(d > 0);
            self.owner.depth.set(d - 1);
        }
    }
}
