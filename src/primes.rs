//! Table sizing and probe sequences for the open-addressing backend.
//!
//! Table lengths are always prime. A table of length `n` holding `c`
//! entries is *full* once `n / c < 2` (integer division), so a table is
//! grown before it is more than half occupied.

/// Ascending table lengths, all prime. Up to 7199369 each is roughly 1.2x
/// its predecessor; past that the lengths double, ending at
/// `MAX_PRIME_CAPACITY`, so growth stays geometric all the way up.
pub const PRIMES: [usize; 81] = [
    3, 7, 11, 17, 23, 29, 37, 47, 59, 71, 89, 107, 131, 163, 197, 239, 293, 353, 431, 521, 631,
    761, 919, 1103, 1327, 1597, 1931, 2333, 2801, 3371, 4049, 4861, 5839, 7013, 8419, 10103,
    12143, 14591, 17519, 21023, 25229, 30293, 36353, 43627, 52361, 62851, 75431, 90523, 108631,
    130363, 156437, 187751, 225307, 270371, 324449, 389357, 467237, 560689, 672827, 807403,
    968897, 1162687, 1395263, 1674319, 2009191, 2411033, 2893249, 3471899, 4166287, 4999559,
    5999471, 7199369, 14398753, 28797523, 57595063, 115190149, 230380307, 460760623,
    921521257, 1843042529, MAX_PRIME_CAPACITY,
];

/// Largest table length ever produced: the largest prime below the
/// maximum array length a 31-bit index can address.
pub const MAX_PRIME_CAPACITY: usize = 0x7FEF_FFFD;

/// True when a table of `capacity` slots cannot take `count` entries.
#[inline]
pub fn is_full(capacity: usize, count: usize) -> bool {
    count != 0 && capacity / count < 2
}

/// Smallest table length that is not full with `count` entries, or
/// `MAX_PRIME_CAPACITY` when no listed length is large enough.
pub fn capacity_for(count: usize) -> usize {
    PRIMES
        .iter()
        .copied()
        .find(|&p| !is_full(p, count))
        .unwrap_or(MAX_PRIME_CAPACITY)
}

/// Double-hashing probe sequence over a table of `len` slots.
///
/// Starts at `hash % len` and steps by `1 + hash % (len - 1)`. Because
/// `len` is prime every step size is coprime with it, so the sequence
/// visits each slot exactly once in `len` steps.
#[derive(Debug, Clone)]
pub struct Probe {
    slot: usize,
    interval: usize,
    len: usize,
    remaining: usize,
}

impl Probe {
    /// `hash` must already have its sign bit cleared; `len` must be a
    /// prime of at least 3.
    pub fn new(hash: u32, len: usize) -> Self {
        debug_assert!(len >= 3, "probe table shorter than the smallest prime");
        let h = hash as usize;
        Self {
            slot: h % len,
            interval: 1 + h % (len - 1),
            len,
            remaining: len,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.slot;
        self.slot = (self.slot + self.interval) % self.len;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Probe {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn is_prime(n: usize) -> bool {
        if n < 2 {
            return false;
        }
        if n % 2 == 0 {
            return n == 2;
        }
        let mut d = 3;
        while d * d <= n {
            if n % d == 0 {
                return false;
            }
            d += 2;
        }
        true
    }

    #[test]
    fn table_is_ascending_primes() {
        assert!(PRIMES.windows(2).all(|w| w[0] < w[1]));
        assert!(PRIMES.iter().all(|&p| is_prime(p)));
        assert!(is_prime(MAX_PRIME_CAPACITY));
        assert_eq!(PRIMES.last(), Some(&MAX_PRIME_CAPACITY));
        // The tail past the dense range at least doubles each step.
        let dense_end = PRIMES.iter().position(|&p| p == 7199369).unwrap();
        assert!(PRIMES[dense_end..].windows(2).all(|w| w[1] >= 2 * w[0] || w[1] == MAX_PRIME_CAPACITY));
    }

    #[test]
    fn fullness_threshold() {
        assert!(!is_full(3, 0));
        assert!(!is_full(3, 1));
        assert!(is_full(3, 2));
        assert!(!is_full(7, 3));
        assert!(is_full(7, 4));
    }

    #[test]
    fn capacity_for_small_counts() {
        assert_eq!(capacity_for(0), 3);
        assert_eq!(capacity_for(1), 3);
        assert_eq!(capacity_for(2), 7);
        assert_eq!(capacity_for(3), 7);
        assert_eq!(capacity_for(4), 11);
        assert_eq!(capacity_for(50), 107);
    }

    #[test]
    fn capacity_past_the_dense_range_is_prime_and_not_full() {
        for count in [5_000_000, 9_000_000, 100_000_000] {
            let cap = capacity_for(count);
            assert!(is_prime(cap));
            assert!(!is_full(cap, count));
            assert!(cap > 7199369);
        }
    }

    // Replays the grow-before-insert rule of the probe table, one key at a
    // time, and counts how often the table length changes.
    fn resizes_while_inserting(start: usize, inserts: usize) -> usize {
        let mut cap = capacity_for(start);
        let mut resizes = 0;
        for c in start..start + inserts {
            if is_full(cap, c + 1) {
                cap = capacity_for(c + 1);
                resizes += 1;
            }
        }
        resizes
    }

    #[test]
    fn growth_stays_geometric_past_the_dense_range() {
        assert!(resizes_while_inserting(4_000_000, 1_000) <= 1);
        assert!(resizes_while_inserting(1_000, 1_000) <= 3);
        // Ten million inserts from 4M cross only a handful of lengths.
        assert!(resizes_while_inserting(4_000_000, 10_000_000) <= 3);
    }

    #[test]
    fn capacity_saturates_at_max() {
        assert_eq!(capacity_for(MAX_PRIME_CAPACITY), MAX_PRIME_CAPACITY);
        assert_eq!(capacity_for(usize::MAX / 4), MAX_PRIME_CAPACITY);
    }

    #[test]
    fn probe_starts_at_base_slot() {
        let mut p = Probe::new(15, 7);
        assert_eq!(p.next(), Some(1));
        // interval = 1 + 15 % 6 = 4
        assert_eq!(p.next(), Some(5));
        assert_eq!(p.next(), Some(2));
    }

    proptest! {
        #[test]
        fn probe_visits_every_slot_once(hash in 0u32..=0x7FFF_FFFF, idx in 0usize..20) {
            let len = PRIMES[idx];
            let seen: BTreeSet<usize> = Probe::new(hash, len).collect();
            prop_assert_eq!(seen.len(), len);
            prop_assert_eq!(Probe::new(hash, len).count(), len);
        }

        #[test]
        fn capacity_is_never_full(count in 0usize..200_000) {
            let cap = capacity_for(count);
            prop_assert!(!is_full(cap, count));
            prop_assert!(cap >= 3);
        }
    }
}
