//! adaptive-map: a single-threaded associative container that picks its
//! storage strategy once, at construction, and behaves identically
//! whichever strategy it picked.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one public contract (`AdaptiveMap`) over three storage
//!   strategies, with a single dispatch point and no per-backend
//!   bookkeeping of the element count.
//! - Layers:
//!   - `primes`: table lengths (an ascending prime sequence) and the
//!     double-hashing probe sequence. Pure functions, no state.
//!   - `Entry`: key, value and the hash computed at insertion.
//!   - Backends, each implementing the internal `Backend` trait (find,
//!     upsert, remove, positional access):
//!     - `NativeMap`: dense entries indexed by `hashbrown::HashTable`,
//!       keyed by the key type's own `Eq`/`Hash`.
//!     - `SmallMap`: linear scan over at most `PROMOTION_THRESHOLD - 1`
//!       entries.
//!     - `ProbeTable`: open addressing over prime-length tables.
//!   - `AdaptiveMap`: selects a backend, dispatches to it, owns the count
//!     and the structural version.
//!   - Iterators, `Cursor`, and the `Keys`/`Values` views.
//!
//! Backend selection
//! - `String`, `&'static str`, and `i32` keys with no custom comparer use
//!   `NativeMap`. Everything else starts as a `SmallMap`, or as a
//!   `ProbeTable` when the capacity hint is at least the threshold.
//! - Equality and hashing are fixed at construction: either the comparer,
//!   or function pointers over `Eq`/`BuildHasher` captured while those
//!   bounds were in scope. A comparer-built map never needs `K: Eq + Hash`.
//! - Capacity hints presize storage up to `MAX_CAPACITY_HINT` only.
//! - The decision is never revisited. The one structural transition is
//!   `SmallMap -> ProbeTable`, taken at most once, when a new key would
//!   bring the count to `PROMOTION_THRESHOLD`.
//!
//! Probe table
//! - Lengths come from `primes::capacity_for`. A table is full once
//!   `len / count < 2`; growth to the next non-full prime happens before
//!   a new key is placed, never after. Past a few million slots the
//!   listed lengths double, so growth stays amortized.
//! - Probing starts at `hash % n` and steps by `1 + hash % (n - 1)`.
//! - No tombstones: removal rebuilds the table without the removed entry.
//!   This keeps probe chains intact at O(len) per removal.
//! - Stored hashes are reused for every rebuild, so user hash code runs
//!   exactly once per inserted key.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (the epoch carries a raw-pointer
//!   marker, comparers are `Rc`).
//! - Reentrancy: a custom comparer must not call back into the map it
//!   belongs to. Debug builds panic if it does.
//! - `add` and `remove` either fully succeed or leave the map unchanged.
//!
//! Enumeration
//! - Borrowing iterators are statically protected from mutation.
//! - `Cursor` holds no borrow; it records the map's identity and
//!   structural version. It fails with `ModifiedDuringEnumeration` when
//!   the map changed shape, and with `InvalidArgument` on another map. Inserting a new key, removing a present key, clearing a
//!   non-empty map, and promotion are structural; overwriting a value is
//!   not.

mod adaptive_map;
mod adaptive_map_proptest;
mod backend;
mod comparer;
mod config;
mod entry;
mod epoch;
mod error;
mod iter;
mod native_map;
pub mod primes;
mod probe_table;
mod small_map;

// Public surface
pub use adaptive_map::AdaptiveMap;
pub use comparer::{Comparer, FnEquality, KeyEquality};
pub use config::{BackendKind, MapBuilder, MAX_CAPACITY_HINT, PROMOTION_THRESHOLD};
pub use error::MapError;
pub use iter::{Cursor, IntoIter, Iter, IterMut, KeyIter, Keys, ValueIter, Values};
