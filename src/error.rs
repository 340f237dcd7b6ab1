//! Error values surfaced by `AdaptiveMap` and its views.

use thiserror::Error;

/// Failure of a map operation. The map is left exactly as it was before
/// the failing call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// `add` was called with a key that is already present.
    #[error("an entry with the same key already exists")]
    DuplicateKey,

    /// `try_get` was called with a key that is not present.
    #[error("the given key was not present in the map")]
    KeyNotFound,

    /// A copy-out destination or offset was unusable.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument.
        reason: &'static str,
    },

    /// A `Cursor` was advanced after the map changed shape.
    #[error("map was modified; enumeration cannot continue")]
    ModifiedDuringEnumeration,
}

/// Validates a copy of `count` items into `dest` starting at `index`.
pub(crate) fn check_copy_target<T>(dest: &[T], index: usize, count: usize) -> Result<(), MapError> {
    if index > dest.len() {
        return Err(MapError::InvalidArgument {
            reason: "index is past the end of the destination",
        });
    }
    if dest.len() - index < count {
        return Err(MapError::InvalidArgument {
            reason: "destination is too small for the elements",
        });
    }
    Ok(())
}
