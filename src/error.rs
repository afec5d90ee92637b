//! Error types for tree operations.
//!
//! Most operations on a tree cannot fail: lookups report absence through
//! `Option`, and persistent updates always produce a new handle. The errors
//! here cover precondition violations (an index past the end, a tree that
//! would grow beyond its configured depth, a cursor taken from another
//! version of the tree). The plain operations panic with the error's message
//! when such a precondition is broken; every one of them has a `try_*` twin
//! that returns the error instead and leaves the tree untouched.
//!
//! # Examples
//!
//! ```rust
//! use bpptree::{IndexedTree, TreeError};
//!
//! let tree: IndexedTree<i32> = (0..3).collect();
//! let error = tree.try_erase_index(7).unwrap_err();
//! assert_eq!(error, TreeError::IndexOutOfBounds { index: 7, length: 3 });
//! ```

use thiserror::Error;

/// Result type alias using [`TreeError`].
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors reported by the checked (`try_*`) tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A position was outside the valid range for the operation.
    #[error("index {index} out of bounds for tree of length {length}")]
    IndexOutOfBounds {
        /// The offending position.
        index: usize,
        /// The number of elements in the tree at the time of the call.
        length: usize,
    },

    /// The insertion would have split the root of a tree that is already at
    /// its configured depth limit.
    #[error("depth limit of {limit} exceeded")]
    DepthLimitExceeded {
        /// The configured depth limit.
        limit: usize,
    },

    /// An operation that requires the key to be present did not find it.
    #[error("key not found")]
    KeyNotFound,

    /// A replacement value would have changed the key it is stored under.
    #[error("replacement value does not have the same key as the value it replaces")]
    KeyMismatch,

    /// A range between two cursors ends before it starts.
    #[error("range starting at {start} ends before it at {end}")]
    InvalidRange {
        /// Position of the first cursor.
        start: usize,
        /// Position of the second cursor.
        end: usize,
    },

    /// A cursor was used with a tree version other than the one it was taken
    /// from.
    #[error("cursor was taken from a different version of the tree")]
    StaleCursor,

    /// A structural invariant does not hold.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),
}
