//! # bpptree
//!
//! Persistent and transient B+ trees.
//!
//! ## Overview
//!
//! A [`BppTree`] stores its elements in reference counted nodes. Two choices
//! fix how a tree behaves:
//!
//! - **Personality**: an [`Indexed`] tree is a sequence addressed by
//!   position; an [`Ordered`] tree keeps its elements sorted by a key and
//!   supports map and set operations as well as positional reads. The
//!   aggregate personalities are sequences too: a [`Summed`] tree answers
//!   prefix sums and a [`Min`] or [`Max`] tree answers range extremes, each
//!   in O(log n).
//! - **Discipline**: a [`Persistent`] handle never changes. Every update
//!   returns a new handle that shares all untouched nodes with the old one.
//!   A [`Transient`] handle is an exclusive builder that updates the nodes it
//!   owns in place and copies shared ones on first touch.
//!
//! Handles convert between the two disciplines in O(1) with
//! [`transient`](BppTree::transient) and
//! [`persistent`](BppTree::persistent).
//!
//! ## Feature Flags
//!
//! - `arc`: Use `Arc` instead of `Rc` for node sharing, making persistent
//!   handles `Send + Sync`
//! - `serde`: Serialize trees as sequences
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use bpptree::prelude::*;
//!
//! let tree: IndexedTree<i32> = (0..100).collect();
//! let mut builder = tree.clone().transient();
//! for _ in 0..50 {
//!     builder.pop_front();
//! }
//! let trimmed = builder.persistent();
//!
//! assert_eq!(tree.len(), 100);
//! assert_eq!(trimmed.front(), Some(&50));
//!
//! let map = OrderedMap::new().insert_or_assign(("b", 2)).insert_or_assign(("a", 1));
//! assert_eq!(map.first(), Some(&("a", 1)));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use bpptree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::iterator::Cursor;
    pub use crate::ownership::IsTransientTree;
    pub use crate::policy::{Comparator, Indexed, KeyExtractor, Max, Min, Ordered, Summed};
    pub use crate::tree::{
        BppTree, IndexedTree, OrderedMap, OrderedSet, Persistent, Transient, TransientIndexedTree,
        TransientOrderedMap, TransientOrderedSet,
    };
}

mod array;
pub mod config;
mod error;
mod iterator;
mod node;
mod ownership;
mod policy;
mod tree;

pub use config::TreeConfig;
pub use error::{Result, TreeError};
pub use iterator::{Cursor, Iter};
pub use ownership::{IsTransientTree, OwnerId, Owned, OwnershipPolicy, Shared, Version};
pub use policy::{
    Comparator, Identity, Indexed, KeyExtractor, Max, Min, NaturalOrder, Ordered, PairKey, Positional, ReverseOrder,
    RoutingPolicy, SearchMode, Summable, Summed,
};
pub use tree::{
    BppTree, IndexedTree, OrderedMap, OrderedSet, Persistent, Transient, TransientIndexedTree, TransientOrderedMap,
    TransientOrderedSet,
};
