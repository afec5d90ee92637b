//! Capacity and depth configuration.
//!
//! Node capacities are const generic parameters of the tree types (`LEAF`
//! values per leaf, `INTERNAL` children per internal node). The helpers here
//! turn a byte budget into a slot count for a concrete element type so that a
//! tree can be sized the way its nodes are expected to sit in memory:
//!
//! ```rust
//! use bpptree::config::{slots_for_bytes, DEFAULT_NODE_BYTES};
//! use bpptree::{Indexed, Persistent};
//!
//! const LEAF: usize = slots_for_bytes::<u64>(DEFAULT_NODE_BYTES);
//! let tree: Persistent<u64, Indexed, LEAF> = Persistent::new();
//! assert_eq!(tree.leaf_capacity(), LEAF);
//! ```
//!
//! The depth limit is a run-time setting carried by [`TreeConfig`] and
//! inherited by every handle derived from a tree.

/// Default byte budget for a node.
pub const DEFAULT_NODE_BYTES: usize = 512;

/// Default maximum height of a tree (a lone leaf has height 1).
pub const DEFAULT_DEPTH_LIMIT: usize = 16;

/// Default number of values per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 64;

/// Default number of children per internal node.
pub const DEFAULT_INTERNAL_SIZE: usize = 64;

/// Smallest capacity a node may be configured with.
///
/// Below four slots a split cannot leave both halves at or above the minimum
/// occupancy of `capacity / 2`.
pub const MIN_NODE_CAPACITY: usize = 4;

/// Largest capacity a node may be configured with.
pub const MAX_NODE_CAPACITY: usize = u16::MAX as usize;

/// Bytes reserved in every node for the owner tag and occupancy count.
const NODE_HEADER_BYTES: usize = 16;

/// Number of values of type `T` that fit in a leaf of `bytes` bytes.
///
/// The result is clamped to `[MIN_NODE_CAPACITY, MAX_NODE_CAPACITY]`.
#[must_use]
pub const fn slots_for_bytes<T>(bytes: usize) -> usize {
    clamp_capacity(bytes, std::mem::size_of::<T>())
}

/// Number of child entries that fit in an internal node of `bytes` bytes
/// when every entry also carries a summary of type `S`.
///
/// An entry is a child pointer, a subtree element count and the summary.
#[must_use]
pub const fn internal_slots_for_bytes<S>(bytes: usize) -> usize {
    clamp_capacity(bytes, 2 * std::mem::size_of::<usize>() + std::mem::size_of::<S>())
}

const fn clamp_capacity(bytes: usize, slot_bytes: usize) -> usize {
    let available = bytes.saturating_sub(NODE_HEADER_BYTES);
    let slots = if slot_bytes == 0 {
        MAX_NODE_CAPACITY
    } else {
        available / slot_bytes
    };
    if slots < MIN_NODE_CAPACITY {
        MIN_NODE_CAPACITY
    } else if slots > MAX_NODE_CAPACITY {
        MAX_NODE_CAPACITY
    } else {
        slots
    }
}

/// Minimum occupancy of a non-root node with the given capacity.
#[inline]
pub(crate) const fn min_occupancy(capacity: usize) -> usize {
    capacity / 2
}

/// Number of elements in a tree of the given depth whose nodes are all full.
pub(crate) const fn max_elements(leaf: usize, internal: usize, depth_limit: usize) -> usize {
    let mut total = leaf;
    let mut level = 1;
    while level < depth_limit {
        total = total.saturating_mul(internal);
        level += 1;
    }
    total
}

/// Run-time configuration shared by a tree and every handle derived from it.
///
/// # Examples
///
/// ```rust
/// use bpptree::{IndexedTree, TreeConfig};
///
/// let config = TreeConfig::new().with_depth_limit(3);
/// let tree: IndexedTree<u8> = IndexedTree::with_config(config);
/// assert_eq!(tree.max_depth(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeConfig {
    depth_limit: usize,
}

impl TreeConfig {
    /// Creates the default configuration.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }

    /// Sets the maximum height of the tree. Values below 1 are raised to 1.
    #[inline]
    #[must_use]
    pub const fn with_depth_limit(self, depth_limit: usize) -> Self {
        Self {
            depth_limit: if depth_limit == 0 { 1 } else { depth_limit },
        }
    }

    /// Returns the maximum height of the tree.
    #[inline]
    #[must_use]
    pub const fn depth_limit(&self) -> usize {
        self.depth_limit
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_slots_for_bytes_u64() {
        assert_eq!(slots_for_bytes::<u64>(512), (512 - NODE_HEADER_BYTES) / 8);
    }

    #[rstest]
    fn test_slots_for_bytes_clamps_small_budgets() {
        assert_eq!(slots_for_bytes::<[u8; 256]>(512), MIN_NODE_CAPACITY);
    }

    #[rstest]
    fn test_slots_for_bytes_zero_sized() {
        assert_eq!(slots_for_bytes::<()>(512), MAX_NODE_CAPACITY);
    }

    #[rstest]
    fn test_internal_slots_account_for_summary() {
        let without = internal_slots_for_bytes::<()>(512);
        let with_key = internal_slots_for_bytes::<u64>(512);
        assert!(with_key < without);
    }

    #[rstest]
    #[case(4, 2)]
    #[case(5, 2)]
    #[case(64, 32)]
    fn test_min_occupancy(#[case] capacity: usize, #[case] expected: usize) {
        assert_eq!(min_occupancy(capacity), expected);
    }

    #[rstest]
    fn test_max_elements() {
        assert_eq!(max_elements(4, 4, 1), 4);
        assert_eq!(max_elements(4, 4, 3), 64);
        assert_eq!(max_elements(64, 64, 64), usize::MAX);
    }

    #[rstest]
    fn test_depth_limit_floor() {
        assert_eq!(TreeConfig::new().with_depth_limit(0).depth_limit(), 1);
        assert_eq!(TreeConfig::default().depth_limit(), DEFAULT_DEPTH_LIMIT);
    }
}
