//! Tree handles.
//!
//! [`BppTree`] is a single handle type parameterized by
//! - the element type `T`,
//! - a [`RoutingPolicy`] `P` ([`Indexed`], [`Ordered`](crate::Ordered) or one
//!   of the aggregate personalities),
//! - an [`OwnershipPolicy`] `O` ([`Shared`] for persistent handles,
//!   [`Owned`] for transient ones),
//! - the node capacities `LEAF` and `INTERNAL`.
//!
//! The aliases [`Persistent`], [`Transient`], [`IndexedTree`],
//! [`OrderedMap`] and [`OrderedSet`] name the common combinations.
//!
//! Every handle supports the read operations defined here. Updates live in
//! the personality modules: positional updates for [`Indexed`] and the other
//! positional trees, keyed updates for ordered ones. Summed trees add prefix
//! sums and min/max trees add range extremes. Persistent handles return a new handle from
//! every update; transient handles update in place.

mod extremum;
mod indexed;
mod modify;
mod ordered;
mod persistent;
#[cfg(feature = "serde")]
mod serialization;
mod summed;
mod transient;

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::config::{DEFAULT_INTERNAL_SIZE, DEFAULT_LEAF_SIZE, MIN_NODE_CAPACITY, TreeConfig, max_elements};
use crate::error::{Result, TreeError};
use crate::iterator::{Cursor, Iter};
use crate::node::{InternalNode, LeafNode, Node, NodeRef};
use crate::ownership::{Owned, OwnershipPolicy, ReferenceCounter, Shared, Version};
use crate::policy::{Edge, Finder, Identity, Indexed, Ordered, PairKey, Position, RoutingPolicy};

// =============================================================================
// Handle Type
// =============================================================================

/// A B+ tree handle.
///
/// Values live in leaves of up to `LEAF` elements; internal nodes hold up
/// to `INTERNAL` children and cache the element count and policy summary of
/// each. Nodes are reference counted and shared between every handle derived
/// from the same tree, so cloning a persistent handle is O(1) and an update
/// copies only the root-to-leaf path it touches.
///
/// # Examples
///
/// ```rust
/// use bpptree::IndexedTree;
///
/// let empty: IndexedTree<i32> = IndexedTree::new();
/// let three = empty.emplace_back(5).emplace_back(7).emplace_back(3);
/// let two = three.erase_index(1);
///
/// assert_eq!(two.iter().copied().collect::<Vec<_>>(), vec![5, 3]);
/// assert_eq!(three.iter().copied().collect::<Vec<_>>(), vec![5, 7, 3]);
/// ```
pub struct BppTree<
    T,
    P = Indexed,
    O = Shared,
    const LEAF: usize = DEFAULT_LEAF_SIZE,
    const INTERNAL: usize = DEFAULT_INTERNAL_SIZE,
> where
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    root: NodeRef<T, P, LEAF, INTERNAL>,
    length: usize,
    height: usize,
    config: TreeConfig,
    policy: P,
    version: Version,
    ownership: O,
}

/// A tree whose updates return new handles.
pub type Persistent<
    T,
    P = Indexed,
    const LEAF: usize = DEFAULT_LEAF_SIZE,
    const INTERNAL: usize = DEFAULT_INTERNAL_SIZE,
> = BppTree<T, P, Shared, LEAF, INTERNAL>;

/// A tree whose updates happen in place.
pub type Transient<
    T,
    P = Indexed,
    const LEAF: usize = DEFAULT_LEAF_SIZE,
    const INTERNAL: usize = DEFAULT_INTERNAL_SIZE,
> = BppTree<T, P, Owned, LEAF, INTERNAL>;

/// Persistent sequence addressed by position.
pub type IndexedTree<T> = Persistent<T, Indexed>;

/// Transient sequence addressed by position.
pub type TransientIndexedTree<T> = Transient<T, Indexed>;

/// Persistent sorted map of `(K, V)` entries.
pub type OrderedMap<K, V> = Persistent<(K, V), Ordered<PairKey>>;

/// Transient sorted map of `(K, V)` entries.
pub type TransientOrderedMap<K, V> = Transient<(K, V), Ordered<PairKey>>;

/// Persistent sorted set.
pub type OrderedSet<T> = Persistent<T, Ordered<Identity>>;

/// Transient sorted set.
pub type TransientOrderedSet<T> = Transient<T, Ordered<Identity>>;

// =============================================================================
// Construction
// =============================================================================

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, O, LEAF, INTERNAL>
where
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    const CAPACITY_CHECK: () = assert!(
        LEAF >= MIN_NODE_CAPACITY && INTERNAL >= MIN_NODE_CAPACITY,
        "node capacities must be at least 4"
    );

    /// Creates an empty tree with the given policy and configuration.
    #[must_use]
    pub fn with_policy_and_config(policy: P, config: TreeConfig) -> Self {
        let () = Self::CAPACITY_CHECK;
        let ownership = O::open();
        let root = ReferenceCounter::new(Node::empty(ownership.session_owner()));
        Self {
            root,
            length: 0,
            height: 1,
            config,
            policy,
            version: Version::fresh(),
            ownership,
        }
    }

    /// Creates an empty tree with the given policy.
    #[must_use]
    pub fn with_policy(policy: P) -> Self {
        Self::with_policy_and_config(policy, TreeConfig::default())
    }

    /// Creates an empty tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::OrderedMap;
    ///
    /// let map: OrderedMap<String, u32> = OrderedMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self
    where
        P: Default,
    {
        Self::with_policy(P::default())
    }

    /// Creates an empty tree with the given configuration.
    #[must_use]
    pub fn with_config(config: TreeConfig) -> Self
    where
        P: Default,
    {
        Self::with_policy_and_config(P::default(), config)
    }

    /// Moves the contents into a handle of another discipline.
    ///
    /// The old discipline is closed, so nodes it owned are frozen for the
    /// new handle.
    fn into_discipline<Q: OwnershipPolicy>(self) -> BppTree<T, P, Q, LEAF, INTERNAL> {
        let Self {
            root,
            length,
            height,
            config,
            policy,
            version,
            ownership,
        } = self;
        ownership.close();
        BppTree {
            root,
            length,
            height,
            config,
            policy,
            version,
            ownership: Q::open(),
        }
    }

    /// A handle of another discipline sharing every node with this one.
    fn share<Q: OwnershipPolicy>(&self) -> BppTree<T, P, Q, LEAF, INTERNAL> {
        BppTree {
            root: ReferenceCounter::clone(&self.root),
            length: self.length,
            height: self.height,
            config: self.config,
            policy: self.policy.clone(),
            version: self.version,
            ownership: Q::open(),
        }
    }
}

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> Default for BppTree<T, P, O, LEAF, INTERNAL>
where
    P: RoutingPolicy<T> + Default,
    O: OwnershipPolicy,
{
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Reading
// =============================================================================

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, O, LEAF, INTERNAL>
where
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    /// Returns the number of elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of node levels; a tree whose root is a leaf has depth 1.
    #[inline]
    pub fn depth(&self) -> usize {
        self.height
    }

    /// The configured depth limit.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.config.depth_limit()
    }

    /// Upper bound on the number of elements the tree can hold within its
    /// depth limit: the count of a tree whose nodes are all full.
    ///
    /// Splits leave nodes partly empty, so insertions can be refused well
    /// before this many elements. Appends pack the left half of every split
    /// leaf but still stop short of it.
    #[inline]
    pub fn max_size(&self) -> usize {
        max_elements(LEAF, INTERNAL, self.config.depth_limit())
    }

    #[inline]
    pub fn leaf_capacity(&self) -> usize {
        LEAF
    }

    #[inline]
    pub fn internal_capacity(&self) -> usize {
        INTERNAL
    }

    #[inline]
    pub fn config(&self) -> TreeConfig {
        self.config
    }

    #[inline]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Identity of the current state of this handle.
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether updates through this handle happen in place.
    #[inline]
    pub fn is_transient(&self) -> bool {
        O::IS_TRANSIENT
    }

    /// Returns the first element.
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let (leaf, slot) = self.descend(Edge::Front);
        leaf.values.get(slot)
    }

    /// Returns the last element.
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let (leaf, slot) = self.descend(Edge::Back);
        leaf.values.get(slot)
    }

    /// Returns the element at `position`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [30, 10, 20].into_iter().collect();
    /// assert_eq!(set.at_index(1), Some(&20));
    /// assert_eq!(set.at_index(3), None);
    /// ```
    pub fn at_index(&self, position: usize) -> Option<&T> {
        if position >= self.length {
            return None;
        }
        let (leaf, slot) = self.descend(Position::lookup(position));
        leaf.values.get(slot)
    }

    /// Returns an iterator over all elements in order.
    pub fn iter(&self) -> Iter<'_, T, P, LEAF, INTERNAL> {
        Iter::new(&self.root, self.length, 0)
    }

    /// Returns an iterator starting at `position`.
    ///
    /// A `position` past the end yields an empty iterator.
    pub fn iter_from(&self, position: usize) -> Iter<'_, T, P, LEAF, INTERNAL> {
        Iter::new(&self.root, self.length, position)
    }

    /// Cursor to the first element (or the end of an empty tree).
    pub fn cursor_front(&self) -> Cursor {
        Cursor::new(0, self.version)
    }

    /// Cursor one past the last element.
    pub fn cursor_end(&self) -> Cursor {
        Cursor::new(self.length, self.version)
    }

    /// Cursor to `position`, which may be the length of the tree.
    pub fn cursor_at(&self, position: usize) -> Option<Cursor> {
        (position <= self.length).then(|| Cursor::new(position, self.version))
    }

    /// Absolute position of `cursor`.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] if the cursor was taken from another
    /// version of the tree.
    pub fn order(&self, cursor: &Cursor) -> Result<usize> {
        self.check_cursor(cursor)?;
        Ok(cursor.position())
    }

    /// Element designated by `cursor`.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] for a cursor of another version,
    /// [`TreeError::IndexOutOfBounds`] for a cursor at or past the end.
    pub fn get_at(&self, cursor: &Cursor) -> Result<&T> {
        self.check_cursor(cursor)?;
        self.at_index(cursor.position())
            .ok_or(TreeError::IndexOutOfBounds {
                index: cursor.position(),
                length: self.length,
            })
    }

    /// Iterator starting at `cursor`.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] for a cursor of another version.
    pub fn iter_at(&self, cursor: &Cursor) -> Result<Iter<'_, T, P, LEAF, INTERNAL>> {
        self.check_cursor(cursor)?;
        Ok(self.iter_from(cursor.position()))
    }

    /// Checks every structural invariant of the tree.
    ///
    /// Verifies that all leaves sit at the same depth, that every non-root
    /// node holds at least half its capacity, that cached counts and
    /// summaries match their subtrees, that the root is not an internal node
    /// with a single child, and that adjacent elements are in policy order.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvariantViolation`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let reachable = self.validate_node(&self.root, self.height, true)?;
        if reachable != self.length {
            return Err(violation(format!(
                "length is {} but {reachable} values are reachable",
                self.length
            )));
        }
        let mut values = self.iter();
        if let Some(mut previous) = values.next() {
            for (offset, value) in values.enumerate() {
                if !self.policy.may_precede(previous, value) {
                    return Err(violation(format!("values at {offset} and {} are out of order", offset + 1)));
                }
                previous = value;
            }
        }
        Ok(())
    }

    fn validate_node(&self, node: &Node<T, P, LEAF, INTERNAL>, height: usize, is_root: bool) -> Result<usize> {
        match node {
            Node::Leaf(leaf) => {
                if height != 1 {
                    return Err(violation(format!("leaf found {height} levels above the bottom")));
                }
                if !is_root && leaf.values.len() < LeafNode::<T, LEAF>::MIN_OCCUPANCY {
                    return Err(violation(format!("leaf holds {} values", leaf.values.len())));
                }
                Ok(leaf.values.len())
            }
            Node::Internal(internal) => {
                if height <= 1 {
                    return Err(violation("internal node found at leaf level".to_string()));
                }
                let children = internal.entries.len();
                if is_root && children < 2 {
                    return Err(violation(format!("internal root holds {children} children")));
                }
                if !is_root && children < InternalNode::<T, P, LEAF, INTERNAL>::MIN_OCCUPANCY {
                    return Err(violation(format!("internal node holds {children} children")));
                }
                let mut total = 0;
                for entry in internal.entries.iter() {
                    let count = self.validate_node(&entry.node, height - 1, false)?;
                    if count != entry.count {
                        return Err(violation(format!(
                            "cached count {} differs from subtree count {count}",
                            entry.count
                        )));
                    }
                    let actual = entry.node.summary(&self.policy);
                    if !self.policy.summary_matches(&entry.summary, &actual) {
                        return Err(violation("cached summary is stale".to_string()));
                    }
                    total += count;
                }
                Ok(total)
            }
        }
    }

    /// Read-only descent to a leaf slot.
    fn descend<F: Finder<T, P>>(&self, mut finder: F) -> (&LeafNode<T, LEAF>, usize) {
        let mut node: &Node<T, P, LEAF, INTERNAL> = &self.root;
        loop {
            match node {
                Node::Leaf(leaf) => return (leaf, finder.route_leaf(&self.policy, &leaf.values)),
                Node::Internal(internal) => {
                    let slot = finder.route_internal(&self.policy, &internal.entries);
                    node = &internal.entries[slot].node;
                }
            }
        }
    }

    /// Read-only descent that also reports the absolute position reached.
    fn locate<F: Finder<T, P>>(&self, finder: F) -> (&LeafNode<T, LEAF>, usize, usize) {
        locate_in(&self.root, &self.policy, finder)
    }

    fn check_cursor(&self, cursor: &Cursor) -> Result<()> {
        if cursor.version() == self.version {
            Ok(())
        } else {
            Err(TreeError::StaleCursor)
        }
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<()> {
        if index < bound {
            Ok(())
        } else {
            Err(TreeError::IndexOutOfBounds {
                index,
                length: self.length,
            })
        }
    }
}

/// Descent from `node` reporting the leaf, the slot and the position
/// reached relative to the first value below `node`.
fn locate_in<'a, T, P, F, const LEAF: usize, const INTERNAL: usize>(
    mut node: &'a Node<T, P, LEAF, INTERNAL>,
    policy: &P,
    mut finder: F,
) -> (&'a LeafNode<T, LEAF>, usize, usize)
where
    P: RoutingPolicy<T>,
    F: Finder<T, P>,
{
    let mut position = 0;
    loop {
        match node {
            Node::Leaf(leaf) => {
                let slot = finder.route_leaf(policy, &leaf.values);
                return (leaf, slot, position + slot);
            }
            Node::Internal(internal) => {
                let slot = finder.route_internal(policy, &internal.entries);
                position += internal.entries[..slot].iter().map(|entry| entry.count).sum::<usize>();
                node = &internal.entries[slot].node;
            }
        }
    }
}

fn violation(detail: String) -> TreeError {
    TreeError::InvariantViolation(detail)
}

/// Unwraps the result of a checked operation, panicking with the error's
/// message like the standard collections do.
fn expect_ok<R>(result: Result<R>) -> R {
    match result {
        Ok(value) => value,
        Err(error) => panic!("{error}"),
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl<'a, T, P, O, const LEAF: usize, const INTERNAL: usize> IntoIterator
    for &'a BppTree<T, P, O, LEAF, INTERNAL>
where
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, P, LEAF, INTERNAL>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> fmt::Debug for BppTree<T, P, O, LEAF, INTERNAL>
where
    T: fmt::Debug,
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T, P, O, Q, const LEAF: usize, const INTERNAL: usize> PartialEq<BppTree<T, P, Q, LEAF, INTERNAL>>
    for BppTree<T, P, O, LEAF, INTERNAL>
where
    T: PartialEq,
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
    Q: OwnershipPolicy,
{
    fn eq(&self, other: &BppTree<T, P, Q, LEAF, INTERNAL>) -> bool {
        if self.length != other.length {
            return false;
        }
        if ReferenceCounter::ptr_eq(&self.root, &other.root) {
            return true;
        }
        self.iter().eq(other.iter())
    }
}

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> Eq for BppTree<T, P, O, LEAF, INTERNAL>
where
    T: Eq,
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
{
}

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> Hash for BppTree<T, P, O, LEAF, INTERNAL>
where
    T: Hash,
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for value in self {
            value.hash(state);
        }
    }
}
