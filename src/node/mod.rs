//! Tree nodes and the copy-on-write rule that governs them.
//!
//! A tree is made of [`Node`]s shared through [`NodeRef`]. Leaves hold the
//! values; internal nodes hold [`ChildEntry`]s, each pairing a child with the
//! number of elements below it and the policy summary of that subtree.
//!
//! Every node records the [`OwnerId`] of the session that created it.
//! [`make_mut`] is the only way the mutation engine obtains `&mut Node`: it
//! hands out the node in place when the tag matches the session and nothing
//! else references the node, and otherwise installs a retagged copy.

mod internal;
mod leaf;

pub(crate) use internal::InternalNode;
pub(crate) use leaf::LeafNode;

use crate::array::UninitializedArray;
use crate::config::min_occupancy;
use crate::ownership::{OwnerId, ReferenceCounter};
use crate::policy::RoutingPolicy;

/// Shared reference to a node.
pub(crate) type NodeRef<T, P, const LEAF: usize, const INTERNAL: usize> =
    ReferenceCounter<Node<T, P, LEAF, INTERNAL>>;

/// A child reference together with the metadata routing needs.
pub(crate) struct ChildEntry<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> {
    pub(crate) node: NodeRef<T, P, LEAF, INTERNAL>,
    /// Number of values in the subtree.
    pub(crate) count: usize,
    pub(crate) summary: P::Summary,
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize>
    ChildEntry<T, P, LEAF, INTERNAL>
{
    /// Wraps a non-empty node, computing its count and summary.
    pub(crate) fn new(node: NodeRef<T, P, LEAF, INTERNAL>, policy: &P) -> Self {
        let count = node.count();
        let summary = node.summary(policy);
        Self {
            node,
            count,
            summary,
        }
    }

    /// Recomputes count and summary after the child changed.
    pub(crate) fn refresh(&mut self, policy: &P) {
        self.count = self.node.count();
        self.summary = self.node.summary(policy);
    }
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> Clone
    for ChildEntry<T, P, LEAF, INTERNAL>
{
    fn clone(&self) -> Self {
        Self {
            node: ReferenceCounter::clone(&self.node),
            count: self.count,
            summary: self.summary.clone(),
        }
    }
}

/// A leaf or an internal node.
pub(crate) enum Node<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> {
    Leaf(LeafNode<T, LEAF>),
    Internal(InternalNode<T, P, LEAF, INTERNAL>),
}

impl<T: Clone, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> Clone
    for Node<T, P, LEAF, INTERNAL>
{
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(leaf) => Self::Leaf(leaf.clone()),
            Self::Internal(internal) => Self::Internal(internal.clone()),
        }
    }
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> Node<T, P, LEAF, INTERNAL> {
    /// An empty leaf, the root of an empty tree.
    pub(crate) fn empty(owner: OwnerId) -> Self {
        Self::Leaf(LeafNode::new(owner))
    }

    pub(crate) fn owner(&self) -> OwnerId {
        match self {
            Self::Leaf(leaf) => leaf.owner,
            Self::Internal(internal) => internal.owner,
        }
    }

    fn set_owner(&mut self, owner: OwnerId) {
        match self {
            Self::Leaf(leaf) => leaf.owner = owner,
            Self::Internal(internal) => internal.owner = owner,
        }
    }

    /// Number of occupied slots (values or children).
    pub(crate) fn occupancy(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.values.len(),
            Self::Internal(internal) => internal.entries.len(),
        }
    }

    pub(crate) fn min_occupancy(&self) -> usize {
        match self {
            Self::Leaf(_) => LeafNode::<T, LEAF>::MIN_OCCUPANCY,
            Self::Internal(_) => InternalNode::<T, P, LEAF, INTERNAL>::MIN_OCCUPANCY,
        }
    }

    pub(crate) fn is_underfull(&self) -> bool {
        self.occupancy() < self.min_occupancy()
    }

    pub(crate) fn is_full(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.values.is_full(),
            Self::Internal(internal) => internal.entries.is_full(),
        }
    }

    /// Number of values in the subtree.
    pub(crate) fn count(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.values.len(),
            Self::Internal(internal) => internal.count(),
        }
    }

    /// Summary of a non-empty subtree.
    pub(crate) fn summary(&self, policy: &P) -> P::Summary {
        match self {
            Self::Leaf(leaf) => policy.summarize(&leaf.values),
            Self::Internal(internal) => internal.summary(policy),
        }
    }
}

/// Size of the left half when a full node of `capacity` slots takes one
/// more item at `slot`.
///
/// Appending to the right-most node of a level leaves the left half as full
/// as the minimum occupancy of the right half allows, so sequential appends
/// pack nodes densely.
pub(crate) const fn split_point(capacity: usize, slot: usize, right_most: bool) -> usize {
    if right_most && slot == capacity {
        capacity + 1 - min_occupancy(capacity)
    } else {
        (capacity + 1) / 2
    }
}

/// Emplaces `item` at `slot`, splitting first when `items` is full.
///
/// Returns the upper half when a split happened; `items` keeps the lower
/// half. Both halves end up at or above the minimum occupancy.
pub(crate) fn split_insert<I, const N: usize>(
    items: &mut UninitializedArray<I, N>,
    slot: usize,
    item: I,
    right_most: bool,
) -> Option<UninitializedArray<I, N>> {
    if !items.is_full() {
        items.emplace(slot, item);
        return None;
    }
    let left_len = split_point(N, slot, right_most);
    if slot < left_len {
        let right = items.split_off(left_len - 1);
        items.emplace(slot, item);
        Some(right)
    } else {
        let mut right = items.split_off(left_len);
        right.emplace(slot - left_len, item);
        Some(right)
    }
}

/// Returns the node behind `node` for mutation by the session `owner`.
///
/// The node is reused in place when it already carries `owner` and is not
/// shared; otherwise `node` is redirected to a copy tagged with `owner`. The
/// copy shares all of its children with the original.
pub(crate) fn make_mut<T: Clone, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize>(
    node: &mut NodeRef<T, P, LEAF, INTERNAL>,
    owner: OwnerId,
) -> &mut Node<T, P, LEAF, INTERNAL> {
    let in_place = node.owner() == owner && ReferenceCounter::get_mut(node).is_some();
    if !in_place {
        let mut copy = Node::clone(node);
        copy.set_owner(owner);
        *node = ReferenceCounter::new(copy);
    }
    match ReferenceCounter::get_mut(node) {
        Some(node) => node,
        None => unreachable!("a freshly copied node has a single reference"),
    }
}
