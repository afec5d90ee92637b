//! In-order traversal.
//!
//! [`Iter`] borrows a tree handle and walks its leaves in order. It caches
//! the current leaf and the path of internal nodes above it, so each step is
//! amortized O(1) rather than a fresh descent. Because it borrows the handle,
//! the tree cannot change underneath it; iterating a persistent snapshot
//! therefore never observes updates made through derived handles.
//!
//! [`Cursor`] is the detached counterpart: a position plus the [`Version`] of
//! the handle it was taken from. It holds no borrow, so it can be kept across
//! updates, and a handle rejects it with
//! [`TreeError::StaleCursor`](crate::TreeError::StaleCursor) once the
//! handle's version has moved on.

use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::node::{ChildEntry, Node, NodeRef};
use crate::ownership::Version;
use crate::policy::RoutingPolicy;

// =============================================================================
// Cursor
// =============================================================================

/// A position in one particular version of a tree.
///
/// # Examples
///
/// ```rust
/// use bpptree::IndexedTree;
///
/// let tree: IndexedTree<char> = "abcd".chars().collect();
/// let cursor = tree.cursor_front().advanced(2);
/// assert_eq!(tree.get_at(&cursor), Ok(&'c'));
/// assert_eq!(tree.order(&cursor), Ok(2));
///
/// let updated = tree.emplace_front('z');
/// assert!(updated.get_at(&cursor).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    position: usize,
    version: Version,
}

impl Cursor {
    pub(crate) const fn new(position: usize, version: Version) -> Self {
        Self { position, version }
    }

    /// Position of the element the cursor designates.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Version of the handle the cursor was taken from.
    #[inline]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Moves the cursor `steps` elements towards the back.
    #[inline]
    #[must_use]
    pub const fn advanced(self, steps: usize) -> Self {
        Self {
            position: self.position.saturating_add(steps),
            version: self.version,
        }
    }

    /// Moves the cursor `steps` elements towards the front, stopping at 0.
    #[inline]
    #[must_use]
    pub const fn retreated(self, steps: usize) -> Self {
        Self {
            position: self.position.saturating_sub(steps),
            version: self.version,
        }
    }
}

// =============================================================================
// Leaf Path
// =============================================================================

struct Frame<'a, T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> {
    entries: &'a [ChildEntry<T, P, LEAF, INTERNAL>],
    slot: usize,
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> Clone
    for Frame<'_, T, P, LEAF, INTERNAL>
{
    fn clone(&self) -> Self {
        Self {
            entries: self.entries,
            slot: self.slot,
        }
    }
}

/// Root-to-leaf path to one slot.
struct LeafPath<'a, T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> {
    frames: SmallVec<[Frame<'a, T, P, LEAF, INTERNAL>; 8]>,
    values: &'a [T],
    slot: usize,
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> Clone
    for LeafPath<'_, T, P, LEAF, INTERNAL>
{
    fn clone(&self) -> Self {
        Self {
            frames: self.frames.clone(),
            values: self.values,
            slot: self.slot,
        }
    }
}

impl<'a, T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize>
    LeafPath<'a, T, P, LEAF, INTERNAL>
{
    /// Path to the element at `position`, or to the end of the last leaf when
    /// `position` is the length.
    fn seek(root: &'a NodeRef<T, P, LEAF, INTERNAL>, position: usize) -> Self {
        let mut frames = SmallVec::new();
        let mut remaining = position;
        let mut node: &'a Node<T, P, LEAF, INTERNAL> = root;
        loop {
            match node {
                Node::Leaf(leaf) => {
                    return Self {
                        frames,
                        values: &leaf.values,
                        slot: remaining,
                    };
                }
                Node::Internal(internal) => {
                    let entries: &'a [ChildEntry<T, P, LEAF, INTERNAL>] = &internal.entries;
                    let mut slot = 0;
                    while slot + 1 < entries.len() && entries[slot].count <= remaining {
                        remaining -= entries[slot].count;
                        slot += 1;
                    }
                    frames.push(Frame { entries, slot });
                    node = &entries[slot].node;
                }
            }
        }
    }

    /// Descends from `node` along its first (`back == false`) or last child.
    fn descend(&mut self, mut node: &'a Node<T, P, LEAF, INTERNAL>, back: bool) {
        loop {
            match node {
                Node::Leaf(leaf) => {
                    self.values = &leaf.values;
                    self.slot = if back { leaf.values.len().saturating_sub(1) } else { 0 };
                    return;
                }
                Node::Internal(internal) => {
                    let entries: &'a [ChildEntry<T, P, LEAF, INTERNAL>] = &internal.entries;
                    let slot = if back { entries.len() - 1 } else { 0 };
                    self.frames.push(Frame { entries, slot });
                    node = &entries[slot].node;
                }
            }
        }
    }

    fn advance(&mut self) {
        self.slot += 1;
        if self.slot < self.values.len() {
            return;
        }
        while let Some(frame) = self.frames.last_mut() {
            if frame.slot + 1 < frame.entries.len() {
                frame.slot += 1;
                let entries = frame.entries;
                let next: &'a Node<T, P, LEAF, INTERNAL> = &entries[frame.slot].node;
                self.descend(next, false);
                return;
            }
            self.frames.pop();
        }
    }

    fn retreat(&mut self) {
        if self.slot > 0 {
            self.slot -= 1;
            return;
        }
        while let Some(frame) = self.frames.last_mut() {
            if frame.slot > 0 {
                frame.slot -= 1;
                let entries = frame.entries;
                let previous: &'a Node<T, P, LEAF, INTERNAL> = &entries[frame.slot].node;
                self.descend(previous, true);
                return;
            }
            self.frames.pop();
        }
    }

    fn current(&self) -> &'a T {
        &self.values[self.slot]
    }
}

// =============================================================================
// Iter
// =============================================================================

/// Borrowing in-order iterator over a tree.
///
/// Created by [`BppTree::iter`](crate::BppTree::iter) and
/// [`BppTree::iter_from`](crate::BppTree::iter_from).
pub struct Iter<'a, T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> {
    front: LeafPath<'a, T, P, LEAF, INTERNAL>,
    back: LeafPath<'a, T, P, LEAF, INTERNAL>,
    position: usize,
    remaining: usize,
}

impl<'a, T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize>
    Iter<'a, T, P, LEAF, INTERNAL>
{
    /// Iterates `root`, a tree of `length` elements, from `start` onwards.
    pub(crate) fn new(root: &'a NodeRef<T, P, LEAF, INTERNAL>, length: usize, start: usize) -> Self {
        let start = start.min(length);
        Self {
            front: LeafPath::seek(root, start),
            back: LeafPath::seek(root, length.saturating_sub(1)),
            position: start,
            remaining: length - start,
        }
    }

    /// Position of the element the next call to [`Iterator::next`] yields.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> Clone
    for Iter<'_, T, P, LEAF, INTERNAL>
{
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
            position: self.position,
            remaining: self.remaining,
        }
    }
}

impl<'a, T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> Iterator
    for Iter<'a, T, P, LEAF, INTERNAL>
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.front.current();
        self.remaining -= 1;
        self.position += 1;
        if self.remaining > 0 {
            self.front.advance();
        }
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> DoubleEndedIterator
    for Iter<'_, T, P, LEAF, INTERNAL>
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.back.current();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.back.retreat();
        }
        Some(item)
    }
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> ExactSizeIterator
    for Iter<'_, T, P, LEAF, INTERNAL>
{
}

impl<T, P: RoutingPolicy<T>, const LEAF: usize, const INTERNAL: usize> FusedIterator
    for Iter<'_, T, P, LEAF, INTERNAL>
{
}
