//! Routing policies: how a descent picks a child and a slot.
//!
//! Every internal node keeps, for each child, the number of elements below
//! it and a policy-defined [`Summary`](RoutingPolicy::Summary) of that
//! subtree. The element counts give every tree positional access; the
//! summary is what a personality adds on top:
//!
//! - [`Indexed`]: no summary; the tree is a sequence addressed by position.
//! - [`Ordered`]: the largest key of the subtree; the tree is a sorted map or
//!   set addressed by key.
//! - [`Summed`]: the total of the subtree; a sequence with prefix sums.
//! - [`Min`] and [`Max`]: the extreme key of the subtree; a sequence with
//!   range minimum and maximum queries.
//!
//! Every personality but [`Ordered`] is [`Positional`]: its trees are edited
//! by index.
//!
//! A descent is driven by a [`Finder`], which chooses the child slot at each
//! internal node and finally the slot inside the leaf.

mod extremum;
mod indexed;
mod ordered;
mod summed;

pub use extremum::{Max, Min};
pub use indexed::Indexed;
pub use ordered::{
    Comparator, Identity, KeyExtractor, NaturalOrder, Ordered, PairKey, ReverseOrder, SearchMode,
};
pub use summed::{Summable, Summed};

pub(crate) use extremum::{ExtremeSearch, Extremum};
pub(crate) use ordered::KeySearch;
pub(crate) use summed::SumSearch;

use crate::node::ChildEntry;

/// Strategy deciding what per-child metadata internal nodes cache.
///
/// A policy is a value held by the tree handle and cloned into every handle
/// derived from it, so it can carry configuration such as a comparator.
pub trait RoutingPolicy<T>: Clone {
    /// Aggregate cached next to every child reference.
    type Summary: Clone;

    /// Summary of a non-empty run of leaf values.
    fn summarize(&self, values: &[T]) -> Self::Summary;

    /// Summary of two adjacent subtrees, `left` before `right`.
    fn combine(&self, left: Self::Summary, right: &Self::Summary) -> Self::Summary;

    /// Whether a cached summary still describes its subtree.
    ///
    /// Used by [`BppTree::validate`](crate::BppTree::validate).
    fn summary_matches(&self, _cached: &Self::Summary, _actual: &Self::Summary) -> bool {
        true
    }

    /// Whether `left` may directly precede `right` in a tree.
    ///
    /// Used by [`BppTree::validate`](crate::BppTree::validate).
    fn may_precede(&self, _left: &T, _right: &T) -> bool {
        true
    }
}

/// Marks the personalities whose trees are sequences edited by position.
///
/// Their values carry no ordering constraint, so inserting at an index,
/// pushing at either end and collecting from an iterator are always valid.
pub trait Positional {}

/// Search strategy applied at each level of a descent.
pub(crate) trait Finder<T, P: RoutingPolicy<T>> {
    /// Picks the child to descend into among a node's `entries`.
    fn route_internal<const LEAF: usize, const INTERNAL: usize>(
        &mut self,
        policy: &P,
        entries: &[ChildEntry<T, P, LEAF, INTERNAL>],
    ) -> usize;

    /// Picks the slot inside the leaf reached by the descent.
    fn route_leaf(&mut self, policy: &P, values: &[T]) -> usize;
}

/// Routes by absolute position using the cached element counts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Position {
    remaining: usize,
    insertion: bool,
}

impl Position {
    /// Routes to the slot an element inserted at `position` would occupy.
    ///
    /// A position on the boundary between two subtrees goes to the end of
    /// the left one.
    pub(crate) const fn insertion(position: usize) -> Self {
        Self {
            remaining: position,
            insertion: true,
        }
    }

    /// Routes to the element currently at `position`.
    pub(crate) const fn lookup(position: usize) -> Self {
        Self {
            remaining: position,
            insertion: false,
        }
    }
}

impl<T, P: RoutingPolicy<T>> Finder<T, P> for Position {
    fn route_internal<const LEAF: usize, const INTERNAL: usize>(
        &mut self,
        _policy: &P,
        entries: &[ChildEntry<T, P, LEAF, INTERNAL>],
    ) -> usize {
        let last = entries.len() - 1;
        let mut slot = 0;
        while slot < last {
            let count = entries[slot].count;
            let passes = if self.insertion {
                count < self.remaining
            } else {
                count <= self.remaining
            };
            if !passes {
                break;
            }
            self.remaining -= count;
            slot += 1;
        }
        slot
    }

    fn route_leaf(&mut self, _policy: &P, _values: &[T]) -> usize {
        self.remaining
    }
}

/// Routes straight down one side of the tree without consulting counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edge {
    /// The first element.
    Front,
    /// The last element.
    Back,
    /// The slot after the last element (appending).
    PastBack,
}

impl<T, P: RoutingPolicy<T>> Finder<T, P> for Edge {
    fn route_internal<const LEAF: usize, const INTERNAL: usize>(
        &mut self,
        _policy: &P,
        entries: &[ChildEntry<T, P, LEAF, INTERNAL>],
    ) -> usize {
        match self {
            Self::Front => 0,
            Self::Back | Self::PastBack => entries.len() - 1,
        }
    }

    fn route_leaf(&mut self, _policy: &P, values: &[T]) -> usize {
        match self {
            Self::Front => 0,
            Self::Back => values.len() - 1,
            Self::PastBack => values.len(),
        }
    }
}
