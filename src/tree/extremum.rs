//! Range minimum and maximum queries for [`Min`] and [`Max`] trees.
//!
//! A range between two cursors is covered by O(log n) whole subtrees, whose
//! cached summaries compete, plus the loose values at its two ends. The
//! winning subtree is then searched for the first element holding the
//! winning key.

use crate::error::{Result, TreeError};
use crate::iterator::Cursor;
use crate::node::Node;
use crate::ownership::OwnershipPolicy;
use crate::policy::{Comparator, ExtremeSearch, Extremum, KeyExtractor, Max, Min};

use super::{BppTree, locate_in};

/// Best contender seen so far while scanning a range.
enum Contender<'a, T, P: Extremum<T>, const LEAF: usize, const INTERNAL: usize> {
    Value {
        position: usize,
        key: &'a P::Summary,
    },
    Subtree {
        offset: usize,
        node: &'a Node<T, P, LEAF, INTERNAL>,
        key: &'a P::Summary,
    },
}

impl<'a, T, P: Extremum<T>, const LEAF: usize, const INTERNAL: usize> Contender<'a, T, P, LEAF, INTERNAL> {
    const fn key(&self) -> &'a P::Summary {
        match self {
            Self::Value { key, .. } | Self::Subtree { key, .. } => *key,
        }
    }

    /// Absolute position of the first element holding the key.
    fn position(&self, policy: &P) -> usize {
        match self {
            Self::Value { position, .. } => *position,
            Self::Subtree { offset, node, .. } => {
                let (_, _, position) = locate_in(*node, policy, ExtremeSearch);
                offset + position
            }
        }
    }
}

/// Replaces `best` only with a strictly better contender, so the earliest
/// of equal keys wins a front to back scan.
fn challenge<'a, T, P, const LEAF: usize, const INTERNAL: usize>(
    policy: &P,
    best: &mut Option<Contender<'a, T, P, LEAF, INTERNAL>>,
    contender: Contender<'a, T, P, LEAF, INTERNAL>,
) where
    P: Extremum<T>,
{
    let wins = match best {
        Some(incumbent) => policy.ahead(contender.key(), incumbent.key()),
        None => true,
    };
    if wins {
        *best = Some(contender);
    }
}

/// Scans `[start, end)` below `node`, whose first value sits at `offset`.
fn scan<'a, T, P, const LEAF: usize, const INTERNAL: usize>(
    policy: &P,
    node: &'a Node<T, P, LEAF, INTERNAL>,
    offset: usize,
    (start, end): (usize, usize),
    best: &mut Option<Contender<'a, T, P, LEAF, INTERNAL>>,
) where
    P: Extremum<T>,
{
    match node {
        Node::Leaf(leaf) => {
            let first = start.saturating_sub(offset);
            let last = (end - offset).min(leaf.values.len());
            for (slot, value) in leaf.values[first..last].iter().enumerate() {
                let contender = Contender::Value {
                    position: offset + first + slot,
                    key: policy.rank(value),
                };
                challenge(policy, best, contender);
            }
        }
        Node::Internal(internal) => {
            let mut child_start = offset;
            for entry in internal.entries.iter() {
                let child: &'a Node<T, P, LEAF, INTERNAL> = &entry.node;
                let child_end = child_start + entry.count;
                if child_end <= start {
                    child_start = child_end;
                    continue;
                }
                if child_start >= end {
                    break;
                }
                if start <= child_start && child_end <= end {
                    let contender = Contender::Subtree {
                        offset: child_start,
                        node: child,
                        key: &entry.summary,
                    };
                    challenge(policy, best, contender);
                } else {
                    scan(policy, child, child_start, (start, end), best);
                }
                child_start = child_end;
            }
        }
    }
}

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, O, LEAF, INTERNAL>
where
    P: Extremum<T>,
    O: OwnershipPolicy,
{
    /// Contender for the extreme of `[start, end)`, `start <= end <= len`.
    fn contend(&self, start: usize, end: usize) -> Option<Contender<'_, T, P, LEAF, INTERNAL>> {
        let mut best = None;
        if start < end {
            let root: &Node<T, P, LEAF, INTERNAL> = &self.root;
            scan(&self.policy, root, 0, (start, end), &mut best);
        }
        best
    }

    fn checked_range(&self, first: &Cursor, last: &Cursor) -> Result<(usize, usize)> {
        self.check_cursor(first)?;
        self.check_cursor(last)?;
        self.check_index(first.position(), self.length + 1)?;
        self.check_index(last.position(), self.length + 1)?;
        if last.position() < first.position() {
            return Err(TreeError::InvalidRange {
                start: first.position(),
                end: last.position(),
            });
        }
        Ok((first.position(), last.position()))
    }

    fn extreme(&self) -> Option<&P::Summary> {
        self.contend(0, self.length).map(|contender| contender.key())
    }

    fn extreme_element(&self) -> Option<Cursor> {
        self.contend(0, self.length)
            .map(|contender| Cursor::new(contender.position(&self.policy), self.version))
    }

    fn extreme_between(&self, first: &Cursor, last: &Cursor) -> Result<Option<&P::Summary>> {
        let (start, end) = self.checked_range(first, last)?;
        Ok(self.contend(start, end).map(|contender| contender.key()))
    }

    fn extreme_element_between(&self, first: &Cursor, last: &Cursor) -> Result<Option<Cursor>> {
        let (start, end) = self.checked_range(first, last)?;
        Ok(self
            .contend(start, end)
            .map(|contender| Cursor::new(contender.position(&self.policy), self.version)))
    }
}

impl<T, X, C, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, Min<X, C>, O, LEAF, INTERNAL>
where
    X: KeyExtractor<T>,
    X::Key: Clone,
    C: Comparator<X::Key>,
    O: OwnershipPolicy,
{
    /// Smallest key in the tree.
    pub fn min(&self) -> Option<&X::Key> {
        self.extreme()
    }

    /// Cursor to the first element holding the smallest key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn min_element(&self) -> Option<Cursor> {
        self.extreme_element()
    }

    /// Smallest key among the elements from `first` up to but excluding
    /// `last`; `None` for an empty range.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] for a cursor of another version,
    /// [`TreeError::IndexOutOfBounds`] for a cursor past the end and
    /// [`TreeError::InvalidRange`] when `last` precedes `first`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::{Min, Persistent};
    ///
    /// let tree: Persistent<i32, Min> = [9, 4, 6, 1, 8].into_iter().collect();
    /// let first = tree.cursor_at(1).unwrap();
    /// let last = tree.cursor_at(3).unwrap();
    /// assert_eq!(tree.min_between(&first, &last), Ok(Some(&4)));
    /// assert_eq!(tree.min_between(&last, &last), Ok(None));
    /// ```
    pub fn min_between(&self, first: &Cursor, last: &Cursor) -> Result<Option<&X::Key>> {
        self.extreme_between(first, last)
    }

    /// Cursor to the first element holding the smallest key of a range.
    ///
    /// # Errors
    ///
    /// As [`min_between`](Self::min_between).
    pub fn min_element_between(&self, first: &Cursor, last: &Cursor) -> Result<Option<Cursor>> {
        self.extreme_element_between(first, last)
    }
}

impl<T, X, C, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, Max<X, C>, O, LEAF, INTERNAL>
where
    X: KeyExtractor<T>,
    X::Key: Clone,
    C: Comparator<X::Key>,
    O: OwnershipPolicy,
{
    /// Largest key in the tree.
    pub fn max(&self) -> Option<&X::Key> {
        self.extreme()
    }

    /// Cursor to the first element holding the largest key.
    pub fn max_element(&self) -> Option<Cursor> {
        self.extreme_element()
    }

    /// Largest key among the elements from `first` up to but excluding
    /// `last`; `None` for an empty range.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] for a cursor of another version,
    /// [`TreeError::IndexOutOfBounds`] for a cursor past the end and
    /// [`TreeError::InvalidRange`] when `last` precedes `first`.
    pub fn max_between(&self, first: &Cursor, last: &Cursor) -> Result<Option<&X::Key>> {
        self.extreme_between(first, last)
    }

    /// Cursor to the first element holding the largest key of a range.
    ///
    /// # Errors
    ///
    /// As [`max_between`](Self::max_between).
    pub fn max_element_between(&self, first: &Cursor, last: &Cursor) -> Result<Option<Cursor>> {
        self.extreme_element_between(first, last)
    }
}
