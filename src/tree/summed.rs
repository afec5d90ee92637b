//! Prefix sums for [`Summed`] trees.

use crate::error::{Result, TreeError};
use crate::iterator::Cursor;
use crate::node::Node;
use crate::ownership::OwnershipPolicy;
use crate::policy::{KeyExtractor, SumSearch, Summable, Summed};

use super::BppTree;

impl<T, X, S, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, Summed<X>, O, LEAF, INTERNAL>
where
    X: KeyExtractor<T, Key = S>,
    S: Summable,
    O: OwnershipPolicy,
{
    /// Total of every element; zero for an empty tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn sum(&self) -> S {
        if self.is_empty() {
            S::default()
        } else {
            self.root.summary(&self.policy)
        }
    }

    /// Total of the elements before `cursor`.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] for a cursor of another version,
    /// [`TreeError::IndexOutOfBounds`] for a cursor past the end.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::{Persistent, Summed};
    ///
    /// let tree: Persistent<u64, Summed> = (1..=4).collect();
    /// let cursor = tree.cursor_front().advanced(2);
    /// assert_eq!(tree.sum_exclusive(&cursor), Ok(3));
    /// assert_eq!(tree.sum_inclusive(&cursor), Ok(6));
    /// assert_eq!(tree.sum_exclusive(&tree.cursor_end()), Ok(10));
    /// ```
    pub fn sum_exclusive(&self, cursor: &Cursor) -> Result<S> {
        self.check_cursor(cursor)?;
        self.check_index(cursor.position(), self.length + 1)?;
        Ok(self.prefix_sum(cursor.position()))
    }

    /// Total of the elements up to and including the one at `cursor`.
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] for a cursor of another version,
    /// [`TreeError::IndexOutOfBounds`] for a cursor at or past the end.
    pub fn sum_inclusive(&self, cursor: &Cursor) -> Result<S> {
        self.check_cursor(cursor)?;
        self.check_index(cursor.position(), self.length)?;
        Ok(self.prefix_sum(cursor.position() + 1))
    }

    /// Total of the elements from `first` up to but excluding `last`.
    ///
    /// # Errors
    ///
    /// As [`sum_exclusive`](Self::sum_exclusive) for either cursor, and
    /// [`TreeError::InvalidRange`] when `last` precedes `first`.
    pub fn sum_between(&self, first: &Cursor, last: &Cursor) -> Result<S> {
        let before = self.sum_exclusive(first)?;
        let through = self.sum_exclusive(last)?;
        if last.position() < first.position() {
            return Err(TreeError::InvalidRange {
                start: first.position(),
                end: last.position(),
            });
        }
        Ok(through - before)
    }

    /// Cursor to the first element at which the running total is not less
    /// than `target`, or the end cursor when the whole tree totals less.
    ///
    /// With non-negative quantities the running total never decreases, so
    /// this is the lower bound of `target` among the prefix sums.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn sum_lower_bound(&self, target: S) -> Cursor {
        let (_, _, position) = self.locate(SumSearch::new(target));
        Cursor::new(position, self.version)
    }

    /// Total of the first `position` elements, `position <= len`.
    fn prefix_sum(&self, position: usize) -> S {
        let mut total = S::default();
        let mut remaining = position;
        let mut node: &Node<T, Summed<X>, LEAF, INTERNAL> = &self.root;
        loop {
            match node {
                Node::Leaf(leaf) => {
                    return leaf.values[..remaining]
                        .iter()
                        .fold(total, |sum, value| sum + self.policy.quantity(value).clone());
                }
                Node::Internal(internal) => {
                    let last = internal.entries.len() - 1;
                    let mut slot = 0;
                    while slot < last && internal.entries[slot].count <= remaining {
                        total = total + internal.entries[slot].summary.clone();
                        remaining -= internal.entries[slot].count;
                        slot += 1;
                    }
                    node = &internal.entries[slot].node;
                }
            }
        }
    }
}
