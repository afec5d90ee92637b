//! Positional updates for [`Positional`] trees: [`Indexed`] sequences and
//! the aggregate personalities ([`Summed`], [`Min`], [`Max`]).

#[cfg(doc)]
use crate::error::TreeError;
use crate::error::Result;
use crate::iterator::Cursor;
use crate::ownership::{Owned, OwnershipPolicy, Shared};
use crate::policy::{Edge, Position, Positional, RoutingPolicy};
#[cfg(doc)]
use crate::policy::{Indexed, Max, Min, Summed};

use super::{BppTree, expect_ok};

// =============================================================================
// Shared by Both Disciplines
// =============================================================================

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, O, LEAF, INTERNAL>
where
    P: Positional + RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    /// Returns the element at `index`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::IndexedTree;
    ///
    /// let tree: IndexedTree<i32> = (10..15).collect();
    /// assert_eq!(tree.get(2), Some(&12));
    /// assert_eq!(tree.get(5), None);
    /// ```
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.at_index(index)
    }
}

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, O, LEAF, INTERNAL>
where
    T: Clone,
    P: Positional + RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    fn checked_insert_index(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index, self.length + 1)?;
        if index == self.length {
            self.insert_with(Edge::PastBack, value)
        } else {
            self.insert_with(Position::insertion(index), value)
        }
    }

    fn checked_assign_index(&mut self, index: usize, value: T) -> Result<T> {
        self.check_index(index, self.length)?;
        Ok(self.assign_with(Position::lookup(index), value))
    }

    fn checked_update_index<F>(&mut self, index: usize, updater: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        self.check_index(index, self.length)?;
        self.modify_with(Position::lookup(index), |slot| *slot = updater(slot));
        Ok(())
    }

    fn checked_erase_index(&mut self, index: usize) -> Result<T> {
        self.check_index(index, self.length)?;
        Ok(self.erase_with(Position::lookup(index)))
    }

    fn checked_pop(&mut self, edge: Edge) -> Option<T> {
        (!self.is_empty()).then(|| self.erase_with(edge))
    }

    fn checked_insert_at(&mut self, cursor: &Cursor, value: T) -> Result<Cursor> {
        self.check_cursor(cursor)?;
        self.checked_insert_index(cursor.position(), value)?;
        Ok(Cursor::new(cursor.position(), self.version))
    }

    fn checked_assign_at(&mut self, cursor: &Cursor, value: T) -> Result<(Cursor, T)> {
        self.check_cursor(cursor)?;
        let previous = self.checked_assign_index(cursor.position(), value)?;
        Ok((Cursor::new(cursor.position(), self.version), previous))
    }

    fn checked_erase_at(&mut self, cursor: &Cursor) -> Result<(Cursor, T)> {
        self.check_cursor(cursor)?;
        let removed = self.checked_erase_index(cursor.position())?;
        Ok((Cursor::new(cursor.position(), self.version), removed))
    }
}

// =============================================================================
// Persistent
// =============================================================================

impl<T, P, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, Shared, LEAF, INTERNAL>
where
    T: Clone,
    P: Positional + RoutingPolicy<T>,
{
    /// Returns a new tree with `value` inserted before position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len` or the tree is at its depth limit.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::IndexedTree;
    ///
    /// let tree: IndexedTree<i32> = [1, 3].into_iter().collect();
    /// let inserted = tree.insert_index(1, 2);
    /// assert_eq!(inserted.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    /// assert_eq!(tree.len(), 2);
    /// ```
    #[must_use]
    pub fn insert_index(&self, index: usize, value: T) -> Self {
        expect_ok(self.try_insert_index(index, value))
    }

    /// Checked [`insert_index`](Self::insert_index).
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfBounds`] or [`TreeError::DepthLimitExceeded`].
    pub fn try_insert_index(&self, index: usize, value: T) -> Result<Self> {
        let mut next = self.clone();
        next.checked_insert_index(index, value)?;
        Ok(next)
    }

    /// Returns a new tree with the element at `index` replaced by `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[must_use]
    pub fn assign_index(&self, index: usize, value: T) -> Self {
        expect_ok(self.try_assign_index(index, value))
    }

    /// Checked [`assign_index`](Self::assign_index).
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfBounds`] if `index >= len`.
    pub fn try_assign_index(&self, index: usize, value: T) -> Result<Self> {
        let mut next = self.clone();
        next.checked_assign_index(index, value)?;
        Ok(next)
    }

    /// Returns a new tree with the element at `index` replaced by
    /// `updater(&element)`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::IndexedTree;
    ///
    /// let tree: IndexedTree<i32> = (1..=3).collect();
    /// let doubled = tree.update_index(1, |value| value * 2);
    /// assert_eq!(doubled.get(1), Some(&4));
    /// ```
    #[must_use]
    pub fn update_index<F>(&self, index: usize, updater: F) -> Self
    where
        F: FnOnce(&T) -> T,
    {
        expect_ok(self.try_update_index(index, updater))
    }

    /// Checked [`update_index`](Self::update_index).
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfBounds`] if `index >= len`.
    pub fn try_update_index<F>(&self, index: usize, updater: F) -> Result<Self>
    where
        F: FnOnce(&T) -> T,
    {
        let mut next = self.clone();
        next.checked_update_index(index, updater)?;
        Ok(next)
    }

    /// Returns a new tree without the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn erase_index(&self, index: usize) -> Self {
        expect_ok(self.try_erase_index(index))
    }

    /// Checked [`erase_index`](Self::erase_index).
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfBounds`] if `index >= len`.
    pub fn try_erase_index(&self, index: usize) -> Result<Self> {
        let mut next = self.clone();
        next.checked_erase_index(index)?;
        Ok(next)
    }

    /// Returns a new tree with `value` prepended.
    ///
    /// # Panics
    ///
    /// Panics if the tree is at its depth limit.
    #[must_use]
    pub fn emplace_front(&self, value: T) -> Self {
        expect_ok(self.try_emplace_front(value))
    }

    /// Checked [`emplace_front`](Self::emplace_front).
    ///
    /// # Errors
    ///
    /// [`TreeError::DepthLimitExceeded`].
    pub fn try_emplace_front(&self, value: T) -> Result<Self> {
        let mut next = self.clone();
        next.insert_with(Edge::Front, value)?;
        Ok(next)
    }

    /// Returns a new tree with `value` appended.
    ///
    /// Appends descend along the right edge without consulting counts and
    /// leave split leaves densely packed.
    ///
    /// # Panics
    ///
    /// Panics if the tree is at its depth limit.
    #[must_use]
    pub fn emplace_back(&self, value: T) -> Self {
        expect_ok(self.try_emplace_back(value))
    }

    /// Checked [`emplace_back`](Self::emplace_back).
    ///
    /// # Errors
    ///
    /// [`TreeError::DepthLimitExceeded`].
    pub fn try_emplace_back(&self, value: T) -> Result<Self> {
        let mut next = self.clone();
        next.insert_with(Edge::PastBack, value)?;
        Ok(next)
    }

    /// Removes the first element.
    ///
    /// Returns `None` if the tree is empty, otherwise the new tree and the
    /// removed element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::IndexedTree;
    ///
    /// let tree: IndexedTree<i32> = (1..=3).collect();
    /// let (rest, first) = tree.pop_front().unwrap();
    /// assert_eq!(first, 1);
    /// assert_eq!(rest.len(), 2);
    /// ```
    #[must_use]
    pub fn pop_front(&self) -> Option<(Self, T)> {
        let mut next = self.clone();
        let removed = next.checked_pop(Edge::Front)?;
        Some((next, removed))
    }

    /// Removes the last element.
    ///
    /// Returns `None` if the tree is empty, otherwise the new tree and the
    /// removed element.
    #[must_use]
    pub fn pop_back(&self) -> Option<(Self, T)> {
        let mut next = self.clone();
        let removed = next.checked_pop(Edge::Back)?;
        Some((next, removed))
    }

    /// Returns a new tree with `value` inserted before the element `cursor`
    /// designates.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is stale or past the end.
    #[must_use]
    pub fn insert_at(&self, cursor: &Cursor, value: T) -> Self {
        expect_ok(self.try_insert_at(cursor, value))
    }

    /// Checked [`insert_at`](Self::insert_at).
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`], [`TreeError::IndexOutOfBounds`] or
    /// [`TreeError::DepthLimitExceeded`].
    pub fn try_insert_at(&self, cursor: &Cursor, value: T) -> Result<Self> {
        let mut next = self.clone();
        next.checked_insert_at(cursor, value)?;
        Ok(next)
    }

    /// Returns a new tree with the element `cursor` designates replaced.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is stale or at the end.
    #[must_use]
    pub fn assign_at(&self, cursor: &Cursor, value: T) -> Self {
        expect_ok(self.try_assign_at(cursor, value))
    }

    /// Checked [`assign_at`](Self::assign_at).
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] or [`TreeError::IndexOutOfBounds`].
    pub fn try_assign_at(&self, cursor: &Cursor, value: T) -> Result<Self> {
        let mut next = self.clone();
        next.checked_assign_at(cursor, value)?;
        Ok(next)
    }

    /// Returns a new tree without the element `cursor` designates.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is stale or at the end.
    #[must_use]
    pub fn erase_at(&self, cursor: &Cursor) -> Self {
        expect_ok(self.try_erase_at(cursor))
    }

    /// Checked [`erase_at`](Self::erase_at).
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] or [`TreeError::IndexOutOfBounds`].
    pub fn try_erase_at(&self, cursor: &Cursor) -> Result<Self> {
        let mut next = self.clone();
        next.checked_erase_at(cursor)?;
        Ok(next)
    }
}

// =============================================================================
// Transient
// =============================================================================

impl<T, P, const LEAF: usize, const INTERNAL: usize> BppTree<T, P, Owned, LEAF, INTERNAL>
where
    T: Clone,
    P: Positional + RoutingPolicy<T>,
{
    /// Inserts `value` before position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len` or the tree is at its depth limit.
    pub fn insert_index(&mut self, index: usize, value: T) {
        expect_ok(self.try_insert_index(index, value));
    }

    /// Checked [`insert_index`](Self::insert_index).
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfBounds`] or [`TreeError::DepthLimitExceeded`];
    /// the tree is unchanged.
    pub fn try_insert_index(&mut self, index: usize, value: T) -> Result<()> {
        self.checked_insert_index(index, value)
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn assign_index(&mut self, index: usize, value: T) -> T {
        expect_ok(self.try_assign_index(index, value))
    }

    /// Checked [`assign_index`](Self::assign_index).
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfBounds`] if `index >= len`.
    pub fn try_assign_index(&mut self, index: usize, value: T) -> Result<T> {
        self.checked_assign_index(index, value)
    }

    /// Replaces the element at `index` by `updater(&element)`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn update_index<F>(&mut self, index: usize, updater: F)
    where
        F: FnOnce(&T) -> T,
    {
        expect_ok(self.try_update_index(index, updater));
    }

    /// Checked [`update_index`](Self::update_index).
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfBounds`] if `index >= len`.
    pub fn try_update_index<F>(&mut self, index: usize, updater: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        self.checked_update_index(index, updater)
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase_index(&mut self, index: usize) -> T {
        expect_ok(self.try_erase_index(index))
    }

    /// Checked [`erase_index`](Self::erase_index).
    ///
    /// # Errors
    ///
    /// [`TreeError::IndexOutOfBounds`] if `index >= len`.
    pub fn try_erase_index(&mut self, index: usize) -> Result<T> {
        self.checked_erase_index(index)
    }

    /// Prepends `value`.
    ///
    /// # Panics
    ///
    /// Panics if the tree is at its depth limit.
    pub fn emplace_front(&mut self, value: T) {
        expect_ok(self.try_emplace_front(value));
    }

    /// Checked [`emplace_front`](Self::emplace_front).
    ///
    /// # Errors
    ///
    /// [`TreeError::DepthLimitExceeded`].
    pub fn try_emplace_front(&mut self, value: T) -> Result<()> {
        self.insert_with(Edge::Front, value)
    }

    /// Appends `value`.
    ///
    /// # Panics
    ///
    /// Panics if the tree is at its depth limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::TransientIndexedTree;
    ///
    /// let mut transient = TransientIndexedTree::new();
    /// for value in 0..1000 {
    ///     transient.emplace_back(value);
    /// }
    /// let tree = transient.persistent();
    /// assert_eq!(tree.len(), 1000);
    /// assert_eq!(tree.get(999), Some(&999));
    /// ```
    pub fn emplace_back(&mut self, value: T) {
        expect_ok(self.try_emplace_back(value));
    }

    /// Checked [`emplace_back`](Self::emplace_back).
    ///
    /// # Errors
    ///
    /// [`TreeError::DepthLimitExceeded`].
    pub fn try_emplace_back(&mut self, value: T) -> Result<()> {
        self.insert_with(Edge::PastBack, value)
    }

    /// Removes and returns the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        self.checked_pop(Edge::Front)
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        self.checked_pop(Edge::Back)
    }

    /// Inserts `value` before the element `cursor` designates.
    ///
    /// The cursor is moved to the new version of the tree and designates the
    /// inserted element.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is stale or past the end.
    pub fn insert_at(&mut self, cursor: &mut Cursor, value: T) {
        expect_ok(self.try_insert_at(cursor, value));
    }

    /// Checked [`insert_at`](Self::insert_at).
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`], [`TreeError::IndexOutOfBounds`] or
    /// [`TreeError::DepthLimitExceeded`]; cursor and tree are unchanged.
    pub fn try_insert_at(&mut self, cursor: &mut Cursor, value: T) -> Result<()> {
        *cursor = self.checked_insert_at(cursor, value)?;
        Ok(())
    }

    /// Replaces the element `cursor` designates, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is stale or at the end.
    pub fn assign_at(&mut self, cursor: &mut Cursor, value: T) -> T {
        expect_ok(self.try_assign_at(cursor, value))
    }

    /// Checked [`assign_at`](Self::assign_at).
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] or [`TreeError::IndexOutOfBounds`].
    pub fn try_assign_at(&mut self, cursor: &mut Cursor, value: T) -> Result<T> {
        let (moved, previous) = self.checked_assign_at(cursor, value)?;
        *cursor = moved;
        Ok(previous)
    }

    /// Removes the element `cursor` designates and returns it.
    ///
    /// The cursor then designates the element that followed it.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is stale or at the end.
    pub fn erase_at(&mut self, cursor: &mut Cursor) -> T {
        expect_ok(self.try_erase_at(cursor))
    }

    /// Checked [`erase_at`](Self::erase_at).
    ///
    /// # Errors
    ///
    /// [`TreeError::StaleCursor`] or [`TreeError::IndexOutOfBounds`].
    pub fn try_erase_at(&mut self, cursor: &mut Cursor) -> Result<T> {
        let (moved, removed) = self.checked_erase_at(cursor)?;
        *cursor = moved;
        Ok(removed)
    }
}

// =============================================================================
// Construction from Sequences
// =============================================================================

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> FromIterator<T> for BppTree<T, P, O, LEAF, INTERNAL>
where
    T: Clone,
    P: Positional + RoutingPolicy<T> + Default,
    O: OwnershipPolicy,
{
    /// # Panics
    ///
    /// Panics if appending the sequence would need a split at the default
    /// depth limit. [`max_size`](BppTree::max_size) bounds that length from
    /// above; the actual limit depends on how appends fill the nodes.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient: BppTree<T, P, Owned, LEAF, INTERNAL> = BppTree::new();
        for value in iter {
            transient.emplace_back(value);
        }
        transient.into_discipline()
    }
}

impl<T, P, const LEAF: usize, const INTERNAL: usize> Extend<T> for BppTree<T, P, Owned, LEAF, INTERNAL>
where
    T: Clone,
    P: Positional + RoutingPolicy<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.emplace_back(value);
        }
    }
}
