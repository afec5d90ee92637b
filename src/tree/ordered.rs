//! Keyed access and updates for [`Ordered`] trees.

use crate::error::{Result, TreeError};
use crate::iterator::Cursor;
use crate::ownership::{Owned, OwnershipPolicy, Shared};
use crate::policy::{Comparator, KeyExtractor, KeySearch, Ordered, Position};

use super::modify::{Edited, LeafEdit};
use super::{BppTree, expect_ok};

// =============================================================================
// Lookup
// =============================================================================

impl<T, X, C, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, Ordered<X, C>, O, LEAF, INTERNAL>
where
    X: KeyExtractor<T>,
    X::Key: Clone,
    C: Comparator<X::Key>,
    O: OwnershipPolicy,
{
    /// Returns the element stored under `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::OrderedMap;
    ///
    /// let map: OrderedMap<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
    /// assert_eq!(map.get(&"a"), Some(&("a", 1)));
    /// assert_eq!(map.get(&"z"), None);
    /// ```
    pub fn get(&self, key: &X::Key) -> Option<&T> {
        let (leaf, slot) = self.descend(KeySearch::lower(key));
        leaf.values.get(slot).filter(|value| holds_key(&self.policy, *value, key))
    }

    #[inline]
    pub fn contains(&self, key: &X::Key) -> bool {
        self.get(key).is_some()
    }

    /// Cursor to the element stored under `key`.
    pub fn find(&self, key: &X::Key) -> Option<Cursor> {
        let (leaf, slot, position) = self.locate(KeySearch::lower(key));
        let found = leaf.values.get(slot).is_some_and(|value| holds_key(&self.policy, value, key));
        found.then(|| Cursor::new(position, self.version))
    }

    /// Cursor to the first element whose key is not less than `key`, or the
    /// end cursor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = [10, 20, 30].into_iter().collect();
    /// assert_eq!(set.lower_bound(&20).position(), 1);
    /// assert_eq!(set.upper_bound(&20).position(), 2);
    /// assert_eq!(set.lower_bound(&31), set.cursor_end());
    /// ```
    pub fn lower_bound(&self, key: &X::Key) -> Cursor {
        let (_, _, position) = self.locate(KeySearch::lower(key));
        Cursor::new(position, self.version)
    }

    /// Cursor to the first element whose key is greater than `key`, or the
    /// end cursor.
    pub fn upper_bound(&self, key: &X::Key) -> Cursor {
        let (_, _, position) = self.locate(KeySearch::upper(key));
        Cursor::new(position, self.version)
    }

    /// Element with the smallest key.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.front()
    }

    /// Element with the largest key.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.back()
    }

}

/// Whether `value` is stored under a key equivalent to `key`.
fn holds_key<T, X, C>(policy: &Ordered<X, C>, value: &T, key: &X::Key) -> bool
where
    X: KeyExtractor<T>,
    C: Comparator<X::Key>,
{
    policy.comparator().equivalent(policy.key_of(value), key)
}

// =============================================================================
// Shared by Both Disciplines
// =============================================================================

impl<T, X, C, O, const LEAF: usize, const INTERNAL: usize> BppTree<T, Ordered<X, C>, O, LEAF, INTERNAL>
where
    T: Clone,
    X: KeyExtractor<T>,
    X::Key: Clone,
    C: Comparator<X::Key>,
    O: OwnershipPolicy,
{
    fn checked_insert_or_assign(&mut self, value: T) -> Result<Option<T>> {
        let key = self.policy.key_of(&value).clone();
        let edited = self.edit_with(KeySearch::lower(&key), |policy, current| {
            if current.is_some_and(|current| holds_key(policy, current, &key)) {
                Ok(LeafEdit::Assign(value))
            } else {
                Ok(LeafEdit::Insert(value))
            }
        })?;
        Ok(match edited {
            Edited::Replaced(previous) => Some(previous),
            _ => None,
        })
    }

    fn checked_insert_v(&mut self, value: T) -> Result<bool> {
        let key = self.policy.key_of(&value).clone();
        let edited = self.edit_with(KeySearch::lower(&key), |policy, current| {
            if current.is_some_and(|current| holds_key(policy, current, &key)) {
                Ok(LeafEdit::Keep)
            } else {
                Ok(LeafEdit::Insert(value))
            }
        })?;
        Ok(matches!(edited, Edited::Inserted))
    }

    fn checked_assign_v(&mut self, value: T) -> Option<T> {
        let key = self.policy.key_of(&value).clone();
        let edited = self.edit_with(KeySearch::lower(&key), |policy, current| {
            if current.is_some_and(|current| holds_key(policy, current, &key)) {
                Ok(LeafEdit::Assign(value))
            } else {
                Ok(LeafEdit::Keep)
            }
        });
        match edited {
            Ok(Edited::Replaced(previous)) => Some(previous),
            Ok(_) => None,
            Err(_) => unreachable!("assigning never grows the tree"),
        }
    }

    fn checked_erase_key(&mut self, key: &X::Key) -> Option<T> {
        let edited = self.edit_with(KeySearch::lower(key), |policy, current| {
            if current.is_some_and(|current| holds_key(policy, current, key)) {
                Ok(LeafEdit::Erase)
            } else {
                Ok(LeafEdit::Keep)
            }
        });
        match edited {
            Ok(Edited::Erased(removed)) => Some(removed),
            Ok(_) => None,
            Err(_) => unreachable!("erasing never grows the tree"),
        }
    }

    fn checked_update_key<F>(&mut self, key: &X::Key, updater: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        self.edit_with(KeySearch::lower(key), |policy, current| {
            let current = current
                .filter(|current| holds_key(policy, *current, key))
                .ok_or(TreeError::KeyNotFound)?;
            let replacement = updater(current);
            if !holds_key(policy, &replacement, key) {
                return Err(TreeError::KeyMismatch);
            }
            Ok(LeafEdit::Assign(replacement))
        })
        .map(|_| ())
    }

    fn checked_erase_at(&mut self, cursor: &Cursor) -> Result<(Cursor, T)> {
        self.check_cursor(cursor)?;
        self.check_index(cursor.position(), self.length)?;
        let removed = self.erase_with(Position::lookup(cursor.position()));
        Ok((Cursor::new(cursor.position(), self.version), removed))
    }
}

// =============================================================================
// Persistent
// =============================================================================

impl<T, X, C, const LEAF: usize, const INTERNAL: usize> BppTree<T, Ordered<X, C>, Shared, LEAF, INTERNAL>
where
    T: Clone,
    X: KeyExtractor<T>,
    X::Key: Clone,
    C: Comparator<X::Key>,
{
    /// Returns a new tree holding `value`, replacing the element with an
    /// equivalent key if there is one.
    ///
    /// Replacing never changes the shape of the tree.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and the tree is at its depth limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::OrderedMap;
    ///
    /// let map = OrderedMap::new()
    ///     .insert_or_assign((10, "a"))
    ///     .insert_or_assign((5, "b"))
    ///     .insert_or_assign((10, "c"));
    /// assert_eq!(map.iter().copied().collect::<Vec<_>>(), vec![(5, "b"), (10, "c")]);
    /// ```
    #[must_use]
    pub fn insert_or_assign(&self, value: T) -> Self {
        expect_ok(self.try_insert_or_assign(value))
    }

    /// Checked [`insert_or_assign`](Self::insert_or_assign).
    ///
    /// # Errors
    ///
    /// [`TreeError::DepthLimitExceeded`].
    pub fn try_insert_or_assign(&self, value: T) -> Result<Self> {
        let mut next = self.clone();
        next.checked_insert_or_assign(value)?;
        Ok(next)
    }

    /// Returns a new tree holding `value` unless its key is already present,
    /// in which case the returned handle shares this tree's contents.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and the tree is at its depth limit.
    #[must_use]
    pub fn insert_v(&self, value: T) -> Self {
        expect_ok(self.try_insert_v(value))
    }

    /// Checked [`insert_v`](Self::insert_v).
    ///
    /// # Errors
    ///
    /// [`TreeError::DepthLimitExceeded`].
    pub fn try_insert_v(&self, value: T) -> Result<Self> {
        let mut next = self.clone();
        let inserted = next.checked_insert_v(value)?;
        Ok(if inserted { next } else { self.clone() })
    }

    /// Returns a new tree with the element of `value`'s key replaced, or a
    /// handle sharing this tree's contents when the key is absent.
    #[must_use]
    pub fn assign_v(&self, value: T) -> Self {
        let mut next = self.clone();
        match next.checked_assign_v(value) {
            Some(_) => next,
            None => self.clone(),
        }
    }

    /// Returns a new tree without the element stored under `key`.
    ///
    /// A missing key is not an error: the returned handle shares this tree's
    /// contents. Use [`remove_key`](Self::remove_key) to learn whether
    /// anything was removed.
    #[must_use]
    pub fn erase_key(&self, key: &X::Key) -> Self {
        self.remove_key(key).map_or_else(|| self.clone(), |(next, _)| next)
    }

    /// Removes the element stored under `key`.
    ///
    /// Returns `None` if the key is absent, otherwise the new tree and the
    /// removed element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::OrderedSet;
    ///
    /// let set: OrderedSet<i32> = (1..=3).collect();
    /// let (rest, removed) = set.remove_key(&2).unwrap();
    /// assert_eq!(removed, 2);
    /// assert!(!rest.contains(&2));
    /// assert!(rest.remove_key(&2).is_none());
    /// ```
    #[must_use]
    pub fn remove_key(&self, key: &X::Key) -> Option<(Self, T)> {
        let mut next = self.clone();
        let removed = next.checked_erase_key(key)?;
        Some((next, removed))
    }

    /// Returns a new tree with the element under `key` replaced by
    /// `updater(&element)`.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent or the replacement has a different key.
    #[must_use]
    pub fn update_key<F>(&self, key: &X::Key, updater: F) -> Self
    where
        F: FnOnce(&T) -> T,
    {
        expect_ok(self.try_update_key(key, updater))
    }

    /// Checked [`update_key`](Self::update_key).
    ///
    /// # Errors
    ///
    /// [`TreeError::KeyNotFound`] or [`TreeError::KeyMismatch`].
    pub fn try_update_key<F>(&self, key: &X::Key, updater: F) -> Result<Self>
    where
        F: FnOnce(&T) -> T,
    {
        let mut next = self.clone();
        next.checked_update_key(key, updater)?;
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

impl<T, X, C, const LEAF: usize, const INTERNAL: usize> BppTree<T, Ordered<X, C>, Owned, LEAF, INTERNAL>
where
    T: Clone,
    X: KeyExtractor<T>,
    X::Key: Clone,
    C: Comparator<X::Key>,
{
    /// Stores `value`, returning the element it replaced.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and the tree is at its depth limit.
    pub fn insert_or_assign(&mut self, value: T) -> Option<T> {
        expect_ok(self.try_insert_or_assign(value))
    }

    /// Checked [`insert_or_assign`](Self::insert_or_assign).
    ///
    /// # Errors
    ///
    /// [`TreeError::DepthLimitExceeded`].
    pub fn try_insert_or_assign(&mut self, value: T) -> Result<Option<T>> {
        self.checked_insert_or_assign(value)
    }

    /// Stores `value` unless its key is present. Returns whether it was
    /// stored.
    ///
    /// # Panics
    ///
    /// Panics if the key is new and the tree is at its depth limit.
    pub fn insert_v(&mut self, value: T) -> bool {
        expect_ok(self.try_insert_v(value))
    }

    /// Checked [`insert_v`](Self::insert_v).
    ///
    /// # Errors
    ///
    /// [`TreeError::DepthLimitExceeded`].
    pub fn try_insert_v(&mut self, value: T) -> Result<bool> {
        self.checked_insert_v(value)
    }

    /// Replaces the element with `value`'s key, returning it. Absent keys
    /// leave the tree unchanged and return `None`.
    pub fn assign_v(&mut self, value: T) -> Option<T> {
        self.checked_assign_v(value)
    }

    /// Removes and returns the element stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bpptree::TransientOrderedMap;
    ///
    /// let mut map: TransientOrderedMap<u8, char> = TransientOrderedMap::new();
    /// map.insert_or_assign((1, 'a'));
    /// assert_eq!(map.erase_key(&1), Some((1, 'a')));
    /// assert_eq!(map.erase_key(&1), None);
    /// ```
    pub fn erase_key(&mut self, key: &X::Key) -> Option<T> {
        self.checked_erase_key(key)
    }

    /// Replaces the element under `key` by `updater(&element)`.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent or the replacement has a different key.
    pub fn update_key<F>(&mut self, key: &X::Key, updater: F)
    where
        F: FnOnce(&T) -> T,
    {
        expect_ok(self.try_update_key(key, updater));
    }

    /// Checked [`update_key`](Self::update_key).
    ///
    /// # Errors
    ///
    /// [`TreeError::KeyNotFound`] or [`TreeError::KeyMismatch`]; the tree is
    /// unchanged.
    pub fn try_update_key<F>(&mut self, key: &X::Key, updater: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        self.checked_update_key(key, updater)
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

impl<T, X, C, O, const LEAF: usize, const INTERNAL: usize> FromIterator<T>
    for BppTree<T, Ordered<X, C>, O, LEAF, INTERNAL>
where
    T: Clone,
    X: KeyExtractor<T> + Default,
    X::Key: Clone,
    C: Comparator<X::Key> + Default,
    O: OwnershipPolicy,
{
    /// Later elements replace earlier ones with an equivalent key.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient: BppTree<T, Ordered<X, C>, Owned, LEAF, INTERNAL> = BppTree::new();
        transient.extend(iter);
        transient.into_discipline()
    }
}

impl<T, X, C, const LEAF: usize, const INTERNAL: usize> Extend<T> for BppTree<T, Ordered<X, C>, Owned, LEAF, INTERNAL>
where
    T: Clone,
    X: KeyExtractor<T>,
    X::Key: Clone,
    C: Comparator<X::Key>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert_or_assign(value);
        }
    }
}
