//! Fixed-capacity slot storage backing every node.
//!
//! [`UninitializedArray`] holds up to `N` values inline. Slots at or past the
//! current length are never constructed, so element types without a
//! sensible default state are fine. Occupied slots are always contiguous:
//! [`emplace`](UninitializedArray::emplace) shifts later elements right and
//! [`erase`](UninitializedArray::erase) shifts them left.
//!
//! Exceeding the capacity is a programming error and panics; the node code
//! always checks [`is_full`](UninitializedArray::is_full) and splits first.

use std::ops::{Deref, DerefMut};

use arrayvec::ArrayVec;

/// Inline array of at most `N` initialized values.
#[derive(Clone)]
pub(crate) struct UninitializedArray<T, const N: usize> {
    slots: ArrayVec<T, N>,
}

impl<T, const N: usize> UninitializedArray<T, N> {
    /// Creates an array with no occupied slots.
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            slots: ArrayVec::new_const(),
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    /// Constructs `value` at `index`, shifting the elements at and after
    /// `index` one slot to the right.
    ///
    /// # Panics
    ///
    /// Panics if the array is full or `index > len`.
    #[inline]
    pub(crate) fn emplace(&mut self, index: usize, value: T) {
        debug_assert!(index <= self.len(), "emplace past the occupied range");
        self.slots.insert(index, value);
    }

    /// Replaces the value at an occupied `index` without shifting anything,
    /// returning the previous value.
    #[inline]
    pub(crate) fn emplace_unchecked(&mut self, index: usize, value: T) -> T {
        std::mem::replace(&mut self.slots[index], value)
    }

    /// Appends `value` after the last occupied slot.
    #[inline]
    pub(crate) fn push(&mut self, value: T) {
        self.slots.push(value);
    }

    /// Destroys the value at `index` by moving it out, shifting later
    /// elements one slot to the left.
    #[inline]
    pub(crate) fn erase(&mut self, index: usize) -> T {
        self.slots.remove(index)
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<T> {
        self.slots.pop()
    }

    /// Moves the elements at `at..` into a new array, leaving `..at` here.
    pub(crate) fn split_off(&mut self, at: usize) -> Self {
        let mut tail = Self::new();
        tail.slots.extend(self.slots.drain(at..));
        tail
    }

    /// Moves every element of `other` to the end of this array.
    ///
    /// # Panics
    ///
    /// Panics if the combined length exceeds `N`.
    pub(crate) fn append(&mut self, other: &mut Self) {
        assert!(
            self.len() + other.len() <= N,
            "appending {} elements to {} would exceed capacity {}",
            other.len(),
            self.len(),
            N
        );
        self.slots.extend(other.slots.drain(..));
    }
}

impl<T, const N: usize> Default for UninitializedArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Deref for UninitializedArray<T, N> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.slots
    }
}

impl<T, const N: usize> DerefMut for UninitializedArray<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }
}

impl<T, const N: usize> FromIterator<T> for UninitializedArray<T, N> {
    /// # Panics
    ///
    /// Panics if the iterator yields more than `N` elements.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl<T: std::fmt::Debug, const N: usize> std::fmt::Debug for UninitializedArray<T, N> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::rc::Rc;

    /// A type with no default value, counting live instances.
    struct Tracked {
        value: i32,
        _live: Rc<()>,
    }

    fn tracked(value: i32, live: &Rc<()>) -> Tracked {
        Tracked {
            value,
            _live: Rc::clone(live),
        }
    }

    fn values<const N: usize>(array: &UninitializedArray<Tracked, N>) -> Vec<i32> {
        array.iter().map(|item| item.value).collect()
    }

    #[rstest]
    fn test_new_has_no_live_slots() {
        let array: UninitializedArray<Tracked, 8> = UninitializedArray::new();
        assert!(array.is_empty());
        assert_eq!(array.len(), 0);
        assert_eq!(array.iter().count(), 0);
    }

    #[rstest]
    fn test_emplace_shifts_right() {
        let live = Rc::new(());
        let mut array: UninitializedArray<Tracked, 4> = UninitializedArray::new();
        array.emplace(0, tracked(3, &live));
        array.emplace(0, tracked(1, &live));
        array.emplace(1, tracked(2, &live));
        array.emplace(3, tracked(4, &live));
        assert_eq!(values(&array), vec![1, 2, 3, 4]);
        assert!(array.is_full());
        assert_eq!(Rc::strong_count(&live), 5);
    }

    #[rstest]
    fn test_emplace_unchecked_replaces_in_place() {
        let live = Rc::new(());
        let mut array: UninitializedArray<Tracked, 4> = UninitializedArray::new();
        array.push(tracked(1, &live));
        array.push(tracked(2, &live));
        let previous = array.emplace_unchecked(1, tracked(9, &live));
        assert_eq!(previous.value, 2);
        drop(previous);
        assert_eq!(values(&array), vec![1, 9]);
        assert_eq!(Rc::strong_count(&live), 3);
    }

    #[rstest]
    fn test_erase_shifts_left_and_destroys() {
        let live = Rc::new(());
        let mut array: UninitializedArray<Tracked, 4> = UninitializedArray::new();
        for value in 0..4 {
            array.push(tracked(value, &live));
        }
        let erased = array.erase(1);
        assert_eq!(erased.value, 1);
        drop(erased);
        assert_eq!(values(&array), vec![0, 2, 3]);
        assert_eq!(Rc::strong_count(&live), 4);
    }

    #[rstest]
    fn test_drop_destroys_only_occupied_slots() {
        let live = Rc::new(());
        {
            let mut array: UninitializedArray<Tracked, 16> = UninitializedArray::new();
            array.push(tracked(1, &live));
            array.push(tracked(2, &live));
            assert_eq!(Rc::strong_count(&live), 3);
        }
        assert_eq!(Rc::strong_count(&live), 1);
    }

    #[rstest]
    fn test_split_off_and_append() {
        let mut left: UninitializedArray<i32, 8> = (0..6).collect();
        let mut right = left.split_off(4);
        assert_eq!(&*left, &[0, 1, 2, 3]);
        assert_eq!(&*right, &[4, 5]);
        left.append(&mut right);
        assert_eq!(&*left, &[0, 1, 2, 3, 4, 5]);
        assert!(right.is_empty());
    }

    #[rstest]
    fn test_clone_copies_occupied_slots() {
        let array: UninitializedArray<String, 4> =
            ["a", "b"].into_iter().map(String::from).collect();
        let copy = array.clone();
        assert_eq!(&*copy, &["a".to_string(), "b".to_string()]);
    }

    #[rstest]
    #[should_panic]
    fn test_emplace_beyond_capacity_panics() {
        let mut array: UninitializedArray<i32, 2> = UninitializedArray::new();
        array.push(1);
        array.push(2);
        array.emplace(0, 3);
    }
}
