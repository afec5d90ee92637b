use crate::array::UninitializedArray;
use crate::config::min_occupancy;
use crate::ownership::OwnerId;

use super::split_insert;

/// Bottom-level node holding up to `LEAF` values in order.
#[derive(Clone)]
pub(crate) struct LeafNode<T, const LEAF: usize> {
    pub(crate) owner: OwnerId,
    pub(crate) values: UninitializedArray<T, LEAF>,
}

impl<T, const LEAF: usize> LeafNode<T, LEAF> {
    pub(crate) const MIN_OCCUPANCY: usize = min_occupancy(LEAF);

    pub(crate) fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            values: UninitializedArray::new(),
        }
    }

    /// Inserts `value` at `slot`.
    ///
    /// When the leaf is full it splits and the new right sibling is
    /// returned; `right_most` marks the last leaf of the tree.
    pub(crate) fn insert(&mut self, slot: usize, value: T, right_most: bool) -> Option<Self> {
        split_insert(&mut self.values, slot, value, right_most).map(|values| Self {
            owner: self.owner,
            values,
        })
    }

    pub(crate) fn erase(&mut self, slot: usize) -> T {
        self.values.erase(slot)
    }

    /// Replaces the value at `slot`, returning the previous one.
    pub(crate) fn assign(&mut self, slot: usize, value: T) -> T {
        self.values.emplace_unchecked(slot, value)
    }

    /// Moves the last value of `left` to the front of this leaf.
    pub(crate) fn borrow_from_left(&mut self, left: &mut Self) {
        if let Some(value) = left.values.pop() {
            self.values.emplace(0, value);
        }
    }

    /// Moves the first value of `right` to the back of this leaf.
    pub(crate) fn borrow_from_right(&mut self, right: &mut Self) {
        let value = right.values.erase(0);
        self.values.push(value);
    }

    /// Moves every value of `right` to the back of this leaf.
    pub(crate) fn merge(&mut self, mut right: Self) {
        self.values.append(&mut right.values);
    }
}
