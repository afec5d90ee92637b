use std::ops::{Add, Sub};

use super::{Finder, Identity, KeyExtractor, Positional, RoutingPolicy};
use crate::node::ChildEntry;

/// Quantity a [`Summed`] tree can total.
///
/// Implemented for every type with a zero ([`Default`]), addition,
/// subtraction and a partial order, which covers the primitive integers and
/// floats.
pub trait Summable: Clone + Default + PartialOrd + Add<Output = Self> + Sub<Output = Self> {}

impl<S> Summable for S where S: Clone + Default + PartialOrd + Add<Output = S> + Sub<Output = S> {}

/// Prefix-sum personality: a sequence whose internal nodes cache the total
/// of every subtree.
///
/// The extractor projects the quantity summed out of each value, so a tree
/// of `(item, weight)` pairs can total its weights. Prefix sums and the
/// search for the position where a running total reaches a target then take
/// O(log n).
///
/// # Examples
///
/// ```rust
/// use bpptree::{Persistent, Summed};
///
/// let tree: Persistent<u32, Summed> = [5, 1, 4].into_iter().collect();
/// assert_eq!(tree.sum(), 10);
/// assert_eq!(tree.sum_lower_bound(6).position(), 1);
/// let tree = tree.insert_index(0, 10);
/// assert_eq!(tree.sum(), 20);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Summed<X = Identity> {
    extractor: X,
}

impl<X: Default> Summed<X> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<X> Summed<X> {
    /// Creates the policy summing what `extractor` projects.
    #[must_use]
    pub const fn with_extractor(extractor: X) -> Self {
        Self { extractor }
    }

    #[inline]
    pub fn extractor(&self) -> &X {
        &self.extractor
    }

    /// Returns the quantity `value` contributes to sums.
    #[inline]
    pub fn quantity<'a, T>(&self, value: &'a T) -> &'a X::Key
    where
        X: KeyExtractor<T>,
    {
        self.extractor.key(value)
    }
}

impl<T, X> RoutingPolicy<T> for Summed<X>
where
    X: KeyExtractor<T>,
    X::Key: Summable,
{
    type Summary = X::Key;

    fn summarize(&self, values: &[T]) -> X::Key {
        values
            .iter()
            .fold(X::Key::default(), |sum, value| sum + self.quantity(value).clone())
    }

    fn combine(&self, left: X::Key, right: &X::Key) -> X::Key {
        left + right.clone()
    }

    fn summary_matches(&self, cached: &X::Key, actual: &X::Key) -> bool {
        !(cached < actual || actual < cached)
    }
}

impl<X> Positional for Summed<X> {}

/// Routes to the first element at which the running total reaches a target.
///
/// Every subtree and value passed on the way is subtracted from the target;
/// a descent whose target exceeds the total ends one past the last element.
#[derive(Debug, Clone)]
pub(crate) struct SumSearch<S> {
    remaining: S,
}

impl<S> SumSearch<S> {
    pub(crate) const fn new(target: S) -> Self {
        Self { remaining: target }
    }
}

impl<T, X, S> Finder<T, Summed<X>> for SumSearch<S>
where
    X: KeyExtractor<T, Key = S>,
    S: Summable,
{
    fn route_internal<const LEAF: usize, const INTERNAL: usize>(
        &mut self,
        _policy: &Summed<X>,
        entries: &[ChildEntry<T, Summed<X>, LEAF, INTERNAL>],
    ) -> usize {
        let last = entries.len() - 1;
        let mut slot = 0;
        while slot < last && entries[slot].summary < self.remaining {
            self.remaining = self.remaining.clone() - entries[slot].summary.clone();
            slot += 1;
        }
        slot
    }

    fn route_leaf(&mut self, policy: &Summed<X>, values: &[T]) -> usize {
        let mut slot = 0;
        for value in values {
            let quantity = policy.quantity(value);
            if *quantity < self.remaining {
                self.remaining = self.remaining.clone() - quantity.clone();
                slot += 1;
            } else {
                break;
            }
        }
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LeafNode, Node, NodeRef};
    use crate::ownership::{OwnerId, ReferenceCounter};
    use crate::policy::PairKey;
    use rstest::rstest;

    fn leaf(values: &[u32]) -> NodeRef<u32, Summed, 4, 4> {
        let mut node = LeafNode::new(OwnerId::FROZEN);
        for value in values {
            node.values.push(*value);
        }
        ReferenceCounter::new(Node::Leaf(node))
    }

    #[rstest]
    fn test_summary_is_total() {
        let policy: Summed = Summed::new();
        assert_eq!(policy.summarize(&[3_u32, 4, 5]), 12);
        assert_eq!(RoutingPolicy::<u32>::combine(&policy, 12, &8), 20);
        assert!(RoutingPolicy::<u32>::summary_matches(&policy, &7, &7));
        assert!(!RoutingPolicy::<u32>::summary_matches(&policy, &7, &8));
    }

    #[rstest]
    fn test_extractor_picks_the_summed_field() {
        let policy = Summed::with_extractor(PairKey);
        assert_eq!(policy.summarize(&[(2_i64, 'a'), (-5, 'b')]), -3);
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(1, 0, 0)]
    #[case(3, 0, 1)]
    #[case(4, 1, 0)]
    #[case(10, 1, 1)]
    #[case(11, 2, 0)]
    #[case(99, 2, 2)]
    fn test_sum_search_routes_by_running_total(
        #[case] target: u32,
        #[case] slot: usize,
        #[case] leaf_slot: usize,
    ) {
        let policy: Summed = Summed::new();
        let entries = vec![
            ChildEntry::new(leaf(&[1, 2]), &policy),
            ChildEntry::new(leaf(&[3, 4]), &policy),
            ChildEntry::new(leaf(&[5, 6]), &policy),
        ];
        let mut finder = SumSearch::new(target);
        assert_eq!(finder.route_internal(&policy, &entries), slot);
        let values = match &*entries[slot].node {
            Node::Leaf(leaf) => leaf.values.to_vec(),
            Node::Internal(_) => unreachable!("test children are leaves"),
        };
        assert_eq!(finder.route_leaf(&policy, &values), leaf_slot);
    }
}
