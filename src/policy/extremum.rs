use super::{Comparator, Finder, Identity, KeyExtractor, NaturalOrder, Positional, RoutingPolicy};
use crate::node::ChildEntry;

/// Positional personality that caches the smallest key of every subtree.
///
/// Finding the minimum of the whole tree or of any range between two
/// cursors takes O(log n). When several elements share the smallest key the
/// first of them is reported.
///
/// # Examples
///
/// ```rust
/// use bpptree::{Min, Persistent};
///
/// let tree: Persistent<i32, Min> = [4, 2, 7, 2].into_iter().collect();
/// assert_eq!(tree.min(), Some(&2));
/// assert_eq!(tree.min_element().map(|cursor| cursor.position()), Some(1));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Min<X = Identity, C = NaturalOrder> {
    extractor: X,
    comparator: C,
}

/// Positional personality that caches the largest key of every subtree.
///
/// The mirror of [`Min`]: ties also resolve to the first element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Max<X = Identity, C = NaturalOrder> {
    extractor: X,
    comparator: C,
}

impl<X: Default, C: Default> Min<X, C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<X, C> Min<X, C> {
    /// Creates the policy from its extractor and comparator.
    #[must_use]
    pub const fn from_parts(extractor: X, comparator: C) -> Self {
        Self {
            extractor,
            comparator,
        }
    }

    #[inline]
    pub fn extractor(&self) -> &X {
        &self.extractor
    }

    #[inline]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }
}

impl<X: Default, C: Default> Max<X, C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<X, C> Max<X, C> {
    /// Creates the policy from its extractor and comparator.
    #[must_use]
    pub const fn from_parts(extractor: X, comparator: C) -> Self {
        Self {
            extractor,
            comparator,
        }
    }

    #[inline]
    pub fn extractor(&self) -> &X {
        &self.extractor
    }

    #[inline]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }
}

/// A policy whose summary is the key that wins a comparison among the
/// subtree's values.
pub(crate) trait Extremum<T>: RoutingPolicy<T> {
    /// Key `value` competes with.
    fn rank<'a>(&self, value: &'a T) -> &'a Self::Summary;

    /// Whether `challenger` beats `incumbent`.
    fn ahead(&self, challenger: &Self::Summary, incumbent: &Self::Summary) -> bool;
}

/// Slot of the first item whose key no other item beats.
fn leading<I, K>(items: &[I], key: impl Fn(&I) -> &K, ahead: impl Fn(&K, &K) -> bool) -> usize {
    let mut best = 0;
    for slot in 1..items.len() {
        if ahead(key(&items[slot]), key(&items[best])) {
            best = slot;
        }
    }
    best
}

macro_rules! extremum_policy {
    ($policy:ident, |$comparator:ident, $challenger:ident, $incumbent:ident| $ahead:expr) => {
        impl<T, X, C> RoutingPolicy<T> for $policy<X, C>
        where
            X: KeyExtractor<T>,
            X::Key: Clone,
            C: Comparator<X::Key>,
        {
            type Summary = X::Key;

            fn summarize(&self, values: &[T]) -> X::Key {
                let slot = leading(values, |value| self.rank(value), |left, right| self.ahead(left, right));
                self.rank(&values[slot]).clone()
            }

            fn combine(&self, left: X::Key, right: &X::Key) -> X::Key {
                if self.ahead(right, &left) { right.clone() } else { left }
            }

            fn summary_matches(&self, cached: &X::Key, actual: &X::Key) -> bool {
                self.comparator.equivalent(cached, actual)
            }
        }

        impl<T, X, C> Extremum<T> for $policy<X, C>
        where
            X: KeyExtractor<T>,
            X::Key: Clone,
            C: Comparator<X::Key>,
        {
            #[inline]
            fn rank<'a>(&self, value: &'a T) -> &'a X::Key {
                self.extractor.key(value)
            }

            #[inline]
            fn ahead(&self, $challenger: &X::Key, $incumbent: &X::Key) -> bool {
                let $comparator = &self.comparator;
                $ahead
            }
        }

        impl<X, C> Positional for $policy<X, C> {}
    };
}

extremum_policy!(Min, |comparator, challenger, incumbent| comparator.less_than(challenger, incumbent));
extremum_policy!(Max, |comparator, challenger, incumbent| comparator.less_than(incumbent, challenger));

/// Routes to the first element holding the extreme key of the subtree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExtremeSearch;

impl<T, P: Extremum<T>> Finder<T, P> for ExtremeSearch {
    fn route_internal<const LEAF: usize, const INTERNAL: usize>(
        &mut self,
        policy: &P,
        entries: &[ChildEntry<T, P, LEAF, INTERNAL>],
    ) -> usize {
        leading(entries, |entry| &entry.summary, |left, right| policy.ahead(left, right))
    }

    fn route_leaf(&mut self, policy: &P, values: &[T]) -> usize {
        leading(values, |value| policy.rank(value), |left, right| policy.ahead(left, right))
    }
}
