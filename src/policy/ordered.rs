use std::cmp::Ordering;

use super::{Finder, RoutingPolicy};
use crate::node::ChildEntry;

// =============================================================================
// Keys and Comparators
// =============================================================================

/// Projects the key a value is ordered by.
pub trait KeyExtractor<T>: Clone {
    /// The key type.
    type Key;

    /// Returns the key of `value`.
    fn key<'a>(&self, value: &'a T) -> &'a Self::Key;
}

/// Orders `(key, value)` pairs by their first component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PairKey;

impl<K, V> KeyExtractor<(K, V)> for PairKey {
    type Key = K;

    #[inline]
    fn key<'a>(&self, value: &'a (K, V)) -> &'a K {
        &value.0
    }
}

/// Orders values by themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identity;

impl<T> KeyExtractor<T> for Identity {
    type Key = T;

    #[inline]
    fn key<'a>(&self, value: &'a T) -> &'a T {
        value
    }
}

/// Strict weak ordering over keys.
pub trait Comparator<K: ?Sized>: Clone {
    /// Returns `true` when `left` sorts strictly before `right`.
    fn less_than(&self, left: &K, right: &K) -> bool;

    /// Returns `true` when neither key sorts before the other.
    #[inline]
    fn equivalent(&self, left: &K, right: &K) -> bool {
        !self.less_than(left, right) && !self.less_than(right, left)
    }

    /// Three-way comparison derived from [`less_than`](Self::less_than).
    fn compare(&self, left: &K, right: &K) -> Ordering {
        if self.less_than(left, right) {
            Ordering::Less
        } else if self.less_than(right, left) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Ascending order by [`Ord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn less_than(&self, left: &K, right: &K) -> bool {
        left < right
    }
}

/// Descending order by [`Ord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder;

impl<K: Ord + ?Sized> Comparator<K> for ReverseOrder {
    #[inline]
    fn less_than(&self, left: &K, right: &K) -> bool {
        right < left
    }
}

// =============================================================================
// Ordered Policy
// =============================================================================

/// How a node is searched for a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Scan slots front to back.
    Linear,
    /// Bisect the occupied slots.
    #[default]
    Binary,
}

/// Key-ordered personality: the tree is a sorted map or set.
///
/// Internal nodes cache the largest key of every child, which routes key
/// searches. Keys are unique under the comparator.
///
/// # Examples
///
/// ```rust
/// use bpptree::{Identity, Ordered, Persistent, ReverseOrder};
///
/// let policy = Ordered::<Identity>::new().with_comparator(ReverseOrder);
/// let empty: Persistent<i32, Ordered<Identity, ReverseOrder>> = Persistent::with_policy(policy);
/// let set = empty
///     .insert_v(1)
///     .insert_v(3)
///     .insert_v(2);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ordered<X = PairKey, C = NaturalOrder> {
    extractor: X,
    comparator: C,
    search: SearchMode,
}

impl<X: Default, C: Default> Ordered<X, C> {
    /// Creates the policy with default extractor, comparator and search mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<X, C> Ordered<X, C> {
    /// Creates the policy from its parts.
    #[must_use]
    pub const fn from_parts(extractor: X, comparator: C, search: SearchMode) -> Self {
        Self {
            extractor,
            comparator,
            search,
        }
    }

    /// Replaces the comparator.
    #[must_use]
    pub fn with_comparator<D>(self, comparator: D) -> Ordered<X, D> {
        Ordered {
            extractor: self.extractor,
            comparator,
            search: self.search,
        }
    }

    /// Replaces the in-node search mode.
    #[must_use]
    pub fn with_search(self, search: SearchMode) -> Self {
        Self { search, ..self }
    }

    #[inline]
    pub fn extractor(&self) -> &X {
        &self.extractor
    }

    #[inline]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    #[inline]
    pub fn search(&self) -> SearchMode {
        self.search
    }

    /// Returns the key of `value`.
    #[inline]
    pub fn key_of<'a, T>(&self, value: &'a T) -> &'a X::Key
    where
        X: KeyExtractor<T>,
    {
        self.extractor.key(value)
    }

    #[inline]
    pub(crate) fn less<K>(&self, left: &K, right: &K) -> bool
    where
        C: Comparator<K>,
    {
        self.comparator.less_than(left, right)
    }

    /// Index of the first item for which `before` is false.
    fn partition<I>(&self, items: &[I], before: impl Fn(&I) -> bool) -> usize {
        match self.search {
            SearchMode::Linear => items
                .iter()
                .position(|item| !before(item))
                .unwrap_or(items.len()),
            SearchMode::Binary => items.partition_point(before),
        }
    }
}

impl<T, X, C> RoutingPolicy<T> for Ordered<X, C>
where
    X: KeyExtractor<T>,
    X::Key: Clone,
    C: Comparator<X::Key>,
{
    type Summary = X::Key;

    fn summarize(&self, values: &[T]) -> X::Key {
        self.extractor.key(&values[values.len() - 1]).clone()
    }

    fn combine(&self, _left: X::Key, right: &X::Key) -> X::Key {
        right.clone()
    }

    fn summary_matches(&self, cached: &X::Key, actual: &X::Key) -> bool {
        self.comparator.equivalent(cached, actual)
    }

    fn may_precede(&self, left: &T, right: &T) -> bool {
        self.less(self.key_of(left), self.key_of(right))
    }
}

// =============================================================================
// Key Search
// =============================================================================

/// Routes a descent by key.
///
/// The lower variant stops at the first element not less than the key, the
/// upper variant at the first element greater than it. When no such element
/// exists the descent ends one past the last element.
pub(crate) struct KeySearch<'k, K> {
    key: &'k K,
    upper: bool,
}

impl<K> Clone for KeySearch<'_, K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            upper: self.upper,
        }
    }
}

impl<'k, K> KeySearch<'k, K> {
    pub(crate) const fn lower(key: &'k K) -> Self {
        Self { key, upper: false }
    }

    pub(crate) const fn upper(key: &'k K) -> Self {
        Self { key, upper: true }
    }

    fn before<X, C>(&self, policy: &Ordered<X, C>, candidate: &K) -> bool
    where
        C: Comparator<K>,
    {
        if self.upper {
            !policy.less(self.key, candidate)
        } else {
            policy.less(candidate, self.key)
        }
    }
}

impl<K, T, X, C> Finder<T, Ordered<X, C>> for KeySearch<'_, K>
where
    X: KeyExtractor<T, Key = K>,
    K: Clone,
    C: Comparator<K>,
{
    fn route_internal<const LEAF: usize, const INTERNAL: usize>(
        &mut self,
        policy: &Ordered<X, C>,
        entries: &[ChildEntry<T, Ordered<X, C>, LEAF, INTERNAL>],
    ) -> usize {
        let slot = policy.partition(entries, |entry| self.before(policy, &entry.summary));
        slot.min(entries.len() - 1)
    }

    fn route_leaf(&mut self, policy: &Ordered<X, C>, values: &[T]) -> usize {
        policy.partition(values, |value| self.before(policy, policy.key_of(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_pair_key_extracts_first() {
        let pair = (3, "three");
        assert_eq!(*PairKey.key(&pair), 3);
    }

    #[rstest]
    fn test_identity_extracts_value() {
        assert_eq!(*Identity.key(&"x"), "x");
    }

    #[rstest]
    #[case(1, 2, true)]
    #[case(2, 1, false)]
    #[case(2, 2, false)]
    fn test_natural_order(#[case] left: i32, #[case] right: i32, #[case] expected: bool) {
        assert_eq!(NaturalOrder.less_than(&left, &right), expected);
        assert_eq!(ReverseOrder.less_than(&right, &left), expected);
    }

    #[rstest]
    fn test_compare_and_equivalent() {
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(ReverseOrder.compare(&1, &2), Ordering::Greater);
        assert!(NaturalOrder.equivalent(&5, &5));
    }

    #[rstest]
    fn test_summary_is_last_key() {
        let policy: Ordered = Ordered::new();
        let values = [(1, 'a'), (4, 'b'), (9, 'c')];
        assert_eq!(policy.summarize(&values), 9);
        assert_eq!(RoutingPolicy::<(i32, char)>::combine(&policy, 4, &9), 9);
    }

    #[rstest]
    #[case(SearchMode::Linear)]
    #[case(SearchMode::Binary)]
    fn test_key_search_in_leaf(#[case] search: SearchMode) {
        let policy = Ordered::<Identity>::new().with_search(search);
        let values = [10, 20, 30];
        let slot = |mut finder: KeySearch<'_, i32>| finder.route_leaf(&policy, &values);
        assert_eq!(slot(KeySearch::lower(&5)), 0);
        assert_eq!(slot(KeySearch::lower(&20)), 1);
        assert_eq!(slot(KeySearch::upper(&20)), 2);
        assert_eq!(slot(KeySearch::lower(&25)), 2);
        assert_eq!(slot(KeySearch::lower(&31)), 3);
        assert_eq!(slot(KeySearch::upper(&30)), 3);
    }
}
