use super::{Positional, RoutingPolicy};

/// Positional personality: the tree is a sequence addressed by index.
///
/// Internal nodes cache nothing beyond the element counts every tree keeps.
///
/// # Examples
///
/// ```rust
/// use bpptree::IndexedTree;
///
/// let tree: IndexedTree<char> = "abc".chars().collect();
/// let tree = tree.insert_index(1, 'x');
/// assert_eq!(tree.iter().collect::<String>(), "axbc");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Indexed;

impl<T> RoutingPolicy<T> for Indexed {
    type Summary = ();

    #[inline]
    fn summarize(&self, _values: &[T]) {}

    #[inline]
    fn combine(&self, _left: (), _right: &()) {}
}

impl Positional for Indexed {}
