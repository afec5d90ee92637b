//! Serde support: trees serialize as sequences in iteration order.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ownership::OwnershipPolicy;
use crate::policy::RoutingPolicy;

use super::BppTree;

impl<T, P, O, const LEAF: usize, const INTERNAL: usize> Serialize for BppTree<T, P, O, LEAF, INTERNAL>
where
    T: Serialize,
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

struct TreeVisitor<Tree, T> {
    marker: PhantomData<fn() -> (Tree, T)>,
}

impl<Tree, T> TreeVisitor<Tree, T> {
    const fn new() -> Self {
        Self { marker: PhantomData }
    }
}

impl<'de, Tree, T> Visitor<'de> for TreeVisitor<Tree, T>
where
    Tree: FromIterator<T>,
    T: Deserialize<'de>,
{
    type Value = Tree;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        const MAX_PREALLOCATE: usize = 4096;
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut elements = Vec::with_capacity(capacity);
        while let Some(element) = seq.next_element()? {
            elements.push(element);
        }
        Ok(elements.into_iter().collect())
    }
}

/// Elements are inserted in sequence order. Ordered trees sort them, keeping
/// the last element of each key.
impl<'de, T, P, O, const LEAF: usize, const INTERNAL: usize> Deserialize<'de> for BppTree<T, P, O, LEAF, INTERNAL>
where
    T: Deserialize<'de>,
    P: RoutingPolicy<T>,
    O: OwnershipPolicy,
    Self: FromIterator<T>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(TreeVisitor::<Self, T>::new())
    }
}
