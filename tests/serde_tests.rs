#![cfg(feature = "serde")]

//! Integration tests for serde support.
//!
//! Trees serialize as plain sequences, so they read back into any tree
//! personality and into standard collections.

use bpptree::{IndexedTree, OrderedMap, OrderedSet, TransientIndexedTree};
use rstest::rstest;

// =============================================================================
// Indexed Trees
// =============================================================================

#[rstest]
fn test_indexed_json_roundtrip() {
    let tree: IndexedTree<i32> = (1..=200).collect();
    let json = serde_json::to_string(&tree).unwrap();
    let restored: IndexedTree<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(tree, restored);
    assert!(restored.validate().is_ok());
}

#[rstest]
fn test_indexed_serializes_as_array() {
    let tree: IndexedTree<&str> = vec!["a", "b"].into_iter().collect();
    assert_eq!(serde_json::to_string(&tree).unwrap(), r#"["a","b"]"#);
    let empty: IndexedTree<i32> = IndexedTree::new();
    assert_eq!(serde_json::to_string(&empty).unwrap(), "[]");
}

#[rstest]
fn test_transient_deserializes() {
    let restored: TransientIndexedTree<u8> = serde_json::from_str("[3,1,2]").unwrap();
    assert_eq!(restored.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
}

#[rstest]
fn test_nested_trees() {
    let inner: IndexedTree<i32> = (0..3).collect();
    let outer: IndexedTree<IndexedTree<i32>> = vec![inner.clone(), inner].into_iter().collect();
    let json = serde_json::to_string(&outer).unwrap();
    assert_eq!(json, "[[0,1,2],[0,1,2]]");
    let restored: IndexedTree<IndexedTree<i32>> = serde_json::from_str(&json).unwrap();
    assert_eq!(outer, restored);
}

// =============================================================================
// Ordered Trees
// =============================================================================

#[rstest]
fn test_ordered_map_json_roundtrip() {
    let map: OrderedMap<String, u32> = (0..50).map(|key| (format!("key{key:02}"), key)).collect();
    let json = serde_json::to_string(&map).unwrap();
    let restored: OrderedMap<String, u32> = serde_json::from_str(&json).unwrap();
    assert_eq!(map, restored);
}

#[rstest]
fn test_ordered_set_sorts_and_deduplicates_input() {
    let restored: OrderedSet<i32> = serde_json::from_str("[5,1,5,3]").unwrap();
    assert_eq!(restored.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
    assert!(restored.validate().is_ok());
}

#[rstest]
fn test_invalid_input_is_rejected() {
    let result: Result<IndexedTree<i32>, _> = serde_json::from_str(r#"{"a":1}"#);
    assert!(result.is_err());
}
