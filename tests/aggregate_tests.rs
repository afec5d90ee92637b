//! Tests for the aggregate personalities.
//!
//! Prefix sums and range extremes are checked against plain slice scans,
//! across edits and across the snapshots those edits leave behind.

use bpptree::{Max, Min, PairKey, Persistent, Summed, Transient, TreeError};
use proptest::prelude::*;
use rstest::rstest;

type SumTree = Persistent<u64, Summed, 4, 4>;
type MinTree = Persistent<i32, Min, 4, 4>;
type MaxTree = Persistent<i32, Max, 5, 7>;

// =============================================================================
// Summed
// =============================================================================

#[rstest]
fn test_prefix_sums_of_first_thousand() {
    let tree: SumTree = (1..=1024).collect();
    assert!(tree.validate().is_ok());
    for position in 0..1024_u64 {
        let cursor = tree.cursor_at(position as usize).unwrap();
        assert_eq!(tree.sum_exclusive(&cursor), Ok(position * (position + 1) / 2));
        assert_eq!(tree.sum_inclusive(&cursor), Ok((position + 1) * (position + 2) / 2));
    }
    assert_eq!(tree.sum(), 1024 * 1025 / 2);
}

#[rstest]
fn test_sum_lower_bound_inverts_prefix_sums() {
    let tree: SumTree = (1..=1024).collect();
    for position in 0..1024 {
        let cursor = tree.cursor_at(position).unwrap();
        let before = tree.sum_exclusive(&cursor).unwrap();
        let through = tree.sum_inclusive(&cursor).unwrap();
        assert_eq!(tree.sum_lower_bound(through).position(), position);
        assert_eq!(tree.sum_lower_bound(before + 1).position(), position);
    }
    assert_eq!(tree.sum_lower_bound(tree.sum() + 1), tree.cursor_end());
}

#[rstest]
fn test_transient_sums_track_edits() {
    let mut tree: Transient<u64, Summed, 4, 4> = Transient::new();
    for value in 0..200 {
        tree.emplace_front(value);
    }
    let snapshot = tree.snapshot();
    for _ in 0..50 {
        tree.pop_back();
    }
    assert_eq!(tree.sum(), (50..200).sum::<u64>());
    assert_eq!(snapshot.sum(), (0..200).sum::<u64>());
    assert!(tree.validate().is_ok());
}

#[rstest]
fn test_weights_pick_a_bucket() {
    let buckets: Persistent<(u32, &str), Summed<PairKey>> =
        [(10, "small"), (30, "medium"), (60, "large")].into_iter().collect();
    let pick = |ticket| {
        let cursor = buckets.sum_lower_bound(ticket);
        buckets.get_at(&cursor).map(|bucket| bucket.1)
    };
    assert_eq!(pick(1), Ok("small"));
    assert_eq!(pick(10), Ok("small"));
    assert_eq!(pick(11), Ok("medium"));
    assert_eq!(pick(100), Ok("large"));
    assert!(pick(101).is_err());
}

#[rstest]
fn test_float_sums() {
    let tree: Persistent<f64, Summed> = [0.5, 1.25, 2.0].into_iter().collect();
    assert!((tree.sum() - 3.75).abs() < f64::EPSILON);
    assert_eq!(tree.sum_lower_bound(1.5).position(), 1);
}

// =============================================================================
// Min and Max
// =============================================================================

#[rstest]
#[case(0, 0)]
#[case(0, 90)]
#[case(3, 4)]
#[case(17, 71)]
#[case(40, 90)]
fn test_range_extremes(#[case] start: usize, #[case] end: usize) {
    let values: Vec<i32> = (0..90).map(|value| (value * 29 + 7) % 41 - 20).collect();
    let min: MinTree = values.iter().copied().collect();
    let max: MaxTree = values.iter().copied().collect();
    let slice = &values[start..end];
    let (first, last) = (min.cursor_at(start).unwrap(), min.cursor_at(end).unwrap());
    assert_eq!(min.min_between(&first, &last), Ok(slice.iter().min()));
    let (first, last) = (max.cursor_at(start).unwrap(), max.cursor_at(end).unwrap());
    assert_eq!(max.max_between(&first, &last), Ok(slice.iter().max()));
}

#[rstest]
fn test_min_survives_persistent_edits() {
    let original: MinTree = (0..100).collect();
    let edited = original.erase_index(0).erase_index(0).assign_index(50, -1);
    assert_eq!(original.min(), Some(&0));
    assert_eq!(edited.min(), Some(&-1));
    assert_eq!(edited.min_element().map(|cursor| cursor.position()), Some(50));
    let rest = edited.cursor_at(51).unwrap();
    assert_eq!(edited.min_between(&rest, &edited.cursor_end()), Ok(Some(&53)));
    assert!(edited.validate().is_ok());
}

#[rstest]
fn test_stale_range_is_rejected() {
    let tree: MaxTree = (0..20).collect();
    let first = tree.cursor_front();
    let updated = tree.emplace_back(99);
    assert_eq!(
        updated.max_between(&first, &updated.cursor_end()),
        Err(TreeError::StaleCursor)
    );
    assert_eq!(updated.max(), Some(&99));
}

// =============================================================================
// Model Laws
// =============================================================================

#[derive(Clone, Debug)]
enum Edit {
    Insert(usize, i32),
    Assign(usize, i32),
    Erase(usize),
}

fn arbitrary_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (any::<usize>(), -500..500_i32).prop_map(|(index, value)| Edit::Insert(index, value)),
        (any::<usize>(), -500..500_i32).prop_map(|(index, value)| Edit::Assign(index, value)),
        any::<usize>().prop_map(Edit::Erase),
    ]
}

fn apply(model: &mut Vec<i32>, tree: &mut Transient<i32, Min, 4, 4>, edit: &Edit) {
    let length = model.len();
    match *edit {
        Edit::Insert(index, value) => {
            model.insert(index % (length + 1), value);
            tree.insert_index(index % (length + 1), value);
        }
        Edit::Assign(index, value) if length > 0 => {
            model[index % length] = value;
            tree.assign_index(index % length, value);
        }
        Edit::Erase(index) if length > 0 => {
            model.remove(index % length);
            tree.erase_index(index % length);
        }
        Edit::Assign(..) | Edit::Erase(_) => {}
    }
}

proptest! {
    /// Law: prefix sums agree with a running total over the contents.
    #[test]
    fn prop_prefix_sums_match_running_total(values in prop::collection::vec(0..1000_u64, 0..120)) {
        let tree: SumTree = values.iter().copied().collect();
        let mut running = 0;
        for (position, value) in values.iter().enumerate() {
            let cursor = tree.cursor_at(position).unwrap();
            prop_assert_eq!(tree.sum_exclusive(&cursor), Ok(running));
            running += value;
        }
        prop_assert_eq!(tree.sum(), running);
    }

    /// Law: sum_lower_bound is the partition point of the inclusive prefix
    /// sums.
    #[test]
    fn prop_sum_lower_bound_matches_partition_point(
        values in prop::collection::vec(0..50_u64, 0..120),
        target in 0..3000_u64
    ) {
        let tree: SumTree = values.iter().copied().collect();
        let prefixes: Vec<u64> = values
            .iter()
            .scan(0, |total, value| {
                *total += value;
                Some(*total)
            })
            .collect();
        prop_assert_eq!(
            tree.sum_lower_bound(target).position(),
            prefixes.partition_point(|prefix| *prefix < target)
        );
    }

    /// Law: range minimum queries agree with a slice scan after edits.
    #[test]
    fn prop_range_min_matches_slice(
        initial in prop::collection::vec(-500..500_i32, 0..80),
        edits in prop::collection::vec(arbitrary_edit(), 0..40),
        bounds in (any::<usize>(), any::<usize>())
    ) {
        let mut model = initial.clone();
        let mut tree: Transient<i32, Min, 4, 4> = initial.into_iter().collect();
        for edit in &edits {
            apply(&mut model, &mut tree, edit);
        }
        prop_assert!(tree.validate().is_ok());
        let (start, end) = {
            let first = bounds.0 % (model.len() + 1);
            let second = bounds.1 % (model.len() + 1);
            (first.min(second), first.max(second))
        };
        let first = tree.cursor_at(start).unwrap();
        let last = tree.cursor_at(end).unwrap();
        let slice = &model[start..end];
        let expected = slice
            .iter()
            .min()
            .and_then(|smallest| slice.iter().position(|value| value == smallest))
            .map(|offset| start + offset);
        let found = tree.min_element_between(&first, &last).unwrap();
        prop_assert_eq!(found.map(|cursor| cursor.position()), expected);
    }
}
