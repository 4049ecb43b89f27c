//! Property-based invariant tests for `IntervalTree`.
//!
//! 1. Point queries match a linear scan over the inserted intervals.
//! 2. Range queries match a linear scan.
//! 3. Height stays within the AVL bound `1.44 * log2(n + 2)`.
//! 4. Inserting then removing a set of intervals restores the previous answers.
//! 5. In-order iteration is sorted by `(start, end)`.

use hitflow_spatial::IntervalTree;
use proptest::prelude::*;

fn interval_strategy() -> impl Strategy<Value = (i32, i32)> {
    (-200i32..=200, 0i32..=60).prop_map(|(start, len)| (start, start + len))
}

fn build(intervals: &[(i32, i32)]) -> IntervalTree<i32, usize> {
    let mut tree = IntervalTree::new();
    for (i, &(start, end)) in intervals.iter().enumerate() {
        tree.insert(start, end, i).unwrap();
    }
    tree
}

fn brute_point(intervals: &[(i32, i32)], point: i32) -> Vec<usize> {
    intervals
        .iter()
        .enumerate()
        .filter(|(_, (s, e))| if s == e { point == *s } else { *s <= point && point < *e })
        .map(|(i, _)| i)
        .collect()
}

fn sorted_values(hits: Vec<&hitflow_spatial::Interval<i32, usize>>) -> Vec<usize> {
    let mut values: Vec<usize> = hits.into_iter().map(|iv| iv.value).collect();
    values.sort_unstable();
    values
}

proptest! {
    #[test]
    fn point_query_matches_linear_scan(
        intervals in proptest::collection::vec(interval_strategy(), 0..120),
        point in -220i32..=280,
    ) {
        let tree = build(&intervals);
        prop_assert_eq!(sorted_values(tree.query(point)), brute_point(&intervals, point));
    }

    #[test]
    fn range_query_matches_linear_scan(
        intervals in proptest::collection::vec(interval_strategy(), 0..120),
        start in -220i32..=280,
        len in 1i32..=80,
    ) {
        let end = start + len;
        let tree = build(&intervals);
        let expected: Vec<usize> = intervals
            .iter()
            .enumerate()
            .filter(|(_, (s, e))| if s == e { start <= *s && *s < end } else { *s < end && start < *e })
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(sorted_values(tree.query_range(start, end)), expected);
    }

    #[test]
    fn height_stays_logarithmic(
        intervals in proptest::collection::vec(interval_strategy(), 1..400),
    ) {
        let tree = build(&intervals);
        let n = tree.len() as f64;
        let bound = (1.44 * (n + 2.0).log2()).ceil() as u32;
        prop_assert!(tree.height() <= bound, "height {} > bound {}", tree.height(), bound);
    }

    #[test]
    fn insert_then_remove_restores_answers(
        base in proptest::collection::vec(interval_strategy(), 0..60),
        extra in proptest::collection::vec(interval_strategy(), 1..60),
        probes in proptest::collection::vec(-220i32..=280, 1..20),
    ) {
        let mut tree = build(&base);
        let before: Vec<Vec<usize>> = probes.iter().map(|&p| sorted_values(tree.query(p))).collect();

        for (i, &(s, e)) in extra.iter().enumerate() {
            tree.insert(s, e, base.len() + i).unwrap();
        }
        for (i, &(s, e)) in extra.iter().enumerate() {
            prop_assert_eq!(tree.remove_entry(s, e, &(base.len() + i)), Some(base.len() + i));
        }

        prop_assert_eq!(tree.len(), base.len());
        let after: Vec<Vec<usize>> = probes.iter().map(|&p| sorted_values(tree.query(p))).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn iteration_is_sorted(
        intervals in proptest::collection::vec(interval_strategy(), 0..120),
    ) {
        let tree = build(&intervals);
        let keys: Vec<(i32, i32)> = tree.iter().map(|iv| (iv.start, iv.end)).collect();
        prop_assert_eq!(keys.len(), intervals.len());
        prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn inverted_bounds_rejected(start in -100i32..=100, back in 1i32..=50) {
        let mut tree: IntervalTree<i32, ()> = IntervalTree::new();
        prop_assert!(tree.insert(start, start - back, ()).is_err());
        prop_assert!(tree.is_empty());
    }
}
