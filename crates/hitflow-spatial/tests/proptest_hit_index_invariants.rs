//! Property-based invariant tests for `SpatialIndex`.
//!
//! 1. Point hits match a linear scan, sorted by z desc then later registration.
//! 2. The first result is always the topmost containing widget.
//! 3. Incremental updates answer exactly like a fresh rebuild.
//! 4. Rectangle queries match a linear scan.

use hitflow_core::geometry::Rect;
use hitflow_core::widget_id::WidgetId;
use hitflow_spatial::SpatialIndex;
use proptest::prelude::*;

fn widget_strategy() -> impl Strategy<Value = (Rect, i32)> {
    (-100i32..=100, -100i32..=100, 1i32..=60, 1i32..=60, -3i32..=3)
        .prop_map(|(x, y, w, h, z)| (Rect::new(x, y, w, h), z))
}

fn build(widgets: &[(Rect, i32)]) -> SpatialIndex {
    let mut idx = SpatialIndex::with_defaults();
    for (i, &(rect, z)) in widgets.iter().enumerate() {
        idx.insert_widget(WidgetId::new(i as u32), rect, z).unwrap();
    }
    idx
}

/// Linear-scan reference: the registration order is the slice index.
fn expected_at(widgets: &[(Rect, i32)], x: i32, y: i32) -> Vec<WidgetId> {
    let mut hits: Vec<(i32, usize)> = widgets
        .iter()
        .enumerate()
        .filter(|(_, (r, _))| r.contains(x, y))
        .map(|(i, (_, z))| (*z, i))
        .collect();
    hits.sort_by(|a, b| b.cmp(a));
    hits.into_iter().map(|(_, i)| WidgetId::new(i as u32)).collect()
}

proptest! {
    #[test]
    fn point_hits_match_linear_scan(
        widgets in proptest::collection::vec(widget_strategy(), 0..80),
        probes in proptest::collection::vec((-110i32..=170, -110i32..=170), 1..30),
    ) {
        let idx = build(&widgets);
        for (x, y) in probes {
            prop_assert_eq!(idx.find_widgets_at(x, y), expected_at(&widgets, x, y));
        }
    }

    #[test]
    fn top_hit_is_first(
        widgets in proptest::collection::vec(widget_strategy(), 1..80),
        x in -110i32..=170,
        y in -110i32..=170,
    ) {
        let idx = build(&widgets);
        prop_assert_eq!(idx.find_top_widget_at(x, y), expected_at(&widgets, x, y).first().copied());
    }

    #[test]
    fn incremental_updates_match_rebuild(
        widgets in proptest::collection::vec(widget_strategy(), 1..40),
        moves in proptest::collection::vec((0usize..40, widget_strategy()), 0..40),
        probes in proptest::collection::vec((-110i32..=170, -110i32..=170), 1..20),
    ) {
        let mut idx = build(&widgets);
        let mut current = widgets.clone();
        for (slot, (rect, _)) in moves {
            let slot = slot % current.len();
            let previous = current[slot].0;
            idx.update_widget(WidgetId::new(slot as u32), previous, rect).unwrap();
            current[slot].0 = rect;
        }

        let rebuilt = build(&current);
        for (x, y) in probes {
            prop_assert_eq!(idx.find_widgets_at(x, y), rebuilt.find_widgets_at(x, y));
            prop_assert_eq!(idx.find_widgets_at(x, y), expected_at(&current, x, y));
        }
    }

    #[test]
    fn rect_hits_match_linear_scan(
        widgets in proptest::collection::vec(widget_strategy(), 0..60),
        query in widget_strategy(),
    ) {
        let idx = build(&widgets);
        let (area, _) = query;
        let mut expected: Vec<(i32, usize)> = widgets
            .iter()
            .enumerate()
            .filter(|(_, (r, _))| r.intersects(&area))
            .map(|(i, (_, z))| (*z, i))
            .collect();
        expected.sort_by(|a, b| b.cmp(a));
        let expected: Vec<WidgetId> = expected.into_iter().map(|(_, i)| WidgetId::new(i as u32)).collect();
        prop_assert_eq!(idx.find_widgets_in(area), expected);
    }
}
