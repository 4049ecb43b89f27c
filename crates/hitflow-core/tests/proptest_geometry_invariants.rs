//! Property-based invariant tests for `Rect`.
//!
//! 1. Intersection is commutative.
//! 2. Intersection result fits within both inputs.
//! 3. A point is in both rects iff it is in their intersection.
//! 4. Union contains both inputs.
//! 5. Right/bottom edges are consistent with x+width, y+height.
//! 6. Well-formed rects contain their origin and not their far corner.
//! 7. No panics on extreme i32 values.

use hitflow_core::geometry::Rect;
use proptest::prelude::*;

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (any::<i32>(), any::<i32>(), any::<i32>(), any::<i32>())
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn small_rect_strategy() -> impl Strategy<Value = Rect> {
    (-500i32..=500, -500i32..=500, 0i32..=500, 0i32..=500)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn intersection_commutative(a in small_rect_strategy(), b in small_rect_strategy()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn intersection_within_both(a in small_rect_strategy(), b in small_rect_strategy()) {
        if let Some(i) = a.intersection_opt(&b) {
            prop_assert!(i.x >= a.x && i.x >= b.x);
            prop_assert!(i.y >= a.y && i.y >= b.y);
            prop_assert!(i.right() <= a.right() && i.right() <= b.right());
            prop_assert!(i.bottom() <= a.bottom() && i.bottom() <= b.bottom());
        }
    }

    #[test]
    fn contains_agrees_with_intersection(
        a in small_rect_strategy(),
        b in small_rect_strategy(),
        px in -600i32..=1100,
        py in -600i32..=1100,
    ) {
        let in_both = a.contains(px, py) && b.contains(px, py);
        let in_intersection = a.intersection_opt(&b).is_some_and(|i| i.contains(px, py));
        prop_assert_eq!(in_both, in_intersection);
    }

    #[test]
    fn union_contains_both(a in small_rect_strategy(), b in small_rect_strategy()) {
        let u = a.union(&b);
        prop_assert!(u.x <= a.x && u.x <= b.x);
        prop_assert!(u.right() >= a.right() && u.right() >= b.right());
        prop_assert!(u.bottom() >= a.bottom() && u.bottom() >= b.bottom());
    }

    #[test]
    fn edges_consistent(r in small_rect_strategy()) {
        prop_assert_eq!(r.right(), r.x + r.width);
        prop_assert_eq!(r.bottom(), r.y + r.height);
        prop_assert_eq!(r.checked_right(), Some(r.x + r.width));
    }

    #[test]
    fn well_formed_contains_origin(r in small_rect_strategy()) {
        if r.is_well_formed() {
            prop_assert!(r.contains(r.x, r.y));
            prop_assert!(!r.contains(r.right(), r.bottom()));
        } else {
            prop_assert!(r.is_empty());
        }
    }

    #[test]
    fn extreme_values_do_not_panic(a in rect_strategy(), b in rect_strategy()) {
        let _ = a.intersection(&b);
        let _ = a.union(&b);
        let _ = a.area();
        let _ = a.is_well_formed();
        let _ = a.contains(b.x, b.y);
    }
}
