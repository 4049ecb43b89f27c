//! End-to-end input pipeline: ingest, tick, drain, hit-test, and bubble.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use hitflow_core::event::{Event, KeyCode, KeyEvent, MouseButton};
use hitflow_core::geometry::Rect;
use hitflow_core::widget_id::WidgetId;
use hitflow_runtime::{
    DispatchOutcome, Dispatcher, EventScheduler, EventTarget, Handled, HandlerError, ManualClock,
    SchedulerConfig, WidgetArena, WidgetTree,
};
use hitflow_spatial::{SpatialConfig, SpatialIndex};
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

type Seen = Rc<RefCell<Vec<(String, Event)>>>;

struct Probe {
    name: String,
    consume: bool,
    seen: Seen,
}

impl EventTarget for Probe {
    fn handle(&mut self, event: &Event) -> Result<Handled, HandlerError> {
        self.seen
            .borrow_mut()
            .push((self.name.clone(), event.clone()));
        Ok(Handled::from(self.consume))
    }
}

struct App {
    dispatcher: Dispatcher<WidgetArena, ManualClock>,
    clock: ManualClock,
    start: Instant,
    seen: Seen,
    a: WidgetId,
    b: WidgetId,
    field: WidgetId,
}

/// Root composite with two overlapping panels A (z0) and B (z1) and a text
/// field inside A that holds focus.
fn app() -> App {
    init_tracing();
    let seen = Seen::default();
    let probe = |name: &str, consume: bool| Probe {
        name: name.to_string(),
        consume,
        seen: seen.clone(),
    };

    let mut arena = WidgetArena::new();
    let root = arena
        .insert_composite(None, Some(Box::new(probe("root", true))))
        .unwrap();
    let a = arena
        .insert_composite(Some(root), Some(Box::new(probe("a", true))))
        .unwrap();
    let b = arena.insert_leaf(Some(root), probe("b", true)).unwrap();
    let field = arena.insert_leaf(Some(a), probe("field", false)).unwrap();
    arena.set_focus(field);

    let start = Instant::now();
    let clock = ManualClock::new(start);
    let scheduler = EventScheduler::with_clock(SchedulerConfig::default(), clock.clone());
    let index = SpatialIndex::new(SpatialConfig::default().with_stats(true));
    let mut dispatcher = Dispatcher::new(scheduler, index, arena);
    dispatcher
        .insert_widget(a, Rect::new(0, 0, 100, 100), 0)
        .unwrap();
    dispatcher
        .insert_widget(b, Rect::new(50, 50, 100, 100), 1)
        .unwrap();

    App {
        dispatcher,
        clock,
        start,
        seen,
        a,
        b,
        field,
    }
}

fn names(seen: &Seen) -> Vec<String> {
    seen.borrow().iter().map(|(n, _)| n.clone()).collect()
}

#[test]
fn overlapping_panels_resolve_topmost() {
    let app = app();
    assert_eq!(app.dispatcher.find_widgets_at(75, 75), vec![app.b, app.a]);
    assert_eq!(app.dispatcher.find_widgets_at(10, 10), vec![app.a]);
    assert!(app.dispatcher.find_widgets_at(200, 200).is_empty());
}

#[test]
fn clicks_reach_the_topmost_panel() {
    let mut app = app();
    let t = app.start;
    app.dispatcher
        .ingest_event(Event::pointer_down(75, 75, MouseButton::Left, t));
    app.dispatcher
        .ingest_event(Event::pointer_down(10, 10, MouseButton::Left, t));
    app.dispatcher
        .ingest_event(Event::pointer_down(300, 300, MouseButton::Left, t));

    let report = app.dispatcher.drain(Duration::from_millis(16));
    assert_eq!(report.processed, 3);
    assert!(report.is_clean());
    assert_eq!(names(&app.seen), vec!["b", "a"]);
    assert_eq!(app.dispatcher.stats().no_target, 1);
}

#[test]
fn keys_bubble_from_focused_field() {
    let mut app = app();
    let t = app.start;
    app.dispatcher
        .ingest_event(Event::key_down(KeyEvent::new(KeyCode::Char('x')), t));
    app.dispatcher.drain(Duration::from_millis(16));
    assert_eq!(names(&app.seen), vec!["field", "a"]);

    let direct = app
        .dispatcher
        .dispatch(&Event::key_down(KeyEvent::new(KeyCode::Escape), t))
        .unwrap();
    assert_eq!(direct, DispatchOutcome::Handled(app.a));
    assert_eq!(app.dispatcher.tree().focused(), Some(app.field));
}

#[test]
fn pointer_burst_collapses_to_one_move_per_tick() {
    let mut app = app();
    for i in 0..20 {
        let t = app.start + Duration::from_millis(i);
        app.dispatcher
            .ingest_event(Event::pointer_move(60 + i as i32, 60, t));
    }
    app.clock.advance(Duration::from_millis(20));
    assert_eq!(app.dispatcher.tick(), 1);
    app.dispatcher.drain(Duration::from_millis(16));

    let seen = app.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "b");
    assert_eq!(seen[0].1.position().map(|p| p.x), Some(79));
}

#[test]
fn resize_is_debounced_until_quiet() {
    let mut app = app();
    for (i, w) in [100u32, 110, 120].into_iter().enumerate() {
        let t = app.start + Duration::from_millis(i as u64 * 10);
        app.dispatcher.ingest_event(Event::resize(w, 40, t));
    }
    app.clock.advance(Duration::from_millis(50));
    assert_eq!(app.dispatcher.tick(), 0);
    app.clock.advance(Duration::from_millis(10));
    assert_eq!(app.dispatcher.tick(), 1);

    app.dispatcher.drain(Duration::from_millis(16));
    let seen = app.seen.borrow();
    // Resize is non-positional: it bubbles from the focused field to `a`.
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].1, Event::resize(120, 40, app.start + Duration::from_millis(20)));
}

#[test]
fn layout_moves_are_visible_to_the_next_hit_test() {
    let mut app = app();
    let old = Rect::new(50, 50, 100, 100);
    app.dispatcher
        .update_widget(app.b, old, Rect::new(500, 500, 10, 10))
        .unwrap();
    assert_eq!(app.dispatcher.find_top_widget_at(75, 75), Some(app.a));
    assert_eq!(app.dispatcher.find_top_widget_at(505, 505), Some(app.b));
    assert!(app.dispatcher.index().stats().queries >= 2);
}
