#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Every event carries a kind tag ([`EventKind`]), a payload
//! ([`EventPayload`]) and the instant it arrived. The scheduler in
//! `hitflow-runtime` resolves the coalescing pattern from the kind; the
//! dispatcher uses [`Event::position`] to decide between hit-testing and
//! focus delivery.
//!
//! # Design Notes
//!
//! - Pointer coordinates are layout coordinates (signed, origin top-left)
//! - `Modifiers` use bitflags for easy combination
//! - Constructors keep kind and payload consistent; building an [`Event`]
//!   by hand with a mismatched pair is allowed but the payload wins for
//!   positional routing

use std::fmt;
use std::time::Instant;

use bitflags::bitflags;
#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
use crossterm::event as cte;

use crate::geometry::Point;

/// The kind tag used to look up an event's coalescing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A pointer button went down.
    PointerDown,
    /// A pointer button was released.
    PointerUp,
    /// The pointer moved with no button held.
    PointerMove,
    /// The pointer moved with a button held.
    PointerDrag,
    /// Wheel or trackpad scroll.
    Scroll,
    /// Key press (including auto-repeat).
    KeyDown,
    /// Key release.
    KeyUp,
    /// Committed text (IME output, paste).
    Text,
    /// Viewport resized.
    Resize,
    /// Window focus gained or lost.
    Focus,
    /// Application-defined kind.
    Custom(u16),
}

impl EventKind {
    /// All built-in kinds, in declaration order.
    pub const BUILTIN: [EventKind; 10] = [
        EventKind::PointerDown,
        EventKind::PointerUp,
        EventKind::PointerMove,
        EventKind::PointerDrag,
        EventKind::Scroll,
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::Text,
        EventKind::Resize,
        EventKind::Focus,
    ];

    /// Broad class of this kind.
    #[must_use]
    pub const fn class(self) -> EventClass {
        match self {
            EventKind::PointerDown
            | EventKind::PointerUp
            | EventKind::KeyDown
            | EventKind::KeyUp
            | EventKind::Text => EventClass::Discrete,
            EventKind::PointerMove | EventKind::PointerDrag | EventKind::Scroll => {
                EventClass::Continuous
            }
            EventKind::Resize | EventKind::Focus => EventClass::Lifecycle,
            EventKind::Custom(_) => EventClass::Custom,
        }
    }

    /// Whether events of this kind normally carry a pointer position.
    #[must_use]
    pub const fn is_positional(self) -> bool {
        matches!(
            self,
            EventKind::PointerDown
                | EventKind::PointerUp
                | EventKind::PointerMove
                | EventKind::PointerDrag
                | EventKind::Scroll
        )
    }

    /// Stable short name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::PointerDown => "pointer_down",
            EventKind::PointerUp => "pointer_up",
            EventKind::PointerMove => "pointer_move",
            EventKind::PointerDrag => "pointer_drag",
            EventKind::Scroll => "scroll",
            EventKind::KeyDown => "key_down",
            EventKind::KeyUp => "key_up",
            EventKind::Text => "text",
            EventKind::Resize => "resize",
            EventKind::Focus => "focus",
            EventKind::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Custom(id) => write!(f, "custom({id})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Broad grouping of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    /// User intent that must never be lost (clicks, keys, text).
    Discrete,
    /// High-frequency samples where only recent values matter.
    Continuous,
    /// Window/viewport lifecycle notifications.
    Lifecycle,
    /// Application-defined.
    Custom,
}

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Kind tag used for policy lookup.
    pub kind: EventKind,
    /// Kind-specific data.
    pub payload: EventPayload,
    /// Arrival time.
    pub timestamp: Instant,
}

impl Event {
    /// Create an event from its parts.
    #[must_use]
    pub const fn new(kind: EventKind, payload: EventPayload, timestamp: Instant) -> Self {
        Self {
            kind,
            payload,
            timestamp,
        }
    }

    /// Pointer button pressed at `(x, y)`.
    #[must_use]
    pub fn pointer_down(x: i32, y: i32, button: MouseButton, timestamp: Instant) -> Self {
        Self::new(
            EventKind::PointerDown,
            EventPayload::Pointer(PointerEvent::new(x, y).with_button(button)),
            timestamp,
        )
    }

    /// Pointer button released at `(x, y)`.
    #[must_use]
    pub fn pointer_up(x: i32, y: i32, button: MouseButton, timestamp: Instant) -> Self {
        Self::new(
            EventKind::PointerUp,
            EventPayload::Pointer(PointerEvent::new(x, y).with_button(button)),
            timestamp,
        )
    }

    /// Pointer moved to `(x, y)`.
    #[must_use]
    pub fn pointer_move(x: i32, y: i32, timestamp: Instant) -> Self {
        Self::new(
            EventKind::PointerMove,
            EventPayload::Pointer(PointerEvent::new(x, y)),
            timestamp,
        )
    }

    /// Pointer dragged to `(x, y)` with `button` held.
    #[must_use]
    pub fn pointer_drag(x: i32, y: i32, button: MouseButton, timestamp: Instant) -> Self {
        Self::new(
            EventKind::PointerDrag,
            EventPayload::Pointer(PointerEvent::new(x, y).with_button(button)),
            timestamp,
        )
    }

    /// Scroll by `(dx, dy)` with the pointer at `(x, y)`.
    #[must_use]
    pub fn scroll(x: i32, y: i32, dx: i32, dy: i32, timestamp: Instant) -> Self {
        Self::new(
            EventKind::Scroll,
            EventPayload::Scroll(ScrollEvent {
                x,
                y,
                dx,
                dy,
                modifiers: Modifiers::NONE,
            }),
            timestamp,
        )
    }

    /// Key pressed.
    #[must_use]
    pub fn key_down(key: KeyEvent, timestamp: Instant) -> Self {
        Self::new(EventKind::KeyDown, EventPayload::Key(key), timestamp)
    }

    /// Key released.
    #[must_use]
    pub fn key_up(key: KeyEvent, timestamp: Instant) -> Self {
        Self::new(EventKind::KeyUp, EventPayload::Key(key), timestamp)
    }

    /// Committed text.
    #[must_use]
    pub fn text(text: impl Into<String>, timestamp: Instant) -> Self {
        Self::new(EventKind::Text, EventPayload::Text(text.into()), timestamp)
    }

    /// Viewport resized.
    #[must_use]
    pub fn resize(width: u32, height: u32, timestamp: Instant) -> Self {
        Self::new(
            EventKind::Resize,
            EventPayload::Resize { width, height },
            timestamp,
        )
    }

    /// Focus gained (`true`) or lost (`false`).
    #[must_use]
    pub fn focus(gained: bool, timestamp: Instant) -> Self {
        Self::new(EventKind::Focus, EventPayload::Focus(gained), timestamp)
    }

    /// Application-defined event.
    #[must_use]
    pub fn custom(id: u16, value: u64, timestamp: Instant) -> Self {
        Self::new(EventKind::Custom(id), EventPayload::Custom(value), timestamp)
    }

    /// Pointer position carried by the payload, if any.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.payload.position()
    }

    /// Whether this event is routed by hit-testing.
    #[must_use]
    pub fn is_positional(&self) -> bool {
        self.position().is_some()
    }

    /// Convert a Crossterm event into a hitflow [`Event`] stamped with `timestamp`.
    #[must_use]
    #[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
    pub fn from_crossterm(event: cte::Event, timestamp: Instant) -> Option<Self> {
        map_crossterm_event_internal(event, timestamp)
    }
}

/// Kind-specific event data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventPayload {
    /// Pointer press, release, move or drag.
    Pointer(PointerEvent),
    /// Scroll delta at a pointer position.
    Scroll(ScrollEvent),
    /// Keyboard event.
    Key(KeyEvent),
    /// Committed text.
    Text(String),
    /// New viewport size.
    Resize { width: u32, height: u32 },
    /// `true` = focus gained.
    Focus(bool),
    /// Opaque application value.
    Custom(u64),
    /// No payload.
    #[default]
    Empty,
}

impl EventPayload {
    /// Pointer position, for pointer and scroll payloads.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        match self {
            EventPayload::Pointer(p) => Some(Point::new(p.x, p.y)),
            EventPayload::Scroll(s) => Some(Point::new(s.x, s.y)),
            _ => None,
        }
    }
}

/// A pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
    /// Button involved, if any.
    pub button: Option<MouseButton>,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a pointer sample with no button and no modifiers.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            button: None,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach a button.
    #[must_use]
    pub const fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A scroll sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollEvent {
    pub x: i32,
    pub y: i32,
    /// Horizontal delta (positive = right).
    pub dx: i32,
    /// Vertical delta (positive = down).
    pub dy: i32,
    pub modifiers: Modifiers,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// True for auto-repeat presses.
    pub repeat: bool,
}

impl KeyEvent {
    /// Create a new key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            repeat: false,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Mark the event as an auto-repeat.
    #[must_use]
    pub const fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// Function key (F1-F24).
    F(u8),
    Null,
}

bitflags! {
    /// Modifier keys that can be held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_crossterm_event_internal(event: cte::Event, timestamp: Instant) -> Option<Event> {
    match event {
        cte::Event::Key(key) => map_key_event(key, timestamp),
        cte::Event::Mouse(mouse) => Some(map_mouse_event(mouse, timestamp)),
        cte::Event::Resize(width, height) => {
            Some(Event::resize(u32::from(width), u32::from(height), timestamp))
        }
        cte::Event::Paste(text) => Some(Event::text(text, timestamp)),
        cte::Event::FocusGained => Some(Event::focus(true, timestamp)),
        cte::Event::FocusLost => Some(Event::focus(false, timestamp)),
    }
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_key_event(event: cte::KeyEvent, timestamp: Instant) -> Option<Event> {
    let code = map_key_code(event.code)?;
    let mut key = KeyEvent::new(code).with_modifiers(map_modifiers(event.modifiers));
    match event.kind {
        cte::KeyEventKind::Press => Some(Event::key_down(key, timestamp)),
        cte::KeyEventKind::Repeat => {
            key = key.repeated();
            Some(Event::key_down(key, timestamp))
        }
        cte::KeyEventKind::Release => Some(Event::key_up(key, timestamp)),
    }
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Home => Some(KeyCode::Home),
        cte::KeyCode::End => Some(KeyCode::End),
        cte::KeyCode::PageUp => Some(KeyCode::PageUp),
        cte::KeyCode::PageDown => Some(KeyCode::PageDown),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::BackTab => Some(KeyCode::BackTab),
        cte::KeyCode::Delete => Some(KeyCode::Delete),
        cte::KeyCode::Insert => Some(KeyCode::Insert),
        cte::KeyCode::F(n) => Some(KeyCode::F(n)),
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Null => Some(KeyCode::Null),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        _ => None,
    }
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(cte::KeyModifiers::SUPER)
        || modifiers.contains(cte::KeyModifiers::HYPER)
        || modifiers.contains(cte::KeyModifiers::META)
    {
        mapped |= Modifiers::SUPER;
    }
    mapped
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_mouse_event(event: cte::MouseEvent, timestamp: Instant) -> Event {
    let x = i32::from(event.column);
    let y = i32::from(event.row);
    let modifiers = map_modifiers(event.modifiers);
    let pointer = |kind: EventKind, button: Option<MouseButton>| {
        let mut p = PointerEvent::new(x, y).with_modifiers(modifiers);
        p.button = button;
        Event::new(kind, EventPayload::Pointer(p), timestamp)
    };
    let scroll = |dx: i32, dy: i32| {
        Event::new(
            EventKind::Scroll,
            EventPayload::Scroll(ScrollEvent {
                x,
                y,
                dx,
                dy,
                modifiers,
            }),
            timestamp,
        )
    };

    match event.kind {
        cte::MouseEventKind::Down(b) => pointer(EventKind::PointerDown, Some(map_mouse_button(b))),
        cte::MouseEventKind::Up(b) => pointer(EventKind::PointerUp, Some(map_mouse_button(b))),
        cte::MouseEventKind::Drag(b) => pointer(EventKind::PointerDrag, Some(map_mouse_button(b))),
        cte::MouseEventKind::Moved => pointer(EventKind::PointerMove, None),
        cte::MouseEventKind::ScrollUp => scroll(0, -1),
        cte::MouseEventKind::ScrollDown => scroll(0, 1),
        cte::MouseEventKind::ScrollLeft => scroll(-1, 0),
        cte::MouseEventKind::ScrollRight => scroll(1, 0),
    }
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_mouse_button(button: cte::MouseButton) -> MouseButton {
    match button {
        cte::MouseButton::Left => MouseButton::Left,
        cte::MouseButton::Right => MouseButton::Right,
        cte::MouseButton::Middle => MouseButton::Middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_is_char() {
        let event = KeyEvent::new(KeyCode::Char('q'));
        assert!(event.is_char('q'));
        assert!(!event.is_char('x'));
    }

    #[test]
    fn key_event_combined_modifiers() {
        let event =
            KeyEvent::new(KeyCode::Char('s')).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(event.ctrl());
        assert!(event.shift());
        assert!(!event.alt());
    }

    #[test]
    fn pointer_events_are_positional() {
        let now = Instant::now();
        let down = Event::pointer_down(3, 4, MouseButton::Left, now);
        assert_eq!(down.kind, EventKind::PointerDown);
        assert_eq!(down.position(), Some(Point::new(3, 4)));
        assert!(down.is_positional());

        let scroll = Event::scroll(-2, 7, 0, 1, now);
        assert_eq!(scroll.position(), Some(Point::new(-2, 7)));
    }

    #[test]
    fn keyboard_and_lifecycle_events_are_not_positional() {
        let now = Instant::now();
        assert!(!Event::key_down(KeyEvent::new(KeyCode::Enter), now).is_positional());
        assert!(!Event::text("hi", now).is_positional());
        assert!(!Event::resize(80, 24, now).is_positional());
        assert!(!Event::focus(true, now).is_positional());
        assert!(!Event::custom(7, 1, now).is_positional());
    }

    #[test]
    fn kind_classes() {
        assert_eq!(EventKind::PointerDown.class(), EventClass::Discrete);
        assert_eq!(EventKind::Text.class(), EventClass::Discrete);
        assert_eq!(EventKind::PointerMove.class(), EventClass::Continuous);
        assert_eq!(EventKind::Scroll.class(), EventClass::Continuous);
        assert_eq!(EventKind::Resize.class(), EventClass::Lifecycle);
        assert_eq!(EventKind::Custom(3).class(), EventClass::Custom);
    }

    #[test]
    fn kind_display() {
        assert_eq!(EventKind::PointerMove.to_string(), "pointer_move");
        assert_eq!(EventKind::Custom(12).to_string(), "custom(12)");
    }

    #[test]
    fn builtin_kinds_are_unique() {
        let mut kinds = EventKind::BUILTIN.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), EventKind::BUILTIN.len());
    }

    #[test]
    fn modifiers_default() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn payload_default_is_empty() {
        assert_eq!(EventPayload::default(), EventPayload::Empty);
        assert_eq!(EventPayload::Empty.position(), None);
    }

    #[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
    mod crossterm_mapping {
        use super::*;
        use crossterm::event as ct_event;

        #[test]
        fn map_modifiers_super_variants() {
            assert!(map_modifiers(ct_event::KeyModifiers::SUPER).contains(Modifiers::SUPER));
            assert!(map_modifiers(ct_event::KeyModifiers::HYPER).contains(Modifiers::SUPER));
            assert!(map_modifiers(ct_event::KeyModifiers::META).contains(Modifiers::SUPER));
        }

        #[test]
        fn map_mouse_down() {
            let now = Instant::now();
            let ev = ct_event::MouseEvent {
                kind: ct_event::MouseEventKind::Down(ct_event::MouseButton::Left),
                column: 10,
                row: 5,
                modifiers: ct_event::KeyModifiers::SHIFT,
            };
            let mapped = map_mouse_event(ev, now);
            assert_eq!(mapped.kind, EventKind::PointerDown);
            assert_eq!(mapped.position(), Some(Point::new(10, 5)));
            match mapped.payload {
                EventPayload::Pointer(p) => {
                    assert_eq!(p.button, Some(MouseButton::Left));
                    assert!(p.modifiers.contains(Modifiers::SHIFT));
                }
                other => panic!("expected pointer payload, got {other:?}"),
            }
        }

        #[test]
        fn map_scroll_directions() {
            let now = Instant::now();
            let make = |kind| ct_event::MouseEvent {
                kind,
                column: 0,
                row: 0,
                modifiers: ct_event::KeyModifiers::NONE,
            };
            let cases = [
                (ct_event::MouseEventKind::ScrollUp, (0, -1)),
                (ct_event::MouseEventKind::ScrollDown, (0, 1)),
                (ct_event::MouseEventKind::ScrollLeft, (-1, 0)),
                (ct_event::MouseEventKind::ScrollRight, (1, 0)),
            ];
            for (kind, (dx, dy)) in cases {
                let mapped = map_mouse_event(make(kind), now);
                assert_eq!(mapped.kind, EventKind::Scroll);
                match mapped.payload {
                    EventPayload::Scroll(s) => assert_eq!((s.dx, s.dy), (dx, dy)),
                    other => panic!("expected scroll payload, got {other:?}"),
                }
            }
        }

        #[test]
        fn map_key_release_is_key_up() {
            let now = Instant::now();
            let ev = ct_event::KeyEvent {
                code: ct_event::KeyCode::Char('x'),
                modifiers: ct_event::KeyModifiers::CONTROL,
                kind: ct_event::KeyEventKind::Release,
                state: ct_event::KeyEventState::NONE,
            };
            let mapped = map_key_event(ev, now).expect("should map");
            assert_eq!(mapped.kind, EventKind::KeyUp);
        }

        #[test]
        fn map_paste_is_text() {
            let now = Instant::now();
            let mapped = Event::from_crossterm(ct_event::Event::Paste("hello".into()), now)
                .expect("should map");
            assert_eq!(mapped.kind, EventKind::Text);
            assert_eq!(mapped.payload, EventPayload::Text("hello".into()));
        }

        #[test]
        fn map_focus_and_resize() {
            let now = Instant::now();
            let gained = Event::from_crossterm(ct_event::Event::FocusGained, now).expect("map");
            assert_eq!(gained.payload, EventPayload::Focus(true));
            let resized = Event::from_crossterm(ct_event::Event::Resize(80, 24), now).expect("map");
            assert_eq!(
                resized.payload,
                EventPayload::Resize {
                    width: 80,
                    height: 24
                }
            );
        }
    }
}
