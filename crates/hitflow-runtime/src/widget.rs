#![forbid(unsafe_code)]

//! Widget capability interface consumed by the dispatcher.
//!
//! The dispatcher only needs three things from a widget tree: who a
//! widget's parent is, which widget has focus, and a way to hand a widget
//! an event. [`WidgetTree`] captures exactly that. [`WidgetArena`] is a
//! reference implementation with leaf and composite widgets stored in a
//! slot arena; parents own their child lists, children hold a plain
//! [`WidgetId`] back-reference.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Delivery to a removed id | `deliver` returns `None` |
//! | Target rejects the event (`accepts == false`) | Treated as `Handled::No` |
//! | Handler panics | Caught by [`guard_handler`], reported as `HandlerError::Panicked` |

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use hitflow_core::event::Event;
use hitflow_core::widget_id::WidgetId;

// ---------------------------------------------------------------------------
// Handler results
// ---------------------------------------------------------------------------

/// Whether a widget consumed an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Consumed; stop routing.
    Yes,
    /// Not consumed; keep routing.
    No,
}

impl From<bool> for Handled {
    fn from(consumed: bool) -> Self {
        if consumed { Handled::Yes } else { Handled::No }
    }
}

/// An event handler failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler returned an error.
    Failed(String),
    /// The handler panicked; the panic message is captured.
    Panicked(String),
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Capture a panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Panicked(message)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(msg) => write!(f, "handler failed: {msg}"),
            Self::Panicked(msg) => write!(f, "handler panicked: {msg}"),
        }
    }
}

impl std::error::Error for HandlerError {}

/// Run a handler, converting a panic into [`HandlerError::Panicked`].
pub fn guard_handler<R>(f: impl FnOnce() -> Result<R, HandlerError>) -> Result<R, HandlerError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::from_panic(payload)),
    }
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// Something that can receive events.
pub trait EventTarget {
    /// Whether this target wants `event` at all. Defaults to `true`.
    fn accepts(&self, _event: &Event) -> bool {
        true
    }

    /// Handle `event`.
    fn handle(&mut self, event: &Event) -> Result<Handled, HandlerError>;
}

impl<F> EventTarget for F
where
    F: FnMut(&Event) -> Result<Handled, HandlerError>,
{
    fn handle(&mut self, event: &Event) -> Result<Handled, HandlerError> {
        self(event)
    }
}

/// The widget tree as seen by the dispatcher.
pub trait WidgetTree {
    /// Parent of `id`, or `None` for roots and unknown ids.
    fn parent(&self, id: WidgetId) -> Option<WidgetId>;

    /// Widget holding keyboard focus.
    fn focused(&self) -> Option<WidgetId>;

    /// Deliver `event` to `id`. Returns `None` if `id` is not in the tree.
    fn deliver(&mut self, id: WidgetId, event: &Event) -> Option<Result<Handled, HandlerError>>;
}

// ---------------------------------------------------------------------------
// WidgetArena
// ---------------------------------------------------------------------------

/// A widget node.
pub enum Widget {
    /// Terminal widget with its own handler.
    Leaf(Box<dyn EventTarget>),
    /// Container; may handle events bubbling up from its children.
    Composite {
        children: Vec<WidgetId>,
        target: Option<Box<dyn EventTarget>>,
    },
}

impl Widget {
    /// Whether this is a composite.
    pub fn is_composite(&self) -> bool {
        matches!(self, Widget::Composite { .. })
    }

    /// Child ids (empty for leaves).
    pub fn children(&self) -> &[WidgetId] {
        match self {
            Widget::Leaf(_) => &[],
            Widget::Composite { children, .. } => children,
        }
    }

    fn deliver(&mut self, event: &Event) -> Result<Handled, HandlerError> {
        let target = match self {
            Widget::Leaf(target) => Some(target),
            Widget::Composite { target, .. } => target.as_mut(),
        };
        match target {
            Some(t) if t.accepts(event) => t.handle(event),
            _ => Ok(Handled::No),
        }
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Widget::Leaf(_) => f.write_str("Leaf"),
            Widget::Composite { children, target } => f
                .debug_struct("Composite")
                .field("children", children)
                .field("has_target", &target.is_some())
                .finish(),
        }
    }
}

/// Errors from arena mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The requested parent is not in the arena.
    UnknownParent(WidgetId),
    /// The requested parent is a leaf.
    NotComposite(WidgetId),
    /// Every `u32` id has been handed out.
    IdsExhausted,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParent(id) => write!(f, "parent widget {id} does not exist"),
            Self::NotComposite(id) => write!(f, "widget {id} is a leaf and cannot have children"),
            Self::IdsExhausted => write!(f, "widget arena has no ids left"),
        }
    }
}

impl std::error::Error for TreeError {}

#[derive(Debug)]
struct Slot {
    widget: Widget,
    parent: Option<WidgetId>,
}

/// Slot-arena widget tree.
///
/// Ids are slot indices and are never reused, so a stale id held by the
/// spatial index resolves to nothing instead of to a different widget.
#[derive(Debug, Default)]
pub struct WidgetArena {
    slots: Vec<Option<Slot>>,
    focused: Option<WidgetId>,
    live: usize,
}

impl WidgetArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf under `parent` (or as a root).
    pub fn insert_leaf(
        &mut self,
        parent: Option<WidgetId>,
        target: impl EventTarget + 'static,
    ) -> Result<WidgetId, TreeError> {
        self.insert(parent, Widget::Leaf(Box::new(target)))
    }

    /// Add a composite under `parent` (or as a root).
    pub fn insert_composite(
        &mut self,
        parent: Option<WidgetId>,
        target: Option<Box<dyn EventTarget>>,
    ) -> Result<WidgetId, TreeError> {
        self.insert(
            parent,
            Widget::Composite {
                children: Vec::new(),
                target,
            },
        )
    }

    fn insert(&mut self, parent: Option<WidgetId>, widget: Widget) -> Result<WidgetId, TreeError> {
        if let Some(pid) = parent {
            match self.slot(pid) {
                None => return Err(TreeError::UnknownParent(pid)),
                Some(slot) if !slot.widget.is_composite() => {
                    return Err(TreeError::NotComposite(pid));
                }
                Some(_) => {}
            }
        }

        let id = slot_id(self.slots.len())?;
        self.slots.push(Some(Slot { widget, parent }));
        self.live += 1;

        if let Some(Widget::Composite { children, .. }) =
            parent.and_then(|pid| self.slot_mut(pid)).map(|s| &mut s.widget)
        {
            children.push(id);
        }
        Ok(id)
    }

    /// Remove `id` and its whole subtree. Returns the removed ids.
    pub fn remove(&mut self, id: WidgetId) -> Vec<WidgetId> {
        let Some(parent) = self.slot(id).map(|s| s.parent) else {
            return Vec::new();
        };
        if let Some(Widget::Composite { children, .. }) =
            parent.and_then(|pid| self.slot_mut(pid)).map(|s| &mut s.widget)
        {
            children.retain(|c| *c != id);
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(slot) = self.slots.get_mut(next.id() as usize).and_then(Option::take) else {
                continue;
            };
            self.live -= 1;
            stack.extend_from_slice(slot.widget.children());
            removed.push(next);
        }

        if self.focused.is_some_and(|f| removed.contains(&f)) {
            self.focused = None;
        }
        removed
    }

    /// Give focus to `id`. Returns `false` if `id` is not in the arena.
    pub fn set_focus(&mut self, id: WidgetId) -> bool {
        if self.contains(id) {
            self.focused = Some(id);
            true
        } else {
            false
        }
    }

    /// Drop focus.
    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    /// Whether `id` is live.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.slot(id).is_some()
    }

    /// Borrow a widget.
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.slot(id).map(|s| &s.widget)
    }

    /// Children of `id` (empty for leaves and unknown ids).
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        match self.get(id) {
            Some(widget) => widget.children(),
            None => &[],
        }
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: WidgetId) -> impl Iterator<Item = WidgetId> + '_ {
        std::iter::successors(self.contains(id).then_some(id), |cur| self.parent(*cur))
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn slot(&self, id: WidgetId) -> Option<&Slot> {
        self.slots.get(id.id() as usize).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: WidgetId) -> Option<&mut Slot> {
        self.slots.get_mut(id.id() as usize).and_then(Option::as_mut)
    }
}

impl WidgetTree for WidgetArena {
    fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.slot(id).and_then(|s| s.parent)
    }

    fn focused(&self) -> Option<WidgetId> {
        self.focused
    }

    fn deliver(&mut self, id: WidgetId, event: &Event) -> Option<Result<Handled, HandlerError>> {
        self.slot_mut(id).map(|s| s.widget.deliver(event))
    }
}

/// Id for the slot at `index`; fails once indices leave the `u32` range.
fn slot_id(index: usize) -> Result<WidgetId, TreeError> {
    u32::try_from(index)
        .map(WidgetId::new)
        .map_err(|_| TreeError::IdsExhausted)
}
