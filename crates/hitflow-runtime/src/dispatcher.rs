#![forbid(unsafe_code)]

//! Routes scheduled events to widgets.
//!
//! The dispatcher owns the three collaborators of the input pipeline and is
//! the only place they meet:
//!
//! ```text
//! ingest_event ──► EventScheduler ──drain──► route ──► WidgetTree
//!                                              │
//!                                   SpatialIndex (hit test)
//! ```
//!
//! Positional events go front-to-back through the widgets under the
//! pointer until one reports [`Handled::Yes`]. Everything else goes to the
//! focused widget and bubbles up through its ancestors.

use std::time::Duration;

use hitflow_core::event::Event;
use hitflow_core::geometry::Rect;
use hitflow_core::widget_id::WidgetId;
use hitflow_spatial::{SpatialError, SpatialIndex};
use tracing::trace;

use crate::clock::{Clock, SystemClock};
use crate::scheduler::{DrainReport, EventScheduler, IngestOutcome};
use crate::widget::{Handled, HandlerError, WidgetTree, guard_handler};

/// Where a single event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// This widget consumed the event.
    Handled(WidgetId),
    /// At least one widget saw the event; none consumed it.
    Unhandled,
    /// No live widget to deliver to.
    NoTarget,
}

/// Per-outcome dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub handled: u64,
    pub unhandled: u64,
    pub no_target: u64,
    pub failed: u64,
}

impl DispatchStats {
    fn record(&mut self, result: &Result<DispatchOutcome, HandlerError>) {
        match result {
            Ok(DispatchOutcome::Handled(_)) => self.handled += 1,
            Ok(DispatchOutcome::Unhandled) => self.unhandled += 1,
            Ok(DispatchOutcome::NoTarget) => self.no_target += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Scheduler + spatial index + widget tree.
#[derive(Debug)]
pub struct Dispatcher<T: WidgetTree, C: Clock = SystemClock> {
    scheduler: EventScheduler<C>,
    index: SpatialIndex,
    tree: T,
    stats: DispatchStats,
}

impl<T: WidgetTree, C: Clock> Dispatcher<T, C> {
    /// Assemble a dispatcher from its collaborators.
    pub fn new(scheduler: EventScheduler<C>, index: SpatialIndex, tree: T) -> Self {
        Self {
            scheduler,
            index,
            tree,
            stats: DispatchStats::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Spatial forwarding
    // -----------------------------------------------------------------------

    /// Register a widget's bounds for hit-testing.
    pub fn insert_widget(
        &mut self,
        id: WidgetId,
        bounds: Rect,
        z_index: i32,
    ) -> Result<(), SpatialError> {
        self.index.insert_widget(id, bounds, z_index)
    }

    /// Move a widget's hit-test bounds.
    pub fn update_widget(
        &mut self,
        id: WidgetId,
        previous_bounds: Rect,
        bounds: Rect,
    ) -> Result<(), SpatialError> {
        self.index.update_widget(id, previous_bounds, bounds)
    }

    /// Stop hit-testing a widget.
    pub fn remove_widget(&mut self, id: WidgetId) -> bool {
        self.index.remove_widget(id)
    }

    /// Widgets under `(x, y)`, topmost first.
    pub fn find_widgets_at(&self, x: i32, y: i32) -> Vec<WidgetId> {
        self.index.find_widgets_at(x, y)
    }

    /// Topmost widget under `(x, y)`.
    pub fn find_top_widget_at(&self, x: i32, y: i32) -> Option<WidgetId> {
        self.index.find_top_widget_at(x, y)
    }

    // -----------------------------------------------------------------------
    // Scheduling
    // -----------------------------------------------------------------------

    /// Hand an event to the scheduler.
    pub fn ingest_event(&mut self, event: Event) -> IngestOutcome {
        self.scheduler.ingest(event)
    }

    /// Flush due coalesced events into the ready queue.
    pub fn tick(&mut self) -> usize {
        self.scheduler.tick()
    }

    /// Route queued events to widgets within `budget`.
    pub fn drain(&mut self, budget: Duration) -> DrainReport {
        let Self {
            scheduler,
            index,
            tree,
            stats,
        } = self;
        scheduler.drain(budget, |event| {
            let result = guard_handler(|| route(index, tree, event));
            stats.record(&result);
            result.map(|_| ())
        })
    }

    /// Route one event right away, bypassing the scheduler.
    ///
    /// Handler panics are caught and reported as [`HandlerError::Panicked`].
    pub fn dispatch(&mut self, event: &Event) -> Result<DispatchOutcome, HandlerError> {
        let result = guard_handler(|| route(&self.index, &mut self.tree, event));
        self.stats.record(&result);
        result
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Dispatch counters.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn scheduler(&self) -> &EventScheduler<C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut EventScheduler<C> {
        &mut self.scheduler
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut SpatialIndex {
        &mut self.index
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    /// Take the collaborators back.
    pub fn into_parts(self) -> (EventScheduler<C>, SpatialIndex, T) {
        (self.scheduler, self.index, self.tree)
    }
}

/// Resolve and deliver one event.
fn route<T: WidgetTree>(
    index: &SpatialIndex,
    tree: &mut T,
    event: &Event,
) -> Result<DispatchOutcome, HandlerError> {
    match event.position() {
        Some(p) => route_positional(index, tree, event, p.x, p.y),
        None => route_focused(tree, event),
    }
}

fn route_positional<T: WidgetTree>(
    index: &SpatialIndex,
    tree: &mut T,
    event: &Event,
    x: i32,
    y: i32,
) -> Result<DispatchOutcome, HandlerError> {
    let mut delivered = false;
    for id in index.find_widgets_at(x, y) {
        match tree.deliver(id, event) {
            // Registered in the index but gone from the tree.
            None => continue,
            Some(Ok(Handled::Yes)) => {
                trace!(kind = %event.kind, widget = id.id(), "event handled");
                return Ok(DispatchOutcome::Handled(id));
            }
            Some(Ok(Handled::No)) => delivered = true,
            Some(Err(e)) => return Err(e),
        }
    }
    Ok(if delivered {
        DispatchOutcome::Unhandled
    } else {
        DispatchOutcome::NoTarget
    })
}

fn route_focused<T: WidgetTree>(
    tree: &mut T,
    event: &Event,
) -> Result<DispatchOutcome, HandlerError> {
    let mut current = tree.focused();
    let mut delivered = false;
    while let Some(id) = current {
        match tree.deliver(id, event) {
            None => break,
            Some(Ok(Handled::Yes)) => {
                trace!(kind = %event.kind, widget = id.id(), "event handled");
                return Ok(DispatchOutcome::Handled(id));
            }
            Some(Ok(Handled::No)) => delivered = true,
            Some(Err(e)) => return Err(e),
        }
        current = tree.parent(id);
    }
    Ok(if delivered {
        DispatchOutcome::Unhandled
    } else {
        DispatchOutcome::NoTarget
    })
}
