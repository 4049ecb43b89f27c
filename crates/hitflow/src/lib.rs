#![forbid(unsafe_code)]

//! hitflow public facade crate.
//!
//! Re-exports the input pipeline from its internal crates and offers a
//! prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use hitflow_core::event::{
    Event, EventClass, EventKind, EventPayload, KeyCode, KeyEvent, Modifiers, MouseButton,
    PointerEvent, ScrollEvent,
};
pub use hitflow_core::geometry::{Point, Rect};
pub use hitflow_core::widget_id::WidgetId;

// --- Spatial re-exports ----------------------------------------------------

pub use hitflow_spatial::{
    HitStats, Interval, IntervalError, IntervalTree, SpatialConfig, SpatialError, SpatialIndex,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use hitflow_runtime::{
    Clock, DispatchOutcome, Dispatcher, DrainReport, EventScheduler, EventTarget, Handled,
    HandlerError, HandlerFailure, KindPolicy, ManualClock, Pattern, PolicyTable, Priority,
    SchedulerConfig, SystemClock, TreeError, WidgetArena, WidgetTree,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for hitflow hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed interval passed to an interval tree.
    Interval(IntervalError<i32>),
    /// Spatial index rejected a widget operation.
    Spatial(SpatialError),
    /// Widget arena rejected a structural change.
    #[cfg(feature = "runtime")]
    Tree(TreeError),
    /// An event handler failed.
    #[cfg(feature = "runtime")]
    Handler(HandlerError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval(err) => write!(f, "{err}"),
            Self::Spatial(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Tree(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Handler(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<IntervalError<i32>> for Error {
    fn from(err: IntervalError<i32>) -> Self {
        Self::Interval(err)
    }
}

impl From<SpatialError> for Error {
    fn from(err: SpatialError) -> Self {
        Self::Spatial(err)
    }
}

#[cfg(feature = "runtime")]
impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

#[cfg(feature = "runtime")]
impl From<HandlerError> for Error {
    fn from(err: HandlerError) -> Self {
        Self::Handler(err)
    }
}

/// Standard result type for hitflow APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, Event, EventKind, KeyCode, KeyEvent, MouseButton, Point, Rect, Result,
        SpatialConfig, SpatialIndex, WidgetId,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        DispatchOutcome, Dispatcher, DrainReport, EventScheduler, EventTarget, Handled,
        HandlerError, KindPolicy, Pattern, PolicyTable, Priority, SchedulerConfig, WidgetArena,
        WidgetTree,
    };

    pub use crate::{core, spatial};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use hitflow_core as core;
#[cfg(feature = "runtime")]
pub use hitflow_runtime as runtime;
pub use hitflow_spatial as spatial;

#[cfg(all(test, feature = "runtime"))]
mod tests {
    use super::prelude::*;
    use std::time::Duration;

    fn build(index: &mut SpatialIndex) -> Result<()> {
        index.insert_widget(WidgetId::new(1), Rect::new(0, 0, 10, 10), 0)?;
        index.insert_widget(WidgetId::new(1), Rect::new(0, 0, 10, 10), 0)?;
        Ok(())
    }

    #[test]
    fn spatial_errors_convert() {
        let mut index = SpatialIndex::with_defaults();
        let err = build(&mut index).unwrap_err();
        assert_eq!(
            err,
            Error::Spatial(crate::SpatialError::DuplicateWidget(WidgetId::new(1)))
        );
        assert_eq!(err.to_string(), "widget #1 is already registered");
    }

    #[test]
    fn prelude_is_enough_for_a_pipeline() {
        let mut arena = WidgetArena::new();
        let id = arena
            .insert_leaf(None, |_: &Event| -> std::result::Result<Handled, HandlerError> {
                Ok(Handled::Yes)
            })
            .unwrap();
        let mut dispatcher = Dispatcher::new(
            EventScheduler::new(SchedulerConfig::default()),
            SpatialIndex::with_defaults(),
            arena,
        );
        dispatcher
            .insert_widget(id, Rect::new(0, 0, 10, 10), 0)
            .unwrap();
        dispatcher.ingest_event(Event::pointer_down(
            1,
            1,
            MouseButton::Left,
            std::time::Instant::now(),
        ));
        let report = dispatcher.drain(Duration::from_millis(8));
        assert_eq!(report.processed, 1);
        assert_eq!(dispatcher.stats().handled, 1);
    }
}
