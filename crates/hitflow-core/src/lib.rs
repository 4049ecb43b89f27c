#![forbid(unsafe_code)]

//! Core: geometry, widget ids, canonical events, and the logging shim.

pub mod event;
pub mod geometry;
pub mod logging;
pub mod widget_id;

pub use event::{Event, EventKind, EventPayload};
pub use geometry::{Point, Rect};
pub use widget_id::WidgetId;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
