#![forbid(unsafe_code)]

//! Input pipeline runtime.
//!
//! # Key Components
//!
//! - [`EventScheduler`] - per-kind coalescing (immediate, ordered,
//!   replace-latest, debounce, throttle, batch) with a time-budgeted drain
//! - [`CostEstimator`] - per-kind EWMA of handler cost used by the drain budget
//! - [`Dispatcher`] - hit-tests positional events and bubbles the rest from focus
//! - [`WidgetTree`] / [`EventTarget`] - what the dispatcher needs from widgets
//! - [`Clock`] - injected time source ([`SystemClock`], [`ManualClock`])
//!
//! # How it fits in the system
//! `hitflow-core` defines events and geometry, `hitflow-spatial` answers
//! "what is under the pointer", and this crate decides when each event is
//! handled and who handles it.

pub mod clock;
pub mod cost;
pub mod debug_trace;
pub mod dispatcher;
pub mod policy;
pub mod scheduler;
pub mod widget;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cost::CostEstimator;
pub use dispatcher::{DispatchOutcome, DispatchStats, Dispatcher};
pub use policy::{KindPolicy, Pattern, PolicyTable, Priority};
pub use scheduler::{
    DrainReport, EventScheduler, HandlerFailure, IngestOutcome, SchedulerConfig, SchedulerStats,
};
pub use widget::{
    EventTarget, Handled, HandlerError, TreeError, Widget, WidgetArena, WidgetTree, guard_handler,
};
