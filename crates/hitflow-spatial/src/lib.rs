#![forbid(unsafe_code)]

//! Spatial lookup: an augmented interval tree and the dual-axis hit-test
//! index built on top of it.

pub mod interval_tree;
pub mod spatial_index;

pub use interval_tree::{Interval, IntervalError, IntervalTree};
pub use spatial_index::{HitStats, SpatialConfig, SpatialError, SpatialIndex, WidgetEntry};
