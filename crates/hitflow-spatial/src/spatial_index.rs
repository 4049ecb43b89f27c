#![forbid(unsafe_code)]

//! Dual-axis spatial hit-test index with z-order support.
//!
//! Answers "which widgets contain point (x, y)" and "which widgets overlap
//! rectangle R" in logarithmic time for thousands of widgets.
//!
//! # Design
//!
//! - **Two interval trees**: every widget contributes `[x, x+w)` to the
//!   x-axis tree and `[y, y+h)` to the y-axis tree, both tagged with its id
//! - **Set intersection**: a point query stabs both trees and keeps ids
//!   present in both; the smaller candidate set is hashed, the larger one
//!   probes it
//! - **Exact re-check**: survivors are verified against the registered
//!   rectangle before being returned
//! - **Z-order**: results are sorted front-to-back
//!
//! Widgets rarely overlap heavily, so per-axis candidate sets stay small and
//! the intersection cost is bounded by the smaller set.
//!
//! # Invariants
//!
//! 1. Results are strictly descending by z-index
//! 2. Ties broken by registration order (later = on top)
//! 3. Each registered widget has exactly one entry per axis tree
//! 4. A failed insert or update leaves the index unchanged
//!
//! # Failure Modes
//!
//! - Empty, negative or overflowing rectangles are rejected with
//!   [`SpatialError::InvalidBounds`]
//! - A stale `previous_bounds` on update falls back to the registered
//!   bounds (logged) so no phantom entries remain
//! - Point queries over a heavily stacked area log a warning once the
//!   candidate count passes `overlap_warn_threshold`

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

use hitflow_core::geometry::Rect;
use hitflow_core::widget_id::WidgetId;
use smallvec::SmallVec;

use crate::interval_tree::{Interval, IntervalTree};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the spatial index.
#[derive(Debug, Clone)]
pub struct SpatialConfig {
    /// Number of widgets under a single point before logging a warning (default: 64).
    pub overlap_warn_threshold: usize,

    /// Count queries and candidates for diagnostics (default: false).
    pub track_stats: bool,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            overlap_warn_threshold: 64,
            track_stats: false,
        }
    }
}

impl SpatialConfig {
    /// Set the overlap warning threshold.
    #[must_use]
    pub fn with_overlap_warn_threshold(mut self, threshold: usize) -> Self {
        self.overlap_warn_threshold = threshold;
        self
    }

    /// Enable or disable statistics tracking.
    #[must_use]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.track_stats = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Spatial index errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialError {
    /// Rectangle is empty, negative-sized, or its far edge overflows.
    InvalidBounds(Rect),
    /// The widget id is already registered.
    DuplicateWidget(WidgetId),
    /// The widget id is not registered.
    NotFound(WidgetId),
}

impl fmt::Display for SpatialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds(r) => write!(
                f,
                "invalid widget bounds: x={} y={} w={} h={}",
                r.x, r.y, r.width, r.height
            ),
            Self::DuplicateWidget(id) => write!(f, "widget {id} is already registered"),
            Self::NotFound(id) => write!(f, "widget {id} is not registered"),
        }
    }
}

impl std::error::Error for SpatialError {}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Diagnostic statistics for hit-test queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitStats {
    /// Point and rectangle queries answered.
    pub queries: u64,
    /// Axis-tree candidates examined across all queries.
    pub candidates: u64,
    /// Widgets returned across all queries.
    pub hits: u64,
    /// Full rebuilds.
    pub rebuilds: u64,
}

impl HitStats {
    /// Fraction of axis candidates that survived intersection, as a percentage.
    pub fn selectivity(&self) -> f32 {
        if self.candidates == 0 {
            0.0
        } else {
            (self.hits as f32 / self.candidates as f32) * 100.0
        }
    }
}

// ---------------------------------------------------------------------------
// Registry entry
// ---------------------------------------------------------------------------

/// A registered widget's hit information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetEntry {
    /// Bounding rectangle.
    pub bounds: Rect,
    /// Stacking order (higher = on top).
    pub z_index: i32,
    /// Registration order for tie-breaking.
    order: u64,
}

impl WidgetEntry {
    /// Compare for z-order (higher z wins, then later order wins).
    #[inline]
    fn cmp_z_order(&self, other: &Self) -> Ordering {
        match self.z_index.cmp(&other.z_index) {
            Ordering::Equal => self.order.cmp(&other.order),
            ord => ord,
        }
    }
}

// ---------------------------------------------------------------------------
// SpatialIndex
// ---------------------------------------------------------------------------

/// Hit-test service over two axis interval trees.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    config: SpatialConfig,

    x_tree: IntervalTree<i32, WidgetId>,
    y_tree: IntervalTree<i32, WidgetId>,

    /// All registered widgets.
    widgets: HashMap<WidgetId, WidgetEntry>,

    /// Registration counter for tie-breaking.
    next_order: u64,

    /// Diagnostic statistics (queries take `&self`).
    stats: Cell<HitStats>,
}

impl SpatialIndex {
    /// Create an empty index.
    pub fn new(config: SpatialConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SpatialConfig::default())
    }

    /// Register a widget's bounds.
    ///
    /// # Errors
    ///
    /// [`SpatialError::InvalidBounds`] for malformed rectangles and
    /// [`SpatialError::DuplicateWidget`] if `id` is already registered. The
    /// index is unchanged on error.
    pub fn insert_widget(
        &mut self,
        id: WidgetId,
        bounds: Rect,
        z_index: i32,
    ) -> Result<(), SpatialError> {
        validate(bounds)?;
        if self.widgets.contains_key(&id) {
            return Err(SpatialError::DuplicateWidget(id));
        }

        self.insert_axes(id, bounds)?;
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.widgets.insert(
            id,
            WidgetEntry {
                bounds,
                z_index,
                order,
            },
        );
        hitflow_core::trace!(widget = id.id(), z_index, "spatial: widget inserted");
        Ok(())
    }

    /// Move a widget from `previous_bounds` to `bounds`.
    ///
    /// The layout pass must call this before the next hit-test is expected
    /// to observe the new bounds. Registration order and z-index are kept.
    ///
    /// # Errors
    ///
    /// [`SpatialError::InvalidBounds`] if `bounds` is malformed (index
    /// unchanged), [`SpatialError::NotFound`] if `id` is not registered.
    pub fn update_widget(
        &mut self,
        id: WidgetId,
        previous_bounds: Rect,
        bounds: Rect,
    ) -> Result<(), SpatialError> {
        validate(bounds)?;
        let Some(stored) = self.widgets.get(&id).map(|e| e.bounds) else {
            return Err(SpatialError::NotFound(id));
        };

        if !self.remove_axes(id, previous_bounds) {
            hitflow_core::debug!(
                widget = id.id(),
                "spatial: stale previous bounds, using registered bounds"
            );
            self.remove_axes(id, stored);
        }
        self.insert_axes(id, bounds)?;
        if let Some(entry) = self.widgets.get_mut(&id) {
            entry.bounds = bounds;
        }
        Ok(())
    }

    /// Move a widget to `bounds`, using its registered bounds as the previous key.
    pub fn set_bounds(&mut self, id: WidgetId, bounds: Rect) -> Result<(), SpatialError> {
        let previous = self.bounds(id).ok_or(SpatialError::NotFound(id))?;
        self.update_widget(id, previous, bounds)
    }

    /// Change a widget's stacking order.
    pub fn set_z_index(&mut self, id: WidgetId, z_index: i32) -> Result<(), SpatialError> {
        let entry = self
            .widgets
            .get_mut(&id)
            .ok_or(SpatialError::NotFound(id))?;
        entry.z_index = z_index;
        Ok(())
    }

    /// Remove a widget from the index.
    ///
    /// Returns `true` if the widget was found and removed.
    pub fn remove_widget(&mut self, id: WidgetId) -> bool {
        let Some(entry) = self.widgets.remove(&id) else {
            return false;
        };
        self.remove_axes(id, entry.bounds);
        hitflow_core::trace!(widget = id.id(), "spatial: widget removed");
        true
    }

    /// All widgets containing `(x, y)`, topmost first.
    pub fn find_widgets_at(&self, x: i32, y: i32) -> Vec<WidgetId> {
        let xs = self.x_tree.query(x);
        let ys = if xs.is_empty() {
            Vec::new()
        } else {
            self.y_tree.query(y)
        };
        let examined = xs.len() + ys.len();
        let ids = self.resolve(xs, ys, |bounds| bounds.contains(x, y));

        if ids.len() > self.config.overlap_warn_threshold {
            hitflow_core::warn!(
                x,
                y,
                count = ids.len(),
                threshold = self.config.overlap_warn_threshold,
                "spatial: heavily stacked point"
            );
        }
        self.record(examined, ids.len());
        ids
    }

    /// The topmost widget containing `(x, y)`, if any.
    pub fn find_top_widget_at(&self, x: i32, y: i32) -> Option<WidgetId> {
        self.find_widgets_at(x, y).into_iter().next()
    }

    /// All widgets whose bounds overlap `rect`, topmost first.
    ///
    /// An empty or negative `rect` matches nothing.
    pub fn find_widgets_in(&self, rect: Rect) -> Vec<WidgetId> {
        if rect.is_empty() {
            return Vec::new();
        }
        let xs = self.x_tree.query_range(rect.x, rect.right());
        let ys = if xs.is_empty() {
            Vec::new()
        } else {
            self.y_tree.query_range(rect.y, rect.bottom())
        };
        let examined = xs.len() + ys.len();
        let ids = self.resolve(xs, ys, |bounds| bounds.intersects(&rect));
        self.record(examined, ids.len());
        ids
    }

    /// Replace the whole index with `widgets`.
    ///
    /// This is the full-rebuild fallback; incremental [`update_widget`]
    /// calls are the normal path. Input is validated before anything is
    /// cleared, and registration order follows iteration order.
    ///
    /// [`update_widget`]: Self::update_widget
    pub fn rebuild<I>(&mut self, widgets: I) -> Result<(), SpatialError>
    where
        I: IntoIterator<Item = (WidgetId, Rect, i32)>,
    {
        let widgets: Vec<_> = widgets.into_iter().collect();
        let mut seen = HashSet::with_capacity(widgets.len());
        for &(id, bounds, _) in &widgets {
            validate(bounds)?;
            if !seen.insert(id) {
                return Err(SpatialError::DuplicateWidget(id));
            }
        }

        self.clear();
        for (id, bounds, z) in widgets {
            self.insert_widget(id, bounds, z)?;
        }

        let mut stats = self.stats.get();
        stats.rebuilds += 1;
        self.stats.set(stats);
        hitflow_core::debug!(count = self.len(), "spatial: full rebuild");
        Ok(())
    }

    /// Registered bounds of a widget.
    pub fn bounds(&self, id: WidgetId) -> Option<Rect> {
        self.widgets.get(&id).map(|e| e.bounds)
    }

    /// Registered z-index of a widget.
    pub fn z_index(&self, id: WidgetId) -> Option<i32> {
        self.widgets.get(&id).map(|e| e.z_index)
    }

    /// Registry entry for a widget.
    pub fn entry(&self, id: WidgetId) -> Option<&WidgetEntry> {
        self.widgets.get(&id)
    }

    /// Whether a widget is registered.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    /// Iterate registered widgets (arbitrary order).
    pub fn widgets(&self) -> impl Iterator<Item = (WidgetId, &WidgetEntry)> {
        self.widgets.iter().map(|(id, e)| (*id, e))
    }

    /// Clear all entries and reset the index.
    pub fn clear(&mut self) {
        self.x_tree.clear();
        self.y_tree.clear();
        self.widgets.clear();
        self.next_order = 0;
    }

    /// Number of registered widgets.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Height of the (x, y) axis trees.
    pub fn tree_heights(&self) -> (u32, u32) {
        (self.x_tree.height(), self.y_tree.height())
    }

    /// Get diagnostic statistics.
    pub fn stats(&self) -> HitStats {
        self.stats.get()
    }

    /// Reset diagnostic statistics.
    pub fn reset_stats(&mut self) {
        self.stats.set(HitStats::default());
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn insert_axes(&mut self, id: WidgetId, bounds: Rect) -> Result<(), SpatialError> {
        let invalid = |_| SpatialError::InvalidBounds(bounds);
        self.x_tree
            .insert(bounds.x, bounds.right(), id)
            .map_err(invalid)?;
        if let Err(e) = self.y_tree.insert(bounds.y, bounds.bottom(), id) {
            self.x_tree.remove_entry(bounds.x, bounds.right(), &id);
            return Err(invalid(e));
        }
        Ok(())
    }

    /// Remove both axis entries keyed by `bounds`. Returns `true` if both existed.
    fn remove_axes(&mut self, id: WidgetId, bounds: Rect) -> bool {
        let x = self
            .x_tree
            .remove_entry(bounds.x, bounds.right(), &id)
            .is_some();
        let y = self
            .y_tree
            .remove_entry(bounds.y, bounds.bottom(), &id)
            .is_some();
        x && y
    }

    /// Intersect axis candidates, re-check bounds, and sort front-to-back.
    fn resolve(
        &self,
        xs: Vec<&Interval<i32, WidgetId>>,
        ys: Vec<&Interval<i32, WidgetId>>,
        keep: impl Fn(&Rect) -> bool,
    ) -> Vec<WidgetId> {
        if xs.is_empty() || ys.is_empty() {
            return Vec::new();
        }
        let (small, large) = if xs.len() <= ys.len() {
            (xs, ys)
        } else {
            (ys, xs)
        };
        let small: HashSet<WidgetId> = small.into_iter().map(|iv| iv.value).collect();

        let mut hits: SmallVec<[(WidgetId, &WidgetEntry); 8]> = large
            .into_iter()
            .filter(|iv| small.contains(&iv.value))
            .filter_map(|iv| self.widgets.get_key_value(&iv.value))
            .filter(|(_, entry)| keep(&entry.bounds))
            .map(|(id, entry)| (*id, entry))
            .collect();

        hits.sort_by(|a, b| b.1.cmp_z_order(a.1));
        hits.dedup_by_key(|(id, _)| *id);
        hits.into_iter().map(|(id, _)| id).collect()
    }

    fn record(&self, examined: usize, hits: usize) {
        if !self.config.track_stats {
            return;
        }
        let mut stats = self.stats.get();
        stats.queries += 1;
        stats.candidates += examined as u64;
        stats.hits += hits as u64;
        self.stats.set(stats);
    }
}

fn validate(bounds: Rect) -> Result<(), SpatialError> {
    if bounds.is_well_formed() {
        Ok(())
    } else {
        Err(SpatialError::InvalidBounds(bounds))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
