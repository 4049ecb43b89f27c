#![forbid(unsafe_code)]

//! Per-kind handler cost estimation.
//!
//! Each event kind keeps an exponentially weighted moving average of how
//! long its handler took:
//!
//! ```text
//! estimate' = alpha * sample + (1 - alpha) * estimate
//! ```
//!
//! Kinds that have never been measured use the configured default cost.
//! The scheduler consults [`CostEstimator::estimate`] before popping each
//! event after the first to decide whether the next handler still fits in
//! the remaining drain budget.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `alpha` outside `(0, 1]` | Clamped into range |
//! | `alpha` is NaN | Falls back to [`DEFAULT_COST_ALPHA`] |

use std::collections::HashMap;
use std::time::Duration;

use hitflow_core::event::EventKind;

/// Default smoothing factor.
pub const DEFAULT_COST_ALPHA: f64 = 0.2;

/// Default per-event cost assumed before any measurement.
pub const DEFAULT_EVENT_COST: Duration = Duration::from_micros(200);

#[derive(Debug, Clone, Copy)]
struct KindCost {
    /// Smoothed estimate in seconds.
    ewma_secs: f64,
    samples: u64,
}

/// Rolling per-kind cost model.
#[derive(Debug, Clone)]
pub struct CostEstimator {
    alpha: f64,
    default_cost: Duration,
    kinds: HashMap<EventKind, KindCost>,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_COST_ALPHA, DEFAULT_EVENT_COST)
    }
}

impl CostEstimator {
    /// Create an estimator with smoothing factor `alpha` and seed `default_cost`.
    pub fn new(alpha: f64, default_cost: Duration) -> Self {
        let alpha = if alpha.is_nan() {
            DEFAULT_COST_ALPHA
        } else {
            alpha.clamp(f64::EPSILON, 1.0)
        };
        Self {
            alpha,
            default_cost,
            kinds: HashMap::new(),
        }
    }

    /// Smoothing factor in use.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Cost assumed for unmeasured kinds.
    pub fn default_cost(&self) -> Duration {
        self.default_cost
    }

    /// Expected handler cost for `kind`.
    pub fn estimate(&self, kind: EventKind) -> Duration {
        self.kinds
            .get(&kind)
            .map(|k| Duration::from_secs_f64(k.ewma_secs.max(0.0)))
            .unwrap_or(self.default_cost)
    }

    /// Fold a measured handler duration into the estimate for `kind`.
    pub fn record(&mut self, kind: EventKind, elapsed: Duration) {
        let sample = elapsed.as_secs_f64();
        let alpha = self.alpha;
        let seed = self.default_cost.as_secs_f64();
        let entry = self.kinds.entry(kind).or_insert(KindCost {
            ewma_secs: seed,
            samples: 0,
        });
        entry.ewma_secs = alpha * sample + (1.0 - alpha) * entry.ewma_secs;
        entry.samples += 1;
    }

    /// Number of measurements folded in for `kind`.
    pub fn samples(&self, kind: EventKind) -> u64 {
        self.kinds.get(&kind).map_or(0, |k| k.samples)
    }

    /// Forget all measurements.
    pub fn reset(&mut self) {
        self.kinds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Duration, b: Duration) -> bool {
        (a.as_secs_f64() - b.as_secs_f64()).abs() < 1e-9
    }

    #[test]
    fn unseen_kind_uses_default() {
        let est = CostEstimator::new(0.2, Duration::from_millis(1));
        assert_eq!(est.estimate(EventKind::KeyDown), Duration::from_millis(1));
        assert_eq!(est.samples(EventKind::KeyDown), 0);
    }

    #[test]
    fn ewma_moves_toward_samples() {
        let mut est = CostEstimator::new(0.5, Duration::from_millis(2));
        est.record(EventKind::Scroll, Duration::from_millis(4));
        // 0.5 * 4 + 0.5 * 2 = 3ms
        assert!(approx(est.estimate(EventKind::Scroll), Duration::from_millis(3)));
        est.record(EventKind::Scroll, Duration::from_millis(4));
        // 0.5 * 4 + 0.5 * 3 = 3.5ms
        assert!(approx(
            est.estimate(EventKind::Scroll),
            Duration::from_micros(3_500)
        ));
        assert_eq!(est.samples(EventKind::Scroll), 2);
    }

    #[test]
    fn kinds_are_independent() {
        let mut est = CostEstimator::new(1.0, Duration::from_millis(1));
        est.record(EventKind::Text, Duration::from_millis(9));
        assert!(approx(est.estimate(EventKind::Text), Duration::from_millis(9)));
        assert_eq!(est.estimate(EventKind::Resize), Duration::from_millis(1));
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(CostEstimator::new(3.0, Duration::ZERO).alpha(), 1.0);
        assert!(CostEstimator::new(-1.0, Duration::ZERO).alpha() > 0.0);
        assert_eq!(
            CostEstimator::new(f64::NAN, Duration::ZERO).alpha(),
            DEFAULT_COST_ALPHA
        );
    }

    #[test]
    fn reset_forgets_measurements() {
        let mut est = CostEstimator::default();
        est.record(EventKind::KeyDown, Duration::from_millis(50));
        est.reset();
        assert_eq!(est.estimate(EventKind::KeyDown), DEFAULT_EVENT_COST);
    }
}
