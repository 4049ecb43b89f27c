#![forbid(unsafe_code)]

//! Pattern-based event scheduler with a time-budgeted drain.
//!
//! Raw input arrives through [`EventScheduler::ingest`]. Each event's kind
//! resolves to a coalescing [`Pattern`] that decides whether the event
//! reaches the ready queue now, later, or never:
//!
//! | Pattern | Ingest | Tick |
//! |---------|--------|------|
//! | Immediate / Ordered | queue | - |
//! | ReplaceLatest | overwrite per-kind slot | queue slot |
//! | Debounce(quiet) | buffer, reset quiet timer | queue last event once quiet |
//! | Throttle(interval) | queue if interval passed, else drop | - |
//! | Batch(size, timeout) | buffer, queue all at `size` | queue all after `timeout` |
//!
//! [`EventScheduler::drain`] pops ready events in priority order and hands
//! them to a handler until the time budget would be exceeded.
//!
//! # Queue Discipline
//!
//! The ready queue is a max-heap ordered by:
//! 1. Kind priority (higher first)
//! 2. Arrival timestamp (earlier first)
//! 3. Ingest sequence (earlier first)
//!
//! # Invariants
//!
//! 1. **Per-kind FIFO**: same-kind Immediate/Ordered events drain in arrival order
//! 2. **Forward progress**: `drain` handles at least one event on a non-empty queue
//! 3. **Latest-wins**: a ReplaceLatest burst between ticks yields its newest event
//! 4. **Isolation**: a failing or panicking handler never stops the drain
//!
//! # Failure Modes
//!
//! | Condition | Behavior | Rationale |
//! |-----------|----------|-----------|
//! | Budget is zero | Exactly one event handled | Forward progress |
//! | Queue at an opt-in `max_queue_len` | New event dropped, counted | Bounded memory |
//! | Handler `Err` | Recorded in report, drain continues | Isolation |
//! | Handler panic | Caught, recorded as `Panicked` | Isolation |
//! | Batch size 0 | Treated as 1 | Avoids never-flushing batch |
//! | Clock behind event timestamps | Durations saturate at zero | No underflow |

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::time::{Duration, Instant};

use hitflow_core::event::{Event, EventKind};
use tracing::{debug, debug_span, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::cost::{CostEstimator, DEFAULT_COST_ALPHA, DEFAULT_EVENT_COST};
use crate::policy::{KindPolicy, Pattern, PolicyTable, Priority};
use crate::widget::{HandlerError, guard_handler};

/// Default ready-queue capacity: unbounded.
const MAX_QUEUE_LEN: usize = usize::MAX;

#[inline]
fn duration_since_or_zero(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier)
        .unwrap_or(Duration::ZERO)
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the event scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Pattern and priority per event kind.
    pub policies: PolicyTable,

    /// Handler cost assumed for kinds that have not been measured yet.
    pub default_cost: Duration,

    /// EWMA smoothing factor for handler cost estimates.
    pub cost_alpha: f64,

    /// Ready-queue capacity. Unbounded by default; events beyond a
    /// configured cap are dropped.
    pub max_queue_len: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policies: PolicyTable::default(),
            default_cost: DEFAULT_EVENT_COST,
            cost_alpha: DEFAULT_COST_ALPHA,
            max_queue_len: MAX_QUEUE_LEN,
        }
    }
}

impl SchedulerConfig {
    /// Replace the whole policy table.
    #[must_use]
    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = policies;
        self
    }

    /// Set the policy for one kind.
    #[must_use]
    pub fn with_policy(mut self, kind: EventKind, policy: KindPolicy) -> Self {
        self.policies.set(kind, policy);
        self
    }

    /// Set the seed cost for unmeasured kinds.
    #[must_use]
    pub fn with_default_cost(mut self, cost: Duration) -> Self {
        self.default_cost = cost;
        self
    }

    /// Set the EWMA smoothing factor.
    #[must_use]
    pub fn with_cost_alpha(mut self, alpha: f64) -> Self {
        self.cost_alpha = alpha;
        self
    }

    /// Set the ready-queue capacity (minimum 1).
    #[must_use]
    pub fn with_max_queue_len(mut self, len: usize) -> Self {
        self.max_queue_len = len.max(1);
        self
    }
}

// ---------------------------------------------------------------------------
// Reports and statistics
// ---------------------------------------------------------------------------

/// A handler failure observed during a drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Kind of the event whose handler failed.
    pub kind: EventKind,
    /// What went wrong.
    pub error: HandlerError,
}

/// Result of one [`EventScheduler::drain`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Events removed from the queue and passed to the handler (including failures).
    pub processed: usize,
    /// Events still queued.
    pub remaining: usize,
    /// Handler failures, in drain order.
    pub failures: Vec<HandlerFailure>,
    /// Whether the drain stopped because the budget would be exceeded.
    pub budget_exhausted: bool,
    /// Wall time spent in the drain.
    pub elapsed: Duration,
}

impl DrainReport {
    /// Events whose handler returned `Ok`.
    pub fn handled(&self) -> usize {
        self.processed.saturating_sub(self.failures.len())
    }

    /// No failures.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Running scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Events passed to `ingest`.
    pub ingested: u64,
    /// Events superseded by a newer one (ReplaceLatest, Debounce).
    pub coalesced: u64,
    /// Events discarded by Throttle or a full queue.
    pub dropped: u64,
    /// Events moved from slots or pending sequences into the queue.
    pub flushed: u64,
    /// Handler calls that returned `Ok`.
    pub handled: u64,
    /// Handler calls that failed or panicked.
    pub failures: u64,
}

/// What `ingest` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Pushed to the ready queue.
    Queued,
    /// Stored in the kind's ReplaceLatest slot.
    Slotted,
    /// Appended to a Debounce/Batch pending sequence.
    Buffered,
    /// Completed a batch; the whole batch was queued.
    BatchFlushed,
    /// Dropped by Throttle.
    Throttled,
    /// Dropped because the queue is full.
    Rejected,
}

// ---------------------------------------------------------------------------
// Queue entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Stamped {
    seq: u64,
    event: Event,
}

#[derive(Debug)]
struct Queued {
    priority: Priority,
    item: Stamped,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority comes first (max-heap)
        self.priority
            .cmp(&other.priority)
            // Tie-break 1: earlier arrival
            .then_with(|| other.item.event.timestamp.cmp(&self.item.event.timestamp))
            // Tie-break 2: earlier ingest
            .then_with(|| other.item.seq.cmp(&self.item.seq))
    }
}

/// Buffered events for one Debounce or Batch kind.
#[derive(Debug)]
struct PendingSequence {
    pattern: Pattern,
    events: Vec<Stamped>,
    first_at: Instant,
    last_activity: Instant,
}

impl PendingSequence {
    fn new(pattern: Pattern, at: Instant) -> Self {
        Self {
            pattern,
            events: Vec::new(),
            first_at: at,
            last_activity: at,
        }
    }

    /// Time left before this sequence is due, measured from `now`.
    fn time_until_due(&self, now: Instant) -> Duration {
        let (anchor, wait) = match self.pattern {
            Pattern::Debounce { quiet } => (self.last_activity, quiet),
            Pattern::Batch { timeout, .. } => (self.first_at, timeout),
            _ => return Duration::ZERO,
        };
        wait.saturating_sub(duration_since_or_zero(now, anchor))
    }

    fn is_due(&self, now: Instant) -> bool {
        self.time_until_due(now).is_zero()
    }
}

// ---------------------------------------------------------------------------
// EventScheduler
// ---------------------------------------------------------------------------

/// Coalescing event scheduler.
#[derive(Debug)]
pub struct EventScheduler<C: Clock = SystemClock> {
    config: SchedulerConfig,
    clock: C,

    /// Ready events.
    queue: BinaryHeap<Queued>,

    /// Newest event per ReplaceLatest kind.
    slots: BTreeMap<EventKind, Stamped>,

    /// Buffered Debounce/Batch sequences.
    pending: BTreeMap<EventKind, PendingSequence>,

    /// Timestamp of the last event passed through per Throttle kind.
    last_dispatch: HashMap<EventKind, Instant>,

    cost: CostEstimator,
    stats: SchedulerStats,
    next_seq: u64,
}

impl EventScheduler<SystemClock> {
    /// Create a scheduler reading wall-clock time.
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for EventScheduler<SystemClock> {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl<C: Clock> EventScheduler<C> {
    /// Create a scheduler with an injected clock.
    pub fn with_clock(config: SchedulerConfig, clock: C) -> Self {
        let cost = CostEstimator::new(config.cost_alpha, config.default_cost);
        Self {
            config,
            clock,
            queue: BinaryHeap::new(),
            slots: BTreeMap::new(),
            pending: BTreeMap::new(),
            last_dispatch: HashMap::new(),
            cost,
            stats: SchedulerStats::default(),
            next_seq: 0,
        }
    }

    /// Accept an event, applying its kind's coalescing pattern.
    ///
    /// Time-based decisions use the event's own timestamp.
    pub fn ingest(&mut self, event: Event) -> IngestOutcome {
        self.stats.ingested += 1;
        let kind = event.kind;
        let now = event.timestamp;
        let policy = self.config.policies.get(kind);
        let item = Stamped {
            seq: self.next_seq,
            event,
        };
        self.next_seq += 1;

        match policy.pattern {
            Pattern::Immediate | Pattern::Ordered => self.push(policy.priority, item),
            Pattern::ReplaceLatest => {
                if self.slots.insert(kind, item).is_some() {
                    self.stats.coalesced += 1;
                    trace!(kind = %kind, "replace_latest: superseded");
                }
                IngestOutcome::Slotted
            }
            Pattern::Throttle { min_interval } => {
                let open = self
                    .last_dispatch
                    .get(&kind)
                    .is_none_or(|&last| duration_since_or_zero(now, last) >= min_interval);
                if !open {
                    self.stats.dropped += 1;
                    trace!(kind = %kind, "throttle: dropped");
                    return IngestOutcome::Throttled;
                }
                let outcome = self.push(policy.priority, item);
                if outcome == IngestOutcome::Queued {
                    self.last_dispatch.insert(kind, now);
                }
                outcome
            }
            Pattern::Debounce { .. } => {
                let seq = self
                    .pending
                    .entry(kind)
                    .or_insert_with(|| PendingSequence::new(policy.pattern, now));
                seq.events.push(item);
                seq.last_activity = now;
                IngestOutcome::Buffered
            }
            Pattern::Batch { size, .. } => {
                let seq = self
                    .pending
                    .entry(kind)
                    .or_insert_with(|| PendingSequence::new(policy.pattern, now));
                seq.events.push(item);
                seq.last_activity = now;
                if seq.events.len() >= size.max(1) {
                    self.flush_kind(kind);
                    IngestOutcome::BatchFlushed
                } else {
                    IngestOutcome::Buffered
                }
            }
        }
    }

    /// Flush due slots and sequences using the injected clock.
    ///
    /// Returns the number of events moved into the queue.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        self.tick_at(now)
    }

    /// Flush every ReplaceLatest slot and every Debounce/Batch sequence that
    /// is due at `now`.
    pub fn tick_at(&mut self, now: Instant) -> usize {
        let mut moved = self.flush_slots();

        let due: Vec<EventKind> = self
            .pending
            .iter()
            .filter(|(_, seq)| seq.is_due(now))
            .map(|(kind, _)| *kind)
            .collect();
        for kind in due {
            moved += self.flush_kind(kind);
        }

        if moved > 0 {
            debug!(moved, queued = self.queue.len(), "scheduler tick flushed");
        }
        moved
    }

    /// Move every slot and pending sequence into the queue regardless of expiry.
    pub fn flush_all(&mut self) -> usize {
        let mut moved = self.flush_slots();
        let kinds: Vec<EventKind> = self.pending.keys().copied().collect();
        for kind in kinds {
            moved += self.flush_kind(kind);
        }
        moved
    }

    /// Pop ready events in priority order and pass them to `handler` until
    /// the next event's estimated cost would exceed `budget`.
    ///
    /// The first event is always handled. Handler errors and panics are
    /// recorded in the report and the drain continues.
    pub fn drain<F>(&mut self, budget: Duration, mut handler: F) -> DrainReport
    where
        F: FnMut(&Event) -> Result<(), HandlerError>,
    {
        let _span = debug_span!(
            "scheduler.drain",
            budget_us = budget.as_micros() as u64,
            queued = self.queue.len()
        )
        .entered();

        let start = self.clock.now();
        let mut report = DrainReport::default();
        let mut spent = Duration::ZERO;

        while let Some(next) = self.queue.peek() {
            if report.processed > 0 {
                let estimate = self.cost.estimate(next.item.event.kind);
                if spent.saturating_add(estimate) > budget {
                    report.budget_exhausted = true;
                    break;
                }
            }
            let Some(Queued { item, .. }) = self.queue.pop() else {
                break;
            };
            let kind = item.event.kind;

            let t0 = self.clock.now();
            let result = guard_handler(|| handler(&item.event));
            let elapsed = duration_since_or_zero(self.clock.now(), t0);
            spent = spent.saturating_add(elapsed);
            self.cost.record(kind, elapsed);
            report.processed += 1;

            match result {
                Ok(()) => self.stats.handled += 1,
                Err(error) => {
                    self.stats.failures += 1;
                    warn!(kind = %kind, error = %error, "event handler failed");
                    report.failures.push(HandlerFailure { kind, error });
                }
            }
        }

        report.remaining = self.queue.len();
        report.elapsed = duration_since_or_zero(self.clock.now(), start);
        if report.budget_exhausted {
            crate::debug_trace!(
                "drain budget exhausted: processed={} remaining={} spent={:?}",
                report.processed,
                report.remaining,
                spent
            );
        }
        debug!(
            processed = report.processed,
            remaining = report.remaining,
            failures = report.failures.len(),
            budget_exhausted = report.budget_exhausted,
            "scheduler drain finished"
        );
        report
    }

    /// Time until the next slot or sequence becomes due, or `None` if
    /// nothing is buffered.
    pub fn time_until_next_flush(&self, now: Instant) -> Option<Duration> {
        if !self.slots.is_empty() {
            return Some(Duration::ZERO);
        }
        self.pending
            .values()
            .map(|seq| seq.time_until_due(now))
            .min()
    }

    /// Discard everything queued and buffered. Statistics and cost
    /// estimates are kept.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.slots.clear();
        self.pending.clear();
        self.last_dispatch.clear();
    }

    /// Ready events.
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Events held in slots and pending sequences.
    pub fn pending_len(&self) -> usize {
        self.slots.len() + self.pending.values().map(|s| s.events.len()).sum::<usize>()
    }

    /// Whether any event is waiting for a tick.
    pub fn has_pending(&self) -> bool {
        !self.slots.is_empty() || !self.pending.is_empty()
    }

    /// Nothing queued and nothing buffered.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && !self.has_pending()
    }

    /// Kind of the event `drain` would handle next.
    pub fn peek_kind(&self) -> Option<EventKind> {
        self.queue.peek().map(|q| q.item.event.kind)
    }

    /// Resolved policy for `kind`.
    pub fn policy(&self, kind: EventKind) -> KindPolicy {
        self.config.policies.get(kind)
    }

    /// Change the policy for `kind`.
    ///
    /// Anything already buffered under the old policy is flushed first.
    pub fn set_policy(&mut self, kind: EventKind, policy: KindPolicy) {
        if let Some(item) = self.slots.remove(&kind) {
            let priority = self.config.policies.get(kind).priority;
            if self.push(priority, item) == IngestOutcome::Queued {
                self.stats.flushed += 1;
            }
        }
        if self.pending.contains_key(&kind) {
            self.flush_kind(kind);
        }
        self.last_dispatch.remove(&kind);
        self.config.policies.set(kind, policy);
    }

    /// Current handler cost estimate for `kind`.
    pub fn cost_estimate(&self, kind: EventKind) -> Duration {
        self.cost.estimate(kind)
    }

    /// Get running statistics.
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Get the configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The injected clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn push(&mut self, priority: Priority, item: Stamped) -> IngestOutcome {
        if self.queue.len() >= self.config.max_queue_len {
            self.stats.dropped += 1;
            warn!(
                kind = %item.event.kind,
                capacity = self.config.max_queue_len,
                "event queue full, dropping event"
            );
            return IngestOutcome::Rejected;
        }
        self.queue.push(Queued { priority, item });
        IngestOutcome::Queued
    }

    fn flush_slots(&mut self) -> usize {
        let slots = std::mem::take(&mut self.slots);
        let mut moved = 0;
        for (kind, item) in slots {
            let priority = self.config.policies.get(kind).priority;
            if self.push(priority, item) == IngestOutcome::Queued {
                self.stats.flushed += 1;
                moved += 1;
            }
        }
        moved
    }

    /// Flush one pending sequence according to its pattern.
    fn flush_kind(&mut self, kind: EventKind) -> usize {
        let Some(seq) = self.pending.remove(&kind) else {
            return 0;
        };
        let priority = self.config.policies.get(kind).priority;
        let mut events = seq.events;

        if let Pattern::Debounce { .. } = seq.pattern {
            let superseded = events.len().saturating_sub(1);
            self.stats.coalesced += superseded as u64;
            events = events.pop().into_iter().collect();
        }

        let mut moved = 0;
        for item in events {
            if self.push(priority, item) == IngestOutcome::Queued {
                self.stats.flushed += 1;
                moved += 1;
            }
        }
        debug!(kind = %kind, pattern = seq.pattern.as_str(), moved, "pending sequence flushed");
        moved
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
