#![forbid(unsafe_code)]

//! Per-kind coalescing policies.
//!
//! Every [`EventKind`] resolves to a [`KindPolicy`]: a coalescing
//! [`Pattern`] plus a queue [`Priority`]. The scheduler looks the policy up
//! once, at ingest.
//!
//! # Defaults
//!
//! | Kind | Pattern | Priority |
//! |------|---------|----------|
//! | pointer down / up | Immediate | High |
//! | pointer move / drag | ReplaceLatest | Normal |
//! | scroll | Throttle(16ms) | Normal |
//! | key down / up | Ordered | High |
//! | text | Batch(32, 16ms) | High |
//! | resize | Debounce(40ms) | Low |
//! | focus | Ordered | Low |
//! | custom | Ordered | Low |

use std::collections::BTreeMap;
use std::time::Duration;

use hitflow_core::event::{EventClass, EventKind};

/// Default scroll throttle interval.
pub const DEFAULT_SCROLL_INTERVAL: Duration = Duration::from_millis(16);

/// Default resize quiet period.
pub const DEFAULT_RESIZE_QUIET: Duration = Duration::from_millis(40);

/// Default text batch size.
pub const DEFAULT_TEXT_BATCH: usize = 32;

/// Default text batch timeout.
pub const DEFAULT_TEXT_TIMEOUT: Duration = Duration::from_millis(16);

/// How events of one kind are buffered before reaching the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Pattern {
    /// Queue at once.
    Immediate,
    /// Queue at once; same-kind events keep arrival order.
    Ordered,
    /// Keep only the newest event per tick.
    ReplaceLatest,
    /// Emit the last event once the kind has been quiet for `quiet`.
    Debounce { quiet: Duration },
    /// Pass at most one event per `min_interval`; drop the rest.
    Throttle { min_interval: Duration },
    /// Emit buffered events together when `size` is reached or `timeout`
    /// has passed since the first one.
    Batch { size: usize, timeout: Duration },
}

impl Pattern {
    /// Whether events are held in a pending sequence until a flush condition.
    pub const fn is_buffered(&self) -> bool {
        matches!(self, Pattern::Debounce { .. } | Pattern::Batch { .. })
    }

    /// Stable short name used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Pattern::Immediate => "immediate",
            Pattern::Ordered => "ordered",
            Pattern::ReplaceLatest => "replace_latest",
            Pattern::Debounce { .. } => "debounce",
            Pattern::Throttle { .. } => "throttle",
            Pattern::Batch { .. } => "batch",
        }
    }
}

/// Queue priority. Declared lowest first so the derived ordering ranks
/// `Critical` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl Priority {
    /// Default priority for a class of events.
    pub const fn for_class(class: EventClass) -> Self {
        match class {
            EventClass::Discrete => Priority::High,
            EventClass::Continuous => Priority::Normal,
            EventClass::Lifecycle | EventClass::Custom => Priority::Low,
        }
    }
}

/// Coalescing pattern and priority for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KindPolicy {
    pub pattern: Pattern,
    pub priority: Priority,
}

impl KindPolicy {
    /// Create a policy.
    pub const fn new(pattern: Pattern, priority: Priority) -> Self {
        Self { pattern, priority }
    }

    /// `pattern` with the class-derived priority of `kind`.
    pub const fn for_kind(kind: EventKind, pattern: Pattern) -> Self {
        Self::new(pattern, Priority::for_class(kind.class()))
    }

    /// Override the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Pattern assignment for every event kind.
///
/// Kinds without an explicit entry fall back to [`Pattern::Ordered`] with
/// their class priority.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyTable {
    #[cfg_attr(feature = "serde", serde(with = "entry_list", default))]
    entries: BTreeMap<EventKind, KindPolicy>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for kind in EventKind::BUILTIN {
            let pattern = match kind {
                EventKind::PointerDown | EventKind::PointerUp => Pattern::Immediate,
                EventKind::PointerMove | EventKind::PointerDrag => Pattern::ReplaceLatest,
                EventKind::Scroll => Pattern::Throttle {
                    min_interval: DEFAULT_SCROLL_INTERVAL,
                },
                EventKind::Resize => Pattern::Debounce {
                    quiet: DEFAULT_RESIZE_QUIET,
                },
                EventKind::Text => Pattern::Batch {
                    size: DEFAULT_TEXT_BATCH,
                    timeout: DEFAULT_TEXT_TIMEOUT,
                },
                EventKind::KeyDown
                | EventKind::KeyUp
                | EventKind::Focus
                | EventKind::Custom(_) => Pattern::Ordered,
            };
            table.set(kind, KindPolicy::for_kind(kind, pattern));
        }
        table
    }
}

impl PolicyTable {
    /// A table with no explicit entries.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Resolve the policy for `kind`.
    pub fn get(&self, kind: EventKind) -> KindPolicy {
        self.entries
            .get(&kind)
            .copied()
            .unwrap_or_else(|| KindPolicy::for_kind(kind, Pattern::Ordered))
    }

    /// Set the policy for `kind`, returning the previous explicit entry.
    pub fn set(&mut self, kind: EventKind, policy: KindPolicy) -> Option<KindPolicy> {
        self.entries.insert(kind, policy)
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, kind: EventKind, policy: KindPolicy) -> Self {
        self.set(kind, policy);
        self
    }

    /// Builder that keeps the kind's current priority and swaps the pattern.
    #[must_use]
    pub fn with_pattern(mut self, kind: EventKind, pattern: Pattern) -> Self {
        let priority = self.get(kind).priority;
        self.set(kind, KindPolicy::new(pattern, priority));
        self
    }

    /// Drop the explicit entry for `kind`.
    pub fn remove(&mut self, kind: EventKind) -> Option<KindPolicy> {
        self.entries.remove(&kind)
    }

    /// Explicit entries in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (EventKind, KindPolicy)> + '_ {
        self.entries.iter().map(|(k, p)| (*k, *p))
    }
}

/// JSON object keys must be strings, so the table serializes as a list of
/// `{ "kind": .., "policy": .. }` records.
#[cfg(feature = "serde")]
mod entry_list {
    use std::collections::BTreeMap;

    use hitflow_core::event::EventKind;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::KindPolicy;

    #[derive(Serialize, Deserialize)]
    struct Entry {
        kind: EventKind,
        policy: KindPolicy,
    }

    pub fn serialize<S: Serializer>(
        entries: &BTreeMap<EventKind, KindPolicy>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(entries.iter().map(|(kind, policy)| Entry {
            kind: *kind,
            policy: *policy,
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<EventKind, KindPolicy>, D::Error> {
        let list = Vec::<Entry>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|e| (e.kind, e.policy)).collect())
    }
}
