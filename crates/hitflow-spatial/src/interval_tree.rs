#![forbid(unsafe_code)]

//! Augmented AVL interval tree over half-open 1-D intervals.
//!
//! Each node stores one `[start, end)` interval with an opaque payload plus
//! the maximum `end` found anywhere in its subtree. That `max_end` lets
//! queries skip whole subtrees that cannot reach the query point.
//!
//! # Invariants
//!
//! 1. In-order traversal is sorted by `(start, end, insertion sequence)`, so
//!    duplicate intervals stay strictly ordered and are all retrievable.
//! 2. `max_end(node) = max(node.end, max_end(left), max_end(right))` after
//!    every insert, remove and rotation.
//! 3. AVL balance: child heights differ by at most one, which bounds the
//!    height by `1.44 * log2(n + 2)`.
//!
//! # Containment
//!
//! An interval contains `p` when `start <= p < end`. A zero-length interval
//! (`start == end`) contains exactly its own point.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `end < start` on insert | [`IntervalError::InvalidBounds`], tree untouched |
//! | remove of an absent interval | `None`, tree untouched |
//!
//! # Complexity
//!
//! Insert and remove are O(log n). `query` and `query_range` are
//! O(log n + k) for k reported intervals.

use std::cmp::Ordering;
use std::fmt;

/// A half-open interval `[start, end)` with an attached payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<K, V> {
    /// Inclusive lower bound.
    pub start: K,
    /// Exclusive upper bound.
    pub end: K,
    /// Opaque payload.
    pub value: V,
}

impl<K: Ord + Copy, V> Interval<K, V> {
    /// Whether the interval contains `point`.
    #[inline]
    pub fn contains(&self, point: K) -> bool {
        if self.start == self.end {
            return point == self.start;
        }
        self.start <= point && point < self.end
    }

    /// Whether the interval overlaps the half-open range `[start, end)`.
    ///
    /// A zero-length range behaves like a point query; a zero-length
    /// interval overlaps any range that contains its point.
    #[inline]
    pub fn overlaps(&self, start: K, end: K) -> bool {
        if start == end {
            return self.contains(start);
        }
        if self.start == self.end {
            return start <= self.start && self.start < end;
        }
        self.start < end && start < self.end
    }

    /// Whether the interval is zero-length.
    #[inline]
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }
}

/// Interval tree errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalError<K> {
    /// `end < start`.
    InvalidBounds { start: K, end: K },
}

impl<K: fmt::Debug> fmt::Display for IntervalError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds { start, end } => {
                write!(f, "invalid interval bounds: end {end:?} < start {start:?}")
            }
        }
    }
}

impl<K: fmt::Debug> std::error::Error for IntervalError<K> {}

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug, Clone)]
struct Node<K, V> {
    interval: Interval<K, V>,
    /// Insertion sequence, used as the final ordering key.
    seq: u64,
    max_end: K,
    height: u32,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K: Ord + Copy, V> Node<K, V> {
    fn new(interval: Interval<K, V>, seq: u64) -> Box<Self> {
        Box::new(Self {
            max_end: interval.end,
            interval,
            seq,
            height: 1,
            left: None,
            right: None,
        })
    }

    #[inline]
    fn key(&self) -> (K, K, u64) {
        (self.interval.start, self.interval.end, self.seq)
    }

    /// Recompute height and `max_end` from the children.
    fn update(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
        let mut max_end = self.interval.end;
        if let Some(l) = &self.left {
            max_end = max_end.max(l.max_end);
        }
        if let Some(r) = &self.right {
            max_end = max_end.max(r.max_end);
        }
        self.max_end = max_end;
    }

    #[inline]
    fn balance_factor(&self) -> i64 {
        i64::from(height(&self.left)) - i64::from(height(&self.right))
    }
}

#[inline]
fn height<K, V>(link: &Link<K, V>) -> u32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn rotate_right<K: Ord + Copy, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update();
    pivot.right = Some(node);
    pivot.update();
    pivot
}

fn rotate_left<K: Ord + Copy, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update();
    pivot.left = Some(node);
    pivot.update();
    pivot
}

/// Restore AVL balance at `node` (single or double rotation).
fn rebalance<K: Ord + Copy, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.update();
    let bf = node.balance_factor();
    if bf > 1 {
        if node.left.as_ref().is_some_and(|l| l.balance_factor() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if bf < -1 {
        if node.right.as_ref().is_some_and(|r| r.balance_factor() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn insert_node<K: Ord + Copy, V>(link: Link<K, V>, new: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let Some(mut node) = link else {
        return new;
    };
    if new.key() < node.key() {
        node.left = Some(insert_node(node.left.take(), new));
    } else {
        node.right = Some(insert_node(node.right.take(), new));
    }
    rebalance(node)
}

/// Detach the leftmost node of a subtree. Returns `(remaining subtree, min node)`.
fn take_min<K: Ord + Copy, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.left.take() {
        None => {
            let rest = node.right.take();
            (rest, node)
        }
        Some(left) => {
            let (rest, min) = take_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

fn remove_node<K: Ord + Copy, V>(
    link: Link<K, V>,
    key: (K, K, u64),
) -> (Link<K, V>, Option<Interval<K, V>>) {
    let Some(mut node) = link else {
        return (None, None);
    };
    match key.cmp(&node.key()) {
        Ordering::Less => {
            let (left, removed) = remove_node(node.left.take(), key);
            node.left = left;
            (Some(rebalance(node)), removed)
        }
        Ordering::Greater => {
            let (right, removed) = remove_node(node.right.take(), key);
            node.right = right;
            (Some(rebalance(node)), removed)
        }
        Ordering::Equal => {
            let Node {
                interval,
                left,
                right,
                ..
            } = *node;
            let replacement = match (left, right) {
                (None, None) => None,
                (Some(l), None) => Some(l),
                (None, Some(r)) => Some(r),
                (Some(l), Some(r)) => {
                    let (rest, mut successor) = take_min(r);
                    successor.left = Some(l);
                    successor.right = rest;
                    Some(rebalance(successor))
                }
            };
            (replacement, Some(interval))
        }
    }
}

/// Find the insertion sequence of an entry with exactly `[start, end)` whose
/// payload satisfies `matches`.
fn find_seq<K: Ord + Copy, V>(
    link: &Link<K, V>,
    start: K,
    end: K,
    matches: &impl Fn(&V) -> bool,
) -> Option<u64> {
    let node = link.as_ref()?;
    match (start, end).cmp(&(node.interval.start, node.interval.end)) {
        Ordering::Less => find_seq(&node.left, start, end, matches),
        Ordering::Greater => find_seq(&node.right, start, end, matches),
        // Equal (start, end) entries can sit on both sides after rotations.
        Ordering::Equal => {
            if matches(&node.interval.value) {
                return Some(node.seq);
            }
            find_seq(&node.left, start, end, matches)
                .or_else(|| find_seq(&node.right, start, end, matches))
        }
    }
}

fn query_point<'a, K: Ord + Copy, V>(
    link: &'a Link<K, V>,
    point: K,
    out: &mut Vec<&'a Interval<K, V>>,
) {
    let Some(node) = link.as_ref() else {
        return;
    };
    // `>=` keeps zero-length intervals ending exactly at `point`.
    if node.left.as_ref().is_some_and(|l| l.max_end >= point) {
        query_point(&node.left, point, out);
    }
    if node.interval.contains(point) {
        out.push(&node.interval);
    }
    if point >= node.interval.start {
        query_point(&node.right, point, out);
    }
}

fn query_overlaps<'a, K: Ord + Copy, V>(
    link: &'a Link<K, V>,
    start: K,
    end: K,
    out: &mut Vec<&'a Interval<K, V>>,
) {
    let Some(node) = link.as_ref() else {
        return;
    };
    if node.left.as_ref().is_some_and(|l| l.max_end >= start) {
        query_overlaps(&node.left, start, end, out);
    }
    if node.interval.overlaps(start, end) {
        out.push(&node.interval);
    }
    if node.interval.start < end {
        query_overlaps(&node.right, start, end, out);
    }
}

/// AVL-balanced interval tree keyed by interval start.
///
/// # Example
///
/// ```
/// use hitflow_spatial::interval_tree::IntervalTree;
///
/// let mut tree = IntervalTree::new();
/// tree.insert(0, 10, "a").unwrap();
/// tree.insert(5, 15, "b").unwrap();
///
/// let mut hits: Vec<_> = tree.query(7).into_iter().map(|iv| iv.value).collect();
/// hits.sort();
/// assert_eq!(hits, vec!["a", "b"]);
/// assert!(tree.query(15).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct IntervalTree<K, V> {
    root: Link<K, V>,
    len: usize,
    next_seq: u64,
}

impl<K, V> Default for IntervalTree<K, V> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
            next_seq: 0,
        }
    }
}

impl<K: Ord + Copy, V> IntervalTree<K, V> {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `[start, end)` with `value`.
    ///
    /// Duplicates (same bounds, any payload) are kept side by side.
    pub fn insert(&mut self, start: K, end: K, value: V) -> Result<(), IntervalError<K>> {
        if end < start {
            return Err(IntervalError::InvalidBounds { start, end });
        }
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        let node = Node::new(Interval { start, end, value }, seq);
        self.root = Some(insert_node(self.root.take(), node));
        self.len += 1;
        Ok(())
    }

    /// Remove one entry with exactly `[start, end)`, whichever payload it has.
    ///
    /// Returns `None` if no such interval is stored.
    pub fn remove(&mut self, start: K, end: K) -> Option<V> {
        self.remove_where(start, end, |_| true)
    }

    /// Remove one entry with bounds `[start, end)` whose payload satisfies `matches`.
    pub fn remove_where(&mut self, start: K, end: K, matches: impl Fn(&V) -> bool) -> Option<V> {
        let seq = find_seq(&self.root, start, end, &matches)?;
        let (root, removed) = remove_node(self.root.take(), (start, end, seq));
        self.root = root;
        let removed = removed?;
        self.len -= 1;
        Some(removed.value)
    }

    /// All intervals containing `point`, in ascending start order.
    #[must_use]
    pub fn query(&self, point: K) -> Vec<&Interval<K, V>> {
        let mut out = Vec::new();
        query_point(&self.root, point, &mut out);
        out
    }

    /// All intervals overlapping `[start, end)`, in ascending start order.
    ///
    /// An inverted range (`end < start`) matches nothing.
    #[must_use]
    pub fn query_range(&self, start: K, end: K) -> Vec<&Interval<K, V>> {
        let mut out = Vec::new();
        if end < start {
            return out;
        }
        if start == end {
            query_point(&self.root, start, &mut out);
        } else {
            query_overlaps(&self.root, start, end, &mut out);
        }
        out
    }

    /// Whether any entry has exactly the bounds `[start, end)`.
    #[must_use]
    pub fn contains(&self, start: K, end: K) -> bool {
        find_seq(&self.root, start, end, &|_: &V| true).is_some()
    }

    /// Number of stored intervals.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree (0 when empty).
    #[inline]
    pub fn height(&self) -> u32 {
        height(&self.root)
    }

    /// Largest end value in the tree.
    pub fn max_end(&self) -> Option<K> {
        self.root.as_ref().map(|n| n.max_end)
    }

    /// Remove every interval.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Iterate all intervals in `(start, end, insertion)` order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }
}

impl<K: Ord + Copy, V: PartialEq> IntervalTree<K, V> {
    /// Remove the entry `[start, end)` carrying exactly `value`.
    pub fn remove_entry(&mut self, start: K, end: K, value: &V) -> Option<V> {
        self.remove_where(start, end, |v| v == value)
    }
}

/// In-order iterator over a tree's intervals.
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut node: Option<&'a Node<K, V>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Interval<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.interval)
    }
}

impl<'a, K: Ord + Copy, V> IntoIterator for &'a IntervalTree<K, V> {
    type Item = &'a Interval<K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
