//! Indexed min-priority queue over vertices.
//!
//! A binary heap with lazy invalidation: re-keying pushes a fresh entry with a
//! new stamp, and entries whose stamp no longer matches the live table are
//! discarded when they surface. Raising and lowering a key therefore cost the
//! same, and removal is O(1).

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use ordered_float::OrderedFloat;

use super::VertexId;

/// LPA* priority `(min(g, rhs) + h, min(g, rhs))`, compared lexicographically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(pub OrderedFloat<f64>, pub OrderedFloat<f64>);

impl Key {
    pub const INFINITE: Key = Key(OrderedFloat(f64::INFINITY), OrderedFloat(f64::INFINITY));

    pub fn new(primary: f64, secondary: f64) -> Self {
        Self(OrderedFloat(primary), OrderedFloat(secondary))
    }

    /// `compute_key(g, h, rhs)`.
    pub fn compute(g: f64, h: f64, rhs: f64) -> Self {
        let g_p = g.min(rhs);
        Self::new(g_p + h, g_p)
    }

    pub fn is_finite(&self) -> bool {
        self.0 .0.is_finite()
    }
}

#[derive(Debug, Default)]
pub(crate) struct KeyedQueue {
    heap: BinaryHeap<Reverse<(Key, VertexId, u64)>>,
    live: HashMap<VertexId, (Key, u64)>,
    stamp: u64,
}

impl KeyedQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub(crate) fn contains(&self, v: VertexId) -> bool {
        self.live.contains_key(&v)
    }

    pub(crate) fn key_of(&self, v: VertexId) -> Option<Key> {
        self.live.get(&v).map(|&(k, _)| k)
    }

    /// Insert `v` or change its key.
    pub(crate) fn push_or_update(&mut self, v: VertexId, key: Key) {
        if self.key_of(v) == Some(key) {
            return;
        }
        self.stamp += 1;
        self.live.insert(v, (key, self.stamp));
        self.heap.push(Reverse((key, v, self.stamp)));
        if self.heap.len() > 2 * self.live.len() + 64 {
            self.compact();
        }
    }

    pub(crate) fn remove(&mut self, v: VertexId) -> Option<Key> {
        self.live.remove(&v).map(|(k, _)| k)
    }

    /// Minimum (key, then vertex id) live entry.
    pub(crate) fn peek(&mut self) -> Option<(VertexId, Key)> {
        while let Some(&Reverse((key, v, stamp))) = self.heap.peek() {
            if self.live.get(&v) == Some(&(key, stamp)) {
                return Some((v, key));
            }
            self.heap.pop();
        }
        None
    }

    pub(crate) fn pop(&mut self) -> Option<(VertexId, Key)> {
        let (v, key) = self.peek()?;
        self.heap.pop();
        self.live.remove(&v);
        Some((v, key))
    }

    fn compact(&mut self) {
        self.heap = self
            .live
            .iter()
            .map(|(&v, &(k, s))| Reverse((k, v, s)))
            .collect();
    }
}
