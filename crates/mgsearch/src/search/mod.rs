//! Graph-search contract and incremental search algorithms.
//!
//! Purpose
//! - `GraphView` is the only thing the search knows about a graph: start
//!   vertex, validity, heuristic, lazy/eager neighborhoods and edge costs, goal
//!   test, and goal cost. Roadmap adapters (single grasp, multi grasp, ...) are
//!   separate implementations of this trait.
//! - `LpaStar` maintains g/rhs state across calls and repairs it from reported
//!   edge changes; `lazy_sp` drives it with lazily evaluated edges.
//!
//! Conventions
//! - A lazy query must never call the oracle; it returns the best currently
//!   known value (a lower bound until evaluated). Known invalidity counts as
//!   known: a lazy edge touching a vertex that failed validation is infinite.
//! - Costs are non-negative; `f64::INFINITY` marks a missing/infeasible edge.

mod lazysp;
mod lpastar;
mod queue;

pub use lazysp::lazy_sp;
pub use lpastar::{lpa_star_search, LpaStar};
pub use queue::Key;

use crate::error::Result;

/// Vertex identifier within a `GraphView`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// Graph interface consumed by the search algorithms.
///
/// Methods take `&mut self` because answering may evaluate and cache oracle
/// results inside the underlying roadmap.
pub trait GraphView {
    fn start_node(&self) -> VertexId;

    /// Evaluate (and cache) validity of `v`.
    fn check_validity(&mut self, v: VertexId) -> Result<bool>;

    /// Admissible estimate of the remaining cost, goal cost included.
    fn heuristic(&self, v: VertexId) -> Result<f64>;

    /// Successors of `v`. With `lazy`, neighbors are not validity-checked.
    fn successors(&mut self, v: VertexId, lazy: bool) -> Result<Vec<VertexId>>;

    fn predecessors(&mut self, v: VertexId, lazy: bool) -> Result<Vec<VertexId>>;

    /// Cost of edge `u → v`: best known with `lazy`, fully evaluated otherwise.
    fn edge_cost(&mut self, u: VertexId, v: VertexId, lazy: bool) -> Result<f64>;

    fn is_goal(&mut self, v: VertexId) -> Result<bool>;

    /// Cost of terminating at goal vertex `v` (trade-off term).
    fn goal_cost(&self, v: VertexId) -> Result<f64>;
}

/// Outcome of one `compute_shortest_path` call.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub solved: bool,
    /// Start first, goal last. Empty unless solved.
    pub path: Vec<VertexId>,
    pub path_cost: f64,
    pub goal_cost: f64,
    pub goal_node: VertexId,
}

impl SearchResult {
    pub fn unsolved(start: VertexId) -> Self {
        Self {
            solved: false,
            path: Vec::new(),
            path_cost: f64::INFINITY,
            goal_cost: f64::INFINITY,
            goal_node: start,
        }
    }

    pub fn cost(&self) -> f64 {
        self.path_cost + self.goal_cost
    }
}

/// A change of the cost of edge `u → v`, reported with its previous cost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeChange {
    pub u: VertexId,
    pub v: VertexId,
    pub old_cost: f64,
}

/// Follow parent pointers from `goal` back to `start`.
///
/// Returns `None` if the chain does not reach `start` within `max_len` hops.
pub(crate) fn extract_path<F>(
    start: VertexId,
    goal: VertexId,
    max_len: usize,
    parent: F,
) -> Option<Vec<VertexId>>
where
    F: Fn(VertexId) -> Option<VertexId>,
{
    let mut path = vec![goal];
    let mut v = goal;
    while v != start {
        if path.len() > max_len {
            return None;
        }
        v = parent(v)?;
        path.push(v);
    }
    path.reverse();
    Some(path)
}
