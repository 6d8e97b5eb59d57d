//! Lifelong Planning A* over a `GraphView`.
//!
//! Every touched vertex carries `g` (cost-to-come of the last expansion), `rhs`
//! (one-step lookahead), `h` and a parent pointer. A vertex is queued exactly
//! when `g != rhs`. Tracked goal vertices are all vertices the engine has
//! touched that the graph reports as goals; the best goal is the one with the
//! smallest `compute_key(g, goal_cost, rhs)`.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace, warn};

use super::queue::{Key, KeyedQueue};
use super::{extract_path, EdgeChange, GraphView, SearchResult, VertexId};
use crate::error::Result;

const INF: f64 = f64::INFINITY;

#[derive(Clone, Copy, Debug, PartialEq)]
struct VertexData {
    g: f64,
    rhs: f64,
    h: f64,
    /// Equal to the vertex itself while no parent is known.
    parent: VertexId,
}

impl VertexData {
    fn unvisited(v: VertexId, h: f64) -> Self {
        Self {
            g: INF,
            rhs: INF,
            h,
            parent: v,
        }
    }
}

/// Incremental search state over an owned graph.
#[derive(Debug)]
pub struct LpaStar<G> {
    graph: G,
    lazy: bool,
    start: VertexId,
    vertex_data: HashMap<VertexId, VertexData>,
    queue: KeyedQueue,
    /// Tracked goal vertices with their goal cost.
    goals: BTreeMap<VertexId, f64>,
    expansions: u64,
}

impl<G: GraphView> LpaStar<G> {
    /// Seed the search at `graph.start_node()`.
    ///
    /// The start gets `rhs = 0` and is queued; its `g` drops to 0 on the first
    /// expansion. An invalid start leaves the queue empty, so every search
    /// reports unsolved.
    pub fn new(mut graph: G, lazy: bool) -> Result<Self> {
        let start = graph.start_node();
        let mut engine = Self {
            graph,
            lazy,
            start,
            vertex_data: HashMap::new(),
            queue: KeyedQueue::new(),
            goals: BTreeMap::new(),
            expansions: 0,
        };
        if engine.graph.check_validity(start)? {
            engine.vertex(start)?.rhs = 0.0;
            engine.update_vertex_key(start)?;
        } else {
            debug!(start = start.0, "start vertex invalid");
        }
        Ok(engine)
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Mutable access for evaluating edges between searches. Any cost change
    /// made through it must be reported via `update_edges`.
    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn into_graph(self) -> G {
        self.graph
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Total vertex expansions over the lifetime of this engine.
    pub fn expansions(&self) -> u64 {
        self.expansions
    }

    pub fn g(&self, v: VertexId) -> f64 {
        self.vertex_data.get(&v).map_or(INF, |d| d.g)
    }

    pub fn rhs(&self, v: VertexId) -> f64 {
        self.vertex_data.get(&v).map_or(INF, |d| d.rhs)
    }

    /// Every touched vertex is queued iff it is inconsistent, and nothing else
    /// is queued.
    pub fn queue_in_sync(&self) -> bool {
        let inconsistent = self
            .vertex_data
            .iter()
            .filter(|(_, d)| d.g != d.rhs)
            .count();
        inconsistent == self.queue.len()
            && self
                .vertex_data
                .iter()
                .all(|(&v, d)| (d.g != d.rhs) == self.queue.contains(v))
    }

    fn vertex(&mut self, v: VertexId) -> Result<&mut VertexData> {
        match self.vertex_data.entry(v) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let h = self.graph.heuristic(v)?;
                Ok(e.insert(VertexData::unvisited(v, h)))
            }
        }
    }

    fn update_vertex_key(&mut self, v: VertexId) -> Result<()> {
        let d = *self.vertex(v)?;
        if d.g != d.rhs {
            self.queue.push_or_update(v, Key::compute(d.g, d.h, d.rhs));
        } else {
            self.queue.remove(v);
        }
        if self.graph.is_goal(v)? {
            let goal_cost = self.graph.goal_cost(v)?;
            self.goals.insert(v, goal_cost);
        } else {
            self.goals.remove(&v);
        }
        Ok(())
    }

    /// Best tracked goal; ties keep the lower vertex id.
    fn best_goal(&self) -> Option<(VertexId, Key)> {
        let mut best: Option<(VertexId, Key)> = None;
        for (&v, &goal_cost) in &self.goals {
            let Some(d) = self.vertex_data.get(&v) else {
                continue;
            };
            let key = Key::compute(d.g, goal_cost, d.rhs);
            if best.map_or(true, |(_, k)| key < k) {
                best = Some((v, key));
            }
        }
        best
    }

    fn goal_solved(&self, goal: VertexId) -> bool {
        self.vertex_data
            .get(&goal)
            .is_some_and(|d| d.g == d.rhs && d.g.is_finite())
    }

    /// `u` got cheaper (or edge `u → v` did): relax `v` through `u`.
    fn handle_cost_decrease(&mut self, u: VertexId, v: VertexId) -> Result<()> {
        if v == self.start {
            return Ok(());
        }
        let g_u = self.vertex(u)?.g;
        let c = self.graph.edge_cost(u, v, self.lazy)?;
        let d = self.vertex(v)?;
        if g_u + c < d.rhs {
            d.rhs = g_u + c;
            d.parent = u;
            self.update_vertex_key(v)?;
        }
        Ok(())
    }

    /// `u` got more expensive (or edge `u → v` did): if `v` hung off `u`,
    /// recompute its `rhs` from scratch over all predecessors.
    fn handle_cost_increase(&mut self, u: VertexId, v: VertexId) -> Result<()> {
        if v == self.start || self.vertex(v)?.parent != u {
            return Ok(());
        }
        let mut rhs = INF;
        let mut parent = v;
        for s in self.graph.predecessors(v, self.lazy)? {
            let g_s = self.vertex(s)?.g;
            let c = self.graph.edge_cost(s, v, self.lazy)?;
            if g_s + c < rhs {
                rhs = g_s + c;
                parent = s;
            }
        }
        let d = self.vertex(v)?;
        d.rhs = rhs;
        d.parent = parent;
        self.update_vertex_key(v)
    }

    /// Repair state after edge cost changes. `old_cost` is the cost the engine
    /// last saw; the new cost is read from the graph.
    pub fn update_edges(&mut self, changes: &[EdgeChange]) -> Result<()> {
        for change in changes {
            let EdgeChange { u, v, old_cost } = *change;
            self.vertex(u)?;
            self.vertex(v)?;
            let new_cost = self.graph.edge_cost(u, v, self.lazy)?;
            trace!(u = u.0, v = v.0, old_cost, new_cost, "edge_change");
            if new_cost < old_cost {
                self.handle_cost_decrease(u, v)?;
            } else if new_cost > old_cost {
                self.handle_cost_increase(u, v)?;
            }
        }
        Ok(())
    }

    /// Expand until the best goal is consistent with a key no larger than the
    /// queue top, or the queue runs dry.
    pub fn compute_shortest_path(&mut self) -> Result<SearchResult> {
        while let Some((u, top_key)) = self.queue.peek() {
            if let Some((goal, goal_key)) = self.best_goal() {
                if top_key >= goal_key && self.goal_solved(goal) {
                    break;
                }
            }
            self.queue.pop();
            self.expansions += 1;
            let d = *self.vertex(u)?;
            if d.g > d.rhs {
                self.vertex(u)?.g = d.rhs;
                self.update_vertex_key(u)?;
                for s in self.graph.successors(u, self.lazy)? {
                    self.handle_cost_decrease(u, s)?;
                }
            } else {
                self.vertex(u)?.g = INF;
                for s in self.graph.successors(u, self.lazy)? {
                    self.handle_cost_increase(u, s)?;
                }
                self.update_vertex_key(u)?;
            }
        }
        Ok(self.current_result())
    }

    fn current_result(&self) -> SearchResult {
        let Some((goal, _)) = self.best_goal().filter(|&(g, _)| self.goal_solved(g)) else {
            return SearchResult::unsolved(self.start);
        };
        let path = extract_path(self.start, goal, self.vertex_data.len(), |v| {
            self.vertex_data
                .get(&v)
                .map(|d| d.parent)
                .filter(|&p| p != v)
        });
        let Some(path) = path else {
            warn!(goal = goal.0, "broken parent chain");
            return SearchResult::unsolved(self.start);
        };
        SearchResult {
            solved: true,
            path,
            path_cost: self.g(goal),
            goal_cost: self.goals.get(&goal).copied().unwrap_or(INF),
            goal_node: goal,
        }
    }
}

/// One-shot eager LPA* from scratch.
pub fn lpa_star_search<G: GraphView>(graph: G) -> Result<SearchResult> {
    let mut engine = LpaStar::new(graph, false)?;
    let result = engine.compute_shortest_path()?;
    debug!(
        solved = result.solved,
        cost = result.cost(),
        expansions = engine.expansions(),
        "lpa_star_search"
    );
    Ok(result)
}
