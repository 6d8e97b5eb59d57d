//! Roadmap seen through one grasp.
//!
//! Vertex ids are roadmap node ids. Validity, edge costs, goal membership and
//! the heuristic are all conditioned on the adapter's grasp; evaluations land
//! in the shared roadmap caches, so later searches (any grasp) reuse them.

use crate::error::Result;
use crate::goals::{CostToGoHeuristic, MultiGraspGoalSet};
use crate::roadmap::{NodeId, Roadmap};
use crate::search::{GraphView, VertexId};
use crate::space::GraspId;

pub(crate) fn node_of(v: VertexId) -> NodeId {
    NodeId(v.0)
}

pub(crate) fn vertex_of(n: NodeId) -> VertexId {
    VertexId(n.0)
}

pub struct SingleGraspRoadmapGraph<'a> {
    roadmap: &'a mut Roadmap,
    goal_set: &'a MultiGraspGoalSet,
    heuristic: &'a CostToGoHeuristic,
    grasp: GraspId,
    start: NodeId,
}

impl<'a> SingleGraspRoadmapGraph<'a> {
    pub fn new(
        roadmap: &'a mut Roadmap,
        goal_set: &'a MultiGraspGoalSet,
        heuristic: &'a CostToGoHeuristic,
        grasp: GraspId,
        start: NodeId,
    ) -> Self {
        Self {
            roadmap,
            goal_set,
            heuristic,
            grasp,
            start,
        }
    }

    pub fn grasp(&self) -> GraspId {
        self.grasp
    }

    pub fn roadmap(&self) -> &Roadmap {
        self.roadmap
    }

    /// Deleted, or already found invalid for this grasp. No oracle call.
    fn known_invalid(&self, n: NodeId) -> bool {
        self.roadmap.node(n).map_or(true, |node| {
            node.validity == Some(false)
                || node.conditional_validity.get(&self.grasp) == Some(&false)
        })
    }

    fn neighbors(&mut self, v: VertexId, lazy: bool) -> Result<Vec<VertexId>> {
        let n = node_of(v);
        if !self.roadmap.contains(n) {
            return Ok(Vec::new());
        }
        self.roadmap.update_adjacency(n)?;
        let mut out = Vec::new();
        for (nbr, _) in self.roadmap.adjacency(n)? {
            let keep = if lazy {
                !self.known_invalid(nbr)
            } else {
                self.roadmap.is_valid_for_grasp(nbr, self.grasp)?
            };
            if keep {
                out.push(vertex_of(nbr));
            }
        }
        Ok(out)
    }
}

impl GraphView for SingleGraspRoadmapGraph<'_> {
    fn start_node(&self) -> VertexId {
        vertex_of(self.start)
    }

    fn check_validity(&mut self, v: VertexId) -> Result<bool> {
        self.roadmap.is_valid_for_grasp(node_of(v), self.grasp)
    }

    fn heuristic(&self, v: VertexId) -> Result<f64> {
        match self.roadmap.node(node_of(v)) {
            Some(node) => self.heuristic.cost_to_go_for_grasp(&node.config, self.grasp),
            None => Ok(f64::INFINITY),
        }
    }

    fn successors(&mut self, v: VertexId, lazy: bool) -> Result<Vec<VertexId>> {
        self.neighbors(v, lazy)
    }

    fn predecessors(&mut self, v: VertexId, lazy: bool) -> Result<Vec<VertexId>> {
        self.neighbors(v, lazy)
    }

    fn edge_cost(&mut self, u: VertexId, v: VertexId, lazy: bool) -> Result<f64> {
        let (a, b) = (node_of(u), node_of(v));
        if lazy {
            if self.known_invalid(a) || self.known_invalid(b) {
                return Ok(f64::INFINITY);
            }
            return Ok(self
                .roadmap
                .edge_between(a, b)
                .map_or(f64::INFINITY, |e| self.roadmap.best_known_cost(e, self.grasp)));
        }
        if !self.roadmap.is_valid_for_grasp(a, self.grasp)?
            || !self.roadmap.is_valid_for_grasp(b, self.grasp)?
        {
            return Ok(f64::INFINITY);
        }
        let Some(e) = self.roadmap.edge_between(a, b) else {
            return Ok(f64::INFINITY);
        };
        Ok(self.roadmap.compute_conditional_cost(e, self.grasp)?.1)
    }

    fn is_goal(&mut self, v: VertexId) -> Result<bool> {
        self.goal_set.is_goal(self.roadmap, node_of(v), self.grasp)
    }

    fn goal_cost(&self, v: VertexId) -> Result<f64> {
        match self.goal_set.goal_id(node_of(v), self.grasp) {
            Ok((id, true)) => Ok(self.heuristic.goal_cost(self.goal_set.goal(id)?.quality)),
            _ => Ok(f64::INFINITY),
        }
    }
}
