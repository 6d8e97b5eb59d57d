//! Lazily evaluated PRM* roadmap over a configuration space.
//!
//! Purpose
//! - Grow a proximity graph by batched Halton sampling and connect nodes with
//!   the PRM* radius `r = γ·(ln n / n)^(1/d)`.
//! - Evaluate validity and edge costs only when a search asks for them, and
//!   cache every answer (base and per-grasp).
//!
//! Storage
//! - Nodes and edges live in arenas indexed by `NodeId`/`EdgeId`. Deleting a
//!   node empties its slot and marks its edges evaluated-infinite, so a stale
//!   edge id reads as permanently infeasible instead of dangling. Neighbors
//!   drop such edges the next time their adjacency is touched.
//! - Adjacency of a node is recomputed at most once per densification
//!   generation; existing edges are kept.
//!
//! Events (new node, validity checks, edge cost evaluations) are emitted as
//! `tracing` events on target `mgsearch::roadmap`.

mod cost;
mod types;

pub use cost::{EdgeCostComputer, IntegralEdgeCostComputer};
pub use types::{Edge, EdgeId, Node, NodeId, RoadmapCfg};

use std::f64::consts::PI;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{PlanError, Result};
use crate::halton::HaltonSequence;
use crate::nn::NearestNeighbors;
use crate::space::{Config, GraspId, SpaceInformation, StateSpace};

pub struct Roadmap {
    state_space: Rc<dyn StateSpace>,
    cost_computer: Box<dyn EdgeCostComputer>,
    si: SpaceInformation,
    cfg: RoadmapCfg,
    nodes: Vec<Option<Node>>,
    edges: Vec<Edge>,
    nn: NearestNeighbors<NodeId>,
    halton: HaltonSequence,
    densification_gen: u64,
    gamma_prm: f64,
}

impl Roadmap {
    /// Create a roadmap and draw the first batch of `cfg.batch_size` samples.
    pub fn new(
        state_space: Rc<dyn StateSpace>,
        cost_computer: Box<dyn EdgeCostComputer>,
        cfg: RoadmapCfg,
    ) -> Result<Self> {
        let mut roadmap = Self::empty(state_space, cost_computer, cfg)?;
        roadmap.densify(cfg.batch_size)?;
        Ok(roadmap)
    }

    /// Roadmap with integral edge costs at `cfg.step_size`.
    pub fn with_integral_costs(state_space: Rc<dyn StateSpace>, cfg: RoadmapCfg) -> Result<Self> {
        let cc = IntegralEdgeCostComputer::new(state_space.clone(), cfg.step_size);
        Self::new(state_space, Box::new(cc), cfg)
    }

    /// Create a roadmap without sampling anything; nodes come from `add_node`.
    pub fn empty(
        state_space: Rc<dyn StateSpace>,
        cost_computer: Box<dyn EdgeCostComputer>,
        cfg: RoadmapCfg,
    ) -> Result<Self> {
        cfg.validate()?;
        let si = state_space.space_information().clone();
        si.validate()?;
        let gamma_prm = gamma_prm(si.volume(), si.dimension);
        Ok(Self {
            halton: HaltonSequence::new(si.dimension),
            state_space,
            cost_computer,
            si,
            cfg,
            nodes: Vec::new(),
            edges: Vec::new(),
            nn: NearestNeighbors::new(),
            densification_gen: 0,
            gamma_prm,
        })
    }

    pub fn space_information(&self) -> &SpaceInformation {
        &self.si
    }

    pub fn dimension(&self) -> usize {
        self.si.dimension
    }

    pub fn cfg(&self) -> &RoadmapCfg {
        &self.cfg
    }

    pub fn generation(&self) -> u64 {
        self.densification_gen
    }

    pub fn gamma_prm(&self) -> f64 {
        self.gamma_prm
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nn.len()
    }

    /// PRM* connection radius for the current (live) node count.
    pub fn connection_radius(&self) -> f64 {
        let n = self.node_count() as f64;
        if n < 2.0 {
            return 0.0;
        }
        self.gamma_prm * (n.ln() / n).powf(1.0 / self.si.dimension as f64)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Node lookup that reports stale ids as an error.
    pub fn live_node(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(PlanError::ExpiredNode(id))
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.node(a)?.edges.get(&b).copied()
    }

    /// Live nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Current adjacency of `id` as (neighbor, edge) pairs, without updating it.
    pub fn adjacency(&self, id: NodeId) -> Result<Vec<(NodeId, EdgeId)>> {
        Ok(self
            .live_node(id)?
            .edges
            .iter()
            .map(|(&n, &e)| (n, e))
            .collect())
    }

    /// Draw the configured batch size.
    pub fn densify_default(&mut self) -> Result<()> {
        self.densify(self.cfg.batch_size)
    }

    /// Add `batch_size` Halton samples and start a new generation.
    pub fn densify(&mut self, batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(PlanError::invalid("batch_size must be > 0"));
        }
        let first = self.halton.cursor();
        for unit in self.halton.next_batch(batch_size) {
            let config = self.si.scale_to_limits(&unit);
            self.add_node(config)?;
        }
        self.densification_gen += 1;
        debug!(
            target: "mgsearch::roadmap",
            batch_size,
            halton_from = first,
            nodes = self.node_count(),
            generation = self.densification_gen,
            "densify"
        );
        Ok(())
    }

    /// Register a node at `config` (sample or goal). Adjacency is computed lazily.
    pub fn add_node(&mut self, config: Config) -> Result<NodeId> {
        self.si.check_dimension(&config)?;
        let id = NodeId(self.nodes.len());
        trace!(target: "mgsearch::roadmap", node = id.0, config = ?config.as_slice(), "new_node");
        self.nodes.push(Some(Node::new(id, config)));
        self.nn.add(id);
        Ok(id)
    }

    /// Connect `id` to all nodes within the current PRM* radius (once per
    /// generation), then drop adjacent edges known to be infeasible.
    pub fn update_adjacency(&mut self, id: NodeId) -> Result<()> {
        let node = self.live_node(id)?;
        if node.densification_gen != Some(self.densification_gen) {
            let r = self.connection_radius();
            let config = node.config.clone();
            let neighbors: Vec<NodeId> = self
                .nn
                .nearest_r(r, |&other| {
                    self.node(other).map_or(f64::INFINITY, |n| {
                        self.state_space.distance(&config, &n.config)
                    })
                })
                .into_iter()
                .filter(|&other| other != id && !node.edges.contains_key(&other))
                .collect();
            for other in neighbors {
                self.connect(id, other)?;
            }
            if let Some(node) = self.nodes[id.0].as_mut() {
                node.densification_gen = Some(self.densification_gen);
            }
        }
        self.prune_dead_edges(id);
        Ok(())
    }

    fn connect(&mut self, a: NodeId, b: NodeId) -> Result<EdgeId> {
        let lb = {
            let na = self.live_node(a)?;
            let nb = self.live_node(b)?;
            self.cost_computer.lower_bound(&na.config, &nb.config)
        };
        let eid = EdgeId(self.edges.len());
        self.edges.push(Edge::new(a, b, lb));
        for (x, y) in [(a, b), (b, a)] {
            if let Some(n) = self.nodes[x.0].as_mut() {
                n.edges.insert(y, eid);
            }
        }
        Ok(eid)
    }

    fn prune_dead_edges(&mut self, id: NodeId) {
        let edges = &self.edges;
        let mut dropped = Vec::new();
        if let Some(node) = self.nodes[id.0].as_mut() {
            node.edges.retain(|&nbr, &mut eid| {
                let dead = edges[eid.0].is_dead();
                if dead {
                    dropped.push(nbr);
                }
                !dead
            });
        }
        for nbr in dropped {
            if let Some(n) = self.nodes.get_mut(nbr.0).and_then(Option::as_mut) {
                n.edges.remove(&id);
            }
        }
    }

    /// Grasp-independent validity, evaluated once. An invalid node is deleted.
    pub fn is_valid(&mut self, id: NodeId) -> Result<bool> {
        let Some(node) = self.node(id) else {
            return Ok(false);
        };
        if let Some(valid) = node.validity {
            return Ok(valid);
        }
        let valid = self.state_space.is_valid(&node.config)?;
        trace!(target: "mgsearch::roadmap", node = id.0, valid, "val_base");
        if !valid {
            self.delete_node(id)?;
            return Ok(false);
        }
        if let Some(node) = self.nodes[id.0].as_mut() {
            node.validity = Some(true);
        }
        Ok(true)
    }

    /// Validity under `grasp`. A failure is cached but does not delete the node.
    pub fn is_valid_for_grasp(&mut self, id: NodeId, grasp: GraspId) -> Result<bool> {
        if !self.is_valid(id)? {
            return Ok(false);
        }
        let node = self.live_node(id)?;
        if let Some(&valid) = node.conditional_validity.get(&grasp) {
            return Ok(valid);
        }
        let valid = self.state_space.is_valid_for_grasp(&node.config, grasp)?;
        trace!(target: "mgsearch::roadmap", node = id.0, grasp = grasp.0, valid, "val_grasp");
        if let Some(node) = self.nodes[id.0].as_mut() {
            node.conditional_validity.insert(grasp, valid);
        }
        Ok(valid)
    }

    /// Evaluate (once) and return `(traversable, base cost)` of an edge.
    pub fn compute_cost(&mut self, eid: EdgeId) -> Result<(bool, f64)> {
        let edge = self.edges.get(eid.0).ok_or_else(|| unknown_edge(eid))?;
        if edge.base_evaluated {
            return Ok((edge.base_cost.is_finite(), edge.base_cost));
        }
        let (a, b) = edge.nodes;
        let (Some(na), Some(nb)) = (self.node(a), self.node(b)) else {
            return Ok((false, f64::INFINITY));
        };
        let cost = self.cost_computer.cost(&na.config, &nb.config)?;
        trace!(target: "mgsearch::roadmap", a = a.0, b = b.0, cost, "edge_cost");
        let edge = &mut self.edges[eid.0];
        edge.base_cost = cost;
        edge.base_evaluated = true;
        Ok((cost.is_finite(), cost))
    }

    /// Evaluate (once) and return `(traversable, cost)` of an edge under `grasp`.
    ///
    /// Known-infeasible base edges answer immediately: no grasp can make them
    /// traversable.
    pub fn compute_conditional_cost(&mut self, eid: EdgeId, grasp: GraspId) -> Result<(bool, f64)> {
        let edge = self.edges.get(eid.0).ok_or_else(|| unknown_edge(eid))?;
        if edge.is_dead() {
            return Ok((false, f64::INFINITY));
        }
        if let Some(&cost) = edge.conditional_costs.get(&grasp) {
            return Ok((cost.is_finite(), cost));
        }
        let (a, b) = edge.nodes;
        let (Some(na), Some(nb)) = (self.node(a), self.node(b)) else {
            return Ok((false, f64::INFINITY));
        };
        let cost = self
            .cost_computer
            .conditional_cost(&na.config, &nb.config, grasp)?;
        trace!(
            target: "mgsearch::roadmap",
            a = a.0,
            b = b.0,
            grasp = grasp.0,
            cost,
            "edge_cost_grasp"
        );
        self.edges[eid.0].conditional_costs.insert(grasp, cost);
        Ok((cost.is_finite(), cost))
    }

    /// Best currently known cost of an edge for `grasp` (no evaluation).
    pub fn best_known_cost(&self, eid: EdgeId, grasp: GraspId) -> f64 {
        self.edge(eid)
            .map_or(f64::INFINITY, |e| e.best_known_cost(grasp))
    }

    /// Remove a node; every incident edge becomes evaluated-infinite.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(PlanError::ExpiredNode(id))?;
        self.nn.remove(&id);
        for eid in node.edges.values() {
            let edge = &mut self.edges[eid.0];
            edge.base_evaluated = true;
            edge.base_cost = f64::INFINITY;
        }
        debug!(target: "mgsearch::roadmap", node = id.0, edges = node.edges.len(), "delete_node");
        Ok(())
    }
}

fn unknown_edge(eid: EdgeId) -> PlanError {
    PlanError::invalid(format!("unknown edge {eid:?}"))
}

/// Volume of the unit ball in R^d.
pub(crate) fn unit_ball_volume(d: usize) -> f64 {
    // V_0 = 1, V_1 = 2, V_d = 2π/d · V_{d-2}
    let (mut v, mut k) = if d % 2 == 0 { (1.0, 0) } else { (2.0, 1) };
    while k < d {
        k += 2;
        v *= 2.0 * PI / k as f64;
    }
    v
}

/// PRM* constant (Karaman & Frazzoli), using the bounds volume for μ(X_free).
pub(crate) fn gamma_prm(mu: f64, d: usize) -> f64 {
    let df = d as f64;
    2.0 * ((1.0 + 1.0 / df) * mu / unit_ball_volume(d)).powf(1.0 / df)
}
