//! Arena records for roadmap nodes and edges, plus the roadmap configuration.

use std::collections::{BTreeMap, HashMap};

use crate::error::{PlanError, Result};
use crate::space::{Config, GraspId};

/// Index of a node slot in the roadmap arena. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Index of an edge in the roadmap arena. Edges are never freed; a dead edge is
/// one whose base cost is evaluated and infinite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub config: Config,
    /// Roadmap generation at which adjacency was last computed (`None`: never).
    pub densification_gen: Option<u64>,
    /// Grasp-independent validity once checked. Only `Some(true)` is ever
    /// stored: an invalid node is deleted instead.
    pub validity: Option<bool>,
    pub conditional_validity: HashMap<GraspId, bool>,
    /// neighbor id -> shared edge
    pub edges: BTreeMap<NodeId, EdgeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, config: Config) -> Self {
        Self {
            id,
            config,
            densification_gen: None,
            validity: None,
            conditional_validity: HashMap::new(),
            edges: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub nodes: (NodeId, NodeId),
    /// Lower bound until `base_evaluated`, then the integrated cost.
    pub base_cost: f64,
    pub base_evaluated: bool,
    pub conditional_costs: HashMap<GraspId, f64>,
}

impl Edge {
    pub(crate) fn new(a: NodeId, b: NodeId, lower_bound: f64) -> Self {
        Self {
            nodes: (a, b),
            base_cost: lower_bound,
            base_evaluated: false,
            conditional_costs: HashMap::new(),
        }
    }

    /// The endpoint that is not `n`.
    pub fn neighbor(&self, n: NodeId) -> NodeId {
        if self.nodes.0 == n {
            self.nodes.1
        } else {
            self.nodes.0
        }
    }

    /// Permanently infeasible (for every grasp).
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.base_evaluated && self.base_cost.is_infinite()
    }

    /// Conditional cost for `grasp` if evaluated, otherwise the base cost
    /// (which may itself still be the lower bound).
    pub fn best_known_cost(&self, grasp: GraspId) -> f64 {
        if self.is_dead() {
            return f64::INFINITY;
        }
        self.conditional_costs
            .get(&grasp)
            .copied()
            .unwrap_or(self.base_cost)
    }
}

/// Roadmap parameters.
#[derive(Clone, Copy, Debug)]
pub struct RoadmapCfg {
    /// Samples drawn per `densify_default` call (and once at construction).
    pub batch_size: usize,
    /// Integration step along edges, in configuration-space units.
    pub step_size: f64,
}

impl Default for RoadmapCfg {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            step_size: 0.001,
        }
    }
}

impl RoadmapCfg {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PlanError::invalid("batch_size must be > 0"));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(PlanError::invalid("step_size must be finite and > 0"));
        }
        Ok(())
    }
}
