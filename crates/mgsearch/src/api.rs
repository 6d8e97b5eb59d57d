//! Curated internal API (UNSTABLE).
//!
//! Important
//! - This is not a public API. It is a convenience surface for the CLI,
//!   benches and demos. Breaking changes are allowed and expected.
//! - Prefer these re-exports for clarity and consistency across experiments.

// Oracle and configuration space
pub use crate::space::{c_space_distance, Config, GraspId, SpaceInformation, StateSpace};
pub use crate::sphere_world::{RandomWorldParams, Sphere, SphereWorld};
// Roadmap
pub use crate::roadmap::{
    Edge, EdgeCostComputer, EdgeId, IntegralEdgeCostComputer, Node, NodeId, Roadmap, RoadmapCfg,
};
// Goals and heuristic
pub use crate::goals::{CostToGoHeuristic, Goal, GoalId, MultiGraspGoalSet};
// Search
pub use crate::graph::SingleGraspRoadmapGraph;
pub use crate::search::{
    lazy_sp, lpa_star_search, EdgeChange, GraphView, Key, LpaStar, SearchResult, VertexId,
};
// Planner
pub use crate::planner::{Algorithm, MgGraphSearch, PlannerCfg, Solution};
