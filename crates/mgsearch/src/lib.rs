//! Multi-grasp motion planning on lazily evaluated PRM* roadmaps.
//!
//! Layers, bottom-up:
//! - `space`: configuration type and the `StateSpace` oracle trait.
//! - `roadmap`: Halton-densified PRM* graph with cached validity and costs.
//! - `goals`: multi-grasp goal registry and the cost-to-go heuristic.
//! - `search`: the `GraphView` contract, LPA* and LazySP.
//! - `graph`: single-grasp `GraphView` over a roadmap.
//! - `planner`: `MgGraphSearch`, which searches every grasp and keeps the best.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API; prefer
//!   clarity over compatibility when changing it.

pub mod api;
pub mod error;
pub mod goals;
pub mod graph;
pub mod halton;
pub mod nn;
pub mod planner;
pub mod roadmap;
pub mod search;
pub mod space;
pub mod sphere_world;

#[cfg(test)]
mod testutil;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{PlanError, Result};
pub use planner::{Algorithm, MgGraphSearch, PlannerCfg, Solution};
pub use space::{Config, GraspId};
pub use sphere_world::SphereWorld;

/// Common planning exports for quick imports in callers.
pub mod prelude {
    pub use crate::goals::{Goal, GoalId};
    pub use crate::planner::{Algorithm, MgGraphSearch, PlannerCfg, Solution};
    pub use crate::roadmap::RoadmapCfg;
    pub use crate::space::{Config, GraspId, SpaceInformation, StateSpace};
    pub use crate::sphere_world::{RandomWorldParams, SphereWorld};
}
