//! Error type shared by the roadmap, goal bookkeeping, and search.
//!
//! Infeasible queries are not errors: the search reports `solved = false`.
//! Everything here is either an oracle failure surfaced unchanged or a usage
//! error on the caller's side.

use crate::goals::GoalId;
use crate::roadmap::NodeId;
use crate::space::GraspId;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The validity/cost oracle itself failed. No cache was written.
    #[error("oracle failure: {0}")]
    Oracle(#[source] anyhow::Error),
    /// A node id that was deleted (found invalid) or never existed.
    #[error("node {0:?} has expired")]
    ExpiredNode(NodeId),
    #[error("configuration has dimension {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("invalid space bounds: {0}")]
    InvalidBounds(String),
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// Cost-to-go requested while no goal is registered.
    #[error("no goals registered; cost-to-go is undefined")]
    NoGoals,
    #[error("no goal registered for grasp {0:?}")]
    NoGoalsForGrasp(GraspId),
    #[error("there is no goal with id {0:?}")]
    UnknownGoal(GoalId),
    #[error("a goal with id {0:?} is already registered")]
    DuplicateGoal(GoalId),
    /// Lookup by node found no goal at all (distinct from a grasp mismatch).
    #[error("node {0:?} is not bound to any goal")]
    NoGoalAtNode(NodeId),
}

impl PlanError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams(reason.into())
    }

    pub(crate) fn bounds(reason: impl Into<String>) -> Self {
        Self::InvalidBounds(reason.into())
    }
}

impl From<anyhow::Error> for PlanError {
    fn from(e: anyhow::Error) -> Self {
        PlanError::Oracle(e)
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
