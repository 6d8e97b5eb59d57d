//! Cost-to-go over a snapshot of the goal set.
//!
//! The composite distance from `q` to goal `g` is
//! `path_cost(q, g.config) + λ/N · (q_max − g.quality)` with `N = q_max − q_min`
//! (`N = 1` if all qualities agree). Admissible whenever `path_cost` lower-bounds
//! edge costs.

use std::collections::HashMap;
use std::fmt;

use super::{Goal, GoalId, MultiGraspGoalSet};
use crate::error::{PlanError, Result};
use crate::nn::NearestNeighbors;
use crate::space::{Config, GraspId};

type PathCostFn = Box<dyn Fn(&Config, &Config) -> f64>;

pub struct CostToGoHeuristic {
    goals: HashMap<GoalId, Goal>,
    all_goals: NearestNeighbors<GoalId>,
    per_grasp: HashMap<GraspId, NearestNeighbors<GoalId>>,
    path_cost: PathCostFn,
    scaled_lambda: f64,
    max_quality: f64,
}

impl fmt::Debug for CostToGoHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostToGoHeuristic")
            .field("goals", &self.all_goals.len())
            .field("grasps", &self.per_grasp.len())
            .field("scaled_lambda", &self.scaled_lambda)
            .field("max_quality", &self.max_quality)
            .finish()
    }
}

impl CostToGoHeuristic {
    /// Snapshot `goal_set`. Later goal-set changes require a new heuristic.
    pub fn new<F>(goal_set: &MultiGraspGoalSet, path_cost: F, lambda: f64) -> Result<Self>
    where
        F: Fn(&Config, &Config) -> f64 + 'static,
    {
        if goal_set.is_empty() {
            return Err(PlanError::NoGoals);
        }
        if !(lambda.is_finite() && lambda >= 0.0) {
            return Err(PlanError::invalid("lambda must be finite and >= 0"));
        }
        let (min_q, max_q) = goal_set
            .goals()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), g| {
                (lo.min(g.quality), hi.max(g.quality))
            });
        let mut normalizer = max_q - min_q;
        if normalizer == 0.0 {
            normalizer = 1.0;
        }
        let mut all_goals = NearestNeighbors::new();
        let mut per_grasp: HashMap<GraspId, NearestNeighbors<GoalId>> = HashMap::new();
        for goal in goal_set.goals() {
            all_goals.add(goal.id);
            per_grasp.entry(goal.grasp_id).or_default().add(goal.id);
        }
        let goals = goal_set.goals().map(|g| (g.id, g.clone())).collect();
        Ok(Self {
            goals,
            all_goals,
            per_grasp,
            path_cost: Box::new(path_cost),
            scaled_lambda: lambda / normalizer,
            max_quality: max_q,
        })
    }

    /// Penalty for settling on a goal of quality `quality`.
    pub fn goal_cost(&self, quality: f64) -> f64 {
        self.scaled_lambda * (self.max_quality - quality)
    }

    fn composite(&self, config: &Config, id: &GoalId) -> f64 {
        self.goals.get(id).map_or(f64::INFINITY, |goal| {
            (self.path_cost)(config, &goal.config) + self.goal_cost(goal.quality)
        })
    }

    fn resolve(&self, nearest: Option<(GoalId, f64)>) -> Option<(&Goal, f64)> {
        nearest.and_then(|(id, d)| self.goals.get(&id).map(|g| (g, d)))
    }

    /// Nearest goal over all grasps and its composite distance.
    pub fn nearest_goal(&self, config: &Config) -> Result<(&Goal, f64)> {
        self.resolve(self.all_goals.nearest(|id| self.composite(config, id)))
            .ok_or(PlanError::NoGoals)
    }

    pub fn nearest_goal_for_grasp(&self, config: &Config, grasp: GraspId) -> Result<(&Goal, f64)> {
        let nn = self
            .per_grasp
            .get(&grasp)
            .ok_or(PlanError::NoGoalsForGrasp(grasp))?;
        self.resolve(nn.nearest(|id| self.composite(config, id)))
            .ok_or(PlanError::NoGoalsForGrasp(grasp))
    }

    pub fn cost_to_go(&self, config: &Config) -> Result<f64> {
        Ok(self.nearest_goal(config)?.1)
    }

    pub fn cost_to_go_for_grasp(&self, config: &Config, grasp: GraspId) -> Result<f64> {
        Ok(self.nearest_goal_for_grasp(config, grasp)?.1)
    }
}
