//! Multi-grasp planner facade.
//!
//! Owns the roadmap, the goal set and the start node. Each `plan` call
//! snapshots the goal set into a fresh heuristic, searches every grasp that
//! has goals on its own single-grasp view, and keeps the cheapest solution.
//! Roadmap caches persist across calls, so replanning after `densify` or goal
//! edits reuses every earlier evaluation.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::{debug, info};

use crate::error::{PlanError, Result};
use crate::goals::{CostToGoHeuristic, Goal, GoalId, MultiGraspGoalSet};
use crate::graph::{node_of, SingleGraspRoadmapGraph};
use crate::roadmap::{NodeId, Roadmap, RoadmapCfg};
use crate::search::{lazy_sp, lpa_star_search, SearchResult};
use crate::space::{Config, GraspId, StateSpace};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Eager LPA* from scratch per grasp.
    LpaStar,
    /// LazySP driven by incremental LPA*.
    #[default]
    LazySp,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::LpaStar => "lpastar",
            Algorithm::LazySp => "lazysp",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lpastar" => Ok(Algorithm::LpaStar),
            "lazysp" => Ok(Algorithm::LazySp),
            other => Err(PlanError::invalid(format!("unknown algorithm '{other}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PlannerCfg {
    pub algorithm: Algorithm,
    /// Weight of goal quality against path cost.
    pub lambda: f64,
    pub roadmap: RoadmapCfg,
}

impl Default for PlannerCfg {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            lambda: 1.0,
            roadmap: RoadmapCfg::default(),
        }
    }
}

impl PlannerCfg {
    pub fn validate(&self) -> Result<()> {
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(PlanError::invalid("lambda must be finite and >= 0"));
        }
        self.roadmap.validate()
    }
}

/// Best path over all grasps.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub goal_id: GoalId,
    pub grasp: GraspId,
    /// Start configuration first, goal configuration last.
    pub path: Vec<Config>,
    pub path_cost: f64,
    pub goal_cost: f64,
    /// `path_cost + goal_cost`.
    pub cost: f64,
}

pub struct MgGraphSearch {
    state_space: Rc<dyn StateSpace>,
    roadmap: Roadmap,
    goal_set: MultiGraspGoalSet,
    start: NodeId,
    cfg: PlannerCfg,
}

impl fmt::Debug for MgGraphSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MgGraphSearch")
            .field("nodes", &self.roadmap.node_count())
            .field("goals", &self.goal_set.len())
            .field("start", &self.start)
            .field("cfg", &self.cfg)
            .finish()
    }
}

impl MgGraphSearch {
    /// Build the initial roadmap (one densification batch) and register `start`.
    pub fn new(state_space: Rc<dyn StateSpace>, start: Config, cfg: PlannerCfg) -> Result<Self> {
        cfg.validate()?;
        let mut roadmap = Roadmap::with_integral_costs(Rc::clone(&state_space), cfg.roadmap)?;
        let start = roadmap.add_node(start)?;
        Ok(Self {
            state_space,
            roadmap,
            goal_set: MultiGraspGoalSet::new(),
            start,
            cfg,
        })
    }

    pub fn cfg(&self) -> &PlannerCfg {
        &self.cfg
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn goal_set(&self) -> &MultiGraspGoalSet {
        &self.goal_set
    }

    pub fn start_node(&self) -> NodeId {
        self.start
    }

    pub fn add_goal(&mut self, goal: Goal) -> Result<NodeId> {
        self.goal_set.add_goal(&mut self.roadmap, goal)
    }

    pub fn remove_goals(&mut self, ids: &[GoalId]) {
        self.goal_set.remove_goals(ids);
    }

    pub fn densify(&mut self, batch_size: usize) -> Result<()> {
        self.roadmap.densify(batch_size)
    }

    /// Search all grasps with goals; `None` when no goal is reachable.
    pub fn plan(&mut self) -> Result<Option<Solution>> {
        if self.goal_set.is_empty() {
            debug!("plan: no goals registered");
            return Ok(None);
        }
        let space = Rc::clone(&self.state_space);
        let heuristic = CostToGoHeuristic::new(
            &self.goal_set,
            move |a: &Config, b: &Config| space.distance(a, b),
            self.cfg.lambda,
        )?;
        let mut best: Option<(GraspId, SearchResult)> = None;
        for grasp in self.goal_set.grasp_ids() {
            let graph = SingleGraspRoadmapGraph::new(
                &mut self.roadmap,
                &self.goal_set,
                &heuristic,
                grasp,
                self.start,
            );
            let result = match self.cfg.algorithm {
                Algorithm::LpaStar => lpa_star_search(graph)?,
                Algorithm::LazySp => lazy_sp(graph)?,
            };
            debug!(
                grasp = grasp.0,
                solved = result.solved,
                cost = result.cost(),
                "plan: grasp searched"
            );
            if result.solved && best.as_ref().map_or(true, |(_, b)| result.cost() < b.cost()) {
                best = Some((grasp, result));
            }
        }
        let Some((grasp, result)) = best else {
            info!(
                algorithm = %self.cfg.algorithm,
                nodes = self.roadmap.node_count(),
                "plan: no solution"
            );
            return Ok(None);
        };
        let solution = self.solution(grasp, &result)?;
        info!(
            algorithm = %self.cfg.algorithm,
            goal = solution.goal_id.0,
            grasp = grasp.0,
            waypoints = solution.path.len(),
            cost = solution.cost,
            "plan: solved"
        );
        Ok(Some(solution))
    }

    fn solution(&self, grasp: GraspId, result: &SearchResult) -> Result<Solution> {
        let path = result
            .path
            .iter()
            .map(|&v| Ok(self.roadmap.live_node(node_of(v))?.config.clone()))
            .collect::<Result<Vec<_>>>()?;
        let (goal_id, _) = self.goal_set.goal_id(node_of(result.goal_node), grasp)?;
        Ok(Solution {
            goal_id,
            grasp,
            path,
            path_cost: result.path_cost,
            goal_cost: result.goal_cost,
            cost: result.cost(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sphere_world::RandomWorldParams;
    use crate::testutil::cfg;
    use crate::SphereWorld;

    fn planner_cfg(algorithm: Algorithm, lambda: f64) -> PlannerCfg {
        PlannerCfg {
            algorithm,
            lambda,
            roadmap: RoadmapCfg {
                batch_size: 100,
                step_size: 0.01,
            },
        }
    }

    fn goal(id: u32, grasp: u32, xs: &[f64], quality: f64) -> Goal {
        Goal {
            id: GoalId(id),
            grasp_id: GraspId(grasp),
            config: cfg(xs),
            quality,
        }
    }

    fn open_world() -> Rc<dyn StateSpace> {
        let mut world = SphereWorld::unit_box(2).unwrap();
        world.add_grasp(GraspId(0), 0.0).unwrap();
        world.add_grasp(GraspId(1), 0.0).unwrap();
        Rc::new(world)
    }

    #[test]
    fn lambda_trades_quality_for_distance() {
        for (lambda, expected) in [(0.0, GoalId(1)), (10.0, GoalId(2))] {
            let mut p =
                MgGraphSearch::new(open_world(), cfg(&[0.1, 0.1]), planner_cfg(Algorithm::LazySp, lambda))
                    .unwrap();
            p.add_goal(goal(1, 0, &[0.3, 0.1], 0.0)).unwrap();
            p.add_goal(goal(2, 1, &[0.9, 0.9], 1.0)).unwrap();
            let s = p.plan().unwrap().expect("solution");
            assert_eq!(s.goal_id, expected, "lambda = {lambda}");
            assert_eq!(s.path.first(), Some(&cfg(&[0.1, 0.1])));
            assert_eq!(s.path.last(), Some(&p.goal_set().goal(expected).unwrap().config));
            assert!((s.cost - (s.path_cost + s.goal_cost)).abs() < 1e-12);
        }
    }

    #[test]
    fn unreachable_grasp_falls_back_to_another() {
        let mut world = SphereWorld::unit_box(2).unwrap();
        world.add_obstacle(cfg(&[0.5, 0.75]), 0.1).unwrap();
        world.add_grasp(GraspId(0), 0.2).unwrap();
        world.add_grasp(GraspId(1), 0.0).unwrap();
        let mut p = MgGraphSearch::new(
            Rc::new(world),
            cfg(&[0.1, 0.1]),
            planner_cfg(Algorithm::LpaStar, 1.0),
        )
        .unwrap();
        // too close to the obstacle once grasp 0 inflates the footprint
        p.add_goal(goal(1, 0, &[0.5, 0.5], 1.0)).unwrap();
        p.add_goal(goal(2, 1, &[0.9, 0.1], 0.0)).unwrap();
        let s = p.plan().unwrap().expect("solution");
        assert_eq!(s.goal_id, GoalId(2));
        assert_eq!(s.grasp, GraspId(1));
    }

    #[test]
    fn no_goals_or_blocked_start_yields_none() {
        let mut p =
            MgGraphSearch::new(open_world(), cfg(&[0.1, 0.1]), planner_cfg(Algorithm::LazySp, 1.0))
                .unwrap();
        assert!(p.plan().unwrap().is_none());

        let mut world = SphereWorld::unit_box(2).unwrap();
        world.add_obstacle(cfg(&[0.1, 0.1]), 0.05).unwrap();
        world.add_grasp(GraspId(0), 0.0).unwrap();
        let mut p = MgGraphSearch::new(
            Rc::new(world),
            cfg(&[0.1, 0.1]),
            planner_cfg(Algorithm::LazySp, 1.0),
        )
        .unwrap();
        p.add_goal(goal(1, 0, &[0.9, 0.9], 1.0)).unwrap();
        assert!(p.plan().unwrap().is_none());
    }

    #[test]
    fn removed_goal_is_no_longer_chosen() {
        let mut p =
            MgGraphSearch::new(open_world(), cfg(&[0.1, 0.1]), planner_cfg(Algorithm::LazySp, 0.0))
                .unwrap();
        p.add_goal(goal(1, 0, &[0.3, 0.1], 1.0)).unwrap();
        p.add_goal(goal(2, 0, &[0.9, 0.9], 1.0)).unwrap();
        assert_eq!(p.plan().unwrap().unwrap().goal_id, GoalId(1));
        p.remove_goals(&[GoalId(1)]);
        assert_eq!(p.plan().unwrap().unwrap().goal_id, GoalId(2));
    }

    #[test]
    fn densify_never_makes_the_solution_worse() {
        let mut p =
            MgGraphSearch::new(open_world(), cfg(&[0.05, 0.5]), planner_cfg(Algorithm::LazySp, 1.0))
                .unwrap();
        p.add_goal(goal(1, 0, &[0.95, 0.5], 1.0)).unwrap();
        let before = p.plan().unwrap().unwrap().cost;
        p.densify(200).unwrap();
        let after = p.plan().unwrap().unwrap().cost;
        assert!(after <= before + 1e-9, "{after} > {before}");
        assert!(after >= 0.9 - 1e-9);
    }

    #[test]
    fn algorithms_agree_on_random_worlds() {
        let params = RandomWorldParams::default();
        for seed in 0..4u64 {
            let mut costs = Vec::new();
            for algorithm in [Algorithm::LpaStar, Algorithm::LazySp] {
                let mut world = SphereWorld::random(&params, seed).unwrap();
                world.clearance_weight = 0.01;
                let mut p =
                    MgGraphSearch::new(Rc::new(world), cfg(&[0.02, 0.02]), planner_cfg(algorithm, 0.5))
                        .unwrap();
                p.add_goal(goal(1, 0, &[0.98, 0.98], 1.0)).unwrap();
                p.add_goal(goal(2, 1, &[0.98, 0.02], 0.5)).unwrap();
                // deletions shrink the live count and so widen the radius;
                // settle them up front so both searches see one graph
                let ids: Vec<NodeId> = p.roadmap.nodes().map(|n| n.id).collect();
                for id in ids {
                    p.roadmap.is_valid(id).unwrap();
                }
                costs.push(p.plan().unwrap().map(|s| s.cost));
            }
            match (costs[0], costs[1]) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9, "seed {seed}: {a} vs {b}"),
                (a, b) => assert_eq!(a, b, "seed {seed}"),
            }
        }
    }

    #[test]
    fn algorithm_names_round_trip() {
        for a in [Algorithm::LpaStar, Algorithm::LazySp] {
            assert_eq!(a.as_str().parse::<Algorithm>().unwrap(), a);
        }
        assert!("dijkstra".parse::<Algorithm>().is_err());
    }

    #[test]
    fn invalid_cfg_is_rejected() {
        let mut c = planner_cfg(Algorithm::LazySp, -1.0);
        assert!(MgGraphSearch::new(open_world(), cfg(&[0.1, 0.1]), c).is_err());
        c.lambda = 1.0;
        c.roadmap.step_size = 0.0;
        assert!(matches!(
            MgGraphSearch::new(open_world(), cfg(&[0.1, 0.1]), c),
            Err(PlanError::InvalidParams(_))
        ));
    }
}
