//! Multi-grasp goal registry and the cost-to-go heuristic built from it.
//!
//! Every goal is backed by a roadmap node created on registration. Removing a
//! goal only drops the bookkeeping; the node stays in the roadmap as a plain
//! sample.

mod heuristic;

pub use heuristic::CostToGoHeuristic;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{PlanError, Result};
use crate::roadmap::{NodeId, Roadmap};
use crate::space::{Config, GraspId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoalId(pub u32);

/// A goal configuration reachable with one grasp. Higher quality is better.
#[derive(Clone, Debug, PartialEq)]
pub struct Goal {
    pub id: GoalId,
    pub grasp_id: GraspId,
    pub config: Config,
    pub quality: f64,
}

#[derive(Clone, Debug, Default)]
pub struct MultiGraspGoalSet {
    goals: BTreeMap<GoalId, Goal>,
    goal_to_node: HashMap<GoalId, NodeId>,
    node_to_goal: HashMap<NodeId, GoalId>,
}

impl MultiGraspGoalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `goal` and create its backing roadmap node.
    pub fn add_goal(&mut self, roadmap: &mut Roadmap, goal: Goal) -> Result<NodeId> {
        if self.goals.contains_key(&goal.id) {
            return Err(PlanError::DuplicateGoal(goal.id));
        }
        let node = roadmap.add_node(goal.config.clone())?;
        self.goal_to_node.insert(goal.id, node);
        self.node_to_goal.insert(node, goal.id);
        self.goals.insert(goal.id, goal);
        Ok(node)
    }

    /// Drop a goal and both id mappings. Unknown ids are ignored.
    pub fn remove_goal(&mut self, id: GoalId) {
        if self.goals.remove(&id).is_none() {
            return;
        }
        if let Some(node) = self.goal_to_node.remove(&id) {
            let removed = self.node_to_goal.remove(&node);
            debug_assert_eq!(removed, Some(id));
        }
    }

    pub fn remove_goals(&mut self, ids: &[GoalId]) {
        for &id in ids {
            self.remove_goal(id);
        }
    }

    pub fn goal(&self, id: GoalId) -> Result<&Goal> {
        self.goals.get(&id).ok_or(PlanError::UnknownGoal(id))
    }

    pub fn goal_node(&self, id: GoalId) -> Result<NodeId> {
        self.goal_to_node
            .get(&id)
            .copied()
            .ok_or(PlanError::UnknownGoal(id))
    }

    /// Goals in id order.
    pub fn goals(&self) -> impl Iterator<Item = &Goal> {
        self.goals.values()
    }

    pub fn grasp_ids(&self) -> BTreeSet<GraspId> {
        self.goals.values().map(|g| g.grasp_id).collect()
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    /// True iff `node` is valid under `grasp` and is a goal for exactly that grasp.
    pub fn is_goal(&self, roadmap: &mut Roadmap, node: NodeId, grasp: GraspId) -> Result<bool> {
        // Skip the oracle for plain roadmap nodes.
        let Some(goal_id) = self.node_to_goal.get(&node) else {
            return Ok(false);
        };
        if self.goals[goal_id].grasp_id != grasp {
            return Ok(false);
        }
        roadmap.is_valid_for_grasp(node, grasp)
    }

    /// Goal bound to `node`, and whether its grasp is `grasp`.
    ///
    /// `Err(NoGoalAtNode)` when no goal is bound to the node at all.
    pub fn goal_id(&self, node: NodeId, grasp: GraspId) -> Result<(GoalId, bool)> {
        let &goal_id = self
            .node_to_goal
            .get(&node)
            .ok_or(PlanError::NoGoalAtNode(node))?;
        Ok((goal_id, self.goals[&goal_id].grasp_id == grasp))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::roadmap::{IntegralEdgeCostComputer, RoadmapCfg};
    use crate::testutil::{cfg, CountingSpace};
    use crate::SphereWorld;

    fn setup() -> (Rc<CountingSpace<SphereWorld>>, Roadmap) {
        let mut world = SphereWorld::unit_box(2).unwrap();
        world.add_obstacle(cfg(&[0.5, 0.5]), 0.1).unwrap();
        world.add_grasp(GraspId(1), 0.0).unwrap();
        world.add_grasp(GraspId(2), 0.2).unwrap();
        let space = Rc::new(CountingSpace::new(world));
        let rcfg = RoadmapCfg {
            batch_size: 4,
            step_size: 0.01,
        };
        let cc = IntegralEdgeCostComputer::new(space.clone(), rcfg.step_size);
        let rm = Roadmap::empty(space.clone(), Box::new(cc), rcfg).unwrap();
        (space, rm)
    }

    fn goal(id: u32, grasp: u32, xs: &[f64], quality: f64) -> Goal {
        Goal {
            id: GoalId(id),
            grasp_id: GraspId(grasp),
            config: cfg(xs),
            quality,
        }
    }

    #[test]
    fn add_and_lookup_both_directions() {
        let (_s, mut rm) = setup();
        let mut gs = MultiGraspGoalSet::new();
        let n1 = gs.add_goal(&mut rm, goal(10, 1, &[0.9, 0.9], 1.0)).unwrap();
        let n2 = gs.add_goal(&mut rm, goal(11, 2, &[0.1, 0.9], 2.0)).unwrap();
        assert_ne!(n1, n2);
        assert_eq!(rm.node_count(), 2);
        assert_eq!(gs.goal_node(GoalId(10)).unwrap(), n1);
        assert_eq!(gs.goal_id(n1, GraspId(1)).unwrap(), (GoalId(10), true));
        assert_eq!(gs.goal_id(n1, GraspId(2)).unwrap(), (GoalId(10), false));
        assert_eq!(gs.goal(GoalId(11)).unwrap().quality, 2.0);
        assert_eq!(
            gs.grasp_ids().into_iter().collect::<Vec<_>>(),
            vec![GraspId(1), GraspId(2)]
        );
        assert!(matches!(
            gs.add_goal(&mut rm, goal(10, 2, &[0.2, 0.2], 0.0)),
            Err(PlanError::DuplicateGoal(GoalId(10)))
        ));
    }

    #[test]
    fn not_found_differs_from_grasp_mismatch() {
        let (_s, mut rm) = setup();
        let mut gs = MultiGraspGoalSet::new();
        let plain = rm.add_node(cfg(&[0.2, 0.2])).unwrap();
        gs.add_goal(&mut rm, goal(1, 1, &[0.9, 0.9], 1.0)).unwrap();
        assert!(matches!(
            gs.goal_id(plain, GraspId(1)),
            Err(PlanError::NoGoalAtNode(_))
        ));
        assert!(matches!(
            gs.goal(GoalId(99)),
            Err(PlanError::UnknownGoal(GoalId(99)))
        ));
    }

    #[test]
    fn is_goal_requires_matching_grasp_and_validity() {
        let (s, mut rm) = setup();
        let mut gs = MultiGraspGoalSet::new();
        // valid for grasp 1, too close to the obstacle for grasp 2
        let near = gs.add_goal(&mut rm, goal(1, 2, &[0.5, 0.75], 1.0)).unwrap();
        let far = gs.add_goal(&mut rm, goal(2, 1, &[0.9, 0.9], 1.0)).unwrap();
        let plain = rm.add_node(cfg(&[0.1, 0.1])).unwrap();

        assert!(gs.is_goal(&mut rm, far, GraspId(1)).unwrap());
        assert!(!gs.is_goal(&mut rm, far, GraspId(2)).unwrap());
        assert!(!gs.is_goal(&mut rm, near, GraspId(2)).unwrap());
        assert!(rm.contains(near));
        let calls = s.validity_calls();
        assert!(!gs.is_goal(&mut rm, plain, GraspId(1)).unwrap());
        assert_eq!(s.validity_calls(), calls);
    }

    #[test]
    fn removing_a_goal_keeps_its_node() {
        let (_s, mut rm) = setup();
        let mut gs = MultiGraspGoalSet::new();
        let n = gs.add_goal(&mut rm, goal(1, 1, &[0.9, 0.9], 1.0)).unwrap();
        gs.add_goal(&mut rm, goal(2, 1, &[0.8, 0.9], 1.0)).unwrap();
        gs.remove_goals(&[GoalId(1), GoalId(42)]);
        assert_eq!(gs.len(), 1);
        assert!(rm.contains(n));
        assert!(!gs.is_goal(&mut rm, n, GraspId(1)).unwrap());
        assert!(gs.goal_id(n, GraspId(1)).is_err());
        assert!(gs.goal_node(GoalId(1)).is_err());
    }
}
