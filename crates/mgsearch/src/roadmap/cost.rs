//! Edge cost computation by integrating the oracle's differential cost.

use std::rc::Rc;

use crate::space::{Config, GraspId, StateSpace};

/// Cost model for roadmap edges.
pub trait EdgeCostComputer {
    /// Cheap admissible estimate used before an edge is evaluated.
    fn lower_bound(&self, a: &Config, b: &Config) -> f64;

    fn cost(&self, a: &Config, b: &Config) -> anyhow::Result<f64>;

    fn conditional_cost(&self, a: &Config, b: &Config, grasp: GraspId) -> anyhow::Result<f64>;
}

/// Integrates `StateSpace::cost` along the straight segment in fixed steps.
pub struct IntegralEdgeCostComputer {
    state_space: Rc<dyn StateSpace>,
    step_size: f64,
}

impl IntegralEdgeCostComputer {
    pub fn new(state_space: Rc<dyn StateSpace>, step_size: f64) -> Self {
        Self {
            state_space,
            step_size,
        }
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Left Riemann sum of `cost_fn` over `[a, b]`.
    ///
    /// The last step is truncated to the remaining length. Any infinite sample
    /// makes the whole segment infinite; the remaining samples are skipped.
    pub fn integrate_costs<F>(&self, a: &Config, b: &Config, cost_fn: F) -> anyhow::Result<f64>
    where
        F: Fn(&Config) -> anyhow::Result<f64>,
    {
        debug_assert_eq!(a.len(), b.len());
        let delta = b - a;
        let norm = delta.norm();
        if norm == 0.0 {
            return Ok(0.0);
        }
        let dir = delta / norm;
        let num_steps = (norm / self.step_size).ceil() as usize;
        let mut integral = 0.0;
        let mut progress = 0.0;
        for _ in 0..num_steps {
            let q = a + &dir * progress;
            let step = self.step_size.min(norm - progress).max(0.0);
            progress += step;
            let dc = cost_fn(&q)?;
            if dc.is_infinite() {
                return Ok(f64::INFINITY);
            }
            integral += dc * step;
        }
        Ok(integral)
    }
}

impl EdgeCostComputer for IntegralEdgeCostComputer {
    fn lower_bound(&self, a: &Config, b: &Config) -> f64 {
        self.state_space.distance(a, b)
    }

    fn cost(&self, a: &Config, b: &Config) -> anyhow::Result<f64> {
        self.integrate_costs(a, b, |q| self.state_space.cost(q))
    }

    fn conditional_cost(&self, a: &Config, b: &Config, grasp: GraspId) -> anyhow::Result<f64> {
        self.integrate_costs(a, b, |q| self.state_space.conditional_cost(q, grasp))
    }
}
