//! Sphere-obstacle configuration space.
//!
//! A concrete `StateSpace` for demos, benches, and tests: the robot is a point
//! in a box, obstacles are balls, and holding an object with a grasp inflates
//! the point by a per-grasp radius. Differential cost is `1 + w / clearance`
//! (`w = clearance_weight`), infinite in collision, so Euclidean distance is a
//! valid lower bound for every edge.

use std::collections::BTreeMap;

use anyhow::anyhow;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PlanError, Result};
use crate::space::{c_space_distance, Config, GraspId, SpaceInformation, StateSpace};

#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Config,
    pub radius: f64,
}

#[derive(Clone, Debug)]
pub struct SphereWorld {
    si: SpaceInformation,
    obstacles: Vec<Sphere>,
    grasps: BTreeMap<GraspId, f64>,
    pub clearance_weight: f64,
}

impl SphereWorld {
    pub fn new(si: SpaceInformation) -> Result<Self> {
        si.validate()?;
        Ok(Self {
            si,
            obstacles: Vec::new(),
            grasps: BTreeMap::new(),
            clearance_weight: 0.0,
        })
    }

    /// Obstacle-free `[0, 1]^dimension`.
    pub fn unit_box(dimension: usize) -> Result<Self> {
        Self::new(SpaceInformation::new(
            vec![0.0; dimension],
            vec![1.0; dimension],
        )?)
    }

    pub fn obstacles(&self) -> &[Sphere] {
        &self.obstacles
    }

    pub fn add_obstacle(&mut self, center: Config, radius: f64) -> Result<()> {
        self.si.check_dimension(&center)?;
        if !(radius.is_finite() && radius >= 0.0) {
            return Err(PlanError::invalid("obstacle radius must be finite and >= 0"));
        }
        self.obstacles.push(Sphere { center, radius });
        Ok(())
    }

    /// Register a grasp with footprint inflation `inflation >= 0`.
    pub fn add_grasp(&mut self, grasp: GraspId, inflation: f64) -> Result<()> {
        if self.grasps.contains_key(&grasp) {
            return Err(PlanError::invalid(format!(
                "grasp {grasp:?} is already registered"
            )));
        }
        if !(inflation.is_finite() && inflation >= 0.0) {
            return Err(PlanError::invalid("grasp inflation must be finite and >= 0"));
        }
        self.grasps.insert(grasp, inflation);
        Ok(())
    }

    pub fn remove_grasp(&mut self, grasp: GraspId) -> bool {
        self.grasps.remove(&grasp).is_some()
    }

    pub fn grasps(&self) -> impl Iterator<Item = (GraspId, f64)> + '_ {
        self.grasps.iter().map(|(&g, &r)| (g, r))
    }

    /// Signed distance from `q` (inflated by `inflation`) to the nearest obstacle.
    pub fn clearance(&self, q: &Config, inflation: f64) -> f64 {
        self.obstacles
            .iter()
            .map(|s| c_space_distance(q, &s.center) - s.radius - inflation)
            .fold(f64::INFINITY, f64::min)
    }

    fn in_bounds(&self, q: &Config) -> bool {
        q.iter()
            .zip(self.si.lower.iter().zip(self.si.upper.iter()))
            .all(|(x, (lo, hi))| *x >= *lo && *x <= *hi)
    }

    fn inflation(&self, grasp: GraspId) -> anyhow::Result<f64> {
        self.grasps
            .get(&grasp)
            .copied()
            .ok_or_else(|| anyhow!("could not retrieve grasp with id {}", grasp.0))
    }

    fn cost_with(&self, q: &Config, inflation: f64) -> f64 {
        if !self.in_bounds(q) {
            return f64::INFINITY;
        }
        let c = self.clearance(q, inflation);
        if c <= 0.0 {
            f64::INFINITY
        } else {
            1.0 + self.clearance_weight / c
        }
    }

    /// Random world with a fixed seed.
    pub fn random(params: &RandomWorldParams, seed: u64) -> Result<Self> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut world = Self::unit_box(params.dimension)?;
        for _ in 0..params.obstacles {
            let center = Config::from_iterator(
                params.dimension,
                (0..params.dimension).map(|_| rng.gen::<f64>()),
            );
            let radius = rng.gen_range(params.radius_min..=params.radius_max);
            world.add_obstacle(center, radius)?;
        }
        for g in 0..params.grasps {
            let inflation = rng.gen::<f64>() * params.inflation_max;
            world.add_grasp(GraspId(g as u32), inflation)?;
        }
        Ok(world)
    }
}

impl StateSpace for SphereWorld {
    fn space_information(&self) -> &SpaceInformation {
        &self.si
    }

    fn is_valid(&self, config: &Config) -> anyhow::Result<bool> {
        Ok(self.in_bounds(config) && self.clearance(config, 0.0) > 0.0)
    }

    fn is_valid_for_grasp(&self, config: &Config, grasp: GraspId) -> anyhow::Result<bool> {
        let inflation = self.inflation(grasp)?;
        Ok(self.in_bounds(config) && self.clearance(config, inflation) > 0.0)
    }

    fn cost(&self, config: &Config) -> anyhow::Result<f64> {
        Ok(self.cost_with(config, 0.0))
    }

    fn conditional_cost(&self, config: &Config, grasp: GraspId) -> anyhow::Result<f64> {
        let inflation = self.inflation(grasp)?;
        Ok(self.cost_with(config, inflation))
    }

    fn distance(&self, a: &Config, b: &Config) -> f64 {
        c_space_distance(a, b)
    }
}

/// Parameters of [`SphereWorld::random`] (unit box).
#[derive(Clone, Copy, Debug)]
pub struct RandomWorldParams {
    pub dimension: usize,
    pub obstacles: usize,
    pub radius_min: f64,
    pub radius_max: f64,
    pub grasps: usize,
    pub inflation_max: f64,
}

impl Default for RandomWorldParams {
    fn default() -> Self {
        Self {
            dimension: 2,
            obstacles: 6,
            radius_min: 0.05,
            radius_max: 0.15,
            grasps: 2,
            inflation_max: 0.05,
        }
    }
}

impl RandomWorldParams {
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(PlanError::invalid("dimension must be >= 1"));
        }
        if !(self.radius_min > 0.0 && self.radius_min <= self.radius_max) {
            return Err(PlanError::invalid("need 0 < radius_min <= radius_max"));
        }
        if !(self.inflation_max.is_finite() && self.inflation_max >= 0.0) {
            return Err(PlanError::invalid("inflation_max must be finite and >= 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::cfg;

    #[test]
    fn grasp_inflation_shrinks_free_space() {
        let mut w = SphereWorld::unit_box(2).unwrap();
        w.add_obstacle(cfg(&[0.5, 0.5]), 0.1).unwrap();
        w.add_grasp(GraspId(0), 0.0).unwrap();
        w.add_grasp(GraspId(1), 0.1).unwrap();
        let q = cfg(&[0.65, 0.5]);
        assert!(w.is_valid(&q).unwrap());
        assert!(w.is_valid_for_grasp(&q, GraspId(0)).unwrap());
        assert!(!w.is_valid_for_grasp(&q, GraspId(1)).unwrap());
        assert!(w.conditional_cost(&q, GraspId(1)).unwrap().is_infinite());
        assert_eq!(w.cost(&q).unwrap(), 1.0);
        assert!(w.is_valid_for_grasp(&q, GraspId(7)).is_err());
        assert!(w.add_grasp(GraspId(1), 0.2).is_err());
    }

    #[test]
    fn obstacle_dimension_and_radius_are_checked() {
        let mut w = SphereWorld::unit_box(2).unwrap();
        assert!(matches!(
            w.add_obstacle(cfg(&[0.5, 0.5, 0.5]), 0.1),
            Err(PlanError::DimensionMismatch {
                expected: 2,
                got: 3
            })
        ));
        assert!(w.add_obstacle(cfg(&[0.5, 0.5]), f64::NAN).is_err());
        assert!(w.obstacles().is_empty());
        // a rejected obstacle leaves the world queryable
        assert!(w.is_valid(&cfg(&[0.5, 0.5])).unwrap());
    }

    #[test]
    fn out_of_bounds_is_invalid() {
        let w = SphereWorld::unit_box(2).unwrap();
        assert!(!w.is_valid(&cfg(&[1.2, 0.5])).unwrap());
        assert!(w.cost(&cfg(&[-0.1, 0.5])).unwrap().is_infinite());
    }

    #[test]
    fn clearance_weight_raises_cost_near_obstacles() {
        let mut w = SphereWorld::unit_box(2).unwrap();
        w.add_obstacle(cfg(&[0.0, 0.0]), 0.1).unwrap();
        w.clearance_weight = 0.1;
        let near = w.cost(&cfg(&[0.2, 0.0])).unwrap();
        let far = w.cost(&cfg(&[0.9, 0.9])).unwrap();
        assert!(near > far && far > 1.0);
    }

    #[test]
    fn random_world_is_reproducible() {
        let params = RandomWorldParams::default();
        let a = SphereWorld::random(&params, 11).unwrap();
        let b = SphereWorld::random(&params, 11).unwrap();
        assert_eq!(a.obstacles(), b.obstacles());
        assert_eq!(a.grasps().count(), 2);
        let bad = RandomWorldParams {
            radius_min: 0.3,
            radius_max: 0.1,
            ..params
        };
        assert!(SphereWorld::random(&bad, 0).is_err());
    }
}
