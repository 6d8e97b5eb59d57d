//! JSON scenario files: sphere world, grasps, start, goals, planner settings.

use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use mgsearch::prelude::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleSpec>,
    pub grasps: Vec<GraspSpec>,
    #[serde(default)]
    pub clearance_weight: f64,
    pub start: Vec<f64>,
    pub goals: Vec<GoalSpec>,
    #[serde(default)]
    pub planner: PlannerSpec,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub center: Vec<f64>,
    pub radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraspSpec {
    pub id: u32,
    #[serde(default)]
    pub inflation: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub id: u32,
    pub grasp: u32,
    pub config: Vec<f64>,
    #[serde(default)]
    pub quality: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmSpec {
    Lpastar,
    Lazysp,
}

impl From<AlgorithmSpec> for Algorithm {
    fn from(a: AlgorithmSpec) -> Self {
        match a {
            AlgorithmSpec::Lpastar => Algorithm::LpaStar,
            AlgorithmSpec::Lazysp => Algorithm::LazySp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSpec {
    pub algorithm: AlgorithmSpec,
    pub lambda: f64,
    pub batch_size: usize,
    pub step_size: f64,
    /// Extra densification rounds tried while no solution is found.
    pub max_densify_rounds: usize,
}

impl Default for PlannerSpec {
    fn default() -> Self {
        let cfg = PlannerCfg::default();
        Self {
            algorithm: AlgorithmSpec::Lazysp,
            lambda: cfg.lambda,
            batch_size: cfg.roadmap.batch_size,
            step_size: cfg.roadmap.step_size,
            max_densify_rounds: 0,
        }
    }
}

impl PlannerSpec {
    pub fn to_cfg(&self) -> PlannerCfg {
        PlannerCfg {
            algorithm: self.algorithm.into(),
            lambda: self.lambda,
            roadmap: RoadmapCfg {
                batch_size: self.batch_size,
                step_size: self.step_size,
            },
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let scenario: Scenario = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        Ok(scenario)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn world(&self) -> Result<SphereWorld> {
        let si = SpaceInformation::new(self.lower.clone(), self.upper.clone())?;
        let mut world = SphereWorld::new(si)?;
        world.clearance_weight = self.clearance_weight;
        for (i, o) in self.obstacles.iter().enumerate() {
            ensure!(
                o.center.len() == self.dimension(),
                "obstacle {i}: center has {} coordinates, expected {}",
                o.center.len(),
                self.dimension()
            );
            world.add_obstacle(Config::from_column_slice(&o.center), o.radius)?;
        }
        for g in &self.grasps {
            world.add_grasp(GraspId(g.id), g.inflation)?;
        }
        Ok(world)
    }

    pub fn start(&self) -> Config {
        Config::from_column_slice(&self.start)
    }

    pub fn goals(&self) -> impl Iterator<Item = Goal> + '_ {
        self.goals.iter().map(|g| Goal {
            id: GoalId(g.id),
            grasp_id: GraspId(g.grasp),
            config: Config::from_column_slice(&g.config),
            quality: g.quality,
        })
    }

    /// Random sphere world with one goal per grasp on the far side of the box.
    pub fn random(params: &RandomWorldParams, seed: u64) -> Result<Self> {
        let world = SphereWorld::random(params, seed)?;
        let si = world.space_information();
        let d = params.dimension;
        let grasps: Vec<GraspSpec> = world
            .grasps()
            .map(|(g, inflation)| GraspSpec { id: g.0, inflation })
            .collect();
        let n = grasps.len().max(1) as f64;
        let goals = grasps
            .iter()
            .enumerate()
            .map(|(k, g)| {
                let spread = 0.05 + 0.9 * (k as f64 + 1.0) / (n + 1.0);
                let mut config = vec![spread; d];
                config[0] = 0.95;
                GoalSpec {
                    id: k as u32,
                    grasp: g.id,
                    config,
                    quality: (k as f64 + 1.0) / n,
                }
            })
            .collect();
        Ok(Self {
            lower: si.lower.clone(),
            upper: si.upper.clone(),
            obstacles: world
                .obstacles()
                .iter()
                .map(|s| ObstacleSpec {
                    center: s.center.iter().copied().collect(),
                    radius: s.radius,
                })
                .collect(),
            grasps,
            clearance_weight: world.clearance_weight,
            start: vec![0.05; d],
            goals,
            planner: PlannerSpec::default(),
        })
    }
}
