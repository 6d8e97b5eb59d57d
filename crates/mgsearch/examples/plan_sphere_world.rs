//! Two-grasp planning demo on a 2D sphere world.
//!
//! Purpose
//! - Show how the grasp footprint changes the answer: the thin grasp can slip
//!   through a narrow gap, the fat one has to go around.
//! - Compare LPA* and LazySP on the same roadmap size, including how many
//!   nodes each leaves unchecked.
//!
//! Run with `cargo run -p mgsearch --example plan_sphere_world`.

use std::rc::Rc;
use std::time::Instant;

use mgsearch::prelude::*;

fn world() -> SphereWorld {
    let mut w = SphereWorld::unit_box(2).expect("unit box");
    w.add_obstacle(Config::from_column_slice(&[0.5, 0.3]), 0.18)
        .expect("obstacle");
    w.add_obstacle(Config::from_column_slice(&[0.5, 0.72]), 0.18)
        .expect("obstacle");
    w.add_grasp(GraspId(0), 0.0).expect("thin grasp");
    w.add_grasp(GraspId(1), 0.04).expect("fat grasp");
    w
}

fn main() {
    for algorithm in [Algorithm::LpaStar, Algorithm::LazySp] {
        let cfg = PlannerCfg {
            algorithm,
            roadmap: RoadmapCfg {
                batch_size: 600,
                step_size: 0.005,
            },
            ..PlannerCfg::default()
        };
        let start = Config::from_column_slice(&[0.05, 0.5]);
        let mut planner = MgGraphSearch::new(Rc::new(world()), start, cfg).expect("planner");
        for (id, grasp, quality) in [(0, 0, 0.0), (1, 1, 0.5)] {
            planner
                .add_goal(Goal {
                    id: GoalId(id),
                    grasp_id: GraspId(grasp),
                    config: Config::from_column_slice(&[0.95, 0.5]),
                    quality,
                })
                .expect("goal");
        }

        let t0 = Instant::now();
        let solution = planner.plan().expect("plan");
        let ms = t0.elapsed().as_secs_f64() * 1e3;
        let unchecked = planner
            .roadmap()
            .nodes()
            .filter(|n| n.validity.is_none())
            .count();
        match solution {
            Some(s) => println!(
                "algorithm={algorithm} goal={} grasp={} cost={:.4} path_cost={:.4} goal_cost={:.4} waypoints={} time_ms={ms:.2}",
                s.goal_id.0,
                s.grasp.0,
                s.cost,
                s.path_cost,
                s.goal_cost,
                s.path.len()
            ),
            None => println!("algorithm={algorithm} unsolved time_ms={ms:.2}"),
        }
        println!(
            "algorithm={algorithm} nodes={} unchecked={unchecked}",
            planner.roadmap().node_count()
        );
    }
}
