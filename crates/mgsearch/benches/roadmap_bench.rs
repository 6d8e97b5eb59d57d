//! Roadmap benchmarks (Criterion).
//!
//! What
//! - Halton densification of a fresh roadmap at a few batch sizes.
//! - Lazy adjacency updates for every node (nearest-neighbor radius queries).
//! - Eager edge evaluation around the first node (integrated cost).
//!
//! Results live under `target/criterion`.

use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use mgsearch::api::{
    IntegralEdgeCostComputer, NodeId, RandomWorldParams, Roadmap, RoadmapCfg, SphereWorld,
    StateSpace,
};

fn world(dimension: usize) -> Rc<SphereWorld> {
    let params = RandomWorldParams {
        dimension,
        ..RandomWorldParams::default()
    };
    Rc::new(SphereWorld::random(&params, 7).unwrap())
}

fn bench_densify(c: &mut Criterion) {
    let mut group = c.benchmark_group("roadmap_densify");
    for &batch in &[100usize, 500, 2000] {
        group.bench_function(BenchmarkId::new("batch", batch), |b| {
            b.iter_batched(
                || {
                    let cfg = RoadmapCfg {
                        batch_size: batch,
                        ..RoadmapCfg::default()
                    };
                    let space: Rc<dyn StateSpace> = world(3);
                    let cost = IntegralEdgeCostComputer::new(Rc::clone(&space), cfg.step_size);
                    Roadmap::empty(space, Box::new(cost), cfg).unwrap()
                },
                |mut rm| {
                    rm.densify(batch).unwrap();
                    rm
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_adjacency(c: &mut Criterion) {
    let mut group = c.benchmark_group("roadmap_adjacency");
    for &dimension in &[2usize, 4] {
        group.bench_function(BenchmarkId::new("update_all", dimension), |b| {
            b.iter_batched(
                || {
                    let cfg = RoadmapCfg {
                        batch_size: 400,
                        ..RoadmapCfg::default()
                    };
                    Roadmap::with_integral_costs(world(dimension), cfg).unwrap()
                },
                |mut rm| {
                    let ids: Vec<NodeId> = rm.nodes().map(|n| n.id).collect();
                    for id in ids {
                        rm.update_adjacency(id).unwrap();
                    }
                    rm
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_edge_costs(c: &mut Criterion) {
    let mut group = c.benchmark_group("roadmap_edge_costs");
    group.bench_function(BenchmarkId::new("integral", "first_node"), |b| {
        b.iter_batched(
            || {
                let cfg = RoadmapCfg {
                    batch_size: 400,
                    step_size: 0.005,
                };
                let mut rm = Roadmap::with_integral_costs(world(2), cfg).unwrap();
                rm.update_adjacency(NodeId(0)).unwrap();
                rm
            },
            |mut rm| {
                for (_, eid) in rm.adjacency(NodeId(0)).unwrap() {
                    let _ = rm.compute_cost(eid).unwrap();
                }
                rm
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_densify, bench_adjacency, bench_edge_costs);
criterion_main!(benches);
