//! LazySP on top of LPA*.
//!
//! Search with lazy (lower-bound) costs, evaluate the candidate path, report
//! what changed, repeat. The loop ends when a candidate survives evaluation
//! unchanged, or when the lazy search itself fails.

use tracing::debug;

use super::lpastar::LpaStar;
use super::{EdgeChange, GraphView, SearchResult, VertexId};
use crate::error::Result;

/// Incident edges of `x` in both directions with their current lazy cost.
fn incident_lazy_costs<G: GraphView>(
    graph: &mut G,
    x: VertexId,
) -> Result<Vec<(VertexId, VertexId, f64)>> {
    let mut out = Vec::new();
    for p in graph.predecessors(x, true)? {
        let c = graph.edge_cost(p, x, true)?;
        out.push((p, x, c));
    }
    for s in graph.successors(x, true)? {
        let c = graph.edge_cost(x, s, true)?;
        out.push((x, s, c));
    }
    Ok(out)
}

/// Re-read lazy costs of `snapshot` and report those that moved.
fn changed_since<G: GraphView>(
    graph: &mut G,
    snapshot: &[(VertexId, VertexId, f64)],
    changes: &mut Vec<EdgeChange>,
) -> Result<()> {
    for &(u, v, old_cost) in snapshot {
        if graph.edge_cost(u, v, true)? != old_cost {
            changes.push(EdgeChange { u, v, old_cost });
        }
    }
    Ok(())
}

/// Validate the vertices of `path`, stopping at the first invalid one.
fn evaluate_vertices<G: GraphView>(graph: &mut G, path: &[VertexId]) -> Result<Vec<EdgeChange>> {
    let mut changes = Vec::new();
    for &x in path {
        let snapshot = incident_lazy_costs(graph, x)?;
        if !graph.check_validity(x)? {
            changed_since(graph, &snapshot, &mut changes)?;
            break;
        }
    }
    Ok(changes)
}

/// Evaluate every edge of `path` (both directions are re-read, so undirected
/// graphs report symmetric changes).
fn evaluate_edges<G: GraphView>(graph: &mut G, path: &[VertexId]) -> Result<Vec<EdgeChange>> {
    let mut changes = Vec::new();
    for w in path.windows(2) {
        let (u, v) = (w[0], w[1]);
        let snapshot = [
            (u, v, graph.edge_cost(u, v, true)?),
            (v, u, graph.edge_cost(v, u, true)?),
        ];
        graph.edge_cost(u, v, false)?;
        changed_since(graph, &snapshot, &mut changes)?;
    }
    Ok(changes)
}

/// Lazy search with incremental repair until the returned path is fully
/// evaluated.
pub fn lazy_sp<G: GraphView>(graph: G) -> Result<SearchResult> {
    let mut engine = LpaStar::new(graph, true)?;
    let mut rounds = 0u32;
    loop {
        rounds += 1;
        let result = engine.compute_shortest_path()?;
        if !result.solved {
            debug!(rounds, expansions = engine.expansions(), "lazy_sp: no path");
            return Ok(result);
        }
        let mut changes = evaluate_vertices(engine.graph_mut(), &result.path)?;
        if changes.is_empty() {
            changes = evaluate_edges(engine.graph_mut(), &result.path)?;
        }
        if changes.is_empty() {
            debug!(
                rounds,
                expansions = engine.expansions(),
                cost = result.cost(),
                "lazy_sp: path confirmed"
            );
            return Ok(result);
        }
        engine.update_edges(&changes)?;
    }
}
