//! Max-flow solver (C4, §4.4): shortest-augmenting-path (Edmonds–Karp) from
//! `NullableSink` to `NonNullSink`, chosen over an arbitrary augmenting-path
//! algorithm for determinism on the same input (§8's determinism property).
//!
//! The residual graph isn't materialised separately — [`NullabilityEdge`]
//! already stores its own residual `capacity` in place, so a node's
//! residual forward neighbours are `edges_out`, and its residual backward
//! neighbours are `edges_in` wherever flow has been pushed (`flow() > 0`).

use std::collections::VecDeque;

use nullgraph_common::{AnalysisError, AnalysisOptions, CancellationToken};
use nullgraph_graph::{EdgeId, Node, TypeSystem};
use rustc_hash::FxHashMap;

/// How a node was reached during one augmenting-path search: along an
/// edge's own direction (residual capacity still open) or against it
/// (undoing flow previously pushed the other way).
#[derive(Copy, Clone)]
enum Step {
    Forward(EdgeId),
    Backward(EdgeId),
}

/// Diagnostics about the completed max-flow computation, logged by the
/// driver and useful in tests asserting the solver actually ran.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxFlowStats {
    pub augmenting_paths: usize,
    pub total_flow: u64,
}

/// Run Edmonds–Karp from `ts.nullable_sink()` to `ts.non_null_sink()`,
/// overwriting every touched edge's `capacity` with its residual value.
pub fn run(ts: &TypeSystem, options: &AnalysisOptions, cancellation: &CancellationToken) -> Result<MaxFlowStats, AnalysisError> {
    let source = ts.nullable_sink();
    let sink = ts.non_null_sink();
    let limit = options
        .max_augmenting_paths
        .unwrap_or(nullgraph_common::limits::DEFAULT_MAX_AUGMENTING_PATHS);

    let mut stats = MaxFlowStats::default();

    while stats.augmenting_paths < limit {
        if cancellation.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let Some((path, bottleneck)) = shortest_augmenting_path(ts, source, sink) else {
            break;
        };

        for step in &path {
            match *step {
                Step::Forward(edge) => {
                    let residual = ts.edge(edge).capacity;
                    ts.set_edge_capacity(edge, residual - bottleneck);
                }
                Step::Backward(edge) => {
                    let residual = ts.edge(edge).capacity;
                    ts.set_edge_capacity(edge, residual + bottleneck);
                }
            }
        }

        stats.augmenting_paths += 1;
        stats.total_flow += bottleneck as u64;
    }

    tracing::debug!(
        paths = stats.augmenting_paths,
        flow = stats.total_flow,
        "max-flow solver converged"
    );
    Ok(stats)
}

/// Breadth-first search over the residual graph; BFS guarantees the
/// shortest (fewest-edges) augmenting path, which is what makes this
/// Edmonds–Karp rather than plain Ford–Fulkerson.
fn shortest_augmenting_path(ts: &TypeSystem, source: Node, sink: Node) -> Option<(Vec<Step>, u32)> {
    let mut parent: FxHashMap<Node, (Node, Step)> = FxHashMap::default();
    let mut visited = rustc_hash::FxHashSet::default();
    visited.insert(source);
    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(node) = queue.pop_front() {
        if node == sink {
            break;
        }
        for edge_id in ts.edges_out(node) {
            let edge = ts.edge(edge_id);
            if edge.capacity > 0 && visited.insert(edge.target) {
                parent.insert(edge.target, (node, Step::Forward(edge_id)));
                queue.push_back(edge.target);
            }
        }
        for edge_id in ts.edges_in(node) {
            let edge = ts.edge(edge_id);
            if edge.flow() > 0 && visited.insert(edge.source) {
                parent.insert(edge.source, (node, Step::Backward(edge_id)));
                queue.push_back(edge.source);
            }
        }
    }

    if !visited.contains(&sink) {
        return None;
    }

    let mut path = Vec::new();
    let mut current = sink;
    while current != source {
        let (prev, step) = parent[&current];
        path.push(step);
        current = prev;
    }
    path.reverse();

    let bottleneck = path
        .iter()
        .map(|step| match *step {
            Step::Forward(edge) => ts.edge(edge).capacity,
            Step::Backward(edge) => ts.edge(edge).flow(),
        })
        .min()
        .expect("a path from source to sink has at least one edge");

    Some((path, bottleneck))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_a_single_finite_edge_on_the_only_path() {
        let ts = TypeSystem::new();
        let mid = ts.new_node(None, "mid");
        ts.add_edge(ts.nullable_sink(), mid, 3, "in");
        ts.add_edge(mid, ts.non_null_sink(), 1, "out");

        let stats = run(&ts, &AnalysisOptions::default(), &CancellationToken::new()).unwrap();
        assert_eq!(stats.total_flow, 1);

        let out_edge = ts.edges_out(mid)[0];
        assert!(ts.edge(out_edge).is_saturated());
    }

    #[test]
    fn finds_flow_across_two_parallel_paths() {
        let ts = TypeSystem::new();
        let a = ts.new_node(None, "a");
        let b = ts.new_node(None, "b");
        ts.add_edge(ts.nullable_sink(), a, 1, "a-in");
        ts.add_edge(a, ts.non_null_sink(), 1, "a-out");
        ts.add_edge(ts.nullable_sink(), b, 1, "b-in");
        ts.add_edge(b, ts.non_null_sink(), 1, "b-out");

        let stats = run(&ts, &AnalysisOptions::default(), &CancellationToken::new()).unwrap();
        assert_eq!(stats.total_flow, 2);
        assert_eq!(stats.augmenting_paths, 2);
    }

    #[test]
    fn respects_cancellation() {
        let ts = TypeSystem::new();
        let mid = ts.new_node(None, "mid");
        ts.add_edge(ts.nullable_sink(), mid, 3, "in");
        ts.add_edge(mid, ts.non_null_sink(), 1, "out");

        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let result = run(&ts, &AnalysisOptions::default(), &cancellation);
        assert!(matches!(result, Err(AnalysisError::Cancelled)));
    }
}
