//! Label propagator (C5, §4.5): the six numbered steps, run in order,
//! against the residual graph the max-flow solver (C4) left behind.

use std::collections::VecDeque;

use nullgraph_common::{AnalysisError, AnalysisOptions};
use nullgraph_graph::{Node, NullType, TypeSystem};
use rustc_hash::FxHashSet;

/// Run all six steps of §4.5 against `ts`, mutating every node's
/// `null_type` in place. Returns `Err(AnalysisError::InvariantViolation)`
/// if step 6's consistency check fails — a builder bug, never a property
/// of the input program.
pub fn run(ts: &TypeSystem, options: &AnalysisOptions) -> Result<(), AnalysisError> {
    reset_sinks(ts);
    non_null_phase(ts);
    nullable_phase(ts);
    parameter_tie_break(ts, options);
    final_sweep(ts);
    consistency_check(ts)
}

/// Step 1: both sinks go back to `Infer` so the two reachability phases
/// below can relabel them from scratch — they're ordinary nodes from the
/// propagator's point of view, just ones every path starts or ends at.
fn reset_sinks(ts: &TypeSystem) {
    ts.set_null_type(ts.nullable_sink(), NullType::Infer);
    ts.set_null_type(ts.non_null_sink(), NullType::Infer);
}

/// Step 2: nodes that can reach `NonNullSink` without crossing the min-cut
/// must be non-null. Saturated edges (residual capacity 0) are the min-cut
/// frontier and are skipped, per §4.4's rationale.
fn non_null_phase(ts: &TypeSystem) {
    bfs_label(ts, ts.non_null_sink(), NullType::NonNull, |ts, edge_id| {
        ts.edge(edge_id).capacity > 0
    });
}

/// Step 3: everything `NullableSink` can still reach, regardless of
/// saturation, is nullable — unless step 2 already claimed it. Unlike step
/// 2, this walks forward along outgoing edges: `NullableSink` is the
/// source of the wiring that matters here (null literals, explicit `T?`,
/// conditional-access results), not their target.
fn nullable_phase(ts: &TypeSystem) {
    bfs_label_forward(ts, ts.nullable_sink(), NullType::Nullable, |_, _| true);
}

/// Walk backward from `start` along incoming edges passing `admit`,
/// labelling every still-`Infer` node visited. Traversal continues through
/// already-labelled nodes (they may still have unlabelled predecessors);
/// only the label write itself is guarded by "previously unlabelled".
fn bfs_label(ts: &TypeSystem, start: Node, label: NullType, admit: impl Fn(&TypeSystem, nullgraph_graph::EdgeId) -> bool) {
    let mut visited = FxHashSet::default();
    visited.insert(start);
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        if matches!(ts.null_type(node), NullType::Infer) {
            ts.set_null_type(node, label);
        }
        for edge_id in ts.edges_in(node) {
            if !admit(ts, edge_id) {
                continue;
            }
            let source = ts.edge(edge_id).source;
            if visited.insert(source) {
                queue.push_back(source);
            }
        }
    }
}

/// Mirror of [`bfs_label`] walking forward along outgoing edges instead —
/// `start`'s successors rather than its predecessors.
fn bfs_label_forward(ts: &TypeSystem, start: Node, label: NullType, admit: impl Fn(&TypeSystem, nullgraph_graph::EdgeId) -> bool) {
    let mut visited = FxHashSet::default();
    visited.insert(start);
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        if matches!(ts.null_type(node), NullType::Infer) {
            ts.set_null_type(node, label);
        }
        for edge_id in ts.edges_out(node) {
            if !admit(ts, edge_id) {
                continue;
            }
            let target = ts.edge(edge_id).target;
            if visited.insert(target) {
                queue.push_back(target);
            }
        }
    }
}

/// Step 4: a still-undecided input position (parameter or other
/// caller-controlled node) defaults nullable rather than falling through
/// to the final sweep's non-null default — permissive APIs over strict
/// ones, per §9's calibration note. The bidirectional `unify()` edges
/// already keep an equivalence class's labels consistent through the two
/// reachability phases above; this only needs to touch the node itself.
fn parameter_tie_break(ts: &TypeSystem, options: &AnalysisOptions) {
    if !options.parameter_bias_nullable {
        return;
    }
    for node in ts.nodes_in_input_positions() {
        if matches!(ts.null_type(node), NullType::Infer) {
            ts.set_null_type(node, NullType::Nullable);
        }
    }
}

/// Step 5: anything still undecided copies its union-find representative's
/// label if one exists, otherwise defaults non-null.
fn final_sweep(ts: &TypeSystem) {
    for node in ts.all_nodes() {
        if !matches!(ts.null_type(node), NullType::Infer) {
            continue;
        }
        let representative = ts.replaced_with(node);
        let representative_label = ts.null_type(representative);
        let resolved = if matches!(representative_label, NullType::Infer) {
            NullType::NonNull
        } else {
            representative_label
        };
        ts.set_null_type(node, resolved);
    }
}

/// Step 6: every node must agree with its equivalence class's
/// representative, and nothing may remain `Infer`.
fn consistency_check(ts: &TypeSystem) -> Result<(), AnalysisError> {
    for node in ts.all_nodes() {
        let label = ts.null_type(node);
        if matches!(label, NullType::Infer) {
            return Err(AnalysisError::InvariantViolation {
                node: ts.name(node),
                detail: "node left Infer after label propagation".to_string(),
            });
        }
        let representative = ts.replaced_with(node);
        let representative_label = ts.null_type(representative);
        if label != representative_label {
            return Err(AnalysisError::InvariantViolation {
                node: ts.name(node),
                detail: format!(
                    "label {label:?} disagrees with equivalence-class representative's {representative_label:?}"
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nullgraph_graph::INFINITE_CAPACITY;

    #[test]
    fn isolated_node_defaults_non_null() {
        let ts = TypeSystem::new();
        let node = ts.new_node(None, "lonely");
        run(&ts, &AnalysisOptions::default()).unwrap();
        assert_eq!(ts.null_type(node), NullType::NonNull);
    }

    #[test]
    fn node_reachable_only_from_nullable_sink_is_nullable() {
        let ts = TypeSystem::new();
        let node = ts.new_node(None, "lit");
        ts.add_edge(ts.nullable_sink(), node, INFINITE_CAPACITY, "explicit T?");
        run(&ts, &AnalysisOptions::default()).unwrap();
        assert_eq!(ts.null_type(node), NullType::Nullable);
    }

    /// An unconditional dereference with nothing on the nullable side: the
    /// deref edge to `NonNullSink` never gets saturated (there's no flow
    /// to push through it), so phase 2 reaches `param` directly — the
    /// same mechanism that forces scenario 5's unchecked-dereference
    /// parameter non-null.
    #[test]
    fn unconditional_dereference_forces_non_null() {
        let ts = TypeSystem::new();
        let param = ts.new_node(None, "s");
        ts.add_error_edge(param, ts.non_null_sink(), 1, "dereference");

        crate::maxflow::run(&ts, &AnalysisOptions::default(), &nullgraph_common::CancellationToken::new()).unwrap();
        run(&ts, &AnalysisOptions::default()).unwrap();

        assert_eq!(ts.null_type(param), NullType::NonNull);
    }

    #[test]
    fn unparameterised_input_position_defaults_nullable() {
        let ts = TypeSystem::new();
        let mut builder = nullgraph_graph::Builder::new();
        let local = builder.new_input_position_node(None, "p", false);
        let flushed = ts.flush(builder);
        let param = flushed.get(local);

        run(&ts, &AnalysisOptions::default()).unwrap();
        assert_eq!(ts.null_type(param), NullType::Nullable);
    }

    #[test]
    fn disabling_parameter_bias_falls_through_to_non_null() {
        let ts = TypeSystem::new();
        let mut builder = nullgraph_graph::Builder::new();
        let local = builder.new_input_position_node(None, "p", false);
        let flushed = ts.flush(builder);
        let param = flushed.get(local);

        let options = AnalysisOptions { parameter_bias_nullable: false, ..AnalysisOptions::default() };
        run(&ts, &options).unwrap();
        assert_eq!(ts.null_type(param), NullType::NonNull);
    }

    #[test]
    fn unify_keeps_both_members_consistent() {
        let ts = TypeSystem::new();
        let a = ts.new_node(None, "a");
        let b = ts.new_node(None, "b");
        ts.unify(a, b);
        ts.add_edge(ts.nullable_sink(), a, INFINITE_CAPACITY, "explicit T?");

        run(&ts, &AnalysisOptions::default()).unwrap();
        assert_eq!(ts.null_type(a), ts.null_type(b));
        assert_eq!(ts.null_type(a), NullType::Nullable);
    }
}
