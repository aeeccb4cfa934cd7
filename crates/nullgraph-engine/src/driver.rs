//! The driver (C6, §4.6): owns the translation-unit set, runs C2 and C3 in
//! parallel across them, then C4 and C5 sequentially, and reports the
//! result.

use nullgraph_builder::GenericPositionKey;
use nullgraph_common::diagnostics::messages;
use nullgraph_common::{AnalysisError, AnalysisOptions, CancellationToken, Diagnostic};
use nullgraph_flow::MaxFlowStats;
use nullgraph_graph::{Node, TypeSystem};
use nullgraph_model::{SyntaxId, TranslationUnit, TuId};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Everything a completed `analyze()` leaves behind: the populated type
/// system (read-only from here on, per §3's lifecycle note) plus the
/// diagnostics collected along the way.
pub struct AnalysisResult {
    ts: TypeSystem,
    pub diagnostics: Vec<Diagnostic>,
    pub flow_stats: MaxFlowStats,
}

impl AnalysisResult {
    /// Escape hatch for callers that need to inspect the graph directly
    /// (tests, a host's own diagnostics). After `analyze` returns, every
    /// node's `null_type` is final.
    pub fn type_system(&self) -> &TypeSystem {
        &self.ts
    }
}

/// Owns the compilation-unit set for one `analyze` run. Construct fresh
/// per run — §5's cancellation semantics leave a cancelled engine in an
/// unspecified but safe-to-drop state, and retrying means building a new
/// one.
pub struct Engine {
    tus: Vec<TranslationUnit>,
    options: AnalysisOptions,
}

impl Engine {
    pub fn new(tus: Vec<TranslationUnit>, options: AnalysisOptions) -> Self {
        Engine { tus, options }
    }

    /// Runs C2 in parallel, C3 in parallel, then C4 and C5 sequentially.
    pub fn analyze(&self, cancellation: &CancellationToken) -> Result<AnalysisResult, AnalysisError> {
        let ts = TypeSystem::new();

        let node_results = {
            let _span = tracing::info_span!("analyze.build_nodes").entered();
            self.tus
                .par_iter()
                .enumerate()
                .map(|(i, tu)| {
                    if cancellation.is_cancelled() {
                        return Err(AnalysisError::Cancelled);
                    }
                    Ok(nullgraph_builder::build_nodes(&ts, TuId(i as u32), tu))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut generic_positions: FxHashMap<GenericPositionKey, Vec<Node>> = FxHashMap::default();
        for result in &node_results {
            for (&key, nodes) in &result.generic_positions {
                generic_positions.entry(key).or_default().extend(nodes.iter().copied());
            }
        }

        {
            let _span = tracing::info_span!("analyze.build_edges").entered();
            self.tus
                .par_iter()
                .zip(node_results.par_iter())
                .try_for_each(|(tu, result)| {
                    if cancellation.is_cancelled() {
                        return Err(AnalysisError::Cancelled);
                    }
                    nullgraph_builder::build_edges(&ts, tu, &result.mapping, &generic_positions);
                    Ok(())
                })?;
        }

        if cancellation.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let flow_stats = {
            let _span = tracing::info_span!("analyze.max_flow").entered();
            nullgraph_flow::run_max_flow(&ts, &self.options, cancellation)?
        };

        {
            let _span = tracing::info_span!("analyze.propagate").entered();
            nullgraph_flow::propagate_labels(&ts, &self.options)?;
        }

        let diagnostics = collect_diagnostics(&ts);
        Ok(AnalysisResult { ts, diagnostics, flow_stats })
    }

    /// For each translation unit, the final nullable/non-null verdict for
    /// every syntax position C2 minted a node for (`Oblivious` positions
    /// are omitted — they're never annotated). A host's own
    /// `InferredAnnotationRewriter` consumes this to decide where to write
    /// or strip `?`.
    pub fn emit_annotations<'a>(&'a self, result: &'a AnalysisResult) -> impl Iterator<Item = (TuId, Vec<(SyntaxId, bool)>)> + 'a {
        (0..self.tus.len()).filter_map(move |i| {
            let tu_id = TuId(i as u32);
            let mapping = result.ts.mapping(tu_id)?;
            let verdicts = mapping
                .into_iter()
                .filter_map(|(syntax, node)| match result.ts.null_type(node) {
                    nullgraph_graph::NullType::Nullable => Some((syntax, true)),
                    nullgraph_graph::NullType::NonNull => Some((syntax, false)),
                    nullgraph_graph::NullType::Oblivious | nullgraph_graph::NullType::Infer => None,
                })
                .collect();
            Some((tu_id, verdicts))
        })
    }
}

/// §7's diagnostic-edge rule: an `is_error` edge with nonzero residual flow
/// after max-flow is the "nullable value dereferenced" warning a host
/// checker surfaces to the user.
fn collect_diagnostics(ts: &TypeSystem) -> Vec<Diagnostic> {
    ts.all_edges()
        .into_iter()
        .map(|id| ts.edge(id))
        .filter(|edge| edge.is_error && edge.flow() > 0)
        .map(|edge| {
            let name = ts.name(edge.source);
            Diagnostic::new(messages::POSSIBLE_NULL_DEREFERENCE, ts.location(edge.source), &[name.as_str()])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nullgraph_model::testkit::FixtureBuilder;
    use nullgraph_model::Syntax;

    /// Scenario 5's shape, run end to end through the driver: an
    /// unchecked dereference with no nullable source forces the parameter
    /// non-null and raises no diagnostic, because the deref edge never
    /// gets saturated (it had nothing to saturate it against) and phase 2
    /// of the propagator claims the node directly.
    #[test]
    fn unchecked_dereference_is_forced_non_null_through_the_full_pipeline() {
        let mut fb = FixtureBuilder::new();
        let s_symbol = fb.fresh_symbol();
        let method_symbol = fb.fresh_symbol();

        let s_type = fb.type_ref(false, true, vec![]);
        let param_s = fb.push(Syntax::Param { symbol: s_symbol, type_ref: s_type });
        let return_type = fb.type_ref(false, false, vec![]);
        let s_ident = fb.push(Syntax::Identifier { symbol: s_symbol });
        let deref = fb.push(Syntax::MemberAccess { target: s_ident });
        let ret = fb.push(Syntax::Return { method: SyntaxId(u32::MAX), value: Some(deref) });
        let method = fb.push(Syntax::Method {
            symbol: method_symbol,
            params: vec![param_s],
            return_type,
            body: vec![ret],
            overrides: vec![],
        });

        let tu = fb.build("fixture.ts", vec![method]);
        let engine = Engine::new(vec![tu], AnalysisOptions::default());
        let result = engine.analyze(&CancellationToken::new()).unwrap();

        let mapping = result.type_system().mapping(TuId(0)).unwrap();
        let param_node = mapping[&s_type];
        assert_eq!(result.type_system().null_type(param_node), nullgraph_graph::NullType::NonNull);
        assert!(result.diagnostics.is_empty());
    }

    /// Scenario 2's shape: `static string? Test(string? x) => x ?? "";`.
    /// The coalescing operator itself protects against `x`'s nullability,
    /// so the return must come out non-null even though `x` is nullable —
    /// `rule_null_coalescing` wires only the right operand into the
    /// result node for exactly this reason.
    #[test]
    fn guarded_return_with_null_coalescing_forces_non_null_return() {
        let mut fb = FixtureBuilder::new();
        let x_symbol = fb.fresh_symbol();
        let fallback_symbol = fb.fresh_symbol();
        let method_symbol = fb.fresh_symbol();

        let x_type = fb.type_ref(true, true, vec![]);
        let param_x = fb.push(Syntax::Param { symbol: x_symbol, type_ref: x_type });
        let fallback_type = fb.type_ref(false, true, vec![]);
        let fallback_local = fb.push(Syntax::Local { symbol: fallback_symbol, type_ref: fallback_type, initializer: None });
        let return_type = fb.type_ref(false, true, vec![]);

        let x_ident = fb.push(Syntax::Identifier { symbol: x_symbol });
        let fallback_ident = fb.push(Syntax::Identifier { symbol: fallback_symbol });
        let coalesce = fb.push(Syntax::NullCoalescing { left: x_ident, right: fallback_ident });
        let ret = fb.push(Syntax::Return { method: SyntaxId(u32::MAX), value: Some(coalesce) });
        let method = fb.push(Syntax::Method {
            symbol: method_symbol,
            params: vec![param_x],
            return_type,
            body: vec![fallback_local, ret],
            overrides: vec![],
        });

        let tu = fb.build("fixture.ts", vec![method]);
        let engine = Engine::new(vec![tu], AnalysisOptions::default());
        let result = engine.analyze(&CancellationToken::new()).unwrap();

        let mapping = result.type_system().mapping(TuId(0)).unwrap();
        let return_node = mapping[&return_type];
        assert_eq!(result.type_system().null_type(return_node), nullgraph_graph::NullType::NonNull);
    }

    #[test]
    fn cancelled_before_analysis_returns_cancelled_error() {
        let tu = FixtureBuilder::new().build("empty.ts", vec![]);
        let engine = Engine::new(vec![tu], AnalysisOptions::default());
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let result = engine.analyze(&cancellation);
        assert!(matches!(result, Err(AnalysisError::Cancelled)));
    }

    #[test]
    fn program_with_no_reference_types_produces_no_nodes_beyond_sinks() {
        let mut fb = FixtureBuilder::new();
        let symbol = fb.fresh_symbol();
        let return_type = fb.type_ref(false, false, vec![]);
        let ret = fb.push(Syntax::Return { method: SyntaxId(u32::MAX), value: None });
        let method = fb.push(Syntax::Method {
            symbol,
            params: vec![],
            return_type,
            body: vec![ret],
            overrides: vec![],
        });
        let tu = fb.build("fixture.ts", vec![method]);

        let engine = Engine::new(vec![tu], AnalysisOptions::default());
        let result = engine.analyze(&CancellationToken::new()).unwrap();

        // The only node is the shared Oblivious singleton, plus the two
        // sinks — every non-reference position collapses onto it.
        assert_eq!(result.type_system().all_nodes().len(), 3);
    }
}
