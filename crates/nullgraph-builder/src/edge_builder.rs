//! Second pass (C3): flow-constraint edges encoding assignment, return,
//! parameter passing, generic substitution, and inheritance (§4.3's rule
//! table). One function per row, dispatched from [`build_translation_unit`]
//! — the same per-construct dispatch shape the node builder and the
//! teacher's own checker use for their rule tables.
//!
//! No nodes are created here (the data-model lifecycle binds node creation
//! to C2); every [`Ref`] this pass emits is [`Ref::Global`], resolved
//! through the syntax->node mapping C2 published or through
//! [`TypeSystem::symbol_type`].

use nullgraph_graph::{Builder, Node, SyntaxToNodeMapping, TypeSystem, TypeWithNode, INFINITE_CAPACITY};
use nullgraph_model::{FlowState, SemanticModel, Syntax, SyntaxId, SymbolId, TranslationUnit};
use rustc_hash::FxHashMap;

use crate::node_builder::GenericPositionKey;

struct Context<'a> {
    tu: &'a TranslationUnit,
    model: &'a dyn SemanticModel,
    ts: &'a TypeSystem,
    mapping: &'a SyntaxToNodeMapping,
    generic_positions: &'a FxHashMap<GenericPositionKey, Vec<Node>>,
    builder: Builder,
}

impl<'a> Context<'a> {
    /// Resolve an expression to the node carrying its value. An
    /// `Identifier` has no node of its own (§4.2 leaves it a no-op during
    /// C2) — its value is whatever its referenced symbol resolves to.
    /// Everything else (literals, call results, conditional-access and
    /// null-coalescing results) was minted a node directly during C2 and
    /// is looked up from the syntax->node mapping.
    fn node_for(&self, id: SyntaxId) -> Node {
        if let Syntax::Identifier { symbol } = *self.tu.get(id) {
            return self.symbol_node(symbol);
        }
        self.mapping.get(&id).copied().unwrap_or_else(|| {
            tracing::warn!(syntax = id.0, "expression has no node from the builder pass");
            self.ts.new_oblivious()
        })
    }

    /// A symbol's memoised node. Falls back to `Oblivious` (and warns) if
    /// C2 never reached this symbol — a builder bug, tolerated here rather
    /// than panicking, per the semantic-model-failure handling in §7.
    fn symbol_node(&self, symbol: SymbolId) -> Node {
        self.ts
            .symbol_type(symbol, |ts| {
                tracing::warn!(symbol = symbol.0, "symbol has no node from the builder pass");
                TypeWithNode::leaf(ts.new_oblivious())
            })
            .node
    }

    fn visit_top_level(&mut self) {
        let top_level = self.tu.top_level.clone();
        for id in top_level {
            self.visit_declaration(id);
        }
    }

    fn visit_declaration(&mut self, id: SyntaxId) {
        match self.tu.get(id).clone() {
            Syntax::Class { members, .. } => {
                for member in &members {
                    self.visit_declaration(*member);
                }
            }
            Syntax::Method { symbol, overrides, body, .. } => {
                for &base in &overrides {
                    self.rule_override(id, base);
                }
                self.visit_statements(symbol, &body);
            }
            Syntax::Field { initializer: Some(init), symbol, .. } => {
                self.visit_expr(init);
                let field_node = self.symbol_node(symbol);
                let value_node = self.node_for(init);
                self.builder.add_edge(value_node, field_node, 1, format!("field#{} initializer", id.0));
            }
            _ => {}
        }
    }

    fn visit_statements(&mut self, owning_method: SymbolId, body: &[SyntaxId]) {
        for &stmt in body {
            self.visit_statement(owning_method, stmt);
        }
    }

    fn visit_statement(&mut self, owning_method: SymbolId, id: SyntaxId) {
        match self.tu.get(id).clone() {
            Syntax::Local { symbol, initializer: Some(init), .. } => {
                self.visit_expr(init);
                let local_node = self.symbol_node(symbol);
                let value_node = self.node_for(init);
                self.builder.add_edge(value_node, local_node, 1, format!("local#{} initializer", id.0));
            }
            Syntax::Local { .. } => {}
            Syntax::Assignment { target, value } => {
                self.visit_expr(value);
                self.visit_expr(target);
                let target_node = self.node_for(target);
                let value_node = self.node_for(value);
                self.builder.add_edge(value_node, target_node, 1, format!("assignment#{}", id.0));
            }
            Syntax::Return { value: Some(value), .. } => {
                self.visit_expr(value);
                self.rule_return(owning_method, value);
            }
            Syntax::Return { value: None, .. } => {}
            _ => self.visit_expr(id),
        }
    }

    /// Recurse into an expression, wiring the rules whose source is the
    /// expression *itself* (null literal, call, conditional access,
    /// null-coalescing) rather than its use site.
    fn visit_expr(&mut self, id: SyntaxId) {
        match self.tu.get(id).clone() {
            Syntax::NullLiteral => self.rule_null_literal(id),
            Syntax::Call { callee_method, args } => {
                for &arg in &args {
                    self.visit_expr(arg);
                }
                self.rule_call(id, callee_method, &args);
            }
            Syntax::ConditionalAccess { target, member: _ } => {
                self.visit_expr(target);
                self.rule_conditional_access(id);
            }
            Syntax::NullCoalescing { left, right } => {
                self.visit_expr(left);
                self.visit_expr(right);
                self.rule_null_coalescing(id, left, right);
            }
            Syntax::MemberAccess { target } => {
                self.visit_expr(target);
                self.rule_dereference(target);
            }
            Syntax::NewInstance { class, type_arguments } => {
                for &arg in &type_arguments {
                    self.visit_expr(arg);
                }
                self.rule_generic_substitution(class, &type_arguments);
            }
            Syntax::Identifier { .. } => {}
            _ => {}
        }
    }

    /// "Null literal | `NullableSink` -> `literal.node`".
    fn rule_null_literal(&mut self, id: SyntaxId) {
        let node = self.node_for(id);
        self.builder.add_edge(self.ts.nullable_sink(), node, INFINITE_CAPACITY, "null literal");
    }

    /// "Return `e` from method `M` | `e.node` -> `M.return_type.node`".
    fn rule_return(&mut self, owning_method: SymbolId, value: SyntaxId) {
        let return_node = self.symbol_node(owning_method);
        let value_node = self.node_for(value);
        self.builder.add_edge(value_node, return_node, 1, "return");
    }

    /// "Method call, argument `a` to parameter `p`" and "Method call
    /// return" — both rows share the same call site.
    fn rule_call(&mut self, call_id: SyntaxId, callee_method: SyntaxId, args: &[SyntaxId]) {
        let Syntax::Method { symbol: callee_symbol, params, .. } = self.tu.get(callee_method).clone() else {
            return;
        };
        for (&arg, &param) in args.iter().zip(params.iter()) {
            let Syntax::Param { symbol: param_symbol, .. } = *self.tu.get(param) else {
                continue;
            };
            let arg_node = self.node_for(arg);
            let param_node = self.symbol_node(param_symbol);
            self.builder.add_edge(arg_node, param_node, 1, format!("argument at call#{}", call_id.0));
        }
        let return_node = self.symbol_node(callee_symbol);
        let call_node = self.node_for(call_id);
        self.builder.add_edge(return_node, call_node, 1, format!("call#{} return", call_id.0));
    }

    /// "Non-null dereference | `expr.node` -> `NonNullSink`, capacity 1,
    /// `is_error` sensitive" with the flow-analysis-hint row folded in:
    /// a host-reported definite non-null fact downgrades the edge to
    /// capacity 0 ("already protected") instead of an error edge.
    fn rule_dereference(&mut self, target: SyntaxId) {
        let target_node = self.node_for(target);
        match self.model.flow_state_before(target) {
            FlowState::DefinitelyNotNull => {
                self.builder.add_edge(target_node, self.ts.non_null_sink(), 0, "dereference (already protected)");
            }
            FlowState::MaybeNull | FlowState::Unknown => {
                self.builder.add_error_edge(target_node, self.ts.non_null_sink(), 1, "dereference");
            }
        }
    }

    /// "Explicit `T?`/conditional access | `NullableSink` -> `result.node`,
    /// infinite capacity" (the access short-circuits to null).
    fn rule_conditional_access(&mut self, id: SyntaxId) {
        let node = self.node_for(id);
        self.builder.add_edge(self.ts.nullable_sink(), node, INFINITE_CAPACITY, "conditional access result");
    }

    /// "Null-coalescing `a ?? b` | `b.node` -> `result.node`".
    ///
    /// `a` contributes nothing: the operator itself is what protects
    /// against `a`'s nullability, so `result` can only be null if `b` is
    /// — wiring `a.node -> result.node` as well (even capacity-gated on a
    /// flow-analysis hint) would let the nullable phase's unconditional
    /// forward traversal (§4.5 step 3 visits every edge "regardless of
    /// residual capacity") leak `a`'s nullability into `result` whenever
    /// `a` isn't already known non-null at this point, wrongly labelling
    /// e.g. `x ?? ""` nullable instead of the non-null it must be.
    fn rule_null_coalescing(&mut self, id: SyntaxId, _left: SyntaxId, right: SyntaxId) {
        let result = self.node_for(id);
        let right_node = self.node_for(right);
        self.builder.add_edge(right_node, result, 1, "null-coalescing right");
    }

    /// "Override / interface implementation | for each overridden
    /// parameter: contravariant unification of parameter nodes; for
    /// return: covariant unification." Both directions collapse to plain
    /// `unify()` since nothing here tracks variance beyond equivalence —
    /// per the resolved open question, override unification always
    /// unifies, even when it would force a stricter derived parameter back
    /// to nullable.
    fn rule_override(&mut self, derived: SyntaxId, base: SyntaxId) {
        let (Syntax::Method { symbol: derived_symbol, params: derived_params, .. }, Syntax::Method { symbol: base_symbol, params: base_params, .. }) =
            (self.tu.get(derived).clone(), self.tu.get(base).clone())
        else {
            return;
        };

        self.builder.unify(self.symbol_node(derived_symbol), self.symbol_node(base_symbol));

        for (&derived_param, &base_param) in derived_params.iter().zip(base_params.iter()) {
            let (Syntax::Param { symbol: derived_symbol, .. }, Syntax::Param { symbol: base_symbol, .. }) =
                (self.tu.get(derived_param).clone(), self.tu.get(base_param).clone())
            else {
                continue;
            };
            self.builder.unify(self.symbol_node(derived_symbol), self.symbol_node(base_symbol));
        }
    }

    /// "Generic substitution `C<A>` where `C<T>` has a field of type `T` |
    /// substitute `A`'s `TypeWithNode` into `T`'s position" — implemented
    /// as invariant unification between each type argument's node and
    /// every bare occurrence of the matching type parameter the node
    /// builder recorded for this class.
    fn rule_generic_substitution(&mut self, class: SyntaxId, type_arguments: &[SyntaxId]) {
        let Syntax::Class { symbol: class_symbol, type_params, .. } = self.tu.get(class).clone() else {
            return;
        };
        for (&type_param, &type_arg) in type_params.iter().zip(type_arguments.iter()) {
            let arg_node = self.node_for(type_arg);
            if let Some(positions) = self.generic_positions.get(&(class_symbol, type_param)) {
                for &position_node in positions {
                    self.builder.unify(arg_node, position_node);
                }
            }
        }
    }
}

/// Walk one translation unit, emitting every flow-constraint edge the §4.3
/// rule table describes, using the node mapping and generic-substitution
/// table C2 produced (possibly merged across every TU, since a class and
/// its instantiation site may live in different units).
pub fn build_translation_unit(
    ts: &TypeSystem,
    tu: &TranslationUnit,
    mapping: &SyntaxToNodeMapping,
    generic_positions: &FxHashMap<GenericPositionKey, Vec<Node>>,
) {
    let mut cx = Context { tu, model: tu.semantic_model.as_ref(), ts, mapping, generic_positions, builder: Builder::new() };
    cx.visit_top_level();
    ts.flush(cx.builder);
}
