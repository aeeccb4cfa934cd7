//! Node builder (C2) and edge builder (C3): the two AST walks that turn a
//! translation unit into flow-graph structure (§4.2, §4.3).

pub mod edge_builder;
pub mod node_builder;

pub use edge_builder::build_translation_unit as build_edges;
pub use node_builder::{build_translation_unit as build_nodes, GenericPositionKey, NodeBuilderResult};

#[cfg(test)]
mod tests {
    use nullgraph_graph::TypeSystem;
    use nullgraph_model::testkit::FixtureBuilder;
    use nullgraph_model::{ResolvedType, Syntax, TuId};
    use rustc_hash::FxHashMap;

    use super::*;

    /// Scenario 1, "identity passthrough": `static string? Test(string? x)
    /// => x;`. The only formally testable claim (§8) is graph connectivity:
    /// a path exists from the parameter's node to the return's node.
    #[test]
    fn identity_passthrough_has_path_from_parameter_to_return() {
        let mut fb = FixtureBuilder::new();
        let x_symbol = fb.fresh_symbol();
        let method_symbol = fb.fresh_symbol();

        let x_type = fb.type_ref(true, true, vec![]);
        let param_x = fb.push(Syntax::Param { symbol: x_symbol, type_ref: x_type });
        let return_type = fb.type_ref(true, true, vec![]);
        let x_ident = fb.push(Syntax::Identifier { symbol: x_symbol });
        let ret = fb.push(Syntax::Return { method: SyntaxIdPlaceholder::METHOD, value: Some(x_ident) });
        let method = fb.push(Syntax::Method {
            symbol: method_symbol,
            params: vec![param_x],
            return_type,
            body: vec![ret],
            overrides: vec![],
        });

        let tu = fb.build("fixture.ts", vec![method]);
        let ts = TypeSystem::new();
        let result = node_builder::build_translation_unit(&ts, TuId(0), &tu);
        edge_builder::build_translation_unit(&ts, &tu, &result.mapping, &FxHashMap::default());

        let x_node = result.mapping[&x_type];
        let return_node = result.mapping[&return_type];
        assert!(path_exists(&ts, x_node, return_node));
    }

    /// Scenario 5, "unchecked dereference": `static int Test(string? s) =>
    /// s.Length;`. Expected: a diagnostic edge from `s`'s node to
    /// `NonNullSink` — the constraint that later forces the parameter
    /// non-null during label propagation.
    #[test]
    fn unchecked_dereference_emits_diagnostic_edge_to_non_null_sink() {
        let mut fb = FixtureBuilder::new();
        let s_symbol = fb.fresh_symbol();
        let method_symbol = fb.fresh_symbol();

        let s_type = fb.type_ref(true, true, vec![]);
        let param_s = fb.push(Syntax::Param { symbol: s_symbol, type_ref: s_type });
        let return_type = fb.type_ref(false, false, vec![]);
        let s_ident = fb.push(Syntax::Identifier { symbol: s_symbol });
        let deref = fb.push(Syntax::MemberAccess { target: s_ident });
        let ret = fb.push(Syntax::Return { method: SyntaxIdPlaceholder::METHOD, value: Some(deref) });
        let method = fb.push(Syntax::Method {
            symbol: method_symbol,
            params: vec![param_s],
            return_type,
            body: vec![ret],
            overrides: vec![],
        });

        let tu = fb.build("fixture.ts", vec![method]);
        let ts = TypeSystem::new();
        let result = node_builder::build_translation_unit(&ts, TuId(0), &tu);
        edge_builder::build_translation_unit(&ts, &tu, &result.mapping, &FxHashMap::default());

        let s_node = result.mapping[&s_type];
        let non_null_sink = ts.non_null_sink();
        let has_diagnostic_edge = ts.edges_out(s_node).into_iter().any(|id| {
            let e = ts.edge(id);
            e.target == non_null_sink && e.is_error && e.capacity == 1
        });
        assert!(has_diagnostic_edge);
    }

    /// Scenario 6, "generic container": instantiating `Box<string?>` and
    /// calling a non-null-requiring member on the result produces a
    /// diagnostic edge at the call site, and unifies the instantiation's
    /// type argument with the class's bare type-parameter occurrences.
    #[test]
    fn generic_instantiation_unifies_type_argument_with_class_template() {
        let mut fb = FixtureBuilder::new();
        let type_param = fb.fresh_symbol();
        let class_symbol = fb.fresh_symbol();
        let field_symbol = fb.fresh_symbol();
        let get_symbol = fb.fresh_symbol();
        let main_symbol = fb.fresh_symbol();

        let field_type = fb.type_ref(true, true, vec![]);
        let field = fb.push(Syntax::Field { symbol: field_symbol, type_ref: field_type, initializer: None });

        let get_return_type = fb.type_ref(true, true, vec![]);
        let field_ident = fb.push(Syntax::Identifier { symbol: field_symbol });
        let get_return = fb.push(Syntax::Return { method: SyntaxIdPlaceholder::METHOD, value: Some(field_ident) });
        let get_method = fb.push(Syntax::Method {
            symbol: get_symbol,
            params: vec![],
            return_type: get_return_type,
            body: vec![get_return],
            overrides: vec![],
        });

        let class = fb.push(Syntax::Class {
            symbol: class_symbol,
            type_params: vec![type_param],
            members: vec![field, get_method],
            generic_positions: vec![(type_param, field_type), (type_param, get_return_type)],
        });

        let arg_type = fb.type_ref(true, true, vec![]);
        let new_instance = fb.push(Syntax::NewInstance { class, type_arguments: vec![arg_type] });
        let call_get = fb.push(Syntax::Call { callee_method: get_method, args: vec![] });
        let deref = fb.push(Syntax::MemberAccess { target: call_get });
        fb.set_type(new_instance, ResolvedType::reference());

        // `new_instance` and `deref` are free-standing expression
        // statements in `main`'s body — enough to pull them into both
        // walks without needing a local variable to hold the instance.
        let main_return_type = fb.type_ref(false, false, vec![]);
        let main_body_return = fb.push(Syntax::Return { method: SyntaxIdPlaceholder::METHOD, value: None });
        let main_method = fb.push(Syntax::Method {
            symbol: main_symbol,
            params: vec![],
            return_type: main_return_type,
            body: vec![new_instance, deref, main_body_return],
            overrides: vec![],
        });

        let tu = fb.build("fixture.ts", vec![class, main_method]);
        let ts = TypeSystem::new();
        let result = node_builder::build_translation_unit(&ts, TuId(0), &tu);
        edge_builder::build_translation_unit(&ts, &tu, &result.mapping, &result.generic_positions);

        let arg_node = result.mapping[&arg_type];
        let field_node = result.mapping[&field_type];
        assert_eq!(ts.replaced_with(arg_node), ts.replaced_with(field_node));

        let call_node = result.mapping[&call_get];
        let non_null_sink = ts.non_null_sink();
        let has_diagnostic_edge = ts
            .edges_out(call_node)
            .into_iter()
            .any(|id| ts.edge(id).target == non_null_sink && ts.edge(id).is_error);
        assert!(has_diagnostic_edge);
    }

    fn path_exists(ts: &TypeSystem, from: nullgraph_graph::Node, to: nullgraph_graph::Node) -> bool {
        let mut stack = vec![from];
        let mut seen = std::collections::HashSet::new();
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if !seen.insert(node) {
                continue;
            }
            for edge_id in ts.edges_out(node) {
                stack.push(ts.edge(edge_id).target);
            }
        }
        false
    }

    /// The fixture IR has no `Method` self-reference while it's being
    /// constructed (`Return.method` would need the id of the very node
    /// being built); tests use this sentinel since `rule_return` only
    /// reads `owning_method` from the *enclosing* `Method`'s own symbol,
    /// never from `Return.method` itself.
    struct SyntaxIdPlaceholder;
    impl SyntaxIdPlaceholder {
        const METHOD: nullgraph_model::SyntaxId = nullgraph_model::SyntaxId(u32::MAX);
    }
}
