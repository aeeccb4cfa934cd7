//! First pass (C2): one nullability node per reference-typed syntactic
//! position, memoised `TypeWithNode` per declared symbol.
//!
//! Nodes are accumulated in a [`Builder`] local to this translation unit and
//! flushed into the global arena exactly once, after the whole TU has been
//! walked — this is safe because the driver runs every TU's C2 (including
//! its flush) to completion before any TU starts C3, so a symbol's node is
//! always globally visible by the time another TU's edge builder looks it
//! up through [`TypeSystem::symbol_type`].
//!
//! Per the data-model lifecycle rule ("nodes are created exclusively during
//! C2"), this walk covers not just declared type positions but every
//! expression that produces a value needing its own node: null literals,
//! call-site results, conditional access, and null-coalescing results.
//! Everything else (identifiers, member-access targets) resolves to an
//! already-recorded node instead of minting a new one.

use nullgraph_graph::{Builder, FlushedNodes, Node, Ref, SyntaxToNodeMapping, TypeSystem, TypeWithNode};
use nullgraph_model::{SemanticModel, Syntax, SyntaxId, SymbolId, TranslationUnit, TuId};
use rustc_hash::FxHashMap;

/// A [`TypeWithNode`] built against this TU's local [`Builder`], before its
/// [`Ref`]s have been resolved to real nodes.
struct LocalType {
    node: Ref,
    type_arguments: Vec<LocalType>,
}

impl LocalType {
    fn resolve(&self, flushed: &FlushedNodes) -> TypeWithNode {
        TypeWithNode::generic(
            flushed.resolve(self.node),
            self.type_arguments.iter().map(|t| t.resolve(flushed)).collect(),
        )
    }
}

/// Key for a bare occurrence of a class's own type parameter inside that
/// class's member declarations — the substitution sites the edge builder's
/// generic-substitution rule unifies against at each `NewInstance`. A class
/// may name the same type parameter in more than one member (a field and a
/// method return, say), so every occurrence is kept.
pub type GenericPositionKey = (SymbolId, SymbolId);

struct Context<'a> {
    tu: &'a TranslationUnit,
    model: &'a dyn SemanticModel,
    ts: &'a TypeSystem,
    builder: Builder,
    node_for_syntax: FxHashMap<SyntaxId, Ref>,
    symbol_types: FxHashMap<SymbolId, LocalType>,
    generic_positions: FxHashMap<GenericPositionKey, Vec<Ref>>,
}

impl<'a> Context<'a> {
    fn visit_top_level(&mut self) {
        let top_level = self.tu.top_level.clone();
        for id in top_level {
            self.visit_declaration(id);
        }
    }

    fn visit_declaration(&mut self, id: SyntaxId) {
        match self.tu.get(id).clone() {
            Syntax::Class { symbol, type_params: _, members, generic_positions } => {
                for member in &members {
                    self.visit_declaration(*member);
                }
                for (type_param, type_ref) in &generic_positions {
                    match self.node_for_syntax.get(type_ref) {
                        Some(&node) => self
                            .generic_positions
                            .entry((symbol, *type_param))
                            .or_default()
                            .push(node),
                        None => tracing::warn!(
                            symbol = type_param.0,
                            "generic position names a TypeRef this class's members never declared"
                        ),
                    }
                }
            }
            Syntax::Method { symbol, params, return_type, body, overrides: _ } => {
                for param in &params {
                    self.visit_param(*param);
                }
                let return_ty = self.visit_type_ref(return_type, false);
                self.symbol_types.insert(symbol, return_ty);
                self.visit_statements(&body);
            }
            Syntax::Field { symbol, type_ref, initializer } => {
                let ty = self.visit_type_ref(type_ref, false);
                self.symbol_types.insert(symbol, ty);
                if let Some(init) = initializer {
                    self.visit_expr(init);
                }
            }
            _ => {}
        }
    }

    fn visit_param(&mut self, id: SyntaxId) {
        if let Syntax::Param { symbol, type_ref } = *self.tu.get(id) {
            let ty = self.visit_type_ref(type_ref, true);
            self.symbol_types.insert(symbol, ty);
        }
    }

    fn visit_statements(&mut self, body: &[SyntaxId]) {
        for &stmt in body {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, id: SyntaxId) {
        match self.tu.get(id).clone() {
            Syntax::Local { symbol, type_ref, initializer } => {
                let ty = self.visit_type_ref(type_ref, false);
                self.symbol_types.insert(symbol, ty);
                if let Some(init) = initializer {
                    self.visit_expr(init);
                }
            }
            Syntax::Assignment { target, value } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            Syntax::Return { method: _, value } => {
                if let Some(v) = value {
                    self.visit_expr(v);
                }
            }
            _ => self.visit_expr(id),
        }
    }

    /// Visit an expression, minting a node only for the constructs that
    /// introduce a value with no other home: null literals, call results,
    /// conditional-access results, and null-coalescing results.
    fn visit_expr(&mut self, id: SyntaxId) {
        match self.tu.get(id).clone() {
            Syntax::NullLiteral => {
                let local = self.builder.new_node(None, format!("null-literal#{}", id.0));
                self.node_for_syntax.insert(id, local.into());
            }
            Syntax::Call { callee_method: _, args } => {
                let local = self.builder.new_node(None, format!("call#{}", id.0));
                self.node_for_syntax.insert(id, local.into());
                for arg in &args {
                    self.visit_expr(*arg);
                }
            }
            Syntax::ConditionalAccess { target, member: _ } => {
                let local = self.builder.new_node(None, format!("conditional-access#{}", id.0));
                self.node_for_syntax.insert(id, local.into());
                self.visit_expr(target);
            }
            Syntax::NullCoalescing { left, right } => {
                let local = self.builder.new_node(None, format!("null-coalesce#{}", id.0));
                self.node_for_syntax.insert(id, local.into());
                self.visit_expr(left);
                self.visit_expr(right);
            }
            Syntax::MemberAccess { target } => self.visit_expr(target),
            Syntax::NewInstance { class: _, type_arguments } => {
                for arg in &type_arguments {
                    self.visit_type_ref(*arg, false);
                }
            }
            Syntax::Identifier { .. } => {}
            _ => {}
        }
    }

    /// Node builder rule 1 (value types get the shared oblivious node),
    /// rule 2 (explicit `T?` is pre-labelled nullable), rule 3 (record the
    /// syntax -> node mapping) — folded into one recursive walk over a
    /// `TypeRef`'s nested type arguments.
    fn visit_type_ref(&mut self, id: SyntaxId, is_input_position: bool) -> LocalType {
        self.visit_type_ref_layer(id, is_input_position, 0)
    }

    /// `visit_type_ref`'s actual recursion, carrying the nesting depth so it
    /// can stop minting nodes past `MAX_GENERIC_LAYER_DEPTH` — a
    /// pathologically nested `TypeRef` (`Box<Box<Box<...>>>`) collapses the
    /// remaining layers onto the shared `Oblivious` node instead of
    /// recursing without bound.
    fn visit_type_ref_layer(&mut self, id: SyntaxId, is_input_position: bool, depth: usize) -> LocalType {
        if depth >= nullgraph_common::limits::MAX_GENERIC_LAYER_DEPTH {
            tracing::warn!(syntax = id.0, depth, "generic nesting exceeds MAX_GENERIC_LAYER_DEPTH, truncating");
            let node_ref: Ref = self.ts.new_oblivious().into();
            self.node_for_syntax.insert(id, node_ref);
            return LocalType { node: node_ref, type_arguments: Vec::new() };
        }

        let Syntax::TypeRef { explicit_nullable, type_arguments } = self.tu.get(id).clone() else {
            panic!("visit_type_ref called on a non-TypeRef syntax node");
        };

        let resolved = self.model.type_for(id);
        let name = format!("type-ref#{}", id.0);

        let node_ref: Ref = if !self.model.can_be_made_nullable(&resolved) {
            self.ts.new_oblivious().into()
        } else if explicit_nullable {
            self.builder.new_explicit_nullable_node(None, name).into()
        } else if is_input_position {
            self.builder.new_input_position_node(None, name, explicit_nullable).into()
        } else {
            self.builder.new_node(None, name).into()
        };

        self.node_for_syntax.insert(id, node_ref);

        let children: Vec<LocalType> = type_arguments
            .iter()
            .map(|&arg| self.visit_type_ref_layer(arg, false, depth + 1))
            .collect();

        LocalType { node: node_ref, type_arguments: children }
    }
}

/// Everything C2 produced for one translation unit that C3 needs: the
/// syntax -> node mapping (also published into the shared [`TypeSystem`])
/// and the generic-substitution table.
pub struct NodeBuilderResult {
    pub mapping: SyntaxToNodeMapping,
    pub generic_positions: FxHashMap<GenericPositionKey, Vec<Node>>,
}

/// Walk one translation unit, build its nodes, publish its syntax->node
/// mapping and every declared symbol's memoised type into `ts`.
pub fn build_translation_unit(ts: &TypeSystem, tu_id: TuId, tu: &TranslationUnit) -> NodeBuilderResult {
    let mut cx = Context {
        tu,
        model: tu.semantic_model.as_ref(),
        ts,
        builder: Builder::new(),
        node_for_syntax: FxHashMap::default(),
        symbol_types: FxHashMap::default(),
        generic_positions: FxHashMap::default(),
    };

    cx.visit_top_level();

    let Context { builder, node_for_syntax, symbol_types, generic_positions, .. } = cx;
    let flushed = ts.flush(builder);

    let mapping: SyntaxToNodeMapping = node_for_syntax
        .into_iter()
        .map(|(syntax, r)| (syntax, flushed.resolve(r)))
        .collect();

    for (symbol, local_ty) in symbol_types {
        let resolved = local_ty.resolve(&flushed);
        ts.symbol_type(symbol, |_| resolved.clone());
    }

    let generic_positions = generic_positions
        .into_iter()
        .map(|(key, refs)| (key, refs.into_iter().map(|r| flushed.resolve(r)).collect()))
        .collect();

    ts.register_nodes(tu_id, mapping.clone());
    tracing::debug!(tu = tu_id.0, nodes = mapping.len(), "built nodes for translation unit");
    NodeBuilderResult { mapping, generic_positions }
}
