//! A hand-built minimal host-syntax fixture, used by this workspace's own
//! test suites in place of a real host parser (out of scope — §1, §8).
//!
//! `FixtureBuilder` constructs a [`crate::TranslationUnit`] node-by-node,
//! the way a real host's parser+binder pipeline would hand one to the
//! engine, except driven directly instead of from source text.

use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;

use crate::syntax::{Syntax, SyntaxId};
use crate::types::{FlowState, ResolvedType, SemanticModel, SymbolId};
use crate::TranslationUnit;

/// Builds one [`TranslationUnit`] worth of fixture syntax.
#[derive(Default)]
pub struct FixtureBuilder {
    arena: Vec<Syntax>,
    types: FxHashMap<SyntaxId, ResolvedType>,
    flow: FxHashMap<SyntaxId, FlowState>,
}

static NEXT_SYMBOL: AtomicU32 = AtomicU32::new(1);

impl FixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh symbol id, unique across the whole test binary (fixtures in
    /// different tests never collide even though each builds its own
    /// arena).
    pub fn fresh_symbol(&self) -> SymbolId {
        SymbolId(NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed))
    }

    pub fn push(&mut self, node: Syntax) -> SyntaxId {
        let id = SyntaxId(self.arena.len() as u32);
        self.arena.push(node);
        id
    }

    /// A `T` or `T?` occurrence. `reference` is false for value types,
    /// which the builder maps to the shared `Oblivious` node regardless of
    /// `explicit_nullable`.
    pub fn type_ref(
        &mut self,
        explicit_nullable: bool,
        reference: bool,
        type_arguments: Vec<SyntaxId>,
    ) -> SyntaxId {
        let id = self.push(Syntax::TypeRef {
            explicit_nullable,
            type_arguments: type_arguments.clone(),
        });
        let ty = if reference {
            ResolvedType::generic(type_arguments.iter().map(|a| self.types[a].clone()).collect())
        } else {
            ResolvedType::value()
        };
        self.types.insert(id, ty);
        id
    }

    /// Record the resolved type of an arbitrary expression syntax node
    /// (needed for call-site/member-access nodes the builder doesn't infer
    /// a type for on its own).
    pub fn set_type(&mut self, id: SyntaxId, ty: ResolvedType) {
        self.types.insert(id, ty);
    }

    pub fn set_flow_state(&mut self, id: SyntaxId, state: FlowState) {
        self.flow.insert(id, state);
    }

    pub fn build(self, file_path: impl Into<String>, top_level: Vec<SyntaxId>) -> TranslationUnit {
        TranslationUnit {
            file_path: file_path.into(),
            arena: self.arena,
            top_level,
            semantic_model: Box::new(FixtureModel {
                types: self.types,
                flow: self.flow,
            }),
        }
    }
}

struct FixtureModel {
    types: FxHashMap<SyntaxId, ResolvedType>,
    flow: FxHashMap<SyntaxId, FlowState>,
}

impl SemanticModel for FixtureModel {
    fn symbol_for(&self, _syntax: SyntaxId) -> Option<SymbolId> {
        None
    }

    fn type_for(&self, syntax: SyntaxId) -> ResolvedType {
        self.types
            .get(&syntax)
            .cloned()
            .unwrap_or_else(ResolvedType::reference)
    }

    fn flow_state_before(&self, syntax: SyntaxId) -> FlowState {
        self.flow.get(&syntax).copied().unwrap_or(FlowState::Unknown)
    }
}
