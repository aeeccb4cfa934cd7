//! Host-toolchain collaborator contracts.
//!
//! The engine never parses, lexes, or semantically analyses the host
//! language itself (see SPEC_FULL.md §1). Everything in this crate is the
//! boundary the host toolchain is expected to implement:
//!
//! - [`Syntax`] / [`SyntaxId`]: a minimal syntax-tree shape covering exactly
//!   the constructs the edge-builder rule table (§4.3) needs to see. A real
//!   host toolchain's AST is far richer; this is the projection of it the
//!   engine actually consumes.
//! - [`SemanticModel`]: resolved-symbol and resolved-type queries (§6).
//! - [`TranslationUnit`]: one compilation unit's syntax plus its semantic
//!   model.
//!
//! The `testkit` feature additionally exposes a hand-built fixture builder
//! used only by this workspace's own tests, standing in for a real parser.

pub mod syntax;
pub mod types;

#[cfg(feature = "testkit")]
pub mod testkit;

pub use syntax::{Syntax, SyntaxId};
pub use types::{FlowState, ReferenceKind, ResolvedType, SemanticModel, SymbolId};

/// A translation unit's position in the compilation-unit set the driver was
/// given (§5: "node identity is stable... given a deterministic TU
/// ordering").
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TuId(pub u32);

/// One compilation unit: its own arena of [`Syntax`] nodes, the top-level
/// declarations in it, and the semantic model the host built for it.
///
/// `semantic_model` is read-only after construction and must be `Send +
/// Sync` — the driver shares it across C2/C3 worker threads (§5).
pub struct TranslationUnit {
    pub file_path: String,
    pub arena: Vec<Syntax>,
    pub top_level: Vec<SyntaxId>,
    pub semantic_model: Box<dyn SemanticModel>,
}

impl TranslationUnit {
    pub fn get(&self, id: SyntaxId) -> &Syntax {
        &self.arena[id.0 as usize]
    }
}
