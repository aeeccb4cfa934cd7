//! Resolved-symbol and resolved-type queries a host semantic model must
//! answer (§6). `nullgraph` never constructs a `ResolvedType` itself; it
//! only ever receives one from [`SemanticModel::type_for`] and inspects it
//! through the model's own predicates.

use crate::syntax::SyntaxId;

/// An opaque handle to a declared symbol (parameter, field, property,
/// method, local). The engine never interprets it beyond hashing —
/// see SPEC_FULL.md's Open Question on this: the host is required to hand
/// out equal `SymbolId`s for the same declaration on every call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Coarse shape of a resolved type, exactly as much as the builder needs to
/// decide whether a position gets a nullability node at all (§4.2 rule 1)
/// and whether nested layers need their own nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A value type (struct/enum-like) — never nullable, gets the shared
    /// `Oblivious` node.
    Value,
    /// A reference type or unconstrained type parameter.
    Reference,
}

/// A resolved type together with enough structure to recurse into its
/// generic-argument / array-element layers (§3's "TypeWithNode" note that
/// "the builder tracks [nested layers] in parallel with the host type
/// shape").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedType {
    pub kind: ReferenceKind,
    /// Nested layers: generic type arguments in declaration order, or a
    /// single element type for an array. Empty for non-generic,
    /// non-array types.
    pub type_arguments: Vec<ResolvedType>,
}

impl ResolvedType {
    pub fn value() -> Self {
        ResolvedType {
            kind: ReferenceKind::Value,
            type_arguments: Vec::new(),
        }
    }

    pub fn reference() -> Self {
        ResolvedType {
            kind: ReferenceKind::Reference,
            type_arguments: Vec::new(),
        }
    }

    pub fn generic(type_arguments: Vec<ResolvedType>) -> Self {
        ResolvedType {
            kind: ReferenceKind::Reference,
            type_arguments,
        }
    }
}

/// What the host's own flow analysis knows about an expression's
/// nullability at a given point, used by the "flow-analysis hint" edge
/// rule (§4.3's last table row).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowState {
    DefinitelyNotNull,
    MaybeNull,
    Unknown,
}

/// The semantic model a host toolchain provides per translation unit (§6).
///
/// Implementations must be safe to share (read-only) across the C2/C3
/// worker threads the driver spawns.
pub trait SemanticModel: Send + Sync {
    fn symbol_for(&self, syntax: SyntaxId) -> Option<SymbolId>;
    fn type_for(&self, syntax: SyntaxId) -> ResolvedType;
    fn is_reference_type(&self, ty: &ResolvedType) -> bool {
        matches!(ty.kind, ReferenceKind::Reference)
    }
    fn can_be_made_nullable(&self, ty: &ResolvedType) -> bool {
        self.is_reference_type(ty)
    }
    /// Optional: defaults to `Unknown`, which the edge-builder treats as
    /// "no hint available" and falls back to emitting a plain dereference
    /// edge rather than pre-marking the incoming assignment edge protected.
    fn flow_state_before(&self, _syntax: SyntaxId) -> FlowState {
        FlowState::Unknown
    }
}
