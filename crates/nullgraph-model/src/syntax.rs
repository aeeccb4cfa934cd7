//! A minimal syntax-tree shape: exactly the constructs the §4.3 edge-rule
//! table needs to see, nothing more. A real host toolchain's AST carries a
//! great deal the engine never looks at (statements that don't touch
//! reference types, control-flow constructs other than what
//! `flow_state_before` already summarises, expression precedence, ...); this
//! is the projection of it `nullgraph` actually consumes.

use crate::types::SymbolId;

/// An index into a [`crate::TranslationUnit`]'s syntax arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyntaxId(pub u32);

/// One syntax node. Declarations, type references, and expressions share a
/// single enum/arena the way compact AST arenas typically do (see
/// `tsz_parser::NodeArena`'s `NodeIndex` scheme) — it keeps cross-references
/// (`Return.method`, `Call.callee_method`, ...) as plain [`SyntaxId`]s
/// instead of pointers.
#[derive(Clone, Debug)]
pub enum Syntax {
    // ---- Declarations -------------------------------------------------
    /// A method declaration. `overrides` lists the base/interface methods
    /// this one overrides, for the override-unification edge rule.
    Method {
        symbol: SymbolId,
        params: Vec<SyntaxId>,
        return_type: SyntaxId,
        body: Vec<SyntaxId>,
        overrides: Vec<SyntaxId>,
    },
    Param {
        symbol: SymbolId,
        type_ref: SyntaxId,
    },
    Field {
        symbol: SymbolId,
        type_ref: SyntaxId,
        initializer: Option<SyntaxId>,
    },
    Local {
        symbol: SymbolId,
        type_ref: SyntaxId,
        initializer: Option<SyntaxId>,
    },
    /// A class declaration, generic over `type_params`. `generic_positions`
    /// names which of this class's own `TypeRef` nodes are bare occurrences
    /// of one of `type_params`, for the generic-substitution edge rule.
    Class {
        symbol: SymbolId,
        type_params: Vec<SymbolId>,
        members: Vec<SyntaxId>,
        generic_positions: Vec<(SymbolId, SyntaxId)>,
    },
    /// One occurrence of a type in source: `explicit_nullable` is true iff
    /// the input spelled `T?` here (§4.2 rule 2). `type_arguments` are the
    /// nested generic-argument / array-element `TypeRef`s.
    TypeRef {
        explicit_nullable: bool,
        type_arguments: Vec<SyntaxId>,
    },

    // ---- Expressions ----------------------------------------------------
    Identifier {
        symbol: SymbolId,
    },
    NullLiteral,
    Assignment {
        target: SyntaxId,
        value: SyntaxId,
    },
    /// `return value` inside `method`.
    Return {
        method: SyntaxId,
        value: Option<SyntaxId>,
    },
    /// A call to `callee_method` (a [`Syntax::Method`]) with `args`
    /// positionally matched to the callee's parameters.
    Call {
        callee_method: SyntaxId,
        args: Vec<SyntaxId>,
    },
    /// Constructing an instance of a generic class, with `type_arguments`
    /// positionally matched to `class`'s `type_params`.
    NewInstance {
        class: SyntaxId,
        type_arguments: Vec<SyntaxId>,
    },
    /// A non-null-asserting member access / indexer / dereference:
    /// `target.Member`, `target[i]`, or an explicit `target!` suppression
    /// consumer.
    MemberAccess {
        target: SyntaxId,
    },
    /// `target?.member` — conditional access short-circuits to null.
    ConditionalAccess {
        target: SyntaxId,
        member: SyntaxId,
    },
    /// `left ?? right`.
    NullCoalescing {
        left: SyntaxId,
        right: SyntaxId,
    },
}
