//! Centralized limits and thresholds for the nullability inference engine.
//!
//! Centralizing these avoids duplicate magic numbers scattered across the
//! builder and flow crates, and documents the rationale for each one.

/// Maximum recursion depth when walking nested generic-argument layers of a
/// `TypeRef` (e.g. `Box<Box<Box<...>>>`). Bounds `node_builder::visit_type_ref`'s
/// recursive layer walk against pathological generic nesting; a `TypeRef`
/// past this depth collapses onto the shared `Oblivious` node instead of
/// minting more nodes.
pub const MAX_GENERIC_LAYER_DEPTH: usize = 64;

/// Default cap on augmenting-path searches the max-flow solver will run
/// before treating the current flow as maximal, when
/// `AnalysisOptions::max_augmenting_paths` is `None`. Sized generously
/// relative to the "small graph" assumption in §4.4 — real inference graphs
/// are bounded by source size, not by pathological adversarial inputs.
pub const DEFAULT_MAX_AUGMENTING_PATHS: usize = 1_000_000;
