//! [`NullabilityEdge`]: a directed flow-constraint edge between two nodes.

use crate::node::Node;

/// Capacity used for edges that must never be cut — e.g. the two opposing
/// edges `unify()` adds, and the edge from an explicit `T?`'s `TypeRef` to
/// `NullableSink` (§4.2 rule 2, §4.3's "Explicit `T?` in input" row).
pub const INFINITE_CAPACITY: u32 = u32::MAX;

/// A stable index into a [`crate::store::TypeSystem`]'s edge arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Backing storage for one [`EdgeId`].
///
/// Per §3, edges are never removed; `capacity` is overwritten in place with
/// its residual value by the max-flow solver (C4). `original_capacity` is
/// kept alongside so the diagnostic check in the edge-builder's "non-null
/// dereference" rule (`flow == original - residual`, i.e. `is_error` edges
/// with nonzero residual flow) can still be computed after C4 has run.
pub(crate) struct NullabilityEdgeData {
    pub source: Node,
    pub target: Node,
    pub capacity: u32,
    pub original_capacity: u32,
    pub is_error: bool,
    pub label: String,
}

impl NullabilityEdgeData {
    pub fn new(source: Node, target: Node, capacity: u32, is_error: bool, label: String) -> Self {
        NullabilityEdgeData {
            source,
            target,
            capacity,
            original_capacity: capacity,
            is_error,
            label,
        }
    }

    /// Flow that crossed this edge during max-flow: `original - residual`.
    pub fn flow(&self) -> u32 {
        self.original_capacity.saturating_sub(self.capacity)
    }
}

/// A read-only snapshot of one edge, returned from [`crate::store::TypeSystem::edge`].
#[derive(Clone, Debug)]
pub struct NullabilityEdge {
    pub source: Node,
    pub target: Node,
    pub capacity: u32,
    pub original_capacity: u32,
    pub is_error: bool,
    pub label: String,
}

impl NullabilityEdge {
    pub fn flow(&self) -> u32 {
        self.original_capacity.saturating_sub(self.capacity)
    }

    /// True iff this edge is part of the minimum cut: saturated (zero
    /// residual capacity) after max-flow (§4.4, §8's quantified invariant).
    pub fn is_saturated(&self) -> bool {
        self.capacity == 0
    }
}

impl From<&NullabilityEdgeData> for NullabilityEdge {
    fn from(data: &NullabilityEdgeData) -> Self {
        NullabilityEdge {
            source: data.source,
            target: data.target,
            capacity: data.capacity,
            original_capacity: data.original_capacity,
            is_error: data.is_error,
            label: data.label.clone(),
        }
    }
}
