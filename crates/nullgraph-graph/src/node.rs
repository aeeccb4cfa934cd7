//! [`Node`]: a stable arena index for a [`NullabilityNode`]. Per §9's design
//! note, the graph is intrinsically cyclic (union-find plus bidirectional
//! unification edges), so nodes are referenced by index everywhere, never
//! by strong ownership.

use nullgraph_common::Location;
use smallvec::SmallVec;

use crate::edge::EdgeId;

/// One of the four label states a node can carry (§3).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NullType {
    /// Value-typed or otherwise inapplicable. Never changes once set.
    Oblivious,
    Nullable,
    NonNull,
    /// Undecided; only valid before/during C4-C5, or transiently on the two
    /// sinks during the C4→C5 reset (§4.5 step 1).
    Infer,
}

/// A stable index into a [`crate::store::TypeSystem`]'s node arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node(pub(crate) u32);

impl Node {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Backing storage for one [`Node`]. Lives inside the arena's `Mutex`;
/// never referenced directly outside `nullgraph-graph`.
pub(crate) struct NullabilityNodeData {
    pub name: String,
    pub location: Option<Location>,
    pub null_type: NullType,
    pub incoming: SmallVec<[EdgeId; 4]>,
    pub outgoing: SmallVec<[EdgeId; 4]>,
    /// Parameter or other caller-controlled position, eligible for the
    /// nullable-biased tie-break (§4.5 step 4).
    pub is_input_position: bool,
}

impl NullabilityNodeData {
    pub fn new(name: String, location: Option<Location>, null_type: NullType) -> Self {
        NullabilityNodeData {
            name,
            location,
            null_type,
            incoming: SmallVec::new(),
            outgoing: SmallVec::new(),
            is_input_position: false,
        }
    }
}
