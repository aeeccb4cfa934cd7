//! Union-find over [`Node`]s, backing `replaced_with` (§3).
//!
//! Built on `ena`'s in-place unification table — the same crate the teacher
//! workspace already depends on for equivalence-class bookkeeping in its
//! own type solver, rather than a hand-rolled union-find.

use ena::unify::{InPlaceUnificationTable, UnifyKey, UnifyValue};

use crate::node::Node;

/// `ena`'s unify key, kept numerically identical to `Node`'s own index:
/// every node gets a unify-table key the moment it's created, so `NodeKey`
/// and `Node` never drift apart.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct NodeKey(u32);

impl UnifyKey for NodeKey {
    type Value = NodeRank;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        NodeKey(u)
    }

    fn tag() -> &'static str {
        "NodeKey"
    }
}

/// The union-find table doesn't need to merge any interesting value — the
/// representative's identity is all `replaced_with` needs — but `ena`
/// requires a `UnifyValue`, so this is the trivial one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) struct NodeRank;

impl UnifyValue for NodeRank {
    type Error = ena::unify::NoError;

    fn unify_values(_a: &Self, _b: &Self) -> Result<Self, Self::Error> {
        Ok(NodeRank)
    }
}

pub(crate) struct UnionFind {
    table: InPlaceUnificationTable<NodeKey>,
}

impl UnionFind {
    pub fn new() -> Self {
        UnionFind {
            table: InPlaceUnificationTable::new(),
        }
    }

    /// Register a freshly created node; must be called exactly once per
    /// `Node`, in index order, so `NodeKey(i)` always corresponds to
    /// `Node(i)`.
    pub fn register(&mut self) -> Node {
        let key = self.table.new_key(NodeRank);
        Node(key.index())
    }

    pub fn union(&mut self, a: Node, b: Node) {
        self.table.union(NodeKey(a.0), NodeKey(b.0));
    }

    pub fn find(&mut self, node: Node) -> Node {
        Node(self.table.find(NodeKey(node.0)).index())
    }
}
