//! Per-translation-unit local buffer for C2/C3.
//!
//! §5: "Builders accumulate into a local buffer and flush under a single
//! mutex; this keeps contention O(number-of-translation-units) rather than
//! O(nodes)." A `Builder` collects pending node/edge creations against
//! *local* placeholder indices; [`crate::store::TypeSystem::flush`] takes
//! the arena mutex exactly once per TU to assign real [`Node`]/[`EdgeId`]s
//! and remap every local reference.
//!
//! Edges and unifications that need to reach an already-global node (the
//! two sinks, the shared `Oblivious` singleton, or a cross-TU symbol's node
//! returned by `symbol_type`) reference it directly via [`Ref::Global`].

use nullgraph_common::Location;

use crate::node::Node;

/// A placeholder index into a [`Builder`]'s local node vector, valid only
/// until that builder is flushed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalNode(u32);

impl LocalNode {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Either a node local to the builder being flushed, or one already
/// published in the global arena.
#[derive(Copy, Clone, Debug)]
pub enum Ref {
    Local(LocalNode),
    Global(Node),
}

impl From<Node> for Ref {
    fn from(node: Node) -> Self {
        Ref::Global(node)
    }
}

impl From<LocalNode> for Ref {
    fn from(node: LocalNode) -> Self {
        Ref::Local(node)
    }
}

pub(crate) struct PendingNode {
    pub name: String,
    pub location: Option<Location>,
    pub is_input_position: bool,
    /// `Some` iff this node was created for an explicit `T?` occurrence
    /// (§4.2 rule 2): it gets an infinite-capacity edge from `NullableSink`
    /// once flushed.
    pub explicit_nullable: bool,
}

pub(crate) struct PendingEdge {
    pub source: Ref,
    pub target: Ref,
    pub capacity: u32,
    pub is_error: bool,
    pub label: String,
}

pub(crate) struct PendingUnify {
    pub a: Ref,
    pub b: Ref,
}

/// Local accumulation buffer for one translation unit's C2 or C3 pass.
#[derive(Default)]
pub struct Builder {
    pub(crate) nodes: Vec<PendingNode>,
    pub(crate) edges: Vec<PendingEdge>,
    pub(crate) unifications: Vec<PendingUnify>,
}

impl Builder {
    pub fn new() -> Self {
        Builder::default()
    }

    pub fn new_node(&mut self, location: Option<Location>, name: impl Into<String>) -> LocalNode {
        self.new_node_inner(location, name, false, false)
    }

    /// A node for an explicit `T?` occurrence (§4.2 rule 2): pre-labelled
    /// nullable via an infinite-capacity edge from `NullableSink` once
    /// flushed.
    pub fn new_explicit_nullable_node(
        &mut self,
        location: Option<Location>,
        name: impl Into<String>,
    ) -> LocalNode {
        self.new_node_inner(location, name, false, true)
    }

    pub fn new_input_position_node(
        &mut self,
        location: Option<Location>,
        name: impl Into<String>,
        explicit_nullable: bool,
    ) -> LocalNode {
        self.new_node_inner(location, name, true, explicit_nullable)
    }

    fn new_node_inner(
        &mut self,
        location: Option<Location>,
        name: impl Into<String>,
        is_input_position: bool,
        explicit_nullable: bool,
    ) -> LocalNode {
        let id = LocalNode(self.nodes.len() as u32);
        self.nodes.push(PendingNode {
            name: name.into(),
            location,
            is_input_position,
            explicit_nullable,
        });
        id
    }

    pub fn add_edge(
        &mut self,
        source: impl Into<Ref>,
        target: impl Into<Ref>,
        capacity: u32,
        label: impl Into<String>,
    ) {
        self.edges.push(PendingEdge {
            source: source.into(),
            target: target.into(),
            capacity,
            is_error: false,
            label: label.into(),
        });
    }

    pub fn add_error_edge(
        &mut self,
        source: impl Into<Ref>,
        target: impl Into<Ref>,
        capacity: u32,
        label: impl Into<String>,
    ) {
        self.edges.push(PendingEdge {
            source: source.into(),
            target: target.into(),
            capacity,
            is_error: true,
            label: label.into(),
        });
    }

    pub fn unify(&mut self, a: impl Into<Ref>, b: impl Into<Ref>) {
        self.unifications.push(PendingUnify {
            a: a.into(),
            b: b.into(),
        });
    }
}
