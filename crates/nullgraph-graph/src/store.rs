//! [`TypeSystem`]: the global node/edge arena, union-find, and
//! symbol-type memoisation cache (C1, §4.1).

use std::sync::Mutex;

use dashmap::DashMap;
use nullgraph_common::Location;
use nullgraph_model::{SymbolId, TuId};
use rustc_hash::FxHashMap;

use crate::builder::{Builder, LocalNode, Ref};
use crate::edge::{EdgeId, NullabilityEdge, NullabilityEdgeData, INFINITE_CAPACITY};
use crate::node::{Node, NullType, NullabilityNodeData};
use crate::type_with_node::TypeWithNode;
use crate::unify::UnionFind;

struct Arena {
    nodes: Vec<NullabilityNodeData>,
    edges: Vec<NullabilityEdgeData>,
    unify: UnionFind,
}

/// A per-translation-unit map from syntax position to the node that
/// represents it, published once by [`TypeSystem::register_nodes`] after
/// C2 finishes building that TU (§3).
pub type SyntaxToNodeMapping = FxHashMap<nullgraph_model::SyntaxId, Node>;

/// The real [`Node`] assigned to each [`crate::builder::LocalNode`] a
/// [`Builder`] held, in assignment order. Lets a caller outside this crate
/// resolve its own [`Ref`]s once a flush completes, without exposing
/// `LocalNode`'s internal index.
pub struct FlushedNodes(Vec<Node>);

impl FlushedNodes {
    pub fn get(&self, local: LocalNode) -> Node {
        self.0[local.index()]
    }

    pub fn resolve(&self, r: Ref) -> Node {
        match r {
            Ref::Local(local) => self.get(local),
            Ref::Global(node) => node,
        }
    }
}

pub struct TypeSystem {
    arena: Mutex<Arena>,
    /// Concurrent reads, serialised first-writer-wins inserts — mirrors the
    /// teacher's own `DashMap`-backed type-interning cache.
    symbol_types: DashMap<SymbolId, TypeWithNode>,
    mappings: DashMap<TuId, SyntaxToNodeMapping>,
    nullable_sink: Node,
    non_null_sink: Node,
    oblivious: Node,
}

impl TypeSystem {
    pub fn new() -> Self {
        let mut arena = Arena {
            nodes: Vec::new(),
            edges: Vec::new(),
            unify: UnionFind::new(),
        };
        let nullable_sink = Self::raw_new_node(
            &mut arena,
            None,
            "<NullableSink>".to_string(),
            NullType::Nullable,
        );
        let non_null_sink = Self::raw_new_node(
            &mut arena,
            None,
            "<NonNullSink>".to_string(),
            NullType::NonNull,
        );
        let oblivious = Self::raw_new_node(
            &mut arena,
            None,
            "<Oblivious>".to_string(),
            NullType::Oblivious,
        );

        TypeSystem {
            arena: Mutex::new(arena),
            symbol_types: DashMap::new(),
            mappings: DashMap::new(),
            nullable_sink,
            non_null_sink,
            oblivious,
        }
    }

    fn raw_new_node(
        arena: &mut Arena,
        location: Option<Location>,
        name: String,
        null_type: NullType,
    ) -> Node {
        let node = arena.unify.register();
        debug_assert_eq!(node.index(), arena.nodes.len());
        arena.nodes.push(NullabilityNodeData::new(name, location, null_type));
        node
    }

    fn raw_add_edge(
        arena: &mut Arena,
        source: Node,
        target: Node,
        capacity: u32,
        is_error: bool,
        label: String,
    ) -> EdgeId {
        let id = EdgeId(arena.edges.len() as u32);
        arena
            .edges
            .push(NullabilityEdgeData::new(source, target, capacity, is_error, label));
        arena.nodes[source.index()].outgoing.push(id);
        arena.nodes[target.index()].incoming.push(id);
        id
    }

    /// Allocate an `Infer` node directly against the global arena (locks
    /// once). Used internally by [`Self::symbol_type`] and by callers that
    /// don't go through a per-TU [`Builder`].
    pub fn new_node(&self, location: Option<Location>, name: impl Into<String>) -> Node {
        let mut arena = self.arena.lock().unwrap();
        Self::raw_new_node(&mut arena, location, name.into(), NullType::Infer)
    }

    /// The shared singleton for value-typed / non-applicable positions.
    pub fn new_oblivious(&self) -> Node {
        self.oblivious
    }

    pub fn add_edge(
        &self,
        source: Node,
        target: Node,
        capacity: u32,
        label: impl Into<String>,
    ) -> EdgeId {
        let mut arena = self.arena.lock().unwrap();
        Self::raw_add_edge(&mut arena, source, target, capacity, false, label.into())
    }

    pub fn add_error_edge(
        &self,
        source: Node,
        target: Node,
        capacity: u32,
        label: impl Into<String>,
    ) -> EdgeId {
        let mut arena = self.arena.lock().unwrap();
        Self::raw_add_edge(&mut arena, source, target, capacity, true, label.into())
    }

    /// Union-find merge, plus the two infinite-capacity edges that keep the
    /// max-flow solver from ever separating the pair (§4.1).
    pub fn unify(&self, a: Node, b: Node) {
        let mut arena = self.arena.lock().unwrap();
        arena.unify.union(a, b);
        Self::raw_add_edge(&mut arena, a, b, INFINITE_CAPACITY, false, "unify".to_string());
        Self::raw_add_edge(&mut arena, b, a, INFINITE_CAPACITY, false, "unify".to_string());
    }

    /// Memoised per-symbol `TypeWithNode`. The first caller for a given
    /// symbol computes it (via `compute`, which may itself allocate nodes
    /// through `self`); concurrent first-callers may race and compute
    /// redundant node sets, but `DashMap::entry` guarantees every caller
    /// observes the same winning value — satisfying "must return the same
    /// TypeWithNode by identity on every call" without serialising C2
    /// across translation units.
    pub fn symbol_type(
        &self,
        symbol: SymbolId,
        compute: impl FnOnce(&TypeSystem) -> TypeWithNode,
    ) -> TypeWithNode {
        if let Some(existing) = self.symbol_types.get(&symbol) {
            return existing.clone();
        }
        let computed = compute(self);
        self.symbol_types.entry(symbol).or_insert(computed).clone()
    }

    /// Flush one translation unit's local [`Builder`] into the global
    /// arena under a single lock acquisition, returning the real [`Node`]
    /// each [`crate::builder::LocalNode`] was assigned (indexed the same
    /// way the builder assigned them).
    pub fn flush(&self, builder: Builder) -> FlushedNodes {
        let mut arena = self.arena.lock().unwrap();

        let base: Vec<Node> = builder
            .nodes
            .iter()
            .map(|pending| {
                Self::raw_new_node(
                    &mut arena,
                    pending.location.clone(),
                    pending.name.clone(),
                    NullType::Infer,
                )
            })
            .collect();

        for (pending, &node) in builder.nodes.iter().zip(base.iter()) {
            if pending.is_input_position {
                arena.nodes[node.index()].is_input_position = true;
            }
            if pending.explicit_nullable {
                Self::raw_add_edge(
                    &mut arena,
                    self.nullable_sink,
                    node,
                    INFINITE_CAPACITY,
                    false,
                    "explicit T?".to_string(),
                );
            }
        }

        let resolve = |r: Ref| -> Node {
            match r {
                Ref::Local(l) => base[l.index()],
                Ref::Global(n) => n,
            }
        };

        for edge in builder.edges {
            Self::raw_add_edge(
                &mut arena,
                resolve(edge.source),
                resolve(edge.target),
                edge.capacity,
                edge.is_error,
                edge.label,
            );
        }

        for u in builder.unifications {
            let a = resolve(u.a);
            let b = resolve(u.b);
            arena.unify.union(a, b);
            Self::raw_add_edge(&mut arena, a, b, INFINITE_CAPACITY, false, "unify".to_string());
            Self::raw_add_edge(&mut arena, b, a, INFINITE_CAPACITY, false, "unify".to_string());
        }

        FlushedNodes(base)
    }

    /// Publish one translation unit's syntax→node mapping. Called once per
    /// TU after C2, before C3 reads it.
    pub fn register_nodes(&self, tu: TuId, mapping: SyntaxToNodeMapping) {
        self.mappings.insert(tu, mapping);
    }

    pub fn mapping(&self, tu: TuId) -> Option<SyntaxToNodeMapping> {
        self.mappings.get(&tu).map(|m| m.clone())
    }

    pub fn all_nodes(&self) -> Vec<Node> {
        let arena = self.arena.lock().unwrap();
        (0..arena.nodes.len() as u32).map(Node).collect()
    }

    pub fn all_edges(&self) -> Vec<EdgeId> {
        let arena = self.arena.lock().unwrap();
        (0..arena.edges.len() as u32).map(EdgeId).collect()
    }

    pub fn nullable_sink(&self) -> Node {
        self.nullable_sink
    }

    pub fn non_null_sink(&self) -> Node {
        self.non_null_sink
    }

    pub fn nodes_in_input_positions(&self) -> Vec<Node> {
        let arena = self.arena.lock().unwrap();
        arena
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, data)| data.is_input_position)
            .map(|(i, _)| Node(i as u32))
            .collect()
    }

    pub fn null_type(&self, node: Node) -> NullType {
        self.arena.lock().unwrap().nodes[node.index()].null_type
    }

    /// Written only by C5 (and the controlled sink reset between C4 and
    /// C5) — see §3's lifecycle note.
    pub fn set_null_type(&self, node: Node, null_type: NullType) {
        self.arena.lock().unwrap().nodes[node.index()].null_type = null_type;
    }

    pub fn replaced_with(&self, node: Node) -> Node {
        self.arena.lock().unwrap().unify.find(node)
    }

    pub fn name(&self, node: Node) -> String {
        self.arena.lock().unwrap().nodes[node.index()].name.clone()
    }

    pub fn location(&self, node: Node) -> Option<Location> {
        self.arena.lock().unwrap().nodes[node.index()].location.clone()
    }

    pub fn edges_out(&self, node: Node) -> Vec<EdgeId> {
        self.arena.lock().unwrap().nodes[node.index()].outgoing.to_vec()
    }

    pub fn edges_in(&self, node: Node) -> Vec<EdgeId> {
        self.arena.lock().unwrap().nodes[node.index()].incoming.to_vec()
    }

    pub fn edge(&self, id: EdgeId) -> NullabilityEdge {
        NullabilityEdge::from(&self.arena.lock().unwrap().edges[id.index()])
    }

    /// Overwrite one edge's residual capacity in place (C4 only).
    pub fn set_edge_capacity(&self, id: EdgeId, new_capacity: u32) {
        self.arena.lock().unwrap().edges[id.index()].capacity = new_capacity;
    }

    pub fn edge_count(&self) -> usize {
        self.arena.lock().unwrap().edges.len()
    }
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new()
    }
}
