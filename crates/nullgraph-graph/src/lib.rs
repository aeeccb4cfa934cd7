//! The flow graph: nodes, edges, union-find, and the arena that owns them
//! (§3, §4.1 / component C1).

mod builder;
mod edge;
mod node;
mod store;
mod type_with_node;
mod unify;

pub use builder::{Builder, LocalNode, Ref};
pub use edge::{NullabilityEdge, INFINITE_CAPACITY};
pub use node::{Node, NullType};
pub use store::{FlushedNodes, SyntaxToNodeMapping, TypeSystem};
pub use type_with_node::TypeWithNode;

pub use edge::EdgeId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_arena_has_two_sinks_and_oblivious() {
        let ts = TypeSystem::new();
        assert_eq!(ts.null_type(ts.nullable_sink()), NullType::Nullable);
        assert_eq!(ts.null_type(ts.non_null_sink()), NullType::NonNull);
        assert_eq!(ts.null_type(ts.new_oblivious()), NullType::Oblivious);
        assert_eq!(ts.all_nodes().len(), 3);
    }

    #[test]
    fn unify_merges_representatives_and_adds_edges_both_ways() {
        let ts = TypeSystem::new();
        let a = ts.new_node(None, "a");
        let b = ts.new_node(None, "b");
        ts.unify(a, b);
        assert_eq!(ts.replaced_with(a), ts.replaced_with(b));
        assert_eq!(ts.edges_out(a).len(), 1);
        assert_eq!(ts.edges_out(b).len(), 1);
        let e = ts.edge(ts.edges_out(a)[0]);
        assert_eq!(e.source, a);
        assert_eq!(e.target, b);
        assert_eq!(e.capacity, INFINITE_CAPACITY);
    }

    #[test]
    fn symbol_type_memoises_by_identity() {
        let ts = TypeSystem::new();
        let symbol = nullgraph_model::SymbolId(7);
        let first = ts.symbol_type(symbol, |ts| TypeWithNode::leaf(ts.new_node(None, "x")));
        let second = ts.symbol_type(symbol, |ts| TypeWithNode::leaf(ts.new_node(None, "y")));
        assert_eq!(first.node, second.node);
    }

    #[test]
    fn flush_remaps_local_nodes_and_preserves_edges() {
        let ts = TypeSystem::new();
        let mut builder = Builder::new();
        let local_a = builder.new_input_position_node(None, "a", false);
        let local_b = builder.new_explicit_nullable_node(None, "b");
        builder.add_edge(local_a, local_b, 1, "flow");
        builder.add_edge(ts.non_null_sink(), local_a, u32::MAX, "deref");

        let resolved = ts.flush(builder);
        let node_a = resolved.get(local_a);
        let node_b = resolved.get(local_b);

        assert!(ts.nodes_in_input_positions().contains(&node_a));
        assert_eq!(ts.edges_out(node_a).len(), 2);

        let nullable_sink_edges = ts.edges_out(ts.nullable_sink());
        assert!(nullable_sink_edges
            .iter()
            .any(|&id| ts.edge(id).target == node_b));
    }
}
