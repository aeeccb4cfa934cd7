//! [`TypeWithNode`]: a host type paired with the nullability node for its
//! outermost reference layer, plus nested layers for generic arguments and
//! array elements (§3).

use crate::node::Node;

#[derive(Clone, Debug)]
pub struct TypeWithNode {
    /// The node for this type's outermost reference layer.
    pub node: Node,
    /// Nested `TypeWithNode`s for generic type arguments / the array
    /// element type, in declaration order.
    pub type_arguments: Vec<TypeWithNode>,
}

impl TypeWithNode {
    pub fn leaf(node: Node) -> Self {
        TypeWithNode {
            node,
            type_arguments: Vec::new(),
        }
    }

    pub fn generic(node: Node, type_arguments: Vec<TypeWithNode>) -> Self {
        TypeWithNode {
            node,
            type_arguments,
        }
    }
}
