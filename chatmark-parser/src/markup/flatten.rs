//! AST flattening
//!
//!     Recursive descent over delimiter pairs can produce redundant same-type wrappers
//!     (a spoiler whose sole child is another spoiler, and so on). Flattening collapses
//!     any node whose only child is a node of the identical wrapper type. The pass is
//!     idempotent: flattening twice is the same as flattening once, which the property
//!     tests pin down.

use super::ast::Node;

/// Collapse redundant same-type wrapper nesting across a whole node sequence.
pub fn flatten(nodes: Vec<Node>) -> Vec<Node> {
    nodes.into_iter().map(flatten_node).collect()
}

fn flatten_node(node: Node) -> Node {
    let mut node = map_children(node);
    // A sole same-type child is adopted outright; loop in case the child
    // carried another one (children are already flattened bottom-up).
    loop {
        let collapse = match node.children() {
            Some([only]) if node.same_wrapper_kind(only) => true,
            _ => false,
        };
        if !collapse {
            return node;
        }
        node = match node {
            Node::Strong(mut c)
            | Node::Em(mut c)
            | Node::Underline(mut c)
            | Node::Strikethrough(mut c)
            | Node::Spoiler(mut c)
            | Node::BlockQuote(mut c) => c.remove(0),
            other => other,
        };
    }
}

fn map_children(node: Node) -> Node {
    match node {
        Node::Heading { level, children } => Node::Heading {
            level,
            children: flatten(children),
        },
        Node::Strong(c) => Node::Strong(flatten(c)),
        Node::Em(c) => Node::Em(flatten(c)),
        Node::Underline(c) => Node::Underline(flatten(c)),
        Node::Strikethrough(c) => Node::Strikethrough(flatten(c)),
        Node::Spoiler(c) => Node::Spoiler(flatten(c)),
        Node::BlockQuote(c) => Node::BlockQuote(flatten(c)),
        Node::Link { target, children } => Node::Link {
            target,
            children: flatten(children),
        },
        Node::List {
            ordered,
            start,
            items,
        } => Node::List {
            ordered,
            start,
            items: items.into_iter().map(flatten).collect(),
        },
        leaf => leaf,
    }
}
