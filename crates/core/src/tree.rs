//! Pure operations over the outline tree.
//!
//! A tree is an ordered slice of root nodes. Every operation returns a new
//! tree and leaves its input untouched. Searches are depth-first, pre-order,
//! and the first match wins.

use tracing::debug;

use crate::types::{OutlineNode, Relation};

/// Returns true if any node in the tree has the given id.
pub fn exists(tree: &[OutlineNode], id: &str) -> bool {
    find(tree, id).is_some()
}

/// First node with the given id, in pre-order.
pub fn find<'a>(tree: &'a [OutlineNode], id: &str) -> Option<&'a OutlineNode> {
    for node in tree {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Total number of nodes, descendants included.
pub fn node_count(tree: &[OutlineNode]) -> usize {
    tree.iter().map(|node| 1 + node_count(&node.children)).sum()
}

/// Insert `node` into the tree.
///
/// Without a target the node becomes the last root. With a target it becomes
/// the target's last child or its immediate next sibling, depending on
/// `relation`; if the target does not exist the node is appended at the root.
/// If the id is already present anywhere in the tree, nothing changes and the
/// returned flag is false.
pub fn insert(
    tree: &[OutlineNode],
    node: OutlineNode,
    target: Option<&str>,
    relation: Relation,
) -> (Vec<OutlineNode>, bool) {
    if exists(tree, &node.id) {
        debug!(id = %node.id, "node already in outline, skipping insert");
        return (tree.to_vec(), false);
    }

    let node = match target {
        Some(target) => match place(tree, target, relation, node) {
            Ok(next) => return (next, true),
            Err(node) => {
                debug!(id = %node.id, target, "insert target not found, appending at root");
                node
            }
        },
        None => node,
    };

    let mut next = tree.to_vec();
    next.push(node);
    (next, true)
}

/// Remove the first node with the given id together with its subtree.
pub fn remove(tree: &[OutlineNode], id: &str) -> (Vec<OutlineNode>, bool) {
    match remove_first(tree, id) {
        Some(next) => (next, true),
        None => {
            debug!(id, "node not in outline, nothing removed");
            (tree.to_vec(), false)
        }
    }
}

// Hands the node back when the target is not in this sequence or below it.
fn place(
    nodes: &[OutlineNode],
    target: &str,
    relation: Relation,
    mut node: OutlineNode,
) -> Result<Vec<OutlineNode>, OutlineNode> {
    for (index, current) in nodes.iter().enumerate() {
        if current.id == target {
            let mut next = nodes.to_vec();
            match relation {
                Relation::Child => next[index].children.push(node),
                Relation::Sibling => next.insert(index + 1, node),
            }
            return Ok(next);
        }

        match place(&current.children, target, relation, node) {
            Ok(children) => {
                let mut next = nodes.to_vec();
                next[index].children = children;
                return Ok(next);
            }
            Err(returned) => node = returned,
        }
    }
    Err(node)
}

fn remove_first(nodes: &[OutlineNode], id: &str) -> Option<Vec<OutlineNode>> {
    for (index, current) in nodes.iter().enumerate() {
        if current.id == id {
            let mut next = nodes.to_vec();
            next.remove(index);
            return Some(next);
        }

        if let Some(children) = remove_first(&current.children, id) {
            let mut next = nodes.to_vec();
            next[index].children = children;
            return Some(next);
        }
    }
    None
}
