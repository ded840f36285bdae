//! In-memory snapshot of the category containment graph

use std::collections::{HashMap, HashSet};

use crate::domain::identifiers::DocumentId;
use crate::domain::repository::CategoryNode;

/// Parent to children adjacency built from one snapshot. Both sides are normalized.
#[derive(Debug, Clone, Default)]
pub struct CategoryGraph {
    edges: HashMap<DocumentId, Vec<DocumentId>>,
}

impl CategoryGraph {
    /// Build the adjacency map.
    ///
    /// A draft and its published twin collapse onto the same node; their
    /// children are merged so edges from either version are followed.
    pub fn from_nodes(nodes: impl IntoIterator<Item = CategoryNode>) -> Self {
        let mut edges: HashMap<DocumentId, Vec<DocumentId>> = HashMap::new();

        for node in nodes {
            let Some(id) = DocumentId::normalize(&node.id) else {
                continue;
            };
            let children = edges.entry(id).or_default();
            for child in node
                .sub_categories
                .iter()
                .flatten()
                .filter_map(|raw| DocumentId::normalize(raw))
            {
                if !children.contains(&child) {
                    children.push(child);
                }
            }
        }

        Self { edges }
    }

    /// Number of categories in the snapshot
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Stored children of a category. Dangling ids have none.
    pub fn children(&self, id: &DocumentId) -> &[DocumentId] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `target` can be reached from `start` by following at least one edge.
    pub fn reaches(&self, start: &DocumentId, target: &DocumentId) -> bool {
        let mut stack: Vec<&DocumentId> = self.children(start).iter().collect();
        let mut visited: HashSet<&DocumentId> = HashSet::new();

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.children(current).iter());
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> DocumentId {
        DocumentId::normalize(raw).unwrap()
    }

    #[test]
    fn test_reaches_follows_edges_transitively() {
        let graph = CategoryGraph::from_nodes(vec![
            CategoryNode::new("a", ["b"]),
            CategoryNode::new("b", ["c"]),
            CategoryNode::new("c", Vec::<String>::new()),
        ]);

        assert!(graph.reaches(&id("a"), &id("c")));
        assert!(!graph.reaches(&id("c"), &id("a")));
        // start itself is not counted without an edge back to it
        assert!(!graph.reaches(&id("a"), &id("a")));
    }

    #[test]
    fn test_existing_cycle_terminates() {
        let graph = CategoryGraph::from_nodes(vec![
            CategoryNode::new("x", ["y"]),
            CategoryNode::new("y", ["x"]),
        ]);

        assert!(!graph.reaches(&id("x"), &id("z")));
        assert!(graph.reaches(&id("x"), &id("x")));
    }

    #[test]
    fn test_dangling_references_have_no_children() {
        let graph = CategoryGraph::from_nodes(vec![CategoryNode::new("a", ["ghost"])]);
        assert!(graph.children(&id("ghost")).is_empty());
        assert!(!graph.reaches(&id("ghost"), &id("a")));
    }

    #[test]
    fn test_draft_and_published_merge() {
        let graph = CategoryGraph::from_nodes(vec![
            CategoryNode::new("drafts.a", ["drafts.b"]),
            CategoryNode::new("a", ["c"]),
            CategoryNode {
                id: "drafts.".to_string(),
                sub_categories: vec![Some("a".to_string())],
            },
        ]);

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.children(&id("a")), &[id("b"), id("c")]);
    }
}
