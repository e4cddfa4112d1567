// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node selection set.

use softgeo_editor_graph::{Graph, NodeId};

/// Ordered set of selected node ids; the last one is the primary selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    nodes: Vec<NodeId>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a selection with the given nodes, dropping duplicates
    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut selection = Self::new();
        for id in nodes {
            selection.add(id);
        }
        selection
    }

    /// Check if a node is selected
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Add a node to the selection (idempotent)
    pub fn add(&mut self, id: NodeId) {
        if !self.contains(&id) {
            self.nodes.push(id);
        }
    }

    /// Remove a node from the selection
    pub fn remove(&mut self, id: &NodeId) {
        self.nodes.retain(|n| n != id);
    }

    /// Toggle a node in the selection
    pub fn toggle(&mut self, id: NodeId) {
        if self.contains(&id) {
            self.remove(&id);
        } else {
            self.add(id);
        }
    }

    /// Replace the selection with exactly one node
    pub fn select_only(&mut self, id: NodeId) {
        self.nodes.clear();
        self.nodes.push(id);
    }

    /// Replace the selection with the given nodes
    pub fn replace(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        *self = Self::with_nodes(nodes);
    }

    /// Drop ids that no longer exist in `graph`. Returns whether anything changed.
    pub fn retain_existing(&mut self, graph: &Graph) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|id| graph.contains_node(id));
        before != self.nodes.len()
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Check if the selection is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the number of selected nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over selected nodes in selection order
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    /// Get the primary (last) selected node
    pub fn primary(&self) -> Option<&NodeId> {
        self.nodes.last()
    }

    /// Selected ids as a vector
    pub fn to_vec(&self) -> Vec<NodeId> {
        self.nodes.clone()
    }
}
