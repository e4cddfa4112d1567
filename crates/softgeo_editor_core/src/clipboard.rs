// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node clipboard with identity remapping on paste.
//!
//! Copied nodes are stored by value with the paste offset already applied, so
//! pasting the same clipboard twice lands both copies at the same spot instead
//! of drifting. Every paste mints fresh ids. Connections whose two endpoints were
//! both copied travel along and are rewired between the new nodes. Pasted nodes
//! and connections take the destination graph's shadow flag.

use softgeo_editor_graph::{Connection, Graph, Node, NodeId, Point};
use std::collections::HashMap;

/// Nodes and connections inserted by one paste
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pasted {
    /// New nodes, in clipboard order
    pub nodes: Vec<Node>,
    /// New connections between the pasted nodes
    pub connections: Vec<Connection>,
}

impl Pasted {
    /// Ids of the pasted nodes
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }
}

/// Node clipboard
#[derive(Debug, Clone)]
pub struct Clipboard {
    /// Copied nodes, keyed by the id they had when copied
    nodes: Vec<Node>,
    /// Connections among the copied nodes, still using the copied ids
    connections: Vec<Connection>,
    /// Offset applied at copy time
    offset: Point,
}

impl Clipboard {
    /// Create an empty clipboard
    pub fn new(offset: Point) -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            offset,
        }
    }

    /// Replace the clipboard with deep copies of the given nodes.
    ///
    /// Unknown ids are skipped. Returns the number of nodes copied.
    pub fn copy<'a>(&mut self, graph: &Graph, ids: impl IntoIterator<Item = &'a NodeId>) -> usize {
        self.nodes.clear();
        self.connections.clear();

        for id in ids {
            if self.nodes.iter().any(|n| n.id == *id) {
                continue;
            }
            if let Some(node) = graph.node(id) {
                let mut copy = node.clone();
                copy.position = node.position + self.offset;
                self.nodes.push(copy);
            }
        }

        let copied = |id: &NodeId| self.nodes.iter().any(|n| n.id == *id);
        let connections: Vec<_> = graph
            .connections()
            .filter(|c| copied(&c.source_node) && copied(&c.target_node))
            .cloned()
            .collect();
        self.connections = connections;

        tracing::info!("Copied {} node(s) to clipboard", self.nodes.len());
        self.nodes.len()
    }

    /// Insert a fresh copy of the clipboard into `graph`
    pub fn paste(&self, graph: &mut Graph) -> Pasted {
        let mut pasted = Pasted::default();
        let mut id_map: HashMap<&NodeId, NodeId> = HashMap::new();

        for entry in &self.nodes {
            let mut node = entry.clone();
            node.id = NodeId::new();
            node.shadow_mode = graph.shadow_mode();
            while graph.contains_node(&node.id) {
                node.id = NodeId::new();
            }
            id_map.insert(&entry.id, node.id.clone());

            match graph.insert_node(node) {
                Ok(inserted) => pasted.nodes.push(inserted.clone()),
                Err(e) => tracing::warn!("Skipping clipboard node {}: {e}", entry.id),
            }
        }

        for entry in &self.connections {
            let (Some(source), Some(target)) = (id_map.get(&entry.source_node), id_map.get(&entry.target_node)) else {
                continue;
            };
            let mut connection = Connection::new(
                source.clone(),
                entry.source_output.clone(),
                target.clone(),
                entry.target_input.clone(),
            );
            connection.shadow_mode = graph.shadow_mode();

            match graph.insert_connection(connection) {
                Ok(inserted) => pasted.connections.push(inserted.clone()),
                Err(e) => tracing::warn!("Skipping clipboard connection {}: {e}", entry.id),
            }
        }

        tracing::info!("Pasted {} node(s) from clipboard", pasted.nodes.len());
        pasted
    }

    /// Check if the clipboard is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of copied nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Copied nodes, with the offset applied
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Clear the clipboard
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new(Point::new(20.0, 20.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use softgeo_editor_graph::NodeCatalog;

    #[test]
    fn test_paste_twice_uses_stored_offset() {
        let mut graph = Graph::default();
        let original = graph
            .add_node(&NodeCatalog::builtin(), "Extrude", Some(Point::new(50.0, 50.0)))
            .id
            .clone();

        let mut clipboard = Clipboard::default();
        assert_eq!(clipboard.copy(&graph, [&original]), 1);

        let first = clipboard.paste(&mut graph);
        let second = clipboard.paste(&mut graph);

        assert_eq!(first.nodes[0].position, Point::new(70.0, 70.0));
        assert_eq!(second.nodes[0].position, Point::new(70.0, 70.0));
        assert_ne!(first.nodes[0].id, second.nodes[0].id);
        assert_ne!(first.nodes[0].id, original);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_copy_is_deep() {
        let mut graph = Graph::default();
        let id = graph.add_node(&NodeCatalog::builtin(), "Fillet", None).id.clone();
        let mut clipboard = Clipboard::default();
        clipboard.copy(&graph, [&id]);

        graph.set_setting(&id, "Radius", "9").unwrap();
        let pasted = clipboard.paste(&mut graph);
        assert_eq!(pasted.nodes[0].setting("Radius"), Some("0.25"));
        assert_eq!(pasted.nodes[0].inputs, graph.node(&id).unwrap().inputs);
    }

    #[test]
    fn test_internal_connections_are_remapped() {
        let catalog = NodeCatalog::builtin();
        let mut graph = Graph::default();
        let extrude = graph.add_node(&catalog, "Extrude", None).id.clone();
        let transform = graph.add_node(&catalog, "Transform", None).id.clone();
        let outside = graph.add_node(&catalog, "Boolean", None).id.clone();
        graph.connect(&extrude, "Mesh3D", &transform, "Mesh").unwrap();
        graph.connect(&transform, "Mesh", &outside, "MeshA").unwrap();

        let mut clipboard = Clipboard::default();
        clipboard.copy(&graph, [&extrude, &transform]);
        let pasted = clipboard.paste(&mut graph);

        assert_eq!(pasted.connections.len(), 1);
        let ids = pasted.node_ids();
        let wire = &pasted.connections[0];
        assert_eq!(wire.source_node, ids[0]);
        assert_eq!(wire.target_node, ids[1]);
        assert_eq!(graph.connection_count(), 3);
        assert!(graph.check_invariants().is_ok());
    }

    #[test]
    fn test_paste_follows_destination_shadow_mode() {
        let catalog = NodeCatalog::builtin();
        let mut graph = Graph::default();
        let extrude = graph.add_node(&catalog, "Extrude", None).id.clone();
        let transform = graph.add_node(&catalog, "Transform", None).id.clone();
        graph.connect(&extrude, "Mesh3D", &transform, "Mesh").unwrap();

        let mut clipboard = Clipboard::default();
        clipboard.copy(&graph, [&extrude, &transform]);

        graph.set_shadow_mode(true);
        let pasted = clipboard.paste(&mut graph);
        assert!(pasted.nodes.iter().all(|n| n.shadow_mode));
        assert!(pasted.connections.iter().all(|c| c.shadow_mode));

        graph.set_node_shadow_mode(&extrude, false).unwrap();
        clipboard.copy(&graph, [&extrude]);
        assert!(clipboard.paste(&mut graph).nodes[0].shadow_mode);
    }

    #[test]
    fn test_unknown_and_repeated_ids() {
        let mut graph = Graph::default();
        let id = graph.add_node(&NodeCatalog::builtin(), "Loft", None).id.clone();
        let ghost = NodeId::from("ghost");

        let mut clipboard = Clipboard::default();
        assert_eq!(clipboard.copy(&graph, [&id, &ghost, &id]), 1);

        clipboard.copy(&graph, Vec::<&NodeId>::new());
        assert!(clipboard.is_empty());
        assert_eq!(clipboard.paste(&mut graph), Pasted::default());
    }
}
