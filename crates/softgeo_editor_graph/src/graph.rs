// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! [`Graph`] is the only owner of its nodes and connections. Every mutation goes
//! through a method here, and each method either leaves the graph consistent or
//! rejects the request without touching it:
//!
//! - node and connection ids are unique,
//! - every connection endpoint names an existing node and socket,
//! - an input socket is the target of at most one connection.

use crate::catalog::NodeCatalog;
use crate::connection::{Connection, ConnectionId};
use crate::geometry::{Extent, Point};
use crate::node::{Node, NodeId, MIN_NODE_SIZE};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Name given to new graphs
pub const DEFAULT_GRAPH_NAME: &str = "Untitled Graph";

/// Version tag given to new graphs
pub const DEFAULT_GRAPH_VERSION: &str = "0.1";

/// A node graph
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Opaque version tag
    pub version: String,
    /// Graph-level shadow mode, mirrored onto every node
    shadow_mode: bool,
    /// Nodes in z-order (last is topmost)
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
}

/// A node removed from the graph together with the connections it took along
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    /// The removed node
    pub node: Node,
    /// Connections that referenced it
    pub connections: Vec<Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: DEFAULT_GRAPH_VERSION.to_string(),
            shadow_mode: false,
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Position used for the `n`-th node added without an explicit position
    pub fn cascade_position(n: usize) -> Point {
        let n = n as f32;
        Point::new(20.0 + 30.0 * n, 80.0 + 20.0 * n)
    }

    /// Create a node from the catalog and append it on top.
    ///
    /// Without a position the node lands on a cascade offset derived from the
    /// current node count, so repeated calls don't stack exactly.
    pub fn add_node(
        &mut self,
        catalog: &NodeCatalog,
        node_type: &str,
        position: Option<Point>,
    ) -> &Node {
        let position = position.unwrap_or_else(|| Self::cascade_position(self.nodes.len()));
        let mut node = catalog.create_node(node_type).with_position(position);
        node.shadow_mode = self.shadow_mode;

        // Fresh uuids; a collision would mean a broken generator.
        while self.nodes.contains_key(&node.id) {
            node.id = NodeId::new();
        }

        let id = node.id.clone();
        tracing::debug!("Adding {} node {} at ({}, {})", node_type, id, position.x, position.y);
        self.nodes.entry(id).or_insert(node)
    }

    /// Insert a fully built node on top. Fails if its id is already taken.
    pub fn insert_node(&mut self, node: Node) -> Result<&Node, GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateId(node.id.to_string()));
        }
        let id = node.id.clone();
        Ok(self.nodes.entry(id).or_insert(node))
    }

    /// Remove a node and every connection referencing it.
    ///
    /// Absent ids are a no-op, so this is safe to call twice.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<RemovedNode> {
        let node = self.nodes.shift_remove(node_id)?;

        let mut connections = Vec::new();
        self.connections.retain(|_, c| {
            if c.involves_node(node_id) {
                connections.push(c.clone());
                false
            } else {
                true
            }
        });

        tracing::debug!(
            "Removed node {} and {} connection(s)",
            node_id,
            connections.len()
        );
        Some(RemovedNode { node, connections })
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    fn node_entry(&mut self, node_id: &NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NotFound(node_id.clone()))
    }

    /// Whether the node exists
    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Get all nodes in z-order
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs in z-order
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Move a node
    pub fn move_node(&mut self, node_id: &NodeId, position: Point) -> Result<(), GraphError> {
        self.node_entry(node_id)?.position = position;
        Ok(())
    }

    /// Resize a node, clamped to [`MIN_NODE_SIZE`]. Returns the applied size.
    pub fn resize_node(&mut self, node_id: &NodeId, size: Extent) -> Result<Extent, GraphError> {
        let node = self.node_entry(node_id)?;
        node.size = size.at_least(MIN_NODE_SIZE);
        Ok(node.size)
    }

    /// Set a setting value. Keys need not come from the catalog.
    ///
    /// Returns the previous value, if any.
    pub fn set_setting(
        &mut self,
        node_id: &NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, GraphError> {
        Ok(self.node_entry(node_id)?.settings.insert(key.into(), value.into()))
    }

    /// Change a node's display title
    pub fn rename_title(&mut self, node_id: &NodeId, title: impl Into<String>) -> Result<(), GraphError> {
        self.node_entry(node_id)?.title = title.into();
        Ok(())
    }

    /// Set the shadow flag of a single node
    pub fn set_node_shadow_mode(&mut self, node_id: &NodeId, enabled: bool) -> Result<(), GraphError> {
        self.node_entry(node_id)?.shadow_mode = enabled;
        Ok(())
    }

    /// Graph-level shadow flag
    pub fn shadow_mode(&self) -> bool {
        self.shadow_mode
    }

    /// Set the graph-level shadow flag and mirror it onto every node and connection
    pub fn set_shadow_mode(&mut self, enabled: bool) {
        self.shadow_mode = enabled;
        for node in self.nodes.values_mut() {
            node.shadow_mode = enabled;
        }
        for connection in self.connections.values_mut() {
            connection.shadow_mode = enabled;
        }
    }

    /// Restore the graph-level flag without touching nodes, for loaders
    pub(crate) fn restore_shadow_flag(&mut self, enabled: bool) {
        self.shadow_mode = enabled;
    }

    /// Connect an output socket to an input socket.
    ///
    /// An input accepts a single connection; binding it again fails with
    /// [`GraphError::InputAlreadyBound`] until the existing one is disconnected.
    pub fn connect(
        &mut self,
        source_node: &NodeId,
        source_output: &str,
        target_node: &NodeId,
        target_input: &str,
    ) -> Result<&Connection, GraphError> {
        let mut connection = Connection::new(
            source_node.clone(),
            source_output,
            target_node.clone(),
            target_input,
        );
        connection.shadow_mode = self.shadow_mode;
        while self.connections.contains_key(&connection.id) {
            connection.id = ConnectionId::new();
        }
        self.insert_connection(connection)
    }

    /// Insert a fully built connection after validating its endpoints
    pub fn insert_connection(&mut self, connection: Connection) -> Result<&Connection, GraphError> {
        if self.connections.contains_key(&connection.id) {
            return Err(GraphError::DuplicateId(connection.id.to_string()));
        }
        self.validate_endpoints(&connection)?;
        if self.is_input_connected(&connection.target_node, &connection.target_input) {
            return Err(GraphError::InputAlreadyBound {
                node: connection.target_node.clone(),
                input: connection.target_input.clone(),
            });
        }

        let id = connection.id.clone();
        tracing::debug!(
            "Connected {}.{} -> {}.{}",
            connection.source_node,
            connection.source_output,
            connection.target_node,
            connection.target_input
        );
        Ok(self.connections.entry(id).or_insert(connection))
    }

    fn validate_endpoints(&self, connection: &Connection) -> Result<(), GraphError> {
        let source = self.nodes.get(&connection.source_node).ok_or_else(|| {
            GraphError::InvalidReference(format!("source node {} does not exist", connection.source_node))
        })?;
        if source.output(&connection.source_output).is_none() {
            return Err(GraphError::InvalidReference(format!(
                "node {} has no output '{}'",
                connection.source_node, connection.source_output
            )));
        }

        let target = self.nodes.get(&connection.target_node).ok_or_else(|| {
            GraphError::InvalidReference(format!("target node {} does not exist", connection.target_node))
        })?;
        if target.input(&connection.target_input).is_none() {
            return Err(GraphError::InvalidReference(format!(
                "node {} has no input '{}'",
                connection.target_node, connection.target_input
            )));
        }
        Ok(())
    }

    /// Remove a connection. Absent ids are a no-op.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections involving a node
    pub fn connections_for_node<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The connection feeding an input, if any
    pub fn input_source(&self, node_id: &NodeId, input: &str) -> Option<&Connection> {
        self.connections.values().find(|c| c.targets(node_id, input))
    }

    /// Whether an input socket is bound
    pub fn is_input_connected(&self, node_id: &NodeId, input: &str) -> bool {
        self.input_source(node_id, input).is_some()
    }

    /// Whether an output socket feeds at least one connection
    pub fn is_output_connected(&self, node_id: &NodeId, output: &str) -> bool {
        self.connections.values().any(|c| c.sources(node_id, output))
    }

    /// Verify the structural invariants, describing the first violation found
    pub fn check_invariants(&self) -> Result<(), String> {
        for (id, node) in &self.nodes {
            if *id != node.id {
                return Err(format!("node keyed as {id} carries id {}", node.id));
            }
            let mut names = HashSet::new();
            if let Some(dup) = node.inputs.iter().find(|s| !names.insert(&s.name)) {
                return Err(format!("node {id} declares input '{}' twice", dup.name));
            }
            names.clear();
            if let Some(dup) = node.outputs.iter().find(|s| !names.insert(&s.name)) {
                return Err(format!("node {id} declares output '{}' twice", dup.name));
            }
        }

        let mut bound_inputs = HashSet::new();
        for (id, connection) in &self.connections {
            if *id != connection.id {
                return Err(format!("connection keyed as {id} carries id {}", connection.id));
            }
            self.validate_endpoints(connection).map_err(|e| e.to_string())?;
            if !bound_inputs.insert((&connection.target_node, &connection.target_input)) {
                return Err(format!(
                    "input {}.{} is bound more than once",
                    connection.target_node, connection.target_input
                ));
            }
        }
        Ok(())
    }

    /// Mutable access for sibling modules that rewrite positions in bulk
    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(DEFAULT_GRAPH_NAME)
    }
}

/// Error when editing a graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    /// Connection endpoint does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Target input already has a connection
    #[error("Input {node}.{input} is already connected")]
    InputAlreadyBound {
        /// Target node
        node: NodeId,
        /// Target input name
        input: String,
    },

    /// Id already present in the graph
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
}
