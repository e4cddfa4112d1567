// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Mint a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// The id as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed edge from an output socket to an input socket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub source_node: NodeId,
    /// Source output socket name
    pub source_output: String,
    /// Target node ID
    pub target_node: NodeId,
    /// Target input socket name
    pub target_input: String,
    /// Shadow mode flag
    pub shadow_mode: bool,
}

impl Connection {
    /// Create a new connection with a fresh id
    pub fn new(
        source_node: NodeId,
        source_output: impl Into<String>,
        target_node: NodeId,
        target_input: impl Into<String>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            source_node,
            source_output: source_output.into(),
            target_node,
            target_input: target_input.into(),
            shadow_mode: false,
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: &NodeId) -> bool {
        self.source_node == *node_id || self.target_node == *node_id
    }

    /// Check if this connection feeds the given input
    pub fn targets(&self, node_id: &NodeId, input: &str) -> bool {
        self.target_node == *node_id && self.target_input == input
    }

    /// Check if this connection is sourced from the given output
    pub fn sources(&self, node_id: &NodeId, output: &str) -> bool {
        self.source_node == *node_id && self.source_output == output
    }
}
