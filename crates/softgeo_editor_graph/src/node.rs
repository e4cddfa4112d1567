// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node instances placed on the canvas.

use crate::geometry::{Extent, Point, Rect};
use crate::socket::{Socket, SocketDirection};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Smallest size a node can be resized to
pub const MIN_NODE_SIZE: Extent = Extent::new(160.0, 100.0);

/// Size given to nodes whose catalog entry does not specify one
pub const DEFAULT_NODE_SIZE: Extent = Extent::new(240.0, 140.0);

/// Unique identifier for a node.
///
/// Freshly minted ids are simple-format UUIDs, but any string read from a graph
/// file is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Mint a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// The id as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Catalog type tag (e.g. `Extrude`)
    pub node_type: String,
    /// Display title, editable independently of the type
    pub title: String,
    /// Top-left corner on the canvas
    pub position: Point,
    /// Extent on the canvas
    pub size: Extent,
    /// Free-form settings, seeded from the catalog
    pub settings: IndexMap<String, String>,
    /// Input sockets
    pub inputs: Vec<Socket>,
    /// Output sockets
    pub outputs: Vec<Socket>,
    /// Shadow mode flag, mirrored from the graph
    pub shadow_mode: bool,
}

impl Node {
    /// Create a bare node of the given type with a fresh id and no sockets
    pub fn new(node_type: impl Into<String>) -> Self {
        let node_type = node_type.into();
        Self {
            id: NodeId::new(),
            title: node_type.clone(),
            node_type,
            position: Point::ZERO,
            size: DEFAULT_NODE_SIZE,
            settings: IndexMap::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            shadow_mode: false,
        }
    }

    /// Set the position
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Set the size (clamped to [`MIN_NODE_SIZE`])
    pub fn with_size(mut self, size: Extent) -> Self {
        self.size = size.at_least(MIN_NODE_SIZE);
        self
    }

    /// Add a setting
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Canvas-space bounds
    pub fn bounds(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    /// Get an input socket by name
    pub fn input(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Get an output socket by name
    pub fn output(&self, name: &str) -> Option<&Socket> {
        self.outputs.iter().find(|s| s.name == name)
    }

    /// Get a socket by direction and name
    pub fn socket(&self, direction: SocketDirection, name: &str) -> Option<&Socket> {
        match direction {
            SocketDirection::Input => self.input(name),
            SocketDirection::Output => self.output(name),
        }
    }

    /// Setting value by key
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_are_distinct() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn test_size_floor() {
        let node = Node::new("Loft").with_size(Extent::new(20.0, 400.0));
        assert_eq!(node.size, Extent::new(160.0, 400.0));
        assert_eq!(node.title, "Loft");
    }
}
