// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node catalog: per-type defaults used when a node is created.
//!
//! Adding a node type is a matter of registering a [`NodeDescriptor`]; node
//! creation itself never branches on the type tag.

use crate::geometry::Extent;
use crate::node::{Node, DEFAULT_NODE_SIZE};
use crate::socket::Socket;
use indexmap::IndexMap;
use std::borrow::Cow;

/// Default descriptor for a node type
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    /// Type tag
    pub node_type: String,
    /// Short description shown in palettes
    pub description: String,
    /// Default input sockets
    pub inputs: Vec<Socket>,
    /// Default output sockets
    pub outputs: Vec<Socket>,
    /// Default settings
    pub settings: IndexMap<String, String>,
    /// Default size
    pub size: Extent,
}

impl NodeDescriptor {
    /// Descriptor with no sockets or settings, used for unknown types
    pub fn empty(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            settings: IndexMap::new(),
            size: DEFAULT_NODE_SIZE,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append an input socket
    pub fn with_input(mut self, socket: Socket) -> Self {
        self.inputs.push(socket);
        self
    }

    /// Append an output socket
    pub fn with_output(mut self, socket: Socket) -> Self {
        self.outputs.push(socket);
        self
    }

    /// Add a default setting
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Build a node instance with a fresh id from this descriptor
    pub fn instantiate(&self) -> Node {
        Node {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            settings: self.settings.clone(),
            size: self.size,
            ..Node::new(self.node_type.clone())
        }
    }
}

/// Registry of known node types
#[derive(Debug, Clone, Default)]
pub struct NodeCatalog {
    /// Registered descriptors by type tag, in registration order
    types: IndexMap<String, NodeDescriptor>,
}

impl NodeCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in geometry operations
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        catalog.register(
            NodeDescriptor::empty("Extrude")
                .with_description("Extrude a closed polyline into a solid")
                .with_input(Socket::new("Polyline2D", "Polyline2D"))
                .with_output(Socket::new("Mesh3D", "Mesh3D"))
                .with_setting("Height", "1.0")
                .with_setting("Polyline", "Rectangle"),
        );

        catalog.register(
            NodeDescriptor::empty("Loft")
                .with_description("Loft a surface through two profiles")
                .with_input(Socket::new("Profile1", "Polyline2D"))
                .with_input(Socket::new("Profile2", "Polyline2D"))
                .with_output(Socket::new("Surface", "Surface")),
        );

        catalog.register(
            NodeDescriptor::empty("Boolean")
                .with_description("Combine two meshes")
                .with_input(Socket::new("MeshA", "Mesh3D"))
                .with_input(Socket::new("MeshB", "Mesh3D"))
                .with_output(Socket::new("Result", "Mesh3D"))
                .with_setting("Operation", "Union"),
        );

        catalog.register(
            NodeDescriptor::empty("Transform")
                .with_description("Translate a mesh")
                .with_input(Socket::new("Mesh", "Mesh3D"))
                .with_output(Socket::new("Mesh", "Mesh3D"))
                .with_setting("Translate", "0,0,0"),
        );

        catalog.register(
            NodeDescriptor::empty("Fillet")
                .with_description("Round the corners of a polyline")
                .with_input(Socket::new("Polyline2D", "Polyline2D"))
                .with_output(Socket::new("Polyline2D", "Polyline2D"))
                .with_setting("Radius", "0.25"),
        );

        catalog
    }

    /// Register a node type, replacing any previous descriptor for the same tag
    pub fn register(&mut self, descriptor: NodeDescriptor) {
        self.types.insert(descriptor.node_type.clone(), descriptor);
    }

    /// Get a registered descriptor
    pub fn get(&self, node_type: &str) -> Option<&NodeDescriptor> {
        self.types.get(node_type)
    }

    /// Describe a type. Unknown types get an empty descriptor instead of an error.
    pub fn describe(&self, node_type: &str) -> Cow<'_, NodeDescriptor> {
        match self.types.get(node_type) {
            Some(descriptor) => Cow::Borrowed(descriptor),
            None => Cow::Owned(NodeDescriptor::empty(node_type)),
        }
    }

    /// Whether the type is registered
    pub fn contains(&self, node_type: &str) -> bool {
        self.types.contains_key(node_type)
    }

    /// All registered descriptors
    pub fn types(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.types.values()
    }

    /// Create a node of the given type with a fresh id
    pub fn create_node(&self, node_type: &str) -> Node {
        self.describe(node_type).instantiate()
    }
}
