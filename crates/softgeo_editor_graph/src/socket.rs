// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.
//!
//! Sockets only carry a name and a data-kind tag. Whether a socket is connected is
//! derived from the graph's connection set, see [`crate::Graph::is_input_connected`].

use serde::{Deserialize, Serialize};

/// Data kind assigned to inputs that don't declare one
pub const DEFAULT_INPUT_KIND: &str = "geometry";

/// Data kind assigned to outputs that don't declare one
pub const DEFAULT_OUTPUT_KIND: &str = "mesh";

/// Socket direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketDirection {
    /// Input socket
    Input,
    /// Output socket
    Output,
}

/// A named slot on a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Socket {
    /// Name, unique within its node and direction
    pub name: String,
    /// Data kind tag (e.g. `Polyline2D`), used for display only
    pub data_kind: String,
}

impl Socket {
    /// Create a socket with an explicit data kind
    pub fn new(name: impl Into<String>, data_kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_kind: data_kind.into(),
        }
    }

    /// Create an input socket with the default data kind
    pub fn input(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_INPUT_KIND)
    }

    /// Create an output socket with the default data kind
    pub fn output(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_OUTPUT_KIND)
    }

    /// Display color for this socket's data kind
    pub fn color(&self) -> [u8; 3] {
        match self.data_kind.as_str() {
            "Polyline2D" => [80, 200, 200],
            "Mesh3D" | "mesh" => [200, 100, 200],
            "Surface" => [200, 200, 80],
            "geometry" => [80, 200, 80],
            _ => [150, 150, 150],
        }
    }
}
