// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph model for the `SoftGeo` editor.
//!
//! This crate holds the data side of the node canvas:
//! - Nodes with named input/output sockets and free-form settings
//! - Connections from outputs to single-bound inputs
//! - A catalog of node types that seeds new nodes
//! - Deterministic grid layout
//! - The JSON graph file format
//!
//! It has no notion of selection, pointers or history; see `softgeo_editor_core`.

pub mod catalog;
pub mod connection;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod node;
pub mod serializer;
pub mod socket;

pub use catalog::{NodeCatalog, NodeDescriptor};
pub use connection::{Connection, ConnectionId};
pub use geometry::{Extent, Point, Rect};
pub use graph::{Graph, GraphError, RemovedNode};
pub use layout::{apply_grid_layout, GridLayout};
pub use node::{Node, NodeId, MIN_NODE_SIZE};
pub use serializer::{from_text, to_text, DeserializationError};
pub use socket::{Socket, SocketDirection};
