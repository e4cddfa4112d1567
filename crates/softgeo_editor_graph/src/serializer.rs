// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON graph file format.
//!
//! Field names are camelCase and fixed. `isConnected` is written from the current
//! connection set and ignored on read, since it is always derivable. Loading is
//! all-or-nothing: a file that parses but describes an inconsistent graph is
//! rejected rather than partially applied.

use crate::connection::{Connection, ConnectionId};
use crate::geometry::{Extent, Point};
use crate::graph::{Graph, DEFAULT_GRAPH_NAME, DEFAULT_GRAPH_VERSION};
use crate::node::{Node, NodeId, DEFAULT_NODE_SIZE};
use crate::socket::Socket;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphFile {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    is_shadow_mode: bool,
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    id: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    title: Option<String>,
    position: Point,
    #[serde(default = "default_size")]
    size: Extent,
    #[serde(default)]
    settings: IndexMap<String, String>,
    #[serde(default)]
    is_shadow_mode: bool,
    #[serde(default)]
    inputs: Vec<SocketRecord>,
    #[serde(default)]
    outputs: Vec<SocketRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocketRecord {
    name: String,
    #[serde(rename = "type")]
    data_kind: String,
    #[serde(default)]
    is_connected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionRecord {
    id: String,
    source_node_id: String,
    source_output: String,
    target_node_id: String,
    target_input: String,
    #[serde(default)]
    is_shadow_mode: bool,
}

fn default_name() -> String {
    DEFAULT_GRAPH_NAME.to_string()
}

fn default_version() -> String {
    DEFAULT_GRAPH_VERSION.to_string()
}

fn default_size() -> Extent {
    DEFAULT_NODE_SIZE
}

/// Error when reading a graph file
#[derive(Debug, thiserror::Error)]
pub enum DeserializationError {
    /// Text is not valid JSON or does not match the schema
    #[error("Malformed graph file: {0}")]
    Parse(#[from] serde_json::Error),

    /// File parses but describes an inconsistent graph
    #[error("Inconsistent graph file: {0}")]
    Inconsistent(String),
}

fn socket_records(sockets: &[Socket], connected: impl Fn(&str) -> bool) -> Vec<SocketRecord> {
    sockets
        .iter()
        .map(|s| SocketRecord {
            name: s.name.clone(),
            data_kind: s.data_kind.clone(),
            is_connected: connected(&s.name),
        })
        .collect()
}

impl From<&Graph> for GraphFile {
    fn from(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| NodeRecord {
                id: node.id.to_string(),
                node_type: node.node_type.clone(),
                title: Some(node.title.clone()),
                position: node.position,
                size: node.size,
                settings: node.settings.clone(),
                is_shadow_mode: node.shadow_mode,
                inputs: socket_records(&node.inputs, |name| graph.is_input_connected(&node.id, name)),
                outputs: socket_records(&node.outputs, |name| graph.is_output_connected(&node.id, name)),
            })
            .collect();

        let connections = graph
            .connections()
            .map(|c| ConnectionRecord {
                id: c.id.to_string(),
                source_node_id: c.source_node.to_string(),
                source_output: c.source_output.clone(),
                target_node_id: c.target_node.to_string(),
                target_input: c.target_input.clone(),
                is_shadow_mode: c.shadow_mode,
            })
            .collect();

        Self {
            name: graph.name.clone(),
            version: graph.version.clone(),
            is_shadow_mode: graph.shadow_mode(),
            nodes,
            connections,
        }
    }
}

impl TryFrom<GraphFile> for Graph {
    type Error = DeserializationError;

    fn try_from(file: GraphFile) -> Result<Self, Self::Error> {
        let mut graph = Graph::new(file.name);
        graph.version = file.version;
        // Per-node flags are kept as stored, so don't cascade here.
        graph.restore_shadow_flag(file.is_shadow_mode);

        for record in file.nodes {
            let coordinates = [record.position.x, record.position.y, record.size.width, record.size.height];
            if !coordinates.into_iter().all(f32::is_finite) {
                return Err(DeserializationError::Inconsistent(format!(
                    "node {} has a position or size outside the representable range",
                    record.id
                )));
            }

            let node = Node {
                id: NodeId::from(record.id),
                title: record.title.unwrap_or_else(|| record.node_type.clone()),
                node_type: record.node_type,
                position: record.position,
                size: record.size,
                settings: record.settings,
                inputs: record.inputs.into_iter().map(|s| Socket::new(s.name, s.data_kind)).collect(),
                outputs: record.outputs.into_iter().map(|s| Socket::new(s.name, s.data_kind)).collect(),
                shadow_mode: record.is_shadow_mode,
            };
            graph
                .insert_node(node)
                .map_err(|e| DeserializationError::Inconsistent(e.to_string()))?;
        }

        for record in file.connections {
            let connection = Connection {
                id: ConnectionId::from(record.id),
                source_node: NodeId::from(record.source_node_id),
                source_output: record.source_output,
                target_node: NodeId::from(record.target_node_id),
                target_input: record.target_input,
                shadow_mode: record.is_shadow_mode,
            };
            graph
                .insert_connection(connection)
                .map_err(|e| DeserializationError::Inconsistent(e.to_string()))?;
        }

        graph.check_invariants().map_err(DeserializationError::Inconsistent)?;
        Ok(graph)
    }
}

/// Serialize a graph to pretty-printed JSON
pub fn to_text(graph: &Graph) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&GraphFile::from(graph))
}

/// Parse a graph from JSON
pub fn from_text(text: &str) -> Result<Graph, DeserializationError> {
    let file: GraphFile = serde_json::from_str(text)?;
    let graph = Graph::try_from(file)?;
    tracing::debug!(
        "Parsed graph '{}' with {} node(s) and {} connection(s)",
        graph.name,
        graph.node_count(),
        graph.connection_count()
    );
    Ok(graph)
}
