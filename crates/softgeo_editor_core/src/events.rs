// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mutation notifications for the presentation layer.
//!
//! The editor emits exactly one [`EditorEvent`] per committed command, carrying
//! enough data to update a view without re-reading the whole graph. Drag,
//! resize and marquee previews are emitted as well but never correspond to a
//! history entry.

use softgeo_editor_graph::{Connection, ConnectionId, Extent, Graph, Node, NodeId, Point, Rect};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A change the presentation layer should reflect
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A node was created
    NodeAdded {
        /// The new node
        node: Node,
    },
    /// Nodes were deleted along with their connections
    NodesRemoved {
        /// Deleted node ids
        nodes: Vec<NodeId>,
        /// Connections removed as a side effect
        connections: Vec<ConnectionId>,
    },
    /// Nodes were moved
    NodesMoved {
        /// New positions
        positions: Vec<(NodeId, Point)>,
        /// Whether positions were snapped to the grid
        snapped: bool,
    },
    /// A node was resized
    NodeResized {
        /// Resized node
        node: NodeId,
        /// Applied size
        size: Extent,
    },
    /// Title, settings or shadow flag of a node changed
    NodeUpdated {
        /// The node after the change
        node: Node,
    },
    /// A connection was created
    ConnectionAdded {
        /// The new connection
        connection: Connection,
    },
    /// A connection was removed
    ConnectionRemoved {
        /// Removed connection id
        connection: ConnectionId,
    },
    /// Clipboard contents were copied to the clipboard
    NodesCopied {
        /// Number of copied nodes
        count: usize,
    },
    /// Clipboard contents were inserted
    NodesPasted {
        /// Inserted nodes
        nodes: Vec<Node>,
        /// Inserted connections
        connections: Vec<Connection>,
    },
    /// Auto-layout re-placed every node
    LayoutApplied {
        /// New positions in node order
        positions: Vec<(NodeId, Point)>,
    },
    /// The selection changed
    SelectionChanged {
        /// Selected ids, primary last
        selected: Vec<NodeId>,
    },
    /// Graph-level shadow mode changed
    ShadowModeToggled {
        /// New state
        enabled: bool,
    },
    /// The graph was replaced by an undo snapshot
    UndoPerformed {
        /// Description of the undone command
        description: String,
        /// Graph now active
        graph: Graph,
    },
    /// The graph was replaced by a redo snapshot
    RedoPerformed {
        /// Description of the redone command
        description: String,
        /// Graph now active
        graph: Graph,
    },
    /// The graph was replaced by a loaded one
    GraphLoaded {
        /// Where it came from
        source: String,
        /// Graph now active
        graph: Graph,
    },
    /// The graph was written to storage
    GraphSaved {
        /// Destination
        path: String,
    },
    /// Reading or writing storage failed; the active graph is unchanged
    StorageFailed {
        /// Path involved
        path: String,
        /// Error description
        message: String,
    },
    /// Dragged nodes moved (preview, not committed)
    DragPreview {
        /// Current positions
        positions: Vec<(NodeId, Point)>,
    },
    /// Node being resized changed size (preview, not committed)
    ResizePreview {
        /// Node
        node: NodeId,
        /// Current size
        size: Extent,
    },
    /// Marquee rectangle changed
    MarqueePreview {
        /// Current rectangle
        rect: Rect,
    },
}

impl EditorEvent {
    /// One-line, human-readable description for log panels
    pub fn summary(&self) -> String {
        match self {
            Self::NodeAdded { node } => format!(
                "Added {} node at ({:.0}, {:.0})",
                node.node_type, node.position.x, node.position.y
            ),
            Self::NodesRemoved { nodes, connections } => format!(
                "Deleted {} node(s) and {} connection(s)",
                nodes.len(),
                connections.len()
            ),
            Self::NodesMoved { positions, snapped: true } => {
                format!("Moved {} node(s) with snapping", positions.len())
            }
            Self::NodesMoved { positions, snapped: false } => format!("Moved {} node(s)", positions.len()),
            Self::NodeResized { size, .. } => format!("Resized node to {:.0}x{:.0}", size.width, size.height),
            Self::NodeUpdated { node } => format!("Updated {} properties", node.title),
            Self::ConnectionAdded { connection } => format!(
                "Connected {} -> {}",
                connection.source_output, connection.target_input
            ),
            Self::ConnectionRemoved { .. } => "Removed connection".to_string(),
            Self::NodesCopied { count } => format!("Copied {count} node(s)"),
            Self::NodesPasted { nodes, .. } => format!("Pasted {} node(s)", nodes.len()),
            Self::LayoutApplied { positions } => format!("Arranged {} node(s) on the grid", positions.len()),
            Self::SelectionChanged { selected } => format!("Selected {} node(s)", selected.len()),
            Self::ShadowModeToggled { enabled } => {
                format!("Shadow Mode: {}", if *enabled { "ON" } else { "OFF" })
            }
            Self::UndoPerformed { .. } => "Undo performed".to_string(),
            Self::RedoPerformed { .. } => "Redo performed".to_string(),
            Self::GraphLoaded { source, .. } => format!("Graph loaded from {source}"),
            Self::GraphSaved { path } => format!("Graph saved to {path}"),
            Self::StorageFailed { path, message } => format!("Storage error on {path}: {message}"),
            Self::DragPreview { positions } => format!("Dragging {} node(s)", positions.len()),
            Self::ResizePreview { size, .. } => format!("Resizing to {:.0}x{:.0}", size.width, size.height),
            Self::MarqueePreview { .. } => "Selecting".to_string(),
        }
    }

    /// Whether this is a transient preview rather than a committed change
    pub fn is_preview(&self) -> bool {
        matches!(
            self,
            Self::DragPreview { .. } | Self::ResizePreview { .. } | Self::MarqueePreview { .. }
        )
    }
}

/// Receiver of editor events
pub trait EventSink {
    /// Handle one event
    fn notify(&mut self, event: &EditorEvent);
}

/// Discards every event
impl EventSink for () {
    fn notify(&mut self, _event: &EditorEvent) {}
}

/// Forwards events over a channel; a dropped receiver is ignored
impl EventSink for mpsc::Sender<EditorEvent> {
    fn notify(&mut self, event: &EditorEvent) {
        let _ = self.send(event.clone());
    }
}

/// Shared sink, so the host can keep reading what the editor recorded
impl<S: EventSink> EventSink for Rc<RefCell<S>> {
    fn notify(&mut self, event: &EditorEvent) {
        self.borrow_mut().notify(event);
    }
}

/// A recorded event
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u128,
    /// The event
    pub event: EditorEvent,
}

/// Bounded in-memory event recorder, oldest entries dropped first
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    include_previews: bool,
}

impl EventLog {
    /// Create a log holding at most `capacity` committed events
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            include_previews: false,
        }
    }

    /// Also record preview events
    pub fn with_previews(mut self) -> Self {
        self.include_previews = true;
        self
    }

    /// Recorded entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Recorded summaries, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.event.summary()).collect()
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl EventSink for EventLog {
    fn notify(&mut self, event: &EditorEvent) {
        if self.capacity == 0 || (event.is_preview() && !self.include_previews) {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            event: event.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_is_bounded() {
        let mut log = EventLog::new(2);
        for enabled in [true, false, true] {
            log.notify(&EditorEvent::ShadowModeToggled { enabled });
        }
        assert_eq!(log.messages(), ["Shadow Mode: OFF", "Shadow Mode: ON"]);
    }

    #[test]
    fn test_previews_are_skipped_by_default() {
        let mut log = EventLog::new(10);
        log.notify(&EditorEvent::MarqueePreview { rect: Rect::default() });
        assert!(log.is_empty());

        let mut log = EventLog::new(10).with_previews();
        log.notify(&EditorEvent::MarqueePreview { rect: Rect::default() });
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_channel_sink() {
        let (mut tx, rx) = mpsc::channel();
        tx.notify(&EditorEvent::GraphSaved { path: "a.json".into() });
        assert_eq!(rx.try_recv().unwrap().summary(), "Graph saved to a.json");

        drop(rx);
        tx.notify(&EditorEvent::GraphSaved { path: "b.json".into() });
    }

    #[test]
    fn test_summaries() {
        let node = Node::new("Extrude").with_position(Point::new(20.0, 80.0));
        assert_eq!(EditorEvent::NodeAdded { node }.summary(), "Added Extrude node at (20, 80)");
        assert_eq!(
            EditorEvent::NodesMoved { positions: vec![], snapped: true }.summary(),
            "Moved 0 node(s) with snapping"
        );
    }
}
