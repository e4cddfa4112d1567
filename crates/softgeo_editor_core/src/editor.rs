// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editing engine facade.
//!
//! [`Editor`] owns the graph and routes every mutating command through a
//! history bracket: snapshot, mutate, verify invariants, commit, notify.
//! Commands that fail or change nothing leave history untouched and emit no
//! event.
//!
//! Drags and resizes open their bracket on pointer-down and close it on
//! pointer-up (or cancellation), so a whole gesture is a single undo step. Any
//! other command issued mid-gesture ends the gesture first.

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::events::{EditorEvent, EventLog, EventSink};
use crate::history::{Checkpoint, History, HistoryError};
use crate::interaction::{InteractionController, InteractionMode, Modifiers, PointerOutcome};
use crate::selection::Selection;
use crate::storage::{Storage, StorageError};
use softgeo_editor_graph::{
    from_text, to_text, Connection, ConnectionId, DeserializationError, Extent, Graph, GraphError, Node,
    NodeCatalog, NodeId, Point, RemovedNode, MIN_NODE_SIZE,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Node type placed by [`Editor::seed_default`]
pub const SEED_NODE_TYPE: &str = "Extrude";

/// Where [`Editor::seed_default`] places its node
pub const SEED_NODE_POSITION: Point = Point::new(220.0, 140.0);

/// Errors surfaced by editor commands
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The graph rejected the command
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A document could not be parsed
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    /// The graph could not be written as text
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The storage collaborator failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Undo or redo had nothing to do
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Result type for editor commands
pub type Result<T> = std::result::Result<T, EditorError>;

/// Headless node-graph editor
pub struct Editor {
    graph: Graph,
    catalog: NodeCatalog,
    history: History,
    selection: Selection,
    controller: InteractionController,
    clipboard: Clipboard,
    config: EditorConfig,
    sink: Box<dyn EventSink>,
    /// Bracket opened by the gesture in progress
    gesture: Option<Checkpoint>,
    document_path: Option<PathBuf>,
    dirty: bool,
}

impl Editor {
    /// Create an editor with the default configuration and built-in node types
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Create an editor with the given configuration
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            graph: Graph::default(),
            catalog: NodeCatalog::builtin(),
            history: History::with_max_depth(config.history_depth),
            selection: Selection::new(),
            controller: InteractionController::new(config.snap_size, config.resize_grip),
            clipboard: Clipboard::new(config.clipboard_offset),
            sink: Box::new(()),
            gesture: None,
            document_path: None,
            dirty: false,
            config,
        }
    }

    /// Send events to `sink` instead of discarding them
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Record events into an [`EventLog`] sized by `event_log_capacity`.
    ///
    /// Returns the shared log so the host can read it back.
    pub fn with_event_log(mut self) -> (Self, Rc<RefCell<EventLog>>) {
        let log = Rc::new(RefCell::new(EventLog::new(self.config.event_log_capacity)));
        self.sink = Box::new(Rc::clone(&log));
        (self, log)
    }

    /// Replace the node catalog
    pub fn with_catalog(mut self, catalog: NodeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// The active graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Node types available for creation
    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    /// Mutable catalog, for registering extra node types
    pub fn catalog_mut(&mut self) -> &mut NodeCatalog {
        &mut self.catalog
    }

    /// Currently selected nodes
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Undo/redo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Clipboard contents
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Active configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Gesture in progress
    pub fn interaction(&self) -> &InteractionMode {
        self.controller.mode()
    }

    /// Whether the graph changed since it was last saved or loaded
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Path of the last saved or loaded document
    pub fn document_path(&self) -> Option<&Path> {
        self.document_path.as_deref()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn emit(&mut self, event: EditorEvent) {
        self.sink.notify(&event);
    }

    fn commit(&mut self, checkpoint: Checkpoint, event: EditorEvent) {
        debug_assert_eq!(
            self.graph.check_invariants(),
            Ok(()),
            "graph invariant violated by '{}'",
            checkpoint.description()
        );
        tracing::info!("{}", event.summary());
        self.history.commit(checkpoint);
        self.dirty = true;
        self.emit(event);
    }

    fn require(&self, node_id: &NodeId) -> Result<&Node> {
        self.graph.node(node_id).ok_or_else(|| {
            tracing::warn!("Node not found: {}", node_id);
            GraphError::NotFound(node_id.clone()).into()
        })
    }

    /// End any gesture in progress before another command touches the graph
    fn settle(&mut self) {
        if !self.controller.is_idle() {
            self.cancel_interaction();
        }
    }

    /// Place the initial node of a fresh document. Not recorded in history.
    pub fn seed_default(&mut self) -> Node {
        let node = self
            .graph
            .add_node(&self.catalog, SEED_NODE_TYPE, Some(SEED_NODE_POSITION))
            .clone();
        tracing::info!("Seeded graph with {} node", node.node_type);
        self.emit(EditorEvent::NodeAdded { node: node.clone() });
        node
    }

    /// Add a node from the catalog. Without a position it lands on a cascade offset.
    pub fn add_node(&mut self, node_type: &str, position: Option<Point>) -> Node {
        self.settle();
        let checkpoint = self.history.begin(&self.graph, format!("Add {node_type} node"));
        let node = self.graph.add_node(&self.catalog, node_type, position).clone();
        self.commit(checkpoint, EditorEvent::NodeAdded { node: node.clone() });
        node
    }

    /// Delete a node and its connections. Absent ids are a no-op.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<RemovedNode> {
        self.settle();
        if !self.graph.contains_node(node_id) {
            tracing::debug!("Delete ignored, node {} not found", node_id);
            return None;
        }

        let checkpoint = self.history.begin(&self.graph, "Delete node");
        let removed = self.graph.remove_node(node_id)?;
        self.selection.remove(node_id);
        self.commit(
            checkpoint,
            EditorEvent::NodesRemoved {
                nodes: vec![node_id.clone()],
                connections: removed.connections.iter().map(|c| c.id.clone()).collect(),
            },
        );
        Some(removed)
    }

    /// Delete every selected node as one command. Returns the deleted ids.
    pub fn delete_selected(&mut self) -> Vec<NodeId> {
        self.settle();
        if self.selection.is_empty() {
            return Vec::new();
        }

        let checkpoint = self.history.begin(&self.graph, "Delete selection");
        let mut nodes = Vec::new();
        let mut connections = Vec::new();
        for id in self.selection.to_vec() {
            if let Some(removed) = self.graph.remove_node(&id) {
                connections.extend(removed.connections.into_iter().map(|c| c.id));
                nodes.push(id);
            }
        }
        self.selection.clear();

        if !nodes.is_empty() {
            self.commit(
                checkpoint,
                EditorEvent::NodesRemoved {
                    nodes: nodes.clone(),
                    connections,
                },
            );
        }
        nodes
    }

    /// Move a node. No snapping is applied.
    pub fn move_node(&mut self, node_id: &NodeId, position: Point) -> Result<()> {
        self.settle();
        if self.require(node_id)?.position == position {
            return Ok(());
        }

        let checkpoint = self.history.begin(&self.graph, "Move node");
        self.graph.move_node(node_id, position)?;
        self.commit(
            checkpoint,
            EditorEvent::NodesMoved {
                positions: vec![(node_id.clone(), position)],
                snapped: false,
            },
        );
        Ok(())
    }

    /// Resize a node, clamped to the minimum node size. Returns the applied size.
    pub fn resize_node(&mut self, node_id: &NodeId, size: Extent) -> Result<Extent> {
        self.settle();
        let clamped = size.at_least(MIN_NODE_SIZE);
        if self.require(node_id)?.size == clamped {
            return Ok(clamped);
        }

        let checkpoint = self.history.begin(&self.graph, "Resize node");
        let applied = self.graph.resize_node(node_id, clamped)?;
        self.commit(
            checkpoint,
            EditorEvent::NodeResized {
                node: node_id.clone(),
                size: applied,
            },
        );
        Ok(applied)
    }

    fn update_node(
        &mut self,
        node_id: &NodeId,
        description: String,
        unchanged: impl FnOnce(&Node) -> bool,
        edit: impl FnOnce(&mut Graph) -> std::result::Result<(), GraphError>,
    ) -> Result<()> {
        self.settle();
        if unchanged(self.require(node_id)?) {
            return Ok(());
        }

        let checkpoint = self.history.begin(&self.graph, description);
        edit(&mut self.graph)?;
        let node = self.require(node_id)?.clone();
        self.commit(checkpoint, EditorEvent::NodeUpdated { node });
        Ok(())
    }

    /// Set a node setting; keys need not come from the catalog
    pub fn set_setting(&mut self, node_id: &NodeId, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        self.update_node(
            node_id,
            format!("Set {key}"),
            |node| node.setting(&key) == Some(value.as_str()),
            |graph| graph.set_setting(node_id, key.as_str(), value.as_str()).map(|_| ()),
        )
    }

    /// Change a node's display title
    pub fn rename_title(&mut self, node_id: &NodeId, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        self.update_node(
            node_id,
            format!("Rename to {title}"),
            |node| node.title == title,
            |graph| graph.rename_title(node_id, title.as_str()),
        )
    }

    /// Set the shadow flag of a single node
    pub fn set_node_shadow_mode(&mut self, node_id: &NodeId, enabled: bool) -> Result<()> {
        self.update_node(
            node_id,
            "Set node shadow mode".to_string(),
            |node| node.shadow_mode == enabled,
            |graph| graph.set_node_shadow_mode(node_id, enabled),
        )
    }

    /// Wire an output to an input.
    ///
    /// Fails with [`GraphError::InvalidReference`] for unknown endpoints and with
    /// [`GraphError::InputAlreadyBound`] if the input is taken.
    pub fn connect(
        &mut self,
        source_node: &NodeId,
        source_output: &str,
        target_node: &NodeId,
        target_input: &str,
    ) -> Result<Connection> {
        self.settle();
        let checkpoint = self.history.begin(&self.graph, "Connect");
        let connection = match self.graph.connect(source_node, source_output, target_node, target_input) {
            Ok(connection) => connection.clone(),
            Err(e) => {
                tracing::warn!("Connect rejected: {}", e);
                return Err(e.into());
            }
        };
        self.commit(
            checkpoint,
            EditorEvent::ConnectionAdded {
                connection: connection.clone(),
            },
        );
        Ok(connection)
    }

    /// Remove a connection. Absent ids are a no-op.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        self.settle();
        self.graph.connection(connection_id)?;

        let checkpoint = self.history.begin(&self.graph, "Disconnect");
        let removed = self.graph.disconnect(connection_id)?;
        self.commit(
            checkpoint,
            EditorEvent::ConnectionRemoved {
                connection: connection_id.clone(),
            },
        );
        Some(removed)
    }

    /// Set graph-level shadow mode, mirrored onto every node and connection
    pub fn set_graph_shadow_mode(&mut self, enabled: bool) {
        self.settle();
        let mirrored = self.graph.shadow_mode() == enabled
            && self.graph.nodes().all(|n| n.shadow_mode == enabled)
            && self.graph.connections().all(|c| c.shadow_mode == enabled);
        if mirrored {
            tracing::debug!("Shadow mode already {}", if enabled { "on" } else { "off" });
            return;
        }

        let checkpoint = self.history.begin(&self.graph, "Set shadow mode");
        self.graph.set_shadow_mode(enabled);
        self.commit(checkpoint, EditorEvent::ShadowModeToggled { enabled });
    }

    /// Flip graph-level shadow mode. Returns the new state.
    pub fn toggle_shadow_mode(&mut self) -> bool {
        let enabled = !self.graph.shadow_mode();
        self.set_graph_shadow_mode(enabled);
        enabled
    }

    /// Re-place every node on the configured grid
    pub fn apply_layout(&mut self) -> Vec<(NodeId, Point)> {
        self.settle();
        if self.graph.node_count() == 0 {
            return Vec::new();
        }

        let layout = self.config.layout;
        let checkpoint = self.history.begin(&self.graph, "Auto layout");
        let positions = layout.apply(&mut self.graph);
        self.commit(
            checkpoint,
            EditorEvent::LayoutApplied {
                positions: positions.clone(),
            },
        );
        positions
    }

    fn emit_selection(&mut self) {
        let selected = self.selection.to_vec();
        tracing::debug!("Selection: {} node(s)", selected.len());
        self.emit(EditorEvent::SelectionChanged { selected });
    }

    fn replace_selection(&mut self, ids: Vec<NodeId>) {
        let before = self.selection.clone();
        self.selection.replace(ids);
        if self.selection != before {
            self.emit_selection();
        }
    }

    /// Select exactly the given nodes; unknown ids are skipped
    pub fn select(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        let ids = ids
            .into_iter()
            .filter(|id| self.graph.contains_node(id))
            .collect();
        self.replace_selection(ids);
    }

    /// Select every node
    pub fn select_all(&mut self) {
        let ids = self.graph.node_ids().cloned().collect();
        self.replace_selection(ids);
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.replace_selection(Vec::new());
    }

    /// Copy the given nodes to the clipboard. Returns how many were copied.
    pub fn copy(&mut self, ids: &[NodeId]) -> usize {
        let count = self.clipboard.copy(&self.graph, ids);
        let event = EditorEvent::NodesCopied { count };
        tracing::info!("{}", event.summary());
        self.emit(event);
        count
    }

    /// Copy the selected nodes to the clipboard
    pub fn copy_selected(&mut self) -> usize {
        let ids = self.selection.to_vec();
        self.copy(&ids)
    }

    /// Insert the clipboard with fresh ids and select the result
    pub fn paste(&mut self) -> Vec<NodeId> {
        self.settle();
        if self.clipboard.is_empty() {
            tracing::debug!("Paste ignored, clipboard is empty");
            return Vec::new();
        }
        let checkpoint = self.history.begin(&self.graph, "Paste");
        self.paste_clipboard(checkpoint)
    }

    /// Copy then paste the given nodes as a single undoable command
    pub fn duplicate(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        self.settle();
        if self.clipboard.copy(&self.graph, ids) == 0 {
            return Vec::new();
        }
        let checkpoint = self.history.begin(&self.graph, "Duplicate");
        self.paste_clipboard(checkpoint)
    }

    /// Duplicate the selected nodes
    pub fn duplicate_selected(&mut self) -> Vec<NodeId> {
        let ids = self.selection.to_vec();
        self.duplicate(&ids)
    }

    fn paste_clipboard(&mut self, checkpoint: Checkpoint) -> Vec<NodeId> {
        let pasted = self.clipboard.paste(&mut self.graph);
        let ids = pasted.node_ids();
        self.selection.replace(ids.clone());
        self.commit(
            checkpoint,
            EditorEvent::NodesPasted {
                nodes: pasted.nodes,
                connections: pasted.connections,
            },
        );
        ids
    }

    /// Restore the graph before the last command. Returns its description.
    pub fn undo(&mut self) -> Result<String> {
        self.settle();
        let description = match self.history.undo(&mut self.graph) {
            Ok(description) => description,
            Err(e) => {
                tracing::info!("{}", e);
                return Err(e.into());
            }
        };
        self.after_replacement();
        tracing::info!("Undo performed: {}", description);
        self.emit(EditorEvent::UndoPerformed {
            description: description.clone(),
            graph: self.graph.clone(),
        });
        Ok(description)
    }

    /// Reapply the last undone command. Returns its description.
    pub fn redo(&mut self) -> Result<String> {
        self.settle();
        let description = match self.history.redo(&mut self.graph) {
            Ok(description) => description,
            Err(e) => {
                tracing::info!("{}", e);
                return Err(e.into());
            }
        };
        self.after_replacement();
        tracing::info!("Redo performed: {}", description);
        self.emit(EditorEvent::RedoPerformed {
            description: description.clone(),
            graph: self.graph.clone(),
        });
        Ok(description)
    }

    fn after_replacement(&mut self) {
        debug_assert_eq!(self.graph.check_invariants(), Ok(()));
        self.selection.retain_existing(&self.graph);
        self.dirty = true;
    }

    /// Pointer pressed on the canvas
    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers) -> PointerOutcome {
        let outcome = self
            .controller
            .pointer_down(&self.graph, &mut self.selection, point, modifiers);
        match &outcome {
            PointerOutcome::DragStarted { selection_changed } => {
                self.gesture = Some(self.history.begin(&self.graph, "Move nodes"));
                if *selection_changed {
                    self.emit_selection();
                }
            }
            PointerOutcome::ResizeStarted {
                selection_changed, ..
            } => {
                self.gesture = Some(self.history.begin(&self.graph, "Resize node"));
                if *selection_changed {
                    self.emit_selection();
                }
            }
            _ => {}
        }
        outcome
    }

    /// Pointer moved; previews the gesture in progress
    pub fn pointer_move(&mut self, point: Point) -> PointerOutcome {
        let outcome = self.controller.pointer_move(&mut self.graph, point);
        match &outcome {
            PointerOutcome::Dragged(positions) => self.emit(EditorEvent::DragPreview {
                positions: positions.clone(),
            }),
            PointerOutcome::Resized(node, size) => self.emit(EditorEvent::ResizePreview {
                node: node.clone(),
                size: *size,
            }),
            PointerOutcome::MarqueeChanged(rect) => self.emit(EditorEvent::MarqueePreview { rect: *rect }),
            _ => {}
        }
        outcome
    }

    /// Pointer released; snaps and commits a drag, commits a resize or marquee
    pub fn pointer_up(&mut self, point: Point) -> PointerOutcome {
        let outcome = self
            .controller
            .pointer_up(&mut self.graph, &mut self.selection, point);
        self.finish_gesture(&outcome, true);
        outcome
    }

    /// Pointer capture lost. Moved nodes stay where they are, unsnapped.
    pub fn cancel_interaction(&mut self) -> PointerOutcome {
        let outcome = self.controller.cancel(&self.graph);
        if outcome != PointerOutcome::None {
            tracing::debug!("Interaction cancelled");
        }
        self.finish_gesture(&outcome, false);
        outcome
    }

    fn finish_gesture(&mut self, outcome: &PointerOutcome, snapped: bool) {
        let checkpoint = self.gesture.take();
        match outcome {
            PointerOutcome::DragFinished { positions, moved } => match checkpoint {
                Some(checkpoint) if *moved => self.commit(
                    checkpoint,
                    EditorEvent::NodesMoved {
                        positions: positions.clone(),
                        snapped,
                    },
                ),
                _ => self.emit(EditorEvent::DragPreview {
                    positions: positions.clone(),
                }),
            },
            PointerOutcome::ResizeFinished { node, size, changed } => match checkpoint {
                Some(checkpoint) if *changed => self.commit(
                    checkpoint,
                    EditorEvent::NodeResized {
                        node: node.clone(),
                        size: *size,
                    },
                ),
                _ => self.emit(EditorEvent::ResizePreview {
                    node: node.clone(),
                    size: *size,
                }),
            },
            PointerOutcome::MarqueeFinished {
                selection_changed: true,
            } => self.emit_selection(),
            _ => {}
        }
    }

    /// Serialize the active graph
    pub fn to_text(&self) -> Result<String> {
        Ok(to_text(&self.graph)?)
    }

    /// Replace the graph with one parsed from `text`.
    ///
    /// On failure the active graph is untouched. On success the replacement is
    /// undoable and the selection is cleared.
    pub fn load_text(&mut self, text: &str) -> Result<()> {
        self.replace_from_text(text, "text")
    }

    fn replace_from_text(&mut self, text: &str, source: &str) -> Result<()> {
        let graph = match from_text(text) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!("Failed to load graph from {}: {}", source, e);
                return Err(e.into());
            }
        };

        self.settle();
        let checkpoint = self.history.begin(&self.graph, format!("Load {source}"));
        self.graph = graph;
        self.selection.clear();
        self.commit(
            checkpoint,
            EditorEvent::GraphLoaded {
                source: source.to_string(),
                graph: self.graph.clone(),
            },
        );
        Ok(())
    }

    /// Write the graph to `path` through `storage`
    pub fn save(&mut self, storage: &mut impl Storage, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_text()?;
        if let Err(e) = storage.write_text(path, &text) {
            return Err(self.storage_failed(e));
        }

        self.document_path = Some(path.to_path_buf());
        self.dirty = false;
        let event = EditorEvent::GraphSaved {
            path: path.display().to_string(),
        };
        tracing::info!("{}", event.summary());
        self.emit(event);
        Ok(())
    }

    /// Replace the graph with the document at `path`. A failed load changes nothing.
    pub fn load(&mut self, storage: &impl Storage, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = storage.read_text(path).map_err(|e| self.storage_failed(e))?;
        self.replace_from_text(&text, &path.display().to_string())?;
        self.document_path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    fn storage_failed(&mut self, error: StorageError) -> EditorError {
        let event = EditorEvent::StorageFailed {
            path: error.path().display().to_string(),
            message: error.to_string(),
        };
        tracing::error!("{}", event.summary());
        self.emit(event);
        error.into()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
