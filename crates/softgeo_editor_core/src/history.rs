// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history using whole-graph snapshots.
//!
//! A mutation is bracketed by [`History::begin`], which clones the graph into a
//! [`Checkpoint`], and [`History::commit`], which files that checkpoint on the
//! undo stack. Dropping a checkpoint instead of committing it abandons the
//! bracket, which is how failed or no-op commands stay out of history.

use softgeo_editor_graph::Graph;
use std::collections::VecDeque;
use std::mem;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// History errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Graph state captured before a mutation, not yet part of history
#[derive(Debug, Clone)]
#[must_use = "a checkpoint does nothing until it is committed"]
pub struct Checkpoint {
    snapshot: Graph,
    description: String,
}

impl Checkpoint {
    /// Human-readable description of the pending mutation
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The graph as it was when the bracket opened
    pub fn snapshot(&self) -> &Graph {
        &self.snapshot
    }
}

/// A snapshot on one of the stacks
#[derive(Debug, Clone)]
struct Entry {
    graph: Graph,
    description: String,
    timestamp: u64,
}

/// History statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    /// Snapshots in the undo stack
    pub undo_count: usize,
    /// Snapshots in the redo stack
    pub redo_count: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<Entry>,
    redo_stack: VecDeque<Entry>,
    max_depth: usize,
}

impl History {
    /// Create with a maximum depth; zero disables history entirely
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
        }
    }

    /// Open a mutation bracket by snapshotting the current graph
    pub fn begin(&self, graph: &Graph, description: impl Into<String>) -> Checkpoint {
        Checkpoint {
            snapshot: graph.clone(),
            description: description.into(),
        }
    }

    /// Close a mutation bracket. Invalidates redo history.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.redo_stack.clear();
        if self.max_depth == 0 {
            return;
        }

        tracing::trace!("History commit: {}", checkpoint.description);
        self.undo_stack.push_back(Entry {
            graph: checkpoint.snapshot,
            description: checkpoint.description,
            timestamp: now_secs(),
        });

        while self.undo_stack.len() > self.max_depth {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::debug!("History full, evicting '{}'", evicted.description);
            }
        }
    }

    /// Install the latest undo snapshot into `current`, moving the current state
    /// to the redo stack. Returns the description of the undone mutation.
    pub fn undo(&mut self, current: &mut Graph) -> Result<String> {
        let entry = self.undo_stack.pop_back().ok_or(HistoryError::NothingToUndo)?;
        let description = entry.description.clone();
        let previous = mem::replace(current, entry.graph);
        self.redo_stack.push_back(Entry {
            graph: previous,
            description: entry.description,
            timestamp: now_secs(),
        });
        Ok(description)
    }

    /// Mirror of [`History::undo`]
    pub fn redo(&mut self, current: &mut Graph) -> Result<String> {
        let entry = self.redo_stack.pop_back().ok_or(HistoryError::NothingToRedo)?;
        let description = entry.description.clone();
        let previous = mem::replace(current, entry.graph);
        self.undo_stack.push_back(Entry {
            graph: previous,
            description: entry.description,
            timestamp: now_secs(),
        });
        Ok(description)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Configured depth limit
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            max_depth: self.max_depth,
        }
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description.as_str())
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.description.as_str())
    }

    /// When the next undo snapshot was filed (seconds since the Unix epoch)
    pub fn undo_timestamp(&self) -> Option<u64> {
        self.undo_stack.back().map(|e| e.timestamp)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::with_max_depth(crate::config::DEFAULT_HISTORY_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use softgeo_editor_graph::{NodeCatalog, Point};

    fn add(history: &mut History, graph: &mut Graph, node_type: &str) {
        let checkpoint = history.begin(graph, format!("Add {node_type}"));
        graph.add_node(&NodeCatalog::builtin(), node_type, None);
        history.commit(checkpoint);
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::default();
        let mut graph = Graph::default();
        add(&mut history, &mut graph, "Extrude");
        add(&mut history, &mut graph, "Loft");

        assert_eq!(history.undo_description(), Some("Add Loft"));
        assert_eq!(history.undo(&mut graph).unwrap(), "Add Loft");
        assert_eq!(graph.node_count(), 1);
        assert_eq!(history.redo_description(), Some("Add Loft"));

        history.redo(&mut graph).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_reported() {
        let mut history = History::default();
        let mut graph = Graph::default();
        assert_eq!(history.undo(&mut graph), Err(HistoryError::NothingToUndo));
        assert_eq!(history.redo(&mut graph), Err(HistoryError::NothingToRedo));
        assert_eq!(graph, Graph::default());
    }

    #[test]
    fn test_new_commit_clears_redo() {
        let mut history = History::default();
        let mut graph = Graph::default();
        add(&mut history, &mut graph, "Extrude");
        history.undo(&mut graph).unwrap();
        assert!(history.can_redo());

        add(&mut history, &mut graph, "Fillet");
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_bounded_depth_evicts_oldest() {
        let mut history = History::with_max_depth(2);
        let mut graph = Graph::default();
        for node_type in ["Extrude", "Loft", "Boolean"] {
            add(&mut history, &mut graph, node_type);
        }

        assert_eq!(history.stats(), HistoryStats { undo_count: 2, redo_count: 0, max_depth: 2 });
        history.undo(&mut graph).unwrap();
        history.undo(&mut graph).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_zero_depth_disables_history() {
        let mut history = History::with_max_depth(0);
        let mut graph = Graph::default();
        add(&mut history, &mut graph, "Extrude");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_snapshots_are_independent() {
        let mut history = History::default();
        let mut graph = Graph::default();
        add(&mut history, &mut graph, "Extrude");
        let id = graph.node_ids().next().unwrap().clone();

        let checkpoint = history.begin(&graph, "Move");
        graph.move_node(&id, Point::new(500.0, 500.0)).unwrap();
        graph.set_setting(&id, "Height", "4").unwrap();
        history.commit(checkpoint);

        history.undo(&mut graph).unwrap();
        let node = graph.node(&id).unwrap();
        assert_eq!(node.position, Point::new(20.0, 80.0));
        assert_eq!(node.setting("Height"), Some("1.0"));
    }

    #[test]
    fn test_abandoned_checkpoint_leaves_no_trace() {
        let history = History::default();
        let graph = Graph::default();
        let checkpoint = history.begin(&graph, "Nothing");
        assert_eq!(checkpoint.description(), "Nothing");
        drop(checkpoint);
        assert!(!history.can_undo());
    }
}
