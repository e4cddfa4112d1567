// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless editing engine for the `SoftGeo` node canvas.
//!
//! [`Editor`] wraps a [`softgeo_editor_graph::Graph`] with everything an
//! interactive front end needs, expressed as state rather than pixels:
//! - Snapshot-based undo/redo with a bounded depth
//! - Selection, drag, resize and marquee gestures
//! - Clipboard with identity remapping
//! - A notification stream for the presentation layer
//! - Text storage for graph documents
//!
//! ## Logging
//!
//! Commands log through `tracing`. [`log_bridge::LogBridge`] forwards those
//! records to an in-app log panel.

pub mod clipboard;
pub mod config;
pub mod editor;
pub mod events;
pub mod history;
pub mod interaction;
pub mod log_bridge;
pub mod selection;
pub mod storage;

pub use clipboard::{Clipboard, Pasted};
pub use config::{ConfigError, EditorConfig};
pub use editor::{Editor, EditorError};
pub use events::{EditorEvent, EventLog, EventSink};
pub use history::{Checkpoint, History, HistoryError, HistoryStats};
pub use interaction::{Hit, InteractionController, InteractionMode, Modifiers, PointerOutcome};
pub use log_bridge::{init_logging, LogBridge, LogRecord};
pub use selection::Selection;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
