// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.
//!
//! Stored as RON. Every key is optional; missing keys take their defaults.

use serde::{Deserialize, Serialize};
use softgeo_editor_graph::{GridLayout, Point};
use std::path::Path;

/// Default undo/redo depth
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be written as RON
    #[error("Config serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Tunables for the editing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo (and redo) snapshots; the oldest is evicted on
    /// overflow. Zero disables history.
    pub history_depth: usize,
    /// Grid step that dragged nodes snap to on release
    pub snap_size: f32,
    /// Offset baked into clipboard entries relative to their originals
    pub clipboard_offset: Point,
    /// Side of the square resize grip in a node's bottom-right corner
    pub resize_grip: f32,
    /// Number of events kept by the log from [`crate::Editor::with_event_log`]
    pub event_log_capacity: usize,
    /// Grid used by auto-layout
    pub layout: GridLayout,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            snap_size: 10.0,
            clipboard_offset: Point::new(20.0, 20.0),
            resize_grip: 12.0,
            event_log_capacity: 500,
            layout: GridLayout::default(),
        }
    }
}

impl EditorConfig {
    /// Parse from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Render as pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.history_depth, DEFAULT_HISTORY_DEPTH);
        assert_eq!(config.snap_size, 10.0);
        assert_eq!(config.layout.columns, 4);
    }

    #[test]
    fn test_partial_config() {
        let config = EditorConfig::from_ron_str("(history_depth: 5, layout: (columns: 2))").unwrap();
        assert_eq!(config.history_depth, 5);
        assert_eq!(config.layout.columns, 2);
        assert_eq!(config.layout.origin, Point::new(60.0, 60.0));
        assert_eq!(config.clipboard_offset, Point::new(20.0, 20.0));
    }

    #[test]
    fn test_serialization() {
        let config = EditorConfig {
            snap_size: 25.0,
            ..EditorConfig::default()
        };
        let ron_str = config.to_ron_string().unwrap();
        assert_eq!(EditorConfig::from_ron_str(&ron_str).unwrap(), config);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        let config = EditorConfig {
            history_depth: 7,
            ..EditorConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EditorConfig::from_ron_str("(history_depth: \"many\")"),
            Err(ConfigError::Parse(_))
        ));
    }
}
