// Copyright (c) 2026 rezky_nightky

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::runtime::{OverlayPosition, OverlaySize};
use crate::theme::{default_theme, theme_by_key};

pub const KEY_THEME: &str = "matrixTheme";
pub const KEY_OVERLAY_TEXT: &str = "matrixOverlayText";
pub const KEY_SHOW_OVERLAY: &str = "matrixShowOverlay";
pub const KEY_OVERLAY_SIZE: &str = "matrixOverlaySize";
pub const KEY_OVERLAY_POSITION: &str = "matrixOverlayPosition";
pub const KEY_PANEL_COLLAPSED: &str = "matrixPanelCollapsed";
pub const KEY_PANEL_POSITION: &str = "matrixPanelPosition";

pub type Result<T> = std::result::Result<T, PrefsError>;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("malformed preferences in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value store, written through to a JSON file on every change.
#[derive(Debug, Default)]
pub struct PrefStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl PrefStore {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("digirain").join("prefs.json"))
    }

    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads `path`; a missing file yields an empty store bound to that path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => parse_object(&text).map_err(|source| PrefsError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PrefsError::Read { path, source }),
        };
        debug!(path = %path.display(), entries = values.len(), "preferences loaded");
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Keeps the loaded values but stops writing them back.
    pub fn detach(mut self) -> Self {
        self.path = None;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if self.get(key) == Some(value.as_str()) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.values)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| PrefsError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| PrefsError::Write {
            path: path.clone(),
            source,
        })
    }
}

/// Accepts any JSON object; non-string values are kept in their JSON form.
fn parse_object(text: &str) -> serde_json::Result<BTreeMap<String, String>> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(text)?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => (k, s),
            other => (k, other.to_string()),
        })
        .collect())
}

/// Panel anchor in terminal cells. Each edge is either an offset or unset,
/// and an unset `left`/`top` falls back to the opposite edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelPosition {
    pub top: Option<u16>,
    pub right: Option<u16>,
    pub bottom: Option<u16>,
    pub left: Option<u16>,
}

impl Default for PanelPosition {
    fn default() -> Self {
        Self {
            top: Some(1),
            right: Some(2),
            bottom: None,
            left: None,
        }
    }
}

impl PanelPosition {
    /// Position left in place after dragging.
    pub fn at(col: u16, line: u16) -> Self {
        Self {
            top: Some(line),
            right: None,
            bottom: None,
            left: Some(col),
        }
    }

    /// Top-left cell of a `width` x `height` panel, kept on screen.
    pub fn resolve(&self, width: u16, height: u16, cols: u16, lines: u16) -> (u16, u16) {
        let max_x = cols.saturating_sub(width);
        let max_y = lines.saturating_sub(height);
        let x = match (self.left, self.right) {
            (Some(l), _) => l,
            (None, Some(r)) => max_x.saturating_sub(r),
            (None, None) => 0,
        };
        let y = match (self.top, self.bottom) {
            (Some(t), _) => t,
            (None, Some(b)) => max_y.saturating_sub(b),
            (None, None) => 0,
        };
        (x.min(max_x), y.min(max_y))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Typed view of the stored preferences with defaults for anything missing
/// or unreadable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preferences {
    pub theme: &'static str,
    pub overlay_text: String,
    pub show_overlay: bool,
    pub overlay_size: OverlaySize,
    pub overlay_position: OverlayPosition,
    pub panel_collapsed: bool,
    pub panel_position: PanelPosition,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: default_theme().key,
            overlay_text: String::new(),
            show_overlay: false,
            overlay_size: OverlaySize::default(),
            overlay_position: OverlayPosition::default(),
            panel_collapsed: false,
            panel_position: PanelPosition::default(),
        }
    }
}

impl Preferences {
    pub fn from_store(store: &PrefStore) -> Self {
        let d = Self::default();
        Self {
            theme: store
                .get(KEY_THEME)
                .and_then(theme_by_key)
                .map(|t| t.key)
                .unwrap_or(d.theme),
            overlay_text: store.get(KEY_OVERLAY_TEXT).unwrap_or_default().to_string(),
            show_overlay: store.get(KEY_SHOW_OVERLAY) == Some("true"),
            overlay_size: store
                .get(KEY_OVERLAY_SIZE)
                .and_then(OverlaySize::from_key)
                .unwrap_or(d.overlay_size),
            overlay_position: store
                .get(KEY_OVERLAY_POSITION)
                .and_then(OverlayPosition::from_key)
                .unwrap_or(d.overlay_position),
            panel_collapsed: store.get(KEY_PANEL_COLLAPSED) == Some("true"),
            panel_position: store
                .get(KEY_PANEL_POSITION)
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or(d.panel_position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefStore::open(dir.path().join("nope.json")).unwrap();
        assert_eq!(store.get(KEY_THEME), None);
        assert_eq!(Preferences::from_store(&store), Preferences::default());
    }

    #[test]
    fn set_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut store = PrefStore::open(&path).unwrap();
        store.set(KEY_THEME, "amber").unwrap();
        store.set(KEY_SHOW_OVERLAY, "true").unwrap();

        let reopened = PrefStore::open(&path).unwrap();
        assert_eq!(reopened.get(KEY_THEME), Some("amber"));
        let prefs = Preferences::from_store(&reopened);
        assert_eq!(prefs.theme, "amber");
        assert!(prefs.show_overlay);
    }

    #[test]
    fn in_memory_store_never_writes() {
        let mut store = PrefStore::in_memory();
        store.set(KEY_OVERLAY_TEXT, "hi").unwrap();
        assert_eq!(store.get(KEY_OVERLAY_TEXT), Some("hi"));
        assert!(store.path().is_none());
    }

    #[test]
    fn detached_store_reads_but_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"matrixTheme": "pink"}"#).unwrap();
        let mut store = PrefStore::open(&path).unwrap().detach();
        assert_eq!(store.get(KEY_THEME), Some("pink"));
        store.set(KEY_THEME, "blue").unwrap();
        let on_disk = fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("pink"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            PrefStore::open(&path),
            Err(PrefsError::Parse { .. })
        ));
    }

    #[test]
    fn non_string_values_are_kept_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"matrixShowOverlay": true, "matrixTheme": "blue"}"#).unwrap();
        let store = PrefStore::open(&path).unwrap();
        assert_eq!(store.get(KEY_SHOW_OVERLAY), Some("true"));
        assert_eq!(Preferences::from_store(&store).theme, "blue");
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let mut store = PrefStore::in_memory();
        store.set(KEY_THEME, "plaid").unwrap();
        store.set(KEY_OVERLAY_SIZE, "huge").unwrap();
        store.set(KEY_OVERLAY_POSITION, "left").unwrap();
        store.set(KEY_PANEL_POSITION, "{not json").unwrap();
        assert_eq!(Preferences::from_store(&store), Preferences::default());
    }

    #[test]
    fn panel_position_round_trips_and_resolves() {
        let moved = PanelPosition::at(5, 3);
        let json = moved.to_json();
        assert_eq!(json, r#"{"top":3,"right":null,"bottom":null,"left":5}"#);
        let mut store = PrefStore::in_memory();
        store.set(KEY_PANEL_POSITION, json).unwrap();
        assert_eq!(Preferences::from_store(&store).panel_position, moved);

        // Default hugs the top right corner.
        assert_eq!(PanelPosition::default().resolve(30, 12, 100, 40), (68, 1));
        // Out-of-range offsets are clamped onto the screen.
        assert_eq!(PanelPosition::at(90, 39).resolve(30, 12, 100, 40), (70, 28));
    }
}
