//! Settings
//!
//! Persisted extension settings: the capture flag plus per-tab panel
//! preferences, stored as one JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::DevToolsError;

/// Panel filters remembered for a tab
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabFilters {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub detail: String,
}

impl TabFilters {
    pub fn is_empty(&self) -> bool {
        self.event_type.is_empty() && self.detail.is_empty()
    }
}

/// Extension settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_capture_enabled")]
    pub capture_enabled: bool,
    #[serde(default)]
    pub preserve_log_by_tab: BTreeMap<u32, bool>,
    #[serde(default)]
    pub filters_by_tab: BTreeMap<u32, TabFilters>,
}

fn default_capture_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capture_enabled: true,
            preserve_log_by_tab: BTreeMap::new(),
            filters_by_tab: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Whether the panel of `tab_id` keeps its log across navigations
    pub fn preserve_log(&self, tab_id: u32) -> bool {
        self.preserve_log_by_tab.get(&tab_id).copied().unwrap_or(false)
    }

    /// Filters saved for `tab_id`
    pub fn filters(&self, tab_id: u32) -> TabFilters {
        self.filters_by_tab.get(&tab_id).cloned().unwrap_or_default()
    }
}

/// Settings file on disk
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings; a missing file gives the defaults
    pub fn load(&self) -> Result<Settings, DevToolsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(DevToolsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the settings, replacing the file
    pub fn save(&self, settings: &Settings) -> Result<(), DevToolsError> {
        let text = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, text).map_err(|source| DevToolsError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Load, change and save in one step
    pub fn update<F>(&self, change: F) -> Result<Settings, DevToolsError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.load()?;
        change(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }
}
