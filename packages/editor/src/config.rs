use crate::errors::EditorError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const AUTOSAVE_FILE_NAME: &str = "Autosaved.emojiart";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Where the single-document variant autosaves. Defaults to the user's
    /// documents directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave_path: Option<PathBuf>,

    /// Coalescing interval for autosave, in milliseconds
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,

    /// Undo capacity (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Timeout for fetching a background URL, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_autosave_interval_ms() -> u64 {
    5_000
}

fn default_undo_levels() -> usize {
    100
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "EmojiArt".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_path: None,
            autosave_interval_ms: default_autosave_interval_ms(),
            undo_levels: default_undo_levels(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl EditorConfig {
    /// Load config from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, EditorError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| EditorError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolved autosave location
    pub fn autosave_path(&self) -> PathBuf {
        self.autosave_path
            .clone()
            .unwrap_or_else(default_autosave_path)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// `<documents dir>/Autosaved.emojiart`, or the working directory when the
/// platform has no documents directory.
pub fn default_autosave_path() -> PathBuf {
    let mut path = dirs::document_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(AUTOSAVE_FILE_NAME);
    path
}
