//! # File-backed Document
//!
//! The document-per-file variant: contents come from the host when a file
//! is opened and go back to it as an encoded snapshot when it saves.
//!
//! ## Lifecycle
//!
//! ```text
//! open(bytes) → decode → resolve background → edit … → snapshot() → host writes
//! ```

use crate::codec;
use crate::config::EditorConfig;
use crate::controller::DocumentController;
use crate::errors::{CodecError, EditorError};
use crate::fetcher::ImageFetcher;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct FileDocument {
    controller: DocumentController,
}

impl FileDocument {
    /// Fresh, blank document
    pub fn new(fetcher: Arc<dyn ImageFetcher>, config: &EditorConfig) -> Self {
        Self {
            controller: DocumentController::with_config(fetcher, config),
        }
    }

    /// Open from the host's file contents. Missing or invalid contents fail
    /// the open with [`EditorError::CorruptFile`].
    pub fn open(
        contents: Option<&[u8]>,
        fetcher: Arc<dyn ImageFetcher>,
        config: &EditorConfig,
    ) -> Result<Self, EditorError> {
        let bytes = contents.ok_or_else(|| EditorError::CorruptFile("file has no contents".to_string()))?;
        let model = codec::decode(bytes).map_err(|e| EditorError::CorruptFile(e.to_string()))?;

        info!(
            emojis = model.emojis().len(),
            background = model.background().kind(),
            "Opened document"
        );

        Ok(Self {
            controller: DocumentController::from_model(model, fetcher, config),
        })
    }

    /// Open the file at `path`. A missing file is reported as not found,
    /// unreadable contents as corrupt.
    pub fn open_path(
        path: &Path,
        fetcher: Arc<dyn ImageFetcher>,
        config: &EditorConfig,
    ) -> Result<Self, EditorError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EditorError::Codec(CodecError::NotFound(path.to_path_buf())),
            _ => EditorError::Io(e),
        })?;
        Self::open(Some(&bytes), fetcher, config)
    }

    /// Encoded contents of the current model, for the host to write
    pub fn snapshot(&self) -> Result<Vec<u8>, EditorError> {
        Ok(codec::encode(self.controller.model())?)
    }

    /// Write the current model to `path`, returning the number of bytes
    pub fn save_to(&self, path: &Path) -> Result<usize, EditorError> {
        let bytes = codec::encode_to_file(self.controller.model(), path)?;
        info!(path = %path.display(), bytes, "Saved document");
        Ok(bytes)
    }

    pub fn controller(&self) -> &DocumentController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut DocumentController {
        &mut self.controller
    }
}
