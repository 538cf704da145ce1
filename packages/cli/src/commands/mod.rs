pub mod add;
pub mod background;
pub mod inspect;
pub mod new;
pub mod resolve;

pub use add::{add, AddArgs};
pub use background::{background, BackgroundArgs};
pub use inspect::{inspect, InspectArgs};
pub use new::{new, NewArgs};
pub use resolve::{resolve, ResolveArgs};

use anyhow::{Context, Result};
use emoji_art_editor::{EditorConfig, EmojiArt, FileDocument, HttpFetcher};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Runtime that background fetches are spawned on. Edits never drive it, so
/// their fetches are dropped unpolled; `resolve` blocks on it.
pub(crate) fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Open the document at `path`. Call from inside a runtime context so a URL
/// background can start resolving.
pub(crate) fn open_document(path: &Path, config: &EditorConfig) -> Result<FileDocument> {
    let fetcher = Arc::new(HttpFetcher::new(config)?);
    FileDocument::open_path(path, fetcher, config)
        .with_context(|| format!("Cannot open document {}", path.display()))
}

pub(crate) fn save_document(file: &FileDocument, path: &Path) -> Result<usize> {
    file.save_to(path)
        .with_context(|| format!("Cannot write document {}", path.display()))
}

/// Read and decode the document at `path`
pub(crate) fn read_document(path: &Path) -> Result<EmojiArt> {
    emoji_art_editor::decode_file(path)
        .with_context(|| format!("Cannot open document {}", path.display()))
}

/// Encode `doc` over the file at `path`
pub(crate) fn write_document(doc: &EmojiArt, path: &Path) -> Result<usize> {
    emoji_art_editor::encode_to_file(doc, path)
        .with_context(|| format!("Cannot write document {}", path.display()))
}
