//! # Emoji Art Editor
//!
//! Document model and mutation engine for emoji art: a background image with
//! freely placed, scalable emoji stickers on top.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI: intents (add / move / scale / background)│
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ controller: owns the model                  │
//! │  - Apply intents as whole-model replacement │
//! │  - Undo/redo via snapshot restore           │
//! │  - Publish changes to observers             │
//! └─────────────────────────────────────────────┘
//!          ↓                         ↓
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ resolver: background │  │ autosave / file doc  │
//! │ → image + status     │  │ → codec → disk       │
//! └──────────────────────┘  └──────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Model is source of truth**: the decoded image and fetch status are
//!    derived from the model's background
//! 2. **Whole-value edits**: every intent produces a new model, so undo is a
//!    snapshot restore
//! 3. **Single owner**: fetches run concurrently, but their results are
//!    applied only by the controller's owner, and only if not superseded
//! 4. **Preview failures are local**: a background that cannot be fetched
//!    or decoded never invalidates the document
//!
//! ## Usage
//!
//! ```rust,ignore
//! use emoji_art_editor::{Background, DocumentController, EditorConfig, HttpFetcher};
//! use std::sync::Arc;
//!
//! let config = EditorConfig::default();
//! let fetcher = Arc::new(HttpFetcher::new(&config)?);
//! let mut doc = DocumentController::with_config(fetcher, &config);
//!
//! let smile = doc.add_emoji("😀", (-200, -100), 80);
//! doc.move_emoji(&smile, (10, 10));
//! doc.set_background(Background::Url("https://example.com/sky.jpg".parse()?));
//!
//! doc.settle().await;
//! println!("{:?}", doc.background_fetch_status());
//!
//! doc.undo();
//! ```

mod autosave;
mod codec;
mod config;
mod controller;
mod errors;
mod fetcher;
mod file_document;
mod intent;
mod model;
mod resolver;
mod undo_stack;

pub use autosave::{open_autosaving, Autosaver};
pub use codec::{decode, decode_file, encode, encode_to_file};
pub use config::{default_autosave_path, EditorConfig, AUTOSAVE_FILE_NAME};
pub use controller::{DocumentController, DocumentEvent, Observer, Subscription};
pub use errors::{CodecError, EditorError, FetchError};
pub use fetcher::{HttpFetcher, ImageFetcher};
pub use file_document::FileDocument;
pub use intent::{Applied, Intent, IntentError};
pub use model::{scaled_size, Background, Emoji, EmojiArt, EmojiId, MAX_EMOJI_ID, MIN_EMOJI_SIZE};
pub use resolver::{
    BackgroundImage, BackgroundResolver, Completion, FetchStatus, ResolveToken, ResolverState,
};
pub use undo_stack::{UndoEntry, UndoStack};

// Re-export types that appear in the public API
pub use image::DynamicImage;
pub use reqwest::Url;
