//! # Document Model
//!
//! The persisted state of an emoji art document: one background and an
//! ordered collection of placed emoji.
//!
//! The model is a plain value. Every edit produces a new value derived from
//! the previous one, which is what lets the controller keep whole-model
//! snapshots for undo.
//!
//! ## Ordering
//!
//! ```text
//! emojis[0]  → drawn first (bottom)
//! emojis[n]  → drawn last  (top)
//! ```

use reqwest::Url;
use std::sync::atomic::{AtomicU64, Ordering};

/// Smallest size an emoji can be scaled down to
pub const MIN_EMOJI_SIZE: i32 = 1;

/// Largest id a persisted document may carry. Ids stay within the signed
/// 64-bit range so other JSON readers see them exactly, and the allocator
/// always has room to move past a loaded document.
pub const MAX_EMOJI_ID: u64 = i64::MAX as u64;

/// Next id handed out by [`EmojiId::next`]. Shared by every document in the
/// process so ids are never reused.
static NEXT_EMOJI_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a placed emoji
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmojiId(pub u64);

impl EmojiId {
    /// Allocate a fresh id
    ///
    /// Panics once the id space is used up. Loaded ids never exceed
    /// [`MAX_EMOJI_ID`], so that takes at least 2^63 allocations.
    pub fn next() -> Self {
        match NEXT_EMOJI_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1)) {
            Ok(id) => EmojiId(id),
            Err(_) => panic!("emoji id space exhausted"),
        }
    }

    /// Make sure ids allocated from now on are greater than `id`.
    /// Called when a persisted document brings its own ids along.
    pub(crate) fn reserve_through(id: EmojiId) {
        NEXT_EMOJI_ID.fetch_max(id.0.saturating_add(1), Ordering::SeqCst);
    }
}

impl std::fmt::Display for EmojiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The single image source of the canvas
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    Blank,
    Url(Url),
    ImageData(Vec<u8>),
}

impl Background {
    pub fn url(&self) -> Option<&Url> {
        match self {
            Background::Url(url) => Some(url),
            _ => None,
        }
    }

    pub fn image_data(&self) -> Option<&[u8]> {
        match self {
            Background::ImageData(data) => Some(data),
            _ => None,
        }
    }

    /// Short name of the active variant, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Background::Blank => "blank",
            Background::Url(_) => "url",
            Background::ImageData(_) => "imageData",
        }
    }
}

/// A placed emoji sticker
///
/// Coordinates are relative to the document origin, not the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emoji {
    pub id: EmojiId,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub size: i32,
}

/// Emoji art document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmojiArt {
    background: Background,
    emojis: Vec<Emoji>,
}

impl EmojiArt {
    /// Blank document with no emoji
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a document from already validated parts (decode path).
    /// Ids must be unique; the process-wide allocator is advanced past them.
    pub(crate) fn from_parts(background: Background, emojis: Vec<Emoji>) -> Self {
        if let Some(max) = emojis.iter().map(|e| e.id).max() {
            EmojiId::reserve_through(max);
        }
        Self { background, emojis }
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Emoji in draw order
    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    pub fn emoji(&self, id: EmojiId) -> Option<&Emoji> {
        self.emojis.iter().find(|e| e.id == id)
    }

    /// Append a new emoji on top of all others and return it
    pub fn add_emoji(&mut self, text: impl Into<String>, at: (i32, i32), size: i32) -> Emoji {
        let emoji = Emoji {
            id: EmojiId::next(),
            text: text.into(),
            x: at.0,
            y: at.1,
            size: size.max(MIN_EMOJI_SIZE),
        };
        self.emojis.push(emoji.clone());
        emoji
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// Current index of `emoji`, matched by id only
    pub fn index_of(&self, emoji: &Emoji) -> Option<usize> {
        self.index_of_id(emoji.id)
    }

    pub fn index_of_id(&self, id: EmojiId) -> Option<usize> {
        self.emojis.iter().position(|e| e.id == id)
    }

    /// Offset the emoji at `index`. Out of range indices are ignored.
    pub fn move_emoji_at(&mut self, index: usize, by: (i32, i32)) {
        if let Some(emoji) = self.emojis.get_mut(index) {
            emoji.x = emoji.x.saturating_add(by.0);
            emoji.y = emoji.y.saturating_add(by.1);
        }
    }

    /// Rescale the emoji at `index`. Out of range indices are ignored.
    pub fn scale_emoji_at(&mut self, index: usize, factor: f64) {
        if let Some(emoji) = self.emojis.get_mut(index) {
            emoji.size = scaled_size(emoji.size, factor);
        }
    }
}

/// `size * factor`, rounded to nearest with ties away from zero, kept at or
/// above [`MIN_EMOJI_SIZE`].
pub fn scaled_size(size: i32, factor: f64) -> i32 {
    let scaled = (f64::from(size) * factor).round();
    if scaled.is_nan() {
        return MIN_EMOJI_SIZE;
    }
    // `as` saturates at the i32 bounds
    (scaled as i32).max(MIN_EMOJI_SIZE)
}
