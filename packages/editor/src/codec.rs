//! # Document Codec
//!
//! JSON persistence for [`EmojiArt`].
//!
//! ```json
//! {
//!   "background": { "url": "https://example.com/bg.png" },
//!   "emojis": [ { "id": 1, "text": "😀", "x": -200, "y": -100, "size": 80 } ]
//! }
//! ```
//!
//! The background is one of `{"blank": {}}`, `{"url": "<string>"}` or
//! `{"imageData": "<base64>"}`. Unknown fields are ignored so newer files
//! still open; missing fields are an error.

use crate::errors::CodecError;
use crate::model::{Background, Emoji, EmojiArt, EmojiId, MAX_EMOJI_ID, MIN_EMOJI_SIZE};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct DocumentRepr {
    background: BackgroundRepr,
    emojis: Vec<EmojiRepr>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum BackgroundRepr {
    Blank {},
    Url(String),
    ImageData(String),
}

#[derive(Serialize, Deserialize)]
struct EmojiRepr {
    id: u64,
    text: String,
    x: i32,
    y: i32,
    size: i32,
}

impl From<&Background> for BackgroundRepr {
    fn from(background: &Background) -> Self {
        match background {
            Background::Blank => BackgroundRepr::Blank {},
            Background::Url(url) => BackgroundRepr::Url(url.to_string()),
            Background::ImageData(data) => BackgroundRepr::ImageData(STANDARD.encode(data)),
        }
    }
}

impl TryFrom<BackgroundRepr> for Background {
    type Error = CodecError;

    fn try_from(repr: BackgroundRepr) -> Result<Self, Self::Error> {
        match repr {
            BackgroundRepr::Blank {} => Ok(Background::Blank),
            BackgroundRepr::Url(raw) => Url::parse(&raw)
                .map(Background::Url)
                .map_err(|e| CodecError::InvalidUrl {
                    url: raw,
                    reason: e.to_string(),
                }),
            BackgroundRepr::ImageData(encoded) => STANDARD
                .decode(encoded.as_bytes())
                .map(Background::ImageData)
                .map_err(|e| CodecError::InvalidImageData(e.to_string())),
        }
    }
}

impl From<&Emoji> for EmojiRepr {
    fn from(emoji: &Emoji) -> Self {
        Self {
            id: emoji.id.0,
            text: emoji.text.clone(),
            x: emoji.x,
            y: emoji.y,
            size: emoji.size,
        }
    }
}

/// Serialize a document. Output is deterministic for equal documents.
pub fn encode(doc: &EmojiArt) -> Result<Vec<u8>, CodecError> {
    let repr = DocumentRepr {
        background: doc.background().into(),
        emojis: doc.emojis().iter().map(EmojiRepr::from).collect(),
    };
    Ok(serde_json::to_vec(&repr)?)
}

/// Parse a document, validating the invariants the model relies on
pub fn decode(bytes: &[u8]) -> Result<EmojiArt, CodecError> {
    let repr: DocumentRepr = serde_json::from_slice(bytes)?;
    let background = Background::try_from(repr.background)?;

    let mut seen = HashSet::with_capacity(repr.emojis.len());
    let mut emojis = Vec::with_capacity(repr.emojis.len());
    for emoji in repr.emojis {
        if emoji.id > MAX_EMOJI_ID {
            return Err(CodecError::InvalidEmoji(format!(
                "id {} exceeds maximum {}",
                emoji.id, MAX_EMOJI_ID
            )));
        }
        if !seen.insert(emoji.id) {
            return Err(CodecError::InvalidEmoji(format!("duplicate id {}", emoji.id)));
        }
        if emoji.size < MIN_EMOJI_SIZE {
            return Err(CodecError::InvalidEmoji(format!(
                "emoji {} has size {} below minimum {}",
                emoji.id, emoji.size, MIN_EMOJI_SIZE
            )));
        }
        emojis.push(Emoji {
            id: EmojiId(emoji.id),
            text: emoji.text,
            x: emoji.x,
            y: emoji.y,
            size: emoji.size,
        });
    }

    Ok(EmojiArt::from_parts(background, emojis))
}

/// Read and parse the document stored at `path`
pub fn decode_file(path: &Path) -> Result<EmojiArt, CodecError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CodecError::NotFound(path.to_path_buf()),
        _ => CodecError::Io(e),
    })?;
    decode(&bytes)
}

/// Encode `doc` and overwrite `path`, creating parent directories
pub fn encode_to_file(doc: &EmojiArt, path: &Path) -> Result<usize, CodecError> {
    let bytes = encode(doc)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;
    Ok(bytes.len())
}
