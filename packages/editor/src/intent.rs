//! # Intents
//!
//! Named user-facing edits on an [`EmojiArt`] document.
//!
//! ## Semantics
//!
//! ### AddEmoji
//! - Allocates a fresh id and appends on top of every other emoji
//! - Never fails
//!
//! ### MoveEmoji / ScaleEmoji
//! - Target is found by id, so a stale copy of the emoji still works
//! - Fails with `EmojiNotFound` if the id is not in the document
//!
//! ### SetBackground
//! - Replaces the background wholesale, even with an equal value

use crate::model::{Background, Emoji, EmojiArt, EmojiId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SetBackground {
        background: Background,
    },

    AddEmoji {
        text: String,
        x: i32,
        y: i32,
        size: i32,
    },

    /// Offset an emoji's position
    MoveEmoji {
        id: EmojiId,
        dx: i32,
        dy: i32,
    },

    /// Multiply an emoji's size
    ScaleEmoji {
        id: EmojiId,
        factor: f64,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("Emoji not found: {0}")]
    EmojiNotFound(EmojiId),
}

/// What an applied intent produced
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Added(Emoji),
    Updated,
}

impl Intent {
    /// Human-readable name, used to label undo entries
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SetBackground { .. } => "Set Background",
            Intent::AddEmoji { .. } => "Add Emoji",
            Intent::MoveEmoji { .. } => "Move Emoji",
            Intent::ScaleEmoji { .. } => "Scale Emoji",
        }
    }

    /// Apply to `doc` in place
    pub fn apply(&self, doc: &mut EmojiArt) -> Result<Applied, IntentError> {
        match self {
            Intent::SetBackground { background } => {
                doc.set_background(background.clone());
                Ok(Applied::Updated)
            }

            Intent::AddEmoji { text, x, y, size } => {
                Ok(Applied::Added(doc.add_emoji(text.clone(), (*x, *y), *size)))
            }

            Intent::MoveEmoji { id, dx, dy } => {
                let index = Self::locate(doc, *id)?;
                doc.move_emoji_at(index, (*dx, *dy));
                Ok(Applied::Updated)
            }

            Intent::ScaleEmoji { id, factor } => {
                let index = Self::locate(doc, *id)?;
                doc.scale_emoji_at(index, *factor);
                Ok(Applied::Updated)
            }
        }
    }

    fn locate(doc: &EmojiArt, id: EmojiId) -> Result<usize, IntentError> {
        doc.index_of_id(id).ok_or(IntentError::EmojiNotFound(id))
    }
}
