use super::{open_document, runtime, save_document};
use anyhow::{ensure, Result};
use clap::Args;
use colored::Colorize;
use emoji_art_editor::{EditorConfig, MIN_EMOJI_SIZE};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Document to edit
    pub path: PathBuf,

    /// Emoji text to place
    pub emoji: String,

    /// Horizontal position relative to the document center
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub x: i32,

    /// Vertical position relative to the document center
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub y: i32,

    /// Emoji size
    #[arg(short, long, default_value_t = 40)]
    pub size: i32,
}

pub fn add(args: AddArgs, config: &EditorConfig) -> Result<()> {
    ensure!(!args.emoji.is_empty(), "Emoji text cannot be empty");
    ensure!(
        args.size >= MIN_EMOJI_SIZE,
        "Size must be at least {}",
        MIN_EMOJI_SIZE
    );

    let runtime = runtime()?;
    let _context = runtime.enter();
    let mut file = open_document(&args.path, config)?;
    let emoji = file
        .controller_mut()
        .add_emoji(args.emoji, (args.x, args.y), args.size);
    save_document(&file, &args.path)?;

    println!(
        "{} Added {} #{} at ({}, {}) size {}",
        "✓".green(),
        emoji.text,
        emoji.id,
        emoji.x,
        emoji.y,
        emoji.size
    );
    Ok(())
}
