use super::read_document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use emoji_art_editor::{Background, EmojiArt};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Document to inspect
    pub path: PathBuf,
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    let doc = read_document(&args.path)?;
    print!("{}", describe(&doc));
    Ok(())
}

fn describe(doc: &EmojiArt) -> String {
    let mut out = String::new();

    let background = match doc.background() {
        Background::Blank => "blank".to_string(),
        Background::Url(url) => format!("url {}", url),
        Background::ImageData(bytes) => format!("image data ({} bytes)", bytes.len()),
    };
    out.push_str(&format!("{} {}\n", "Background:".bold(), background));

    out.push_str(&format!("{} {}\n", "Emojis:".bold(), doc.emojis().len()));
    for emoji in doc.emojis() {
        out.push_str(&format!(
            "  #{} {} at ({}, {}) size {}\n",
            emoji.id, emoji.text, emoji.x, emoji.y, emoji.size
        ));
    }
    out
}
