use super::write_document;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use emoji_art_editor::EmojiArt;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Where to create the document
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

pub fn new(args: NewArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            args.path.display().to_string().bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let bytes = write_document(&EmojiArt::new(), &args.path)?;
    println!(
        "{} Created {} ({} bytes)",
        "✓".green(),
        args.path.display(),
        bytes
    );
    Ok(())
}
