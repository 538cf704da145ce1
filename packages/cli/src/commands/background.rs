use super::{open_document, runtime, save_document};
use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use colored::Colorize;
use emoji_art_editor::{Background, EditorConfig, Url};
use std::path::PathBuf;

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "image", "clear"])))]
pub struct BackgroundArgs {
    /// Document to edit
    pub path: PathBuf,

    /// Use a remote image
    #[arg(long)]
    pub url: Option<Url>,

    /// Embed a local image file
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Remove the background
    #[arg(long)]
    pub clear: bool,
}

pub fn background(args: BackgroundArgs, config: &EditorConfig) -> Result<()> {
    let background = if let Some(url) = args.url {
        Background::Url(url)
    } else if let Some(image) = &args.image {
        let bytes = std::fs::read(image)
            .with_context(|| format!("Cannot read image {}", image.display()))?;
        Background::ImageData(bytes)
    } else {
        Background::Blank
    };

    let runtime = runtime()?;
    let _context = runtime.enter();
    let mut file = open_document(&args.path, config)?;
    let kind = background.kind();
    file.controller_mut().set_background(background);
    save_document(&file, &args.path)?;

    println!("{} Background set to {}", "✓".green(), kind);
    Ok(())
}
