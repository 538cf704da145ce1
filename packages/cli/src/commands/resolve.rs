use super::{open_document, runtime};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use emoji_art_editor::{EditorConfig, FetchStatus};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Document whose background to resolve
    pub path: PathBuf,
}

pub fn resolve(args: ResolveArgs, config: &EditorConfig) -> Result<()> {
    runtime()?.block_on(resolve_document(args, config))
}

async fn resolve_document(args: ResolveArgs, config: &EditorConfig) -> Result<()> {
    let mut file = open_document(&args.path, config)?;

    let doc = file.controller_mut();
    println!(
        "{} {} background",
        "Resolving".bright_blue().bold(),
        doc.background().kind()
    );
    doc.settle().await;

    match doc.background_fetch_status() {
        FetchStatus::Failed(url) => {
            println!("  {} Could not load {}", "✗".red(), url);
        }
        FetchStatus::Idle | FetchStatus::Fetching => match doc.background_image() {
            Some(image) => println!(
                "  {} Image {}x{}",
                "✓".green(),
                image.width(),
                image.height()
            ),
            None => println!("  {} No image", "-".dimmed()),
        },
    }
    Ok(())
}
