mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    add, background, inspect, new, resolve, AddArgs, BackgroundArgs, InspectArgs, NewArgs,
    ResolveArgs,
};
use emoji_art_editor::EditorConfig;
use std::path::PathBuf;

/// Emoji Art - compose emoji stickers over a background image
#[derive(Parser, Debug)]
#[command(name = "emoji-art")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Editor settings file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty document
    New(NewArgs),

    /// Show a document's background and emojis
    Inspect(InspectArgs),

    /// Place an emoji on a document
    Add(AddArgs),

    /// Change or clear a document's background
    Background(BackgroundArgs),

    /// Fetch and decode a document's background
    Resolve(ResolveArgs),
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Command::New(args) => new(args),
        Command::Inspect(args) => inspect(args),
        Command::Add(args) => add(args, &config),
        Command::Background(args) => background(args, &config),
        Command::Resolve(args) => resolve(args, &config),
    });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
