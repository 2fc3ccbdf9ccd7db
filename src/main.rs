//! `gh2md` CLI - Export a GitHub profile as Markdown files

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gh2md::extract::{authenticated_user, gh_available, GhExtractor};
use gh2md::{Converter, MarkdownWriter};

#[derive(Parser)]
#[command(name = "gh2md")]
#[command(about = "Convert GitHub profile data to Markdown for LLM analysis")]
#[command(version)]
struct Cli {
    /// GitHub username (defaults to the authenticated user)
    username: Option<String>,

    /// Output directory
    #[arg(short, long, default_value = "github_export")]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Warnings go to stderr so piped stdout stays clean.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let username = match cli.username {
        Some(username) => username,
        None => match authenticated_user() {
            Some(username) => {
                println!("Using authenticated user: {username}");
                username
            }
            None => {
                bail!("No username provided and not authenticated. Run 'gh auth login' first.")
            }
        },
    };

    if !gh_available() {
        bail!("gh CLI not found; install it from https://cli.github.com");
    }

    let writer = MarkdownWriter::new(&cli.output)?;
    let converter = Converter::new(GhExtractor::new(None), writer);

    println!("Fetching GitHub data for: {username}");
    let files = converter.convert(&username)?;

    println!("\nCreated {} files in {}/", files.len(), cli.output.display());
    for file in &files {
        if let Some(name) = file.file_name() {
            println!("  - {}", name.to_string_lossy());
        }
    }

    Ok(())
}
