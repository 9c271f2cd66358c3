//! Offline build: raw play-time log in, similarity artifact out.
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use steam_recommender::{config::Config, init_tracing, services::Artifact};

#[derive(Debug, Parser)]
#[command(name = "build-model", about = "Build the item similarity artifact from a raw event log")]
struct Args {
    /// Raw event log (defaults to RAW_LOG_PATH)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Artifact destination (defaults to ARTIFACT_PATH)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = Config::from_env()?;
    let input = args.input.unwrap_or(config.raw_log_path);
    let output = args.output.unwrap_or(config.artifact_path);

    let artifact = Artifact::build_from_path(&input)
        .with_context(|| format!("Failed to build artifact from {}", input.display()))?;
    artifact
        .save(&output)
        .with_context(|| format!("Failed to write artifact to {}", output.display()))?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        items = artifact.similarity.len(),
        catalog = artifact.catalog.len(),
        users = artifact.metadata.users,
        "Build complete"
    );

    Ok(())
}
