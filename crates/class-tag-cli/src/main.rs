use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use class_tag_build::{generate_project, GeneratorConfig, Outcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate inheritance-chain tag constants for a C++ class hierarchy")]
struct Args {
    /// Project name: reads include/<PROJECT>/Shapes.hpp, writes include/<PROJECT>/Constants.hpp
    project: String,
    /// Generator configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Regenerate even if the output is newer than the input
    #[arg(long)]
    force: bool,
    /// Directory containing include/
    #[arg(long, default_value = ".")]
    root_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    let outcome = generate_project(&args.root_dir, &args.project, &config, args.force)
        .with_context(|| format!("generating constants for project '{}'", args.project))?;

    match outcome {
        Outcome::UpToDate => info!(project = %args.project, "nothing to do"),
        Outcome::Written(tags) => {
            info!(project = %args.project, classes = tags.len(), "constants regenerated")
        }
    }
    Ok(())
}
