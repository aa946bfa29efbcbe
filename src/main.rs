//! class-relations - per-package class relation diagrams for Kotlin sources

mod generate_cli;
mod inspect_cli;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "class-relations")]
#[command(about = "Per-package class relation diagrams for Kotlin sources", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one diagram per package directory
    Generate(generate_cli::GenerateArgs),
    /// Show what a single source file contributes
    Inspect(inspect_cli::InspectArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate_cli::run(args)?,
        Commands::Inspect(args) => inspect_cli::run(args)?,
    }

    Ok(())
}
