//! generate subcommand - source tree to diagram tree

use clap::Args;
use diagram::{GenerationPipeline, GeneratorSettings};
use klass::KotlinParser;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct GenerateArgs {
    /// Source root to scan
    pub source: PathBuf,
    /// Destination root for the generated diagrams
    pub destination: PathBuf,
    /// JSON settings file
    #[arg(short, long)]
    pub settings: Option<PathBuf>,
    /// Name of the diagram file written per package
    #[arg(long)]
    pub file_name: Option<String>,
    /// Project package prefix, e.g. com.app
    #[arg(short, long)]
    pub package_prefix: Option<String>,
    /// Construction filter, repeatable (stdlib, exclude-package:<pkg>, exclude-name:<glob>, root-package)
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,
    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let settings = load_settings(
        args.settings.as_deref(),
        args.file_name,
        args.package_prefix,
        args.filters,
    )?;

    let mut pipeline = GenerationPipeline::new(settings, KotlinParser::new());
    let report = pipeline.run(&args.source, &args.destination)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Diagrams written: {}", report.written.len());
    for path in &report.written {
        println!("  {}", path.display());
    }
    if !report.skipped.is_empty() {
        println!("Out of scope: {}", report.skipped.len());
    }
    if !report.unparsed_files.is_empty() {
        println!("\nNo declaration found in {} files:", report.unparsed_files.len());
        for file in &report.unparsed_files {
            println!("  {}", file);
        }
    }

    Ok(())
}

/// Defaults, then the settings file, then environment, then flags
pub fn load_settings(
    file: Option<&Path>,
    file_name: Option<String>,
    package_prefix: Option<String>,
    filters: Vec<String>,
) -> anyhow::Result<GeneratorSettings> {
    let mut settings = match file {
        Some(path) => GeneratorSettings::from_file(path)?,
        None => GeneratorSettings::default(),
    }
    .with_env();

    if let Some(name) = file_name {
        settings.generated_file_name = name;
    }
    if let Some(prefix) = package_prefix {
        settings.project_package_prefix = prefix;
    }
    if !filters.is_empty() {
        settings.filters = filters;
    }

    settings.validate()?;
    tracing::debug!("Settings: {:?}", settings);
    Ok(settings)
}
