//! inspect subcommand - one file and its package neighbours

use crate::generate_cli::load_settings;
use clap::Args;
use diagram::inspect_file;
use klass::{KlassWithRelations, KotlinParser};
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectArgs {
    /// Kotlin source file
    pub file: PathBuf,
    /// JSON settings file
    #[arg(short, long)]
    pub settings: Option<PathBuf>,
    /// Construction filter, repeatable
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,
    /// JSON output
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.settings.as_deref(), None, None, args.filters)?;

    let inspection = match inspect_file(&mut KotlinParser::new(), &settings, &args.file)? {
        Some(inspection) => inspection,
        None => {
            println!("No class, interface or object declared in {}", args.file.display());
            return Ok(());
        }
    };

    if args.json {
        #[derive(serde::Serialize)]
        struct EntityItem {
            name: String,
            package: String,
            file: String,
            imports: Vec<String>,
            parameters: Vec<String>,
            inheritances: Vec<String>,
            disabled: bool,
        }

        #[derive(serde::Serialize)]
        struct InspectOutput {
            entity: EntityItem,
            adjacent: Vec<String>,
            packages: Vec<String>,
            package_items: Vec<String>,
            document: String,
        }

        let output = InspectOutput {
            entity: entity_item(&inspection.entity),
            adjacent: inspection.adjacent.iter().map(|a| a.name().to_string()).collect(),
            packages: inspection.packages,
            package_items: inspection.package_items,
            document: inspection.document,
        };

        fn entity_item(entity: &KlassWithRelations) -> EntityItem {
            EntityItem {
                name: entity.name().to_string(),
                package: entity.file_package_string(),
                file: entity.file_path.clone(),
                imports: entity.file_imports.iter().map(|i| i.to_string()).collect(),
                parameters: entity.parameters.clone(),
                inheritances: entity.inheritances.clone(),
                disabled: entity.disabled,
            }
        }

        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let entity = &inspection.entity;
    println!("{} ({})", entity.item.qualified_name(), entity.file_path);
    if entity.disabled {
        println!("  disabled: hidden from generated diagrams");
    }

    println!("\nImports:");
    for import in &entity.file_imports {
        println!("  {}", import);
    }
    println!("\nParameters:");
    for parameter in &entity.parameters {
        println!("  {}", parameter);
    }
    println!("\nSupertypes:");
    for inheritance in &entity.inheritances {
        println!("  {}", inheritance);
    }
    println!("\nSame directory:");
    for adjacent in &inspection.adjacent {
        println!("  {}", adjacent.name());
    }

    println!("\n{}", inspection.document);
    Ok(())
}
