//! CLI entry point for mapgen

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mapgen_codegen::config::CodegenConfig;

#[derive(Parser)]
#[command(name = "mapgen")]
#[command(about = "Generate and merge Java models, MyBatis mappers and XML mappers from SQL schema DDL")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to SQL schema file (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Java source root (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Resources root for XML mappers (overrides config)
    #[arg(short, long)]
    resources: Option<PathBuf>,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate all (models, mapper interfaces and XML mappers)
    Generate,
    /// Generate only model classes
    Models,
    /// Generate only mapper interfaces and XML mappers
    Mappers,
    /// Inspect schema (show parsed tables for debugging)
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = CodegenConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(output) = cli.output {
        config.java_output_dir = output;
    }
    if let Some(resources) = cli.resources {
        config.resources_output_dir = resources;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    // Apply command-specific settings
    match &cli.command {
        Some(Commands::Models) => {
            config.generate_mappers = false;
            config.generate_xml = false;
        }
        Some(Commands::Mappers) => {
            // mapper files reference the model classes, which must already exist
            config.generate_models = false;
        }
        Some(Commands::Inspect) => {
            return inspect_schema(&config);
        }
        _ => {}
    }

    // Validate configuration
    if config.generate_models {
        config.validate()?;
    } else {
        validate_mappers_only(&config)?;
    }

    info!("Generating code from schema: {:?}", config.schema_file);
    let report = mapgen_codegen::generate(&config)?;

    if config.dry_run {
        println!("Dry run mode - would write:");
        for path in &report.written {
            println!("  {}", path.display());
        }
    }
    for (path, reason) in &report.skipped {
        println!("Skipped {}: {}", path.display(), reason);
    }
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }

    info!("Code generation completed successfully");
    Ok(())
}

/// `mappers` runs against models generated earlier, so only the mapper side is checked
fn validate_mappers_only(config: &CodegenConfig) -> Result<()> {
    let mut check = config.clone();
    check.generate_models = true;
    check.validate()?;
    Ok(())
}

fn inspect_schema(config: &CodegenConfig) -> Result<()> {
    let schema_sql = std::fs::read_to_string(&config.schema_file)?;
    let tables = mapgen_codegen::parser::parse_schema(&schema_sql, config.dialect)?;

    println!("Parsed {} tables ({}):\n", tables.len(), config.dialect);
    for table in &tables {
        println!("Table: {}", table.name);
        println!("  Columns:");
        for col in &table.columns {
            let nullable = if col.nullable { "NULL" } else { "NOT NULL" };
            let auto_inc = if col.is_auto_increment {
                " AUTO_INCREMENT"
            } else {
                ""
            };
            println!(
                "    - {} {} {}{}",
                col.name, col.data_type, nullable, auto_inc
            );
            if let Some(enum_values) = &col.enum_values {
                println!("      ENUM values: {:?}", enum_values);
            }
        }
        if let Some(pk) = &table.primary_key {
            println!("  Primary Key: {:?}", pk.columns);
        }
        if !table.indexes.is_empty() {
            println!("  Indexes:");
            for idx in &table.indexes {
                let unique = if idx.unique { "UNIQUE " } else { "" };
                println!("    - {}INDEX {} ({:?})", unique, idx.name, idx.columns);
            }
        }
        if !table.foreign_keys.is_empty() {
            println!("  Foreign Keys:");
            for fk in &table.foreign_keys {
                println!(
                    "    - {} -> {}.{}",
                    fk.column_name, fk.referenced_table, fk.referenced_column
                );
            }
        }
        println!();
    }

    Ok(())
}
