//! mapgen-codegen: Generate Java models, MyBatis mapper interfaces and XML
//! mappers from SQL schema DDL, merging into files that already exist
//!
//! The crate is both a CLI tool and a library. It parses SQL DDL using
//! `sqlparser-rs`, builds an in-memory model of every output file and renders
//! it to text:
//!
//! - JavaBeans model classes with one property per column
//! - Mapper interfaces with primary-key and unique-key CRUD methods
//! - XML mappers with a result map, a column list and the matching statements
//!
//! Every generated declaration carries the `@mbg.generated` marker. When an
//! output file already exists, only marked declarations are replaced; anything
//! written by hand is kept verbatim.
//!
//! # Library Usage
//!
//! ```rust,ignore
//! use std::path::PathBuf;
//!
//! fn main() {
//!     mapgen_codegen::CodegenBuilder::new("schema.sql")
//!         .java_output_dir(PathBuf::from("src/main/java"))
//!         .resources_output_dir(PathBuf::from("src/main/resources"))
//!         .model_package("com.example.model")
//!         .mapper_package("com.example.mapper")
//!         .generate()
//!         .expect("Failed to generate mappers");
//! }
//! ```
//!
//! The merge engine can also be used on its own:
//!
//! ```rust,ignore
//! use mapgen_codegen::merge::{merge_java_file, MergeOutcome, ProvenanceTags};
//!
//! match merge_java_file(&unit, Some(&existing), &ProvenanceTags::default()) {
//!     MergeOutcome::Rendered { content, warnings } => { /* write content */ }
//!     MergeOutcome::ParseFailed { reason } => { /* leave the file alone */ }
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! mapgen --schema schema.sql --output ./src/main/java --resources ./src/main/resources generate
//! ```

pub mod codegen;
pub mod config;
pub mod dom;
pub mod error;
pub mod merge;
pub mod parser;

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

pub use codegen::GenerationReport;
pub use config::{CodegenConfig, SqlDialect};
pub use error::{CodegenError, Result};

/// Main entry point for code generation
pub fn generate(config: &CodegenConfig) -> Result<GenerationReport> {
    info!("Parsing schema: {:?}", config.schema_file);
    let schema_sql = std::fs::read_to_string(&config.schema_file)?;
    let tables = parser::parse_schema(&schema_sql, config.dialect)?;
    info!("Found {} tables", tables.len());

    let tables = filter_tables(tables, &config.include_tables, &config.exclude_tables);
    debug!(
        "After filtering: {} tables (include={}, exclude={})",
        tables.len(),
        config.include_tables,
        config.exclude_tables
    );

    let report = codegen::CodeGenerator::new(config).generate(&tables)?;

    info!(
        "Code generation complete: {} written, {} unchanged, {} skipped, {} warnings",
        report.written.len(),
        report.unchanged.len(),
        report.skipped.len(),
        report.warnings.len()
    );
    Ok(report)
}

/// Filter tables based on include/exclude patterns
fn filter_tables(
    tables: Vec<parser::TableMetadata>,
    include: &str,
    exclude: &str,
) -> Vec<parser::TableMetadata> {
    let include_all = include.trim() == "*" || include.trim().is_empty();
    let include_set: HashSet<String> = if include_all {
        HashSet::new()
    } else {
        include.split(',').map(|s| s.trim().to_string()).collect()
    };
    let exclude_set: HashSet<String> = exclude
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    tables
        .into_iter()
        .filter(|t| {
            let name = &t.name;
            let included = include_all || include_set.contains(name);
            let excluded = exclude_set.contains(name);
            included && !excluded
        })
        .collect()
}

/// Builder pattern for easy configuration from build scripts and tests
pub struct CodegenBuilder {
    config: CodegenConfig,
}

impl CodegenBuilder {
    /// Create a new builder with the given schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Set the SQL dialect of the schema file
    pub fn dialect(mut self, dialect: SqlDialect) -> Self {
        self.config.dialect = dialect;
        self
    }

    /// Set one output root for both Java sources and XML mappers
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.config.java_output_dir = dir.join("java");
        self.config.resources_output_dir = dir.join("resources");
        self
    }

    /// Set the root of the Java source tree
    pub fn java_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.java_output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the root of the resources tree
    pub fn resources_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.resources_output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set tables to include (comma-separated or array)
    pub fn include_tables(mut self, tables: &[&str]) -> Self {
        self.config.include_tables = tables.join(",");
        self
    }

    /// Set tables to exclude (comma-separated or array)
    pub fn exclude_tables(mut self, tables: &[&str]) -> Self {
        self.config.exclude_tables = tables.join(",");
        self
    }

    /// Generate only model classes
    pub fn models_only(mut self) -> Self {
        self.config.generate_mappers = false;
        self.config.generate_xml = false;
        self
    }

    /// Set the package of the model classes
    pub fn model_package(mut self, package: &str) -> Self {
        self.config.model_package = package.to_string();
        self
    }

    /// Set the package of the mapper interfaces and XML mappers
    pub fn mapper_package(mut self, package: &str) -> Self {
        self.config.mapper_package = package.to_string();
        self.config.xml_package = package.to_string();
        self
    }

    /// Leave generation timestamps out of markers
    pub fn suppress_date(mut self) -> Self {
        self.config.suppress_date = true;
        self
    }

    /// Replace existing files instead of merging into them
    pub fn overwrite(mut self) -> Self {
        self.config.merge_existing = false;
        self.config.overwrite = true;
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    /// The configuration built so far
    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Generate the code
    pub fn generate(self) -> Result<GenerationReport> {
        self.config.validate()?;
        generate(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> parser::TableMetadata {
        parser::TableMetadata {
            name: name.to_string(),
            comment: None,
            columns: vec![],
            indexes: vec![],
            foreign_keys: vec![],
            primary_key: None,
        }
    }

    #[test]
    fn test_filter_tables() {
        let tables = vec![table("users"), table("orders"), table("migrations")];

        let all = filter_tables(tables.clone(), "*", "migrations");
        let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "orders"]);

        let some = filter_tables(tables, "users, orders", "orders");
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].name, "users");
    }

    #[test]
    fn test_builder_sets_packages() {
        let builder = CodegenBuilder::new("schema.sql")
            .output_dir("out")
            .mapper_package("org.shop.mapper")
            .models_only();
        let config = builder.config();
        assert_eq!(config.java_output_dir, Path::new("out").join("java"));
        assert_eq!(config.xml_package, "org.shop.mapper");
        assert!(!config.generate_xml);
    }
}
