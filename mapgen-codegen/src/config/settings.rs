//! Configuration settings for mapgen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::defaults;
use crate::error::{CodegenError, Result};

/// SQL dialect used to read the schema file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    Mysql,
    Postgres,
    Generic,
}

impl SqlDialect {
    /// Name understood by `sqlparser::dialect::dialect_from_str`
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlDialect::Mysql => "mysql",
            SqlDialect::Postgres => "postgres",
            SqlDialect::Generic => "generic",
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to the SQL schema file
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Dialect the schema file is written in
    #[serde(default)]
    pub dialect: SqlDialect,

    /// Tables to include (comma-separated, or "*" for all)
    #[serde(default = "default_include_tables")]
    pub include_tables: String,

    /// Tables to exclude (comma-separated)
    #[serde(default = "default_exclude_tables")]
    pub exclude_tables: String,

    /// Whether to generate model classes
    #[serde(default = "default_generate_models")]
    pub generate_models: bool,

    /// Whether to generate mapper interfaces
    #[serde(default = "default_generate_mappers")]
    pub generate_mappers: bool,

    /// Whether to generate XML mapper files
    #[serde(default = "default_generate_xml")]
    pub generate_xml: bool,

    /// Root of the Java source tree
    #[serde(default = "default_java_output_dir")]
    pub java_output_dir: PathBuf,

    /// Root of the resources tree for XML mappers
    #[serde(default = "default_resources_output_dir")]
    pub resources_output_dir: PathBuf,

    /// Package for model classes
    #[serde(default = "default_model_package")]
    pub model_package: String,

    /// Package for mapper interfaces
    #[serde(default = "default_mapper_package")]
    pub mapper_package: String,

    /// Package (directory) for XML mappers
    #[serde(default = "default_xml_package")]
    pub xml_package: String,

    /// Merge into existing files instead of replacing them
    #[serde(default = "default_merge_existing")]
    pub merge_existing: bool,

    /// Replace existing files when merging is disabled
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,

    /// Abort the whole run when one existing file cannot be merged
    #[serde(default = "default_fail_fast")]
    pub fail_fast: bool,

    /// Leave the generation timestamp out of markers
    #[serde(default = "default_suppress_date")]
    pub suppress_date: bool,

    /// Map temporal columns to `java.time` instead of `java.util.Date`
    #[serde(default = "default_java_time_types")]
    pub java_time_types: bool,

    /// Extra Javadoc tags that mark a declaration as generated
    #[serde(default)]
    pub javadoc_tags: Vec<String>,

    /// Column at which XML text content is wrapped
    #[serde(default = "default_xml_wrap_width")]
    pub xml_wrap_width: usize,

    /// Dry run mode - preview without writing files
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_include_tables() -> String {
    defaults::INCLUDE_TABLES.to_string()
}
fn default_exclude_tables() -> String {
    defaults::EXCLUDE_TABLES.to_string()
}
fn default_generate_models() -> bool {
    defaults::GENERATE_MODELS
}
fn default_generate_mappers() -> bool {
    defaults::GENERATE_MAPPERS
}
fn default_generate_xml() -> bool {
    defaults::GENERATE_XML
}
fn default_java_output_dir() -> PathBuf {
    PathBuf::from(defaults::JAVA_OUTPUT_DIR)
}
fn default_resources_output_dir() -> PathBuf {
    PathBuf::from(defaults::RESOURCES_OUTPUT_DIR)
}
fn default_model_package() -> String {
    defaults::MODEL_PACKAGE.to_string()
}
fn default_mapper_package() -> String {
    defaults::MAPPER_PACKAGE.to_string()
}
fn default_xml_package() -> String {
    defaults::XML_PACKAGE.to_string()
}
fn default_merge_existing() -> bool {
    defaults::MERGE_EXISTING
}
fn default_overwrite() -> bool {
    defaults::OVERWRITE
}
fn default_fail_fast() -> bool {
    defaults::FAIL_FAST
}
fn default_suppress_date() -> bool {
    defaults::SUPPRESS_DATE
}
fn default_java_time_types() -> bool {
    defaults::JAVA_TIME_TYPES
}
fn default_xml_wrap_width() -> usize {
    defaults::XML_WRAP_WIDTH
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            dialect: SqlDialect::default(),
            include_tables: default_include_tables(),
            exclude_tables: default_exclude_tables(),
            generate_models: default_generate_models(),
            generate_mappers: default_generate_mappers(),
            generate_xml: default_generate_xml(),
            java_output_dir: default_java_output_dir(),
            resources_output_dir: default_resources_output_dir(),
            model_package: default_model_package(),
            mapper_package: default_mapper_package(),
            xml_package: default_xml_package(),
            merge_existing: default_merge_existing(),
            overwrite: default_overwrite(),
            fail_fast: default_fail_fast(),
            suppress_date: default_suppress_date(),
            java_time_types: default_java_time_types(),
            javadoc_tags: Vec::new(),
            xml_wrap_width: default_xml_wrap_width(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl CodegenConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodegenConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from config file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            // Try default locations
            builder = builder.add_source(File::with_name("mapgen").required(false));
        }

        // Override with environment variables (MAPGEN_*)
        builder = builder.add_source(Environment::with_prefix("MAPGEN").try_parsing(true));

        let config: CodegenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Directory holding the model classes
    pub fn model_dir(&self) -> PathBuf {
        package_dir(&self.java_output_dir, &self.model_package)
    }

    /// Directory holding the mapper interfaces
    pub fn mapper_dir(&self) -> PathBuf {
        package_dir(&self.java_output_dir, &self.mapper_package)
    }

    /// Directory holding the XML mappers
    pub fn xml_dir(&self) -> PathBuf {
        package_dir(&self.resources_output_dir, &self.xml_package)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema_file.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "schema_file is required".into(),
            ));
        }

        if !self.schema_file.exists() {
            return Err(CodegenError::ValidationError(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        if self.generate_models {
            check_package("model_package", &self.model_package)?;
        }

        if self.generate_mappers || self.generate_xml {
            if !self.generate_models {
                return Err(CodegenError::ValidationError(
                    "generate_models must be true when mappers are generated (mappers depend on models)".into(),
                ));
            }
            check_package("mapper_package", &self.mapper_package)?;
        }

        if self.generate_xml {
            check_package("xml_package", &self.xml_package)?;
        }

        if self.xml_wrap_width == 0 {
            return Err(CodegenError::ValidationError(
                "xml_wrap_width must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

fn package_dir(root: &Path, package: &str) -> PathBuf {
    package
        .split('.')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment))
}

fn check_package(field: &str, package: &str) -> Result<()> {
    if package.is_empty() {
        return Err(CodegenError::ValidationError(format!(
            "{} is required",
            field
        )));
    }

    let valid = package.split('.').all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    });
    if !valid {
        return Err(CodegenError::ValidationError(format!(
            "{} is not a valid Java package name: {}",
            field, package
        )));
    }
    Ok(())
}
