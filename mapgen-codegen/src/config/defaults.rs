//! Default configuration values - single source of truth

/// Default include tables pattern (all tables)
pub const INCLUDE_TABLES: &str = "*";

/// Default exclude tables pattern (none)
pub const EXCLUDE_TABLES: &str = "";

/// Whether to generate model classes by default
pub const GENERATE_MODELS: bool = true;

/// Whether to generate mapper interfaces by default
pub const GENERATE_MAPPERS: bool = true;

/// Whether to generate XML mapper files by default
pub const GENERATE_XML: bool = true;

/// Default root of the Java source tree
pub const JAVA_OUTPUT_DIR: &str = "./generated/java";

/// Default root of the resources tree holding XML mappers
pub const RESOURCES_OUTPUT_DIR: &str = "./generated/resources";

/// Default package for model classes
pub const MODEL_PACKAGE: &str = "com.example.model";

/// Default package for mapper interfaces
pub const MAPPER_PACKAGE: &str = "com.example.mapper";

/// Default package (directory) for XML mappers
pub const XML_PACKAGE: &str = "com.example.mapper";

/// Whether existing files are merged rather than replaced
pub const MERGE_EXISTING: bool = true;

/// Whether an existing file may be replaced when merging is disabled
pub const OVERWRITE: bool = false;

/// Whether one unmergeable file aborts the whole run
pub const FAIL_FAST: bool = true;

/// Whether the generation timestamp is left out of markers
pub const SUPPRESS_DATE: bool = false;

/// Whether temporal columns map to `java.time` types
pub const JAVA_TIME_TYPES: bool = true;

/// Column at which XML text content is wrapped
pub const XML_WRAP_WIDTH: usize = crate::dom::xml::DEFAULT_WRAP_WIDTH;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;
