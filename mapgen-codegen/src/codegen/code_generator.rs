//! Main code generator orchestrator

use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::CodegenConfig;
use crate::dom::java::CompilationUnit;
use crate::dom::xml::Document;
use crate::error::{CodegenError, Result};
use crate::merge::{merge_java_file, merge_xml_file, GeneratedMarker, MergeOutcome, ProvenanceTags};
use crate::parser::TableMetadata;

use super::introspected::IntrospectedTable;
use super::mapper_generator::build_mapper;
use super::model_generator::build_model;
use super::xml_mapper_generator::build_xml_mapper;

/// One output file before it is reconciled with the disk
#[derive(Debug, Clone)]
pub enum GeneratedFile {
    Java {
        path: PathBuf,
        unit: CompilationUnit,
    },
    Xml {
        path: PathBuf,
        document: Document,
    },
}

impl GeneratedFile {
    pub fn path(&self) -> &Path {
        match self {
            GeneratedFile::Java { path, .. } | GeneratedFile::Xml { path, .. } => path,
        }
    }
}

/// What a run did, per file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Files created or changed (or that would be, in dry-run mode)
    pub written: Vec<PathBuf>,
    /// Files whose merged content equals what is already on disk
    pub unchanged: Vec<PathBuf>,
    /// Existing files left alone, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Merge warnings, prefixed with the file they concern
    pub warnings: Vec<String>,
}

/// Decision for one file after reconciliation
#[derive(Debug)]
enum Reconciled {
    Write {
        path: PathBuf,
        content: String,
        warnings: Vec<String>,
    },
    Unchanged {
        path: PathBuf,
        warnings: Vec<String>,
    },
    Skip {
        path: PathBuf,
        reason: String,
    },
}

/// Main code generator that orchestrates model, mapper and XML generation
pub struct CodeGenerator<'a> {
    config: &'a CodegenConfig,
    tags: ProvenanceTags,
    marker: GeneratedMarker,
}

impl<'a> CodeGenerator<'a> {
    /// Create a new code generator with the given configuration
    pub fn new(config: &'a CodegenConfig) -> Self {
        Self {
            config,
            tags: ProvenanceTags::with_additional_tags(&config.javadoc_tags),
            marker: GeneratedMarker::new(config.suppress_date),
        }
    }

    /// Generate, merge and write all files for the given tables
    pub fn generate(&self, tables: &[TableMetadata]) -> Result<GenerationReport> {
        let files = self.build_files(tables)?;
        info!("Reconciling {} files", files.len());

        let reconciled = files
            .par_iter()
            .map(|file| self.reconcile(file))
            .collect::<Result<Vec<_>>>()?;

        self.write_all(reconciled)
    }

    /// Build the in-memory output for every table, in table order
    pub fn build_files(&self, tables: &[TableMetadata]) -> Result<Vec<GeneratedFile>> {
        let mut files = Vec::new();
        for table in tables {
            let table = IntrospectedTable::new(table, self.config);

            if self.config.generate_models {
                let unit = build_model(&table, &self.marker)?;
                files.push(GeneratedFile::Java {
                    path: self.config.model_dir().join(unit.file_name()),
                    unit,
                });
            }
            if self.config.generate_mappers {
                let unit = build_mapper(&table, &self.marker)?;
                files.push(GeneratedFile::Java {
                    path: self.config.mapper_dir().join(unit.file_name()),
                    unit,
                });
            }
            if self.config.generate_xml {
                let document = build_xml_mapper(&table, &self.marker);
                let file_name = format!("{}.xml", table.mapper_type.base_short_name());
                files.push(GeneratedFile::Xml {
                    path: self.config.xml_dir().join(file_name),
                    document,
                });
            }
        }
        Ok(files)
    }

    /// Merge one file against what is on disk. Only an unusable existing file
    /// under `fail_fast` is an error.
    fn reconcile(&self, file: &GeneratedFile) -> Result<Reconciled> {
        let path = file.path().to_path_buf();
        let existing = read_existing(&path)?;
        debug!(
            "{}: {}",
            path.display(),
            if existing.is_some() { "merging" } else { "new file" }
        );

        let existing = match existing {
            Some(_) if !self.config.merge_existing && !self.config.overwrite => {
                return Ok(Reconciled::Skip {
                    path,
                    reason: "file exists and merging is disabled".to_string(),
                });
            }
            Some(_) if !self.config.merge_existing => None,
            other => other,
        };

        let outcome = match file {
            GeneratedFile::Java { unit, .. } => {
                merge_java_file(unit, existing.as_deref(), &self.tags)
            }
            GeneratedFile::Xml { document, .. } => merge_xml_file(
                document,
                existing.as_deref(),
                &self.tags,
                self.config.xml_wrap_width,
            ),
        };

        match outcome {
            MergeOutcome::Rendered { content, warnings } => {
                if existing.as_deref() == Some(content.as_str()) {
                    Ok(Reconciled::Unchanged { path, warnings })
                } else {
                    Ok(Reconciled::Write {
                        path,
                        content,
                        warnings,
                    })
                }
            }
            MergeOutcome::ParseFailed { reason } if self.config.fail_fast => {
                Err(CodegenError::MergeFailed { path, reason })
            }
            MergeOutcome::ParseFailed { reason } => Ok(Reconciled::Skip { path, reason }),
        }
    }

    fn write_all(&self, reconciled: Vec<Reconciled>) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();
        for entry in reconciled {
            match entry {
                Reconciled::Write {
                    path,
                    content,
                    warnings,
                } => {
                    record_warnings(&mut report, &path, warnings);
                    if self.config.dry_run {
                        info!("Would write {}", path.display());
                    } else {
                        write_atomically(&path, &content)?;
                        debug!("Wrote {}", path.display());
                    }
                    report.written.push(path);
                }
                Reconciled::Unchanged { path, warnings } => {
                    record_warnings(&mut report, &path, warnings);
                    debug!("Unchanged {}", path.display());
                    report.unchanged.push(path);
                }
                Reconciled::Skip { path, reason } => {
                    warn!("Skipping {}: {}", path.display(), reason);
                    report.skipped.push((path, reason));
                }
            }
        }
        Ok(report)
    }
}

fn record_warnings(report: &mut GenerationReport, path: &Path, warnings: Vec<String>) {
    for warning in warnings {
        warn!("{}: {}", path.display(), warning);
        report.warnings.push(format!("{}: {}", path.display(), warning));
    }
}

fn read_existing(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write through a temporary file in the target directory so a reader never
/// sees a partially written file
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SqlDialect;
    use crate::parser::parse_schema;

    const SCHEMA: &str = r#"
        CREATE TABLE users (
            id BIGINT AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(64) NOT NULL
        );
    "#;

    fn config_in(dir: &Path) -> CodegenConfig {
        CodegenConfig {
            java_output_dir: dir.join("java"),
            resources_output_dir: dir.join("resources"),
            suppress_date: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let tables = parse_schema(SCHEMA, SqlDialect::Mysql).unwrap();

        let report = CodeGenerator::new(&config).generate(&tables).unwrap();
        assert_eq!(report.written.len(), 3);
        assert!(dir.path().join("java/com/example/model/Users.java").exists());
        assert!(dir.path().join("java/com/example/mapper/UsersMapper.java").exists());
        assert!(dir
            .path()
            .join("resources/com/example/mapper/UsersMapper.xml")
            .exists());
    }

    #[test]
    fn test_second_run_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let tables = parse_schema(SCHEMA, SqlDialect::Mysql).unwrap();

        CodeGenerator::new(&config).generate(&tables).unwrap();
        let report = CodeGenerator::new(&config).generate(&tables).unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.unchanged.len(), 3);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodegenConfig {
            dry_run: true,
            ..config_in(dir.path())
        };
        let tables = parse_schema(SCHEMA, SqlDialect::Mysql).unwrap();

        let report = CodeGenerator::new(&config).generate(&tables).unwrap();
        assert_eq!(report.written.len(), 3);
        assert!(!dir.path().join("java").exists());
    }

    #[test]
    fn test_existing_file_skipped_without_merge() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodegenConfig {
            merge_existing: false,
            generate_mappers: false,
            generate_xml: false,
            ..config_in(dir.path())
        };
        let path = config.model_dir().join("Users.java");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "hand written").unwrap();
        let tables = parse_schema(SCHEMA, SqlDialect::Mysql).unwrap();

        let report = CodeGenerator::new(&config).generate(&tables).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hand written");

        let overwrite = CodegenConfig {
            overwrite: true,
            ..config
        };
        let report = CodeGenerator::new(&overwrite).generate(&tables).unwrap();
        assert_eq!(report.written, vec![path.clone()]);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("public class Users"));
    }

    #[test]
    fn test_unparseable_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let path = config.model_dir().join("Users.java");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "public class Users {").unwrap();
        let tables = parse_schema(SCHEMA, SqlDialect::Mysql).unwrap();

        let err = CodeGenerator::new(&config).generate(&tables).unwrap_err();
        assert!(matches!(err, CodegenError::MergeFailed { .. }));
        // nothing else was written either
        assert!(!config.mapper_dir().join("UsersMapper.java").exists());

        let lenient = CodegenConfig {
            fail_fast: false,
            ..config
        };
        let report = CodeGenerator::new(&lenient).generate(&tables).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "public class Users {"
        );
    }
}
