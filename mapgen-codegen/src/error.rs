//! Error types for mapgen-codegen

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for mapgen-codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to parse SQL schema: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("Failed to merge {}: {reason}", path.display())]
    MergeFailed { path: PathBuf, reason: String },
}

/// Errors raised while building the Java output model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("Duplicate member `{key}` in type {type_name}")]
    DuplicateMember { type_name: String, key: String },

    #[error("Duplicate parameter `{parameter}` in method {method}")]
    DuplicateParameter { method: String, parameter: String },
}

/// Errors raised while reconciling a fresh unit with an existing file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("existing file could not be parsed: {0}")]
    Unparseable(String),

    #[error("existing file does not declare a top-level type named {0}")]
    MissingType(String),

    #[error("existing root element <{existing}> does not match <{fresh}>")]
    RootMismatch { existing: String, fresh: String },
}

impl From<sqlparser::parser::ParserError> for CodegenError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        CodegenError::ParseError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}
