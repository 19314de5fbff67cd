//! # Pipeline Error Types
//!
//! Every stage fails fast with one of the variants below. Each variant carries
//! the path, column or value that caused it so the CLI can report where a run
//! stopped.
//!
//! ## Error Categories
//!
//! - **Decoding Errors**: malformed composite key tokens
//! - **Schema Errors**: raw record width or snapshot layout mismatch
//! - **Coercion Errors**: a cell that cannot become its column's numeric type
//! - **Artifact Errors**: the artifact store lacks a path a stage needs
//! - **Storage Errors**: any read/write failure
//! - **Credential Errors**: extraction parameters missing from the environment

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Coarse error tag printed by the CLI before the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedKey,
    SchemaAssignment,
    TypeCoercion,
    MissingUpstreamArtifact,
    StorageIo,
    Credential,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedKey => "malformed_key",
            ErrorKind::SchemaAssignment => "schema_assignment",
            ErrorKind::TypeCoercion => "type_coercion",
            ErrorKind::MissingUpstreamArtifact => "missing_upstream_artifact",
            ErrorKind::StorageIo => "storage_io",
            ErrorKind::Credential => "credential",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Malformed composite key `{token}` in column `{column}`: expected 2 comma-separated parts, found {parts}")]
    MalformedKey {
        column: String,
        token: String,
        parts: usize,
    },

    #[error("Schema `{schema}` expects {expected} fields but record {record} has {found}")]
    SchemaAssignment {
        schema: String,
        expected: usize,
        found: usize,
        record: usize,
    },

    #[error("Schema `{schema}` has no column `{column}`")]
    UnknownColumn { schema: String, column: String },

    #[error("Cannot coerce `{value}` in column `{column}` to {target}")]
    TypeCoercion {
        column: String,
        value: String,
        target: &'static str,
    },

    #[error("Artifact store has no entry for `{key}` (run the stage that produces it first)")]
    MissingUpstreamArtifact { key: String },

    #[error("I/O failure on `{path}`: {source}")]
    StorageIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required environment variables: {}", .missing.join(", "))]
    Credential { missing: Vec<String> },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::MalformedKey { .. } => ErrorKind::MalformedKey,
            PipelineError::SchemaAssignment { .. } | PipelineError::UnknownColumn { .. } => {
                ErrorKind::SchemaAssignment
            }
            PipelineError::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            PipelineError::MissingUpstreamArtifact { .. } => ErrorKind::MissingUpstreamArtifact,
            PipelineError::StorageIo { .. } => ErrorKind::StorageIo,
            PipelineError::Credential { .. } => ErrorKind::Credential,
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn storage(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        PipelineError::StorageIo {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Storage error for data that is readable but not in the expected shape
    /// (corrupt snapshot, value that cannot be written unquoted).
    pub fn invalid_data(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::storage(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, message.into()),
        )
    }

    pub fn missing_artifact(key: impl Into<String>) -> Self {
        PipelineError::MissingUpstreamArtifact { key: key.into() }
    }

    /// One-line report printed by the CLI: `<kind> error: <message>`
    pub fn report(&self) -> String {
        format!("{} error: {}", self.kind(), self)
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
