use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("--file-name requires exactly one output-producing stage, got {stages} stage(s)")]
    FileNameScope { stages: usize },
}

/// Where the pipeline reads and writes, and what it names its artifacts
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding raw extracts, intermediate snapshots and outputs
    pub base_path: PathBuf,

    #[validate(length(min = 1, message = "Directional snapshot name cannot be empty"))]
    pub directional_rels_procd: String,

    #[validate(length(min = 1, message = "Bidirectional snapshot name cannot be empty"))]
    pub bidirectional_rels_procd: String,

    #[validate(length(min = 1, message = "Attribute snapshot name cannot be empty"))]
    pub attribute_rels_procd: String,

    /// Unified relationship table for the bulk loader
    #[validate(length(min = 1, message = "Relationship output name cannot be empty"))]
    pub relations: String,

    #[validate(length(min = 1, message = "Relationship header name cannot be empty"))]
    pub relations_header: String,

    /// Normalized node table for the bulk loader
    #[validate(length(min = 1, message = "Node output name cannot be empty"))]
    pub nodes: String,

    #[validate(length(min = 1, message = "Node header name cannot be empty"))]
    pub nodes_header: String,
}

/// CLI-provided configuration
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub base_path: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("./data/processed/"),
            directional_rels_procd: "directional_rels_procd.snapshot".to_string(),
            bidirectional_rels_procd: "bidirectional_rels_procd.snapshot".to_string(),
            attribute_rels_procd: "attribute_rels_procd.snapshot".to_string(),
            relations: "relations.txt".to_string(),
            relations_header: "relations_header.txt".to_string(),
            nodes: "nodes.txt".to_string(),
            nodes_header: "nodes_header.txt".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            base_path: parse_env_var(
                "RESNET_BASE_PATH",
                &defaults.base_path.display().to_string(),
            )?,
            directional_rels_procd: env_or(
                "RESNET_DIRECTIONAL_PROCD",
                defaults.directional_rels_procd,
            ),
            bidirectional_rels_procd: env_or(
                "RESNET_BIDIRECTIONAL_PROCD",
                defaults.bidirectional_rels_procd,
            ),
            attribute_rels_procd: env_or(
                "RESNET_ATTRIBUTE_PROCD",
                defaults.attribute_rels_procd,
            ),
            relations: env_or("RESNET_RELATIONS", defaults.relations),
            relations_header: env_or("RESNET_RELATIONS_HEADER", defaults.relations_header),
            nodes: env_or("RESNET_NODES", defaults.nodes),
            nodes_header: env_or("RESNET_NODES_HEADER", defaults.nodes_header),
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file; absent keys take their defaults
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration for a CLI run: a YAML file when given, the
    /// environment otherwise, then the `--base-path` override.
    pub fn from_cli(cli_config: CliConfig) -> Result<Self, ConfigError> {
        let config = match cli_config.config_file.as_deref() {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::from_env()?,
        };
        Ok(match cli_config.base_path {
            Some(base_path) => config.with_base_path(base_path),
            None => config,
        })
    }

    /// Override the base directory (CLI `--base-path`)
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Join an artifact name onto the base directory
    pub fn full_path(&self, file_name: &str) -> PathBuf {
        self.base_path.join(file_name)
    }
}

/// Append `extension` (without dot) unless the name already ends with it
pub fn ensure_extension(file_name: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension);
    if file_name.ends_with(&suffix) {
        file_name.to_string()
    } else {
        format!("{}{}", file_name, suffix)
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
