//! Artifact bookkeeping between stages
//!
//! Each stage records the location of what it wrote under a fixed key in
//! `<base_path>/file_paths.json`; downstream stages look their inputs up there.
//! The store is rewritten after every `set`, so a stage that fails later leaves
//! the entries of completed stages intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::{Map, Value as JsonValue};

use crate::config::PipelineConfig;
use crate::errors::{PipelineError, Result};
use crate::table::delimited::atomic_write;

/// File name of the store inside the base directory
pub const STORE_FILE_NAME: &str = "file_paths.json";

/// Store keys
pub mod keys {
    pub const DIRECTIONAL_RAW: &str = "directional_ds";
    pub const BIDIRECTIONAL_RAW: &str = "bi_directional_ds";
    pub const ATTRIBUTE_RAW: &str = "attributes_ds";
    pub const NODES_RAW: &str = "nodes_ds";

    pub const DIRECTIONAL_PROCD: &str = "procd_direct_rels";
    pub const BIDIRECTIONAL_PROCD: &str = "procd_biDirect_rels";
    pub const ATTRIBUTE_PROCD: &str = "procd_attribute_rels";

    pub const RELATIONS: &str = "procd_relations";
    pub const RELATIONS_HEADER: &str = "relations_header";
    pub const NODES: &str = "procd_nodes";
    pub const NODES_HEADER: &str = "nodes_header";
}

/// JSON key -> absolute path mapping persisted in the base directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
    entries: Map<String, JsonValue>,
}

impl ArtifactStore {
    /// Open the store under `base_path`. A missing file is an empty store.
    pub fn load(base_path: &Path) -> Result<Self> {
        let path = base_path.join(STORE_FILE_NAME);
        let entries: Map<String, JsonValue> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                PipelineError::invalid_data(&path, format!("not a JSON object: {e}"))
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(PipelineError::storage(&path, e)),
        };
        debug!("Loaded {} artifact entries from {}", entries.len(), path.display());
        Ok(ArtifactStore { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<PathBuf> {
        self.entries
            .get(key)
            .and_then(|value| value.as_str())
            .map(PathBuf::from)
    }

    /// Path recorded under `key`, or a missing-artifact error
    pub fn require(&self, key: &str) -> Result<PathBuf> {
        self.get(key).ok_or_else(|| PipelineError::missing_artifact(key))
    }

    /// Record `path` (made absolute) under `key` and persist the store
    pub fn set(&mut self, key: &str, path: &Path) -> Result<PathBuf> {
        let absolute = std::path::absolute(path).map_err(|e| PipelineError::storage(path, e))?;
        self.entries.insert(
            key.to_string(),
            JsonValue::String(absolute.display().to_string()),
        );
        self.persist()?;
        debug!("Recorded `{}` -> {}", key, absolute.display());
        Ok(absolute)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn persist(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.entries).map_err(|e| {
            PipelineError::invalid_data(&self.path, format!("artifact store encoding failed: {e}"))
        })?;
        atomic_write(&self.path, &bytes)
    }
}

/// Everything a stage needs besides its input tables
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub store: ArtifactStore,
}

impl PipelineContext {
    /// Open the artifact store under the configured base path
    pub fn open(config: PipelineConfig) -> Result<Self> {
        let store = ArtifactStore::load(&config.base_path)?;
        Ok(PipelineContext { config, store })
    }

    pub fn full_path(&self, file_name: &str) -> PathBuf {
        self.config.full_path(file_name)
    }
}
