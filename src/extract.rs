//! Relational extraction boundary
//!
//! The extracts are produced outside this crate by four fixed queries against
//! the ResNet database. This module documents their positional layouts, loads
//! the database credentials the extractor needs, and registers finished raw
//! files in the artifact store so the normalization stages can find them.
//!
//! [`RawSource::query`] and [`DbCredentials`] serve the external extractor;
//! the stages only use [`register_raw_extract`] and the layouts.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;

use crate::artifacts::{keys, PipelineContext};
use crate::errors::{PipelineError, Result};
use crate::normalize::nodes::node_schema;
use crate::normalize::RelationshipKind;
use crate::table::Schema;

/// Database queried when none is configured
pub const DEFAULT_DATABASE: &str = "resnet18";

/// One of the four raw extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawSource {
    Directional,
    Bidirectional,
    Attribute,
    Node,
}

impl RawSource {
    pub const ALL: [RawSource; 4] = [
        RawSource::Directional,
        RawSource::Bidirectional,
        RawSource::Attribute,
        RawSource::Node,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RawSource::Directional => "directional",
            RawSource::Bidirectional => "bidirectional",
            RawSource::Attribute => "attribute",
            RawSource::Node => "node",
        }
    }

    /// Artifact store key of the raw file
    pub fn store_key(&self) -> &'static str {
        match self {
            RawSource::Directional => keys::DIRECTIONAL_RAW,
            RawSource::Bidirectional => keys::BIDIRECTIONAL_RAW,
            RawSource::Attribute => keys::ATTRIBUTE_RAW,
            RawSource::Node => keys::NODES_RAW,
        }
    }

    /// File name the extractor writes under the base path
    pub fn default_file_name(&self) -> &'static str {
        match self {
            RawSource::Directional => "directional_rels_raw.txt",
            RawSource::Bidirectional => "bidirectional_rels_raw.txt",
            RawSource::Attribute => "attribute_rels_raw.txt",
            RawSource::Node => "nodes_raw.txt",
        }
    }

    pub fn relationship_kind(&self) -> Option<RelationshipKind> {
        match self {
            RawSource::Directional => Some(RelationshipKind::Directional),
            RawSource::Bidirectional => Some(RelationshipKind::Bidirectional),
            RawSource::Attribute => Some(RelationshipKind::Attribute),
            RawSource::Node => None,
        }
    }

    /// Positional layout of the records the query returns
    pub fn raw_schema(&self) -> Schema {
        match self.relationship_kind() {
            Some(kind) => kind.raw_schema(),
            None => node_schema(),
        }
    }

    /// Query text producing this extract from `database`
    pub fn query(&self, database: &str) -> String {
        match self {
            RawSource::Directional => format!(
                "SELECT control.id, inkey[1], controltype, \
                 string_agg(distinct(effect), ', '), string_agg(distinct(mechanism), ', '), \
                 num_refs, outkey[1], reference.id, {aggregates}, \
                 string_agg(distinct(nct_id), ', '), string_agg(distinct(phase), ', ') \
                 FROM {db}.control, {db}.reference \
                 WHERE control.id = reference.id AND inkey[1] IS NOT NULL AND outkey[1] IS NOT NULL \
                 GROUP BY control.id, inkey[1], controltype, num_refs, outkey[1], reference.id",
                aggregates = attribute_aggregates(),
                db = database
            ),
            RawSource::Bidirectional => format!(
                "SELECT control.id, inkey[1], inoutkey, controltype, relationship, \
                 string_agg(distinct(effect), ', '), string_agg(distinct(mechanism), ', '), \
                 num_refs, outkey[1], reference.id, {aggregates} \
                 FROM {db}.control, {db}.reference \
                 WHERE control.id = reference.id AND inkey[1] IS NULL AND outkey[1] IS NULL \
                 GROUP BY control.id, controltype, reference.id",
                aggregates = attribute_aggregates(),
                db = database
            ),
            RawSource::Attribute => format!(
                "SELECT id, inkey[1], attributes, relationship, outkey[1] FROM {db}.control \
                 WHERE control.id = control.attributes AND inkey[1] IS NOT NULL AND outkey[1] IS NOT NULL",
                db = database
            ),
            RawSource::Node => format!(
                "SELECT id, name, nodetype FROM {db}.node \
                 WHERE id IS NOT NULL AND name IS NOT NULL AND nodetype IS NOT NULL",
                db = database
            ),
        }
    }
}

fn attribute_aggregates() -> String {
    [
        "biomarkertype",
        "celllinename",
        "celltype",
        "changetype",
        "organ",
        "organism",
        "quantitativetype",
        "tissue",
    ]
    .iter()
    .map(|column| format!("string_agg(distinct({}), ', ')", column))
    .collect::<Vec<_>>()
    .join(", ")
}

impl fmt::Display for RawSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RawSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "directional" => Ok(RawSource::Directional),
            "bidirectional" | "bi-directional" | "bi_directional" => Ok(RawSource::Bidirectional),
            "attribute" | "attributes" => Ok(RawSource::Attribute),
            "node" | "nodes" => Ok(RawSource::Node),
            other => Err(format!(
                "unknown raw source `{}` (expected directional, bidirectional, attribute or node)",
                other
            )),
        }
    }
}

/// Database connection parameters for the extractor
#[derive(Clone, PartialEq, Eq)]
pub struct DbCredentials {
    pub db_name: String,
    pub db_user: String,
    pub db_host: String,
    pub db_pwd: String,
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_host", &self.db_host)
            .field("db_pwd", &"***")
            .finish()
    }
}

impl DbCredentials {
    pub const ENV_VARS: [&'static str; 4] = ["DB_NAME", "DB_USER", "DB_HOST_IP", "DB_PWD"];

    /// Read credentials from `DB_NAME`, `DB_USER`, `DB_HOST_IP` and `DB_PWD`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build credentials from any key lookup; every absent or empty key is
    /// reported in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = Self::ENV_VARS.map(|key| lookup(key).filter(|value| !value.is_empty()));
        let missing: Vec<String> = Self::ENV_VARS
            .iter()
            .zip(values.iter())
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key.to_string())
            .collect();

        match values {
            [Some(db_name), Some(db_user), Some(db_host), Some(db_pwd)] => Ok(DbCredentials {
                db_name,
                db_user,
                db_host,
                db_pwd,
            }),
            _ => Err(PipelineError::Credential { missing }),
        }
    }
}

/// Record an extracted raw file under its store key.
///
/// `path` defaults to the source's file name under the base path.
pub fn register_raw_extract(
    ctx: &mut PipelineContext,
    source: RawSource,
    path: Option<&Path>,
) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => ctx.full_path(source.default_file_name()),
    };
    if !path.is_file() {
        return Err(PipelineError::missing_artifact(format!(
            "{} ({})",
            source.store_key(),
            path.display()
        )));
    }

    let recorded = ctx.store.set(source.store_key(), &path)?;
    info!("Registered {} extract at {}", source, recorded.display());
    Ok(recorded)
}
