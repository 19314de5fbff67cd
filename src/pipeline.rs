//! Stage functions and the sequential runner
//!
//! Every stage reads its inputs through the artifact store, writes its output
//! atomically, and records the output location before returning. Stages are
//! independent: each one can be rerun on its own once its inputs exist.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::info;

use crate::artifacts::{keys, PipelineContext};
use crate::config::{ensure_extension, ConfigError};
use crate::errors::Result;
use crate::extract::{register_raw_extract, RawSource};
use crate::normalize::nodes::{node_schema, write_nodes, NodeNormalizer};
use crate::normalize::unify::{unify, write_relationships};
use crate::normalize::RelationshipKind;
use crate::table::delimited::read_records;
use crate::table::snapshot::{is_snapshot_path, read_snapshot, write_snapshot, SNAPSHOT_EXTENSION};
use crate::table::Table;

const TEXT_EXTENSION: &str = "txt";

/// A pipeline step selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// Record raw extract locations in the artifact store
    RegisterRaw,
    ProcessDirectionalRels,
    ProcessBiDirectionalRels,
    ProcessAttributeRels,
    /// Unify the three relationship snapshots into the output table
    ConcatRelationshipFiles,
    ProcessNodeFile,
    /// Every stage above, in order
    All,
}

impl Stage {
    /// Processing order used by [`Stage::All`]
    pub const SEQUENCE: [Stage; 6] = [
        Stage::RegisterRaw,
        Stage::ProcessDirectionalRels,
        Stage::ProcessBiDirectionalRels,
        Stage::ProcessAttributeRels,
        Stage::ConcatRelationshipFiles,
        Stage::ProcessNodeFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RegisterRaw => "register-raw",
            Stage::ProcessDirectionalRels => "process-directional-rels",
            Stage::ProcessBiDirectionalRels => "process-bi-directional-rels",
            Stage::ProcessAttributeRels => "process-attribute-rels",
            Stage::ConcatRelationshipFiles => "concat-relationship-files",
            Stage::ProcessNodeFile => "process-node-file",
            Stage::All => "all",
        }
    }

    /// Whether the stage writes a file whose name `--file-name` can replace
    pub fn accepts_file_name(&self) -> bool {
        !matches!(self, Stage::RegisterRaw | Stage::All)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-run options that are not part of the configuration
#[derive(Debug, Clone, Default)]
pub struct StageOptions {
    /// Output name override for a single stage
    pub file_name: Option<String>,
    /// Explicit raw extract locations for `register-raw`
    pub raw: Vec<(RawSource, PathBuf)>,
}

impl StageOptions {
    /// A file name override is only meaningful for one output-producing stage
    pub fn validate(&self, stages: &[Stage]) -> std::result::Result<(), ConfigError> {
        match (&self.file_name, stages) {
            (None, _) => Ok(()),
            (Some(_), [stage]) if stage.accepts_file_name() => Ok(()),
            (Some(_), _) => Err(ConfigError::FileNameScope {
                stages: stages.len(),
            }),
        }
    }
}

fn snapshot_key(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Directional => keys::DIRECTIONAL_PROCD,
        RelationshipKind::Bidirectional => keys::BIDIRECTIONAL_PROCD,
        RelationshipKind::Attribute => keys::ATTRIBUTE_PROCD,
    }
}

fn raw_key(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Directional => keys::DIRECTIONAL_RAW,
        RelationshipKind::Bidirectional => keys::BIDIRECTIONAL_RAW,
        RelationshipKind::Attribute => keys::ATTRIBUTE_RAW,
    }
}

fn default_snapshot_name(ctx: &PipelineContext, kind: RelationshipKind) -> &str {
    match kind {
        RelationshipKind::Directional => &ctx.config.directional_rels_procd,
        RelationshipKind::Bidirectional => &ctx.config.bidirectional_rels_procd,
        RelationshipKind::Attribute => &ctx.config.attribute_rels_procd,
    }
}

/// Record raw extract locations. With no explicit entries every source is
/// registered at its default file name under the base path.
pub fn register_raw(
    ctx: &mut PipelineContext,
    raw: &[(RawSource, PathBuf)],
) -> Result<Vec<PathBuf>> {
    if raw.is_empty() {
        return RawSource::ALL
            .iter()
            .map(|source| register_raw_extract(ctx, *source, None))
            .collect();
    }
    raw.iter()
        .map(|(source, path)| register_raw_extract(ctx, *source, Some(path)))
        .collect()
}

/// Register default raw locations only for sources the store does not know yet
fn register_unrecorded_raw(ctx: &mut PipelineContext) -> Result<()> {
    for source in RawSource::ALL {
        if ctx.store.get(source.store_key()).is_none() {
            register_raw_extract(ctx, source, None)?;
        }
    }
    Ok(())
}

/// Normalize one relationship extract into its intermediate snapshot
pub fn process_relationship_file(
    ctx: &mut PipelineContext,
    kind: RelationshipKind,
    file_name: Option<&str>,
) -> Result<PathBuf> {
    let raw_path = ctx.store.require(raw_key(kind))?;
    info!(
        "Processing {} relationships from {}",
        kind.as_str(),
        raw_path.display()
    );

    let records = read_records(&raw_path)?;
    let table = kind.normalize(records)?;

    let name = file_name.unwrap_or_else(|| default_snapshot_name(ctx, kind));
    let output = ctx.full_path(&ensure_extension(name, SNAPSHOT_EXTENSION));
    write_snapshot(&table, &output)?;
    ctx.store.set(snapshot_key(kind), &output)
}

pub fn process_directional_rels(
    ctx: &mut PipelineContext,
    file_name: Option<&str>,
) -> Result<PathBuf> {
    process_relationship_file(ctx, RelationshipKind::Directional, file_name)
}

pub fn process_bi_directional_rels(
    ctx: &mut PipelineContext,
    file_name: Option<&str>,
) -> Result<PathBuf> {
    process_relationship_file(ctx, RelationshipKind::Bidirectional, file_name)
}

pub fn process_attribute_rels(
    ctx: &mut PipelineContext,
    file_name: Option<&str>,
) -> Result<PathBuf> {
    process_relationship_file(ctx, RelationshipKind::Attribute, file_name)
}

/// Unify the three snapshots and write the relationship table and header
pub fn concat_relationship_files(
    ctx: &mut PipelineContext,
    file_name: Option<&str>,
) -> Result<PathBuf> {
    let [directional, bidirectional, attribute] = RelationshipKind::ALL.map(|kind| {
        ctx.store
            .require(snapshot_key(kind))
            .and_then(|path| read_snapshot(&path, &kind.normalized_schema()))
    });
    let table = unify(&directional?, &bidirectional?, &attribute?)?;

    let name = file_name.unwrap_or(&ctx.config.relations);
    let output = ctx.full_path(&ensure_extension(name, TEXT_EXTENSION));
    let header = ctx.full_path(&ensure_extension(
        &ctx.config.relations_header,
        TEXT_EXTENSION,
    ));
    write_relationships(&table, &output, &header)?;

    ctx.store.set(keys::RELATIONS_HEADER, &header)?;
    ctx.store.set(keys::RELATIONS, &output)
}

/// Normalize the node extract, raw or a previously written snapshot, and
/// write the node table and header
pub fn process_node_file(ctx: &mut PipelineContext, file_name: Option<&str>) -> Result<PathBuf> {
    let input = ctx.store.require(keys::NODES_RAW)?;
    info!("Processing nodes from {}", input.display());

    let table = load_nodes(&input)?;

    let name = file_name.unwrap_or(&ctx.config.nodes);
    let output = ctx.full_path(&ensure_extension(name, TEXT_EXTENSION));
    let header = ctx.full_path(&ensure_extension(&ctx.config.nodes_header, TEXT_EXTENSION));
    write_nodes(&table, &output, &header)?;

    ctx.store.set(keys::NODES_HEADER, &header)?;
    ctx.store.set(keys::NODES, &output)
}

fn load_nodes(input: &Path) -> Result<Table> {
    let normalizer = NodeNormalizer::default();
    if is_snapshot_path(input) {
        normalizer.normalize_table(read_snapshot(input, &node_schema())?)
    } else {
        normalizer.normalize_records(read_records(input)?)
    }
}

/// Run a single stage
pub fn run_stage(ctx: &mut PipelineContext, stage: Stage, options: &StageOptions) -> Result<()> {
    info!("Running stage {}", stage);
    let file_name = options.file_name.as_deref();
    match stage {
        Stage::RegisterRaw => {
            register_raw(ctx, &options.raw)?;
        }
        Stage::ProcessDirectionalRels => {
            process_directional_rels(ctx, file_name)?;
        }
        Stage::ProcessBiDirectionalRels => {
            process_bi_directional_rels(ctx, file_name)?;
        }
        Stage::ProcessAttributeRels => {
            process_attribute_rels(ctx, file_name)?;
        }
        Stage::ConcatRelationshipFiles => {
            concat_relationship_files(ctx, file_name)?;
        }
        Stage::ProcessNodeFile => {
            process_node_file(ctx, file_name)?;
        }
        Stage::All => {
            if options.raw.is_empty() {
                register_unrecorded_raw(ctx)?;
            } else {
                register_raw(ctx, &options.raw)?;
            }
            let options = StageOptions::default();
            for stage in Stage::SEQUENCE.into_iter().skip(1) {
                run_stage(ctx, stage, &options)?;
            }
        }
    }
    Ok(())
}

/// Run stages in the order given; the first failure stops the run
pub fn run_stages(
    ctx: &mut PipelineContext,
    stages: &[Stage],
    options: &StageOptions,
) -> Result<()> {
    for stage in stages {
        run_stage(ctx, *stage, options)?;
    }
    info!("Completed {} stage(s)", stages.len());
    Ok(())
}
