//! resnet-graph - ResNet extracts to graph bulk-import tables
//!
//! This crate turns the raw relational extracts of a ResNet database into the
//! node and relationship files a graph bulk loader consumes:
//! - Three relationship shapes normalized onto one column vocabulary
//! - Composite endpoint key decoding
//! - Missing-value collapse and deduplication
//! - Node cleanup, including expansion of an embedded sub-table record

pub mod artifacts;
pub mod config;
pub mod errors;
pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod table;

pub use artifacts::{ArtifactStore, PipelineContext};
pub use config::PipelineConfig;
pub use errors::{ErrorKind, PipelineError, Result};
pub use pipeline::{run_stages, Stage, StageOptions};
