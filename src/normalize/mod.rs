//! Normalization stages
//!
//! - [`relationships`]: the three raw relationship shapes onto one column vocabulary
//! - [`unify`]: concatenation, missing-value collapse and dedup of relationships
//! - [`nodes`]: node cleanup and expansion of the embedded sub-table record
//! - [`composite_key`]: `[A, B]` endpoint pair decoding

pub mod composite_key;
pub mod nodes;
pub mod relationships;
pub mod unify;

pub use composite_key::{decode, CompositeKey, CompositeKeyError};
pub use nodes::{normalize_nodes, NodeNormalizer, PATHOLOGICAL_NODE_ID};
pub use relationships::RelationshipKind;
pub use unify::{unify, RELATIONSHIP_SENTINEL};

/// Text marker for an explicitly absent value, written by normalizers
/// before unification collapses it to the sentinel
pub const MISSING_MARKER: &str = "None";

/// Text form of a missing number that leaked through stringification upstream
pub const NAN_TEXT: &str = "nan";

/// Column names shared by every relationship layout
pub mod columns {
    pub const MSRC_ID: &str = "msrc_id";
    pub const START_ID: &str = "start_id";
    pub const TYPE: &str = "type";
    pub const EFFECT: &str = "effect";
    pub const MECHANISM: &str = "mechanism";
    pub const REF_COUNT: &str = "ref_count";
    pub const END_ID: &str = "end_id";
    pub const PHASE: &str = "phase";

    /// Internal duplicate of the relationship id produced by the extraction join
    pub const DUPLICATE_ID: &str = "id2";
    /// Raw relationship-kind flag, already implied by which extract a row came from
    pub const RELATIONSHIP_KIND: &str = "relationship";
    /// Bracketed endpoint pair of bidirectional rows
    pub const COMPOSITE_KEY: &str = "inOutkey";

    pub const NODE_ID: &str = "id";
    pub const NODE_NAME: &str = "name";
    pub const NODE_LABEL: &str = "label";
}
