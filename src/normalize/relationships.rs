//! Relationship normalizers
//!
//! Each extract has its own fixed positional layout. Normalizing binds the
//! layout, drops the query-plan columns and coerces ids and counts, leaving
//! every variant on a subset of the directional column vocabulary:
//!
//! | variant | raw width | extra work |
//! |---|---|---|
//! | Directional | 18 | `phase` filled with the missing marker |
//! | Bidirectional | 18 | endpoints decoded from the `inOutkey` pair |
//! | Attribute | 5 | incomplete rows and unparsable ids dropped |
//!
//! Nothing is upper-cased here; `type` is upper-cased after unification.

use log::{debug, info, warn};

use super::columns::*;
use super::composite_key::decode_column;
use super::MISSING_MARKER;
use crate::errors::Result;
use crate::table::{ColumnType, RawRecord, Schema, Table, Value};

use crate::table::ColumnType::{Int16Count, Int64Id, TrimmedString};

const ATTRIBUTE_COLUMNS: &[(&str, &str, ColumnType)] = &[
    ("biomarkertype", "biomarkertype", TrimmedString),
    ("celllinename", "celllinename", TrimmedString),
    ("celltype", "celltype", TrimmedString),
    ("changetype", "changetype", TrimmedString),
    ("organ", "organ", TrimmedString),
    ("organism", "organism", TrimmedString),
    ("quantitativetype", "quantitativetype", TrimmedString),
    ("tissue", "tissue", TrimmedString),
];

const DIRECTIONAL_HEAD: &[(&str, &str, ColumnType)] = &[
    (MSRC_ID, "msrc_id", Int64Id),
    (START_ID, ":START_ID", Int64Id),
    (TYPE, "type:TYPE", TrimmedString),
    (EFFECT, "effect", TrimmedString),
    (MECHANISM, "mechanism", TrimmedString),
    (REF_COUNT, "ref_count:int", Int16Count),
    (END_ID, ":END_ID", Int64Id),
    (DUPLICATE_ID, "id2", TrimmedString),
];

const DIRECTIONAL_TAIL: &[(&str, &str, ColumnType)] = &[
    ("nct_id", "nct_id", TrimmedString),
    (PHASE, "phase", TrimmedString),
];

const BIDIRECTIONAL_HEAD: &[(&str, &str, ColumnType)] = &[
    (MSRC_ID, "msrc_id", Int64Id),
    (START_ID, ":START_ID", Int64Id),
    (COMPOSITE_KEY, "inOutkey", TrimmedString),
    (TYPE, "type:TYPE", TrimmedString),
    (RELATIONSHIP_KIND, "relationship", TrimmedString),
    (EFFECT, "effect", TrimmedString),
    (MECHANISM, "mechanism", TrimmedString),
    (REF_COUNT, "ref_count:int", Int16Count),
    (END_ID, ":END_ID", Int64Id),
    (DUPLICATE_ID, "id2", TrimmedString),
];

const ATTRIBUTE_LAYOUT: &[(&str, &str, ColumnType)] = &[
    (MSRC_ID, "msrc_id", Int64Id),
    (START_ID, ":START_ID", Int64Id),
    (DUPLICATE_ID, "id2", TrimmedString),
    (TYPE, "type:TYPE", TrimmedString),
    (END_ID, ":END_ID", Int64Id),
];

/// The three relationship extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Directional,
    Bidirectional,
    Attribute,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 3] = [
        RelationshipKind::Directional,
        RelationshipKind::Bidirectional,
        RelationshipKind::Attribute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Directional => "directional",
            RelationshipKind::Bidirectional => "bidirectional",
            RelationshipKind::Attribute => "attribute",
        }
    }

    /// Positional layout of the raw extract
    pub fn raw_schema(&self) -> Schema {
        let columns: Vec<(&str, &str, ColumnType)> = match self {
            RelationshipKind::Directional => DIRECTIONAL_HEAD
                .iter()
                .chain(ATTRIBUTE_COLUMNS)
                .chain(DIRECTIONAL_TAIL)
                .copied()
                .collect(),
            RelationshipKind::Bidirectional => BIDIRECTIONAL_HEAD
                .iter()
                .chain(ATTRIBUTE_COLUMNS)
                .copied()
                .collect(),
            RelationshipKind::Attribute => ATTRIBUTE_LAYOUT.to_vec(),
        };
        Schema::new(&format!("{}_raw", self.as_str()), &columns)
    }

    /// Query-plan columns removed during normalization
    pub fn dropped_columns(&self) -> &'static [&'static str] {
        match self {
            RelationshipKind::Directional => &[DUPLICATE_ID],
            RelationshipKind::Bidirectional => &[COMPOSITE_KEY, DUPLICATE_ID, RELATIONSHIP_KIND],
            RelationshipKind::Attribute => &[DUPLICATE_ID],
        }
    }

    /// Layout of the normalized intermediate table
    pub fn normalized_schema(&self) -> Schema {
        self.raw_schema()
            .without(self.as_str(), self.dropped_columns())
    }

    /// Bind raw records to this variant's layout and normalize them
    pub fn normalize(&self, records: Vec<RawRecord>) -> Result<Table> {
        let raw_count = records.len();
        let table = Table::from_records(self.raw_schema(), records)?;

        let table = match self {
            RelationshipKind::Directional => normalize_directional(table)?,
            RelationshipKind::Bidirectional => normalize_bidirectional(table)?,
            RelationshipKind::Attribute => normalize_attribute(table)?,
        };

        info!(
            "Normalized {} relationships: {} raw records -> {} rows",
            self.as_str(),
            raw_count,
            table.len()
        );
        Ok(table)
    }
}

fn normalize_directional(mut table: Table) -> Result<Table> {
    table.drop_columns(&[DUPLICATE_ID])?;
    table.fill_missing(PHASE, Value::text(MISSING_MARKER))?;
    table.trim_text();
    table.coerce_column(START_ID)?;
    table.coerce_column(END_ID)?;
    table.coerce_column(REF_COUNT)?;
    table.set_name(RelationshipKind::Directional.as_str());
    Ok(table)
}

fn normalize_bidirectional(mut table: Table) -> Result<Table> {
    let (starts, ends) = decode_column(&table, COMPOSITE_KEY)?;
    table.drop_columns(RelationshipKind::Bidirectional.dropped_columns())?;
    table.set_column(START_ID, starts)?;
    table.set_column(END_ID, ends)?;
    table.coerce_column(START_ID)?;
    table.coerce_column(END_ID)?;
    table.coerce_column(REF_COUNT)?;
    table.trim_text();
    table.set_name(RelationshipKind::Bidirectional.as_str());
    Ok(table)
}

fn normalize_attribute(mut table: Table) -> Result<Table> {
    table.drop_columns(&[DUPLICATE_ID])?;

    // Blank cells only become missing once trimmed
    table.trim_text();

    let incomplete = table.drop_incomplete_rows();
    let type_idx = table.column_index(TYPE)?;
    let marked = table.retain_rows(|row| row[type_idx].as_text() != Some(MISSING_MARKER));
    debug!(
        "Attribute rows dropped: {} with missing fields, {} with missing-type marker",
        incomplete, marked
    );

    let bad_ids =
        table.coerce_column_lenient(START_ID)? + table.coerce_column_lenient(END_ID)?;
    if bad_ids > 0 {
        let dropped = table.drop_incomplete_rows();
        warn!(
            "Dropped {} attribute rows with non-numeric start/end ids",
            dropped
        );
    }

    table.set_name(RelationshipKind::Attribute.as_str());
    Ok(table)
}
