//! Relationship unification
//!
//! Concatenates the three normalized relationship tables onto the directional
//! column order, collapses every representation of "no value" to a single
//! sentinel, drops duplicates and upper-cases `type`.
//!
//! Missing values collapse in three ordered passes because string-valued and
//! numeric-valued missingness arrive independently:
//!
//! 1. absent cells become the missing marker text (`None`)
//! 2. the not-a-number text (`nan`) becomes the marker too
//! 3. the marker becomes [`RELATIONSHIP_SENTINEL`]

use std::path::Path;

use log::{debug, info};

use super::columns::{MSRC_ID, REF_COUNT, TYPE};
use super::relationships::RelationshipKind;
use super::{MISSING_MARKER, NAN_TEXT};
use crate::errors::Result;
use crate::table::delimited::{write_header, write_table};
use crate::table::{ColumnType, Schema, Table, Value};

/// The one literal that represents "no value" in the unified table
pub const RELATIONSHIP_SENTINEL: &str = "_";

/// Canonical output layout: the directional columns, `type` upper-cased
pub fn output_schema() -> Schema {
    let mut schema = RelationshipKind::Directional.normalized_schema();
    schema.name = "relationships".to_string();
    for column in &mut schema.columns {
        if column.name == TYPE {
            column.ty = ColumnType::UpperString;
        }
    }
    schema
}

/// Unify the three intermediate tables into the final relationship table
pub fn unify(directional: &Table, bidirectional: &Table, attribute: &Table) -> Result<Table> {
    let inputs = [directional, bidirectional, attribute];
    let input_rows: usize = inputs.iter().map(|t| t.len()).sum();

    // Appending projects each source onto the canonical order: columns a
    // source lacks arrive as missing cells and go through the collapse below.
    let mut table = Table::new(output_schema());
    for source in inputs {
        table.append(source);
    }

    table.fill_missing(REF_COUNT, Value::Count(0))?;
    table.coerce_column(REF_COUNT)?;

    collapse_missing(&mut table);

    table.coerce_column(MSRC_ID)?;

    let duplicates = table.dedup_rows();
    debug!("Dropped {} duplicate relationship rows", duplicates);

    table.coerce_column(TYPE)?;

    info!(
        "Unified {} relationship rows into {} ({} duplicates removed)",
        input_rows,
        table.len(),
        duplicates
    );
    Ok(table)
}

fn collapse_missing(table: &mut Table) {
    table.map_cells(|value| value.is_missing().then(|| Value::text(MISSING_MARKER)));
    table.map_cells(|value| {
        (value.as_text() == Some(NAN_TEXT)).then(|| Value::text(MISSING_MARKER))
    });
    table.map_cells(|value| {
        (value.as_text() == Some(MISSING_MARKER)).then(|| Value::text(RELATIONSHIP_SENTINEL))
    });
}

/// Write the unified table and its header file
pub fn write_relationships(table: &Table, data_path: &Path, header_path: &Path) -> Result<()> {
    write_table(table, data_path)?;
    write_header(&output_schema().header_names(), header_path)?;
    info!(
        "Wrote {} relationships to {} (header {})",
        table.len(),
        data_path.display(),
        header_path.display()
    );
    Ok(())
}
