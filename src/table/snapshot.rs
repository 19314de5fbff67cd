//! Intermediate table snapshots
//!
//! A snapshot hands a typed table from one stage to the next. The format is
//! internal: JSON of the schema plus typed rows. Reading checks the stored
//! layout against the one the consuming stage expects.

use std::fs;
use std::path::Path;

use log::debug;

use super::delimited::atomic_write;
use super::{Schema, Table};
use crate::errors::{PipelineError, Result};

/// File extension used for snapshot artifacts
pub const SNAPSHOT_EXTENSION: &str = "snapshot";

pub fn write_snapshot(table: &Table, path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec(table)
        .map_err(|e| PipelineError::invalid_data(path, format!("snapshot encoding failed: {e}")))?;
    atomic_write(path, &bytes)?;
    debug!(
        "Wrote snapshot `{}` ({} rows) to {}",
        table.schema().name,
        table.len(),
        path.display()
    );
    Ok(())
}

/// Load a snapshot and verify it binds the columns of `expected`
pub fn read_snapshot(path: &Path, expected: &Schema) -> Result<Table> {
    let bytes = fs::read(path).map_err(|e| PipelineError::storage(path, e))?;
    let table: Table = serde_json::from_slice(&bytes)
        .map_err(|e| PipelineError::invalid_data(path, format!("corrupt snapshot: {e}")))?;

    if !table.schema().same_columns(expected) {
        return Err(PipelineError::SchemaAssignment {
            schema: expected.name.clone(),
            expected: expected.width(),
            found: table.schema().width(),
            record: 0,
        });
    }
    // Re-check row widths; the file may have been edited by hand.
    Table::from_rows(table.schema().clone(), table.rows().to_vec())
}

/// Whether a path names a snapshot rather than a delimited text file
pub fn is_snapshot_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == SNAPSHOT_EXTENSION)
}
