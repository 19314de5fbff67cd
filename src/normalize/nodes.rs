//! Node normalization
//!
//! Cleans the node extract and repairs one known source defect: a single node
//! whose `name` cell holds several complete node records, one per line, each
//! `id|name|label`. That row is replaced by the records it embeds.
//!
//! Names are finally remapped so no value contains the output delimiter.

use std::collections::HashSet;
use std::path::Path;

use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;

use super::columns::{NODE_ID, NODE_LABEL, NODE_NAME};
use crate::errors::Result;
use crate::table::coerce::convert;
use crate::table::delimited::{write_header, write_table, DELIMITER};
use crate::table::{ColumnType, RawRecord, Schema, Table, Value};

/// Id of the source record whose name cell embeds other node records
pub const PATHOLOGICAL_NODE_ID: i64 = -7235442027224814239;

/// Replacement for separator runs inside names
pub const NAME_SEPARATOR_SUBSTITUTE: &str = ":";

lazy_static! {
    /// Doubled and bare separators inside names: the output delimiter and the
    /// `;` list separator used by the source. Longest alternatives first so a
    /// doubled separator collapses to a single substitute.
    static ref NAME_SEPARATORS: Regex = Regex::new(r"\|\||\||;;|;").expect("valid regex");
}

pub fn node_schema() -> Schema {
    Schema::new(
        "nodes",
        &[
            (NODE_ID, ":ID", ColumnType::Int64Id),
            (NODE_NAME, "name", ColumnType::TrimmedString),
            (NODE_LABEL, ":LABEL", ColumnType::UpperString),
        ],
    )
}

/// Node cleanup with a configurable pathological id
#[derive(Debug, Clone)]
pub struct NodeNormalizer {
    pathological_id: i64,
}

impl Default for NodeNormalizer {
    fn default() -> Self {
        NodeNormalizer {
            pathological_id: PATHOLOGICAL_NODE_ID,
        }
    }
}

impl NodeNormalizer {
    pub fn with_pathological_id(pathological_id: i64) -> Self {
        NodeNormalizer { pathological_id }
    }

    /// Normalize raw node records
    pub fn normalize_records(&self, records: Vec<RawRecord>) -> Result<Table> {
        let table = Table::from_records(node_schema(), records)?;
        self.normalize_table(table)
    }

    /// Normalize a node table, raw-bound or loaded from a snapshot.
    /// Running it twice gives the same result as running it once.
    pub fn normalize_table(&self, mut table: Table) -> Result<Table> {
        let input_rows = table.len();

        table.trim_text();
        table.coerce_column(NODE_LABEL)?;
        table.coerce_column(NODE_ID)?;

        let expanded = self.expand_pathological(&mut table)?;
        remap_names(&mut table)?;
        warn_duplicate_ids(&table);

        info!(
            "Normalized nodes: {} input rows -> {} rows ({} embedded records expanded)",
            input_rows,
            table.len(),
            expanded
        );
        Ok(table)
    }

    /// Replace every row carrying the pathological id with the records its
    /// name cell embeds. Returns the number of records appended.
    pub fn expand_pathological(&self, table: &mut Table) -> Result<usize> {
        let id_idx = table.column_index(NODE_ID)?;
        let name_idx = table.column_index(NODE_NAME)?;

        let cells: Vec<String> = table
            .rows()
            .iter()
            .filter(|row| row[id_idx].as_id() == Some(self.pathological_id))
            .map(|row| row[name_idx].to_string())
            .collect();

        if cells.is_empty() {
            debug!("No node with id {} to expand", self.pathological_id);
            return Ok(0);
        }

        let pathological = self.pathological_id;
        table.retain_rows(|row| row[id_idx].as_id() != Some(pathological));

        let mut appended = 0;
        for cell in &cells {
            for row in parse_embedded_records(cell) {
                table.push_row(row)?;
                appended += 1;
            }
        }
        Ok(appended)
    }
}

/// Normalize raw node records with the default pathological id
pub fn normalize_nodes(records: Vec<RawRecord>) -> Result<Table> {
    NodeNormalizer::default().normalize_records(records)
}

/// Split an embedded sub-table into node rows.
///
/// One record per line, fields separated by the delimiter. Lines that do not
/// have exactly three fields, or whose id is not an integer, are dropped.
pub fn parse_embedded_records(cell: &str) -> Vec<Vec<Value>> {
    let mut rows = Vec::new();
    let mut dropped = 0;

    for line in cell.lines() {
        let fields: Vec<&str> = line.split(DELIMITER).collect();
        if fields.len() != 3 {
            dropped += 1;
            continue;
        }

        let Some(id) = convert(&Value::text(fields[0]), ColumnType::Int64Id) else {
            dropped += 1;
            continue;
        };
        rows.push(vec![
            id,
            Value::text(fields[1].trim()),
            Value::text(fields[2].trim().to_uppercase()),
        ]);
    }

    if dropped > 0 {
        warn!("Dropped {} malformed embedded node records", dropped);
    }
    rows
}

/// Replace separator runs inside names with [`NAME_SEPARATOR_SUBSTITUTE`]
pub fn remap_names(table: &mut Table) -> Result<()> {
    table.map_column(NODE_NAME, |value| {
        Ok(match value {
            Value::Text(name) => Value::text(
                NAME_SEPARATORS.replace_all(name, NAME_SEPARATOR_SUBSTITUTE),
            ),
            other => other.clone(),
        })
    })
}

fn warn_duplicate_ids(table: &Table) {
    let Ok(ids) = table.column(NODE_ID) else {
        return;
    };
    let mut seen = HashSet::with_capacity(ids.len());
    let duplicates = ids.into_iter().filter(|id| !seen.insert(*id)).count();
    if duplicates > 0 {
        warn!("{} node rows repeat an id already present", duplicates);
    }
}

/// Write the node table and its header file
pub fn write_nodes(table: &Table, data_path: &Path, header_path: &Path) -> Result<()> {
    write_table(table, data_path)?;
    write_header(&table.schema().header_names(), header_path)?;
    info!(
        "Wrote {} nodes to {} (header {})",
        table.len(),
        data_path.display(),
        header_path.display()
    );
    Ok(())
}
