//! Pipe-delimited text files
//!
//! Raw extracts were written by a CSV writer configured with `|` and minimal
//! quoting: a field is wrapped in `"` only when it contains the delimiter, a
//! quote or a line break, and inner quotes are doubled. [`parse_records`]
//! honors that so a cell with embedded newlines stays one field.
//!
//! Outputs for the bulk loader are written without any quoting. A value that
//! would need quoting is refused instead of silently corrupting the file.
//!
//! Every write goes to a temporary file in the destination directory and is
//! renamed into place once complete, so a failed stage never leaves a partial
//! artifact behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;

use super::{RawRecord, Table, Value};
use crate::errors::{PipelineError, Result};

pub const DELIMITER: char = '|';
const QUOTE: char = '"';

/// Split delimited text into records.
///
/// Empty fields (quoted or not) become `None`. Blank lines are skipped and
/// `\r\n` line endings are accepted.
pub fn parse_records(input: &str) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut record: RawRecord = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            QUOTE if field.is_empty() && !field_started => {
                in_quotes = true;
                field_started = true;
            }
            DELIMITER => {
                record.push(finish_field(&mut field));
                field_started = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                let blank = record.is_empty() && field.is_empty() && !field_started;
                if !blank {
                    record.push(finish_field(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                field_started = false;
            }
            _ => {
                field.push(c);
                field_started = true;
            }
        }
    }

    if !record.is_empty() || !field.is_empty() || field_started {
        record.push(finish_field(&mut field));
        records.push(record);
    }

    records
}

fn finish_field(field: &mut String) -> Option<String> {
    let value = std::mem::take(field);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Read and split a raw extract
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::storage(path, e))?;
    let records = parse_records(&content);
    debug!("Read {} raw records from {}", records.len(), path.display());
    Ok(records)
}

/// Render a table as unquoted delimited lines, one per row, no header line
pub fn render_table(table: &Table, path: &Path) -> Result<String> {
    let mut out = String::new();
    for row in table.rows() {
        for (idx, value) in row.iter().enumerate() {
            if idx > 0 {
                out.push(DELIMITER);
            }
            push_field(&mut out, value, &table.schema().columns[idx].name, path)?;
        }
        out.push('\n');
    }
    Ok(out)
}

fn push_field(out: &mut String, value: &Value, column: &str, path: &Path) -> Result<()> {
    let rendered = value.to_string();
    if rendered.contains(&[DELIMITER, '\n', '\r'][..]) {
        return Err(PipelineError::invalid_data(
            path,
            format!(
                "value `{}` in column `{}` contains the delimiter or a line break",
                rendered.escape_debug(),
                column
            ),
        ));
    }
    out.push_str(&rendered);
    Ok(())
}

/// Write a table's rows to `path`
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let content = render_table(table, path)?;
    atomic_write(path, content.as_bytes())?;
    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Write a single delimited line of column names
pub fn write_header(columns: &[&str], path: &Path) -> Result<()> {
    let mut line = columns.join(&DELIMITER.to_string());
    line.push('\n');
    atomic_write(path, line.as_bytes())
}

/// Write `contents` to a temp file beside `path`, then rename it over `path`
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PipelineError::storage(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::storage(dir, e))?;
    let tmp_path = tmp.path().to_path_buf();
    tmp.write_all(contents)
        .map_err(|e| PipelineError::storage(&tmp_path, e))?;
    tmp.flush()
        .map_err(|e| PipelineError::storage(&tmp_path, e))?;
    tmp.persist(path)
        .map_err(|e| PipelineError::storage(path, e.error))?;
    Ok(())
}
