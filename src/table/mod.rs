//! In-memory typed tables
//!
//! A [`Table`] is a [`Schema`] plus row-major cells. Stages materialize their
//! whole input and output as tables; there is no streaming mode.

pub mod coerce;
pub mod delimited;
pub mod schema;
pub mod snapshot;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};

pub use schema::{ColumnDef, ColumnType, Schema};

/// One raw record as read from a delimited extract; `None` is an empty field
pub type RawRecord = Vec<Option<String>>;

/// A single cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Missing,
    Id(i64),
    Count(i16),
    Text(String),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<i64> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }
}

/// Missing cells render as the empty string
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Id(id) => write!(f, "{}", id),
            Value::Count(count) => write!(f, "{}", count),
            Value::Text(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Empty table with the given layout
    pub fn new(schema: Schema) -> Self {
        Table {
            schema,
            rows: Vec::new(),
        }
    }

    /// Bind raw positional records to a layout.
    ///
    /// Every record must have exactly `schema.width()` fields. Empty fields
    /// become [`Value::Missing`], everything else stays untyped text until a
    /// stage coerces it.
    pub fn from_records(schema: Schema, records: Vec<RawRecord>) -> Result<Self> {
        let expected = schema.width();
        let mut rows = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            if record.len() != expected {
                return Err(PipelineError::SchemaAssignment {
                    schema: schema.name.clone(),
                    expected,
                    found: record.len(),
                    record: index + 1,
                });
            }
            rows.push(
                record
                    .into_iter()
                    .map(|field| field.map_or(Value::Missing, Value::Text))
                    .collect(),
            );
        }

        Ok(Table { schema, rows })
    }

    /// Build from already-typed rows; widths are checked the same way
    pub fn from_rows(schema: Schema, rows: Vec<Vec<Value>>) -> Result<Self> {
        let expected = schema.width();
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
        {
            return Err(PipelineError::SchemaAssignment {
                schema: schema.name.clone(),
                expected,
                found: row.len(),
                record: index + 1,
            });
        }
        Ok(Table { schema, rows })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn set_name(&mut self, name: &str) {
        self.schema.name = name.to_string();
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.schema
            .index_of(column)
            .ok_or_else(|| PipelineError::UnknownColumn {
                schema: self.schema.name.clone(),
                column: column.to_string(),
            })
    }

    /// All cells of one column, in row order
    pub fn column(&self, column: &str) -> Result<Vec<&Value>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Cell of `column` in row `row`
    pub fn get(&self, row: usize, column: &str) -> Result<Option<&Value>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.get(row).map(|r| &r[idx]))
    }

    /// Remove columns by name. Unknown names are an error.
    pub fn drop_columns(&mut self, columns: &[&str]) -> Result<()> {
        let mut indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>>>()?;
        indices.sort_unstable();
        indices.dedup();

        for row in &mut self.rows {
            for idx in indices.iter().rev() {
                row.remove(*idx);
            }
        }
        let name = self.schema.name.clone();
        self.schema = self.schema.without(&name, columns);
        Ok(())
    }

    /// Replace a column's values wholesale (same length as the table)
    pub fn set_column(&mut self, column: &str, values: Vec<Value>) -> Result<()> {
        let idx = self.column_index(column)?;
        if values.len() != self.rows.len() {
            return Err(PipelineError::SchemaAssignment {
                schema: self.schema.name.clone(),
                expected: self.rows.len(),
                found: values.len(),
                record: 0,
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(())
    }

    /// Apply `f` to every cell of one column, stopping at the first error
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&Value) -> Result<Value>,
    {
        let idx = self.column_index(column)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx])?;
        }
        Ok(())
    }

    /// Apply `f` to every cell of the table
    pub fn map_cells<F>(&mut self, mut f: F)
    where
        F: FnMut(&Value) -> Option<Value>,
    {
        for cell in self.rows.iter_mut().flatten() {
            if let Some(replacement) = f(cell) {
                *cell = replacement;
            }
        }
    }

    pub fn fill_missing(&mut self, column: &str, fill: Value) -> Result<()> {
        self.map_column(column, |value| {
            Ok(if value.is_missing() {
                fill.clone()
            } else {
                value.clone()
            })
        })
    }

    /// Coerce a column to the type its schema declares
    pub fn coerce_column(&mut self, column: &str) -> Result<()> {
        let ty = self.declared_type(column)?;
        self.coerce_column_as(column, ty)
    }

    /// Coerce a column to `ty` and record `ty` as its declared type
    pub fn coerce_column_as(&mut self, column: &str, ty: ColumnType) -> Result<()> {
        self.map_column(column, |value| coerce::coerce(value, ty, column))?;
        self.set_declared_type(column, ty)
    }

    /// Coerce a column to its declared type, turning failures into
    /// [`Value::Missing`]. Returns how many cells failed.
    pub fn coerce_column_lenient(&mut self, column: &str) -> Result<usize> {
        let ty = self.declared_type(column)?;
        let mut failed = 0;
        self.map_column(column, |value| {
            Ok(coerce::convert(value, ty).unwrap_or_else(|| {
                failed += 1;
                Value::Missing
            }))
        })?;
        Ok(failed)
    }

    /// Trim surrounding whitespace of every text cell. Blank cells become
    /// [`Value::Missing`], as an empty field would have on reading.
    pub fn trim_text(&mut self) {
        self.map_cells(|value| match value {
            Value::Text(text) if text.trim().is_empty() => Some(Value::Missing),
            Value::Text(text) if text.trim().len() != text.len() => {
                Some(Value::text(text.trim()))
            }
            _ => None,
        });
    }

    /// Keep rows for which `keep` is true. Returns how many were dropped.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Drop rows with a missing cell in any column. Returns how many were dropped.
    pub fn drop_incomplete_rows(&mut self) -> usize {
        self.retain_rows(|row| !row.iter().any(Value::is_missing))
    }

    /// Drop exact duplicate rows, keeping first occurrences in order.
    /// Returns how many were dropped.
    pub fn dedup_rows(&mut self) -> usize {
        let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(self.rows.len());
        self.retain_rows(|row| seen.insert(row.to_vec()))
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.schema.width() {
            return Err(PipelineError::SchemaAssignment {
                schema: self.schema.name.clone(),
                expected: self.schema.width(),
                found: row.len(),
                record: self.rows.len() + 1,
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Reshape onto `target`, matching columns by name. Columns absent here
    /// are filled with [`Value::Missing`]; columns absent from `target` are
    /// dropped.
    pub fn project(&self, target: &Schema) -> Table {
        let sources: Vec<Option<usize>> = target
            .columns
            .iter()
            .map(|c| self.schema.index_of(&c.name))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|src| src.map_or(Value::Missing, |idx| row[idx].clone()))
                    .collect()
            })
            .collect();

        Table {
            schema: target.clone(),
            rows,
        }
    }

    /// Append another table's rows after projecting it onto this layout
    pub fn append(&mut self, other: &Table) {
        let projected = other.project(&self.schema);
        self.rows.extend(projected.rows);
    }

    /// Replace the layout description without touching cells.
    /// The new schema must bind the same columns.
    pub fn relabel(&mut self, schema: Schema) -> Result<()> {
        if !self.schema.same_columns(&schema) {
            return Err(PipelineError::SchemaAssignment {
                schema: schema.name.clone(),
                expected: schema.width(),
                found: self.schema.width(),
                record: 0,
            });
        }
        self.schema = schema;
        Ok(())
    }

    fn declared_type(&self, column: &str) -> Result<ColumnType> {
        self.schema
            .column(column)
            .map(|c| c.ty)
            .ok_or_else(|| PipelineError::UnknownColumn {
                schema: self.schema.name.clone(),
                column: column.to_string(),
            })
    }

    fn set_declared_type(&mut self, column: &str, ty: ColumnType) -> Result<()> {
        let idx = self.column_index(column)?;
        self.schema.columns[idx].ty = ty;
        Ok(())
    }
}
