//! Column descriptors for positional record layouts
//!
//! Raw extracts carry no column names on the wire. Every stage binds them
//! through a [`Schema`]: an ordered list of column name, bulk-loader header
//! name and semantic type. Binding checks record width, so a layout drift
//! upstream fails loudly instead of shifting every column by one.
//!
//! # Supported Types
//!
//! - `Int64Id` - node and relationship identifiers
//! - `Int16Count` - small reference counts
//! - `UpperString` - enum-like labels stored upper-case
//! - `TrimmedString` - free text, surrounding whitespace removed

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a column, used to dispatch coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// 64-bit integer identifier
    Int64Id,

    /// 16-bit count
    Int16Count,

    /// Trimmed, upper-cased string
    UpperString,

    /// Trimmed string
    TrimmedString,
}

impl ColumnType {
    /// Name of the target type used in coercion error messages
    pub fn target_name(&self) -> &'static str {
        match self {
            ColumnType::Int64Id => "int64",
            ColumnType::Int16Count => "int16",
            ColumnType::UpperString => "upper-case string",
            ColumnType::TrimmedString => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.target_name())
    }
}

/// One column of a layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Name used inside the pipeline (e.g. `start_id`)
    pub name: String,
    /// Name written to header files for the bulk loader (e.g. `:START_ID`)
    pub header: String,
    pub ty: ColumnType,
}

impl ColumnDef {
    pub fn new(name: &str, header: &str, ty: ColumnType) -> Self {
        ColumnDef {
            name: name.to_string(),
            header: header.to_string(),
            ty,
        }
    }
}

/// Ordered column layout with a name used in error reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    /// Build a schema from `(name, header, type)` triples
    ///
    /// # Example
    /// ```ignore
    /// let schema = Schema::new("nodes", &[
    ///     ("id", ":ID", ColumnType::Int64Id),
    ///     ("name", "name", ColumnType::TrimmedString),
    /// ]);
    /// assert_eq!(schema.width(), 2);
    /// ```
    pub fn new(name: &str, columns: &[(&str, &str, ColumnType)]) -> Self {
        Schema {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|(name, header, ty)| ColumnDef::new(name, header, *ty))
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }

    pub fn column(&self, column: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == column)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Header names in column order, as written to header artifacts
    pub fn header_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    /// Copy of this schema without the named columns
    pub fn without(&self, name: &str, dropped: &[&str]) -> Schema {
        Schema {
            name: name.to_string(),
            columns: self
                .columns
                .iter()
                .filter(|c| !dropped.contains(&c.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Two layouts bind the same columns in the same order.
    /// Type tags and header names are not compared.
    pub fn same_columns(&self, other: &Schema) -> bool {
        self.column_names() == other.column_names()
    }
}
