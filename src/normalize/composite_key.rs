//! Composite key tokens of the form `[A, B]`
//!
//! Bidirectional relationships store both endpoint ids in one column as a
//! bracketed pair. Decoding removes every bracket, splits on commas and
//! requires exactly two parts.
//!
//! # Example
//!
//! ```ignore
//! use crate::normalize::composite_key::CompositeKey;
//!
//! let key = CompositeKey::parse("[123, 456]")?;
//! assert_eq!(key.first, "123");
//! assert_eq!(key.second, "456");
//!
//! assert!(CompositeKey::parse("[1, 2, 3]").is_err());
//! ```

use std::fmt;

use crate::errors::{PipelineError, Result};
use crate::table::{Table, Value};

/// Error type for composite key decoding
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeKeyError {
    /// Token did not split into exactly two parts
    InvalidFormat { key: String, parts: usize },
}

impl fmt::Display for CompositeKeyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompositeKeyError::InvalidFormat { key, parts } => {
                write!(
                    f,
                    "Invalid composite key '{}': found {} parts. Expected '[FIRST, SECOND]'",
                    key, parts
                )
            }
        }
    }
}

impl std::error::Error for CompositeKeyError {}

/// Decoded endpoint pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    /// First id of the pair (becomes `start_id`)
    pub first: String,
    /// Second id of the pair (becomes `end_id`)
    pub second: String,
}

impl CompositeKey {
    /// Parse a composite key token
    ///
    /// Surrounding whitespace of each part is stripped; brackets may appear
    /// anywhere and are all removed.
    pub fn parse(token: &str) -> std::result::Result<Self, CompositeKeyError> {
        let stripped: String = token.chars().filter(|c| !matches!(c, '[' | ']')).collect();
        let parts: Vec<&str> = stripped.split(',').collect();

        if parts.len() != 2 {
            return Err(CompositeKeyError::InvalidFormat {
                key: token.to_string(),
                parts: parts.len(),
            });
        }

        Ok(CompositeKey {
            first: parts[0].trim().to_string(),
            second: parts[1].trim().to_string(),
        })
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {}]", self.first, self.second)
    }
}

/// Decode a token into its two scalar parts
pub fn decode(token: &str) -> std::result::Result<(String, String), CompositeKeyError> {
    CompositeKey::parse(token).map(|key| (key.first, key.second))
}

/// Decode every token of `column` into two parallel columns.
///
/// All-or-nothing: the first malformed or missing token fails the whole
/// column and nothing is returned.
pub fn decode_column(table: &Table, column: &str) -> Result<(Vec<Value>, Vec<Value>)> {
    let cells = table.column(column)?;
    let mut firsts = Vec::with_capacity(cells.len());
    let mut seconds = Vec::with_capacity(cells.len());

    for cell in cells {
        let token = match cell {
            Value::Missing => {
                return Err(PipelineError::MalformedKey {
                    column: column.to_string(),
                    token: String::new(),
                    parts: 0,
                })
            }
            other => other.to_string(),
        };

        let key = CompositeKey::parse(&token).map_err(|e| match e {
            CompositeKeyError::InvalidFormat { key, parts } => PipelineError::MalformedKey {
                column: column.to_string(),
                token: key,
                parts,
            },
        })?;
        firsts.push(Value::Text(key.first));
        seconds.push(Value::Text(key.second));
    }

    Ok((firsts, seconds))
}
