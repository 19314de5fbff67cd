//! Type coercion dispatched on [`ColumnType`]
//!
//! One function per direction: [`convert`] answers "can this cell become that
//! type", [`coerce`] turns a refusal into a `TypeCoercion` error naming the
//! column. Missing cells stay missing for string types and are refused by the
//! numeric ones; callers that accept absent numbers fill them first.

use super::schema::ColumnType;
use super::Value;
use crate::errors::{PipelineError, Result};

/// Convert a cell to the given semantic type, or `None` if it cannot be
pub fn convert(value: &Value, ty: ColumnType) -> Option<Value> {
    match ty {
        ColumnType::Int64Id => match value {
            Value::Id(id) => Some(Value::Id(*id)),
            Value::Count(count) => Some(Value::Id(i64::from(*count))),
            Value::Text(text) => parse_integral(text).map(Value::Id),
            Value::Missing => None,
        },

        ColumnType::Int16Count => match value {
            Value::Count(count) => Some(Value::Count(*count)),
            Value::Id(id) => i16::try_from(*id).ok().map(Value::Count),
            Value::Text(text) => parse_integral(text)
                .and_then(|n| i16::try_from(n).ok())
                .map(Value::Count),
            Value::Missing => None,
        },

        ColumnType::UpperString => Some(match value {
            Value::Text(text) => Value::Text(text.trim().to_uppercase()),
            Value::Missing => Value::Missing,
            other => Value::Text(other.to_string()),
        }),

        ColumnType::TrimmedString => Some(match value {
            Value::Text(text) => Value::Text(text.trim().to_string()),
            Value::Missing => Value::Missing,
            other => Value::Text(other.to_string()),
        }),
    }
}

/// Convert a cell, failing with the column name and offending value
pub fn coerce(value: &Value, ty: ColumnType, column: &str) -> Result<Value> {
    convert(value, ty).ok_or_else(|| PipelineError::TypeCoercion {
        column: column.to_string(),
        value: match value {
            Value::Missing => "<missing>".to_string(),
            other => other.to_string(),
        },
        target: ty.target_name(),
    })
}

/// Parse an integer, also accepting a zero fraction such as `3.0` or `12.00`.
/// The integer part is parsed exactly; exponent and fractional spellings are refused.
fn parse_integral(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }

    let (whole, fraction) = trimmed.split_once('.')?;
    if fraction.is_empty() || !fraction.bytes().all(|b| b == b'0') {
        return None;
    }
    whole.parse::<i64>().ok()
}
