//! Validation of raw driver rows against a declared output shape.
//!
//! Validation is all-or-nothing: one bad cell anywhere in the batch fails the
//! whole call, and no partially validated rows are returned.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::procedure::ProcedureSpec;
use crate::value::{RawRow, Value};

/// A cell after validation and normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValidatedValue {
    Text(String),
    Integer(i64),
    /// Lossy reading of an arbitrary-precision number.
    Number(f64),
    Timestamp(DateTime<Utc>),
    /// An optional column that was null or missing.
    Absent,
}

impl ValidatedValue {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// A row whose columns match the declared output shape, in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    columns: Vec<(String, ValidatedValue)>,
}

/// A typed read from a [`ValidatedRow`] did not match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column {column}: {reason}")]
pub struct ColumnError {
    pub column: String,
    pub reason: String,
}

impl ColumnError {
    fn new(column: &str, reason: impl Into<String>) -> Self {
        Self {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

impl ValidatedRow {
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ValidatedValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in declared order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidatedValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn require(&self, column: &str) -> std::result::Result<&ValidatedValue, ColumnError> {
        self.get(column)
            .ok_or_else(|| ColumnError::new(column, "not declared in the output shape"))
    }

    pub fn text(&self, column: &str) -> std::result::Result<&str, ColumnError> {
        self.optional_text(column)?
            .ok_or_else(|| ColumnError::new(column, "value is absent"))
    }

    pub fn optional_text(&self, column: &str) -> std::result::Result<Option<&str>, ColumnError> {
        match self.require(column)? {
            ValidatedValue::Text(s) => Ok(Some(s)),
            ValidatedValue::Absent => Ok(None),
            _ => Err(ColumnError::new(column, "not a text column")),
        }
    }

    pub fn integer(&self, column: &str) -> std::result::Result<i64, ColumnError> {
        self.optional_integer(column)?
            .ok_or_else(|| ColumnError::new(column, "value is absent"))
    }

    pub fn optional_integer(&self, column: &str) -> std::result::Result<Option<i64>, ColumnError> {
        match self.require(column)? {
            ValidatedValue::Integer(v) => Ok(Some(*v)),
            ValidatedValue::Absent => Ok(None),
            _ => Err(ColumnError::new(column, "not an integer column")),
        }
    }

    pub fn number(&self, column: &str) -> std::result::Result<f64, ColumnError> {
        match self.require(column)? {
            ValidatedValue::Number(v) => Ok(*v),
            _ => Err(ColumnError::new(column, "not a number column")),
        }
    }

    pub fn timestamp(&self, column: &str) -> std::result::Result<DateTime<Utc>, ColumnError> {
        self.optional_timestamp(column)?
            .ok_or_else(|| ColumnError::new(column, "value is absent"))
    }

    pub fn optional_timestamp(
        &self,
        column: &str,
    ) -> std::result::Result<Option<DateTime<Utc>>, ColumnError> {
        match self.require(column)? {
            ValidatedValue::Timestamp(ts) => Ok(Some(*ts)),
            ValidatedValue::Absent => Ok(None),
            _ => Err(ColumnError::new(column, "not a timestamp column")),
        }
    }
}

impl Serialize for ValidatedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Typed records built from validated rows.
pub trait FromValidatedRow: Sized {
    fn from_row(row: &ValidatedRow) -> std::result::Result<Self, ColumnError>;
}

/// Validate a batch of raw rows against `spec`.
pub fn validate(spec: &ProcedureSpec, rows: &[RawRow]) -> Result<Vec<ValidatedRow>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| validate_row(spec, index, row))
        .collect()
}

fn validate_row(spec: &ProcedureSpec, index: usize, row: &RawRow) -> Result<ValidatedRow> {
    let mut columns = Vec::with_capacity(spec.columns().len());

    for column in spec.columns() {
        let optional = column.semantic_type.is_optional();
        let value = match row.get(&column.name) {
            None | Some(Value::Null) if optional => ValidatedValue::Absent,
            None => return Err(failed(spec, index, &column.name, "column is missing")),
            Some(Value::Null) => {
                return Err(failed(spec, index, &column.name, "required value is null"))
            }
            Some(raw) => normalize(column.semantic_type, raw)
                .map_err(|e| failed(spec, index, &column.name, e.to_string()))?,
        };
        columns.push((column.name.clone(), value));
    }

    Ok(ValidatedRow { columns })
}

fn failed(spec: &ProcedureSpec, row: usize, column: &str, reason: impl Into<String>) -> Error {
    Error::ValidationFailed {
        procedure: spec.name().to_string(),
        row,
        column: column.to_string(),
        reason: reason.into(),
    }
}
