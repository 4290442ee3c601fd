//! Untyped values as they cross the driver boundary.
//!
//! [`Value`] is used both for bound procedure parameters and for the cells
//! of a [`RawRow`]. Nothing here is validated; that is the job of
//! [`crate::validate`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// A decimal object that can be converted to a host number.
///
/// Drivers hand out arbitrary-precision numerics as opaque decimal objects.
/// The conversion is lossy: a decimal with more significant digits than an
/// `f64` can hold is rounded.
pub trait ToNumeric: fmt::Debug + Send + Sync {
    /// Convert to `f64`, or `None` when the value has no numeric reading.
    fn to_numeric(&self) -> Option<f64>;
}

/// A decimal carried as its exact textual form (e.g. `"1550.00"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecimalText(String);

impl DecimalText {
    #[must_use]
    pub fn new(digits: impl Into<String>) -> Self {
        Self(digits.into())
    }

    /// The exact textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ToNumeric for DecimalText {
    fn to_numeric(&self) -> Option<f64> {
        parse_numeric_text(&self.0)
    }
}

impl fmt::Display for DecimalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse decimal text into a finite `f64`.
pub(crate) fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    // `f64::from_str` also accepts "inf" and "NaN", which are not numerals.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// An untyped database value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    /// An integer wider than `i64` (e.g. a `NUMERIC` count or a `BIGINT` sum).
    WideInteger(i128),
    Real(f64),
    Decimal(Arc<dyn ToNumeric>),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Wrap a decimal object.
    pub fn decimal(decimal: impl ToNumeric + 'static) -> Self {
        Self::Decimal(Arc::new(decimal))
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::WideInteger(_) => "wide integer",
            Self::Real(_) => "real",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Self::WideInteger(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<DecimalText> for Value {
    fn from(v: DecimalText) -> Self {
        Self::decimal(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// One result row exactly as the driver returned it.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    cells: HashMap<String, Value>,
}

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.cells.insert(column.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(String, Value)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_text_to_numeric() {
        assert_eq!(DecimalText::new("1550.00").to_numeric(), Some(1550.0));
        assert_eq!(DecimalText::new(" -0.5 ").to_numeric(), Some(-0.5));
        assert_eq!(DecimalText::new("abc").to_numeric(), None);
    }

    #[test]
    fn test_numeric_text_rejects_non_numerals() {
        assert_eq!(parse_numeric_text("inf"), None);
        assert_eq!(parse_numeric_text("NaN"), None);
        assert_eq!(parse_numeric_text(""), None);
        assert_eq!(parse_numeric_text("1e400"), None);
        assert_eq!(parse_numeric_text("12"), Some(12.0));
    }

    #[test]
    fn test_option_into_value() {
        let none: Option<i64> = None;
        assert!(Value::from(none).is_null());
        assert!(matches!(Value::from(Some("x")), Value::Text(ref s) if s == "x"));
    }

    #[test]
    fn test_raw_row_builder() {
        let row = RawRow::new().with("a", 1_i64).with("b", "two");
        assert_eq!(row.len(), 2);
        assert!(matches!(row.get("a"), Some(Value::Integer(1))));
        assert!(row.get("c").is_none());
    }
}
