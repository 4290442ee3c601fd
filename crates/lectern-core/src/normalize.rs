//! Coercion of present raw values into host types.
//!
//! The two numeric rules are deliberately asymmetric:
//!
//! - **Wide integers** (counts, sums) are *exact or fail*. The representable
//!   range is the full `i64` range, [`WIDE_INTEGER_MIN`]..=[`WIDE_INTEGER_MAX`].
//!   A value outside it is an error, never truncated or wrapped.
//! - **Arbitrary-precision numbers** (averages, ratios) are *lossy by
//!   design*. They are converted to `f64` for display and may lose digits a
//!   database decimal would keep. Callers needing exact decimals must select
//!   the column as text instead.
//!
//! Null handling is not done here; [`crate::validate`] decides whether a
//! missing value is allowed before calling in.

use chrono::{DateTime, Utc};
use std::num::IntErrorKind;
use thiserror::Error;

use crate::procedure::SemanticType;
use crate::validate::ValidatedValue;
use crate::value::{parse_numeric_text, Value};

/// Smallest value accepted for a wide-integer column.
pub const WIDE_INTEGER_MIN: i128 = i64::MIN as i128;

/// Largest value accepted for a wide-integer column.
pub const WIDE_INTEGER_MAX: i128 = i64::MAX as i128;

/// Why a raw value could not be coerced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("expected {expected}, found {found}")]
    Unsupported {
        expected: SemanticType,
        found: &'static str,
    },

    #[error("{value} is outside the representable integer range [{min}, {max}]", min = WIDE_INTEGER_MIN, max = WIDE_INTEGER_MAX)]
    OutOfRange { value: String },

    #[error("{text:?} is not a number")]
    NotNumeric { text: String },

    #[error("{text:?} is not an RFC 3339 timestamp")]
    InvalidTimestamp { text: String },
}

/// Coerce a present value to the given semantic type.
pub fn normalize(semantic_type: SemanticType, value: &Value) -> Result<ValidatedValue, NormalizeError> {
    match semantic_type.required() {
        SemanticType::Text => text(value).map(ValidatedValue::Text),
        SemanticType::WideInteger => wide_integer(value).map(ValidatedValue::Integer),
        SemanticType::ArbitraryPrecisionNumber => {
            arbitrary_precision(value).map(ValidatedValue::Number)
        }
        SemanticType::Timestamp => timestamp(value).map(ValidatedValue::Timestamp),
        // `required()` never yields an optional type.
        SemanticType::OptionalText
        | SemanticType::OptionalWideInteger
        | SemanticType::OptionalTimestamp => Err(unsupported(semantic_type, value)),
    }
}

/// Text passes through unchanged.
pub fn text(value: &Value) -> Result<String, NormalizeError> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        other => Err(unsupported(SemanticType::Text, other)),
    }
}

/// Exact conversion to `i64`.
pub fn wide_integer(value: &Value) -> Result<i64, NormalizeError> {
    match value {
        Value::Integer(v) => Ok(*v),
        Value::WideInteger(v) => i64::try_from(*v).map_err(|_| NormalizeError::OutOfRange {
            value: v.to_string(),
        }),
        Value::Text(s) => parse_integer_text(s),
        other => Err(unsupported(SemanticType::WideInteger, other)),
    }
}

fn parse_integer_text(text: &str) -> Result<i64, NormalizeError> {
    let trimmed = text.trim();
    match trimmed.parse::<i64>() {
        Ok(v) => Ok(v),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Err(NormalizeError::OutOfRange {
                    value: trimmed.to_string(),
                })
            }
            _ => Err(NormalizeError::NotNumeric {
                text: text.to_string(),
            }),
        },
    }
}

/// Lossy conversion to `f64`.
pub fn arbitrary_precision(value: &Value) -> Result<f64, NormalizeError> {
    match value {
        Value::Decimal(decimal) => decimal
            .to_numeric()
            .filter(|v| v.is_finite())
            .ok_or_else(|| NormalizeError::NotNumeric {
                text: format!("{decimal:?}"),
            }),
        Value::Text(s) => parse_numeric_text(s).ok_or_else(|| NormalizeError::NotNumeric {
            text: s.clone(),
        }),
        Value::Real(v) if v.is_finite() => Ok(*v),
        Value::Real(v) => Err(NormalizeError::NotNumeric {
            text: v.to_string(),
        }),
        #[allow(clippy::cast_precision_loss)]
        Value::Integer(v) => Ok(*v as f64),
        other => Err(unsupported(SemanticType::ArbitraryPrecisionNumber, other)),
    }
}

/// Timestamps pass through; RFC 3339 text (how SQLite stores them) is parsed.
pub fn timestamp(value: &Value) -> Result<DateTime<Utc>, NormalizeError> {
    match value {
        Value::Timestamp(ts) => Ok(*ts),
        Value::Text(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| NormalizeError::InvalidTimestamp { text: s.clone() }),
        other => Err(unsupported(SemanticType::Timestamp, other)),
    }
}

fn unsupported(expected: SemanticType, found: &Value) -> NormalizeError {
    NormalizeError::Unsupported {
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{DecimalText, ToNumeric};
    use chrono::TimeZone;

    #[derive(Debug)]
    struct DecimalStub(f64);

    impl ToNumeric for DecimalStub {
        fn to_numeric(&self) -> Option<f64> {
            Some(self.0)
        }
    }

    #[test]
    fn test_wide_integer_exact_within_range() {
        let samples = [
            (Value::WideInteger(0), 0),
            (Value::WideInteger(1), 1),
            (Value::WideInteger(WIDE_INTEGER_MAX), i64::MAX),
            (Value::WideInteger(WIDE_INTEGER_MIN), i64::MIN),
            (Value::Integer(42), 42),
            (Value::Text("9223372036854775807".to_string()), i64::MAX),
            (Value::Text(" -17 ".to_string()), -17),
        ];
        for (raw, expected) in samples {
            assert_eq!(wide_integer(&raw).unwrap(), expected, "raw value {raw:?}");
        }
    }

    #[test]
    fn test_wide_integer_one_above_range_fails() {
        let err = wide_integer(&Value::WideInteger(WIDE_INTEGER_MAX + 1)).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::OutOfRange {
                value: "9223372036854775808".to_string()
            }
        );

        let err = wide_integer(&Value::Text("9223372036854775808".to_string())).unwrap_err();
        assert!(matches!(err, NormalizeError::OutOfRange { .. }));

        let err = wide_integer(&Value::WideInteger(WIDE_INTEGER_MIN - 1)).unwrap_err();
        assert!(matches!(err, NormalizeError::OutOfRange { .. }));
    }

    #[test]
    fn test_wide_integer_rejects_non_numeric() {
        let err = wide_integer(&Value::Text("twelve".to_string())).unwrap_err();
        assert!(matches!(err, NormalizeError::NotNumeric { .. }));

        let err = wide_integer(&Value::Text("12.5".to_string())).unwrap_err();
        assert!(matches!(err, NormalizeError::NotNumeric { .. }));

        let err = wide_integer(&Value::Real(3.0)).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::Unsupported {
                expected: SemanticType::WideInteger,
                found: "real"
            }
        ));
    }

    #[test]
    fn test_arbitrary_precision_1550() {
        assert_eq!(arbitrary_precision(&Value::Text("1550.00".to_string())).unwrap(), 1550.0);
        assert_eq!(arbitrary_precision(&Value::decimal(DecimalStub(1550.0))).unwrap(), 1550.0);
        assert_eq!(arbitrary_precision(&Value::from(DecimalText::new("1550.00"))).unwrap(), 1550.0);
    }

    #[test]
    fn test_arbitrary_precision_is_lossy() {
        // More digits than an f64 can carry
        let value = Value::Text("0.12345678901234567890123".to_string());
        let number = arbitrary_precision(&value).unwrap();
        assert!((number - 0.123_456_789_012_345_68).abs() < f64::EPSILON);
    }

    #[test]
    fn test_arbitrary_precision_rejects_garbage() {
        assert!(matches!(
            arbitrary_precision(&Value::Text("n/a".to_string())),
            Err(NormalizeError::NotNumeric { .. })
        ));
        assert!(matches!(
            arbitrary_precision(&Value::Real(f64::NAN)),
            Err(NormalizeError::NotNumeric { .. })
        ));
        assert!(matches!(
            arbitrary_precision(&Value::Blob(vec![1, 2])),
            Err(NormalizeError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_arbitrary_precision_rejects_non_finite_decimal() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                arbitrary_precision(&Value::decimal(DecimalStub(bad))),
                Err(NormalizeError::NotNumeric { .. })
            ));
        }
    }

    #[test]
    fn test_timestamp_forms() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(timestamp(&Value::Timestamp(ts)).unwrap(), ts);
        assert_eq!(
            timestamp(&Value::Text("2024-03-01T13:00:00+01:00".to_string())).unwrap(),
            ts
        );
        assert!(matches!(
            timestamp(&Value::Text("yesterday".to_string())),
            Err(NormalizeError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            timestamp(&Value::Integer(1_700_000_000)),
            Err(NormalizeError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_normalize_dispatches_on_required_type() {
        assert_eq!(
            normalize(SemanticType::OptionalText, &Value::Text("x".to_string())).unwrap(),
            ValidatedValue::Text("x".to_string())
        );
        assert_eq!(
            normalize(SemanticType::OptionalWideInteger, &Value::Integer(5)).unwrap(),
            ValidatedValue::Integer(5)
        );
        assert!(normalize(SemanticType::Text, &Value::Integer(5)).is_err());
    }
}
