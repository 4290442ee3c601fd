use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// The declared type of a result column.
///
/// Drives both validation (is a null allowed?) and normalization (which raw
/// forms are accepted, and what they become).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Text,
    OptionalText,
    /// Exact integer, normalized to `i64` or rejected.
    WideInteger,
    OptionalWideInteger,
    /// Exact decimal in the database, normalized lossily to `f64`.
    ArbitraryPrecisionNumber,
    Timestamp,
    OptionalTimestamp,
}

impl SemanticType {
    /// Whether a null or missing value is acceptable.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(
            self,
            Self::OptionalText | Self::OptionalWideInteger | Self::OptionalTimestamp
        )
    }

    /// The non-optional counterpart.
    #[must_use]
    pub const fn required(self) -> Self {
        match self {
            Self::Text | Self::OptionalText => Self::Text,
            Self::WideInteger | Self::OptionalWideInteger => Self::WideInteger,
            Self::ArbitraryPrecisionNumber => Self::ArbitraryPrecisionNumber,
            Self::Timestamp | Self::OptionalTimestamp => Self::Timestamp,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::OptionalText => "optional_text",
            Self::WideInteger => "wide_integer",
            Self::OptionalWideInteger => "optional_wide_integer",
            Self::ArbitraryPrecisionNumber => "arbitrary_precision_number",
            Self::Timestamp => "timestamp",
            Self::OptionalTimestamp => "optional_timestamp",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
}

/// The contract of a database-side procedure.
///
/// Built once at startup and never mutated; use [`ProcedureSpec::builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureSpec {
    name: String,
    params: Vec<String>,
    columns: Vec<ColumnSpec>,
}

impl ProcedureSpec {
    /// Start building a spec for the named procedure.
    pub fn builder(name: impl Into<String>) -> ProcedureSpecBuilder {
        ProcedureSpecBuilder {
            name: name.into(),
            params: Vec::new(),
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter names in binding order.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Output columns in declared order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Look up the declared type of a column.
    #[must_use]
    pub fn column_type(&self, column: &str) -> Option<SemanticType> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.semantic_type)
    }
}

/// Builder for [`ProcedureSpec`].
#[derive(Debug, Clone)]
pub struct ProcedureSpecBuilder {
    name: String,
    params: Vec<String>,
    columns: Vec<ColumnSpec>,
}

impl ProcedureSpecBuilder {
    /// Append a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    /// Append an output column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, semantic_type: SemanticType) -> Self {
        self.columns.push(ColumnSpec {
            name: name.into(),
            semantic_type,
        });
        self
    }

    /// Validate names and produce the spec.
    pub fn build(self) -> Result<ProcedureSpec> {
        let invalid = |reason: String| Error::InvalidSpec {
            procedure: self.name.clone(),
            reason,
        };

        if !is_identifier(&self.name) {
            return Err(invalid(format!("{:?} is not a valid identifier", self.name)));
        }

        let mut seen = HashSet::new();
        for param in &self.params {
            if !is_identifier(param) {
                return Err(invalid(format!("parameter {param:?} is not a valid identifier")));
            }
            if !seen.insert(param.as_str()) {
                return Err(invalid(format!("duplicate parameter {param:?}")));
            }
        }

        seen.clear();
        for column in &self.columns {
            if !is_identifier(&column.name) {
                return Err(invalid(format!(
                    "column {:?} is not a valid identifier",
                    column.name
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(invalid(format!("duplicate column {:?}", column.name)));
            }
        }

        Ok(ProcedureSpec {
            name: self.name,
            params: self.params,
            columns: self.columns,
        })
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
