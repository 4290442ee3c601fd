//! Named procedures on SQLite.
//!
//! SQLite has no server-side procedures, so bodies live in the
//! `stored_procedures` table and are called by name. The body is looked up
//! with a bound name, its declared arity is checked, and the caller's values
//! are bound to `?1..?n`. Caller values never become part of the SQL text.

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::OptionalExtension;
use thiserror::Error;

use crate::error::{ConnectionError, Result};
use crate::executor::ProcedureConnection;
use crate::value::{RawRow, Value};

use super::db::Database;

/// Why a SQLite procedure call failed.
#[derive(Debug, Error)]
pub enum ProcedureCallError {
    #[error("no stored procedure named {name}")]
    Missing { name: String },

    #[error("stored procedure {name} takes {declared} arguments, {given} given")]
    ArityMismatch {
        name: String,
        declared: usize,
        given: usize,
    },

    #[error("column {column} holds text that is not valid UTF-8")]
    InvalidText { column: String },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// A deployed procedure body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProcedure {
    pub name: String,
    pub arity: usize,
    pub body: String,
}

impl Database {
    /// Install or replace a procedure body.
    pub fn deploy_procedure(&self, name: &str, arity: u32, body: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO stored_procedures (name, arity, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                arity = excluded.arity,
                body = excluded.body,
                deployed_at = datetime('now')",
            rusqlite::params![name, arity, body],
        )?;
        log::debug!("Deployed procedure {name} (arity {arity})");
        Ok(())
    }

    /// List deployed procedures by name.
    pub fn list_procedures(&self) -> Result<Vec<StoredProcedure>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT name, arity, body FROM stored_procedures ORDER BY name")?;
        let procedures = stmt
            .query_map([], |row| {
                let arity: i64 = row.get(1)?;
                Ok(StoredProcedure {
                    name: row.get(0)?,
                    arity: usize::try_from(arity)
                        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(1, arity))?,
                    body: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(procedures)
    }

    fn call_stored(
        &self,
        name: &str,
        params: &[Value],
    ) -> std::result::Result<Vec<RawRow>, ProcedureCallError> {
        let stored: Option<(i64, String)> = self
            .conn()
            .query_row(
                "SELECT arity, body FROM stored_procedures WHERE name = ?1",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((arity, body)) = stored else {
            return Err(ProcedureCallError::Missing {
                name: name.to_string(),
            });
        };

        let declared = usize::try_from(arity).unwrap_or(usize::MAX);
        if declared != params.len() {
            return Err(ProcedureCallError::ArityMismatch {
                name: name.to_string(),
                declared,
                given: params.len(),
            });
        }

        let mut stmt = self.conn().prepare(&body)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut raw = RawRow::new();
            for (idx, column) in columns.iter().enumerate() {
                raw.insert(column.clone(), cell_to_value(column, row.get_ref(idx)?)?);
            }
            out.push(raw);
        }
        Ok(out)
    }
}

impl ProcedureConnection for Database {
    fn call_procedure(
        &self,
        name: &str,
        params: &[Value],
    ) -> std::result::Result<Vec<RawRow>, ConnectionError> {
        self.call_stored(name, params).map_err(Into::into)
    }
}

/// Map a cell by storage class.
fn cell_to_value(column: &str, cell: ValueRef<'_>) -> std::result::Result<Value, ProcedureCallError> {
    Ok(match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(
            std::str::from_utf8(bytes)
                .map_err(|_| ProcedureCallError::InvalidText {
                    column: column.to_string(),
                })?
                .to_string(),
        ),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(SqlValue::Null),
            Self::Integer(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Self::WideInteger(v) => match i64::try_from(*v) {
                Ok(narrow) => ToSqlOutput::Owned(SqlValue::Integer(narrow)),
                Err(_) => ToSqlOutput::Owned(SqlValue::Text(v.to_string())),
            },
            Self::Real(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            Self::Decimal(decimal) => {
                let number = decimal
                    .to_numeric()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        rusqlite::Error::ToSqlConversionFailure(
                            format!("decimal {decimal:?} has no finite numeric value").into(),
                        )
                    })?;
                ToSqlOutput::Owned(SqlValue::Real(number))
            }
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Self::Timestamp(ts) => ToSqlOutput::Owned(SqlValue::Text(ts.to_rfc3339())),
        })
    }
}
