use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        // Stored as hyphenated text.
        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0.hyphenated().to_string()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

define_id!(AuthorId, "Unique identifier for an author.");
define_id!(PostId, "Unique identifier for a post.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        assert_ne!(PostId::new(), PostId::new());
    }

    #[test]
    fn test_id_display_parse() {
        let id = AuthorId::new();
        let parsed: AuthorId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<PostId>().is_err());
    }

    #[test]
    fn test_id_sql_column() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT)").unwrap();

        let id = PostId::new();
        conn.execute("INSERT INTO t (id) VALUES (?1)", [id]).unwrap();

        let stored: String = conn.query_row("SELECT id FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(stored, id.to_string());

        let back: PostId = conn.query_row("SELECT id FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(back, id);

        let bad = conn.query_row("SELECT 'not-a-uuid'", [], |row| row.get::<_, AuthorId>(0));
        assert!(bad.is_err());
    }
}
