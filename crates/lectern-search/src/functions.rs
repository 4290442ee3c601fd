//! SQL functions installed on a connection.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use crate::embedding::{cosine_distance, decode};

/// Name of the cosine-distance SQL function.
pub const VEC_DISTANCE_COSINE: &str = "vec_distance_cosine";

/// Install `vec_distance_cosine(a BLOB, b BLOB) -> REAL`.
///
/// Returns NULL when either argument is NULL, the dimensions differ, or a
/// vector has zero norm. A blob that is not a whole number of `f32`s is an
/// error.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        VEC_DISTANCE_COSINE,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let a: Option<Vec<u8>> = ctx.get(0)?;
            let b: Option<Vec<u8>> = ctx.get(1)?;
            let (Some(a), Some(b)) = (a, b) else {
                return Ok(None);
            };
            let a = decode(&a).map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
            let b = decode(&b).map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
            Ok(cosine_distance(&a, &b))
        },
    )?;
    log::debug!("Registered SQL function {VEC_DISTANCE_COSINE}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::encode;

    fn distance(conn: &Connection, a: &[f32], b: &[f32]) -> Option<f64> {
        conn.query_row(
            "SELECT vec_distance_cosine(?1, ?2)",
            rusqlite::params![encode(a), encode(b)],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_sql_function() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let d = distance(&conn, &[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!((d - 1.0).abs() < 1e-9);
        assert_eq!(distance(&conn, &[1.0], &[1.0, 0.0]), None);
    }

    #[test]
    fn test_sql_function_null_and_bad_blob() {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();

        let null: Option<f64> = conn
            .query_row("SELECT vec_distance_cosine(NULL, x'00000000')", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(null, None);

        let err = conn.query_row(
            "SELECT vec_distance_cosine(x'000000', x'00000000')",
            [],
            |row| row.get::<_, Option<f64>>(0),
        );
        assert!(err.is_err());
    }
}
