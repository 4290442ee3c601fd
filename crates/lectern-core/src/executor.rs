//! Raw procedure execution.

use crate::error::{ConnectionError, Error, Result};
use crate::procedure::ProcedureSpec;
use crate::value::{RawRow, Value};

/// The one capability the procedure layer needs from a database.
///
/// Implementations call the named procedure with `params` bound in order,
/// in a single round trip, and return every result row as an untyped
/// record. Parameters must be bound, never spliced into query text.
pub trait ProcedureConnection {
    fn call_procedure(
        &self,
        name: &str,
        params: &[Value],
    ) -> std::result::Result<Vec<RawRow>, ConnectionError>;
}

impl<C: ProcedureConnection + ?Sized> ProcedureConnection for &C {
    fn call_procedure(
        &self,
        name: &str,
        params: &[Value],
    ) -> std::result::Result<Vec<RawRow>, ConnectionError> {
        (**self).call_procedure(name, params)
    }
}

impl<C: ProcedureConnection + ?Sized> ProcedureConnection for Box<C> {
    fn call_procedure(
        &self,
        name: &str,
        params: &[Value],
    ) -> std::result::Result<Vec<RawRow>, ConnectionError> {
        (**self).call_procedure(name, params)
    }
}

/// Call the procedure described by `spec`.
///
/// The argument count is checked against the declared parameters before the
/// connection is touched. Database failures are not retried.
pub fn execute<C>(conn: &C, spec: &ProcedureSpec, params: &[Value]) -> Result<Vec<RawRow>>
where
    C: ProcedureConnection + ?Sized,
{
    if params.len() != spec.arity() {
        return Err(Error::InvalidArguments {
            procedure: spec.name().to_string(),
            expected: spec.arity(),
            actual: params.len(),
        });
    }

    log::debug!("Calling procedure {} with {} params", spec.name(), params.len());

    match conn.call_procedure(spec.name(), params) {
        Ok(rows) => {
            log::debug!("Procedure {} returned {} rows", spec.name(), rows.len());
            Ok(rows)
        }
        Err(source) => {
            log::warn!("Procedure {} failed: {}", spec.name(), source);
            Err(Error::QueryFailed {
                procedure: spec.name().to_string(),
                source,
            })
        }
    }
}
