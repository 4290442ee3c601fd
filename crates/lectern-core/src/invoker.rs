use crate::error::{Error, Result};
use crate::executor::{execute, ProcedureConnection};
use crate::procedure::ProcedureRegistry;
use crate::validate::{validate, FromValidatedRow, ValidatedRow};
use crate::value::Value;

/// The entry point callers use: look up, call, validate.
///
/// The connection is injected, so the invoker carries no hidden global
/// state and tests can hand it a stub.
#[derive(Debug)]
pub struct ProcedureInvoker<C> {
    registry: ProcedureRegistry,
    conn: C,
}

impl<C: ProcedureConnection> ProcedureInvoker<C> {
    pub fn new(registry: ProcedureRegistry, conn: C) -> Self {
        Self { registry, conn }
    }

    #[must_use]
    pub const fn registry(&self) -> &ProcedureRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.conn
    }

    /// Invoke a registered procedure and validate every returned row.
    pub fn invoke(&self, name: &str, params: &[Value]) -> Result<Vec<ValidatedRow>> {
        let spec = self.registry.lookup(name)?;
        let rows = execute(&self.conn, &spec, params)?;
        validate(&spec, &rows)
    }

    /// Invoke and map each row into a typed record.
    pub fn invoke_as<T: FromValidatedRow>(&self, name: &str, params: &[Value]) -> Result<Vec<T>> {
        self.invoke(name, params)?
            .iter()
            .enumerate()
            .map(|(index, row)| {
                T::from_row(row).map_err(|e| Error::ValidationFailed {
                    procedure: name.to_string(),
                    row: index,
                    column: e.column,
                    reason: e.reason,
                })
            })
            .collect()
    }

    pub fn into_parts(self) -> (ProcedureRegistry, C) {
        (self.registry, self.conn)
    }
}
