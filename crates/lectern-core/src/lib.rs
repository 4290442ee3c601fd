//! Core of lectern: type-safe calls to database-side procedures.
//!
//! A [`ProcedureRegistry`] declares each procedure's parameters and output
//! shape. The [`ProcedureInvoker`] looks a procedure up, calls it through an
//! injected [`ProcedureConnection`], and validates every returned row into a
//! [`ValidatedRow`], failing the whole batch on any mismatch.
//!
//! The crate also carries the SQLite backend ([`schema::Database`]), the
//! demo domain model, and the typed analytics [`catalog`].

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod executor;
pub mod invoker;
pub mod model;
pub mod normalize;
pub mod procedure;
pub mod schema;
pub mod validate;
pub mod value;

pub use error::{ConnectionError, Error, Result};
pub use executor::ProcedureConnection;
pub use invoker::ProcedureInvoker;
pub use procedure::{ProcedureManifest, ProcedureRegistry, ProcedureSpec, SemanticType};
pub use validate::{ColumnError, FromValidatedRow, ValidatedRow, ValidatedValue};
pub use value::{DecimalText, RawRow, ToNumeric, Value};
