pub mod db;
pub mod migrations;
pub mod procedures;

pub use db::Database;
pub use procedures::{ProcedureCallError, StoredProcedure};
