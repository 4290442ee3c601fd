pub mod manifest;
pub mod registry;
pub mod spec;

pub use manifest::ProcedureManifest;
pub use registry::ProcedureRegistry;
pub use spec::{ColumnSpec, ProcedureSpec, ProcedureSpecBuilder, SemanticType};
