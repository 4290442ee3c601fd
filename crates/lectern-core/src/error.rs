use thiserror::Error;

/// Boxed error produced by a [`ProcedureConnection`](crate::executor::ProcedureConnection).
pub type ConnectionError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// The caller passed the wrong number of parameters. Raised before any I/O.
    #[error("invalid arguments for {procedure}: expected {expected} parameters, got {actual}")]
    InvalidArguments {
        procedure: String,
        expected: usize,
        actual: usize,
    },

    /// No procedure with this name is registered.
    #[error("procedure not found: {procedure}")]
    NotFound { procedure: String },

    /// A procedure with this name is already registered.
    #[error("procedure already registered: {procedure}")]
    AlreadyRegistered { procedure: String },

    /// A procedure spec is malformed (bad identifier, duplicate names).
    #[error("invalid procedure spec {procedure}: {reason}")]
    InvalidSpec { procedure: String, reason: String },

    /// The database round trip failed.
    #[error("query failed for {procedure}: {source}")]
    QueryFailed {
        procedure: String,
        #[source]
        source: ConnectionError,
    },

    /// A returned row does not match the declared output shape.
    #[error("validation failed for {procedure} at row {row}, column {column}: {reason}")]
    ValidationFailed {
        procedure: String,
        row: usize,
        column: String,
        reason: String,
    },

    /// A procedure manifest is not valid TOML or has the wrong shape.
    #[error("manifest error: {0}")]
    Manifest(#[from] toml::de::Error),

    /// A direct SQLite call on the `Database` handle failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Reading a manifest file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored or supplied value is out of range for the model.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// Returns `true` when the error was raised before the database was touched.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArguments { .. } | Self::NotFound { .. }
        )
    }

    /// The procedure this error is about, if any.
    pub fn procedure(&self) -> Option<&str> {
        match self {
            Self::InvalidArguments { procedure, .. }
            | Self::NotFound { procedure }
            | Self::AlreadyRegistered { procedure }
            | Self::InvalidSpec { procedure, .. }
            | Self::QueryFailed { procedure, .. }
            | Self::ValidationFailed { procedure, .. } => Some(procedure),
            Self::Manifest(_) | Self::Database(_) | Self::Io(_) | Self::InvalidData(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
