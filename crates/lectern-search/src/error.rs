use lectern_core::model::PostId;
use thiserror::Error;

/// Errors raised by vector search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A vector was empty, non-finite, or otherwise unusable.
    #[error("invalid vector: {0}")]
    InvalidVector(String),

    #[error("database error: {0}")]
    Database(#[from] lectern_core::Error),

    /// An embedding was offered for a post that does not exist.
    #[error("no post with id {0}")]
    UnknownPost(PostId),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored value could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Convenience alias for search results.
pub type SearchResult<T> = std::result::Result<T, SearchError>;
