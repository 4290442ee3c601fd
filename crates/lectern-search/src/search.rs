use chrono::Utc;
use rusqlite::OptionalExtension;
use serde::Serialize;

use lectern_core::model::PostId;
use lectern_core::schema::Database;

use crate::embedding::{decode, encode, validate};
use crate::error::{SearchError, SearchResult};
use crate::functions::register_functions;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarPost {
    pub post_id: PostId,
    pub title: String,
    /// Cosine distance to the query; lower is closer.
    pub distance: f64,
}

/// Nearest-neighbour search over post embeddings.
///
/// Ranking happens in SQL via `vec_distance_cosine`; this type only binds
/// the query and decodes hits.
#[derive(Debug)]
pub struct VectorSearch<'a> {
    db: &'a Database,
}

impl<'a> VectorSearch<'a> {
    /// Install the distance function on the database connection.
    pub fn new(db: &'a Database) -> SearchResult<Self> {
        register_functions(db.conn())?;
        Ok(Self { db })
    }

    /// Store or replace a post's embedding.
    pub fn upsert_embedding(&self, post_id: PostId, vector: &[f32]) -> SearchResult<()> {
        validate(vector)?;
        if self.db.get_post(post_id)?.is_none() {
            return Err(SearchError::UnknownPost(post_id));
        }
        let dimension = i64::try_from(vector.len())
            .map_err(|_| SearchError::InvalidVector("vector is too long".to_string()))?;

        self.db.conn().execute(
            "INSERT INTO post_embeddings (post_id, dimension, embedding, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(post_id) DO UPDATE SET
                dimension = excluded.dimension,
                embedding = excluded.embedding,
                updated_at = excluded.updated_at",
            rusqlite::params![
                post_id,
                dimension,
                encode(vector),
                Utc::now().to_rfc3339(),
            ],
        )?;
        log::debug!("Stored {}-dimensional embedding for post {}", vector.len(), post_id);
        Ok(())
    }

    /// Fetch a post's embedding.
    pub fn embedding(&self, post_id: PostId) -> SearchResult<Option<Vec<f32>>> {
        let blob: Option<Vec<u8>> = self
            .db
            .conn()
            .query_row(
                "SELECT embedding FROM post_embeddings WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )
            .optional()?;
        blob.map(|b| decode(&b)).transpose()
    }

    /// The `limit` posts closest to `query`, nearest first.
    ///
    /// Embeddings of a different dimension are skipped. Ties on distance are
    /// ordered by post id.
    pub fn search_similar(&self, query: &[f32], limit: usize) -> SearchResult<Vec<SimilarPost>> {
        validate(query)?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        let dimension = i64::try_from(query.len())
            .map_err(|_| SearchError::InvalidVector("vector is too long".to_string()))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self.db.conn().prepare(
            "SELECT post_id, title, distance FROM (
                SELECT p.id AS post_id,
                       p.title AS title,
                       vec_distance_cosine(e.embedding, ?1) AS distance
                FROM post_embeddings e
                JOIN posts p ON p.id = e.post_id
                WHERE e.dimension = ?2
             )
             WHERE distance IS NOT NULL
             ORDER BY distance ASC, post_id ASC
             LIMIT ?3",
        )?;

        let hits = stmt
            .query_map(rusqlite::params![encode(query), dimension, limit], |row| {
                Ok(SimilarPost {
                    post_id: row.get(0)?,
                    title: row.get(1)?,
                    distance: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(hits)
    }
}
