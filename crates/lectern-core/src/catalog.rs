//! The analytics procedures the demo ships with, and typed wrappers for them.
//!
//! Each wrapper is a thin call to [`ProcedureInvoker::invoke_as`] with the
//! procedure's fixed parameter list.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::executor::ProcedureConnection;
use crate::invoker::ProcedureInvoker;
use crate::procedure::{ProcedureRegistry, ProcedureSpec, SemanticType};
use crate::validate::{ColumnError, FromValidatedRow, ValidatedRow};
use crate::value::Value;

pub const AUTHOR_POST_STATS: &str = "author_post_stats";
pub const MOST_POPULAR_POST: &str = "most_popular_post";

/// Per-author totals.
pub fn author_post_stats_spec() -> Result<ProcedureSpec> {
    ProcedureSpec::builder(AUTHOR_POST_STATS)
        .column("author_name", SemanticType::Text)
        .column("total_posts", SemanticType::WideInteger)
        .column("total_views", SemanticType::WideInteger)
        .column("avg_views_per_post", SemanticType::ArbitraryPrecisionNumber)
        .column("last_published_at", SemanticType::OptionalTimestamp)
        .build()
}

/// An author's most viewed post.
pub fn most_popular_post_spec() -> Result<ProcedureSpec> {
    ProcedureSpec::builder(MOST_POPULAR_POST)
        .param("author_name")
        .column("title", SemanticType::Text)
        .column("author_name", SemanticType::Text)
        .column("views", SemanticType::WideInteger)
        .column("summary", SemanticType::OptionalText)
        .column("published_at", SemanticType::OptionalTimestamp)
        .build()
}

/// A registry holding every catalog procedure.
pub fn registry() -> Result<ProcedureRegistry> {
    let mut registry = ProcedureRegistry::new();
    registry.register(author_post_stats_spec()?)?;
    registry.register(most_popular_post_spec()?)?;
    Ok(registry)
}

/// One row of [`author_post_stats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorPostStats {
    pub author_name: String,
    pub total_posts: i64,
    pub total_views: i64,
    /// Lossy; the database computes it exactly.
    pub avg_views_per_post: f64,
    pub last_published_at: Option<DateTime<Utc>>,
}

impl FromValidatedRow for AuthorPostStats {
    fn from_row(row: &ValidatedRow) -> std::result::Result<Self, ColumnError> {
        Ok(Self {
            author_name: row.text("author_name")?.to_string(),
            total_posts: row.integer("total_posts")?,
            total_views: row.integer("total_views")?,
            avg_views_per_post: row.number("avg_views_per_post")?,
            last_published_at: row.optional_timestamp("last_published_at")?,
        })
    }
}

/// The row of [`most_popular_post`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularPost {
    pub title: String,
    pub author_name: String,
    pub views: i64,
    pub summary: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl FromValidatedRow for PopularPost {
    fn from_row(row: &ValidatedRow) -> std::result::Result<Self, ColumnError> {
        Ok(Self {
            title: row.text("title")?.to_string(),
            author_name: row.text("author_name")?.to_string(),
            views: row.integer("views")?,
            summary: row.optional_text("summary")?.map(str::to_string),
            published_at: row.optional_timestamp("published_at")?,
        })
    }
}

/// Totals for every author, most viewed first.
pub fn author_post_stats<C: ProcedureConnection>(
    invoker: &ProcedureInvoker<C>,
) -> Result<Vec<AuthorPostStats>> {
    invoker.invoke_as(AUTHOR_POST_STATS, &[])
}

/// The author's most viewed post, if they have any.
///
/// Ties on views go to the earliest published post.
pub fn most_popular_post<C: ProcedureConnection>(
    invoker: &ProcedureInvoker<C>,
    author_name: &str,
) -> Result<Option<PopularPost>> {
    let mut posts: Vec<PopularPost> =
        invoker.invoke_as(MOST_POPULAR_POST, &[Value::from(author_name)])?;
    Ok(if posts.is_empty() {
        None
    } else {
        Some(posts.swap_remove(0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConnectionError, Error};
    use crate::value::{DecimalText, RawRow};

    #[derive(Debug)]
    struct Canned(Vec<RawRow>);

    impl ProcedureConnection for Canned {
        fn call_procedure(
            &self,
            _name: &str,
            _params: &[Value],
        ) -> std::result::Result<Vec<RawRow>, ConnectionError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_registry_contains_catalog() {
        let registry = registry().unwrap();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec![AUTHOR_POST_STATS, MOST_POPULAR_POST]
        );
        assert_eq!(registry.lookup(MOST_POPULAR_POST).unwrap().arity(), 1);
    }

    #[test]
    fn test_author_post_stats_typed() {
        let invoker = ProcedureInvoker::new(
            registry().unwrap(),
            Canned(vec![RawRow::new()
                .with("author_name", "Ada")
                .with("total_posts", Value::WideInteger(2))
                .with("total_views", 3100_i64)
                .with("avg_views_per_post", DecimalText::new("1550.00"))
                .with("last_published_at", Value::Null)]),
        );

        let stats = author_post_stats(&invoker).unwrap();
        assert_eq!(
            stats,
            vec![AuthorPostStats {
                author_name: "Ada".to_string(),
                total_posts: 2,
                total_views: 3100,
                avg_views_per_post: 1550.0,
                last_published_at: None,
            }]
        );
    }

    #[test]
    fn test_most_popular_post_none_when_empty() {
        let invoker = ProcedureInvoker::new(registry().unwrap(), Canned(Vec::new()));
        assert_eq!(most_popular_post(&invoker, "Nobody").unwrap(), None);
    }

    #[test]
    fn test_most_popular_post_drift_is_reported() {
        // Database returns views as a float: registry and database disagree
        let invoker = ProcedureInvoker::new(
            registry().unwrap(),
            Canned(vec![RawRow::new()
                .with("title", "t")
                .with("author_name", "a")
                .with("views", 1.5)]),
        );
        let err = most_popular_post(&invoker, "a").unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { ref column, .. } if column == "views"));
    }
}
