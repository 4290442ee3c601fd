use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AuthorId, PostId};

/// A blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: AuthorId,
    pub title: String,

    /// Short teaser shown in listings.
    pub summary: Option<String>,

    pub body: String,

    /// Lifetime view count.
    pub views: u64,

    /// `None` while the post is a draft.
    pub published_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Post {
    #[must_use]
    pub fn new(author_id: AuthorId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: PostId::new(),
            author_id,
            title: title.into(),
            summary: None,
            body: body.into(),
            views: 0,
            published_at: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_views(mut self, views: u64) -> Self {
        self.views = views;
        self
    }

    #[must_use]
    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    #[must_use]
    pub const fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_builder() {
        let author = AuthorId::new();
        let post = Post::new(author, "Hello", "First post")
            .with_views(12)
            .with_summary("hi");

        assert_eq!(post.author_id, author);
        assert_eq!(post.views, 12);
        assert!(!post.is_published());
        assert!(post.published(Utc::now()).is_published());
    }
}
