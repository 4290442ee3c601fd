use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::AuthorId;

/// Someone who writes posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,

    /// Display name; unique across authors.
    pub name: String,

    pub bio: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Author {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AuthorId::new(),
            name: name.into(),
            bio: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_new() {
        let author = Author::new("Ada Lovelace").with_bio("Analyst");
        assert_eq!(author.name, "Ada Lovelace");
        assert_eq!(author.bio.as_deref(), Some("Analyst"));
    }
}
