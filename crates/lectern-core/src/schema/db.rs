use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Author, AuthorId, Post, PostId};

use super::migrations::{BUILTIN_PROCEDURES, MIGRATIONS};

/// A database connection with the bootstrap schema applied.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Foreign keys are per-connection in SQLite
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self { conn };
        db.apply_migrations()?;
        db.deploy_builtin_procedures()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }

    fn deploy_builtin_procedures(&self) -> Result<()> {
        for procedure in BUILTIN_PROCEDURES {
            self.deploy_procedure(procedure.name, procedure.arity, procedure.body)?;
        }
        Ok(())
    }
}

// Author CRUD
impl Database {
    /// Insert a new author.
    pub fn insert_author(&self, author: &Author) -> Result<()> {
        self.conn.execute(
            "INSERT INTO authors (id, name, bio, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                author.id,
                author.name,
                author.bio,
                author.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Find an author by exact name.
    pub fn find_author_by_name(&self, name: &str) -> Result<Option<Author>> {
        let author = self
            .conn
            .query_row(
                "SELECT id, name, bio, created_at FROM authors WHERE name = ?1",
                [name],
                row_to_author,
            )
            .optional()?;
        Ok(author)
    }

    /// List all authors by name.
    pub fn list_authors(&self) -> Result<Vec<Author>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, bio, created_at FROM authors ORDER BY name")?;
        let authors = stmt
            .query_map([], row_to_author)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(authors)
    }
}

// Post CRUD
impl Database {
    /// Insert a new post.
    pub fn insert_post(&self, post: &Post) -> Result<()> {
        let views = i64::try_from(post.views)
            .map_err(|_| Error::InvalidData(format!("view count {} is too large", post.views)))?;
        self.conn.execute(
            "INSERT INTO posts (
                id, author_id, title, summary, body, views, published_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                post.id,
                post.author_id,
                post.title,
                post.summary,
                post.body,
                views,
                post.published_at.map(|ts| ts.to_rfc3339()),
                post.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a post by id.
    pub fn get_post(&self, id: PostId) -> Result<Option<Post>> {
        let post = self
            .conn
            .query_row(
                "SELECT id, author_id, title, summary, body, views, published_at, created_at
                 FROM posts WHERE id = ?1",
                [id],
                row_to_post,
            )
            .optional()?;
        Ok(post)
    }

    /// List an author's posts, most viewed first.
    pub fn list_posts_by_author(&self, author_id: AuthorId) -> Result<Vec<Post>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, author_id, title, summary, body, views, published_at, created_at
             FROM posts
             WHERE author_id = ?1
             ORDER BY views DESC, id",
        )?;
        let posts = stmt
            .query_map([author_id], row_to_post)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(posts)
    }

    /// Count all posts.
    pub fn count_posts(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| Error::InvalidData(format!("negative post count {count}")))
    }
}

fn row_to_author(row: &rusqlite::Row<'_>) -> rusqlite::Result<Author> {
    let created_at: String = row.get(3)?;
    Ok(Author {
        id: row.get(0)?,
        name: row.get(1)?,
        bio: row.get(2)?,
        created_at: parse_timestamp(3, &created_at)?,
    })
}

fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    let views: i64 = row.get(5)?;
    let published_at: Option<String> = row.get(6)?;
    let created_at: String = row.get(7)?;
    Ok(Post {
        id: row.get(0)?,
        author_id: row.get(1)?,
        title: row.get(2)?,
        summary: row.get(3)?,
        body: row.get(4)?,
        views: u64::try_from(views).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(5, views))?,
        published_at: published_at
            .map(|s| parse_timestamp(6, &s))
            .transpose()?,
        created_at: parse_timestamp(7, &created_at)?,
    })
}

fn parse_timestamp(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}
