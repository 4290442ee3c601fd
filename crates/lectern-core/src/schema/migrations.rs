/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Authors
CREATE TABLE IF NOT EXISTS authors (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    bio TEXT,
    created_at TEXT NOT NULL
);

-- Posts
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    author_id TEXT NOT NULL REFERENCES authors(id),
    title TEXT NOT NULL,
    summary TEXT,
    body TEXT NOT NULL,
    views INTEGER NOT NULL DEFAULT 0 CHECK (views >= 0),
    published_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_author_id ON posts(author_id);
CREATE INDEX IF NOT EXISTS idx_posts_views ON posts(views);

-- Named procedure bodies, called by name with positional parameters
CREATE TABLE IF NOT EXISTS stored_procedures (
    name TEXT PRIMARY KEY,
    arity INTEGER NOT NULL CHECK (arity >= 0),
    body TEXT NOT NULL,
    deployed_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const MIGRATION_002: &str = r#"
-- Post embeddings (little-endian f32 vectors)
CREATE TABLE IF NOT EXISTS post_embeddings (
    post_id TEXT PRIMARY KEY REFERENCES posts(id) ON DELETE CASCADE,
    dimension INTEGER NOT NULL CHECK (dimension > 0),
    embedding BLOB NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_post_embeddings_dimension ON post_embeddings(dimension);
"#;

/// All migrations in order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: MIGRATION_001,
    },
    Migration {
        version: 2,
        name: "post_embeddings",
        sql: MIGRATION_002,
    },
];

/// A procedure body installed on every open.
#[derive(Debug)]
pub struct BuiltinProcedure {
    pub name: &'static str,
    pub arity: u32,
    pub body: &'static str,
}

const AUTHOR_POST_STATS: &str = "
SELECT a.name AS author_name,
       COUNT(p.id) AS total_posts,
       COALESCE(SUM(p.views), 0) AS total_views,
       printf('%.2f', COALESCE(AVG(p.views), 0)) AS avg_views_per_post,
       MAX(p.published_at) AS last_published_at
FROM authors a
LEFT JOIN posts p ON p.author_id = a.id
GROUP BY a.id, a.name
ORDER BY total_views DESC, author_name ASC
";

// Ties on views go to the earliest published post, unpublished last, then id.
const MOST_POPULAR_POST: &str = "
SELECT p.title AS title,
       a.name AS author_name,
       p.views AS views,
       p.summary AS summary,
       p.published_at AS published_at
FROM posts p
JOIN authors a ON a.id = p.author_id
WHERE a.name = ?1
ORDER BY p.views DESC,
         p.published_at IS NULL ASC,
         p.published_at ASC,
         p.id ASC
LIMIT 1
";

/// Procedures the demo catalog relies on.
pub const BUILTIN_PROCEDURES: &[BuiltinProcedure] = &[
    BuiltinProcedure {
        name: "author_post_stats",
        arity: 0,
        body: AUTHOR_POST_STATS,
    },
    BuiltinProcedure {
        name: "most_popular_post",
        arity: 1,
        body: MOST_POPULAR_POST,
    },
];
