//! SQL schema for the Scribe SQLite store.
//!
//! Executed once at connection startup. Every statement is idempotent, so
//! reopening an existing database is safe.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS admins (
    email         TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    post_id        TEXT PRIMARY KEY,
    title          TEXT NOT NULL,
    excerpt        TEXT NOT NULL,
    content        TEXT NOT NULL,
    category       TEXT NOT NULL,
    tags           TEXT NOT NULL DEFAULT '[]',   -- JSON array, in input order
    featured_image TEXT,
    sources        TEXT NOT NULL DEFAULT '[]',   -- JSON array, in input order
    is_featured    INTEGER NOT NULL DEFAULT 0,
    author         TEXT NOT NULL,
    reading_time   INTEGER NOT NULL,
    created_at     TEXT NOT NULL,                -- RFC 3339 UTC, fixed width
    updated_at     TEXT NOT NULL
);

-- One row per distinct tag of a post; the queryable mirror of posts.tags.
CREATE TABLE IF NOT EXISTS post_tags (
    post_id TEXT NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    tag     TEXT NOT NULL,
    PRIMARY KEY (post_id, tag)
);

CREATE VIRTUAL TABLE IF NOT EXISTS posts_fts USING fts5(
    post_id UNINDEXED,
    title,
    excerpt,
    content,
    tokenize = 'porter unicode61'
);

-- No uniqueness constraint: duplicates are prevented by a lookup before insert.
CREATE TABLE IF NOT EXISTS subscribers (
    email         TEXT NOT NULL,
    subscribed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS posts_category_idx    ON posts(category);
CREATE INDEX IF NOT EXISTS posts_featured_idx    ON posts(is_featured);
CREATE INDEX IF NOT EXISTS posts_created_idx     ON posts(created_at);
CREATE INDEX IF NOT EXISTS post_tags_tag_idx     ON post_tags(tag);
CREATE INDEX IF NOT EXISTS subscribers_email_idx ON subscribers(email);

PRAGMA user_version = 2;
";

/// Current value of `PRAGMA user_version` written by [`SCHEMA`].
pub const SCHEMA_VERSION: i64 = 2;

/// Drop the version-1 full-text table, which was built without stemming.
/// Run before [`SCHEMA`] so it recreates the table with the current tokenizer.
pub const DROP_UNSTEMMED_FTS: &str = "DROP TABLE IF EXISTS posts_fts;";

/// Refill `posts_fts` from `posts` after it has been recreated.
pub const REBUILD_FTS: &str = "
DELETE FROM posts_fts;
INSERT INTO posts_fts (post_id, title, excerpt, content)
    SELECT post_id, title, excerpt, content FROM posts;
";
