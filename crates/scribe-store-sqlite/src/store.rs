//! [`SqliteStore`] — the SQLite implementation of [`BlogStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, Transaction, types::Value};

use scribe_core::{
  admin::Admin,
  post::{NewPost, Post, PostId, PostPatch, PostSummary},
  store::{BlogStore, Page, PostQuery},
  subscriber::{SubscribeOutcome, Subscriber},
};

use crate::{
  Result,
  encode::{
    POST_COLUMNS, RawAdmin, RawPost, RawSubscriber, RawSummary, SUMMARY_COLUMNS, decode_count,
    encode_dt, encode_list, encode_post_id, fts_match_expression, limit_param, offset_param,
  },
  schema::{DROP_UNSTEMMED_FTS, REBUILD_FTS, SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Scribe store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        let stale_fts = version > 0 && version < SCHEMA_VERSION;

        if stale_fts {
          conn.execute_batch(DROP_UNSTEMMED_FTS)?;
        }
        conn.execute_batch(SCHEMA)?;
        if stale_fts {
          conn.execute_batch(REBUILD_FTS)?;
          tracing::info!(from = version, to = SCHEMA_VERSION, "rebuilt full-text index");
        }
        Ok(())
      })
      .await?;
    tracing::debug!("schema initialised");
    Ok(())
  }
}

/// Current time at the precision timestamps are stored with, so a returned
/// post compares equal to the same post read back.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Write helpers ───────────────────────────────────────────────────────────

/// A [`Post`] flattened into column values.
struct EncodedPost {
  post_id:        String,
  title:          String,
  excerpt:        String,
  content:        String,
  category:       String,
  tags:           Vec<String>,
  tags_json:      String,
  featured_image: Option<String>,
  sources_json:   String,
  is_featured:    bool,
  author:         String,
  reading_time:   u32,
  created_at:     String,
  updated_at:     String,
}

impl EncodedPost {
  fn encode(post: &Post) -> Result<Self> {
    Ok(Self {
      post_id:        encode_post_id(post.id),
      title:          post.title.clone(),
      excerpt:        post.excerpt.clone(),
      content:        post.content.clone(),
      category:       post.category.clone(),
      tags:           post.tags.clone(),
      tags_json:      encode_list(&post.tags)?,
      featured_image: post.featured_image.clone(),
      sources_json:   encode_list(&post.sources)?,
      is_featured:    post.is_featured,
      author:         post.author.clone(),
      reading_time:   post.reading_time,
      created_at:     encode_dt(post.created_at),
      updated_at:     encode_dt(post.updated_at),
    })
  }

  /// Upsert the row and rebuild its tag and full-text index entries.
  ///
  /// `ON CONFLICT DO UPDATE` keeps the original rowid, which listing uses to
  /// break `created_at` ties.
  fn save(&self, tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute(
      "INSERT INTO posts (
         post_id, title, excerpt, content, category, tags, featured_image,
         sources, is_featured, author, reading_time, created_at, updated_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
       ON CONFLICT(post_id) DO UPDATE SET
         title          = excluded.title,
         excerpt        = excluded.excerpt,
         content        = excluded.content,
         category       = excluded.category,
         tags           = excluded.tags,
         featured_image = excluded.featured_image,
         sources        = excluded.sources,
         is_featured    = excluded.is_featured,
         reading_time   = excluded.reading_time,
         updated_at     = excluded.updated_at",
      rusqlite::params![
        self.post_id,
        self.title,
        self.excerpt,
        self.content,
        self.category,
        self.tags_json,
        self.featured_image,
        self.sources_json,
        self.is_featured,
        self.author,
        self.reading_time,
        self.created_at,
        self.updated_at,
      ],
    )?;

    tx.execute("DELETE FROM post_tags WHERE post_id = ?1", [&self.post_id])?;
    {
      let mut stmt =
        tx.prepare("INSERT OR IGNORE INTO post_tags (post_id, tag) VALUES (?1, ?2)")?;
      for tag in &self.tags {
        stmt.execute(rusqlite::params![self.post_id, tag])?;
      }
    }

    tx.execute("DELETE FROM posts_fts WHERE post_id = ?1", [&self.post_id])?;
    tx.execute(
      "INSERT INTO posts_fts (post_id, title, excerpt, content) VALUES (?1, ?2, ?3, ?4)",
      rusqlite::params![self.post_id, self.title, self.excerpt, self.content],
    )?;
    Ok(())
  }
}

fn load_post(tx: &Transaction<'_>, id: &str) -> rusqlite::Result<Option<RawPost>> {
  tx.query_row(
    &format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.post_id = ?1"),
    [id],
    RawPost::from_row,
  )
  .optional()
}

/// Translate a [`PostQuery`] into a `WHERE` clause and its positional values.
fn where_clause(query: &PostQuery) -> (String, Vec<Value>) {
  let mut conds: Vec<&'static str> = vec![];
  let mut values: Vec<Value> = vec![];

  if let Some(category) = &query.category {
    conds.push("p.category = ?");
    values.push(Value::Text(category.clone()));
  }
  if let Some(tag) = &query.tag {
    conds.push("EXISTS (SELECT 1 FROM post_tags t WHERE t.post_id = p.post_id AND t.tag = ?)");
    values.push(Value::Text(tag.clone()));
  }
  if let Some(featured) = query.featured {
    conds.push("p.is_featured = ?");
    values.push(Value::Integer(i64::from(featured)));
  }
  if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
    match fts_match_expression(search) {
      Some(expr) => {
        conds.push("p.post_id IN (SELECT post_id FROM posts_fts WHERE posts_fts MATCH ?)");
        values.push(Value::Text(expr));
      }
      // Only punctuation: nothing can match.
      None => conds.push("0"),
    }
  }

  let clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (clause, values)
}

// ─── BlogStore impl ──────────────────────────────────────────────────────────

impl BlogStore for SqliteStore {
  type Error = crate::Error;

  // ── Admins ────────────────────────────────────────────────────────────────

  async fn get_admin(&self, email: &str) -> Result<Option<Admin>> {
    let email = email.to_owned();

    let raw: Option<RawAdmin> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT email, password_hash, created_at FROM admins WHERE email = ?1",
            [email],
            |row| {
              Ok(RawAdmin {
                email:         row.get(0)?,
                password_hash: row.get(1)?,
                created_at:    row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAdmin::into_admin).transpose()
  }

  async fn insert_admin_if_absent(&self, admin: Admin) -> Result<bool> {
    let at_str = encode_dt(admin.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO admins (email, password_hash, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![admin.email, admin.password_hash, at_str],
        )?;
        Ok(n == 1)
      })
      .await?;

    Ok(inserted)
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn list_posts(&self, query: &PostQuery) -> Result<Page<PostSummary>> {
    let (clause, values) = where_clause(query);
    let limit_val        = limit_param(query.limit);
    let offset_val       = offset_param(query.skip);

    let (total, raws): (i64, Vec<RawSummary>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM posts p {clause}"),
          rusqlite::params_from_iter(values.iter()),
          |r| r.get(0),
        )?;

        let mut page_values = values;
        page_values.push(Value::Integer(limit_val));
        page_values.push(Value::Integer(offset_val));

        let mut stmt = conn.prepare(&format!(
          "SELECT {SUMMARY_COLUMNS} FROM posts p {clause}
           ORDER BY p.created_at DESC, p.rowid DESC
           LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(page_values.iter()), RawSummary::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    Ok(Page {
      posts: raws.into_iter().map(RawSummary::into_summary).collect::<Result<_>>()?,
      total: decode_count(total)?,
    })
  }

  async fn list_all_posts(&self, limit: u64, skip: u64) -> Result<Page<Post>> {
    let limit_val  = limit_param(limit);
    let offset_val = offset_param(skip);

    let (total, raws): (i64, Vec<RawPost>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |r| r.get(0))?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS} FROM posts p
           ORDER BY p.created_at DESC, p.rowid DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    Ok(Page {
      posts: raws.into_iter().map(RawPost::into_post).collect::<Result<_>>()?,
      total: decode_count(total)?,
    })
  }

  async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
    let id_str = encode_post_id(id);

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.post_id = ?1"),
            [id_str],
            RawPost::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn create_post(&self, input: NewPost, author: &str) -> Result<Post> {
    let post    = Post::create(input, author, now());
    let encoded = EncodedPost::encode(&post)?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        encoded.save(&tx)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(post_id = %post.id, "created post");
    Ok(post)
  }

  async fn update_post(&self, id: PostId, patch: PostPatch) -> Result<Option<Post>> {
    let id_str = encode_post_id(id);

    // Read, patch and write back under one transaction.
    let updated: Option<Post> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(raw) = load_post(&tx, &id_str)? else {
          return Ok(None);
        };

        let mut post = raw.into_post()?;
        post.apply(patch, now());
        EncodedPost::encode(&post)?.save(&tx)?;

        tx.commit()?;
        Ok(Some(post))
      })
      .await?;

    Ok(updated)
  }

  async fn delete_post(&self, id: PostId) -> Result<bool> {
    let id_str = encode_post_id(id);

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM post_tags WHERE post_id = ?1", [&id_str])?;
        tx.execute("DELETE FROM posts_fts WHERE post_id = ?1", [&id_str])?;
        let n = tx.execute("DELETE FROM posts WHERE post_id = ?1", [&id_str])?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;

    Ok(removed)
  }

  async fn count_posts(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM posts", [], |r| r.get(0))?))
      .await?;
    decode_count(n)
  }

  async fn distinct_categories(&self) -> Result<Vec<String>> {
    let categories = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT DISTINCT category FROM posts ORDER BY category")?;
        let rows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(categories)
  }

  async fn distinct_tags(&self) -> Result<Vec<String>> {
    let tags = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT DISTINCT tag FROM post_tags ORDER BY tag")?;
        let rows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(tags)
  }

  // ── Subscribers ───────────────────────────────────────────────────────────

  async fn subscribe(&self, email: String) -> Result<SubscribeOutcome> {
    let at_str = encode_dt(now());

    let outcome = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row("SELECT 1 FROM subscribers WHERE email = ?1", [&email], |_| Ok(()))
          .optional()?
          .is_some();

        if exists {
          return Ok(SubscribeOutcome::AlreadySubscribed);
        }

        conn.execute(
          "INSERT INTO subscribers (email, subscribed_at) VALUES (?1, ?2)",
          rusqlite::params![email, at_str],
        )?;
        Ok(SubscribeOutcome::Subscribed)
      })
      .await?;

    Ok(outcome)
  }

  async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
    let raws: Vec<RawSubscriber> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT email, subscribed_at FROM subscribers ORDER BY subscribed_at, rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSubscriber {
              email:         row.get(0)?,
              subscribed_at: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscriber::into_subscriber).collect()
  }

  async fn count_subscribers(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM subscribers", [], |r| r.get(0))?))
      .await?;
    decode_count(n)
  }
}
