//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order equals chronological order. Lists are stored as
//! compact JSON. Post ids are stored as hyphenated lowercase UUIDs.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use scribe_core::{
  admin::Admin,
  post::{Post, PostId, PostSummary},
  subscriber::Subscriber,
};

use crate::{Error, Result};

// ─── PostId ──────────────────────────────────────────────────────────────────

pub fn encode_post_id(id: PostId) -> String { id.to_string() }

pub fn decode_post_id(s: &str) -> Result<PostId> { Ok(s.parse()?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Lists ───────────────────────────────────────────────────────────────────

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Query parameters ────────────────────────────────────────────────────────

/// SQLite treats a negative `LIMIT` as "no limit".
pub fn limit_param(limit: u64) -> i64 {
  if limit == 0 { -1 } else { i64::try_from(limit).unwrap_or(i64::MAX) }
}

pub fn offset_param(skip: u64) -> i64 { i64::try_from(skip).unwrap_or(i64::MAX) }

pub fn decode_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::OutOfRange("count"))
}

/// Build an FTS5 `MATCH` expression in which any whitespace-separated term
/// may match. Each term is quoted so user input is never parsed as FTS5
/// syntax; terms without a letter or digit are dropped because the tokenizer
/// would reduce them to nothing. Returns `None` when no usable term remains.
pub fn fts_match_expression(search: &str) -> Option<String> {
  let terms: Vec<String> = search
    .split_whitespace()
    .filter(|t| t.chars().any(char::is_alphanumeric))
    .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
    .collect();

  if terms.is_empty() { None } else { Some(terms.join(" OR ")) }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPost::from_row`].
pub const POST_COLUMNS: &str = "p.post_id, p.title, p.excerpt, p.content, \
  p.category, p.tags, p.featured_image, p.sources, p.is_featured, p.author, \
  p.reading_time, p.created_at, p.updated_at";

/// Column list matching [`RawSummary::from_row`].
pub const SUMMARY_COLUMNS: &str = "p.post_id, p.title, p.excerpt, p.category, \
  p.tags, p.featured_image, p.is_featured, p.reading_time, p.created_at";

/// Raw values read directly from a `posts` row.
pub struct RawPost {
  pub post_id:        String,
  pub title:          String,
  pub excerpt:        String,
  pub content:        String,
  pub category:       String,
  pub tags:           String,
  pub featured_image: Option<String>,
  pub sources:        String,
  pub is_featured:    bool,
  pub author:         String,
  pub reading_time:   i64,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawPost {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:        row.get(0)?,
      title:          row.get(1)?,
      excerpt:        row.get(2)?,
      content:        row.get(3)?,
      category:       row.get(4)?,
      tags:           row.get(5)?,
      featured_image: row.get(6)?,
      sources:        row.get(7)?,
      is_featured:    row.get(8)?,
      author:         row.get(9)?,
      reading_time:   row.get(10)?,
      created_at:     row.get(11)?,
      updated_at:     row.get(12)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:             decode_post_id(&self.post_id)?,
      title:          self.title,
      excerpt:        self.excerpt,
      content:        self.content,
      category:       self.category,
      tags:           decode_list(&self.tags)?,
      featured_image: self.featured_image,
      sources:        decode_list(&self.sources)?,
      is_featured:    self.is_featured,
      author:         self.author,
      reading_time:   u32::try_from(self.reading_time)
        .map_err(|_| Error::OutOfRange("reading_time"))?,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values for the listing projection.
pub struct RawSummary {
  pub post_id:        String,
  pub title:          String,
  pub excerpt:        String,
  pub category:       String,
  pub tags:           String,
  pub featured_image: Option<String>,
  pub is_featured:    bool,
  pub reading_time:   i64,
  pub created_at:     String,
}

impl RawSummary {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:        row.get(0)?,
      title:          row.get(1)?,
      excerpt:        row.get(2)?,
      category:       row.get(3)?,
      tags:           row.get(4)?,
      featured_image: row.get(5)?,
      is_featured:    row.get(6)?,
      reading_time:   row.get(7)?,
      created_at:     row.get(8)?,
    })
  }

  pub fn into_summary(self) -> Result<PostSummary> {
    Ok(PostSummary {
      id:             decode_post_id(&self.post_id)?,
      title:          self.title,
      excerpt:        self.excerpt,
      category:       self.category,
      tags:           decode_list(&self.tags)?,
      featured_image: self.featured_image,
      is_featured:    self.is_featured,
      reading_time:   u32::try_from(self.reading_time)
        .map_err(|_| Error::OutOfRange("reading_time"))?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `admins` row.
pub struct RawAdmin {
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAdmin {
  pub fn into_admin(self) -> Result<Admin> {
    Ok(Admin {
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `subscribers` row.
pub struct RawSubscriber {
  pub email:         String,
  pub subscribed_at: String,
}

impl RawSubscriber {
  pub fn into_subscriber(self) -> Result<Subscriber> {
    Ok(Subscriber {
      email:         self.email,
      subscribed_at: decode_dt(&self.subscribed_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn match_expression_quotes_each_term() {
    assert_eq!(
      fts_match_expression("rust  async").as_deref(),
      Some("\"rust\" OR \"async\"")
    );
    assert_eq!(
      fts_match_expression("say \"hi\"").as_deref(),
      Some("\"say\" OR \"\"\"hi\"\"\"")
    );
    assert_eq!(fts_match_expression("   "), None);
    assert_eq!(fts_match_expression("!!! ..."), None);
  }

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = DateTime::parse_from_rfc3339("2024-01-01T10:00:00.1Z").unwrap().with_timezone(&Utc);
    let b = DateTime::parse_from_rfc3339("2024-01-01T10:00:00.05Z").unwrap().with_timezone(&Utc);
    assert!(encode_dt(b) < encode_dt(a));
    assert_eq!(decode_dt(&encode_dt(a)).unwrap(), a);
  }

  #[test]
  fn zero_limit_is_unbounded() {
    assert_eq!(limit_param(0), -1);
    assert_eq!(limit_param(20), 20);
    assert_eq!(limit_param(u64::MAX), i64::MAX);
  }
}
