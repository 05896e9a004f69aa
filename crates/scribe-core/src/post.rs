//! Post types: the articles served by the blog.
//!
//! A post is created whole, mutated in place by merge-patches and deleted
//! outright. There is no versioning and no soft delete.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::{Error, Result};

/// Average reading speed used to derive [`Post::reading_time`].
pub const WORDS_PER_MINUTE: usize = 200;

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Opaque post identifier.
///
/// Callers outside the repository only ever see the string form; the UUID is
/// a storage detail. Parsing is the single place where a malformed external
/// id is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId(Uuid);

impl PostId {
  /// Generate a fresh identifier.
  pub fn new() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl Default for PostId {
  fn default() -> Self { Self::new() }
}

impl From<Uuid> for PostId {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for PostId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.hyphenated())
  }
}

impl FromStr for PostId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Uuid::parse_str(s)
      .map(Self)
      .map_err(|_| Error::InvalidPostId(s.to_owned()))
  }
}

impl Serialize for PostId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for PostId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Reading time ────────────────────────────────────────────────────────────

/// Number of whitespace-separated words in `content`.
pub fn word_count(content: &str) -> usize { content.split_whitespace().count() }

/// Estimated reading time in whole minutes; never less than one.
pub fn reading_time(content: &str) -> u32 {
  let minutes = (word_count(content) / WORDS_PER_MINUTE).max(1);
  u32::try_from(minutes).unwrap_or(u32::MAX)
}

// ─── Post ────────────────────────────────────────────────────────────────────

/// A stored post, as returned by single-post reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
  pub id:             PostId,
  pub title:          String,
  pub excerpt:        String,
  pub content:        String,
  pub category:       String,
  pub tags:           Vec<String>,
  pub featured_image: Option<String>,
  pub sources:        Vec<String>,
  pub is_featured:    bool,
  pub author:         String,
  pub reading_time:   u32,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

fn default_featured_image() -> Option<String> { Some(String::new()) }

/// Fields supplied when creating a post. Everything else is derived.
///
/// An omitted `featured_image` is stored as an empty string; an explicit
/// `null` stays absent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
  pub title:          String,
  pub excerpt:        String,
  pub content:        String,
  pub category:       String,
  pub tags:           Vec<String>,
  #[serde(default = "default_featured_image")]
  pub featured_image: Option<String>,
  #[serde(default)]
  pub sources:        Vec<String>,
  #[serde(default)]
  pub is_featured:    bool,
}

/// A merge-patch: only the fields that are `Some` are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
  pub title:          Option<String>,
  pub excerpt:        Option<String>,
  pub content:        Option<String>,
  pub category:       Option<String>,
  pub tags:           Option<Vec<String>>,
  pub featured_image: Option<String>,
  pub sources:        Option<Vec<String>>,
  pub is_featured:    Option<bool>,
}

impl Post {
  /// Build a new post from its input fields, stamping id, author, reading
  /// time and both timestamps.
  pub fn create(input: NewPost, author: impl Into<String>, now: DateTime<Utc>) -> Self {
    Self {
      id:             PostId::new(),
      reading_time:   reading_time(&input.content),
      title:          input.title,
      excerpt:        input.excerpt,
      content:        input.content,
      category:       input.category,
      tags:           input.tags,
      featured_image: input.featured_image,
      sources:        input.sources,
      is_featured:    input.is_featured,
      author:         author.into(),
      created_at:     now,
      updated_at:     now,
    }
  }

  /// Apply a merge-patch in place. `updated_at` is always refreshed, and the
  /// reading time follows the content whenever the content is replaced.
  pub fn apply(&mut self, patch: PostPatch, now: DateTime<Utc>) {
    if let Some(title) = patch.title {
      self.title = title;
    }
    if let Some(excerpt) = patch.excerpt {
      self.excerpt = excerpt;
    }
    if let Some(content) = patch.content {
      self.reading_time = reading_time(&content);
      self.content = content;
    }
    if let Some(category) = patch.category {
      self.category = category;
    }
    if let Some(tags) = patch.tags {
      self.tags = tags;
    }
    if let Some(image) = patch.featured_image {
      self.featured_image = Some(image);
    }
    if let Some(sources) = patch.sources {
      self.sources = sources;
    }
    if let Some(featured) = patch.is_featured {
      self.is_featured = featured;
    }
    self.updated_at = now;
  }

  pub fn summary(&self) -> PostSummary {
    PostSummary {
      id:             self.id,
      title:          self.title.clone(),
      excerpt:        self.excerpt.clone(),
      category:       self.category.clone(),
      tags:           self.tags.clone(),
      featured_image: self.featured_image.clone(),
      is_featured:    self.is_featured,
      reading_time:   self.reading_time,
      created_at:     self.created_at,
    }
  }
}

/// The listing projection of a post: everything but the body and its
/// bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
  pub id:             PostId,
  pub title:          String,
  pub excerpt:        String,
  pub category:       String,
  pub tags:           Vec<String>,
  pub featured_image: Option<String>,
  pub is_featured:    bool,
  pub reading_time:   u32,
  pub created_at:     DateTime<Utc>,
}
