//! The `BlogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `scribe-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use serde::Serialize;

use crate::{
  admin::Admin,
  post::{NewPost, Post, PostId, PostPatch, PostSummary},
  subscriber::{SubscribeOutcome, Subscriber},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`BlogStore::list_posts`]. All filters are ANDed.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
  /// Exact category match.
  pub category: Option<String>,
  /// The post's tag list must contain this tag.
  pub tag:      Option<String>,
  /// Exact match on the featured flag.
  pub featured: Option<bool>,
  /// Free-text search over title, excerpt and content. Any term may match.
  pub search:   Option<String>,
  /// Page size; `0` means unbounded.
  pub limit:    u64,
  pub skip:     u64,
}

/// One window of a listing, plus the number of matches across all windows.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub posts: Vec<T>,
  pub total: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Scribe storage backend.
///
/// Each method is one atomic round-trip to the store. There are no
/// cross-call transactions; concurrent patches to the same post are
/// last-write-wins.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BlogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Admins ────────────────────────────────────────────────────────────

  /// Retrieve an admin by email. Returns `None` if not found.
  fn get_admin<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + 'a;

  /// Insert `admin` unless a record with the same email exists. Returns
  /// `true` if a row was written.
  fn insert_admin_if_absent(
    &self,
    admin: Admin,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Filtered listing, newest first, as summaries.
  fn list_posts<'a>(
    &'a self,
    query: &'a PostQuery,
  ) -> impl Future<Output = Result<Page<PostSummary>, Self::Error>> + Send + 'a;

  /// Unfiltered listing of full posts, newest first. `limit == 0` is
  /// unbounded.
  fn list_all_posts(
    &self,
    limit: u64,
    skip: u64,
  ) -> impl Future<Output = Result<Page<Post>, Self::Error>> + Send + '_;

  /// Retrieve a post. Returns `None` if not found.
  fn get_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Create and persist a post; `author` is stamped onto the record.
  fn create_post<'a>(
    &'a self,
    input: NewPost,
    author: &'a str,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + 'a;

  /// Merge-patch a post. Returns `None` if the post does not exist.
  fn update_post(
    &self,
    id: PostId,
    patch: PostPatch,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Delete a post. Returns `false` if nothing was removed.
  fn delete_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn count_posts(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Distinct categories across all posts, sorted.
  fn distinct_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Distinct tags across all posts' tag lists, sorted.
  fn distinct_tags(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Subscribers ───────────────────────────────────────────────────────

  /// Add `email` unless it is already subscribed.
  fn subscribe(
    &self,
    email: String,
  ) -> impl Future<Output = Result<SubscribeOutcome, Self::Error>> + Send + '_;

  /// All subscribers, oldest first.
  fn list_subscribers(
    &self,
  ) -> impl Future<Output = Result<Vec<Subscriber>, Self::Error>> + Send + '_;

  fn count_subscribers(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
