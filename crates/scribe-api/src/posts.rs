//! Handlers for post endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/posts` | `?category`, `tag`, `search`, `featured`, `limit` (20), `skip` (0) |
//! | `GET`    | `/posts/{id}` | 404 for unknown or malformed ids |
//! | `GET`    | `/categories` | Distinct categories |
//! | `GET`    | `/tags` | Distinct tags |
//! | `GET`    | `/admin/posts` | Full posts; `limit` (100), `skip` (0) |
//! | `POST`   | `/admin/posts` | Body: [`NewPost`]; returns the stored post |
//! | `PUT`    | `/admin/posts/{id}` | Body: [`PostPatch`] (merge-patch) |
//! | `DELETE` | `/admin/posts/{id}` | |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use scribe_core::{
  post::{NewPost, Post, PostId, PostPatch, PostSummary},
  store::{BlogStore, Page, PostQuery},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AppState, auth::AdminSession, error::ApiError};

/// Map the external string id onto a [`PostId`]. A malformed id is
/// indistinguishable from a missing one.
fn parse_id(raw: &str) -> Result<PostId, ApiError> {
  raw.parse().map_err(|_| ApiError::NotFound)
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

// ─── Public listing ───────────────────────────────────────────────────────────

const fn default_public_limit() -> u64 { 20 }

const fn default_admin_limit() -> u64 { 100 }

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub category: Option<String>,
  pub tag:      Option<String>,
  pub search:   Option<String>,
  pub featured: Option<bool>,
  /// Page size; `0` returns every match.
  #[serde(default = "default_public_limit")]
  pub limit:    u64,
  #[serde(default)]
  pub skip:     u64,
}

/// `GET /posts[?category=..][&tag=..][&search=..][&featured=..][&limit=..][&skip=..]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<PostSummary>>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let query = PostQuery {
    category: non_empty(params.category),
    tag:      non_empty(params.tag),
    search:   non_empty(params.search),
    featured: params.featured,
    limit:    params.limit,
    skip:     params.skip,
  };

  let page = state.store.list_posts(&query).await.map_err(ApiError::store)?;
  Ok(Json(page))
}

/// `GET /posts/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Post>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let post = state
    .store
    .get_post(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound)?;
  Ok(Json(post))
}

// ─── Distinct values ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
  pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
  pub tags: Vec<String>,
}

/// `GET /categories`
pub async fn categories<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<CategoriesResponse>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let categories = state.store.distinct_categories().await.map_err(ApiError::store)?;
  Ok(Json(CategoriesResponse { categories }))
}

/// `GET /tags`
pub async fn tags<S>(State(state): State<AppState<S>>) -> Result<Json<TagsResponse>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let tags = state.store.distinct_tags().await.map_err(ApiError::store)?;
  Ok(Json(TagsResponse { tags }))
}

// ─── Admin ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
  #[serde(default = "default_admin_limit")]
  pub limit: u64,
  #[serde(default)]
  pub skip:  u64,
}

/// `GET /admin/posts[?limit=..][&skip=..]`
pub async fn admin_list<S>(
  _session: AdminSession,
  State(state): State<AppState<S>>,
  Query(params): Query<AdminListParams>,
) -> Result<Json<Page<Post>>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let page = state
    .store
    .list_all_posts(params.limit, params.skip)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

/// `POST /admin/posts` — returns the stored post, including derived fields.
pub async fn create<S>(
  session: AdminSession,
  State(state): State<AppState<S>>,
  Json(body): Json<NewPost>,
) -> Result<Json<Post>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let post = state
    .store
    .create_post(body, &state.author)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(post_id = %post.id, admin = %session.email, "post created");
  Ok(Json(post))
}

/// `PUT /admin/posts/{id}` — only the fields present in the body change.
pub async fn update<S>(
  session: AdminSession,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Json(patch): Json<PostPatch>,
) -> Result<Json<Post>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let post = state
    .store
    .update_post(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound)?;

  tracing::info!(post_id = %post.id, admin = %session.email, "post updated");
  Ok(Json(post))
}

/// `DELETE /admin/posts/{id}`
pub async fn delete_one<S>(
  session: AdminSession,
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let id = parse_id(&id)?;
  let removed = state.store.delete_post(id).await.map_err(ApiError::store)?;
  if !removed {
    return Err(ApiError::NotFound);
  }

  tracing::info!(post_id = %id, admin = %session.email, "post deleted");
  Ok(Json(json!({ "message": "Post deleted successfully" })))
}
