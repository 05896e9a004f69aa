//! Handler for `GET /admin/stats`.
//!
//! Counts are recomputed from the store on every call.

use axum::{Json, extract::State};
use scribe_core::store::BlogStore;
use serde::Serialize;

use crate::{AppState, auth::AdminSession, error::ApiError};

#[derive(Debug, Serialize)]
pub struct Stats {
  pub total_posts:       u64,
  pub total_subscribers: u64,
  pub total_categories:  usize,
}

/// `GET /admin/stats`
pub async fn handler<S>(
  _session: AdminSession,
  State(state): State<AppState<S>>,
) -> Result<Json<Stats>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let total_posts       = state.store.count_posts().await.map_err(ApiError::store)?;
  let total_subscribers = state.store.count_subscribers().await.map_err(ApiError::store)?;
  let categories        = state.store.distinct_categories().await.map_err(ApiError::store)?;

  Ok(Json(Stats {
    total_posts,
    total_subscribers,
    total_categories: categories.len(),
  }))
}
