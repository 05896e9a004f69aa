//! Handlers for the newsletter endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/newsletter/subscribe` | Body: `{"email":"..."}`; repeat subscriptions succeed |
//! | `GET`  | `/admin/newsletter/subscribers` | Every subscriber plus a count |

use axum::{Json, extract::State};
use scribe_core::{
  store::BlogStore,
  subscriber::{Subscriber, normalize_email, validate_email},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::AdminSession, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
  pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
  pub message:    &'static str,
  pub subscribed: bool,
}

/// `POST /newsletter/subscribe`
pub async fn subscribe<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SubscribeBody>,
) -> Result<Json<SubscribeResponse>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let email = normalize_email(&body.email);
  validate_email(&email).map_err(|e| ApiError::Validation(e.to_string()))?;

  let outcome = state.store.subscribe(email).await.map_err(ApiError::store)?;
  tracing::debug!(?outcome, "newsletter subscription");

  Ok(Json(SubscribeResponse {
    message:    outcome.message(),
    subscribed: true,
  }))
}

#[derive(Debug, Serialize)]
pub struct SubscribersResponse {
  pub subscribers: Vec<Subscriber>,
  pub total:       usize,
}

/// `GET /admin/newsletter/subscribers`
pub async fn subscribers<S>(
  _session: AdminSession,
  State(state): State<AppState<S>>,
) -> Result<Json<SubscribersResponse>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let subscribers = state.store.list_subscribers().await.map_err(ApiError::store)?;
  Ok(Json(SubscribersResponse {
    total: subscribers.len(),
    subscribers,
  }))
}
