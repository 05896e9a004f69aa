//! JSON REST API for Scribe.
//!
//! Exposes an axum [`Router`] backed by any [`scribe_core::store::BlogStore`].
//! Routes under `/api/admin` and `/api/auth/verify` require a bearer token
//! issued by `/api/auth/login`. CORS, tracing and TLS are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = scribe_api::router(state).layer(TraceLayer::new_for_http());
//! ```

pub mod auth;
pub mod credentials;
pub mod error;
pub mod newsletter;
pub mod posts;
pub mod stats;
pub mod token;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, post, put},
};
use scribe_core::store::BlogStore;
use serde_json::{Value, json};

pub use error::ApiError;
pub use token::TokenService;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: BlogStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenService>,
  /// Byline stamped onto every created post.
  pub author: Arc<str>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: BlogStore + Clone + 'static,
{
  Router::new()
    .route("/api/health", get(health))
    // Auth
    .route("/api/auth/login", post(auth::login::<S>))
    .route("/api/auth/verify", get(auth::verify))
    // Public posts
    .route("/api/posts", get(posts::list::<S>))
    .route("/api/posts/{id}", get(posts::get_one::<S>))
    .route("/api/categories", get(posts::categories::<S>))
    .route("/api/tags", get(posts::tags::<S>))
    // Admin posts
    .route(
      "/api/admin/posts",
      get(posts::admin_list::<S>).post(posts::create::<S>),
    )
    .route(
      "/api/admin/posts/{id}",
      put(posts::update::<S>).delete(posts::delete_one::<S>),
    )
    // Newsletter
    .route("/api/newsletter/subscribe", post(newsletter::subscribe::<S>))
    .route(
      "/api/admin/newsletter/subscribers",
      get(newsletter::subscribers::<S>),
    )
    .route("/api/admin/stats", get(stats::handler::<S>))
    .with_state(state)
}

/// `GET /api/health`
async fn health() -> Json<Value> {
  Json(json!({ "status": "healthy", "service": "Scribe API" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────
