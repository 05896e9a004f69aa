//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Messages for the auth and lookup variants are generic: a
/// client cannot tell an unknown email from a wrong password, an expired
/// token from a forged one, or a malformed post id from a missing one.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Invalid credentials")]
  InvalidCredentials,

  #[error("Invalid token")]
  Unauthenticated,

  #[error("Post not found")]
  NotFound,

  #[error("{0}")]
  Validation(String),

  #[error("token error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),

  #[error("password hash error: {0}")]
  PasswordHash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::InvalidCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
      ApiError::NotFound => StatusCode::NOT_FOUND,
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Token(_) | ApiError::PasswordHash(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        return (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "Internal server error" })),
        )
          .into_response();
      }
    };

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if matches!(self, ApiError::Unauthenticated) {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}
