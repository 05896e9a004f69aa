//! Bearer-token extractor and the `/auth` handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"email","password"}`; returns a bearer token |
//! | `GET`  | `/auth/verify` | Requires a bearer token |

use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, header, request::Parts},
};
use scribe_core::store::BlogStore;
use serde::{Deserialize, Serialize};

use crate::{AppState, credentials, error::ApiError};

// ─── Extractor ────────────────────────────────────────────────────────────────

/// Present in a handler's arguments means the request carried a valid token.
/// Extraction happens before the body is read, so a rejected request never
/// reaches the store.
#[derive(Debug, Clone)]
pub struct AdminSession {
  pub email: String,
}

/// Pull the token out of an `Authorization: Bearer <token>` header. The scheme
/// is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value           = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token           = token.trim();

  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<AppState<S>> for AdminSession
where
  S: BlogStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthenticated)?;
    let email = state.tokens.verify(token)?;
    Ok(AdminSession { email })
  }
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
  pub token_type:   String,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<TokenResponse>, ApiError>
where
  S: BlogStore + Clone + 'static,
{
  let email = match credentials::authenticate(state.store.as_ref(), &body.email, &body.password)
    .await
  {
    Ok(email) => email,
    Err(e) => {
      tracing::warn!(email = %body.email, "admin login rejected");
      return Err(e);
    }
  };

  let access_token = state.tokens.issue(&email)?;
  tracing::info!(%email, "admin logged in");

  Ok(Json(TokenResponse {
    access_token,
    token_type: "bearer".to_string(),
  }))
}

// ─── Verify ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
  pub authenticated: bool,
  pub email:         String,
}

/// `GET /auth/verify`
pub async fn verify(session: AdminSession) -> Json<VerifyResponse> {
  Json(VerifyResponse {
    authenticated: true,
    email:         session.email,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn bearer_scheme_is_case_insensitive() {
    assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
    assert_eq!(bearer_token(&headers("bearer abc.def")), Some("abc.def"));
  }

  #[test]
  fn other_schemes_and_empty_tokens_are_ignored() {
    assert_eq!(bearer_token(&HeaderMap::new()), None);
    assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
    assert_eq!(bearer_token(&headers("Bearer ")), None);
    assert_eq!(bearer_token(&headers("Bearer")), None);
  }
}
