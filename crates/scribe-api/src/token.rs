//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the admin email as `sub`. They are
//! self-contained: there is no session table and no revocation list, so a
//! token stays valid until `exp` regardless of what happens to the admin
//! record.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Lifetime of an issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  sub: Option<String>,
  iat: i64,
  exp: i64,
}

/// Signs and checks session tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenService {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl TokenService {
  pub fn new(secret: &[u8]) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    // An expired token fails immediately; no clock-skew grace period.
    validation.leeway = 0;

    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
    }
  }

  /// Issue a token for `subject`, valid for [`TOKEN_TTL_HOURS`] from now.
  pub fn issue(&self, subject: &str) -> Result<String, ApiError> {
    self.issue_at(subject, Utc::now())
  }

  /// Issue a token as if the current time were `issued_at`.
  pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, ApiError> {
    let claims = Claims {
      sub: Some(subject.to_owned()),
      iat: issued_at.timestamp(),
      exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };
    Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
  }

  /// Check signature, structure and expiry, and return the subject.
  ///
  /// Every failure collapses into [`ApiError::Unauthenticated`].
  pub fn verify(&self, token: &str) -> Result<String, ApiError> {
    let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
      tracing::debug!(error = %e, "rejected bearer token");
      ApiError::Unauthenticated
    })?;

    data
      .claims
      .sub
      .filter(|s| !s.is_empty())
      .ok_or(ApiError::Unauthenticated)
  }
}
