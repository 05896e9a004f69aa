//! Admin credential bootstrap and verification.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::Utc;
use rand_core::OsRng;
use scribe_core::{admin::Admin, store::BlogStore};

use crate::error::ApiError;

/// Produce an argon2id PHC string for `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::PasswordHash(e.to_string()))
}

/// Ensure an admin record exists for `email`. Existing records are left
/// untouched, so a changed password in configuration has no effect once the
/// account exists.
///
/// Returns `true` if a record was created.
pub async fn bootstrap_admin<S: BlogStore>(
  store: &S,
  email: &str,
  password: &str,
) -> Result<bool, ApiError> {
  if store.get_admin(email).await.map_err(ApiError::store)?.is_some() {
    tracing::debug!(%email, "admin account already present");
    return Ok(false);
  }

  let admin = Admin {
    email:         email.to_owned(),
    password_hash: hash_password(password)?,
    created_at:    Utc::now(),
  };
  let created = store
    .insert_admin_if_absent(admin)
    .await
    .map_err(ApiError::store)?;

  if created {
    tracing::info!(%email, "created bootstrap admin account");
  }
  Ok(created)
}

/// Check `password` against the stored hash for `email` and return the
/// identity to embed in a token.
pub async fn authenticate<S: BlogStore>(
  store: &S,
  email: &str,
  password: &str,
) -> Result<String, ApiError> {
  let admin = store
    .get_admin(email)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::InvalidCredentials)?;

  let parsed_hash =
    PasswordHash::new(&admin.password_hash).map_err(|_| ApiError::InvalidCredentials)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::InvalidCredentials)?;

  Ok(admin.email)
}
