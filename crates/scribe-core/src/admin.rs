//! Admin credential records.
//!
//! Exactly one admin is bootstrapped from configuration at startup. Records
//! are never updated or deleted through the API.

use chrono::{DateTime, Utc};

/// A persisted admin. Intentionally not `Serialize`: the hash never leaves
/// the server.
#[derive(Debug, Clone)]
pub struct Admin {
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}
