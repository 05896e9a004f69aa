//! Newsletter subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
  pub email:         String,
  pub subscribed_at: DateTime<Utc>,
}

/// Result of a subscribe request. Both variants are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
  Subscribed,
  AlreadySubscribed,
}

impl SubscribeOutcome {
  pub fn message(self) -> &'static str {
    match self {
      SubscribeOutcome::Subscribed => "Successfully subscribed",
      SubscribeOutcome::AlreadySubscribed => "Already subscribed",
    }
  }
}

/// Accept anything shaped like `local@domain.tld` with no whitespace.
///
/// This is a shape check only; deliverability is not our concern.
pub fn validate_email(email: &str) -> Result<()> {
  let invalid = || Error::InvalidEmail(email.to_owned());

  if email.chars().any(char::is_whitespace) {
    return Err(invalid());
  }
  let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
  if local.is_empty() || domain.contains('@') {
    return Err(invalid());
  }
  let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
  if host.is_empty() || tld.is_empty() || domain.split('.').any(str::is_empty) {
    return Err(invalid());
  }
  Ok(())
}

/// Trim surrounding whitespace and lowercase the domain, so addresses that
/// differ only in domain case name the same subscriber. The local part is
/// case-sensitive and kept as given.
pub fn normalize_email(email: &str) -> String {
  let email = email.trim();
  match email.rsplit_once('@') {
    Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
    None => email.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_ordinary_addresses() {
    assert!(validate_email("reader@example.com").is_ok());
    assert!(validate_email("first.last+news@mail.example.co.uk").is_ok());
  }

  #[test]
  fn rejects_malformed_addresses() {
    for bad in [
      "",
      "plainaddress",
      "@example.com",
      "reader@",
      "reader@example",
      "reader@.com",
      "reader@example..com",
      "two@@example.com",
      "spaced out@example.com",
    ] {
      assert!(validate_email(bad).is_err(), "accepted {bad:?}");
    }
  }

  #[test]
  fn normalize_lowercases_only_the_domain() {
    assert_eq!(normalize_email("  Reader@Example.COM "), "Reader@example.com");
    assert_eq!(normalize_email("reader@example.com"), "reader@example.com");
    assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
  }
}
