//! Server configuration.
//!
//! Values come from an optional TOML file layered under `SCRIBE_*`
//! environment variables, e.g. `SCRIBE_JWT_SECRET` overrides `jwt_secret`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

fn default_host() -> String { "0.0.0.0".to_string() }

const fn default_port() -> u16 { 8001 }

fn default_author() -> String { "Scribe".to_string() }

fn default_cors_origins() -> String { "*".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path:     PathBuf,
  pub jwt_secret:     String,
  pub admin_email:    String,
  pub admin_password: String,
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  /// Byline stamped onto every created post.
  #[serde(default = "default_author")]
  pub author:         String,
  /// Comma-separated origin list, or `*` for any origin.
  #[serde(default = "default_cors_origins")]
  pub cors_origins:   String,
}

impl ServerConfig {
  /// Read `path` (if it exists) and the `SCRIBE_*` environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SCRIBE"))
      .build()?
      .try_deserialize()
  }

  /// `host:port` suitable for binding a listener.
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Explicit origin allow-list, or `None` when any origin is accepted.
  pub fn allowed_origins(&self) -> Option<Vec<String>> {
    let origins: Vec<String> = self
      .cors_origins
      .split(',')
      .map(str::trim)
      .filter(|o| !o.is_empty())
      .map(str::to_string)
      .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
      None
    } else {
      Some(origins)
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  const REQUIRED: &str = r#"
    store_path     = "/tmp/scribe.db"
    jwt_secret     = "s3cret"
    admin_email    = "admin@example.com"
    admin_password = "hunter2"
  "#;

  #[test]
  fn defaults_fill_optional_keys() {
    let cfg = parse(REQUIRED).unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 8001);
    assert_eq!(cfg.author, "Scribe");
    assert_eq!(cfg.address(), "0.0.0.0:8001");
    assert!(cfg.allowed_origins().is_none());
  }

  #[test]
  fn explicit_values_override_defaults() {
    let toml = format!(
      "{REQUIRED}\nhost = \"127.0.0.1\"\nport = 9000\nauthor = \"Jane\"\n\
       cors_origins = \"https://a.example, https://b.example\"\n"
    );
    let cfg = parse(&toml).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.author, "Jane");
    assert_eq!(
      cfg.allowed_origins(),
      Some(vec!["https://a.example".to_string(), "https://b.example".to_string()])
    );
  }

  #[test]
  fn missing_secret_is_an_error() {
    let toml = r#"
      store_path     = "/tmp/scribe.db"
      admin_email    = "admin@example.com"
      admin_password = "hunter2"
    "#;
    assert!(parse(toml).is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    let expanded = expand_tilde(Path::new("~/blog.db"));
    assert_eq!(expanded, PathBuf::from(home).join("blog.db"));
    assert_eq!(expand_tilde(Path::new("/abs/blog.db")), PathBuf::from("/abs/blog.db"));
  }
}
