//! Typed configuration sections and overlay merging.
//!
//! A resolved [`Config`] is always fully populated: every field carries a
//! built-in default, so no consumer ever sees an unset value. Sparse
//! sources (the YAML file, the environment) deserialize into overlay
//! structs whose fields are all `Option`, and are folded onto a base with
//! [`Config::merged`] - a pure function that never mutates its inputs.
//!
//! Merge rules, per field class:
//! - plain string fields: replaced only when the overlay value is present
//!   and non-blank (a blank value never erases an existing one);
//! - `embeddings.model_path` and `db.password`: replaced whenever present,
//!   even when empty ("set to empty" is meaningful for both);
//! - `db.port`: replaced whenever present.

use serde::Deserialize;
use std::fmt;

/// Mask used for the database password in all rendered output.
const PASSWORD_MASK: &str = "***";

// ── Resolved snapshot ─────────────────────────────────────────

/// One fully-resolved, immutable configuration snapshot.
///
/// Constructed once per [`load`](crate::config::load) call and owned by
/// the caller; there is no process-wide singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub embeddings: EmbeddingsConfig,
    pub db: DatabaseConfig,
}

/// Embedding provider selection and provider-specific settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingsConfig {
    /// Provider identifier; `"local-http"` selects the HTTP provider.
    pub provider: String,
    /// Model identifier, passed through to the embedding server.
    pub model: String,
    /// Optional path to a local model; empty means unset.
    pub model_path: String,
    pub local_http: LocalHttpConfig,
}

/// Settings for the `local-http` embedding provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHttpConfig {
    /// Base URL of the embedding server.
    pub url: String,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: "local-http".to_string(),
            model: "sentence-transformers/code-bert-tiny-code-search".to_string(),
            model_path: String::new(),
            local_http: LocalHttpConfig::default(),
        }
    }
}

impl Default for LocalHttpConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8088".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "repomind".to_string(),
            user: "repomind".to_string(),
            password: "repomind".to_string(),
        }
    }
}

// ── Overlays ──────────────────────────────────────────────────

/// Sparse configuration fragment parsed from a file or built from the
/// environment. Unknown keys are ignored; absent sections leave the base
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
    pub embeddings: Option<EmbeddingsOverlay>,
    pub db: Option<DatabaseOverlay>,
}

/// Overlay for the `embeddings` section.
///
/// Canonical keys are snake_case; `modelPath` and `localHttp` are accepted
/// as aliases for compatibility with the camelCase file dialect.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingsOverlay {
    pub provider: Option<String>,
    pub model: Option<String>,
    #[serde(alias = "modelPath")]
    pub model_path: Option<String>,
    #[serde(alias = "localHttp")]
    pub local_http: Option<LocalHttpOverlay>,
}

/// Overlay for the `local_http` sub-section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocalHttpOverlay {
    pub url: Option<String>,
}

/// Overlay for the `db` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseOverlay {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

// ── Merge ─────────────────────────────────────────────────────

/// Replace `target` with the overlay value only when present and non-blank.
fn merge_str(target: &mut String, overlay: Option<&String>) {
    if let Some(value) = overlay {
        if !value.trim().is_empty() {
            *target = value.clone();
        }
    }
}

impl Config {
    /// Fold a sparse overlay onto this snapshot, returning a new snapshot.
    ///
    /// Neither input is mutated; resolution applies this twice (file, then
    /// environment) so later sources win field-by-field.
    #[must_use]
    pub fn merged(&self, overlay: &ConfigOverlay) -> Self {
        let mut next = self.clone();
        if let Some(embeddings) = &overlay.embeddings {
            next.embeddings.merge_from(embeddings);
        }
        if let Some(db) = &overlay.db {
            next.db.merge_from(db);
        }
        next
    }
}

impl EmbeddingsConfig {
    fn merge_from(&mut self, overlay: &EmbeddingsOverlay) {
        merge_str(&mut self.provider, overlay.provider.as_ref());
        merge_str(&mut self.model, overlay.model.as_ref());
        // model_path is deliberately clearable: an explicit empty value
        // means "no local model".
        if let Some(path) = &overlay.model_path {
            self.model_path = path.clone();
        }
        if let Some(local_http) = &overlay.local_http {
            merge_str(&mut self.local_http.url, local_http.url.as_ref());
        }
    }
}

impl DatabaseConfig {
    fn merge_from(&mut self, overlay: &DatabaseOverlay) {
        merge_str(&mut self.host, overlay.host.as_ref());
        if let Some(port) = overlay.port {
            self.port = port;
        }
        merge_str(&mut self.name, overlay.name.as_ref());
        merge_str(&mut self.user, overlay.user.as_ref());
        // Secrets apply whenever present, empty included.
        if let Some(password) = &overlay.password {
            self.password = password.clone();
        }
    }
}

// ── Redacted display ──────────────────────────────────────────

impl fmt::Display for Config {
    /// Redacted rendering for diagnostics and logs.
    ///
    /// Every field is shown except the database password, which is always
    /// masked. Never render the raw password anywhere.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config{{{}, {}}}", self.embeddings, self.db)
    }
}

impl fmt::Display for EmbeddingsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "embeddings{{provider={}, model={}, model_path={}, local_http.url={}}}",
            self.provider, self.model, self.model_path, self.local_http.url
        )
    }
}

impl fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "db{{host={}, port={}, name={}, user={}, password={PASSWORD_MASK}}}",
            self.host, self.port, self.name, self.user
        )
    }
}
