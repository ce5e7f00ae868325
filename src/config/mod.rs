//! Configuration resolution.
//!
//! RepoMind reads its settings from three layered sources, later sources
//! winning field-by-field:
//!
//! 1. built-in defaults (every field has one),
//! 2. a YAML config file (`repomind.config.yaml` by convention),
//! 3. `REPOMIND_*` environment variables.
//!
//! Resolution is a pure function of the file contents and an explicit
//! environment map: [`load_with_env`] takes both, [`load`] is the thin
//! wrapper that snapshots the process environment. Nothing is cached;
//! every call re-reads the file and produces an independent snapshot.

mod model;

pub use model::{
    Config, ConfigOverlay, DatabaseConfig, DatabaseOverlay, EmbeddingsConfig, EmbeddingsOverlay,
    LocalHttpConfig, LocalHttpOverlay,
};

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Environment variable prefix for all recognized overrides.
const ENV_PREFIX: &str = "REPOMIND_";

/// Resolve configuration from a file and the process environment.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file is missing, unreadable,
/// malformed, or an environment override cannot be parsed.
pub fn load(path: &Path) -> Result<Config> {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_with_env(path, &env)
}

/// Resolve configuration from a file and an explicit environment map.
///
/// Defaults are overlaid with the parsed file, then with recognized
/// `REPOMIND_*` variables. Environment always beats file, file always
/// beats defaults.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file is missing, unreadable,
/// malformed, or `REPOMIND_DB_PORT` is not a valid integer.
pub fn load_with_env(path: &Path, env: &HashMap<String, String>) -> Result<Config> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(Error::Config(format!(
            "Config path is not a file: {}",
            path.display()
        )));
    }

    let file_overlay = parse_file(path)?;
    let env_overlay = env_overlay(env)?;

    let config = Config::default().merged(&file_overlay).merged(&env_overlay);
    debug!(config = %config, "Resolved configuration");
    Ok(config)
}

/// Parse the config file into a sparse overlay.
///
/// An empty or all-comments file yields an empty overlay (everything
/// stays at default), matching a YAML document that parses to null.
fn parse_file(path: &Path) -> Result<ConfigOverlay> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    let overlay: Option<ConfigOverlay> = serde_yaml::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(overlay.unwrap_or_default())
}

/// Build an overlay from the fixed set of recognized environment names.
///
/// `REPOMIND_EMBEDDINGS_MODEL_PATH` and `REPOMIND_DB_PASSWORD` apply
/// whenever the key is present, even with an empty value; every other
/// override applies only when non-blank (the merge drops blanks).
fn env_overlay(env: &HashMap<String, String>) -> Result<ConfigOverlay> {
    let var = |suffix: &str| env.get(&format!("{ENV_PREFIX}{suffix}")).cloned();

    let port = match var("DB_PORT") {
        Some(value) if !value.trim().is_empty() => {
            Some(value.parse::<u16>().map_err(|_| {
                Error::Config(format!("Invalid REPOMIND_DB_PORT: {value}"))
            })?)
        }
        _ => None,
    };

    Ok(ConfigOverlay {
        embeddings: Some(EmbeddingsOverlay {
            provider: var("EMBEDDINGS_PROVIDER"),
            model: var("EMBEDDINGS_MODEL"),
            model_path: var("EMBEDDINGS_MODEL_PATH"),
            local_http: Some(LocalHttpOverlay {
                url: var("EMBEDDINGS_LOCAL_HTTP_URL"),
            }),
        }),
        db: Some(DatabaseOverlay {
            host: var("DB_HOST"),
            port,
            name: var("DB_NAME"),
            user: var("DB_USER"),
            password: var("DB_PASSWORD"),
        }),
    })
}
