//! Doctor command implementation.
//!
//! Validates the resolved configuration and, when the `local-http`
//! embedding provider is selected, probes the embedding server's health
//! endpoint. A failed probe is a named check failure with a config exit
//! code, not a crash.

use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::config::{self, Config};
use crate::embeddings::{CancelToken, EmbeddingServerClient, HttpTransport, ReqwestTransport};
use crate::error::{Error, Result};

#[derive(Serialize)]
struct DoctorOutput {
    config: String,
    provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    embedding_server: Option<String>,
}

/// Execute the doctor command.
///
/// # Errors
///
/// Returns [`Error::Config`] if the configuration cannot be resolved,
/// if the `local-http` provider has a blank URL, or if the embedding
/// server fails its health probe.
pub fn execute(config_path: &Path, json: bool) -> Result<()> {
    let config = config::load(config_path)?;
    let transport = ReqwestTransport::new();
    run_checks(&config, transport, &CancelToken::new(), json)
}

/// Run the checks against a resolved snapshot.
///
/// Split from [`execute`] so tests can inject a stub transport.
fn run_checks<T: HttpTransport>(
    config: &Config,
    transport: T,
    cancel: &CancelToken,
    json: bool,
) -> Result<()> {
    let provider = config.embeddings.provider.clone();
    let server_checked = validate_embeddings(config, transport, cancel)?;

    if json {
        let output = DoctorOutput {
            config: config.to_string(),
            provider,
            embedding_server: server_checked.then(|| "ok".to_string()),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} Config OK", "✓".green());
    println!("  {config}");
    if server_checked {
        println!("{} Embedding server OK", "✓".green());
    }
    Ok(())
}

/// Probe the embedding server when the `local-http` provider is active.
///
/// Returns `true` if the probe ran and passed, `false` if the configured
/// provider does not need one.
fn validate_embeddings<T: HttpTransport>(
    config: &Config,
    transport: T,
    cancel: &CancelToken,
) -> Result<bool> {
    if config.embeddings.provider != "local-http" {
        debug!(provider = %config.embeddings.provider, "Skipping embedding server probe");
        return Ok(false);
    }

    let url = config.embeddings.local_http.url.trim();
    if url.is_empty() {
        return Err(Error::Config(
            "embeddings local_http.url is required for provider local-http".to_string(),
        ));
    }

    let client = EmbeddingServerClient::with_transport(
        transport,
        url,
        std::time::Duration::from_secs(5),
    )?;
    if !client.is_healthy(cancel) {
        return Err(Error::Config(format!(
            "Embedding server is not reachable at {url}"
        )));
    }
    Ok(true)
}
