//! Version command implementation.

use crate::config::EmbeddingsConfig;
use crate::error::Result;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    name: &'a str,
    version: &'a str,
    default_provider: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let defaults = EmbeddingsConfig::default();
    let output = VersionOutput {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        default_provider: &defaults.provider,
    };

    if json {
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} {}", output.name, output.version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_output_serializes_package_metadata() {
        let defaults = EmbeddingsConfig::default();
        let output = VersionOutput {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            default_provider: &defaults.provider,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["name"], "repomind");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["default_provider"], "local-http");
    }
}
