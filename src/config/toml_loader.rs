//! TOML configuration file parsing.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Load a TOML file into `T`.
///
/// A missing file deserializes from an empty document, so every field
/// falls back to its `serde` default.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, or
/// [`ConfigError::InvalidManifest`] if it cannot be parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return toml::from_str("").context("Failed to create empty config");
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content).map_err(|e| {
        ConfigError::InvalidManifest {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        }
        .into()
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq, Eq)]
    #[serde(default)]
    struct Sample {
        name: String,
        items: Vec<String>,
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: Sample = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Sample::default());
    }

    #[test]
    fn parses_present_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        std::fs::write(&path, "name = \"x\"\nitems = [\"a\", \"b\"]\n").unwrap();
        let cfg: Sample = load_config(&path).unwrap();
        assert_eq!(cfg.name, "x");
        assert_eq!(cfg.items, vec!["a", "b"]);
    }

    #[test]
    fn invalid_file_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "name = [unterminated").unwrap();
        let err = load_config::<Sample>(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidManifest { .. })
        ));
    }
}
