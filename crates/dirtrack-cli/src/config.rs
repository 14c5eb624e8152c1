use std::path::{Path, PathBuf};

use anyhow::Context;
use dirtrack_tracker::TrackerConfig;
use serde::{Deserialize, Serialize};

/// Settings read from the `--config` TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// JSON file holding the documents.
    pub store: PathBuf,
    /// Key prefix for post documents.
    pub prefix: String,
    /// Settings for every tracked post.
    pub tracker: TrackerConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from("dirtrack.json"),
            prefix: "post".into(),
            tracker: TrackerConfig::default(),
        }
    }
}

impl CliConfig {
    /// Read `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse TOML text. Missing keys keep their defaults.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(CliConfig::parse("").unwrap(), CliConfig::default());
    }

    #[test]
    fn nested_tracker_table() {
        let config = CliConfig::parse(
            r#"
            store = "/tmp/posts.json"

            [tracker]
            capture_originals = false
            "#,
        )
        .unwrap();
        assert_eq!(config.store, PathBuf::from("/tmp/posts.json"));
        assert_eq!(config.prefix, "post");
        assert_eq!(config.tracker, TrackerConfig::lean());
    }

    #[test]
    fn bad_type_is_an_error() {
        assert!(CliConfig::parse("prefix = 3").is_err());
    }

    #[test]
    fn no_path_gives_defaults() {
        assert_eq!(CliConfig::load(None).unwrap(), CliConfig::default());
    }
}
