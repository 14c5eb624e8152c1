use serde::{Deserialize, Serialize};

/// Tunables for a tracked instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Keep a serialized copy of every field as of the last baseline
    /// (construction, save, clear, or load) so changes can be reported.
    pub capture_originals: bool,
    /// Emit a `trace` event for assignments that were skipped because the
    /// new value equals the current one.
    pub log_unchanged: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capture_originals: true,
            log_unchanged: false,
        }
    }
}

impl TrackerConfig {
    /// Dirty tracking only: no original-value snapshot.
    pub fn lean() -> Self {
        Self {
            capture_originals: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_captures_originals() {
        let config = TrackerConfig::default();
        assert!(config.capture_originals);
        assert!(!config.log_unchanged);
    }

    #[test]
    fn lean_disables_capture() {
        assert!(!TrackerConfig::lean().capture_originals);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: TrackerConfig = serde_json::from_str(r#"{"log_unchanged": true}"#).unwrap();
        assert!(config.capture_originals);
        assert!(config.log_unchanged);
    }
}
