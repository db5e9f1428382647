//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::host::{Element, Scope};
use crate::util::{init_tracing, Result};

/// Engine settings, loadable from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deepest level the tree builder expands; deeper objects become leaves.
    pub max_tree_depth: usize,
    /// Scope used when a target leaves it unspecified.
    pub default_scope: Scope,
    /// Element used when a target leaves it unspecified.
    pub default_element: Element,
    /// `tracing` filter directive used when `CAMEO_LOG` is not set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_tree_depth: 64,
            default_scope: Scope::WILDCARD,
            default_element: Element::WILDCARD,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Install the global subscriber with `log_filter` as fallback filter.
    pub fn init_tracing(&self) -> bool {
        init_tracing(&self.log_filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_tree_depth, 64);
        assert_eq!(config.default_scope, Scope::WILDCARD);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(r#"{ "max_tree_depth": 4 }"#).unwrap();
        assert_eq!(config.max_tree_depth, 4);
        assert_eq!(config.default_element, Element::WILDCARD);
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config { default_scope: Scope::DEVICE_INPUT, ..Config::default() };
        let back = Config::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "log_filter": "cameo=trace" }}"#).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.log_filter, "cameo=trace");
    }

    #[test]
    fn test_init_tracing_once() {
        let config = Config { log_filter: "cameo=debug".into(), ..Config::default() };
        config.init_tracing();
        assert!(!config.init_tracing());
    }

    #[test]
    fn test_bad_json() {
        assert!(Config::from_json("{ not json").is_err());
        assert!(Config::load("/nonexistent/cameo.json").is_err());
    }
}
