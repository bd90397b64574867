//! `chainsig.yaml` configuration.
//!
//! ```yaml
//! builtin: true
//! allow_trailing_bytes: false
//! sources:
//!   - path: ./signatures/functions.txt
//!     kind: function
//!   - path: ./signatures/events.json
//!     kind: event
//!     name: my-events
//! log:
//!   level: info
//!   components: { chainsig_registry: debug }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chainsig_core::SignatureKind;
use chainsig_observability::LogConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Include the bundled signature table.
    #[serde(default = "default_builtin")]
    pub builtin: bool,
    #[serde(default)]
    pub allow_trailing_bytes: bool,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

/// One signature file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub kind: SignatureKind,
    /// Source label; defaults to the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_builtin() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            builtin: default_builtin(),
            allow_trailing_bytes: false,
            sources: Vec::new(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`, or defaults when no path is given. Relative source
    /// paths are resolved against the config file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file '{}'", path.display()))?;
        let mut config = Self::from_yaml(&text)
            .with_context(|| format!("parse config file '{}'", path.display()))?;
        if let Some(base) = path.parent() {
            for source in &mut config.sources {
                if source.path.is_relative() {
                    source.path = base.join(&source.path);
                }
            }
        }
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Append signature files given on the command line.
    pub fn add_files(&mut self, kind: SignatureKind, files: &[PathBuf]) {
        self.sources.extend(files.iter().map(|path| SourceConfig {
            path: path.clone(),
            kind,
            name: None,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_yaml() {
        let yaml = r#"
builtin: false
allow_trailing_bytes: true
sources:
  - path: ./signatures/functions.txt
    kind: function
  - path: ./signatures/events.txt
    kind: event
    name: my-events
log:
  level: info
  json: false
  components: { chainsig_registry: debug }
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert!(!config.builtin);
        assert!(config.allow_trailing_bytes);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].kind, SignatureKind::Event);
        assert_eq!(config.sources[1].name.as_deref(), Some("my-events"));
        assert_eq!(config.log.directives(), "info,chainsig_registry=debug");
    }

    #[test]
    fn empty_yaml_means_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.builtin);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        assert!(Config::from_yaml("sources:\n  - path: a.txt\n    kind: struct\n").is_err());
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
