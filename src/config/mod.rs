//! Configuration management

mod cli;

pub use cli::{split_local_options, Cli, CommandLine};

use crate::types::CvsError;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fs;

/// Client settings, usually read from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// CVSROOT (`:pserver:anon@host:/cvs`); falls back to `CVS/Root`
    pub repository_root: Option<String>,

    /// Ignore globs applied on top of every `.cvsignore`
    pub ignore: Vec<String>,

    /// cvswrappers lines (`*.png -k 'b'`)
    pub wrappers: Vec<String>,

    /// Requests the server advertised (None = assume all are valid)
    pub valid_requests: Option<Vec<String>>,
}

impl ClientConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: &Utf8Path) -> Result<Self, CvsError> {
        let text = fs::read_to_string(path)
            .map_err(|e| CvsError::Config(format!("Cannot read {}: {}", path, e)))?;
        Self::from_toml(&text)
    }

    /// Parse and validate TOML text
    pub fn from_toml(text: &str) -> Result<Self, CvsError> {
        let config: ClientConfig =
            toml::from_str(text).map_err(|e| CvsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), CvsError> {
        if let Some(root) = &self.repository_root {
            if root.trim().is_empty() {
                return Err(CvsError::Config(
                    "repository_root cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = ClientConfig::from_toml(
            r#"
repository_root = ":pserver:anon@cvs.example.org:/cvsroot"
ignore = ["*.o", "build"]
wrappers = ["*.png -k 'b'"]
valid_requests = ["Directory", "Entry", "Modified"]
"#,
        )
        .expect("valid config");

        assert_eq!(
            config.repository_root.as_deref(),
            Some(":pserver:anon@cvs.example.org:/cvsroot")
        );
        assert_eq!(config.ignore, vec!["*.o", "build"]);
        assert_eq!(config.wrappers.len(), 1);
        assert_eq!(config.valid_requests.map(|r| r.len()), Some(3));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = ClientConfig::from_toml("ignore = [\"*.tmp\"]").expect("valid config");
        assert_eq!(config.repository_root, None);
        assert!(config.wrappers.is_empty());
        assert_eq!(config.valid_requests, None);
    }

    #[test]
    fn test_empty_root_is_rejected() {
        let err = ClientConfig::from_toml("repository_root = \"  \"").expect_err("empty root");
        assert!(matches!(err, CvsError::Config(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ClientConfig::from_toml("ignore = [").expect_err("broken toml");
        assert!(matches!(err, CvsError::Config(_)));
    }
}
