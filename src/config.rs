//! Configuration file loading and validation.
//!
//! This module handles loading the YAML configuration file that names the
//! GitHub organization, the auth token, and the repositories to report on.
//! Validation failures are surfaced as distinct `ConfigError` variants so
//! the CLI can print a remediation hint for each.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors raised while loading or validating the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("config file is not valid YAML: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("config file is missing required field: {0}")]
    MissingField(&'static str),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level configuration document.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub github: GithubConfig,
}

/// The `github` section of the configuration file.
#[derive(Clone, Debug, Deserialize)]
pub struct GithubConfig {
    /// Organization whose repositories are reported on.
    #[serde(default)]
    pub org: Option<String>,

    /// Personal access token used for API authentication.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Repositories to include in the report, by name (without the org).
    #[serde(default)]
    pub repos: Vec<String>,

    /// Optional API base URL, for GitHub Enterprise installs.
    #[serde(default)]
    pub url: Option<String>,
}

impl Config {
    /// Loads and validates the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.github.org.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingField("github.org"));
        }
        if self.github.auth_token.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingField("github.auth_token"));
        }
        if self.github.repos.is_empty() {
            return Err(ConfigError::MissingField("github.repos"));
        }
        Ok(())
    }

    pub fn org(&self) -> &str {
        self.github.org.as_deref().unwrap_or_default()
    }

    pub fn auth_token(&self) -> &str {
        self.github.auth_token.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_valid_config() {
        let file = write_config(
            "github:\n  org: test-org\n  auth_token: fake-token\n  repos:\n    - repo1\n    - repo2\n  url: https://github.example.com/api/v3\n",
        );

        let config = Config::load(file.path()).expect("config should load");

        assert_eq!(config.org(), "test-org");
        assert_eq!(config.auth_token(), "fake-token");
        assert_eq!(config.github.repos, vec!["repo1", "repo2"]);
        assert_eq!(
            config.github.url.as_deref(),
            Some("https://github.example.com/api/v3")
        );
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let file = write_config("github: [unclosed\n");
        let result = Config::load(file.path());
        assert!(matches!(result, Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn test_missing_org() {
        let file = write_config("github:\n  auth_token: t\n  repos: [repo1]\n");
        let result = Config::load(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::MissingField("github.org"))
        ));
    }

    #[test]
    fn test_missing_token() {
        let file = write_config("github:\n  org: o\n  repos: [repo1]\n");
        let result = Config::load(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::MissingField("github.auth_token"))
        ));
    }

    #[test]
    fn test_empty_repos() {
        let file = write_config("github:\n  org: o\n  auth_token: t\n  repos: []\n");
        let result = Config::load(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::MissingField("github.repos"))
        ));
    }
}
