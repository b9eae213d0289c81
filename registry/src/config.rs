//! Client configuration for the form registry service.
//!
//! Loaded from YAML, then overridden by the environment.
//!
//! # Example YAML
//!
//! ```yaml
//! base_url: "https://forms.example.gov"
//! token: "eyJhbGciOi..."
//! timeout_secs: 15
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Registry address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8084";

/// Environment variable overriding [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "FORM_REGISTRY_URL";

/// Environment variable overriding [`ClientConfig::token`].
pub const TOKEN_ENV: &str = "FORM_REGISTRY_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`RegistryClient`](crate::RegistryClient).
///
/// # Examples
///
/// ```
/// use form_schema_registry::ClientConfig;
///
/// let config: ClientConfig = serde_yaml::from_str("base_url: http://forms.local:9000").unwrap();
/// assert_eq!(config.base_url, "http://forms.local:9000");
/// assert_eq!(config.timeout_secs, 30);
/// assert!(config.token.is_none());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Registry base URL; API paths are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](RegistryError::IoError) if the file cannot be
    /// read, or [`YamlError`](RegistryError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies [`BASE_URL_ENV`] and [`TOKEN_ENV`] when they are set and
    /// non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        )
    }

    /// Applies explicit overrides; `None` and empty strings keep the current
    /// value.
    pub fn with_overrides(mut self, base_url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Checks that the base URL is an absolute http(s) URL and the timeout
    /// is non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](RegistryError::InvalidConfig) describing the
    /// first problem found.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|err| RegistryError::InvalidConfig(format!("base_url '{}': {err}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RegistryError::InvalidConfig(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(RegistryError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8084");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_ignore_empty_values() {
        let config = ClientConfig::default().with_overrides(Some(String::new()), Some("  ".into()));
        assert_eq!(config, ClientConfig::default());

        let config = ClientConfig::default()
            .with_overrides(Some("https://forms.example.gov".into()), Some("abc".into()));
        assert_eq!(config.base_url, "https://forms.example.gov");
        assert_eq!(config.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_scheme = ClientConfig {
            base_url: "ftp://forms".into(),
            ..Default::default()
        };
        assert!(matches!(bad_scheme.validate(), Err(RegistryError::InvalidConfig(_))));

        let relative = ClientConfig {
            base_url: "/api".into(),
            ..Default::default()
        };
        assert!(relative.validate().is_err());

        let zero_timeout = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.yaml");
        let config = ClientConfig {
            base_url: "https://forms.example.gov".into(),
            token: Some("t0k3n".into()),
            timeout_secs: 5,
        };
        config.save(&path).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap(), config);
    }
}
