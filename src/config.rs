use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::related::MAX_RELATED;

/// Environment variable that overrides `listen.port`.
pub const PORT_ENV: &str = "PORT";
/// Environment variable that supplies or overrides `upstream.baseurl`.
pub const UPSTREAM_ENV: &str = "TUBESHIM_UPSTREAM";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default = "default_hidden_subscriber_label")]
    pub hidden_subscriber_label: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub baseurl: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_useragent")]
    pub useragent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            baseurl: String::new(),
            lang: default_lang(),
            region: default_region(),
            timeout: default_timeout(),
            useragent: default_useragent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_related_limit")]
    pub related: usize,
    #[serde(default = "default_search_limit")]
    pub search: usize,
    #[serde(default = "default_comments_limit")]
    pub comments: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            related: default_related_limit(),
            search: default_search_limit(),
            comments: default_comments_limit(),
        }
    }
}

fn default_port() -> String {
    "5000".to_string()
}

fn default_lang() -> String {
    "ja".to_string()
}

fn default_region() -> String {
    "JP".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_useragent() -> String {
    concat!("tubeshim-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_related_limit() -> usize {
    MAX_RELATED
}

fn default_search_limit() -> usize {
    50
}

fn default_comments_limit() -> usize {
    300
}

fn default_hidden_subscriber_label() -> String {
    "非公開".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            appdir: None,
            upstream: UpstreamConfig::default(),
            limits: LimitsConfig::default(),
            hidden_subscriber_label: default_hidden_subscriber_label(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }

    /// Loads `path` if it exists (defaults otherwise), applies environment
    /// overrides and checks that an upstream is configured.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV).filter(|p| !p.is_empty()) {
            self.listen.port = port;
        }
        if let Some(baseurl) = lookup(UPSTREAM_ENV).filter(|u| !u.is_empty()) {
            self.upstream.baseurl = baseurl;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.baseurl.is_empty() {
            return Err(ConfigError::MissingUpstream);
        }
        if self.listen.port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidPort(self.listen.port.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("No upstream configured: set upstream.baseurl or {}", UPSTREAM_ENV)]
    MissingUpstream,
    #[error("Invalid listen port: {0}")]
    InvalidPort(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn make_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let file = make_config("upstream:\n  baseurl: https://inv.example.org\n");
        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.listen.port, "5000");
        assert_eq!(config.upstream.lang, "ja");
        assert_eq!(config.upstream.region, "JP");
        assert_eq!(config.limits.related, 100);
        assert_eq!(config.limits.search, 50);
        assert_eq!(config.limits.comments, 300);
        assert_eq!(config.hidden_subscriber_label, "非公開");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_file() {
        let file = make_config(
            "listen:\n  address: 127.0.0.1\n  port: \"8123\"\nappdir: ./dist\nupstream:\n  baseurl: https://inv.example.org\n  lang: en\n  timeout: 5\nlimits:\n  comments: 20\n",
        );
        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.listen.address.as_deref(), Some("127.0.0.1"));
        assert_eq!(config.listen.port, "8123");
        assert_eq!(config.appdir.as_deref(), Some("./dist"));
        assert_eq!(config.upstream.lang, "en");
        assert_eq!(config.upstream.timeout, 5);
        assert_eq!(config.limits.comments, 20);
        assert_eq!(config.limits.search, 50);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingUpstream)));

        config.apply_env(|key| match key {
            PORT_ENV => Some("9000".to_string()),
            UPSTREAM_ENV => Some("https://inv.example.org".to_string()),
            _ => None,
        });
        assert_eq!(config.listen.port, "9000");
        assert_eq!(config.upstream.baseurl, "https://inv.example.org");
        assert!(config.validate().is_ok());

        config.apply_env(|_| Some("not-a-port".to_string()));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn test_parse_error() {
        let file = make_config("listen: [unclosed\n");
        let err = Config::from_file(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_, _)));
    }
}
