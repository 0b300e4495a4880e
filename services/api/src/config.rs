use std::path::Path;
use std::time::Duration;

use insights::AnalyzeOptions;
use review_source::Locale;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

impl Default for ServerConfig {
    fn default() -> Self { Self { host: default_host(), port: default_port() } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Scraper endpoint serving `/apps/{id}` and `/apps/{id}/reviews`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound for `count` on /api/analyse
    #[serde(default = "default_max_reviews")]
    pub max_reviews: usize,
}

fn default_endpoint() -> String { "http://127.0.0.1:3000".to_string() }
fn default_lang() -> String { "en".to_string() }
fn default_country() -> String { "in".to_string() }
fn default_page_size() -> usize { 200 }
fn default_timeout_secs() -> u64 { 30 }
fn default_max_reviews() -> usize { 200_000 }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            lang: default_lang(),
            country: default_country(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            max_reviews: default_max_reviews(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: default_level() } }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub analysis: AnalyzeOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(content)?) }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Read `path` if it exists, otherwise run on built-in defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::warn!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn locale(&self) -> Locale {
        Locale { lang: self.source.lang.clone(), country: self.source.country.clone() }
    }

    pub fn timeout(&self) -> Duration { Duration::from_secs(self.source.timeout_secs) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.source.page_size, 200);
        assert_eq!(config.source.max_reviews, 200_000);
        assert_eq!(config.analysis.top_n, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            port = 9000

            [source]
            endpoint = "http://scraper:3000"
            country = "us"

            [analysis]
            minPhraseSupport = 2
            windowSizesDays = [7, 30]
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.locale(), Locale { lang: "en".into(), country: "us".into() });
        assert_eq!(config.analysis.min_phrase_support, 2);
        assert_eq!(config.analysis.window_sizes_days, vec![7, 30]);
        assert_eq!(config.analysis.top_n, 10);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = AppConfig::load("definitely/not/here.toml").unwrap();
        assert_eq!(config.source.endpoint, "http://127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(AppConfig::from_toml_str("[server\nport = 1"), Err(ConfigError::TomlParsing(_))));
    }
}
