//! Configuration module for the HackerOne exporter.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: upstream API, scrape behaviour and HTTP listener.

mod api_config;
mod scrape_config;
mod server_config;

pub use api_config::{ApiEnvConfig, DEFAULT_API_URL};
pub use scrape_config::ScrapeEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Where scrape data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Live HackerOne API
    HackerOne,
    /// Built-in demo dataset, no network access
    Mock,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hackerone" => Ok(Mode::HackerOne),
            "mock" => Ok(Mode::Mock),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'hackerone' or 'mock'", s),
        }
    }
}

/// Main application configuration.
///
/// Immutable for the lifetime of the process once validated.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,

    // Upstream API (from ApiEnvConfig)
    pub api_user: String,
    pub api_password: String,
    pub organization_id: String,
    pub api_url: Url,
    pub http_timeout: Duration,
    pub http_max_retries: u32,
    pub follow_pagination: bool,
    pub max_pages: usize,

    // Scrape (from ScrapeEnvConfig)
    pub scrape_timeout: Duration,
    pub weakness_label_limit: usize,

    // Listener (from ServerEnvConfig)
    pub port: u16,
    pub bind_address: String,
    pub log_level: String,
}

/// Command-line values. Each one that is set wins over its environment variable.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_user: Option<String>,
    pub api_password: Option<String>,
    pub organization_id: Option<String>,
    pub api_url: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from environment variables and validate it.
    pub fn from_env() -> Result<Self> {
        Self::load(ConfigOverrides::default())
    }

    /// Load from the environment, apply command-line overrides, then validate.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let mode_str = env::var("MODE").unwrap_or_else(|_| "hackerone".to_string());
        let mode = Mode::from_str(&mode_str)?;

        let mut api = ApiEnvConfig::from_env().context("Failed to load API config")?;
        let scrape = ScrapeEnvConfig::from_env().context("Failed to load scrape config")?;
        let mut server = ServerEnvConfig::from_env().context("Failed to load server config")?;

        if let Some(user) = overrides.api_user {
            api.api_user = user;
        }
        if let Some(password) = overrides.api_password {
            api.api_password = password;
        }
        if let Some(org) = overrides.organization_id {
            api.organization_id = org;
        }
        if let Some(url) = overrides.api_url {
            api.api_url = url;
        }
        if let Some(port) = overrides.port {
            server.port = port;
        }
        if let Some(level) = overrides.log_level {
            server.log_level = level;
        }

        let api_url = parse_api_url(&api.api_url)?;

        let config = Self {
            mode,
            api_user: api.api_user,
            api_password: api.api_password,
            organization_id: api.organization_id,
            api_url,
            http_timeout: Duration::from_secs(api.http_timeout_secs),
            http_max_retries: api.http_max_retries,
            follow_pagination: api.follow_pagination,
            max_pages: api.max_pages,
            scrape_timeout: Duration::from_secs(scrape.timeout_secs),
            weakness_label_limit: scrape.weakness_label_limit,
            port: server.port,
            bind_address: server.bind_address,
            log_level: server.log_level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the exporter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.organization_id.trim().is_empty() {
            anyhow::bail!("HACKERONE_ORG_ID is required");
        }
        if self.mode == Mode::HackerOne {
            if self.api_user.is_empty() {
                anyhow::bail!("HACKERONE_API_USER is required in hackerone mode");
            }
            if self.api_password.is_empty() {
                anyhow::bail!("HACKERONE_API_PASSWORD is required in hackerone mode");
            }
        }
        if self.scrape_timeout.is_zero() {
            anyhow::bail!("SCRAPE_TIMEOUT_SECS must be greater than 0");
        }
        if self.follow_pagination && self.max_pages == 0 {
            anyhow::bail!("MAX_PAGES must be at least 1 when FOLLOW_PAGINATION is enabled");
        }
        Ok(())
    }
}

fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).context(format!("Invalid HACKERONE_API_URL: {}", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => anyhow::bail!("HACKERONE_API_URL must be http(s), got scheme '{}'", other),
    }
}

pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key)),
        Err(_) => Ok(default),
    }
}

/// Accepts true/false, 1/0 and yes/no in any case.
pub(crate) fn parse_bool(key: &str, default: bool) -> Result<bool> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => anyhow::bail!("Failed to parse {}: expected true or false, got '{}'", key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(Mode::from_str("hackerone").unwrap(), Mode::HackerOne);
        assert_eq!(Mode::from_str("MOCK").unwrap(), Mode::Mock);
        assert!(Mode::from_str("bugcrowd").is_err());
    }

    #[test]
    fn test_api_url_parsing() {
        assert!(parse_api_url("https://api.hackerone.com").is_ok());
        assert!(parse_api_url("http://127.0.0.1:9000/").is_ok());
        assert!(parse_api_url("ftp://api.hackerone.com").is_err());
        assert!(parse_api_url("not a url").is_err());
    }
}
