//! HTTP listener and logging configuration parsing from environment variables.

use super::parse_env;
use anyhow::Result;
use std::env;

/// Listener environment configuration
#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub port: u16,
    pub bind_address: String,
    pub log_level: String,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: "0.0.0.0".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_env("PORT", defaults.port)?,
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }
}
