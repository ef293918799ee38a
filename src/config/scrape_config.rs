//! Scrape behaviour configuration parsing from environment variables.

use super::parse_env;
use anyhow::Result;

/// Scrape environment configuration
#[derive(Debug, Clone)]
pub struct ScrapeEnvConfig {
    /// Deadline applied to one whole scrape
    pub timeout_secs: u64,
    /// Max distinct weakness series per scrape, 0 disables the cap
    pub weakness_label_limit: usize,
}

impl Default for ScrapeEnvConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            weakness_label_limit: 500,
        }
    }
}

impl ScrapeEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            timeout_secs: parse_env("SCRAPE_TIMEOUT_SECS", defaults.timeout_secs)?,
            weakness_label_limit: parse_env(
                "WEAKNESS_LABEL_LIMIT",
                defaults.weakness_label_limit,
            )?,
        })
    }
}
