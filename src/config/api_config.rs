//! HackerOne API configuration parsing from environment variables.
//!
//! Credentials, organization, base URL and transport tuning for the
//! upstream client.

use super::{parse_bool, parse_env};
use anyhow::Result;
use std::env;

pub const DEFAULT_API_URL: &str = "https://api.hackerone.com";

/// HackerOne API environment configuration
#[derive(Debug, Clone)]
pub struct ApiEnvConfig {
    pub api_user: String,
    pub api_password: String,
    pub organization_id: String,
    pub api_url: String,

    // Transport
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,

    // Pagination
    pub follow_pagination: bool,
    pub max_pages: usize,
}

impl ApiEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_user: env::var("HACKERONE_API_USER").unwrap_or_default(),
            api_password: env::var("HACKERONE_API_PASSWORD").unwrap_or_default(),
            organization_id: env::var("HACKERONE_ORG_ID").unwrap_or_default(),
            api_url: env::var("HACKERONE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", 30)?,
            http_max_retries: parse_env("HTTP_MAX_RETRIES", 3)?,
            follow_pagination: parse_bool("FOLLOW_PAGINATION", false)?,
            max_pages: parse_env("MAX_PAGES", 10)?,
        })
    }
}
