use thiserror::Error;

/// Errors surfaced by a single call against the bug-bounty platform API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Transport failure calling {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("API request failed with status {status} for endpoint {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl ApiError {
    /// The endpoint path the failing call targeted
    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::Transport { endpoint, .. }
            | ApiError::Status { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => endpoint,
        }
    }

    /// Short machine-friendly kind, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Transport { .. } => "transport",
            ApiError::Status { .. } => "status",
            ApiError::Decode { .. } => "decode",
        }
    }
}

/// Errors that fail a metrics pull outright
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Failed to encode metrics: {0}")]
    Encoding(#[from] prometheus::Error),
}
