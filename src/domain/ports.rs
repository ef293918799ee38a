use crate::domain::errors::ApiError;
use crate::domain::types::{Asset, InvitedHacker, Program, Report, Weakness};
use async_trait::async_trait;

/// Read-only view of the bug-bounty platform.
///
/// Each call issues one logical request (one page unless the implementation
/// is configured to follow pagination) and never retries on its own.
#[async_trait]
pub trait BountyPlatform: Send + Sync {
    async fn fetch_assets(&self, organization_id: &str) -> Result<Vec<Asset>, ApiError>;
    async fn fetch_programs(&self) -> Result<Vec<Program>, ApiError>;
    async fn fetch_reports(&self, program_handle: &str) -> Result<Vec<Report>, ApiError>;
    async fn fetch_invited_hackers(&self, program_id: &str)
    -> Result<Vec<InvitedHacker>, ApiError>;
    async fn fetch_weaknesses(&self, program_id: &str) -> Result<Vec<Weakness>, ApiError>;
}
