use super::wire::{Page, ProgramAttributes, Resource, StateAttributes, WeaknessAttributes};
use crate::domain::errors::ApiError;
use crate::domain::ports::BountyPlatform;
use crate::domain::types::{Asset, InvitedHacker, Program, Report, Weakness};
use crate::infrastructure::core::http_client_factory::build_url_with_query;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

// ===== HackerOne REST client =====

pub struct HackerOneClient {
    client: ClientWithMiddleware,
    username: String,
    password: String,
    base_url: Url,
    /// `Some(n)` follows `links.next` for at most `n` pages in total
    max_pages: Option<usize>,
}

impl HackerOneClient {
    pub fn builder() -> HackerOneClientBuilder {
        HackerOneClientBuilder::default()
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), endpoint);
        Url::parse(&raw).map_err(|e| ApiError::Transport {
            endpoint: endpoint.to_string(),
            reason: format!("invalid request URL {}: {}", raw, e),
        })
    }

    async fn get_page<A: DeserializeOwned>(
        &self,
        url: &Url,
        endpoint: &str,
    ) -> Result<Page<A>, ApiError> {
        let response = self
            .client
            .get(url.as_str())
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| ApiError::Transport {
            endpoint: endpoint.to_string(),
            reason: format!("failed to read body: {}", e),
        })?;

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    /// Reads a collection, following `links.next` only when pagination is enabled.
    async fn get_collection<A: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Vec<Resource<A>>, ApiError> {
        let mut url = self.endpoint_url(endpoint)?;
        let mut resources = Vec::new();
        let mut pages = 0usize;

        loop {
            let page: Page<A> = self.get_page(&url, endpoint).await?;
            pages += 1;
            resources.extend(page.data);

            let (Some(max_pages), Some(next)) = (self.max_pages, page.links.next_page()) else {
                break;
            };
            if pages >= max_pages {
                warn!(
                    endpoint,
                    max_pages, "HackerOneClient: Page limit reached, remaining pages skipped"
                );
                break;
            }
            let next_url = self.base_url.join(next).map_err(|e| ApiError::Decode {
                endpoint: endpoint.to_string(),
                reason: format!("invalid links.next '{}': {}", next, e),
            })?;
            // Credentials only ever go to the configured scheme, host and port
            if next_url.origin() != self.base_url.origin() {
                warn!(
                    endpoint,
                    next = next_url.as_str(),
                    "HackerOneClient: links.next leaves the API origin, remaining pages skipped"
                );
                break;
            }
            url = next_url;
        }

        Ok(resources)
    }
}

#[async_trait]
impl BountyPlatform for HackerOneClient {
    async fn fetch_assets(&self, organization_id: &str) -> Result<Vec<Asset>, ApiError> {
        let endpoint = format!("/v1/organizations/{}/assets", organization_id);
        let assets: Vec<Asset> = self
            .get_collection::<StateAttributes>(&endpoint)
            .await?
            .into_iter()
            .map(Asset::from)
            .collect();

        debug!(organization_id, count = assets.len(), "HackerOneClient: Retrieved assets");
        Ok(assets)
    }

    async fn fetch_programs(&self) -> Result<Vec<Program>, ApiError> {
        let programs: Vec<Program> = self
            .get_collection::<ProgramAttributes>("/v1/me/programs")
            .await?
            .into_iter()
            .map(Program::from)
            .collect();

        debug!(count = programs.len(), "HackerOneClient: Retrieved programs");
        Ok(programs)
    }

    async fn fetch_reports(&self, program_handle: &str) -> Result<Vec<Report>, ApiError> {
        let endpoint = build_url_with_query("/v1/reports", &[("filter[program][]", program_handle)]);
        let reports: Vec<Report> = self
            .get_collection::<StateAttributes>(&endpoint)
            .await?
            .into_iter()
            .map(Report::from)
            .collect();

        debug!(
            program = program_handle,
            count = reports.len(),
            "HackerOneClient: Retrieved reports"
        );
        Ok(reports)
    }

    async fn fetch_invited_hackers(
        &self,
        program_id: &str,
    ) -> Result<Vec<InvitedHacker>, ApiError> {
        let endpoint = format!("/v1/programs/{}/hacker_invitations", program_id);
        let hackers: Vec<InvitedHacker> = self
            .get_collection::<StateAttributes>(&endpoint)
            .await?
            .into_iter()
            .map(InvitedHacker::from)
            .collect();

        debug!(
            program_id,
            count = hackers.len(),
            "HackerOneClient: Retrieved invited hackers"
        );
        Ok(hackers)
    }

    async fn fetch_weaknesses(&self, program_id: &str) -> Result<Vec<Weakness>, ApiError> {
        let endpoint = format!("/v1/programs/{}/weaknesses", program_id);
        let weaknesses: Vec<Weakness> = self
            .get_collection::<WeaknessAttributes>(&endpoint)
            .await?
            .into_iter()
            .map(Weakness::from)
            .collect();

        debug!(
            program_id,
            count = weaknesses.len(),
            "HackerOneClient: Retrieved weaknesses"
        );
        Ok(weaknesses)
    }
}

#[derive(Default)]
pub struct HackerOneClientBuilder {
    client: Option<ClientWithMiddleware>,
    username: Option<String>,
    password: Option<String>,
    base_url: Option<Url>,
    max_pages: Option<usize>,
}

impl HackerOneClientBuilder {
    /// Transport to issue requests through, usually from `HttpClientFactory`
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.client = Some(client);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Follow `links.next`, reading at most `max_pages` pages per collection
    pub fn follow_pagination(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages.max(1));
        self
    }

    pub fn build(self) -> anyhow::Result<HackerOneClient> {
        Ok(HackerOneClient {
            client: self.client.context("http_client is required")?,
            username: self.username.context("username is required")?,
            password: self.password.context("password is required")?,
            base_url: self.base_url.context("base_url is required")?,
            max_pages: self.max_pages,
        })
    }
}
