use crate::domain::errors::ApiError;
use crate::domain::ports::BountyPlatform;
use crate::domain::types::{Asset, InvitedHacker, Program, Report, Weakness};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::debug;

/// One upstream call the mock can be told to fail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MockCall {
    Assets,
    Programs,
    /// Keyed by program handle
    Reports(String),
    /// Keyed by program id
    InvitedHackers(String),
    /// Keyed by program id
    Weaknesses(String),
}

impl MockCall {
    fn endpoint(&self, organization_id: &str) -> String {
        match self {
            MockCall::Assets => format!("/v1/organizations/{}/assets", organization_id),
            MockCall::Programs => "/v1/me/programs".to_string(),
            MockCall::Reports(handle) => format!("/v1/reports?filter[program][]={}", handle),
            MockCall::InvitedHackers(id) => format!("/v1/programs/{}/hacker_invitations", id),
            MockCall::Weaknesses(id) => format!("/v1/programs/{}/weaknesses", id),
        }
    }
}

/// Everything the mock platform serves
#[derive(Debug, Clone, Default)]
pub struct MockDataset {
    pub assets: Vec<Asset>,
    pub programs: Vec<Program>,
    /// By program handle
    pub reports: HashMap<String, Vec<Report>>,
    /// By program id
    pub invited_hackers: HashMap<String, Vec<InvitedHacker>>,
    /// By program id
    pub weaknesses: HashMap<String, Vec<Weakness>>,
}

impl MockDataset {
    pub fn with_assets(mut self, count: usize) -> Self {
        self.assets = (1..=count)
            .map(|i| Asset {
                id: i.to_string(),
                state: "confirmed".to_string(),
            })
            .collect();
        self
    }

    pub fn with_program(mut self, id: &str, handle: &str) -> Self {
        self.programs.push(Program {
            id: id.to_string(),
            handle: handle.to_string(),
        });
        self
    }

    pub fn with_reports(mut self, handle: &str, states: &[&str]) -> Self {
        let reports = self.reports.entry(handle.to_string()).or_default();
        for state in states {
            reports.push(Report {
                id: format!("{}-{}", handle, reports.len() + 1),
                state: state.to_string(),
            });
        }
        self
    }

    pub fn with_invited_hackers(mut self, program_id: &str, states: &[&str]) -> Self {
        let hackers = self.invited_hackers.entry(program_id.to_string()).or_default();
        for state in states {
            hackers.push(InvitedHacker {
                id: format!("{}-{}", program_id, hackers.len() + 1),
                state: state.to_string(),
            });
        }
        self
    }

    pub fn with_weakness(mut self, program_id: &str, id: &str, name: &str) -> Self {
        self.weaknesses
            .entry(program_id.to_string())
            .or_default()
            .push(Weakness {
                id: id.to_string(),
                name: name.to_string(),
            });
        self
    }

    /// Small, stable dataset served in `MODE=mock`
    pub fn demo() -> Self {
        Self::default()
            .with_assets(3)
            .with_program("1001", "acme-security")
            .with_program("1002", "acme-vdp")
            .with_reports("acme-security", &["new", "new", "triaged", "resolved"])
            .with_reports("acme-vdp", &["new", "informative"])
            .with_invited_hackers("1001", &["accepted", "accepted", "pending"])
            .with_invited_hackers("1002", &["rejected"])
            .with_weakness("1001", "60", "Cross-site Scripting (XSS) - Reflected")
            .with_weakness("1001", "67", "SQL Injection")
            .with_weakness("1002", "60", "Cross-site Scripting (XSS) - Reflected")
    }
}

/// In-memory [`BountyPlatform`] with failure injection and call accounting.
#[derive(Clone, Default)]
pub struct MockBountyPlatform {
    dataset: Arc<RwLock<MockDataset>>,
    failures: Arc<RwLock<HashSet<MockCall>>>,
    latency: Option<Duration>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockBountyPlatform {
    pub fn new(dataset: MockDataset) -> Self {
        Self {
            dataset: Arc::new(RwLock::new(dataset)),
            ..Self::default()
        }
    }

    /// Delay every call, e.g. to force overlapping scrapes or deadline overruns
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Swap the served dataset, as if upstream entities changed between scrapes
    pub fn set_dataset(&self, dataset: MockDataset) {
        if let Ok(mut current) = self.dataset.write() {
            *current = dataset;
        }
    }

    pub fn fail(&self, call: MockCall) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(call);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.write() {
            failures.clear();
        }
    }

    /// Total calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were ever in progress at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn serve<T, F>(&self, call: MockCall, select: F) -> Result<Vec<T>, ApiError>
    where
        F: FnOnce(&MockDataset) -> Vec<T>,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let failing = self
            .failures
            .read()
            .map(|f| f.contains(&call))
            .unwrap_or(false);
        let result = if failing {
            Err(ApiError::Status {
                status: 500,
                endpoint: call.endpoint("mock"),
            })
        } else {
            Ok(self.dataset.read().map(|d| select(&*d)).unwrap_or_default())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        debug!("MockBountyPlatform: served {:?} (failed: {})", call, failing);
        result
    }
}

#[async_trait]
impl BountyPlatform for MockBountyPlatform {
    async fn fetch_assets(&self, _organization_id: &str) -> Result<Vec<Asset>, ApiError> {
        self.serve(MockCall::Assets, |d| d.assets.clone()).await
    }

    async fn fetch_programs(&self) -> Result<Vec<Program>, ApiError> {
        self.serve(MockCall::Programs, |d| d.programs.clone()).await
    }

    async fn fetch_reports(&self, program_handle: &str) -> Result<Vec<Report>, ApiError> {
        self.serve(MockCall::Reports(program_handle.to_string()), |d| {
            d.reports.get(program_handle).cloned().unwrap_or_default()
        })
        .await
    }

    async fn fetch_invited_hackers(
        &self,
        program_id: &str,
    ) -> Result<Vec<InvitedHacker>, ApiError> {
        self.serve(MockCall::InvitedHackers(program_id.to_string()), |d| {
            d.invited_hackers.get(program_id).cloned().unwrap_or_default()
        })
        .await
    }

    async fn fetch_weaknesses(&self, program_id: &str) -> Result<Vec<Weakness>, ApiError> {
        self.serve(MockCall::Weaknesses(program_id.to_string()), |d| {
            d.weaknesses.get(program_id).cloned().unwrap_or_default()
        })
        .await
    }
}
