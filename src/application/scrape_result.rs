//! Per-scrape aggregation.
//!
//! A [`ScrapeResult`] lives for exactly one scrape. Counts are summed here
//! across programs and then written to the registry with gauge `set` calls,
//! so nothing accumulates across scrapes.

use crate::domain::types::{InvitedHacker, Report, Weakness};
use crate::infrastructure::observability::Metrics;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct ScrapeResult {
    /// `None` when the asset fetch failed or never ran
    pub asset_count: Option<u64>,
    /// Program handles in response order
    pub programs: Vec<String>,
    pub reports_by_state: BTreeMap<String, u64>,
    pub hackers_by_state: BTreeMap<String, u64>,
    /// Occurrences keyed by (name, id)
    pub weaknesses: BTreeMap<(String, String), u64>,
    /// Distinct (name, id) keys rejected by the label limit
    pub dropped_weaknesses: BTreeSet<(String, String)>,
    weakness_label_limit: usize,
}

impl ScrapeResult {
    /// `weakness_label_limit` of 0 means unbounded
    pub fn new(weakness_label_limit: usize) -> Self {
        Self {
            weakness_label_limit,
            ..Self::default()
        }
    }

    pub fn record_program(&mut self, handle: &str) {
        self.programs.push(handle.to_string());
    }

    pub fn record_reports(&mut self, reports: &[Report]) {
        for report in reports {
            *self.reports_by_state.entry(report.state.clone()).or_insert(0) += 1;
        }
    }

    pub fn record_invited_hackers(&mut self, hackers: &[InvitedHacker]) {
        for hacker in hackers {
            *self.hackers_by_state.entry(hacker.state.clone()).or_insert(0) += 1;
        }
    }

    /// Keeps the first `limit` distinct keys in encounter order.
    pub fn record_weaknesses(&mut self, weaknesses: &[Weakness]) {
        for weakness in weaknesses {
            let key = (weakness.name.clone(), weakness.id.clone());
            if let Some(count) = self.weaknesses.get_mut(&key) {
                *count += 1;
            } else if self.weakness_label_limit == 0
                || self.weaknesses.len() < self.weakness_label_limit
            {
                self.weaknesses.insert(key, 1);
            } else {
                self.dropped_weaknesses.insert(key);
            }
        }
    }

    /// Write the aggregation into freshly reset gauge families.
    pub fn apply(&self, metrics: &Metrics, organization_id: &str) {
        for handle in &self.programs {
            metrics.set_program_present(handle);
        }
        for (state, count) in &self.reports_by_state {
            metrics.set_reports(organization_id, state, *count);
        }
        for (state, count) in &self.hackers_by_state {
            metrics.set_invited_hackers(organization_id, state, *count);
        }
        for ((name, id), count) in &self.weaknesses {
            metrics.set_weakness(name, id, *count);
        }
        if self.weakness_label_limit > 0 {
            metrics.set_weaknesses_dropped(organization_id, self.dropped_weaknesses.len() as u64);
        }
        metrics.set_assets(organization_id, self.asset_count.unwrap_or(0));
    }
}
