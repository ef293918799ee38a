//! Prometheus metrics definitions for the HackerOne exporter
//!
//! All metrics use the `hackerone_` prefix. Gauge families carry per-scrape
//! totals and are cleared by [`Metrics::reset`]; the error counter and the
//! duration histogram accumulate for the lifetime of the process.

use prometheus::{
    Counter, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramTimer, Opts, Registry,
    TextEncoder,
};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const NAMESPACE: &str = "hackerone";

/// Fully qualified names of the gauge families cleared on every scrape
pub const GAUGE_FAMILIES: [&str; 6] = [
    "hackerone_assets_total",
    "hackerone_reports_total",
    "hackerone_programs_total",
    "hackerone_invited_hackers_total",
    "hackerone_weaknesses_total",
    "hackerone_weaknesses_dropped",
];

/// Prometheus metrics republished from the bug-bounty platform
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Assets per organization
    pub assets_total: GaugeVec,
    /// Reports per organization and lifecycle state
    pub reports_total: GaugeVec,
    /// Presence indicator per program handle
    pub programs_total: GaugeVec,
    /// Invited hackers per organization and invitation state
    pub invited_hackers_total: GaugeVec,
    /// Weakness occurrences per (name, id)
    pub weaknesses_total: GaugeVec,
    /// Distinct weakness series dropped by the cardinality cap
    pub weaknesses_dropped: GaugeVec,
    /// Failed upstream calls, process lifetime
    pub scrape_errors_total: Counter,
    /// Scrape wall-clock duration
    pub scrape_duration_seconds: Histogram,
    /// Unix time the last scrape finished, whatever its outcome
    pub last_scrape_timestamp: Gauge,
    /// Unix time the last scrape finished without a single failed call
    pub last_successful_scrape_timestamp: Gauge,
}

impl Metrics {
    /// Create a new Metrics instance backed by its own registry
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let assets_total = GaugeVec::new(
            Opts::new("assets_total", "Total number of HackerOne Assets").namespace(NAMESPACE),
            &["organization_id"],
        )?;
        registry.register(Box::new(assets_total.clone()))?;

        let reports_total = GaugeVec::new(
            Opts::new("reports_total", "Total number of HackerOne Reports").namespace(NAMESPACE),
            &["organization_id", "state"],
        )?;
        registry.register(Box::new(reports_total.clone()))?;

        let programs_total = GaugeVec::new(
            Opts::new("programs_total", "Total number of HackerOne Programs")
                .namespace(NAMESPACE),
            &["handle"],
        )?;
        registry.register(Box::new(programs_total.clone()))?;

        let invited_hackers_total = GaugeVec::new(
            Opts::new(
                "invited_hackers_total",
                "Total number of HackerOne Invited Hackers",
            )
            .namespace(NAMESPACE),
            &["organization_id", "state"],
        )?;
        registry.register(Box::new(invited_hackers_total.clone()))?;

        let weaknesses_total = GaugeVec::new(
            Opts::new("weaknesses_total", "Total number of HackerOne Weaknesses")
                .namespace(NAMESPACE),
            &["name", "id"],
        )?;
        registry.register(Box::new(weaknesses_total.clone()))?;

        let weaknesses_dropped = GaugeVec::new(
            Opts::new(
                "weaknesses_dropped",
                "Distinct weakness series omitted by the label limit in the last scrape",
            )
            .namespace(NAMESPACE),
            &["organization_id"],
        )?;
        registry.register(Box::new(weaknesses_dropped.clone()))?;

        let scrape_errors_total = Counter::with_opts(
            Opts::new(
                "scrape_errors_total",
                "Total number of HackerOne API scrape errors",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(scrape_errors_total.clone()))?;

        let scrape_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "scrape_duration_seconds",
                "Duration of HackerOne API scrapes in seconds",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(scrape_duration_seconds.clone()))?;

        let last_scrape_timestamp = Gauge::with_opts(
            Opts::new(
                "last_scrape_timestamp",
                "Unix timestamp of the last completed scrape, including partial ones",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(last_scrape_timestamp.clone()))?;

        let last_successful_scrape_timestamp = Gauge::with_opts(
            Opts::new(
                "last_successful_scrape_timestamp",
                "Unix timestamp of the last scrape without any API error",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(last_successful_scrape_timestamp.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            assets_total,
            reports_total,
            programs_total,
            invited_hackers_total,
            weaknesses_total,
            weaknesses_dropped,
            scrape_errors_total,
            scrape_duration_seconds,
            last_scrape_timestamp,
            last_successful_scrape_timestamp,
        })
    }

    /// Drop every series of every gauge family.
    ///
    /// Counters and histograms are monotonic and left untouched.
    pub fn reset(&self) {
        self.assets_total.reset();
        self.reports_total.reset();
        self.programs_total.reset();
        self.invited_hackers_total.reset();
        self.weaknesses_total.reset();
        self.weaknesses_dropped.reset();
    }

    pub fn set_assets(&self, organization_id: &str, count: u64) {
        self.assets_total
            .with_label_values(&[organization_id])
            .set(count as f64);
    }

    pub fn set_reports(&self, organization_id: &str, state: &str, count: u64) {
        self.reports_total
            .with_label_values(&[organization_id, state])
            .set(count as f64);
    }

    pub fn set_program_present(&self, handle: &str) {
        self.programs_total.with_label_values(&[handle]).set(1.0);
    }

    pub fn set_invited_hackers(&self, organization_id: &str, state: &str, count: u64) {
        self.invited_hackers_total
            .with_label_values(&[organization_id, state])
            .set(count as f64);
    }

    pub fn set_weakness(&self, name: &str, id: &str, count: u64) {
        self.weaknesses_total
            .with_label_values(&[name, id])
            .set(count as f64);
    }

    pub fn set_weaknesses_dropped(&self, organization_id: &str, count: u64) {
        self.weaknesses_dropped
            .with_label_values(&[organization_id])
            .set(count as f64);
    }

    pub fn inc_scrape_errors(&self) {
        self.scrape_errors_total.inc();
    }

    /// Timer that observes into the duration histogram when dropped
    pub fn start_scrape_timer(&self) -> HistogramTimer {
        self.scrape_duration_seconds.start_timer()
    }

    /// Stamp scrape completion; the success marker only moves on clean scrapes
    pub fn mark_scrape_completed(&self, unix_seconds: f64, clean: bool) {
        self.last_scrape_timestamp.set(unix_seconds);
        if clean {
            self.last_successful_scrape_timestamp.set(unix_seconds);
        }
    }

    /// Encode all metrics in the Prometheus text format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        encoder.encode_to_string(&self.registry.gather())
    }

    /// Every exposed sample keyed by its series identifier,
    /// e.g. `hackerone_reports_total{organization_id="acme",state="new"}`.
    pub fn samples(&self) -> Result<BTreeMap<String, f64>, prometheus::Error> {
        let text = self.encode()?;
        Ok(text
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (series, value) = line.rsplit_once(' ')?;
                Some((series.to_string(), value.parse::<f64>().ok()?))
            })
            .collect())
    }

    /// Samples belonging to the per-scrape gauge families only
    pub fn gauge_samples(&self) -> Result<BTreeMap<String, f64>, prometheus::Error> {
        Ok(self
            .samples()?
            .into_iter()
            .filter(|(series, _)| {
                let name = series.split('{').next().unwrap_or(series);
                GAUGE_FAMILIES.contains(&name)
            })
            .collect())
    }
}
