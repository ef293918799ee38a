//! Pull-based observability for the exporter
//!
//! Metrics live in an explicitly owned [`Metrics`] registry that is handed to
//! the scraper; nothing is registered in the process-global default registry.

pub mod metrics;

pub use metrics::Metrics;
