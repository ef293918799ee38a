// Per-scrape aggregation
pub mod scrape_result;

// Scrape orchestrator
pub mod scraper;
