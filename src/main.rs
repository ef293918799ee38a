//! HackerOne Exporter - republishes HackerOne program counts as Prometheus metrics
//!
//! Every `GET /metrics` runs one scrape against the HackerOne API and returns
//! the result in the Prometheus text format.
//!
//! # Usage
//! ```sh
//! HACKERONE_API_USER=... HACKERONE_API_PASSWORD=... HACKERONE_ORG_ID=... \
//!     cargo run -- --port 8080
//! ```
//!
//! `MODE=mock` serves a built-in demo dataset without touching the network.

use anyhow::{Context, Result};
use clap::Parser;
use hackerone_exporter::application::scraper::{ScrapeSettings, Scraper};
use hackerone_exporter::config::{Config, ConfigOverrides, Mode};
use hackerone_exporter::domain::ports::BountyPlatform;
use hackerone_exporter::infrastructure::core::HttpClientFactory;
use hackerone_exporter::infrastructure::hackerone::HackerOneClient;
use hackerone_exporter::infrastructure::mock::{MockBountyPlatform, MockDataset};
use hackerone_exporter::infrastructure::observability::Metrics;
use hackerone_exporter::interfaces::http::build_router;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "hackerone-exporter",
    version,
    about = "Export HackerOne metrics to Prometheus"
)]
struct Cli {
    /// HackerOne API username
    #[arg(long, env = "HACKERONE_API_USER")]
    api_user: Option<String>,

    /// HackerOne API password
    #[arg(long, env = "HACKERONE_API_PASSWORD", hide_env_values = true)]
    api_password: Option<String>,

    /// HackerOne organization ID
    #[arg(long, env = "HACKERONE_ORG_ID")]
    org_id: Option<String>,

    /// HackerOne API base URL
    #[arg(long, env = "HACKERONE_API_URL")]
    api_url: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Log level: trace, debug, info, warn or error (overrides LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,

    /// Read environment variables from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_user: self.api_user.clone(),
            api_password: self.api_password.clone(),
            organization_id: self.org_id.clone(),
            api_url: self.api_url.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let config = Config::load(cli.overrides()).context("Invalid configuration")?;

    init_tracing(&config.log_level);

    info!(
        "HackerOne Exporter {} starting (port={}, log_level={}, organization_id={}, mode={:?})",
        env!("CARGO_PKG_VERSION"),
        config.port,
        config.log_level,
        config.organization_id,
        config.mode
    );

    let platform = build_platform(&config)?;
    let scraper = Arc::new(Scraper::new(
        platform,
        Metrics::new().context("Failed to create metrics registry")?,
        ScrapeSettings {
            organization_id: config.organization_id.clone(),
            timeout: config.scrape_timeout,
            weakness_label_limit: config.weakness_label_limit,
        },
    ));

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, build_router(scraper))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Exporter stopped");
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn build_platform(config: &Config) -> Result<Arc<dyn BountyPlatform>> {
    match config.mode {
        Mode::Mock => {
            warn!("MODE=mock: serving the built-in demo dataset");
            Ok(Arc::new(MockBountyPlatform::new(MockDataset::demo())))
        }
        Mode::HackerOne => {
            let mut builder = HackerOneClient::builder()
                .http_client(HttpClientFactory::create_client(
                    config.http_timeout,
                    config.http_max_retries,
                ))
                .username(config.api_user.clone())
                .password(config.api_password.clone())
                .base_url(config.api_url.clone());
            if config.follow_pagination {
                builder = builder.follow_pagination(config.max_pages);
            }
            Ok(Arc::new(builder.build()?))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
