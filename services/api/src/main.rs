mod config;
mod error;
mod routes;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use review_source::HttpReviewSource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::routes::{router, AppState};

/// HTTP front end for review analytics
#[derive(Parser, Debug)]
#[command(name = "api", version)]
struct Args {
    /// TOML config; built-in defaults are used when the file is missing
    #[arg(long, env = "REVIEWS_CONFIG", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(&args.config).with_context(|| format!("failed loading {}", args.config.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let source = HttpReviewSource::new(&config.source.endpoint, config.timeout())
        .context("failed building review source client")?;
    tracing::info!("review source: {}", config.source.endpoint);

    let (host, port) = (config.server.host.clone(), config.server.port);
    let app = router(AppState::new(source, config));

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed binding {}:{}", host, port))?;
    tracing::info!("listening on http://{}:{}", host, port);
    axum::serve(listener, app).await?;
    Ok(())
}
