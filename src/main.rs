mod config;
mod fetcher;
mod normalize;
mod pipeline;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::fetcher::FeedFetcher;
use crate::pipeline::{start_background_refresh, FeedPipeline, Refresher};
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsfold=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("NEWSFOLD_CONFIG").unwrap_or_else(|_| "feeds.toml".to_string());
    let config = Config::load(&config_path)?;
    info!(
        "Loaded {} feeds in {} categories from configuration",
        config.feed_count(),
        config.categories.len()
    );

    let fetcher = FeedFetcher::new(Duration::from_secs(config.fetch_timeout));
    let pipeline = FeedPipeline::new(fetcher, config.max_concurrent_fetches);
    let refresher = Arc::new(Refresher::new(pipeline, config.categories.clone()));

    // One-shot static export: aggregate once, write the page, exit
    if std::env::args().nth(1).as_deref() == Some("export") {
        let output = std::env::args()
            .nth(2)
            .unwrap_or_else(|| "newsfold.html".to_string());

        refresher.refresh().await;
        let snapshot = refresher.latest().await;
        let html = routes::render_index(&snapshot, true)?;
        std::fs::write(&output, html)?;
        info!("Wrote aggregated page to {}", output);
        return Ok(());
    }

    // Start background refresh task
    let bg_refresher = refresher.clone();
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        start_background_refresh(bg_refresher, refresh_interval).await;
    });

    // Create app state
    let state = Arc::new(AppState { refresher });

    // Build router
    let app = Router::new()
        .route("/", get(routes::index))
        .route("/refresh", post(routes::refresh))
        .route("/refresh/status", get(routes::refresh_status))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Server starting on http://localhost:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
