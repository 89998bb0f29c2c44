//! News Aggregator: binary entrypoint
//! Boots the Axum HTTP server: config, live fetcher, aggregator, routes, middleware.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use newsfeed_aggregator::feed::{FeedFetcher, HttpFetcher};
use newsfeed_aggregator::telemetry::Metrics;
use newsfeed_aggregator::{config, init_tracing, router, AppState};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = config::load_default().context("loading config")?;
    tracing::info!(
        fetch_timeout_ms = cfg.fetch_timeout_ms,
        max_concurrency = cfg.max_concurrency,
        isolate_failures = cfg.isolate_failures,
        registry_mode = ?cfg.registry_mode,
        "config loaded"
    );

    let fetcher = HttpFetcher::new(
        Duration::from_millis(cfg.fetch_timeout_ms),
        cfg.default_user_agent.clone(),
    )
    .context("building feed fetcher")?;
    tracing::info!(fetcher = fetcher.name(), "feed fetcher ready");

    // Prometheus is optional; the API works without it.
    let metrics = match Metrics::init(&cfg) {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = %e, "metrics disabled");
            None
        }
    };

    let state = AppState::with_fetcher(Arc::new(fetcher), cfg);
    let mut app = router(state);
    if let Some(m) = metrics {
        app = app.merge(m.router());
    }

    Ok(app.into())
}
