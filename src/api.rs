use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::aggregate::{AggregateSettings, Aggregator};
use crate::config::AppConfig;
use crate::feed::error::FeedError;
use crate::feed::types::{Category, FeedFetcher, NewsItem};
use crate::registry::Registry;

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(aggregator: Aggregator, config: AppConfig) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            config: Arc::new(config),
        }
    }

    /// Built-in registry, settings taken from `config`.
    pub fn with_fetcher(fetcher: Arc<dyn FeedFetcher>, config: AppConfig) -> Self {
        let settings = AggregateSettings::from(&config);
        Self::new(Aggregator::new(fetcher, Registry::builtin(), settings), config)
    }
}

/// `GET /` plus one `GET /{category}` per category. No `/health` route: `health` is a category.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/{category}", get(category_news))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct LimitQuery {
    limit: Option<i64>,
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "API is up!" }))
}

async fn category_news(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let category: Category = category.parse()?;
    let limit = state.config.effective_limit(q.limit);
    let items = state.aggregator.aggregate(category, limit).await?;
    Ok(Json(items))
}

/// Maps feed errors onto HTTP responses with a `{"detail": ...}` body.
pub struct ApiError(FeedError);

impl From<FeedError> for ApiError {
    fn from(e: FeedError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            FeedError::UnknownCategory(_) => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            other => {
                tracing::error!(error = %other, kind = other.kind(), "category request failed");
                (StatusCode::BAD_GATEWAY, other.to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
