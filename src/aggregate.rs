// src/aggregate.rs
//! Category aggregator: fan out over a category's sources, merge, rank, truncate.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::config::AppConfig;
use crate::feed::error::FeedError;
use crate::feed::types::{Category, FeedFetcher, NewsItem};
use crate::registry::{Registry, RegistryMode, SourceEntry};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "aggregate_requests_total",
            "Category aggregations started."
        );
        describe_counter!("feed_items_total", "Items extracted from sources.");
        describe_counter!(
            "feed_source_errors_total",
            "Sources that failed or timed out."
        );
        describe_histogram!("feed_source_ms", "Per-source fetch + extract time in ms.");
        describe_histogram!("feed_parse_ms", "Structured feed parse time in ms.");
    });
}

/// Knobs the aggregator reads from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AggregateSettings {
    pub fetch_timeout: Duration,
    pub max_concurrency: usize,
    pub isolate_failures: bool,
    pub registry_mode: RegistryMode,
    pub browser_user_agent: String,
}

impl From<&AppConfig> for AggregateSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            fetch_timeout: Duration::from_millis(cfg.fetch_timeout_ms),
            max_concurrency: cfg.max_concurrency.max(1),
            isolate_failures: cfg.isolate_failures,
            registry_mode: cfg.registry_mode,
            browser_user_agent: cfg.browser_user_agent.clone(),
        }
    }
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

pub struct Aggregator {
    fetcher: Arc<dyn FeedFetcher>,
    registry: Registry,
    settings: AggregateSettings,
}

impl Aggregator {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        registry: Registry,
        settings: AggregateSettings,
    ) -> Self {
        Self {
            fetcher,
            registry,
            settings,
        }
    }

    /// Fetch every source registered for `category`, merge, rank newest first, keep `limit`.
    ///
    /// With isolation on, failing sources are logged and skipped; otherwise the first failure
    /// (in registry order) is returned.
    pub async fn aggregate(
        &self,
        category: Category,
        limit: usize,
    ) -> Result<Vec<NewsItem>, FeedError> {
        ensure_metrics_described();
        counter!("aggregate_requests_total", "category" => category.as_str()).increment(1);

        let entries = self
            .registry
            .entries(category, self.settings.registry_mode)?;
        let sources = entries.len();

        // `buffered` keeps registry order in the output while running up to N at once.
        let results: Vec<Result<Vec<NewsItem>, FeedError>> = stream::iter(entries)
            .map(|entry| self.run_source(entry, category))
            .buffered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        let mut merged = Vec::new();
        let mut failed = 0usize;
        for res in results {
            match res {
                Ok(mut items) => merged.append(&mut items),
                Err(e) if self.settings.isolate_failures => {
                    failed += 1;
                    tracing::warn!(%category, error = %e, kind = e.kind(), "source skipped");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            %category,
            sources,
            failed,
            merged = merged.len(),
            limit,
            "category aggregated"
        );
        Ok(rank(merged, limit))
    }

    async fn run_source(
        &self,
        entry: SourceEntry,
        category: Category,
    ) -> Result<Vec<NewsItem>, FeedError> {
        let deadline = self.settings.fetch_timeout;
        let fut = entry.extractor.run(
            self.fetcher.as_ref(),
            &entry.url,
            category,
            &self.settings.browser_user_agent,
        );
        let res = match tokio::time::timeout(deadline, fut).await {
            Ok(res) => res,
            Err(_) => Err(FeedError::Timeout {
                url: entry.url.clone(),
                after_ms: deadline.as_millis() as u64,
            }),
        };
        if let Err(e) = &res {
            counter!(
                "feed_source_errors_total",
                "extractor" => entry.extractor.name(),
                "kind" => e.kind()
            )
            .increment(1);
            tracing::debug!(
                extractor = %entry.extractor,
                fetcher = self.fetcher.name(),
                url = %entry.url,
                error = %e,
                "source failed"
            );
        }
        res
    }
}

/// Sort newest first and keep `limit` items.
pub fn rank(mut items: Vec<NewsItem>, limit: usize) -> Vec<NewsItem> {
    sort_by_pubdate_desc(&mut items);
    items.truncate(limit);
    items
}

/// Chronological, newest first. RFC 3339 dates are compared as instants and offset-less
/// `YYYY-MM-DDTHH:MM:SS` dates count as UTC; raw (unparsed) dates go after all of them, in
/// descending string order. Stable.
pub fn sort_by_pubdate_desc(items: &mut Vec<NewsItem>) {
    let mut keyed: Vec<(Option<DateTime<FixedOffset>>, NewsItem)> = items
        .drain(..)
        .map(|it| (instant(&it.pubdate), it))
        .collect();
    keyed.sort_by(|(ka, a), (kb, b)| {
        compare_desc(ka.as_ref(), &a.pubdate, kb.as_ref(), &b.pubdate)
    });
    items.extend(keyed.into_iter().map(|(_, it)| it));
}

fn instant(pubdate: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(pubdate).ok().or_else(|| {
        NaiveDateTime::parse_from_str(pubdate, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

fn compare_desc(
    ka: Option<&DateTime<FixedOffset>>,
    raw_a: &str,
    kb: Option<&DateTime<FixedOffset>>,
    raw_b: &str,
) -> Ordering {
    match (ka, kb) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => raw_b.cmp(raw_a),
    }
}
