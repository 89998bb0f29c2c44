// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod date;
pub mod feed;
pub mod registry;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{AggregateSettings, Aggregator};
pub use crate::api::{router, AppState};
pub use crate::feed::{Category, Extractor, FeedError, NewsItem};
pub use crate::registry::{Registry, RegistryMode, SourceEntry};
pub use crate::telemetry::init_tracing;
