// src/feed/mod.rs
//! Feed layer: fetching, parsing, and per-publisher normalization into [`NewsItem`]s.

pub mod error;
pub mod extractors;
pub mod fetch;
pub mod html;
pub mod parse;
pub mod types;

pub use error::FeedError;
pub use extractors::{Extractor, PER_SOURCE_CAP};
pub use fetch::{FixtureFetcher, HttpFetcher};
pub use types::{Category, FeedEntry, FeedFetcher, MediaRef, NewsItem};
