// src/feed/types.rs
use std::fmt;
use std::str::FromStr;

use crate::feed::error::FeedError;

/// Fixed topical grouping used both to pick source feeds and to tag output items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technology,
    Sports,
    Business,
    Science,
    Health,
    Entertainment,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Technology,
        Category::Sports,
        Category::Business,
        Category::Science,
        Category::Health,
        Category::Entertainment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Technology => "technology",
            Category::Sports => "sports",
            Category::Business => "business",
            Category::Science => "science",
            Category::Health => "health",
            Category::Entertainment => "entertainment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = FeedError;

    // Path segments are matched exactly, like the route table they replace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| FeedError::UnknownCategory(s.to_string()))
    }
}

/// Normalized output record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    /// RFC 3339 when the source date parsed, otherwise the raw text.
    pub pubdate: String,
    pub description: String,
    /// Possibly empty.
    pub thumbnail_url: String,
    pub category: Category,
}

/// A `url`-carrying media element (`media:thumbnail`, `media:content`, `enclosure`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaRef {
    pub url: Option<String>,
}

impl MediaRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// One parsed feed entry, independent of the RSS/Atom dialect it came from.
/// Absent fields stay `None` / empty; extractors decide the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// RSS `pubDate`, Atom `published`.
    pub published: Option<String>,
    /// RSS `dc:date`, Atom `updated`.
    pub alt_published: Option<String>,
    /// RSS `description`, Atom `summary`.
    pub description: Option<String>,
    /// RSS `content:encoded`, Atom `content`.
    pub content: Option<String>,
    pub media_thumbnail: Vec<MediaRef>,
    pub media_content: Vec<MediaRef>,
    pub enclosures: Vec<MediaRef>,
}

/// Transport seam between extractors and the network.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    /// GET `url` and return the raw body. `user_agent` overrides the fetcher's default.
    async fn fetch(&self, url: &str, user_agent: Option<&str>) -> Result<Vec<u8>, FeedError>;

    fn name(&self) -> &'static str;
}
