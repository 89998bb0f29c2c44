// src/feed/extractors/profile.rs
//! Per-publisher rule table for the structured (parsed-feed) extractors.

use crate::date::normalize_pubdate;
use crate::feed::html::{after_last_anchor, first_img_src, strip_tags};
use crate::feed::types::{Category, FeedEntry, MediaRef, NewsItem};

/// Which date field(s) an extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PubdateRule {
    Published,
    /// `published`, then the alternate date when `published` is absent or empty.
    PublishedThenAlt,
}

/// How the raw description becomes the output description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionRule {
    /// Passed through untouched, markup included.
    Raw,
    Trimmed,
    StripTags,
    /// Text after the last `</a>` when present, otherwise tags stripped.
    AnchorTailOrStrip,
    /// Text after the last `</a>` when present, then tags stripped either way.
    AnchorTailThenStrip,
    /// Description, or the first content body when the description is empty.
    RawOrContent,
}

/// One candidate thumbnail source. A source that is *present* wins even if its url is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSource {
    MediaThumbnail,
    MediaContent,
    Enclosure,
    /// `src` of the first `<img>` embedded in the raw description.
    EmbeddedImg,
}

#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub browser_agent: bool,
    pub pubdate: PubdateRule,
    pub description: DescriptionRule,
    pub thumbnail: &'static [ThumbnailSource],
}

impl Profile {
    /// Map one parsed entry into a news item.
    pub fn apply(&self, entry: &FeedEntry, category: Category) -> NewsItem {
        let raw_desc = entry.description.as_deref().unwrap_or_default();
        NewsItem {
            title: entry.title.clone().unwrap_or_default(),
            link: entry.link.clone().unwrap_or_default(),
            pubdate: normalize_pubdate(self.raw_pubdate(entry)),
            description: self.description(entry, raw_desc),
            thumbnail_url: self.thumbnail(entry, raw_desc),
            category,
        }
    }

    fn raw_pubdate<'a>(&self, entry: &'a FeedEntry) -> &'a str {
        let published = entry.published.as_deref().unwrap_or_default();
        match self.pubdate {
            PubdateRule::Published => published,
            PubdateRule::PublishedThenAlt if published.is_empty() => {
                entry.alt_published.as_deref().unwrap_or_default()
            }
            PubdateRule::PublishedThenAlt => published,
        }
    }

    fn description(&self, entry: &FeedEntry, raw: &str) -> String {
        match self.description {
            DescriptionRule::Raw => raw.to_string(),
            DescriptionRule::Trimmed => raw.trim().to_string(),
            DescriptionRule::StripTags => strip_tags(raw).trim().to_string(),
            DescriptionRule::AnchorTailOrStrip => match after_last_anchor(raw) {
                Some(tail) => tail.trim().to_string(),
                None => strip_tags(raw).trim().to_string(),
            },
            DescriptionRule::AnchorTailThenStrip => {
                let text = after_last_anchor(raw).unwrap_or(raw);
                strip_tags(text).trim().to_string()
            }
            DescriptionRule::RawOrContent if raw.is_empty() => {
                entry.content.clone().unwrap_or_default()
            }
            DescriptionRule::RawOrContent => raw.to_string(),
        }
    }

    fn thumbnail(&self, entry: &FeedEntry, raw_desc: &str) -> String {
        for source in self.thumbnail {
            let found = match source {
                ThumbnailSource::MediaThumbnail => first_url(&entry.media_thumbnail),
                ThumbnailSource::MediaContent => first_url(&entry.media_content),
                ThumbnailSource::Enclosure => first_url(&entry.enclosures),
                ThumbnailSource::EmbeddedImg => first_img_src(raw_desc),
            };
            if let Some(url) = found {
                return url.to_string();
            }
        }
        String::new()
    }
}

/// `Some(url)` when the list is non-empty; an element without a url yields `Some("")`.
fn first_url(list: &[MediaRef]) -> Option<&str> {
    list.first()
        .map(|m| m.url.as_deref().unwrap_or_default())
}
