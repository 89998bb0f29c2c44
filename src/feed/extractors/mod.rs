// src/feed/extractors/mod.rs
//! Publisher extractors. Each variant of [`Extractor`] is one publisher's rule set; dispatch is
//! a plain `match`, so adding a publisher means adding a variant and a profile row.

pub mod profile;
pub mod techcrunch;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use metrics::{counter, histogram};

use crate::feed::error::FeedError;
use crate::feed::html::decode_utf8_ignoring_invalid;
use crate::feed::parse::parse_feed;
use crate::feed::types::{Category, FeedFetcher, NewsItem};

use self::profile::{DescriptionRule as D, Profile, PubdateRule as P, ThumbnailSource as T};

/// Hard cap on items taken from a single source.
pub const PER_SOURCE_CAP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extractor {
    Wired,
    IndiaToday,
    Cnbc,
    Firstpost,
    HindustanTimes,
    NyTimes,
    Mint,
    Ndtv,
    IndianExpress,
    Toi,
    TheHindu,
    Bbc,
    TechCrunch,
}

/// How an extractor reads its feed.
#[derive(Debug, Clone, Copy)]
pub enum Strategy {
    /// Parsed document + rule profile.
    Structured(Profile),
    /// Regex scan over the raw body.
    RawXml,
}

const WIRED: Profile = Profile {
    browser_agent: false,
    pubdate: P::Published,
    description: D::Raw,
    thumbnail: &[T::MediaThumbnail, T::MediaContent],
};
const INDIATODAY: Profile = Profile {
    browser_agent: false,
    pubdate: P::Published,
    description: D::AnchorTailOrStrip,
    thumbnail: &[T::EmbeddedImg, T::MediaThumbnail],
};
const CNBC: Profile = Profile {
    browser_agent: false,
    pubdate: P::Published,
    description: D::Raw,
    thumbnail: &[],
};
const FIRSTPOST: Profile = Profile {
    browser_agent: false,
    pubdate: P::Published,
    description: D::Raw,
    thumbnail: &[T::MediaContent, T::MediaThumbnail],
};
const HINDUSTANTIMES: Profile = Profile {
    browser_agent: false,
    pubdate: P::Published,
    description: D::StripTags,
    thumbnail: &[T::MediaContent],
};
const NYTIMES: Profile = HINDUSTANTIMES;
const MINT: Profile = Profile {
    browser_agent: true,
    pubdate: P::PublishedThenAlt,
    description: D::Trimmed,
    thumbnail: &[T::MediaContent, T::MediaThumbnail],
};
const NDTV: Profile = Profile {
    browser_agent: true,
    pubdate: P::PublishedThenAlt,
    description: D::RawOrContent,
    thumbnail: &[T::MediaContent, T::MediaThumbnail],
};
const INDIANEXPRESS: Profile = Profile {
    browser_agent: true,
    pubdate: P::PublishedThenAlt,
    description: D::RawOrContent,
    thumbnail: &[T::MediaThumbnail, T::MediaContent],
};
const TOI: Profile = Profile {
    browser_agent: true,
    pubdate: P::PublishedThenAlt,
    description: D::AnchorTailThenStrip,
    thumbnail: &[T::Enclosure, T::EmbeddedImg],
};
const THEHINDU: Profile = Profile {
    browser_agent: true,
    pubdate: P::PublishedThenAlt,
    description: D::Raw,
    thumbnail: &[T::MediaContent],
};
const BBC: Profile = Profile {
    browser_agent: true,
    pubdate: P::PublishedThenAlt,
    description: D::Raw,
    thumbnail: &[T::MediaThumbnail, T::MediaContent],
};

impl Extractor {
    pub const ALL: [Extractor; 13] = [
        Extractor::Wired,
        Extractor::IndiaToday,
        Extractor::Cnbc,
        Extractor::Firstpost,
        Extractor::HindustanTimes,
        Extractor::NyTimes,
        Extractor::Mint,
        Extractor::Ndtv,
        Extractor::IndianExpress,
        Extractor::Toi,
        Extractor::TheHindu,
        Extractor::Bbc,
        Extractor::TechCrunch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Extractor::Wired => "wired",
            Extractor::IndiaToday => "indiatoday",
            Extractor::Cnbc => "cnbc",
            Extractor::Firstpost => "firstpost",
            Extractor::HindustanTimes => "hindustantimes",
            Extractor::NyTimes => "nytimes",
            Extractor::Mint => "mint",
            Extractor::Ndtv => "ndtv",
            Extractor::IndianExpress => "indianexpress",
            Extractor::Toi => "toi",
            Extractor::TheHindu => "thehindu",
            Extractor::Bbc => "bbc",
            Extractor::TechCrunch => "techcrunch",
        }
    }

    pub fn strategy(self) -> Strategy {
        match self {
            Extractor::Wired => Strategy::Structured(WIRED),
            Extractor::IndiaToday => Strategy::Structured(INDIATODAY),
            Extractor::Cnbc => Strategy::Structured(CNBC),
            Extractor::Firstpost => Strategy::Structured(FIRSTPOST),
            Extractor::HindustanTimes => Strategy::Structured(HINDUSTANTIMES),
            Extractor::NyTimes => Strategy::Structured(NYTIMES),
            Extractor::Mint => Strategy::Structured(MINT),
            Extractor::Ndtv => Strategy::Structured(NDTV),
            Extractor::IndianExpress => Strategy::Structured(INDIANEXPRESS),
            Extractor::Toi => Strategy::Structured(TOI),
            Extractor::TheHindu => Strategy::Structured(THEHINDU),
            Extractor::Bbc => Strategy::Structured(BBC),
            Extractor::TechCrunch => Strategy::RawXml,
        }
    }

    /// Whether the publisher needs a browser-like User-Agent.
    pub fn needs_browser_agent(self) -> bool {
        match self.strategy() {
            Strategy::Structured(p) => p.browser_agent,
            Strategy::RawXml => true,
        }
    }

    /// Turn an already-fetched body into at most [`PER_SOURCE_CAP`] items, in feed order.
    pub fn extract(
        self,
        url: &str,
        body: &[u8],
        category: Category,
    ) -> Result<Vec<NewsItem>, FeedError> {
        let text = decode_utf8_ignoring_invalid(body);
        match self.strategy() {
            Strategy::RawXml => Ok(techcrunch::extract_raw(&text, category, PER_SOURCE_CAP)),
            Strategy::Structured(profile) => {
                let entries = parse_feed(&text).map_err(|e| FeedError::Parse {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(entries
                    .iter()
                    .take(PER_SOURCE_CAP)
                    .map(|e| profile.apply(e, category))
                    .collect())
            }
        }
    }

    /// Fetch `url` and extract it.
    pub async fn run(
        self,
        fetcher: &dyn FeedFetcher,
        url: &str,
        category: Category,
        browser_user_agent: &str,
    ) -> Result<Vec<NewsItem>, FeedError> {
        let t0 = Instant::now();
        let ua = self.needs_browser_agent().then_some(browser_user_agent);
        let body = fetcher.fetch(url, ua).await?;
        let items = self.extract(url, &body, category)?;

        histogram!("feed_source_ms", "extractor" => self.name())
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("feed_items_total", "extractor" => self.name()).increment(items.len() as u64);
        tracing::debug!(
            extractor = self.name(),
            url,
            items = items.len(),
            "source extracted"
        );
        Ok(items)
    }
}

impl fmt::Display for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Extractor {
    type Err = String;

    /// Case-insensitive; the legacy `<name>_parser` spelling is accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let key = lower.strip_suffix("_parser").unwrap_or(&lower);
        Extractor::ALL
            .into_iter()
            .find(|e| e.name() == key)
            .ok_or_else(|| format!("unknown extractor: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rss(items: &str) -> Vec<u8> {
        format!(
            r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/"><channel>{items}</channel></rss>"#
        )
        .into_bytes()
    }

    #[test]
    fn names_round_trip_and_accept_legacy_suffix() {
        for e in Extractor::ALL {
            assert_eq!(e.name().parse::<Extractor>().unwrap(), e);
        }
        assert_eq!("TOI_parser".parse::<Extractor>().unwrap(), Extractor::Toi);
        assert!("reuters".parse::<Extractor>().is_err());
    }

    #[test]
    fn browser_agent_publishers() {
        let spoofed: Vec<_> = Extractor::ALL
            .into_iter()
            .filter(|e| e.needs_browser_agent())
            .map(Extractor::name)
            .collect();
        assert_eq!(
            spoofed,
            vec!["mint", "ndtv", "indianexpress", "toi", "thehindu", "bbc", "techcrunch"]
        );
    }

    #[test]
    fn indiatoday_prefers_embedded_image_over_media_thumbnail() {
        let body = rss(
            r#"<item><title>t</title>
               <description>&lt;a href="/s"&gt;&lt;img src="X"&gt;&lt;/a&gt; Story text</description>
               <media:thumbnail url="Y"/></item>"#,
        );
        let items = Extractor::IndiaToday
            .extract("u", &body, Category::Sports)
            .unwrap();
        assert_eq!(items[0].thumbnail_url, "X");
        assert_eq!(items[0].description, "Story text");
    }

    #[test]
    fn toi_prefers_enclosure_over_embedded_image() {
        let body = rss(
            r#"<item><title>t</title>
               <description>&lt;a href="/s"&gt;&lt;img src="https://img/inline.jpg"&gt;&lt;/a&gt;Match &lt;b&gt;report&lt;/b&gt;</description>
               <enclosure url="https://img/enclosure.jpg" type="image/jpeg"/></item>"#,
        );
        let items = Extractor::Toi.extract("u", &body, Category::Sports).unwrap();
        assert_eq!(items[0].thumbnail_url, "https://img/enclosure.jpg");
        assert_eq!(items[0].description, "Match report");
    }

    #[test]
    fn cnbc_never_has_a_thumbnail() {
        let body = rss(r#"<item><title>t</title><media:thumbnail url="Y"/><media:content url="Z"/></item>"#);
        let items = Extractor::Cnbc.extract("u", &body, Category::Business).unwrap();
        assert_eq!(items[0].thumbnail_url, "");
    }

    #[test]
    fn structured_extractors_cap_at_ten() {
        let many: String = (0..25)
            .map(|i| format!("<item><title>n{i}</title></item>"))
            .collect();
        let body = rss(&many);
        for e in Extractor::ALL {
            let items = e.extract("u", &body, Category::Technology).unwrap();
            assert!(items.len() <= PER_SOURCE_CAP, "{e} returned {}", items.len());
        }
    }

    #[test]
    fn unparseable_body_is_a_parse_error() {
        let err = Extractor::Wired
            .extract("https://w/feed", b"<rss><channel><item>", Category::Science)
            .unwrap_err();
        assert!(matches!(err, FeedError::Parse { .. }));
    }

    const DESC_WITH_IMG: &str =
        r#"<description><![CDATA[<a href="/s"><img src="I"></a> text]]></description>"#;

    fn thumbnails(body: &[u8]) -> Vec<(Extractor, String)> {
        Extractor::ALL
            .into_iter()
            .map(|e| {
                let items = e.extract("u", body, Category::Technology).unwrap();
                (e, items[0].thumbnail_url.clone())
            })
            .collect()
    }

    #[test]
    fn thumbnail_priority_with_every_source_present() {
        let body = rss(&format!(
            r#"<item><title>t</title>{DESC_WITH_IMG}
               <media:thumbnail url="T"/><media:content url="C"/>
               <enclosure url="E" type="image/jpeg"/></item>"#
        ));
        let expected = [
            (Extractor::Wired, "T"),
            (Extractor::IndiaToday, "I"),
            (Extractor::Cnbc, ""),
            (Extractor::Firstpost, "C"),
            (Extractor::HindustanTimes, "C"),
            (Extractor::NyTimes, "C"),
            (Extractor::Mint, "C"),
            (Extractor::Ndtv, "C"),
            (Extractor::IndianExpress, "T"),
            (Extractor::Toi, "E"),
            (Extractor::TheHindu, "C"),
            (Extractor::Bbc, "T"),
            (Extractor::TechCrunch, "C"),
        ];
        let got = thumbnails(&body);
        for ((e, thumb), (want_e, want)) in got.iter().zip(expected) {
            assert_eq!(*e, want_e);
            assert_eq!(thumb, want, "{e}");
        }
    }

    #[test]
    fn thumbnail_priority_falls_through_to_lower_sources() {
        // no media:content, no enclosure
        let body = rss(&format!(
            r#"<item><title>t</title>{DESC_WITH_IMG}<media:thumbnail url="T"/></item>"#
        ));
        let expected = [
            (Extractor::Wired, "T"),
            (Extractor::IndiaToday, "I"),
            (Extractor::Cnbc, ""),
            (Extractor::Firstpost, "T"),
            (Extractor::HindustanTimes, ""),
            (Extractor::NyTimes, ""),
            (Extractor::Mint, "T"),
            (Extractor::Ndtv, "T"),
            (Extractor::IndianExpress, "T"),
            (Extractor::Toi, "I"),
            (Extractor::TheHindu, ""),
            (Extractor::Bbc, "T"),
            (Extractor::TechCrunch, "I"),
        ];
        let got = thumbnails(&body);
        for ((e, thumb), (want_e, want)) in got.iter().zip(expected) {
            assert_eq!(*e, want_e);
            assert_eq!(thumb, want, "{e}");
        }
    }
}
