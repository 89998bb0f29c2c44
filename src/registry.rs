//! # Source Registry
//!
//! Static mapping from [`Category`] to its list of `(extractor, feed URL)` pairs.
//!
//! The table keeps every registration, duplicates included. Several categories register the
//! same publisher more than once with different URLs; how those duplicates are treated is a
//! [`RegistryMode`]:
//! - `All`: every entry is fetched (default).
//! - `LastWins`: one entry per extractor, positioned at its first registration but using its
//!   last URL. This reproduces a keyed-map table where re-registering overwrote the URL.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::feed::error::FeedError;
use crate::feed::extractors::Extractor;
use crate::feed::types::Category;

use Extractor::*;

/// One registered feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub extractor: Extractor,
    pub url: String,
}

impl SourceEntry {
    pub fn new(extractor: Extractor, url: impl Into<String>) -> Self {
        Self {
            extractor,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryMode {
    #[default]
    All,
    LastWins,
}

impl std::str::FromStr for RegistryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(RegistryMode::All),
            "last_wins" => Ok(RegistryMode::LastWins),
            other => Err(format!("unknown registry mode: {other}")),
        }
    }
}

const TECHNOLOGY: &[(Extractor, &str)] = &[
    (Wired, "https://www.wired.com/feed/tag/ai/latest/rss"),
    (TechCrunch, "https://techcrunch.com/feed/"),
    (Cnbc, "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=19854910"),
    (Firstpost, "https://www.firstpost.com/commonfeeds/v1/mfp/rss/tech.xml"),
    (HindustanTimes, "https://www.hindustantimes.com/feeds/rss/technology/rssfeed.xml"),
    (NyTimes, "https://rss.nytimes.com/services/xml/rss/nyt/Technology.xml"),
    (Mint, "https://www.livemint.com/rss/AI"),
    (Mint, "https://www.livemint.com/rss/technology"),
    (Ndtv, "https://feeds.feedburner.com/gadgets360-latest"),
    (IndianExpress, "https://indianexpress.com/section/technology/feed/"),
    (Bbc, "http://feeds.bbci.co.uk/news/technology/rss.xml"),
    (TechCrunch, "https://techcrunch.com/feed/"),
];

const SPORTS: &[(Extractor, &str)] = &[
    (IndiaToday, "https://www.indiatoday.in/rss/1206550"),
    (Firstpost, "https://www.firstpost.com/commonfeeds/v1/mfp/rss/sports.xml"),
    (IndianExpress, "https://indianexpress.com/section/sports/cricket/feed/"),
    (HindustanTimes, "https://www.hindustantimes.com/feeds/rss/sports/rssfeed.xml"),
    (NyTimes, "https://rss.nytimes.com/services/xml/rss/nyt/Sports.xml"),
    (Mint, "https://www.livemint.com/rss/sports"),
    (Ndtv, "https://feeds.feedburner.com/ndtvsports-latest"),
    (IndianExpress, "https://indianexpress.com/section/sports/feed/"),
    (Toi, "http://timesofindia.indiatimes.com/rssfeeds/54829575.cms"),
    (Toi, "http://timesofindia.indiatimes.com/rssfeeds/4719148.cms"),
    (TheHindu, "https://www.thehindu.com/sport/cricket/feeder/default.rss"),
    (TheHindu, "https://www.thehindu.com/sport/other-sports/feeder/default.rss"),
];

const BUSINESS: &[(Extractor, &str)] = &[
    (Wired, "https://www.wired.com/feed/category/business/latest/rss"),
    (Cnbc, "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=10001147"),
    (Firstpost, "https://www.firstpost.com/commonfeeds/v1/mfp/rss/business.xml"),
    (HindustanTimes, "https://www.hindustantimes.com/feeds/rss/business/rssfeed.xml"),
    (NyTimes, "https://rss.nytimes.com/services/xml/rss/nyt/Business.xml"),
    (NyTimes, "https://rss.nytimes.com/services/xml/rss/nyt/SmallBusiness.xml"),
    (Mint, "https://www.livemint.com/rss/companies"),
    (Mint, "https://www.livemint.com/rss/markets"),
    (Ndtv, "https://feeds.feedburner.com/ndtvprofit-latest"),
    (Toi, "http://timesofindia.indiatimes.com/rssfeeds/1898055.cms"),
    (TheHindu, "https://www.thehindu.com/business/agri-business/feeder/default.rss"),
    (TheHindu, "https://www.thehindu.com/business/Industry/feeder/default.rss"),
    (TheHindu, "https://www.thehindu.com/business/Economy/feeder/default.rss"),
    (Bbc, "http://feeds.bbci.co.uk/news/business/rss.xml"),
];

const SCIENCE: &[(Extractor, &str)] = &[
    (Wired, "https://www.wired.com/feed/category/science/latest/rss"),
    (HindustanTimes, "https://www.hindustantimes.com/feeds/rss/science/rssfeed.xml"),
    (NyTimes, "https://rss.nytimes.com/services/xml/rss/nyt/Science.xml"),
    (NyTimes, "https://rss.nytimes.com/services/xml/rss/nyt/Climate.xml"),
    (NyTimes, "https://rss.nytimes.com/services/xml/rss/nyt/Space.xml"),
    (Mint, "https://www.livemint.com/rss/science"),
    (IndianExpress, "https://indianexpress.com/section/technology/science/feed/"),
    (Toi, "http://timesofindia.indiatimes.com/rssfeeds/-2128672765.cms"),
    (Bbc, "http://feeds.bbci.co.uk/news/science_and_environment/rss.xml"),
];

const HEALTH: &[(Extractor, &str)] = &[
    (Bbc, "http://feeds.bbci.co.uk/news/health/rss.xml"),
    (IndianExpress, "https://indianexpress.com/section/lifestyle/health/feed/"),
    (IndianExpress, "https://indianexpress.com/section/health-wellness/feed/"),
    (Ndtv, "https://feeds.feedburner.com/ndtvcooks-latest"),
    (NyTimes, "https://rss.nytimes.com/services/xml/rss/nyt/Health.xml"),
    (NyTimes, "https://rss.nytimes.com/services/xml/rss/nyt/Well.xml"),
    (HindustanTimes, "https://www.hindustantimes.com/feeds/rss/lifestyle/health/rssfeed.xml"),
    (Firstpost, "https://www.firstpost.com/commonfeeds/v1/mfp/rss/health.xml"),
    (Cnbc, "https://search.cnbc.com/rs/search/combinedcms/view.xml?partnerId=wrss01&id=10000108"),
];

const ENTERTAINMENT: &[(Extractor, &str)] = &[
    (Firstpost, "https://www.firstpost.com/commonfeeds/v1/mfp/rss/entertainment.xml"),
    (HindustanTimes, "https://www.hindustantimes.com/feeds/rss/entertainment/rssfeed.xml"),
    (HindustanTimes, "https://www.hindustantimes.com/feeds/rss/entertainment/bollywood/rssfeed.xml"),
    (HindustanTimes, "https://www.hindustantimes.com/feeds/rss/entertainment/music/rssfeed.xml"),
    (HindustanTimes, "https://www.hindustantimes.com/feeds/rss/entertainment/hollywood/rssfeed.xml"),
    (IndianExpress, "https://indianexpress.com/section/entertainment/bigg-boss/feed/"),
    (IndianExpress, "https://indianexpress.com/section/entertainment/feed/"),
    (IndianExpress, "https://indianexpress.com/section/entertainment/movie-review/feed/"),
    (Toi, "http://timesofindia.indiatimes.com/rssfeeds/1081479906.cms"),
    (Bbc, "http://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml"),
    (TheHindu, "https://www.thehindu.com/entertainment/art/feeder/default.rss"),
    (TheHindu, "https://www.thehindu.com/entertainment/dance/feeder/default.rss"),
];

/// Category → source table. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tables: HashMap<Category, Vec<SourceEntry>>,
}

impl Registry {
    /// The built-in publisher table.
    pub fn builtin() -> Self {
        let mut tables = HashMap::new();
        for (cat, rows) in [
            (Category::Technology, TECHNOLOGY),
            (Category::Sports, SPORTS),
            (Category::Business, BUSINESS),
            (Category::Science, SCIENCE),
            (Category::Health, HEALTH),
            (Category::Entertainment, ENTERTAINMENT),
        ] {
            let entries = rows
                .iter()
                .map(|&(extractor, url)| SourceEntry::new(extractor, url))
                .collect();
            tables.insert(cat, entries);
        }
        Self { tables }
    }

    /// Build a registry from explicit tables.
    pub fn from_tables(tables: impl IntoIterator<Item = (Category, Vec<SourceEntry>)>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
        }
    }

    /// Every registration for `category`, duplicates included, in registration order.
    pub fn registered(&self, category: Category) -> Result<&[SourceEntry], FeedError> {
        self.tables
            .get(&category)
            .map(Vec::as_slice)
            .ok_or_else(|| FeedError::UnknownCategory(category.to_string()))
    }

    /// The entries that will actually be fetched for `category` under `mode`.
    pub fn entries(
        &self,
        category: Category,
        mode: RegistryMode,
    ) -> Result<Vec<SourceEntry>, FeedError> {
        let rows = self.registered(category)?;
        Ok(match mode {
            RegistryMode::All => rows.to_vec(),
            RegistryMode::LastWins => last_wins(rows),
        })
    }
}

fn last_wins(rows: &[SourceEntry]) -> Vec<SourceEntry> {
    let mut out: Vec<SourceEntry> = Vec::with_capacity(rows.len());
    for row in rows {
        match out.iter_mut().find(|e| e.extractor == row.extractor) {
            Some(existing) => existing.url.clone_from(&row.url),
            None => out.push(row.clone()),
        }
    }
    out
}
