// src/feed/extractors/techcrunch.rs
//! TechCrunch is read straight off the raw bytes with regexes, not through the XML parser.
//! Its feed is scanned `<item>` block by `<item>` block; only CDATA descriptions are taken.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::date::normalize_pubdate;
use crate::feed::html::first_img_src;
use crate::feed::types::{Category, NewsItem};

static RE_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<item>(.*?)</item>").expect("item regex"));
static RE_TITLE_CDATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<title>\s*<!\[CDATA\[(.*?)\]\]>").expect("cdata title regex")
});
static RE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<title>(.*?)</title>").expect("title regex"));
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"<link>(.*?)</link>").expect("link regex"));
static RE_PUBDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<pubDate>(.*?)</pubDate>").expect("pubDate regex"));
static RE_DESC_CDATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<description>\s*<!\[CDATA\[(.*?)\]\]>").expect("cdata description regex")
});
static RE_MEDIA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<media:content[^>]+url="([^"]+)""#).expect("media:content regex")
});

fn capture<'a>(re: &Regex, block: &'a str) -> Option<&'a str> {
    re.captures(block).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Extract up to `cap` items from a raw RSS document.
pub fn extract_raw(xml: &str, category: Category, cap: usize) -> Vec<NewsItem> {
    RE_ITEM
        .captures_iter(xml)
        .filter_map(|c| c.get(1))
        .take(cap)
        .map(|m| item_from_block(m.as_str(), category))
        .collect()
}

fn item_from_block(block: &str, category: Category) -> NewsItem {
    let title = capture(&RE_TITLE_CDATA, block)
        .or_else(|| capture(&RE_TITLE, block))
        .unwrap_or_default()
        .trim()
        .to_string();
    let link = capture(&RE_LINK, block).unwrap_or_default().trim().to_string();
    let pubdate = capture(&RE_PUBDATE, block).unwrap_or_default().trim();
    let description = capture(&RE_DESC_CDATA, block)
        .unwrap_or_default()
        .trim()
        .to_string();
    let thumbnail_url = capture(&RE_MEDIA_URL, block)
        .or_else(|| first_img_src(block))
        .unwrap_or_default()
        .to_string();

    NewsItem {
        title,
        link,
        pubdate: normalize_pubdate(pubdate),
        description,
        thumbnail_url,
        category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdata_title_wins_and_plain_description_is_dropped() {
        let xml = "<rss><channel><item><title><![CDATA[Hello]]></title>\
                   <link>https://tc/1</link>\
                   <pubDate>Mon, 02 Jan 2006 15:04:05 +0000</pubDate>\
                   <description>Plain text</description></item></channel></rss>";
        let items = extract_raw(xml, Category::Technology, 10);
        assert_eq!(items.len(), 1);
        let it = &items[0];
        assert_eq!(it.title, "Hello");
        assert_eq!(it.link, "https://tc/1");
        assert_eq!(it.pubdate, "2006-01-02T15:04:05+00:00");
        assert_eq!(it.description, "");
        assert_eq!(it.thumbnail_url, "");
    }

    #[test]
    fn plain_title_and_cdata_description() {
        let xml = "<item>\n<title> Plain title </title>\n<description>\n<![CDATA[ <p>Body <img src=\"https://img/inline.jpg\"></p> ]]></description>\n</item>";
        let it = &extract_raw(xml, Category::Technology, 10)[0];
        assert_eq!(it.title, "Plain title");
        assert_eq!(it.description, "<p>Body <img src=\"https://img/inline.jpg\"></p>");
        assert_eq!(it.thumbnail_url, "https://img/inline.jpg");
        assert_eq!(it.pubdate, "");
    }

    #[test]
    fn media_content_beats_inline_image() {
        let xml = r#"<item><title>T</title><description><![CDATA[<img src="https://img/inline.jpg">]]></description><media:content url="https://img/media.jpg" medium="image"/></item>"#;
        let it = &extract_raw(xml, Category::Technology, 10)[0];
        assert_eq!(it.thumbnail_url, "https://img/media.jpg");
    }

    #[test]
    fn cap_limits_blocks() {
        let xml: String = (0..15)
            .map(|i| format!("<item><title>n{i}</title></item>"))
            .collect();
        let items = extract_raw(&xml, Category::Technology, 10);
        assert_eq!(items.len(), 10);
        assert_eq!(items[9].title, "n9");
    }
}
