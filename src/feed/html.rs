// src/feed/html.rs
//! Small text helpers shared by the extractors. Everything here is regex/string based;
//! none of it tries to be an HTML parser.

use once_cell::sync::Lazy;
use regex::Regex;

// Non-greedy and without `(?s)`: a tag split across lines is left alone.
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("tag regex"));
static RE_IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src="([^"]+)""#).expect("img src regex"));
static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("entity regex"));
static RE_CDATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>").expect("cdata regex"));

const ANCHOR_CLOSE: &str = "</a>";

/// Remove every `<...>` tag. Does not trim or decode entities.
pub fn strip_tags(s: &str) -> String {
    RE_TAGS.replace_all(s, "").into_owned()
}

/// `src` of the first `<img>` tag with a double-quoted `src` attribute.
pub fn first_img_src(s: &str) -> Option<&str> {
    RE_IMG_SRC
        .captures(s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Text after the last closing anchor, if there is one.
/// Publishers prepend a linked image/credit line to the summary.
pub fn after_last_anchor(s: &str) -> Option<&str> {
    s.rsplit_once(ANCHOR_CLOSE).map(|(_, tail)| tail)
}

/// Decode bytes as UTF-8, dropping invalid sequences instead of replacing them.
pub fn decode_utf8_ignoring_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

/// Replace HTML-only named entities (`&nbsp;`, `&rsquo;`, ...) with their characters so a strict
/// XML parser accepts the document. The five XML entities are left untouched; names
/// `html-escape` does not know get their `&` escaped.
pub fn scrub_html_entities_for_xml(s: &str) -> String {
    // CDATA is literal text; entities there are not entities
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for m in RE_CDATA.find_iter(s) {
        out.push_str(&scrub_entities(&s[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&scrub_entities(&s[last..]));
    out
}

fn scrub_entities(s: &str) -> String {
    RE_ENTITY
        .replace_all(s, |caps: &regex::Captures| {
            let whole = &caps[0];
            match &caps[1] {
                "amp" | "lt" | "gt" | "quot" | "apos" => whole.to_string(),
                _ => {
                    let decoded = html_escape::decode_html_entities(whole);
                    if decoded == whole {
                        // unknown entity; escape the ampersand so the XML stays well-formed
                        format!("&amp;{}", &whole[1..])
                    } else {
                        html_escape::encode_text(&decoded).into_owned()
                    }
                }
            }
        })
        .into_owned()
}
