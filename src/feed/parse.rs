// src/feed/parse.rs
//! Structured feed parsing: RSS 2.0, RSS 1.0 (RDF) and Atom into [`FeedEntry`] values.
//!
//! A single pull-parser pass. Every `<item>` / `<entry>` becomes one entry; inside it only
//! direct children are read, matched on their full qualified name, so `<atom:link>`,
//! `<media:title>` or `<dc:title>` never shadow `<link>` / `<title>`. The first occurrence of a
//! text field wins; media elements accumulate in document order.

use std::time::Instant;

use metrics::histogram;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::feed::html::scrub_html_entities_for_xml;
use crate::feed::types::{FeedEntry, MediaRef};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error("document ended inside <{0}>")]
    Truncated(String),
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Link,
    Published,
    AltPublished,
    Description,
    Content,
}

fn text_field(name: &[u8]) -> Option<Field> {
    match name {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"pubDate" | b"published" => Some(Field::Published),
        b"dc:date" | b"updated" => Some(Field::AltPublished),
        b"description" | b"summary" => Some(Field::Description),
        b"content:encoded" | b"content" => Some(Field::Content),
        _ => None,
    }
}

fn is_entry(name: &[u8]) -> bool {
    matches!(name, b"item" | b"entry")
}

fn attr(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, quick_xml::Error> {
    match e.try_get_attribute(key)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Accumulates one `<item>` / `<entry>`.
struct EntryBuilder {
    /// Depth of the item element itself.
    depth: usize,
    entry: FeedEntry,
    /// Field being read, the depth of its element, text so far.
    capture: Option<(Field, usize, String)>,
    /// Depth of an open `<media:group>`.
    group: Option<usize>,
}

impl EntryBuilder {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            entry: FeedEntry::default(),
            capture: None,
            group: None,
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.entry.title,
            Field::Link => &mut self.entry.link,
            Field::Published => &mut self.entry.published,
            Field::AltPublished => &mut self.entry.alt_published,
            Field::Description => &mut self.entry.description,
            Field::Content => &mut self.entry.content,
        }
    }

    /// An element opened at `depth` somewhere below the item.
    fn open(
        &mut self,
        e: &BytesStart<'_>,
        depth: usize,
        empty: bool,
    ) -> Result<(), quick_xml::Error> {
        if self.capture.is_some() {
            // markup nested in a text field (xhtml content); its text is still collected
            return Ok(());
        }
        let name = e.name();
        let name = name.as_ref();
        let child = depth == self.depth + 1;
        let in_group = self.group.is_some_and(|g| depth == g + 1);

        match name {
            b"media:group" if child && !empty => self.group = Some(depth),
            b"media:thumbnail" if child || in_group => {
                self.entry.media_thumbnail.push(MediaRef { url: attr(e, "url")? });
            }
            b"media:content" if child || in_group => {
                self.entry.media_content.push(MediaRef { url: attr(e, "url")? });
            }
            b"enclosure" if child => {
                self.entry.enclosures.push(MediaRef { url: attr(e, "url")? });
            }
            b"link" if child => match attr(e, "href")? {
                // Atom: first alternate (or rel-less) link is the article, enclosures are media
                Some(href) => match attr(e, "rel")?.as_deref() {
                    None | Some("alternate") if self.entry.link.is_none() => {
                        self.entry.link = Some(href);
                    }
                    Some("enclosure") => self.entry.enclosures.push(MediaRef { url: Some(href) }),
                    _ => {}
                },
                None if !empty => self.begin(Field::Link, depth),
                None => {}
            },
            _ if child && !empty => {
                if let Some(field) = text_field(name) {
                    self.begin(field, depth);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn begin(&mut self, field: Field, depth: usize) {
        if self.slot(field).is_none() {
            self.capture = Some((field, depth, String::new()));
        }
    }

    fn text(&mut self, s: &str) {
        if let Some((_, _, buf)) = self.capture.as_mut() {
            buf.push_str(s);
        }
    }

    /// The element at `depth` closed.
    fn close(&mut self, depth: usize) {
        if matches!(self.capture, Some((_, d, _)) if d == depth) {
            if let Some((field, _, buf)) = self.capture.take() {
                *self.slot(field) = Some(buf.trim().to_string());
            }
        }
        if self.group == Some(depth) {
            self.group = None;
        }
    }
}

/// Parse a feed document into entries, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, ParseError> {
    let t0 = Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let mut reader = Reader::from_str(&xml_clean);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut current: Option<EntryBuilder> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                let depth = open.len();
                if let Some(b) = current.as_mut() {
                    b.open(&e, depth, false)?;
                } else if is_entry(e.name().as_ref()) {
                    current = Some(EntryBuilder::new(depth));
                }
            }
            Event::Empty(e) => {
                if let Some(b) = current.as_mut() {
                    b.open(&e, open.len() + 1, true)?;
                }
            }
            Event::Text(t) => {
                if let Some(b) = current.as_mut() {
                    let s = t.unescape().map_err(quick_xml::Error::from)?;
                    b.text(&s);
                }
            }
            Event::CData(c) => {
                if let Some(b) = current.as_mut() {
                    b.text(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                let depth = open.len();
                match current.take() {
                    Some(b) if b.depth == depth => out.push(b.entry),
                    Some(mut b) => {
                        b.close(depth);
                        current = Some(b);
                    }
                    None => {}
                }
                open.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if let Some(name) = open.pop() {
        return Err(ParseError::Truncated(name));
    }

    histogram!("feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    Ok(out)
}
