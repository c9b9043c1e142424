//! Syndication feed headlines
//!
//! Pulls entry titles out of RSS 2.0 and Atom documents. The markup is run
//! through the same HTML5 parser used for scraping, which is lenient enough
//! for the feeds we read once CDATA sections are inlined and self-closing
//! elements are spelled out (HTML ignores `/>` on unknown tags).

use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::{HttpClient, NetError};

/// Entries read from the top of each feed
pub const HEADLINES_PER_FEED: usize = 3;

/// Fetch a feed and return the titles of its first `limit` entries
pub async fn fetch_feed_titles(
    client: &HttpClient,
    url: &str,
    limit: usize,
    timeout: Duration,
) -> Result<Vec<String>, NetError> {
    let body = client.get_text(url, timeout).await?;
    let titles = parse_feed_titles(&body, limit)?;
    debug!("Feed {} yielded {} titles", url, titles.len());
    Ok(titles)
}

/// Extract entry titles (`item > title` for RSS, `entry > title` for Atom),
/// in document order, skipping entries without a usable title
pub fn parse_feed_titles(body: &str, limit: usize) -> Result<Vec<String>, NetError> {
    let entry_selector =
        Selector::parse("item, entry").map_err(|e| NetError::Parse(e.to_string()))?;

    let document = Html::parse_document(&expand_self_closing(&inline_cdata(body)));

    let titles = document
        .select(&entry_selector)
        .take(limit)
        .filter_map(entry_title)
        .filter(|title| !title.is_empty())
        .collect();

    Ok(titles)
}

fn is_entry(element: &ElementRef) -> bool {
    matches!(element.value().name(), "item" | "entry")
}

/// First `title` belonging to `entry` itself, not to an entry nested in it
fn entry_title(entry: ElementRef) -> Option<String> {
    entry
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "title")
        .find(|title| {
            title
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(is_entry)
                .map(|owner| owner.id() == entry.id())
                .unwrap_or(false)
        })
        .map(|title| normalize_whitespace(&title.text().collect::<String>()))
}

/// HTML void elements; an explicit end tag for these is a parse error
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Rewrite `<name attrs/>` as `<name attrs></name>` so unknown elements
/// do not stay open and swallow their following siblings
fn expand_self_closing(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tag = &rest[start..];

        let Some(end) = tag_end(tag) else {
            out.push_str(tag);
            return out;
        };

        let raw = &tag[..=end];
        let inner = raw[1..raw.len() - 1].trim_end();
        match inner.strip_suffix('/') {
            Some(open) if open.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                let open = open.trim_end();
                let name = open
                    .split(|c: char| c.is_whitespace())
                    .next()
                    .unwrap_or_default();
                out.push('<');
                out.push_str(open);
                out.push('>');
                if !VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
            _ => out.push_str(raw),
        }

        rest = &tag[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Byte index of the `>` closing the tag that starts `tag`, skipping
/// quoted attribute values
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in tag.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Replace every `<![CDATA[...]]>` section with its escaped text so the
/// HTML parser treats the content as character data
fn inline_cdata(body: &str) -> String {
    const OPEN: &str = "<![CDATA[";
    const CLOSE: &str = "]]>";

    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];
        match after.find(CLOSE) {
            Some(end) => {
                out.push_str(&escape_text(&after[..end]));
                rest = &after[end + CLOSE.len()..];
            }
            None => {
                out.push_str(&escape_text(after));
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Normalize whitespace in text
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
