//! Readable-content extraction from raw HTML.
//!
//! [`extract`] turns a page into an [`ExtractedDocument`]: a title, the
//! normalized body text and a handful of metadata fields. Every field is
//! resolved through an ordered list of [`Probe`]s where the first non-empty
//! candidate wins, so missing signals degrade to empty strings (or
//! `"Untitled"` for the title) instead of errors. The only failure is input
//! that is not an HTML document at all.
//!
//! The title is read from the untouched document. Chrome elements (scripts,
//! navigation, headers, footers, asides) are then detached from the tree
//! before the body and the remaining metadata are read.

use chrono::{DateTime, Utc};
use ego_tree::iter::Edge;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::error::ExtractError;
use crate::ExtractedDocument;

pub const UNTITLED: &str = "Untitled";

const STRIPPED_ELEMENTS: &str = "script, style, noscript, nav, header, footer, aside";

/// Elements that start a new paragraph when collecting container text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section",
    "table", "tr", "ul",
];

/// Elements that only separate words.
const SPACING_ELEMENTS: &[&str] = &["br", "td", "th"];

const TITLE: &[Probe] = &[
    Probe::Text("title"),
    Probe::FirstText("h1"),
    Probe::Attr(r#"meta[property="og:title"]"#, "content"),
];

/// Article containers, most specific first.
const MAIN_CONTENT: &[Probe] = &[
    Probe::Content("article"),
    Probe::Content("main"),
    Probe::Content(".post-content"),
    Probe::Content(".entry-content"),
    Probe::Content(".blog-content"),
    Probe::Content(".main-content"),
    Probe::Content(".content"),
    Probe::Content("#content"),
];

const DESCRIPTION: &[Probe] = &[
    Probe::Attr(r#"meta[name="description"]"#, "content"),
    Probe::Attr(r#"meta[property="og:description"]"#, "content"),
];

const AUTHOR: &[Probe] = &[
    Probe::Attr(r#"meta[name="author"]"#, "content"),
    Probe::Text(r#".author, .byline, [rel="author"]"#),
];

const PUBLISH_DATE: &[Probe] = &[
    Probe::Attr(r#"meta[property="article:published_time"]"#, "content"),
    Probe::FirstAttr("time[datetime]", "datetime"),
    Probe::Text(".date, .published, .post-date"),
];

/// One extraction attempt in an ordered fallback list.
#[derive(Debug, Clone, Copy)]
enum Probe {
    /// Whitespace-collapsed text of the first matching element that has any.
    Text(&'static str),
    /// First non-blank value of the attribute on a matching element.
    Attr(&'static str, &'static str),
    /// Text of the first matching element only; blank means no value.
    FirstText(&'static str),
    /// Attribute of the first matching element only; blank means no value.
    FirstAttr(&'static str, &'static str),
    /// Paragraph-aware text of the first matching container that has any.
    Content(&'static str),
}

impl Probe {
    fn selector(&self) -> &'static str {
        match *self {
            Probe::Text(s)
            | Probe::Attr(s, _)
            | Probe::FirstText(s)
            | Probe::FirstAttr(s, _)
            | Probe::Content(s) => s,
        }
    }

    fn resolve(&self, doc: &Html) -> Option<String> {
        let selector = Selector::parse(self.selector()).ok()?;
        let limit = match self {
            Probe::FirstText(_) | Probe::FirstAttr(..) => 1,
            _ => usize::MAX,
        };
        let matches = doc.select(&selector).take(limit);
        match *self {
            Probe::Text(_) | Probe::FirstText(_) => matches
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                .find(|s| !s.is_empty()),
            Probe::Attr(_, attr) | Probe::FirstAttr(_, attr) => matches
                .filter_map(|el| el.value().attr(attr))
                .map(collapse_whitespace)
                .find(|s| !s.is_empty()),
            Probe::Content(_) => matches.map(container_text).find(|s| !s.is_empty()),
        }
    }
}

/// Resolve probes in order; the first non-empty value wins.
fn first_non_empty(doc: &Html, probes: &[Probe]) -> Option<String> {
    probes.iter().find_map(|probe| probe.resolve(doc))
}

/// Extract a document, stamping it with the current time.
pub fn extract(source_url: &str, html: &str) -> Result<ExtractedDocument, ExtractError> {
    extract_at(source_url, html, Utc::now())
}

/// Extract from a raw response body, which must be UTF-8.
pub fn extract_bytes(source_url: &str, body: &[u8]) -> Result<ExtractedDocument, ExtractError> {
    let html = std::str::from_utf8(body)?;
    extract(source_url, html)
}

/// Extract a document with a caller-supplied extraction time.
///
/// Given the same arguments this always produces the same document.
pub fn extract_at(
    source_url: &str,
    html: &str,
    extracted_at: DateTime<Utc>,
) -> Result<ExtractedDocument, ExtractError> {
    check_markup(html)?;

    let mut doc = Html::parse_document(html);
    let title = first_non_empty(&doc, TITLE).unwrap_or_else(|| UNTITLED.to_string());

    strip_chrome(&mut doc);

    let body_text = first_non_empty(&doc, MAIN_CONTENT).unwrap_or_else(|| paragraph_text(&doc));
    let description = first_non_empty(&doc, DESCRIPTION).unwrap_or_default();
    let author = first_non_empty(&doc, AUTHOR).unwrap_or_default();
    let publish_date = first_non_empty(&doc, PUBLISH_DATE).unwrap_or_default();

    debug!(
        url = source_url,
        title = %title,
        body_chars = body_text.len(),
        "extracted document"
    );

    Ok(ExtractedDocument::new(
        source_url.to_string(),
        title,
        body_text,
        description,
        author,
        publish_date,
        extracted_at,
    ))
}

fn check_markup(html: &str) -> Result<(), ExtractError> {
    if html.contains('\0') {
        return Err(ExtractError::Binary);
    }
    let has_tag = html
        .as_bytes()
        .windows(2)
        .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || matches!(w[1], b'!' | b'/' | b'?')));
    if !has_tag {
        return Err(ExtractError::NoMarkup);
    }
    Ok(())
}

fn strip_chrome(doc: &mut Html) {
    let Ok(selector) = Selector::parse(STRIPPED_ELEMENTS) else {
        return;
    };
    let ids: Vec<_> = doc.select(&selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Every `<p>` in document order, one paragraph each.
fn paragraph_text(doc: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };
    let paragraphs: Vec<String> = doc
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .collect();
    normalize_text(&paragraphs.join("\n\n"))
}

/// Text of a container with block elements kept as separate paragraphs.
fn container_text(root: ElementRef<'_>) -> String {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for edge in root.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Text(text) => current.push_str(text),
                Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => {
                    paragraphs.push(std::mem::take(&mut current));
                }
                Node::Element(el) if SPACING_ELEMENTS.contains(&el.name()) => current.push(' '),
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(el) = node.value() {
                    if BLOCK_ELEMENTS.contains(&el.name()) {
                        paragraphs.push(std::mem::take(&mut current));
                    } else if SPACING_ELEMENTS.contains(&el.name()) {
                        current.push(' ');
                    }
                }
            }
        }
    }
    paragraphs.push(current);

    normalize_text(&paragraphs.join("\n\n"))
}

/// Normalize body text.
///
/// Paragraphs are split at blank lines first; then every whitespace run inside
/// a paragraph (newlines included) becomes one space. Empty paragraphs are
/// dropped and the rest are joined by exactly one blank line.
pub fn normalize_text(text: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !lines.is_empty() {
                paragraphs.push(collapse_whitespace(&lines.join(" ")));
                lines.clear();
            }
        } else {
            lines.push(line);
        }
    }
    if !lines.is_empty() {
        paragraphs.push(collapse_whitespace(&lines.join(" ")));
    }

    paragraphs.retain(|p| !p.is_empty());
    paragraphs.join("\n\n")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
