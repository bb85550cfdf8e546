// HTML → readable text via content-container heuristics.
// Shared by the plain-HTTP and rendered-browser tiers.

use std::sync::LazyLock;

use newswire_common::{truncate_chars, ExtractionResult};
use scraper::{ElementRef, Html, Selector};

/// Candidate article containers, most specific first. First match wins.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".post-content",
    ".entry-content",
    ".article-body",
    "main",
];

/// Elements whose text is never part of the readable content.
const NOISE_SELECTOR: &str =
    "script, style, noscript, template, nav, header, footer, aside, iframe, .ad, .sidebar";

static CONTENT: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});
static NOISE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(NOISE_SELECTOR).expect("valid selector"));
/// Elements whose boundaries separate words. Inline markup joins its text directly.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "html", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("valid selector"));

/// Extract title and readable text from an HTML document.
///
/// Never fails: an empty or unparseable body yields empty content, and the
/// caller's length gate decides whether that is good enough.
pub fn extract_readable(html: &str, max_chars: usize) -> ExtractionResult {
    let doc = Html::parse_document(html);

    let mut text = CONTENT
        .iter()
        .find_map(|sel| doc.select(sel).find(|el| !in_noise(*el)))
        .map(visible_text)
        .unwrap_or_default();

    if text.is_empty() {
        text = match doc.select(&BODY).next() {
            Some(body) => visible_text(body),
            None => visible_text(doc.root_element()),
        };
    }

    ExtractionResult {
        title: extract_title(&doc),
        content: truncate_chars(&text, max_chars),
    }
}

/// `<title>` text, else the first `<h1>`, else empty.
fn extract_title(doc: &Html) -> String {
    [&*TITLE, &*H1]
        .into_iter()
        .filter_map(|sel| doc.select(sel).next())
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|t| !t.is_empty())
        .unwrap_or_default()
}

/// Whether `el` is, or sits inside, a noise element.
fn in_noise(el: ElementRef<'_>) -> bool {
    NOISE.matches(&el) || el.ancestors().filter_map(ElementRef::wrap).any(|a| NOISE.matches(&a))
}

/// Text under `root`, skipping anything inside a noise element.
/// Text nodes concatenate as-is, with a space only where a block element changes.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    let mut current_block = None;
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            out.push_str(text);
            continue;
        };
        if in_noise(parent) {
            continue;
        }
        let block = std::iter::once(parent)
            .chain(parent.ancestors().filter_map(ElementRef::wrap))
            .find(|el| BLOCK_TAGS.contains(&el.value().name()))
            .map(|el| el.id());
        if block != current_block {
            out.push(' ');
            current_block = block;
        }
        out.push_str(text);
    }
    collapse_whitespace(&out)
}

/// Plain text from an HTML fragment such as a feed summary.
pub fn fragment_text(html: &str) -> String {
    if !html.contains('<') {
        return collapse_whitespace(html);
    }
    let fragment = Html::parse_fragment(html);
    visible_text(fragment.root_element())
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
