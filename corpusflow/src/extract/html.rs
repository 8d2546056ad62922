//! HTML to plain text.
//!
//! Regex based and deliberately forgiving: malformed markup degrades into
//! odd text, never into an error.

use crate::utils::static_regex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?is)<script[^>]*>.*?</script>"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?is)<style[^>]*>.*?</style>"));
static HREF_VALUE: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r#"(?i)href=['"]?([^'" >]+)"#));
static SRC_VALUE: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r#"(?i)src=['"]?([^'" >]+)"#));
static TAG: LazyLock<Regex> = LazyLock::new(|| static_regex(r"<[^>]+>"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| static_regex(r"\s+"));

/// Text and references pulled out of one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedHtml {
    /// Markup-free text with whitespace collapsed.
    pub text: String,
    /// Every `href=` value in document order, duplicates kept.
    pub links: Vec<String>,
    /// Every `src=` value in document order, duplicates kept.
    pub images: Vec<String>,
}

impl ExtractedHtml {
    /// Splits into `(text, links, images)`.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<String>, Vec<String>) {
        (self.text, self.links, self.images)
    }
}

/// Converts raw HTML into text plus link and image references.
///
/// Order matters:
///
/// 1. `<script>` and `<style>` blocks are dropped first, so their contents
///    never reach the text and any `href`/`src` inside them is not captured.
/// 2. `href=` and `src=` values are collected from the remaining markup.
/// 3. Every remaining tag becomes a single space.
/// 4. Whitespace runs collapse to one space and the ends are trimmed.
///
/// # Examples
///
/// ```
/// use corpusflow::extract::strip_html;
///
/// let out = strip_html(r#"<a href="http://x.com">l</a><img src="y.png">"#);
/// assert_eq!(out.text, "l");
/// assert_eq!(out.links, vec!["http://x.com"]);
/// assert_eq!(out.images, vec!["y.png"]);
/// ```
#[must_use]
pub fn strip_html(html: &str) -> ExtractedHtml {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, "");
    let markup = STYLE_BLOCK.replace_all(&without_scripts, "");

    let links = capture_values(&HREF_VALUE, &markup);
    let images = capture_values(&SRC_VALUE, &markup);

    let spaced = TAG.replace_all(&markup, " ");
    let text = WHITESPACE.replace_all(&spaced, " ").trim().to_string();

    ExtractedHtml {
        text,
        links,
        images,
    }
}

fn capture_values(pattern: &Regex, markup: &str) -> Vec<String> {
    pattern
        .captures_iter(markup)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
