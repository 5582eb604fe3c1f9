//! Allowlist HTML sanitization for admin-supplied rich text.
//!
//! Two policies exist and are deliberately kept apart: [`SanitizePolicy::Restrictive`] for
//! short inline fields (a team member's name or position) and [`SanitizePolicy::Content`]
//! for long-form body text. Both unwrap disallowed tags while keeping their text, remove
//! `script`/`style` elements entirely, drop every attribute outside the allowlist, and only
//! accept `http`, `https` and `mailto` links.

use std::collections::HashSet;
use std::sync::LazyLock;

use ammonia::{Builder, UrlRelative};
use regex::Regex;
use serde::{Deserialize, Serialize};

const RESTRICTIVE_TAGS: &[&str] = &[
    "strong", "b", "em", "i", "br", "p", "ul", "ol", "li", "span", "a",
];
const RESTRICTIVE_ATTRIBUTES: &[&str] = &["href"];

const CONTENT_TAGS: &[&str] = &[
    "p",
    "br",
    "strong",
    "b",
    "em",
    "i",
    "u",
    "s",
    "sub",
    "sup",
    "a",
    "ul",
    "ol",
    "li",
    "span",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "hr",
];
const CONTENT_ATTRIBUTES: &[&str] = &["href", "target", "rel", "class"];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];
const REMOVED_WITH_CONTENT: &[&str] = &["script", "style"];

static RESTRICTIVE: LazyLock<Builder<'static>> =
    LazyLock::new(|| build_cleaner(RESTRICTIVE_TAGS, RESTRICTIVE_ATTRIBUTES));

static CONTENT: LazyLock<Builder<'static>> =
    LazyLock::new(|| build_cleaner(CONTENT_TAGS, CONTENT_ATTRIBUTES));

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"));

fn build_cleaner(tags: &[&'static str], attributes: &[&'static str]) -> Builder<'static> {
    let mut cleaner = Builder::empty();
    cleaner
        .tags(tags.iter().copied().collect::<HashSet<_>>())
        .generic_attributes(attributes.iter().copied().collect::<HashSet<_>>())
        .clean_content_tags(REMOVED_WITH_CONTENT.iter().copied().collect::<HashSet<_>>())
        .url_schemes(URL_SCHEMES.iter().copied().collect::<HashSet<_>>())
        .url_relative(UrlRelative::Deny)
        .link_rel(None)
        .strip_comments(true);
    cleaner
}

/// Named allowlist profile applied to an HTML field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanitizePolicy {
    /// Inline formatting and links with `href` only.
    Restrictive,
    /// Block-level CMS content: headings, quotes, `target`/`rel`/`class` attributes.
    Content,
}

impl SanitizePolicy {
    /// Clean `input` against this policy. Never fails; `None` yields an empty string.
    pub fn sanitize(self, input: Option<&str>) -> String {
        let Some(html) = input else {
            return String::new();
        };
        if html.is_empty() {
            return String::new();
        }
        self.cleaner().clean(html).to_string()
    }

    /// Clean an arbitrary JSON value. Anything that is not a string yields an empty string.
    pub fn sanitize_value(self, value: &serde_json::Value) -> String {
        self.sanitize(value.as_str())
    }

    fn cleaner(self) -> &'static Builder<'static> {
        match self {
            SanitizePolicy::Restrictive => &RESTRICTIVE,
            SanitizePolicy::Content => &CONTENT,
        }
    }
}

/// Remove all markup for fields that must hold plain text (titles, alt text).
///
/// When nothing but whitespace is left after stripping, the original input is returned
/// unchanged. Callers relying on plain output must not feed pure markup.
pub fn strip_tags(input: &str) -> String {
    let stripped = TAG_PATTERN.replace_all(input, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return input.to_string();
    }
    trimmed.to_string()
}

/// Markup-free text for storage in plain-text columns.
///
/// Runs [`strip_tags`] but never keeps its fallback: pure markup becomes an empty string,
/// so the column takes its default or fails as required. A `<` left without a closing `>`
/// is dropped too, since it could still open a tag once the value is embedded in a page.
pub fn plain_text(input: &str) -> String {
    let stripped = strip_tags(input);
    if TAG_PATTERN.is_match(&stripped) {
        return String::new();
    }
    stripped.replace('<', "").trim().to_string()
}
