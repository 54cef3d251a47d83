//! Parsing of headed-section model replies into a [`CategoryMap`].
//!
//! The expected reply looks like:
//!
//! ```text
//! ## features
//! - Add JSON output for reports
//! ## bugfixes
//! - none
//! ```
//!
//! Parsing is lenient about header style (`#` headers, `**bold**` lines,
//! `Label:` lines, emoji prefixes, aliases such as "Bug Fixes") and bullet
//! style (`-`, `*`, `+`, `•`, `1.`, `1)`). Sections whose header is not one
//! of the five categories are dropped along with their bullets.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;
use tracing::debug;

use crate::error::ModelError;
use crate::llm::extract_json_object;
use crate::report::{Category, CategoryMap};

/// Longest reply excerpt carried in a parse error.
const ERROR_PREVIEW_CHARS: usize = 200;

/// Colon-terminated lines with more words than this are prose, not headers.
const MAX_HEADER_WORDS: usize = 4;

static BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+•–]|\d+[.)])\s+(.*)$").expect("bullet pattern is valid")
});

static HEADER_NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*").expect("numbering pattern is valid"));

static HEADER_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:\([^)]*\)|\[[^\]]*\]|[-:–]?\s*\d+)$").expect("count pattern is valid")
});

const PLACEHOLDERS: &[&str] = &["none", "n/a", "na", "nothing", "none found", "no changes", "-"];

/// Parse a model reply into a category map.
///
/// Falls back to a JSON object keyed by category names when the reply has
/// no recognizable section header. Fails with
/// [`ModelError::UnparseableReply`] when neither form names a category.
pub fn parse_classification(reply: &str) -> Result<CategoryMap, ModelError> {
    if let Some(map) = parse_sections(reply) {
        return Ok(map);
    }

    if let Some(map) = parse_json_fallback(reply) {
        debug!("Reply had no section headers; parsed JSON fallback");
        return Ok(map);
    }

    let preview: String = reply.trim().chars().take(ERROR_PREVIEW_CHARS).collect();
    Err(ModelError::UnparseableReply(if preview.is_empty() {
        "empty reply".to_string()
    } else {
        format!("no category sections found in: {preview}")
    }))
}

/// Headed-section parse. `None` when no recognized header was seen.
fn parse_sections(reply: &str) -> Option<CategoryMap> {
    let mut map = CategoryMap::new();
    let mut current: Option<Category> = None;
    let mut recognized = false;

    for raw in reply.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }

        match classify_line(line) {
            Line::Header(text) => match header_category(text) {
                Some(category) => {
                    current = Some(category);
                    recognized = true;
                }
                None => {
                    if current.is_some() || recognized {
                        debug!("Dropping unrecognized section '{}'", normalize_header(text));
                    }
                    current = None;
                }
            },
            // An unrecognized label is a lead-in sentence, not a new section
            Line::Label(text) => {
                if let Some(category) = header_category(text) {
                    current = Some(category);
                    recognized = true;
                }
            }
            Line::Bullet(text) => {
                if let Some(category) = current
                    && !is_placeholder(text)
                {
                    map.push(category, text);
                }
            }
            Line::Prose => {}
        }
    }

    recognized.then_some(map)
}

fn parse_json_fallback(reply: &str) -> Option<CategoryMap> {
    let object = extract_json_object(reply)?;
    if !object.keys().any(|key| key.parse::<Category>().is_ok()) {
        return None;
    }

    let parsed: CategoryMap = serde_json::from_value(Value::Object(object)).ok()?;
    let mut map = CategoryMap::new();
    for (category, bullets) in parsed.iter() {
        for bullet in bullets {
            let bullet = bullet.trim();
            if !bullet.is_empty() && !is_placeholder(bullet) {
                map.push(category, bullet);
            }
        }
    }

    Some(map)
}

enum Line<'a> {
    /// `#` header or `**bold**` line. Unrecognized ones close the section.
    Header(&'a str),
    /// Short `Label:` line.
    Label(&'a str),
    Bullet(&'a str),
    Prose,
}

fn classify_line(line: &str) -> Line<'_> {
    if line.starts_with('#') {
        return Line::Header(line.trim_start_matches('#'));
    }

    if let Some(caps) = BULLET.captures(line)
        && let Some(text) = caps.get(1)
    {
        let text = text.as_str().trim();
        // "1. **Features**" style section headers
        if is_bold(text) && header_category(text).is_some() {
            return Line::Header(text);
        }
        return Line::Bullet(text);
    }

    if is_bold(line) {
        return Line::Header(line);
    }
    if line.ends_with(':') && line.split_whitespace().count() <= MAX_HEADER_WORDS {
        return Line::Label(line);
    }

    Line::Prose
}

fn is_bold(text: &str) -> bool {
    text.starts_with("**")
        && (text.ends_with("**") || text.ends_with("**:") || text.ends_with(":**"))
}

/// Match header text against the categories, ignoring markup, leading
/// numbering ("3. Docs") and trailing counts ("Features (2)", "Fixes: 1").
fn header_category(text: &str) -> Option<Category> {
    let bare = text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | ':'));
    let bare = HEADER_NUMBERING.replace(bare, "");
    let bare = HEADER_COUNT.replace(&bare, "");
    normalize_header(&bare).parse().ok()
}

/// Strip markup, emoji, and trailing colons from header text.
fn normalize_header(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '/' | '-' | '_'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_placeholder(text: &str) -> bool {
    let normalized = text
        .trim()
        .trim_end_matches('.')
        .trim_matches('*')
        .trim_matches('_')
        .to_lowercase();
    PLACEHOLDERS.contains(&normalized.as_str())
}
