//! Sandboxed parsing of model replies.
//!
//! Model output is only ever scanned with regular expressions: bracketed
//! segments are located and the quoted strings inside them are collected.
//! Nothing returned by the hosted model is evaluated or deserialized as code.

use std::sync::LazyLock;

use regex::Regex;

use super::SkillCategory;

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[([^\[\]]*)\]").expect("bracket pattern should compile"));

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)'"#)
        .expect("quoted string pattern should compile")
});

static CATEGORY_BLOCKS: LazyLock<Vec<(SkillCategory, Regex)>> = LazyLock::new(|| {
    SkillCategory::ALL
        .iter()
        .map(|cat| {
            let label = regex::escape(cat.label()).replace(' ', r"\s+");
            let pattern = format!(r#"(?is)["']?{label}["']?\s*:\s*\[([^\[\]]*)\]"#);
            (
                *cat,
                Regex::new(&pattern).expect("category pattern should compile"),
            )
        })
        .collect()
});

/// Returns the quoted strings of the first bracketed list in `reply`.
///
/// Bracketed segments without quoted items (such as an echoed `[EMAIL]`
/// placeholder) are skipped, except a literally empty `[]`, which is a valid
/// empty list. `None` means no list was found at all.
pub fn parse_quoted_list(reply: &str) -> Option<Vec<String>> {
    for caps in BRACKETED.captures_iter(reply) {
        let inner = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if inner.trim().is_empty() {
            return Some(Vec::new());
        }
        let items = quoted_items(inner);
        if !items.is_empty() {
            return Some(items);
        }
    }
    None
}

/// Extracts per-category lists from a dictionary-shaped reply.
///
/// Categories missing from the reply are absent from the result. `None` when
/// no category label with a list was recognised.
pub fn parse_category_lists(reply: &str) -> Option<Vec<(SkillCategory, Vec<String>)>> {
    let found: Vec<_> = CATEGORY_BLOCKS
        .iter()
        .filter_map(|(cat, re)| {
            re.captures(reply)
                .and_then(|caps| caps.get(1))
                .map(|m| (*cat, quoted_items(m.as_str())))
        })
        .collect();
    (!found.is_empty()).then_some(found)
}

fn quoted_items(segment: &str) -> Vec<String> {
    QUOTED
        .captures_iter(segment)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| unescape(m.as_str()))
        .collect()
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
