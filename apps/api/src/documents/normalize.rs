use std::sync::LazyLock;

use regex::Regex;

static NEWLINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("newline pattern should compile"));

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern should compile"));

/// Normalizes extracted document text.
///
/// Newline runs collapse to one newline, then every whitespace run (newlines
/// included) collapses to a single space. Non-breaking spaces become regular
/// spaces and the result is trimmed.
pub fn normalize_text(raw: &str) -> String {
    let text = raw.replace('\u{a0}', " ");
    let text = NEWLINE_RUNS.replace_all(&text, "\n");
    let text = WHITESPACE_RUNS.replace_all(&text, " ");
    text.trim().to_string()
}
