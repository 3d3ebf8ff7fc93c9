//! Location entity tagging for the masker.
//!
//! `EntityTagger` is the seam for a model-backed named-entity tagger. The
//! built-in `GazetteerTagger` matches a fixed list of Australian cities and
//! large regional centres, which covers what resumes actually mention.

use std::sync::LazyLock;

use regex::Regex;

/// Byte range of a tagged entity in the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
}

/// Finds city-name entities in text.
pub trait EntityTagger: Send + Sync {
    /// Human-readable backend identifier (e.g. "gazetteer").
    fn backend_id(&self) -> &str;

    /// Non-overlapping city spans, in ascending order.
    fn city_spans(&self, text: &str) -> Vec<EntitySpan>;
}

const AUSTRALIAN_CITIES: &[&str] = &[
    "Sydney",
    "Melbourne",
    "Brisbane",
    "Perth",
    "Adelaide",
    "Hobart",
    "Darwin",
    "Canberra",
    "Gold Coast",
    "Sunshine Coast",
    "Newcastle",
    "Wollongong",
    "Geelong",
    "Townsville",
    "Cairns",
    "Toowoomba",
    "Ballarat",
    "Bendigo",
    "Launceston",
    "Albury",
    "Wodonga",
    "Mackay",
    "Rockhampton",
    "Bunbury",
    "Bundaberg",
    "Coffs Harbour",
    "Wagga Wagga",
    "Hervey Bay",
    "Mildura",
    "Shepparton",
    "Port Macquarie",
    "Gladstone",
    "Tamworth",
    "Traralgon",
    "Dubbo",
    "Geraldton",
    "Alice Springs",
    "Parramatta",
    "Penrith",
];

static CITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Longest names first so "Gold Coast" wins over a shorter overlapping name.
    let mut names: Vec<&str> = AUSTRALIAN_CITIES.to_vec();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    let alternation = names
        .iter()
        .map(|n| regex::escape(n).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("city pattern should compile")
});

/// Gazetteer tagger over a fixed list of Australian city names.
/// Case-insensitive, whole-word matches only.
pub struct GazetteerTagger;

impl EntityTagger for GazetteerTagger {
    fn backend_id(&self) -> &str {
        "gazetteer"
    }

    fn city_spans(&self, text: &str) -> Vec<EntitySpan> {
        CITY_PATTERN
            .find_iter(text)
            .map(|m| EntitySpan {
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }
}
