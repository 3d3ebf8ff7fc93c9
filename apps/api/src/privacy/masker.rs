//! Ordered PII substitution.
//!
//! Patterns run strictly in this order: email, phone, full address, partial
//! address, city, state. The address patterns are greedy, so contact details
//! must already be placeholders when they run; the city and state patterns run
//! last so a complete address is masked as one `[ADDRESS]` token instead of
//! being split into `[CITY] [STATE]` fragments.
//!
//! This is best-effort privacy reduction, not a certified anonymizer. Missed
//! PII is expected, and so is masking of non-PII text that happens to look like
//! an address (for example a street mentioned in a project description).

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::tagger::{EntityTagger, GazetteerTagger};

pub const EMAIL_TOKEN: &str = "[EMAIL]";
pub const PHONE_TOKEN: &str = "[PHONE]";
pub const ADDRESS_TOKEN: &str = "[ADDRESS]";
pub const CITY_TOKEN: &str = "[CITY]";
pub const STATE_TOKEN: &str = "[STATE]";

const STATE_ABBREVIATIONS: &str = "NSW|VIC|QLD|SA|WA|TAS|NT|ACT";

const STREET_TYPES: &str = "Street|St|Road|Rd|Avenue|Ave|Drive|Dr|Lane|Ln|Court|Ct|Place|Pl|\
    Parade|Pde|Crescent|Cres|Highway|Hwy|Boulevard|Blvd|Terrace|Tce|Close|Cl|Circuit|Cct|Way";

/// Street part: optional unit prefix, number, one to three capitalised words, street type.
const STREET: &str = r"(?:(?:Unit|Apt|Level)\s+\d+[A-Za-z]?,?\s+)?\d{1,5}[A-Za-z]?(?:[/-]\d{1,5})?\s+(?:[A-Z][A-Za-z'-]*\s+){1,3}";

const SUBURB: &str = r"[A-Z][A-Za-z'-]+(?:\s+[A-Z][A-Za-z'-]+){0,2}";

pub(crate) static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b")
        .expect("email pattern should compile")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?:",
        // Mobile: 04xx xxx xxx / +61 4xx xxx xxx
        r"(?:\+61[\s-]?|\b0)4\d{2}[\s-]?\d{3}[\s-]?\d{3}",
        // Landline: 0x xxxx xxxx / +61 x xxxx xxxx
        r"|(?:\+61[\s-]?|\b0)[2378][\s-]?\d{4}[\s-]?\d{4}",
        // Landline with bracketed area code: (0x) xxxx xxxx
        r"|\(0[2378]\)\s?\d{4}[\s-]?\d{4}",
        // 1300 / 1800 numbers
        r"|\b1[38]00[\s-]?\d{3}[\s-]?\d{3}",
        r")\b"
    ))
    .expect("phone pattern should compile")
});

static FULL_ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:\b{STREET}(?:{STREET_TYPES})\b\.?,?\s+)?\b{SUBURB},?\s+(?:{STATE_ABBREVIATIONS})\s+\d{{4}}\b"
    ))
    .expect("full address pattern should compile")
});

static PARTIAL_ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b{STREET}(?:{STREET_TYPES})\b\.?(?:,?\s+[A-Z][A-Za-z'-]+(?:\s+[A-Z][A-Za-z'-]+)?)?"
    ))
    .expect("partial address pattern should compile")
});

static STATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{STATE_ABBREVIATIONS})\b"))
        .expect("state pattern should compile")
});

/// Replaces personally identifying substrings with fixed placeholder tokens.
pub struct PiiMasker {
    tagger: Box<dyn EntityTagger>,
}

impl PiiMasker {
    pub fn new() -> Self {
        Self::with_tagger(Box::new(GazetteerTagger))
    }

    pub fn with_tagger(tagger: Box<dyn EntityTagger>) -> Self {
        Self { tagger }
    }

    /// Masks `text`. Not reversible.
    pub fn mask(&self, text: &str) -> String {
        let text = EMAIL_PATTERN.replace_all(text, EMAIL_TOKEN);
        let text = PHONE_PATTERN.replace_all(&text, PHONE_TOKEN);
        let text = FULL_ADDRESS_PATTERN.replace_all(&text, ADDRESS_TOKEN);
        let text = PARTIAL_ADDRESS_PATTERN.replace_all(&text, ADDRESS_TOKEN);
        let text = self.mask_cities(&text);
        let text = STATE_PATTERN.replace_all(&text, STATE_TOKEN).into_owned();

        debug!(
            "Masked resume text with {} tagger: {} placeholder(s)",
            self.tagger.backend_id(),
            [EMAIL_TOKEN, PHONE_TOKEN, ADDRESS_TOKEN, CITY_TOKEN, STATE_TOKEN]
                .iter()
                .map(|t| text.matches(t).count())
                .sum::<usize>()
        );
        text
    }

    fn mask_cities(&self, text: &str) -> String {
        let spans = self.tagger.city_spans(text);
        if spans.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for span in spans {
            if span.start < cursor {
                continue; // overlapping span from a sloppy tagger
            }
            out.push_str(&text[cursor..span.start]);
            out.push_str(CITY_TOKEN);
            cursor = span.end;
        }
        out.push_str(&text[cursor..]);
        out
    }
}

impl Default for PiiMasker {
    fn default() -> Self {
        Self::new()
    }
}
