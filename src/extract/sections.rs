//! Locating the normative and informative references sections of a document.

use once_cell::sync::Lazy;
use regex::Regex;

/// Heading patterns in priority order: numbered headings first, then bare ones.
static NORMATIVE_HEADINGS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)^\s*\d+(?:\.\d+)*\.?\s+normative\s+references\s*:?\s*$")
            .expect("valid regex"),
        Regex::new(r"(?i)^\s*normative\s+references\s*:?\s*$").expect("valid regex"),
    ]
});
static INFORMATIVE_HEADINGS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)^\s*\d+(?:\.\d+)*\.?\s+informative\s+references\s*:?\s*$")
            .expect("valid regex"),
        Regex::new(r"(?i)^\s*informative\s+references\s*:?\s*$").expect("valid regex"),
    ]
});
// A single-level numbered heading such as "3 Definitions" or "10.  Security
// Considerations". Running page headers ("7 ETSI EN 319 403") do not match
// because the title word must be capitalized, not upper case.
static TOP_LEVEL_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d{1,2}\.?\s+[A-Z][a-z]").expect("valid regex"));
static TRAILING_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:Annex [A-Z]\b|Appendix [A-Z]\b|Author'?s'? Address(?:es)?\b|Acknowledge?ments\s*$|History\s*$)",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadingKind {
    Normative { tier: usize },
    Informative { tier: usize },
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Heading {
    kind: HeadingKind,
    /// Byte offset of the heading line.
    start: usize,
    /// Byte offset just past the heading line.
    body: usize,
}

/// The references regions found in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sections<'a> {
    pub normative: Option<&'a str>,
    pub informative: Option<&'a str>,
}

impl Sections<'_> {
    /// Whether at least one references heading was recognized.
    pub fn is_sectioned(&self) -> bool {
        self.normative.is_some() || self.informative.is_some()
    }
}

/// Splits `text` into its normative and informative references regions.
///
/// Each region runs from the line after its heading to the next recognized
/// heading (the other references heading, a top-level section, or a trailing
/// annex/appendix/address block) or to the end of the text.
pub fn segment(text: &str) -> Sections<'_> {
    let headings = scan_headings(text);
    Sections {
        normative: region(text, &headings, |k| match k {
            HeadingKind::Normative { tier } => Some(tier),
            _ => None,
        }),
        informative: region(text, &headings, |k| match k {
            HeadingKind::Informative { tier } => Some(tier),
            _ => None,
        }),
    }
}

fn scan_headings(text: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut offset = 0;
    for raw in text.split_inclusive('\n') {
        let line = raw.trim_end_matches(['\n', '\r']);
        if let Some(kind) = classify_line(line) {
            headings.push(Heading {
                kind,
                start: offset,
                body: offset + raw.len(),
            });
        }
        offset += raw.len();
    }
    headings
}

fn classify_line(line: &str) -> Option<HeadingKind> {
    if let Some(tier) = NORMATIVE_HEADINGS.iter().position(|re| re.is_match(line)) {
        return Some(HeadingKind::Normative { tier });
    }
    if let Some(tier) = INFORMATIVE_HEADINGS.iter().position(|re| re.is_match(line)) {
        return Some(HeadingKind::Informative { tier });
    }
    if TOP_LEVEL_HEADING.is_match(line) || TRAILING_HEADING.is_match(line) {
        return Some(HeadingKind::Other);
    }
    None
}

/// Picks the region for one heading kind.
///
/// Tiers are tried in order. Within a tier the first heading whose region holds
/// any text wins, so an undotted table-of-contents entry followed directly by
/// the next entry does not shadow the real section.
fn region<'a>(
    text: &'a str,
    headings: &[Heading],
    tier_of: impl Fn(HeadingKind) -> Option<usize>,
) -> Option<&'a str> {
    let mut fallback = None;
    for tier in 0..2 {
        for (idx, heading) in headings.iter().enumerate() {
            if tier_of(heading.kind) != Some(tier) {
                continue;
            }
            let end = headings[idx + 1..]
                .iter()
                .map(|h| h.start)
                .find(|&start| start >= heading.body)
                .unwrap_or(text.len());
            let body = &text[heading.body..end];
            if !body.trim().is_empty() {
                return Some(body);
            }
            fallback.get_or_insert(body);
        }
    }
    fallback
}
