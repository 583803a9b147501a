//! Canonical identifier normalization.
//!
//! Citations in text and file names in the corpus spell the same document
//! differently (`EN 319 403`, `EN 319403`, `en_319403v020301p.pdf`). Every
//! function here maps a spelling to one canonical string, or to `None` when the
//! input cannot be read as an identifier. None of them panic.

use once_cell::sync::Lazy;
use regex::Regex;

static CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:ETSI\s+)?([A-Z]{2,4})\s*(\d{3})\s*(\d{3})(?:\s*-\s*(\d{1,3}))?\s*$")
        .expect("valid regex")
});
static STEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:([A-Z]{2,4})[_\-\s]?)?(\d{4,})").expect("valid regex")
});
static RFC_STEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^rfc[_\-\s]?(\d{1,5})$").expect("valid regex"));

/// Normalizes an in-text primary-standard citation to `TYPE NNN NNN[-P]`.
pub fn from_citation(raw: &str) -> Option<String> {
    let caps = CITATION_RE.captures(raw)?;
    let doc_type = caps.get(1)?.as_str().to_ascii_uppercase();
    let part = match caps.get(4) {
        Some(m) => part_suffix(m.as_str())?,
        None => None,
    };
    Some(compose(&doc_type, &caps[2], &caps[3], part))
}

/// Normalizes a type code plus the digit group taken from a stored file name.
///
/// Six digits split 3+3. Eight and nine digits split 3+3 and read the rest as
/// an integer part number (`11910201` is `119 102-1`, `119612010` is
/// `119 612-10`). Other lengths are kept whole as `TYPE <digits>`.
pub fn from_filename(doc_type: &str, digits: &str) -> Option<String> {
    let doc_type = doc_type.trim();
    if !(2..=4).contains(&doc_type.len()) || !doc_type.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let doc_type = doc_type.to_ascii_uppercase();

    match digits.len() {
        6 => Some(compose(&doc_type, &digits[..3], &digits[3..], None)),
        8 | 9 => {
            let part = part_suffix(&digits[6..])?;
            Some(compose(&doc_type, &digits[..3], &digits[3..6], part))
        }
        _ => Some(format!("{doc_type} {digits}")),
    }
}

/// Derives a primary-standard identifier from a file stem.
///
/// Accepts ETSI deliverable names (`ts_11910201v010401p`) and stems that are
/// already citations (`EN 319 403`). When the stem carries no type prefix the
/// name of the type directory is used.
pub fn from_file_stem(stem: &str, dir_type: Option<&str>) -> Option<String> {
    if let Some(id) = from_citation(stem) {
        return Some(id);
    }
    let caps = STEM_RE.captures(stem)?;
    let doc_type = caps.get(1).map(|m| m.as_str()).or(dir_type)?;
    from_filename(doc_type, &caps[2])
}

/// Derives an RFC identifier from a stored file stem such as `rfc5280`.
pub fn rfc_from_stem(stem: &str) -> Option<String> {
    let caps = RFC_STEM_RE.captures(stem.trim())?;
    rfc(&caps[1])
}

/// Canonical `RFC <n>` with leading zeros stripped. `RFC 0` does not exist.
pub fn rfc(digits: &str) -> Option<String> {
    let number: u32 = digits.trim().parse().ok()?;
    (number > 0).then(|| format!("RFC {number}"))
}

/// Number of an RFC identifier, for building its source location.
pub fn rfc_number(id: &str) -> Option<u32> {
    let number: u32 = id.strip_prefix("RFC ")?.trim().parse().ok()?;
    (number > 0).then_some(number)
}

/// Canonical international-standard identifier.
///
/// En-dashes become hyphens and whitespace around dashes is removed, so
/// `ISO/IEC 18013 – 5` becomes `ISO/IEC 18013-5`.
pub fn iso(prefix: &str, number: &str) -> Option<String> {
    let prefix = prefix.split_whitespace().collect::<Vec<_>>().join(" ");
    let number: String = number
        .replace(['\u{2013}', '\u{2014}'], "-")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if number.is_empty() || number.starts_with('-') || number.ends_with('-') {
        return None;
    }
    Some(format!("{} {}", prefix.to_ascii_uppercase(), number))
}

/// Canonical telecom recommendation: `ITU-T` plus letter and digits with
/// whitespace and periods removed (`X. 509` becomes `X509`).
pub fn itu(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect::<String>()
        .to_ascii_uppercase();
    let mut chars = compact.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() || !chars.as_str().chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if chars.as_str().is_empty() {
        return None;
    }
    Some(format!("ITU-T {compact}"))
}

/// Canonical web-consortium identifier, upper-cased. Generic words that follow
/// "W3C" in running text are rejected.
pub fn w3c(token: &str) -> Option<String> {
    const GENERIC: [&str; 2] = ["technical", "recommendation"];
    let token = token.trim().trim_end_matches(['.', ',', ';', ':']);
    if token.is_empty() || GENERIC.iter().any(|g| token.eq_ignore_ascii_case(g)) {
        return None;
    }
    Some(format!("W3C {}", token.to_ascii_uppercase()))
}

fn part_suffix(digits: &str) -> Option<Option<u32>> {
    let part: u32 = digits.parse().ok()?;
    Some((part > 0).then_some(part))
}

fn compose(doc_type: &str, group1: &str, group2: &str, part: Option<u32>) -> String {
    match part {
        Some(part) => format!("{doc_type} {group1} {group2}-{part}"),
        None => format!("{doc_type} {group1} {group2}"),
    }
}
