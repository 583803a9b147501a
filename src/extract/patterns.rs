//! Citation recognizers for each identifier domain.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::{normalize, profiles};
use crate::models::Domain;

// Deliverable types only, so capitalized prose ("CH 300 301") never matches.
static ETSI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(EN|ES|EG|TS|TR|SR|GS|GR)\s+(\d{3})\s?(\d{3})(?:-(\d{1,2}))?\b")
        .expect("valid regex")
});
static RFC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bRFC\s*-?\s*(\d{1,5})\b").expect("valid regex"));
static ISO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(ISO(?:/IEC)?)(?:\s+(?:TS|TR))?\s+(\d{3,5}(?:\s*[-\x{2013}]\s*\d{1,3})*)")
        .expect("valid regex")
});
static ITU_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bITU-T\s+(?:Recommendation\s+|Rec\.\s*)?([A-Z]\s*\.?\s*\d+(?:\.\d+)*)")
        .expect("valid regex")
});
static W3C_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bW3C\s+([A-Za-z][A-Za-z0-9-]+)").expect("valid regex"));

/// Scans a text region and returns canonical identifiers for one domain.
///
/// Results are sets: an identifier cited ten times in a region appears once.
pub fn scan(region: &str, domain: Domain) -> BTreeSet<String> {
    match domain {
        Domain::Etsi => ETSI_RE
            .find_iter(region)
            .filter_map(|m| normalize::from_citation(m.as_str()))
            .collect(),
        Domain::Rfc => RFC_RE
            .captures_iter(region)
            .filter_map(|c| normalize::rfc(&c[1]))
            .collect(),
        Domain::Iso => ISO_RE
            .captures_iter(region)
            .filter_map(|c| normalize::iso(&c[1], &c[2]))
            .collect(),
        Domain::Itu => ITU_RE
            .captures_iter(region)
            .filter_map(|c| normalize::itu(&c[1]))
            .collect(),
        Domain::W3c => W3C_RE
            .captures_iter(region)
            .filter_map(|c| normalize::w3c(&c[1]))
            .collect(),
        Domain::OpenId => profiles::classify(region),
    }
}

/// Scans a region for the given domains, omitting domains with no match.
pub fn scan_domains(region: &str, domains: &[Domain]) -> BTreeMap<Domain, BTreeSet<String>> {
    domains
        .iter()
        .map(|&domain| (domain, scan(region, domain)))
        .filter(|(_, ids)| !ids.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(region: &str, domain: Domain) -> Vec<String> {
        scan(region, domain).into_iter().collect()
    }

    #[test]
    fn test_etsi_forms() {
        let region = "[1] ETSI EN 319 401: General Policy Requirements.\n\
                      [2] ETSI TS 119 612-2 (V2.1.1).\n\
                      [3] ETSI EN 319401 again.";
        assert_eq!(ids(region, Domain::Etsi), vec!["EN 319 401", "TS 119 612-2"]);
    }

    #[test]
    fn test_etsi_requires_deliverable_type() {
        let region = "Postal code CH 300 301 and DOC 123 456, unlike GS 119 000.";
        assert_eq!(ids(region, Domain::Etsi), vec!["GS 119 000"]);
    }

    #[test]
    fn test_etsi_ignores_longer_numbers() {
        assert!(ids("Order TS 119 6120 has no meaning", Domain::Etsi).is_empty());
    }

    #[test]
    fn test_rfc_dedupes_and_strips_zeros() {
        let region = "IETF RFC 5280, RFC-5280 and RFC 05280; also RFC3647.";
        assert_eq!(ids(region, Domain::Rfc), vec!["RFC 3647", "RFC 5280"]);
    }

    #[test]
    fn test_iso_en_dash() {
        let region = "ISO/IEC 18013\u{2013}5:2021 and ISO/IEC TS 18013-7 and ISO 8601";
        assert_eq!(
            ids(region, Domain::Iso),
            vec!["ISO 8601", "ISO/IEC 18013-5", "ISO/IEC 18013-7"]
        );
    }

    #[test]
    fn test_itu_compaction() {
        let region = "Recommendation ITU-T X.509 and ITU-T Recommendation X. 680";
        assert_eq!(ids(region, Domain::Itu), vec!["ITU-T X509", "ITU-T X680"]);
    }

    #[test]
    fn test_w3c_skips_generic_words() {
        let region = "W3C Recommendation: Verifiable Credentials; W3C technical report; W3C VC-DATA-MODEL";
        assert_eq!(ids(region, Domain::W3c), vec!["W3C VC-DATA-MODEL"]);
    }

    #[test]
    fn test_w3c_mixed_case_is_one_identifier() {
        assert_eq!(
            ids("W3C DID-CORE and later W3C did-core", Domain::W3c),
            vec!["W3C DID-CORE"]
        );
    }

    #[test]
    fn test_openid_uses_registry() {
        let region = "OpenID for Verifiable Credential Issuance";
        assert_eq!(ids(region, Domain::OpenId), vec!["OpenID4VCI"]);
    }

    #[test]
    fn test_scan_domains_omits_empty() {
        let found = scan_domains("RFC 6960 only", &Domain::ALL);
        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&Domain::Rfc));
    }
}
