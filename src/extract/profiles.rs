//! Foundation-profile alias registry.
//!
//! Foundation profiles have no numbering scheme, so they are recognized from a
//! closed vocabulary instead of an open pattern. Each family lists the phrases
//! that name it in running text and where its published text can be fetched.
//! Adding a family means adding a row here and bumping `REGISTRY_VERSION`.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Version of the alias table below.
pub const REGISTRY_VERSION: u32 = 3;

/// A family of foundation specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileFamily {
    /// Canonical identifier used as the graph node id.
    pub name: &'static str,
    /// File stem used when the document is stored in the corpus.
    pub slug: &'static str,
    /// Lowercase phrases that name this family.
    pub aliases: &'static [&'static str],
    /// Where the published text lives, if anywhere.
    pub location: Option<&'static str>,
}

/// The registry table. Longer, more specific aliases are listed first within
/// each family; matching across families is by phrase so order between
/// families does not matter.
pub static PROFILE_FAMILIES: &[ProfileFamily] = &[
    ProfileFamily {
        name: "OpenID4VCI",
        slug: "openid-4-verifiable-credential-issuance",
        aliases: &["openid4vci", "oid4vci", "openid for verifiable credential issuance"],
        location: Some(
            "https://openid.net/specs/openid-4-verifiable-credential-issuance-1_0.html",
        ),
    },
    ProfileFamily {
        name: "OpenID4VP",
        slug: "openid-4-verifiable-presentations",
        aliases: &["openid4vp", "oid4vp", "openid for verifiable presentations"],
        location: Some("https://openid.net/specs/openid-4-verifiable-presentations-1_0.html"),
    },
    ProfileFamily {
        name: "SIOPv2",
        slug: "openid-connect-self-issued-v2",
        aliases: &["siopv2", "self-issued openid provider"],
        location: Some("https://openid.net/specs/openid-connect-self-issued-v2-1_0.html"),
    },
    ProfileFamily {
        name: "OpenID4VC HAIP",
        slug: "openid4vc-high-assurance-interoperability-profile",
        aliases: &["haip", "high assurance interoperability profile"],
        location: Some(
            "https://openid.net/specs/openid4vc-high-assurance-interoperability-profile-1_0.html",
        ),
    },
    ProfileFamily {
        name: "OpenID Connect Core",
        slug: "openid-connect-core",
        aliases: &["openid connect core"],
        location: Some("https://openid.net/specs/openid-connect-core-1_0.html"),
    },
    ProfileFamily {
        name: "OpenID Connect Discovery",
        slug: "openid-connect-discovery",
        aliases: &["openid connect discovery"],
        location: Some("https://openid.net/specs/openid-connect-discovery-1_0.html"),
    },
    ProfileFamily {
        name: "OpenID Federation",
        slug: "openid-federation",
        aliases: &["openid federation"],
        location: Some("https://openid.net/specs/openid-federation-1_0.html"),
    },
    ProfileFamily {
        name: "OpenID Connect",
        slug: "openid-connect",
        aliases: &["openid connect"],
        location: None,
    },
];

/// Phrases that collapse a raw match onto one family regardless of which alias
/// produced it.
const COLLAPSE_RULES: &[(&str, &str)] = &[
    ("credential issuance", "OpenID4VCI"),
    ("verifiable presentation", "OpenID4VP"),
    ("self-issued", "SIOPv2"),
];

static ALIAS_RE: Lazy<Regex> = Lazy::new(|| {
    let mut aliases: Vec<&str> = PROFILE_FAMILIES
        .iter()
        .flat_map(|f| f.aliases.iter().copied())
        .collect();
    // Longest first so "openid connect core" wins over "openid connect".
    aliases.sort_by_key(|a| std::cmp::Reverse(a.len()));
    let alternation = aliases
        .iter()
        .map(|a| regex::escape(a).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid regex")
});

/// Finds every profile family named in `text`.
pub fn classify(text: &str) -> BTreeSet<String> {
    ALIAS_RE
        .find_iter(text)
        .filter_map(|m| canonical_family(m.as_str()))
        .map(|family| family.name.to_string())
        .collect()
}

/// Maps one raw alias match to its family.
pub fn canonical_family(raw: &str) -> Option<&'static ProfileFamily> {
    let phrase = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if let Some((_, name)) = COLLAPSE_RULES
        .iter()
        .find(|(needle, _)| phrase.contains(needle))
    {
        return by_name(name);
    }
    PROFILE_FAMILIES
        .iter()
        .find(|f| f.aliases.contains(&phrase.as_str()))
}

pub fn by_name(name: &str) -> Option<&'static ProfileFamily> {
    PROFILE_FAMILIES.iter().find(|f| f.name == name)
}

pub fn by_slug(slug: &str) -> Option<&'static ProfileFamily> {
    PROFILE_FAMILIES.iter().find(|f| f.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issuance_phrases_collapse() {
        let found = classify(
            "as defined in OpenID for Verifiable Credential Issuance and OID4VCI draft 13",
        );
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["OpenID4VCI"]);
    }

    #[test]
    fn test_longest_alias_wins() {
        let found = classify("See OpenID Connect Core 1.0 incorporating errata set 2.");
        assert!(found.contains("OpenID Connect Core"));
        assert!(!found.contains("OpenID Connect"));
    }

    #[test]
    fn test_multiline_alias() {
        let found = classify("OpenID for Verifiable\nPresentations, SIOPv2 and HAIP");
        assert!(found.contains("OpenID4VP"));
        assert!(found.contains("SIOPv2"));
        assert!(found.contains("OpenID4VC HAIP"));
    }

    #[test]
    fn test_unrelated_text() {
        assert!(classify("OpenAPI and OAuth 2.0 are not in the registry").is_empty());
    }

    #[test]
    fn test_lookups() {
        assert!(by_name("OpenID4VP").unwrap().location.is_some());
        assert!(by_name("OpenID Connect").unwrap().location.is_none());
        assert_eq!(
            by_slug("openid-connect-self-issued-v2").map(|f| f.name),
            Some("SIOPv2")
        );
        for family in PROFILE_FAMILIES {
            assert_eq!(by_slug(family.slug), Some(family));
        }
    }
}
