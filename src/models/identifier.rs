//! Identifier domains and reference classifications.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The numbering scheme an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Primary corpus standards (`EN 319 403`, `TS 119 102-1`).
    Etsi,
    /// IETF Request for Comments (`RFC 5280`).
    Rfc,
    /// International standards (`ISO/IEC 18013-5`).
    Iso,
    /// Telecom recommendations (`ITU-T X509`).
    Itu,
    /// Web consortium specifications (`W3C VC-DATA-MODEL`).
    W3c,
    /// Foundation profiles from a closed vocabulary (`OpenID4VCI`).
    OpenId,
}

impl Domain {
    /// All domains in scan order.
    pub const ALL: [Domain; 6] = [
        Domain::Etsi,
        Domain::Rfc,
        Domain::Iso,
        Domain::Itu,
        Domain::W3c,
        Domain::OpenId,
    ];

    /// Whether the crawler knows how to acquire documents of this domain.
    pub fn is_acquirable(self) -> bool {
        matches!(self, Domain::Rfc | Domain::OpenId)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Etsi => "etsi",
            Domain::Rfc => "rfc",
            Domain::Iso => "iso",
            Domain::Itu => "itu",
            Domain::W3c => "w3c",
            Domain::OpenId => "open_id",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which references section a citation was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Normative,
    Informative,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Normative => f.write_str("normative"),
            Classification::Informative => f.write_str("informative"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquirable_domains() {
        let acquirable: Vec<_> = Domain::ALL
            .into_iter()
            .filter(|d| d.is_acquirable())
            .collect();
        assert_eq!(acquirable, vec![Domain::Rfc, Domain::OpenId]);
    }

    #[test]
    fn test_domain_serialization() {
        assert_eq!(serde_json::to_string(&Domain::OpenId).unwrap(), "\"open_id\"");
        assert_eq!(
            serde_json::to_string(&Classification::Normative).unwrap(),
            "\"normative\""
        );
    }
}
