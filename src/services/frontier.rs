//! Crawl frontier: referenced external documents that can still be acquired.

use std::collections::BTreeSet;

use url::Url;

use crate::extract::{normalize, profiles};
use crate::models::{Domain, ReferenceGraph};

const RFC_EDITOR_BASE: &str = "https://www.rfc-editor.org/rfc/";

/// One document to acquire and where to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    pub id: String,
    pub domain: Domain,
    pub location: Url,
}

/// Missing external documents for the current iteration, split by
/// acquisition class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    /// Foundation profiles resolved through the alias registry.
    pub profiles: Vec<FrontierItem>,
    /// RFCs resolved by number.
    pub rfcs: Vec<FrontierItem>,
    /// Eligible identifiers with no known source location. Reported only.
    pub unresolved: Vec<String>,
}

impl Frontier {
    /// Computes the frontier from a graph snapshot.
    ///
    /// Candidates are edge targets in an acquirable domain whose node holds no
    /// content. Items are ordered by identifier.
    pub fn compute(graph: &ReferenceGraph) -> Self {
        let targets: BTreeSet<(Domain, &str)> = graph
            .edges()
            .iter()
            .filter(|e| e.domain.is_acquirable() && !graph.is_present(&e.to))
            .map(|e| (e.domain, e.to.as_str()))
            .collect();

        let mut frontier = Frontier::default();
        for (domain, id) in targets {
            let Some(location) = resolve(id, domain) else {
                frontier.unresolved.push(id.to_string());
                continue;
            };
            let item = FrontierItem {
                id: id.to_string(),
                domain,
                location,
            };
            match domain {
                Domain::OpenId => frontier.profiles.push(item),
                _ => frontier.rfcs.push(item),
            }
        }
        frontier
    }

    /// True when there is nothing to acquire.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty() && self.rfcs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.profiles.len() + self.rfcs.len()
    }

    /// Identifiers of every item to acquire.
    pub fn ids(&self) -> Vec<String> {
        self.profiles
            .iter()
            .chain(&self.rfcs)
            .map(|item| item.id.clone())
            .collect()
    }
}

/// Resolves an identifier to the location its text is published at.
pub fn resolve(id: &str, domain: Domain) -> Option<Url> {
    match domain {
        Domain::Rfc => {
            let number = normalize::rfc_number(id)?;
            Url::parse(&format!("{RFC_EDITOR_BASE}rfc{number}.txt")).ok()
        }
        Domain::OpenId => Url::parse(profiles::by_name(id)?.location?).ok(),
        _ => None,
    }
}
