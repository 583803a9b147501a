//! Normalize command handler.

use std::path::Path;

use clap::Parser;
use color_eyre::Result;

use crate::extract::{normalize, patterns, profiles};
use crate::models::Domain;

/// Print canonical identifiers.
///
/// Each input may be a citation (`ETSI TS 119 612 V2.1.1`), a deliverable file
/// name (`ts_11910201v010401p.pdf`), an acquired RFC file (`rfc5280.txt`) or a
/// foundation profile alias.
#[derive(Parser)]
pub struct NormalizeCommand {
    /// Citations or file names to normalize.
    #[arg(required = true)]
    pub inputs: Vec<String>,
}

impl NormalizeCommand {
    pub fn run(self) -> Result<()> {
        for input in &self.inputs {
            match canonical(input) {
                Some((domain, id)) => println!("{input}\t{domain}\t{id}"),
                None => println!("{input}\t-\t-"),
            }
        }
        Ok(())
    }
}

/// Resolves one input to its domain and canonical identifier.
pub fn canonical(input: &str) -> Option<(Domain, String)> {
    let input = input.trim();
    let path = Path::new(input);
    if path.extension().is_some() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if let Some(id) = normalize::rfc_from_stem(stem) {
                return Some((Domain::Rfc, id));
            }
            if let Some(id) = normalize::from_file_stem(stem, None) {
                return Some((Domain::Etsi, id));
            }
        }
    }

    if let Some(family) = profiles::canonical_family(input) {
        return Some((Domain::OpenId, family.name.to_string()));
    }
    Domain::ALL.into_iter().find_map(|domain| {
        patterns::scan(input, domain)
            .into_iter()
            .next()
            .map(|id| (domain, id))
    })
}
