//! Extract command handler.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;

use crate::extract::ReferenceExtractor;
use crate::models::Domain;
use crate::sources::{Corpus, CorpusDocument, CorpusTextExtractor, TextExtractor};

/// Show how the references of one document are classified.
#[derive(Parser)]
pub struct ExtractCommand {
    /// Document to extract (txt, md, html or pdf).
    pub file: PathBuf,
}

impl ExtractCommand {
    pub async fn run(self) -> Result<()> {
        let parent = self
            .file
            .parent()
            .ok_or_else(|| eyre!("{} is not a file path", self.file.display()))?;
        let document = Corpus::new(parent, true)
            .identify(&self.file)
            .unwrap_or_else(|| {
                let stem = self
                    .file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tracing::debug!(
                    "No canonical identifier for {}, using {}",
                    self.file.display(),
                    stem
                );
                CorpusDocument {
                    id: stem,
                    domain: Domain::Etsi,
                    path: self.file.clone(),
                    is_draft: false,
                }
            });

        let text = CorpusTextExtractor::new()
            .extract_text(&self.file)
            .await
            .wrap_err_with(|| format!("Failed to read {}", self.file.display()))?;
        let extraction = ReferenceExtractor::new().extract(&document, &text);

        println!("{}", serde_json::to_string_pretty(&extraction)?);
        Ok(())
    }
}
