//! The on-disk corpus of acquired documents.
//!
//! Layout under the corpus root:
//!
//! ```text
//! EN/en_319403v020301p.pdf            published primary documents, one dir per type
//! TS/ts_11910201v010401p.pdf
//! drafts/ts_11910201v010501p.pdf      drafts, read only when drafts are included
//! external/rfc/rfc5280.txt            acquired RFCs
//! external/openid/<slug>.html         acquired foundation profiles
//! ```
//!
//! A file existing for a canonical identifier is the only "already acquired"
//! signal.

use std::path::{Path, PathBuf};

use crate::config::CorpusConfig;
use crate::error::AppError;
use crate::extract::{normalize, profiles};
use crate::models::Domain;

const DRAFTS_DIR: &str = "drafts";
const EXTERNAL_DIR: &str = "external";
const RFC_DIR: &str = "rfc";
const OPENID_DIR: &str = "openid";

/// A document held in the corpus with its derived identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
    pub id: String,
    pub domain: Domain,
    pub path: PathBuf,
    pub is_draft: bool,
}

/// Filesystem view of the corpus.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    include_drafts: bool,
}

impl Corpus {
    pub fn new(root: impl Into<PathBuf>, include_drafts: bool) -> Self {
        Self {
            root: root.into(),
            include_drafts,
        }
    }

    pub fn from_config(config: &CorpusConfig) -> Self {
        Self::new(config.root.clone(), config.include_drafts)
    }

    /// Lists every identifiable document, sorted by path.
    ///
    /// Files whose name cannot be mapped to an identifier are skipped.
    pub fn documents(&self) -> Result<Vec<CorpusDocument>, AppError> {
        if !self.root.is_dir() {
            return Err(AppError::CorpusNotFound(self.root.clone()));
        }

        let mut files = Vec::new();
        collect_files(&self.root, &mut files)?;
        files.sort();

        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            match self.identify(&path) {
                Some(doc) if doc.is_draft && !self.include_drafts => {
                    tracing::debug!("Skipping draft {}", path.display());
                }
                Some(doc) => documents.push(doc),
                None => tracing::debug!("No identifier for {}", path.display()),
            }
        }
        Ok(documents)
    }

    /// Derives a document identity from a path inside the corpus.
    pub fn identify(&self, path: &Path) -> Option<CorpusDocument> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let stem = path.file_stem()?.to_str()?;
        let dirs: Vec<&str> = relative
            .parent()?
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();

        let (id, domain, is_draft) = match dirs.as_slice() {
            [EXTERNAL_DIR, RFC_DIR, ..] => (normalize::rfc_from_stem(stem)?, Domain::Rfc, false),
            [EXTERNAL_DIR, OPENID_DIR, ..] => (
                profiles::by_slug(stem)?.name.to_string(),
                Domain::OpenId,
                false,
            ),
            [EXTERNAL_DIR, ..] => return None,
            [DRAFTS_DIR, rest @ ..] => (
                normalize::from_file_stem(stem, rest.first().copied())?,
                Domain::Etsi,
                true,
            ),
            [type_dir, ..] => (
                normalize::from_file_stem(stem, Some(*type_dir))?,
                Domain::Etsi,
                false,
            ),
            [] => (normalize::from_file_stem(stem, None)?, Domain::Etsi, false),
        };

        Some(CorpusDocument {
            id,
            domain,
            path: path.to_path_buf(),
            is_draft,
        })
    }

    /// Where an acquired document of an acquirable domain is stored.
    pub fn storage_path(&self, id: &str, domain: Domain) -> Option<PathBuf> {
        let external = self.root.join(EXTERNAL_DIR);
        match domain {
            Domain::Rfc => {
                let number = normalize::rfc_number(id)?;
                Some(external.join(RFC_DIR).join(format!("rfc{number}.txt")))
            }
            Domain::OpenId => {
                let family = profiles::by_name(id)?;
                Some(external.join(OPENID_DIR).join(format!("{}.html", family.slug)))
            }
            _ => None,
        }
    }

    /// Whether content for `id` has already been acquired.
    pub fn contains(&self, id: &str, domain: Domain) -> bool {
        self.storage_path(id, domain).is_some_and(|p| p.is_file())
    }

    /// Writes acquired content and returns its path.
    ///
    /// Content is written to a temporary sibling and renamed into place, so a
    /// failed write never leaves a partial file that would count as acquired.
    pub async fn store(
        &self,
        id: &str,
        domain: Domain,
        content: &[u8],
    ) -> Result<PathBuf, AppError> {
        let path = self.storage_path(id, domain).ok_or_else(|| {
            AppError::acquisition(id, format!("no storage location for {domain}"))
        })?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let partial = path.with_extension("part");
        tokio::fs::write(&partial, content).await?;
        tokio::fs::rename(&partial, &path).await?;
        Ok(path)
    }
}

/// Walks `dir` recursively. Only failing to read `dir` itself is an error;
/// unreadable entries and subdirectories below it are logged and skipped.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), AppError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                continue;
            }
        };
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden {
            continue;
        }
        let is_dir = match entry.file_type() {
            Ok(file_type) => file_type.is_dir(),
            Err(err) => {
                tracing::warn!("Skipping {}: {}", path.display(), err);
                continue;
            }
        };
        if is_dir {
            if let Err(err) = collect_files(&path, out) {
                tracing::warn!("Skipping directory {}: {}", path.display(), err);
            }
        } else if path.extension().is_some_and(|ext| ext != "part") {
            out.push(path);
        }
    }
    Ok(())
}
