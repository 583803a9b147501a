//! External collaborators: the document store, text extraction and fetching.
//!
//! The reference graph engine only talks to these through the types below, so
//! tests can substitute in-memory implementations.

mod corpus;
mod fetch;
mod text;

pub use corpus::{Corpus, CorpusDocument};
pub use fetch::{Fetcher, HttpFetcher};
pub use text::{html_to_text, CorpusTextExtractor, TextExtractor};
