//! End-to-end crawl tests against a temporary corpus and an in-memory fetcher.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use refgraph::config::CrawlConfig;
use refgraph::error::AppError;
use refgraph::models::{Classification, Domain};
use refgraph::services::{resolve, CrawlEvent, Crawler, StopReason};
use refgraph::sources::{Corpus, CorpusTextExtractor, Fetcher};
use tempfile::TempDir;
use url::Url;

const POLICY_DOC: &str = "\
1 Scope
The present document specifies general policy requirements.

2 References
2.1 Normative references
[1] ETSI EN 319 411-1: Policy and security requirements for TSPs issuing certificates.

2.2 Informative references
Not applicable.

3 Definitions
";

const CERT_DOC: &str = "\
1 Scope
Requirements for trust service providers issuing certificates.

2 References
2.1 Normative references
Not applicable.

2.2 Informative references
[i.1] IETF RFC 3647: Internet X.509 Public Key Infrastructure Certificate Policy.

3 Definitions
";

const RFC_TEXT: &str = "\
Network Working Group
Request for Comments: 3647

Internet X.509 Public Key Infrastructure
Certificate Policy and Certification Practices Framework
";

/// Serves canned bodies and counts calls per location.
#[derive(Default)]
struct StubFetcher {
    bodies: HashMap<String, Vec<u8>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    fn serving(mut self, id: &str, domain: Domain, body: &str) -> Self {
        let location = resolve(id, domain).unwrap();
        self.bodies
            .insert(location.to_string(), body.as_bytes().to_vec());
        self
    }

    fn calls_for(&self, id: &str, domain: Domain) -> usize {
        let location = resolve(id, domain).unwrap();
        self.calls
            .lock()
            .unwrap()
            .get(location.as_str())
            .copied()
            .unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, location: &Url) -> Result<Vec<u8>, AppError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(location.to_string())
            .or_default() += 1;
        self.bodies
            .get(location.as_str())
            .cloned()
            .ok_or_else(|| AppError::acquisition(location.as_str(), "404 Not Found"))
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn two_document_corpus() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "EN/en_319401v020301p.txt", POLICY_DOC);
    write(dir.path(), "EN/en_31941101v010301p.txt", CERT_DOC);
    dir
}

fn config(max_depth: u32) -> CrawlConfig {
    CrawlConfig {
        max_depth,
        ..CrawlConfig::default().without_delays()
    }
}

fn crawler(root: &Path, fetcher: Arc<StubFetcher>, config: CrawlConfig) -> Crawler {
    Crawler::new(
        Corpus::new(root, false),
        Arc::new(CorpusTextExtractor::new()),
        fetcher,
        config,
    )
}

#[tokio::test]
async fn test_depth_zero_reports_frontier_without_fetching() {
    let corpus = two_document_corpus();
    let fetcher = Arc::new(StubFetcher::default());
    let report = crawler(corpus.path(), fetcher.clone(), config(0))
        .run()
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::DepthReached);
    assert_eq!(report.iterations, 1);
    assert_eq!(report.graph.node_count(), 3);
    assert_eq!(report.graph.edge_count(), 2);
    assert_eq!(report.remaining, vec!["RFC 3647"]);
    assert!(!report.graph.is_present("RFC 3647"));
    assert_eq!(fetcher.total_calls(), 0);

    let edges = report.graph.edges();
    assert!(edges.iter().any(|e| e.from == "EN 319 401"
        && e.to == "EN 319 411-1"
        && e.classification == Classification::Normative));
    assert!(edges.iter().any(|e| e.from == "EN 319 411-1"
        && e.to == "RFC 3647"
        && e.classification == Classification::Informative
        && e.domain == Domain::Rfc));
}

#[tokio::test]
async fn test_depth_one_acquires_and_reaches_fixed_point() {
    let corpus = two_document_corpus();
    let fetcher = Arc::new(StubFetcher::default().serving("RFC 3647", Domain::Rfc, RFC_TEXT));
    let report = crawler(corpus.path(), fetcher.clone(), config(1))
        .run()
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::FixedPoint);
    assert_eq!(report.iterations, 2);
    assert_eq!(report.acquisition_passes, 1);
    assert_eq!(report.acquired, vec!["RFC 3647"]);
    assert!(report.graph.is_present("RFC 3647"));
    assert_eq!(report.graph.node_count(), 3);
    assert_eq!(report.graph.edge_count(), 2);
    assert!(corpus.path().join("external/rfc/rfc3647.txt").is_file());
    assert_eq!(fetcher.calls_for("RFC 3647", Domain::Rfc), 1);
}

#[tokio::test]
async fn test_second_crawl_skips_acquired_documents() {
    let corpus = two_document_corpus();
    let fetcher = Arc::new(StubFetcher::default().serving("RFC 3647", Domain::Rfc, RFC_TEXT));
    let first = crawler(corpus.path(), fetcher.clone(), config(1))
        .run()
        .await
        .unwrap();
    let second = crawler(corpus.path(), fetcher.clone(), config(1))
        .run()
        .await
        .unwrap();

    assert_eq!(second.stop_reason, StopReason::FixedPoint);
    assert_eq!(second.iterations, 1);
    assert_eq!(first.graph, second.graph);
    assert_eq!(fetcher.total_calls(), 1);
}

#[tokio::test]
async fn test_corpus_without_external_references_is_a_fixed_point() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "EN/en_319401v020301p.txt", POLICY_DOC);
    let fetcher = Arc::new(StubFetcher::default());
    let report = crawler(dir.path(), fetcher.clone(), config(3))
        .run()
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::FixedPoint);
    assert_eq!(report.iterations, 1);
    assert!(report.remaining.is_empty());
    assert_eq!(fetcher.total_calls(), 0);
}

#[tokio::test]
async fn test_circuit_breaker_abandons_remaining_rfcs() {
    let dir = tempfile::tempdir().unwrap();
    let citations: String = (1001..=1012)
        .map(|n| format!("[i.{n}] IETF RFC {n}: Some protocol.\n"))
        .collect();
    write(
        dir.path(),
        "TS/ts_119612v020101p.txt",
        &format!("2 References\n2.2 Informative references\n{citations}\n3 Definitions\n"),
    );
    let fetcher = Arc::new(StubFetcher::default());
    let report = crawler(dir.path(), fetcher.clone(), config(1))
        .run()
        .await
        .unwrap();

    for n in 1001..=1010 {
        assert_eq!(fetcher.calls_for(&format!("RFC {n}"), Domain::Rfc), 3);
    }
    assert_eq!(fetcher.calls_for("RFC 1011", Domain::Rfc), 0);
    assert_eq!(fetcher.calls_for("RFC 1012", Domain::Rfc), 0);

    assert_eq!(report.breaker_trips(), 1);
    assert_eq!(
        report.events,
        vec![CrawlEvent::BreakerTripped {
            pass: 1,
            consecutive_failures: 10,
            abandoned: vec!["RFC 1011".to_string(), "RFC 1012".to_string()],
        }]
    );
    // The trip ends the pass, the depth bound ends the crawl.
    assert_eq!(report.stop_reason, StopReason::DepthReached);
    assert_eq!(report.iterations, 2);
    assert_eq!(report.failed.len(), 10);
    assert_eq!(report.remaining.len(), 12);
}

#[tokio::test]
async fn test_profiles_get_a_single_attempt() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "TS/ts_11946201v010101p.txt",
        "2 References\n\
         2.1 Normative references\n\
         [1] OpenID for Verifiable Presentations.\n\
         [2] OpenID Connect.\n\
         3 Definitions\n",
    );
    let fetcher = Arc::new(StubFetcher::default());
    let report = crawler(dir.path(), fetcher.clone(), config(2))
        .run()
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::NoProgress);
    assert_eq!(fetcher.calls_for("OpenID4VP", Domain::OpenId), 1);
    assert_eq!(fetcher.total_calls(), 1);
    assert!(report.failed.contains("OpenID4VP"));
    assert!(report.unresolved.contains("OpenID Connect"));
    assert_eq!(report.remaining, vec!["OpenID4VP"]);
}

#[tokio::test]
async fn test_acquired_profile_becomes_present() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "TS/ts_11946201v010101p.txt",
        "2 References\n\
         2.1 Normative references\n\
         [1] OpenID for Verifiable Credential Issuance.\n\
         3 Definitions\n",
    );
    let fetcher = Arc::new(StubFetcher::default().serving(
        "OpenID4VCI",
        Domain::OpenId,
        "<html><body><h1>OpenID for Verifiable Credential Issuance</h1></body></html>",
    ));
    let report = crawler(dir.path(), fetcher.clone(), config(1))
        .run()
        .await
        .unwrap();

    assert_eq!(report.stop_reason, StopReason::FixedPoint);
    assert!(report.graph.is_present("OpenID4VCI"));
    assert_eq!(report.graph.node("OpenID4VCI").unwrap().domain, Domain::OpenId);
}

#[tokio::test]
async fn test_unreadable_documents_stay_present() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "EN/en_319401v020301p.txt", POLICY_DOC);
    write(dir.path(), "EN/en_319412v010101p.docx", "binary");
    let fetcher = Arc::new(StubFetcher::default());
    let report = crawler(dir.path(), fetcher, config(0)).run().await.unwrap();

    assert_eq!(report.format_errors.len(), 1);
    assert_eq!(report.format_errors[0].id, "EN 319 412");
    assert!(report.graph.is_present("EN 319 412"));
    assert_eq!(report.graph.outbound("EN 319 412"), 0);
}

#[tokio::test]
async fn test_drafts_are_ignored_unless_included() {
    let dir = two_document_corpus();
    write(
        dir.path(),
        "drafts/en_319401v020401p.txt",
        "2.1 Normative references\n[1] ETSI TS 119 312: Cryptographic suites.\n",
    );

    let published_only = Crawler::new(
        Corpus::new(dir.path(), false),
        Arc::new(CorpusTextExtractor::new()),
        Arc::new(StubFetcher::default()),
        config(0),
    );
    let pass = published_only.extract_pass().await.unwrap();
    assert!(pass.graph.node("TS 119 312").is_none());

    let with_drafts = Crawler::new(
        Corpus::new(dir.path(), true),
        Arc::new(CorpusTextExtractor::new()),
        Arc::new(StubFetcher::default()),
        config(0),
    );
    let pass = with_drafts.extract_pass().await.unwrap();
    let node = pass.graph.node("EN 319 401").unwrap();
    assert!(!node.is_draft);
    assert!(pass.graph.node("TS 119 312").is_some());
}

#[tokio::test]
async fn test_missing_corpus_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = crawler(
        &dir.path().join("missing"),
        Arc::new(StubFetcher::default()),
        config(1),
    )
    .run()
    .await;
    assert!(matches!(result, Err(AppError::CorpusNotFound(_))));
}
