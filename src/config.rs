//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/refgraph/config.toml` (XDG) or platform config dir
//! 2. Project config: `.refgraph.toml`
//! 3. Environment variables: `REFGRAPH_*` (nested keys separated by `__`)
//! 4. Command line flags (applied by the CLI after loading)
//!
//! Every field has a default, so an empty configuration is valid:
//!
//! ```toml
//! [corpus]
//! root = "corpus"
//! include_drafts = false
//!
//! [crawl]
//! max_depth = 1
//! rate_limit_ms = 1000
//! iteration_delay_ms = 2000
//! rfc_max_attempts = 3
//! backoff_base_ms = 1000
//! attempt_timeout_secs = 30
//! breaker_threshold = 10
//!
//! [output]
//! path = "reference-graph.json"
//! ```

use std::ops::Deref;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where acquired documents live and which of them take part in a pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Root of the document tree (type directories, `drafts/`, `external/`).
    #[serde(default = "default_corpus_root")]
    pub root: PathBuf,
    /// Whether documents under `drafts/` are extracted.
    #[serde(default)]
    pub include_drafts: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: default_corpus_root(),
            include_drafts: false,
        }
    }
}

/// Knobs for the crawl loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum number of acquisition passes.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Delay between successive acquisitions, in milliseconds.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    /// Delay between crawl iterations, in milliseconds.
    #[serde(default = "default_iteration_delay_ms")]
    pub iteration_delay_ms: u64,
    /// Attempts per RFC before the item counts as failed.
    #[serde(default = "default_rfc_max_attempts")]
    pub rfc_max_attempts: u32,
    /// First backoff delay; doubled after every failed attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Upper bound on a single acquisition attempt.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
    /// Consecutive failed items that abort the remaining RFC acquisitions.
    #[serde(default = "default_breaker_threshold")]
    pub breaker_threshold: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            rate_limit_ms: default_rate_limit_ms(),
            iteration_delay_ms: default_iteration_delay_ms(),
            rfc_max_attempts: default_rfc_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            breaker_threshold: default_breaker_threshold(),
        }
    }
}

impl CrawlConfig {
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn iteration_delay(&self) -> Duration {
        Duration::from_millis(self.iteration_delay_ms)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Backoff before retry number `attempt` (1-based): `base * 2^(attempt - 1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// A configuration with every delay set to zero, used by tests and dry runs.
    pub fn without_delays(self) -> Self {
        Self {
            rate_limit_ms: 0,
            iteration_delay_ms: 0,
            backoff_base_ms: 0,
            ..self
        }
    }
}

/// Snapshot output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON graph snapshot.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_corpus_root() -> PathBuf {
    PathBuf::from("corpus")
}

fn default_max_depth() -> u32 {
    1
}

fn default_rate_limit_ms() -> u64 {
    1000
}

fn default_iteration_delay_ms() -> u64 {
    2000
}

fn default_rfc_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_attempt_timeout_secs() -> u64 {
    30
}

fn default_breaker_threshold() -> u32 {
    10
}

fn default_output_path() -> PathBuf {
    PathBuf::from("reference-graph.json")
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                // Layer 1: User config (lowest priority)
                .merge(Toml::file(user_config))
                // Layer 2: Project config
                .merge(Toml::file(".refgraph.toml"))
                // Layer 3: Environment variables (highest priority)
                .merge(Env::prefixed("REFGRAPH_").split("__")),
        )
    }

    /// Extract a config from an already assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(ConfigError::from)
    }

    /// User config path: ~/.config/refgraph/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("refgraph").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("refgraph").join("config.toml"))
            .unwrap_or_default()
    }
}
