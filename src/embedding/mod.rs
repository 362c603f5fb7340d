//! Embedding provider abstraction and implementations.
//!
//! Defines the [`Embedder`] trait and concrete implementations:
//! - **[`KeywordEmbedder`]** — deterministic keyword-frequency vectors over a
//!   fixed security vocabulary; no network, no model weights.
//! - **[`RemoteEmbedder`]** — dense vectors from an Ollama-compatible
//!   `/api/embed` endpoint with retry and backoff (see [`remote`]).
//!
//! Both satisfy the identical contract — `embed` returns exactly `dims()`
//! values for any input, including the empty string — so the dense provider
//! is a config-selected drop-in for the baseline.
//!
//! Use [`create_embedder`] to instantiate the provider named in the
//! configuration.

pub mod remote;

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::error::StoreError;

pub use remote::RemoteEmbedder;

/// The default keyword vocabulary: security-operations terms, ordered.
/// Vector component `i` is the normalized frequency of term `i`.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "attack",
    "threat",
    "vulnerability",
    "malware",
    "ransomware",
    "phishing",
    "firewall",
    "encryption",
    "security",
    "breach",
    "ddos",
    "sql injection",
    "xss",
    "authentication",
    "authorization",
    "password",
    "network",
    "intrusion",
    "detection",
    "prevention",
];

/// Maps text to a fixed-length feature vector.
///
/// Implementations must return exactly [`dims`](Embedder::dims) values for
/// any input and must not fail on empty input (empty text embeds to the
/// zero vector).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model descriptor reported in store stats (e.g. `"keyword-frequency"`).
    fn name(&self) -> &str;

    /// Fixed output dimensionality.
    fn dims(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError>;

    /// Embed a batch of texts, in input order.
    ///
    /// The default implementation loops [`embed`](Embedder::embed);
    /// providers with a native batch API override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Baseline in-process embedder: keyword frequencies over a fixed vocabulary.
///
/// Lowercases the input, counts non-overlapping substring occurrences of
/// each vocabulary term, and L1-normalizes the counts. A text containing no
/// vocabulary term embeds to the all-zero vector, never NaN. Deterministic
/// and allocation-light; a degraded-mode stand-in for a dense model.
pub struct KeywordEmbedder {
    vocabulary: Vec<String>,
}

impl KeywordEmbedder {
    /// Construct with the default security vocabulary.
    pub fn new() -> Self {
        Self {
            vocabulary: DEFAULT_VOCABULARY.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Construct with a custom vocabulary. Terms are lowercased; an empty
    /// vocabulary or an empty term is a configuration error.
    pub fn with_vocabulary(vocabulary: Vec<String>) -> Result<Self, StoreError> {
        if vocabulary.is_empty() {
            return Err(StoreError::EmbeddingFailed(
                "keyword vocabulary must not be empty".to_string(),
            ));
        }
        let vocabulary: Vec<String> = vocabulary.into_iter().map(|t| t.to_lowercase()).collect();
        if vocabulary.iter().any(|t| t.trim().is_empty()) {
            return Err(StoreError::EmbeddingFailed(
                "keyword vocabulary terms must not be empty".to_string(),
            ));
        }
        Ok(Self { vocabulary })
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let counts: Vec<f32> = self
            .vocabulary
            .iter()
            .map(|term| lower.matches(term.as_str()).count() as f32)
            .collect();

        let total: f32 = counts.iter().sum();
        let divisor = if total == 0.0 { 1.0 } else { total };
        counts.into_iter().map(|c| c / divisor).collect()
    }
}

impl Default for KeywordEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword-frequency"
    }

    fn dims(&self) -> usize {
        self.vocabulary.len()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        Ok(self.embed_sync(text))
    }
}

/// Create the [`Embedder`] named by the configuration.
///
/// Supported providers: `"keyword"` (default) and `"remote"`. Unknown
/// provider names are a configuration error at startup, never at call time.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>, StoreError> {
    match config.provider.as_str() {
        "keyword" => match &config.vocabulary {
            Some(vocab) => Ok(Box::new(KeywordEmbedder::with_vocabulary(vocab.clone())?)),
            None => Ok(Box::new(KeywordEmbedder::new())),
        },
        "remote" => Ok(Box::new(RemoteEmbedder::new(config)?)),
        other => Err(StoreError::EmbeddingFailed(format!(
            "unknown embedding provider: {}",
            other
        ))),
    }
}
