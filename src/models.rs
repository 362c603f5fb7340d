//! Core data models used throughout secrag.
//!
//! These types represent the chunk records that flow through the ingestion
//! and retrieval pipeline, plus the structured outcomes of store operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted chunk record — the atomic retrievable unit.
///
/// Serialized one-per-line into the JSONL backend; field names are
/// load-bearing for on-disk compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic id: first 8 hex chars of sha256(filename), underscore,
    /// chunk index. Re-ingesting the same document yields the same ids.
    pub id: String,
    /// Source filename — the document grouping key.
    pub filename: String,
    /// Literal chunk text, never empty.
    pub text: String,
    /// Embedding vector; same length for every chunk in a store.
    pub vector: Vec<f32>,
    /// Zero-based position within the source document.
    pub chunk_index: i64,
    /// Total chunks produced from the source document.
    pub total_chunks: i64,
    /// Ingestion timestamp (RFC 3339 UTC on disk).
    pub upload_time: DateTime<Utc>,
    /// Caller-supplied metadata, carried through to search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// A ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub text: String,
    /// JSON object holding `filename`, `chunk_index`, `total_chunks`, merged
    /// with the chunk's caller-supplied metadata.
    pub metadata: serde_json::Value,
    pub similarity: f32,
    /// `1.0 - similarity`, for consumers that expect distances.
    pub distance: f32,
}

/// Result of a successful `add`.
#[derive(Debug, Clone)]
pub struct AddReport {
    pub filename: String,
    /// Chunks written for this document.
    pub chunks: usize,
    /// Characters of extracted text.
    pub total_chars: usize,
    /// Prior chunks replaced by this upsert (0 on first ingestion).
    pub replaced: usize,
}

/// Structured outcome of a `delete` — absence is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { chunks: usize },
    NotFound,
}

/// Store-wide statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_chunks: usize,
    /// Distinct filenames.
    pub total_documents: usize,
    pub embedding_model: String,
    pub embedding_dims: usize,
}
