//! Storage abstraction and the [`DocumentStore`] aggregate.
//!
//! The [`Storage`] trait defines the persistence seam, enabling pluggable
//! backends ([`JsonlStorage`] for durable line-oriented files,
//! [`MemoryStorage`] for tests and embedded use). The [`DocumentStore`]
//! owns the full chunk collection in memory and orchestrates extraction,
//! chunking, embedding, ranking, and persistence.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod jsonl;
pub mod memory;

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::chunk;
use crate::embedding::Embedder;
use crate::error::StoreError;
use crate::extract;
use crate::models::{AddReport, Chunk, DeleteOutcome, SearchHit, StoreStats};
use crate::rank;

pub use jsonl::JsonlStorage;
pub use memory::MemoryStorage;

/// Documents whose extracted text trims below this many characters are
/// rejected as empty — below it nothing meaningful can be retrieved.
pub const MIN_DOCUMENT_CHARS: usize = 10;

/// Abstract persistence backend for the chunk collection.
///
/// `load` is infallible by contract: missing, unreadable, or corrupt prior
/// state yields the empty collection (the backend logs the cause) so that
/// prior-state loss never prevents the store from opening. `persist`
/// replaces the durable state with the given collection; faults surface as
/// [`StoreError::Persist`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load the persisted collection, or empty when none exists.
    async fn load(&self) -> Vec<Chunk>;

    /// Durably replace the persisted collection.
    async fn persist(&self, chunks: &[Chunk]) -> Result<(), StoreError>;
}

/// Chunking parameters applied at ingestion.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingParams {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            chunk_size: chunk::DEFAULT_CHUNK_SIZE,
            overlap: chunk::DEFAULT_OVERLAP,
        }
    }
}

/// The aggregate root: owns the corpus and coordinates the stateless
/// collaborators (extractor, chunker, embedder, ranker).
///
/// Single-writer by construction: mutations take `&mut self`, reads take
/// `&self`. There is no interior locking; callers needing shared access
/// wrap the store themselves (e.g. `tokio::sync::RwLock`). Every mutation
/// persists before the in-memory state is updated, so a persistence fault
/// leaves both memory and disk unchanged.
pub struct DocumentStore {
    chunks: Vec<Chunk>,
    embedder: Box<dyn Embedder>,
    storage: Box<dyn Storage>,
    chunking: ChunkingParams,
}

impl DocumentStore {
    /// Open a store, loading prior state from the backend.
    ///
    /// Loaded chunks whose vector length differs from the embedder's
    /// `dims()` belong to a different embedding configuration; the loaded
    /// collection is discarded and the store starts empty.
    pub async fn open(
        storage: Box<dyn Storage>,
        embedder: Box<dyn Embedder>,
        chunking: ChunkingParams,
    ) -> Self {
        let chunks = storage.load().await;
        let dims = embedder.dims();
        let chunks = if chunks.iter().any(|c| c.vector.len() != dims) {
            warn!(
                dims,
                "persisted vectors do not match embedder dimensionality; starting empty"
            );
            Vec::new()
        } else {
            debug!(chunks = chunks.len(), "loaded persisted collection");
            chunks
        };

        Self {
            chunks,
            embedder,
            storage,
            chunking,
        }
    }

    /// Ingest one file: extract, chunk, embed, and persist.
    ///
    /// Upserts by document name — chunks of a previously added document
    /// with the same filename are replaced, not duplicated. Commit is
    /// all-or-nothing: nothing is observable until the whole chunk set has
    /// been embedded and persisted.
    pub async fn add(
        &mut self,
        path: &Path,
        metadata: Option<serde_json::Value>,
    ) -> Result<AddReport, StoreError> {
        let text = extract::extract_text(path)?;
        if text.chars().count() < MIN_DOCUMENT_CHARS {
            return Err(StoreError::EmptyDocument {
                chars: text.chars().count(),
            });
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let segments = chunk::split(&text, self.chunking.chunk_size, self.chunking.overlap);
        let vectors = self.embedder.embed_batch(&segments).await?;

        let doc_hash = short_hash(&filename);
        let total = segments.len() as i64;
        let now = Utc::now();
        let new_chunks: Vec<Chunk> = segments
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (text, vector))| Chunk {
                id: format!("{}_{}", doc_hash, i),
                filename: filename.clone(),
                text,
                vector,
                chunk_index: i as i64,
                total_chunks: total,
                upload_time: now,
                metadata: metadata.clone(),
            })
            .collect();

        // Upsert: drop any prior chunks for this filename, then append.
        let mut next: Vec<Chunk> = self
            .chunks
            .iter()
            .filter(|c| c.filename != filename)
            .cloned()
            .collect();
        let replaced = self.chunks.len() - next.len();
        let added = new_chunks.len();
        next.extend(new_chunks);

        // Persist first; memory is only swapped once the write succeeds.
        self.storage.persist(&next).await?;
        self.chunks = next;

        debug!(%filename, chunks = added, replaced, "document added");
        Ok(AddReport {
            filename,
            chunks: added,
            total_chars: text.chars().count(),
            replaced,
        })
    }

    /// Rank stored chunks against a free-text query.
    ///
    /// `n_results == 0` is caller misuse. An empty or whitespace-only query
    /// is degenerate and returns no hits; so does an empty store. Read-only.
    pub async fn search(
        &self,
        query: &str,
        n_results: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        if n_results == 0 {
            return Err(StoreError::InvalidQuery(
                "n_results must be positive".to_string(),
            ));
        }
        if query.trim().is_empty() || self.chunks.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        let ranked = rank::rank(&query_vector, &self.chunks, n_results);

        Ok(ranked
            .into_iter()
            .map(|scored| {
                let chunk = scored.chunk;
                let mut metadata = serde_json::json!({
                    "filename": chunk.filename,
                    "chunk_index": chunk.chunk_index,
                    "total_chunks": chunk.total_chunks,
                });
                if let Some(serde_json::Value::Object(extra)) = &chunk.metadata {
                    if let serde_json::Value::Object(map) = &mut metadata {
                        for (k, v) in extra {
                            map.entry(k.clone()).or_insert_with(|| v.clone());
                        }
                    }
                }
                SearchHit {
                    text: chunk.text.clone(),
                    metadata,
                    similarity: scored.similarity,
                    distance: 1.0 - scored.similarity,
                }
            })
            .collect())
    }

    /// Assemble a plain-text context block for RAG prompt construction:
    /// the top `max_chunks` hits rendered as `[Document: name]` sections
    /// separated by blank lines. Empty result set yields an empty string.
    pub async fn context_for_query(
        &self,
        query: &str,
        max_chunks: usize,
    ) -> Result<String, StoreError> {
        let hits = self.search(query, max_chunks).await?;
        let parts: Vec<String> = hits
            .iter()
            .map(|hit| {
                let filename = hit
                    .metadata
                    .get("filename")
                    .and_then(|f| f.as_str())
                    .unwrap_or("Unknown");
                format!("[Document: {}]\n{}", filename, hit.text)
            })
            .collect();
        Ok(parts.join("\n\n"))
    }

    /// Remove every chunk whose filename matches exactly.
    ///
    /// Absence is an outcome, not an error; a not-found delete performs no
    /// persistence write.
    pub async fn delete(&mut self, filename: &str) -> Result<DeleteOutcome, StoreError> {
        let next: Vec<Chunk> = self
            .chunks
            .iter()
            .filter(|c| c.filename != filename)
            .cloned()
            .collect();
        let removed = self.chunks.len() - next.len();
        if removed == 0 {
            return Ok(DeleteOutcome::NotFound);
        }

        self.storage.persist(&next).await?;
        self.chunks = next;

        debug!(%filename, chunks = removed, "document deleted");
        Ok(DeleteOutcome::Deleted { chunks: removed })
    }

    /// Store-wide statistics. Pure read.
    pub fn stats(&self) -> StoreStats {
        let documents: HashSet<&str> = self.chunks.iter().map(|c| c.filename.as_str()).collect();
        StoreStats {
            total_chunks: self.chunks.len(),
            total_documents: documents.len(),
            embedding_model: self.embedder.name().to_string(),
            embedding_dims: self.embedder.dims(),
        }
    }

    /// Clear the collection and persist the empty state. Idempotent.
    pub async fn reset(&mut self) -> Result<(), StoreError> {
        self.storage.persist(&[]).await?;
        self.chunks.clear();
        debug!("store reset");
        Ok(())
    }
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}
