//! # secrag
//!
//! A local-first semantic document store and retrieval engine for
//! security-operations tooling: the storage and ranking core of a
//! retrieval-augmented generation (RAG) pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌──────────┐
//! │ Extractor │──▶│ Chunker │──▶│ Embedder │──┐
//! │ txt/pdf/… │   └─────────┘   └──────────┘  ▼
//! └──────────┘              ┌────────────────────┐   ┌─────────┐
//!                           │   DocumentStore    │──▶│  JSONL  │
//!                           └─────────┬──────────┘   └─────────┘
//!                                     ▼
//!  query ──▶ Embedder ──▶ cosine rank ──▶ top-N hits
//! ```
//!
//! Ingestion extracts text from a file, splits it into overlapping
//! character chunks, embeds every chunk into a fixed-dimension vector, and
//! persists the records. Queries embed the same way and rank stored chunks
//! by cosine similarity.
//!
//! ## Quick Start
//!
//! ```bash
//! secrag add ./reports/incident.pdf     # ingest a document
//! secrag search "ransomware response"   # ranked retrieval
//! secrag context "ransomware response"  # RAG context block
//! secrag stats                          # corpus overview
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Library error taxonomy |
//! | [`extract`] | Multi-format text extraction |
//! | [`chunk`] | Sliding-window text chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`rank`] | Cosine similarity and top-k ranking |
//! | [`store`] | Storage backends and the `DocumentStore` aggregate |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod models;
pub mod rank;
pub mod store;

pub use error::StoreError;
pub use models::{AddReport, Chunk, DeleteOutcome, SearchHit, StoreStats};
pub use store::{ChunkingParams, DocumentStore, JsonlStorage, MemoryStorage, Storage};
