//! Line-oriented JSON persistence: one chunk record per line.
//!
//! `persist` writes the full collection to a sibling temp file and renames
//! it over the target, so readers only ever observe a complete file.
//! `load` parses every line strictly; a single malformed line condemns the
//! whole file as corrupt and yields the empty collection.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::error::StoreError;
use crate::models::Chunk;

use super::Storage;

/// Durable [`Storage`] backend over a JSONL file.
pub struct JsonlStorage {
    path: PathBuf,
}

impl JsonlStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Chunk>, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.to_string()),
        };

        let mut chunks = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let chunk: Chunk = serde_json::from_str(line)
                .map_err(|e| format!("line {}: {}", lineno + 1, e))?;
            chunks.push(chunk);
        }
        Ok(chunks)
    }

    fn write_all(&self, chunks: &[Chunk]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Persist(e.to_string()))?;
            }
        }

        let mut out = String::new();
        for chunk in chunks {
            let line =
                serde_json::to_string(chunk).map_err(|e| StoreError::Persist(e.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }

        // Temp-and-rename so a crash mid-write never leaves a torn file.
        let tmp = self.path.with_extension("jsonl.tmp");
        std::fs::write(&tmp, out).map_err(|e| StoreError::Persist(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Persist(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Storage for JsonlStorage {
    async fn load(&self) -> Vec<Chunk> {
        match self.read_all() {
            Ok(chunks) => chunks,
            Err(cause) => {
                warn!(path = %self.path.display(), %cause, "discarding corrupt store file");
                Vec::new()
            }
        }
    }

    async fn persist(&self, chunks: &[Chunk]) -> Result<(), StoreError> {
        self.write_all(chunks)
    }
}
