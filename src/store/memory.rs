//! In-memory [`Storage`] implementation for tests and embedded use.
//!
//! Holds the collection behind `std::sync::RwLock`; both operations return
//! immediately-ready futures.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::Chunk;

use super::Storage;

/// Storage backend without a filesystem footprint.
#[derive(Default)]
pub struct MemoryStorage {
    chunks: RwLock<Vec<Chunk>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self) -> Vec<Chunk> {
        self.chunks.read().map(|g| g.clone()).unwrap_or_default()
    }

    async fn persist(&self, chunks: &[Chunk]) -> Result<(), StoreError> {
        let mut guard = self
            .chunks
            .write()
            .map_err(|_| StoreError::Persist("storage lock poisoned".to_string()))?;
        *guard = chunks.to_vec();
        Ok(())
    }
}
