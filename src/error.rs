//! Library error taxonomy.
//!
//! Every fallible library operation returns [`StoreError`]. A delete whose
//! target is absent is not an error; it is reported as
//! [`DeleteOutcome::NotFound`](crate::models::DeleteOutcome::NotFound).

/// Errors surfaced by extraction, embedding, and store operations.
#[derive(Debug)]
pub enum StoreError {
    /// File extension is not in the supported set.
    UnsupportedFormat(String),
    /// Recognized format, but reading or parsing the file failed.
    ExtractionFailed(String),
    /// Extracted text is below the minimum viable length.
    EmptyDocument { chars: usize },
    /// Caller misuse, e.g. `n_results == 0`.
    InvalidQuery(String),
    /// Embedding provider fault after retries, or a dimension mismatch.
    EmbeddingFailed(String),
    /// Storage backend failed to write the collection.
    Persist(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::UnsupportedFormat(ext) => {
                write!(f, "unsupported file format: {}", ext)
            }
            StoreError::ExtractionFailed(e) => write!(f, "text extraction failed: {}", e),
            StoreError::EmptyDocument { chars } => {
                write!(f, "document too short: {} chars extracted", chars)
            }
            StoreError::InvalidQuery(e) => write!(f, "invalid query: {}", e),
            StoreError::EmbeddingFailed(e) => write!(f, "embedding failed: {}", e),
            StoreError::Persist(e) => write!(f, "failed to persist store: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause() {
        let err = StoreError::ExtractionFailed("bad xref table".to_string());
        assert!(err.to_string().contains("bad xref table"));
    }

    #[test]
    fn test_empty_document_reports_chars() {
        let err = StoreError::EmptyDocument { chars: 4 };
        assert!(err.to_string().contains('4'));
    }
}
