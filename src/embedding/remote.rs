//! Dense embedding provider backed by an Ollama-compatible HTTP endpoint.
//!
//! Calls `POST {url}/api/embed` with the batch of texts and reads the
//! `embeddings` array from the response. Transient failures (connection
//! errors, HTTP 429, 5xx) retry with exponential backoff; other client
//! errors fail immediately.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::EmbeddingConfig;
use crate::error::StoreError;

use super::Embedder;

const DEFAULT_URL: &str = "http://localhost:11434";

/// Remote dense embedder, a config-selected drop-in for the keyword baseline.
pub struct RemoteEmbedder {
    model: String,
    dims: usize,
    url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl RemoteEmbedder {
    /// Build from configuration. Requires `model` and `dims`.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, StoreError> {
        let model = config.model.clone().ok_or_else(|| {
            StoreError::EmbeddingFailed("embedding.model required for remote provider".to_string())
        })?;
        let dims = config.dims.ok_or_else(|| {
            StoreError::EmbeddingFailed("embedding.dims required for remote provider".to_string())
        })?;
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_URL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::EmbeddingFailed(e.to_string()))?;

        Ok(Self {
            model,
            dims,
            url,
            max_retries: config.max_retries,
            client,
        })
    }

    async fn request_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ... capped at 32s.
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                warn!(attempt, delay_secs = delay.as_secs(), "retrying embedding request");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(format!("{}/api/embed", self.url))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response
                            .json()
                            .await
                            .map_err(|e| StoreError::EmbeddingFailed(e.to_string()))?;
                        return self.parse_response(&json, texts.len());
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(StoreError::EmbeddingFailed(format!(
                            "embedding API error {}: {}",
                            status, body_text
                        )));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    return Err(StoreError::EmbeddingFailed(format!(
                        "embedding API error {}: {}",
                        status, body_text
                    )));
                }
                Err(e) => {
                    last_err = Some(StoreError::EmbeddingFailed(format!(
                        "connection error (is the embedding server running at {}?): {}",
                        self.url, e
                    )));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            StoreError::EmbeddingFailed("embedding failed after retries".to_string())
        }))
    }

    fn parse_response(
        &self,
        json: &serde_json::Value,
        expected: usize,
    ) -> Result<Vec<Vec<f32>>, StoreError> {
        let embeddings = json
            .get("embeddings")
            .and_then(|e| e.as_array())
            .ok_or_else(|| {
                StoreError::EmbeddingFailed(
                    "invalid response: missing embeddings array".to_string(),
                )
            })?;

        if embeddings.len() != expected {
            return Err(StoreError::EmbeddingFailed(format!(
                "invalid response: expected {} embeddings, got {}",
                expected,
                embeddings.len()
            )));
        }

        let mut result = Vec::with_capacity(embeddings.len());
        for embedding in embeddings {
            let vec: Vec<f32> = embedding
                .as_array()
                .ok_or_else(|| {
                    StoreError::EmbeddingFailed(
                        "invalid response: embedding is not an array".to_string(),
                    )
                })?
                .iter()
                .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                .collect();

            if vec.len() != self.dims {
                return Err(StoreError::EmbeddingFailed(format!(
                    "model returned {} dims, config expects {}",
                    vec.len(),
                    self.dims
                )));
            }
            result.push(vec);
        }

        Ok(result)
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        // Empty input short-circuits to the zero vector without a network
        // call, honoring the trait contract.
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dims]);
        }
        let batch = self.request_batch(&[text.to_string()]).await?;
        batch.into_iter().next().ok_or_else(|| {
            StoreError::EmbeddingFailed("empty embedding response".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        // Empty entries never reach the API: they embed as zero vectors,
        // and the remote results are spliced back around them in order.
        let nonempty: Vec<String> = texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();
        let remote = if nonempty.is_empty() {
            Vec::new()
        } else {
            self.request_batch(&nonempty).await?
        };

        let mut remote = remote.into_iter();
        Ok(texts
            .iter()
            .map(|t| {
                if t.trim().is_empty() {
                    vec![0.0; self.dims]
                } else {
                    // request_batch validated the count, so this always yields.
                    remote.next().unwrap_or_else(|| vec![0.0; self.dims])
                }
            })
            .collect())
    }
}
