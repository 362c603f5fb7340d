use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::chunk::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/secrag.jsonl")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_overlap() -> usize {
    DEFAULT_OVERLAP
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Keyword provider: optional vocabulary override.
    #[serde(default)]
    pub vocabulary: Option<Vec<String>>,
    /// Remote provider: model name (required).
    #[serde(default)]
    pub model: Option<String>,
    /// Remote provider: vector dimensionality (required).
    #[serde(default)]
    pub dims: Option<usize>,
    /// Remote provider: endpoint base URL.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "keyword".to_string(),
            vocabulary: None,
            model: None,
            dims: None,
            url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_provider() -> String {
    "keyword".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load from `path` when it exists, otherwise fall back to built-in
/// defaults. A file that exists but fails to parse or validate is an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }

    // Keeps the half-size sentence pullback from stalling the window.
    if config.chunking.overlap * 2 >= config.chunking.chunk_size {
        anyhow::bail!("chunking.overlap must be less than half of chunking.chunk_size");
    }

    match config.embedding.provider.as_str() {
        "keyword" => {
            if let Some(vocab) = &config.embedding.vocabulary {
                if vocab.is_empty() || vocab.iter().any(|t| t.trim().is_empty()) {
                    anyhow::bail!("embedding.vocabulary must contain non-empty terms");
                }
            }
        }
        "remote" => {
            if config.embedding.model.as_deref().unwrap_or("").is_empty() {
                anyhow::bail!("embedding.model must be set when provider is 'remote'");
            }
            if config.embedding.dims.unwrap_or(0) == 0 {
                anyhow::bail!("embedding.dims must be > 0 when provider is 'remote'");
            }
        }
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be keyword or remote.",
            other
        ),
    }

    Ok(())
}
