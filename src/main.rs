//! # secrag CLI
//!
//! The `secrag` binary drives the document store end-to-end: ingestion,
//! ranked retrieval, RAG context assembly, deletion, statistics, and
//! administrative reset.
//!
//! ## Usage
//!
//! ```bash
//! secrag --config ./secrag.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `secrag add <path>` | Ingest a file, or every supported file under a directory |
//! | `secrag search "<query>"` | Print ranked hits for a query |
//! | `secrag context "<query>"` | Print an assembled RAG context block |
//! | `secrag delete <filename>` | Remove all chunks of a document |
//! | `secrag stats` | Print store statistics |
//! | `secrag reset` | Clear the store |
//!
//! Results print to stdout; diagnostics go to stderr (`SECRAG_LOG` or
//! `-v`/`-q` control verbosity).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use secrag::config::{self, Config};
use secrag::embedding::create_embedder;
use secrag::extract;
use secrag::models::DeleteOutcome;
use secrag::store::{ChunkingParams, DocumentStore, JsonlStorage};

/// secrag — a local-first semantic document store and retrieval engine
/// for security-operations tooling.
#[derive(Parser)]
#[command(
    name = "secrag",
    about = "secrag — semantic document store and retrieval engine",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). A missing file falls back to
    /// built-in defaults.
    #[arg(long, global = true, default_value = "./secrag.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest a document, or every supported document under a directory.
    ///
    /// Re-adding a document with the same filename replaces its chunks.
    /// In directory mode, unsupported files are skipped with a warning and
    /// per-file failures are counted rather than aborting the walk.
    Add {
        /// File or directory to ingest.
        path: PathBuf,

        /// Metadata attached to every ingested chunk, as `key=value` pairs.
        #[arg(long = "meta", value_parser = parse_key_val)]
        meta: Vec<(String, String)>,
    },

    /// Search the store and print ranked hits.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Print an assembled context block for RAG prompt construction.
    Context {
        /// The query to retrieve context for.
        query: String,

        /// Maximum chunks included in the block.
        #[arg(long, default_value_t = 3)]
        max_chunks: usize,
    },

    /// Remove every chunk of a document by filename.
    Delete {
        /// Filename as reported by `search`/`stats` (not a path).
        filename: String,
    },

    /// Print store statistics.
    Stats,

    /// Clear the entire store.
    Reset,
}

/// Parse a `key=value` pair for `--meta` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("SECRAG_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

async fn open_store(cfg: &Config) -> Result<DocumentStore> {
    let embedder = create_embedder(&cfg.embedding).context("Failed to create embedder")?;
    let storage = JsonlStorage::new(&cfg.store.path);
    let chunking = ChunkingParams {
        chunk_size: cfg.chunking.chunk_size,
        overlap: cfg.chunking.overlap,
    };
    Ok(DocumentStore::open(Box::new(storage), embedder, chunking).await)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cfg = config::load_or_default(&cli.config)?;
    let mut store = open_store(&cfg).await?;

    match cli.command {
        Commands::Add { path, meta } => {
            run_add(&mut store, &path, meta).await?;
        }
        Commands::Search { query, limit } => {
            run_search(&store, &query, limit).await?;
        }
        Commands::Context { query, max_chunks } => {
            let context = store.context_for_query(&query, max_chunks).await?;
            if context.is_empty() {
                println!("No results.");
            } else {
                println!("{}", context);
            }
        }
        Commands::Delete { filename } => match store.delete(&filename).await? {
            DeleteOutcome::Deleted { chunks } => {
                println!("deleted {}", filename);
                println!("  chunks removed: {}", chunks);
                println!("ok");
            }
            DeleteOutcome::NotFound => {
                println!("Document not found: {}", filename);
            }
        },
        Commands::Stats => {
            let stats = store.stats();
            println!("secrag — Store Stats");
            println!("====================");
            println!();
            println!("  Store:       {}", cfg.store.path.display());
            println!("  Documents:   {}", stats.total_documents);
            println!("  Chunks:      {}", stats.total_chunks);
            println!(
                "  Embedding:   {} ({} dims)",
                stats.embedding_model, stats.embedding_dims
            );
        }
        Commands::Reset => {
            store.reset().await?;
            println!("Store reset.");
        }
    }

    Ok(())
}

async fn run_add(store: &mut DocumentStore, path: &Path, meta: Vec<(String, String)>) -> Result<()> {
    let metadata = if meta.is_empty() {
        None
    } else {
        let map: serde_json::Map<String, serde_json::Value> = meta
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        Some(serde_json::Value::Object(map))
    };

    if path.is_dir() {
        add_directory(store, path, metadata).await
    } else {
        let report = store
            .add(path, metadata)
            .await
            .with_context(|| format!("Failed to add {}", path.display()))?;
        println!("add {}", report.filename);
        println!("  chunks written: {}", report.chunks);
        println!("  characters: {}", report.total_chars);
        if report.replaced > 0 {
            println!("  chunks replaced: {}", report.replaced);
        }
        println!("ok");
        Ok(())
    }
}

/// Recursive directory ingestion: supported files in deterministic order,
/// per-file failures counted but non-fatal.
async fn add_directory(
    store: &mut DocumentStore,
    dir: &Path,
    metadata: Option<serde_json::Value>,
) -> Result<()> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if extract::is_supported(&path) {
            files.push(path);
        } else {
            eprintln!("skipping unsupported file: {}", path.display());
        }
    }
    files.sort();

    let mut added = 0usize;
    let mut chunks_written = 0usize;
    let mut failed = 0usize;
    for file in &files {
        match store.add(file, metadata.clone()).await {
            Ok(report) => {
                added += 1;
                chunks_written += report.chunks;
            }
            Err(e) => {
                failed += 1;
                eprintln!("failed to add {}: {}", file.display(), e);
            }
        }
    }

    println!("add {}", dir.display());
    println!("  documents added: {}", added);
    println!("  chunks written: {}", chunks_written);
    println!("  failed: {}", failed);
    println!("ok");
    Ok(())
}

async fn run_search(store: &DocumentStore, query: &str, limit: usize) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let hits = store.search(query, limit).await?;
    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        let filename = hit
            .metadata
            .get("filename")
            .and_then(|f| f.as_str())
            .unwrap_or("(unknown)");
        let chunk_index = hit
            .metadata
            .get("chunk_index")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        let total_chunks = hit
            .metadata
            .get("total_chunks")
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        let excerpt: String = hit.text.chars().take(160).collect();
        println!(
            "{}. [{:.3}] {} (chunk {}/{})",
            i + 1,
            hit.similarity,
            filename,
            chunk_index + 1,
            total_chunks
        );
        println!("    excerpt: \"{}\"", excerpt.replace('\n', " ").trim());
        println!();
    }

    Ok(())
}
