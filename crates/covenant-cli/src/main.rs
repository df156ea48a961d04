//! Covenant CLI - batch contract metadata extraction.
//!
//! Scans a directory for extracted contract text, runs each document
//! through the extraction pipeline with a bounded number of in-flight
//! documents, and writes one JSON record per document. Document pipelines
//! are isolated: one failure never aborts its siblings.

use anyhow::Context;
use clap::Parser;
use covenant_extractor::{ExtractorConfig, MetadataExtractor};
use covenant_llm::openai::DEFAULT_BASE_URL;
use covenant_llm::OpenAiClient;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Extract structured contract metadata via an LLM oracle
#[derive(Parser, Debug)]
#[command(name = "covenant", version, about)]
struct Cli {
    /// Directory to scan recursively for contract text files (.txt)
    #[arg(long)]
    directory: PathBuf,

    /// Maximum number of documents processed concurrently
    #[arg(short = 'c', long, default_value_t = 4)]
    concurrency: usize,

    /// Write records here instead of beside each source document
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print records to stdout instead of writing JSON files
    #[arg(long)]
    no_save: bool,

    /// Oracle model identifier
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// API key for the oracle endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL of an OpenAI-compatible endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-chunk token budget
    #[arg(long, default_value_t = 6000)]
    max_tokens: usize,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let documents = find_documents(&cli.directory);
    if documents.is_empty() {
        anyhow::bail!(
            "No contract text files found under {}",
            cli.directory.display()
        );
    }
    info!("Found {} document(s)", documents.len());

    let config = ExtractorConfig {
        max_chunk_tokens: cli.max_tokens,
        ..ExtractorConfig::default()
    };
    config.validate()?;

    let client = OpenAiClient::new(cli.api_key, cli.model)?.with_base_url(cli.base_url);
    let extractor = Arc::new(MetadataExtractor::new(client, config));
    let gate = Arc::new(Semaphore::new(cli.concurrency.max(1)));

    let mut tasks: JoinSet<Result<(), (PathBuf, anyhow::Error)>> = JoinSet::new();
    for path in documents {
        let extractor = Arc::clone(&extractor);
        let gate = Arc::clone(&gate);
        let output_dir = cli.output_dir.clone();
        let save = !cli.no_save;

        tasks.spawn(async move {
            let _permit = gate
                .acquire_owned()
                .await
                .map_err(|e| (path.clone(), anyhow::Error::from(e)))?;
            process_document(&extractor, &path, save, output_dir.as_deref())
                .await
                .map_err(|e| (path, e))
        });
    }

    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err((path, e))) => {
                failures += 1;
                error!("Extraction failed for {}: {:#}", path.display(), e);
            }
            Err(e) => {
                failures += 1;
                error!("Worker task failed: {}", e);
            }
        }
    }

    if failures > 0 {
        warn!("{} document(s) failed", failures);
    }
    Ok(())
}

/// Recursively collect contract text files under `root`
fn find_documents(root: &Path) -> Vec<PathBuf> {
    let mut documents: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            matches!(
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_ascii_lowercase)
                    .as_deref(),
                Some("txt") | Some("text")
            )
        })
        .map(|entry| entry.into_path())
        .collect();
    documents.sort();
    documents
}

/// Run one document through the pipeline and deliver the record
async fn process_document(
    extractor: &MetadataExtractor<OpenAiClient>,
    path: &Path,
    save: bool,
    output_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let source_id = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document");

    let record = extractor.extract(source_id, &text).await?;
    let json = serde_json::to_string_pretty(&record.to_value())?;

    if !save {
        println!("{}", json);
        return Ok(());
    }

    let out_path = output_path(path, output_dir)?;
    tokio::fs::write(&out_path, json)
        .await
        .with_context(|| format!("writing {}", out_path.display()))?;
    info!("Wrote {}", out_path.display());
    Ok(())
}

/// Where to write the record for `doc`
///
/// With an output directory, the name gets a short hash of the source
/// path so documents with the same stem in different subdirectories do
/// not collide.
fn output_path(doc: &Path, output_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            let digest = Sha256::digest(doc.to_string_lossy().as_bytes());
            let short: String = digest.iter().take(3).map(|b| format!("{:02x}", b)).collect();
            let stem = doc
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("contract");
            Ok(dir.join(format!("{}_{}.json", stem, short)))
        }
        None => Ok(doc.with_extension("json")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_beside_source() {
        let path = output_path(Path::new("/docs/lease.txt"), None).unwrap();
        assert_eq!(path, PathBuf::from("/docs/lease.json"));
    }

    #[test]
    fn test_output_path_in_output_dir_is_hashed_and_stable() {
        let dir = tempfile::tempdir().unwrap();
        let a = output_path(Path::new("/docs/a/lease.txt"), Some(dir.path())).unwrap();
        let b = output_path(Path::new("/docs/b/lease.txt"), Some(dir.path())).unwrap();
        let a_again = output_path(Path::new("/docs/a/lease.txt"), Some(dir.path())).unwrap();

        assert_ne!(a, b);
        assert_eq!(a, a_again);
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("lease_"));
        assert!(name.ends_with(".json"));
        // stem + '_' + 6 hex chars + ".json"
        assert_eq!(name.len(), "lease_".len() + 6 + ".json".len());
    }

    #[test]
    fn test_find_documents_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::write(nested.join("b.TXT"), "x").unwrap();
        std::fs::write(nested.join("c.pdf"), "x").unwrap();
        std::fs::write(dir.path().join("d.json"), "x").unwrap();

        let docs = find_documents(dir.path());
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|p| {
            let ext = p.extension().unwrap().to_str().unwrap().to_ascii_lowercase();
            ext == "txt"
        }));
    }
}
