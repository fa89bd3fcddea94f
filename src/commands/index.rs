use anyhow::{Context, Result};
use rankfuse::{
    config::Config,
    retrieval::HybridSearchEngine,
    types::Document,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn index_documents(
    config: Config,
    path: PathBuf,
    title: Option<String>,
    url: Option<String>,
) -> Result<()> {
    let mut engine = HybridSearchEngine::open(&config.storage.data_dir, &config)?;

    let indexed = if path.is_file() {
        if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
            index_jsonl(&mut engine, &path)?
        } else {
            index_file(&mut engine, &path, title, url)?
        }
    } else if path.is_dir() {
        info!("Indexing directory: {}", path.display());
        let mut count = 0;
        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                matches!(
                    e.path().extension().and_then(|x| x.to_str()),
                    Some("txt") | Some("md")
                )
            })
        {
            match index_file(&mut engine, entry.path(), None, None) {
                Ok(n) => count += n,
                Err(e) => warn!("Failed to index {}: {}", entry.path().display(), e),
            }
        }
        count
    } else {
        anyhow::bail!("Path does not exist: {}", path.display());
    };

    engine.save()?;
    println!("Indexed {} documents", indexed);
    println!("Corpus now holds {} documents", engine.stats().document_count);

    Ok(())
}

fn index_file(
    engine: &mut HybridSearchEngine,
    path: &Path,
    title: Option<String>,
    url: Option<String>,
) -> Result<usize> {
    info!("Indexing file: {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut doc = Document::new(content);
    if let Some(t) = title {
        doc = doc.with_title(t);
    } else {
        doc = doc.with_title(path.file_name().unwrap_or_default().to_string_lossy());
    }
    if let Some(u) = url {
        doc = doc.with_url(u);
    }

    engine.index_document(doc)?;
    Ok(1)
}

/// Index a JSONL file with one document object per line. Missing fields
/// take their defaults (auto-generated id, current timestamp).
fn index_jsonl(engine: &mut HybridSearchEngine, path: &Path) -> Result<usize> {
    info!("Indexing JSONL file: {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut count = 0;
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let doc: Document = serde_json::from_str(line)
            .with_context(|| format!("Invalid document on line {}", line_no + 1))?;
        match engine.index_document(doc) {
            Ok(_) => count += 1,
            Err(e) => warn!("Skipping document on line {}: {}", line_no + 1, e),
        }
    }

    Ok(count)
}
