use anyhow::{Context, Result};
use rankfuse::{
    config::Config,
    retrieval::{extract_snippet, FusionMode, HybridSearchEngine},
    types::{DenseHit, Query, SearchResult},
    util::truncate_str,
};
use std::path::PathBuf;
use tracing::info;

const SNIPPET_MAX_CHARS: usize = 200;

pub fn search_corpus(
    config: Config,
    query_text: String,
    top_k: usize,
    mode: FusionMode,
    dense_path: Option<PathBuf>,
    format: String,
) -> Result<()> {
    info!("Searching for: {}", query_text);

    let dense_hits = match dense_path {
        Some(path) => load_dense_hits(&path)?,
        None => Vec::new(),
    };

    let engine = HybridSearchEngine::open(&config.storage.data_dir, &config)?;
    let query = Query::new(&query_text, top_k);
    let mut results = engine.search(&query, &dense_hits, mode);

    for result in &mut results {
        result.snippet = extract_snippet(&query_text, &result.document.content, SNIPPET_MAX_CHARS);
    }

    output_search_results(&results, &format)?;
    Ok(())
}

/// Load externally computed dense hits from a JSON file containing an array
/// of `{"doc_id": ..., "score": ...}` objects.
fn load_dense_hits(path: &PathBuf) -> Result<Vec<DenseHit>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dense hits file {}", path.display()))?;
    let hits: Vec<DenseHit> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid dense hits in {}", path.display()))?;
    info!("Loaded {} dense hits from {}", hits.len(), path.display());
    Ok(hits)
}

fn output_search_results(results: &[SearchResult], format: &str) -> Result<()> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(results)?;
            println!("{}", json);
        }
        _ => {
            println!("\nSearch Results ({} found):\n", results.len());
            for (i, result) in results.iter().enumerate() {
                println!("{}. [Score: {:.4}]", i + 1, result.relevance_score);
                println!("   ID: {}", result.document.id);
                if let Some(title) = &result.document.title {
                    println!("   Title: {}", title);
                }
                if let Some(url) = &result.document.url {
                    println!("   URL: {}", url);
                }
                let display_text = result
                    .snippet
                    .as_deref()
                    .unwrap_or(&result.document.content);
                println!("   Content: {}", truncate_str(display_text, SNIPPET_MAX_CHARS));
                println!("   Matched by: {:?}", result.matched_by);
                println!();
            }
        }
    }
    Ok(())
}
