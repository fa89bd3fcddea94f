use anyhow::Result;
use rankfuse::{config::Config, retrieval::HybridSearchEngine};
use tracing::info;

pub fn show_stats(config: Config) -> Result<()> {
    info!("Loading corpus statistics...");

    let engine = HybridSearchEngine::open(&config.storage.data_dir, &config)?;
    let stats = engine.stats();

    println!("\nRankfuse Statistics:");
    println!("====================");
    println!("Data directory:      {}", config.storage.data_dir.display());
    println!("Documents:           {}", stats.document_count);
    println!("Vocabulary size:     {}", stats.vocabulary_size);
    println!("Avg document length: {:.1} tokens", stats.avg_document_length);
    println!("Total tokens:        {}", stats.total_tokens);

    Ok(())
}
