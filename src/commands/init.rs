use anyhow::Result;
use rankfuse::config::Config;
use std::path::PathBuf;

pub fn init_config(path: PathBuf) -> Result<()> {
    let config = Config::default();
    let config_path = path.join("rankfuse.toml");

    let toml_content = format!(
        r#"# Rankfuse Configuration

[storage]
data_dir = ".rankfuse"

[bm25]
k1 = {}
b = {}

[retrieval]
candidate_count = {}
rrf_k = {}
enable_reranking = {}

[fusion]
dense_weight = {}
bm25_weight = {}
adaptive_shift = {}
min_weight = {}
max_weight = {}
"#,
        config.bm25.k1,
        config.bm25.b,
        config.retrieval.candidate_count,
        config.retrieval.rrf_k,
        config.retrieval.enable_reranking,
        config.fusion.dense_weight,
        config.fusion.bm25_weight,
        config.fusion.adaptive_shift,
        config.fusion.min_weight,
        config.fusion.max_weight,
    );

    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    let data_dir = path.join(".rankfuse");
    std::fs::create_dir_all(&data_dir)?;
    println!("Created data directory: {}", data_dir.display());

    Ok(())
}
