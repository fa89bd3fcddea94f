//! Configuration for rankfuse

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Corpus storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// BM25 ranking parameters
    #[serde(default)]
    pub bm25: Bm25Config,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Fusion weight configuration
    #[serde(default)]
    pub fusion: FusionConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if !(self.bm25.k1 > 0.0 && self.bm25.k1.is_finite()) {
            errors.push("bm25 k1 must be positive and finite".to_string());
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            errors.push("bm25 b must be between 0.0 and 1.0".to_string());
        }

        if self.retrieval.rrf_k == 0 {
            errors.push("rrf_k must be positive".to_string());
        }
        if self.retrieval.candidate_count == 0 {
            errors.push("candidate_count must be positive".to_string());
        }

        if !(0.0..=1.0).contains(&self.fusion.dense_weight) {
            errors.push("dense_weight must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&self.fusion.bm25_weight) {
            errors.push("bm25_weight must be between 0.0 and 1.0".to_string());
        }
        if (self.fusion.dense_weight + self.fusion.bm25_weight - 1.0).abs() > 1e-3 {
            errors.push("dense_weight and bm25_weight must sum to 1.0".to_string());
        }
        if !(0.0..1.0).contains(&self.fusion.adaptive_shift) {
            errors.push("adaptive_shift must be in [0.0, 1.0)".to_string());
        }
        if !(0.0..=1.0).contains(&self.fusion.min_weight)
            || !(0.0..=1.0).contains(&self.fusion.max_weight)
            || self.fusion.min_weight >= self.fusion.max_weight
        {
            errors.push("min_weight and max_weight must satisfy 0.0 <= min < max <= 1.0".to_string());
        }

        if self.storage.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

/// Corpus storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory for persistence
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: directories::ProjectDirs::from("", "", "rankfuse")
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".rankfuse")),
        }
    }
}

/// BM25 ranking parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Term-frequency saturation (k1)
    #[serde(default = "default_k1")]
    pub k1: f32,
    /// Document length normalization (b)
    #[serde(default = "default_b")]
    pub b: f32,
}

fn default_k1() -> f32 {
    1.5
}

fn default_b() -> f32 {
    0.75
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            b: default_b(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of BM25 candidates to fetch before fusion
    #[serde(default = "default_candidate_count")]
    pub candidate_count: usize,
    /// RRF k parameter
    #[serde(default = "default_rrf_k")]
    pub rrf_k: usize,
    /// Enable term-overlap reranking of fused results
    #[serde(default = "default_enable_reranking")]
    pub enable_reranking: bool,
}

fn default_candidate_count() -> usize {
    50
}

fn default_rrf_k() -> usize {
    60
}

fn default_enable_reranking() -> bool {
    true
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            candidate_count: default_candidate_count(),
            rrf_k: default_rrf_k(),
            enable_reranking: default_enable_reranking(),
        }
    }
}

/// Fusion weight configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Base weight for dense results in weighted fusion
    #[serde(default = "default_dense_weight")]
    pub dense_weight: f32,
    /// Base weight for BM25 results in weighted fusion
    #[serde(default = "default_bm25_weight")]
    pub bm25_weight: f32,
    /// How far adaptive mode shifts the dense weight per classification
    #[serde(default = "default_adaptive_shift")]
    pub adaptive_shift: f32,
    /// Lower clamp for the adaptive dense weight
    #[serde(default = "default_min_weight")]
    pub min_weight: f32,
    /// Upper clamp for the adaptive dense weight
    #[serde(default = "default_max_weight")]
    pub max_weight: f32,
}

fn default_dense_weight() -> f32 {
    0.5
}

fn default_bm25_weight() -> f32 {
    0.5
}

fn default_adaptive_shift() -> f32 {
    0.2
}

fn default_min_weight() -> f32 {
    0.1
}

fn default_max_weight() -> f32 {
    0.9
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            dense_weight: default_dense_weight(),
            bm25_weight: default_bm25_weight(),
            adaptive_shift: default_adaptive_shift(),
            min_weight: default_min_weight(),
            max_weight: default_max_weight(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config::default()
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_nonpositive_k1() {
        let mut cfg = valid_config();
        cfg.bm25.k1 = 0.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("k1 must be positive"));
    }

    #[test]
    fn validate_rejects_b_out_of_range() {
        let mut cfg = valid_config();
        cfg.bm25.b = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("b must be between"));
    }

    #[test]
    fn validate_accepts_b_bounds() {
        let mut cfg = valid_config();
        cfg.bm25.b = 0.0;
        assert!(cfg.validate().is_ok());
        cfg.bm25.b = 1.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_rrf_k() {
        let mut cfg = valid_config();
        cfg.retrieval.rrf_k = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("rrf_k must be positive"));
    }

    #[test]
    fn validate_rejects_zero_candidate_count() {
        let mut cfg = valid_config();
        cfg.retrieval.candidate_count = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("candidate_count must be positive"));
    }

    #[test]
    fn validate_rejects_weights_not_summing_to_one() {
        let mut cfg = valid_config();
        cfg.fusion.dense_weight = 0.8;
        cfg.fusion.bm25_weight = 0.8;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("must sum to 1.0"));
    }

    #[test]
    fn validate_rejects_inverted_clamp_bounds() {
        let mut cfg = valid_config();
        cfg.fusion.min_weight = 0.9;
        cfg.fusion.max_weight = 0.1;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("min < max"));
    }

    #[test]
    fn validate_rejects_empty_data_dir() {
        let mut cfg = valid_config();
        cfg.storage.data_dir = PathBuf::from("");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("data_dir must not be empty"));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.bm25.k1 = -1.0;
        cfg.retrieval.rrf_k = 0;
        cfg.retrieval.candidate_count = 0;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("k1 must be positive"));
        assert!(msg.contains("rrf_k must be positive"));
        assert!(msg.contains("candidate_count must be positive"));
    }

    #[test]
    fn load_parses_partial_toml_with_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rankfuse.toml");
        std::fs::write(
            &path,
            r#"
[bm25]
k1 = 1.2

[retrieval]
candidate_count = 25
"#,
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert!((cfg.bm25.k1 - 1.2).abs() < f32::EPSILON);
        assert!((cfg.bm25.b - 0.75).abs() < f32::EPSILON);
        assert_eq!(cfg.retrieval.candidate_count, 25);
        assert_eq!(cfg.retrieval.rrf_k, 60);
        assert!((cfg.fusion.dense_weight - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rankfuse.toml");
        std::fs::write(&path, "[retrieval]\nrrf_k = 0\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn load_missing_file_errors() {
        let err = Config::load(Path::new("/nonexistent/rankfuse.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn default_storage_has_nonempty_data_dir() {
        let storage = StorageConfig::default();
        assert!(!storage.data_dir.as_os_str().is_empty());
    }
}
