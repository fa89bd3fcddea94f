//! Rankfuse: hybrid search fusion engine
//!
//! BM25 lexical retrieval fused with externally computed dense results.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rankfuse::{config::Config, retrieval::FusionMode};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser)]
#[command(name = "rankfuse")]
#[command(about = "Hybrid search: BM25 retrieval fused with dense vector results")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "rankfuse.toml")]
    config: PathBuf,

    /// Data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new rankfuse configuration
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Index a document, directory, or JSONL corpus
    Index {
        /// Path to a file, directory, or .jsonl corpus
        path: PathBuf,

        /// Document title
        #[arg(short, long)]
        title: Option<String>,

        /// Document URL
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Search the corpus
    Search {
        /// Search query
        query: String,

        /// Number of results
        #[arg(short, long, default_value = "10")]
        top_k: usize,

        /// Fusion mode
        #[arg(short, long, value_enum, default_value = "adaptive")]
        mode: CliFusionMode,

        /// JSON file of dense hits computed by an external vector search
        #[arg(long)]
        dense: Option<PathBuf>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show corpus statistics
    Stats,
}

/// CLI fusion mode enum (mirrors FusionMode but with clap support)
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliFusionMode {
    /// Reciprocal rank fusion
    Rrf,
    /// Weighted score fusion with configured weights
    Weighted,
    /// Weighted fusion with query-adaptive weights
    Adaptive,
}

impl From<CliFusionMode> for FusionMode {
    fn from(mode: CliFusionMode) -> Self {
        match mode {
            CliFusionMode::Rrf => FusionMode::Rrf,
            CliFusionMode::Weighted => FusionMode::Weighted,
            CliFusionMode::Adaptive => FusionMode::Adaptive,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }

    match cli.command {
        Commands::Init { path } => commands::init_config(path),
        Commands::Index { path, title, url } => commands::index_documents(config, path, title, url),
        Commands::Search {
            query,
            top_k,
            mode,
            dense,
            format,
        } => commands::search_corpus(config, query, top_k, mode.into(), dense, format),
        Commands::Stats => commands::show_stats(config),
    }
}
