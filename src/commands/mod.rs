//! CLI command implementations

mod index;
mod init;
mod search;
mod stats;

pub use index::index_documents;
pub use init::init_config;
pub use search::search_corpus;
pub use stats::show_stats;
