pub mod config;
pub mod domain;
pub mod index;
pub mod infra;
pub mod server;

// Re-exports for convenience
pub use config::Config;
pub use domain::entry::Entry;
pub use index::Indexer;
