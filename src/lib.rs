//! Record Collection Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod collection_store;
pub mod config;
pub mod enrichment;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use collection_store::{CollectionStore, SqliteCollectionStore};
pub use enrichment::{EnrichmentGateway, NoOpGateway, ProviderGateway};
pub use server::{run_server, RequestsLoggingLevel};
