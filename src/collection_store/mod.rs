mod db;
mod errors;
mod genre_resolver;
mod models;
mod record_repository;
mod schema;
mod search;
mod store;
mod trait_def;
mod validation;

pub use db::{CollectionDb, DEFAULT_READ_POOL_SIZE};
pub use errors::{CollectionError, CollectionResult};
pub use genre_resolver::{genre_key, GenreResolver};
pub use models::*;
pub use record_repository::RecordRepository;
pub use schema::COLLECTION_VERSIONED_SCHEMAS;
pub use search::SearchEngine;
pub use store::SqliteCollectionStore;
pub use trait_def::CollectionStore;
pub use validation::{
    validate_new_record, validate_record_update, ValidationError, ValidationResult,
};
