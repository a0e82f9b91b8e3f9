//! SQLite-backed collection store.
//!
//! Wires the genre resolver, record repository and search engine to one
//! shared `CollectionDb` handle.

use super::db::{CollectionDb, DEFAULT_READ_POOL_SIZE};
use super::errors::CollectionResult;
use super::genre_resolver::GenreResolver;
use super::models::{Genre, NewRecord, Record, RecordUpdate, SearchResults};
use super::record_repository::RecordRepository;
use super::search::SearchEngine;
use super::trait_def::CollectionStore;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct SqliteCollectionStore {
    genres: GenreResolver,
    records: RecordRepository,
    search: SearchEngine,
}

impl SqliteCollectionStore {
    /// Open the store at `db_path` with the default read pool size.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::with_read_pool(db_path, DEFAULT_READ_POOL_SIZE)
    }

    pub fn with_read_pool<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db = Arc::new(CollectionDb::open(db_path, read_pool_size)?);
        Ok(Self::from_db(db))
    }

    pub fn from_db(db: Arc<CollectionDb>) -> Self {
        SqliteCollectionStore {
            genres: GenreResolver::new(db.clone()),
            records: RecordRepository::new(db.clone()),
            search: SearchEngine::new(db),
        }
    }
}

impl CollectionStore for SqliteCollectionStore {
    fn create_record(&self, input: &NewRecord) -> CollectionResult<Record> {
        self.records.create(input)
    }

    fn get_record(&self, id: i64) -> CollectionResult<Option<Record>> {
        self.records.get(id)
    }

    fn list_records(&self, offset: usize, limit: usize) -> CollectionResult<Vec<Record>> {
        self.records.list(offset, limit)
    }

    fn update_record(&self, id: i64, changes: &RecordUpdate) -> CollectionResult<Option<Record>> {
        self.records.update(id, changes)
    }

    fn delete_record(&self, id: i64) -> CollectionResult<bool> {
        self.records.delete(id)
    }

    fn search_records(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> CollectionResult<SearchResults> {
        self.search.search(query, offset, limit)
    }

    fn list_genres(&self, offset: usize, limit: usize) -> CollectionResult<Vec<Genre>> {
        self.genres.list_all(offset, limit)
    }

    fn find_genre(&self, name: &str) -> CollectionResult<Option<Genre>> {
        self.genres.find_by_name(name)
    }
}
