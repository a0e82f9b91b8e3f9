//! CollectionStore trait definition.
//!
//! The HTTP layer talks to the collection only through this trait, so tests
//! can swap in other implementations.

use super::errors::CollectionResult;
use super::models::{Genre, NewRecord, Record, RecordUpdate, SearchResults};

pub trait CollectionStore: Send + Sync {
    // =========================================================================
    // Records
    // =========================================================================

    fn create_record(&self, input: &NewRecord) -> CollectionResult<Record>;

    /// `None` when no record has `id`.
    fn get_record(&self, id: i64) -> CollectionResult<Option<Record>>;

    fn list_records(&self, offset: usize, limit: usize) -> CollectionResult<Vec<Record>>;

    /// `None` when no record has `id`.
    fn update_record(&self, id: i64, changes: &RecordUpdate) -> CollectionResult<Option<Record>>;

    /// `false` when no record has `id`.
    fn delete_record(&self, id: i64) -> CollectionResult<bool>;

    // =========================================================================
    // Search
    // =========================================================================

    fn search_records(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> CollectionResult<SearchResults>;

    // =========================================================================
    // Genres
    // =========================================================================

    fn list_genres(&self, offset: usize, limit: usize) -> CollectionResult<Vec<Genre>>;

    fn find_genre(&self, name: &str) -> CollectionResult<Option<Genre>>;
}
