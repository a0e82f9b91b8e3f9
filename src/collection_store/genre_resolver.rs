//! Get-or-create resolution of free-text genre names.
//!
//! Names are matched case-insensitively on a normalized key. The first
//! spelling stored for a key stays the canonical display name.

use super::db::{fold_case, page_bounds, CollectionDb};
use super::errors::CollectionResult;
use super::models::Genre;
use super::validation::validate_genre_names;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Max number of keys bound into a single `IN (...)` lookup.
const LOOKUP_CHUNK_SIZE: usize = 500;

/// Uniqueness key of a genre name.
pub fn genre_key(name: &str) -> String {
    fold_case(name.trim())
}

#[derive(Clone)]
pub struct GenreResolver {
    db: Arc<CollectionDb>,
}

impl GenreResolver {
    pub fn new(db: Arc<CollectionDb>) -> Self {
        GenreResolver { db }
    }

    /// Resolve `names` in a transaction of its own.
    pub fn resolve(&self, names: &[String]) -> CollectionResult<Vec<Genre>> {
        validate_genre_names(names)?;
        self.db.write(|tx| Self::resolve_in(tx, names))
    }

    pub fn find_by_name(&self, name: &str) -> CollectionResult<Option<Genre>> {
        let key = genre_key(name);
        if key.is_empty() {
            return Ok(None);
        }
        self.db.read(|conn| Ok(Self::find_by_key(conn, &key)?))
    }

    /// All genres ordered by id.
    pub fn list_all(&self, offset: usize, limit: usize) -> CollectionResult<Vec<Genre>> {
        let (offset, limit) = page_bounds(offset, limit);
        self.db.read(|conn| {
            let mut stmt =
                conn.prepare_cached("SELECT id, name FROM genres ORDER BY id LIMIT ?1 OFFSET ?2")?;
            let genres = stmt
                .query_map(params![limit, offset], |row| {
                    Ok(Genre {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(genres)
        })
    }

    /// Resolve `names` on a connection that already holds a write transaction.
    ///
    /// Duplicates (under the key) collapse to one genre; the result follows
    /// the order in which each key first appears in `names`. Existing genres
    /// are fetched in bulk, missing ones are inserted. An insert that loses a
    /// race on the unique key re-reads the winning row instead of failing.
    pub fn resolve_in(conn: &Connection, names: &[String]) -> CollectionResult<Vec<Genre>> {
        validate_genre_names(names)?;

        let mut wanted: Vec<(String, &str)> = Vec::with_capacity(names.len());
        for name in names {
            let key = genre_key(name);
            if !wanted.iter().any(|(k, _)| *k == key) {
                wanted.push((key, name.trim()));
            }
        }
        if wanted.is_empty() {
            return Ok(vec![]);
        }

        let keys: Vec<&str> = wanted.iter().map(|(k, _)| k.as_str()).collect();
        let mut existing = Self::find_by_keys(conn, &keys)?;

        let mut genres = Vec::with_capacity(wanted.len());
        for (key, display_name) in &wanted {
            let genre = match existing.remove(key) {
                Some(genre) => genre,
                None => Self::insert_or_reuse(conn, key, display_name)?,
            };
            genres.push(genre);
        }
        Ok(genres)
    }

    fn insert_or_reuse(conn: &Connection, key: &str, name: &str) -> rusqlite::Result<Genre> {
        let inserted = conn.execute(
            "INSERT INTO genres (name, name_key) VALUES (?1, ?2) ON CONFLICT(name_key) DO NOTHING",
            params![name, key],
        )?;
        if inserted == 1 {
            debug!("Created genre '{}'", name);
            return Ok(Genre {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
            });
        }

        debug!("Genre key '{}' already taken, reusing stored row", key);
        match Self::find_by_key(conn, key)? {
            Some(genre) => Ok(genre),
            None => Err(rusqlite::Error::QueryReturnedNoRows),
        }
    }

    fn find_by_key(conn: &Connection, key: &str) -> rusqlite::Result<Option<Genre>> {
        match conn.query_row(
            "SELECT id, name FROM genres WHERE name_key = ?1",
            params![key],
            |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        ) {
            Ok(genre) => Ok(Some(genre)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn find_by_keys(conn: &Connection, keys: &[&str]) -> rusqlite::Result<HashMap<String, Genre>> {
        let mut found = HashMap::with_capacity(keys.len());
        for chunk in keys.chunks(LOOKUP_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = conn.prepare(&format!(
                "SELECT id, name, name_key FROM genres WHERE name_key IN ({})",
                placeholders
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((
                    row.get::<_, String>(2)?,
                    Genre {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    },
                ))
            })?;
            for row in rows {
                let (key, genre) = row?;
                found.insert(key, genre);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection_store::errors::CollectionError;
    use tempfile::TempDir;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn create_resolver() -> (TempDir, GenreResolver) {
        let temp_dir = TempDir::new().unwrap();
        let db = CollectionDb::open(temp_dir.path().join("collection.db"), 2).unwrap();
        (temp_dir, GenreResolver::new(Arc::new(db)))
    }

    #[test]
    fn duplicate_names_collapse_to_one_genre() {
        let (_dir, resolver) = create_resolver();

        let genres = resolver.resolve(&names(&["Rock", "Rock"])).unwrap();

        assert_eq!(genres.len(), 1);
        assert_eq!(resolver.list_all(0, 100).unwrap().len(), 1);
    }

    #[test]
    fn names_differing_only_in_case_share_a_genre() {
        let (_dir, resolver) = create_resolver();

        let genres = resolver.resolve(&names(&["Rock", "rock", "ROCK"])).unwrap();

        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].name, "Rock");
        assert_eq!(resolver.list_all(0, 100).unwrap().len(), 1);
    }

    #[test]
    fn distinct_names_stay_distinct() {
        let (_dir, resolver) = create_resolver();

        let genres = resolver
            .resolve(&names(&["Rock", "Rockabilly", "Post-Rock"]))
            .unwrap();

        let resolved: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(resolved, vec!["Rock", "Rockabilly", "Post-Rock"]);
    }

    #[test]
    fn first_spelling_stays_canonical_across_calls() {
        let (_dir, resolver) = create_resolver();

        let first = resolver.resolve(&names(&["  Hip Hop "])).unwrap();
        let second = resolver.resolve(&names(&["HIP HOP", "Jazz"])).unwrap();

        assert_eq!(first[0].name, "Hip Hop");
        assert_eq!(second[0], first[0]);
        assert_eq!(second[1].name, "Jazz");
    }

    #[test]
    fn blank_names_are_rejected_without_writing() {
        let (_dir, resolver) = create_resolver();

        let result = resolver.resolve(&names(&["Jazz", "   "]));

        assert!(matches!(result, Err(CollectionError::Validation(_))));
        assert!(resolver.list_all(0, 100).unwrap().is_empty());
    }

    #[test]
    fn find_by_name_ignores_case_and_padding() {
        let (_dir, resolver) = create_resolver();
        let created = resolver.resolve(&names(&["Electronic"])).unwrap();

        assert_eq!(
            resolver.find_by_name(" electronic ").unwrap(),
            Some(created[0].clone())
        );
        assert_eq!(resolver.find_by_name("Ambient").unwrap(), None);
        assert_eq!(resolver.find_by_name("").unwrap(), None);
    }

    #[test]
    fn list_all_pages_in_id_order() {
        let (_dir, resolver) = create_resolver();
        resolver
            .resolve(&names(&["Blues", "Funk", "Soul", "Disco"]))
            .unwrap();

        let page: Vec<String> = resolver
            .list_all(1, 2)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(page, vec!["Funk", "Soul"]);
    }

    #[test]
    fn conflicting_insert_reuses_the_stored_row() {
        let (_dir, resolver) = create_resolver();
        let stored = resolver.resolve(&names(&["Reggae"])).unwrap();

        // Simulates losing the race: the bulk lookup missed the key but the
        // row exists by the time of the insert.
        let reused = resolver
            .db
            .write(|tx| Ok(GenreResolver::insert_or_reuse(tx, "reggae", "REGGAE")?))
            .unwrap();

        assert_eq!(reused, stored[0]);
    }

    #[test]
    fn concurrent_resolution_creates_one_row_per_key() {
        let (_dir, resolver) = create_resolver();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let resolver = resolver.clone();
                std::thread::spawn(move || {
                    let spelling = if i % 2 == 0 { "Metal" } else { "metal" };
                    resolver.resolve(&names(&[spelling, "Punk"])).unwrap()
                })
            })
            .collect();
        let results: Vec<Vec<Genre>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(resolver.list_all(0, 100).unwrap().len(), 2);
        assert!(results.iter().all(|genres| genres == &results[0]));
    }
}
