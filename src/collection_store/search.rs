//! Substring search over records.
//!
//! A record matches when the query appears in its title, artist, label or
//! catalog number, or in the name of any genre it belongs to. Both sides are
//! folded with the `fold_case` SQL function, so matching ignores case for
//! non-ASCII letters too, the same way genre keys do.

use super::db::{fold_case, page_bounds, CollectionDb};
use super::errors::CollectionResult;
use super::models::SearchResults;
use super::record_repository::{parse_record_row, with_relations, RECORD_COLUMNS};
use rusqlite::params;
use std::sync::Arc;
use tracing::debug;

// Genre names are matched on `name_key`, which is already folded.
const MATCH_CLAUSE: &str = "fold_case(title) LIKE ?1 ESCAPE '\\' \
    OR fold_case(artist) LIKE ?1 ESCAPE '\\' \
    OR fold_case(label) LIKE ?1 ESCAPE '\\' \
    OR fold_case(catalog_number) LIKE ?1 ESCAPE '\\' \
    OR EXISTS (SELECT 1 FROM record_genres rg JOIN genres g ON g.id = rg.genre_id \
        WHERE rg.record_id = records.id AND g.name_key LIKE ?1 ESCAPE '\\')";

/// Escape `%`, `_` and the escape character itself so user input matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[derive(Clone)]
pub struct SearchEngine {
    db: Arc<CollectionDb>,
}

impl SearchEngine {
    pub fn new(db: Arc<CollectionDb>) -> Self {
        SearchEngine { db }
    }

    /// Search the collection.
    ///
    /// The query is trimmed; an empty query matches every record. `total`
    /// counts all matches, `results` holds the requested page in id order.
    pub fn search(&self, query: &str, offset: usize, limit: usize) -> CollectionResult<SearchResults> {
        let pattern = format!("%{}%", escape_like(&fold_case(query.trim())));
        let (offset, limit) = page_bounds(offset, limit);

        let results = self.db.read(|conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM records WHERE {}", MATCH_CLAUSE),
                params![pattern],
                |r| r.get(0),
            )?;

            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {} FROM records WHERE {} ORDER BY id LIMIT ?2 OFFSET ?3",
                RECORD_COLUMNS, MATCH_CLAUSE
            ))?;
            let rows = stmt
                .query_map(params![pattern, limit, offset], parse_record_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(SearchResults {
                results: with_relations(conn, rows)?,
                total: total as usize,
            })
        })?;

        debug!(
            "Search '{}' matched {} records, returning {}",
            query,
            results.total,
            results.results.len()
        );
        Ok(results)
    }
}
