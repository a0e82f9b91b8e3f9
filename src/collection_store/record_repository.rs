//! Create/read/update/delete over record aggregates.
//!
//! A record aggregate is the `records` row plus its genre membership and its
//! tracks. Every mutation runs in one write transaction.

use super::db::{page_bounds, CollectionDb};
use super::errors::CollectionResult;
use super::genre_resolver::GenreResolver;
use super::models::{Genre, NewRecord, NewTrack, Record, RecordUpdate, Track};
use super::validation::{validate_new_record, validate_record_update};
use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::sync::Arc;
use tracing::debug;

pub(crate) const RECORD_COLUMNS: &str = "id, title, artist, release_date, label, \
    catalog_number, format, condition, purchase_date, purchase_price, album_art_url, \
    notes, discogs_url, review_url, created_at, updated_at";

#[derive(Clone)]
pub struct RecordRepository {
    db: Arc<CollectionDb>,
}

impl RecordRepository {
    pub fn new(db: Arc<CollectionDb>) -> Self {
        RecordRepository { db }
    }

    pub fn create(&self, input: &NewRecord) -> CollectionResult<Record> {
        validate_new_record(input)?;

        let record = self.db.write(|tx| {
            let genres = GenreResolver::resolve_in(tx, &input.genres)?;
            let now = Utc::now();

            tx.execute(
                "INSERT INTO records (title, artist, release_date, label, catalog_number, \
                 format, condition, purchase_date, purchase_price, album_art_url, notes, \
                 discogs_url, review_url, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
                params![
                    input.title.trim(),
                    input.artist.trim(),
                    input.release_date,
                    input.label,
                    input.catalog_number,
                    input.format,
                    input.condition,
                    input.purchase_date,
                    input.purchase_price,
                    input.album_art_url,
                    input.notes,
                    input.discogs_url,
                    input.review_url,
                    now,
                ],
            )?;
            let record_id = tx.last_insert_rowid();

            link_genres(tx, record_id, &genres)?;
            insert_tracks(tx, record_id, &input.tracks)?;

            Ok(load_record(tx, record_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?)
        })?;

        debug!(
            "Created record {} '{}' by '{}' ({} genres, {} tracks)",
            record.id,
            record.title,
            record.artist,
            record.genres.len(),
            record.tracks.len()
        );
        Ok(record)
    }

    pub fn get(&self, id: i64) -> CollectionResult<Option<Record>> {
        self.db.read(|conn| Ok(load_record(conn, id)?))
    }

    /// Records ordered by id.
    pub fn list(&self, offset: usize, limit: usize) -> CollectionResult<Vec<Record>> {
        let (offset, limit) = page_bounds(offset, limit);
        self.db.read(|conn| {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {} FROM records ORDER BY id LIMIT ?1 OFFSET ?2",
                RECORD_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![limit, offset], parse_record_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(with_relations(conn, rows)?)
        })
    }

    /// Apply the fields present in `changes`. Returns `None` if there is no
    /// record with `id`.
    ///
    /// Present `genres` or `tracks` replace the stored set wholesale.
    pub fn update(&self, id: i64, changes: &RecordUpdate) -> CollectionResult<Option<Record>> {
        validate_record_update(changes)?;

        let updated = self.db.write(|tx| {
            let created_at = match tx.query_row(
                "SELECT created_at FROM records WHERE id = ?1",
                params![id],
                |row| row.get::<_, chrono::DateTime<Utc>>(0),
            ) {
                Ok(created_at) => created_at,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let mut assignments = changed_columns(changes);
            assignments.push(("updated_at", Box::new(Utc::now().max(created_at))));

            let set_clause = assignments
                .iter()
                .enumerate()
                .map(|(idx, (column, _))| format!("{} = ?{}", column, idx + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let mut values: Vec<Box<dyn ToSql>> =
                assignments.into_iter().map(|(_, value)| value).collect();
            values.push(Box::new(id));
            tx.execute(
                &format!(
                    "UPDATE records SET {} WHERE id = ?{}",
                    set_clause,
                    values.len()
                ),
                params_from_iter(values.iter()),
            )?;

            if let Some(genre_names) = &changes.genres {
                let genres = GenreResolver::resolve_in(tx, genre_names)?;
                tx.execute(
                    "DELETE FROM record_genres WHERE record_id = ?1",
                    params![id],
                )?;
                link_genres(tx, id, &genres)?;
            }

            if let Some(tracks) = &changes.tracks {
                tx.execute("DELETE FROM tracks WHERE record_id = ?1", params![id])?;
                insert_tracks(tx, id, tracks)?;
            }

            Ok(load_record(tx, id)?)
        })?;

        if updated.is_some() {
            debug!("Updated record {}", id);
        }
        Ok(updated)
    }

    /// Remove a record with its tracks and genre membership. Genres stay.
    ///
    /// Returns `false` when there was nothing to delete.
    pub fn delete(&self, id: i64) -> CollectionResult<bool> {
        let deleted = self.db.write(|tx| {
            tx.execute("DELETE FROM tracks WHERE record_id = ?1", params![id])?;
            tx.execute(
                "DELETE FROM record_genres WHERE record_id = ?1",
                params![id],
            )?;
            let rows = tx.execute("DELETE FROM records WHERE id = ?1", params![id])?;
            Ok(rows > 0)
        })?;

        if deleted {
            debug!("Deleted record {}", id);
        }
        Ok(deleted)
    }
}

/// Column/value pairs for the scalar fields present in an update.
fn changed_columns(changes: &RecordUpdate) -> Vec<(&'static str, Box<dyn ToSql>)> {
    let mut columns: Vec<(&'static str, Box<dyn ToSql>)> = Vec::new();
    if let Some(title) = &changes.title {
        columns.push(("title", Box::new(title.trim().to_string())));
    }
    if let Some(artist) = &changes.artist {
        columns.push(("artist", Box::new(artist.trim().to_string())));
    }
    if let Some(value) = changes.release_date {
        columns.push(("release_date", Box::new(value)));
    }
    if let Some(value) = &changes.label {
        columns.push(("label", Box::new(value.clone())));
    }
    if let Some(value) = &changes.catalog_number {
        columns.push(("catalog_number", Box::new(value.clone())));
    }
    if let Some(value) = &changes.format {
        columns.push(("format", Box::new(value.clone())));
    }
    if let Some(value) = &changes.condition {
        columns.push(("condition", Box::new(value.clone())));
    }
    if let Some(value) = changes.purchase_date {
        columns.push(("purchase_date", Box::new(value)));
    }
    if let Some(value) = changes.purchase_price {
        columns.push(("purchase_price", Box::new(value)));
    }
    if let Some(value) = &changes.album_art_url {
        columns.push(("album_art_url", Box::new(value.clone())));
    }
    if let Some(value) = &changes.notes {
        columns.push(("notes", Box::new(value.clone())));
    }
    if let Some(value) = &changes.discogs_url {
        columns.push(("discogs_url", Box::new(value.clone())));
    }
    if let Some(value) = &changes.review_url {
        columns.push(("review_url", Box::new(value.clone())));
    }
    columns
}

fn link_genres(conn: &Connection, record_id: i64, genres: &[Genre]) -> rusqlite::Result<()> {
    let mut stmt =
        conn.prepare_cached("INSERT INTO record_genres (record_id, genre_id) VALUES (?1, ?2)")?;
    for genre in genres {
        stmt.execute(params![record_id, genre.id])?;
    }
    Ok(())
}

fn insert_tracks(conn: &Connection, record_id: i64, tracks: &[NewTrack]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO tracks (record_id, track_index, title, position, duration) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (idx, track) in tracks.iter().enumerate() {
        stmt.execute(params![
            record_id,
            idx as i64,
            track.title.trim(),
            track.position,
            track.duration
        ])?;
    }
    Ok(())
}

/// Parse a row selected with `RECORD_COLUMNS`. Relations are left empty.
pub(crate) fn parse_record_row(row: &Row) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        release_date: row.get(3)?,
        label: row.get(4)?,
        catalog_number: row.get(5)?,
        format: row.get(6)?,
        condition: row.get(7)?,
        purchase_date: row.get(8)?,
        purchase_price: row.get(9)?,
        album_art_url: row.get(10)?,
        notes: row.get(11)?,
        discogs_url: row.get(12)?,
        review_url: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
        genres: vec![],
        tracks: vec![],
    })
}

pub(crate) fn load_record(conn: &Connection, id: i64) -> rusqlite::Result<Option<Record>> {
    let record = match conn.query_row(
        &format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS),
        params![id],
        parse_record_row,
    ) {
        Ok(record) => record,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(with_relations(conn, vec![record])?.pop())
}

/// Attach genres and tracks to records loaded by `parse_record_row`.
pub(crate) fn with_relations(
    conn: &Connection,
    mut records: Vec<Record>,
) -> rusqlite::Result<Vec<Record>> {
    let mut genre_stmt = conn.prepare_cached(
        "SELECT g.id, g.name FROM record_genres rg \
         JOIN genres g ON g.id = rg.genre_id \
         WHERE rg.record_id = ?1 ORDER BY g.id",
    )?;
    let mut track_stmt = conn.prepare_cached(
        "SELECT id, record_id, title, position, duration FROM tracks \
         WHERE record_id = ?1 ORDER BY track_index",
    )?;

    for record in records.iter_mut() {
        record.genres = genre_stmt
            .query_map(params![record.id], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<_, _>>()?;
        record.tracks = track_stmt
            .query_map(params![record.id], |row| {
                Ok(Track {
                    id: row.get(0)?,
                    record_id: row.get(1)?,
                    title: row.get(2)?,
                    position: row.get(3)?,
                    duration: row.get(4)?,
                })
            })?
            .collect::<Result<_, _>>()?;
    }
    Ok(records)
}
