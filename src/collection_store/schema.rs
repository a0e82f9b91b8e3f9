//! SQLite schema definitions for the record collection database.
//!
//! Records own their tracks; genres are shared and linked through
//! `record_genres`. Dates and timestamps are stored as ISO-8601 text.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const RECORD_FK: ForeignKey = ForeignKey {
    foreign_table: "records",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const GENRE_FK: ForeignKey = ForeignKey {
    foreign_table: "genres",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// Records table - one row per release in the collection
const RECORDS_TABLE: Table = Table {
    name: "records",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("release_date", &SqlType::Text), // 'YYYY-MM-DD'
        sqlite_column!("label", &SqlType::Text),
        sqlite_column!("catalog_number", &SqlType::Text),
        sqlite_column!("format", &SqlType::Text),
        sqlite_column!("condition", &SqlType::Text),
        sqlite_column!("purchase_date", &SqlType::Text),
        sqlite_column!("purchase_price", &SqlType::Real),
        sqlite_column!("album_art_url", &SqlType::Text),
        sqlite_column!("notes", &SqlType::Text),
        sqlite_column!("discogs_url", &SqlType::Text),
        sqlite_column!("review_url", &SqlType::Text),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Text, non_null = true),
    ],
    indices: &[
        ("idx_records_title", "title"),
        ("idx_records_artist", "artist"),
    ],
    unique_constraints: &[],
};

/// Genres table - `name_key` is the trimmed, lowercased name
const GENRES_TABLE: Table = Table {
    name: "genres",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("name_key", &SqlType::Text, non_null = true),
    ],
    indices: &[],
    unique_constraints: &[&["name_key"]],
};

/// Tracks table - `track_index` keeps the order tracks were supplied in
const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "record_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&RECORD_FK)
        ),
        sqlite_column!("track_index", &SqlType::Integer, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("position", &SqlType::Text), // 'A1', 'B2', ...
        sqlite_column!("duration", &SqlType::Integer), // seconds
    ],
    indices: &[("idx_tracks_record", "record_id")],
    unique_constraints: &[],
};

/// Record <-> genre membership
const RECORD_GENRES_TABLE: Table = Table {
    name: "record_genres",
    columns: &[
        sqlite_column!(
            "record_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&RECORD_FK)
        ),
        sqlite_column!(
            "genre_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&GENRE_FK)
        ),
    ],
    indices: &[("idx_record_genres_genre", "genre_id")],
    unique_constraints: &[&["record_id", "genre_id"]],
};

pub const COLLECTION_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        RECORDS_TABLE,
        GENRES_TABLE,
        TRACKS_TABLE,
        RECORD_GENRES_TABLE,
    ],
    migration: None,
}];
