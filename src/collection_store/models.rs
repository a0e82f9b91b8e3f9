//! Record collection models.
//!
//! Read shapes (`Record`, `Genre`, `Track`) mirror the persisted rows with
//! their relations resolved. Write shapes (`NewRecord`, `RecordUpdate`,
//! `NewTrack`) are what callers hand to the repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Read shapes
// =============================================================================

/// A canonical genre tag, shared by any number of records.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// A single song on a record. `duration` is in seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub record_id: i64,
    pub title: String,
    pub position: Option<String>,
    pub duration: Option<i64>,
}

/// A music release in the collection, with its genres and ordered tracks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub release_date: Option<NaiveDate>,
    pub label: Option<String>,
    pub catalog_number: Option<String>,
    pub format: Option<String>,
    pub condition: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<f64>,
    pub album_art_url: Option<String>,
    pub notes: Option<String>,
    pub discogs_url: Option<String>,
    pub review_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub genres: Vec<Genre>,
    pub tracks: Vec<Track>,
}

/// A page of search hits plus the number of matches before pagination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub results: Vec<Record>,
    pub total: usize,
}

// =============================================================================
// Write shapes
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrack {
    pub title: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
}

impl NewTrack {
    pub fn titled(title: &str) -> Self {
        NewTrack {
            title: title.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub catalog_number: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub album_art_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub discogs_url: Option<String>,
    #[serde(default)]
    pub review_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tracks: Vec<NewTrack>,
}

impl NewRecord {
    pub fn new(title: &str, artist: &str) -> Self {
        NewRecord {
            title: title.to_string(),
            artist: artist.to_string(),
            ..Default::default()
        }
    }
}

/// Partial update of a record.
///
/// An absent field leaves the stored value untouched. For the nullable
/// columns, an explicit `null` clears the value (`Some(None)`). For `genres`
/// and `tracks`, `Some(vec![])` clears the set while `None` keeps it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RecordUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub release_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present")]
    pub label: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub catalog_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub format: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub condition: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub purchase_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present")]
    pub purchase_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    pub album_art_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub discogs_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub review_url: Option<Option<String>>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub tracks: Option<Vec<NewTrack>>,
}

/// Marks a field as present whenever its key appears, even with a `null` value.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_absent_null_and_value() {
        let update: RecordUpdate =
            serde_json::from_str(r#"{"label": null, "notes": "signed copy"}"#).unwrap();

        assert_eq!(update.label, Some(None));
        assert_eq!(update.notes, Some(Some("signed copy".to_string())));
        assert_eq!(update.catalog_number, None);
        assert!(update.title.is_none());
    }

    #[test]
    fn update_distinguishes_absent_and_empty_collections() {
        let absent: RecordUpdate = serde_json::from_str("{}").unwrap();
        assert!(absent.genres.is_none());
        assert!(absent.tracks.is_none());

        let cleared: RecordUpdate =
            serde_json::from_str(r#"{"genres": [], "tracks": []}"#).unwrap();
        assert_eq!(cleared.genres, Some(vec![]));
        assert_eq!(cleared.tracks, Some(vec![]));
    }

    #[test]
    fn new_record_defaults_collections_to_empty() {
        let record: NewRecord =
            serde_json::from_str(r#"{"title": "Blue Train", "artist": "John Coltrane"}"#)
                .unwrap();

        assert!(record.genres.is_empty());
        assert!(record.tracks.is_empty());
        assert!(record.release_date.is_none());
    }

    #[test]
    fn new_record_parses_dates_and_tracks() {
        let record: NewRecord = serde_json::from_str(
            r#"{
                "title": "Kind of Blue",
                "artist": "Miles Davis",
                "release_date": "1959-08-17",
                "purchase_price": 24.5,
                "tracks": [{"title": "So What", "position": "A1", "duration": 562}]
            }"#,
        )
        .unwrap();

        assert_eq!(
            record.release_date,
            Some(NaiveDate::from_ymd_opt(1959, 8, 17).unwrap())
        );
        assert_eq!(record.tracks[0].duration, Some(562));
        assert_eq!(record.tracks[0].position.as_deref(), Some("A1"));
    }
}
