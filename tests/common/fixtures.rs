//! Seed data for test servers

use super::constants::*;
use record_collection_server::collection_store::{
    CollectionStore, NewRecord, NewTrack, SqliteCollectionStore,
};

pub fn seed_collection(store: &SqliteCollectionStore) {
    let records = [
        NewRecord {
            genres: vec!["Metal".to_string(), "Rock".to_string()],
            tracks: vec![
                NewTrack {
                    position: Some("A1".to_string()),
                    duration: Some(245),
                    ..NewTrack::titled("Opening")
                },
                NewTrack {
                    position: Some("B1".to_string()),
                    ..NewTrack::titled("Closing")
                },
            ],
            ..NewRecord::new(RECORD_1_TITLE, RECORD_1_ARTIST)
        },
        NewRecord {
            label: Some(RECORD_2_LABEL.to_string()),
            catalog_number: Some("BLP 1577".to_string()),
            genres: vec!["Jazz".to_string()],
            ..NewRecord::new(RECORD_2_TITLE, RECORD_2_ARTIST)
        },
        NewRecord {
            genres: vec!["metal".to_string()],
            ..NewRecord::new(RECORD_3_TITLE, RECORD_3_ARTIST)
        },
    ];

    for record in &records {
        store
            .create_record(record)
            .expect("Failed to seed test collection");
    }
}
