//! Validation for collection writes.
//!
//! Every check runs before a write transaction is opened, so invalid input
//! never reaches storage.

use super::models::{NewRecord, NewTrack, RecordUpdate};
use thiserror::Error;

/// Field-level validation failure. `field` is a path such as `tracks[2].title`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required but was empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be non-negative, got {value}")]
    NegativeValue { field: String, value: f64 },

    #[error("Field '{field}' must be a finite number")]
    NonFiniteValue { field: String },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::NegativeValue { field, .. }
            | ValidationError::NonFiniteValue { field } => field,
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

fn require_text(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn validate_price(price: Option<f64>) -> ValidationResult<()> {
    let Some(price) = price else {
        return Ok(());
    };
    if !price.is_finite() {
        return Err(ValidationError::NonFiniteValue {
            field: "purchase_price".to_string(),
        });
    }
    if price < 0.0 {
        return Err(ValidationError::NegativeValue {
            field: "purchase_price".to_string(),
            value: price,
        });
    }
    Ok(())
}

/// Validate genre names: each one must contain something other than whitespace.
pub fn validate_genre_names(names: &[String]) -> ValidationResult<()> {
    for (idx, name) in names.iter().enumerate() {
        require_text(&format!("genres[{}]", idx), name)?;
    }
    Ok(())
}

pub fn validate_tracks(tracks: &[NewTrack]) -> ValidationResult<()> {
    for (idx, track) in tracks.iter().enumerate() {
        require_text(&format!("tracks[{}].title", idx), &track.title)?;
        if let Some(duration) = track.duration {
            if duration < 0 {
                return Err(ValidationError::NegativeValue {
                    field: format!("tracks[{}].duration", idx),
                    value: duration as f64,
                });
            }
        }
    }
    Ok(())
}

/// Validate a record before creation
pub fn validate_new_record(record: &NewRecord) -> ValidationResult<()> {
    require_text("title", &record.title)?;
    require_text("artist", &record.artist)?;
    validate_price(record.purchase_price)?;
    validate_genre_names(&record.genres)?;
    validate_tracks(&record.tracks)
}

/// Validate the fields present in a partial update
pub fn validate_record_update(update: &RecordUpdate) -> ValidationResult<()> {
    if let Some(title) = &update.title {
        require_text("title", title)?;
    }
    if let Some(artist) = &update.artist {
        require_text("artist", artist)?;
    }
    if let Some(price) = update.purchase_price {
        validate_price(price)?;
    }
    if let Some(genres) = &update.genres {
        validate_genre_names(genres)?;
    }
    if let Some(tracks) = &update.tracks {
        validate_tracks(tracks)?;
    }
    Ok(())
}
