//! Shared constants for end-to-end tests

// ============================================================================
// Seeded collection
// ============================================================================

/// "Test Pressing" by "Metal Band", genres Metal and Rock
pub const RECORD_1_TITLE: &str = "Test Pressing";
pub const RECORD_1_ARTIST: &str = "Metal Band";

/// "Blue Train" by "John Coltrane", genre Jazz, label "Blue Note"
pub const RECORD_2_TITLE: &str = "Blue Train";
pub const RECORD_2_ARTIST: &str = "John Coltrane";
pub const RECORD_2_LABEL: &str = "Blue Note";

/// "Paranoid" by "Black Sabbath", genre metal (lowercase, same genre as Metal)
pub const RECORD_3_TITLE: &str = "Paranoid";
pub const RECORD_3_ARTIST: &str = "Black Sabbath";

pub const SEEDED_RECORD_COUNT: usize = 3;

/// Canonical genre names, in insertion order
pub const SEEDED_GENRES: [&str; 3] = ["Metal", "Rock", "Jazz"];

// ============================================================================
// Enrichment stub
// ============================================================================

/// Artist/title pair the stub gateway knows links for
pub const ENRICHED_ARTIST: &str = "Air";
pub const ENRICHED_TITLE: &str = "Moon Safari";

pub const STUB_ALBUM_ART_URL: &str = "https://img.example/moon-safari.jpg";
pub const STUB_DISCOGS_URL: &str = "https://www.discogs.com/release/1-Moon-Safari";
pub const STUB_REVIEW_URL: &str = "https://www.last.fm/music/Air/Moon+Safari";

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
