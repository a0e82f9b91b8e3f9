//! Best-effort album metadata from external providers.

mod discogs;
mod gateway;
mod lastfm;
mod provider;

pub use discogs::{DiscogsClient, DiscogsRelease};
pub use gateway::{fill_missing_links, AlbumLinks, EnrichmentGateway, NoOpGateway};
pub use lastfm::LastFmClient;
pub use provider::ProviderGateway;
