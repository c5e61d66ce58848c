use crate::resolver::error::ResolveError;
use crate::resolver::types::{PlaylistId, PlaylistMetadata, ProviderKind, TrackId, TrackRecord};

/// Port trait for one music-streaming provider.
///
/// Selected once per request by the link classifier and then driven uniformly by
/// `resolver::PlaylistResolver`. Implementations live in `providers`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlaylistProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Validate a playlist link and pull the provider's playlist id out of it.
    async fn parse_playlist_id(&self, link: &str) -> Result<PlaylistId, ResolveError>;

    async fn fetch_metadata(&self, id: &PlaylistId) -> Result<PlaylistMetadata, ResolveError>;

    /// Fetch details for one batch of at most `MAX_BATCH_SIZE` tracks.
    async fn fetch_track_batch(&self, ids: &[TrackId]) -> Result<Vec<TrackRecord>, ResolveError>;
}
