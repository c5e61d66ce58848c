pub mod assemble;
pub mod batch;
pub mod classify;
pub mod error;
pub mod normalize;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use crate::ports::provider::PlaylistProvider;
use crate::resolver::error::ResolveError;
use crate::resolver::types::{
    LinkKind, MAX_BATCH_SIZE, PlaylistLink, ProviderKind, RequestCounter, ResolvedPlaylist,
};

/// Resolves playlist links into ordered "Title - Artist" lists.
pub struct PlaylistResolver {
    providers: HashMap<ProviderKind, Arc<dyn PlaylistProvider>>,
    batch_size: usize,
}

impl PlaylistResolver {
    /// `batch_size` is clamped to `1..=MAX_BATCH_SIZE`.
    pub fn new(batch_size: usize) -> Self {
        Self {
            providers: HashMap::new(),
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    /// Register a provider under its own kind, replacing any previous one.
    pub fn with_provider(mut self, provider: Arc<dyn PlaylistProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[instrument(skip(self, counter), fields(request = tracing::field::Empty))]
    pub async fn resolve(
        &self,
        counter: &RequestCounter,
        link: &str,
        detailed: bool,
    ) -> Result<ResolvedPlaylist, ResolveError> {
        let request = counter.next();
        tracing::Span::current().record("request", request);
        tracing::info!("Playlist request #{}: {}, detailed: {}", request, link, detailed);

        let link = PlaylistLink::classify(link);
        let kind = match link.kind() {
            LinkKind::Provider(kind) => kind,
            LinkKind::Unrecognized => {
                tracing::warn!("Unsupported playlist link: {}", link.raw());
                return Err(ResolveError::UnrecognizedLink {
                    link: link.raw().to_string(),
                });
            }
        };
        let provider = self
            .providers
            .get(&kind)
            .ok_or(ResolveError::ProviderUnavailable { provider: kind })?;

        let playlist_id = provider.parse_playlist_id(link.raw()).await?;
        tracing::debug!(provider = %kind, playlist_id = %playlist_id, "Parsed playlist link");

        let metadata = provider.fetch_metadata(&playlist_id).await?;
        tracing::info!(
            provider = %kind,
            tracks = metadata.track_ids.len(),
            "Fetched playlist \"{}\"",
            metadata.name
        );

        if metadata.track_ids.is_empty() {
            return Ok(ResolvedPlaylist::empty(metadata.name));
        }

        let map = batch::fetch_tracks(
            provider.as_ref(),
            &metadata.track_ids,
            self.batch_size,
            detailed,
        )
        .await?;

        assemble::assemble_playlist(metadata, map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::http::TransportError;
    use crate::ports::provider::MockPlaylistProvider;
    use crate::resolver::error::Stage;
    use crate::resolver::types::{PlaylistId, PlaylistMetadata, TrackId, TrackRecord};

    fn metadata(track_ids: Vec<TrackId>) -> PlaylistMetadata {
        PlaylistMetadata {
            name: "Road Trip".into(),
            track_count: track_ids.len() as u64,
            track_ids,
        }
    }

    fn record(id: TrackId) -> TrackRecord {
        TrackRecord {
            id,
            title: format!("Song {id} [Remastered]"),
            artists: vec![format!("Artist {id}")],
        }
    }

    fn provider_with(track_ids: Vec<TrackId>) -> MockPlaylistProvider {
        let mut provider = MockPlaylistProvider::new();
        provider.expect_kind().return_const(ProviderKind::NetEase);
        provider
            .expect_parse_playlist_id()
            .returning(|_| Ok(PlaylistId::Numeric(42)));
        provider
            .expect_fetch_metadata()
            .returning(move |_| Ok(metadata(track_ids.clone())));
        provider
    }

    const LINK: &str = "https://music.163.com/playlist?id=42";

    #[tokio::test]
    async fn test_resolve_in_playlist_order() {
        let mut provider = provider_with(vec![5, 3, 5, 1]);
        provider
            .expect_fetch_track_batch()
            .times(1)
            .returning(|ids| {
                let mut unique: Vec<TrackId> = ids.to_vec();
                unique.sort();
                unique.dedup();
                Ok(unique.into_iter().map(record).collect())
            });
        let resolver = PlaylistResolver::new(MAX_BATCH_SIZE).with_provider(Arc::new(provider));

        let playlist = resolver
            .resolve(&RequestCounter::new(), LINK, false)
            .await
            .unwrap();

        assert_eq!(playlist.name, "Road Trip");
        assert_eq!(
            playlist.songs,
            vec![
                "Song 5 - Artist 5",
                "Song 3 - Artist 3",
                "Song 5 - Artist 5",
                "Song 1 - Artist 1",
            ]
        );
        assert_eq!(playlist.songs_count, 4);
    }

    #[tokio::test]
    async fn test_resolve_detailed() {
        let mut provider = provider_with(vec![1]);
        provider
            .expect_fetch_track_batch()
            .returning(|ids| Ok(ids.iter().copied().map(record).collect()));
        let resolver = PlaylistResolver::new(MAX_BATCH_SIZE).with_provider(Arc::new(provider));

        let playlist = resolver
            .resolve(&RequestCounter::new(), LINK, true)
            .await
            .unwrap();

        assert_eq!(playlist.songs, vec!["Song 1 [Remastered] - Artist 1"]);
    }

    #[tokio::test]
    async fn test_empty_playlist_skips_batch_fetch() {
        let mut provider = provider_with(vec![]);
        provider.expect_fetch_track_batch().times(0);
        let resolver = PlaylistResolver::new(MAX_BATCH_SIZE).with_provider(Arc::new(provider));

        let playlist = resolver
            .resolve(&RequestCounter::new(), LINK, false)
            .await
            .unwrap();

        assert_eq!(playlist, ResolvedPlaylist::empty("Road Trip".into()));
    }

    #[tokio::test]
    async fn test_batch_failure_returns_no_partial_result() {
        let mut provider = provider_with((0..900).collect());
        provider.expect_fetch_track_batch().returning(|ids| {
            if ids.len() < MAX_BATCH_SIZE {
                Err(ResolveError::fetch(
                    ProviderKind::NetEase,
                    Stage::FetchTracks,
                    TransportError::Status {
                        url: "https://music.163.com/api/v3/song/detail".into(),
                        status: 502,
                    },
                ))
            } else {
                Ok(ids.iter().copied().map(record).collect())
            }
        });
        let resolver = PlaylistResolver::new(MAX_BATCH_SIZE).with_provider(Arc::new(provider));

        let result = resolver.resolve(&RequestCounter::new(), LINK, false).await;

        assert!(matches!(result, Err(ResolveError::Fetch { .. })));
    }

    #[tokio::test]
    async fn test_missing_track_is_internal_inconsistency() {
        let mut provider = provider_with(vec![1, 2]);
        provider
            .expect_fetch_track_batch()
            .returning(|_| Ok(vec![record(1)]));
        let resolver = PlaylistResolver::new(MAX_BATCH_SIZE).with_provider(Arc::new(provider));

        let result = resolver.resolve(&RequestCounter::new(), LINK, false).await;

        assert!(matches!(
            result,
            Err(ResolveError::InternalInconsistency { track_id: 2 })
        ));
    }

    #[tokio::test]
    async fn test_unrecognized_link() {
        let resolver = PlaylistResolver::new(MAX_BATCH_SIZE);

        let result = resolver
            .resolve(&RequestCounter::new(), "https://example.com/list/1", false)
            .await;

        assert!(matches!(result, Err(ResolveError::UnrecognizedLink { .. })));
    }

    #[tokio::test]
    async fn test_recognized_link_without_provider() {
        let resolver = PlaylistResolver::new(MAX_BATCH_SIZE);

        let result = resolver
            .resolve(
                &RequestCounter::new(),
                "https://qishui.douyin.com/s/abc/",
                false,
            )
            .await;

        assert!(matches!(
            result,
            Err(ResolveError::ProviderUnavailable {
                provider: ProviderKind::Qishui
            })
        ));
    }

    #[tokio::test]
    async fn test_parse_error_stops_before_fetching() {
        let mut provider = MockPlaylistProvider::new();
        provider.expect_kind().return_const(ProviderKind::NetEase);
        provider
            .expect_parse_playlist_id()
            .returning(|_| Err(ResolveError::malformed(ProviderKind::NetEase, "no id")));
        provider.expect_fetch_metadata().times(0);
        provider.expect_fetch_track_batch().times(0);
        let resolver = PlaylistResolver::new(MAX_BATCH_SIZE).with_provider(Arc::new(provider));

        let result = resolver.resolve(&RequestCounter::new(), LINK, false).await;

        assert!(matches!(result, Err(ResolveError::MalformedLink { .. })));
    }

    #[tokio::test]
    async fn test_counter_advances_per_request() {
        let counter = RequestCounter::new();
        let resolver = PlaylistResolver::new(MAX_BATCH_SIZE);

        let _ = resolver.resolve(&counter, "nope", false).await;
        let _ = resolver.resolve(&counter, "nope", false).await;

        assert_eq!(counter.next(), 3);
    }

    #[test]
    fn test_batch_size_is_clamped() {
        assert_eq!(PlaylistResolver::new(0).batch_size(), 1);
        assert_eq!(PlaylistResolver::new(10_000).batch_size(), MAX_BATCH_SIZE);
        assert_eq!(PlaylistResolver::new(50).batch_size(), 50);
    }
}
