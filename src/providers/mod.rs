pub mod link;
pub mod netease;
pub mod qishui;
pub mod qq_music;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::ports::http::HttpTransport;
use crate::resolver::PlaylistResolver;
use crate::resolver::error::{ResolveError, Stage};
use crate::resolver::types::ProviderKind;

pub use netease::NetEaseProvider;
pub use qishui::QishuiProvider;
pub use qq_music::QqMusicProvider;

pub(crate) fn decode_json<T: DeserializeOwned>(
    provider: ProviderKind,
    stage: Stage,
    body: &[u8],
) -> Result<T, ResolveError> {
    serde_json::from_slice(body).map_err(|e| ResolveError::decode(provider, stage, e))
}

/// Resolver with every supported provider registered against `transport`.
pub fn build_resolver(config: &Config, transport: Arc<dyn HttpTransport>) -> PlaylistResolver {
    PlaylistResolver::new(config.batch_size)
        .with_provider(Arc::new(NetEaseProvider::new(
            transport.clone(),
            config.netease.clone(),
        )))
        .with_provider(Arc::new(QqMusicProvider::new(
            transport.clone(),
            config.qq_music.clone(),
        )))
        .with_provider(Arc::new(QishuiProvider::new(
            transport,
            config.qishui.clone(),
        )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::http::MockHttpTransport;
    use crate::resolver::types::RequestCounter;

    #[tokio::test]
    async fn test_built_resolver_routes_by_link() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .withf(|url, _| url == "https://music.163.com/api/v6/playlist/detail")
            .times(1)
            .returning(|_, _| {
                Ok(br#"{"code":200,"playlist":{"name":"Empty","trackCount":0,"trackIds":[]}}"#
                    .to_vec())
            });
        let resolver = build_resolver(&Config::default(), Arc::new(transport));

        let playlist = resolver
            .resolve(
                &RequestCounter::new(),
                "https://music.163.com/#/playlist?id=1",
                false,
            )
            .await
            .unwrap();

        assert_eq!(playlist.name, "Empty");
        assert!(playlist.songs.is_empty());
        assert_eq!(playlist.songs_count, 0);
    }

    #[tokio::test]
    async fn test_qq_sentinel_link_never_reaches_the_network() {
        let mut transport = MockHttpTransport::new();
        transport.expect_post().times(0);
        transport.expect_resolve_redirect().times(0);
        let resolver = build_resolver(&Config::default(), Arc::new(transport));

        let result = resolver
            .resolve(
                &RequestCounter::new(),
                "https://i.y.qq.com/v8/playsong.html",
                false,
            )
            .await;

        assert!(matches!(
            result,
            Err(ResolveError::InvalidPlaylistLink {
                provider: ProviderKind::QqMusic
            })
        ));
    }

    #[test]
    fn test_decode_json_reports_stage() {
        let result: Result<serde_json::Value, _> =
            decode_json(ProviderKind::Qishui, Stage::FetchTracks, b"{");

        assert!(matches!(
            result,
            Err(ResolveError::Decode {
                provider: ProviderKind::Qishui,
                stage: Stage::FetchTracks,
                ..
            })
        ));
    }
}
