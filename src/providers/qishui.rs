use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::config::QishuiConfig;
use crate::ports::http::{HttpTransport, RequestBody};
use crate::ports::provider::PlaylistProvider;
use crate::providers::decode_json;
use crate::providers::link::{LinkParts, numeric_id};
use crate::resolver::error::{ResolveError, Stage};
use crate::resolver::types::{PlaylistId, PlaylistMetadata, ProviderKind, TrackId, TrackRecord};

const KIND: ProviderKind = ProviderKind::Qishui;
const SHORT_LINK_HOST: &str = "qishui.douyin.com";

/// Qishui sends ids as strings in some payloads and numbers in others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(TrackId),
    Text(String),
}

impl RawId {
    fn parse(self, stage: Stage) -> Result<TrackId, ResolveError> {
        match self {
            RawId::Number(id) => Ok(id),
            RawId::Text(text) => text
                .parse()
                .map_err(|_| ResolveError::decode(KIND, stage, format!("bad track id `{text}`"))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistDetailResponse {
    #[serde(default)]
    status_code: i64,
    playlist: Option<PlaylistInfo>,
    #[serde(default)]
    media_resources: Vec<MediaResource>,
}

#[derive(Debug, Deserialize)]
struct PlaylistInfo {
    title: String,
    #[serde(default)]
    count_tracks: u64,
}

#[derive(Debug, Deserialize)]
struct MediaResource {
    entity: MediaEntity,
}

#[derive(Debug, Deserialize)]
struct MediaEntity {
    track_wrapper: Option<TrackWrapper>,
}

#[derive(Debug, Deserialize)]
struct TrackWrapper {
    track: TrackRef,
}

#[derive(Debug, Deserialize)]
struct TrackRef {
    id: RawId,
}

#[derive(Debug, Deserialize)]
struct TracksResponse {
    #[serde(default)]
    status_code: i64,
    #[serde(default)]
    tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    id: RawId,
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

fn parse_playlist_url(link: &str) -> Result<PlaylistId, ResolveError> {
    let parts = LinkParts::parse(KIND, link)?;
    if parts.path.contains("track") {
        return Err(ResolveError::malformed(KIND, "link points at a single track"));
    }

    let id = parts
        .param("playlist_id")
        .ok_or_else(|| ResolveError::malformed(KIND, "link has no playlist_id"))?;
    numeric_id(KIND, id)?;
    Ok(PlaylistId::Text(id.to_string()))
}

fn status_error(stage: Stage, status_code: i64) -> ResolveError {
    ResolveError::decode(KIND, stage, format!("status code {status_code}"))
}

pub struct QishuiProvider {
    transport: Arc<dyn HttpTransport>,
    config: QishuiConfig,
}

impl QishuiProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, config: QishuiConfig) -> Self {
        Self { transport, config }
    }
}

#[async_trait::async_trait]
impl PlaylistProvider for QishuiProvider {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn parse_playlist_id(&self, link: &str) -> Result<PlaylistId, ResolveError> {
        let parts = LinkParts::parse(KIND, link)?;
        if parts.host != SHORT_LINK_HOST {
            return parse_playlist_url(link);
        }

        let resolved = self
            .transport
            .resolve_redirect(&parts.url)
            .await
            .map_err(|e| ResolveError::fetch(KIND, Stage::ParseLink, e))?;
        tracing::debug!("Resolved Qishui short link {} to {}", parts.url, resolved);
        parse_playlist_url(&resolved)
    }

    async fn fetch_metadata(&self, id: &PlaylistId) -> Result<PlaylistMetadata, ResolveError> {
        let body = self
            .transport
            .post(
                &self.config.playlist_url,
                RequestBody::form([("playlist_id", id.to_string())]),
            )
            .await
            .map_err(|e| ResolveError::fetch(KIND, Stage::FetchPlaylist, e))?;

        let response: PlaylistDetailResponse = decode_json(KIND, Stage::FetchPlaylist, &body)?;
        if response.status_code != 0 {
            return Err(status_error(Stage::FetchPlaylist, response.status_code));
        }
        let playlist = response.playlist.ok_or_else(|| {
            ResolveError::decode(KIND, Stage::FetchPlaylist, "response has no playlist")
        })?;

        let track_ids = response
            .media_resources
            .into_iter()
            .filter_map(|resource| resource.entity.track_wrapper)
            .map(|wrapper| wrapper.track.id.parse(Stage::FetchPlaylist))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PlaylistMetadata {
            name: playlist.title,
            track_ids,
            track_count: playlist.count_tracks,
        })
    }

    async fn fetch_track_batch(&self, ids: &[TrackId]) -> Result<Vec<TrackRecord>, ResolveError> {
        let track_ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let body = self
            .transport
            .post(
                &self.config.tracks_url,
                RequestBody::Json(json!({ "track_ids": track_ids })),
            )
            .await
            .map_err(|e| ResolveError::fetch(KIND, Stage::FetchTracks, e))?;

        let response: TracksResponse = decode_json(KIND, Stage::FetchTracks, &body)?;
        if response.status_code != 0 {
            return Err(status_error(Stage::FetchTracks, response.status_code));
        }

        response
            .tracks
            .into_iter()
            .map(|track| {
                Ok(TrackRecord {
                    id: track.id.parse(Stage::FetchTracks)?,
                    title: track.name,
                    artists: track.artists.into_iter().map(|a| a.name).collect(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::http::{MockHttpTransport, TransportError};

    fn provider(transport: MockHttpTransport) -> QishuiProvider {
        QishuiProvider::new(Arc::new(transport), QishuiConfig::default())
    }

    #[test]
    fn test_parse_playlist_url() {
        assert_eq!(
            parse_playlist_url(
                "https://music.douyin.com/qishui/share/playlist?playlist_id=7238301289&hybrid_sdk_version=bullet"
            )
            .unwrap(),
            PlaylistId::Text("7238301289".into())
        );
    }

    #[test]
    fn test_parse_rejects_tracks_and_missing_ids() {
        assert!(matches!(
            parse_playlist_url("https://music.douyin.com/qishui/share/track?track_id=1"),
            Err(ResolveError::MalformedLink { .. })
        ));
        assert!(matches!(
            parse_playlist_url("https://music.douyin.com/qishui/share/playlist"),
            Err(ResolveError::MalformedLink { .. })
        ));
        assert!(matches!(
            parse_playlist_url("https://music.douyin.com/qishui/share/playlist?playlist_id=abc"),
            Err(ResolveError::MalformedLink { .. })
        ));
    }

    #[tokio::test]
    async fn test_short_link_is_followed() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_resolve_redirect()
            .withf(|url| url == "https://qishui.douyin.com/s/imYRb1Lq/")
            .returning(|_| {
                Ok("https://music.douyin.com/qishui/share/playlist?playlist_id=55&from=share".into())
            });

        let id = provider(transport)
            .parse_playlist_id("快来听 https://qishui.douyin.com/s/imYRb1Lq/ @汽水音乐")
            .await
            .unwrap();

        assert_eq!(id, PlaylistId::Text("55".into()));
    }

    #[tokio::test]
    async fn test_short_link_redirect_failure() {
        let mut transport = MockHttpTransport::new();
        transport.expect_resolve_redirect().returning(|url| {
            Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
            })
        });

        let result = provider(transport)
            .parse_playlist_id("https://qishui.douyin.com/s/gone/")
            .await;

        assert!(matches!(
            result,
            Err(ResolveError::Fetch {
                stage: Stage::ParseLink,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_fetch_metadata() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .withf(|_, body| body.form_field("playlist_id") == Some("55"))
            .returning(|_, _| {
                Ok(r#"{"status_code":0,"playlist":{"title":"通勤","count_tracks":2},
                    "media_resources":[
                        {"type":"track","entity":{"track_wrapper":{"track":{"id":"900"}}}},
                        {"type":"banner","entity":{}},
                        {"type":"track","entity":{"track_wrapper":{"track":{"id":901}}}}
                    ]}"#
                .as_bytes()
                .to_vec())
            });

        let metadata = provider(transport)
            .fetch_metadata(&PlaylistId::Text("55".into()))
            .await
            .unwrap();

        assert_eq!(metadata.name, "通勤");
        assert_eq!(metadata.track_ids, vec![900, 901]);
        assert_eq!(metadata.track_count, 2);
    }

    #[tokio::test]
    async fn test_fetch_metadata_status_error() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .returning(|_, _| Ok(br#"{"status_code":1000004}"#.to_vec()));

        let result = provider(transport)
            .fetch_metadata(&PlaylistId::Text("55".into()))
            .await;

        assert!(matches!(result, Err(ResolveError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_fetch_track_batch() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_post()
            .withf(|_, body| {
                matches!(body, RequestBody::Json(v) if v["track_ids"] == json!(["900", "901"]))
            })
            .returning(|_, _| {
                Ok(r#"{"status_code":0,"tracks":[
                    {"id":"901","name":"Night (Sped Up)","artists":[{"name":"X"}]},
                    {"id":"900","name":"Day","artists":[]}
                ]}"#
                .as_bytes()
                .to_vec())
            });

        let records = provider(transport)
            .fetch_track_batch(&[900, 901])
            .await
            .unwrap();

        assert_eq!(records[0].id, 901);
        assert_eq!(records[0].title, "Night (Sped Up)");
        assert_eq!(records[1].artists, Vec::<String>::new());
    }
}
