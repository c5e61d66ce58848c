use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::config::NetEaseConfig;
use crate::ports::http::{HttpTransport, RequestBody};
use crate::ports::provider::PlaylistProvider;
use crate::providers::decode_json;
use crate::providers::link::{LinkParts, numeric_id};
use crate::resolver::error::{ResolveError, Stage};
use crate::resolver::types::{PlaylistId, PlaylistMetadata, ProviderKind, TrackId, TrackRecord};

const KIND: ProviderKind = ProviderKind::NetEase;
const SHORT_LINK_HOST: &str = "163cn.tv";
const ACCESS_DENIED_CODE: i64 = 401;

/* ---------- Playlist detail (v6) ---------- */

#[derive(Debug, Deserialize)]
struct PlaylistDetailResponse {
    code: i64,
    playlist: Option<PlaylistDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistDetail {
    name: String,
    #[serde(default)]
    track_count: u64,
    #[serde(default)]
    track_ids: Vec<TrackIdEntry>,
}

#[derive(Debug, Deserialize)]
struct TrackIdEntry {
    id: TrackId,
}

/* ---------- Song detail (v3) ---------- */

#[derive(Debug, Deserialize)]
struct SongDetailResponse {
    code: i64,
    #[serde(default)]
    songs: Vec<Song>,
}

#[derive(Debug, Deserialize)]
struct Song {
    id: TrackId,
    name: String,
    #[serde(default)]
    ar: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: Option<String>,
}

/// Pull the playlist id out of a full (non short-link) NetEase URL.
fn parse_playlist_url(link: &str) -> Result<PlaylistId, ResolveError> {
    let parts = LinkParts::parse(KIND, link)?;
    if !parts.path.contains("playlist") {
        return Err(ResolveError::malformed(
            KIND,
            format!("`{}` is not a playlist page", parts.path),
        ));
    }

    let id = parts
        .param("id")
        .or_else(|| parts.segment_after("playlist"))
        .ok_or_else(|| ResolveError::malformed(KIND, "link has no playlist id"))?;
    Ok(PlaylistId::Numeric(numeric_id(KIND, id)?))
}

pub struct NetEaseProvider {
    transport: Arc<dyn HttpTransport>,
    config: NetEaseConfig,
}

impl NetEaseProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, config: NetEaseConfig) -> Self {
        Self { transport, config }
    }
}

#[async_trait::async_trait]
impl PlaylistProvider for NetEaseProvider {
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
        tracing::debug!("Resolved NetEase short link {} to {}", parts.url, resolved);
        parse_playlist_url(&resolved)
    }

    async fn fetch_metadata(&self, id: &PlaylistId) -> Result<PlaylistMetadata, ResolveError> {
        let body = self
            .transport
            .post(
                &self.config.playlist_url,
                RequestBody::form([("id", id.to_string())]),
            )
            .await
            .map_err(|e| ResolveError::fetch(KIND, Stage::FetchPlaylist, e))?;

        let response: PlaylistDetailResponse = decode_json(KIND, Stage::FetchPlaylist, &body)?;
        if response.code == ACCESS_DENIED_CODE {
            tracing::warn!("No permission to access NetEase playlist {}", id);
            return Err(ResolveError::AccessDenied { provider: KIND });
        }

        let playlist = response.playlist.ok_or_else(|| {
            ResolveError::decode(
                KIND,
                Stage::FetchPlaylist,
                format!("response has no playlist (code {})", response.code),
            )
        })?;

        Ok(PlaylistMetadata {
            name: playlist.name,
            track_ids: playlist.track_ids.into_iter().map(|t| t.id).collect(),
            track_count: playlist.track_count,
        })
    }

    async fn fetch_track_batch(&self, ids: &[TrackId]) -> Result<Vec<TrackRecord>, ResolveError> {
        let songs = serde_json::Value::Array(ids.iter().map(|id| json!({ "id": id })).collect());
        let body = self
            .transport
            .post(
                &self.config.tracks_url,
                RequestBody::form([("c", songs.to_string())]),
            )
            .await
            .map_err(|e| ResolveError::fetch(KIND, Stage::FetchTracks, e))?;

        let response: SongDetailResponse = decode_json(KIND, Stage::FetchTracks, &body)?;
        if response.code != 200 {
            return Err(ResolveError::decode(
                KIND,
                Stage::FetchTracks,
                format!("song detail returned code {}", response.code),
            ));
        }

        Ok(response
            .songs
            .into_iter()
            .map(|song| TrackRecord {
                id: song.id,
                title: song.name,
                artists: song
                    .ar
                    .into_iter()
                    .map(|a| a.name.unwrap_or_default())
                    .collect(),
            })
            .collect())
    }
}
