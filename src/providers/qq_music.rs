use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::config::QqMusicConfig;
use crate::ports::http::{HttpTransport, RequestBody};
use crate::ports::provider::PlaylistProvider;
use crate::providers::decode_json;
use crate::providers::link::{LinkParts, numeric_id};
use crate::resolver::error::{ResolveError, Stage};
use crate::resolver::types::{PlaylistId, PlaylistMetadata, ProviderKind, TrackId, TrackRecord};

const KIND: ProviderKind = ProviderKind::QqMusic;

/// What the share sheet produces when it has no playlist to point at.
pub const TEMPLATE_LINK: &str = "https://i.y.qq.com/v8/playsong.html";

/// Path prefix of `c6.y.qq.com` share short-links.
const SHORT_LINK_PATH: &str = "/base/fcgi-bin/u";

/* ---------- Playlist detail ---------- */

#[derive(Debug, Deserialize)]
struct CdInfoResponse {
    code: i64,
    #[serde(default)]
    cdlist: Vec<CdInfo>,
}

#[derive(Debug, Deserialize)]
struct CdInfo {
    dissname: String,
    #[serde(default)]
    songnum: u64,
    /// Comma separated track ids in playlist order.
    #[serde(default)]
    songids: String,
}

/* ---------- Track detail ---------- */

#[derive(Debug, Deserialize)]
struct MusicuResponse {
    code: i64,
    songinfo: Option<SongInfoModule>,
}

#[derive(Debug, Deserialize)]
struct SongInfoModule {
    code: i64,
    data: Option<SongInfoData>,
}

#[derive(Debug, Deserialize)]
struct SongInfoData {
    #[serde(default)]
    tracks: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    id: TrackId,
    name: String,
    #[serde(default)]
    singer: Vec<Singer>,
}

#[derive(Debug, Deserialize)]
struct Singer {
    name: Option<String>,
}

fn is_single_track(parts: &LinkParts) -> bool {
    let path = parts.path.to_lowercase();
    path.contains("playsong") || path.contains("songdetail") || path.contains("/song/")
}

fn parse_playlist_url(link: &str) -> Result<PlaylistId, ResolveError> {
    let parts = LinkParts::parse(KIND, link)?;
    if is_single_track(&parts) {
        return Err(ResolveError::malformed(KIND, "link points at a single song"));
    }

    let id = parts
        .param("id")
        .or_else(|| parts.param("disstid"))
        .or_else(|| parts.segment_after("playlist"))
        .ok_or_else(|| ResolveError::malformed(KIND, "link has no playlist id"))?;
    Ok(PlaylistId::Numeric(numeric_id(KIND, id)?))
}

fn parse_song_ids(songids: &str) -> Result<Vec<TrackId>, ResolveError> {
    songids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse().map_err(|_| {
                ResolveError::decode(KIND, Stage::FetchPlaylist, format!("bad song id `{id}`"))
            })
        })
        .collect()
}

pub struct QqMusicProvider {
    transport: Arc<dyn HttpTransport>,
    config: QqMusicConfig,
}

impl QqMusicProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, config: QqMusicConfig) -> Self {
        Self { transport, config }
    }
}

#[async_trait::async_trait]
impl PlaylistProvider for QqMusicProvider {
    fn kind(&self) -> ProviderKind {
        KIND
    }

    async fn parse_playlist_id(&self, link: &str) -> Result<PlaylistId, ResolveError> {
        if link.trim() == TEMPLATE_LINK {
            return Err(ResolveError::InvalidPlaylistLink { provider: KIND });
        }

        let parts = LinkParts::parse(KIND, link)?;
        if parts.url == TEMPLATE_LINK {
            return Err(ResolveError::InvalidPlaylistLink { provider: KIND });
        }
        if !parts.path.starts_with(SHORT_LINK_PATH) {
            return parse_playlist_url(link);
        }

        let resolved = self
            .transport
            .resolve_redirect(&parts.url)
            .await
            .map_err(|e| ResolveError::fetch(KIND, Stage::ParseLink, e))?;
        tracing::debug!("Resolved QQ Music short link {} to {}", parts.url, resolved);
        if resolved.trim() == TEMPLATE_LINK {
            return Err(ResolveError::InvalidPlaylistLink { provider: KIND });
        }
        parse_playlist_url(&resolved)
    }

    async fn fetch_metadata(&self, id: &PlaylistId) -> Result<PlaylistMetadata, ResolveError> {
        let body = self
            .transport
            .post(
                &self.config.playlist_url,
                RequestBody::form([
                    ("disstid", id.to_string()),
                    ("type", "1".to_string()),
                    ("json", "1".to_string()),
                    ("utf8", "1".to_string()),
                    ("onlysong", "0".to_string()),
                    ("format", "json".to_string()),
                ]),
            )
            .await
            .map_err(|e| ResolveError::fetch(KIND, Stage::FetchPlaylist, e))?;

        let response: CdInfoResponse = decode_json(KIND, Stage::FetchPlaylist, &body)?;
        if response.code != 0 {
            return Err(ResolveError::decode(
                KIND,
                Stage::FetchPlaylist,
                format!("playlist detail returned code {}", response.code),
            ));
        }
        let cd = response.cdlist.into_iter().next().ok_or_else(|| {
            ResolveError::decode(KIND, Stage::FetchPlaylist, "response has no playlist")
        })?;

        Ok(PlaylistMetadata {
            name: cd.dissname,
            track_ids: parse_song_ids(&cd.songids)?,
            track_count: cd.songnum,
        })
    }

    async fn fetch_track_batch(&self, ids: &[TrackId]) -> Result<Vec<TrackRecord>, ResolveError> {
        let request = json!({
            "comm": { "ct": 24, "cv": 0 },
            "songinfo": {
                "module": "music.trackInfo.UniformRuleCtrl",
                "method": "CgiGetTrackInfo",
                "param": {
                    "ids": ids,
                    "types": vec![0; ids.len()],
                },
            },
        });
        let body = self
            .transport
            .post(&self.config.tracks_url, RequestBody::Json(request))
            .await
            .map_err(|e| ResolveError::fetch(KIND, Stage::FetchTracks, e))?;

        let response: MusicuResponse = decode_json(KIND, Stage::FetchTracks, &body)?;
        let module = response
            .songinfo
            .filter(|m| response.code == 0 && m.code == 0)
            .ok_or_else(|| {
                ResolveError::decode(
                    KIND,
                    Stage::FetchTracks,
                    format!("track info returned code {}", response.code),
                )
            })?;

        Ok(module
            .data
            .map(|data| data.tracks)
            .unwrap_or_default()
            .into_iter()
            .map(|track| TrackRecord {
                id: track.id,
                title: track.name,
                artists: track
                    .singer
                    .into_iter()
                    .map(|s| s.name.unwrap_or_default())
                    .collect(),
            })
            .collect())
    }
}
