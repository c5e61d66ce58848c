use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::resolver::classify;

/// Provider-assigned track identifier.
pub type TrackId = u64;

/// Upper bound on how many track ids go into one track-detail request.
pub const MAX_BATCH_SIZE: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    NetEase,
    QqMusic,
    Qishui,
}

impl ProviderKind {
    /// Classification order. The first kind whose rule matches a link wins.
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::NetEase,
        ProviderKind::QqMusic,
        ProviderKind::Qishui,
    ];

    pub fn matches(&self, link: &str) -> bool {
        classify::rule_for(*self).is_match(link)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::NetEase => write!(f, "netease"),
            ProviderKind::QqMusic => write!(f, "qq music"),
            ProviderKind::Qishui => write!(f, "qishui"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Provider(ProviderKind),
    Unrecognized,
}

/// A raw link together with the provider it was classified as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistLink {
    raw: String,
    kind: LinkKind,
}

impl PlaylistLink {
    pub fn classify(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: classify::classify(raw),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistId::Numeric(id) => write!(f, "{id}"),
            PlaylistId::Text(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistMetadata {
    pub name: String,
    /// Playlist order, duplicates allowed.
    pub track_ids: Vec<TrackId>,
    /// Count as reported by the provider. May differ from `track_ids.len()`.
    pub track_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub id: TrackId,
    pub title: String,
    pub artists: Vec<String>,
}

/// Final result handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPlaylist {
    pub name: String,
    pub songs: Vec<String>,
    pub songs_count: u64,
}

impl ResolvedPlaylist {
    pub fn empty(name: String) -> Self {
        Self {
            name,
            songs: Vec::new(),
            songs_count: 0,
        }
    }
}

/// Track id to display string, filled from completed batches.
#[derive(Debug, Default)]
pub struct AggregationMap {
    entries: HashMap<TrackId, String>,
}

impl AggregationMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, id: TrackId, display: String) {
        self.entries.insert(id, display);
    }

    pub fn get(&self, id: TrackId) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Process-wide request number used to correlate log lines.
#[derive(Debug, Default)]
pub struct RequestCounter(AtomicU64);

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of this request, starting at 1.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}
