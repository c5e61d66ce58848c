use std::fmt;

use crate::ports::http::TransportError;
use crate::resolver::types::{ProviderKind, TrackId};

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParseLink,
    FetchPlaylist,
    FetchTracks,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ParseLink => write!(f, "parse link"),
            Stage::FetchPlaylist => write!(f, "fetch playlist"),
            Stage::FetchTracks => write!(f, "fetch tracks"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Unsupported playlist link: {link}")]
    UnrecognizedLink { link: String },
    #[error("No {provider} provider is configured")]
    ProviderUnavailable { provider: ProviderKind },
    #[error("Malformed {provider} playlist link: {reason}")]
    MalformedLink {
        provider: ProviderKind,
        reason: String,
    },
    #[error("Invalid {provider} playlist link, please check that it is correct")]
    InvalidPlaylistLink { provider: ProviderKind },
    #[error("No permission to access this {provider} playlist")]
    AccessDenied { provider: ProviderKind },
    #[error("Failed to {stage} from {provider}: {source}")]
    Fetch {
        provider: ProviderKind,
        stage: Stage,
        #[source]
        source: TransportError,
    },
    #[error("Failed to decode {provider} response ({stage}): {reason}")]
    Decode {
        provider: ProviderKind,
        stage: Stage,
        reason: String,
    },
    #[error("Track {track_id} is missing from the resolved tracks")]
    InternalInconsistency { track_id: TrackId },
}

impl ResolveError {
    pub fn malformed(provider: ProviderKind, reason: impl Into<String>) -> Self {
        Self::MalformedLink {
            provider,
            reason: reason.into(),
        }
    }

    pub fn fetch(provider: ProviderKind, stage: Stage, source: TransportError) -> Self {
        Self::Fetch {
            provider,
            stage,
            source,
        }
    }

    pub fn decode(provider: ProviderKind, stage: Stage, reason: impl fmt::Display) -> Self {
        Self::Decode {
            provider,
            stage,
            reason: reason.to_string(),
        }
    }

    /// Errors caused by what the user sent rather than by us or the provider.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ResolveError::UnrecognizedLink { .. }
                | ResolveError::MalformedLink { .. }
                | ResolveError::InvalidPlaylistLink { .. }
                | ResolveError::AccessDenied { .. }
        )
    }
}
