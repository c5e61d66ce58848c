use crate::resolver::error::ResolveError;
use crate::resolver::types::{AggregationMap, PlaylistMetadata, ResolvedPlaylist, TrackId};

/// Put display strings back into playlist order.
///
/// Every occurrence of an id gets its own entry, so duplicates keep their positions. An id the
/// map does not know is an internal error, never skipped.
pub fn assemble_songs(
    track_ids: &[TrackId],
    map: &AggregationMap,
) -> Result<Vec<String>, ResolveError> {
    track_ids
        .iter()
        .map(|&track_id| {
            map.get(track_id)
                .map(str::to_string)
                .ok_or(ResolveError::InternalInconsistency { track_id })
        })
        .collect()
}

pub fn assemble_playlist(
    metadata: PlaylistMetadata,
    map: AggregationMap,
) -> Result<ResolvedPlaylist, ResolveError> {
    let songs = assemble_songs(&metadata.track_ids, &map)?;
    Ok(ResolvedPlaylist {
        name: metadata.name,
        songs,
        songs_count: metadata.track_count,
    })
}
