use futures::StreamExt;
use futures::stream::FuturesUnordered;

use crate::ports::provider::PlaylistProvider;
use crate::resolver::error::ResolveError;
use crate::resolver::normalize::display_string;
use crate::resolver::types::{AggregationMap, TrackId};

/// A contiguous run of playlist track ids fetched with a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackBatch<'a> {
    pub index: usize,
    pub ids: &'a [TrackId],
}

/// Split `ids` into `ceil(len / batch_size)` contiguous batches, keeping order.
pub fn partition(ids: &[TrackId], batch_size: usize) -> Vec<TrackBatch<'_>> {
    let batch_size = batch_size.max(1);
    ids.chunks(batch_size)
        .enumerate()
        .map(|(index, ids)| TrackBatch { index, ids })
        .collect()
}

/// Fetch every batch concurrently and collect display strings keyed by track id.
///
/// All batches run to completion even when one fails. The first failure to complete is
/// returned and everything fetched so far is dropped.
pub async fn fetch_tracks(
    provider: &dyn PlaylistProvider,
    ids: &[TrackId],
    batch_size: usize,
    detailed: bool,
) -> Result<AggregationMap, ResolveError> {
    let batches = partition(ids, batch_size);
    tracing::debug!(
        provider = %provider.kind(),
        tracks = ids.len(),
        batches = batches.len(),
        "Fetching track details"
    );

    let mut workers: FuturesUnordered<_> = batches
        .into_iter()
        .map(|batch| async move {
            let result = provider.fetch_track_batch(batch.ids).await.map(|records| {
                records
                    .into_iter()
                    .map(|record| (record.id, display_string(&record, detailed)))
                    .collect::<Vec<_>>()
            });
            (batch.index, result)
        })
        .collect();

    let mut map = AggregationMap::with_capacity(ids.len());
    let mut first_error = None;

    while let Some((index, result)) = workers.next().await {
        match result {
            Ok(entries) => {
                tracing::debug!(batch = index, tracks = entries.len(), "Batch completed");
                for (id, display) in entries {
                    map.insert(id, display);
                }
            }
            Err(error) => {
                tracing::warn!(batch = index, "Batch failed: {}", error);
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
    }

    match first_error {
        Some(error) => Err(error),
        None => {
            tracing::debug!(unique_tracks = map.len(), "All batches completed");
            Ok(map)
        }
    }
}
