// src/scan/select.rs
// =============================================================================
// Picks out the candidates that should be deleted.
//
// select_bad() drains the whole result stream before returning, so nothing
// can be deleted while the scan is still running.
// =============================================================================

use futures::future;
use futures::stream::{Stream, StreamExt};

use crate::model::Candidate;

/// Collects every result and keeps the bad ones, in arrival order
pub async fn select_bad<S>(results: S) -> Vec<Candidate>
where
    S: Stream<Item = Candidate>,
{
    results
        .filter(|candidate| future::ready(candidate.is_bad()))
        .collect()
        .await
}
