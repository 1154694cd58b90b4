// src/checker/aggregate.rs
// =============================================================================
// Turns per-link probe results into one verdict per candidate.
//
// Links are probed one after another, in the order they appear in the post.
// The first dead link decides the verdict and the remaining links are never
// probed. If every link is alive the candidate is Good.
// =============================================================================

use futures::stream::{self, StreamExt};

use super::probe::UrlProbe;
use crate::model::{Candidate, DeadLink, ProbeResult, Verdict};

/// Probes `urls` in order and stops at the first dead one
pub async fn verdict_for(probe: &UrlProbe, urls: &[String]) -> Verdict {
    // `then` runs the probes sequentially and lazily: nothing after the
    // first dead link is ever polled because `next()` stops pulling.
    let dead_links = stream::iter(urls)
        .then(move |url| async move { (url, probe.probe(url).await) })
        .filter_map(|(url, result)| async move {
            match result {
                ProbeResult::Dead(reason) => Some(DeadLink {
                    url: url.clone(),
                    reason,
                }),
                ProbeResult::Alive => None,
            }
        });
    futures::pin_mut!(dead_links);

    match dead_links.next().await {
        Some(link) => Verdict::Bad(link),
        None => Verdict::Good,
    }
}

/// Returns the candidate with its verdict filled in
pub async fn evaluate(probe: &UrlProbe, mut candidate: Candidate) -> Candidate {
    candidate.verdict = verdict_for(probe, &candidate.urls).await;
    candidate
}
