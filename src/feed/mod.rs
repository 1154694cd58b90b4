// src/feed/mod.rs
// =============================================================================
// This module talks to the social feed: reading the post history and
// deleting posts.
//
// Currently implements:
// - FeedSource: the interface any feed backend provides
// - TwitterClient: a FeedSource over the v1.1 REST API
// - read_timeline: pages through the whole history, newest first
// - delete_posts: deletes bad candidates, optionally asking first, and
//   stops as soon as the run is interrupted
//
// Not implemented on purpose:
// - Retries and rate-limit handling. A failed call fails the read.
// =============================================================================

mod twitter;

pub use twitter::TwitterClient;

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use thiserror::Error;
use tracing::{info, warn};

use crate::interrupt::Interrupt;
use crate::model::{Candidate, PostId};

/// Posts requested per timeline call (the API maximum)
pub const PAGE_SIZE: usize = 200;

/// Errors from the feed API
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid API endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// A feed backend.
///
/// Timeline pages are returned as raw JSON so the backup keeps every field
/// the platform sent, not only the ones we model.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Checks the credentials and returns the account's screen name
    async fn verify_credentials(&self) -> Result<String, FeedError>;

    /// Up to `count` posts with id <= `max_id` (newest first), or the newest
    /// posts when `max_id` is None. An empty page means the history is done.
    async fn timeline_page(&self, max_id: Option<PostId>, count: usize) -> Result<Vec<Value>, FeedError>;

    /// Permanently removes a post
    async fn destroy(&self, id: PostId) -> Result<(), FeedError>;
}

/// Reads the timeline backwards until it runs out or `limit` posts were read.
///
/// Every raw post is handed to `sink` in the order it was received.
/// Returns how many posts were read.
pub async fn read_timeline<S, F>(source: &S, limit: Option<usize>, mut sink: F) -> Result<usize, FeedError>
where
    S: FeedSource + ?Sized,
    F: FnMut(&Value),
{
    let mut read = 0;
    let mut max_id: Option<PostId> = None;

    loop {
        let count = match limit {
            Some(limit) if read >= limit => break,
            Some(limit) => (limit - read).min(PAGE_SIZE),
            None => PAGE_SIZE,
        };

        let page = source.timeline_page(max_id, count).await?;
        if page.is_empty() {
            break;
        }

        let mut oldest: Option<u64> = None;
        for raw in page.iter().take(count) {
            sink(raw);
            read += 1;
            if let Some(id) = raw.get("id").and_then(Value::as_u64) {
                oldest = Some(oldest.map_or(id, |o| o.min(id)));
            }
        }

        // Next page: everything strictly older than the oldest post we saw
        let next = match oldest {
            Some(id) if id > 0 => PostId(id - 1),
            _ => {
                warn!("timeline page has no usable post ids, stopping");
                break;
            }
        };
        if max_id.is_some_and(|current| next >= current) {
            warn!(max_id = %next, "timeline did not move backwards, stopping");
            break;
        }
        max_id = Some(next);
    }

    Ok(read)
}

/// What happened during a deletion run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteSummary {
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// The run was interrupted before every candidate was handled
    pub interrupted: bool,
}

/// Deletes every candidate for which `confirm` resolves to true.
///
/// A failed delete is reported and the remaining candidates are still
/// processed. Once `interrupt` fires no further post is deleted, even one
/// whose confirmation is still pending.
pub async fn delete_posts<S, F, Fut>(
    source: &S,
    candidates: &[Candidate],
    interrupt: &Interrupt,
    mut confirm: F,
) -> DeleteSummary
where
    S: FeedSource + ?Sized,
    F: FnMut(&Candidate) -> Fut,
    Fut: Future<Output = bool>,
{
    let mut summary = DeleteSummary::default();

    for candidate in candidates {
        if interrupt.is_triggered() {
            summary.interrupted = true;
            break;
        }

        let approved = tokio::select! {
            biased;
            _ = interrupt.triggered() => None,
            approved = confirm(candidate) => Some(approved),
        };
        let Some(approved) = approved else {
            summary.interrupted = true;
            break;
        };

        if !approved {
            println!("   Skipping post {}", candidate.id);
            summary.skipped += 1;
            continue;
        }

        println!("   Deleting post {}", candidate.id);
        match source.destroy(candidate.id).await {
            Ok(()) => {
                info!(id = %candidate.id, "deleted post");
                summary.deleted += 1;
            }
            Err(e) => {
                warn!(id = %candidate.id, error = %e, "failed to delete post");
                summary.failed += 1;
            }
        }
    }

    summary
}
