// src/checker/classify.rs
// =============================================================================
// This module decides which posts are worth checking.
//
// A post is checked when:
// - it is NOT a retweet (the `retweeted` flag is false and the text does not
//   start with "RT")
// - it HAS links (its `entities.urls` list is non-empty)
//
// Images and other media show up as links inside the text too, but the
// platform does not list them in `entities.urls`, so they are never checked.
//
// Rust concepts:
// - Iterator adapters: filter() and map() chained together
// - Borrowing: the classifier only reads posts, it never takes ownership
// =============================================================================

use crate::model::{Candidate, Post, Verdict};

/// Returns true if the post is a retweet.
///
/// Quoted retweets are not flagged by the platform but their text always
/// starts with "RT" (case-sensitive, leading whitespace is not trimmed).
pub fn is_retweet(post: &Post) -> bool {
    post.retweeted || post.text.starts_with("RT")
}

/// Returns true if the platform attached at least one link to the post
pub fn has_links(post: &Post) -> bool {
    !post.entities.urls.is_empty()
}

/// Projects a post into a Candidate, keeping the links in source order
pub fn to_candidate(post: &Post) -> Candidate {
    Candidate {
        id: post.id,
        created_at: post.created_at,
        text: post.text.clone(),
        urls: post
            .entities
            .urls
            .iter()
            .map(|entity| entity.expanded_url.clone())
            .collect(),
        verdict: Verdict::Pending,
    }
}

/// Drops retweets and posts without links, then turns the rest into Candidates
pub fn filter_candidates(posts: &[Post]) -> Vec<Candidate> {
    posts
        .iter()
        .filter(|post| !is_retweet(post))
        .filter(|post| has_links(post))
        .map(to_candidate)
        .collect()
}
