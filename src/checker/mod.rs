// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - classify: Decides which posts are retweets and which have links
// - probe: Checks if a single URL is alive
// - aggregate: Folds per-link results into one verdict per post
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod aggregate;
mod classify;
mod probe;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public items from submodules
// This lets users write `checker::evaluate()` instead of
// `checker::aggregate::evaluate()`
pub use aggregate::evaluate;
pub use classify::filter_candidates;
pub use probe::{UrlProbe, DEFAULT_PROBE_TIMEOUT};
