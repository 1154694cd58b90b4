// src/scan/mod.rs
// =============================================================================
// This module handles checking many candidates at once.
//
// Features:
// - A bounded pool of workers (default 4) evaluating candidates in parallel
// - Results streamed back as they complete (unordered)
// - Cancellable: Ctrl-C or dropping the stream stops the scan
// - Selection of the bad candidates once the scan is finished
// =============================================================================

mod pool;
mod select;

pub use pool::Scanner;
pub use select::select_bad;
