// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "link-sweeper",
    version,
    about = "Back up your post history, then delete posts whose links are dead",
    long_about = "link-sweeper downloads your post history into a backup file, ignores retweets, \
                  checks every link in the remaining posts and deletes the posts with a dead link. \
                  Each deletion is confirmed interactively unless --yes is given."
)]
pub struct Cli {
    /// Configuration file with API credentials
    #[arg(long, default_value = "config.json")]
    pub configfile: PathBuf,

    /// Backup file the post history is dumped to (one JSON post per line)
    #[arg(long, default_value = "tweet_dump.json")]
    pub backupfile: PathBuf,

    /// Number of parallel link checks
    ///
    /// NonZeroUsize makes clap reject 0 for us
    #[arg(long, default_value = "4")]
    pub processes: NonZeroUsize,

    /// Seconds to wait for each link before calling it dead
    /// (overrides probe.timeout_secs from the config file)
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Number of posts to read from the feed (0 = whole history)
    #[arg(long, default_value_t = 0)]
    pub count: usize,

    /// Print every post while reading instead of progress dots
    #[arg(long)]
    pub echo: bool,

    /// Don't read the feed, check the posts already in the backup file
    #[arg(long)]
    pub no_fetch: bool,

    /// Only report posts with dead links, don't delete anything
    #[arg(long)]
    pub dry_run: bool,

    /// Delete without asking for each post
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Print posts with dead links as JSON
    #[arg(long)]
    pub json: bool,

    /// Pretty-print the backup file and exit
    #[arg(long)]
    pub show_backup: bool,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value_t = 1)]
    pub verbose: u8,
}

impl Cli {
    /// How many posts to read, None meaning "all of them"
    pub fn read_limit(&self) -> Option<usize> {
        (self.count > 0).then_some(self.count)
    }

    /// Whether this run needs credentials for the feed API
    pub fn needs_feed(&self) -> bool {
        !self.no_fetch || !self.dry_run
    }
}
