// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Back up the post history from the feed into the backup file
// 3. Load the backup, drop retweets and posts without links
// 4. Check every remaining post's links in parallel
// 5. Delete the posts with a dead link (asking first, unless --yes)
// 6. Exit with proper code (0 = success, 1 = dead links found in a dry run,
//    2 = error, 130 = interrupted)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Option<T>: The feed client only exists when the run needs it
// =============================================================================

// Module declarations - tells Rust about our other source files
mod backup;        // src/backup.rs - the line-per-post backup file
mod checker;       // src/checker/ - post classification and link checking
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - the JSON config file
mod feed;          // src/feed/ - reading and deleting posts
mod interrupt;     // src/interrupt.rs - Ctrl-C handling
mod model;         // src/model.rs - Post, Candidate and friends
mod prompt;        // src/prompt.rs - yes/no questions
mod scan;          // src/scan/ - the concurrent link scanner

use anyhow::{anyhow, Context, Result};
use clap::Parser;  // Parser trait enables the parse() method
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use checker::{UrlProbe, DEFAULT_PROBE_TIMEOUT};
use cli::Cli;
use config::Config;
use feed::{FeedSource, TwitterClient};
use interrupt::Interrupt;
use model::Candidate;
use scan::Scanner;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a multi-threaded tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Run our application logic and capture the exit code
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole chain of context messages
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Sends tracing output to stderr so it never mixes with --json output
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

// This is the main application logic
// Returns:
//   Ok(0) = finished (dead-link posts deleted or none found)
//   Ok(1) = dead-link posts found during a dry run
//   Ok(130) = interrupted with Ctrl-C, nothing deleted after that point
//   Err = configuration, authentication or backup error
async fn run(cli: Cli) -> Result<i32> {
    if cli.show_backup {
        return show_backup(&cli.backupfile);
    }

    // Installed once: from here on Ctrl-C stops the run instead of killing it
    let interrupt = Interrupt::new();
    interrupt.listen_for_ctrl_c();

    let config = load_config(&cli)?;

    let client = match &config {
        Some(config) => {
            let client = TwitterClient::from_config(config)?;
            let account = client
                .verify_credentials()
                .await
                .context("failed to authenticate")?;
            println!("👤 Authenticated as @{}", account);
            Some(client)
        }
        None => None,
    };

    if let (false, Some(client)) = (cli.no_fetch, &client) {
        prepare_backup(&cli.backupfile).await?;
        fetch_history(client, &cli).await?;
    }
    if interrupt.is_triggered() {
        println!("🛑 Interrupted, nothing was checked");
        return Ok(130);
    }

    let loaded = backup::load_posts(&cli.backupfile).context("failed to load posts")?;
    println!("📄 Loaded {} post(s) from {}", loaded.posts.len(), cli.backupfile.display());
    if !loaded.skipped.is_empty() {
        println!("⚠️  Skipped {} malformed line(s)", loaded.skipped.len());
        for skipped in &loaded.skipped {
            println!("   line {}: {}", skipped.line, skipped.error);
        }
    }

    let candidates = checker::filter_candidates(&loaded.posts);
    if candidates.is_empty() {
        println!("✅ No posts with links to check");
        return Ok(0);
    }
    println!("🔗 {} post(s) with links (retweets ignored)", candidates.len());

    let timeout = probe_timeout(&cli, config.as_ref())?;
    let probe = UrlProbe::with_reqwest(timeout).context("failed to build HTTP client")?;
    let scanner = Scanner::new(probe, cli.processes);

    println!(
        "\n🌐 Checking links with {} worker(s), {:.1}s timeout...\n",
        scanner.workers(),
        timeout.as_secs_f64()
    );

    let results = scanner.scan_until(candidates, interrupt.triggered());
    let bad = scan::select_bad(results).await;

    let options = ActionOptions {
        json: cli.json,
        dry_run: cli.dry_run,
        interactive: !cli.yes,
    };
    act_on_bad(&bad, client.as_ref(), &options, &interrupt).await
}

// Credentials are only needed when we talk to the feed
fn load_config(cli: &Cli) -> Result<Option<Config>> {
    if !cli.needs_feed() {
        return Ok(None);
    }
    let config = Config::load(&cli.configfile).context("failed to load configuration")?;
    Ok(Some(config))
}

/// What to do with the posts that have a dead link
struct ActionOptions {
    json: bool,
    dry_run: bool,
    interactive: bool,
}

// Reports the bad posts and deletes them unless this is a dry run.
// Returns the exit code:
//   0 = nothing bad, or everything handled
//   1 = bad posts found during a dry run
//   130 = interrupted, before or during deleting
async fn act_on_bad<S: FeedSource + ?Sized>(
    bad: &[Candidate],
    source: Option<&S>,
    options: &ActionOptions,
    interrupt: &Interrupt,
) -> Result<i32> {
    // An interrupted scan is incomplete, so nothing is deleted
    if interrupt.is_triggered() {
        println!("🛑 Interrupted, nothing was deleted");
        return Ok(130);
    }

    print_bad(bad, options.json)?;

    if bad.is_empty() {
        return Ok(0);
    }
    if options.dry_run {
        return Ok(1);
    }

    let source = source.ok_or_else(|| anyhow!("no feed client available for deleting posts"))?;
    let interactive = options.interactive;

    println!();
    let summary = feed::delete_posts(source, bad, interrupt, |candidate| {
        let question = format!("Delete '{}'", candidate.text);
        async move { !interactive || confirm_delete(question).await }
    })
    .await;

    println!("\n🗑️  Deleted: {}", summary.deleted);
    println!("   ⏭️  Skipped: {}", summary.skipped);
    println!("   ⚠️  Failed: {}", summary.failed);

    if summary.interrupted {
        println!("🛑 Interrupted, the remaining posts were kept");
        return Ok(130);
    }
    Ok(0)
}

// Asks before touching an existing backup. Saying no keeps the old
// contents and the new posts are appended after them.
async fn prepare_backup(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    if prompt::confirm("Backup file exists, delete it".to_string()).await? {
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
        info!(path = %path.display(), "removed old backup");
    } else {
        info!(path = %path.display(), "appending to existing backup");
    }
    Ok(())
}

// Reads the history from the feed and dumps every post to the backup file
async fn fetch_history<S: FeedSource + ?Sized>(source: &S, cli: &Cli) -> Result<()> {
    let mut writer = backup::BackupWriter::append_to(&cli.backupfile)?;

    if !cli.echo {
        print!("Reading posts");
        io::stdout().flush().ok();
    }

    let mut seen = 0usize;
    let read = feed::read_timeline(source, cli.read_limit(), |raw| {
        if let Err(e) = writer.append(raw) {
            warn!(error = %e, "failed to back up post");
        }

        if cli.echo {
            let created_at = raw["created_at"].as_str().unwrap_or("?");
            let text = raw["text"].as_str().unwrap_or("");
            println!("{}:\n{}\n", created_at, text);
        } else if seen % 10 == 0 {
            print!(".");
            io::stdout().flush().ok();
        }
        seen += 1;
    })
    .await
    .context("failed to read the timeline")?;

    let written = writer.finish()?;
    if !cli.echo {
        println!("done.");
    }
    println!("💾 Backed up {} of {} post(s) to {}", written, read, cli.backupfile.display());
    Ok(())
}

// --timeout wins over the config file, which wins over the default
fn probe_timeout(cli: &Cli, file_config: Option<&Config>) -> Result<Duration> {
    let secs = cli
        .timeout
        .or_else(|| file_config.map(|c| c.probe.timeout_secs))
        .unwrap_or_else(|| DEFAULT_PROBE_TIMEOUT.as_secs_f64());
    Ok(config::probe_timeout(secs)?)
}

async fn confirm_delete(question: String) -> bool {
    match prompt::confirm(question).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "could not read confirmation, skipping");
            false
        }
    }
}

fn show_backup(path: &Path) -> Result<i32> {
    let stdout = io::stdout();
    let printed = backup::print_backup(path, &mut stdout.lock())?;
    println!("📋 {} record(s) in {}", printed, path.display());
    Ok(0)
}

// Prints the posts with dead links either as a table or JSON
fn print_bad(bad: &[Candidate], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(bad)?;
        println!("{}", json_output);
        return Ok(());
    }

    if bad.is_empty() {
        println!("✅ No dead links found");
        return Ok(());
    }

    // Print table header
    println!("{:<20} {:<60} {:<30}", "POST", "DEAD LINK", "REASON");
    println!("{}", "=".repeat(110));

    for candidate in bad {
        let Some(link) = candidate.dead_link() else {
            continue;
        };

        // Truncate URL if too long for display
        let url_display = if link.url.chars().count() > 57 {
            format!("{}...", link.url.chars().take(57).collect::<String>())
        } else {
            link.url.clone()
        };

        println!(
            "{:<20} {:<60} {:<30}",
            candidate.id.to_string(),
            url_display,
            link.reason.to_string()
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   ❌ Posts with dead links: {}", bad.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testing::MockFeed;
    use crate::model::{DeadLink, DeadReason, PostId, Verdict};
    use chrono::DateTime;

    fn bad_candidate(id: u64) -> Candidate {
        Candidate {
            id: PostId(id),
            created_at: DateTime::parse_from_rfc3339("2018-10-10T20:19:24+00:00").unwrap(),
            text: format!("post {}", id),
            urls: vec!["http://dead.example".to_string()],
            verdict: Verdict::Bad(DeadLink {
                url: "http://dead.example".to_string(),
                reason: DeadReason::Status(404),
            }),
        }
    }

    fn options(dry_run: bool) -> ActionOptions {
        ActionOptions {
            json: false,
            dry_run,
            interactive: false,
        }
    }

    #[tokio::test]
    async fn test_interrupted_run_exits_130_and_deletes_nothing() {
        let feed = MockFeed::with_ids(&[1, 2]);
        let bad = vec![bad_candidate(1), bad_candidate(2)];
        let interrupt = Interrupt::new();
        interrupt.trigger();

        let code = act_on_bad(&bad, Some(&feed), &options(false), &interrupt).await.unwrap();

        assert_eq!(code, 130);
        assert!(feed.destroyed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_with_bad_posts_exits_1() {
        let feed = MockFeed::with_ids(&[1]);
        let bad = vec![bad_candidate(1)];

        let code = act_on_bad(&bad, Some(&feed), &options(true), &Interrupt::new()).await.unwrap();

        assert_eq!(code, 1);
        assert!(feed.destroyed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_dry_run_needs_no_feed() {
        let bad = vec![bad_candidate(1)];
        let code = act_on_bad::<MockFeed>(&bad, None, &options(true), &Interrupt::new()).await.unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn test_nothing_bad_exits_0() {
        let code = act_on_bad::<MockFeed>(&[], None, &options(false), &Interrupt::new()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_non_interactive_run_deletes_every_bad_post() {
        let feed = MockFeed::with_ids(&[1, 2]);
        let bad = vec![bad_candidate(1), bad_candidate(2)];

        let code = act_on_bad(&bad, Some(&feed), &options(false), &Interrupt::new()).await.unwrap();

        assert_eq!(code, 0);
        assert_eq!(*feed.destroyed.lock().unwrap(), vec![PostId(1), PostId(2)]);
    }

    #[tokio::test]
    async fn test_deleting_without_a_feed_is_an_error() {
        let bad = vec![bad_candidate(1)];
        let result = act_on_bad::<MockFeed>(&bad, None, &options(false), &Interrupt::new()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_config_is_loaded_only_when_the_feed_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let missing = missing.to_str().unwrap();

        let offline = Cli::try_parse_from(["link-sweeper", "--configfile", missing, "--no-fetch", "--dry-run"]).unwrap();
        assert!(load_config(&offline).unwrap().is_none());

        // Deleting needs the feed, so a missing config is an error
        let deleting = Cli::try_parse_from(["link-sweeper", "--configfile", missing, "--no-fetch"]).unwrap();
        assert!(load_config(&deleting).is_err());
    }
}
