// src/prompt.rs
// =============================================================================
// Yes/no questions on the console.
//
// The question is printed as "<question> [yn]? ". Only "y" or "yes"
// (any case) count as yes; anything else, including an empty line or a
// closed stdin, is a no.
//
// Reading stdin blocks the thread. Async code asks through confirm(),
// which waits for the answer on tokio's blocking pool instead of a runtime
// worker thread.
// =============================================================================

use std::io::{self, BufRead, Write};

/// Returns true if `reply` means yes
pub fn is_affirmative(reply: &str) -> bool {
    matches!(reply.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks `question` on `output` and reads the answer from `input`
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    write!(output, "{} [yn]? ", question)?;
    output.flush()?;

    let mut reply = String::new();
    if input.read_line(&mut reply)? == 0 {
        return Ok(false);
    }
    Ok(is_affirmative(&reply))
}

/// Runs ask() on the blocking pool.
///
/// `open` is called on the blocking thread and returns the input and
/// output to use.
pub async fn ask_off_thread<F, R, W>(open: F, question: String) -> io::Result<bool>
where
    F: FnOnce() -> (R, W) + Send + 'static,
    R: BufRead,
    W: Write,
{
    tokio::task::spawn_blocking(move || {
        let (mut input, mut output) = open();
        ask(&mut input, &mut output, &question)
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

/// Asks `question` on the terminal without blocking the runtime
pub async fn confirm(question: String) -> io::Result<bool> {
    ask_off_thread(|| (io::stdin().lock(), io::stdout().lock()), question).await
}
