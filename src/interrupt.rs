// src/interrupt.rs
// =============================================================================
// One Ctrl-C listener for the whole run.
//
// Listening for Ctrl-C replaces the default "kill the process" behaviour, so
// the listener is installed once and kept alive until the program exits:
// - first Ctrl-C: the Interrupt is triggered, the scan stops and no further
//   post is deleted
// - second Ctrl-C: the process exits immediately with code 130
//
// Anything that needs to stop early either checks is_triggered() or awaits
// triggered().
//
// Rust concepts:
// - watch channel: one value many tasks can read and wait on
// - Clone: every clone of Interrupt sees the same flag
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

/// Shared "stop now" flag
#[derive(Clone)]
pub struct Interrupt {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the interrupt fires (immediately if it already has)
    pub fn triggered(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.rx.clone();
        async move {
            while !*rx.borrow_and_update() {
                if rx.changed().await.is_err() {
                    // Every sender is gone, so it can never fire
                    std::future::pending::<()>().await;
                }
            }
        }
    }

    /// Spawns the Ctrl-C listener. It stays installed for the rest of the run.
    pub fn listen_for_ctrl_c(&self) -> JoinHandle<()> {
        let interrupt = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("cannot listen for Ctrl-C");
                return;
            }
            warn!("interrupted, stopping (press Ctrl-C again to quit immediately)");
            interrupt.trigger();

            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_starts_untriggered() {
        let interrupt = Interrupt::new();
        assert!(!interrupt.is_triggered());

        let waited = tokio::time::timeout(Duration::from_millis(20), interrupt.triggered()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_the_flag() {
        let interrupt = Interrupt::new();
        let waiter = tokio::spawn(interrupt.triggered());

        interrupt.clone().trigger();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake up")
            .unwrap();
        assert!(interrupt.is_triggered());
    }

    #[tokio::test]
    async fn test_already_triggered_resolves_at_once() {
        let interrupt = Interrupt::new();
        interrupt.trigger();
        tokio::time::timeout(Duration::from_millis(100), interrupt.triggered())
            .await
            .expect("should resolve immediately");
    }
}
