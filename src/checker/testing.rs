// src/checker/testing.rs
// =============================================================================
// A scripted Transport for tests. Each URL gets a canned reply and every
// call is recorded so tests can check which URLs were actually probed.
// =============================================================================

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::probe::{Transport, TransportError};

#[derive(Debug, Clone, Copy)]
pub enum MockReply {
    Status(u16),
    /// Answer with a status after a delay
    Delayed(u16, Duration),
    /// Never answer (well, not for an hour)
    Hang,
    ConnectError,
    TransportTimeout,
}

#[derive(Default)]
pub struct MockTransport {
    replies: HashMap<String, MockReply>,
    calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, url: &str, reply: MockReply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    /// URLs probed so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn head(&self, url: &str) -> Result<u16, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());

        // Unknown URLs answer 200
        match self.replies.get(url).copied().unwrap_or(MockReply::Status(200)) {
            MockReply::Status(code) => Ok(code),
            MockReply::Delayed(code, delay) => {
                tokio::time::sleep(delay).await;
                Ok(code)
            }
            MockReply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(200)
            }
            MockReply::ConnectError => Err(TransportError::Connect("connection refused".to_string())),
            MockReply::TransportTimeout => Err(TransportError::Timeout),
        }
    }
}
