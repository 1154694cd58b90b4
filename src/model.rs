// src/model.rs
// =============================================================================
// This module defines the data types that flow through the sweeper.
//
// Two families of types live here:
// - Post: one record from the user's feed, exactly as the platform sends it
//   (only the fields we care about are kept, the rest are ignored)
// - Candidate: a Post that survived filtering, reduced to what the link
//   checker needs plus the verdict it produces
//
// Rust concepts:
// - Newtypes: PostId wraps a u64 so ids can't be mixed up with counts
// - serde attributes: control how JSON maps onto our structs
// - Enums with data: Verdict and ProbeResult carry extra information
// =============================================================================

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a post on the feed platform.
///
/// #[serde(transparent)] means it is (de)serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One link entity attached to a post by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntity {
    /// The full URL the short link points to
    pub expanded_url: String,
}

/// The `entities` block of a post. We only need the links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub urls: Vec<UrlEntity>,
}

/// A post as read from the feed or the backup file.
///
/// Every field is required: a record missing one of them fails to parse,
/// which lets the backup loader skip it with a message instead of guessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(with = "feed_date")]
    pub created_at: DateTime<FixedOffset>,
    pub text: String,
    pub retweeted: bool,
    pub entities: Entities,
}

/// Why a link was judged dead
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DeadReason {
    /// The server answered with a status code from the blocklist
    Status(u16),
    /// No answer within the probe timeout
    Timeout,
    /// DNS failure, refused connection, TLS failure, invalid URL...
    Unreachable(String),
}

impl fmt::Display for DeadReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeadReason::Status(code) => write!(f, "HTTP {}", code),
            DeadReason::Timeout => write!(f, "timed out"),
            DeadReason::Unreachable(msg) => write!(f, "unreachable: {}", msg),
        }
    }
}

/// The outcome of probing a single URL once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Alive,
    Dead(DeadReason),
}

/// The first dead link found in a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadLink {
    pub url: String,
    #[serde(flatten)]
    pub reason: DeadReason,
}

/// Liveness verdict for a whole candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Not evaluated yet
    #[default]
    Pending,
    /// Every link answered
    Good,
    /// At least one link is dead (checking stopped at this one)
    Bad(DeadLink),
}

/// A post that has at least one link and is not a retweet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: PostId,
    #[serde(with = "feed_date")]
    pub created_at: DateTime<FixedOffset>,
    pub text: String,
    /// Never empty: posts without links never become candidates
    pub urls: Vec<String>,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl Candidate {
    /// True once evaluation found a dead link
    pub fn is_bad(&self) -> bool {
        matches!(self.verdict, Verdict::Bad(_))
    }

    /// The dead link that made this candidate bad, if any
    pub fn dead_link(&self) -> Option<&DeadLink> {
        match &self.verdict {
            Verdict::Bad(link) => Some(link),
            _ => None,
        }
    }
}

// The feed platform formats timestamps like "Wed Oct 10 20:19:24 +0000 2018".
// This helper module plugs that format into serde via #[serde(with = "...")].
pub mod feed_date {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

    pub fn serialize<S>(date: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a newtype?
//    - A struct with a single field, like PostId(u64)
//    - It costs nothing at runtime but the compiler treats it as a new type
//    - You can't accidentally pass a post count where a PostId is expected
//
// 2. What does #[serde(flatten)] do?
//    - It inlines the fields of the inner value into the outer JSON object
//    - A bad Candidate serializes as {"id":1,...,"verdict":"bad","url":...}
//
// 3. Why #[default] on an enum variant?
//    - It lets #[derive(Default)] work for enums
//    - Verdict::default() is Verdict::Pending
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_POST: &str = r#"{
        "id": 1050118621198921728,
        "created_at": "Wed Oct 10 20:19:24 +0000 2018",
        "text": "check this https://t.co/abc",
        "retweeted": false,
        "lang": "en",
        "entities": {
            "hashtags": [],
            "urls": [{"url": "https://t.co/abc", "expanded_url": "https://example.com/a"}]
        }
    }"#;

    #[test]
    fn test_parse_post_ignores_extra_fields() {
        let post: Post = serde_json::from_str(RAW_POST).unwrap();
        assert_eq!(post.id, PostId(1050118621198921728));
        assert_eq!(post.created_at.format("%Y-%m-%d").to_string(), "2018-10-10");
        assert!(!post.retweeted);
        assert_eq!(post.entities.urls[0].expanded_url, "https://example.com/a");
    }

    #[test]
    fn test_post_requires_retweeted_flag() {
        let raw = r#"{"id": 1, "created_at": "Wed Oct 10 20:19:24 +0000 2018",
                      "text": "hi", "entities": {"urls": []}}"#;
        assert!(serde_json::from_str::<Post>(raw).is_err());
    }

    #[test]
    fn test_post_rejects_bad_date() {
        let raw = r#"{"id": 1, "created_at": "2018-10-10", "text": "hi",
                      "retweeted": false, "entities": {"urls": []}}"#;
        assert!(serde_json::from_str::<Post>(raw).is_err());
    }

    #[test]
    fn test_date_keeps_feed_format() {
        let post: Post = serde_json::from_str(RAW_POST).unwrap();
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["created_at"], "Wed Oct 10 20:19:24 +0000 2018");
    }

    #[test]
    fn test_bad_candidate_json_shape() {
        let post: Post = serde_json::from_str(RAW_POST).unwrap();
        let candidate = Candidate {
            id: post.id,
            created_at: post.created_at,
            text: post.text,
            urls: vec!["https://example.com/a".to_string()],
            verdict: Verdict::Bad(DeadLink {
                url: "https://example.com/a".to_string(),
                reason: DeadReason::Status(404),
            }),
        };
        assert!(candidate.is_bad());

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["verdict"], "bad");
        assert_eq!(json["url"], "https://example.com/a");
        assert_eq!(json["reason"], "status");
        assert_eq!(json["detail"], 404);
    }

    #[test]
    fn test_default_verdict_is_pending() {
        assert_eq!(Verdict::default(), Verdict::Pending);
    }
}
