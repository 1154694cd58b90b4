// src/feed/twitter.rs
// =============================================================================
// A FeedSource backed by the Twitter v1.1 REST API.
//
// Endpoints used:
// - GET  account/verify_credentials.json  -> who are we?
// - GET  statuses/user_timeline.json      -> one page of the history
// - POST statuses/destroy/{id}.json       -> delete a post
//
// The client is built from the Config and passed around explicitly;
// there is no global API handle.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{FeedError, FeedSource};
use crate::config::{Config, ConfigError};
use crate::model::PostId;

/// Twitter API client
pub struct TwitterClient {
    http: Client,
    base_url: Url,
    token: String,
    screen_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Account {
    screen_name: String,
}

impl TwitterClient {
    /// Builds a client from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(config.api_timeout())
            .user_agent(concat!("link-sweeper/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url()?,
            token: config.account.token.clone(),
            screen_name: config.account.screen_name.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, FeedError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    // Turns non-2xx responses into FeedError::Api, keeping the body for context
    async fn check(response: Response) -> Result<Response, FeedError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(FeedError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl FeedSource for TwitterClient {
    async fn verify_credentials(&self) -> Result<String, FeedError> {
        let url = self.endpoint("account/verify_credentials.json")?;
        let response = self.authorized(self.http.get(url)).send().await?;

        let response = match Self::check(response).await {
            Err(FeedError::Api { status: 401 | 403, body }) => return Err(FeedError::Auth(body)),
            other => other?,
        };

        let account: Account = response.json().await?;
        Ok(account.screen_name)
    }

    async fn timeline_page(&self, max_id: Option<PostId>, count: usize) -> Result<Vec<Value>, FeedError> {
        let url = self.endpoint("statuses/user_timeline.json")?;

        let mut query = vec![
            ("count", count.to_string()),
            ("include_rts", "true".to_string()),
        ];
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id.to_string()));
        }
        if let Some(name) = &self.screen_name {
            query.push(("screen_name", name.clone()));
        }

        let response = self.authorized(self.http.get(url).query(&query)).send().await?;
        let page: Vec<Value> = Self::check(response).await?.json().await?;
        Ok(page)
    }

    async fn destroy(&self, id: PostId) -> Result<(), FeedError> {
        let url = self.endpoint(&format!("statuses/destroy/{}.json", id))?;
        let response = self.authorized(self.http.post(url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
