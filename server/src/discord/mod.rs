//! Discord REST adapter.
//!
//! [`DiscordClient`] implements the channel, membership and notification
//! collaborators against the Discord HTTP API (v10) with a bot token.

mod channels;
mod members;
mod messages;
pub mod models;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::directory::UpstreamError;
use models::WireError;

/// Discord REST client.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    member_page_size: u32,
}

impl DiscordClient {
    /// Build a client from server configuration.
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.discord_request_timeout_secs))
            .user_agent(concat!("srcbot-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: config.discord_api_base.trim_end_matches('/').to_string(),
            token: config.discord_token.clone(),
            member_page_size: config.member_page_size,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.api_base))
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
    }

    /// Send a request and decode a success body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, UpstreamError> {
        let response = Self::check(request.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Send a request whose success body is ignored.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), UpstreamError> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Map a non-success status onto [`UpstreamError::Api`].
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: WireError = response.json().await.unwrap_or_default();
        debug!(status = status.as_u16(), code = body.code, "Discord API error");
        Err(UpstreamError::Api {
            status: status.as_u16(),
            message: if body.message.is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_string()
            } else {
                body.message
            },
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, UpstreamError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn patch<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), UpstreamError> {
        self.send_empty(self.request(Method::PATCH, path).json(body))
            .await
    }
}

/// `true` for the status Discord answers unknown resources with.
pub(crate) fn is_not_found(err: &UpstreamError) -> bool {
    matches!(err, UpstreamError::Api { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
}
