//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum
//! router, backed by one in-memory guild instead of Discord and `PostgreSQL`.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use srcbot_common::{ChannelId, GuildId, RoleId, UserId};
use srcbot_server::api::{create_router, AppState};
use srcbot_server::config::Config;
use srcbot_server::directory::{Directories, GuildConfig, MemoryDirectory};
use srcbot_server::permissions::GuildPermissions;
use tower::ServiceExt;

pub const GUILD: GuildId = GuildId(700_000_000_000_000_001);
pub const MOD_ROLE: RoleId = RoleId(11);
pub const LEADER_ROLE: RoleId = RoleId(12);
pub const FORBIDDEN_ROLE: RoleId = RoleId(13);

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub guild: Arc<MemoryDirectory>,
    pub config: Arc<Config>,
}

impl TestApp {
    /// Create a test app over an empty guild with no stored configuration.
    pub fn new() -> Self {
        let config = Config::default_for_test();
        let guild = Arc::new(MemoryDirectory::new(GUILD));
        let state = AppState::new(config.clone(), Directories::in_memory(guild.clone()));
        Self {
            router: create_router(state),
            guild,
            config: Arc::new(config),
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Build an authorized command request for the test guild.
    pub fn command(&self, author: UserId, content: &str) -> Request<Body> {
        let body = serde_json::json!({
            "author_id": author.to_string(),
            "content": content,
        });
        Self::request(Method::POST, &format!("/api/guilds/{GUILD}/commands"))
            .header("Authorization", format!("Bearer {}", self.config.relay_token))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Send a command and return the parsed reply.
    pub async fn run(&self, author: UserId, content: &str) -> serde_json::Value {
        let resp = self.oneshot(self.command(author, content)).await;
        assert_eq!(resp.status(), 200, "Command '{content}' should return 200");
        body_to_json(resp).await
    }
}

/// A configured guild with one squadron category, moderator and leader roles.
///
/// Returns the id of the `Alpha Squadrons` category.
pub fn seed_squadron_guild(app: &TestApp) -> ChannelId {
    let category = app.guild.add_category("Alpha Squadrons");
    app.guild.add_category("Archive Event");

    let mut config = GuildConfig::new(GUILD);
    config.mod_role_ids.insert(MOD_ROLE);
    config.squadron_leader_role_ids.insert(LEADER_ROLE);
    config.forbidden_role_ids.insert(FORBIDDEN_ROLE);
    config.squadron_channel_category_ids.push(category);
    config.squadron_platforms.insert("pc".into());
    config.squadron_platforms.insert("ps".into());
    app.guild.set_config(config);
    category
}

/// Add a guild member holding `roles` and no guild-level capabilities.
pub fn member(app: &TestApp, id: u64, roles: &[RoleId]) -> UserId {
    let user = UserId(id);
    app.guild.add_member(user, roles, GuildPermissions::empty());
    user
}

/// Add a guild member with the administrator capability.
pub fn administrator(app: &TestApp, id: u64) -> UserId {
    let user = UserId(id);
    app.guild
        .add_member(user, &[], GuildPermissions::ADMINISTRATOR);
    user
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
