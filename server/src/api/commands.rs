//! Relay Commands API
//!
//! A gateway relay forwards chat commands here and posts the returned
//! [`CommandReply`] back to the channel they came from.

use axum::extract::{Path, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use srcbot_common::{GuildId, UserId};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

use super::AppState;
use crate::commands::{self, CommandContext, CommandReply, UnknownCommand};

/// Errors returned by the relay endpoints.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Missing or invalid relay token")]
    Unauthorized,
    #[error("Invalid guild id: {0}")]
    InvalidGuild(String),
    #[error(transparent)]
    Unknown(#[from] UnknownCommand),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::InvalidGuild(_) => (StatusCode::BAD_REQUEST, "INVALID_GUILD"),
            Self::Unknown(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_COMMAND"),
        };
        (
            status,
            Json(serde_json::json!({ "error": code, "message": self.to_string() })),
        )
            .into_response()
    }
}

/// Command relayed from a guild text channel.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RelayCommand {
    /// Snowflake of the member who typed the command.
    #[schema(value_type = String)]
    pub author_id: UserId,
    /// Full message text, e.g. `sqch sort all`.
    pub content: String,
}

/// Constant-time for tokens of equal length.
fn token_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Middleware that only lets through requests bearing the relay token.
pub async fn require_relay(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RelayError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(RelayError::Unauthorized)?;

    if !token_matches(token, &state.config.relay_token) {
        warn!("Rejected relay request with a wrong token");
        return Err(RelayError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// POST /api/guilds/{guild_id}/commands - Run a relayed command
#[utoipa::path(
    post,
    path = "/api/guilds/{guild_id}/commands",
    tag = "commands",
    params(
        ("guild_id" = String, Path, description = "Guild snowflake"),
    ),
    request_body = RelayCommand,
    responses(
        (status = 200, description = "Command handled", body = CommandReply),
        (status = 400, description = "Unknown call word or malformed guild id"),
        (status = 401, description = "Missing or invalid relay token"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn run_command(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
    Json(body): Json<RelayCommand>,
) -> Result<Json<CommandReply>, RelayError> {
    let guild_id: GuildId = guild_id
        .parse()
        .map_err(|_| RelayError::InvalidGuild(guild_id.clone()))?;

    let ctx = CommandContext {
        dirs: &state.directories,
        resolver: &state.resolver,
        engine: &state.engine,
        guild_id,
        actor: body.author_id,
    };
    let reply = commands::dispatch(ctx, &body.content).await?;
    Ok(Json(reply))
}
