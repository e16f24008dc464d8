//! API Router and Application State
//!
//! Central routing configuration and shared state.

pub mod commands;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::commands::CommandReply;
use crate::config::Config;
use crate::directory::Directories;
use crate::permissions::AccessResolver;
use crate::squadron::SquadronEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Discord and configuration collaborators
    pub directories: Directories,
    /// Access checkers registered at startup
    pub resolver: Arc<AccessResolver>,
    /// Squadron channel operations
    pub engine: SquadronEngine,
}

impl AppState {
    /// Create new application state with the default access checkers.
    #[must_use]
    pub fn new(config: Config, directories: Directories) -> Self {
        Self {
            config: Arc::new(config),
            directories,
            resolver: Arc::new(AccessResolver::with_default_checkers()),
            engine: SquadronEngine::default(),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let relay_routes = Router::new()
        .route("/api/guilds/{guild_id}/commands", post(commands::run_command))
        .layer(from_fn_with_state(state.clone(), commands::require_relay));

    Router::new()
        .route("/health", get(health_check))
        .merge(relay_routes)
        .merge(api_docs())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(OpenApi)]
#[openapi(
    paths(commands::run_command),
    components(schemas(CommandReply, commands::RelayCommand)),
    tags((name = "commands", description = "Relayed chat commands"))
)]
struct ApiDoc;

/// API documentation routes.
fn api_docs() -> Router<AppState> {
    Router::new().route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
