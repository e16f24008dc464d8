//! Database Layer
//!
//! `PostgreSQL` connection and the persisted guild configuration store.

mod models;
mod queries;


use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
pub use models::*;
pub use queries::*;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use srcbot_common::GuildId;
use tracing::info;

use crate::directory::{ConfigIntent, ConfigStore, GuildConfig, UpstreamError};

/// Create `PostgreSQL` connection pool with health configuration.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Run database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}

/// [`ConfigStore`] backed by the `guild_configs` table.
#[derive(Debug, Clone)]
pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    async fn get_guild_config(
        &self,
        guild_id: GuildId,
    ) -> Result<Option<GuildConfig>, UpstreamError> {
        Ok(find_guild_config(&self.pool, guild_id)
            .await?
            .map(GuildConfig::from))
    }

    async fn create_guild_config(&self, guild_id: GuildId) -> Result<bool, UpstreamError> {
        Ok(create_guild_config(&self.pool, guild_id).await?)
    }

    async fn apply(&self, guild_id: GuildId, intent: ConfigIntent) -> Result<bool, UpstreamError> {
        let pool = &self.pool;
        let changed = match intent {
            ConfigIntent::AddRole(list, role_id) => add_role(pool, guild_id, list, role_id).await?,
            ConfigIntent::RemoveRole(list, role_id) => {
                remove_role(pool, guild_id, list, role_id).await?
            }
            ConfigIntent::AddSquadronCategory(category_id) => {
                add_squadron_category(pool, guild_id, category_id).await?
            }
            ConfigIntent::RemoveSquadronCategory(category_id) => {
                remove_squadron_category(pool, guild_id, category_id).await?
            }
            ConfigIntent::AddPlatform(code) => add_platform(pool, guild_id, &code).await?,
            ConfigIntent::RemovePlatform(code) => remove_platform(pool, guild_id, &code).await?,
        };
        Ok(changed)
    }
}
