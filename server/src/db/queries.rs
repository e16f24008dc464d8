//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! Role, category and platform arrays keep set semantics: appends are guarded so a
//! value is stored at most once.

use sqlx::PgPool;
use srcbot_common::{ChannelId, GuildId, RoleId};
use tracing::error;

use super::models::GuildConfigRow;
use crate::directory::{GuildConfig, RoleList};

/// Log and return a database error with context.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

const SELECT_CONFIG: &str = r"
    SELECT guild_id, admin_role_ids, forbidden_role_ids, mod_role_ids,
           squadron_leader_role_ids, squadron_channel_category_ids,
           squadron_platforms, created_at, updated_at
    FROM guild_configs
    WHERE guild_id = $1
";

/// Find a guild's configuration.
pub async fn find_guild_config(
    pool: &PgPool,
    guild_id: GuildId,
) -> sqlx::Result<Option<GuildConfigRow>> {
    sqlx::query_as::<_, GuildConfigRow>(SELECT_CONFIG)
        .bind(guild_id.to_db())
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_guild_config", guild_id = %guild_id))
}

/// Insert or fully replace a guild's configuration.
pub async fn upsert_guild_config(pool: &PgPool, config: &GuildConfig) -> sqlx::Result<()> {
    let ids = |roles: &std::collections::BTreeSet<RoleId>| -> Vec<i64> {
        roles.iter().map(|r| r.to_db()).collect()
    };
    let categories: Vec<i64> = config
        .squadron_channel_category_ids
        .iter()
        .map(|c| c.to_db())
        .collect();
    let platforms: Vec<String> = config.squadron_platforms.iter().cloned().collect();

    sqlx::query(
        r"
        INSERT INTO guild_configs (
            guild_id, admin_role_ids, forbidden_role_ids, mod_role_ids,
            squadron_leader_role_ids, squadron_channel_category_ids, squadron_platforms
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (guild_id) DO UPDATE SET
            admin_role_ids = EXCLUDED.admin_role_ids,
            forbidden_role_ids = EXCLUDED.forbidden_role_ids,
            mod_role_ids = EXCLUDED.mod_role_ids,
            squadron_leader_role_ids = EXCLUDED.squadron_leader_role_ids,
            squadron_channel_category_ids = EXCLUDED.squadron_channel_category_ids,
            squadron_platforms = EXCLUDED.squadron_platforms,
            updated_at = NOW()
        ",
    )
    .bind(config.guild_id.to_db())
    .bind(ids(&config.admin_role_ids))
    .bind(ids(&config.forbidden_role_ids))
    .bind(ids(&config.mod_role_ids))
    .bind(ids(&config.squadron_leader_role_ids))
    .bind(categories)
    .bind(platforms)
    .execute(pool)
    .await
    .map_err(db_error!("upsert_guild_config", guild_id = %config.guild_id))?;
    Ok(())
}

/// Create an empty configuration. Returns `false` if the guild already has
/// one.
pub async fn create_guild_config(pool: &PgPool, guild_id: GuildId) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r"
        INSERT INTO guild_configs (guild_id)
        VALUES ($1)
        ON CONFLICT (guild_id) DO NOTHING
        ",
    )
    .bind(guild_id.to_db())
    .execute(pool)
    .await
    .map_err(db_error!("create_guild_config", guild_id = %guild_id))?;

    Ok(result.rows_affected() > 0)
}

/// Column holding one role list.
const fn role_column(list: RoleList) -> &'static str {
    match list {
        RoleList::Admin => "admin_role_ids",
        RoleList::Forbidden => "forbidden_role_ids",
        RoleList::Mod => "mod_role_ids",
        RoleList::SquadronLeader => "squadron_leader_role_ids",
    }
}

/// Add a role to a role list. Returns `false` if it was already present or
/// the guild has no configuration.
pub async fn add_role(
    pool: &PgPool,
    guild_id: GuildId,
    list: RoleList,
    role_id: RoleId,
) -> sqlx::Result<bool> {
    let column = role_column(list);
    let sql = format!(
        "UPDATE guild_configs
         SET {column} = array_append({column}, $2), updated_at = NOW()
         WHERE guild_id = $1 AND NOT ($2 = ANY({column}))"
    );
    let result = sqlx::query(&sql)
        .bind(guild_id.to_db())
        .bind(role_id.to_db())
        .execute(pool)
        .await
        .map_err(db_error!("add_role", guild_id = %guild_id, column, role_id = %role_id))?;

    Ok(result.rows_affected() > 0)
}

/// Remove a role from a role list. Returns `false` if it was not present.
pub async fn remove_role(
    pool: &PgPool,
    guild_id: GuildId,
    list: RoleList,
    role_id: RoleId,
) -> sqlx::Result<bool> {
    let column = role_column(list);
    let sql = format!(
        "UPDATE guild_configs
         SET {column} = array_remove({column}, $2), updated_at = NOW()
         WHERE guild_id = $1 AND $2 = ANY({column})"
    );
    let result = sqlx::query(&sql)
        .bind(guild_id.to_db())
        .bind(role_id.to_db())
        .execute(pool)
        .await
        .map_err(db_error!("remove_role", guild_id = %guild_id, column, role_id = %role_id))?;

    Ok(result.rows_affected() > 0)
}

/// Register a squadron category at the end of the configured list.
pub async fn add_squadron_category(
    pool: &PgPool,
    guild_id: GuildId,
    category_id: ChannelId,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r"
        UPDATE guild_configs
        SET squadron_channel_category_ids = array_append(squadron_channel_category_ids, $2),
            updated_at = NOW()
        WHERE guild_id = $1 AND NOT ($2 = ANY(squadron_channel_category_ids))
        ",
    )
    .bind(guild_id.to_db())
    .bind(category_id.to_db())
    .execute(pool)
    .await
    .map_err(db_error!("add_squadron_category", guild_id = %guild_id, category_id = %category_id))?;

    Ok(result.rows_affected() > 0)
}

/// Unregister a squadron category. The remaining order is kept.
pub async fn remove_squadron_category(
    pool: &PgPool,
    guild_id: GuildId,
    category_id: ChannelId,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r"
        UPDATE guild_configs
        SET squadron_channel_category_ids = array_remove(squadron_channel_category_ids, $2),
            updated_at = NOW()
        WHERE guild_id = $1 AND $2 = ANY(squadron_channel_category_ids)
        ",
    )
    .bind(guild_id.to_db())
    .bind(category_id.to_db())
    .execute(pool)
    .await
    .map_err(db_error!("remove_squadron_category", guild_id = %guild_id, category_id = %category_id))?;

    Ok(result.rows_affected() > 0)
}

/// Add a platform code, lowercased.
pub async fn add_platform(pool: &PgPool, guild_id: GuildId, code: &str) -> sqlx::Result<bool> {
    let code = code.to_lowercase();
    let result = sqlx::query(
        r"
        UPDATE guild_configs
        SET squadron_platforms = array_append(squadron_platforms, $2), updated_at = NOW()
        WHERE guild_id = $1 AND NOT ($2 = ANY(squadron_platforms))
        ",
    )
    .bind(guild_id.to_db())
    .bind(&code)
    .execute(pool)
    .await
    .map_err(db_error!("add_platform", guild_id = %guild_id, code = %code))?;

    Ok(result.rows_affected() > 0)
}

/// Remove a platform code.
pub async fn remove_platform(pool: &PgPool, guild_id: GuildId, code: &str) -> sqlx::Result<bool> {
    let code = code.to_lowercase();
    let result = sqlx::query(
        r"
        UPDATE guild_configs
        SET squadron_platforms = array_remove(squadron_platforms, $2), updated_at = NOW()
        WHERE guild_id = $1 AND $2 = ANY(squadron_platforms)
        ",
    )
    .bind(guild_id.to_db())
    .bind(&code)
    .execute(pool)
    .await
    .map_err(db_error!("remove_platform", guild_id = %guild_id, code = %code))?;

    Ok(result.rows_affected() > 0)
}
