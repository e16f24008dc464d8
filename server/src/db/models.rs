//! Database Models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use srcbot_common::{ChannelId, GuildId, RoleId};

use crate::directory::GuildConfig;

/// Row of `guild_configs`. Snowflakes are stored as `BIGINT`.
#[derive(Debug, Clone, FromRow)]
pub struct GuildConfigRow {
    pub guild_id: i64,
    pub admin_role_ids: Vec<i64>,
    pub forbidden_role_ids: Vec<i64>,
    pub mod_role_ids: Vec<i64>,
    pub squadron_leader_role_ids: Vec<i64>,
    pub squadron_channel_category_ids: Vec<i64>,
    pub squadron_platforms: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn roles(ids: Vec<i64>) -> std::collections::BTreeSet<RoleId> {
    ids.into_iter().map(RoleId::from_db).collect()
}

impl From<GuildConfigRow> for GuildConfig {
    fn from(row: GuildConfigRow) -> Self {
        let mut categories: Vec<ChannelId> = Vec::with_capacity(row.squadron_channel_category_ids.len());
        for id in row.squadron_channel_category_ids.into_iter().map(ChannelId::from_db) {
            if !categories.contains(&id) {
                categories.push(id);
            }
        }

        Self {
            guild_id: GuildId::from_db(row.guild_id),
            admin_role_ids: roles(row.admin_role_ids),
            forbidden_role_ids: roles(row.forbidden_role_ids),
            mod_role_ids: roles(row.mod_role_ids),
            squadron_leader_role_ids: roles(row.squadron_leader_role_ids),
            squadron_channel_category_ids: categories,
            squadron_platforms: row
                .squadron_platforms
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::RoleList;

    #[test]
    fn test_row_conversion_normalizes_sets() {
        let row = GuildConfigRow {
            guild_id: 1,
            admin_role_ids: vec![],
            forbidden_role_ids: vec![9],
            mod_role_ids: vec![5, 3, 5],
            squadron_leader_role_ids: vec![],
            squadron_channel_category_ids: vec![20, 10, 20],
            squadron_platforms: vec!["PC".into(), "ps".into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let config = GuildConfig::from(row);
        assert_eq!(config.guild_id, GuildId(1));
        assert_eq!(config.role_ids(RoleList::Mod), vec![RoleId(3), RoleId(5)]);
        assert_eq!(
            config.squadron_channel_category_ids,
            vec![ChannelId(20), ChannelId(10)]
        );
        assert!(config.has_platform("pc"));
        assert!(config.forbidden_role_ids.contains(&RoleId(9)));
    }
}
