//! Directory and configuration records.
//!
//! These are snapshots read from the external channel directory and the
//! configuration store. The core never owns them; it reads them and returns
//! intents for the caller to apply.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use srcbot_common::{ChannelId, GuildId, RoleId, UserId};

use crate::permissions::GuildPermissions;

/// Whether an overwrite targets a role or a single member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwriteKind {
    Role,
    Member,
}

/// A per-channel permission overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    /// Role or user snowflake, depending on `kind`.
    pub id: u64,
    pub kind: OverwriteKind,
    pub allow: GuildPermissions,
    pub deny: GuildPermissions,
}

impl PermissionOverwrite {
    /// Overwrite granting `allow` to a single member.
    #[must_use]
    pub const fn member(user_id: UserId, allow: GuildPermissions) -> Self {
        Self {
            id: user_id.get(),
            kind: OverwriteKind::Member,
            allow,
            deny: GuildPermissions::empty(),
        }
    }

    /// Overwrite for a role.
    #[must_use]
    pub const fn role(role_id: RoleId, allow: GuildPermissions, deny: GuildPermissions) -> Self {
        Self {
            id: role_id.get(),
            kind: OverwriteKind::Role,
            allow,
            deny,
        }
    }

    /// The member this overwrite targets, if it is a member overwrite.
    #[must_use]
    pub const fn member_id(&self) -> Option<UserId> {
        match self.kind {
            OverwriteKind::Member => Some(UserId(self.id)),
            OverwriteKind::Role => None,
        }
    }
}

/// A channel category as seen in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCategory {
    pub id: ChannelId,
    pub name: String,
    /// Number of channels currently parented to this category.
    pub child_count: usize,
    pub overwrites: Vec<PermissionOverwrite>,
}

/// A (non-category) guild channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub parent_id: Option<ChannelId>,
    /// Dense 0-based rank within the parent category.
    pub position: u32,
    pub overwrites: Vec<PermissionOverwrite>,
}

/// Parameters for creating a channel under a category.
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub name: String,
    pub parent_id: ChannelId,
    pub overwrites: Vec<PermissionOverwrite>,
}

/// A guild member with resolved guild-level permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    pub role_ids: BTreeSet<RoleId>,
    /// Guild-level permissions (owner, `@everyone` and role grants combined).
    pub permissions: GuildPermissions,
}

impl Member {
    /// Check if the member holds a role.
    #[must_use]
    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.role_ids.contains(&role_id)
    }

    /// Check if the member holds any of the given roles.
    #[must_use]
    pub fn has_any_role(&self, role_ids: &BTreeSet<RoleId>) -> bool {
        !self.role_ids.is_disjoint(role_ids)
    }

    /// Check if the member holds a guild-level capability.
    #[must_use]
    pub const fn has_capability(&self, capability: GuildPermissions) -> bool {
        self.permissions.has(capability)
    }
}

/// A guild role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: GuildPermissions,
}

/// Per-guild squadron configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildConfig {
    pub guild_id: GuildId,
    pub admin_role_ids: BTreeSet<RoleId>,
    pub forbidden_role_ids: BTreeSet<RoleId>,
    pub mod_role_ids: BTreeSet<RoleId>,
    pub squadron_leader_role_ids: BTreeSet<RoleId>,
    pub squadron_channel_category_ids: Vec<ChannelId>,
    /// Two-character platform codes, stored lowercase.
    pub squadron_platforms: BTreeSet<String>,
}

impl GuildConfig {
    /// Empty configuration for a guild.
    #[must_use]
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            ..Self::default()
        }
    }

    /// Check if a category is one of the configured squadron categories.
    #[must_use]
    pub fn is_squadron_category(&self, category_id: ChannelId) -> bool {
        self.squadron_channel_category_ids.contains(&category_id)
    }

    /// Check if a platform code is configured (case-insensitive).
    #[must_use]
    pub fn has_platform(&self, code: &str) -> bool {
        self.squadron_platforms.contains(&code.to_lowercase())
    }

    /// One configured role list.
    #[must_use]
    pub const fn roles(&self, list: RoleList) -> &BTreeSet<RoleId> {
        match list {
            RoleList::Admin => &self.admin_role_ids,
            RoleList::Forbidden => &self.forbidden_role_ids,
            RoleList::Mod => &self.mod_role_ids,
            RoleList::SquadronLeader => &self.squadron_leader_role_ids,
        }
    }

    fn roles_mut(&mut self, list: RoleList) -> &mut BTreeSet<RoleId> {
        match list {
            RoleList::Admin => &mut self.admin_role_ids,
            RoleList::Forbidden => &mut self.forbidden_role_ids,
            RoleList::Mod => &mut self.mod_role_ids,
            RoleList::SquadronLeader => &mut self.squadron_leader_role_ids,
        }
    }

    /// Ids in one role list, ascending.
    #[must_use]
    pub fn role_ids(&self, list: RoleList) -> Vec<RoleId> {
        self.roles(list).iter().copied().collect()
    }

    /// Apply an intent to this in-memory copy. Returns whether anything changed.
    pub fn apply(&mut self, intent: &ConfigIntent) -> bool {
        match intent {
            ConfigIntent::AddRole(list, role_id) => self.roles_mut(*list).insert(*role_id),
            ConfigIntent::RemoveRole(list, role_id) => self.roles_mut(*list).remove(role_id),
            ConfigIntent::AddSquadronCategory(category_id) => {
                if self.is_squadron_category(*category_id) {
                    false
                } else {
                    self.squadron_channel_category_ids.push(*category_id);
                    true
                }
            }
            ConfigIntent::RemoveSquadronCategory(category_id) => {
                let before = self.squadron_channel_category_ids.len();
                self.squadron_channel_category_ids
                    .retain(|id| id != category_id);
                self.squadron_channel_category_ids.len() != before
            }
            ConfigIntent::AddPlatform(code) => self.squadron_platforms.insert(code.to_lowercase()),
            ConfigIntent::RemovePlatform(code) => {
                self.squadron_platforms.remove(&code.to_lowercase())
            }
        }
    }
}

/// The role lists a guild configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleList {
    Admin,
    Forbidden,
    Mod,
    SquadronLeader,
}

impl RoleList {
    /// Plural name used in replies, e.g. "mod roles".
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin roles",
            Self::Forbidden => "forbidden roles",
            Self::Mod => "mod roles",
            Self::SquadronLeader => "squadron leader roles",
        }
    }
}

/// A configuration change for the store to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIntent {
    AddRole(RoleList, RoleId),
    RemoveRole(RoleList, RoleId),
    AddSquadronCategory(ChannelId),
    RemoveSquadronCategory(ChannelId),
    /// Two-character platform code; stored lowercase.
    AddPlatform(String),
    RemovePlatform(String),
}
