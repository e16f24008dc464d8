//! Discord REST payloads.
//!
//! Only the fields the bot reads or writes are modelled; serde ignores the
//! rest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use srcbot_common::{ChannelId, GuildId, RoleId, UserId};

use crate::directory::{
    Channel, ChannelCategory, OverwriteKind, PermissionOverwrite, Role,
};
use crate::permissions::GuildPermissions;

/// Discord channel type of a category.
pub const GUILD_CATEGORY: u8 = 4;

/// Discord channel type of a text channel.
pub const GUILD_TEXT: u8 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireOverwrite {
    /// Role or user snowflake.
    pub id: String,
    /// 0 for a role, 1 for a member.
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub allow: String,
    #[serde(default)]
    pub deny: String,
}

impl WireOverwrite {
    /// `None` for an unknown overwrite type or a malformed id.
    #[must_use]
    pub fn into_domain(self) -> Option<PermissionOverwrite> {
        let kind = match self.kind {
            0 => OverwriteKind::Role,
            1 => OverwriteKind::Member,
            _ => return None,
        };
        Some(PermissionOverwrite {
            id: self.id.parse().ok()?,
            kind,
            allow: GuildPermissions::from_wire(&self.allow),
            deny: GuildPermissions::from_wire(&self.deny),
        })
    }
}

impl From<&PermissionOverwrite> for WireOverwrite {
    fn from(overwrite: &PermissionOverwrite) -> Self {
        Self {
            id: overwrite.id.to_string(),
            kind: match overwrite.kind {
                OverwriteKind::Role => 0,
                OverwriteKind::Member => 1,
            },
            allow: overwrite.allow.to_wire(),
            deny: overwrite.deny.to_wire(),
        }
    }
}

fn overwrites_into_domain(overwrites: Vec<WireOverwrite>) -> Vec<PermissionOverwrite> {
    overwrites
        .into_iter()
        .filter_map(WireOverwrite::into_domain)
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireChannel {
    pub id: ChannelId,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub parent_id: Option<ChannelId>,
    #[serde(default)]
    pub permission_overwrites: Vec<WireOverwrite>,
}

/// Split a guild channel listing into categories and channels.
///
/// Discord positions are sparse and may collide; each channel's position is
/// replaced by its dense rank among its siblings, ordered by
/// `(raw position, id)`. Child counts are derived from `parent_id`.
#[must_use]
pub fn partition_channels(raw: Vec<WireChannel>) -> (Vec<ChannelCategory>, Vec<Channel>) {
    let (categories, mut channels): (Vec<WireChannel>, Vec<WireChannel>) =
        raw.into_iter().partition(|c| c.kind == GUILD_CATEGORY);

    channels.sort_by_key(|c| (c.parent_id, c.position, c.id));

    let mut ranks: BTreeMap<Option<ChannelId>, u32> = BTreeMap::new();
    let channels: Vec<Channel> = channels
        .into_iter()
        .map(|c| {
            let rank = ranks.entry(c.parent_id).or_insert(0);
            let position = *rank;
            *rank += 1;
            Channel {
                id: c.id,
                name: c.name,
                parent_id: c.parent_id,
                position,
                overwrites: overwrites_into_domain(c.permission_overwrites),
            }
        })
        .collect();

    let mut categories = categories;
    categories.sort_by_key(|c| (c.position, c.id));
    let categories = categories
        .into_iter()
        .map(|c| ChannelCategory {
            id: c.id,
            child_count: ranks.get(&Some(c.id)).copied().unwrap_or(0) as usize,
            name: c.name,
            overwrites: overwrites_into_domain(c.permission_overwrites),
        })
        .collect();

    (categories, channels)
}

/// Edits that move `channel_id` to `rank` among its siblings.
///
/// Siblings share the channel's parent and are ordered the way
/// [`partition_channels`] ranks them. Every sibling gets its new dense
/// position so stale raw positions cannot reorder the result. `None` if the
/// channel is not in `raw`.
#[must_use]
pub fn sibling_positions(
    raw: &[WireChannel],
    channel_id: ChannelId,
    rank: u32,
) -> Option<Vec<ChannelPositionEdit>> {
    let moving = raw
        .iter()
        .find(|c| c.id == channel_id && c.kind != GUILD_CATEGORY)?;

    let mut siblings: Vec<&WireChannel> = raw
        .iter()
        .filter(|c| c.kind != GUILD_CATEGORY && c.parent_id == moving.parent_id && c.id != channel_id)
        .collect();
    siblings.sort_by_key(|c| (c.position, c.id));

    let mut order: Vec<ChannelId> = siblings.into_iter().map(|c| c.id).collect();
    order.insert((rank as usize).min(order.len()), channel_id);

    Some(
        (0u32..)
            .zip(order)
            .map(|(position, id)| ChannelPositionEdit {
                id,
                position: Some(position),
                ..ChannelPositionEdit::default()
            })
            .collect(),
    )
}

/// Body of `POST /guilds/{guild.id}/channels`.
#[derive(Debug, Serialize)]
pub struct CreateChannelBody<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ChannelId>,
    pub permission_overwrites: Vec<WireOverwrite>,
}

/// One entry of `PATCH /guilds/{guild.id}/channels`.
#[derive(Debug, Default, Serialize)]
pub struct ChannelPositionEdit {
    pub id: ChannelId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ChannelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_permissions: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RenameBody<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: UserId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMember {
    pub user: WireUser,
    #[serde(default)]
    pub roles: Vec<RoleId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRole {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub permissions: String,
}

impl From<WireRole> for Role {
    fn from(role: WireRole) -> Self {
        Self {
            id: role.id,
            name: role.name,
            permissions: GuildPermissions::from_wire(&role.permissions),
        }
    }
}

/// The parts of a guild object needed to compute member permissions.
#[derive(Debug, Clone, Deserialize)]
pub struct WireGuild {
    pub id: GuildId,
    pub owner_id: UserId,
    #[serde(default)]
    pub roles: Vec<WireRole>,
}

#[derive(Debug, Serialize)]
pub struct OpenDmBody {
    pub recipient_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct WireDmChannel {
    pub id: ChannelId,
}

#[derive(Debug, Serialize)]
pub struct MessageBody<'a> {
    pub content: &'a str,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub struct WireError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: u64,
}
