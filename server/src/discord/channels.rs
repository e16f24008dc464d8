//! Channel directory over Discord REST.

use async_trait::async_trait;
use srcbot_common::{ChannelId, GuildId};

use super::models::{
    partition_channels, sibling_positions, ChannelPositionEdit, CreateChannelBody, RenameBody,
    WireChannel, WireOverwrite, GUILD_CATEGORY, GUILD_TEXT,
};
use super::DiscordClient;
use crate::directory::{
    Channel, ChannelCategory, ChannelDirectory, NewChannel, PermissionOverwrite, UpstreamError,
};

impl DiscordClient {
    async fn guild_channels(&self, guild_id: GuildId) -> Result<Vec<WireChannel>, UpstreamError> {
        self.get(&format!("/guilds/{guild_id}/channels")).await
    }

    async fn edit_positions(
        &self,
        guild_id: GuildId,
        edits: &[ChannelPositionEdit],
    ) -> Result<(), UpstreamError> {
        self.patch(&format!("/guilds/{guild_id}/channels"), &edits)
            .await
    }
}

#[async_trait]
impl ChannelDirectory for DiscordClient {
    async fn list_categories(&self, guild_id: GuildId) -> Result<Vec<ChannelCategory>, UpstreamError> {
        let (categories, _) = partition_channels(self.guild_channels(guild_id).await?);
        Ok(categories)
    }

    async fn list_channels(&self, guild_id: GuildId) -> Result<Vec<Channel>, UpstreamError> {
        let (_, channels) = partition_channels(self.guild_channels(guild_id).await?);
        Ok(channels)
    }

    async fn create_channel(
        &self,
        guild_id: GuildId,
        channel: NewChannel,
    ) -> Result<Channel, UpstreamError> {
        let body = CreateChannelBody {
            name: &channel.name,
            kind: GUILD_TEXT,
            parent_id: Some(channel.parent_id),
            permission_overwrites: channel.overwrites.iter().map(WireOverwrite::from).collect(),
        };
        let created: WireChannel = self
            .post(&format!("/guilds/{guild_id}/channels"), &body)
            .await?;

        // Ranks are only meaningful against the full listing.
        let listed = self
            .list_children(guild_id, channel.parent_id)
            .await?
            .into_iter()
            .find(|c| c.id == created.id);
        Ok(listed.unwrap_or(Channel {
            id: created.id,
            name: created.name,
            parent_id: created.parent_id,
            position: 0,
            overwrites: channel.overwrites,
        }))
    }

    async fn create_category(
        &self,
        guild_id: GuildId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelCategory, UpstreamError> {
        let body = CreateChannelBody {
            name,
            kind: GUILD_CATEGORY,
            parent_id: None,
            permission_overwrites: overwrites.iter().map(WireOverwrite::from).collect(),
        };
        let created: WireChannel = self
            .post(&format!("/guilds/{guild_id}/channels"), &body)
            .await?;
        Ok(ChannelCategory {
            id: created.id,
            name: created.name,
            child_count: 0,
            overwrites,
        })
    }

    async fn set_parent(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        category_id: ChannelId,
        inherit_permissions: bool,
    ) -> Result<(), UpstreamError> {
        self.edit_positions(
            guild_id,
            &[ChannelPositionEdit {
                id: channel_id,
                parent_id: Some(category_id),
                lock_permissions: Some(inherit_permissions),
                ..ChannelPositionEdit::default()
            }],
        )
        .await
    }

    /// Moves the channel to `position` among its siblings; every sibling is
    /// renumbered in one bulk edit.
    async fn set_position(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        position: u32,
    ) -> Result<(), UpstreamError> {
        let raw = self.guild_channels(guild_id).await?;
        let edits = sibling_positions(&raw, channel_id, position).ok_or_else(|| {
            UpstreamError::Api {
                status: 404,
                message: format!("Unknown Channel {channel_id}"),
            }
        })?;
        self.edit_positions(guild_id, &edits).await
    }

    async fn rename(
        &self,
        _guild_id: GuildId,
        channel_id: ChannelId,
        name: &str,
    ) -> Result<(), UpstreamError> {
        self.patch(&format!("/channels/{channel_id}"), &RenameBody { name })
            .await
    }
}
