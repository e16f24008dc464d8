//! Squadron archiving.
//!
//! Moves a squadron channel into the `Archive Event` family and tells the
//! squadron's leaders about it.

use srcbot_common::{ChannelId, GuildId, UserId};
use tracing::{debug, info};

use super::allocator::{CategoryAllocator, CategoryKind};
use super::error::SquadronError;
use super::naming::lookup_key;
use crate::directory::{Channel, Directories, GuildConfig, Member};
use crate::permissions::GuildPermissions;

/// What an archive run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub channel_id: ChannelId,
    pub category_id: ChannelId,
    /// Leaders that were sent a notification.
    pub notified: Vec<UserId>,
}

fn archive_notice(channel: &Channel) -> String {
    format!("Your squadron channel #{} has been moved to the archive.", channel.name)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveMover {
    allocator: CategoryAllocator,
}

impl ArchiveMover {
    #[must_use]
    pub const fn new(allocator: CategoryAllocator) -> Self {
        Self { allocator }
    }

    /// Archive the squadron channel called `channel_name`.
    ///
    /// The channel is validated before anything is written. The move keeps the
    /// channel's own permission overwrites.
    #[tracing::instrument(skip(self, dirs, config))]
    pub async fn archive(
        &self,
        dirs: &Directories,
        guild_id: GuildId,
        channel_name: &str,
        config: &GuildConfig,
    ) -> Result<ArchiveReport, SquadronError> {
        let wanted = channel_name.to_lowercase();
        let channel = dirs
            .channels
            .list_channels(guild_id)
            .await?
            .into_iter()
            .find(|c| lookup_key(&c.name) == wanted)
            .ok_or_else(|| SquadronError::NotFound(format!("channel {channel_name}")))?;

        if !channel
            .parent_id
            .is_some_and(|p| config.is_squadron_category(p))
        {
            return Err(SquadronError::InvalidTarget(
                "Channel is not a squadron channel".into(),
            ));
        }

        let placement = self
            .allocator
            .place(dirs.channels.as_ref(), guild_id, CategoryKind::Archive, &|_| Ok(()))
            .await?;

        dirs.channels
            .set_parent(guild_id, channel.id, placement.category.id, false)
            .await?;
        info!(channel_id = %channel.id, category = %placement.category.name, "Archived squadron channel");

        let notified = self.notify_leaders(dirs, guild_id, &channel, config).await?;

        Ok(ArchiveReport {
            channel_id: channel.id,
            category_id: placement.category.id,
            notified,
        })
    }

    /// Message every squadron leader holding a direct management overwrite
    /// on `channel`.
    async fn notify_leaders(
        &self,
        dirs: &Directories,
        guild_id: GuildId,
        channel: &Channel,
        config: &GuildConfig,
    ) -> Result<Vec<UserId>, SquadronError> {
        let owners: Vec<UserId> = channel
            .overwrites
            .iter()
            .filter(|o| o.allow.has(GuildPermissions::MANAGE_CHANNELS))
            .filter_map(|o| o.member_id())
            .collect();

        let mut roster: Option<Vec<Member>> = None;
        let mut notified = Vec::new();

        for user_id in owners {
            let mut member = dirs.members.fetch_member(guild_id, user_id).await?;
            if member.is_none() {
                if roster.is_none() {
                    debug!("Member not cached, fetching full member list");
                    roster = Some(dirs.members.fetch_all_members(guild_id).await?);
                }
                member = roster
                    .as_ref()
                    .and_then(|all| all.iter().find(|m| m.user_id == user_id).cloned());
            }

            let Some(member) = member else {
                debug!(user_id = %user_id, "Channel owner left the guild");
                continue;
            };
            if !member.has_any_role(&config.squadron_leader_role_ids) {
                continue;
            }

            dirs.notifier
                .send_direct_message(user_id, &archive_notice(channel))
                .await?;
            notified.push(user_id);
        }

        Ok(notified)
    }
}
