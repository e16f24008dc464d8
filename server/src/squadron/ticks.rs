//! Completed-marker cleanup.

use srcbot_common::{ChannelId, GuildId};
use tracing::info;

use super::error::SquadronError;
use super::naming::strip_completed;
use crate::directory::{ChannelDirectory, GuildConfig};

#[derive(Debug, Clone, Copy, Default)]
pub struct TickRemover;

impl TickRemover {
    /// Strip the completed marker from every channel in the configured
    /// squadron categories. Returns the renamed channel ids.
    #[tracing::instrument(skip(self, channels, config))]
    pub async fn remove_ticks(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        config: &GuildConfig,
    ) -> Result<Vec<ChannelId>, SquadronError> {
        let mut all = channels.list_channels(guild_id).await?;
        all.sort_by_key(|c| (c.position, c.id));

        let mut renamed = Vec::new();
        for category_id in &config.squadron_channel_category_ids {
            for channel in all.iter().filter(|c| c.parent_id == Some(*category_id)) {
                if let Some(stripped) = strip_completed(&channel.name) {
                    channels.rename(guild_id, channel.id, stripped).await?;
                    renamed.push(channel.id);
                }
            }
        }

        info!(renamed = renamed.len(), "Removed completed markers");
        Ok(renamed)
    }
}
