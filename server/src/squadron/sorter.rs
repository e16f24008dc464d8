//! Alphabetic channel ordering.
//!
//! Channels inside a category are ordered by [`sort_key`]. A position update
//! moves one channel to a rank among its siblings and shifts the channels in
//! between, so each update is planned against the order left by the earlier
//! ones. Channels already at their rank at that point are not touched.

use srcbot_common::{ChannelId, GuildId};
use tracing::{debug, info};

use super::error::SquadronError;
use super::naming::sort_key;
use crate::directory::{Channel, ChannelDirectory};

/// A channel moving to a new rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionUpdate {
    pub channel_id: ChannelId,
    pub position: u32,
}

/// Position updates that sort `children`, in ascending rank order.
///
/// `children` must be in current position order; equal keys keep that order.
#[must_use]
pub fn plan(children: &[Channel]) -> Vec<PositionUpdate> {
    let mut target: Vec<&Channel> = children.iter().collect();
    target.sort_by_cached_key(|c| sort_key(&c.name));

    let mut current: Vec<ChannelId> = children.iter().map(|c| c.id).collect();
    let mut updates = Vec::new();
    for (rank, channel) in (0u32..).zip(target) {
        let index = rank as usize;
        if current[index] == channel.id {
            continue;
        }
        if let Some(from) = current.iter().position(|id| *id == channel.id) {
            current.remove(from);
            current.insert(index, channel.id);
        }
        updates.push(PositionUpdate {
            channel_id: channel.id,
            position: rank,
        });
    }
    updates
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelSorter;

impl ChannelSorter {
    /// Sort each category independently. Returns the number of channels moved.
    ///
    /// Stops at the first failed update; earlier updates stay applied.
    #[tracing::instrument(skip(self, channels))]
    pub async fn sort(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        category_ids: &[ChannelId],
    ) -> Result<usize, SquadronError> {
        let mut moved = 0;
        for category_id in category_ids {
            moved += self.sort_category(channels, guild_id, *category_id).await?;
        }
        info!(moved, categories = category_ids.len(), "Sorted squadron categories");
        Ok(moved)
    }

    pub async fn sort_category(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        category_id: ChannelId,
    ) -> Result<usize, SquadronError> {
        let children = channels.list_children(guild_id, category_id).await?;
        let updates = plan(&children);
        debug!(category_id = %category_id, children = children.len(), updates = updates.len(), "Planned sort");

        for update in &updates {
            channels
                .set_position(guild_id, update.channel_id, update.position)
                .await?;
        }
        Ok(updates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{FailPoint, MemoryDirectory};

    const GUILD: GuildId = GuildId(1);

    fn channel(id: u64, name: &str, position: u32) -> Channel {
        Channel {
            id: ChannelId(id),
            name: name.to_string(),
            parent_id: Some(ChannelId(1)),
            position,
            overwrites: Vec::new(),
        }
    }

    #[test]
    fn test_plan_orders_by_normalized_name() {
        let children = vec![
            channel(1, "Bravo", 0),
            channel(2, "alpha", 1),
            channel(3, "✅Charlie", 2),
            channel(4, "💎Delta", 3),
        ];
        let updates = plan(&children);
        assert_eq!(
            updates,
            vec![PositionUpdate { channel_id: ChannelId(2), position: 0 }]
        );
    }

    #[test]
    fn test_plan_is_stable_for_equal_keys() {
        let children = vec![
            channel(1, "zulu", 0),
            channel(2, "✅Alpha", 1),
            channel(3, "alpha", 2),
        ];
        let updates = plan(&children);
        assert_eq!(
            updates,
            vec![
                PositionUpdate { channel_id: ChannelId(2), position: 0 },
                PositionUpdate { channel_id: ChannelId(3), position: 1 },
            ]
        );
    }

    #[test]
    fn test_plan_revisits_channels_shifted_by_earlier_moves() {
        let children = vec![
            channel(1, "Bravo", 0),
            channel(2, "Charlie", 1),
            channel(3, "Alpha", 2),
        ];
        assert_eq!(
            plan(&children),
            vec![PositionUpdate { channel_id: ChannelId(3), position: 0 }]
        );

        // Bravo starts at its final rank but is pushed down when Alpha moves
        // to the top, so it needs its own update.
        let children = vec![
            channel(1, "Charlie", 0),
            channel(2, "Bravo", 1),
            channel(3, "Alpha", 2),
        ];
        assert_eq!(
            plan(&children),
            vec![
                PositionUpdate { channel_id: ChannelId(3), position: 0 },
                PositionUpdate { channel_id: ChannelId(2), position: 1 },
            ]
        );
    }

    #[test]
    fn test_plan_sorted_input_is_untouched() {
        let children = vec![channel(1, "alpha", 0), channel(2, "💎Bravo", 1)];
        assert!(plan(&children).is_empty());
    }

    #[tokio::test]
    async fn test_sort_produces_expected_order() {
        let dir = MemoryDirectory::new(GUILD);
        let cat = dir.add_category("General Squadrons");
        for name in ["Bravo", "alpha", "✅Charlie", "💎Delta"] {
            dir.add_channel(cat, name);
        }

        let moved = ChannelSorter.sort(&dir, GUILD, &[cat]).await.unwrap();
        assert_eq!(moved, 1);
        assert_eq!(
            dir.child_names(cat),
            vec!["alpha", "Bravo", "✅Charlie", "💎Delta"]
        );
    }

    #[tokio::test]
    async fn test_sort_is_idempotent() {
        let dir = MemoryDirectory::new(GUILD);
        let cat = dir.add_category("General Squadrons");
        for name in ["echo", "delta", "Charlie", "💎bravo", "✅alpha"] {
            dir.add_channel(cat, name);
        }

        ChannelSorter.sort(&dir, GUILD, &[cat]).await.unwrap();
        let first = dir.position_updates().len();
        assert!(first > 0);

        let moved = ChannelSorter.sort(&dir, GUILD, &[cat]).await.unwrap();
        assert_eq!(moved, 0);
        assert_eq!(dir.position_updates().len(), first);
    }

    #[tokio::test]
    async fn test_updates_issued_in_ascending_rank() {
        let dir = MemoryDirectory::new(GUILD);
        let cat = dir.add_category("General Squadrons");
        for name in ["d", "c", "b", "a"] {
            dir.add_channel(cat, name);
        }

        ChannelSorter.sort(&dir, GUILD, &[cat]).await.unwrap();
        let ranks: Vec<u32> = dir.position_updates().iter().map(|(_, p)| *p).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_categories_sorted_independently() {
        let dir = MemoryDirectory::new(GUILD);
        let first = dir.add_category("General Squadrons");
        let second = dir.add_category("Raid Squadrons");
        dir.add_channel(first, "zulu");
        dir.add_channel(first, "mike");
        dir.add_channel(second, "alpha");
        dir.add_channel(second, "yankee");

        ChannelSorter.sort(&dir, GUILD, &[first, second]).await.unwrap();
        assert_eq!(dir.child_names(first), vec!["mike", "zulu"]);
        assert_eq!(dir.child_names(second), vec!["alpha", "yankee"]);
    }

    #[tokio::test]
    async fn test_failed_update_aborts() {
        let dir = MemoryDirectory::new(GUILD);
        let cat = dir.add_category("General Squadrons");
        dir.add_channel(cat, "b");
        dir.add_channel(cat, "a");
        dir.fail(FailPoint::SetPosition);

        let err = ChannelSorter.sort(&dir, GUILD, &[cat]).await.unwrap_err();
        assert!(matches!(err, SquadronError::Upstream(_)));
    }
}
