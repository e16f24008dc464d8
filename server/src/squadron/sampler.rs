//! Random squadron selection.

use rand::seq::SliceRandom;
use rand::Rng;
use srcbot_common::{ChannelId, GuildId};

use super::error::SquadronError;
use crate::directory::{Channel, ChannelDirectory};

/// Uniform draw of `n` channels without replacement. Order is arbitrary.
pub fn pick<R: Rng + ?Sized>(channels: &[Channel], n: usize, rng: &mut R) -> Vec<Channel> {
    channels.choose_multiple(rng, n).cloned().collect()
}

/// Summary line for one sampled channel.
#[must_use]
pub fn describe(channel: &Channel) -> String {
    format!("{} - #{}", channel.id, channel.name)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SquadronSampler;

impl SquadronSampler {
    /// Draw up to `n` channels whose parent is one of `category_ids`.
    ///
    /// An oversized `n` returns every candidate.
    #[tracing::instrument(skip(self, channels))]
    pub async fn sample(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        category_ids: &[ChannelId],
        n: usize,
    ) -> Result<Vec<Channel>, SquadronError> {
        if category_ids.is_empty() {
            return Err(SquadronError::NotFound("category".into()));
        }

        let candidates: Vec<Channel> = channels
            .list_channels(guild_id)
            .await?
            .into_iter()
            .filter(|c| c.parent_id.is_some_and(|p| category_ids.contains(&p)))
            .collect();

        let picked = pick(&candidates, n, &mut rand::thread_rng());
        Ok(picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    const GUILD: GuildId = GuildId(1);

    fn seeded() -> (MemoryDirectory, ChannelId, ChannelId) {
        let dir = MemoryDirectory::new(GUILD);
        let general = dir.add_category("General Squadrons");
        let raid = dir.add_category("Raid Squadrons");
        for i in 0..4 {
            dir.add_channel(general, &format!("general-{i}"));
        }
        for i in 0..3 {
            dir.add_channel(raid, &format!("raid-{i}"));
        }
        (dir, general, raid)
    }

    #[tokio::test]
    async fn test_oversized_n_returns_everything_once() {
        let (dir, general, raid) = seeded();

        let picked = SquadronSampler
            .sample(&dir, GUILD, &[general, raid], 1000)
            .await
            .unwrap();
        assert_eq!(picked.len(), 7);
        let unique: HashSet<ChannelId> = picked.iter().map(|c| c.id).collect();
        assert_eq!(unique.len(), 7);
    }

    #[tokio::test]
    async fn test_only_selected_categories_are_drawn() {
        let (dir, _general, raid) = seeded();

        let picked = SquadronSampler.sample(&dir, GUILD, &[raid], 2).await.unwrap();
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|c| c.parent_id == Some(raid)));
    }

    #[tokio::test]
    async fn test_empty_category_set_is_not_found() {
        let (dir, _, _) = seeded();
        let err = SquadronSampler.sample(&dir, GUILD, &[], 3).await.unwrap_err();
        assert!(matches!(err, SquadronError::NotFound(_)));
    }

    #[test]
    fn test_pick_without_replacement() {
        let channels: Vec<Channel> = (0..10)
            .map(|i| Channel {
                id: ChannelId(i),
                name: format!("c{i}"),
                parent_id: None,
                position: 0,
                overwrites: Vec::new(),
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(7);

        for n in [0, 1, 5, 10] {
            let picked = pick(&channels, n, &mut rng);
            assert_eq!(picked.len(), n);
            let unique: HashSet<ChannelId> = picked.iter().map(|c| c.id).collect();
            assert_eq!(unique.len(), n);
        }
    }

    #[test]
    fn test_describe() {
        let channel = Channel {
            id: ChannelId(42),
            name: "iron-wolves-pc".into(),
            parent_id: None,
            position: 0,
            overwrites: Vec::new(),
        };
        assert_eq!(describe(&channel), "42 - #iron-wolves-pc");
    }
}
