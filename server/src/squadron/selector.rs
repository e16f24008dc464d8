//! Category selectors.
//!
//! Sort and sample commands name their categories as `all`, a configured
//! category id, or a squadron category base name (`general`).

use srcbot_common::{ChannelId, GuildId};
use tracing::warn;

use super::allocator::{CategoryAllocator, CategoryKind};
use super::error::SquadronError;
use crate::directory::{ChannelDirectory, GuildConfig};

/// A parsed category selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelector {
    /// Every configured squadron category.
    All,
    /// A configured id or a base name.
    Named(String),
}

impl CategorySelector {
    /// `all` (any case) selects every configured category.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(s.to_string())
        }
    }

    /// Resolve to category ids, in configured order for `All`.
    ///
    /// Configured ids that no longer exist in the directory are skipped.
    /// Resolving to nothing is `NotFound`.
    #[tracing::instrument(skip(self, channels, config, allocator), fields(selector = ?self))]
    pub async fn resolve(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        config: &GuildConfig,
        allocator: &CategoryAllocator,
    ) -> Result<Vec<ChannelId>, SquadronError> {
        let ids = match self {
            Self::All => {
                let existing = channels.list_categories(guild_id).await?;
                config
                    .squadron_channel_category_ids
                    .iter()
                    .copied()
                    .filter(|id| {
                        let found = existing.iter().any(|c| c.id == *id);
                        if !found {
                            warn!(category_id = %id, "Configured squadron category no longer exists");
                        }
                        found
                    })
                    .collect()
            }
            Self::Named(raw) => {
                let literal = raw
                    .parse::<ChannelId>()
                    .ok()
                    .filter(|id| config.is_squadron_category(*id));
                match literal {
                    Some(id) => vec![id],
                    None => allocator
                        .find(channels, guild_id, CategoryKind::Squadron(raw), 1)
                        .await?
                        .map(|c| c.id)
                        .into_iter()
                        .collect(),
                }
            }
        };

        if ids.is_empty() {
            return Err(SquadronError::NotFound(format!("category {self}")));
        }
        Ok(ids)
    }
}

impl std::fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Named(raw) => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;

    const GUILD: GuildId = GuildId(1);

    #[test]
    fn test_parse() {
        assert_eq!(CategorySelector::parse("ALL"), CategorySelector::All);
        assert_eq!(
            CategorySelector::parse("general"),
            CategorySelector::Named("general".into())
        );
    }

    #[tokio::test]
    async fn test_all_uses_configured_order_and_skips_missing() {
        let dir = MemoryDirectory::new(GUILD);
        let a = dir.add_category("General Squadrons");
        let b = dir.add_category("Raid Squadrons");
        let mut config = GuildConfig::new(GUILD);
        config.squadron_channel_category_ids = vec![b, ChannelId(42), a];

        let ids = CategorySelector::All
            .resolve(&dir, GUILD, &config, &CategoryAllocator::default())
            .await
            .unwrap();
        assert_eq!(ids, vec![b, a]);
    }

    #[tokio::test]
    async fn test_all_with_nothing_configured_is_not_found() {
        let dir = MemoryDirectory::new(GUILD);
        dir.add_category("General Squadrons");
        let config = GuildConfig::new(GUILD);

        let err = CategorySelector::All
            .resolve(&dir, GUILD, &config, &CategoryAllocator::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SquadronError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_literal_id_must_be_configured() {
        let dir = MemoryDirectory::new(GUILD);
        let a = dir.add_category("General Squadrons");
        let mut config = GuildConfig::new(GUILD);

        let selector = CategorySelector::parse(&a.to_string());
        let err = selector
            .resolve(&dir, GUILD, &config, &CategoryAllocator::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SquadronError::NotFound(_)));

        config.squadron_channel_category_ids.push(a);
        let ids = selector
            .resolve(&dir, GUILD, &config, &CategoryAllocator::default())
            .await
            .unwrap();
        assert_eq!(ids, vec![a]);
    }

    #[tokio::test]
    async fn test_name_lookup_finds_base_category() {
        let dir = MemoryDirectory::new(GUILD);
        let a = dir.add_category("General Squadrons");
        dir.add_category("General Squadrons 2");
        let config = GuildConfig::new(GUILD);

        let ids = CategorySelector::parse("General")
            .resolve(&dir, GUILD, &config, &CategoryAllocator::default())
            .await
            .unwrap();
        assert_eq!(ids, vec![a]);
    }
}
