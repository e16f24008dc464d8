//! Overflow-aware category allocation.
//!
//! A category holds at most [`CATEGORY_CAPACITY`] channels. When the base
//! category (`"General Squadrons"`) is full, channels spill into numbered
//! siblings (`"General Squadrons 2"`, `"General Squadrons 3"`, ...).

use std::collections::HashSet;

use srcbot_common::{ChannelId, GuildId};
use tracing::{debug, info, warn};

use super::error::SquadronError;
use crate::directory::{ChannelCategory, ChannelDirectory, UpstreamError};

/// Platform ceiling on channels per category.
pub const CATEGORY_CAPACITY: usize = 50;

/// Family of categories an allocation searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind<'a> {
    /// `"{base} squadrons[ n]"`.
    Squadron(&'a str),
    /// `"archive event[ n]"`.
    Archive,
}

impl CategoryKind<'_> {
    /// Lowercase name of the category at `iteration` (1 is unsuffixed).
    #[must_use]
    pub fn lookup_name(&self, iteration: u32) -> String {
        let base = match self {
            Self::Squadron(base) => format!("{} squadrons", base.to_lowercase()),
            Self::Archive => "archive event".to_string(),
        };
        if iteration > 1 {
            format!("{base} {iteration}")
        } else {
            base
        }
    }

    /// Whether `category` is the member of this family at `iteration`.
    #[must_use]
    pub fn matches(&self, category: &ChannelCategory, iteration: u32) -> bool {
        category.name.to_lowercase() == self.lookup_name(iteration)
    }
}

/// Result of scanning a category family for room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// An existing category with room.
    Existing {
        category: ChannelCategory,
        iteration: u32,
    },
    /// No category exists at this slot; the caller must create it.
    Vacant {
        /// Lowercase lookup name of the missing category.
        name: String,
        iteration: u32,
        /// The unsuffixed category, when it exists.
        base: Option<ChannelCategory>,
    },
}

/// A category ready to receive a channel.
#[derive(Debug, Clone)]
pub struct Placement {
    pub category: ChannelCategory,
    /// The category was created by this placement.
    pub created: bool,
}

/// Finds the first category in a family with room below the ceiling.
#[derive(Debug, Clone, Copy)]
pub struct CategoryAllocator {
    capacity: usize,
}

impl Default for CategoryAllocator {
    fn default() -> Self {
        Self::new(CATEGORY_CAPACITY)
    }
}

impl CategoryAllocator {
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The category of a family at one iteration, full or not.
    pub async fn find(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        kind: CategoryKind<'_>,
        iteration: u32,
    ) -> Result<Option<ChannelCategory>, UpstreamError> {
        channels
            .find_category_by_name(guild_id, &|c: &ChannelCategory| kind.matches(c, iteration))
            .await
    }

    /// Scan a family from iteration 1 for the first slot with room.
    #[tracing::instrument(skip(self, channels))]
    pub async fn allocate(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        kind: CategoryKind<'_>,
    ) -> Result<Allocation, UpstreamError> {
        self.scan(channels, guild_id, kind, &HashSet::new()).await
    }

    /// Like [`allocate`](Self::allocate), treating `known_full` as full
    /// regardless of their reported child counts.
    async fn scan(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        kind: CategoryKind<'_>,
        known_full: &HashSet<ChannelId>,
    ) -> Result<Allocation, UpstreamError> {
        let categories = channels.list_categories(guild_id).await?;
        let base = categories.iter().find(|c| kind.matches(c, 1)).cloned();

        let mut iteration = 1;
        loop {
            let Some(category) = categories.iter().find(|c| kind.matches(c, iteration)) else {
                return Ok(Allocation::Vacant {
                    name: kind.lookup_name(iteration),
                    iteration,
                    base,
                });
            };

            if category.child_count < self.capacity && !known_full.contains(&category.id) {
                return Ok(Allocation::Existing {
                    category: category.clone(),
                    iteration,
                });
            }

            debug!(category = %category.name, children = category.child_count, "Category full");
            iteration += 1;
        }
    }

    /// Pick (or create) the category the next channel goes into.
    ///
    /// `admit` vets the chosen category, or the base category when a new
    /// overflow sibling would be created, before anything is written. A
    /// missing base category is `NotFound`. Occupancy of an existing
    /// category is re-read right before it is returned.
    pub async fn place(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        kind: CategoryKind<'_>,
        admit: &(dyn for<'c> Fn(&'c ChannelCategory) -> Result<(), SquadronError> + Send + Sync),
    ) -> Result<Placement, SquadronError> {
        let mut known_full = HashSet::new();

        loop {
            match self.scan(channels, guild_id, kind, &known_full).await? {
                Allocation::Existing { category, .. } => {
                    admit(&category)?;
                    let occupancy = channels.list_children(guild_id, category.id).await?.len();
                    if occupancy >= self.capacity {
                        warn!(category = %category.name, occupancy, "Category filled up before placement");
                        known_full.insert(category.id);
                        continue;
                    }
                    return Ok(Placement {
                        category,
                        created: false,
                    });
                }
                Allocation::Vacant { name, base: None, .. } => {
                    return Err(SquadronError::NotFound(format!("category {name}")));
                }
                Allocation::Vacant {
                    iteration,
                    base: Some(base),
                    ..
                } => {
                    admit(&base)?;
                    let name = format!("{} {iteration}", base.name);
                    let category = channels
                        .create_category(guild_id, &name, base.overwrites.clone())
                        .await?;
                    info!(category_id = %category.id, category = %category.name, "Created overflow category");
                    return Ok(Placement {
                        category,
                        created: true,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::directory::{Channel, MemoryDirectory, NewChannel, PermissionOverwrite};
    use crate::permissions::GuildPermissions;
    use srcbot_common::RoleId;

    const GUILD: GuildId = GuildId(1);

    fn accept(_: &ChannelCategory) -> Result<(), SquadronError> {
        Ok(())
    }

    #[test]
    fn test_lookup_names() {
        assert_eq!(CategoryKind::Squadron("General").lookup_name(1), "general squadrons");
        assert_eq!(CategoryKind::Squadron("General").lookup_name(3), "general squadrons 3");
        assert_eq!(CategoryKind::Archive.lookup_name(1), "archive event");
        assert_eq!(CategoryKind::Archive.lookup_name(2), "archive event 2");
    }

    #[tokio::test]
    async fn test_returns_base_when_it_has_room() {
        let dir = MemoryDirectory::new(GUILD);
        let general = dir.add_category("General Squadrons");
        dir.fill_category(general, 49);

        let allocation = CategoryAllocator::default()
            .allocate(&dir, GUILD, CategoryKind::Squadron("general"))
            .await
            .unwrap();
        match allocation {
            Allocation::Existing { category, iteration } => {
                assert_eq!(category.id, general);
                assert_eq!(iteration, 1);
            }
            other => panic!("unexpected allocation: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_full_category_spills_to_numbered_sibling() {
        let dir = MemoryDirectory::new(GUILD);
        let general = dir.add_category("General Squadrons");
        dir.fill_category(general, 50);
        let second = dir.add_category("General Squadrons 2");
        dir.fill_category(second, 50);
        let third = dir.add_category("General Squadrons 3");
        dir.fill_category(third, 10);

        let allocation = CategoryAllocator::default()
            .allocate(&dir, GUILD, CategoryKind::Squadron("General"))
            .await
            .unwrap();
        match allocation {
            Allocation::Existing { category, iteration } => {
                assert_eq!(category.id, third);
                assert_eq!(iteration, 3);
            }
            other => panic!("unexpected allocation: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_sibling_is_vacant() {
        let dir = MemoryDirectory::new(GUILD);
        let general = dir.add_category("General Squadrons");
        dir.fill_category(general, 50);

        let allocation = CategoryAllocator::default()
            .allocate(&dir, GUILD, CategoryKind::Squadron("General"))
            .await
            .unwrap();
        match allocation {
            Allocation::Vacant { name, iteration, base } => {
                assert_eq!(name, "general squadrons 2");
                assert_eq!(iteration, 2);
                assert_eq!(base.map(|b| b.id), Some(general));
            }
            other => panic!("unexpected allocation: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_place_creates_overflow_with_base_overwrites() {
        let dir = MemoryDirectory::new(GUILD);
        let overwrite = PermissionOverwrite::role(
            RoleId(1),
            GuildPermissions::empty(),
            GuildPermissions::VIEW_CHANNEL,
        );
        let general = dir.add_category_with("General Squadrons", vec![overwrite.clone()]);
        dir.fill_category(general, 50);

        let placement = CategoryAllocator::default()
            .place(&dir, GUILD, CategoryKind::Squadron("general"), &accept)
            .await
            .unwrap();
        assert!(placement.created);
        assert_eq!(placement.category.name, "General Squadrons 2");
        assert_eq!(placement.category.overwrites, vec![overwrite]);
        assert_eq!(dir.created_categories(), vec![placement.category.id]);
    }

    #[tokio::test]
    async fn test_place_without_base_is_not_found() {
        let dir = MemoryDirectory::new(GUILD);
        dir.add_category("Other Squadrons");

        let err = CategoryAllocator::default()
            .place(&dir, GUILD, CategoryKind::Squadron("general"), &accept)
            .await
            .unwrap_err();
        assert!(matches!(err, SquadronError::NotFound(_)));
        assert_eq!(dir.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_place_rejected_by_admit_writes_nothing() {
        let dir = MemoryDirectory::new(GUILD);
        let general = dir.add_category("General Squadrons");
        dir.fill_category(general, 50);

        let err = CategoryAllocator::default()
            .place(&dir, GUILD, CategoryKind::Squadron("general"), &|_| {
                Err(SquadronError::Precondition("not configured".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SquadronError::Precondition(_)));
        assert!(dir.created_categories().is_empty());
    }

    #[tokio::test]
    async fn test_archive_family_is_case_insensitive() {
        let dir = MemoryDirectory::new(GUILD);
        let archive = dir.add_category("ARCHIVE EVENT");

        let placement = CategoryAllocator::default()
            .place(&dir, GUILD, CategoryKind::Archive, &accept)
            .await
            .unwrap();
        assert_eq!(placement.category.id, archive);
        assert!(!placement.created);
    }

    #[tokio::test]
    async fn test_smaller_capacity_is_honoured() {
        let dir = MemoryDirectory::new(GUILD);
        let archive = dir.add_category("Archive Event");
        dir.fill_category(archive, 2);

        let placement = CategoryAllocator::new(2)
            .place(&dir, GUILD, CategoryKind::Archive, &accept)
            .await
            .unwrap();
        assert_eq!(placement.category.name, "Archive Event 2");
        assert!(placement.created);
    }

    /// Lags one channel behind on category listings, like a cached listing
    /// taken just before another channel was added.
    struct StaleListing(MemoryDirectory);

    #[async_trait]
    impl ChannelDirectory for StaleListing {
        async fn list_categories(
            &self,
            guild_id: GuildId,
        ) -> Result<Vec<ChannelCategory>, UpstreamError> {
            let mut categories = self.0.list_categories(guild_id).await?;
            for category in &mut categories {
                category.child_count = category.child_count.min(CATEGORY_CAPACITY - 1);
            }
            Ok(categories)
        }

        async fn list_channels(&self, guild_id: GuildId) -> Result<Vec<Channel>, UpstreamError> {
            self.0.list_channels(guild_id).await
        }

        async fn create_channel(
            &self,
            guild_id: GuildId,
            channel: NewChannel,
        ) -> Result<Channel, UpstreamError> {
            self.0.create_channel(guild_id, channel).await
        }

        async fn create_category(
            &self,
            guild_id: GuildId,
            name: &str,
            overwrites: Vec<PermissionOverwrite>,
        ) -> Result<ChannelCategory, UpstreamError> {
            self.0.create_category(guild_id, name, overwrites).await
        }

        async fn set_parent(
            &self,
            guild_id: GuildId,
            channel_id: ChannelId,
            category_id: ChannelId,
            inherit_permissions: bool,
        ) -> Result<(), UpstreamError> {
            self.0
                .set_parent(guild_id, channel_id, category_id, inherit_permissions)
                .await
        }

        async fn set_position(
            &self,
            guild_id: GuildId,
            channel_id: ChannelId,
            position: u32,
        ) -> Result<(), UpstreamError> {
            self.0.set_position(guild_id, channel_id, position).await
        }

        async fn rename(
            &self,
            guild_id: GuildId,
            channel_id: ChannelId,
            name: &str,
        ) -> Result<(), UpstreamError> {
            self.0.rename(guild_id, channel_id, name).await
        }
    }

    #[tokio::test]
    async fn test_place_rechecks_occupancy_and_skips_to_sibling() {
        let dir = MemoryDirectory::new(GUILD);
        let general = dir.add_category("General Squadrons");
        dir.fill_category(general, 50);
        let second = dir.add_category("General Squadrons 2");
        dir.fill_category(second, 10);
        let stale = StaleListing(dir);

        let listed = stale.list_categories(GUILD).await.unwrap();
        assert_eq!(listed[0].child_count, 49);

        let placement = CategoryAllocator::default()
            .place(&stale, GUILD, CategoryKind::Squadron("general"), &accept)
            .await
            .unwrap();
        assert_eq!(placement.category.id, second);
        assert!(!placement.created);
    }

    #[tokio::test]
    async fn test_place_rechecks_occupancy_and_creates_sibling() {
        let dir = MemoryDirectory::new(GUILD);
        let general = dir.add_category("General Squadrons");
        dir.fill_category(general, 50);
        let stale = StaleListing(dir);

        let placement = CategoryAllocator::default()
            .place(&stale, GUILD, CategoryKind::Squadron("general"), &accept)
            .await
            .unwrap();
        assert!(placement.created);
        assert_eq!(placement.category.name, "General Squadrons 2");
        assert_eq!(stale.0.created_categories(), vec![placement.category.id]);
    }
}
