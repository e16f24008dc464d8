//! Squadron channel creation.

use srcbot_common::{GuildId, UserId};
use tracing::info;

use super::allocator::{CategoryAllocator, CategoryKind};
use super::error::SquadronError;
use super::naming::{split_platforms, squadron_channel_name};
use super::sorter::ChannelSorter;
use crate::directory::{
    Channel, ChannelCategory, ChannelDirectory, ConfigIntent, GuildConfig, NewChannel,
    PermissionOverwrite,
};
use crate::permissions::GuildPermissions;

/// Arguments of a create request.
#[derive(Debug, Clone, Copy)]
pub struct CreateRequest<'a> {
    pub actor: UserId,
    /// Concatenated two-character platform codes, e.g. `pcps`.
    pub platforms: &'a str,
    /// Base name of the squadron category family, e.g. `general`.
    pub category: &'a str,
    /// Squadron name words.
    pub name: &'a [&'a str],
}

/// What a create run did.
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub channel: Channel,
    pub category: ChannelCategory,
    /// An overflow category was created for this channel.
    pub created_category: bool,
    /// Registration of the new overflow category, for the caller to persist.
    pub intent: Option<ConfigIntent>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SquadronCreator {
    allocator: CategoryAllocator,
    sorter: ChannelSorter,
}

impl SquadronCreator {
    #[must_use]
    pub const fn new(allocator: CategoryAllocator) -> Self {
        Self {
            allocator,
            sorter: ChannelSorter,
        }
    }

    /// Create a squadron channel and re-sort its category.
    ///
    /// The actor is granted channel management on the new channel on top of
    /// the category's overwrites. Configuration is never written here; a new
    /// overflow category comes back as [`CreateReport::intent`].
    #[tracing::instrument(skip(self, channels, config))]
    pub async fn create(
        &self,
        channels: &dyn ChannelDirectory,
        guild_id: GuildId,
        config: &GuildConfig,
        request: CreateRequest<'_>,
    ) -> Result<CreateReport, SquadronError> {
        if config.squadron_platforms.is_empty() {
            return Err(SquadronError::Precondition(
                "You don't have any squadron platforms set up".into(),
            ));
        }
        if config.squadron_channel_category_ids.is_empty() {
            return Err(SquadronError::Precondition(
                "You don't have any squadron channel category ids set up".into(),
            ));
        }

        let platforms = split_platforms(request.platforms);
        if platforms.is_empty() || !platforms.iter().all(|p| config.has_platform(p)) {
            return Err(SquadronError::Precondition(
                "Platform doesn't exist. Please contact a moderator for help.".into(),
            ));
        }

        let name = squadron_channel_name(request.name, &platforms);
        let existing = channels.list_channels(guild_id).await?;
        if existing.iter().any(|c| c.name == name) {
            return Err(SquadronError::Precondition(
                "A channel already exists for this squadron name and platform.".into(),
            ));
        }

        let admit = |category: &ChannelCategory| {
            if config.is_squadron_category(category.id) {
                Ok(())
            } else {
                Err(SquadronError::Precondition(
                    "Category doesn't exist. Please contact a moderator for help.".into(),
                ))
            }
        };
        let placement = self
            .allocator
            .place(
                channels,
                guild_id,
                CategoryKind::Squadron(request.category),
                &admit,
            )
            .await?;

        let mut overwrites = vec![PermissionOverwrite::member(
            request.actor,
            GuildPermissions::SQUADRON_OWNER,
        )];
        overwrites.extend(placement.category.overwrites.iter().cloned());

        let channel = channels
            .create_channel(
                guild_id,
                NewChannel {
                    name,
                    parent_id: placement.category.id,
                    overwrites,
                },
            )
            .await?;
        info!(channel_id = %channel.id, channel = %channel.name, category = %placement.category.name, "Created squadron channel");

        self.sorter
            .sort_category(channels, guild_id, placement.category.id)
            .await?;

        let intent = placement
            .created
            .then_some(ConfigIntent::AddSquadronCategory(placement.category.id));
        Ok(CreateReport {
            channel,
            category: placement.category,
            created_category: placement.created,
            intent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{FailPoint, MemoryDirectory};
    use srcbot_common::{ChannelId, RoleId};
    use std::sync::Arc;

    const GUILD: GuildId = GuildId(1);
    const ACTOR: UserId = UserId(77);

    struct Fixture {
        memory: Arc<MemoryDirectory>,
        general: ChannelId,
    }

    fn fixture() -> Fixture {
        let memory = Arc::new(MemoryDirectory::new(GUILD));
        let hidden = PermissionOverwrite::role(
            RoleId(1),
            GuildPermissions::empty(),
            GuildPermissions::VIEW_CHANNEL,
        );
        let general = memory.add_category_with("General Squadrons", vec![hidden]);
        let mut config = GuildConfig::new(GUILD);
        config.squadron_channel_category_ids.push(general);
        config.squadron_platforms.extend(["pc".to_string(), "ps".to_string()]);
        memory.set_config(config);
        Fixture { memory, general }
    }

    fn request<'a>(platforms: &'a str, name: &'a [&'a str]) -> CreateRequest<'a> {
        CreateRequest {
            actor: ACTOR,
            platforms,
            category: "general",
            name,
        }
    }

    fn config(f: &Fixture) -> GuildConfig {
        f.memory.config().unwrap()
    }

    #[tokio::test]
    async fn test_creates_named_channel_with_owner_overwrite() {
        let f = fixture();
        let report = SquadronCreator::default()
            .create(f.memory.as_ref(), GUILD, &config(&f), request("PSpc", &["Iron", "Wolves"]))
            .await
            .unwrap();

        assert_eq!(report.channel.name, "iron-wolves-pcps");
        assert_eq!(report.category.id, f.general);
        assert!(!report.created_category);

        let created = f.memory.channel(report.channel.id).unwrap();
        assert_eq!(created.parent_id, Some(f.general));
        assert_eq!(
            created.overwrites[0],
            PermissionOverwrite::member(ACTOR, GuildPermissions::SQUADRON_OWNER)
        );
        assert_eq!(created.overwrites.len(), 2);
    }

    #[tokio::test]
    async fn test_category_is_sorted_after_creation() {
        let f = fixture();
        f.memory.add_channel(f.general, "zulu-pc");
        f.memory.add_channel(f.general, "mike-pc");

        SquadronCreator::default()
            .create(f.memory.as_ref(), GUILD, &config(&f), request("pc", &["alpha"]))
            .await
            .unwrap();

        assert_eq!(
            f.memory.child_names(f.general),
            vec!["alpha-pc", "mike-pc", "zulu-pc"]
        );
    }

    #[tokio::test]
    async fn test_unknown_platform_rejected() {
        let f = fixture();
        let err = SquadronCreator::default()
            .create(f.memory.as_ref(), GUILD, &config(&f), request("pcxb", &["alpha"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SquadronError::Precondition(_)));
        assert_eq!(f.memory.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_channel_rejected() {
        let f = fixture();
        f.memory.add_channel(f.general, "alpha-pc");
        let err = SquadronCreator::default()
            .create(f.memory.as_ref(), GUILD, &config(&f), request("pc", &["Alpha"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SquadronError::Precondition(_)));
        assert_eq!(f.memory.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_category_rejected() {
        let f = fixture();
        f.memory.add_category("Raid Squadrons");
        let mut req = request("pc", &["alpha"]);
        req.category = "raid";

        let err = SquadronCreator::default()
            .create(f.memory.as_ref(), GUILD, &config(&f), req)
            .await
            .unwrap_err();
        assert!(matches!(err, SquadronError::Precondition(_)));
        assert_eq!(f.memory.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_setup_rejected() {
        let f = fixture();
        let mut bare = config(&f);
        bare.squadron_platforms.clear();

        let err = SquadronCreator::default()
            .create(f.memory.as_ref(), GUILD, &bare, request("pc", &["alpha"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SquadronError::Precondition(ref m) if m.contains("platforms")));
    }

    #[tokio::test]
    async fn test_full_category_overflows_and_returns_intent() {
        let f = fixture();
        f.memory.fill_category(f.general, 50);

        let report = SquadronCreator::default()
            .create(f.memory.as_ref(), GUILD, &config(&f), request("pc", &["alpha"]))
            .await
            .unwrap();

        assert!(report.created_category);
        assert_eq!(report.category.name, "General Squadrons 2");
        assert_eq!(report.channel.parent_id, Some(report.category.id));
        assert_eq!(
            report.intent,
            Some(ConfigIntent::AddSquadronCategory(report.category.id))
        );
        // Registration is left to the caller.
        assert!(!config(&f).is_squadron_category(report.category.id));
        // Overflow copies the base overwrites; the channel carries them too.
        assert_eq!(report.category.overwrites.len(), 1);
        assert_eq!(report.channel.overwrites.len(), 2);
    }

    #[tokio::test]
    async fn test_existing_category_returns_no_intent() {
        let f = fixture();
        let report = SquadronCreator::default()
            .create(f.memory.as_ref(), GUILD, &config(&f), request("pc", &["alpha"]))
            .await
            .unwrap();
        assert_eq!(report.intent, None);
    }

    #[tokio::test]
    async fn test_creation_failure_surfaces_upstream() {
        let f = fixture();
        f.memory.fail(FailPoint::CreateChannel);
        let err = SquadronCreator::default()
            .create(f.memory.as_ref(), GUILD, &config(&f), request("pc", &["alpha"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SquadronError::Upstream(_)));
    }
}
