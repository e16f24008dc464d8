//! External collaborators.
//!
//! The squadron core reads and writes guild state only through these
//! capability traits:
//! - [`ChannelDirectory`]: categories, channels, positions, parents, names
//! - [`MembershipDirectory`]: members, roles, capabilities
//! - [`ConfigStore`]: persisted per-guild configuration
//! - [`Notifier`]: private messages to members
//!
//! Every call is an I/O suspension point and may fail with [`UpstreamError`].

pub mod memory;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use srcbot_common::{ChannelId, GuildId, UserId};
use thiserror::Error;

pub use memory::{FailPoint, MemoryDirectory};
pub use models::*;

/// A collaborator call failed.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unexpected payload: {0}")]
    Decode(String),

    #[error("{0} unavailable")]
    Unavailable(&'static str),
}

/// Read/write access to a guild's channel tree.
#[async_trait]
pub trait ChannelDirectory: Send + Sync {
    /// All categories in the guild with their current child counts.
    async fn list_categories(&self, guild_id: GuildId) -> Result<Vec<ChannelCategory>, UpstreamError>;

    /// All non-category channels in the guild.
    async fn list_channels(&self, guild_id: GuildId) -> Result<Vec<Channel>, UpstreamError>;

    /// Children of one category, ordered by position.
    async fn list_children(
        &self,
        guild_id: GuildId,
        category_id: ChannelId,
    ) -> Result<Vec<Channel>, UpstreamError> {
        let mut children: Vec<Channel> = self
            .list_channels(guild_id)
            .await?
            .into_iter()
            .filter(|c| c.parent_id == Some(category_id))
            .collect();
        children.sort_by_key(|c| (c.position, c.id));
        Ok(children)
    }

    /// First category matching `predicate`, in directory order.
    async fn find_category_by_name(
        &self,
        guild_id: GuildId,
        predicate: &(dyn for<'c> Fn(&'c ChannelCategory) -> bool + Send + Sync),
    ) -> Result<Option<ChannelCategory>, UpstreamError> {
        Ok(self
            .list_categories(guild_id)
            .await?
            .into_iter()
            .find(|c| predicate(c)))
    }

    async fn create_channel(
        &self,
        guild_id: GuildId,
        channel: NewChannel,
    ) -> Result<Channel, UpstreamError>;

    async fn create_category(
        &self,
        guild_id: GuildId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelCategory, UpstreamError>;

    /// Move a channel under `category_id`. With `inherit_permissions` false
    /// the channel keeps its own overwrites.
    async fn set_parent(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        category_id: ChannelId,
        inherit_permissions: bool,
    ) -> Result<(), UpstreamError>;

    async fn set_position(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        position: u32,
    ) -> Result<(), UpstreamError>;

    async fn rename(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        name: &str,
    ) -> Result<(), UpstreamError>;
}

/// Guild membership lookups.
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// A single member, or `None` if the user is not in the guild.
    async fn fetch_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Member>, UpstreamError>;

    async fn fetch_all_members(&self, guild_id: GuildId) -> Result<Vec<Member>, UpstreamError>;

    async fn list_roles(&self, guild_id: GuildId) -> Result<Vec<Role>, UpstreamError>;
}

/// Persisted per-guild configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_guild_config(&self, guild_id: GuildId)
        -> Result<Option<GuildConfig>, UpstreamError>;

    /// Create an empty configuration for a guild. Returns `false` if one
    /// already exists.
    async fn create_guild_config(&self, guild_id: GuildId) -> Result<bool, UpstreamError>;

    /// Persist an intent. Returns whether the stored record changed.
    async fn apply(&self, guild_id: GuildId, intent: ConfigIntent) -> Result<bool, UpstreamError>;
}

/// Private notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_direct_message(&self, user_id: UserId, text: &str) -> Result<(), UpstreamError>;
}

/// The full set of collaborators, shared across requests.
#[derive(Clone)]
pub struct Directories {
    pub channels: Arc<dyn ChannelDirectory>,
    pub members: Arc<dyn MembershipDirectory>,
    pub config: Arc<dyn ConfigStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Directories {
    /// Back every collaborator with one in-memory guild.
    #[must_use]
    pub fn in_memory(memory: Arc<MemoryDirectory>) -> Self {
        Self {
            channels: memory.clone(),
            members: memory.clone(),
            config: memory.clone(),
            notifier: memory,
        }
    }
}
