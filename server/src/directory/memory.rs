//! In-memory guild.
//!
//! Implements every collaborator trait over a single guild held in memory.
//! Records mutations and notifications so callers can assert on them, and
//! can be told to fail specific calls.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use srcbot_common::{ChannelId, GuildId, RoleId, UserId};

use super::models::{
    Channel, ChannelCategory, ConfigIntent, GuildConfig, Member, NewChannel, PermissionOverwrite,
    Role,
};
use super::{ChannelDirectory, ConfigStore, MembershipDirectory, Notifier, UpstreamError};
use crate::permissions::GuildPermissions;

/// Calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ListChannels,
    CreateChannel,
    SetPosition,
    FetchMember,
    FetchAllMembers,
    ConfigStore,
    SendMessage,
}

#[derive(Debug, Clone)]
struct CategoryRecord {
    id: ChannelId,
    name: String,
    overwrites: Vec<PermissionOverwrite>,
}

#[derive(Debug, Default)]
struct State {
    categories: Vec<CategoryRecord>,
    channels: Vec<Channel>,
    members: Vec<Member>,
    roles: Vec<Role>,
    config: Option<GuildConfig>,
    next_id: u64,
    failures: HashSet<FailPoint>,
    /// Members visible to single fetches; the rest need a full fetch first.
    cached_only: Option<HashSet<UserId>>,
    position_updates: Vec<(ChannelId, u32)>,
    parent_moves: Vec<(ChannelId, ChannelId, bool)>,
    renames: Vec<(ChannelId, String)>,
    created_channels: Vec<ChannelId>,
    created_categories: Vec<ChannelId>,
    sent_messages: Vec<(UserId, String)>,
    member_fetches: usize,
    full_member_fetches: usize,
}

impl State {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check(&self, point: FailPoint) -> Result<(), UpstreamError> {
        if self.failures.contains(&point) {
            Err(UpstreamError::Unavailable(fail_point_name(point)))
        } else {
            Ok(())
        }
    }

    fn child_count(&self, category_id: ChannelId) -> usize {
        self.channels
            .iter()
            .filter(|c| c.parent_id == Some(category_id))
            .count()
    }

    fn category(&self, record: &CategoryRecord) -> ChannelCategory {
        ChannelCategory {
            id: record.id,
            name: record.name.clone(),
            child_count: self.child_count(record.id),
            overwrites: record.overwrites.clone(),
        }
    }

    fn next_position(&self, category_id: ChannelId) -> u32 {
        self.channels
            .iter()
            .filter(|c| c.parent_id == Some(category_id))
            .map(|c| c.position + 1)
            .max()
            .unwrap_or(0)
    }

    /// Move a channel to `rank` among its siblings and renumber them densely.
    fn move_to_rank(&mut self, channel_id: ChannelId, rank: u32) {
        let Some(parent) = self
            .channels
            .iter()
            .find(|c| c.id == channel_id)
            .map(|c| c.parent_id)
        else {
            return;
        };

        let mut siblings: Vec<(u32, ChannelId)> = self
            .channels
            .iter()
            .filter(|c| c.parent_id == parent && c.id != channel_id)
            .map(|c| (c.position, c.id))
            .collect();
        siblings.sort_unstable();
        let mut order: Vec<ChannelId> = siblings.into_iter().map(|(_, id)| id).collect();
        order.insert((rank as usize).min(order.len()), channel_id);

        for (position, id) in (0u32..).zip(order) {
            if let Some(channel) = self.channels.iter_mut().find(|c| c.id == id) {
                channel.position = position;
            }
        }
    }

    fn insert_channel(
        &mut self,
        category_id: ChannelId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Channel {
        let channel = Channel {
            id: ChannelId(self.allocate_id()),
            name: name.to_string(),
            parent_id: Some(category_id),
            position: self.next_position(category_id),
            overwrites,
        };
        self.channels.push(channel.clone());
        channel
    }
}

const fn fail_point_name(point: FailPoint) -> &'static str {
    match point {
        FailPoint::ListChannels => "channel listing",
        FailPoint::CreateChannel => "channel creation",
        FailPoint::SetPosition => "position update",
        FailPoint::FetchMember => "member fetch",
        FailPoint::FetchAllMembers => "member listing",
        FailPoint::ConfigStore => "config store",
        FailPoint::SendMessage => "direct message",
    }
}

/// A single guild held in memory.
#[derive(Debug)]
pub struct MemoryDirectory {
    guild_id: GuildId,
    state: Mutex<State>,
}

impl MemoryDirectory {
    /// Empty guild.
    #[must_use]
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
        }
    }

    /// The guild this directory models.
    #[must_use]
    pub const fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // === Seeding ===

    /// Add a category and return its id.
    pub fn add_category(&self, name: &str) -> ChannelId {
        self.add_category_with(name, Vec::new())
    }

    /// Add a category carrying permission overwrites.
    pub fn add_category_with(&self, name: &str, overwrites: Vec<PermissionOverwrite>) -> ChannelId {
        let mut state = self.lock();
        let id = ChannelId(state.allocate_id());
        state.categories.push(CategoryRecord {
            id,
            name: name.to_string(),
            overwrites,
        });
        id
    }

    /// Add a channel at the end of a category.
    pub fn add_channel(&self, category_id: ChannelId, name: &str) -> ChannelId {
        self.lock().insert_channel(category_id, name, Vec::new()).id
    }

    /// Add a channel with explicit overwrites at the end of a category.
    pub fn add_channel_with(
        &self,
        category_id: ChannelId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> ChannelId {
        self.lock().insert_channel(category_id, name, overwrites).id
    }

    /// Fill a category with `count` placeholder channels.
    pub fn fill_category(&self, category_id: ChannelId, count: usize) {
        let mut state = self.lock();
        for i in 0..count {
            state.insert_channel(category_id, &format!("filler-{i}"), Vec::new());
        }
    }

    pub fn add_member(&self, user_id: UserId, role_ids: &[RoleId], permissions: GuildPermissions) {
        self.lock().members.push(Member {
            user_id,
            role_ids: role_ids.iter().copied().collect(),
            permissions,
        });
    }

    pub fn add_role(&self, role_id: RoleId, name: &str) {
        self.lock().roles.push(Role {
            id: role_id,
            name: name.to_string(),
            permissions: GuildPermissions::empty(),
        });
    }

    pub fn set_config(&self, config: GuildConfig) {
        self.lock().config = Some(config);
    }

    /// Make a collaborator call fail until cleared.
    pub fn fail(&self, point: FailPoint) {
        self.lock().failures.insert(point);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Only these members answer single fetches until a full member fetch runs.
    pub fn limit_member_cache(&self, cached: &[UserId]) {
        self.lock().cached_only = Some(cached.iter().copied().collect());
    }

    // === Inspection ===

    #[must_use]
    pub fn channel(&self, channel_id: ChannelId) -> Option<Channel> {
        self.lock()
            .channels
            .iter()
            .find(|c| c.id == channel_id)
            .cloned()
    }

    /// Child names ordered by position.
    #[must_use]
    pub fn child_names(&self, category_id: ChannelId) -> Vec<String> {
        let state = self.lock();
        let mut children: Vec<&Channel> = state
            .channels
            .iter()
            .filter(|c| c.parent_id == Some(category_id))
            .collect();
        children.sort_by_key(|c| (c.position, c.id));
        children.into_iter().map(|c| c.name.clone()).collect()
    }

    #[must_use]
    pub fn category_named(&self, name: &str) -> Option<ChannelCategory> {
        let state = self.lock();
        state
            .categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| state.category(c))
    }

    #[must_use]
    pub fn config(&self) -> Option<GuildConfig> {
        self.lock().config.clone()
    }

    #[must_use]
    pub fn position_updates(&self) -> Vec<(ChannelId, u32)> {
        self.lock().position_updates.clone()
    }

    /// `(channel, new parent, inherit_permissions)` for every move.
    #[must_use]
    pub fn parent_moves(&self) -> Vec<(ChannelId, ChannelId, bool)> {
        self.lock().parent_moves.clone()
    }

    #[must_use]
    pub fn renames(&self) -> Vec<(ChannelId, String)> {
        self.lock().renames.clone()
    }

    #[must_use]
    pub fn created_categories(&self) -> Vec<ChannelId> {
        self.lock().created_categories.clone()
    }

    #[must_use]
    pub fn created_channels(&self) -> Vec<ChannelId> {
        self.lock().created_channels.clone()
    }

    #[must_use]
    pub fn sent_messages(&self) -> Vec<(UserId, String)> {
        self.lock().sent_messages.clone()
    }

    #[must_use]
    pub fn member_fetches(&self) -> usize {
        self.lock().member_fetches
    }

    #[must_use]
    pub fn full_member_fetches(&self) -> usize {
        self.lock().full_member_fetches
    }

    /// Total directory writes of any kind.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        let state = self.lock();
        state.position_updates.len()
            + state.parent_moves.len()
            + state.renames.len()
            + state.created_channels.len()
            + state.created_categories.len()
    }
}

#[async_trait]
impl ChannelDirectory for MemoryDirectory {
    async fn list_categories(&self, _guild_id: GuildId) -> Result<Vec<ChannelCategory>, UpstreamError> {
        let state = self.lock();
        state.check(FailPoint::ListChannels)?;
        Ok(state.categories.iter().map(|c| state.category(c)).collect())
    }

    async fn list_channels(&self, _guild_id: GuildId) -> Result<Vec<Channel>, UpstreamError> {
        let state = self.lock();
        state.check(FailPoint::ListChannels)?;
        Ok(state.channels.clone())
    }

    async fn create_channel(
        &self,
        _guild_id: GuildId,
        channel: NewChannel,
    ) -> Result<Channel, UpstreamError> {
        let mut state = self.lock();
        state.check(FailPoint::CreateChannel)?;
        let created = state.insert_channel(channel.parent_id, &channel.name, channel.overwrites);
        state.created_channels.push(created.id);
        Ok(created)
    }

    async fn create_category(
        &self,
        _guild_id: GuildId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelCategory, UpstreamError> {
        let mut state = self.lock();
        state.check(FailPoint::CreateChannel)?;
        let record = CategoryRecord {
            id: ChannelId(state.allocate_id()),
            name: name.to_string(),
            overwrites,
        };
        state.categories.push(record.clone());
        state.created_categories.push(record.id);
        Ok(state.category(&record))
    }

    async fn set_parent(
        &self,
        _guild_id: GuildId,
        channel_id: ChannelId,
        category_id: ChannelId,
        inherit_permissions: bool,
    ) -> Result<(), UpstreamError> {
        let mut state = self.lock();
        let position = state.next_position(category_id);
        let inherited = if inherit_permissions {
            state
                .categories
                .iter()
                .find(|c| c.id == category_id)
                .map(|c| c.overwrites.clone())
        } else {
            None
        };
        let channel = state
            .channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| UpstreamError::Api {
                status: 404,
                message: "Unknown Channel".into(),
            })?;
        channel.parent_id = Some(category_id);
        channel.position = position;
        if let Some(overwrites) = inherited {
            channel.overwrites = overwrites;
        }
        state
            .parent_moves
            .push((channel_id, category_id, inherit_permissions));
        Ok(())
    }

    async fn set_position(
        &self,
        _guild_id: GuildId,
        channel_id: ChannelId,
        position: u32,
    ) -> Result<(), UpstreamError> {
        let mut state = self.lock();
        state.check(FailPoint::SetPosition)?;
        state.move_to_rank(channel_id, position);
        state.position_updates.push((channel_id, position));
        Ok(())
    }

    async fn rename(
        &self,
        _guild_id: GuildId,
        channel_id: ChannelId,
        name: &str,
    ) -> Result<(), UpstreamError> {
        let mut state = self.lock();
        if let Some(channel) = state.channels.iter_mut().find(|c| c.id == channel_id) {
            channel.name = name.to_string();
        }
        state.renames.push((channel_id, name.to_string()));
        Ok(())
    }
}

#[async_trait]
impl MembershipDirectory for MemoryDirectory {
    async fn fetch_member(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Member>, UpstreamError> {
        let mut state = self.lock();
        state.member_fetches += 1;
        state.check(FailPoint::FetchMember)?;
        if let Some(cached) = &state.cached_only {
            if !cached.contains(&user_id) {
                return Ok(None);
            }
        }
        Ok(state.members.iter().find(|m| m.user_id == user_id).cloned())
    }

    async fn fetch_all_members(&self, _guild_id: GuildId) -> Result<Vec<Member>, UpstreamError> {
        let mut state = self.lock();
        state.full_member_fetches += 1;
        state.check(FailPoint::FetchAllMembers)?;
        state.cached_only = None;
        Ok(state.members.clone())
    }

    async fn list_roles(&self, _guild_id: GuildId) -> Result<Vec<Role>, UpstreamError> {
        Ok(self.lock().roles.clone())
    }
}

#[async_trait]
impl ConfigStore for MemoryDirectory {
    async fn get_guild_config(
        &self,
        _guild_id: GuildId,
    ) -> Result<Option<GuildConfig>, UpstreamError> {
        let state = self.lock();
        state.check(FailPoint::ConfigStore)?;
        Ok(state.config.clone())
    }

    async fn create_guild_config(&self, guild_id: GuildId) -> Result<bool, UpstreamError> {
        let mut state = self.lock();
        state.check(FailPoint::ConfigStore)?;
        if state.config.is_some() {
            return Ok(false);
        }
        state.config = Some(GuildConfig::new(guild_id));
        Ok(true)
    }

    async fn apply(&self, _guild_id: GuildId, intent: ConfigIntent) -> Result<bool, UpstreamError> {
        let mut state = self.lock();
        state.check(FailPoint::ConfigStore)?;
        Ok(state
            .config
            .as_mut()
            .is_some_and(|config| config.apply(&intent)))
    }
}

#[async_trait]
impl Notifier for MemoryDirectory {
    async fn send_direct_message(&self, user_id: UserId, text: &str) -> Result<(), UpstreamError> {
        let mut state = self.lock();
        state.check(FailPoint::SendMessage)?;
        state.sent_messages.push((user_id, text.to_string()));
        Ok(())
    }
}
