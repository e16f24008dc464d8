//! Membership directory over Discord REST.
//!
//! Guild-level permissions are derived from the guild owner, the `@everyone`
//! role (whose id equals the guild id) and the member's roles.

use async_trait::async_trait;
use srcbot_common::{GuildId, RoleId, UserId};
use tracing::debug;

use super::models::{WireGuild, WireMember, WireRole};
use super::{is_not_found, DiscordClient};
use crate::directory::{Member, MembershipDirectory, Role, UpstreamError};
use crate::permissions::{compute_guild_permissions, GuildPermissions};

/// Owner and roles of a guild, used to resolve member permissions.
struct PermissionContext {
    owner_id: UserId,
    everyone: GuildPermissions,
    roles: Vec<Role>,
}

impl PermissionContext {
    fn new(guild: WireGuild) -> Self {
        let roles: Vec<Role> = guild.roles.into_iter().map(Role::from).collect();
        let everyone = roles
            .iter()
            .find(|r| r.id == RoleId(guild.id.get()))
            .map(|r| r.permissions)
            .unwrap_or_default();
        Self {
            owner_id: guild.owner_id,
            everyone,
            roles,
        }
    }

    fn member(&self, wire: WireMember) -> Member {
        let held: Vec<&Role> = self
            .roles
            .iter()
            .filter(|r| wire.roles.contains(&r.id))
            .collect();
        Member {
            user_id: wire.user.id,
            permissions: compute_guild_permissions(wire.user.id, self.owner_id, self.everyone, &held),
            role_ids: wire.roles.into_iter().collect(),
        }
    }
}

impl DiscordClient {
    async fn permission_context(&self, guild_id: GuildId) -> Result<PermissionContext, UpstreamError> {
        let guild: WireGuild = self.get(&format!("/guilds/{guild_id}")).await?;
        Ok(PermissionContext::new(guild))
    }
}

#[async_trait]
impl MembershipDirectory for DiscordClient {
    async fn fetch_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Member>, UpstreamError> {
        let wire: WireMember = match self
            .get(&format!("/guilds/{guild_id}/members/{user_id}"))
            .await
        {
            Ok(member) => member,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(e),
        };

        let context = self.permission_context(guild_id).await?;
        Ok(Some(context.member(wire)))
    }

    async fn fetch_all_members(&self, guild_id: GuildId) -> Result<Vec<Member>, UpstreamError> {
        let context = self.permission_context(guild_id).await?;
        let mut members = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let mut path = format!("/guilds/{guild_id}/members?limit={}", self.member_page_size);
            if let Some(after) = after {
                path.push_str(&format!("&after={after}"));
            }

            let page: Vec<WireMember> = self.get(&path).await?;
            let page_len = page.len();
            after = page.last().map(|m| m.user.id);
            members.extend(page.into_iter().map(|m| context.member(m)));

            if page_len < self.member_page_size as usize {
                break;
            }
        }

        debug!(count = members.len(), "Fetched full member list");
        Ok(members)
    }

    async fn list_roles(&self, guild_id: GuildId) -> Result<Vec<Role>, UpstreamError> {
        let roles: Vec<WireRole> = self.get(&format!("/guilds/{guild_id}/roles")).await?;
        Ok(roles.into_iter().map(Role::from).collect())
    }
}
