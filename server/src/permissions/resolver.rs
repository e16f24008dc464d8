//! Access resolution.
//!
//! Decides whether an actor may run an operation that requires a set of
//! [`AccessTag`]s.

use srcbot_common::{GuildId, UserId};
use tracing::warn;

use super::checkers::{AccessChecker, AccessTag, RoleChecker};
use super::guild::GuildPermissions;
use crate::directory::{Directories, GuildConfig, Member, Role};

/// Compute a member's guild-level permissions.
///
/// The guild owner holds everything; everyone else holds the union of the
/// `@everyone` grants and their roles' grants.
#[must_use]
pub fn compute_guild_permissions(
    user_id: UserId,
    guild_owner_id: UserId,
    everyone_permissions: GuildPermissions,
    user_roles: &[&Role],
) -> GuildPermissions {
    if guild_owner_id == user_id {
        return GuildPermissions::all();
    }

    user_roles
        .iter()
        .fold(everyone_permissions, |perms, role| perms | role.permissions)
}

/// One access question.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub guild_id: GuildId,
    pub actor: UserId,
    /// Tags any one of which grants access.
    pub tags: &'a [AccessTag],
    /// Grant immediately when the actor holds the built-in administrator capability.
    pub allow_admin: bool,
    /// Answer when nothing grants or refuses access.
    pub default: bool,
}

impl<'a> AccessRequest<'a> {
    /// Request with `default = false` and no admin short-circuit.
    #[must_use]
    pub const fn new(guild_id: GuildId, actor: UserId, tags: &'a [AccessTag]) -> Self {
        Self {
            guild_id,
            actor,
            tags,
            allow_admin: false,
            default: false,
        }
    }

    #[must_use]
    pub const fn allow_admin(mut self) -> Self {
        self.allow_admin = true;
        self
    }
}

/// Priority-ordered chain of access checkers.
///
/// Resolution order:
/// 1. Admin short-circuit (if allowed) grants before any checker runs
/// 2. A forbidden role refuses when `forbidden` is requested
/// 3. Checkers run by ascending priority, ties in registration order;
///    the first matching tag that grants wins
/// 4. Otherwise the request's default applies
pub struct AccessResolver {
    checkers: Vec<Box<dyn AccessChecker>>,
}

impl AccessResolver {
    /// Build a resolver; checkers are ordered once here.
    #[must_use]
    pub fn new(mut checkers: Vec<Box<dyn AccessChecker>>) -> Self {
        // Stable sort keeps registration order for equal priorities.
        checkers.sort_by_key(|c| c.priority());
        Self { checkers }
    }

    /// Admin, moderator and squadron-leader checkers.
    #[must_use]
    pub fn with_default_checkers() -> Self {
        Self::new(vec![
            Box::new(RoleChecker::admin()),
            Box::new(RoleChecker::moderator()),
            Box::new(RoleChecker::squadron_leader()),
        ])
    }

    /// Tags of the registered checkers in evaluation order.
    #[must_use]
    pub fn order(&self) -> Vec<AccessTag> {
        self.checkers.iter().map(|c| c.tag()).collect()
    }

    /// Resolve a request against live guild data.
    ///
    /// The member is fetched once per resolution. Any lookup failure denies.
    #[tracing::instrument(skip(self, dirs), fields(guild_id = %request.guild_id, actor = %request.actor))]
    pub async fn resolve(&self, dirs: &Directories, request: &AccessRequest<'_>) -> bool {
        let member = match dirs
            .members
            .fetch_member(request.guild_id, request.actor)
            .await
        {
            Ok(Some(member)) => member,
            Ok(None) => {
                warn!("Actor is not a guild member, denying access");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Member lookup failed, denying access");
                return false;
            }
        };

        if request.allow_admin && member.has_capability(GuildPermissions::ADMINISTRATOR) {
            return true;
        }

        let config = match dirs.config.get_guild_config(request.guild_id).await {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Config lookup failed, denying access");
                return false;
            }
        };

        self.decide(&member, config.as_ref(), request)
    }

    /// Decide a request for an already-fetched member.
    #[must_use]
    pub fn decide(
        &self,
        member: &Member,
        config: Option<&GuildConfig>,
        request: &AccessRequest<'_>,
    ) -> bool {
        if request.allow_admin && member.has_capability(GuildPermissions::ADMINISTRATOR) {
            return true;
        }

        let Some(config) = config else {
            return request.default;
        };

        if request.tags.contains(&AccessTag::Forbidden)
            && member.has_any_role(&config.forbidden_role_ids)
        {
            return false;
        }

        self.checkers
            .iter()
            .filter(|c| request.tags.contains(&c.tag()))
            .any(|c| c.has(member, config))
            || request.default
    }
}

impl Default for AccessResolver {
    fn default() -> Self {
        Self::with_default_checkers()
    }
}
