//! Access checker policies.
//!
//! Each checker owns one [`AccessTag`] and grants it when the actor holds one
//! of the roles configured for that tag. Checkers are stateless; the resolver
//! orders them by priority once at startup.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use srcbot_common::RoleId;

use crate::directory::{GuildConfig, Member};

/// Permission-capability label requested by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessTag {
    /// Configured bot administrators.
    Admin,
    /// Configured moderators.
    Mod,
    /// Configured squadron leaders.
    SquadronLeader,
    /// Pseudo-tag: members holding a forbidden role are refused outright.
    Forbidden,
}

impl fmt::Display for AccessTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Mod => "mod",
            Self::SquadronLeader => "squadron-leader",
            Self::Forbidden => "forbidden",
        })
    }
}

/// A policy in the access chain.
pub trait AccessChecker: Send + Sync {
    /// Evaluation order; lower runs first.
    fn priority(&self) -> i32;

    /// The tag this checker can grant.
    fn tag(&self) -> AccessTag;

    /// Whether `member` is granted this checker's tag under `config`.
    fn has(&self, member: &Member, config: &GuildConfig) -> bool;
}

/// Grants a tag to holders of any role in one of the configured role sets.
pub struct RoleChecker {
    tag: AccessTag,
    priority: i32,
    roles: fn(&GuildConfig) -> &BTreeSet<RoleId>,
}

impl RoleChecker {
    /// Bot administrators (`admin_role_ids`), priority 1.
    #[must_use]
    pub fn admin() -> Self {
        Self {
            tag: AccessTag::Admin,
            priority: 1,
            roles: |c| &c.admin_role_ids,
        }
    }

    /// Moderators (`mod_role_ids`), priority 2.
    #[must_use]
    pub fn moderator() -> Self {
        Self {
            tag: AccessTag::Mod,
            priority: 2,
            roles: |c| &c.mod_role_ids,
        }
    }

    /// Squadron leaders (`squadron_leader_role_ids`), priority 3.
    #[must_use]
    pub fn squadron_leader() -> Self {
        Self {
            tag: AccessTag::SquadronLeader,
            priority: 3,
            roles: |c| &c.squadron_leader_role_ids,
        }
    }
}

impl AccessChecker for RoleChecker {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn tag(&self) -> AccessTag {
        self.tag
    }

    fn has(&self, member: &Member, config: &GuildConfig) -> bool {
        member.has_any_role((self.roles)(config))
    }
}
