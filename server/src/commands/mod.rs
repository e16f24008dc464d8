//! Chat Command Layer
//!
//! Parses a relayed chat command, checks access and arity, loads the guild
//! configuration and runs the matching squadron or configuration operation.
//!
//! Every outcome is a [`CommandReply`] carrying one canned [`Response`].

pub mod config_lists;
pub mod setup;
pub mod squadron_channels;

use serde::Serialize;
use srcbot_common::{GuildId, Response, UserId};
use tracing::{error, warn};

pub use config_lists::ConfigList;

use crate::directory::{Directories, GuildConfig, RoleList};
use crate::permissions::{AccessRequest, AccessResolver, AccessTag};
use crate::squadron::{SquadronEngine, SquadronError};

/// Reply sent back to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct CommandReply {
    #[schema(value_type = String)]
    pub response: Response,
    /// Headline text.
    pub message: String,
    /// Detail lines (sampled squadrons, role listings, failure reasons).
    pub lines: Vec<String>,
}

impl CommandReply {
    /// A reply carrying only the canned text of `response`.
    #[must_use]
    pub fn canned(response: Response) -> Self {
        Self {
            response,
            message: response.text().to_string(),
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn success() -> Self {
        Self::canned(Response::Success)
    }

    /// A successful reply with a custom headline and detail lines.
    #[must_use]
    pub fn listing(message: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            response: Response::Success,
            message: message.into(),
            lines,
        }
    }

    /// Report a failed operation, logging upstream failures.
    #[must_use]
    pub fn failure(command: &str, err: &SquadronError) -> Self {
        if let SquadronError::Upstream(e) = err {
            error!(command, error = %e, "Command failed on an upstream call");
        }
        let mut reply = Self::canned(err.response());
        reply.lines.extend(err.detail());
        reply
    }
}

/// Accepted argument count after the sub-command token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    /// The rejection for `count` arguments, if any.
    #[must_use]
    pub const fn check(self, count: usize) -> Option<Response> {
        match self {
            Self::Exactly(n) | Self::AtLeast(n) if count < n => Some(Response::NoParams),
            Self::Exactly(n) if count > n => Some(Response::TooManyParams),
            _ => None,
        }
    }
}

/// Access and arity requirements of one sub-command.
#[derive(Debug, Clone, Copy)]
pub struct Requirement {
    pub tags: &'static [AccessTag],
    pub allow_admin: bool,
    pub arity: Arity,
}

/// Everything a command handler needs for one invocation.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub dirs: &'a Directories,
    pub resolver: &'a AccessResolver,
    pub engine: &'a SquadronEngine,
    pub guild_id: GuildId,
    pub actor: UserId,
}

impl CommandContext<'_> {
    /// Check access, then arity. On rejection returns the reply to send.
    pub async fn authorize(
        &self,
        command: &str,
        requirement: Requirement,
        args: &[&str],
    ) -> Result<(), CommandReply> {
        let request = AccessRequest {
            guild_id: self.guild_id,
            actor: self.actor,
            tags: requirement.tags,
            allow_admin: requirement.allow_admin,
            default: false,
        };
        if !self.resolver.resolve(self.dirs, &request).await {
            return Err(CommandReply::failure(command, &SquadronError::AccessDenied));
        }

        match requirement.arity.check(args.len()) {
            Some(rejection) => Err(CommandReply::canned(rejection)),
            None => Ok(()),
        }
    }

    /// [`authorize`](Self::authorize), then load the guild configuration.
    pub async fn prepare(
        &self,
        command: &str,
        requirement: Requirement,
        args: &[&str],
    ) -> Result<GuildConfig, CommandReply> {
        self.authorize(command, requirement, args).await?;

        match self.dirs.config.get_guild_config(self.guild_id).await {
            Ok(Some(config)) => Ok(config),
            Ok(None) => Err(CommandReply::failure(command, &SquadronError::GuildNotSetup)),
            Err(e) => Err(CommandReply::failure(command, &SquadronError::from(e))),
        }
    }
}

/// Command word that selects a command family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallWord {
    Setup,
    SquadronChannels,
    Config(ConfigList),
}

impl CallWord {
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let list = match token.to_lowercase().as_str() {
            "setup" => return Some(Self::Setup),
            "squadchannels" | "sqch" => return Some(Self::SquadronChannels),
            "adminroles" | "arl" => ConfigList::Roles(RoleList::Admin),
            "forbiddenroles" | "frl" => ConfigList::Roles(RoleList::Forbidden),
            "modroles" | "mrl" => ConfigList::Roles(RoleList::Mod),
            "squadleaderroles" | "sqlr" => ConfigList::Roles(RoleList::SquadronLeader),
            "squadcategories" | "sqcat" => ConfigList::SquadronCategories,
            "squadplatforms" | "sqpl" => ConfigList::Platforms,
            _ => return None,
        };
        Some(Self::Config(list))
    }
}

/// The content does not start with a known call word.
#[derive(Debug, thiserror::Error)]
#[error("Unknown command: {0}")]
pub struct UnknownCommand(pub String);

/// Run a relayed command line such as `sqch sort all`.
#[tracing::instrument(skip(ctx), fields(guild_id = %ctx.guild_id, actor = %ctx.actor))]
pub async fn dispatch(ctx: CommandContext<'_>, content: &str) -> Result<CommandReply, UnknownCommand> {
    let mut tokens = content.split_whitespace();
    let word = tokens.next().unwrap_or_default();
    let Some(call) = CallWord::parse(word) else {
        warn!(word, "Unknown call word");
        return Err(UnknownCommand(word.to_string()));
    };

    let args: Vec<&str> = tokens.collect();
    let reply = match (call, args.split_first()) {
        (CallWord::Setup, _) => setup::run(ctx, &args).await,
        (_, None) => CommandReply::canned(Response::NoParams),
        (CallWord::SquadronChannels, Some((sub, rest))) => {
            squadron_channels::run(ctx, sub, rest).await
        }
        (CallWord::Config(list), Some((sub, rest))) => {
            config_lists::run(ctx, list, sub, rest).await
        }
    };
    Ok(reply)
}
