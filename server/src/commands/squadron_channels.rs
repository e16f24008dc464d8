//! `squadchannels` (`sqch`) sub-commands.

use srcbot_common::Response;

use super::{Arity, CommandContext, CommandReply, Requirement};
use crate::directory::GuildConfig;
use crate::permissions::AccessTag;
use crate::squadron::sampler::describe;
use crate::squadron::{CategorySelector, CreateRequest, SquadronError};

const ADMIN_ONLY: &[AccessTag] = &[AccessTag::Admin, AccessTag::Forbidden];
const MODERATORS: &[AccessTag] = &[AccessTag::Admin, AccessTag::Mod, AccessTag::Forbidden];
const LEADERS: &[AccessTag] = &[
    AccessTag::Admin,
    AccessTag::Mod,
    AccessTag::SquadronLeader,
    AccessTag::Forbidden,
];

/// Sub-command token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquadronCommand {
    Random,
    Create,
    Sort,
    RemoveTicks,
    Archive,
}

impl SquadronCommand {
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "random" | "rnd" => Some(Self::Random),
            "create" => Some(Self::Create),
            "sort" => Some(Self::Sort),
            "removeticks" | "rt" => Some(Self::RemoveTicks),
            "archive" | "ar" => Some(Self::Archive),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Random => "sqch random",
            Self::Create => "sqch create",
            Self::Sort => "sqch sort",
            Self::RemoveTicks => "sqch removeticks",
            Self::Archive => "sqch archive",
        }
    }

    #[must_use]
    pub const fn requirement(self) -> Requirement {
        match self {
            Self::Random => Requirement {
                tags: ADMIN_ONLY,
                allow_admin: true,
                arity: Arity::Exactly(2),
            },
            Self::Create => Requirement {
                tags: LEADERS,
                allow_admin: false,
                arity: Arity::AtLeast(3),
            },
            Self::Sort | Self::Archive => Requirement {
                tags: MODERATORS,
                allow_admin: false,
                arity: Arity::Exactly(1),
            },
            Self::RemoveTicks => Requirement {
                tags: MODERATORS,
                allow_admin: false,
                arity: Arity::Exactly(0),
            },
        }
    }
}

/// Run one `sqch` sub-command.
pub async fn run(ctx: CommandContext<'_>, token: &str, args: &[&str]) -> CommandReply {
    let Some(command) = SquadronCommand::parse(token) else {
        return CommandReply::canned(Response::NotACommand);
    };

    let config = match ctx.prepare(command.name(), command.requirement(), args).await {
        Ok(config) => config,
        Err(reply) => return reply,
    };

    let result = match command {
        SquadronCommand::Random => random(ctx, &config, args[0], args[1]).await,
        SquadronCommand::Create => create(ctx, &config, args).await,
        SquadronCommand::Sort => sort(ctx, &config, args[0]).await,
        SquadronCommand::RemoveTicks => ctx
            .engine
            .ticks
            .remove_ticks(ctx.dirs.channels.as_ref(), ctx.guild_id, &config)
            .await
            .map(|_| CommandReply::success()),
        SquadronCommand::Archive => ctx
            .engine
            .archiver
            .archive(ctx.dirs, ctx.guild_id, args[0], &config)
            .await
            .map(|_| CommandReply::success()),
    };

    result.unwrap_or_else(|e| CommandReply::failure(command.name(), &e))
}

async fn random(
    ctx: CommandContext<'_>,
    config: &GuildConfig,
    count: &str,
    selector: &str,
) -> Result<CommandReply, SquadronError> {
    let n: usize = count.parse().map_err(|_| {
        SquadronError::InvalidArgument(format!("'{count}' is not a number of squadrons"))
    })?;
    let channels = ctx.dirs.channels.as_ref();
    let categories = CategorySelector::parse(selector)
        .resolve(channels, ctx.guild_id, config, &ctx.engine.allocator)
        .await?;
    let picked = ctx
        .engine
        .sampler
        .sample(channels, ctx.guild_id, &categories, n)
        .await?;
    Ok(CommandReply::listing(
        "Selected Squadrons",
        picked.iter().map(describe).collect(),
    ))
}

async fn create(
    ctx: CommandContext<'_>,
    config: &GuildConfig,
    args: &[&str],
) -> Result<CommandReply, SquadronError> {
    let request = CreateRequest {
        actor: ctx.actor,
        platforms: args[0],
        category: args[1],
        name: &args[2..],
    };
    let report = ctx
        .engine
        .creator
        .create(ctx.dirs.channels.as_ref(), ctx.guild_id, config, request)
        .await?;
    if let Some(intent) = report.intent.clone() {
        ctx.dirs.config.apply(ctx.guild_id, intent).await?;
    }

    let mut reply = CommandReply::success();
    reply.lines.push(describe(&report.channel));
    Ok(reply)
}

async fn sort(
    ctx: CommandContext<'_>,
    config: &GuildConfig,
    selector: &str,
) -> Result<CommandReply, SquadronError> {
    let channels = ctx.dirs.channels.as_ref();
    let categories = CategorySelector::parse(selector)
        .resolve(channels, ctx.guild_id, config, &ctx.engine.allocator)
        .await?;
    ctx.engine
        .sorter
        .sort(channels, ctx.guild_id, &categories)
        .await?;
    Ok(CommandReply::success())
}
