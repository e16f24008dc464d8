//! `setup`: create the guild's empty configuration.

use tracing::info;

use super::{Arity, CommandContext, CommandReply, Requirement};
use crate::permissions::AccessTag;
use crate::squadron::SquadronError;

const REQUIREMENT: Requirement = Requirement {
    tags: &[AccessTag::Admin, AccessTag::Forbidden],
    allow_admin: true,
    arity: Arity::Exactly(0),
};

/// Run `setup`. Needs no existing configuration.
pub async fn run(ctx: CommandContext<'_>, args: &[&str]) -> CommandReply {
    if let Err(reply) = ctx.authorize("setup", REQUIREMENT, args).await {
        return reply;
    }

    match ctx.dirs.config.create_guild_config(ctx.guild_id).await {
        Ok(true) => {
            info!(guild_id = %ctx.guild_id, "Guild configuration created");
            CommandReply::success()
        }
        Ok(false) => CommandReply::failure(
            "setup",
            &SquadronError::Precondition("This server is already set up".into()),
        ),
        Err(e) => CommandReply::failure("setup", &SquadronError::from(e)),
    }
}
