//! Configuration list sub-commands: `add|a`, `remove|r` and `list|l` for the
//! role lists, squadron categories and squadron platforms.

use srcbot_common::{ChannelId, Response, RoleId};

use super::{Arity, CommandContext, CommandReply, Requirement};
use crate::directory::{ConfigIntent, GuildConfig, RoleList};
use crate::permissions::AccessTag;
use crate::squadron::SquadronError;

const ADMIN_ONLY: &[AccessTag] = &[AccessTag::Admin, AccessTag::Forbidden];

const MISSING: &str = "Does not exist in Discord. Please delete this from SRCBot";

/// A configured list a command family edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigList {
    Roles(RoleList),
    SquadronCategories,
    Platforms,
}

impl ConfigList {
    /// Short call word, used in log fields.
    #[must_use]
    pub const fn call(self) -> &'static str {
        match self {
            Self::Roles(RoleList::Admin) => "arl",
            Self::Roles(RoleList::Forbidden) => "frl",
            Self::Roles(RoleList::Mod) => "mrl",
            Self::Roles(RoleList::SquadronLeader) => "sqlr",
            Self::SquadronCategories => "sqcat",
            Self::Platforms => "sqpl",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Roles(list) => list.label(),
            Self::SquadronCategories => "squadron categories",
            Self::Platforms => "squadron platforms",
        }
    }

    /// Headline of a `list` reply.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Roles(RoleList::Admin) => "Admin Roles",
            Self::Roles(RoleList::Forbidden) => "Forbidden Roles",
            Self::Roles(RoleList::Mod) => "Mod Roles",
            Self::Roles(RoleList::SquadronLeader) => "Squadron Leader Roles",
            Self::SquadronCategories => "Squadron Categories",
            Self::Platforms => "Squadron Platforms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListCommand {
    Add,
    Remove,
    List,
}

impl ListCommand {
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "add" | "a" => Some(Self::Add),
            "remove" | "r" => Some(Self::Remove),
            "list" | "l" => Some(Self::List),
            _ => None,
        }
    }

    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::List => "list",
        }
    }

    #[must_use]
    pub const fn requirement(self) -> Requirement {
        Requirement {
            tags: ADMIN_ONLY,
            allow_admin: true,
            arity: match self {
                Self::Add | Self::Remove => Arity::Exactly(1),
                Self::List => Arity::Exactly(0),
            },
        }
    }
}

fn parse_role(raw: &str) -> Result<RoleId, SquadronError> {
    raw.parse()
        .map_err(|_| SquadronError::NotFound(format!("role {raw}")))
}

fn parse_category(raw: &str) -> Result<ChannelId, SquadronError> {
    raw.parse()
        .map_err(|_| SquadronError::NotFound(format!("category {raw}")))
}

/// A platform code is two ASCII letters or digits, stored lowercase.
fn parse_platform(raw: &str) -> Result<String, SquadronError> {
    if raw.len() == 2 && raw.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(raw.to_ascii_lowercase())
    } else {
        Err(SquadronError::InvalidArgument(format!(
            "'{raw}' is not a two character platform code"
        )))
    }
}

/// Run one sub-command against `list`.
pub async fn run(
    ctx: CommandContext<'_>,
    list: ConfigList,
    token: &str,
    args: &[&str],
) -> CommandReply {
    let Some(command) = ListCommand::parse(token) else {
        return CommandReply::canned(Response::NotACommand);
    };
    let name = format!("{} {}", list.call(), command.verb());

    let config = match ctx.prepare(&name, command.requirement(), args).await {
        Ok(config) => config,
        Err(reply) => return reply,
    };

    let result = match command {
        ListCommand::Add => add(ctx, list, args[0]).await,
        ListCommand::Remove => remove(ctx, list, args[0]).await,
        ListCommand::List => show(ctx, list, &config).await,
    };

    result.unwrap_or_else(|e| CommandReply::failure(&name, &e))
}

async fn add(ctx: CommandContext<'_>, list: ConfigList, raw: &str) -> Result<CommandReply, SquadronError> {
    let intent = match list {
        ConfigList::Roles(roles) => {
            let role_id = parse_role(raw)?;
            let known = ctx.dirs.members.list_roles(ctx.guild_id).await?;
            if !known.iter().any(|r| r.id == role_id) {
                return Err(SquadronError::NotFound(format!("role {role_id}")));
            }
            ConfigIntent::AddRole(roles, role_id)
        }
        ConfigList::SquadronCategories => {
            let category_id = parse_category(raw)?;
            let known = ctx.dirs.channels.list_categories(ctx.guild_id).await?;
            if !known.iter().any(|c| c.id == category_id) {
                return Err(SquadronError::NotFound(format!("category {category_id}")));
            }
            ConfigIntent::AddSquadronCategory(category_id)
        }
        ConfigList::Platforms => ConfigIntent::AddPlatform(parse_platform(raw)?),
    };

    ctx.dirs.config.apply(ctx.guild_id, intent).await?;
    Ok(CommandReply::success())
}

async fn remove(
    ctx: CommandContext<'_>,
    list: ConfigList,
    raw: &str,
) -> Result<CommandReply, SquadronError> {
    let intent = match list {
        ConfigList::Roles(roles) => ConfigIntent::RemoveRole(roles, parse_role(raw)?),
        ConfigList::SquadronCategories => {
            ConfigIntent::RemoveSquadronCategory(parse_category(raw)?)
        }
        ConfigList::Platforms => ConfigIntent::RemovePlatform(parse_platform(raw)?),
    };

    ctx.dirs.config.apply(ctx.guild_id, intent).await?;
    Ok(CommandReply::success())
}

async fn show(
    ctx: CommandContext<'_>,
    list: ConfigList,
    config: &GuildConfig,
) -> Result<CommandReply, SquadronError> {
    let lines: Vec<String> = match list {
        ConfigList::Roles(roles) => {
            let ids = config.role_ids(roles);
            if ids.is_empty() {
                Vec::new()
            } else {
                let known = ctx.dirs.members.list_roles(ctx.guild_id).await?;
                ids.into_iter()
                    .map(|id| match known.iter().find(|r| r.id == id) {
                        Some(role) => format!("{id} - @{}", role.name),
                        None => format!("{id} - {MISSING}"),
                    })
                    .collect()
            }
        }
        ConfigList::SquadronCategories => {
            let ids = &config.squadron_channel_category_ids;
            if ids.is_empty() {
                Vec::new()
            } else {
                let known = ctx.dirs.channels.list_categories(ctx.guild_id).await?;
                ids.iter()
                    .map(|id| match known.iter().find(|c| c.id == *id) {
                        Some(category) => format!("{id} - {}", category.name),
                        None => format!("{id} - {MISSING}"),
                    })
                    .collect()
            }
        }
        ConfigList::Platforms => config.squadron_platforms.iter().cloned().collect(),
    };

    if lines.is_empty() {
        return Err(SquadronError::Precondition(format!(
            "You don't have any {} set up",
            list.label()
        )));
    }
    Ok(CommandReply::listing(list.title(), lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_and_arity() {
        assert_eq!(ListCommand::parse("A"), Some(ListCommand::Add));
        assert_eq!(ListCommand::parse("r"), Some(ListCommand::Remove));
        assert_eq!(ListCommand::parse("l"), Some(ListCommand::List));
        assert_eq!(ListCommand::parse("purge"), None);
        assert_eq!(ListCommand::List.requirement().arity, Arity::Exactly(0));
        assert!(ListCommand::Add.requirement().allow_admin);
    }

    #[test]
    fn test_unparsable_ids_are_not_found() {
        assert!(matches!(parse_role("abc"), Err(SquadronError::NotFound(_))));
        assert_eq!(parse_role("42").unwrap(), RoleId(42));
        assert!(matches!(parse_category("-1"), Err(SquadronError::NotFound(_))));
        assert_eq!(parse_category("7").unwrap(), ChannelId(7));
    }

    #[test]
    fn test_platform_codes() {
        assert_eq!(parse_platform("PC").unwrap(), "pc");
        assert_eq!(parse_platform("x1").unwrap(), "x1");
        assert!(matches!(
            parse_platform("pcps"),
            Err(SquadronError::InvalidArgument(_))
        ));
        assert!(parse_platform("p").is_err());
        assert!(parse_platform("p-").is_err());
    }

    #[test]
    fn test_labels_and_titles() {
        assert_eq!(ConfigList::Roles(RoleList::Mod).label(), "mod roles");
        assert_eq!(ConfigList::Roles(RoleList::Mod).title(), "Mod Roles");
        assert_eq!(ConfigList::SquadronCategories.call(), "sqcat");
        assert_eq!(ConfigList::Platforms.label(), "squadron platforms");
    }
}
