//! Permission system types and utilities.
//!
//! Two layers:
//! - Guild permissions: Discord's built-in capability bits
//! - Access checkers: bot-level tags granted by configured roles

pub mod checkers;
pub mod guild;
pub mod resolver;

pub use checkers::{AccessChecker, AccessTag, RoleChecker};
pub use guild::GuildPermissions;
pub use resolver::{compute_guild_permissions, AccessRequest, AccessResolver};
