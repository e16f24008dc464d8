//! `SRCBot` Common Library
//!
//! Types shared between the server and any gateway relay that forwards
//! commands to it.

pub mod ids;
pub mod response;

pub use ids::{ChannelId, GuildId, ParseIdError, RoleId, UserId};
pub use response::Response;
