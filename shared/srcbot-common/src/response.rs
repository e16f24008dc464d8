//! Canned command responses.
//!
//! Every command outcome is reported as exactly one of these kinds; the relay
//! renders [`Response::text`] back into the chat.

use serde::{Deserialize, Serialize};

/// Closed set of command outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// The command completed.
    Success,
    /// A required argument was missing.
    NoParams,
    /// More arguments were given than the command accepts.
    TooManyParams,
    /// The sub-command token is unknown.
    NotACommand,
    /// The caller is not allowed to run the command.
    InsufficientPerms,
    /// The guild has no stored configuration yet.
    GuildNotSetup,
    /// A referenced id or name does not resolve.
    IdNotFound,
    /// The command failed.
    Fail,
}

impl Response {
    /// User-facing text for this response.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Success => "Your request was successfully completed.",
            Self::NoParams => "You have not provided all the parameters this command needs.",
            Self::TooManyParams => "You have provided more parameters than this command accepts.",
            Self::NotACommand => "That is not a valid command.",
            Self::InsufficientPerms => "You don't have the permissions to run this command.",
            Self::GuildNotSetup => "This server has not been set up yet.",
            Self::IdNotFound => "The id or name you provided could not be found.",
            Self::Fail => "Your request could not be completed.",
        }
    }

    /// Whether this response reports a completed command.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}
