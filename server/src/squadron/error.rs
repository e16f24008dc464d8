//! Squadron Error Types

use srcbot_common::Response;

use crate::directory::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum SquadronError {
    #[error("Access denied")]
    AccessDenied,

    #[error("Guild has no configuration")]
    GuildNotSetup,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("{0}")]
    Precondition(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl SquadronError {
    /// The canned response this error is reported as.
    #[must_use]
    pub const fn response(&self) -> Response {
        match self {
            Self::AccessDenied => Response::InsufficientPerms,
            Self::GuildNotSetup => Response::GuildNotSetup,
            Self::NotFound(_) => Response::IdNotFound,
            Self::InvalidTarget(_)
            | Self::Precondition(_)
            | Self::InvalidArgument(_)
            | Self::Upstream(_) => Response::Fail,
        }
    }

    /// Extra line shown under the canned response, if any.
    ///
    /// Upstream details stay in the logs.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::InvalidTarget(reason) | Self::Precondition(reason) | Self::InvalidArgument(reason) => {
                Some(reason.clone())
            }
            Self::AccessDenied | Self::GuildNotSetup | Self::NotFound(_) | Self::Upstream(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_maps_to_one_response() {
        assert_eq!(SquadronError::AccessDenied.response(), Response::InsufficientPerms);
        assert_eq!(SquadronError::GuildNotSetup.response(), Response::GuildNotSetup);
        assert_eq!(
            SquadronError::NotFound("category".into()).response(),
            Response::IdNotFound
        );
        assert_eq!(
            SquadronError::InvalidTarget("x".into()).response(),
            Response::Fail
        );
        assert_eq!(
            SquadronError::Upstream(UpstreamError::Unavailable("config store")).response(),
            Response::Fail
        );
    }

    #[test]
    fn test_upstream_detail_is_hidden() {
        let err = SquadronError::Upstream(UpstreamError::Api {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(err.detail(), None);

        let err = SquadronError::Precondition("Platform doesn't exist".into());
        assert_eq!(err.detail().as_deref(), Some("Platform doesn't exist"));
    }
}
