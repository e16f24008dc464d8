//! Discord snowflake identifiers.
//!
//! Snowflakes are 64-bit integers that Discord transmits as decimal strings.
//! Each entity kind gets its own newtype so a role id can never be passed
//! where a channel id is expected.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when a string is not a valid snowflake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid snowflake id: {0:?}")]
pub struct ParseIdError(pub String);

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw integer value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Reinterpret as the signed value stored in `BIGINT` columns.
            #[must_use]
            pub const fn to_db(self) -> i64 {
                self.0 as i64
            }

            /// Rebuild from a `BIGINT` column value.
            #[must_use]
            pub const fn from_db(value: i64) -> Self {
                Self(value as u64)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| ParseIdError(s.to_string()))
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(SnowflakeVisitor).map(Self)
            }
        }
    };
}

struct SnowflakeVisitor;

impl Visitor<'_> for SnowflakeVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a snowflake as a decimal string or integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::custom(format!("negative snowflake: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        v.parse::<u64>()
            .map_err(|_| E::custom(format!("invalid snowflake: {v:?}")))
    }
}

snowflake!(
    /// A guild (server).
    GuildId
);
snowflake!(
    /// A channel or channel category.
    ChannelId
);
snowflake!(
    /// A guild role.
    RoleId
);
snowflake!(
    /// A user or guild member.
    UserId
);
