//! Guild-level permissions using bitflags.
//!
//! Bit positions follow Discord's permission integer so values read from the
//! REST API (decimal strings) map one-to-one onto these flags. Only the bits
//! the bot inspects or grants are named; everything else is truncated.

use bitflags::bitflags;

bitflags! {
    /// Guild permissions represented as a 64-bit bitfield.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct GuildPermissions: u64 {
        /// Permission to create invite links
        const CREATE_INSTANT_INVITE = 1 << 0;
        /// Permission to kick members from the guild
        const KICK_MEMBERS          = 1 << 1;
        /// Permission to ban members from the guild
        const BAN_MEMBERS           = 1 << 2;
        /// Built-in administrator capability; implies every other permission
        const ADMINISTRATOR         = 1 << 3;
        /// Permission to create, edit, move and delete channels
        const MANAGE_CHANNELS       = 1 << 4;
        /// Permission to modify guild settings
        const MANAGE_GUILD          = 1 << 5;
        /// Permission to add reactions to messages
        const ADD_REACTIONS         = 1 << 6;
        /// Permission to view a channel and read its message history
        const VIEW_CHANNEL          = 1 << 10;
        /// Permission to send text messages in channels
        const SEND_MESSAGES         = 1 << 11;
        /// Permission to delete messages from other members
        const MANAGE_MESSAGES       = 1 << 13;
        /// Permission to embed links in messages
        const EMBED_LINKS           = 1 << 14;
        /// Permission to create, edit, and delete roles
        const MANAGE_ROLES          = 1 << 28;
    }
}

impl GuildPermissions {
    /// Permissions granted on a squadron channel to the member who created it.
    pub const SQUADRON_OWNER: Self = Self::MANAGE_CHANNELS.union(Self::MANAGE_MESSAGES);

    /// Parse the decimal string form used by the Discord API.
    ///
    /// Unknown bits are dropped; an unparsable value yields no permissions.
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        value
            .parse::<u64>()
            .map(Self::from_bits_truncate)
            .unwrap_or_default()
    }

    /// Decimal string form used by the Discord API.
    #[must_use]
    pub fn to_wire(self) -> String {
        self.bits().to_string()
    }

    /// Check if this permission set includes the specified permission(s).
    ///
    /// # Examples
    ///
    /// ```
    /// use srcbot_server::permissions::GuildPermissions;
    ///
    /// let perms = GuildPermissions::MANAGE_CHANNELS | GuildPermissions::SEND_MESSAGES;
    /// assert!(perms.has(GuildPermissions::MANAGE_CHANNELS));
    /// assert!(!perms.has(GuildPermissions::ADMINISTRATOR));
    /// ```
    #[must_use]
    pub const fn has(self, permission: Self) -> bool {
        self.contains(permission)
    }

    /// Whether this set carries the built-in administrator capability.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        self.contains(Self::ADMINISTRATOR)
    }
}

impl Default for GuildPermissions {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discord_bit_positions() {
        assert_eq!(GuildPermissions::ADMINISTRATOR.bits(), 0x8);
        assert_eq!(GuildPermissions::MANAGE_CHANNELS.bits(), 0x10);
        assert_eq!(GuildPermissions::MANAGE_MESSAGES.bits(), 0x2000);
        assert_eq!(GuildPermissions::MANAGE_ROLES.bits(), 0x1000_0000);
    }

    #[test]
    fn test_from_wire_truncates_unknown_bits() {
        // 0x10 | 0x400000000 (a bit we do not name)
        let perms = GuildPermissions::from_wire("17179869200");
        assert_eq!(perms, GuildPermissions::MANAGE_CHANNELS);
    }

    #[test]
    fn test_from_wire_garbage_is_empty() {
        assert!(GuildPermissions::from_wire("not-a-number").is_empty());
        assert!(GuildPermissions::from_wire("").is_empty());
    }

    #[test]
    fn test_wire_roundtrip() {
        let perms = GuildPermissions::SQUADRON_OWNER;
        assert_eq!(perms.to_wire(), "8208");
        assert_eq!(GuildPermissions::from_wire(&perms.to_wire()), perms);
    }

    #[test]
    fn test_squadron_owner_grants_channel_management() {
        assert!(GuildPermissions::SQUADRON_OWNER.has(GuildPermissions::MANAGE_CHANNELS));
        assert!(GuildPermissions::SQUADRON_OWNER.has(GuildPermissions::MANAGE_MESSAGES));
        assert!(!GuildPermissions::SQUADRON_OWNER.is_admin());
    }
}
