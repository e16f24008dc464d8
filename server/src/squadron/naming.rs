//! Channel and category name rules.
//!
//! Squadron channels carry informal state as leading marker glyphs. Sorting
//! and lookups compare names with those markers removed.

/// Leading glyph on a squadron that completed its event.
pub const COMPLETED_MARKER: char = '✅';

/// Leading glyph on a premium (pinned) squadron.
pub const PREMIUM_MARKER: char = '💎';

/// Name without a leading completed marker, or `None` when there is none.
#[must_use]
pub fn strip_completed(name: &str) -> Option<&str> {
    name.strip_prefix(COMPLETED_MARKER)
}

/// Comparison key used for ordering channels inside a category.
///
/// Strips the completed marker, then the premium marker, then lowercases.
#[must_use]
pub fn sort_key(name: &str) -> String {
    let name = name.strip_prefix(COMPLETED_MARKER).unwrap_or(name);
    let name = name.strip_prefix(PREMIUM_MARKER).unwrap_or(name);
    name.to_lowercase()
}

/// Key used to find a channel by the name a user typed.
///
/// Only the premium marker is ignored; a completed channel must be named
/// with its marker.
#[must_use]
pub fn lookup_key(name: &str) -> String {
    name.strip_prefix(PREMIUM_MARKER)
        .unwrap_or(name)
        .to_lowercase()
}

/// Split a platform argument into consecutive two-character codes.
///
/// `"pcps"` yields `["pc", "ps"]`; an odd trailing character forms its own
/// code. Codes are lowercased.
#[must_use]
pub fn split_platforms(arg: &str) -> Vec<String> {
    let chars: Vec<char> = arg.to_lowercase().chars().collect();
    chars.chunks(2).map(|c| c.iter().collect()).collect()
}

/// Channel name for a new squadron.
///
/// Name words are joined with `-`, platform codes are sorted and
/// concatenated: `["My", "Squad"]` + `["ps", "pc"]` is `my-squad-pcps`.
#[must_use]
pub fn squadron_channel_name(words: &[&str], platforms: &[String]) -> String {
    let mut platforms: Vec<String> = platforms.iter().map(|p| p.to_lowercase()).collect();
    platforms.sort();
    format!("{}-{}", words.join("-").to_lowercase(), platforms.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_strips_markers_in_order() {
        assert_eq!(sort_key("✅Charlie"), "charlie");
        assert_eq!(sort_key("💎Delta"), "delta");
        assert_eq!(sort_key("✅💎Echo"), "echo");
        // Premium before completed is not a recognised prefix order.
        assert_eq!(sort_key("💎✅Foxtrot"), "✅foxtrot");
        assert_eq!(sort_key("Bravo"), "bravo");
    }

    #[test]
    fn test_lookup_key_ignores_premium_only() {
        assert_eq!(lookup_key("💎Alpha-PC"), "alpha-pc");
        assert_eq!(lookup_key("✅alpha-pc"), "✅alpha-pc");
    }

    #[test]
    fn test_strip_completed() {
        assert_eq!(strip_completed("✅alpha"), Some("alpha"));
        assert_eq!(strip_completed("alpha✅"), None);
    }

    #[test]
    fn test_split_platforms() {
        assert_eq!(split_platforms("pcps"), vec!["pc", "ps"]);
        assert_eq!(split_platforms("PCx"), vec!["pc", "x"]);
        assert!(split_platforms("").is_empty());
    }

    #[test]
    fn test_squadron_channel_name_sorts_platforms() {
        let platforms = vec!["xb".to_string(), "PC".to_string()];
        assert_eq!(
            squadron_channel_name(&["Iron", "Wolves"], &platforms),
            "iron-wolves-pcxb"
        );
    }
}
