//! Key Pattern Module
//!
//! Minimal glob language used for pattern invalidation.
//!
//! - `user_accounts:*` matches every key starting with `user_accounts:`
//! - `user_account:42` (no wildcard) matches that key only
//! - `*` elsewhere matches any run of characters, e.g. `user_*:all`

use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

// == Key Pattern ==
/// A parsed invalidation pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    /// No wildcard: matches one key
    Exact(String),
    /// Single trailing `*`: matches every key with this prefix
    Prefix(String),
    /// Wildcards in other positions: literal segments between `*`s
    Glob(Vec<String>),
}

impl KeyPattern {
    // == Parse ==
    /// Parses a pattern string.
    ///
    /// Returns `CacheError::InvalidPattern` for an empty pattern.
    pub fn parse(pattern: &str) -> Result<Self, CacheError> {
        if pattern.is_empty() {
            return Err(CacheError::InvalidPattern(
                "pattern cannot be empty".to_string(),
            ));
        }

        match pattern.find('*') {
            None => Ok(KeyPattern::Exact(pattern.to_string())),
            Some(idx) if idx == pattern.len() - 1 => {
                Ok(KeyPattern::Prefix(pattern[..idx].to_string()))
            }
            Some(_) => Ok(KeyPattern::Glob(
                pattern.split('*').map(str::to_string).collect(),
            )),
        }
    }

    /// Shorthand for a prefix pattern.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        KeyPattern::Prefix(prefix.into())
    }

    // == Matches ==
    /// Returns true if `key` is covered by this pattern.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Exact(exact) => key == exact,
            KeyPattern::Prefix(prefix) => key.starts_with(prefix.as_str()),
            KeyPattern::Glob(segments) => glob_matches(segments, key),
        }
    }

    // == Redis Glob ==
    /// Renders the pattern in redis `SCAN MATCH` syntax.
    ///
    /// Literal segments are escaped so that `?`, `[`, `]` and `\` in keys are
    /// not interpreted by redis.
    pub fn to_redis_glob(&self) -> String {
        match self {
            KeyPattern::Exact(exact) => escape_redis(exact),
            KeyPattern::Prefix(prefix) => format!("{}*", escape_redis(prefix)),
            KeyPattern::Glob(segments) => segments
                .iter()
                .map(|s| escape_redis(s))
                .collect::<Vec<_>>()
                .join("*"),
        }
    }
}

impl FromStr for KeyPattern {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyPattern::parse(s)
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPattern::Exact(exact) => write!(f, "{}", exact),
            KeyPattern::Prefix(prefix) => write!(f, "{}*", prefix),
            KeyPattern::Glob(segments) => write!(f, "{}", segments.join("*")),
        }
    }
}

// == Utility Functions ==
/// Matches `key` against literal segments separated by wildcards.
///
/// The first segment anchors the start, the last anchors the end, and the
/// middle ones must appear in order without overlapping.
fn glob_matches(segments: &[String], key: &str) -> bool {
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return true,
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return key == first,
    };

    if !key.starts_with(first.as_str()) {
        return false;
    }
    let mut remaining = &key[first.len()..];

    for segment in middle {
        match remaining.find(segment.as_str()) {
            Some(pos) => remaining = &remaining[pos + segment.len()..],
            None => return false,
        }
    }

    remaining.ends_with(last.as_str())
}

fn escape_redis(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trailing_wildcard_is_prefix() {
        let pattern = KeyPattern::parse("user_accounts:*").unwrap();
        assert_eq!(pattern, KeyPattern::Prefix("user_accounts:".to_string()));
    }

    #[test]
    fn test_parse_without_wildcard_is_exact() {
        let pattern = KeyPattern::parse("user_account:42").unwrap();
        assert_eq!(pattern, KeyPattern::Exact("user_account:42".to_string()));
        assert!(pattern.matches("user_account:42"));
        assert!(!pattern.matches("user_account:420"));
    }

    #[test]
    fn test_parse_empty_pattern_fails() {
        assert!(matches!(
            KeyPattern::parse(""),
            Err(CacheError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_prefix_pattern_scopes_to_family() {
        let pattern: KeyPattern = "user_accounts:*".parse().unwrap();

        assert!(pattern.matches("user_accounts:all"));
        assert!(pattern.matches("user_accounts:list:1:10:updatedAt:desc"));
        assert!(!pattern.matches("user_account:abc"));
    }

    #[test]
    fn test_lone_wildcard_matches_everything() {
        let pattern = KeyPattern::parse("*").unwrap();
        assert!(pattern.matches(""));
        assert!(pattern.matches("anything:at:all"));
    }

    #[test]
    fn test_glob_with_inner_wildcard() {
        let pattern = KeyPattern::parse("user_*:all").unwrap();

        assert!(pattern.matches("user_accounts:all"));
        assert!(pattern.matches("user_roles:all"));
        assert!(!pattern.matches("user_accounts:list"));
        assert!(!pattern.matches("group_accounts:all"));
    }

    #[test]
    fn test_glob_segments_do_not_overlap() {
        let pattern = KeyPattern::parse("ab*ba").unwrap();

        assert!(pattern.matches("abba"));
        assert!(pattern.matches("ab-ba"));
        assert!(!pattern.matches("aba"));
    }

    #[test]
    fn test_redis_glob_escapes_literals() {
        let pattern = KeyPattern::parse("odd[key]?:*").unwrap();
        assert_eq!(pattern.to_redis_glob(), r"odd\[key\]\?:*");

        let glob = KeyPattern::parse("user_*:all").unwrap();
        assert_eq!(glob.to_redis_glob(), "user_*:all");
    }

    #[test]
    fn test_display_round_trips_source() {
        for source in ["user_accounts:*", "user_account:1", "a*b*c"] {
            assert_eq!(KeyPattern::parse(source).unwrap().to_string(), source);
        }
    }
}
