//! Path grammar for addressing nodes in the value tree.
//!
//! Paths are JSON-Pointer-flavoured: `/a/b/c`, root is `/`, `~1` escapes `/`
//! and `~0` escapes `~`. A trailing `*` token marks a wildcard, which is only
//! meaningful for `view`/`hide` operations and must never be stored in state.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static INTEGER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());

/// A normalized path into the value tree, stored as its token sequence.
///
/// `Path::root()` has zero tokens. Equality and hashing are by token
/// sequence, so two differently-escaped inputs that normalize to the same
/// tokens compare equal.
///
/// Serializes as its wire string (`"/a/b/c"`), not its token vector — this
/// is what lets `Path` double as a `BTreeMap` key in structures persisted
/// as JSON (a JSON object key must be a string, not an array).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    tokens: Vec<String>,
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let path = Path::parse(&raw);
        if path.has_trailing_wildcard() {
            return Err(D::Error::custom("a stored path must not carry a trailing wildcard"));
        }
        Ok(path)
    }
}

impl Path {
    /// The implicit root container of top-level fields.
    pub fn root() -> Self {
        Path { tokens: Vec::new() }
    }

    /// Parse and normalize a wire-format path string.
    ///
    /// Trims whitespace, treats an empty string or `/` as root, collapses
    /// runs of `/`, and drops a trailing `/` unless the path is root.
    pub fn parse(raw: &str) -> Path {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Path::root();
        }
        let tokens = split(trimmed);
        Path { tokens }
    }

    /// Build a path directly from already-unescaped tokens.
    pub fn from_tokens(tokens: Vec<String>) -> Path {
        Path { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True iff the last token is the literal wildcard `*`.
    pub fn has_trailing_wildcard(&self) -> bool {
        matches!(self.tokens.last(), Some(t) if t == "*")
    }

    /// The path with a trailing wildcard token removed, if present.
    pub fn without_trailing_wildcard(&self) -> Path {
        if self.has_trailing_wildcard() {
            Path {
                tokens: self.tokens[..self.tokens.len() - 1].to_vec(),
            }
        } else {
            self.clone()
        }
    }

    /// The parent path, derived by dropping the last token. Root's parent is
    /// root; no parent pointers are ever stored.
    pub fn parent(&self) -> Path {
        if self.tokens.is_empty() {
            Path::root()
        } else {
            Path {
                tokens: self.tokens[..self.tokens.len() - 1].to_vec(),
            }
        }
    }

    /// The final token, if any.
    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(|s| s.as_str())
    }

    /// Append a single token, returning a new path.
    pub fn child(&self, token: impl Into<String>) -> Path {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Path { tokens }
    }

    /// True iff `self` is `other` or a descendant of `other`.
    pub fn is_self_or_descendant_of(&self, other: &Path) -> bool {
        if self.tokens.len() < other.tokens.len() {
            return false;
        }
        self.tokens[..other.tokens.len()] == other.tokens[..]
    }

    /// Serialize back to wire format.
    pub fn to_wire(&self) -> String {
        join(&self.tokens)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Path::parse(raw)
    }
}

impl From<String> for Path {
    fn from(raw: String) -> Self {
        Path::parse(&raw)
    }
}

/// Split a trimmed, non-root path string into unescaped tokens.
fn split(trimmed: &str) -> Vec<String> {
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
    // Collapse runs of '/' and drop a trailing '/'.
    body.split('/')
        .filter(|segment| !segment.is_empty())
        .map(unescape_token)
        .collect()
}

fn unescape_token(token: &str) -> String {
    if !token.contains('~') {
        return token.to_string();
    }
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.peek() {
                Some('1') => {
                    out.push('/');
                    chars.next();
                }
                Some('0') => {
                    out.push('~');
                    chars.next();
                }
                _ => out.push('~'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Join tokens back into wire format. Inverse of `split`.
pub fn join(tokens: &[String]) -> String {
    if tokens.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for token in tokens {
        out.push('/');
        out.push_str(&escape_token(token));
    }
    out
}

/// True iff `token` denotes a (possibly negative) integer array index.
pub fn is_integer_token(token: &str) -> bool {
    INTEGER_TOKEN.is_match(token)
}

/// Parse a token as a non-negative array index.
pub fn as_array_index(token: &str) -> Option<usize> {
    if !is_integer_token(token) {
        return None;
    }
    token.parse::<i64>().ok().and_then(|n| {
        if n < 0 {
            None
        } else {
            Some(n as usize)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_slash_are_root() {
        assert!(Path::parse("").is_root());
        assert!(Path::parse("/").is_root());
        assert!(Path::parse("   ").is_root());
    }

    #[test]
    fn collapses_runs_and_trailing_slash() {
        let p = Path::parse("/a//b///c/");
        assert_eq!(p.tokens(), &["a", "b", "c"]);
    }

    #[test]
    fn escape_round_trip() {
        let raw = "/a~1b/c~0d";
        let p = Path::parse(raw);
        assert_eq!(p.tokens(), &["a/b", "c~d"]);
        assert_eq!(p.to_wire(), raw);
    }

    #[test]
    fn trailing_wildcard_detection() {
        let p = Path::parse("/todos/*");
        assert!(p.has_trailing_wildcard());
        assert_eq!(p.without_trailing_wildcard().tokens(), &["todos"]);

        let q = Path::parse("/todos/0");
        assert!(!q.has_trailing_wildcard());
    }

    #[test]
    fn integer_token_detection() {
        assert!(is_integer_token("0"));
        assert!(is_integer_token("42"));
        assert!(is_integer_token("-1"));
        assert!(!is_integer_token("01a"));
        assert!(!is_integer_token(""));
        assert_eq!(as_array_index("-1"), None);
        assert_eq!(as_array_index("3"), Some(3));
    }

    #[test]
    fn serializes_as_wire_string_not_token_array() {
        let p = Path::parse("/a~1b/c");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"/a~1b/c\"");
        let round_tripped: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(p, round_tripped);
    }

    #[test]
    fn descendant_check() {
        let base = Path::parse("/todos");
        assert!(Path::parse("/todos").is_self_or_descendant_of(&base));
        assert!(Path::parse("/todos/0").is_self_or_descendant_of(&base));
        assert!(!Path::parse("/todo").is_self_or_descendant_of(&base));
        assert!(!Path::parse("/").is_self_or_descendant_of(&base));
    }

    proptest::proptest! {
        #[test]
        fn join_split_round_trip(tokens in proptest::collection::vec("[a-zA-Z0-9_]{1,8}", 0..6)) {
            let wire = join(&tokens);
            let parsed = Path::parse(&wire);
            proptest::prop_assert_eq!(parsed.tokens(), tokens.as_slice());
        }
    }
}
