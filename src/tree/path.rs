//! Property tree paths.
//!
//! A [`PropPath`] is an ordered sequence of non-empty, case-sensitive ASCII
//! segments. The textual form uses `/` as the separator; parsing drops
//! empty segments, so `"/mboards/0/"` and `"mboards/0"` both canonicalize
//! to the same two-segment path and the canonical form never carries a
//! trailing separator. The root is the empty sequence.
//!
//! Paths order lexicographically segment by segment, which is the order
//! the tree map iterates in and the order `list()` reports children in.

use std::fmt;

/// Canonical, path-addressed identifier of a property node.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropPath(Vec<String>);

impl PropPath {
    /// The root path (empty segment sequence).
    pub fn root() -> Self {
        PropPath(Vec::new())
    }

    /// True when this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the path has no segments (same as [`is_root`](Self::is_root)).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The path segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Append further segments, parsed from a `/`-separated string.
    pub fn join(&self, rel: impl AsRef<str>) -> PropPath {
        let mut out = self.clone();
        out.0
            .extend(rel.as_ref().split('/').filter(|s| !s.is_empty()).map(String::from));
        out
    }

    /// Append the segments of another path.
    pub fn join_path(&self, rel: &PropPath) -> PropPath {
        let mut out = self.clone();
        out.0.extend_from_slice(&rel.0);
        out
    }

    /// True when `prefix` is equal to this path or an ancestor of it.
    pub fn starts_with(&self, prefix: &PropPath) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// The path with the leading `prefix` removed, or `None` when this
    /// path is not under `prefix`.
    pub fn strip_prefix(&self, prefix: &PropPath) -> Option<PropPath> {
        if self.starts_with(prefix) {
            Some(PropPath(self.0[prefix.0.len()..].to_vec()))
        } else {
            None
        }
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<PropPath> {
        if self.is_root() {
            None
        } else {
            Some(PropPath(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// The final segment, or `None` for the root.
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for PropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for seg in &self.0 {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

impl From<&str> for PropPath {
    fn from(s: &str) -> Self {
        PropPath::root().join(s)
    }
}

impl From<String> for PropPath {
    fn from(s: String) -> Self {
        PropPath::root().join(&s)
    }
}

impl From<&PropPath> for PropPath {
    fn from(p: &PropPath) -> Self {
        p.clone()
    }
}

impl FromIterator<String> for PropPath {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        PropPath(iter.into_iter().filter(|s| !s.is_empty()).collect())
    }
}
