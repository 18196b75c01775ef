//! Captured path parameters.

use smallvec::SmallVec;

/// One `:name` or `*name` capture.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Capture {
    name: String,
    value: String,
}

/// Path parameters captured by a match, in the order they appear in the
/// pattern. Up to four captures live inline.
///
/// ```rust
/// use hodos_router::Params;
///
/// let mut params = Params::new();
/// params.push("userId", "123");
///
/// assert_eq!(params.get("userId"), Some("123"));
/// assert_eq!(params.get("postId"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    captures: SmallVec<[Capture; 4]>,
}

impl Params {
    /// No captures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a capture.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.captures.push(Capture {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find_map(|c| (c.name == name).then_some(c.value.as_str()))
    }

    /// True for static routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.captures
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_str()))
    }

    // Backtracking out of a dynamic segment drops what it captured.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.captures.truncate(len);
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_keeps_pattern_order() {
        let params: Params = [("org", "hodos"), ("repo", "router")].into_iter().collect();
        assert_eq!(params.get("repo"), Some("router"));
        assert_eq!(
            params.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            ["org", "repo"]
        );
    }

    #[test]
    fn test_backtracking_truncates() {
        let mut params = Params::new();
        params.push("slug", "abc");
        params.push("id", "reviews");
        params.truncate(1);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn test_more_than_inline_capacity() {
        let params: Params = (0..6).map(|i| (format!("p{i}"), i.to_string())).collect();
        assert_eq!(params.len(), 6);
        assert_eq!(params.get("p5"), Some("5"));
    }
}
