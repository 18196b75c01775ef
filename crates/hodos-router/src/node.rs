//! Radix tree node implementation.
//!
//! Each node represents one path segment. Static children are kept sorted for
//! binary search; parameter children are tried in insertion order; a wildcard
//! child swallows the rest of the path.

use crate::method_router::MethodRouter;
use crate::params::Params;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g. `users`)
    Static,
    /// Named parameter, written `:id` or `{id}`
    Param(String),
    /// Catch-all wildcard, written `*path`
    Wildcard(String),
}

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment
    pub kind: SegmentKind,

    /// Method table if a route ends at this node
    pub methods: Option<MethodRouter<T>>,

    static_children: Vec<Node<T>>,
    param_children: Vec<Node<T>>,
    wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn with_kind(segment: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            segment: segment.into(),
            kind,
            methods: None,
            static_children: Vec::new(),
            param_children: Vec::new(),
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind("", SegmentKind::Static)
    }

    /// Splits a path pattern into typed segments.
    ///
    /// Fails if a wildcard is not the final segment.
    pub fn parse_path(path: &str) -> Result<Vec<(String, SegmentKind)>, String> {
        let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());
        for (index, s) in raw.iter().enumerate() {
            let kind = if let Some(name) = s.strip_prefix(':') {
                SegmentKind::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                SegmentKind::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('*') {
                if index + 1 != raw.len() {
                    return Err(format!("wildcard `{s}` must be the last segment"));
                }
                SegmentKind::Wildcard(name.to_string())
            } else {
                SegmentKind::Static
            };
            if matches!(&kind, SegmentKind::Param(n) if n.is_empty()) {
                return Err(format!("parameter segment `{s}` has no name"));
            }
            segments.push(((*s).to_string(), kind));
        }
        Ok(segments)
    }

    /// Returns the node for `segments`, creating intermediate nodes.
    pub fn descend(&mut self, segments: &[(String, SegmentKind)]) -> &mut Node<T> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return self;
        };

        let child = match kind {
            SegmentKind::Static => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children
                            .insert(index, Node::with_kind(segment.clone(), SegmentKind::Static));
                        index
                    }
                };
                &mut self.static_children[index]
            }
            SegmentKind::Param(_) => {
                let index = match self.param_children.iter().position(|c| c.kind == *kind) {
                    Some(index) => index,
                    None => {
                        self.param_children
                            .push(Node::with_kind(segment.clone(), kind.clone()));
                        self.param_children.len() - 1
                    }
                };
                &mut self.param_children[index]
            }
            SegmentKind::Wildcard(_) => &mut **self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Node::with_kind(segment.clone(), kind.clone()))),
        };
        child.descend(remaining)
    }

    /// Matches a concrete path against the tree.
    ///
    /// Returns the method table and captured parameters of the best match.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<&'a MethodRouter<T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        // Static segments take priority over parameters.
        if let Ok(index) = self
            .static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
        {
            if let Some(found) = self.static_children[index].match_segments(remaining, params) {
                return Some(found);
            }
        }

        for child in &self.param_children {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.clone(), *segment);
                if let Some(found) = child.match_segments(remaining, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let (SegmentKind::Wildcard(name), Some(methods)) = (&child.kind, &child.methods) {
                params.push(name.clone(), segments.join("/"));
                return Some(methods);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::HttpMethod;

    fn insert(root: &mut Node<&'static str>, path: &str, method: HttpMethod, op: &'static str) {
        let segments = Node::<&str>::parse_path(path).unwrap();
        let node = root.descend(&segments);
        node.methods
            .get_or_insert_with(MethodRouter::new)
            .set(method, op)
            .unwrap();
    }

    #[test]
    fn test_parse_path_accepts_both_param_styles() {
        let segments = Node::<()>::parse_path("/users/:id/posts/{postId}").unwrap();
        assert_eq!(segments[1].1, SegmentKind::Param("id".into()));
        assert_eq!(segments[3].1, SegmentKind::Param("postId".into()));
    }

    #[test]
    fn test_parse_path_rejects_inner_wildcard() {
        assert!(Node::<()>::parse_path("/files/*rest/more").is_err());
        assert!(Node::<()>::parse_path("/users/:").is_err());
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        insert(&mut root, "/users/me", HttpMethod::Get, "me");
        insert(&mut root, "/users/:id", HttpMethod::Get, "byId");

        let (methods, params) = root.match_path("/users/me").unwrap();
        assert_eq!(methods.get(HttpMethod::Get), Some(&"me"));
        assert!(params.is_empty());

        let (methods, params) = root.match_path("/users/42").unwrap();
        assert_eq!(methods.get(HttpMethod::Get), Some(&"byId"));
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn test_distinct_param_names_backtrack() {
        let mut root = Node::root();
        insert(&mut root, "/items/:id", HttpMethod::Get, "item");
        insert(&mut root, "/items/:slug/reviews", HttpMethod::Get, "reviews");

        let (methods, params) = root.match_path("/items/abc/reviews").unwrap();
        assert_eq!(methods.get(HttpMethod::Get), Some(&"reviews"));
        assert_eq!(params.get("slug"), Some("abc"));
        assert_eq!(params.get("id"), None);
    }

    #[test]
    fn test_wildcard_captures_rest() {
        let mut root = Node::root();
        insert(&mut root, "/files/*path", HttpMethod::Get, "file");

        let (_, params) = root.match_path("/files/images/logo.png").unwrap();
        assert_eq!(params.get("path"), Some("images/logo.png"));
    }

    #[test]
    fn test_root_and_trailing_slash() {
        let mut root = Node::root();
        insert(&mut root, "/", HttpMethod::Get, "index");
        insert(&mut root, "/users", HttpMethod::Get, "users");

        assert!(root.match_path("/").is_some());
        assert!(root.match_path("/users/").is_some());
        assert!(root.match_path("/posts").is_none());
    }
}
