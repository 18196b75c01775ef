//! Per-path method table.
//!
//! [`MethodRouter`] holds one binding per concrete [`HttpMethod`] plus an
//! optional "any method" binding registered through [`HttpMethod::All`].

use crate::method::HttpMethod;

/// Maps HTTP methods to bindings for a single path.
///
/// # Example
///
/// ```rust
/// use hodos_router::{HttpMethod, MethodRouter};
///
/// let mut table = MethodRouter::new();
/// table.set(HttpMethod::Get, "list").unwrap();
/// table.set(HttpMethod::All, "fallback").unwrap();
///
/// assert_eq!(table.lookup(HttpMethod::Get), Some(&"list"));
/// assert_eq!(table.lookup(HttpMethod::Delete), Some(&"fallback"));
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    slots: [Option<T>; 7],
    any: Option<T>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None, None, None, None],
            any: None,
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty method table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to `method`.
    ///
    /// An occupied slot is never overwritten: the rejected value is handed
    /// back in `Err`.
    pub fn set(&mut self, method: HttpMethod, value: T) -> Result<(), T> {
        let slot = match method.slot() {
            Some(index) => &mut self.slots[index],
            None => &mut self.any,
        };
        if slot.is_some() {
            return Err(value);
        }
        *slot = Some(value);
        Ok(())
    }

    /// Returns the binding registered for exactly `method`.
    #[must_use]
    pub fn get(&self, method: HttpMethod) -> Option<&T> {
        match method.slot() {
            Some(index) => self.slots[index].as_ref(),
            None => self.any.as_ref(),
        }
    }

    /// Resolves the binding that serves `method`.
    ///
    /// Exact bindings win over the "any" binding. `HEAD` falls back to the
    /// `GET` binding before the "any" binding is consulted.
    #[must_use]
    pub fn lookup(&self, method: HttpMethod) -> Option<&T> {
        if let Some(found) = self.get(method) {
            return Some(found);
        }
        if method == HttpMethod::Head {
            if let Some(found) = self.get(HttpMethod::Get) {
                return Some(found);
            }
        }
        self.any.as_ref()
    }

    /// Returns true if any method is bound.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        self.any.is_some() || self.slots.iter().any(Option::is_some)
    }

    /// Returns the methods this path answers, for `Allow` headers.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<HttpMethod> {
        if self.any.is_some() {
            return HttpMethod::CONCRETE.to_vec();
        }
        let mut methods: Vec<HttpMethod> = HttpMethod::CONCRETE
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.is_some())
            .map(|(method, _)| *method)
            .collect();
        if self.get(HttpMethod::Get).is_some() && self.get(HttpMethod::Head).is_none() {
            methods.push(HttpMethod::Head);
        }
        methods
    }

    /// Renders [`Self::allowed_methods`] as an `Allow` header value.
    #[must_use]
    pub fn allow_header(&self) -> String {
        let mut methods = self.allowed_methods();
        if !methods.contains(&HttpMethod::Options) {
            methods.push(HttpMethod::Options);
        }
        methods
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_router_new() {
        let table: MethodRouter<u8> = MethodRouter::new();
        assert!(!table.has_any_method());
        assert!(table.allowed_methods().is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut table = MethodRouter::new();
        table.set(HttpMethod::Post, 1).unwrap();
        assert_eq!(table.get(HttpMethod::Post), Some(&1));
        assert_eq!(table.get(HttpMethod::Get), None);
    }

    #[test]
    fn test_set_does_not_overwrite() {
        let mut table = MethodRouter::new();
        table.set(HttpMethod::Get, "first").unwrap();
        assert_eq!(table.set(HttpMethod::Get, "second"), Err("second"));
        assert_eq!(table.get(HttpMethod::Get), Some(&"first"));
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let mut table = MethodRouter::new();
        table.set(HttpMethod::Get, "get").unwrap();
        assert_eq!(table.lookup(HttpMethod::Head), Some(&"get"));
        assert_eq!(table.lookup(HttpMethod::Post), None);
    }

    #[test]
    fn test_any_binding_is_fallback() {
        let mut table = MethodRouter::new();
        table.set(HttpMethod::All, "any").unwrap();
        table.set(HttpMethod::Delete, "delete").unwrap();
        assert_eq!(table.lookup(HttpMethod::Delete), Some(&"delete"));
        assert_eq!(table.lookup(HttpMethod::Patch), Some(&"any"));
        assert_eq!(table.allowed_methods().len(), 7);
    }

    #[test]
    fn test_allow_header() {
        let mut table = MethodRouter::new();
        table.set(HttpMethod::Get, ()).unwrap();
        table.set(HttpMethod::Post, ()).unwrap();
        assert_eq!(table.allow_header(), "GET, POST, HEAD, OPTIONS");
    }
}
