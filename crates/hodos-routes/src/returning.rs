//! Response projection.
//!
//! A [`Returning`] tree describes which parts of an action's JSON result
//! become the response body. It is built from a JSON description:
//!
//! - `true` keeps the value as is, `false` drops it
//! - an object picks the listed keys and projects each one recursively
//! - an array of strings picks those keys
//! - a one-element array holding a spec applies that spec to each element
//!
//! Keys absent from the value are omitted, arrays are projected element-wise,
//! and scalars (including `null`) pass through unchanged.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;

/// Rejected projection description.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid returning spec at `{path}`: {reason}")]
pub struct ReturningError {
    path: String,
    reason: &'static str,
}

/// A response projection tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Returning {
    /// Keep the value unchanged
    Keep,
    /// Drop the value
    Omit,
    /// Keep only the named keys
    Pick(Vec<String>),
    /// Keep the named keys, each projected by its own spec
    Fields(IndexMap<String, Returning>),
    /// Project every element of an array with the inner spec
    Each(Box<Returning>),
}

impl Returning {
    /// Parses a projection from its JSON description.
    pub fn from_value(spec: &Value) -> Result<Self, ReturningError> {
        parse(spec, "$")
    }

    /// Builds a [`Returning::Fields`] projection.
    pub fn fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, Returning)>) -> Self {
        Self::Fields(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a [`Returning::Pick`] projection.
    pub fn pick<K: Into<String>>(keys: impl IntoIterator<Item = K>) -> Self {
        Self::Pick(keys.into_iter().map(Into::into).collect())
    }

    /// Projects `value`. `None` means the value is dropped entirely.
    #[must_use]
    pub fn apply(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::Omit, _) => None,
            (Self::Keep, v) => Some(v.clone()),
            (spec, Value::Array(items)) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| spec.element(item).unwrap_or(Value::Null))
                    .collect(),
            )),
            (Self::Each(inner), v) => inner.apply(v),
            (Self::Pick(keys), Value::Object(map)) => Some(Value::Object(
                keys.iter()
                    .filter_map(|k| map.get(k).map(|v| (k.clone(), v.clone())))
                    .collect(),
            )),
            (Self::Fields(fields), Value::Object(map)) => {
                let mut out = Map::new();
                for (key, spec) in fields {
                    if let Some(projected) = map.get(key).and_then(|v| spec.apply(v)) {
                        out.insert(key.clone(), projected);
                    }
                }
                Some(Value::Object(out))
            }
            (_, scalar) => Some(scalar.clone()),
        }
    }

    fn element(&self, item: &Value) -> Option<Value> {
        match self {
            Self::Each(inner) => inner.apply(item),
            other => other.apply(item),
        }
    }
}

impl TryFrom<Value> for Returning {
    type Error = ReturningError;

    fn try_from(spec: Value) -> Result<Self, Self::Error> {
        Self::from_value(&spec)
    }
}

fn parse(spec: &Value, path: &str) -> Result<Returning, ReturningError> {
    match spec {
        Value::Bool(true) => Ok(Returning::Keep),
        Value::Bool(false) => Ok(Returning::Omit),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| Ok((k.clone(), parse(v, &format!("{path}.{k}"))?)))
            .collect::<Result<IndexMap<_, _>, _>>()
            .map(Returning::Fields),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_string) => Ok(
            Returning::Pick(items.iter().filter_map(Value::as_str).map(str::to_string).collect()),
        ),
        Value::Array(items) if items.len() == 1 => {
            Ok(Returning::Each(Box::new(parse(&items[0], &format!("{path}[0]"))?)))
        }
        Value::Array(_) => Err(ReturningError {
            path: path.to_string(),
            reason: "arrays must hold key names or exactly one element spec",
        }),
        _ => Err(ReturningError {
            path: path.to_string(),
            reason: "expected true, false, an object or an array",
        }),
    }
}
