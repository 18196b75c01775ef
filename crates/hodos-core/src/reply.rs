//! Action return values.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use crate::error::RouteError;

/// What an action hands back to the dispatch wrapper.
///
/// [`Reply::Nothing`] means the action returned no value at all. It is only
/// legal when the action wrote the response body itself; returning
/// `Reply::from(false)` is the explicit "no content" answer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Reply {
    /// No value.
    #[default]
    Nothing,
    /// A JSON value.
    Json(Value),
    /// A text body.
    Text(String),
    /// A binary body.
    Binary(Bytes),
}

impl Reply {
    /// Serializes `value` into a JSON reply.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, RouteError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// The explicit empty answer; dispatch turns it into `204 No Content`.
    #[must_use]
    pub fn no_content() -> Self {
        Self::Json(Value::Bool(false))
    }

    /// Truthiness of the value: `false`, `0`, `""`, `null` and
    /// [`Reply::Nothing`] are falsy, everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nothing => false,
            Self::Json(value) => match value {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
                Value::String(s) => !s.is_empty(),
                Value::Array(_) | Value::Object(_) => true,
            },
            Self::Text(s) => !s.is_empty(),
            Self::Binary(_) => true,
        }
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Reply {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for Reply {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

impl From<i64> for Reply {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<f64> for Reply {
    fn from(value: f64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<Bytes> for Reply {
    fn from(value: Bytes) -> Self {
        Self::Binary(value)
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Self::Nothing
    }
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nothing, Into::into)
    }
}
