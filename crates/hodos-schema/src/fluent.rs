//! Code-first validator.
//!
//! A [`FluentSchema`] is assembled with builder calls instead of a JSON
//! document. Violations are path-qualified (`access.permissions[0]: expected
//! string`) so clients can tell which field failed.

use hodos_core::{Schema, ValidationError};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::SchemaError;

#[derive(Debug, Clone)]
enum Kind {
    Any,
    String,
    Integer,
    Number,
    Boolean,
    Array(Box<FluentSchema>),
    Object {
        fields: IndexMap<String, Field>,
        strict: bool,
    },
}

#[derive(Debug, Clone)]
struct Field {
    schema: FluentSchema,
    required: bool,
}

#[derive(Debug, Clone)]
enum Rule {
    MinLength(usize),
    MaxLength(usize),
    Minimum(f64),
    Maximum(f64),
    OneOf(Vec<Value>),
    Pattern(Regex),
}

/// A validator built in code.
///
/// # Example
///
/// ```
/// use hodos_core::Schema;
/// use hodos_schema::FluentSchema;
/// use serde_json::json;
///
/// let user = FluentSchema::object()
///     .field("name", FluentSchema::string().min_length(1))
///     .optional("age", FluentSchema::integer().minimum(0.0))
///     .field("tags", FluentSchema::array(FluentSchema::string()))
///     .strict();
///
/// assert!(user.validate(&json!({"name": "Ada", "tags": []})).is_ok());
///
/// let err = user.validate(&json!({"name": "", "tags": [1], "x": true})).unwrap_err();
/// assert_eq!(
///     err.message(),
///     "name: length must be at least 1, tags[0]: expected string, x: additional property not allowed"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FluentSchema {
    kind: Kind,
    nullable: bool,
    rules: Vec<Rule>,
}

impl FluentSchema {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            nullable: false,
            rules: Vec::new(),
        }
    }

    /// Accepts any value.
    #[must_use]
    pub fn any() -> Self {
        Self::of(Kind::Any)
    }

    /// Accepts strings.
    #[must_use]
    pub fn string() -> Self {
        Self::of(Kind::String)
    }

    /// Accepts integral numbers.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(Kind::Integer)
    }

    /// Accepts any number.
    #[must_use]
    pub fn number() -> Self {
        Self::of(Kind::Number)
    }

    /// Accepts booleans.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(Kind::Boolean)
    }

    /// Accepts arrays whose elements all satisfy `items`.
    #[must_use]
    pub fn array(items: FluentSchema) -> Self {
        Self::of(Kind::Array(Box::new(items)))
    }

    /// Accepts objects. Unknown keys are allowed until [`Self::strict`].
    #[must_use]
    pub fn object() -> Self {
        Self::of(Kind::Object {
            fields: IndexMap::new(),
            strict: false,
        })
    }

    fn with_field(mut self, name: &str, schema: FluentSchema, required: bool) -> Self {
        if let Kind::Object { fields, .. } = &mut self.kind {
            fields.insert(name.to_string(), Field { schema, required });
        }
        self
    }

    /// Declares a required field. Ignored on non-object schemas.
    #[must_use]
    pub fn field(self, name: &str, schema: FluentSchema) -> Self {
        self.with_field(name, schema, true)
    }

    /// Declares an optional field. Ignored on non-object schemas.
    #[must_use]
    pub fn optional(self, name: &str, schema: FluentSchema) -> Self {
        self.with_field(name, schema, false)
    }

    /// Rejects keys that were not declared.
    #[must_use]
    pub fn strict(mut self) -> Self {
        if let Kind::Object { strict, .. } = &mut self.kind {
            *strict = true;
        }
        self
    }

    /// Also accepts `null`.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Minimum string length (chars) or array length.
    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.rules.push(Rule::MinLength(min));
        self
    }

    /// Maximum string length (chars) or array length.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.rules.push(Rule::MaxLength(max));
        self
    }

    /// Inclusive lower bound for numbers.
    #[must_use]
    pub fn minimum(mut self, min: f64) -> Self {
        self.rules.push(Rule::Minimum(min));
        self
    }

    /// Inclusive upper bound for numbers.
    #[must_use]
    pub fn maximum(mut self, max: f64) -> Self {
        self.rules.push(Rule::Maximum(max));
        self
    }

    /// Restricts the value to a fixed set.
    #[must_use]
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rules
            .push(Rule::OneOf(values.into_iter().map(Into::into).collect()));
        self
    }

    /// Requires strings to match `pattern`.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|source| SchemaError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.rules.push(Rule::Pattern(regex));
        Ok(self)
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<String>) {
        if value.is_null() && self.nullable {
            return;
        }

        let type_ok = match &self.kind {
            Kind::Any => true,
            Kind::String => value.is_string(),
            Kind::Integer => value.is_i64() || value.is_u64(),
            Kind::Number => value.is_number(),
            Kind::Boolean => value.is_boolean(),
            Kind::Array(_) => value.is_array(),
            Kind::Object { .. } => value.is_object(),
        };
        if !type_ok {
            out.push(format!("{}: expected {}", label(path), self.type_name()));
            return;
        }

        for rule in &self.rules {
            if let Some(message) = rule.violation(value) {
                out.push(format!("{}: {message}", label(path)));
            }
        }

        match (&self.kind, value) {
            (Kind::Array(items), Value::Array(elements)) => {
                for (index, element) in elements.iter().enumerate() {
                    items.check(element, &format!("{path}[{index}]"), out);
                }
            }
            (Kind::Object { fields, strict }, Value::Object(map)) => {
                for (name, field) in fields {
                    let child = join(path, name);
                    match map.get(name) {
                        Some(v) => field.schema.check(v, &child, out),
                        None if field.required => out.push(format!("{child}: is required")),
                        None => {}
                    }
                }
                if *strict {
                    for key in map.keys().filter(|k| !fields.contains_key(*k)) {
                        out.push(format!("{}: additional property not allowed", join(path, key)));
                    }
                }
            }
            _ => {}
        }
    }

    fn type_name(&self) -> &'static str {
        match self.kind {
            Kind::Any => "any",
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Array(_) => "array",
            Kind::Object { .. } => "object",
        }
    }

    fn render(&self) -> Value {
        let mut doc = Map::new();
        if !matches!(self.kind, Kind::Any) {
            let type_name = self.type_name();
            doc.insert(
                "type".into(),
                if self.nullable {
                    json!([type_name, "null"])
                } else {
                    json!(type_name)
                },
            );
        }

        match &self.kind {
            Kind::Array(items) => {
                doc.insert("items".into(), items.render());
            }
            Kind::Object { fields, strict } => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.schema.render()))
                    .collect();
                let required: Vec<&String> = fields
                    .iter()
                    .filter(|(_, field)| field.required)
                    .map(|(name, _)| name)
                    .collect();
                doc.insert("properties".into(), Value::Object(properties));
                if !required.is_empty() {
                    doc.insert("required".into(), json!(required));
                }
                if *strict {
                    doc.insert("additionalProperties".into(), json!(false));
                }
            }
            _ => {}
        }

        let is_array = matches!(self.kind, Kind::Array(_));
        for rule in &self.rules {
            let (key, value) = match rule {
                Rule::MinLength(n) if is_array => ("minItems", json!(n)),
                Rule::MaxLength(n) if is_array => ("maxItems", json!(n)),
                Rule::MinLength(n) => ("minLength", json!(n)),
                Rule::MaxLength(n) => ("maxLength", json!(n)),
                Rule::Minimum(n) => ("minimum", json!(n)),
                Rule::Maximum(n) => ("maximum", json!(n)),
                Rule::OneOf(values) => ("enum", json!(values)),
                Rule::Pattern(regex) => ("pattern", json!(regex.as_str())),
            };
            doc.insert(key.into(), value);
        }
        Value::Object(doc)
    }
}

impl Rule {
    fn violation(&self, value: &Value) -> Option<String> {
        match self {
            Self::MinLength(min) => {
                length(value).filter(|len| len < min).map(|_| format!("length must be at least {min}"))
            }
            Self::MaxLength(max) => {
                length(value).filter(|len| len > max).map(|_| format!("length must be at most {max}"))
            }
            Self::Minimum(min) => value
                .as_f64()
                .filter(|n| n < min)
                .map(|_| format!("must be >= {min}")),
            Self::Maximum(max) => value
                .as_f64()
                .filter(|n| n > max)
                .map(|_| format!("must be <= {max}")),
            Self::OneOf(values) => (!values.contains(value)).then(|| {
                format!("must be one of {}", Value::Array(values.clone()))
            }),
            Self::Pattern(regex) => value
                .as_str()
                .filter(|s| !regex.is_match(s))
                .map(|_| format!("must match pattern {}", regex.as_str())),
        }
    }
}

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn label(path: &str) -> &str {
    if path.is_empty() {
        "value"
    } else {
        path
    }
}

impl Schema for FluentSchema {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        self.check(value, "", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::from_violations(violations))
        }
    }

    fn to_json_schema(&self) -> Option<Value> {
        Some(self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_root_type_mismatch() {
        let err = FluentSchema::object().validate(&json!([1])).unwrap_err();
        assert_eq!(err.message(), "value: expected object");
    }

    #[test]
    fn test_required_and_nested_paths() {
        let schema = FluentSchema::object().field(
            "access",
            FluentSchema::object().field("permissions", FluentSchema::array(FluentSchema::string())),
        );

        let err = schema
            .validate(&json!({"access": {"permissions": ["admin", 3]}}))
            .unwrap_err();
        assert_eq!(err.message(), "access.permissions[1]: expected string");

        let err = schema.validate(&json!({"access": {}})).unwrap_err();
        assert_eq!(err.message(), "access.permissions: is required");
    }

    #[test]
    fn test_strict_names_unexpected_field() {
        let schema = FluentSchema::object()
            .field("a", FluentSchema::string())
            .strict();
        let err = schema.validate(&json!({"a": "ok", "foo": 1})).unwrap_err();
        assert_eq!(err.message(), "foo: additional property not allowed");
    }

    #[test]
    fn test_nullable_and_optional() {
        let schema = FluentSchema::object()
            .field("nick", FluentSchema::string().nullable())
            .optional("bio", FluentSchema::string());
        assert!(schema.validate(&json!({"nick": null})).is_ok());
        assert!(schema.validate(&json!({"nick": null, "bio": null})).is_err());
    }

    #[test]
    fn test_rules() {
        let role = FluentSchema::string().one_of(["admin", "user"]);
        assert!(role.validate(&json!("admin")).is_ok());
        assert_eq!(
            role.validate(&json!("root")).unwrap_err().message(),
            r#"value: must be one of ["admin","user"]"#
        );

        let age = FluentSchema::integer().minimum(0.0).maximum(150.0);
        assert!(age.validate(&json!(-1)).is_err());
        assert!(age.validate(&json!(151)).is_err());
        assert!(age.validate(&json!(1.5)).is_err());

        let slug = FluentSchema::string().pattern("^[a-z-]+$").unwrap();
        assert!(slug.validate(&json!("a-b")).is_ok());
        assert!(slug.validate(&json!("A B")).is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            FluentSchema::string().pattern("("),
            Err(SchemaError::Pattern { .. })
        ));
    }

    #[test]
    fn test_renders_json_schema() {
        let schema = FluentSchema::object()
            .field("name", FluentSchema::string().min_length(1))
            .optional("tags", FluentSchema::array(FluentSchema::string()).max_length(3))
            .strict();

        assert_eq!(
            schema.to_json_schema().unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "minLength": 1 },
                    "tags": { "type": "array", "items": { "type": "string" }, "maxItems": 3 }
                },
                "required": ["name"],
                "additionalProperties": false
            })
        );
    }

    proptest! {
        #[test]
        fn strings_within_bounds_are_accepted(s in "[a-z]{2,8}") {
            let schema = FluentSchema::string().min_length(2).max_length(8);
            prop_assert!(schema.validate(&Value::String(s)).is_ok());
        }
    }
}
