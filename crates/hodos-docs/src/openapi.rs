//! OpenAPI document types and generation.
//!
//! The types follow the OpenAPI 3.0.3 specification:
//! <https://spec.openapis.org/oas/v3.0.3>
//!
//! Schemas are carried as raw JSON Schema values, exactly as the route's
//! [`Schema`](hodos_core::Schema) renders them.

use std::sync::OnceLock;

use hodos_core::HttpMethod;
use hodos_routes::ResolvedRoute;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocsError, DocsResult};

/// OpenAPI version emitted by the generator.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Root of an OpenAPI 3.0 document. Only the parts hodos fills in are
/// modelled; schemas stay raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApi {
    /// Always [`OPENAPI_VERSION`] for generated documents.
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Keyed by OpenAPI path (`/users/{id}`), in mount order.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Every tag used by an operation, first use first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OpenApi {
    /// Compact JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> DocsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The operation bound to `method` at an OpenAPI-form `path`.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path)?.get(method)
    }
}

/// `info` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Entry of the top-level `servers` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations of one path, keyed by lowercase method name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathItem {
    operations: IndexMap<String, Operation>,
}

impl PathItem {
    /// The operation for a concrete method. `All` never matches.
    pub fn get(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(method_key(method)?.as_str())
    }

    /// Iterates `(method, operation)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operation)> {
        self.operations.iter().map(|(m, op)| (m.as_str(), op))
    }

    // First writer wins.
    fn insert(&mut self, method: HttpMethod, operation: Operation) {
        if let Some(key) = method_key(method) {
            self.operations.entry(key).or_insert(operation);
        }
    }

    fn contains(&self, method: HttpMethod) -> bool {
        self.get(method).is_some()
    }
}

fn method_key(method: HttpMethod) -> Option<String> {
    (method != HttpMethod::All).then(|| method.as_str().to_ascii_lowercase())
}

/// One documented route binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique across the document.
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Path captures first, then query properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Present when the route validates its body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Keyed by status code as a string.
    pub responses: IndexMap<String, Response>,
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    Query,
    Path,
}

/// A path or query parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterIn,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// `requestBody` object; hodos only emits `application/json` content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    pub content: IndexMap<String, MediaType>,
}

/// Schema wrapper under a media type key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// A response entry. OpenAPI requires the description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
}

/// Top-level tag entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Generator turning a resolved route table into an OpenAPI document.
#[derive(Debug, Clone)]
pub struct OpenApiGenerator {
    title: Option<String>,
    version: Option<String>,
    description: Option<String>,
    servers: Vec<Server>,
}

impl Default for OpenApiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiGenerator {
    /// A generator with no title or version yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            version: None,
            description: None,
            servers: Vec::new(),
        }
    }

    /// `info.title`; required.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// `info.version`; required.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a `servers` entry.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Generate the document for `routes`.
    ///
    /// A `(path, method)` pair documented twice keeps its first operation,
    /// matching how the binder treats duplicate bindings.
    pub fn generate(&self, routes: &[ResolvedRoute]) -> DocsResult<OpenApi> {
        let info = Info {
            title: self.title.clone().ok_or(DocsError::MissingInfo("title"))?,
            version: self.version.clone().ok_or(DocsError::MissingInfo("version"))?,
            description: self.description.clone(),
        };

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut tags: IndexSet<String> = IndexSet::new();
        let mut operation_ids: IndexMap<String, String> = IndexMap::new();

        for route in routes {
            let path = openapi_path(route.path());
            for method in expand_methods(route.methods()) {
                let path_item = paths.entry(path.clone()).or_default();
                if path_item.contains(method) {
                    continue;
                }

                let operation = convert_operation(route, &path, method);
                if let Some(first) = operation_ids.get(&operation.operation_id) {
                    return Err(DocsError::DuplicateOperationId {
                        id: operation.operation_id.clone(),
                        first: first.clone(),
                        second: format!("{method} {path}"),
                    });
                }
                operation_ids.insert(operation.operation_id.clone(), format!("{method} {path}"));
                tags.extend(operation.tags.iter().cloned());
                path_item.insert(method, operation);
            }
        }

        Ok(OpenApi {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            servers: self.servers.clone(),
            paths,
            tags: tags.into_iter().map(|name| Tag { name }).collect(),
        })
    }

    /// Generate the document as indented JSON.
    pub fn generate_json(&self, routes: &[ResolvedRoute]) -> DocsResult<String> {
        self.generate(routes)?.to_json_pretty()
    }
}

fn expand_methods(methods: &[HttpMethod]) -> Vec<HttpMethod> {
    let mut expanded: Vec<HttpMethod> = Vec::new();
    for method in methods {
        for m in method.concrete() {
            if !expanded.contains(&m) {
                expanded.push(m);
            }
        }
    }
    expanded
}

fn convert_operation(route: &ResolvedRoute, path: &str, method: HttpMethod) -> Operation {
    let docs = route.docs().cloned().unwrap_or_default();

    let mut parameters = extract_path_parameters(path);
    if let Some(schema) = route.query_schema().and_then(|s| s.to_json_schema()) {
        parameters.extend(query_parameters(&schema));
    }

    let request_body = route
        .schema()
        .and_then(|s| s.to_json_schema())
        .map(|schema| {
            let mut content = IndexMap::new();
            content.insert(
                "application/json".to_string(),
                MediaType {
                    schema: Some(schema),
                },
            );
            RequestBody {
                required: true,
                content,
            }
        });

    let mut responses = IndexMap::new();
    responses.insert(
        "200".to_string(),
        Response {
            description: "Successful response".to_string(),
        },
    );

    Operation {
        operation_id: docs
            .operation_id
            .unwrap_or_else(|| default_operation_id(method, path)),
        summary: docs.summary,
        description: docs.description,
        tags: docs.tags,
        deprecated: docs.deprecated,
        parameters,
        request_body,
        responses,
    }
}

fn colon_param() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(^|/)[:*]([A-Za-z0-9_]+)").expect("valid regex"))
}

fn brace_param() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"))
}

/// Rewrites `:name` and `*name` segments into OpenAPI `{name}` form.
fn openapi_path(path: &str) -> String {
    colon_param().replace_all(path, "$1{$2}").into_owned()
}

/// Extract path parameters from a path template like `/users/{userId}`.
fn extract_path_parameters(path: &str) -> Vec<Parameter> {
    brace_param()
        .captures_iter(path)
        .filter_map(|cap| cap.get(1))
        .map(|name| Parameter {
            name: name.as_str().to_string(),
            location: ParameterIn::Path,
            required: true,
            schema: Some(serde_json::json!({ "type": "string" })),
        })
        .collect()
}

fn query_parameters(schema: &Value) -> Vec<Parameter> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, property)| Parameter {
            name: name.clone(),
            location: ParameterIn::Query,
            required: required.contains(&name.as_str()),
            schema: Some(property.clone()),
        })
        .collect()
}

/// `GET /users/{id}/posts` becomes `getUsersByIdPosts`.
fn default_operation_id(method: HttpMethod, path: &str) -> String {
    let mut id = method.as_str().to_ascii_lowercase();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let (prefix, name) = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => ("By", param),
            None => ("", segment),
        };
        id.push_str(prefix);
        for word in name.split(|c: char| !c.is_ascii_alphanumeric()).filter(|w| !w.is_empty()) {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                id.push(first.to_ascii_uppercase());
                id.extend(chars);
            }
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_path() {
        assert_eq!(openapi_path("/users/:id"), "/users/{id}");
        assert_eq!(openapi_path("/users/:id/posts/:post_id"), "/users/{id}/posts/{post_id}");
        assert_eq!(openapi_path("/files/*rest"), "/files/{rest}");
        assert_eq!(openapi_path("/users/{id}"), "/users/{id}");
        assert_eq!(openapi_path("/time:now"), "/time:now");
    }

    #[test]
    fn test_extract_path_parameters() {
        let params = extract_path_parameters("/users/{userId}/orders/{orderId}");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "userId");
        assert_eq!(params[1].name, "orderId");
        assert!(params.iter().all(|p| p.required && p.location == ParameterIn::Path));

        assert!(extract_path_parameters("/users").is_empty());
    }

    #[test]
    fn test_query_parameters() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {"page": {"type": "string"}, "q": {"type": "string"}},
            "required": ["q"]
        });
        let params = query_parameters(&schema);
        assert_eq!(params.len(), 2);
        assert!(!params[0].required);
        assert!(params[1].required);
        assert_eq!(params[1].location, ParameterIn::Query);

        assert!(query_parameters(&serde_json::json!({"type": "string"})).is_empty());
    }

    #[test]
    fn test_default_operation_id() {
        assert_eq!(default_operation_id(HttpMethod::Get, "/users/{id}/posts"), "getUsersByIdPosts");
        assert_eq!(default_operation_id(HttpMethod::Post, "/user-groups"), "postUserGroups");
        assert_eq!(default_operation_id(HttpMethod::Get, "/"), "get");
    }

    #[test]
    fn test_expand_methods() {
        assert_eq!(expand_methods(&[HttpMethod::All]).len(), 7);
        assert_eq!(
            expand_methods(&[HttpMethod::Get, HttpMethod::All]).first(),
            Some(&HttpMethod::Get)
        );
    }

    #[test]
    fn test_generator_requires_title_and_version() {
        let err = OpenApiGenerator::new().version("1").generate(&[]).unwrap_err();
        assert!(matches!(err, DocsError::MissingInfo("title")));

        let doc = OpenApiGenerator::new().title("t").version("1").generate(&[]).unwrap();
        assert_eq!(doc.openapi, "3.0.3");
        assert_eq!(doc.to_json().unwrap(), r#"{"openapi":"3.0.3","info":{"title":"t","version":"1"},"paths":{}}"#);
    }
}
