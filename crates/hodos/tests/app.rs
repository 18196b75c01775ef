//! End-to-end behaviour of a mounted application.

use std::sync::Arc;

use hodos::middleware::SharedMiddleware;
use hodos::prelude::*;
use hodos::routes::Pagination;
use hodos_test::TestClient;
use http::header::HeaderValue;
use http::StatusCode;
use serde_json::{json, Value};

#[derive(Debug)]
struct UserStore {
    users: Vec<Value>,
}

struct Users;

impl RouteFactory for Users {
    type Dependencies = UserStore;

    fn prefix(&self) -> Option<&str> {
        Some("/users")
    }

    async fn dependencies(&self) -> anyhow::Result<UserStore> {
        Ok(UserStore {
            users: vec![
                json!({"id": 1, "name": "Albert", "password": "e=mc2", "friends": [{"id": 2, "name": "Mileva", "email": "m@example.com"}]}),
                json!({"id": 2, "name": "Mileva", "password": "secret", "friends": []}),
                json!({"id": 3, "name": "Marie", "password": "polonium", "friends": []}),
            ],
        })
    }

    async fn create(&self, _deps: Arc<UserStore>) -> anyhow::Result<Vec<Route<UserStore>>> {
        Ok(vec![
            Route::get("/", |store: Arc<UserStore>, ctx| {
                Box::pin(async move {
                    let page = PageQuery::from_query(ctx.query());
                    let items: Vec<Value> = store
                        .users
                        .iter()
                        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
                        .take(usize::try_from(page.per_page).unwrap_or(usize::MAX))
                        .cloned()
                        .collect();
                    let total = u64::try_from(store.users.len()).unwrap_or(u64::MAX);
                    ctx.add_meta(page.paginate(total).to_value());
                    Ok(Reply::from(Value::Array(items)))
                })
            })
            .returning(Returning::Each(Box::new(Returning::pick(["id", "name"])))),
            Route::get("/:id", |store: Arc<UserStore>, ctx| {
                let id = ctx.param("id").and_then(|id| id.parse::<i64>().ok());
                Box::pin(async move {
                    store
                        .users
                        .iter()
                        .find(|u| u["id"].as_i64() == id)
                        .cloned()
                        .map(Reply::from)
                        .ok_or_else(|| RouteError::not_found("user not found"))
                })
            })
            .returning(Returning::fields([
                ("id", Returning::Keep),
                ("name", Returning::Keep),
                ("friends", Returning::Each(Box::new(Returning::pick(["name"])))),
            ])),
            Route::post("/", |_, ctx| {
                let name = ctx.request_body().and_then(|b| b["name"].as_str()).map(String::from);
                Box::pin(async move {
                    ctx.set_status(StatusCode::CREATED);
                    Ok(Reply::from(json!({ "id": 4, "name": name })))
                })
            })
            .schema(
                FluentSchema::object()
                    .field("name", FluentSchema::string().min_length(1))
                    .strict(),
            ),
            Route::delete("/:id", |_, _| Box::pin(async { Ok(Reply::from(false)) })),
            Route::put("/:id", |_, _| Box::pin(async { Ok(Reply::Nothing) })),
            Route::get("/boom/fail", |_, _| {
                Box::pin(async { Err(RouteError::from(anyhow::anyhow!("connection refused by db-7"))) })
            }),
        ])
    }
}

struct Echo;

impl RouteFactory for Echo {
    type Dependencies = ();

    fn prefix(&self) -> Option<&str> {
        Some("/echo")
    }

    async fn dependencies(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn create(&self, _deps: Arc<()>) -> anyhow::Result<Vec<Route<()>>> {
        Ok(vec![
            Route::get("/query", |_, ctx| {
                let query = ctx.query_value();
                Box::pin(async move { Ok(Reply::from(json!({ "query": query }))) })
            }),
            Route::post("/body", |_, ctx| {
                let body = ctx.request_body().cloned();
                Box::pin(async move { Ok(Reply::from(json!({ "body": body }))) })
            }),
            Route::get("/text", |_, _| Box::pin(async { Ok(Reply::from("plain words")) })),
        ])
    }
}

async fn app(config: &HodosConfig) -> App {
    App::builder()
        .config(config)
        .error_envelope()
        .success_envelope()
        .mount(vec![boxed(Users), boxed(Echo)])
        .await
        .unwrap()
        .build()
}

async fn dev_client() -> TestClient {
    TestClient::new(app(&HodosConfig::development()).await)
}

#[tokio::test]
async fn lists_with_projection_and_pagination_meta() {
    let client = dev_client().await;
    let response = client.get("/users").query("perPage", 2).send().await;

    response.assert_status_code(200).assert_content_type("application/json");
    assert_eq!(
        response.json_value().unwrap(),
        json!({
            "success": true,
            "data": [{"id": 1, "name": "Albert"}, {"id": 2, "name": "Mileva"}],
            "meta": {"total": 3, "page": 1, "perPage": 2, "pageCount": 2}
        })
    );

    let meta: Pagination = serde_json::from_value(
        client.get("/users").query("page", 2).query("perPage", 2).send().await.json_value().unwrap()["meta"].clone(),
    )
    .unwrap();
    assert_eq!(meta.page, 2);
}

#[tokio::test]
async fn nested_returning_drops_unlisted_fields() {
    let response = dev_client().await.get("/users/1").send().await;
    response.assert_status_code(200);
    assert_eq!(
        response.json_value().unwrap()["data"],
        json!({"id": 1, "name": "Albert", "friends": [{"name": "Mileva"}]})
    );
}

#[tokio::test]
async fn trusted_errors_are_enveloped() {
    let response = dev_client().await.get("/users/42").send().await;
    response.assert_status_code(404);
    assert_eq!(
        response.json_value().unwrap(),
        json!({"success": false, "code": -1, "message": "user not found", "data": null})
    );
}

#[tokio::test]
async fn validation_runs_before_the_action() {
    let client = dev_client().await;

    let response = client.post("/users").json(&json!({"name": "Ada", "admin": true})).send().await;
    response.assert_status_code(400);
    let body = response.json_value().unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], -1);
    assert!(body["message"].as_str().unwrap().contains("admin: additional property not allowed"));

    let response = client.post("/users").send().await;
    response.assert_status_code(400);
    assert_eq!(response.json_value().unwrap()["message"], "a request body is required");

    let response = client.post("/users").json(&json!({"name": "Ada"})).send().await;
    response.assert_status_code(201);
    assert_eq!(response.json_value().unwrap()["data"], json!({"id": 4, "name": "Ada"}));
}

#[tokio::test]
async fn falsy_reply_is_no_content() {
    let response = dev_client().await.delete("/users/1").send().await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn missing_reply_is_a_server_error_naming_the_route() {
    let response = dev_client().await.put("/users/1").send().await;
    response.assert_status_code(500);
    let message = response.json_value().unwrap()["message"].as_str().unwrap().to_string();
    assert!(message.contains("/users/:id"), "{message}");
}

#[tokio::test]
async fn internal_messages_are_redacted_in_production() {
    let client = TestClient::new(app(&HodosConfig::production()).await);
    let response = client.get("/users/boom/fail").send().await;
    response.assert_status_code(500);
    assert_eq!(
        response.json_value().unwrap(),
        json!({"success": false, "code": -1, "message": "internal server error", "data": null})
    );

    let dev = dev_client().await.get("/users/boom/fail").send().await;
    assert_eq!(dev.json_value().unwrap()["message"], "connection refused by db-7");
}

#[tokio::test]
async fn method_not_allowed_and_options() {
    let client = dev_client().await;

    let response = client.patch("/users/1").send().await;
    response
        .assert_status_code(405)
        .assert_header("allow", "GET, PUT, DELETE, HEAD, OPTIONS")
        .assert_content_type("text/plain");
    assert_eq!(response.text().unwrap(), "Method Not Allowed");

    let response = client.request(http::Method::OPTIONS, "/users").send().await;
    response.assert_status_code(204);
    assert!(response.header_str("allow").unwrap().contains("POST"));
}

#[tokio::test]
async fn head_falls_back_to_get_without_a_body() {
    let response = dev_client().await.request(http::Method::HEAD, "/echo/text").send().await;
    response.assert_status_code(200).assert_content_type("text/plain");
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let response = dev_client().await.get("/nowhere").send().await;
    response.assert_status_code(404);
    assert_eq!(response.text().unwrap(), "Not Found");
}

#[tokio::test]
async fn query_and_body_parsing() {
    let client = dev_client().await;

    let response = client.get("/echo/query?tag=a&tag=b&q=x%20y").send().await;
    assert_eq!(
        response.json_value().unwrap()["data"]["query"],
        json!({"tag": ["a", "b"], "q": "x y"})
    );

    let response = client.post("/echo/body").body(r#"{"untyped":true}"#).send().await;
    assert_eq!(response.json_value().unwrap()["data"]["body"], json!({"untyped": true}));

    let response = client
        .post("/echo/body")
        .content_type("application/json")
        .body("{not json")
        .send()
        .await;
    response.assert_status_code(400);
    assert!(response.json_value().unwrap()["message"]
        .as_str()
        .unwrap()
        .starts_with("invalid JSON body"));
}

#[tokio::test]
async fn text_bodies_are_not_wrapped() {
    let response = dev_client().await.get("/echo/text").send().await;
    response.assert_status_code(200).assert_content_type("text/plain");
    assert_eq!(response.text().unwrap(), "plain words");
}

#[tokio::test]
async fn global_middleware_runs_before_routes() {
    let stamp: SharedMiddleware = from_fn("stamp", |ctx, next| {
        Box::pin(async move {
            let result = next.run(ctx).await;
            ctx.response_headers_mut()
                .insert("x-served-by", HeaderValue::from_static("hodos"));
            result
        })
    });

    let app = App::builder()
        .config(&HodosConfig::development())
        .shared_middleware(stamp)
        .error_envelope()
        .success_envelope()
        .mount(vec![boxed(Echo)])
        .await
        .unwrap()
        .build();
    assert_eq!(
        app.stage_names(),
        ["stamp", "error_envelope", "success_envelope", "parse_body", "route_table"]
    );

    let response = TestClient::new(app).get("/echo/text").send().await;
    response.assert_header("x-served-by", "hodos");
}

#[tokio::test]
async fn openapi_uses_configured_docs() {
    let mut config = HodosConfig::development();
    config.docs.title = "Users API".to_string();
    config.docs.version = "2.0.0".to_string();

    let app = app(&config).await;
    let doc = app.openapi().unwrap();
    assert_eq!(doc.info.title, "Users API");
    assert_eq!(doc.info.version, "2.0.0");
    assert!(doc.paths.contains_key("/users/{id}"));
    assert!(doc.operation("/users", HttpMethod::Post).unwrap().request_body.is_some());
}

#[tokio::test]
async fn mount_accumulates_factories() {
    let app = App::builder()
        .mount(vec![boxed(Echo)])
        .await
        .unwrap()
        .mount(vec![boxed(Users)])
        .await
        .unwrap()
        .build();
    assert_eq!(app.routes().len(), 9);
}

#[test]
fn telemetry_with_logging_disabled_is_a_no_op() {
    let mut config = HodosConfig::production();
    config.logging.enabled = false;
    hodos::init_telemetry(&config, "users-api").unwrap();
}
