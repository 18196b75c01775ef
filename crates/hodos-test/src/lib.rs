//! # hodos test
//!
//! In-memory HTTP testing for hodos applications. Requests go through the
//! complete application (global middleware, envelopes, route chains)
//! without a socket.
//!
//! ```
//! use hodos::App;
//! use hodos_test::TestClient;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let client = TestClient::new(App::builder().error_envelope().build());
//!
//! let response = client
//!     .post("/users")
//!     .header("X-Request-ID", "abc")
//!     .json(&serde_json::json!({ "name": "Alice" }))
//!     .send()
//!     .await;
//!
//! response.assert_status_code(404);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hodos-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
