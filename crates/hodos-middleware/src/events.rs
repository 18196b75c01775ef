//! Process-wide error events.
//!
//! Every error rendered by [`ErrorEnvelope`](crate::stages::ErrorEnvelope) is
//! published on a broadcast channel so centralised logging or alerting can
//! observe failures without sitting in the request path. Publishing never
//! blocks; slow subscribers miss events.

use std::sync::{Arc, OnceLock};

use hodos_core::RouteError;
use http::{Method, StatusCode};
use serde_json::Value;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// A rendered failure.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    /// The request that failed
    pub request_id: String,
    /// Request method
    pub method: Method,
    /// Request path
    pub path: String,
    /// Response status sent to the client
    pub status: StatusCode,
    /// The original, unredacted error
    pub error: Arc<RouteError>,
    /// The envelope sent to the client
    pub response: Value,
}

fn sender() -> &'static broadcast::Sender<ErrorEvent> {
    static SENDER: OnceLock<broadcast::Sender<ErrorEvent>> = OnceLock::new();
    SENDER.get_or_init(|| broadcast::channel(CHANNEL_CAPACITY).0)
}

/// Subscribes to error events from every envelope in the process.
#[must_use]
pub fn subscribe_errors() -> broadcast::Receiver<ErrorEvent> {
    sender().subscribe()
}

/// Publishes an event. Dropped silently when nobody listens.
pub(crate) fn publish(event: ErrorEvent) {
    let _ = sender().send(event);
}
