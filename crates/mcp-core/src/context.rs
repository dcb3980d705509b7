//! Per-request context threaded through handler dispatch.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::message::MessageId;

/// Context carried alongside a single inbound request from the moment the
/// dispatcher decodes it until the handler's result (or error) is turned
/// into a JSON-RPC response.
///
/// Cloning a [`RequestContext`] is cheap: the cancellation token is shared
/// (`CancellationToken::clone` is a refcount bump), and everything else is
/// plain owned data captured at construction time.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlates this context with the JSON-RPC request id, when the
    /// inbound message carried one (notifications have none).
    pub request_id: Option<MessageId>,
    /// Opaque session identifier, stable for the lifetime of the connection.
    pub session_id: Uuid,
    /// Identifier of the connected client, if the implementation surfaces one.
    pub client_id: Option<String>,
    /// Wall-clock time the request was received.
    pub timestamp: DateTime<Utc>,
    /// Monotonic instant the request started processing, used for latency.
    pub start_time: std::time::Instant,
    /// Free-form metadata a handler may read or annotate.
    pub metadata: HashMap<String, serde_json::Value>,
    /// Cancellation signal for this request. See §9 for why this token is
    /// not yet wired to a live `notifications/cancelled` handler: it exists
    /// as the hook point for when that wiring lands.
    pub cancellation_token: CancellationToken,
}

impl RequestContext {
    /// Start a new context for a request arriving on `session_id`.
    #[must_use]
    pub fn new(session_id: Uuid, request_id: Option<MessageId>) -> Self {
        Self {
            request_id,
            session_id,
            client_id: None,
            timestamp: Utc::now(),
            start_time: std::time::Instant::now(),
            metadata: HashMap::new(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Attach a client identifier, builder-style.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Insert a metadata entry, builder-style.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Elapsed time since the request started processing.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Whether this request's cancellation token has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
