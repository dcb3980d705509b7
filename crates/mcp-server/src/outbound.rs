//! The outbound client API (§4.G): calls a running session issues back to
//! the connected client rather than the other way around — sampling,
//! `roots/list`, server-to-client logging, and the `list_changed`/`updated`/
//! `progress` notification family.
//!
//! This module only defines the collaborator the session drives; it says
//! nothing about how bytes actually reach the client. A concrete transport
//! (stdio, SSE, whatever) implements [`ClientTransport`]; tests use an
//! in-memory stub.

use async_trait::async_trait;
use tokio::sync::watch;

use mcp_protocol::types::{CreateMessageRequest, CreateMessageResult, LoggingNotification, ProgressToken, Root};

use crate::error::ServerResult;

/// Everything a [`crate::session::Session`] can ask the connected client to
/// do. Every method is fallible independent of the domain error taxonomy in
/// [`crate::error`] — a transport failure here almost always means the
/// client is gone, which the session surfaces as
/// [`crate::error::ErrorKind::ClientDisconnected`] via `From<mcp_core::Error>`.
#[async_trait]
pub trait ClientTransport: Send + Sync {
    /// Send a liveness `ping` and wait for the client's reply.
    async fn ping(&self) -> ServerResult<()>;

    /// Issue `sampling/createMessage`, gated by the client's declared
    /// `sampling` capability (checked by the caller, not this trait).
    async fn request_create_message(
        &self,
        request: CreateMessageRequest,
    ) -> ServerResult<CreateMessageResult>;

    /// Issue `roots/list`, gated by the client's declared `roots` capability.
    async fn list_roots(&self) -> ServerResult<Vec<Root>>;

    /// Push a `notifications/message` log entry to the client.
    async fn log(&self, notification: LoggingNotification) -> ServerResult<()>;

    /// Push `notifications/resources/updated` for `uri`.
    async fn notify_resource_updated(&self, uri: String) -> ServerResult<()>;

    /// Push `notifications/resources/list_changed`.
    async fn notify_resource_list_changed(&self) -> ServerResult<()>;

    /// Push `notifications/tools/list_changed`.
    async fn notify_tool_list_changed(&self) -> ServerResult<()>;

    /// Push `notifications/prompts/list_changed`.
    async fn notify_prompt_list_changed(&self) -> ServerResult<()>;

    /// Push `notifications/progress` for an in-flight request.
    async fn notify_progress(
        &self,
        token: ProgressToken,
        progress: f64,
        total: Option<f64>,
    ) -> ServerResult<()>;
}

/// Whether a client-provided capability is usable right now. Distinct from
/// a plain `Option<T>`: `NotSupported` is a terminal, documented state a
/// caller can match on, rather than an ambient "nothing here yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityStatus<T> {
    /// The capability is available, carrying its last known value.
    Supported(T),
    /// The client never declared this capability at `initialize` time.
    NotSupported,
}

impl<T> CapabilityStatus<T> {
    /// The carried value, if supported.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Supported(value) => Some(value),
            Self::NotSupported => None,
        }
    }

    /// Whether the capability is currently supported.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }
}

/// Last-value cache of the client's filesystem roots, refreshed whenever
/// `notifications/roots/list_changed` arrives (§4.E, §4.G).
///
/// Built on [`tokio::sync::watch`]: readers never miss an update (they see
/// whatever the latest value was, never a stale one two versions back) and
/// `send_if_modified` means a `roots/list` round trip that returns the same
/// set as last time doesn't wake anyone up.
pub struct RootsCache {
    tx: watch::Sender<CapabilityStatus<Vec<Root>>>,
}

impl RootsCache {
    /// A cache with no value yet — `NotSupported` until the first update.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CapabilityStatus::NotSupported);
        Self { tx }
    }

    /// Subscribe to future updates. The returned receiver's initial value is
    /// whatever the cache currently holds.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CapabilityStatus<Vec<Root>>> {
        self.tx.subscribe()
    }

    /// The current value without subscribing.
    #[must_use]
    pub fn current(&self) -> CapabilityStatus<Vec<Root>> {
        self.tx.borrow().clone()
    }

    /// Record a fresh `roots/list` result. A no-op if it's identical to what
    /// the cache already holds.
    pub fn update(&self, roots: Vec<Root>) {
        let next = CapabilityStatus::Supported(roots);
        self.tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
    }
}

impl Default for RootsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RootsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootsCache").field("current", &self.current()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_starts_not_supported() {
        let cache = RootsCache::new();
        assert_eq!(cache.current(), CapabilityStatus::NotSupported);
    }

    #[test]
    fn update_replaces_the_current_value() {
        let cache = RootsCache::new();
        let roots = vec![Root {
            uri: "file:///workspace".to_string(),
            name: Some("workspace".to_string()),
        }];
        cache.update(roots.clone());
        assert_eq!(cache.current(), CapabilityStatus::Supported(roots));
    }

    #[tokio::test]
    async fn subscribers_observe_updates() {
        let cache = RootsCache::new();
        let mut rx = cache.subscribe();
        let roots = vec![Root {
            uri: "file:///a".to_string(),
            name: None,
        }];
        cache.update(roots.clone());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), CapabilityStatus::Supported(roots));
    }

    #[test]
    fn identical_update_does_not_mark_the_channel_changed() {
        let cache = RootsCache::new();
        let roots = vec![Root {
            uri: "file:///a".to_string(),
            name: None,
        }];
        cache.update(roots.clone());
        let mut rx = cache.subscribe();
        cache.update(roots);
        assert!(rx.has_changed().is_ok_and(|changed| !changed));
    }
}
