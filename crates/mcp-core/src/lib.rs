//! Foundational types shared across the MCP server core.
//!
//! This crate carries no protocol semantics of its own; it gives every other
//! crate in the workspace a common vocabulary for request identity
//! ([`MessageId`]), per-request bookkeeping ([`RequestContext`]), and a
//! narrow, infrastructural [`Error`] type.

pub mod context;
pub mod error;
pub mod message;

pub use context::RequestContext;
pub use error::{Error, Result};
pub use message::MessageId;

/// Protocol version this workspace implements, per the MCP spec's
/// date-stamped versioning scheme.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Protocol versions this implementation accepts during `initialize`
/// negotiation, in preference order.
pub const SUPPORTED_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26"];

/// Hard ceiling on a single JSON-RPC message, in bytes.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Default timeout applied to a dispatched request that doesn't specify one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default interval between liveness pings sent to a `Ready` session (§4.E).
pub const DEFAULT_PING_INTERVAL_MS: u64 = 30_000;
