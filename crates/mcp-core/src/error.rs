//! Generic, infrastructural errors shared by every crate in the workspace.
//!
//! This is deliberately narrow: parsing, I/O, and channel-closure failures
//! live here. Domain failures that a client needs to reason about (tool not
//! found, invalid arguments, capability gating) belong to `mcp-server`'s own
//! taxonomy and are never represented as an [`Error`] once they reach the
//! dispatcher.

use thiserror::Error;

/// Generic/infrastructural failure kind.
#[derive(Debug, Error)]
pub enum Error {
    /// A payload failed to (de)serialize as JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O operation failed (reading a transport stream, a file, etc).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal channel closed unexpectedly.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// A value exceeded a hard-coded size limit (see [`MAX_MESSAGE_SIZE`](crate::MAX_MESSAGE_SIZE)).
    #[error("message of {actual} bytes exceeds the {limit} byte limit")]
    MessageTooLarge {
        /// Size of the offending message, in bytes.
        actual: usize,
        /// The configured limit, in bytes.
        limit: usize,
    },
}

/// Convenience alias for fallible operations returning [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
