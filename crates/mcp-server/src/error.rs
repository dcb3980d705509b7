//! The domain error taxonomy (§7): every failure a dispatched request can
//! produce, each carrying the structured data needed to build a JSON-RPC
//! error response without re-parsing a message string.

use mcp_protocol::{error_codes, JsonRpcError, RequestId};
use serde_json::Value;

/// Result type for fallible operations in this crate's domain.
pub type ServerResult<T> = Result<T, ErrorKind>;

/// A failure surfaced by the registry, dispatcher, session machine,
/// completion subsystem, or outbound client API.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// No tool is registered under the requested name.
    #[error("tool not found: {name}")]
    ToolNotFound {
        /// The requested tool name.
        name: String,
    },

    /// No resource or resource template matches the requested URI.
    #[error("resource not found: {uri}")]
    ResourceNotFound {
        /// The requested URI.
        uri: String,
    },

    /// No prompt is registered under the requested name.
    #[error("prompt not found: {name}")]
    PromptNotFound {
        /// The requested prompt name.
        name: String,
    },

    /// A tool/resource/template/prompt name (or resource URI) was already
    /// taken when registration was attempted (§3 uniqueness invariant).
    #[error("'{name}' is already registered as a {kind}")]
    AlreadyRegistered {
        /// `"tool"`, `"prompt"`, `"resource"`, or `"resource_template"`.
        kind: &'static str,
        /// The name or URI that collided.
        name: String,
    },

    /// A URI template string failed to parse (§4.A grammar).
    #[error("invalid URI template '{template}': {reason}")]
    InvalidTemplate {
        /// The offending template string.
        template: String,
        /// Why it failed to parse.
        reason: String,
    },

    /// The requested operation needs a capability the server didn't declare
    /// at construction time (§3, §4.B).
    #[error("capability not supported: {capability}")]
    CapabilityNotSupported {
        /// Name of the missing capability, e.g. `"tools"`.
        capability: String,
    },

    /// The client disconnected before a request could complete (§4.E).
    #[error("client disconnected")]
    ClientDisconnected,

    /// Tool call arguments failed validation against the tool's input schema.
    #[error("invalid input for tool '{tool}': {reason}")]
    InvalidToolInput {
        /// Name of the tool being called.
        tool: String,
        /// Why validation failed.
        reason: String,
        /// The arguments as received, for client-side diffing (§7).
        received: Value,
    },

    /// Prompt arguments failed validation against the prompt's declared schema.
    #[error("invalid arguments for prompt '{prompt}': {reason}")]
    InvalidPromptArguments {
        /// Name of the prompt being rendered.
        prompt: String,
        /// Why validation failed.
        reason: String,
        /// The arguments as received.
        received: Value,
    },

    /// A payload could not be decoded into the shape a schema describes.
    /// Carries both sides so a host can render a diff (§7, §9).
    #[error("failed to decode payload: {reason}")]
    DecodingError {
        /// Why decoding failed.
        reason: String,
        /// The raw value that failed to decode.
        value: Value,
        /// A rendered snippet of the schema it was decoded against.
        schema_snippet: String,
    },

    /// The tool handler itself failed (as opposed to a protocol-level
    /// failure). Per §7 this is reported as `CallToolResult { is_error: true
    /// }`, never as a JSON-RPC error — this variant exists so the dispatcher
    /// has a uniform type to carry the failure internally before it chooses
    /// how to render it.
    #[error("tool call failed: {0}")]
    ToolCallError(String),

    /// Anything else: channel closures, serialization bugs, invariant
    /// violations. Never expected in normal operation.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ErrorKind {
    /// Whether retrying the same request might succeed. None of this
    /// taxonomy's failures are transient — they're all structural mismatches
    /// between the request and the server's current registry/state.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// Whether this failure indicates the session itself can no longer make
    /// progress and should move to `Closing` (§4.E).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ClientDisconnected | Self::InternalError(_))
    }

    /// The JSON-RPC error code this failure maps to.
    #[must_use]
    pub const fn error_code(&self) -> i32 {
        match self {
            // §4.D: missing tool/prompt/resource maps to the generic
            // internalError code, not a bespoke one.
            Self::ToolNotFound { .. }
            | Self::ResourceNotFound { .. }
            | Self::PromptNotFound { .. } => error_codes::INTERNAL_ERROR,
            Self::AlreadyRegistered { .. } => error_codes::INTERNAL_ERROR,
            Self::InvalidTemplate { .. } => error_codes::INVALID_TEMPLATE,
            Self::CapabilityNotSupported { .. } => error_codes::CAPABILITY_NOT_SUPPORTED,
            Self::ClientDisconnected => error_codes::CLIENT_DISCONNECTED,
            Self::InvalidToolInput { .. } => error_codes::INVALID_TOOL_INPUT,
            Self::InvalidPromptArguments { .. } => error_codes::INVALID_PROMPT_ARGUMENTS,
            Self::DecodingError { .. } => error_codes::DECODING_ERROR,
            Self::ToolCallError(_) => error_codes::TOOL_CALL_ERROR,
            Self::InternalError(_) => error_codes::INTERNAL_ERROR,
        }
    }

    /// Render this error as a JSON-RPC error object, attaching whatever
    /// structured `data` the variant carries.
    #[must_use]
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        let data = match self {
            Self::InvalidToolInput { received, .. } => Some(received.clone()),
            Self::InvalidPromptArguments { received, .. } => Some(received.clone()),
            Self::DecodingError {
                value,
                schema_snippet,
                ..
            } => Some(serde_json::json!({
                "received": value,
                "schema": schema_snippet,
            })),
            _ => None,
        };

        JsonRpcError {
            code: self.error_code(),
            message: self.to_string(),
            data,
        }
    }

    /// Build an [`InvalidToolInput`](Self::InvalidToolInput) error.
    pub fn invalid_tool_input(
        tool: impl Into<String>,
        reason: impl Into<String>,
        received: Value,
    ) -> Self {
        Self::InvalidToolInput {
            tool: tool.into(),
            reason: reason.into(),
            received,
        }
    }

    /// Build an [`InvalidPromptArguments`](Self::InvalidPromptArguments) error.
    pub fn invalid_prompt_arguments(
        prompt: impl Into<String>,
        reason: impl Into<String>,
        received: Value,
    ) -> Self {
        Self::InvalidPromptArguments {
            prompt: prompt.into(),
            reason: reason.into(),
            received,
        }
    }

    /// Build a [`DecodingError`](Self::DecodingError).
    pub fn decoding_error(
        reason: impl Into<String>,
        value: Value,
        schema_snippet: impl Into<String>,
    ) -> Self {
        Self::DecodingError {
            reason: reason.into(),
            value,
            schema_snippet: schema_snippet.into(),
        }
    }
}

impl From<mcp_core::Error> for ErrorKind {
    fn from(err: mcp_core::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

/// Pairs a [`RequestId`] with the error it produced, for logging and for the
/// dispatcher to build the final [`mcp_protocol::JsonRpcResponse`].
#[derive(Debug)]
pub struct DispatchError {
    /// Id of the request that failed, if it had one (notifications don't).
    pub request_id: Option<RequestId>,
    /// The underlying failure.
    pub kind: ErrorKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_not_found_maps_to_expected_code() {
        let err = ErrorKind::ToolNotFound {
            name: "missing".into(),
        };
        assert_eq!(err.error_code(), -32603);
        assert!(!err.is_retryable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn client_disconnected_is_fatal() {
        assert!(ErrorKind::ClientDisconnected.is_fatal());
    }

    #[test]
    fn invalid_tool_input_carries_received_value_as_data() {
        let received = serde_json::json!({"bad": true});
        let err = ErrorKind::invalid_tool_input("echo", "missing field 'text'", received.clone());
        let jsonrpc = err.to_jsonrpc_error();
        assert_eq!(jsonrpc.code, -32008);
        assert_eq!(jsonrpc.data, Some(received));
    }

    #[test]
    fn decoding_error_carries_both_value_and_schema() {
        let err = ErrorKind::decoding_error(
            "expected string",
            serde_json::json!(42),
            "{\"type\":\"string\"}",
        );
        let jsonrpc = err.to_jsonrpc_error();
        assert!(jsonrpc.data.unwrap()["schema"].is_string());
    }
}
