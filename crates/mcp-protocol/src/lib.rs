//! Model Context Protocol wire types: the JSON-RPC 2.0 envelope, MCP
//! request/result/notification payloads, and capability negotiation for the
//! 2025-06-18 specification.
//!
//! This crate is pure data: it defines what goes on the wire and how to
//! negotiate what's enabled, but no dispatch or session behavior — that
//! lives in `mcp-server`.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![deny(unsafe_code)]

pub use mcp_core::{Error, Result};

pub mod capabilities;
pub mod jsonrpc;
pub mod types;

pub use capabilities::{CapabilityMatcher, CapabilityNegotiator, CapabilitySet};
pub use jsonrpc::{
    JsonRpcBatch, JsonRpcError, JsonRpcErrorCode, JsonRpcMessage, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, JsonRpcVersion,
};
pub use types::{
    CallToolRequest, CallToolResult, ClientCapabilities, CompleteRequest, CompleteResult,
    CompletionArgument, CompletionReference, ContentBlock, CreateMessageRequest,
    CreateMessageResult, GetPromptRequest, GetPromptResult, Implementation, InitializeRequest,
    InitializeResult, InitializedNotification, ListPromptsRequest, ListPromptsResult,
    ListResourceTemplatesRequest, ListResourceTemplatesResult, ListResourcesRequest,
    ListResourcesResult, ListRootsRequest, ListRootsResult, ListToolsRequest, ListToolsResult,
    LogLevel, LoggingNotification, ProgressNotification, ProgressToken, Prompt, PromptArgument,
    PromptInput, ProtocolVersion, ReadResourceRequest, ReadResourceResult, RequestId, Resource,
    ResourceContent, ResourceTemplate, ResourceUpdatedNotification, Root,
    RootsListChangedNotification, SamplingMessage, ServerCapabilities, SetLevelRequest,
    SetLevelResult, SubscribeRequest, TextContent, Tool, ToolInputSchema, ToolOutputSchema,
    UnsubscribeRequest,
};

/// MCP protocol version this crate implements.
pub const PROTOCOL_VERSION: &str = mcp_core::PROTOCOL_VERSION;

/// Protocol versions accepted during `initialize` negotiation.
pub const SUPPORTED_VERSIONS: &[&str] = mcp_core::SUPPORTED_VERSIONS;

/// JSON-RPC method name constants, grouped the way the dispatcher's method
/// table (§4.D) switches on them.
pub mod methods {
    /// `initialize`
    pub const INITIALIZE: &str = "initialize";
    /// `notifications/initialized`
    pub const INITIALIZED: &str = "notifications/initialized";
    /// `ping`
    pub const PING: &str = "ping";

    /// `tools/list`
    pub const LIST_TOOLS: &str = "tools/list";
    /// `tools/call`
    pub const CALL_TOOL: &str = "tools/call";
    /// `notifications/tools/list_changed`
    pub const TOOLS_LIST_CHANGED: &str = "notifications/tools/list_changed";

    /// `prompts/list`
    pub const LIST_PROMPTS: &str = "prompts/list";
    /// `prompts/get`
    pub const GET_PROMPT: &str = "prompts/get";
    /// `notifications/prompts/list_changed`
    pub const PROMPTS_LIST_CHANGED: &str = "notifications/prompts/list_changed";

    /// `resources/list`
    pub const LIST_RESOURCES: &str = "resources/list";
    /// `resources/templates/list`
    pub const LIST_RESOURCE_TEMPLATES: &str = "resources/templates/list";
    /// `resources/read`
    pub const READ_RESOURCE: &str = "resources/read";
    /// `resources/subscribe`
    pub const SUBSCRIBE: &str = "resources/subscribe";
    /// `resources/unsubscribe`
    pub const UNSUBSCRIBE: &str = "resources/unsubscribe";
    /// `notifications/resources/updated`
    pub const RESOURCE_UPDATED: &str = "notifications/resources/updated";
    /// `notifications/resources/list_changed`
    pub const RESOURCE_LIST_CHANGED: &str = "notifications/resources/list_changed";

    /// `completion/complete`
    pub const COMPLETE: &str = "completion/complete";

    /// `logging/setLevel`
    pub const SET_LEVEL: &str = "logging/setLevel";
    /// `notifications/message`
    pub const LOG_MESSAGE: &str = "notifications/message";

    /// `notifications/progress`
    pub const PROGRESS: &str = "notifications/progress";
    /// `notifications/cancelled`
    pub const CANCELLED: &str = "notifications/cancelled";

    /// `sampling/createMessage`
    pub const CREATE_MESSAGE: &str = "sampling/createMessage";

    /// `roots/list`
    pub const LIST_ROOTS: &str = "roots/list";
    /// `notifications/roots/list_changed`
    pub const ROOTS_LIST_CHANGED: &str = "notifications/roots/list_changed";
}

/// Protocol error codes: the JSON-RPC standard range plus the MCP
/// application-defined range this core's error taxonomy maps onto (§7).
pub mod error_codes {
    /// Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent isn't a valid request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method doesn't exist or isn't available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;

    /// No tool is registered under the requested name.
    pub const TOOL_NOT_FOUND: i32 = -32001;
    /// The tool's own execution failed (distinct from a protocol failure).
    pub const TOOL_CALL_ERROR: i32 = -32002;
    /// No prompt is registered under the requested name.
    pub const PROMPT_NOT_FOUND: i32 = -32003;
    /// No resource or resource template matches the requested URI.
    pub const RESOURCE_NOT_FOUND: i32 = -32004;
    /// Arguments failed validation against a prompt's declared schema.
    pub const INVALID_PROMPT_ARGUMENTS: i32 = -32005;
    /// The requested operation needs a capability the server didn't declare.
    pub const CAPABILITY_NOT_SUPPORTED: i32 = -32006;
    /// A URI template string failed to parse.
    pub const INVALID_TEMPLATE: i32 = -32007;
    /// Tool call arguments failed validation against the input schema.
    pub const INVALID_TOOL_INPUT: i32 = -32008;
    /// A payload could not be decoded into the expected shape.
    pub const DECODING_ERROR: i32 = -32009;
    /// The client disconnected before a request could complete.
    pub const CLIENT_DISCONNECTED: i32 = -32010;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_constants_are_consistent_with_mcp_core() {
        assert_eq!(PROTOCOL_VERSION, "2025-06-18");
        assert!(SUPPORTED_VERSIONS.contains(&PROTOCOL_VERSION));
    }

    #[test]
    fn method_names_match_the_wire_spelling() {
        assert_eq!(methods::CALL_TOOL, "tools/call");
        assert_eq!(methods::LIST_RESOURCE_TEMPLATES, "resources/templates/list");
        assert_eq!(methods::COMPLETE, "completion/complete");
    }

    #[test]
    fn error_codes_stay_in_the_application_defined_range() {
        assert_eq!(error_codes::TOOL_NOT_FOUND, -32001);
        assert!(error_codes::CLIENT_DISCONNECTED <= -32000);
    }
}
