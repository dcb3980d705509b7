//! JSON-RPC 2.0 envelope: request/response/notification/batch framing.
//!
//! This module is pure wire format — it knows nothing about MCP method
//! names or payload shapes, only the envelope those payloads travel in.

use std::fmt;

use mcp_core::MessageId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// JSON-RPC version string, as required on every request/response/notification.
pub const JSONRPC_VERSION: &str = "2.0";

/// Zero-sized marker that (de)serializes as the literal string `"2.0"`,
/// rejecting any other value during deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let version = String::deserialize(deserializer)?;
        if version == JSONRPC_VERSION {
            Ok(JsonRpcVersion)
        } else {
            Err(serde::de::Error::custom(format!(
                "invalid JSON-RPC version: expected '{JSONRPC_VERSION}', got '{version}'"
            )))
        }
    }
}

/// A JSON-RPC request: expects a response correlated by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: JsonRpcVersion,
    /// Method name, e.g. `"tools/call"`.
    pub method: String,
    /// Method parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Request identifier, echoed back on the response.
    pub id: MessageId,
}

/// A JSON-RPC response: exactly one of `result`/`error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: JsonRpcVersion,
    /// Success payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Echoes the request id; `None` only for a parse error with no id to echo.
    pub id: Option<MessageId>,
}

/// A JSON-RPC notification: no `id`, no response expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: JsonRpcVersion,
    /// Method name, e.g. `"notifications/initialized"`.
    pub method: String,
    /// Method parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// The `error` member of a [`JsonRpcResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code, standard or application-defined (§7).
    pub code: i32,
    /// Short, human-readable summary.
    pub message: String,
    /// Structured detail a client can use to render or recover (§7).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A batch of requests or responses sent as a single JSON array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonRpcBatch<T> {
    /// The batch's elements, in wire order.
    pub items: Vec<T>,
}

/// Standard JSON-RPC 2.0 error codes, plus the escape hatch for
/// application-defined ones MCP assigns in the -32000..-32099 range (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    /// Invalid JSON was received by the server (-32700).
    ParseError,
    /// The JSON sent is not a valid request object (-32600).
    InvalidRequest,
    /// The method does not exist or is not available (-32601).
    MethodNotFound,
    /// Invalid method parameters (-32602).
    InvalidParams,
    /// Internal JSON-RPC error (-32603).
    InternalError,
    /// Application-defined error in the -32000..-32099 range.
    ApplicationError(i32),
}

impl JsonRpcErrorCode {
    /// The numeric code this variant carries.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ApplicationError(code) => *code,
        }
    }

    /// The standard short message for this code.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::ApplicationError(_) => "Application error",
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl From<JsonRpcErrorCode> for JsonRpcError {
    fn from(code: JsonRpcErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data: None,
        }
    }
}

impl From<i32> for JsonRpcErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            other => Self::ApplicationError(other),
        }
    }
}

/// Any of the shapes that can appear at the top level of an inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// A single request.
    Request(JsonRpcRequest),
    /// A single response.
    Response(JsonRpcResponse),
    /// A single notification.
    Notification(JsonRpcNotification),
    /// A batch of requests.
    RequestBatch(JsonRpcBatch<JsonRpcRequest>),
    /// A batch of responses.
    ResponseBatch(JsonRpcBatch<JsonRpcResponse>),
    /// A batch mixing requests, responses, and notifications.
    MessageBatch(JsonRpcBatch<JsonRpcMessage>),
}

impl JsonRpcRequest {
    /// Build a request.
    pub fn new(method: String, params: Option<Value>, id: MessageId) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method,
            params,
            id,
        }
    }

    /// Build a request with no parameters.
    pub fn without_params(method: String, id: MessageId) -> Self {
        Self::new(method, None, id)
    }

    /// Build a request, serializing `params` to JSON.
    pub fn with_params<P: Serialize>(
        method: String,
        params: P,
        id: MessageId,
    ) -> Result<Self, serde_json::Error> {
        let params_value = serde_json::to_value(params)?;
        Ok(Self::new(method, Some(params_value), id))
    }
}

impl JsonRpcResponse {
    /// Build a successful response.
    pub fn success(result: Value, id: MessageId) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            result: Some(result),
            error: None,
            id: Some(id),
        }
    }

    /// Build an error response.
    pub fn error(error: JsonRpcError, id: Option<MessageId>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Build a parse-error response. The id is always `None`: the id of a
    /// message that failed to parse cannot be trusted to exist or be correct.
    pub fn parse_error(message: Option<String>) -> Self {
        let error = JsonRpcError {
            code: JsonRpcErrorCode::ParseError.code(),
            message: message.unwrap_or_else(|| JsonRpcErrorCode::ParseError.message().to_string()),
            data: None,
        };
        Self::error(error, None)
    }

    /// Whether this is a success response.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Whether this is an error response.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl JsonRpcNotification {
    /// Build a notification.
    pub fn new(method: String, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method,
            params,
        }
    }

    /// Build a notification with no parameters.
    pub fn without_params(method: String) -> Self {
        Self::new(method, None)
    }

    /// Build a notification, serializing `params` to JSON.
    pub fn with_params<P: Serialize>(method: String, params: P) -> Result<Self, serde_json::Error> {
        let params_value = serde_json::to_value(params)?;
        Ok(Self::new(method, Some(params_value)))
    }
}

impl<T> JsonRpcBatch<T> {
    /// Wrap an existing vec of items.
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// An empty batch.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Append an item.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Number of items in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch has no items. Per JSON-RPC 2.0, an empty batch array
    /// is itself an `InvalidRequest` — callers must check this before dispatch.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the batch's items by reference.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for JsonRpcBatch<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T> From<Vec<T>> for JsonRpcBatch<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

/// Parsing and framing helpers that don't belong on any one type.
pub mod utils {
    use super::{JsonRpcMessage, Value};

    /// Parse a raw JSON string into a [`JsonRpcMessage`].
    pub fn parse_message(json: &str) -> Result<JsonRpcMessage, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize a [`JsonRpcMessage`] back to a JSON string.
    pub fn serialize_message(message: &JsonRpcMessage) -> Result<String, serde_json::Error> {
        serde_json::to_string(message)
    }

    /// Cheaply guess whether a raw line is a batch, without fully parsing it.
    pub fn is_batch(json: &str) -> bool {
        json.trim_start().starts_with('[')
    }

    /// Pull the `method` field out of a raw message without fully decoding it.
    pub fn extract_method(json: &str) -> Option<String> {
        let value: Value = serde_json::from_str(json).ok()?;
        value.get("method")?.as_str().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_round_trips_and_rejects_others() {
        let json = serde_json::to_string(&JsonRpcVersion).unwrap();
        assert_eq!(json, "\"2.0\"");
        assert!(serde_json::from_str::<JsonRpcVersion>("\"2.0\"").is_ok());
        assert!(serde_json::from_str::<JsonRpcVersion>("\"1.0\"").is_err());
    }

    #[test]
    fn request_round_trips() {
        let request = JsonRpcRequest::new(
            "tools/call".into(),
            Some(json!({"name": "echo"})),
            MessageId::String("req-1".into()),
        );
        let wire = serde_json::to_string(&request).unwrap();
        let back: JsonRpcRequest = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.method, request.method);
        assert_eq!(back.params, request.params);
    }

    #[test]
    fn success_and_error_responses_are_mutually_exclusive() {
        let ok = JsonRpcResponse::success(json!({"ok": true}), MessageId::Number(1));
        assert!(ok.is_success());
        assert!(!ok.is_error());

        let err = JsonRpcResponse::error(
            JsonRpcErrorCode::MethodNotFound.into(),
            Some(MessageId::Number(1)),
        );
        assert!(err.is_error());
        assert!(!err.is_success());
    }

    #[test]
    fn parse_error_response_carries_no_id() {
        let response = JsonRpcResponse::parse_error(None);
        assert!(response.id.is_none());
        assert_eq!(response.error.unwrap().code, -32700);
    }

    #[test]
    fn notification_has_no_id_field_on_the_wire() {
        let note =
            JsonRpcNotification::with_params("notifications/progress".into(), json!({"pct": 50}))
                .unwrap();
        let wire = serde_json::to_string(&note).unwrap();
        assert!(!wire.contains("\"id\""));
    }

    #[test]
    fn batch_push_and_len() {
        let mut batch = JsonRpcBatch::<JsonRpcRequest>::empty();
        assert!(batch.is_empty());
        batch.push(JsonRpcRequest::without_params(
            "a".into(),
            MessageId::Number(1),
        ));
        batch.push(JsonRpcRequest::without_params(
            "b".into(),
            MessageId::Number(2),
        ));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn utils_detect_batch_and_extract_method() {
        let single = r#"{"jsonrpc":"2.0","method":"ping","id":1}"#;
        assert!(!utils::is_batch(single));
        assert_eq!(utils::extract_method(single), Some("ping".to_string()));

        let batch = r#"[{"jsonrpc":"2.0","method":"ping","id":1}]"#;
        assert!(utils::is_batch(batch));
    }

    #[test]
    fn error_code_conversions_round_trip() {
        assert_eq!(JsonRpcErrorCode::from(-32700).code(), -32700);
        assert_eq!(JsonRpcErrorCode::ApplicationError(-32001).code(), -32001);
    }
}
