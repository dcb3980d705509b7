//! Routes an in-session JSON-RPC request to the registry/completion
//! subsystem and renders the result back into a [`JsonRpcResponse`] (§4.D).
//!
//! This is the one place capability gating, protocol-level errors, and the
//! tool-call exception special case all meet: every method here assumes the
//! session is already `Ready` (the `initialize` handshake itself is handled
//! by [`crate::session::Session`] before any request reaches this table).

use std::sync::Arc;

use mcp_core::RequestContext;
use mcp_protocol::types::{
    CallToolRequest, CallToolResult, CompleteRequest, GetPromptRequest, ListPromptsResult,
    ListResourceTemplatesResult, ListResourcesResult, ListToolsResult, ReadResourceRequest,
    ReadResourceResult, ServerCapabilities, SetLevelRequest, SubscribeRequest, TextContent,
    UnsubscribeRequest,
};
use mcp_protocol::{methods, ContentBlock, JsonRpcRequest, JsonRpcResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::completion;
use crate::error::ErrorKind;
use crate::registry::HandlerRegistry;

/// Routes requests against one registry under one set of declared
/// capabilities.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    capabilities: ServerCapabilities,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").field("registry", &self.registry).finish()
    }
}

impl Dispatcher {
    /// Build a dispatcher over `registry`, gating requests on `capabilities`.
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry>, capabilities: ServerCapabilities) -> Self {
        Self {
            registry,
            capabilities,
        }
    }

    /// Route one request and produce its response. Never panics: any
    /// failure, protocol-level or handler-level, becomes either a
    /// `JsonRpcResponse::error` or (for tool calls specifically) a success
    /// response carrying `CallToolResult { is_error: true }` (§7).
    pub async fn dispatch(&self, request: JsonRpcRequest, ctx: RequestContext) -> JsonRpcResponse {
        let id = request.id.clone();
        let outcome = self.route(&request, ctx).await;
        match outcome {
            Ok(value) => JsonRpcResponse::success(value, id),
            Err(kind) => JsonRpcResponse::error(kind.to_jsonrpc_error(), Some(id)),
        }
    }

    async fn route(&self, request: &JsonRpcRequest, ctx: RequestContext) -> Result<Value, ErrorKind> {
        match request.method.as_str() {
            methods::PING => to_value(mcp_protocol::types::EmptyResult {}),

            methods::INITIALIZE => Err(ErrorKind::InternalError(
                "session is already initialized".to_string(),
            )),

            methods::LIST_TOOLS => {
                require_capability(self.capabilities.tools.is_some(), "tools")?;
                to_value(ListToolsResult {
                    tools: self.registry.tool_definitions(),
                    next_cursor: None,
                })
            }

            methods::CALL_TOOL => {
                require_capability(self.capabilities.tools.is_some(), "tools")?;
                let params: CallToolRequest = parse_params(request.params.clone())?;
                let handler = self.registry.get_tool(&params.name).ok_or_else(|| ErrorKind::ToolNotFound {
                    name: params.name.clone(),
                })?;
                let result = handler.handle(params, ctx).await;
                to_value(tool_call_outcome(result))
            }

            methods::LIST_PROMPTS => {
                require_capability(self.capabilities.prompts.is_some(), "prompts")?;
                to_value(ListPromptsResult {
                    prompts: self.registry.prompt_definitions(),
                    next_cursor: None,
                })
            }

            methods::GET_PROMPT => {
                require_capability(self.capabilities.prompts.is_some(), "prompts")?;
                let params: GetPromptRequest = parse_params(request.params.clone())?;
                let handler = self
                    .registry
                    .get_prompt(&params.name)
                    .ok_or_else(|| ErrorKind::PromptNotFound {
                        name: params.name.clone(),
                    })?;
                if let Some(arguments) = &params.arguments {
                    handler.validate_arguments(arguments)?;
                }
                to_value(handler.handle(params, ctx).await?)
            }

            methods::LIST_RESOURCES => {
                require_capability(self.capabilities.resources.is_some(), "resources")?;
                let mut resources = self.registry.resource_definitions();
                for handler in self.registry.resource_template_handlers() {
                    match handler.list().await {
                        Ok(more) => resources.extend(more),
                        Err(err) => {
                            tracing::warn!(
                                template = %handler.template_definition().pattern,
                                error = %err,
                                "resource template failed to enumerate its resources; skipping"
                            );
                        }
                    }
                }
                to_value(ListResourcesResult {
                    resources,
                    next_cursor: None,
                })
            }

            methods::LIST_RESOURCE_TEMPLATES => {
                require_capability(self.capabilities.resources.is_some(), "resources")?;
                to_value(ListResourceTemplatesResult {
                    resource_templates: self
                        .registry
                        .resource_templates()
                        .into_iter()
                        .map(|(_template, definition)| definition)
                        .collect(),
                    next_cursor: None,
                })
            }

            methods::READ_RESOURCE => {
                require_capability(self.capabilities.resources.is_some(), "resources")?;
                let params: ReadResourceRequest = parse_params(request.params.clone())?;
                to_value(self.read_resource(params, ctx).await?)
            }

            methods::SUBSCRIBE => {
                require_capability(self.capabilities.resources.is_some(), "resources")?;
                let params: SubscribeRequest = parse_params(request.params.clone())?;
                self.registry.subscribe_resource(params.uri);
                to_value(mcp_protocol::types::EmptyResult {})
            }

            methods::UNSUBSCRIBE => {
                require_capability(self.capabilities.resources.is_some(), "resources")?;
                let params: UnsubscribeRequest = parse_params(request.params.clone())?;
                self.registry.unsubscribe_resource(&params.uri);
                to_value(mcp_protocol::types::EmptyResult {})
            }

            methods::COMPLETE => {
                // spec.md's ServerCapabilities has no completions group and
                // names no capability requirement for this method.
                let params: CompleteRequest = parse_params(request.params.clone())?;
                to_value(completion::complete(&self.registry, params).await?)
            }

            methods::SET_LEVEL => {
                require_capability(self.capabilities.logging.is_some(), "logging")?;
                let params: SetLevelRequest = parse_params(request.params.clone())?;
                if let Some(handler) = self.registry.primary_logging() {
                    handler.handle(params, ctx).await?;
                }
                to_value(mcp_protocol::types::EmptyResult {})
            }

            other => Err(ErrorKind::InternalError(format!("method not found: {other}"))),
        }
    }

    async fn read_resource(
        &self,
        params: ReadResourceRequest,
        ctx: RequestContext,
    ) -> Result<ReadResourceResult, ErrorKind> {
        if let Some(handler) = self.registry.get_resource(&params.uri) {
            return handler.handle(params, ctx).await;
        }

        if let Some((handler, variables)) = self.registry.match_resource_template(&params.uri) {
            return handler.handle(&params.uri, variables, ctx).await;
        }

        Err(ErrorKind::ResourceNotFound { uri: params.uri })
    }
}

fn require_capability(present: bool, name: &str) -> Result<(), ErrorKind> {
    if present {
        Ok(())
    } else {
        Err(ErrorKind::CapabilityNotSupported {
            capability: name.to_string(),
        })
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, ErrorKind> {
    let value = params.unwrap_or(Value::Null);
    serde_json::from_value(value.clone())
        .map_err(|err| ErrorKind::decoding_error(err.to_string(), value, std::any::type_name::<T>()))
}

fn to_value<T: Serialize>(result: T) -> Result<Value, ErrorKind> {
    serde_json::to_value(result).map_err(|err| ErrorKind::InternalError(err.to_string()))
}

/// Turn a tool handler's own success/failure into a `CallToolResult`. Per §7
/// a handler's `Err` is never rendered as a JSON-RPC error — it becomes a
/// normal success response whose payload says the tool itself failed.
fn tool_call_outcome(result: Result<CallToolResult, ErrorKind>) -> CallToolResult {
    match result {
        Ok(result) => result,
        Err(err) => CallToolResult {
            content: vec![ContentBlock::Text(TextContent {
                text: err.to_string(),
                annotations: None,
                meta: None,
            })],
            is_error: Some(true),
            structured_content: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::utils;
    use mcp_core::MessageId;
    use mcp_protocol::types::ToolsCapabilities;

    fn ctx() -> RequestContext {
        RequestContext::new(uuid::Uuid::new_v4(), Some(MessageId::Number(1)))
    }

    fn request(method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest::new(method.to_string(), params, MessageId::Number(1))
    }

    #[tokio::test]
    async fn ping_succeeds_unconditionally() {
        let dispatcher = Dispatcher::new(Arc::new(HandlerRegistry::new()), ServerCapabilities::default());
        let response = dispatcher.dispatch(request(methods::PING, None), ctx()).await;
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn listing_tools_without_the_capability_is_rejected() {
        let dispatcher = Dispatcher::new(Arc::new(HandlerRegistry::new()), ServerCapabilities::default());
        let response = dispatcher.dispatch(request(methods::LIST_TOOLS, None), ctx()).await;
        assert!(response.is_error());
        assert_eq!(response.error.unwrap().code, -32006);
    }

    #[tokio::test]
    async fn calling_an_unknown_tool_is_a_protocol_error() {
        let registry = Arc::new(HandlerRegistry::new());
        let capabilities = ServerCapabilities {
            tools: Some(ToolsCapabilities::default()),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(registry, capabilities);
        let response = dispatcher
            .dispatch(
                request(methods::CALL_TOOL, Some(serde_json::json!({"name": "missing"}))),
                ctx(),
            )
            .await;
        assert!(response.is_error());
        assert_eq!(response.error.unwrap().code, -32603);
    }

    #[tokio::test]
    async fn a_failing_tool_handler_is_a_success_response_with_is_error() {
        let registry = Arc::new(HandlerRegistry::new());
        registry
            .register_tool(utils::tool("boom", "always fails", |_req, _ctx| async move {
                Err(ErrorKind::ToolCallError("kaboom".to_string()))
            }))
            .unwrap();
        let capabilities = ServerCapabilities {
            tools: Some(ToolsCapabilities::default()),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(registry, capabilities);
        let response = dispatcher
            .dispatch(
                request(methods::CALL_TOOL, Some(serde_json::json!({"name": "boom"}))),
                ctx(),
            )
            .await;

        assert!(response.is_success());
        let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn static_resource_takes_precedence_over_a_matching_template() {
        let registry = Arc::new(HandlerRegistry::new());
        registry
            .register_resource(utils::resource("/users/42", "pinned", |_req, _ctx| async move {
                Ok(ReadResourceResult {
                    contents: vec![mcp_protocol::types::ResourceContent::Text(
                        mcp_protocol::types::TextResourceContents {
                            uri: "/users/42".to_string(),
                            mime_type: None,
                            text: "static".to_string(),
                            meta: None,
                        },
                    )],
                })
            }))
            .unwrap();
        registry
            .register_resource_template(utils::resource_template(
                "/users/{id}",
                "templated",
                |_uri, _vars, _ctx| async move {
                    Ok(ReadResourceResult {
                        contents: vec![mcp_protocol::types::ResourceContent::Text(
                            mcp_protocol::types::TextResourceContents {
                                uri: "/users/42".to_string(),
                                mime_type: None,
                                text: "templated".to_string(),
                                meta: None,
                            },
                        )],
                    })
                },
            ))
            .unwrap();

        let capabilities = ServerCapabilities {
            resources: Some(mcp_protocol::types::ResourcesCapabilities::default()),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(registry, capabilities);
        let response = dispatcher
            .dispatch(
                request(methods::READ_RESOURCE, Some(serde_json::json!({"uri": "/users/42"}))),
                ctx(),
            )
            .await;

        let result: ReadResourceResult = serde_json::from_value(response.result.unwrap()).unwrap();
        let mcp_protocol::types::ResourceContent::Text(text) = &result.contents[0] else {
            panic!("expected text content");
        };
        assert_eq!(text.text, "static");
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let dispatcher = Dispatcher::new(Arc::new(HandlerRegistry::new()), ServerCapabilities::default());
        let response = dispatcher.dispatch(request("totally/unknown", None), ctx()).await;
        assert!(response.is_error());
    }
}
