//! Handler traits for the five things a server can register: tools,
//! prompts, resources, resource templates, and the two client-facing
//! capabilities (sampling, logging) the server calls back into.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use mcp_core::RequestContext;
use mcp_protocol::types::{
    CallToolRequest, CallToolResult, CreateMessageRequest, CreateMessageResult, EmptyResult,
    GetPromptRequest, GetPromptResult, LoggingCapabilities, Prompt, ReadResourceRequest,
    ReadResourceResult, Resource, ResourceTemplate, SamplingCapabilities, SetLevelRequest, Tool,
    ToolInputSchema,
};

use crate::error::ServerResult;

type BoxFuture<T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send>>;

/// Handles `tools/call` for one registered tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool against validated arguments.
    async fn handle(
        &self,
        request: CallToolRequest,
        ctx: RequestContext,
    ) -> ServerResult<CallToolResult>;

    /// The `Tool` shape advertised in `tools/list`.
    fn tool_definition(&self) -> Tool;
}

/// Handles `prompts/get` for one registered prompt.
#[async_trait]
pub trait PromptHandler: Send + Sync {
    /// Render the prompt against validated arguments.
    async fn handle(
        &self,
        request: GetPromptRequest,
        ctx: RequestContext,
    ) -> ServerResult<GetPromptResult>;

    /// The `Prompt` shape advertised in `prompts/list`.
    fn prompt_definition(&self) -> Prompt;

    /// Validate arguments before `handle` runs. Default accepts anything;
    /// overriding lets a handler reject with
    /// [`InvalidPromptArguments`](crate::error::ErrorKind::InvalidPromptArguments).
    fn validate_arguments(&self, _args: &HashMap<String, Value>) -> ServerResult<()> {
        Ok(())
    }

    /// Suggest completions for one of this prompt's arguments (§4.F).
    /// Default is no suggestions — most prompts don't need one.
    async fn complete(&self, _argument_name: &str, _value: &str) -> ServerResult<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Handles `resources/read` for one fixed-URI registered resource.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Read the resource's current contents.
    async fn handle(
        &self,
        request: ReadResourceRequest,
        ctx: RequestContext,
    ) -> ServerResult<ReadResourceResult>;

    /// The `Resource` shape advertised in `resources/list`.
    fn resource_definition(&self) -> Resource;
}

/// Handles `resources/read` for URIs matching a [`UriTemplate`](crate::uri_template::UriTemplate).
#[async_trait]
pub trait ResourceTemplateHandler: Send + Sync {
    /// Read the resource identified by `uri`, with `variables` already
    /// extracted by the dispatcher's template match.
    async fn handle(
        &self,
        uri: &str,
        variables: HashMap<String, String>,
        ctx: RequestContext,
    ) -> ServerResult<ReadResourceResult>;

    /// The `ResourceTemplate` shape advertised in `resources/templates/list`.
    fn template_definition(&self) -> ResourceTemplate;

    /// Suggest completions for one of this template's URI variables (§4.F).
    /// Default is no suggestions.
    async fn complete(&self, _variable: &str, _value: &str) -> ServerResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// Enumerate concrete resources this template currently covers, for
    /// hosts that want to surface them alongside fixed resources. Default
    /// is empty — most templates cover an unbounded or external space.
    async fn list(&self) -> ServerResult<Vec<Resource>> {
        Ok(Vec::new())
    }
}

/// Handles outbound `sampling/createMessage` calls on the server's behalf.
#[async_trait]
pub trait SamplingHandler: Send + Sync {
    /// Issue the sampling request to whatever backs this handler (typically
    /// a forwarded call back to the connected client).
    async fn handle(
        &self,
        request: CreateMessageRequest,
        ctx: RequestContext,
    ) -> ServerResult<CreateMessageResult>;

    /// Sampling capabilities this handler supports.
    fn sampling_capabilities(&self) -> SamplingCapabilities {
        SamplingCapabilities
    }
}

/// Handles `logging/setLevel`.
#[async_trait]
pub trait LoggingHandler: Send + Sync {
    /// Apply the requested minimum log level.
    async fn handle(&self, request: SetLevelRequest, ctx: RequestContext)
    -> ServerResult<EmptyResult>;

    /// The level currently in effect.
    fn current_level(&self) -> mcp_protocol::types::LogLevel;

    /// Logging capabilities this handler supports.
    fn logging_capabilities(&self) -> LoggingCapabilities {
        LoggingCapabilities
    }
}

/// Bookkeeping the registry attaches to every handler it accepts.
#[derive(Debug, Clone)]
pub struct HandlerMetadata {
    /// The name or URI this handler was registered under.
    pub name: String,
    /// Optional human-readable description, surfaced nowhere on the wire —
    /// useful for `RegistryStats`/debugging only.
    pub description: Option<String>,
    /// When the handler was registered.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl HandlerMetadata {
    /// Stamp a new metadata record for `name` at the current time.
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Adapts a plain async closure into a [`ToolHandler`].
pub struct FunctionToolHandler {
    tool: Tool,
    handler:
        Arc<dyn Fn(CallToolRequest, RequestContext) -> BoxFuture<ServerResult<CallToolResult>> + Send + Sync>,
}

impl std::fmt::Debug for FunctionToolHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionToolHandler").field("tool", &self.tool).finish()
    }
}

impl FunctionToolHandler {
    /// Wrap `handler` as a tool advertised with `tool`'s definition.
    pub fn new<F, Fut>(tool: Tool, handler: F) -> Self
    where
        F: Fn(CallToolRequest, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<CallToolResult>> + Send + 'static,
    {
        Self {
            tool,
            handler: Arc::new(move |req, ctx| Box::pin(handler(req, ctx)) as BoxFuture<_>),
        }
    }
}

#[async_trait]
impl ToolHandler for FunctionToolHandler {
    async fn handle(
        &self,
        request: CallToolRequest,
        ctx: RequestContext,
    ) -> ServerResult<CallToolResult> {
        (self.handler)(request, ctx).await
    }

    fn tool_definition(&self) -> Tool {
        self.tool.clone()
    }
}

type CompletionProvider =
    Arc<dyn Fn(String, String) -> BoxFuture<ServerResult<Vec<String>>> + Send + Sync>;

/// Adapts a plain async closure into a [`PromptHandler`].
pub struct FunctionPromptHandler {
    prompt: Prompt,
    handler: Arc<
        dyn Fn(GetPromptRequest, RequestContext) -> BoxFuture<ServerResult<GetPromptResult>>
            + Send
            + Sync,
    >,
    completions: HashMap<String, CompletionProvider>,
}

impl std::fmt::Debug for FunctionPromptHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionPromptHandler").field("prompt", &self.prompt).finish()
    }
}

impl FunctionPromptHandler {
    /// Wrap `handler` as a prompt advertised with `prompt`'s definition.
    pub fn new<F, Fut>(prompt: Prompt, handler: F) -> Self
    where
        F: Fn(GetPromptRequest, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<GetPromptResult>> + Send + 'static,
    {
        Self {
            prompt,
            handler: Arc::new(move |req, ctx| Box::pin(handler(req, ctx)) as BoxFuture<_>),
            completions: HashMap::new(),
        }
    }

    /// Register a completion provider for one of this prompt's arguments.
    #[must_use]
    pub fn with_completion<F, Fut>(mut self, argument_name: impl Into<String>, provider: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<Vec<String>>> + Send + 'static,
    {
        self.completions.insert(
            argument_name.into(),
            Arc::new(move |name, value| Box::pin(provider(name, value)) as BoxFuture<_>),
        );
        self
    }
}

#[async_trait]
impl PromptHandler for FunctionPromptHandler {
    async fn handle(
        &self,
        request: GetPromptRequest,
        ctx: RequestContext,
    ) -> ServerResult<GetPromptResult> {
        (self.handler)(request, ctx).await
    }

    fn prompt_definition(&self) -> Prompt {
        self.prompt.clone()
    }

    async fn complete(&self, argument_name: &str, value: &str) -> ServerResult<Vec<String>> {
        match self.completions.get(argument_name) {
            Some(provider) => provider(argument_name.to_string(), value.to_string()).await,
            None => Ok(Vec::new()),
        }
    }
}

/// Adapts a plain async closure into a [`ResourceHandler`].
pub struct FunctionResourceHandler {
    resource: Resource,
    handler: Arc<
        dyn Fn(ReadResourceRequest, RequestContext) -> BoxFuture<ServerResult<ReadResourceResult>>
            + Send
            + Sync,
    >,
}

impl std::fmt::Debug for FunctionResourceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionResourceHandler")
            .field("resource", &self.resource)
            .finish()
    }
}

impl FunctionResourceHandler {
    /// Wrap `handler` as a resource advertised with `resource`'s definition.
    pub fn new<F, Fut>(resource: Resource, handler: F) -> Self
    where
        F: Fn(ReadResourceRequest, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<ReadResourceResult>> + Send + 'static,
    {
        Self {
            resource,
            handler: Arc::new(move |req, ctx| Box::pin(handler(req, ctx)) as BoxFuture<_>),
        }
    }
}

#[async_trait]
impl ResourceHandler for FunctionResourceHandler {
    async fn handle(
        &self,
        request: ReadResourceRequest,
        ctx: RequestContext,
    ) -> ServerResult<ReadResourceResult> {
        (self.handler)(request, ctx).await
    }

    fn resource_definition(&self) -> Resource {
        self.resource.clone()
    }
}

/// Adapts a plain async closure into a [`ResourceTemplateHandler`].
pub struct FunctionResourceTemplateHandler {
    template: ResourceTemplate,
    handler: Arc<
        dyn Fn(String, HashMap<String, String>, RequestContext) -> BoxFuture<ServerResult<ReadResourceResult>>
            + Send
            + Sync,
    >,
}

impl std::fmt::Debug for FunctionResourceTemplateHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionResourceTemplateHandler")
            .field("template", &self.template)
            .finish()
    }
}

impl FunctionResourceTemplateHandler {
    /// Wrap `handler` as a resource template advertised with `template`'s definition.
    pub fn new<F, Fut>(template: ResourceTemplate, handler: F) -> Self
    where
        F: Fn(String, HashMap<String, String>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<ReadResourceResult>> + Send + 'static,
    {
        Self {
            template,
            handler: Arc::new(move |uri, vars, ctx| Box::pin(handler(uri, vars, ctx)) as BoxFuture<_>),
        }
    }
}

#[async_trait]
impl ResourceTemplateHandler for FunctionResourceTemplateHandler {
    async fn handle(
        &self,
        uri: &str,
        variables: HashMap<String, String>,
        ctx: RequestContext,
    ) -> ServerResult<ReadResourceResult> {
        (self.handler)(uri.to_string(), variables, ctx).await
    }

    fn template_definition(&self) -> ResourceTemplate {
        self.template.clone()
    }
}

/// Convenience constructors that fill in sensible defaults for the parts of
/// a `Tool`/`Prompt`/`Resource` definition a caller rarely wants to spell
/// out by hand.
pub mod utils {
    use super::{
        CallToolRequest, CallToolResult, FunctionPromptHandler, FunctionResourceHandler,
        FunctionResourceTemplateHandler, FunctionToolHandler, GetPromptRequest, GetPromptResult,
        HashMap, Prompt, ReadResourceRequest, ReadResourceResult, RequestContext, Resource,
        ResourceTemplate, ServerResult, Tool, ToolInputSchema,
    };

    /// A tool with an empty, extensible input schema.
    pub fn tool<F, Fut>(name: &str, description: &str, handler: F) -> FunctionToolHandler
    where
        F: Fn(CallToolRequest, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<CallToolResult>> + Send + 'static,
    {
        let tool = Tool {
            name: name.to_string(),
            title: Some(name.to_string()),
            description: Some(description.to_string()),
            input_schema: ToolInputSchema {
                schema_type: "object".to_string(),
                properties: Some(HashMap::new()),
                required: Some(Vec::new()),
                additional_properties: Some(false),
            },
            output_schema: None,
            annotations: None,
            meta: None,
        };
        FunctionToolHandler::new(tool, handler)
    }

    /// A tool whose schema is supplied directly as a JSON Schema object.
    pub fn tool_with_schema<F, Fut>(
        name: &str,
        description: &str,
        schema: serde_json::Value,
        handler: F,
    ) -> FunctionToolHandler
    where
        F: Fn(CallToolRequest, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<CallToolResult>> + Send + 'static,
    {
        let properties = schema
            .get("properties")
            .and_then(|v| v.as_object())
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| (k.clone(), serde_json::from_value(v.clone()).unwrap_or_default()))
                    .collect()
            })
            .unwrap_or_default();

        let required = schema
            .get("required")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        let additional_properties = schema
            .get("additionalProperties")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        let tool = Tool {
            name: name.to_string(),
            title: Some(name.to_string()),
            description: Some(description.to_string()),
            input_schema: ToolInputSchema {
                schema_type: "object".to_string(),
                properties: Some(properties),
                required: Some(required),
                additional_properties: Some(additional_properties),
            },
            output_schema: None,
            annotations: None,
            meta: None,
        };
        FunctionToolHandler::new(tool, handler)
    }

    /// A prompt with no declared arguments.
    pub fn prompt<F, Fut>(name: &str, description: &str, handler: F) -> FunctionPromptHandler
    where
        F: Fn(GetPromptRequest, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<GetPromptResult>> + Send + 'static,
    {
        let prompt = Prompt {
            name: name.to_string(),
            title: Some(name.to_string()),
            description: Some(description.to_string()),
            arguments: None,
            meta: None,
        };
        FunctionPromptHandler::new(prompt, handler)
    }

    /// A resource with a fixed URI and a `text/plain` default MIME type.
    pub fn resource<F, Fut>(uri: &str, name: &str, handler: F) -> FunctionResourceHandler
    where
        F: Fn(ReadResourceRequest, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<ReadResourceResult>> + Send + 'static,
    {
        let resource = Resource {
            name: name.to_string(),
            title: Some(name.to_string()),
            uri: uri.to_string(),
            description: None,
            mime_type: Some("text/plain".to_string()),
            annotations: None,
            size: None,
            meta: None,
        };
        FunctionResourceHandler::new(resource, handler)
    }

    /// A resource template over `pattern` with a `text/plain` default MIME type.
    pub fn resource_template<F, Fut>(
        pattern: &str,
        name: &str,
        handler: F,
    ) -> FunctionResourceTemplateHandler
    where
        F: Fn(String, HashMap<String, String>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServerResult<ReadResourceResult>> + Send + 'static,
    {
        let template = ResourceTemplate {
            name: name.to_string(),
            title: Some(name.to_string()),
            pattern: pattern.to_string(),
            description: None,
            mime_type: Some("text/plain".to_string()),
            annotations: None,
            meta: None,
        };
        FunctionResourceTemplateHandler::new(template, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_protocol::types::ToolInputSchema;

    #[tokio::test]
    async fn function_tool_handler_round_trips_through_the_trait() {
        let handler = utils::tool("echo", "echoes its input", |req, _ctx| async move {
            Ok(CallToolResult {
                content: vec![],
                is_error: Some(false),
                structured_content: req.arguments.map(serde_json::Value::Object),
            })
        });
        assert_eq!(handler.tool_definition().name, "echo");

        let ctx = RequestContext::new(uuid::Uuid::new_v4(), None);
        let result = handler
            .handle(
                CallToolRequest {
                    name: "echo".to_string(),
                    arguments: None,
                },
                ctx,
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(false));
    }

    #[test]
    fn handler_metadata_stamps_creation_time() {
        let before = chrono::Utc::now();
        let metadata = HandlerMetadata::new("echo", Some("demo tool".to_string()));
        assert_eq!(metadata.name, "echo");
        assert!(metadata.created_at >= before);
    }
}
