//! The MCP server core: registry, dispatcher, session state machine, URI
//! template engine, schema adapter, completion subsystem, outbound client
//! API, and the domain error taxonomy (spec.md §4).
//!
//! This crate consumes an already-parsed, already-framed JSON-RPC message
//! sequence — transport, byte framing, and request-id assignment are
//! external collaborators (spec.md §1, §6). What lives here is the hard
//! engineering concentrated in "the core": concurrency-safe registration,
//! RFC 6570 template routing, capability-gated dispatch, and the session
//! state machine that ties them together for one connected client.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod completion;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod outbound;
pub mod registry;
pub mod schema;
pub mod session;
pub mod uri_template;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use dispatcher::Dispatcher;
pub use error::{ErrorKind, ServerResult};
pub use handlers::{
    FunctionPromptHandler, FunctionResourceHandler, FunctionResourceTemplateHandler,
    FunctionToolHandler, HandlerMetadata, LoggingHandler, PromptHandler, ResourceHandler,
    ResourceTemplateHandler, SamplingHandler, ToolHandler,
};
pub use outbound::{CapabilityStatus, ClientTransport, RootsCache};
pub use registry::{HandlerRegistry, RegistryBuilder, RegistryConfig, RegistryEvent, RegistryStats};
pub use session::{CompletionSink, Session, SessionState};
pub use uri_template::UriTemplate;

use std::sync::Arc;

/// Convenience entry point: build a [`Session`] over a fresh, empty
/// [`HandlerRegistry`] and the caller's [`ServerConfig`]/[`ClientTransport`].
///
/// Registrations happen through [`Server::registry`] before [`Server::run`]
/// drives the handshake — there is no requirement to register everything up
/// front, since the registry is concurrency-safe for the lifetime of the
/// session (spec.md §5), but a transport typically won't have anything to
/// dispatch to until at least one tool/resource/prompt exists.
#[derive(Debug, Clone)]
pub struct Server {
    registry: Arc<HandlerRegistry>,
    config: ServerConfig,
}

impl Server {
    /// Build a server with an empty registry.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let mut registry_config = config.registry.clone();
        registry_config.tools_list_changed = config
            .capabilities
            .tools
            .as_ref()
            .and_then(|tools| tools.list_changed)
            .unwrap_or(false);
        Self {
            registry: Arc::new(HandlerRegistry::with_config(registry_config)),
            config,
        }
    }

    /// The registry backing this server. Registration through this handle is
    /// safe to interleave with an already-running session (spec.md §5).
    #[must_use]
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// The configuration this server was built from.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Start a session over `transport`. Returns once the session reaches
    /// [`SessionState::Closed`] — typically because the request stream ended
    /// or the liveness ping failed (spec.md §4.E).
    pub fn session(&self, transport: Arc<dyn ClientTransport>) -> Arc<Session> {
        Session::new(self.config.clone(), Arc::clone(&self.registry), transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_starts_with_an_empty_registry() {
        let server = Server::new(ServerConfig::default());
        assert_eq!(server.registry().stats().total_count, 0);
    }

    #[test]
    fn registering_through_the_server_is_visible_to_new_sessions() {
        let server = Server::new(ServerConfig::default());
        server
            .registry()
            .register_tool(handlers::utils::tool("echo", "echoes", |_req, _ctx| async move {
                Ok(mcp_protocol::types::CallToolResult {
                    content: vec![],
                    is_error: Some(false),
                    structured_content: None,
                })
            }))
            .unwrap();
        assert_eq!(server.registry().stats().tool_count, 1);
    }
}
