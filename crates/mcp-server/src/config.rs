//! Server configuration: the `Implementation` identity advertised during
//! `initialize`, the capabilities declared to the client, and the timing
//! knobs the session state machine (§4.E) runs on.

use std::time::Duration;

use mcp_protocol::types::{Implementation, ServerCapabilities};

use crate::registry::RegistryConfig;

/// Configuration a [`crate::Server`](crate) is built from.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name/version pair sent back in `InitializeResult`.
    pub implementation: Implementation,
    /// Server description, surfaced nowhere on the wire — documentation only.
    pub description: Option<String>,
    /// Capabilities this server actually declares. Operations gated on a
    /// capability the declaration doesn't include fail with
    /// [`crate::error::ErrorKind::CapabilityNotSupported`] (§3, §4.B).
    pub capabilities: ServerCapabilities,
    /// How often the session state machine pings an idle client (§4.E).
    pub ping_interval: Duration,
    /// How long a dispatched request may run before the session treats the
    /// client as gone.
    pub request_timeout: Duration,
    /// Limits passed through to the [`HandlerRegistry`](crate::registry::HandlerRegistry).
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            implementation: Implementation {
                name: "mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            description: None,
            capabilities: ServerCapabilities::default(),
            ping_interval: Duration::from_millis(mcp_core::DEFAULT_PING_INTERVAL_MS),
            request_timeout: Duration::from_millis(mcp_core::DEFAULT_TIMEOUT_MS),
            registry: RegistryConfig::default(),
        }
    }
}

/// Fluent builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Start from [`ServerConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the implementation name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.implementation.name = name.into();
        self
    }

    /// Set the implementation version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.implementation.version = version.into();
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.description = Some(description.into());
        self
    }

    /// Replace the declared capabilities wholesale.
    #[must_use]
    pub fn capabilities(mut self, capabilities: ServerCapabilities) -> Self {
        self.config.capabilities = capabilities;
        self
    }

    /// Override the ping interval.
    #[must_use]
    pub const fn ping_interval(mut self, interval: Duration) -> Self {
        self.config.ping_interval = interval;
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Override the registry's per-category handler cap.
    #[must_use]
    pub const fn max_handlers_per_type(mut self, max: usize) -> Self {
        self.config.registry.max_handlers_per_type = max;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ping_interval_matches_protocol_default() {
        let config = ServerConfig::default();
        assert_eq!(config.ping_interval, Duration::from_secs(30));
    }

    #[test]
    fn builder_overrides_stack_independently() {
        let config = ServerConfigBuilder::new()
            .name("demo-server")
            .ping_interval(Duration::from_secs(5))
            .build();
        assert_eq!(config.implementation.name, "demo-server");
        assert_eq!(config.ping_interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
