//! Concurrent registry of everything a server has registered: tools,
//! prompts, resources, resource templates, plus the handlers for the two
//! outbound capabilities (sampling, logging) (§3, §4.B).

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use mcp_protocol::types::{Prompt, Resource, ResourceTemplate, Tool};

use crate::error::{ErrorKind, ServerResult};
use crate::handlers::{
    HandlerMetadata, LoggingHandler, PromptHandler, ResourceHandler, ResourceTemplateHandler,
    SamplingHandler, ToolHandler,
};
use crate::uri_template::UriTemplate;

/// Caps and toggles governing registration, independent of any one handler.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of handlers accepted per category.
    pub max_handlers_per_type: usize,
    /// Mirrors `ServerCapabilities.tools.listChanged`. `update_tools`
    /// requires this to be `true` (§3: "requires `tools.listChanged ==
    /// true`"); [`crate::Server::new`] seeds it from the declared
    /// capabilities so the registry never has to see a full
    /// `ServerCapabilities` value itself.
    pub tools_list_changed: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_handlers_per_type: 1000,
            tools_list_changed: false,
        }
    }
}

/// Emitted whenever the registry's contents change, for anything that
/// wants to mirror it (logging, `notifications/*/list_changed`).
#[derive(Debug, Clone)]
pub enum RegistryEvent {
    /// A handler was added under `category`/`name`.
    Registered {
        /// `"tool"`, `"prompt"`, `"resource"`, `"resource_template"`,
        /// `"sampling"`, or `"logging"`.
        category: &'static str,
        /// Name or URI it was registered under.
        name: String,
    },
    /// A handler was removed under `category`/`name`.
    Unregistered {
        /// See [`RegistryEvent::Registered`].
        category: &'static str,
        /// Name or URI it was registered under.
        name: String,
    },
    /// `update_tools` atomically replaced the whole tool set.
    ToolsReplaced {
        /// Number of tools after the replace.
        count: usize,
    },
    /// `clear` emptied every category.
    Cleared,
}

/// Snapshot of how many handlers are currently registered per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of registered tools.
    pub tool_count: usize,
    /// Number of registered prompts.
    pub prompt_count: usize,
    /// Number of registered fixed-URI resources.
    pub resource_count: usize,
    /// Number of registered resource templates.
    pub resource_template_count: usize,
    /// Number of registered sampling handlers.
    pub sampling_count: usize,
    /// Number of registered logging handlers.
    pub logging_count: usize,
    /// Sum of every category above.
    pub total_count: usize,
}

/// Concurrent registry backing a running server.
///
/// Each category is its own `DashMap`, so lookups and reads never contend
/// with each other; `update_tools` takes every tool-related lock it needs
/// to make its replace atomic (§9, Open Question on `updateTools`
/// atomicity — see `DESIGN.md`).
pub struct HandlerRegistry {
    tools: DashMap<String, Arc<dyn ToolHandler>>,
    prompts: DashMap<String, Arc<dyn PromptHandler>>,
    resources: DashMap<String, Arc<dyn ResourceHandler>>,
    resource_templates: DashMap<String, (UriTemplate, Arc<dyn ResourceTemplateHandler>)>,
    sampling: DashMap<String, Arc<dyn SamplingHandler>>,
    logging: DashMap<String, Arc<dyn LoggingHandler>>,
    metadata: DashMap<String, HandlerMetadata>,
    /// URIs a session has subscribed to via `resources/subscribe`, with a
    /// refcount so multiple subscribers don't unsubscribe each other early.
    subscriptions: DashMap<String, usize>,
    config: RwLock<RegistryConfig>,
    /// Fan-out of mutation events, for sessions to translate into
    /// `notifications/*/list_changed` (§4.B, §5). Lagging/absent
    /// subscribers never block a mutation — `send` on a full channel just
    /// drops the oldest event for that receiver.
    events: broadcast::Sender<RegistryEvent>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("tools", &self.tools.len())
            .field("prompts", &self.prompts.len())
            .field("resources", &self.resources.len())
            .field("resource_templates", &self.resource_templates.len())
            .field("sampling", &self.sampling.len())
            .field("logging", &self.logging.len())
            .finish()
    }
}

impl HandlerRegistry {
    /// An empty registry with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// An empty registry with caller-supplied limits.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            tools: DashMap::new(),
            prompts: DashMap::new(),
            resources: DashMap::new(),
            resource_templates: DashMap::new(),
            sampling: DashMap::new(),
            logging: DashMap::new(),
            metadata: DashMap::new(),
            subscriptions: DashMap::new(),
            config: RwLock::new(config),
            events,
        }
    }

    /// Subscribe to mutation events. Each session keeps one receiver alive
    /// for as long as it runs, translating events into outbound
    /// `list_changed` notifications when the corresponding capability bit
    /// is set (§4.B).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: RegistryEvent) {
        let _ = self.events.send(event);
    }

    /// Register a tool. Fails if the name is already taken (§3 uniqueness
    /// invariant) or the category is at its limit.
    pub fn register_tool<T>(&self, handler: T) -> ServerResult<()>
    where
        T: ToolHandler + 'static,
    {
        let name = handler.tool_definition().name;
        self.check_capacity(&self.tools, "tools")?;
        if self.tools.contains_key(&name) {
            return Err(ErrorKind::AlreadyRegistered {
                kind: "tool",
                name,
            });
        }
        self.tools.insert(name.clone(), Arc::new(handler));
        self.metadata
            .insert(format!("tool:{name}"), HandlerMetadata::new(name.clone(), None));
        tracing::info!(tool = %name, "registered tool");
        self.emit(RegistryEvent::Registered {
            category: "tool",
            name,
        });
        Ok(())
    }

    /// Atomically replace the entire tool set. Requires
    /// `tools.listChanged == true` (§3) — a server that didn't declare it
    /// has no way to tell a client the whole set just moved out from under
    /// it, so the replace is rejected outright rather than performed
    /// silently. The swap itself is a single-writer call that can't
    /// interleave with individual `register_tool`/`unregister_tool` calls
    /// because `DashMap::clear`/`insert` here run back to back without
    /// yielding.
    pub fn update_tools<T>(&self, handlers: Vec<T>) -> ServerResult<()>
    where
        T: ToolHandler + 'static,
    {
        if !self.config.read().tools_list_changed {
            return Err(ErrorKind::CapabilityNotSupported {
                capability: "tools.listChanged".to_string(),
            });
        }

        let mut names = std::collections::HashSet::new();
        for handler in &handlers {
            let name = handler.tool_definition().name;
            if !names.insert(name.clone()) {
                return Err(ErrorKind::InternalError(format!(
                    "duplicate tool name '{name}' in update_tools batch"
                )));
            }
        }

        self.tools.clear();
        self.metadata.retain(|key, _| !key.starts_with("tool:"));
        for handler in handlers {
            let name = handler.tool_definition().name;
            self.tools.insert(name.clone(), Arc::new(handler));
            self.metadata
                .insert(format!("tool:{name}"), HandlerMetadata::new(name, None));
        }
        let count = self.tools.len();
        tracing::info!(count, "replaced tool set");
        self.emit(RegistryEvent::ToolsReplaced { count });
        Ok(())
    }

    /// Register a prompt. Fails if the name is already taken.
    pub fn register_prompt<P>(&self, handler: P) -> ServerResult<()>
    where
        P: PromptHandler + 'static,
    {
        let name = handler.prompt_definition().name;
        self.check_capacity(&self.prompts, "prompts")?;
        if self.prompts.contains_key(&name) {
            return Err(ErrorKind::AlreadyRegistered {
                kind: "prompt",
                name,
            });
        }
        self.prompts.insert(name.clone(), Arc::new(handler));
        self.metadata
            .insert(format!("prompt:{name}"), HandlerMetadata::new(name.clone(), None));
        tracing::info!(prompt = %name, "registered prompt");
        self.emit(RegistryEvent::Registered {
            category: "prompt",
            name,
        });
        Ok(())
    }

    /// Register a fixed-URI resource. Fails if the URI is already taken
    /// (§3 uniqueness invariant).
    pub fn register_resource<R>(&self, handler: R) -> ServerResult<()>
    where
        R: ResourceHandler + 'static,
    {
        let uri = handler.resource_definition().uri;
        self.check_capacity(&self.resources, "resources")?;
        if self.resources.contains_key(&uri) {
            return Err(ErrorKind::AlreadyRegistered {
                kind: "resource",
                name: uri,
            });
        }
        self.resources.insert(uri.clone(), Arc::new(handler));
        self.metadata
            .insert(format!("resource:{uri}"), HandlerMetadata::new(uri.clone(), None));
        tracing::info!(resource = %uri, "registered resource");
        self.emit(RegistryEvent::Registered {
            category: "resource",
            name: uri,
        });
        Ok(())
    }

    /// Register a resource template, keyed by its `name` — §3's uniqueness
    /// invariant is "template name (the registry key) is unique," not the
    /// pattern string, so two templates may legitimately share a pattern
    /// under different names. The pattern must still parse as a valid
    /// RFC 6570 subset string (§4.A) or this fails with
    /// [`ErrorKind::InvalidTemplate`].
    pub fn register_resource_template<R>(&self, handler: R) -> ServerResult<()>
    where
        R: ResourceTemplateHandler + 'static,
    {
        let definition = handler.template_definition();
        let name = definition.name.clone();
        let pattern = definition.pattern.clone();
        let template = UriTemplate::parse(&pattern)?;
        self.check_capacity(&self.resource_templates, "resource_templates")?;
        if self.resource_templates.contains_key(&name) {
            return Err(ErrorKind::AlreadyRegistered {
                kind: "resource_template",
                name,
            });
        }
        self.resource_templates
            .insert(name.clone(), (template, Arc::new(handler)));
        self.metadata.insert(
            format!("resource_template:{name}"),
            HandlerMetadata::new(name.clone(), None),
        );
        tracing::info!(template = %name, pattern = %pattern, "registered resource template");
        self.emit(RegistryEvent::Registered {
            category: "resource_template",
            name,
        });
        Ok(())
    }

    /// Register a sampling handler.
    pub fn register_sampling<S>(&self, name: impl Into<String>, handler: S) -> ServerResult<()>
    where
        S: SamplingHandler + 'static,
    {
        let name = name.into();
        self.check_capacity(&self.sampling, "sampling")?;
        self.sampling.insert(name.clone(), Arc::new(handler));
        self.metadata
            .insert(format!("sampling:{name}"), HandlerMetadata::new(name.clone(), None));
        tracing::info!(sampling = %name, "registered sampling handler");
        Ok(())
    }

    /// Register a logging handler.
    pub fn register_logging<L>(&self, name: impl Into<String>, handler: L) -> ServerResult<()>
    where
        L: LoggingHandler + 'static,
    {
        let name = name.into();
        self.check_capacity(&self.logging, "logging")?;
        self.logging.insert(name.clone(), Arc::new(handler));
        self.metadata
            .insert(format!("logging:{name}"), HandlerMetadata::new(name.clone(), None));
        tracing::info!(logging = %name, "registered logging handler");
        Ok(())
    }

    /// Look up a tool handler by exact name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up a prompt handler by exact name.
    #[must_use]
    pub fn get_prompt(&self, name: &str) -> Option<Arc<dyn PromptHandler>> {
        self.prompts.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up a resource handler by exact URI.
    #[must_use]
    pub fn get_resource(&self, uri: &str) -> Option<Arc<dyn ResourceHandler>> {
        self.resources.get(uri).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up the sampling handler registered under `name`.
    #[must_use]
    pub fn get_sampling(&self, name: &str) -> Option<Arc<dyn SamplingHandler>> {
        self.sampling.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Look up the logging handler registered under `name`.
    #[must_use]
    pub fn get_logging(&self, name: &str) -> Option<Arc<dyn LoggingHandler>> {
        self.logging.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// The server's single active logging handler, if one is registered.
    /// `logging/setLevel` (§4.D) has exactly one target regardless of how
    /// many handlers a caller has registered under distinct names; this
    /// picks whichever was registered first.
    #[must_use]
    pub fn primary_logging(&self) -> Option<Arc<dyn LoggingHandler>> {
        self.logging.iter().next().map(|entry| Arc::clone(entry.value()))
    }

    /// Find the first registered resource template whose pattern matches
    /// `uri`, returning the handler and the variables extracted from the
    /// match (§4.A). Registration order decides ties when more than one
    /// template could match.
    #[must_use]
    pub fn match_resource_template(
        &self,
        uri: &str,
    ) -> Option<(Arc<dyn ResourceTemplateHandler>, std::collections::HashMap<String, String>)> {
        self.resource_templates.iter().find_map(|entry| {
            let (template, handler) = entry.value();
            template.matches(uri).map(|vars| (Arc::clone(handler), vars))
        })
    }

    /// Look up a resource template handler by its exact pattern string
    /// (not by matching a concrete URI, and not by its registry-key name).
    /// The completion subsystem (§4.F) uses this to resolve a
    /// `ref/resource` completion request, which names the template's
    /// `uriTemplate` literally rather than a URI that would need matching
    /// against it — the one place a pattern string is compared for
    /// equality instead of expanded, matched, or looked up by name.
    #[must_use]
    pub fn get_resource_template(&self, pattern: &str) -> Option<Arc<dyn ResourceTemplateHandler>> {
        self.resource_templates.iter().find_map(|entry| {
            let (template, handler) = entry.value();
            (template.pattern() == pattern).then(|| Arc::clone(handler))
        })
    }

    /// Record a subscription to `uri`, returning the refcount after the
    /// increment. Idempotent per caller is the session's responsibility —
    /// the registry just counts.
    pub fn subscribe_resource(&self, uri: impl Into<String>) -> usize {
        let mut count = self.subscriptions.entry(uri.into()).or_insert(0);
        *count += 1;
        *count
    }

    /// Remove one subscription to `uri`, dropping the entry once the
    /// refcount reaches zero. Returns whether `uri` was subscribed at all.
    pub fn unsubscribe_resource(&self, uri: &str) -> bool {
        let Some(mut count) = self.subscriptions.get_mut(uri) else {
            return false;
        };
        *count -= 1;
        let drained = *count == 0;
        drop(count);
        if drained {
            self.subscriptions.remove(uri);
        }
        true
    }

    /// Whether anything is currently subscribed to `uri`.
    #[must_use]
    pub fn is_subscribed(&self, uri: &str) -> bool {
        self.subscriptions.contains_key(uri)
    }

    /// Every resource template's parsed form, for the completion subsystem
    /// (§4.F) and `resources/templates/list`.
    #[must_use]
    pub fn resource_templates(&self) -> Vec<(UriTemplate, ResourceTemplate)> {
        self.resource_templates
            .iter()
            .map(|entry| {
                let (template, handler) = entry.value();
                (template.clone(), handler.template_definition())
            })
            .collect()
    }

    /// Every registered resource template handler, for `resources/list`'s
    /// union of static resources and whatever each template currently
    /// enumerates via [`ResourceTemplateHandler::list`].
    #[must_use]
    pub fn resource_template_handlers(&self) -> Vec<Arc<dyn ResourceTemplateHandler>> {
        self.resource_templates
            .iter()
            .map(|entry| Arc::clone(&entry.value().1))
            .collect()
    }

    /// All tool definitions, in no particular order, for `tools/list`.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<Tool> {
        self.tools.iter().map(|entry| entry.value().tool_definition()).collect()
    }

    /// All prompt definitions for `prompts/list`.
    #[must_use]
    pub fn prompt_definitions(&self) -> Vec<Prompt> {
        self.prompts.iter().map(|entry| entry.value().prompt_definition()).collect()
    }

    /// All fixed-URI resource definitions for `resources/list`.
    #[must_use]
    pub fn resource_definitions(&self) -> Vec<Resource> {
        self.resources
            .iter()
            .map(|entry| entry.value().resource_definition())
            .collect()
    }

    /// Remove a tool by name, returning whether one was present.
    pub fn unregister_tool(&self, name: &str) -> bool {
        let removed = self.tools.remove(name).is_some();
        if removed {
            self.metadata.remove(&format!("tool:{name}"));
            tracing::info!(tool = %name, "unregistered tool");
            self.emit(RegistryEvent::Unregistered {
                category: "tool",
                name: name.to_string(),
            });
        }
        removed
    }

    /// Remove a prompt by name, returning whether one was present.
    pub fn unregister_prompt(&self, name: &str) -> bool {
        let removed = self.prompts.remove(name).is_some();
        if removed {
            self.metadata.remove(&format!("prompt:{name}"));
            tracing::info!(prompt = %name, "unregistered prompt");
            self.emit(RegistryEvent::Unregistered {
                category: "prompt",
                name: name.to_string(),
            });
        }
        removed
    }

    /// Remove a resource by URI, returning whether one was present.
    pub fn unregister_resource(&self, uri: &str) -> bool {
        let removed = self.resources.remove(uri).is_some();
        if removed {
            self.metadata.remove(&format!("resource:{uri}"));
            tracing::info!(resource = %uri, "unregistered resource");
            self.emit(RegistryEvent::Unregistered {
                category: "resource",
                name: uri.to_string(),
            });
        }
        removed
    }

    /// Empty every category.
    pub fn clear(&self) {
        self.tools.clear();
        self.prompts.clear();
        self.resources.clear();
        self.resource_templates.clear();
        self.sampling.clear();
        self.logging.clear();
        self.metadata.clear();
        self.subscriptions.clear();
        tracing::info!("cleared registry");
    }

    /// Current per-category counts.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            tool_count: self.tools.len(),
            prompt_count: self.prompts.len(),
            resource_count: self.resources.len(),
            resource_template_count: self.resource_templates.len(),
            sampling_count: self.sampling.len(),
            logging_count: self.logging.len(),
            total_count: self.tools.len()
                + self.prompts.len()
                + self.resources.len()
                + self.resource_templates.len()
                + self.sampling.len()
                + self.logging.len(),
        }
    }

    /// Metadata recorded for one registered name/URI, keyed
    /// `"<category>:<name>"` (e.g. `"tool:echo"`).
    #[must_use]
    pub fn get_metadata(&self, key: &str) -> Option<HandlerMetadata> {
        self.metadata.get(key).map(|entry| entry.value().clone())
    }

    fn check_capacity<K, V>(&self, map: &DashMap<K, V>, category: &str) -> ServerResult<()>
    where
        K: std::hash::Hash + Eq,
    {
        if map.len() >= self.config.read().max_handlers_per_type {
            return Err(ErrorKind::InternalError(format!(
                "maximum number of {category} handlers exceeded"
            )));
        }
        Ok(())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent constructor for a [`HandlerRegistry`] with non-default limits.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    config: RegistryConfig,
}

impl RegistryBuilder {
    /// Start from default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-category handler cap.
    #[must_use]
    pub const fn max_handlers_per_type(mut self, max: usize) -> Self {
        self.config.max_handlers_per_type = max;
        self
    }

    /// Mirror `ServerCapabilities.tools.listChanged`, gating `update_tools`.
    #[must_use]
    pub const fn tools_list_changed(mut self, enabled: bool) -> Self {
        self.config.tools_list_changed = enabled;
        self
    }

    /// Build the registry.
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::utils;
    use mcp_protocol::types::CallToolResult;

    fn noop_tool(name: &str) -> impl ToolHandler {
        utils::tool(name, "does nothing", |_req, _ctx| async move {
            Ok(CallToolResult {
                content: vec![],
                is_error: Some(false),
                structured_content: None,
            })
        })
    }

    #[test]
    fn duplicate_tool_name_is_rejected() {
        let registry = HandlerRegistry::new();
        registry.register_tool(noop_tool("echo")).unwrap();
        let err = registry.register_tool(noop_tool("echo")).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::AlreadyRegistered { kind: "tool", .. }
        ));
    }

    #[test]
    fn update_tools_atomically_replaces_the_whole_set() {
        let registry = RegistryBuilder::new().tools_list_changed(true).build();
        registry.register_tool(noop_tool("old")).unwrap();
        registry
            .update_tools(vec![noop_tool("new_a"), noop_tool("new_b")])
            .unwrap();

        assert!(registry.get_tool("old").is_none());
        assert!(registry.get_tool("new_a").is_some());
        assert!(registry.get_tool("new_b").is_some());
        assert_eq!(registry.stats().tool_count, 2);
    }

    #[test]
    fn update_tools_without_tools_list_changed_is_rejected() {
        let registry = HandlerRegistry::new();
        let err = registry.update_tools(vec![noop_tool("new")]).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::CapabilityNotSupported { capability } if capability == "tools.listChanged"
        ));
        assert_eq!(registry.stats().tool_count, 0);
    }

    #[test]
    fn update_tools_rejects_duplicate_names_in_the_same_batch() {
        let registry = RegistryBuilder::new().tools_list_changed(true).build();
        let err = registry
            .update_tools(vec![noop_tool("dup"), noop_tool("dup")])
            .unwrap_err();
        assert!(matches!(err, ErrorKind::InternalError(_)));
        assert_eq!(registry.stats().tool_count, 0);
    }

    #[test]
    fn resource_template_match_extracts_variables() {
        let registry = HandlerRegistry::new();
        registry
            .register_resource_template(utils::resource_template(
                "/users/{id}/posts/{post}",
                "user-post",
                |_uri, _vars, _ctx| async move {
                    Ok(mcp_protocol::types::ReadResourceResult { contents: vec![] })
                },
            ))
            .unwrap();

        let (_, vars) = registry.match_resource_template("/users/42/posts/7").unwrap();
        assert_eq!(vars.get("id"), Some(&"42".to_string()));
        assert_eq!(vars.get("post"), Some(&"7".to_string()));
        assert!(registry.match_resource_template("/unrelated").is_none());
    }

    #[test]
    fn stats_report_total_across_every_category() {
        let registry = HandlerRegistry::new();
        registry.register_tool(noop_tool("echo")).unwrap();
        let stats = registry.stats();
        assert_eq!(stats.tool_count, 1);
        assert_eq!(stats.total_count, 1);
    }

    #[test]
    fn resource_template_uniqueness_is_keyed_by_name_not_pattern() {
        let registry = HandlerRegistry::new();
        registry
            .register_resource_template(utils::resource_template(
                "/users/{id}",
                "user-a",
                |_uri, _vars, _ctx| async move {
                    Ok(mcp_protocol::types::ReadResourceResult { contents: vec![] })
                },
            ))
            .unwrap();

        // Same pattern, different name: allowed (§3's invariant is on name).
        registry
            .register_resource_template(utils::resource_template(
                "/users/{id}",
                "user-b",
                |_uri, _vars, _ctx| async move {
                    Ok(mcp_protocol::types::ReadResourceResult { contents: vec![] })
                },
            ))
            .unwrap();
        assert_eq!(registry.stats().resource_template_count, 2);

        // Same name again: rejected.
        let err = registry
            .register_resource_template(utils::resource_template(
                "/posts/{id}",
                "user-a",
                |_uri, _vars, _ctx| async move {
                    Ok(mcp_protocol::types::ReadResourceResult { contents: vec![] })
                },
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::AlreadyRegistered {
                kind: "resource_template",
                ..
            }
        ));
    }

    #[test]
    fn resource_template_is_looked_up_by_exact_pattern() {
        let registry = HandlerRegistry::new();
        registry
            .register_resource_template(utils::resource_template(
                "/users/{id}",
                "user",
                |_uri, _vars, _ctx| async move {
                    Ok(mcp_protocol::types::ReadResourceResult { contents: vec![] })
                },
            ))
            .unwrap();

        assert!(registry.get_resource_template("/users/{id}").is_some());
        assert!(registry.get_resource_template("/users/42").is_none());
    }

    #[test]
    fn subscriptions_are_refcounted() {
        let registry = HandlerRegistry::new();
        assert!(!registry.is_subscribed("file:///a"));

        registry.subscribe_resource("file:///a");
        registry.subscribe_resource("file:///a");
        assert!(registry.is_subscribed("file:///a"));

        assert!(registry.unsubscribe_resource("file:///a"));
        assert!(registry.is_subscribed("file:///a"));

        assert!(registry.unsubscribe_resource("file:///a"));
        assert!(!registry.is_subscribed("file:///a"));

        assert!(!registry.unsubscribe_resource("file:///missing"));
    }
}
