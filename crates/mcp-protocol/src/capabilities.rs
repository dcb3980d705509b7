//! Capability negotiation between a client's declared [`ClientCapabilities`]
//! and a server's declared [`ServerCapabilities`].

use std::collections::{HashMap, HashSet};

use crate::types::{ClientCapabilities, ServerCapabilities};

/// Matches features against compatibility rules and produces a negotiated set.
#[derive(Debug, Clone)]
pub struct CapabilityMatcher {
    compatibility_rules: HashMap<String, CompatibilityRule>,
    defaults: HashMap<String, bool>,
}

/// How a feature's availability is determined from the two capability sets.
#[derive(Debug, Clone)]
pub enum CompatibilityRule {
    /// Needs both sides to declare support.
    RequireBoth,
    /// Needs only the client to declare support.
    RequireClient,
    /// Needs only the server to declare support.
    RequireServer,
    /// Enabled regardless of either side's declaration.
    Optional,
    /// Caller-supplied predicate for anything unusual.
    Custom(fn(&ClientCapabilities, &ServerCapabilities) -> bool),
}

/// The result of negotiating a client/server capability pair.
#[derive(Debug, Clone)]
pub struct CapabilitySet {
    /// Feature names enabled for this session.
    pub enabled_features: HashSet<String>,
    /// The client capabilities that were negotiated.
    pub client_capabilities: ClientCapabilities,
    /// The server capabilities that were negotiated.
    pub server_capabilities: ServerCapabilities,
}

/// Drives negotiation, optionally failing hard on any incompatibility.
#[derive(Debug, Clone)]
pub struct CapabilityNegotiator {
    matcher: CapabilityMatcher,
    strict_mode: bool,
}

impl Default for CapabilityMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityMatcher {
    /// A matcher pre-loaded with the MCP spec's standard feature rules:
    /// tools/prompts/resources/logging are server-only, sampling/roots are
    /// client-only, progress is optional and on by default.
    pub fn new() -> Self {
        let mut matcher = Self {
            compatibility_rules: HashMap::new(),
            defaults: HashMap::new(),
        };

        matcher.add_rule("tools", CompatibilityRule::RequireServer);
        matcher.add_rule("prompts", CompatibilityRule::RequireServer);
        matcher.add_rule("resources", CompatibilityRule::RequireServer);
        matcher.add_rule("logging", CompatibilityRule::RequireServer);
        matcher.add_rule("completions", CompatibilityRule::RequireServer);
        matcher.add_rule("sampling", CompatibilityRule::RequireClient);
        matcher.add_rule("roots", CompatibilityRule::RequireClient);
        matcher.add_rule("progress", CompatibilityRule::Optional);
        matcher.set_default("progress", true);

        matcher
    }

    /// Register a rule for `feature`, overwriting any existing one.
    pub fn add_rule(&mut self, feature: &str, rule: CompatibilityRule) {
        self.compatibility_rules.insert(feature.to_string(), rule);
    }

    /// Set whether `feature` is enabled when neither side explicitly decides it.
    pub fn set_default(&mut self, feature: &str, enabled: bool) {
        self.defaults.insert(feature.to_string(), enabled);
    }

    /// Whether `feature` is usable given the two declared capability sets.
    pub fn is_compatible(
        &self,
        feature: &str,
        client: &ClientCapabilities,
        server: &ServerCapabilities,
    ) -> bool {
        self.compatibility_rules.get(feature).map_or_else(
            || Self::client_has_feature(feature, client) || Self::server_has_feature(feature, server),
            |rule| match rule {
                CompatibilityRule::RequireBoth => {
                    Self::client_has_feature(feature, client) && Self::server_has_feature(feature, server)
                }
                CompatibilityRule::RequireClient => Self::client_has_feature(feature, client),
                CompatibilityRule::RequireServer => Self::server_has_feature(feature, server),
                CompatibilityRule::Optional => true,
                CompatibilityRule::Custom(func) => func(client, server),
            },
        )
    }

    fn client_has_feature(feature: &str, client: &ClientCapabilities) -> bool {
        match feature {
            "sampling" => client.sampling.is_some(),
            "roots" => client.roots.is_some(),
            "elicitation" => client.elicitation.is_some(),
            _ => client
                .experimental
                .as_ref()
                .is_some_and(|experimental| experimental.contains_key(feature)),
        }
    }

    fn server_has_feature(feature: &str, server: &ServerCapabilities) -> bool {
        match feature {
            "tools" => server.tools.is_some(),
            "prompts" => server.prompts.is_some(),
            "resources" => server.resources.is_some(),
            "logging" => server.logging.is_some(),
            "completions" => server.completions.is_some(),
            _ => server
                .experimental
                .as_ref()
                .is_some_and(|experimental| experimental.contains_key(feature)),
        }
    }

    fn all_features(&self, client: &ClientCapabilities, server: &ServerCapabilities) -> HashSet<String> {
        let mut features = HashSet::new();

        if client.sampling.is_some() {
            features.insert("sampling".to_string());
        }
        if client.roots.is_some() {
            features.insert("roots".to_string());
        }
        if client.elicitation.is_some() {
            features.insert("elicitation".to_string());
        }
        if server.tools.is_some() {
            features.insert("tools".to_string());
        }
        if server.prompts.is_some() {
            features.insert("prompts".to_string());
        }
        if server.resources.is_some() {
            features.insert("resources".to_string());
        }
        if server.logging.is_some() {
            features.insert("logging".to_string());
        }
        if server.completions.is_some() {
            features.insert("completions".to_string());
        }
        if let Some(experimental) = &client.experimental {
            features.extend(experimental.keys().cloned());
        }
        if let Some(experimental) = &server.experimental {
            features.extend(experimental.keys().cloned());
        }
        features.extend(self.defaults.keys().cloned());

        features
    }

    /// Negotiate, failing if any feature both sides reference turns out incompatible.
    pub fn negotiate(
        &self,
        client: &ClientCapabilities,
        server: &ServerCapabilities,
    ) -> Result<CapabilitySet, CapabilityError> {
        let all_features = self.all_features(client, server);
        let mut enabled = HashSet::new();
        let mut incompatible = Vec::new();

        for feature in &all_features {
            if self.is_compatible(feature, client, server) {
                enabled.insert(feature.clone());
            } else {
                incompatible.push(feature.clone());
            }
        }

        if !incompatible.is_empty() {
            return Err(CapabilityError::IncompatibleFeatures(incompatible));
        }

        for (feature, is_default_enabled) in &self.defaults {
            if *is_default_enabled && !enabled.contains(feature) && all_features.contains(feature) {
                enabled.insert(feature.clone());
            }
        }

        Ok(CapabilitySet {
            enabled_features: enabled,
            client_capabilities: client.clone(),
            server_capabilities: server.clone(),
        })
    }
}

impl CapabilityNegotiator {
    /// Build a negotiator around `matcher`, non-strict by default.
    pub const fn new(matcher: CapabilityMatcher) -> Self {
        Self {
            matcher,
            strict_mode: false,
        }
    }

    /// Fail negotiation entirely on any incompatible feature, instead of
    /// silently dropping it.
    #[must_use]
    pub const fn with_strict_mode(mut self) -> Self {
        self.strict_mode = true;
        self
    }

    /// Negotiate, downgrading incompatible-feature errors to a warning and a
    /// reduced feature set unless `strict_mode` is set.
    pub fn negotiate(
        &self,
        client: &ClientCapabilities,
        server: &ServerCapabilities,
    ) -> Result<CapabilitySet, CapabilityError> {
        match self.matcher.negotiate(client, server) {
            Ok(set) => Ok(set),
            Err(CapabilityError::IncompatibleFeatures(features)) if !self.strict_mode => {
                tracing::warn!(?features, "disabling incompatible capabilities");
                let all_features = self.matcher.all_features(client, server);
                let enabled = all_features
                    .into_iter()
                    .filter(|feature| self.matcher.is_compatible(feature, client, server))
                    .collect();
                Ok(CapabilitySet {
                    enabled_features: enabled,
                    client_capabilities: client.clone(),
                    server_capabilities: server.clone(),
                })
            }
            Err(err) => Err(err),
        }
    }
}

impl Default for CapabilityNegotiator {
    fn default() -> Self {
        Self::new(CapabilityMatcher::new())
    }
}

impl CapabilitySet {
    /// Whether `feature` survived negotiation.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.enabled_features.contains(feature)
    }
}

/// Failures that can occur while negotiating capabilities.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CapabilityError {
    /// One or more features could not be reconciled between client and server.
    #[error("incompatible features: {0:?}")]
    IncompatibleFeatures(Vec<String>),
    /// A feature the negotiation required was missing entirely.
    #[error("required feature missing: {0}")]
    RequiredFeatureMissing(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResourcesCapabilities, RootsCapabilities, SamplingCapabilities, ToolsCapabilities};

    #[test]
    fn tools_requires_server_declaration() {
        let matcher = CapabilityMatcher::new();
        let client = ClientCapabilities::default();
        let server_without_tools = ServerCapabilities::default();
        assert!(!matcher.is_compatible("tools", &client, &server_without_tools));

        let server_with_tools = ServerCapabilities {
            tools: Some(ToolsCapabilities::default()),
            ..Default::default()
        };
        assert!(matcher.is_compatible("tools", &client, &server_with_tools));
    }

    #[test]
    fn sampling_requires_client_declaration() {
        let matcher = CapabilityMatcher::new();
        let server = ServerCapabilities::default();
        let client_without_sampling = ClientCapabilities::default();
        assert!(!matcher.is_compatible("sampling", &client_without_sampling, &server));

        let client_with_sampling = ClientCapabilities {
            sampling: Some(SamplingCapabilities),
            ..Default::default()
        };
        assert!(matcher.is_compatible("sampling", &client_with_sampling, &server));
    }

    #[test]
    fn negotiate_collects_enabled_features() {
        let negotiator = CapabilityNegotiator::default();
        let client = ClientCapabilities {
            roots: Some(RootsCapabilities { list_changed: Some(true) }),
            ..Default::default()
        };
        let server = ServerCapabilities {
            resources: Some(ResourcesCapabilities {
                subscribe: Some(true),
                list_changed: Some(true),
            }),
            ..Default::default()
        };
        let set = negotiator.negotiate(&client, &server).unwrap();
        assert!(set.has_feature("roots"));
        assert!(set.has_feature("resources"));
        assert!(set.has_feature("progress"));
    }
}
