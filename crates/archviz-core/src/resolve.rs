//! Icon resolution policy.
//!
//! [`IconResolver`] decides which [`IconResource`] a node is drawn with. The
//! requested identifier is accepted only if it passes, in order:
//!
//! 1. the allowed-prefix check (trusted icon families),
//! 2. the strict allowlist, when one is configured,
//! 3. a registry lookup.
//!
//! Failing any step substitutes the configured fallback icon and reports
//! `used_fallback = true`. A fallback that is itself missing from the
//! registry is a configuration error.

use std::collections::BTreeSet;

use log::debug;
use serde::Deserialize;

use crate::{
    error::ResolveError,
    icon::{IconRegistry, IconResource},
};

/// Policy settings for [`IconResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Identifier prefixes naming trusted icon families.
    allowed_prefixes: Vec<String>,

    /// Icon substituted when a requested one is refused or missing.
    fallback: String,

    /// Whether the renderer marks fallback nodes in their label.
    annotate_fallback: bool,

    /// Exact identifiers accepted; empty or absent disables the check.
    strict_allowlist: Option<BTreeSet<String>>,
}

impl ResolverConfig {
    /// Creates a config with the given prefixes and fallback, annotation on
    /// and no strict allowlist.
    pub fn new(allowed_prefixes: Vec<String>, fallback: impl Into<String>) -> Self {
        Self {
            allowed_prefixes,
            fallback: fallback.into(),
            annotate_fallback: true,
            strict_allowlist: None,
        }
    }

    /// Enables or disables fallback annotation.
    pub fn with_annotate_fallback(mut self, annotate: bool) -> Self {
        self.annotate_fallback = annotate;
        self
    }

    /// Restricts accepted icons to the given identifiers.
    pub fn with_strict_allowlist<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strict_allowlist = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn allowed_prefixes(&self) -> &[String] {
        &self.allowed_prefixes
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn annotate_fallback(&self) -> bool {
        self.annotate_fallback
    }

    /// The strict allowlist, if one is configured and non-empty.
    pub fn strict_allowlist(&self) -> Option<&BTreeSet<String>> {
        self.strict_allowlist.as_ref().filter(|ids| !ids.is_empty())
    }

    /// Whether `icon_id` starts with one of the allowed prefixes.
    pub fn is_prefix_allowed(&self, icon_id: &str) -> bool {
        self.allowed_prefixes
            .iter()
            .any(|prefix| icon_id.starts_with(prefix.as_str()))
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new(
            vec!["diagrams.azure.".to_string(), "diagrams.onprem.".to_string()],
            "diagrams.azure.general.Resource",
        )
    }
}

/// Outcome of resolving one icon identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    resource: &'a IconResource,
    used_fallback: bool,
}

impl<'a> Resolution<'a> {
    /// The resource to draw.
    pub fn resource(&self) -> &'a IconResource {
        self.resource
    }

    /// Whether the fallback was substituted for the requested icon.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }
}

/// Maps requested icon identifiers to drawable resources.
#[derive(Debug, Clone)]
pub struct IconResolver {
    registry: IconRegistry,
    config: ResolverConfig,
}

impl IconResolver {
    pub fn new(registry: IconRegistry, config: ResolverConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &IconRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Checks that the fallback icon resolves.
    ///
    /// Call this at startup to surface a broken configuration before any
    /// request arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::FallbackUnavailable`] if the fallback is not
    /// in the registry.
    pub fn ensure_fallback(&self) -> Result<&IconResource, ResolveError> {
        self.registry
            .lookup(&self.config.fallback)
            .map_err(|_| ResolveError::FallbackUnavailable(self.config.fallback.clone()))
    }

    /// Resolves `icon_id` according to the policy described in the module docs.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::FallbackUnavailable`] when a fallback is needed
    /// and cannot be resolved.
    pub fn resolve(&self, icon_id: &str) -> Result<Resolution<'_>, ResolveError> {
        if !self.config.is_prefix_allowed(icon_id) {
            debug!(icon = icon_id; "Icon outside allowed prefixes, using fallback");
            return self.fallback();
        }

        let refused = self
            .config
            .strict_allowlist()
            .is_some_and(|allowlist| !allowlist.contains(icon_id));
        if refused {
            debug!(icon = icon_id; "Icon not in strict allowlist, using fallback");
            return self.fallback();
        }

        match self.registry.lookup(icon_id) {
            Ok(resource) => Ok(Resolution {
                resource,
                used_fallback: false,
            }),
            Err(err) => {
                debug!(icon = icon_id, err:%; "Icon lookup failed, using fallback");
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> Result<Resolution<'_>, ResolveError> {
        self.ensure_fallback().map(|resource| Resolution {
            resource,
            used_fallback: true,
        })
    }
}
