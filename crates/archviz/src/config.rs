//! Configuration types for archviz rendering and orchestration.
//!
//! This module provides configuration structures that control validation
//! bounds, icon policy, artifact placement, the layout backend and the model
//! used by the assistant. All types implement [`serde::Deserialize`] so they
//! can be loaded from a TOML file, and every section falls back to its
//! defaults when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`IconConfig`] - Icon resolution policy plus extra registry entries.
//! - [`OutputConfig`] - Where artifacts are written and how they are addressed.
//! - [`RenderConfig`] - Which layout backend draws diagrams.
//! - [`ModelConfig`] - Which language model the assistant talks to.
//!
//! # Example
//!
//! ```
//! # use archviz::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.limits().max_nodes(), 60);
//! assert_eq!(config.output().url_for("a.png"), "/static/diagrams/a.png");
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use serde::Deserialize;

use archviz_core::{
    color::Color,
    icon::{IconRegistry, IconResource, IconShape},
    resolve::{IconResolver, ResolverConfig},
    spec::Limits,
};

use crate::export::BackendKind;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Validation bounds.
    #[serde(default)]
    limits: Limits,

    /// Icon policy section.
    #[serde(default)]
    icons: IconConfig,

    /// Artifact output section.
    #[serde(default)]
    output: OutputConfig,

    /// Layout backend section.
    #[serde(default)]
    render: RenderConfig,

    /// Language model section.
    #[serde(default)]
    model: ModelConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        limits: Limits,
        icons: IconConfig,
        output: OutputConfig,
        render: RenderConfig,
        model: ModelConfig,
    ) -> Self {
        Self {
            limits,
            icons,
            output,
            render,
            model,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Mutable access for environment overrides.
    pub fn limits_mut(&mut self) -> &mut Limits {
        &mut self.limits
    }

    pub fn icons(&self) -> &IconConfig {
        &self.icons
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Mutable access for environment and command-line overrides.
    pub fn output_mut(&mut self) -> &mut OutputConfig {
        &mut self.output
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    /// Mutable access for command-line overrides.
    pub fn render_mut(&mut self) -> &mut RenderConfig {
        &mut self.render
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ModelConfig {
        &mut self.model
    }
}

/// An icon added to the registry from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IconEntry {
    id: String,
    #[serde(default)]
    shape: IconShape,
    #[serde(default)]
    fill: Color,
    #[serde(default)]
    image: Option<PathBuf>,
}

impl IconEntry {
    pub fn new(id: impl Into<String>, shape: IconShape, fill: Color) -> Self {
        Self {
            id: id.into(),
            shape,
            fill,
            image: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn to_resource(&self) -> IconResource {
        let resource = IconResource::new(self.id.clone(), self.shape, self.fill.clone());
        match &self.image {
            Some(image) => resource.with_image(image.clone()),
            None => resource,
        }
    }
}

/// Icon resolution policy and registry extensions.
///
/// The resolver settings (`allowed_prefixes`, `fallback`,
/// `annotate_fallback`, `strict_allowlist`) sit directly in the `[icons]`
/// table next to the registry options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IconConfig {
    #[serde(flatten)]
    resolver: ResolverConfig,

    /// Directory holding `<icon id>.png` images for registry entries.
    #[serde(default)]
    image_dir: Option<PathBuf>,

    /// Additional registry entries, replacing built-ins with the same id.
    #[serde(default)]
    extra: Vec<IconEntry>,
}

impl IconConfig {
    pub fn new(resolver: ResolverConfig) -> Self {
        Self {
            resolver,
            image_dir: None,
            extra: Vec::new(),
        }
    }

    /// Adds a registry entry.
    pub fn with_extra(mut self, entry: IconEntry) -> Self {
        self.extra.push(entry);
        self
    }

    /// Sets the icon image directory.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    pub fn resolver(&self) -> &ResolverConfig {
        &self.resolver
    }

    pub fn image_dir(&self) -> Option<&Path> {
        self.image_dir.as_deref()
    }

    pub fn extra(&self) -> &[IconEntry] {
        &self.extra
    }

    /// Builds the registry described by this section: the built-in catalog,
    /// then extra entries, then images from `image_dir`.
    pub fn build_registry(&self) -> IconRegistry {
        let mut registry = IconRegistry::builtin();
        for entry in &self.extra {
            registry.register(entry.to_resource());
        }
        if let Some(dir) = &self.image_dir {
            registry.attach_images(dir);
        }
        debug!(icons = registry.len(), extra = self.extra.len(); "Icon registry built");
        registry
    }

    /// Builds a resolver over [`Self::build_registry`].
    pub fn build_resolver(&self) -> IconResolver {
        IconResolver::new(self.build_registry(), self.resolver.clone())
    }
}

/// Where artifacts are written and how callers address them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving rendered images. Created on demand.
    dir: PathBuf,

    /// First component of every artifact file name.
    file_prefix: String,

    /// Path prefix under which `dir` is served.
    url_prefix: String,

    /// Path prefix of the download route.
    download_prefix: String,
}

impl OutputConfig {
    /// Creates an output section writing to `dir` with default prefixes.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn set_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.dir = dir.into();
        self
    }

    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// The public URL of an artifact file.
    pub fn url_for(&self, filename: &str) -> String {
        join_route(&self.url_prefix, filename)
    }

    /// The download route of an artifact file.
    pub fn download_for(&self, filename: &str) -> String {
        join_route(&self.download_prefix, filename)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static/diagrams"),
            file_prefix: "arch".to_string(),
            url_prefix: "/static/diagrams".to_string(),
            download_prefix: "/download".to_string(),
        }
    }
}

fn join_route(prefix: &str, filename: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), filename)
}

/// Layout backend selection and graph-wide drawing attributes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    backend: BackendKind,

    /// Padding around the drawing, in inches.
    pad: String,

    /// Edge routing style passed to the graphviz backend.
    splines: String,
}

impl RenderConfig {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn set_backend(&mut self, backend: BackendKind) -> &mut Self {
        self.backend = backend;
        self
    }

    pub fn pad(&self) -> &str {
        &self.pad
    }

    pub fn splines(&self) -> &str {
        &self.splines
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            pad: "0.2".to_string(),
            splines: "ortho".to_string(),
        }
    }
}

/// Language model settings used by the assistant.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider name, e.g. `openai`, `anthropic` or `ollama`.
    provider: String,

    /// Model identifier passed to the provider.
    model: String,

    /// Environment variable holding the API key.
    api_key_env: String,

    /// Custom endpoint, for self-hosted or proxied providers.
    base_url: Option<String>,

    /// Upper bound on one model call, in seconds.
    timeout_secs: u64,

    /// Upper bound on the reply length, in tokens.
    max_tokens: u32,

    temperature: f32,
}

impl ModelConfig {
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.model = model.into();
        self
    }

    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "ARCHVIZ_API_KEY".to_string(),
            base_url: None,
            timeout_secs: 60,
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}
