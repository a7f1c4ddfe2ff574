//! The diagram renderer.
//!
//! [`DiagramRenderer`] runs one request end to end: validate the raw spec,
//! resolve icons into a [`Scene`], hand the scene to the configured
//! [`Backend`] and check that an artifact landed on disk. Every failure is
//! reported through [`RenderResult`], so callers get `{ok: false, error}`
//! rather than an `Err` or a panic.

use std::{
    fs,
    panic::{self, AssertUnwindSafe},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, error, info, warn};
use serde::{Serialize, Serializer, ser::SerializeStruct};
use serde_json::Value;
use uuid::Uuid;

use archviz_core::{
    resolve::IconResolver,
    spec::{DiagramSpec, Direction, Limits, validate},
};

use crate::{
    config::{AppConfig, OutputConfig},
    error::{ArchvizError, RenderError},
    export::{self, Backend, BackendError},
    scene::Scene,
};

/// Counts describing a rendered diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    title: String,
    direction: Direction,
    node_count: usize,
    edge_count: usize,
    cluster_count: usize,
}

impl Summary {
    /// Summarizes `spec`. Only declared clusters are counted.
    pub fn of(spec: &DiagramSpec) -> Self {
        Self {
            title: spec.title().to_string(),
            direction: spec.direction(),
            node_count: spec.nodes().len(),
            edge_count: spec.edges().len(),
            cluster_count: spec.clusters().len(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }
}

/// A rendered image and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    filename: String,
    url: String,
    summary: Summary,
}

impl Artifact {
    /// Location on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Public URL, `<url_prefix>/<filename>`.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Outcome of one render request.
///
/// Serializes as `{"ok": true, "path", "url", "summary"}` on success and
/// `{"ok": false, "error"}` on failure.
#[derive(Debug)]
pub enum RenderResult {
    Rendered(Artifact),
    Failed(RenderError),
}

impl RenderResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, RenderResult::Rendered(_))
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            RenderResult::Rendered(artifact) => Some(artifact),
            RenderResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RenderError> {
        match self {
            RenderResult::Rendered(_) => None,
            RenderResult::Failed(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<Artifact, RenderError> {
        match self {
            RenderResult::Rendered(artifact) => Ok(artifact),
            RenderResult::Failed(err) => Err(err),
        }
    }
}

impl From<Result<Artifact, RenderError>> for RenderResult {
    fn from(result: Result<Artifact, RenderError>) -> Self {
        match result {
            Ok(artifact) => RenderResult::Rendered(artifact),
            Err(err) => RenderResult::Failed(err),
        }
    }
}

impl Serialize for RenderResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RenderResult::Rendered(artifact) => {
                let mut state = serializer.serialize_struct("RenderResult", 4)?;
                state.serialize_field("ok", &true)?;
                state.serialize_field("path", &artifact.path)?;
                state.serialize_field("url", &artifact.url)?;
                state.serialize_field("summary", &artifact.summary)?;
                state.end()
            }
            RenderResult::Failed(err) => {
                let mut state = serializer.serialize_struct("RenderResult", 2)?;
                state.serialize_field("ok", &false)?;
                state.serialize_field("error", &err.to_string())?;
                state.end()
            }
        }
    }
}

/// Validates specs and draws them to image files.
///
/// The renderer is `Send + Sync`; share it through an `Arc` and call
/// [`render`](Self::render) from blocking worker threads.
///
/// # Examples
///
/// ```rust,no_run
/// use archviz::{DiagramRenderer, config::AppConfig};
/// use serde_json::json;
///
/// let renderer = DiagramRenderer::new(&AppConfig::default())
///     .expect("Failed to set up renderer");
///
/// let result = renderer.render(&json!({
///     "title": "Web App",
///     "nodes": [
///         {"id": "user", "label": "User", "icon": "diagrams.onprem.client.User"},
///         {"id": "app", "label": "App", "icon": "diagrams.azure.web.AppServices"}
///     ],
///     "edges": [{"source": "user", "target": "app"}]
/// }));
///
/// println!("{}", serde_json::to_string_pretty(&result).unwrap());
/// ```
pub struct DiagramRenderer {
    resolver: IconResolver,
    limits: Limits,
    output: OutputConfig,
    backend: Box<dyn Backend>,
}

impl DiagramRenderer {
    /// Creates a renderer from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ArchvizError::Resolve`] when the configured fallback icon
    /// cannot be resolved, or [`ArchvizError::Backend`] when the selected
    /// backend is not available in this build.
    pub fn new(config: &AppConfig) -> Result<Self, ArchvizError> {
        let resolver = config.icons().build_resolver();
        resolver.ensure_fallback()?;
        let backend = export::create_backend(config.render())?;
        info!(
            backend = backend.name(),
            icons = resolver.registry().len(),
            output_dir = config.output().dir().display().to_string();
            "Renderer ready"
        );
        Ok(Self::with_backend(
            resolver,
            *config.limits(),
            config.output().clone(),
            backend,
        ))
    }

    /// Creates a renderer around an explicit backend.
    pub fn with_backend(
        resolver: IconResolver,
        limits: Limits,
        output: OutputConfig,
        backend: Box<dyn Backend>,
    ) -> Self {
        Self {
            resolver,
            limits,
            output,
            backend,
        }
    }

    pub fn resolver(&self) -> &IconResolver {
        &self.resolver
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn output(&self) -> &OutputConfig {
        &self.output
    }

    /// Validates `raw` and draws it.
    pub fn render(&self, raw: &Value) -> RenderResult {
        let spec = match validate(raw, &self.limits) {
            Ok(spec) => spec,
            Err(err) => {
                warn!(code:% = err.code(), err:%; "Spec rejected");
                return RenderResult::Failed(err.into());
            }
        };
        self.render_spec(&spec)
    }

    /// Draws an already validated spec.
    pub fn render_spec(&self, spec: &DiagramSpec) -> RenderResult {
        let result = self.draw(spec);
        if let Err(err) = &result {
            error!(code:% = err.code(), err:%; "Render failed");
        }
        result.into()
    }

    fn draw(&self, spec: &DiagramSpec) -> Result<Artifact, RenderError> {
        let filename = artifact_filename(self.output.file_prefix());
        let dir = self.output.dir();
        fs::create_dir_all(dir).map_err(|err| RenderError::OutputDir {
            path: dir.to_path_buf(),
            err,
        })?;
        let path = dir.join(&filename);

        let scene = Scene::build(spec, &self.resolver)?;
        info!(
            backend = self.backend.name(),
            file = filename.as_str(),
            nodes = spec.nodes().len(),
            edges = spec.edges().len();
            "Drawing diagram"
        );

        panic::catch_unwind(AssertUnwindSafe(|| self.backend.draw(&scene, &path)))
            .unwrap_or_else(|_| Err(BackendError::Engine("layout engine panicked".to_string())))?;

        if !path.is_file() {
            return Err(RenderError::NotProduced);
        }
        debug!(path = path.display().to_string(); "Artifact written");

        Ok(Artifact {
            url: self.output.url_for(&filename),
            summary: Summary::of(spec),
            path,
            filename,
        })
    }
}

/// `<prefix>_<unix seconds>_<8 hex chars>.png`
fn artifact_filename(prefix: &str) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let token = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{secs}_{}.png", &token[..8])
}
