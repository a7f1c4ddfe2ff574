//! Layout backends that turn a [`Scene`] into an image file.
//!
//! This is the last stage of the rendering pipeline:
//!
//! ```text
//! Raw JSON spec
//!     ↓ validate
//! DiagramSpec
//!     ↓ resolve icons
//! Scene
//!     ↓ draw (this module)
//! PNG artifact
//! ```
//!
//! # Available Backends
//!
//! - [`graphviz`]: emits a DOT graph and runs the `dot` executable
//!   (requires the `graphviz` feature and a Graphviz installation)
//! - [`native`]: lays the graph out in-process and rasterizes it, with no
//!   external tools

#[cfg(feature = "graphviz")]
pub mod graphviz;
pub mod native;

use std::{fmt, io, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::{config::RenderConfig, scene::Scene};

/// Abstraction over diagram layout backends.
///
/// Implementors draw a complete scene to `output`. Backends are shared across
/// threads by the renderer, so they hold configuration only.
pub trait Backend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Draws `scene` as a PNG image at `output`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the layout engine fails or the image
    /// cannot be written.
    fn draw(&self, scene: &Scene, output: &Path) -> Result<(), BackendError>;
}

/// Errors raised by a layout backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} backend is not available in this build")]
    Unavailable(BackendKind),

    #[error("layout engine failed: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Which backend draws diagrams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// The Graphviz `dot` executable.
    #[default]
    Graphviz,
    /// The in-process layout engine.
    Native,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Graphviz => "graphviz",
            BackendKind::Native => "native",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates the backend selected by `config`.
///
/// # Errors
///
/// Returns [`BackendError::Unavailable`] when the graphviz backend is
/// requested but the crate was built without the `graphviz` feature.
pub fn create_backend(config: &RenderConfig) -> Result<Box<dyn Backend>, BackendError> {
    match config.backend() {
        #[cfg(feature = "graphviz")]
        BackendKind::Graphviz => Ok(Box::new(graphviz::GraphvizBackend::new(
            config.pad(),
            config.splines(),
        ))),
        #[cfg(not(feature = "graphviz"))]
        BackendKind::Graphviz => Err(BackendError::Unavailable(BackendKind::Graphviz)),
        BackendKind::Native => Ok(Box::new(native::NativeBackend::new())),
    }
}
