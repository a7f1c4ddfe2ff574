//! Drawable icon resources and the registry that names them.
//!
//! Icons are addressed by qualified identifiers such as
//! `diagrams.azure.web.AppServices`. The registry maps each identifier to an
//! [`IconResource`]: the shape and fill a backend should draw, and optionally
//! an image file to draw instead.
//!
//! [`IconRegistry::builtin`] ships a catalog of common cloud and on-premises
//! resources. Additional entries can be registered at runtime.

mod catalog;

use std::{
    fmt,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{color::Color, error::ResolveError};

/// The outline a backend uses for a node when no image is available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconShape {
    #[default]
    Box,
    Rounded,
    Cylinder,
    Ellipse,
    Hexagon,
    Component,
    Folder,
    Note,
    Person,
}

impl IconShape {
    /// Returns the shape name as written in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            IconShape::Box => "box",
            IconShape::Rounded => "rounded",
            IconShape::Cylinder => "cylinder",
            IconShape::Ellipse => "ellipse",
            IconShape::Hexagon => "hexagon",
            IconShape::Component => "component",
            IconShape::Folder => "folder",
            IconShape::Note => "note",
            IconShape::Person => "person",
        }
    }
}

impl fmt::Display for IconShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete drawable resource.
#[derive(Debug, Clone, PartialEq)]
pub struct IconResource {
    id: String,
    shape: IconShape,
    fill: Color,
    image: Option<PathBuf>,
}

impl IconResource {
    /// Creates a resource drawn as `shape` filled with `fill`.
    pub fn new(id: impl Into<String>, shape: IconShape, fill: Color) -> Self {
        Self {
            id: id.into(),
            shape,
            fill,
            image: None,
        }
    }

    /// Sets an image file to draw instead of the plain shape.
    pub fn with_image(mut self, image: impl Into<PathBuf>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// The qualified identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The family this icon belongs to: the identifier without its last
    /// segment, e.g. `diagrams.azure.web` for `diagrams.azure.web.AppServices`.
    pub fn category(&self) -> &str {
        self.id
            .rsplit_once('.')
            .map_or(self.id.as_str(), |(category, _)| category)
    }

    /// The short name: the last segment of the identifier.
    pub fn name(&self) -> &str {
        self.id
            .rsplit_once('.')
            .map_or(self.id.as_str(), |(_, name)| name)
    }

    pub fn shape(&self) -> IconShape {
        self.shape
    }

    pub fn fill(&self) -> &Color {
        &self.fill
    }

    pub fn image(&self) -> Option<&Path> {
        self.image.as_deref()
    }
}

/// Ordered map from qualified identifier to [`IconResource`].
#[derive(Debug, Clone, Default)]
pub struct IconRegistry {
    icons: IndexMap<String, IconResource>,
}

impl IconRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for entry in catalog::ENTRIES {
            match Color::new(entry.fill) {
                Ok(fill) => registry.register(IconResource::new(entry.id, entry.shape, fill)),
                Err(err) => debug!(icon = entry.id, err; "Skipping catalog entry"),
            }
        }
        registry
    }

    /// Adds a resource, replacing any entry with the same identifier.
    pub fn register(&mut self, resource: IconResource) {
        self.icons.insert(resource.id.clone(), resource);
    }

    /// Returns the resource registered under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unresolvable`] when no entry exists.
    pub fn lookup(&self, id: &str) -> Result<&IconResource, ResolveError> {
        self.icons
            .get(id)
            .ok_or_else(|| ResolveError::Unresolvable(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.icons.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Iterates over resources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &IconResource> {
        self.icons.values()
    }

    /// Links image files found in `dir` to their entries.
    ///
    /// An entry `a.b.C` picks up `<dir>/a.b.C.png` when that file exists.
    /// Entries that already carry an image are left alone. Returns the
    /// number of entries that gained an image.
    pub fn attach_images(&mut self, dir: &Path) -> usize {
        let mut attached = 0;
        for resource in self.icons.values_mut() {
            if resource.image.is_some() {
                continue;
            }
            let candidate = dir.join(format!("{}.png", resource.id));
            if candidate.is_file() {
                resource.image = Some(candidate);
                attached += 1;
            }
        }
        info!(dir = dir.display().to_string(), attached; "Attached icon images");
        attached
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_builtin_contains_fallback() {
        let registry = IconRegistry::builtin();
        assert!(registry.contains("diagrams.azure.general.Resource"));
        assert!(registry.contains("diagrams.onprem.client.User"));
        assert_eq!(registry.len(), catalog::ENTRIES.len());
    }

    #[test]
    fn test_lookup_missing() {
        let registry = IconRegistry::builtin();
        let err = registry.lookup("diagrams.azure.web.Nope").unwrap_err();
        assert_eq!(err, ResolveError::Unresolvable("diagrams.azure.web.Nope".into()));
    }

    #[test]
    fn test_category_and_name() {
        let icon = IconResource::new(
            "diagrams.azure.web.AppServices",
            IconShape::Box,
            Color::default(),
        );
        assert_eq!(icon.category(), "diagrams.azure.web");
        assert_eq!(icon.name(), "AppServices");

        let bare = IconResource::new("Plain", IconShape::Box, Color::default());
        assert_eq!(bare.category(), "Plain");
        assert_eq!(bare.name(), "Plain");
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = IconRegistry::new();
        registry.register(IconResource::new("x.A", IconShape::Box, Color::default()));
        registry.register(IconResource::new("x.A", IconShape::Cylinder, Color::default()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("x.A").unwrap().shape(), IconShape::Cylinder);
    }

    #[test]
    fn test_attach_images() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.A.png"), b"png").unwrap();

        let mut registry = IconRegistry::new();
        registry.register(IconResource::new("x.A", IconShape::Box, Color::default()));
        registry.register(IconResource::new("x.B", IconShape::Box, Color::default()));

        assert_eq!(registry.attach_images(dir.path()), 1);
        assert!(registry.lookup("x.A").unwrap().image().is_some());
        assert!(registry.lookup("x.B").unwrap().image().is_none());
    }

    #[test]
    fn test_shape_deserialize() {
        let shape: IconShape = serde_json::from_str("\"cylinder\"").unwrap();
        assert_eq!(shape, IconShape::Cylinder);
    }
}
