//! In-process backend.
//!
//! Lays the scene out with `layout-rs`, writes the result as SVG and
//! rasterizes it with `resvg`. No external executable is needed, at the cost
//! of a simpler drawing: the layout engine has no notion of clusters, so an
//! element's group is shown as a caption prefix, and only the left-to-right
//! and top-to-bottom orientations exist.

use std::{fs, path::Path, sync::Arc};

use layout::{
    backends::svg::SVGWriter,
    core::{base::Orientation, color::Color as LayoutColor, geometry::Point, style::StyleAttr},
    std_shapes::shapes::{Arrow, Element as LayoutElement, ShapeKind},
    topo::layout::VisualGraph,
};
use log::{debug, trace};

use archviz_core::{icon::IconShape, spec::Direction};

use super::{Backend, BackendError};
use crate::scene::{Element, Scene};

const CHAR_WIDTH: f64 = 8.0;
const MIN_WIDTH: f64 = 110.0;
const MAX_WIDTH: f64 = 360.0;
const NODE_HEIGHT: f64 = 56.0;

/// Draws scenes without external tools.
pub struct NativeBackend {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl NativeBackend {
    /// Creates the backend, loading system fonts once.
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        debug!(faces = fontdb.len(); "Loaded system fonts");
        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Lays `scene` out and returns the SVG document.
    pub fn to_svg(&self, scene: &Scene) -> String {
        let orientation = orientation(scene.direction());
        let mut graph = VisualGraph::new(orientation);

        let title_look = StyleAttr::new(LayoutColor::new(0xffffffff), 0, None, 0, 18);
        graph.add_node(LayoutElement::create(
            ShapeKind::new_box(&svg_text(scene.title())),
            title_look,
            orientation,
            Point::new(text_width(scene.title()) * 1.3, 40.0),
        ));

        let mut handles = Vec::new();
        for element in scene.elements() {
            let caption = svg_text(element.caption());
            let handle = graph.add_node(layout_element(element, caption, orientation));
            handles.push((element.key(), handle));
        }
        for group in scene.groups() {
            for element in group.elements() {
                let caption = svg_text(&format!("{} / {}", group.label(), element.caption()));
                let handle = graph.add_node(layout_element(element, caption, orientation));
                handles.push((element.key(), handle));
            }
        }

        let handle_of = |key: &str| {
            handles
                .iter()
                .find(|(candidate, _)| *candidate == key)
                .map(|(_, handle)| *handle)
        };
        for connection in scene.connections() {
            let (Some(from), Some(to)) = (handle_of(connection.from()), handle_of(connection.to()))
            else {
                trace!(from = connection.from(), to = connection.to(); "Skipping unmatched connection");
                continue;
            };
            let label = connection.label().map(svg_text).unwrap_or_default();
            graph.add_edge(Arrow::simple(&label), from, to);
        }

        let mut writer = SVGWriter::new();
        graph.do_it(false, false, false, &mut writer);
        writer.finalize()
    }

    fn rasterize(&self, svg: &str, output: &Path) -> Result<(), BackendError> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);
        options.font_family = "Sans-Serif".to_string();

        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|err| BackendError::Engine(format!("failed to parse SVG: {err}")))?;
        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            BackendError::Engine("failed to allocate pixmap for raster rendering".to_string())
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        let png = pixmap
            .encode_png()
            .map_err(|err| BackendError::Engine(format!("failed to encode PNG: {err}")))?;
        fs::write(output, png)?;
        Ok(())
    }
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for NativeBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn draw(&self, scene: &Scene, output: &Path) -> Result<(), BackendError> {
        let svg = self.to_svg(scene);
        trace!(bytes = svg.len(); "Native layout finished");
        self.rasterize(&svg, output)?;
        debug!(output = output.display().to_string(); "Native backend finished");
        Ok(())
    }
}

fn orientation(direction: Direction) -> Orientation {
    match direction {
        Direction::LR | Direction::RL => Orientation::LeftToRight,
        Direction::TB | Direction::BT => Orientation::TopToBottom,
    }
}

fn layout_element(element: &Element, caption: String, orientation: Orientation) -> LayoutElement {
    let icon = element.icon();
    let fill = LayoutColor::new(icon.fill().to_rgba_u32());
    let rounded = match icon.shape() {
        IconShape::Rounded | IconShape::Cylinder | IconShape::Folder => 10,
        _ => 0,
    };
    let look = StyleAttr::new(LayoutColor::new(0x333333ff), 1, Some(fill), rounded, 13);
    let size = Point::new(text_width(&caption), NODE_HEIGHT);
    let shape = match icon.shape() {
        IconShape::Ellipse | IconShape::Person => ShapeKind::new_circle(&caption),
        _ => ShapeKind::new_box(&caption),
    };
    LayoutElement::create(shape, look, orientation, size)
}

/// Keeps text free of XML markup characters before it reaches the SVG writer.
fn svg_text(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '&' => '+',
            '<' => '‹',
            '>' => '›',
            '"' => '\'',
            _ => ch,
        })
        .collect()
}

fn text_width(text: &str) -> f64 {
    (text.chars().count() as f64 * CHAR_WIDTH + 40.0).clamp(MIN_WIDTH, MAX_WIDTH)
}
