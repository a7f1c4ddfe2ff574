//! Graphviz backend.
//!
//! Translates a [`Scene`] into a DOT digraph and renders it with the `dot`
//! executable. Groups become `cluster_N` subgraphs so Graphviz draws them as
//! boxes; icons with an image are drawn as that image with the caption
//! underneath, the rest as a filled shape.

use std::path::Path;

use dot_structures::{
    Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId, Stmt, Subgraph, Vertex,
};
use graphviz_rust::{
    cmd::{CommandArg, Format},
    exec,
    printer::{DotPrinter, PrinterContext},
};
use log::{debug, trace};

use archviz_core::icon::IconShape;

use super::{Backend, BackendError};
use crate::scene::{Element, Scene};

/// Draws scenes with the Graphviz `dot` executable.
#[derive(Debug, Clone)]
pub struct GraphvizBackend {
    pad: String,
    splines: String,
}

impl GraphvizBackend {
    pub fn new(pad: impl Into<String>, splines: impl Into<String>) -> Self {
        Self {
            pad: pad.into(),
            splines: splines.into(),
        }
    }

    /// Builds the DOT graph for `scene`.
    pub fn to_graph(&self, scene: &Scene) -> Graph {
        let mut stmts = vec![
            Stmt::GAttribute(GraphAttributes::Graph(vec![
                attr("label", quoted(scene.title())),
                attr("labelloc", plain("t")),
                attr("fontsize", plain("20")),
                attr("fontname", quoted("Sans-Serif")),
                attr("rankdir", plain(scene.direction().as_str())),
                attr("pad", quoted(&self.pad)),
                attr("splines", quoted(&self.splines)),
                attr("nodesep", quoted("0.60")),
                attr("ranksep", quoted("0.75")),
            ])),
            Stmt::GAttribute(GraphAttributes::Node(vec![
                attr("fontname", quoted("Sans-Serif")),
                attr("fontsize", plain("13")),
            ])),
            Stmt::GAttribute(GraphAttributes::Edge(vec![
                attr("color", quoted("#7b8894")),
                attr("fontname", quoted("Sans-Serif")),
                attr("fontsize", plain("11")),
            ])),
        ];

        stmts.extend(scene.elements().iter().map(node_stmt));

        for (index, group) in scene.groups().iter().enumerate() {
            let mut inner = vec![
                Stmt::Attribute(attr("label", quoted(group.label()))),
                Stmt::Attribute(attr("style", quoted("rounded,dashed"))),
                Stmt::Attribute(attr("color", quoted("#9aa5b1"))),
                Stmt::Attribute(attr("labeljust", plain("l"))),
            ];
            inner.extend(group.elements().iter().map(node_stmt));
            stmts.push(Stmt::Subgraph(Subgraph {
                id: plain(&format!("cluster_{index}")),
                stmts: inner,
            }));
        }

        for connection in scene.connections() {
            let mut attributes = Vec::new();
            if let Some(label) = connection.label() {
                attributes.push(attr("label", quoted(label)));
            }
            stmts.push(Stmt::Edge(Edge {
                ty: EdgeTy::Pair(
                    Vertex::N(node_id(connection.from())),
                    Vertex::N(node_id(connection.to())),
                ),
                attributes,
            }));
        }

        Graph::DiGraph {
            id: plain("archviz"),
            strict: false,
            stmts,
        }
    }

    /// The DOT source for `scene`.
    pub fn to_dot(&self, scene: &Scene) -> String {
        self.to_graph(scene).print(&mut PrinterContext::default())
    }
}

impl Backend for GraphvizBackend {
    fn name(&self) -> &'static str {
        "graphviz"
    }

    fn draw(&self, scene: &Scene, output: &Path) -> Result<(), BackendError> {
        let graph = self.to_graph(scene);
        trace!(dot = graph.print(&mut PrinterContext::default()); "DOT graph");

        exec(
            graph,
            &mut PrinterContext::default(),
            vec![
                CommandArg::Format(Format::Png),
                CommandArg::Output(output.display().to_string()),
            ],
        )
        .map_err(|err| BackendError::Engine(format!("dot: {err}")))?;

        debug!(output = output.display().to_string(); "Graphviz finished");
        Ok(())
    }
}

fn node_stmt(element: &Element) -> Stmt {
    let icon = element.icon();
    let mut attributes = vec![attr("label", quoted(element.caption()))];

    match icon.image() {
        Some(image) => {
            attributes.extend([
                attr("shape", plain("none")),
                attr("image", quoted(&image.display().to_string())),
                attr("imagescale", plain("true")),
                attr("labelloc", plain("b")),
                attr("width", quoted("1.4")),
                attr("height", quoted("1.9")),
                attr("fixedsize", plain("true")),
            ]);
        }
        None => {
            let (shape, style) = dot_shape(icon.shape());
            attributes.extend([
                attr("shape", plain(shape)),
                attr("style", quoted(style)),
                attr("fillcolor", quoted(&icon.fill().to_hex())),
                attr("margin", quoted("0.2,0.1")),
            ]);
        }
    }

    Stmt::Node(Node {
        id: node_id(element.key()),
        attributes,
    })
}

fn dot_shape(shape: IconShape) -> (&'static str, &'static str) {
    match shape {
        IconShape::Box => ("box", "filled"),
        IconShape::Rounded => ("box", "rounded,filled"),
        IconShape::Cylinder => ("cylinder", "filled"),
        IconShape::Ellipse => ("ellipse", "filled"),
        IconShape::Hexagon => ("hexagon", "filled"),
        IconShape::Component => ("component", "filled"),
        IconShape::Folder => ("folder", "filled"),
        IconShape::Note => ("note", "filled"),
        IconShape::Person => ("egg", "filled"),
    }
}

fn node_id(key: &str) -> NodeId {
    NodeId(quoted(key), None)
}

fn attr(key: &str, value: Id) -> Attribute {
    Attribute(plain(key), value)
}

fn plain(value: &str) -> Id {
    Id::Plain(value.to_string())
}

fn quoted(value: &str) -> Id {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for ch in value.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    Id::Escaped(escaped)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use archviz_core::{
        icon::IconRegistry,
        resolve::{IconResolver, ResolverConfig},
        spec::{Limits, validate},
    };

    use super::*;

    fn scene(raw: serde_json::Value) -> Scene {
        let spec = validate(&raw, &Limits::default()).unwrap();
        let resolver = IconResolver::new(IconRegistry::builtin(), ResolverConfig::default());
        Scene::build(&spec, &resolver).unwrap()
    }

    fn backend() -> GraphvizBackend {
        GraphvizBackend::new("0.2", "ortho")
    }

    #[test]
    fn test_graph_attributes() {
        let scene = scene(json!({
            "title": "Shop",
            "direction": "TB",
            "nodes": [{"id": "a", "icon": "diagrams.azure.web.AppServices"}],
            "edges": []
        }));
        let dot = backend().to_dot(&scene);

        assert!(dot.contains("digraph archviz"), "{dot}");
        assert!(dot.contains("rankdir=TB"), "{dot}");
        assert!(dot.contains("label=\"Shop\""), "{dot}");
        assert!(dot.contains("splines=\"ortho\""), "{dot}");
        assert!(dot.contains("pad=\"0.2\""), "{dot}");
    }

    #[test]
    fn test_groups_become_cluster_subgraphs() {
        let scene = scene(json!({
            "clusters": [{"id": "web", "label": "Web Tier"}],
            "nodes": [
                {"id": "app", "icon": "diagrams.azure.web.AppServices", "cluster": "web"},
                {"id": "db", "icon": "diagrams.azure.database.CosmosDb", "cluster": "data"}
            ],
            "edges": [{"source": "app", "target": "db", "label": "reads"}]
        }));
        let dot = backend().to_dot(&scene);

        assert!(dot.contains("subgraph cluster_0"), "{dot}");
        assert!(dot.contains("subgraph cluster_1"), "{dot}");
        assert!(dot.contains("label=\"Web Tier\""), "{dot}");
        assert!(dot.contains("\"app\""), "{dot}");
        assert!(dot.contains("->"), "{dot}");
        assert!(dot.contains("label=\"reads\""), "{dot}");
    }

    #[test]
    fn test_quoting_escapes_special_characters() {
        assert_eq!(
            quoted("say \"hi\"\\now\nplease"),
            Id::Escaped("\"say \\\"hi\\\"\\\\now\\nplease\"".to_string())
        );
    }

    #[test]
    fn test_fallback_caption_in_label() {
        let scene = scene(json!({
            "nodes": [{"id": "vm", "label": "VM", "icon": "diagrams.aws.compute.EC2"}],
            "edges": []
        }));
        let dot = backend().to_dot(&scene);
        assert!(dot.contains("label=\"VM (generic)\""), "{dot}");
    }
}
