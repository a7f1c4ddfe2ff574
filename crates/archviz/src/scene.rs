//! Backend-neutral drawing model.
//!
//! A [`Scene`] is a validated [`DiagramSpec`] with every icon resolved and
//! every label finalized. Backends only translate a scene into their own
//! graph description; they never see raw spec data or resolution policy.

use log::{debug, trace, warn};

use archviz_core::{
    error::ResolveError,
    icon::IconResource,
    resolve::IconResolver,
    spec::{DiagramSpec, Direction},
};

/// Suffix appended to the caption of nodes drawn with the fallback icon.
pub const FALLBACK_SUFFIX: &str = " (generic)";

/// One drawable node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    key: String,
    caption: String,
    icon: IconResource,
    used_fallback: bool,
}

impl Element {
    /// The node id this element was built from.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The text drawn with the node.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn icon(&self) -> &IconResource {
        &self.icon
    }

    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }
}

/// A labeled container of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    id: String,
    label: String,
    implicit: bool,
    elements: Vec<Element>,
}

impl Group {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the group was created for a cluster id nodes reference but
    /// the spec never declares.
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

/// A directed, optionally labeled link between two elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    from: String,
    to: String,
    label: Option<String>,
}

impl Connection {
    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Everything a backend needs to draw one diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    title: String,
    direction: Direction,
    elements: Vec<Element>,
    groups: Vec<Group>,
    connections: Vec<Connection>,
}

impl Scene {
    /// Builds a scene from a validated spec.
    ///
    /// Declared clusters become groups in declaration order, followed by
    /// implicit groups for undeclared cluster ids in first-use order. Nodes
    /// without a cluster are top-level elements. When the resolver's policy
    /// asks for it, fallback nodes get [`FALLBACK_SUFFIX`] on their caption.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::FallbackUnavailable`] when a node needs the
    /// fallback icon and it cannot be resolved.
    pub fn build(spec: &DiagramSpec, resolver: &IconResolver) -> Result<Self, ResolveError> {
        let annotate = resolver.config().annotate_fallback();

        let mut groups: Vec<Group> = spec
            .clusters()
            .iter()
            .map(|cluster| Group {
                id: cluster.id().to_string(),
                label: cluster.label().to_string(),
                implicit: false,
                elements: Vec::new(),
            })
            .collect();
        let mut elements = Vec::new();
        let mut fallbacks = 0usize;

        for node in spec.nodes() {
            let resolution = resolver.resolve(node.icon())?;
            let used_fallback = resolution.used_fallback();
            let mut caption = node.label().to_string();
            if used_fallback {
                fallbacks += 1;
                if annotate {
                    caption.push_str(FALLBACK_SUFFIX);
                }
            }
            let element = Element {
                key: node.id().to_string(),
                caption,
                icon: resolution.resource().clone(),
                used_fallback,
            };
            trace!(node = node.id(), icon = element.icon.id(), used_fallback; "Resolved node");

            let Some(cluster_id) = node.cluster() else {
                elements.push(element);
                continue;
            };
            let index = match groups.iter().position(|group| group.id == cluster_id) {
                Some(index) => index,
                None => {
                    warn!(cluster = cluster_id; "Creating implicit group for undeclared cluster");
                    groups.push(Group {
                        id: cluster_id.to_string(),
                        label: cluster_id.to_string(),
                        implicit: true,
                        elements: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            groups[index].elements.push(element);
        }

        let connections = spec
            .edges()
            .iter()
            .map(|edge| Connection {
                from: edge.source().to_string(),
                to: edge.target().to_string(),
                label: edge.label().map(str::to_string),
            })
            .collect();

        debug!(
            groups = groups.len(),
            top_level = elements.len(),
            fallbacks;
            "Scene built"
        );

        Ok(Self {
            title: spec.title().to_string(),
            direction: spec.direction(),
            elements,
            groups,
            connections,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Elements outside any group.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Iterates over every element, top-level first, then group by group.
    pub fn all_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .chain(self.groups.iter().flat_map(|group| group.elements.iter()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use archviz_core::{
        icon::IconRegistry,
        resolve::ResolverConfig,
        spec::{Limits, validate},
    };

    use super::*;

    fn resolver() -> IconResolver {
        IconResolver::new(IconRegistry::builtin(), ResolverConfig::default())
    }

    fn spec(raw: serde_json::Value) -> DiagramSpec {
        validate(&raw, &Limits::default()).unwrap()
    }

    #[test]
    fn test_fallback_caption_annotated() {
        let spec = spec(json!({
            "nodes": [
                {"id": "a", "label": "API", "icon": "diagrams.azure.web.AppServices"},
                {"id": "b", "label": "Box", "icon": "diagrams.aws.compute.EC2"}
            ],
            "edges": [{"source": "a", "target": "b", "label": "calls"}]
        }));
        let scene = Scene::build(&spec, &resolver()).unwrap();

        let captions: Vec<_> = scene.elements().iter().map(Element::caption).collect();
        assert_eq!(captions, ["API", "Box (generic)"]);
        assert!(scene.elements()[1].used_fallback());
        assert_eq!(scene.connections()[0].label(), Some("calls"));
    }

    #[test]
    fn test_annotation_disabled() {
        let config = ResolverConfig::default().with_annotate_fallback(false);
        let resolver = IconResolver::new(IconRegistry::builtin(), config);
        let spec = spec(json!({
            "nodes": [{"id": "b", "label": "Box", "icon": "os.thing"}],
            "edges": []
        }));
        let scene = Scene::build(&spec, &resolver).unwrap();
        assert_eq!(scene.elements()[0].caption(), "Box");
        assert!(scene.elements()[0].used_fallback());
    }

    #[test]
    fn test_groups_declared_then_implicit() {
        let spec = spec(json!({
            "clusters": [{"id": "web", "label": "Web Tier"}, {"id": "empty", "label": "Empty"}],
            "nodes": [
                {"id": "db", "icon": "diagrams.azure.database.SQLDatabases", "cluster": "data"},
                {"id": "app", "icon": "diagrams.azure.web.AppServices", "cluster": "web"},
                {"id": "user", "icon": "diagrams.onprem.client.User"}
            ],
            "edges": [{"source": "user", "target": "app"}, {"source": "app", "target": "db"}]
        }));
        let scene = Scene::build(&spec, &resolver()).unwrap();

        let groups: Vec<_> = scene
            .groups()
            .iter()
            .map(|group| (group.id(), group.label(), group.is_implicit(), group.elements().len()))
            .collect();
        assert_eq!(
            groups,
            [
                ("web", "Web Tier", false, 1),
                ("empty", "Empty", false, 0),
                ("data", "data", true, 1)
            ]
        );
        assert_eq!(scene.elements().len(), 1);
        assert_eq!(scene.all_elements().count(), 3);
    }

    #[test]
    fn test_missing_fallback_fails() {
        let registry = IconRegistry::new();
        let resolver = IconResolver::new(registry, ResolverConfig::default());
        let spec = spec(json!({
            "nodes": [{"id": "a", "icon": "diagrams.azure.web.AppServices"}],
            "edges": []
        }));
        assert!(matches!(
            Scene::build(&spec, &resolver),
            Err(ResolveError::FallbackUnavailable(_))
        ));
    }
}
