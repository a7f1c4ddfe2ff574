//! System prompt and tool definition sent to the model.

use std::fmt::Write;

use serde_json::{Value, json};

use archviz_core::{resolve::IconResolver, spec::Limits};

/// Name of the diagram tool offered to the model.
pub const TOOL_NAME: &str = "render_architecture";

/// Builds the system prompt.
///
/// The icon vocabulary is every registry entry the resolver would accept
/// without falling back, so the model is never told about icons that would
/// be drawn as the generic resource.
pub fn system_prompt(limits: &Limits, resolver: &IconResolver) -> String {
    let mut prompt = String::from(
        "You are a cloud solution architect assistant.\n\
         Decide whether the user wants a diagram. If not, answer in plain text.\n\
         If a diagram is useful, call the `render_architecture` tool with a JSON spec:\n\
         {\"title\": string, \"direction\": \"LR\"|\"TB\"|\"RL\"|\"BT\", \
         \"clusters\": [{\"id\", \"label\"}], \
         \"nodes\": [{\"id\", \"label\", \"icon\", \"cluster\"?}], \
         \"edges\": [{\"source\", \"target\", \"label\"?}]}\n",
    );

    let _ = writeln!(
        prompt,
        "Use at most {} nodes and {} edges. Prefer direction LR unless the user asks otherwise.",
        limits.max_nodes(),
        limits.max_edges()
    );
    prompt.push_str(
        "Every edge must connect declared node ids, and node ids must be unique.\n\
         If you cannot call tools, reply with the spec as a single JSON object \
         containing `nodes` and `edges`.\n\
         Use only these icon identifiers:\n",
    );

    let config = resolver.config();
    for icon in resolver.registry().iter() {
        let allowed = config.is_prefix_allowed(icon.id())
            && config
                .strict_allowlist()
                .is_none_or(|allowlist| allowlist.contains(icon.id()));
        if allowed {
            let _ = writeln!(prompt, "- {}", icon.id());
        }
    }
    let _ = writeln!(
        prompt,
        "For anything else, use {} and describe it in the label.",
        config.fallback()
    );
    prompt
}

/// The JSON tool definition for [`TOOL_NAME`], in the function-calling
/// format most providers accept.
pub fn tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": TOOL_NAME,
            "description": "Render an architecture diagram from nodes, edges and optional clusters.",
            "parameters": {
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "direction": {"type": "string", "enum": ["LR", "TB", "RL", "BT"]},
                    "clusters": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string"},
                                "label": {"type": "string"}
                            },
                            "required": ["id", "label"]
                        }
                    },
                    "nodes": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string"},
                                "label": {"type": "string"},
                                "icon": {"type": "string"},
                                "cluster": {"type": "string"}
                            },
                            "required": ["id", "label", "icon"]
                        }
                    },
                    "edges": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "source": {"type": "string"},
                                "target": {"type": "string"},
                                "label": {"type": "string"}
                            },
                            "required": ["source", "target"]
                        }
                    }
                },
                "required": ["nodes", "edges"]
            }
        }
    })
}
