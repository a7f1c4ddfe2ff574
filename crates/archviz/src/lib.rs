//! archviz - architecture diagrams from language-model output.
//!
//! Validation, icon resolution, layout and orchestration for turning a model's
//! reply into a PNG architecture diagram. The untrusted parts (spec
//! validation, text extraction, icon policy) live in `archviz-core` and are
//! re-exported here.
//!
//! # Pipeline
//!
//! ```text
//! prompt ──► ModelClient ──► tool call / free text
//!                                 │ parse_tool_arguments / extract_spec
//!                                 ▼
//!                          raw JSON spec ──► validate ──► DiagramSpec
//!                                                            │ IconResolver
//!                                                            ▼
//!                                              Scene ──► Backend ──► PNG
//! ```

pub mod assistant;
pub mod config;
pub mod export;
pub mod render;
pub mod scene;

mod error;

pub use archviz_core::{color, extract, icon, resolve, spec};

pub use archviz_core::error::{ErrorCode, Limit, ResolveError, SpecError};
pub use assistant::{Assistant, AssistantConfig, AssistantError, ChatResponse, ModelClient};
pub use error::{ArchvizError, RenderError};
pub use render::{Artifact, DiagramRenderer, RenderResult, Summary};
