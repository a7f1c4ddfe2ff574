//! Request orchestration between a language model and the renderer.
//!
//! [`Assistant::chat`] sends the user's prompt to a [`ModelClient`] and turns
//! the reply into a [`ChatResponse`]:
//!
//! 1. A structured tool call is parsed and rendered.
//! 2. Otherwise the reply text is scanned for an embedded spec, which is
//!    rendered when found.
//! 3. Otherwise the text is returned as a plain answer.
//!
//! The model call is bounded by a timeout and rendering runs on the blocking
//! thread pool, so a slow layout never stalls the async runtime.

pub mod prompt;

use std::{path::PathBuf, sync::Arc, time::Duration};

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::{task, time};

use archviz_core::{
    error::{ErrorCode, ResolveError},
    extract::{extract_spec, parse_tool_arguments},
};

use crate::{
    error::RenderError,
    render::{Artifact, DiagramRenderer, Summary},
};

/// Answer sent when a diagram was rendered.
pub const DIAGRAM_ANSWER: &str = "Diagram generated.";

/// Answer sent when the model replied with nothing.
const EMPTY_ANSWER: &str = "OK";

/// A structured tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub name: String,
    /// The raw JSON argument string.
    pub arguments: String,
}

/// One model reply: free text, a tool call, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_call: Option<ToolCall>,
}

impl ModelReply {
    /// A reply carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_call: None,
        }
    }

    /// A reply carrying only a tool call.
    pub fn tool_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            text: None,
            tool_call: Some(ToolCall {
                name: name.into(),
                arguments: arguments.into(),
            }),
        }
    }
}

/// A failed model call.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ModelError {
    message: String,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A language model that can answer a prompt.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends `prompt` under the `system` instructions and returns the reply.
    ///
    /// `tools` holds function definitions in the OpenAI function-calling
    /// format; the model may answer with a call to one of them.
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        tools: &[Value],
    ) -> Result<ModelReply, ModelError>;
}

/// Errors from one chat request.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Field 'prompt' is required")]
    EmptyPrompt,

    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("model call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Invalid tool arguments JSON: {0}")]
    InvalidToolArguments(serde_json::Error),

    #[error("Invalid tool arguments JSON: no diagram in tool call")]
    EmptyToolArguments,

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Fallback(#[from] ResolveError),

    #[error("render worker failed: {0}")]
    Worker(String),
}

impl AssistantError {
    /// The error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            AssistantError::EmptyPrompt => ErrorCode::E400,
            AssistantError::Model(_) => ErrorCode::E401,
            AssistantError::Timeout(_) => ErrorCode::E402,
            AssistantError::InvalidToolArguments(_) | AssistantError::EmptyToolArguments => {
                ErrorCode::E403
            }
            AssistantError::Render(err) => err.code(),
            AssistantError::Fallback(err) => err.code(),
            AssistantError::Worker(_) => ErrorCode::E300,
        }
    }
}

/// The reply to one chat request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatResponse {
    /// A plain answer.
    Text { answer: String },

    /// A rendered diagram.
    Diagram {
        answer: String,
        url: String,
        download: String,
        path: PathBuf,
        summary: Summary,
        /// The model text the spec was extracted from, when it came from text.
        #[serde(skip_serializing_if = "Option::is_none")]
        raw: Option<String>,
    },
}

/// Settings for [`Assistant`].
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    timeout: Duration,
}

impl AssistantConfig {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

/// Routes prompts through a model and renders any diagram it describes.
pub struct Assistant {
    model: Arc<dyn ModelClient>,
    renderer: Arc<DiagramRenderer>,
    config: AssistantConfig,
    system_prompt: String,
    tools: Vec<Value>,
}

impl Assistant {
    /// Creates an assistant.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Fallback`] when the renderer's fallback icon
    /// cannot be resolved, so a broken setup fails before any request.
    pub fn new(
        model: Arc<dyn ModelClient>,
        renderer: Arc<DiagramRenderer>,
        config: AssistantConfig,
    ) -> Result<Self, AssistantError> {
        renderer.resolver().ensure_fallback()?;
        let system_prompt = prompt::system_prompt(renderer.limits(), renderer.resolver());
        Ok(Self {
            model,
            renderer,
            config,
            system_prompt,
            tools: vec![prompt::tool_definition()],
        })
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Tool definitions offered to the model with every prompt.
    pub fn tools(&self) -> &[Value] {
        &self.tools
    }

    /// Answers one prompt.
    ///
    /// # Errors
    ///
    /// - [`AssistantError::EmptyPrompt`] for a blank prompt.
    /// - [`AssistantError::Timeout`] when the model does not answer in time.
    /// - [`AssistantError::Model`] when the model call fails.
    /// - [`AssistantError::InvalidToolArguments`] for an unparsable tool call,
    ///   [`AssistantError::EmptyToolArguments`] for one with no arguments.
    /// - [`AssistantError::Render`] when the described diagram cannot be drawn.
    pub async fn chat(&self, prompt: &str) -> Result<ChatResponse, AssistantError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AssistantError::EmptyPrompt);
        }

        info!(prompt_chars = prompt.chars().count(); "Calling model");
        let reply = time::timeout(
            self.config.timeout,
            self.model.generate(&self.system_prompt, prompt, &self.tools),
        )
        .await
        .map_err(|_| AssistantError::Timeout(self.config.timeout))??;

        if let Some(call) = reply.tool_call {
            if call.name != prompt::TOOL_NAME {
                warn!(tool = call.name.as_str(); "Unexpected tool name, treating as diagram call");
            }
            let spec = parse_tool_arguments(&call.arguments)
                .map_err(AssistantError::InvalidToolArguments)?;
            if spec.is_empty() {
                return Err(AssistantError::EmptyToolArguments);
            }
            debug!(tool = call.name.as_str(); "Rendering from tool call");
            let artifact = self.render(Value::Object(spec)).await?;
            return Ok(self.diagram_response(artifact, None));
        }

        let text = reply.text.unwrap_or_default();
        if let Some(spec) = extract_spec(&text) {
            debug!("Rendering from spec embedded in text");
            let artifact = self.render(Value::Object(spec)).await?;
            return Ok(self.diagram_response(artifact, Some(text)));
        }

        let answer = if text.trim().is_empty() {
            EMPTY_ANSWER.to_string()
        } else {
            text
        };
        Ok(ChatResponse::Text { answer })
    }

    async fn render(&self, spec: Value) -> Result<Artifact, AssistantError> {
        let renderer = Arc::clone(&self.renderer);
        let result = task::spawn_blocking(move || renderer.render(&spec).into_result())
            .await
            .map_err(|err| AssistantError::Worker(err.to_string()))?;
        Ok(result?)
    }

    fn diagram_response(&self, artifact: Artifact, raw: Option<String>) -> ChatResponse {
        info!(url = artifact.url(); "Diagram generated");
        ChatResponse::Diagram {
            answer: DIAGRAM_ANSWER.to_string(),
            url: artifact.url().to_string(),
            download: self.renderer.output().download_for(artifact.filename()),
            path: artifact.path().to_path_buf(),
            summary: artifact.summary().clone(),
            raw,
        }
    }
}
