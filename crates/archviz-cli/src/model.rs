//! [`ModelClient`] backed by the `llm` crate.

use async_trait::async_trait;
use llm::{
    builder::{LLMBackend, LLMBuilder},
    chat::{ChatMessage, FunctionTool, Tool},
};
use log::debug;
use serde_json::Value;

use archviz::{
    ModelClient,
    assistant::{ModelError, ModelReply, ToolCall},
    config::ModelConfig,
};

fn map_backend(provider: &str) -> Result<LLMBackend, String> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(format!("unknown provider: {other}")),
    }
}

/// Talks to the provider named in [`ModelConfig`].
pub struct LlmClient {
    config: ModelConfig,
    api_key: Option<String>,
}

impl LlmClient {
    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns a message when the provider name is unknown.
    pub fn new(config: &ModelConfig, api_key: Option<String>) -> Result<Self, String> {
        map_backend(config.provider())?;
        Ok(Self {
            config: config.clone(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }
}

#[async_trait]
impl ModelClient for LlmClient {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        tools: &[Value],
    ) -> Result<ModelReply, ModelError> {
        let tools = tools
            .iter()
            .map(to_llm_tool)
            .collect::<Result<Vec<_>, _>>()?;
        let backend = map_backend(self.config.provider()).map_err(ModelError::new)?;
        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(self.config.model())
            .system(system)
            .max_tokens(self.config.max_tokens())
            .temperature(self.config.temperature());

        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(url) = self.config.base_url() {
            builder = builder.base_url(url);
        }

        let llm = builder
            .build()
            .map_err(|e| ModelError::new(format!("build LLM: {e}")))?;

        let messages = vec![ChatMessage::user().content(prompt).build()];

        let offered = (!tools.is_empty()).then_some(tools.as_slice());
        let response = llm
            .chat_with_tools(&messages, offered)
            .await
            .map_err(|e| ModelError::new(format!("chat: {e}")))?;

        let tool_call = response
            .tool_calls()
            .and_then(|calls| calls.into_iter().next())
            .map(|call| ToolCall {
                name: call.function.name,
                arguments: call.function.arguments,
            });
        let text = response.text();
        debug!(
            has_text = text.is_some(),
            has_tool_call = tool_call.is_some();
            "Model replied"
        );

        Ok(ModelReply { text, tool_call })
    }
}

/// Converts a function definition in the OpenAI function-calling format.
fn to_llm_tool(definition: &Value) -> Result<Tool, ModelError> {
    let function = &definition["function"];
    let name = function["name"]
        .as_str()
        .ok_or_else(|| ModelError::new("tool definition has no function name"))?;
    Ok(Tool {
        tool_type: definition["type"].as_str().unwrap_or("function").to_string(),
        function: FunctionTool {
            name: name.to_string(),
            description: function["description"].as_str().unwrap_or_default().to_string(),
            parameters: function["parameters"].clone(),
        },
        cache_control: None,
    })
}
