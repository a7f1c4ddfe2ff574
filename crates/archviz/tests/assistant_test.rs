//! Integration tests for the Assistant orchestration flow

use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Value, json};

use archviz::{
    Assistant, AssistantConfig, AssistantError, ChatResponse, DiagramRenderer, ErrorCode,
    ModelClient, RenderError,
    assistant::{ModelError, ModelReply},
    config::OutputConfig,
    export::{Backend, BackendError},
    icon::IconRegistry,
    resolve::{IconResolver, ResolverConfig},
    scene::Scene,
    spec::Limits,
};

const SPEC_ARGS: &str = r#"{"title": "Shop", "nodes": [{"id": "a", "label": "A", "icon": "diagrams.azure.web.AppServices"}, {"id": "b", "label": "B", "icon": "diagrams.azure.database.CosmosDb"}], "edges": [{"source": "a", "target": "b"}]}"#;

/// Model that replays a fixed reply and records the prompts it saw.
struct ScriptedModel {
    reply: Result<ModelReply, String>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<(String, String)>>,
    tools: Mutex<Vec<Value>>,
}

impl ScriptedModel {
    fn replying(reply: ModelReply) -> Self {
        Self {
            reply: Ok(reply),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            tools: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            tools: Mutex::new(Vec::new()),
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            reply: Ok(ModelReply::text("late")),
            delay: Some(delay),
            prompts: Mutex::new(Vec::new()),
            tools: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        tools: &[Value],
    ) -> Result<ModelReply, ModelError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        self.tools.lock().unwrap().extend_from_slice(tools);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(ModelError::new)
    }
}

struct StubBackend;

impl Backend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn draw(&self, _scene: &Scene, output: &Path) -> Result<(), BackendError> {
        fs::write(output, b"png")?;
        Ok(())
    }
}

fn renderer(dir: &Path) -> Arc<DiagramRenderer> {
    Arc::new(DiagramRenderer::with_backend(
        IconResolver::new(IconRegistry::builtin(), ResolverConfig::default()),
        Limits::default(),
        OutputConfig::new(dir),
        Box::new(StubBackend),
    ))
}

fn assistant(dir: &Path, model: Arc<ScriptedModel>) -> Assistant {
    Assistant::new(model, renderer(dir), AssistantConfig::default()).unwrap()
}

#[tokio::test]
async fn test_tool_call_renders_diagram() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::replying(ModelReply::tool_call(
        "render_architecture",
        SPEC_ARGS,
    )));
    let assistant = assistant(dir.path(), Arc::clone(&model));

    let response = assistant.chat("  draw my shop  ").await.unwrap();
    let ChatResponse::Diagram {
        answer,
        url,
        download,
        path,
        summary,
        raw,
    } = response
    else {
        panic!("expected a diagram response");
    };

    assert_eq!(answer, "Diagram generated.");
    assert!(path.is_file());
    let filename = path.file_name().unwrap().to_str().unwrap();
    assert_eq!(url, format!("/static/diagrams/{filename}"));
    assert_eq!(download, format!("/download/{filename}"));
    assert_eq!(summary.node_count(), 2);
    assert_eq!(raw, None);

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts[0].1, "draw my shop");
    assert!(prompts[0].0.contains("render_architecture"));
}

#[tokio::test]
async fn test_spec_in_text_renders_with_raw() {
    let dir = tempfile::tempdir().unwrap();
    let text = format!("Sure! Here is the spec:\n```json\n{SPEC_ARGS}\n```");
    let model = Arc::new(ScriptedModel::replying(ModelReply::text(text.clone())));
    let assistant = assistant(dir.path(), model);

    let response = assistant.chat("draw it").await.unwrap();
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["type"], json!("diagram"));
    assert_eq!(value["raw"], json!(text));
    assert_eq!(value["summary"]["title"], json!("Shop"));
}

#[tokio::test]
async fn test_plain_text_answer() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::replying(ModelReply::text(
        "Use a queue between the services.",
    )));
    let assistant = assistant(dir.path(), model);

    let response = assistant.chat("how do I decouple?").await.unwrap();
    assert_eq!(
        response,
        ChatResponse::Text {
            answer: "Use a queue between the services.".to_string()
        }
    );
    assert_eq!(fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
}

#[tokio::test]
async fn test_empty_reply_answers_ok() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::replying(ModelReply::default()));
    let assistant = assistant(dir.path(), model);

    let response = assistant.chat("hi").await.unwrap();
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"type": "text", "answer": "OK"})
    );
}

#[tokio::test]
async fn test_empty_prompt_rejected_without_model_call() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::replying(ModelReply::text("unused")));
    let assistant = assistant(dir.path(), Arc::clone(&model));

    let err = assistant.chat("   ").await.unwrap_err();
    assert!(matches!(err, AssistantError::EmptyPrompt));
    assert_eq!(err.to_string(), "Field 'prompt' is required");
    assert!(model.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_tool_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::replying(ModelReply::tool_call(
        "render_architecture",
        "{not json",
    )));
    let assistant = assistant(dir.path(), model);

    let err = assistant.chat("draw").await.unwrap_err();
    assert!(matches!(err, AssistantError::InvalidToolArguments(_)));
    assert_eq!(err.code(), ErrorCode::E403);
    assert!(err.to_string().starts_with("Invalid tool arguments JSON"));
}

#[tokio::test]
async fn test_empty_tool_arguments_rejected() {
    for arguments in ["", "   ", "{}"] {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::replying(ModelReply::tool_call(
            "render_architecture",
            arguments,
        )));
        let assistant = assistant(dir.path(), model);

        let err = assistant.chat("draw").await.unwrap_err();
        assert!(
            matches!(err, AssistantError::EmptyToolArguments),
            "{arguments:?}: {err}"
        );
        assert_eq!(err.code(), ErrorCode::E403);
        assert!(err.to_string().starts_with("Invalid tool arguments JSON"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

#[tokio::test]
async fn test_tool_definition_offered_to_model() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::replying(ModelReply::text("hi")));
    let assistant = assistant(dir.path(), Arc::clone(&model));

    assistant.chat("draw a web app").await.unwrap();

    let tools = model.tools.lock().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["type"], "function");
    assert_eq!(tools[0]["function"]["name"], "render_architecture");
    assert_eq!(
        tools[0]["function"]["parameters"]["required"],
        json!(["nodes", "edges"])
    );
    assert_eq!(assistant.tools(), tools.as_slice());
}

#[tokio::test]
async fn test_render_failure_surfaces() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::replying(ModelReply::tool_call(
        "render_architecture",
        r#"{"nodes": [{"id": "a", "icon": "x"}], "edges": [{"source": "a", "target": "b"}]}"#,
    )));
    let assistant = assistant(dir.path(), model);

    let err = assistant.chat("draw").await.unwrap_err();
    assert!(matches!(err, AssistantError::Render(RenderError::Spec(_))));
    assert_eq!(err.code(), ErrorCode::E103);
}

#[tokio::test]
async fn test_model_failure() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::failing("rate limited"));
    let assistant = assistant(dir.path(), model);

    let err = assistant.chat("draw").await.unwrap_err();
    assert!(matches!(err, AssistantError::Model(_)));
    assert_eq!(err.to_string(), "model call failed: rate limited");
}

#[tokio::test(start_paused = true)]
async fn test_model_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let model = Arc::new(ScriptedModel::slow(Duration::from_secs(120)));
    let assistant = Assistant::new(
        model,
        renderer(dir.path()),
        AssistantConfig::new(Duration::from_secs(5)),
    )
    .unwrap();

    let err = assistant.chat("draw").await.unwrap_err();
    assert!(matches!(err, AssistantError::Timeout(_)));
    assert_eq!(err.code(), ErrorCode::E402);
}

#[test]
fn test_missing_fallback_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(DiagramRenderer::with_backend(
        IconResolver::new(IconRegistry::new(), ResolverConfig::default()),
        Limits::default(),
        OutputConfig::new(dir.path()),
        Box::new(StubBackend),
    ));
    let model = Arc::new(ScriptedModel::replying(ModelReply::default()));

    let result = Assistant::new(model, renderer, AssistantConfig::default());
    assert!(matches!(result, Err(AssistantError::Fallback(_))));
}
