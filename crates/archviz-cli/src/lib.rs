//! CLI logic for the archviz diagram tool.
//!
//! Each subcommand loads the configuration, runs one archviz operation and
//! prints its JSON result on standard output.

pub mod error_adapter;

mod args;
mod config;
mod error;
mod model;

pub use args::{Args, Command};
pub use error::CliError;

use std::{
    env, fs,
    io::{self, Read},
    sync::Arc,
};

use log::{info, warn};
use serde_json::Value;

use archviz::{
    ArchvizError, Assistant, AssistantConfig, ChatResponse, DiagramRenderer, config::AppConfig,
    extract::extract_spec,
};

use model::LlmClient;

/// Run the archviz CLI application
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed JSON input
/// - Specs that fail validation, resolution or rendering
/// - Model setup and call failures
pub fn run(args: &Args) -> Result<(), CliError> {
    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Render { input, output } => render(&app_config, input, output.as_deref()),
        Command::Extract { input } => extract(input),
        Command::Chat {
            prompt,
            download,
            model,
        } => chat(app_config, prompt, *download, model.as_deref()),
        Command::Icons => icons(&app_config),
    }
}

fn render(config: &AppConfig, input: &str, output: Option<&str>) -> Result<(), CliError> {
    info!(input_path = input; "Rendering diagram spec");

    let src = read_input(input)?;
    let raw: Value = serde_json::from_str(&src).map_err(|err| CliError::Json {
        path: input.to_string(),
        src: src.clone(),
        err,
    })?;

    let renderer = DiagramRenderer::new(config)?;
    let result = renderer.render(&raw);

    let json = serde_json::to_string_pretty(&result).map_err(io::Error::other)?;
    println!("{json}");
    if let Some(output) = output {
        fs::write(output, &json)?;
        info!(output_file = output; "Result written");
    }

    let artifact = result
        .into_result()
        .map_err(|err| CliError::Archviz(ArchvizError::Render(err)))?;
    info!(path = artifact.path().display().to_string(); "Diagram rendered");
    Ok(())
}

fn extract(input: &str) -> Result<(), CliError> {
    let text = read_input(input)?;
    let spec = extract_spec(&text).ok_or_else(|| CliError::NoSpec(input.to_string()))?;
    let json = serde_json::to_string_pretty(&spec).map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}

fn chat(
    mut config: AppConfig,
    prompt: &str,
    download: bool,
    model: Option<&str>,
) -> Result<(), CliError> {
    if let Some(model) = model {
        config.model_mut().set_model(model);
    }

    let api_key = env::var(config.model().api_key_env()).ok();
    if api_key.is_none() {
        warn!(var = config.model().api_key_env(); "API key variable not set");
    }
    let client = LlmClient::new(config.model(), api_key).map_err(CliError::Model)?;
    let renderer = Arc::new(DiagramRenderer::new(&config)?);
    let assistant = Assistant::new(
        Arc::new(client),
        renderer,
        AssistantConfig::new(config.model().timeout()),
    )
    .map_err(ArchvizError::from)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let response = runtime
        .block_on(assistant.chat(prompt))
        .map_err(ArchvizError::from)?;

    let json = serde_json::to_string_pretty(&response).map_err(io::Error::other)?;
    println!("{json}");
    if download {
        if let ChatResponse::Diagram { path, .. } = &response {
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn icons(config: &AppConfig) -> Result<(), CliError> {
    let resolver = config.icons().build_resolver();
    let fallback = resolver.ensure_fallback().map_err(ArchvizError::from)?.id();

    for icon in resolver.registry().iter() {
        let marker = if icon.id() == fallback {
            "fallback"
        } else if resolver.resolve(icon.id()).is_ok_and(|r| !r.used_fallback()) {
            "allowed"
        } else {
            "-"
        };
        println!("{:<9} {:<10} {}", marker, icon.shape().as_str(), icon.id());
    }
    Ok(())
}

/// Reads a file, or standard input for `-`.
fn read_input(input: &str) -> Result<String, CliError> {
    let read = if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        fs::read_to_string(input)
    };
    read.map_err(|err| CliError::Read {
        path: input.to_string(),
        err,
    })
}
