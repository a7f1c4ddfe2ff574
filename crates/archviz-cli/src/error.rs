//! Error type for the CLI.

use std::io;

use thiserror::Error;

use archviz::ArchvizError;

use crate::config::ConfigError;

/// Errors surfaced by [`crate::run`].
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Archviz(#[from] ArchvizError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read `{path}`: {err}")]
    Read { path: String, err: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("`{path}` is not valid JSON: {err}")]
    Json {
        path: String,
        src: String,
        err: serde_json::Error,
    },

    #[error("no diagram spec found in `{0}`")]
    NoSpec(String),

    #[error("model setup failed: {0}")]
    Model(String),
}
