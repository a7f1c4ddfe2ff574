//! Error types for archviz operations.
//!
//! [`RenderError`] describes why one render request produced no artifact.
//! [`ArchvizError`] is the crate-level error for setup problems such as a
//! broken icon configuration or an unavailable backend.

use std::{io, path::PathBuf};

use thiserror::Error;

use archviz_core::error::{ErrorCode, ResolveError, SpecError};

use crate::{assistant::AssistantError, export::BackendError};

/// Why a render request failed.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error("Diagram not produced")]
    NotProduced,

    #[error("cannot create output directory `{}`: {err}", .path.display())]
    OutputDir { path: PathBuf, err: io::Error },
}

impl RenderError {
    /// The error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            RenderError::Spec(err) => err.code(),
            RenderError::Resolve(err) => err.code(),
            RenderError::Backend(_) => ErrorCode::E300,
            RenderError::NotProduced => ErrorCode::E301,
            RenderError::OutputDir { .. } => ErrorCode::E302,
        }
    }
}

/// The main error type for archviz setup and orchestration.
#[derive(Debug, Error)]
pub enum ArchvizError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),
}

impl ArchvizError {
    /// The error code, when the error maps to one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ArchvizError::Io(_) | ArchvizError::Config(_) => None,
            ArchvizError::Resolve(err) => Some(err.code()),
            ArchvizError::Backend(_) => Some(ErrorCode::E300),
            ArchvizError::Render(err) => Some(err.code()),
            ArchvizError::Assistant(err) => Some(err.code()),
        }
    }
}
