//! Error codes for the archviz error system.
//!
//! Error codes are organized by phase:
//! - `E1xx` - Spec validation errors
//! - `E2xx` - Icon resolution errors
//! - `E3xx` - Rendering errors
//! - `E4xx` - Orchestration errors

use std::fmt;

/// Error codes for categorizing errors across the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Validation Errors (E1xx)
    // =========================================================================
    /// Malformed spec.
    ///
    /// The spec is not an object, or an item is missing a required field or
    /// carries a value of the wrong type.
    E100,

    /// Limit exceeded.
    ///
    /// The spec declares more nodes or edges than the configured maximum.
    E101,

    /// Duplicate node id.
    ///
    /// Two nodes share the same identifier.
    E102,

    /// Dangling edge.
    ///
    /// An edge references a node id that was never declared.
    E103,

    // =========================================================================
    // Resolution Errors (E2xx)
    // =========================================================================
    /// Unresolvable icon.
    ///
    /// An icon id is not present in the registry. This is absorbed by the
    /// fallback policy and only surfaces in logs.
    E200,

    /// Fallback icon unavailable.
    ///
    /// The configured fallback icon is not present in the registry.
    E201,

    // =========================================================================
    // Rendering Errors (E3xx)
    // =========================================================================
    /// Layout backend failure.
    ///
    /// The layout engine failed while drawing the diagram.
    E300,

    /// Artifact missing.
    ///
    /// The layout engine reported success but no image file exists.
    E301,

    /// Output directory unavailable.
    ///
    /// The output directory could not be created.
    E302,

    // =========================================================================
    // Orchestration Errors (E4xx)
    // =========================================================================
    /// Empty prompt.
    E400,

    /// Model call failed.
    E401,

    /// Model call timed out.
    E402,

    /// Invalid tool arguments.
    ///
    /// The model invoked the diagram tool with arguments that are not JSON.
    E403,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E101").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E400 => "E400",
            ErrorCode::E401 => "E401",
            ErrorCode::E402 => "E402",
            ErrorCode::E403 => "E403",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "malformed spec",
            ErrorCode::E101 => "limit exceeded",
            ErrorCode::E102 => "duplicate node id",
            ErrorCode::E103 => "dangling edge",
            ErrorCode::E200 => "unresolvable icon",
            ErrorCode::E201 => "fallback icon unavailable",
            ErrorCode::E300 => "layout backend failure",
            ErrorCode::E301 => "diagram not produced",
            ErrorCode::E302 => "output directory unavailable",
            ErrorCode::E400 => "empty prompt",
            ErrorCode::E401 => "model call failed",
            ErrorCode::E402 => "model call timed out",
            ErrorCode::E403 => "invalid tool arguments",
        }
    }

    /// Returns `true` for errors caused by the request content rather than
    /// by configuration or infrastructure.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            ErrorCode::E100 | ErrorCode::E101 | ErrorCode::E102 | ErrorCode::E103 | ErrorCode::E400
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
