//! Error types for spec validation and icon resolution.
//!
//! Both error families carry an [`ErrorCode`] so that callers can report a
//! stable identifier next to the human-readable message.
//!
//! # Example
//!
//! ```
//! # use archviz_core::error::{ErrorCode, SpecError};
//! let err = SpecError::DuplicateNode("api".to_string());
//! assert_eq!(err.code(), ErrorCode::E102);
//! assert_eq!(err.to_string(), "duplicate node id `api`");
//! ```

mod error_code;

use std::fmt;

use thiserror::Error;

pub use error_code::ErrorCode;

/// Which configured bound a spec exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    MaxNodes,
    MaxEdges,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::MaxNodes => write!(f, "max_nodes"),
            Limit::MaxEdges => write!(f, "max_edges"),
        }
    }
}

/// Errors raised while validating a raw diagram spec.
///
/// All variants describe a problem with the request content and are
/// recoverable: the request fails cleanly and nothing is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("invalid spec: {0}")]
    Invalid(String),

    #[error("too many {what} ({actual}, {limit} is {max})", what = limit_subject(.limit))]
    LimitExceeded {
        limit: Limit,
        max: usize,
        actual: usize,
    },

    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),

    #[error("edge `{from}` -> `{to}` refers to unknown node `{missing}`")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },
}

fn limit_subject(limit: &Limit) -> &'static str {
    match limit {
        Limit::MaxNodes => "nodes",
        Limit::MaxEdges => "edges",
    }
}

impl SpecError {
    /// The error code for this variant.
    pub fn code(&self) -> ErrorCode {
        match self {
            SpecError::Invalid(_) => ErrorCode::E100,
            SpecError::LimitExceeded { .. } => ErrorCode::E101,
            SpecError::DuplicateNode(_) => ErrorCode::E102,
            SpecError::DanglingEdge { .. } => ErrorCode::E103,
        }
    }
}

/// Errors raised while resolving icon identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The icon id is not in the registry. The resolver absorbs this by
    /// substituting the fallback.
    #[error("icon `{0}` could not be resolved")]
    Unresolvable(String),

    /// The fallback icon itself is missing. This is a configuration error.
    #[error("fallback icon `{0}` could not be resolved")]
    FallbackUnavailable(String),
}

impl ResolveError {
    /// The error code for this variant.
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::Unresolvable(_) => ErrorCode::E200,
            ResolveError::FallbackUnavailable(_) => ErrorCode::E201,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_exceeded_names_limit() {
        let err = SpecError::LimitExceeded {
            limit: Limit::MaxNodes,
            max: 60,
            actual: 61,
        };
        assert_eq!(err.to_string(), "too many nodes (61, max_nodes is 60)");
        assert_eq!(err.code(), ErrorCode::E101);
    }

    #[test]
    fn test_dangling_edge_message() {
        let err = SpecError::DanglingEdge {
            from: "a".to_string(),
            to: "z".to_string(),
            missing: "z".to_string(),
        };
        assert_eq!(err.to_string(), "edge `a` -> `z` refers to unknown node `z`");
    }

    #[test]
    fn test_resolve_error_codes() {
        assert_eq!(
            ResolveError::Unresolvable("x".into()).code(),
            ErrorCode::E200
        );
        assert_eq!(
            ResolveError::FallbackUnavailable("x".into()).code(),
            ErrorCode::E201
        );
    }
}
