//! archviz Core Types and Definitions
//!
//! This crate holds everything needed to turn untrusted, model-produced text
//! into a bounded diagram description. It includes:
//!
//! - **Spec**: the diagram data model and its validator ([`spec`] module)
//! - **Extraction**: tolerant scanning of free text for embedded JSON ([`extract`] module)
//! - **Icons**: the registry of drawable resources ([`icon`] module)
//! - **Resolution**: allowlist and fallback policy for icon ids ([`resolve`] module)
//! - **Errors**: error types and stable error codes ([`error`] module)

pub mod color;
pub mod error;
pub mod extract;
pub mod icon;
pub mod resolve;
pub mod spec;
