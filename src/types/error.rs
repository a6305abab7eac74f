//! Unified Error Type System
//!
//! Centralized error types for the entire crate.
//!
//! ## Severity model
//!
//! Extraction distinguishes two severities:
//!
//! - **Fatal**: the current entity or file cannot be trusted and processing
//!   of it aborts: content seen before its signature, a signature never
//!   found, unbalanced parentheses in a parameter list, base classes
//!   attached to a non-class entity, an unsupported `new` override type.
//!   These are `StubError` variants.
//! - **Recoverable**: a field degrades but extraction continues. These are
//!   logged via `tracing::warn!` at the point of detection and never become
//!   a `StubError`.
//!
//! Fatal variants carry enough context (source identifier, offending text)
//! to locate the defect in the source documentation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StubError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    /// The documentation tree is not well-formed XML.
    #[error("XML error in {source_id}: {message}")]
    Xml { message: String, source_id: String },

    // -------------------------------------------------------------------------
    // Extraction Errors
    // -------------------------------------------------------------------------
    /// Structural violation while analyzing one entity: signature/content
    /// ordering broken, signature missing entirely, or base classes attached
    /// to something that is not a class.
    #[error("Analysis error in {source_id}: {message}")]
    Analyze { message: String, source_id: String },

    /// Parameter-list text whose parentheses do not balance.
    #[error("Unbalanced parameter list in {source_id}: depth {depth} (text: {text})")]
    UnbalancedParameters {
        text: String,
        depth: i32,
        source_id: String,
    },

    // -------------------------------------------------------------------------
    // Override Errors
    // -------------------------------------------------------------------------
    /// An override document failed to load or validate. Unsupported `new`
    /// item types surface here, wrapped with the document identifier.
    #[error("Override document error in {source_id}: {message}")]
    ModFile { message: String, source_id: String },
}

impl StubError {
    /// Create an XML input error with source context.
    pub fn xml(message: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
            source_id: source_id.into(),
        }
    }

    /// Create an analysis error with source context.
    pub fn analyze(message: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self::Analyze {
            message: message.into(),
            source_id: source_id.into(),
        }
    }

    /// Create an override document error with source context.
    pub fn mod_file(message: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self::ModFile {
            message: message.into(),
            source_id: source_id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StubError>;
