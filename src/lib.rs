//! stubweave - Typed API-Surface Extraction from Documentation Trees
//!
//! Converts the semi-structured documentation tree a docstring generator
//! emits into a typed model of an API surface (classes, methods, functions,
//! attributes, constants, parameters, return values, base-class
//! relationships), then reconciles that model against hand-authored override
//! files that correct generator mistakes.
//!
//! ## Pipeline
//!
//! 1. Parse each documentation-tree XML file into an owned [`DocNode`] tree
//! 2. Walk sections, dispatching entities to the analyzers by discriminant
//! 3. Concatenate per-file sections into one [`AnalysisResult`]
//! 4. Apply override documents in order (remove / new / append / update)
//!
//! ## Quick Start
//!
//! ```ignore
//! use stubweave::analyze_with_mod_files;
//!
//! let result = analyze_with_mod_files(
//!     &["doctrees/bpy.types.xml", "doctrees/gpu.xml"],
//!     &["mods/append_types.json"],
//! )?;
//! for section in &result.sections {
//!     // hand the typed entities to a stub renderer
//! }
//! ```
//!
//! ## Modules
//!
//! - [`doctree`]: owned documentation-tree structure, XML loading, text flattening
//! - [`analyzer`]: leaf/aggregate entity analyzers and the section walker
//! - [`patch`]: override document format and the patch engine
//! - [`types`]: the extracted entity model and crate-wide error type

pub mod analyzer;
pub mod constants;
pub mod doctree;
pub mod patch;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Error Types
pub use types::error::{Result, StubError};

// Entity Model
pub use types::{
    AnalysisResult, ClassInfo, DataType, FunctionInfo, Info, InfoKind, ParameterDetailInfo,
    ReturnInfo, SectionInfo, VariableInfo,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use analyzer::{
    ClassAnalyzer, FunctionAnalyzer, VariableAnalyzer, analyze_files, analyze_source,
    analyze_with_mod_files, split_balanced_parameters,
};

pub use doctree::{DocNode, collapse_ws, flatten_text};

pub use patch::{ModDocument, apply_mod_document, apply_mod_files};
