//! Documentation Analyzer Module
//!
//! Turns parsed documentation trees into the typed API-surface model:
//! - Leaf analyzers for constants/attributes and functions/methods
//! - An aggregate analyzer composing them into class records
//! - A recursive walker dispatching entities by their discriminant
//!
//! The walker drives the analyzers bottom-up per entity; per-section entity
//! lists accumulate into one [`crate::types::AnalysisResult`].

pub mod class;
pub mod function;
pub mod variable;
pub mod walker;

pub use class::ClassAnalyzer;
pub use function::{FunctionAnalyzer, split_balanced_parameters};
pub use variable::VariableAnalyzer;
pub use walker::{analyze_files, analyze_source};

use std::path::Path;

use crate::types::{AnalysisResult, Result};

/// Full pipeline: extract every source file, then apply the override
/// documents in order. Equivalent to [`analyze_files`] followed by
/// [`crate::patch::apply_mod_files`].
pub fn analyze_with_mod_files<P: AsRef<Path>, Q: AsRef<Path>>(
    sources: &[P],
    mod_files: &[Q],
) -> Result<AnalysisResult> {
    let mut result = analyze_files(sources)?;
    crate::patch::apply_mod_files(&mut result, mod_files)?;
    Ok(result)
}
