//! Override Patch Module
//!
//! Hand-authored override documents correct generator mistakes in the
//! extracted model: missing entries, wrong types, stale signatures. This
//! module owns their JSON format and the four-operation patch algebra
//! (remove / new / append / update) applied against the aggregated model.

pub mod engine;
pub mod item;

pub use engine::{apply_mod_document, apply_mod_files};
pub use item::{ModDocument, NewClass, NewConstant, NewFunction, NewItem, PatchItem, TargetRef};
