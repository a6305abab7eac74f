//! Extracted API-surface model.
//!
//! Everything the analyzers produce lives here: one record type per entity
//! kind, the section/result containers that carry them, and the normalized
//! type reference (`DataType`) shared by all of them.
//!
//! Entities are created exclusively by the analyzers, enriched in place by
//! the patch engine, and never mutated again once the final
//! [`AnalysisResult`] is handed off.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Normalized type reference
// =============================================================================

/// A normalized type reference, built from free-form type text
/// (e.g. `"int"`, `` "list of `Object`" ``).
///
/// Stored and compared as the resolved string; never parsed further.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataType(String);

impl DataType {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DataType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// =============================================================================
// Entity kinds
// =============================================================================

/// Closed discriminant over entity kinds.
///
/// `"variable"` is accepted as an input alias of `"attribute"` when
/// deserializing override items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoKind {
    Constant,
    #[serde(alias = "variable")]
    Attribute,
    Function,
    Method,
    Class,
}

impl fmt::Display for InfoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Constant => "constant",
            Self::Attribute => "attribute",
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
        };
        write!(f, "{s}")
    }
}

// =============================================================================
// Entity records
// =============================================================================

/// A documented constant or class/instance attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    #[serde(rename = "type")]
    pub kind: InfoKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Owning class, for attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VariableInfo {
    /// `kind` must be [`InfoKind::Constant`] or [`InfoKind::Attribute`];
    /// the role is fixed at construction.
    pub fn new(kind: InfoKind) -> Self {
        Self {
            kind,
            name: String::new(),
            module: None,
            class: None,
            data_type: None,
            description: None,
        }
    }
}

/// Documentation-derived info for one parameter. Distinct from the raw
/// parameter token list on [`FunctionInfo`]; the two have no enforced
/// correspondence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDetailInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A documented plain function or method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    #[serde(rename = "type")]
    pub kind: InfoKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Owning class, for methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Raw parameter tokens from the call signature text
    /// (e.g. `"x"`, `"y=1"`, `"cb=(lambda:None)"`), in signature order.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Documentation-derived parameter details, in documentation order.
    #[serde(default)]
    pub parameter_details: Vec<ParameterDetailInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "return")]
    pub return_info: ReturnInfo,
}

impl FunctionInfo {
    /// `kind` must be [`InfoKind::Function`] or [`InfoKind::Method`];
    /// the role is fixed at construction.
    pub fn new(kind: InfoKind) -> Self {
        Self {
            kind,
            name: String::new(),
            module: None,
            class: None,
            parameters: Vec::new(),
            parameter_details: Vec::new(),
            description: None,
            return_info: ReturnInfo::default(),
        }
    }

    /// Whether the declared qualified name agrees with the derived name.
    /// A mismatch is a notice, not an error; the derived name wins.
    pub fn matches_fullname(&self, fullname: &str) -> bool {
        self.name == fullname
    }
}

/// A documented class: description, base classes, methods, attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    #[serde(rename = "type")]
    pub kind: InfoKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub base_classes: Vec<DataType>,
    #[serde(default)]
    pub methods: Vec<FunctionInfo>,
    #[serde(default)]
    pub attributes: Vec<VariableInfo>,
}

impl ClassInfo {
    pub fn new() -> Self {
        Self {
            kind: InfoKind::Class,
            name: String::new(),
            module: None,
            description: None,
            base_classes: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

impl Default for ClassInfo {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Entity sum type
// =============================================================================

/// One extracted entity. The inner records carry their own `"type"`
/// discriminant, so serialization is untagged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Info {
    Variable(VariableInfo),
    Function(FunctionInfo),
    Class(ClassInfo),
}

impl Info {
    pub fn kind(&self) -> InfoKind {
        match self {
            Self::Variable(v) => v.kind,
            Self::Function(f) => f.kind,
            Self::Class(_) => InfoKind::Class,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Variable(v) => &v.name,
            Self::Function(f) => &f.name,
            Self::Class(c) => &c.name,
        }
    }

    pub fn module(&self) -> Option<&str> {
        match self {
            Self::Variable(v) => v.module.as_deref(),
            Self::Function(f) => f.module.as_deref(),
            Self::Class(c) => c.module.as_deref(),
        }
    }
}

impl From<VariableInfo> for Info {
    fn from(v: VariableInfo) -> Self {
        Self::Variable(v)
    }
}

impl From<FunctionInfo> for Info {
    fn from(f: FunctionInfo) -> Self {
        Self::Function(f)
    }
}

impl From<ClassInfo> for Info {
    fn from(c: ClassInfo) -> Self {
        Self::Class(c)
    }
}

// =============================================================================
// Containers
// =============================================================================

/// Entities belonging to one top-level documentation section. Nested input
/// sections flatten upward into the same list; sections never nest in the
/// output model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionInfo {
    pub info_list: Vec<Info>,
}

impl SectionInfo {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The aggregated model: one [`SectionInfo`] per top-level section of each
/// analyzed source, in source order. This is the unit exchanged between
/// extraction and the patch engine, and the final artifact handed to
/// downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub sections: Vec<SectionInfo>,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another result's sections, preserving order.
    pub fn merge(&mut self, other: AnalysisResult) {
        self.sections.extend(other.sections);
    }

    /// Iterate over every top-level entity across all sections.
    pub fn entities(&self) -> impl Iterator<Item = &Info> {
        self.sections.iter().flat_map(|s| s.info_list.iter())
    }
}
