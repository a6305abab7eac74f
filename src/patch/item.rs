//! Override document model.
//!
//! An override document is a JSON object with up to four arrays, one per
//! patch operation. Items are validated on parse: a `new` item whose type is
//! not `constant`, `function`, or `class` fails deserialization, which is
//! fatal for the whole document.

use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::types::{
    ClassInfo, DataType, FunctionInfo, Info, InfoKind, ParameterDetailInfo, Result, ReturnInfo,
    StubError, VariableInfo,
};

/// One parsed override document, operations in application order.
///
/// `new` keeps its presence: a document with a `new` key contributes one
/// fresh section to the model (even an empty `"new": []` does), a document
/// without one contributes none.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModDocument {
    #[serde(default)]
    pub remove: Vec<TargetRef>,
    #[serde(default)]
    pub new: Option<Vec<NewItem>>,
    #[serde(default)]
    pub append: Vec<PatchItem>,
    #[serde(default)]
    pub update: Vec<PatchItem>,
}

impl ModDocument {
    /// Parse a JSON override document. `source_id` identifies the document
    /// in errors and warnings.
    pub fn parse_str(json: &str, source_id: &str) -> Result<ModDocument> {
        serde_json::from_str(json).map_err(|e| StubError::mod_file(e.to_string(), source_id))
    }

    /// Read and parse a JSON override file; its path becomes the source
    /// identifier.
    pub fn parse_file(path: &Path) -> Result<ModDocument> {
        let json = std::fs::read_to_string(path)?;
        Self::parse_str(&json, &path.display().to_string())
    }
}

/// Identity of an entity to remove: (type, name, module). A missing module
/// matches only entities whose module is also absent.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetRef {
    #[serde(rename = "type")]
    pub kind: InfoKind,
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
}

/// A `new` item: a complete entity description. One explicit variant per
/// supported target kind; anything else is rejected at parse time.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NewItem {
    Constant(NewConstant),
    Function(NewFunction),
    Class(NewClass),
}

impl NewItem {
    pub fn kind(&self) -> InfoKind {
        match self {
            Self::Constant(_) => InfoKind::Constant,
            Self::Function(_) => InfoKind::Function,
            Self::Class(_) => InfoKind::Class,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Constant(c) => &c.name,
            Self::Function(f) => &f.name,
            Self::Class(c) => &c.name,
        }
    }

    pub fn module(&self) -> Option<&str> {
        match self {
            Self::Constant(c) => c.module.as_deref(),
            Self::Function(f) => f.module.as_deref(),
            Self::Class(c) => c.module.as_deref(),
        }
    }

    /// Construct the entity this item describes.
    pub fn into_info(self) -> Info {
        match self {
            Self::Constant(c) => Info::Variable(VariableInfo {
                kind: InfoKind::Constant,
                name: c.name,
                module: c.module,
                class: c.class,
                data_type: c.data_type,
                description: c.description,
            }),
            Self::Function(f) => Info::Function(FunctionInfo {
                kind: InfoKind::Function,
                name: f.name,
                module: f.module,
                class: f.class,
                parameters: f.parameters,
                parameter_details: f.parameter_details,
                description: f.description,
                return_info: f.return_info,
            }),
            Self::Class(c) => Info::Class(ClassInfo {
                kind: InfoKind::Class,
                name: c.name,
                module: c.module,
                description: c.description,
                base_classes: c.base_classes,
                methods: c.methods,
                attributes: c.attributes,
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewConstant {
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub data_type: Option<DataType>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFunction {
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub parameter_details: Vec<ParameterDetailInfo>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "return")]
    pub return_info: ReturnInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewClass {
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_classes: Vec<DataType>,
    #[serde(default)]
    pub methods: Vec<FunctionInfo>,
    #[serde(default)]
    pub attributes: Vec<VariableInfo>,
}

/// An `append`/`update` item: identity plus the fields to merge in.
///
/// Scalar fields are double-optioned so the engine can tell a field that is
/// absent (leave alone) from one that is explicitly `null` (cleared by
/// `update`, ignored by `append`).
#[derive(Debug, Clone, Deserialize)]
pub struct PatchItem {
    #[serde(rename = "type")]
    pub kind: InfoKind,
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub data_type: Option<Option<DataType>>,
    #[serde(default, deserialize_with = "present")]
    pub class: Option<Option<String>>,
    #[serde(default)]
    pub parameters: Option<Vec<String>>,
    #[serde(default)]
    pub parameter_details: Option<Vec<ParameterDetailInfo>>,
    #[serde(default, rename = "return")]
    pub return_info: Option<ReturnInfo>,
    #[serde(default)]
    pub base_classes: Option<Vec<DataType>>,
    #[serde(default)]
    pub methods: Option<Vec<FunctionInfo>>,
    #[serde(default)]
    pub attributes: Option<Vec<VariableInfo>>,
}

/// `Some(inner)` whenever the key is present, even with a `null` value.
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
