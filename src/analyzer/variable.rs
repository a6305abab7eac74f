//! Constant / attribute extraction.
//!
//! A `desc` entry for a data entity carries one `desc_signature` (name,
//! module, owning class) followed by one `desc_content` (description
//! paragraph plus a field list whose `Type` field holds the data type).
//! Signature and content are parsed in that order; seeing content first, or
//! never seeing a signature, is fatal for the entity.

use crate::constants::fields;
use crate::doctree::{DocNode, collapse_ws, flatten_text};
use crate::types::{DataType, InfoKind, Result, StubError, VariableInfo};

pub struct VariableAnalyzer<'a> {
    source_id: &'a str,
    kind: InfoKind,
}

#[derive(Default)]
struct ContentFields {
    description: Option<String>,
    data_type: Option<String>,
}

impl<'a> VariableAnalyzer<'a> {
    /// `kind` fixes the entity role: [`InfoKind::Constant`] for module-level
    /// data, [`InfoKind::Attribute`] for class members.
    pub fn new(source_id: &'a str, kind: InfoKind) -> Self {
        Self { source_id, kind }
    }

    pub fn analyze(&self, desc: &DocNode) -> Result<VariableInfo> {
        let mut info = VariableInfo::new(self.kind);
        let mut signature_analyzed = false;

        for child in &desc.children {
            match child.tag.as_str() {
                "desc_signature" => {
                    if signature_analyzed {
                        return Err(StubError::analyze(
                            format!("duplicate desc_signature for data entry '{}'", info.name),
                            self.source_id,
                        ));
                    }
                    self.parse_signature(child, &mut info)?;
                    signature_analyzed = true;
                }
                "desc_content" => {
                    if !signature_analyzed {
                        return Err(StubError::analyze(
                            "desc_signature must be parsed before desc_content",
                            self.source_id,
                        ));
                    }
                    let fields = parse_content(child);
                    if let Some(desc) = fields.description {
                        info.description = Some(desc);
                    }
                    if let Some(dtype) = fields.data_type {
                        info.data_type = Some(DataType::new(dtype));
                    }
                }
                _ => {}
            }
        }

        if !signature_analyzed {
            return Err(StubError::analyze(
                "data entry has no desc_signature",
                self.source_id,
            ));
        }

        Ok(info)
    }

    fn parse_signature(&self, sig: &DocNode, info: &mut VariableInfo) -> Result<()> {
        // Prefer the qualified name; constants carry only the declared name.
        let mut name = match sig.attr("fullname") {
            Some(fullname) => fullname.to_string(),
            None => sig
                .find("desc_name")
                .and_then(|n| n.text.clone())
                .ok_or_else(|| {
                    StubError::analyze("data entry signature has no name", self.source_id)
                })?,
        };

        let class = sig.attr("class").filter(|c| !c.is_empty());
        if let Some(class) = class {
            // Attribute names arrive qualified ("Mesh.vertices"); store the
            // bare attribute name.
            if let Some(idx) = name.rfind(class)
                && let Some(bare) = name.get(idx + class.len() + 1..)
            {
                name = bare.to_string();
            }
        }

        info.name = name;
        info.class = class.map(str::to_string);
        info.module = sig.attr("module").filter(|m| !m.is_empty()).map(str::to_string);
        Ok(())
    }
}

fn parse_content(content: &DocNode) -> ContentFields {
    let mut fields = ContentFields::default();

    for child in &content.children {
        match child.tag.as_str() {
            "paragraph" => {
                if fields.description.is_none() {
                    fields.description = Some(collapse_ws(&flatten_text(child)));
                }
            }
            "field_list" => parse_field_list(child, &mut fields),
            _ => {}
        }
    }

    fields
}

fn parse_field_list(list: &DocNode, out: &mut ContentFields) {
    for field in list.children_by_tag("field") {
        let mut label = "";
        for part in &field.children {
            match part.tag.as_str() {
                "field_name" => label = part.text.as_deref().unwrap_or(""),
                "field_body" if label == fields::TYPE => {
                    out.data_type = Some(collapse_ws(&flatten_text(part)));
                }
                _ => {}
            }
        }
    }
}
