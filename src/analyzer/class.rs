//! Class extraction.
//!
//! A class `desc` holds a signature (name and module only, no parameter
//! list) and a content block: an optional description paragraph followed by
//! nested `desc` entries for methods and attributes. Nested entries delegate
//! to the leaf analyzers with the member role fixed; unrecognized nested
//! kinds are ignored.

use crate::analyzer::function::FunctionAnalyzer;
use crate::analyzer::variable::VariableAnalyzer;
use crate::doctree::{DocNode, collapse_ws, flatten_text};
use crate::types::{ClassInfo, InfoKind, Result, StubError};

pub struct ClassAnalyzer<'a> {
    source_id: &'a str,
}

impl<'a> ClassAnalyzer<'a> {
    pub fn new(source_id: &'a str) -> Self {
        Self { source_id }
    }

    pub fn analyze(&self, desc: &DocNode) -> Result<ClassInfo> {
        let mut info = ClassInfo::new();
        let mut signature_analyzed = false;

        for child in &desc.children {
            match child.tag.as_str() {
                "desc_signature" => {
                    if signature_analyzed {
                        continue;
                    }
                    info.name = sig_name(child).ok_or_else(|| {
                        StubError::analyze("class signature has no name", self.source_id)
                    })?;
                    info.module = child
                        .attr("module")
                        .filter(|m| !m.is_empty())
                        .map(str::to_string);
                    signature_analyzed = true;
                }
                "desc_content" => {
                    if !signature_analyzed {
                        return Err(StubError::analyze(
                            "desc_signature must be parsed before desc_content",
                            self.source_id,
                        ));
                    }
                    self.parse_content(child, &mut info)?;
                }
                _ => {}
            }
        }

        if !signature_analyzed {
            return Err(StubError::analyze(
                "class entry has no desc_signature",
                self.source_id,
            ));
        }

        Ok(info)
    }

    fn parse_content(&self, content: &DocNode, info: &mut ClassInfo) -> Result<()> {
        for child in &content.children {
            match child.tag.as_str() {
                "paragraph" => {
                    if info.description.is_none() {
                        info.description = Some(collapse_ws(&flatten_text(child)));
                    }
                }
                "desc" => self.parse_member(child, info)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_member(&self, desc: &DocNode, info: &mut ClassInfo) -> Result<()> {
        match desc.attr("desctype") {
            Some("function") | Some("method") => {
                let method =
                    FunctionAnalyzer::new(self.source_id, InfoKind::Method).analyze(desc)?;
                info.methods.push(method);
            }
            Some("attribute") | Some("data") => {
                let attribute =
                    VariableAnalyzer::new(self.source_id, InfoKind::Attribute).analyze(desc)?;
                info.attributes.push(attribute);
            }
            _ => {}
        }
        Ok(())
    }
}

fn sig_name(sig: &DocNode) -> Option<String> {
    match sig.attr("fullname") {
        Some(name) => Some(name.to_string()),
        None => sig.find("desc_name").and_then(|n| n.text.clone()),
    }
}
