//! Tree walker / dispatcher.
//!
//! Drives the leaf and aggregate analyzers over a parsed documentation
//! tree. Each top-level `section` of a `document` becomes one
//! [`SectionInfo`]; nested sections recurse into the same accumulating
//! list, so the output never nests.
//!
//! A paragraph starting with the base-class marker phrase announces that
//! the next sibling entity is a class and carries its base-class references;
//! attaching base classes to anything else is an internal-consistency error.

use std::path::Path;

use crate::analyzer::class::ClassAnalyzer;
use crate::analyzer::function::FunctionAnalyzer;
use crate::analyzer::variable::VariableAnalyzer;
use crate::constants::markers;
use crate::doctree::DocNode;
use crate::types::{
    AnalysisResult, DataType, Info, InfoKind, Result, SectionInfo, StubError,
};

/// Entity-kind discriminant of a `desc` node. Unknown values map to an
/// explicit `Ignored` variant so every dispatch point matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Discriminant {
    Function,
    Method,
    Data,
    Attribute,
    Class,
    Ignored,
}

impl Discriminant {
    fn of(desc: &DocNode) -> Self {
        match desc.attr("desctype") {
            Some("function") => Self::Function,
            Some("method") => Self::Method,
            Some("data") => Self::Data,
            Some("attribute") => Self::Attribute,
            Some("class") => Self::Class,
            _ => Self::Ignored,
        }
    }
}

/// Analyze one or more documentation-tree files, in order. Each file's
/// top-level sections are appended to the aggregated result.
pub fn analyze_files<P: AsRef<Path>>(paths: &[P]) -> Result<AnalysisResult> {
    let mut result = AnalysisResult::new();
    for path in paths {
        let path = path.as_ref();
        let root = DocNode::parse_file(path)?;
        result.merge(analyze_document(&path.display().to_string(), &root)?);
    }
    Ok(result)
}

/// Analyze one in-memory XML source. `source_id` identifies it in errors
/// and warnings.
pub fn analyze_source(source_id: &str, xml: &str) -> Result<AnalysisResult> {
    let root = DocNode::parse_str(xml, source_id)?;
    analyze_document(source_id, &root)
}

fn analyze_document(source_id: &str, root: &DocNode) -> Result<AnalysisResult> {
    let mut result = AnalysisResult::new();
    for child in root.children_by_tag("section") {
        let mut section = SectionInfo::new();
        walk_section(source_id, child, &mut section)?;
        result.sections.push(section);
    }
    Ok(result)
}

fn walk_section(source_id: &str, elm: &DocNode, section: &mut SectionInfo) -> Result<()> {
    let mut pending_base_classes: Vec<DataType> = Vec::new();

    for child in &elm.children {
        match child.tag.as_str() {
            "paragraph" => {
                if is_base_class_marker(child) {
                    pending_base_classes = base_classes_of(child);
                }
            }
            "desc" => {
                let base_classes = std::mem::take(&mut pending_base_classes);
                if let Some(info) = analyze_desc(source_id, child, base_classes)? {
                    section.info_list.push(info);
                }
            }
            "section" => walk_section(source_id, child, section)?,
            _ => {}
        }
    }

    Ok(())
}

fn is_base_class_marker(paragraph: &DocNode) -> bool {
    paragraph.text.as_deref().is_some_and(|t| {
        t.starts_with(markers::BASE_CLASS_PLURAL) || t.starts_with(markers::BASE_CLASS_SINGULAR)
    })
}

/// Base classes are the reference titles embedded in the marker paragraph.
fn base_classes_of(paragraph: &DocNode) -> Vec<DataType> {
    paragraph
        .find_all("reference")
        .into_iter()
        .filter_map(|r| r.attr("reftitle"))
        .map(DataType::new)
        .collect()
}

fn analyze_desc(
    source_id: &str,
    desc: &DocNode,
    base_classes: Vec<DataType>,
) -> Result<Option<Info>> {
    let discriminant = Discriminant::of(desc);

    if !base_classes.is_empty() && discriminant != Discriminant::Class {
        return Err(StubError::analyze(
            "base classes attached to a non-class entity",
            source_id,
        ));
    }

    let info = match discriminant {
        Discriminant::Function | Discriminant::Method => Some(Info::from(
            FunctionAnalyzer::new(source_id, InfoKind::Function).analyze(desc)?,
        )),
        Discriminant::Data => Some(Info::from(
            VariableAnalyzer::new(source_id, InfoKind::Constant).analyze(desc)?,
        )),
        Discriminant::Class => {
            let mut class = ClassAnalyzer::new(source_id).analyze(desc)?;
            class.base_classes.extend(base_classes);
            Some(Info::from(class))
        }
        Discriminant::Attribute | Discriminant::Ignored => None,
    };

    Ok(info)
}
