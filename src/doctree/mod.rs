//! Documentation Tree Input
//!
//! The extraction input is a node-labeled tree produced externally by a
//! documentation generator (tags like `document`, `section`, `desc`,
//! `desc_signature`, `paragraph`, `field_list`, ...). This module owns that
//! boundary: it reads the XML serialization into an owned [`DocNode`] tree
//! so the analyzers stay free of I/O and XML concerns.
//!
//! Inter-element "tail" text is preserved: mixed inline markup such as
//! `<paragraph>x <literal_emphasis>int</literal_emphasis> – doc</paragraph>`
//! flattens back to the human-readable string.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;
use std::sync::LazyLock;

use crate::types::{Result, StubError};

/// One node of the documentation tree.
///
/// `text` is the content before the first child; `tail` is the content
/// between this node's end tag and the next sibling (or parent end tag).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocNode {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<DocNode>,
    pub tail: Option<String>,
}

impl DocNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Look up an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given tag.
    pub fn find(&self, tag: &str) -> Option<&DocNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Direct children with the given tag, in document order.
    pub fn children_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a DocNode> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Every node of the subtree (self included) with the given tag,
    /// in document order.
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a DocNode> {
        let mut out = Vec::new();
        self.collect_by_tag(tag, &mut out);
        out
    }

    fn collect_by_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a DocNode>) {
        if self.tag == tag {
            out.push(self);
        }
        for child in &self.children {
            child.collect_by_tag(tag, out);
        }
    }

    /// Parse an XML document into a tree. `source_id` identifies the input
    /// in error messages and warnings.
    pub fn parse_str(xml: &str, source_id: &str) -> Result<DocNode> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        // Tail whitespace is meaningful to the flattener; never trim.
        let mut stack: Vec<DocNode> = Vec::new();
        let mut root: Option<DocNode> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    stack.push(node_from_start(e, source_id)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let node = node_from_start(e, source_id)?;
                    attach(node, &mut stack, &mut root, source_id)?;
                }
                Ok(Event::End(_)) => {
                    let node = stack.pop().ok_or_else(|| {
                        StubError::xml("unexpected end tag", source_id)
                    })?;
                    attach(node, &mut stack, &mut root, source_id)?;
                }
                Ok(Event::Text(ref e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| StubError::xml(format!("text decode: {e}"), source_id))?;
                    push_text(&mut stack, &text);
                }
                Ok(Event::CData(ref e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    push_text(&mut stack, &text);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(StubError::xml(
                        format!("parse error at position {}: {e}", reader.error_position()),
                        source_id,
                    ));
                }
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(StubError::xml("unclosed element", source_id));
        }
        root.ok_or_else(|| StubError::xml("empty document", source_id))
    }

    /// Read and parse an XML file; its path becomes the source identifier.
    pub fn parse_file(path: &Path) -> Result<DocNode> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse_str(&xml, &path.display().to_string())
    }
}

fn node_from_start(e: &BytesStart<'_>, source_id: &str) -> Result<DocNode> {
    let tag = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| StubError::xml(format!("tag name: {e}"), source_id))?
        .to_string();

    let mut node = DocNode::new(tag);
    for attr_result in e.attributes() {
        let attr =
            attr_result.map_err(|e| StubError::xml(format!("attribute: {e}"), source_id))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| StubError::xml(format!("attribute key: {e}"), source_id))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| StubError::xml(format!("attribute value: {e}"), source_id))?
            .into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

/// Hand a completed node to its parent, or make it the root.
fn attach(
    node: DocNode,
    stack: &mut Vec<DocNode>,
    root: &mut Option<DocNode>,
    source_id: &str,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(StubError::xml("multiple root elements", source_id)),
    }
}

/// Text before any child becomes `text`; text after a child becomes that
/// child's `tail`. Consecutive text events (entity boundaries) accumulate.
fn push_text(stack: &mut [DocNode], text: &str) {
    let Some(current) = stack.last_mut() else {
        // Whitespace around the root element is not part of the tree.
        return;
    };
    match current.children.last_mut() {
        Some(last_child) => match &mut last_child.tail {
            Some(tail) => tail.push_str(text),
            None => last_child.tail = Some(text.to_string()),
        },
        None => match &mut current.text {
            Some(t) => t.push_str(text),
            None => current.text = Some(text.to_string()),
        },
    }
}

// =============================================================================
// Text flattening
// =============================================================================

/// Concatenate a subtree's own text, every child's flattened text
/// (recursively, in document order), and its own trailing text.
///
/// Tag semantics are irrelevant here: emphasis, references, and literals all
/// contribute their text. Whitespace collapsing is the caller's policy, not
/// this function's.
pub fn flatten_text(node: &DocNode) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &DocNode, out: &mut String) {
    if let Some(text) = &node.text {
        out.push_str(text);
    }
    for child in &node.children {
        collect_text(child, out);
    }
    if let Some(tail) = &node.tail {
        out.push_str(tail);
    }
}

static WS_RUN: LazyLock<regex::Regex> = LazyLock::new(|| regex::Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to single spaces and trim the ends. Every
/// analyzer applies this before storing human-readable text.
pub fn collapse_ws(s: &str) -> String {
    WS_RUN.replace_all(s, " ").trim().to_string()
}
