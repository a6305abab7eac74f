//! Function / method extraction.
//!
//! Signature parsing recovers the name and the raw parameter tokens from the
//! declared text; content parsing recovers the description, the documented
//! parameter details, and the return info from the field list. Same two-phase
//! ordering contract as the data analyzer.
//!
//! Parameter tokenization is the one non-trivial algorithm here: parameter
//! declarations may themselves contain parenthesized sub-expressions with
//! commas (default values, nested calls), so token boundaries exist only
//! where parenthesis nesting is fully closed.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::constants::fields;
use crate::doctree::{DocNode, collapse_ws, flatten_text};
use crate::types::{
    DataType, FunctionInfo, InfoKind, ParameterDetailInfo, Result, ReturnInfo, StubError,
};

/// `name (type) – description`
static PARAM_FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+) \((.+)\) \u{2013} (.+)").unwrap());
/// `name – description` (no type)
static PARAM_NO_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+) \u{2013} (.+)").unwrap());
/// `name (type) –` (type only, empty description)
static PARAM_TYPE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+) \((.+)\) \u{2013}\s*$").unwrap());
/// Generator artifact: space between an open paren and the type text.
static OPEN_PAREN_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\s+").unwrap());

/// Split one string of comma-separated parameter declarations into tokens.
///
/// Whitespace is stripped, the string is split on every comma, and a running
/// parenthesis depth decides which naive fragments belong together: a token
/// is flushed only when depth returns to exactly zero. Depth going negative,
/// or not returning to zero at end of input, means the text is malformed and
/// is fatal.
pub fn split_balanced_parameters(text: &str, source_id: &str) -> Result<Vec<String>> {
    let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Ok(Vec::new());
    }

    let mut params = Vec::new();
    let mut pending = String::new();
    let mut depth: i32 = 0;

    for fragment in stripped.split(',') {
        depth += fragment.matches('(').count() as i32;
        depth -= fragment.matches(')').count() as i32;
        if depth < 0 {
            return Err(StubError::UnbalancedParameters {
                text: text.to_string(),
                depth,
                source_id: source_id.to_string(),
            });
        }

        if !pending.is_empty() {
            pending.push(',');
        }
        pending.push_str(fragment);
        if depth == 0 {
            params.push(std::mem::take(&mut pending));
        }
    }

    if depth != 0 {
        return Err(StubError::UnbalancedParameters {
            text: text.to_string(),
            depth,
            source_id: source_id.to_string(),
        });
    }

    Ok(params)
}

pub struct FunctionAnalyzer<'a> {
    source_id: &'a str,
    kind: InfoKind,
}

#[derive(Default)]
struct ContentFields {
    description: Option<String>,
    parameter_details: Vec<ParameterDetailInfo>,
    return_type: Option<String>,
    return_description: Option<String>,
}

impl<'a> FunctionAnalyzer<'a> {
    /// `kind` fixes the entity role: [`InfoKind::Function`] for module-level
    /// callables, [`InfoKind::Method`] for class members.
    pub fn new(source_id: &'a str, kind: InfoKind) -> Self {
        Self { source_id, kind }
    }

    pub fn analyze(&self, desc: &DocNode) -> Result<FunctionInfo> {
        let mut info = FunctionInfo::new(self.kind);
        let mut signature_analyzed = false;

        for child in &desc.children {
            match child.tag.as_str() {
                "desc_signature" => {
                    // Overload entries repeat the signature; only the first
                    // one counts.
                    if signature_analyzed {
                        continue;
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

                    let fields = self.parse_content(child);
                    info.description = fields.description;
                    info.parameter_details = fields.parameter_details;
                    info.return_info = ReturnInfo {
                        data_type: fields.return_type.map(DataType::new),
                        description: fields.return_description,
                    };
                    break;
                }
                _ => {}
            }
        }

        if !signature_analyzed {
            return Err(StubError::analyze(
                "function entry has no desc_signature",
                self.source_id,
            ));
        }

        Ok(info)
    }

    fn parse_signature(&self, sig: &DocNode, info: &mut FunctionInfo) -> Result<()> {
        let text = sig
            .find("desc_name")
            .and_then(|n| n.text.clone())
            .ok_or_else(|| {
                StubError::analyze("function signature has no desc_name", self.source_id)
            })?;

        let lp = text.find('(');
        let rp = text.rfind(')');

        let (name, params) = match (lp, rp) {
            (Some(lp), Some(rp)) if lp < rp => {
                let name = text[..lp].to_string();
                let params = split_balanced_parameters(&text[lp + 1..rp], self.source_id)?;
                (name, params)
            }
            _ => {
                info!(
                    text = %text,
                    source_id = self.source_id,
                    "declared text has no parenthesized parameter list"
                );

                let mut name = text.clone();
                // A stray '(' without its ')' is a generator defect; keep the
                // prefix and say so.
                if let Some(paren) = name.find('(') {
                    name.truncate(paren);
                    warn!(
                        name = %name,
                        source_id = self.source_id,
                        "function name contained a parenthesis; truncated"
                    );
                }

                let params = match sig.find("desc_parameterlist") {
                    Some(list) => self.parameters_from_list(list)?,
                    None => Vec::new(),
                };
                (name, params)
            }
        };

        info.name = name;
        info.parameters = params;

        if let Some(fullname) = sig.attr("fullname")
            && !info.matches_fullname(fullname)
        {
            info!(
                fullname,
                derived = %info.name,
                source_id = self.source_id,
                "qualified name disagrees with derived name; derived name wins"
            );
        }

        info.module = sig.attr("module").filter(|m| !m.is_empty()).map(str::to_string);
        info.class = sig.attr("class").filter(|c| !c.is_empty()).map(str::to_string);
        Ok(())
    }

    fn parameters_from_list(&self, list: &DocNode) -> Result<Vec<String>> {
        let bodies: Vec<&str> = list
            .children_by_tag("desc_parameter")
            .filter_map(|p| p.text.as_deref())
            .collect();
        split_balanced_parameters(&bodies.join(","), self.source_id)
    }

    fn parse_content(&self, content: &DocNode) -> ContentFields {
        let mut fields = ContentFields::default();

        for child in &content.children {
            match child.tag.as_str() {
                "paragraph" => {
                    if fields.description.is_none() {
                        fields.description = Some(collapse_ws(&flatten_text(child)));
                    }
                }
                "field_list" => {
                    for field in child.children_by_tag("field") {
                        self.parse_field(field, &mut fields);
                    }
                }
                _ => {}
            }
        }

        fields
    }

    fn parse_field(&self, field: &DocNode, out: &mut ContentFields) {
        let mut label = "";
        for part in &field.children {
            match part.tag.as_str() {
                "field_name" => label = part.text.as_deref().unwrap_or(""),
                "field_body" => match label {
                    fields::PARAMETERS => {
                        out.parameter_details = self.parse_parameter_details(part);
                    }
                    fields::RETURN_TYPE => {
                        out.return_type = Some(self.return_type_text(part));
                    }
                    fields::RETURNS => {
                        out.return_description = Some(collapse_ws(&flatten_text(part)));
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    /// The return type is the flattened text of the field body's first
    /// paragraph. A missing paragraph degrades to an empty string.
    fn return_type_text(&self, body: &DocNode) -> String {
        match body.find("paragraph") {
            Some(paragraph) => collapse_ws(&flatten_text(paragraph)),
            None => {
                warn!(
                    source_id = self.source_id,
                    "no paragraph in return-type field body"
                );
                String::new()
            }
        }
    }

    /// A `Parameters` field body holds either a bulleted list (one paragraph
    /// per parameter) or a single paragraph.
    fn parse_parameter_details(&self, body: &DocNode) -> Vec<ParameterDetailInfo> {
        let mut details = Vec::new();

        for child in &body.children {
            match child.tag.as_str() {
                "bullet_list" => {
                    details = child
                        .children_by_tag("list_item")
                        .filter_map(|item| self.parse_list_item(item))
                        .collect();
                }
                "paragraph" => {
                    if let Some(detail) = self.parse_parameter_paragraph(child) {
                        details = vec![detail];
                    }
                }
                _ => {}
            }
        }

        details
    }

    fn parse_list_item(&self, item: &DocNode) -> Option<ParameterDetailInfo> {
        match item.find("paragraph") {
            Some(paragraph) => self.parse_parameter_paragraph(paragraph),
            None => {
                warn!(
                    source_id = self.source_id,
                    "no paragraph in parameter list item"
                );
                None
            }
        }
    }

    /// Extract one parameter detail from a paragraph.
    ///
    /// The paragraph must open with an emphasized run holding the parameter
    /// name; the flattened text is then matched against the three detail
    /// patterns in priority order. Either failure drops the parameter with a
    /// warning; the rest of the entity is unaffected.
    fn parse_parameter_paragraph(&self, paragraph: &DocNode) -> Option<ParameterDetailInfo> {
        let has_name_run = paragraph
            .children
            .iter()
            .any(|c| c.tag == "literal_strong" || c.tag == "strong");
        if !has_name_run {
            warn!(
                source_id = self.source_id,
                "parameter paragraph has no literal_strong or strong run; dropped"
            );
            return None;
        }

        let text = collapse_ws(&flatten_text(paragraph));
        let text = OPEN_PAREN_WS.replace_all(&text, "(");

        if let Some(caps) = PARAM_FULL.captures(&text) {
            return Some(ParameterDetailInfo {
                name: caps[1].to_string(),
                data_type: Some(DataType::new(caps[2].trim())),
                description: Some(caps[3].trim().to_string()),
            });
        }

        if let Some(caps) = PARAM_NO_TYPE.captures(&text) {
            return Some(ParameterDetailInfo {
                name: caps[1].to_string(),
                data_type: None,
                description: Some(caps[2].trim().to_string()),
            });
        }

        if let Some(caps) = PARAM_TYPE_ONLY.captures(&text) {
            return Some(ParameterDetailInfo {
                name: caps[1].to_string(),
                data_type: Some(DataType::new(caps[2].trim())),
                description: None,
            });
        }

        warn!(
            text = %text,
            source_id = self.source_id,
            "parameter text matches no detail pattern; dropped"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn analyze(xml: &str) -> Result<FunctionInfo> {
        let desc = DocNode::parse_str(xml, "test").unwrap();
        FunctionAnalyzer::new("test", InfoKind::Function).analyze(&desc)
    }

    fn detail_from(paragraph: &str) -> Option<ParameterDetailInfo> {
        let node = DocNode::parse_str(paragraph, "test").unwrap();
        FunctionAnalyzer::new("test", InfoKind::Function).parse_parameter_paragraph(&node)
    }

    // --- tokenizer ---

    #[test]
    fn test_split_plain_parameters() {
        let params = split_balanced_parameters("x, y=1, z", "test").unwrap();
        assert_eq!(params, vec!["x", "y=1", "z"]);
    }

    #[test]
    fn test_split_keeps_nested_commas_together() {
        let params =
            split_balanced_parameters("x, y=1, cb=(lambda: None), z", "test").unwrap();
        assert_eq!(params, vec!["x", "y=1", "cb=(lambda:None)", "z"]);
    }

    #[test]
    fn test_split_deeply_nested() {
        let params = split_balanced_parameters("a=f(g(1, 2), 3), b", "test").unwrap();
        assert_eq!(params, vec!["a=f(g(1,2),3)", "b"]);
    }

    #[test]
    fn test_split_empty_input() {
        assert!(split_balanced_parameters("", "test").unwrap().is_empty());
        assert!(split_balanced_parameters("   ", "test").unwrap().is_empty());
    }

    #[test]
    fn test_split_unclosed_paren_is_fatal() {
        let err = split_balanced_parameters("x, y(", "test").unwrap_err();
        assert!(matches!(
            err,
            StubError::UnbalancedParameters { depth: 1, .. }
        ));
    }

    #[test]
    fn test_split_negative_depth_is_fatal() {
        let err = split_balanced_parameters("x), y", "test").unwrap_err();
        assert!(matches!(
            err,
            StubError::UnbalancedParameters { depth: -1, .. }
        ));
    }

    proptest! {
        /// For balanced input: joining the tokens with commas reproduces the
        /// whitespace-stripped input, and every token is itself balanced.
        #[test]
        fn prop_tokens_partition_balanced_input(
            params in proptest::collection::vec("[a-z]{1,4}(=[a-z]{1,3}(\\([a-z]{0,2}(,[a-z]{1,2})?\\))?)?", 1..6)
        ) {
            let input = params.join(", ");
            let tokens = split_balanced_parameters(&input, "prop").unwrap();

            let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
            prop_assert_eq!(tokens.join(","), stripped);
            for token in &tokens {
                prop_assert_eq!(
                    token.matches('(').count(),
                    token.matches(')').count()
                );
            }
        }
    }

    // --- detail patterns ---

    #[test]
    fn test_detail_pattern_full() {
        let detail = detail_from(
            "<paragraph><literal_strong>value</literal_strong> (<literal_emphasis>int</literal_emphasis>) – the value</paragraph>",
        )
        .unwrap();
        assert_eq!(detail.name, "value");
        assert_eq!(detail.data_type, Some(DataType::new("int")));
        assert_eq!(detail.description.as_deref(), Some("the value"));
    }

    #[test]
    fn test_detail_pattern_no_type() {
        let detail = detail_from(
            "<paragraph><strong>value</strong> – the value</paragraph>",
        )
        .unwrap();
        assert_eq!(detail.name, "value");
        assert_eq!(detail.data_type, None);
        assert_eq!(detail.description.as_deref(), Some("the value"));
    }

    #[test]
    fn test_detail_pattern_type_only() {
        let detail = detail_from(
            "<paragraph><literal_strong>value</literal_strong> (<literal_emphasis>int</literal_emphasis>) – </paragraph>",
        )
        .unwrap();
        assert_eq!(detail.name, "value");
        assert_eq!(detail.data_type, Some(DataType::new("int")));
        assert_eq!(detail.description, None);
    }

    #[test]
    fn test_detail_without_name_run_is_dropped() {
        assert!(detail_from("<paragraph>value (int) – the value</paragraph>").is_none());
    }

    #[test]
    fn test_detail_unmatched_text_is_dropped() {
        assert!(
            detail_from("<paragraph><strong>value</strong> has no dash at all</paragraph>")
                .is_none()
        );
    }

    // --- signatures ---

    #[test]
    fn test_signature_with_embedded_parameter_list() {
        let info = analyze(
            r#"<desc desctype="function">
                <desc_signature fullname="foo" module="m">
                    <desc_name>foo(a, b=1)</desc_name>
                </desc_signature>
                <desc_content/>
            </desc>"#,
        )
        .unwrap();

        assert_eq!(info.name, "foo");
        assert_eq!(info.parameters, vec!["a", "b=1"]);
        assert_eq!(info.module.as_deref(), Some("m"));
    }

    #[test]
    fn test_signature_with_explicit_parameterlist_node() {
        let info = analyze(
            r#"<desc desctype="function">
                <desc_signature fullname="bar" module="m">
                    <desc_name>bar</desc_name>
                    <desc_parameterlist>
                        <desc_parameter>x</desc_parameter>
                        <desc_parameter>y=2</desc_parameter>
                    </desc_parameterlist>
                </desc_signature>
                <desc_content/>
            </desc>"#,
        )
        .unwrap();

        assert_eq!(info.name, "bar");
        assert_eq!(info.parameters, vec!["x", "y=2"]);
    }

    #[test]
    fn test_signature_without_any_parameters() {
        let info = analyze(
            r#"<desc desctype="function">
                <desc_signature fullname="baz" module="m"><desc_name>baz</desc_name></desc_signature>
                <desc_content/>
            </desc>"#,
        )
        .unwrap();
        assert_eq!(info.name, "baz");
        assert!(info.parameters.is_empty());
    }

    #[test]
    fn test_stray_open_paren_truncates_name() {
        // No closing paren, so there is no parameter list to parse; the
        // stray '(' is a generator defect and the prefix is kept.
        let info = analyze(
            r#"<desc desctype="function">
                <desc_signature fullname="f"><desc_name>f(a, b(</desc_name></desc_signature>
            </desc>"#,
        )
        .unwrap();
        assert_eq!(info.name, "f");
        assert!(info.parameters.is_empty());
    }

    #[test]
    fn test_unbalanced_parameter_text_is_fatal() {
        let err = analyze(
            r#"<desc desctype="function">
                <desc_signature fullname="f"><desc_name>f(a))</desc_name></desc_signature>
            </desc>"#,
        )
        .unwrap_err();
        assert!(matches!(err, StubError::UnbalancedParameters { .. }));
    }

    #[test]
    fn test_content_before_signature_is_fatal() {
        let err = analyze(
            r#"<desc desctype="function">
                <desc_content/>
                <desc_signature fullname="f"><desc_name>f()</desc_name></desc_signature>
            </desc>"#,
        )
        .unwrap_err();
        assert!(matches!(err, StubError::Analyze { .. }));
    }

    // --- content ---

    #[test]
    fn test_content_fields() {
        let info = analyze(
            r#"<desc desctype="function">
                <desc_signature fullname="scale" module="m"><desc_name>scale(factor)</desc_name></desc_signature>
                <desc_content>
                    <paragraph>Scale the object.</paragraph>
                    <field_list>
                        <field>
                            <field_name>Parameters</field_name>
                            <field_body>
                                <bullet_list>
                                    <list_item><paragraph><literal_strong>factor</literal_strong> (<literal_emphasis>float</literal_emphasis>) – scale factor</paragraph></list_item>
                                </bullet_list>
                            </field_body>
                        </field>
                        <field>
                            <field_name>Return type</field_name>
                            <field_body><paragraph>bool</paragraph></field_body>
                        </field>
                        <field>
                            <field_name>Returns</field_name>
                            <field_body><paragraph>success flag</paragraph></field_body>
                        </field>
                    </field_list>
                </desc_content>
            </desc>"#,
        )
        .unwrap();

        assert_eq!(info.description.as_deref(), Some("Scale the object."));
        assert_eq!(info.parameter_details.len(), 1);
        assert_eq!(info.parameter_details[0].name, "factor");
        assert_eq!(
            info.parameter_details[0].data_type,
            Some(DataType::new("float"))
        );
        assert_eq!(info.return_info.data_type, Some(DataType::new("bool")));
        assert_eq!(info.return_info.description.as_deref(), Some("success flag"));
    }

    #[test]
    fn test_single_paragraph_parameter_field() {
        let info = analyze(
            r#"<desc desctype="function">
                <desc_signature fullname="f" module="m"><desc_name>f(x)</desc_name></desc_signature>
                <desc_content>
                    <field_list>
                        <field>
                            <field_name>Parameters</field_name>
                            <field_body>
                                <paragraph><literal_strong>x</literal_strong> – the input</paragraph>
                            </field_body>
                        </field>
                    </field_list>
                </desc_content>
            </desc>"#,
        )
        .unwrap();
        assert_eq!(info.parameter_details.len(), 1);
        assert_eq!(info.parameter_details[0].name, "x");
        assert_eq!(info.parameter_details[0].description.as_deref(), Some("the input"));
    }

    #[test]
    fn test_missing_return_type_paragraph_degrades_to_empty() {
        let info = analyze(
            r#"<desc desctype="function">
                <desc_signature fullname="f" module="m"><desc_name>f()</desc_name></desc_signature>
                <desc_content>
                    <field_list>
                        <field>
                            <field_name>Return type</field_name>
                            <field_body/>
                        </field>
                    </field_list>
                </desc_content>
            </desc>"#,
        )
        .unwrap();
        assert_eq!(info.return_info.data_type, Some(DataType::new("")));
    }
}
