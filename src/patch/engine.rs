//! Override application.
//!
//! Documents apply strictly in their given order; within one document the
//! operations run remove → new → append → update. Identity for matching is
//! the (type, name, module) triple. `remove` lets a module-absent item match
//! module-absent entities; `append`/`update` require the item to name a
//! module and match it exactly.

use std::path::Path;
use tracing::warn;

use crate::patch::item::{ModDocument, NewItem, PatchItem, TargetRef};
use crate::types::{AnalysisResult, Info, Result, SectionInfo};

/// Whether absent fields may clear existing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApplyMode {
    /// Additive: explicit `null` values are ignored.
    Append,
    /// Corrective: explicit `null` values clear the field.
    Update,
}

/// Load and apply override files, in order. A later file sees what an
/// earlier file added and may remove or further modify it.
pub fn apply_mod_files<P: AsRef<Path>>(
    result: &mut AnalysisResult,
    paths: &[P],
) -> Result<()> {
    for path in paths {
        let doc = ModDocument::parse_file(path.as_ref())?;
        apply_mod_document(result, doc);
    }
    Ok(())
}

/// Apply one parsed override document.
pub fn apply_mod_document(result: &mut AnalysisResult, doc: ModDocument) {
    apply_remove(result, &doc.remove);
    // Only a document that carries a `new` key contributes a section;
    // remove/append/update-only documents leave the section list alone.
    if let Some(items) = doc.new {
        apply_new(result, items);
    }
    apply_patch_items(result, &doc.append, ApplyMode::Append);
    apply_patch_items(result, &doc.update, ApplyMode::Update);
}

fn apply_remove(result: &mut AnalysisResult, items: &[TargetRef]) {
    for item in items {
        for section in &mut result.sections {
            section.info_list.retain(|info| {
                let matched = matches_remove(info, item);
                if matched {
                    warn!(
                        name = info.name(),
                        kind = %info.kind(),
                        "entity removed by override"
                    );
                }
                !matched
            });
        }
    }
}

fn matches_remove(info: &Info, item: &TargetRef) -> bool {
    if info.kind() != item.kind || info.name() != item.name {
        return false;
    }
    match &item.module {
        Some(module) => info.module() == Some(module.as_str()),
        // A module-less item matches only module-less entities.
        None => info.module().is_none(),
    }
}

fn apply_new(result: &mut AnalysisResult, items: Vec<NewItem>) {
    let mut new_section = SectionInfo::new();

    for item in items {
        let exists = result
            .entities()
            .chain(new_section.info_list.iter())
            .any(|info| matches_new(info, &item));

        if exists {
            warn!(name = item.name(), "override entity is already registered");
            continue;
        }
        new_section.info_list.push(item.into_info());
    }

    result.sections.push(new_section);
}

fn matches_new(info: &Info, item: &NewItem) -> bool {
    info.kind() == item.kind()
        && info.name() == item.name()
        && match item.module() {
            Some(module) => info.module() == Some(module),
            None => false,
        }
}

fn apply_patch_items(result: &mut AnalysisResult, items: &[PatchItem], mode: ApplyMode) {
    for item in items {
        for section in &mut result.sections {
            for info in &mut section.info_list {
                if matches_patch(info, item) {
                    apply_fields(info, item, mode);
                }
            }
        }
    }
}

/// Unlike `remove`, the item must carry a module for anything to match.
fn matches_patch(info: &Info, item: &PatchItem) -> bool {
    info.kind() == item.kind
        && info.name() == item.name
        && match &item.module {
            Some(module) => info.module() == Some(module.as_str()),
            None => false,
        }
}

fn apply_fields(info: &mut Info, item: &PatchItem, mode: ApplyMode) {
    match info {
        Info::Variable(v) => {
            apply_scalar(&mut v.description, &item.description, mode);
            apply_scalar(&mut v.data_type, &item.data_type, mode);
            apply_scalar(&mut v.class, &item.class, mode);
        }
        Info::Function(f) => {
            apply_scalar(&mut f.description, &item.description, mode);
            apply_scalar(&mut f.class, &item.class, mode);
            if let Some(parameters) = &item.parameters {
                f.parameters = parameters.clone();
            }
            if let Some(details) = &item.parameter_details {
                f.parameter_details = details.clone();
            }
            if let Some(return_info) = &item.return_info {
                f.return_info = return_info.clone();
            }
        }
        Info::Class(c) => {
            apply_scalar(&mut c.description, &item.description, mode);
            if let Some(base_classes) = &item.base_classes {
                c.base_classes = base_classes.clone();
            }
            if let Some(methods) = &item.methods {
                c.methods = methods.clone();
            }
            if let Some(attributes) = &item.attributes {
                c.attributes = attributes.clone();
            }
        }
    }
}

/// Both modes copy a provided value unconditionally; only `update` honors an
/// explicit `null` by clearing the field.
fn apply_scalar<T: Clone>(target: &mut Option<T>, patch: &Option<Option<T>>, mode: ApplyMode) {
    match patch {
        None => {}
        Some(Some(value)) => *target = Some(value.clone()),
        Some(None) => {
            if mode == ApplyMode::Update {
                *target = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, InfoKind, VariableInfo};

    fn constant(name: &str, module: Option<&str>) -> Info {
        let mut v = VariableInfo::new(InfoKind::Constant);
        v.name = name.to_string();
        v.module = module.map(str::to_string);
        Info::Variable(v)
    }

    fn model_of(entities: Vec<Info>) -> AnalysisResult {
        let mut result = AnalysisResult::new();
        result.sections.push(SectionInfo {
            info_list: entities,
        });
        result
    }

    fn doc(json: &str) -> ModDocument {
        ModDocument::parse_str(json, "test").unwrap()
    }

    fn entity_count(result: &AnalysisResult) -> usize {
        result.entities().count()
    }

    #[test]
    fn test_remove_matches_module() {
        let mut result = model_of(vec![
            constant("X", Some("a")),
            constant("X", Some("b")),
        ]);
        apply_mod_document(
            &mut result,
            doc(r#"{"remove": [{"type": "constant", "name": "X", "module": "a"}]}"#),
        );

        assert_eq!(entity_count(&result), 1);
        assert_eq!(result.entities().next().unwrap().module(), Some("b"));
    }

    #[test]
    fn test_remove_without_module_only_matches_moduleless() {
        let mut result = model_of(vec![constant("X", Some("a")), constant("X", None)]);
        apply_mod_document(
            &mut result,
            doc(r#"{"remove": [{"type": "constant", "name": "X"}]}"#),
        );

        assert_eq!(entity_count(&result), 1);
        assert_eq!(result.entities().next().unwrap().module(), Some("a"));
    }

    #[test]
    fn test_new_adds_into_fresh_section() {
        let mut result = model_of(vec![constant("X", Some("a"))]);
        apply_mod_document(
            &mut result,
            doc(r#"{"new": [{"type": "function", "name": "f", "module": "a", "parameters": ["x"]}]}"#),
        );

        assert_eq!(result.sections.len(), 2);
        let added = &result.sections[1].info_list[0];
        assert_eq!(added.kind(), InfoKind::Function);
        assert_eq!(added.name(), "f");
    }

    #[test]
    fn test_document_without_new_adds_no_section() {
        let mut result = model_of(vec![constant("X", Some("a"))]);
        apply_mod_document(
            &mut result,
            doc(r#"{"remove": [{"type": "constant", "name": "X", "module": "a"}]}"#),
        );
        apply_mod_document(
            &mut result,
            doc(r#"{"update": [{"type": "constant", "name": "Y", "module": "a", "description": "doc"}]}"#),
        );

        assert_eq!(result.sections.len(), 1);
    }

    #[test]
    fn test_empty_new_array_still_adds_a_section() {
        let mut result = model_of(vec![constant("X", Some("a"))]);
        apply_mod_document(&mut result, doc(r#"{"new": []}"#));

        assert_eq!(result.sections.len(), 2);
        assert!(result.sections[1].info_list.is_empty());
    }

    #[test]
    fn test_new_is_idempotent_across_applications() {
        let mut result = model_of(vec![]);
        let json = r#"{"new": [{"type": "constant", "name": "PI", "module": "math"}]}"#;

        apply_mod_document(&mut result, doc(json));
        apply_mod_document(&mut result, doc(json));

        let found: Vec<_> = result
            .entities()
            .filter(|e| e.name() == "PI")
            .collect();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_append_fills_fields() {
        let mut result = model_of(vec![constant("X", Some("a"))]);
        apply_mod_document(
            &mut result,
            doc(r#"{"append": [{"type": "constant", "name": "X", "module": "a", "data_type": "int"}]}"#),
        );

        let Info::Variable(v) = result.entities().next().unwrap() else { panic!() };
        assert_eq!(v.data_type, Some(DataType::new("int")));
    }

    #[test]
    fn test_append_requires_module_in_item() {
        let mut result = model_of(vec![constant("X", None)]);
        apply_mod_document(
            &mut result,
            doc(r#"{"append": [{"type": "constant", "name": "X", "data_type": "int"}]}"#),
        );

        let Info::Variable(v) = result.entities().next().unwrap() else { panic!() };
        assert_eq!(v.data_type, None);
    }

    #[test]
    fn test_append_overwrites_like_update() {
        // Append performs the same unconditional copy as update for
        // provided fields.
        let mut result = model_of(vec![constant("X", Some("a"))]);
        apply_mod_document(
            &mut result,
            doc(r#"{"append": [{"type": "constant", "name": "X", "module": "a", "description": "first"}]}"#),
        );
        apply_mod_document(
            &mut result,
            doc(r#"{"append": [{"type": "constant", "name": "X", "module": "a", "description": "second"}]}"#),
        );

        let Info::Variable(v) = result.entities().next().unwrap() else { panic!() };
        assert_eq!(v.description.as_deref(), Some("second"));
    }

    #[test]
    fn test_update_null_clears_append_null_does_not() {
        let mut result = model_of(vec![constant("X", Some("a")), constant("Y", Some("a"))]);
        apply_mod_document(
            &mut result,
            doc(r#"{"update": [{"type": "constant", "name": "X", "module": "a", "description": "doc"},
                               {"type": "constant", "name": "Y", "module": "a", "description": "doc"}]}"#),
        );
        apply_mod_document(
            &mut result,
            doc(r#"{"update": [{"type": "constant", "name": "X", "module": "a", "description": null}],
                 "append": [{"type": "constant", "name": "Y", "module": "a", "description": null}]}"#),
        );

        let entities: Vec<_> = result.entities().collect();
        let Info::Variable(x) = entities[0] else { panic!() };
        let Info::Variable(y) = entities[1] else { panic!() };
        assert_eq!(x.description, None);
        assert_eq!(y.description.as_deref(), Some("doc"));
    }

    #[test]
    fn test_remove_runs_before_append_within_one_document() {
        let mut result = model_of(vec![constant("X", Some("a"))]);
        apply_mod_document(
            &mut result,
            doc(r#"{
                "remove": [{"type": "constant", "name": "X", "module": "a"}],
                "append": [{"type": "constant", "name": "X", "module": "a", "description": "late"}]
            }"#),
        );

        assert_eq!(entity_count(&result), 0);
    }

    #[test]
    fn test_later_document_can_remove_earlier_addition() {
        let mut result = model_of(vec![]);
        apply_mod_document(
            &mut result,
            doc(r#"{"new": [{"type": "class", "name": "Timer", "module": "app"}]}"#),
        );
        apply_mod_document(
            &mut result,
            doc(r#"{"remove": [{"type": "class", "name": "Timer", "module": "app"}]}"#),
        );

        assert_eq!(entity_count(&result), 0);
    }

    #[test]
    fn test_update_replaces_function_lists() {
        let mut result = model_of(vec![]);
        apply_mod_document(
            &mut result,
            doc(r#"{"new": [{"type": "function", "name": "f", "module": "m", "parameters": ["a"]}]}"#),
        );
        apply_mod_document(
            &mut result,
            doc(r#"{"update": [{
                "type": "function", "name": "f", "module": "m",
                "parameters": ["a", "b=1"],
                "return": {"data_type": "bool"}
            }]}"#),
        );

        let Info::Function(f) = result.entities().next().unwrap() else { panic!() };
        assert_eq!(f.parameters, vec!["a", "b=1"]);
        assert_eq!(f.return_info.data_type, Some(DataType::new("bool")));
    }
}
