use serde_json::json;
use tableflow_core::{CapabilityCatalog, RangeOptions, ValidationMethod, ValidationOptions};
use tableflow_rules::{
    EditorInput, MethodControl, RuleDraft, RuleEditorSurface, RuleEngine, list_data_type_options,
    list_validation_method_options,
};

fn full_catalog() -> CapabilityCatalog {
    serde_json::from_value(json!({
        "string": [
            {"validate": "email", "allowed": false},
            {"validate": "regex", "allowed": true},
            {"validate": "list", "allowed": true},
            {"validate": "length", "allowed": true}
        ],
        "number": [
            {"validate": "range", "allowed": true},
            {"validate": "length", "allowed": false}
        ],
        "date": [],
        "boolean": [],
        "currency": [{"validate": "range", "allowed": true}]
    }))
    .expect("parse catalog")
}

fn surface(catalog: CapabilityCatalog) -> RuleEditorSurface<RuleDraft> {
    RuleEditorSurface::new(RuleEngine::new(catalog), RuleDraft::default())
}

#[test]
fn sparse_catalog_hides_method_control_for_empty_type() {
    let catalog: CapabilityCatalog = serde_json::from_value(json!({
        "string": [{"validate": "regex", "allowed": true}],
        "number": []
    }))
    .expect("parse catalog");

    let values: Vec<String> = list_data_type_options(&catalog)
        .into_iter()
        .map(|option| option.value)
        .collect();
    assert_eq!(values, vec!["string", "number", "date", "boolean"]);

    assert!(list_validation_method_options(&catalog, "number").is_empty());

    let mut engine = RuleEngine::new(catalog);
    let change = engine.on_data_type_changed("number");
    assert!(change.method_options.is_empty());
    assert!(change.must_hide_method_control);
}

#[test]
fn full_catalog_lists_canonical_types_then_extras() {
    let values: Vec<String> = list_data_type_options(&full_catalog())
        .into_iter()
        .map(|option| option.value)
        .collect();
    assert_eq!(values, vec!["string", "number", "date", "boolean", "currency"]);
}

#[test]
fn restricted_type_still_shows_method_control() {
    let mut engine = RuleEngine::new(full_catalog());
    let change = engine.on_data_type_changed("number");
    assert!(!change.must_hide_method_control);
    assert_eq!(change.method_options.len(), 2);
    assert!(change.method_options[1].disabled);
}

#[test]
fn pattern_does_not_leak_across_data_type_switch() {
    let mut surface = surface(full_catalog());
    surface.handle(EditorInput::DataTypeSelected("string".to_string()));
    surface.handle(EditorInput::MethodSelected(Some(ValidationMethod::Regex)));
    surface.handle(EditorInput::PatternTyped("^A".to_string()));
    assert_eq!(
        surface.committer().options,
        Some(ValidationOptions::Pattern("^A".to_string()))
    );

    surface.handle(EditorInput::DataTypeSelected("number".to_string()));
    assert_eq!(surface.committer().options, None);
    assert_eq!(surface.committer().method, None);
    assert_eq!(surface.view().control, MethodControl::Prompt);

    surface.handle(EditorInput::MethodSelected(Some(ValidationMethod::Range)));
    assert_eq!(
        surface.committer().options,
        Some(ValidationOptions::Range(RangeOptions::default()))
    );
    assert_eq!(surface.engine().editor().pattern_text, "");
}

#[test]
fn every_keystroke_commits_normalized_bounds() {
    let mut surface = surface(full_catalog());
    surface.handle(EditorInput::DataTypeSelected("string".to_string()));
    surface.handle(EditorInput::MethodSelected(Some(ValidationMethod::Length)));
    let commits_before = surface.committer().option_commits;

    surface.handle(EditorInput::MinTyped("3".to_string()));
    surface.handle(EditorInput::MaxTyped("1".to_string()));
    surface.handle(EditorInput::MaxTyped("10".to_string()));
    surface.handle(EditorInput::MinTyped("3x".to_string()));

    assert_eq!(surface.committer().option_commits, commits_before + 4);
    assert_eq!(
        surface.committer().options,
        Some(ValidationOptions::Range(RangeOptions {
            min: None,
            max: Some(10)
        }))
    );
    assert_eq!(
        surface.view().control,
        MethodControl::Range {
            min_text: "3x".to_string(),
            max_text: "10".to_string()
        }
    );
}

#[test]
fn list_edits_commit_distinct_tokens() {
    let mut surface = surface(full_catalog());
    surface.handle(EditorInput::DataTypeSelected("string".to_string()));
    surface.handle(EditorInput::MethodSelected(Some(ValidationMethod::List)));
    surface.handle(EditorInput::ListEdited(
        ["a", "b", "a", "c"].iter().map(|t| t.to_string()).collect(),
    ));

    assert_eq!(
        surface.committer().options,
        Some(ValidationOptions::List(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string()
        ]))
    );
}

#[test]
fn view_reflects_selection_and_plan_gating() {
    let mut surface = surface(full_catalog());
    surface.handle(EditorInput::DataTypeSelected("string".to_string()));

    let view = surface.view();
    assert_eq!(view.data_type.as_deref(), Some("string"));
    assert!(view.show_method_selector);
    let labels: Vec<&str> = view.methods.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["Regex", "List", "Length", "Email"]);
    assert_eq!(
        view.methods[3].disabled_reason,
        Some("Not available in your current plan")
    );
    assert_eq!(surface.committer().data_type.as_deref(), Some("string"));
}

#[test]
fn pending_catalog_keeps_editor_responsive() {
    let mut surface = surface(CapabilityCatalog::empty());
    surface.handle(EditorInput::DataTypeSelected("string".to_string()));

    let view = surface.view();
    assert_eq!(view.data_types.len(), 4);
    assert!(view.methods.is_empty());
    assert!(!view.show_method_selector);
    assert_eq!(view.control, MethodControl::Hidden);

    surface.engine_mut().set_catalog(full_catalog());
    assert_eq!(surface.view().control, MethodControl::Prompt);
}

#[test]
fn clearing_the_data_type_commits_none() {
    let mut surface = surface(full_catalog());
    surface.handle(EditorInput::DataTypeSelected("string".to_string()));
    surface.handle(EditorInput::DataTypeSelected(String::new()));

    assert_eq!(surface.engine().data_type(), None);
    assert_eq!(surface.committer().data_type, None);
    assert_eq!(surface.view().control, MethodControl::Hidden);
}
