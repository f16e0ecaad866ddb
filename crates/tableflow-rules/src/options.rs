use serde::Serialize;

use tableflow_core::{CANONICAL_DATA_TYPES, CapabilityCatalog, ValidationMethod};

/// Advisory shown next to methods the current plan does not include.
pub const PLAN_RESTRICTED_REASON: &str = "Not available in your current plan";

/// Selectable data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataTypeOption {
    pub label: String,
    pub value: String,
}

/// Selectable validation method for the active data type.
///
/// Restricted methods are still listed, disabled, with an advisory reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodOption {
    pub label: String,
    pub value: ValidationMethod,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_reason: Option<&'static str>,
}

/// Data types offered by the editor.
///
/// The canonical types come first in fixed order whether or not the catalog
/// lists them, followed by the catalog's other types in catalog order.
pub fn list_data_type_options(catalog: &CapabilityCatalog) -> Vec<DataTypeOption> {
    let discovered = catalog
        .data_types()
        .filter(|data_type| !CANONICAL_DATA_TYPES.contains(data_type));

    CANONICAL_DATA_TYPES
        .into_iter()
        .chain(discovered)
        .map(|data_type| DataTypeOption {
            label: capitalize(data_type),
            value: data_type.to_string(),
        })
        .collect()
}

/// Methods for a data type, allowed first; empty when the type is unknown.
pub fn list_validation_method_options(
    catalog: &CapabilityCatalog,
    data_type: &str,
) -> Vec<MethodOption> {
    let Some(capabilities) = catalog.capabilities(data_type) else {
        return Vec::new();
    };

    capabilities
        .iter()
        .map(|capability| MethodOption {
            label: capitalize(capability.method.as_str()),
            value: capability.method.clone(),
            disabled: !capability.allowed_by_plan,
            disabled_reason: (!capability.allowed_by_plan).then_some(PLAN_RESTRICTED_REASON),
        })
        .collect()
}

pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog(value: serde_json::Value) -> CapabilityCatalog {
        serde_json::from_value(value).expect("parse catalog")
    }

    #[test]
    fn canonical_types_lead_and_extras_follow_once() {
        let catalog = catalog(json!({
            "currency": [],
            "boolean": [],
            "string": [],
            "uuid": [],
            "number": [],
            "date": []
        }));

        let values: Vec<String> = list_data_type_options(&catalog)
            .into_iter()
            .map(|option| option.value)
            .collect();
        assert_eq!(
            values,
            vec!["string", "number", "date", "boolean", "currency", "uuid"]
        );
    }

    #[test]
    fn canonical_types_are_listed_for_empty_catalog() {
        let options = list_data_type_options(&CapabilityCatalog::empty());
        let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();
        assert_eq!(labels, vec!["String", "Number", "Date", "Boolean"]);
    }

    #[test]
    fn restricted_methods_follow_allowed_ones_with_reason() {
        let catalog = catalog(json!({
            "string": [
                {"validate": "email", "allowed": false},
                {"validate": "regex", "allowed": true},
                {"validate": "phone", "allowed": false},
                {"validate": "list", "allowed": true}
            ]
        }));

        let options = list_validation_method_options(&catalog, "string");
        let summary: Vec<(&str, bool)> = options
            .iter()
            .map(|option| (option.label.as_str(), option.disabled))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Regex", false),
                ("List", false),
                ("Email", true),
                ("Phone", true)
            ]
        );
        assert_eq!(options[0].disabled_reason, None);
        assert_eq!(options[2].disabled_reason, Some(PLAN_RESTRICTED_REASON));
    }

    #[test]
    fn unknown_type_has_no_methods() {
        let catalog = catalog(json!({"string": [{"validate": "regex", "allowed": true}]}));
        assert!(list_validation_method_options(&catalog, "date").is_empty());
    }

    #[test]
    fn capitalizes_first_character_only() {
        assert_eq!(capitalize("not_blank"), "Not_blank");
        assert_eq!(capitalize(""), "");
    }
}
