use std::collections::HashSet;

use jsonschema::JSONSchema;
use serde_json::Value;

use tableflow_core::{
    CANONICAL_DATA_TYPES, CapabilityCatalog, ColumnValidation, OptionsShape, RangeOptions,
    Template, TemplateColumn, ValidationMethod, ValidationOptions,
};

use crate::errors::{RulesError, ValidationIssue, ValidationReport};
use crate::options::PLAN_RESTRICTED_REASON;

/// Validated template with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedTemplate {
    pub template: Template,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a template JSON document against the template JSON Schema.
pub fn validate_template_json(
    template_json: &Value,
    template_schema: &Value,
) -> Result<ValidationReport, RulesError> {
    let compiled =
        JSONSchema::compile(template_schema).map_err(|err| RulesError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(template_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::error("schema_violation", path, error.to_string()));
        }
    }

    Ok(report)
}

/// Validate a parsed template against the workspace capability catalog.
///
/// An empty catalog means capabilities are unavailable: capability checks
/// are skipped with a single warning while shape checks still run.
pub fn validate_template(template: &Template, catalog: &CapabilityCatalog) -> ValidationReport {
    let mut report = ValidationReport::default();

    if catalog.is_empty() {
        report.push(
            ValidationIssue::warning(
                "catalog_unavailable",
                "/",
                "capability catalog is empty; plan checks were skipped",
            )
            .with_hint("load the workspace catalog to check plan restrictions"),
        );
    }

    let mut seen_columns = HashSet::new();
    for (idx, column) in template.columns.iter().enumerate() {
        let base_path = format!("/columns/{idx}");

        if column.name.trim().is_empty() {
            report.push(ValidationIssue::error(
                "empty_column_name",
                format!("{base_path}/name"),
                "column name must be a non-empty string",
            ));
        }

        if !seen_columns.insert(column.identity()) {
            report.push(
                ValidationIssue::error(
                    "duplicate_column",
                    base_path.clone(),
                    format!("duplicate column '{}'", column.identity()),
                )
                .with_hint("give each column a unique key"),
            );
        }

        validate_column(column, &base_path, catalog, &mut report);
    }

    report
}

/// Validate the template end-to-end, returning structured issues on failure.
pub fn check_template(
    template_json: &Value,
    template_schema: &Value,
    catalog: &CapabilityCatalog,
) -> Result<ValidatedTemplate, ValidationReport> {
    let structural = match validate_template_json(template_json, template_schema) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "schema_validation_error",
                "/",
                err.to_string(),
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let template: Template = match serde_json::from_value(template_json.clone()) {
        Ok(template) => template,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "invalid_template_json",
                "/",
                err.to_string(),
            ));
            return Err(report);
        }
    };

    let report = validate_template(&template, catalog);
    if !report.is_ok() {
        return Err(report);
    }

    Ok(ValidatedTemplate {
        template,
        warnings: report.warnings,
    })
}

fn validate_column(
    column: &TemplateColumn,
    base_path: &str,
    catalog: &CapabilityCatalog,
    report: &mut ValidationReport,
) {
    let data_type = column.effective_data_type();

    if !catalog.is_empty()
        && !catalog.contains_data_type(data_type)
        && !CANONICAL_DATA_TYPES.contains(&data_type)
    {
        report.push(ValidationIssue::warning(
            "unknown_data_type",
            format!("{base_path}/data_type"),
            format!("data type '{data_type}' is not offered by the workspace"),
        ));
    }

    let mut seen_methods = HashSet::new();
    for (idx, validation) in column.validations.iter().enumerate() {
        let path = format!("{base_path}/validations/{idx}");

        if !seen_methods.insert(&validation.validate) {
            report.push(
                ValidationIssue::error(
                    "duplicate_validation",
                    path.clone(),
                    format!(
                        "validation '{}' is declared twice on the same column",
                        validation.validate
                    ),
                )
                .with_hint("keep only one rule per validation method"),
            );
            continue;
        }

        if !catalog.is_empty() {
            validate_capability(data_type, &validation.validate, &path, catalog, report);
        }
        validate_options(validation, &path, report);
    }
}

fn validate_capability(
    data_type: &str,
    method: &ValidationMethod,
    path: &str,
    catalog: &CapabilityCatalog,
    report: &mut ValidationReport,
) {
    match catalog.capability(data_type, method) {
        None => report.push(ValidationIssue::error(
            "unsupported_validation",
            format!("{path}/validate"),
            format!("validation '{method}' is not available for data type '{data_type}'"),
        )),
        Some(capability) if !capability.allowed_by_plan => report.push(
            ValidationIssue::error(
                "validation_not_in_plan",
                format!("{path}/validate"),
                format!("validation '{method}' is not allowed for this workspace"),
            )
            .with_hint(PLAN_RESTRICTED_REASON),
        ),
        Some(_) => {}
    }
}

fn validate_options(validation: &ColumnValidation, path: &str, report: &mut ValidationReport) {
    let options_path = format!("{path}/options");
    let shape = validation.validate.options_shape();

    let Some(options) = &validation.options else {
        if matches!(shape, OptionsShape::Pattern | OptionsShape::List) {
            report.push(ValidationIssue::error(
                "missing_options",
                options_path,
                format!("validation '{}' requires options", validation.validate),
            ));
        }
        return;
    };

    if shape == OptionsShape::NoOptions {
        report.push(ValidationIssue::warning(
            "unused_options",
            options_path,
            format!("validation '{}' does not take options", validation.validate),
        ));
        return;
    }

    if options.shape() != shape {
        report.push(ValidationIssue::error(
            "options_shape_mismatch",
            options_path,
            format!(
                "options do not match the shape expected by '{}'",
                validation.validate
            ),
        ));
        return;
    }

    match options {
        ValidationOptions::Pattern(pattern) => validate_pattern(pattern, &options_path, report),
        ValidationOptions::List(tokens) => validate_list(tokens, &options_path, report),
        ValidationOptions::Range(range) => {
            validate_range(&validation.validate, range, &options_path, report)
        }
    }
}

fn validate_pattern(pattern: &str, path: &str, report: &mut ValidationReport) {
    if pattern.is_empty() {
        report.push(ValidationIssue::warning(
            "empty_pattern",
            path,
            "empty pattern matches every value",
        ));
        return;
    }
    if let Err(err) = regex::Regex::new(pattern) {
        report.push(ValidationIssue::error(
            "invalid_pattern",
            path,
            format!("pattern does not compile: {err}"),
        ));
    }
}

fn validate_list(tokens: &[String], path: &str, report: &mut ValidationReport) {
    if tokens.is_empty() {
        report.push(ValidationIssue::error(
            "empty_list",
            path,
            "list validation needs at least one allowed value",
        ));
        return;
    }

    let mut seen = HashSet::new();
    for (idx, token) in tokens.iter().enumerate() {
        if !seen.insert(token.as_str()) {
            report.push(ValidationIssue::warning(
                "duplicate_list_values",
                format!("{path}/{idx}"),
                format!("value '{token}' is listed more than once"),
            ));
        }
    }
}

fn validate_range(
    method: &ValidationMethod,
    range: &RangeOptions,
    path: &str,
    report: &mut ValidationReport,
) {
    if range.is_empty() {
        report.push(ValidationIssue::warning(
            "empty_range",
            path,
            format!("'{method}' validation has neither min nor max"),
        ));
        return;
    }

    if *method == ValidationMethod::Length
        && (range.min.is_some_and(|min| min < 0) || range.max.is_some_and(|max| max < 0))
    {
        report.push(ValidationIssue::error(
            "negative_length",
            path,
            "length bounds must not be negative",
        ));
    }

    if let (Some(min), Some(max)) = (range.min, range.max)
        && min > max
    {
        report.push(ValidationIssue::error(
            "range_inverted",
            path,
            format!("min {min} is greater than max {max}"),
        ));
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
