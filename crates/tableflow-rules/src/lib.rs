//! Validation rule configuration for tableflow templates.
//!
//! [`RuleEngine`] reconciles a column's data type, validation method and
//! method-specific options against the workspace capability catalog;
//! [`RuleEditorSurface`] is the contract a renderer drives it through.
//! Whole templates are checked with [`validate_template`].

pub mod engine;
pub mod errors;
pub mod normalize;
pub mod options;
pub mod schema;
pub mod surface;
pub mod validate;

pub use engine::{DataTypeChange, EditorState, MethodControl, RuleEngine};
pub use errors::{IssueSeverity, RulesError, ValidationIssue, ValidationReport};
pub use normalize::{normalize_list_input, normalize_pattern_input, normalize_range_input};
pub use options::{
    DataTypeOption, MethodOption, PLAN_RESTRICTED_REASON, list_data_type_options,
    list_validation_method_options,
};
pub use schema::template_json_schema;
pub use surface::{EditorInput, EditorView, RuleCommitter, RuleDraft, RuleEditorSurface};
pub use validate::{ValidatedTemplate, check_template, validate_template, validate_template_json};
