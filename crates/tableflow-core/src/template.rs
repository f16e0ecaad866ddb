use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{ValidationMethod, ValidationOptions};

/// Data type assumed for columns that do not declare one.
pub const DEFAULT_DATA_TYPE: &str = "string";

/// Import template edited in the console and enforced by the importer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Template {
    /// Display name of the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Columns in the order the importer presents them.
    pub columns: Vec<TemplateColumn>,
}

/// One expected column of an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TemplateColumn {
    pub name: String,
    /// Output key; defaults to a value derived from `name` by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Output data type (ex.: `string`, `number`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ColumnValidation>,
}

impl TemplateColumn {
    /// Declared data type, falling back to [`DEFAULT_DATA_TYPE`].
    pub fn effective_data_type(&self) -> &str {
        self.data_type.as_deref().unwrap_or(DEFAULT_DATA_TYPE)
    }

    /// Key used to detect duplicated columns.
    pub fn identity(&self) -> &str {
        self.key.as_deref().unwrap_or(self.name.as_str())
    }
}

/// A validation rule attached to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnValidation {
    pub validate: ValidationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ValidationOptions>,
    /// Message shown to the reviewer when a cell fails the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<RuleSeverity>,
}

/// How a failed validation is surfaced in the reviewer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RuleSeverity {
    Error,
    Warning,
    Info,
}
