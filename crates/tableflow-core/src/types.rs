use std::fmt;

use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Serialize};

/// Data types every workspace offers, in display order.
pub const CANONICAL_DATA_TYPES: [&str; 4] = ["string", "number", "date", "boolean"];

/// Column validation strategy as named by the capability backend.
///
/// Unknown names are kept verbatim so newer backends do not break older
/// clients; they simply carry no options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValidationMethod {
    Regex,
    List,
    Length,
    Range,
    Other(String),
}

impl ValidationMethod {
    pub fn as_str(&self) -> &str {
        match self {
            ValidationMethod::Regex => "regex",
            ValidationMethod::List => "list",
            ValidationMethod::Length => "length",
            ValidationMethod::Range => "range",
            ValidationMethod::Other(name) => name.as_str(),
        }
    }

    /// Shape of the options payload this method expects.
    pub fn options_shape(&self) -> OptionsShape {
        match self {
            ValidationMethod::Regex => OptionsShape::Pattern,
            ValidationMethod::List => OptionsShape::List,
            ValidationMethod::Length | ValidationMethod::Range => OptionsShape::Range,
            ValidationMethod::Other(_) => OptionsShape::NoOptions,
        }
    }

    /// `length` and `range` share one min/max option shape.
    pub fn is_range_family(&self) -> bool {
        self.options_shape() == OptionsShape::Range
    }
}

impl From<&str> for ValidationMethod {
    fn from(value: &str) -> Self {
        match value {
            "regex" => ValidationMethod::Regex,
            "list" => ValidationMethod::List,
            "length" => ValidationMethod::Length,
            "range" => ValidationMethod::Range,
            other => ValidationMethod::Other(other.to_string()),
        }
    }
}

impl From<String> for ValidationMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "regex" | "list" | "length" | "range" => ValidationMethod::from(value.as_str()),
            _ => ValidationMethod::Other(value),
        }
    }
}

impl From<ValidationMethod> for String {
    fn from(value: ValidationMethod) -> Self {
        match value {
            ValidationMethod::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ValidationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonSchema for ValidationMethod {
    fn schema_name() -> String {
        "ValidationMethod".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

/// Option payload families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsShape {
    Pattern,
    List,
    Range,
    NoOptions,
}

/// Normalized options attached to a column validation.
///
/// Serialized untagged: a pattern string, a list of strings, or an object
/// with optional `min` / `max` integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ValidationOptions {
    Pattern(String),
    List(Vec<String>),
    Range(RangeOptions),
}

impl ValidationOptions {
    pub fn shape(&self) -> OptionsShape {
        match self {
            ValidationOptions::Pattern(_) => OptionsShape::Pattern,
            ValidationOptions::List(_) => OptionsShape::List,
            ValidationOptions::Range(_) => OptionsShape::Range,
        }
    }

    /// Empty value for a shape; `None` when the shape carries no options.
    pub fn empty_for(shape: OptionsShape) -> Option<Self> {
        match shape {
            OptionsShape::Pattern => Some(ValidationOptions::Pattern(String::new())),
            OptionsShape::List => Some(ValidationOptions::List(Vec::new())),
            OptionsShape::Range => Some(ValidationOptions::Range(RangeOptions::default())),
            OptionsShape::NoOptions => None,
        }
    }
}

/// Bounds for `length` and `range` validations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RangeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl RangeOptions {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}
