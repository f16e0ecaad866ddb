//! Core contracts and helpers for tableflow.
//!
//! This crate defines the capability catalog, the validation method and
//! options types, and the import template model shared by the catalog
//! adapters, the rule engine and the CLI.

pub mod capability;
pub mod error;
pub mod redaction;
pub mod template;
pub mod types;
pub mod validation;

pub use capability::{CapabilityCatalog, CapabilityEntry, RawCatalog, ValidationCapability};
pub use error::{Error, Result};
pub use redaction::{RedactedEndpoint, redact_endpoint};
pub use template::{ColumnValidation, DEFAULT_DATA_TYPE, RuleSeverity, Template, TemplateColumn};
pub use types::{
    CANONICAL_DATA_TYPES, OptionsShape, RangeOptions, ValidationMethod, ValidationOptions,
};
pub use validation::validate_catalog;
