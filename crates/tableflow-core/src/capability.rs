use std::collections::HashSet;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::ValidationMethod;

/// A validation method offered for one data type, gated by the workspace plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCapability {
    pub data_type: String,
    pub method: ValidationMethod,
    pub allowed_by_plan: bool,
}

/// Wire form of a capability inside the per-type list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CapabilityEntry {
    /// Validation method name (ex.: `regex`).
    pub validate: ValidationMethod,
    /// Whether the current plan permits the method.
    pub allowed: bool,
}

/// Wire form of the catalog: data type → capability entries, in source order.
///
/// A `null` list reads as a type with no methods.
pub type RawCatalog = IndexMap<String, Option<Vec<CapabilityEntry>>>;

/// Per-workspace mapping from data type to the validation methods it supports.
///
/// Key order follows the source document. On construction each per-type list
/// keeps only the first entry of a repeated method and is stably partitioned
/// so that methods allowed by the plan come before restricted ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCatalog", into = "RawCatalog")]
pub struct CapabilityCatalog {
    entries: IndexMap<String, Vec<ValidationCapability>>,
}

impl CapabilityCatalog {
    /// Build a catalog from its wire form.
    pub fn new(raw: RawCatalog) -> Self {
        let entries = raw
            .into_iter()
            .map(|(data_type, list)| {
                let capabilities = list
                    .unwrap_or_default()
                    .into_iter()
                    .map(|entry| ValidationCapability {
                        data_type: data_type.clone(),
                        method: entry.validate,
                        allowed_by_plan: entry.allowed,
                    })
                    .collect();
                (data_type, allowed_first(first_of_each(capabilities)))
            })
            .collect();
        Self { entries }
    }

    /// Catalog with no data types; stands in for a pending or failed load.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Group flat capabilities by data type, keeping first-seen type order.
    pub fn from_capabilities(
        capabilities: impl IntoIterator<Item = ValidationCapability>,
    ) -> Self {
        let mut grouped: IndexMap<String, Vec<ValidationCapability>> = IndexMap::new();
        for capability in capabilities {
            grouped
                .entry(capability.data_type.clone())
                .or_default()
                .push(capability);
        }
        let entries = grouped
            .into_iter()
            .map(|(data_type, list)| (data_type, allowed_first(first_of_each(list))))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Data types in catalog order.
    pub fn data_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn contains_data_type(&self, data_type: &str) -> bool {
        self.entries.contains_key(data_type)
    }

    /// Allowed-first capabilities for a data type; `None` when the type is unknown.
    pub fn capabilities(&self, data_type: &str) -> Option<&[ValidationCapability]> {
        self.entries.get(data_type).map(Vec::as_slice)
    }

    /// True when the data type has at least one capability, allowed or not.
    pub fn has_methods(&self, data_type: &str) -> bool {
        self.capabilities(data_type)
            .is_some_and(|capabilities| !capabilities.is_empty())
    }

    pub fn capability(
        &self,
        data_type: &str,
        method: &ValidationMethod,
    ) -> Option<&ValidationCapability> {
        self.capabilities(data_type)?
            .iter()
            .find(|capability| &capability.method == method)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationCapability])> {
        self.entries
            .iter()
            .map(|(data_type, list)| (data_type.as_str(), list.as_slice()))
    }
}

impl From<RawCatalog> for CapabilityCatalog {
    fn from(raw: RawCatalog) -> Self {
        Self::new(raw)
    }
}

impl From<CapabilityCatalog> for RawCatalog {
    fn from(catalog: CapabilityCatalog) -> Self {
        catalog
            .entries
            .into_iter()
            .map(|(data_type, list)| {
                let entries = list
                    .into_iter()
                    .map(|capability| CapabilityEntry {
                        validate: capability.method,
                        allowed: capability.allowed_by_plan,
                    })
                    .collect();
                (data_type, Some(entries))
            })
            .collect()
    }
}

fn first_of_each(capabilities: Vec<ValidationCapability>) -> Vec<ValidationCapability> {
    let mut seen = HashSet::new();
    capabilities
        .into_iter()
        .filter(|capability| seen.insert(capability.method.clone()))
        .collect()
}

fn allowed_first(capabilities: Vec<ValidationCapability>) -> Vec<ValidationCapability> {
    let (allowed, restricted): (Vec<_>, Vec<_>) = capabilities
        .into_iter()
        .partition(|capability| capability.allowed_by_plan);
    allowed.into_iter().chain(restricted).collect()
}
