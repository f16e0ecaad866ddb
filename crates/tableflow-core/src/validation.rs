use crate::capability::CapabilityCatalog;
use crate::error::{Error, Result};

/// Validate internal consistency of a capability catalog.
///
/// This checks:
/// - data type names are not blank
/// - method names are not blank
///
/// Repeated methods never reach this point; construction keeps the first.
pub fn validate_catalog(catalog: &CapabilityCatalog) -> Result<()> {
    for (data_type, capabilities) in catalog.iter() {
        if data_type.trim().is_empty() {
            return Err(Error::InvalidCatalog("blank data type name".to_string()));
        }

        for capability in capabilities {
            let method = capability.method.as_str();
            if method.trim().is_empty() {
                return Err(Error::InvalidCatalog(format!(
                    "blank validation method for data type: {data_type}"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilityEntry, RawCatalog};
    use crate::types::ValidationMethod;

    fn catalog(entries: &[(&str, &[(&str, bool)])]) -> CapabilityCatalog {
        let mut raw = RawCatalog::new();
        for (data_type, methods) in entries {
            raw.insert(
                data_type.to_string(),
                Some(
                    methods
                        .iter()
                        .map(|(method, allowed)| CapabilityEntry {
                            validate: ValidationMethod::from(*method),
                            allowed: *allowed,
                        })
                        .collect(),
                ),
            );
        }
        CapabilityCatalog::new(raw)
    }

    #[test]
    fn accepts_well_formed_catalog() {
        let catalog = catalog(&[
            ("string", &[("regex", true), ("list", false)]),
            ("number", &[]),
        ]);
        assert!(validate_catalog(&catalog).is_ok());
    }

    #[test]
    fn repeated_method_does_not_fail_the_catalog() {
        let catalog = catalog(&[
            ("string", &[("regex", true)]),
            ("number", &[("range", true), ("range", false)]),
        ]);
        assert!(validate_catalog(&catalog).is_ok());
        assert_eq!(catalog.capabilities("number").unwrap().len(), 1);
        assert!(catalog.has_methods("string"));
    }

    #[test]
    fn rejects_blank_names() {
        assert!(validate_catalog(&catalog(&[(" ", &[])])).is_err());
        assert!(validate_catalog(&catalog(&[("date", &[("", true)])])).is_err());
    }
}
