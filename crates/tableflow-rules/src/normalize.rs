//! Keystroke normalization for method-specific editor controls.
//!
//! Every function here is total: malformed input narrows the result instead
//! of failing, so each keystroke always yields a value to commit.

use std::collections::HashSet;

use tableflow_core::{RangeOptions, ValidationMethod, ValidationOptions};

/// Min/max text for `length` and `range`; `None` for any other method.
///
/// A bound is kept only when its text is non-empty and parses as an integer.
pub fn normalize_range_input(
    method: &ValidationMethod,
    min_text: &str,
    max_text: &str,
) -> Option<ValidationOptions> {
    if !method.is_range_family() {
        return None;
    }

    Some(ValidationOptions::Range(RangeOptions {
        min: parse_bound(min_text),
        max: parse_bound(max_text),
    }))
}

/// Pattern text is forwarded as typed, including the empty string.
pub fn normalize_pattern_input(text: &str) -> ValidationOptions {
    ValidationOptions::Pattern(text.to_string())
}

/// Drop repeated tokens, keeping the first occurrence of each.
pub fn normalize_list_input<S: AsRef<str>>(tokens: &[S]) -> ValidationOptions {
    let mut seen = HashSet::new();
    let distinct = tokens
        .iter()
        .map(AsRef::as_ref)
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect();
    ValidationOptions::List(distinct)
}

fn parse_bound(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: Option<i64>, max: Option<i64>) -> Option<ValidationOptions> {
        Some(ValidationOptions::Range(RangeOptions { min, max }))
    }

    #[test]
    fn keeps_both_numeric_bounds() {
        assert_eq!(
            normalize_range_input(&ValidationMethod::Length, "3", "10"),
            range(Some(3), Some(10))
        );
    }

    #[test]
    fn omits_empty_bound() {
        assert_eq!(
            normalize_range_input(&ValidationMethod::Length, "", "10"),
            range(None, Some(10))
        );
    }

    #[test]
    fn omits_non_numeric_bound() {
        let value = normalize_range_input(&ValidationMethod::Length, "abc", "");
        assert_eq!(value, range(None, None));
        let json = serde_json::to_value(value).expect("serialize");
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn accepts_negative_and_padded_numbers() {
        assert_eq!(
            normalize_range_input(&ValidationMethod::Range, " -5 ", "2.5"),
            range(Some(-5), None)
        );
    }

    #[test]
    fn ignores_methods_outside_range_family() {
        assert_eq!(normalize_range_input(&ValidationMethod::Regex, "1", "2"), None);
        assert_eq!(
            normalize_range_input(&ValidationMethod::Other("email".to_string()), "1", "2"),
            None
        );
    }

    #[test]
    fn forwards_empty_pattern() {
        assert_eq!(
            normalize_pattern_input(""),
            ValidationOptions::Pattern(String::new())
        );
    }

    #[test]
    fn deduplicates_list_preserving_order() {
        assert_eq!(
            normalize_list_input(&["a", "b", "a", "c"]),
            ValidationOptions::List(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }
}
