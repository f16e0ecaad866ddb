use serde::Serialize;

use tableflow_core::{
    CapabilityCatalog, ColumnValidation, OptionsShape, ValidationMethod, ValidationOptions,
};

use crate::normalize::{normalize_list_input, normalize_pattern_input, normalize_range_input};
use crate::options::{
    DataTypeOption, MethodOption, list_data_type_options, list_validation_method_options,
};

/// Raw text behind the method-specific controls.
///
/// Mirrors the externally supplied options whenever the data type or
/// method changes; afterwards it only moves with keystrokes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditorState {
    pub min_text: String,
    pub max_text: String,
    pub pattern_text: String,
    pub list_tokens: Vec<String>,
}

impl EditorState {
    /// Editor text for `options`, read only through the shape of `method`.
    pub fn mirror(method: Option<&ValidationMethod>, options: Option<&ValidationOptions>) -> Self {
        let mut state = EditorState::default();
        let (Some(method), Some(options)) = (method, options) else {
            return state;
        };

        match (method.options_shape(), options) {
            (OptionsShape::Range, ValidationOptions::Range(range)) => {
                state.min_text = range.min.map(|value| value.to_string()).unwrap_or_default();
                state.max_text = range.max.map(|value| value.to_string()).unwrap_or_default();
            }
            (OptionsShape::Pattern, ValidationOptions::Pattern(pattern)) => {
                state.pattern_text = pattern.clone();
            }
            (OptionsShape::List, ValidationOptions::List(tokens)) => {
                state.list_tokens = tokens.clone();
            }
            _ => {}
        }
        state
    }
}

/// Result of switching the active data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataTypeChange {
    pub method_options: Vec<MethodOption>,
    /// True exactly when the catalog has no methods at all for the type.
    pub must_hide_method_control: bool,
}

/// What the editor should render below the method selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum MethodControl {
    /// The data type has no catalog methods; the selector itself is hidden.
    Hidden,
    /// Methods exist but none is selected yet.
    Prompt,
    Pattern { text: String },
    List { tokens: Vec<String> },
    Range { min_text: String, max_text: String },
    /// The selected method takes no options.
    NoOptions,
}

/// Validation rule editor state for one template column.
///
/// All transitions are synchronous and explicit; callers invoke them in the
/// order user actions happen.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    catalog: CapabilityCatalog,
    data_type: Option<String>,
    method: Option<ValidationMethod>,
    options: Option<ValidationOptions>,
    editor: EditorState,
}

impl RuleEngine {
    pub fn new(catalog: impl Into<CapabilityCatalog>) -> Self {
        Self {
            catalog: catalog.into(),
            data_type: None,
            method: None,
            options: None,
            editor: EditorState::default(),
        }
    }

    /// Seed the engine with an existing rule, mirroring its options into the editor.
    pub fn with_rule(
        catalog: impl Into<CapabilityCatalog>,
        data_type: Option<String>,
        method: Option<ValidationMethod>,
        options: Option<ValidationOptions>,
    ) -> Self {
        let editor = EditorState::mirror(method.as_ref(), options.as_ref());
        Self {
            catalog: catalog.into(),
            data_type,
            method,
            options,
            editor,
        }
    }

    /// Swap in a catalog once a pending load resolves; selections are kept.
    pub fn set_catalog(&mut self, catalog: impl Into<CapabilityCatalog>) {
        self.catalog = catalog.into();
        tracing::debug!(event = "catalog_applied", data_types = self.catalog.len());
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn method(&self) -> Option<&ValidationMethod> {
        self.method.as_ref()
    }

    pub fn options(&self) -> Option<&ValidationOptions> {
        self.options.as_ref()
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn data_type_options(&self) -> Vec<DataTypeOption> {
        list_data_type_options(&self.catalog)
    }

    pub fn method_options(&self) -> Vec<MethodOption> {
        match &self.data_type {
            Some(data_type) => list_validation_method_options(&self.catalog, data_type),
            None => Vec::new(),
        }
    }

    pub fn must_hide_method_control(&self) -> bool {
        !self
            .data_type
            .as_deref()
            .is_some_and(|data_type| self.catalog.has_methods(data_type))
    }

    /// Switch data type; the method, its options and all editor text are discarded.
    pub fn on_data_type_changed(&mut self, data_type: &str) -> DataTypeChange {
        self.data_type = (!data_type.is_empty()).then(|| data_type.to_string());
        self.method = None;
        self.options = None;
        self.editor = EditorState::default();

        let change = DataTypeChange {
            method_options: self.method_options(),
            must_hide_method_control: self.must_hide_method_control(),
        };
        tracing::debug!(
            event = "data_type_changed",
            data_type = %data_type,
            methods = change.method_options.len(),
            hidden = change.must_hide_method_control
        );
        change
    }

    /// Switch method and return the fresh options value for its shape.
    ///
    /// Min/max survive only a move between `length` and `range`.
    pub fn on_method_changed(
        &mut self,
        method: Option<ValidationMethod>,
    ) -> Option<ValidationOptions> {
        let keep_bounds = self
            .method
            .as_ref()
            .is_some_and(ValidationMethod::is_range_family)
            && method.as_ref().is_some_and(ValidationMethod::is_range_family);

        self.options = match &method {
            Some(next) if keep_bounds => {
                self.editor.pattern_text.clear();
                self.editor.list_tokens.clear();
                normalize_range_input(next, &self.editor.min_text, &self.editor.max_text)
            }
            Some(next) => {
                self.editor = EditorState::default();
                ValidationOptions::empty_for(next.options_shape())
            }
            None => {
                self.editor = EditorState::default();
                None
            }
        };

        tracing::debug!(
            event = "method_changed",
            method = method.as_ref().map(ValidationMethod::as_str).unwrap_or(""),
            kept_bounds = keep_bounds
        );
        self.method = method;
        self.options.clone()
    }

    /// Minimum text keystroke; ignored unless a range-family method is active.
    pub fn set_min_text(&mut self, text: &str) -> Option<ValidationOptions> {
        if self.active_shape() != Some(OptionsShape::Range) {
            return self.options.clone();
        }
        self.editor.min_text = text.to_string();
        self.renormalize_range()
    }

    /// Maximum text keystroke; ignored unless a range-family method is active.
    pub fn set_max_text(&mut self, text: &str) -> Option<ValidationOptions> {
        if self.active_shape() != Some(OptionsShape::Range) {
            return self.options.clone();
        }
        self.editor.max_text = text.to_string();
        self.renormalize_range()
    }

    /// Pattern keystroke; ignored unless `regex` is active.
    pub fn set_pattern_text(&mut self, text: &str) -> Option<ValidationOptions> {
        if self.active_shape() != Some(OptionsShape::Pattern) {
            return self.options.clone();
        }
        self.editor.pattern_text = text.to_string();
        self.options = Some(normalize_pattern_input(text));
        self.options.clone()
    }

    /// List edit; ignored unless `list` is active.
    pub fn set_list_tokens(&mut self, tokens: &[String]) -> Option<ValidationOptions> {
        if self.active_shape() != Some(OptionsShape::List) {
            return self.options.clone();
        }
        let normalized = normalize_list_input(tokens);
        if let ValidationOptions::List(distinct) = &normalized {
            self.editor.list_tokens = distinct.clone();
        }
        self.options = Some(normalized);
        self.options.clone()
    }

    pub fn method_control(&self) -> MethodControl {
        if self.must_hide_method_control() {
            return MethodControl::Hidden;
        }
        let Some(method) = &self.method else {
            return MethodControl::Prompt;
        };

        match method.options_shape() {
            OptionsShape::Pattern => MethodControl::Pattern {
                text: self.editor.pattern_text.clone(),
            },
            OptionsShape::List => MethodControl::List {
                tokens: self.editor.list_tokens.clone(),
            },
            OptionsShape::Range => MethodControl::Range {
                min_text: self.editor.min_text.clone(),
                max_text: self.editor.max_text.clone(),
            },
            OptionsShape::NoOptions => MethodControl::NoOptions,
        }
    }

    /// The rule as it would be stored on the template column.
    pub fn to_validation(&self) -> Option<ColumnValidation> {
        self.method.clone().map(|validate| ColumnValidation {
            validate,
            options: self.options.clone(),
            message: None,
            severity: None,
        })
    }

    fn active_shape(&self) -> Option<OptionsShape> {
        self.method.as_ref().map(ValidationMethod::options_shape)
    }

    fn renormalize_range(&mut self) -> Option<ValidationOptions> {
        self.options = self.method.as_ref().and_then(|method| {
            normalize_range_input(method, &self.editor.min_text, &self.editor.max_text)
        });
        self.options.clone()
    }
}
