//! Contract between a rendered rule editor and the [`RuleEngine`].
//!
//! Renderers feed user actions in as [`EditorInput`]s and read back an
//! [`EditorView`]. Every value handed to the [`RuleCommitter`] has already
//! been normalized by the engine.

use serde::Serialize;

use tableflow_core::{ValidationMethod, ValidationOptions};

use crate::engine::{MethodControl, RuleEngine};
use crate::options::{DataTypeOption, MethodOption};

/// Caller-owned store receiving normalized editor values.
pub trait RuleCommitter {
    fn commit_data_type(&mut self, data_type: Option<&str>);
    fn commit_method(&mut self, method: Option<&ValidationMethod>);
    fn commit_options(&mut self, options: Option<&ValidationOptions>);
}

/// A user action in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorInput {
    DataTypeSelected(String),
    MethodSelected(Option<ValidationMethod>),
    MinTyped(String),
    MaxTyped(String),
    PatternTyped(String),
    ListEdited(Vec<String>),
}

/// Everything a renderer needs to draw the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorView {
    pub data_types: Vec<DataTypeOption>,
    pub data_type: Option<String>,
    pub methods: Vec<MethodOption>,
    pub method: Option<ValidationMethod>,
    pub show_method_selector: bool,
    pub control: MethodControl,
}

/// Routes editor input through the engine and commits the results.
#[derive(Debug)]
pub struct RuleEditorSurface<C> {
    engine: RuleEngine,
    committer: C,
}

impl<C: RuleCommitter> RuleEditorSurface<C> {
    pub fn new(engine: RuleEngine, committer: C) -> Self {
        Self { engine, committer }
    }

    pub fn handle(&mut self, input: EditorInput) {
        match input {
            EditorInput::DataTypeSelected(data_type) => {
                self.engine.on_data_type_changed(&data_type);
                self.committer.commit_data_type(self.engine.data_type());
                self.committer.commit_method(None);
                self.committer.commit_options(None);
            }
            EditorInput::MethodSelected(method) => {
                let options = self.engine.on_method_changed(method);
                self.committer.commit_method(self.engine.method());
                self.committer.commit_options(options.as_ref());
            }
            EditorInput::MinTyped(text) => {
                let options = self.engine.set_min_text(&text);
                self.committer.commit_options(options.as_ref());
            }
            EditorInput::MaxTyped(text) => {
                let options = self.engine.set_max_text(&text);
                self.committer.commit_options(options.as_ref());
            }
            EditorInput::PatternTyped(text) => {
                let options = self.engine.set_pattern_text(&text);
                self.committer.commit_options(options.as_ref());
            }
            EditorInput::ListEdited(tokens) => {
                let options = self.engine.set_list_tokens(&tokens);
                self.committer.commit_options(options.as_ref());
            }
        }
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            data_types: self.engine.data_type_options(),
            data_type: self.engine.data_type().map(str::to_string),
            methods: self.engine.method_options(),
            method: self.engine.method().cloned(),
            show_method_selector: !self.engine.must_hide_method_control(),
            control: self.engine.method_control(),
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut RuleEngine {
        &mut self.engine
    }

    pub fn committer(&self) -> &C {
        &self.committer
    }
}

/// In-memory committer holding the latest committed values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDraft {
    pub data_type: Option<String>,
    pub method: Option<ValidationMethod>,
    pub options: Option<ValidationOptions>,
    /// Number of option commits received.
    pub option_commits: usize,
}

impl RuleCommitter for RuleDraft {
    fn commit_data_type(&mut self, data_type: Option<&str>) {
        self.data_type = data_type.map(str::to_string);
    }

    fn commit_method(&mut self, method: Option<&ValidationMethod>) {
        self.method = method.cloned();
    }

    fn commit_options(&mut self, options: Option<&ValidationOptions>) {
        self.options = options.cloned();
        self.option_commits += 1;
    }
}
