//! Page settings, loaded from RON.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{Error, Result};

/// Names and texts the binding engine uses. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Attributes whose name starts with this prefix are bindings.
    pub attribute_prefix: String,
    /// Kind keyword for submit-style bindings.
    pub submit_kind: String,
    /// Kind keyword for stray (page-level fallback) bindings.
    pub stray_kind: String,
    /// Element attribute naming a submit binding's action expression.
    pub action_attribute: String,
    /// Class added to the element whose submit action is executing.
    pub executing_class: String,
    /// Tags that never count as stray click targets.
    pub stray_exempt_tags: Vec<String>,
    /// SCRIPT `type` whose text is evaluated by [`crate::Page::run_inline_scripts`].
    pub script_type: String,
    /// Result text when no evaluator is attached.
    pub unavailable_message: String,
    /// Prefix for the text of a failed evaluation.
    pub error_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            attribute_prefix: "data-rax".to_string(),
            submit_kind: "submit".to_string(),
            stray_kind: "stray".to_string(),
            action_attribute: "action".to_string(),
            executing_class: "rax-executing".to_string(),
            stray_exempt_tags: ["BUTTON", "INPUT", "SELECT", "TEXTAREA"]
                .into_iter()
                .map(String::from)
                .collect(),
            script_type: "application/x-scheme".to_string(),
            unavailable_message: "Scheme bridge not available.".to_string(),
            error_prefix: "Error: ".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Settings(e.to_string()))
    }

    /// Read and parse a RON settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text).map_err(|e| match e {
            Error::Settings(msg) => Error::Settings(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Whether `name` is a binding attribute.
    pub fn is_binding_attribute(&self, name: &str) -> bool {
        name.starts_with(&self.attribute_prefix)
    }

    /// Whether a click on an element with `tag` is never stray.
    pub fn is_stray_exempt(&self, tag: &str) -> bool {
        self.stray_exempt_tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
    }
}
