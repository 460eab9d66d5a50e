//! Interaction occurrences delivered by the host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dom::NodeId;

/// Kind-specific data an interaction may carry. Absent slots are omitted from payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
#[allow(missing_docs)]
pub struct EventData {
    pub alt_key: Option<bool>,
    pub animation_name: Option<String>,
    pub button: Option<i32>,
    pub changed_touches: Option<Value>,
    pub client_x: Option<f64>,
    pub client_y: Option<f64>,
    pub clipboard_data: Option<Value>,
    pub code: Option<String>,
    pub ctrl_key: Option<bool>,
    pub current_time: Option<f64>,
    pub data: Option<String>,
    pub data_transfer: Option<Value>,
    pub delta_mode: Option<u32>,
    pub delta_x: Option<f64>,
    pub delta_y: Option<f64>,
    pub delta_z: Option<f64>,
    pub elapsed_time: Option<f64>,
    pub inner_height: Option<f64>,
    pub inner_width: Option<f64>,
    pub input_type: Option<String>,
    pub key: Option<String>,
    pub key_code: Option<u32>,
    pub meta_key: Option<bool>,
    pub movement_x: Option<f64>,
    pub movement_y: Option<f64>,
    pub muted: Option<bool>,
    pub property_name: Option<String>,
    pub related_target: Option<Value>,
    pub repeat: Option<bool>,
    pub scroll_x: Option<f64>,
    pub scroll_y: Option<f64>,
    pub shift_key: Option<bool>,
    pub target_touches: Option<Value>,
    pub touches: Option<Value>,
    pub value: Option<String>,
    pub volume: Option<f64>,
}

impl EventData {
    /// Primary-button press at client coordinates with no modifiers held.
    pub fn pointer(x: f64, y: f64) -> Self {
        Self {
            alt_key: Some(false),
            button: Some(0),
            client_x: Some(x),
            client_y: Some(y),
            ctrl_key: Some(false),
            meta_key: Some(false),
            shift_key: Some(false),
            ..Self::default()
        }
    }

    /// Key identity with no modifiers held.
    pub fn keyboard(key: &str, code: &str, key_code: u32) -> Self {
        Self {
            alt_key: Some(false),
            code: Some(code.to_string()),
            ctrl_key: Some(false),
            key: Some(key.to_string()),
            key_code: Some(key_code),
            meta_key: Some(false),
            repeat: Some(false),
            shift_key: Some(false),
            ..Self::default()
        }
    }
}

/// One firing of an interaction, as seen while it propagates.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// Interaction kind, e.g. `click` or `keydown`.
    kind: String,
    /// Element the interaction was dispatched at; set by the page on dispatch.
    target: Option<NodeId>,
    /// Kind-specific data.
    data: EventData,
    /// Set when a handler suppressed the host's default behaviour.
    default_prevented: bool,
    /// Set when a handler stopped bubbling.
    propagation_stopped: bool,
}

impl Interaction {
    /// Create an occurrence of `kind` carrying `data`.
    pub fn new(kind: impl Into<String>, data: EventData) -> Self {
        Self {
            kind: kind.into(),
            target: None,
            data,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// A primary-button click at `(x, y)` with no modifiers.
    pub fn click(x: f64, y: f64) -> Self {
        Self::new("click", EventData::pointer(x, y))
    }

    /// A keyboard occurrence (`keydown`, `keyup` or `keypress`).
    pub fn key(kind: &str, key: &str, code: &str, key_code: u32) -> Self {
        Self::new(kind, EventData::keyboard(key, code, key_code))
    }

    /// A form submission.
    pub fn submit() -> Self {
        Self::new("submit", EventData::default())
    }

    /// A form reset.
    pub fn reset() -> Self {
        Self::new("reset", EventData::default())
    }

    /// Interaction kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Element the interaction was dispatched at.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Record the dispatch target.
    pub(crate) fn set_target(&mut self, target: NodeId) {
        self.target = Some(target);
    }

    /// Kind-specific data.
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Suppress the host's default behaviour for this occurrence.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop the occurrence from bubbling further.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether default behaviour was suppressed.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Whether bubbling was stopped.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
