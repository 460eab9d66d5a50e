//! Canonical JSON payloads for interactions and form field sets.
//!
//! Both entry points are total: every input serializes, and the same input
//! always produces the same text. Key order is allow-list order for
//! interactions and first-appearance order for field sets.

use serde_json::{Map, Value};

use crate::{
    allow_list::{Field, fields_for},
    dom::FieldSet,
    interaction::{EventData, Interaction},
};

/// Serialize the allow-listed fields of `interaction`.
pub fn from_interaction(interaction: &Interaction) -> String {
    from_fields(fields_for(interaction.kind()), interaction.data())
}

/// Serialize `fields` read off `data`, skipping fields the data does not carry.
pub fn from_fields(fields: &[Field], data: &EventData) -> String {
    let mut object = Map::new();
    for field in fields {
        if let Some(value) = field.read(data) {
            object.insert(field.name().to_string(), value);
        }
    }
    Value::Object(object).to_string()
}

/// Serialize a field set, gathering every value of a repeated name into one array.
pub fn from_field_set(fields: &FieldSet) -> String {
    let mut object = Map::new();
    for (name, value) in fields.entries() {
        let slot = object
            .entry(name.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(values) = slot {
            values.push(Value::String(value.clone()));
        }
    }
    Value::Object(object).to_string()
}
