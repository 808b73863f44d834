//! Metadata payload sent to the encoder.

use serde_json::Value;

/// `{"Metadata": {...}}` document with fields in line order.
///
/// Values are JSON string contents that were escaped when their
/// wildcards were resolved; they are written between quotes unchanged.
/// Keys are escaped here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataPayload {
    entries: Vec<(String, String)>,
}

impl MetadataPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. `escaped_value` must already be JSON-escaped.
    pub fn push(&mut self, key: impl Into<String>, escaped_value: impl Into<String>) {
        self.entries.push((key.into(), escaped_value.into()));
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the request body.
    pub fn to_json(&self) -> String {
        let mut json = String::from("{\r\n    \"Metadata\": {");
        if self.entries.is_empty() {
            json.push_str("}\r\n}\r\n");
            return json;
        }

        let fields: Vec<String> = self
            .entries
            .iter()
            .map(|(key, value)| format!("        {}: \"{}\"", Value::String(key.clone()), value))
            .collect();

        json.push_str("\r\n");
        json.push_str(&fields.join(",\r\n"));
        json.push_str("\r\n    }\r\n}\r\n");
        json
    }
}
