//! Structured topic payload types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single payload field value
///
/// The payload shape is open and domain-evolving, so values are limited to a
/// small closed set of variants instead of a fixed schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    /// Free text (title, summary, message, ...)
    Text(String),
    /// Ordered list of text items (requirements, steps, deadlines, ...)
    List(Vec<String>),
    /// Key-value pairs (fees, contact info, ...)
    Map(BTreeMap<String, String>),
}

impl PayloadValue {
    /// Coerce an arbitrary JSON value into a payload value
    ///
    /// Scalars become text, arrays become lists of text, objects become
    /// string maps. Nested structures are flattened to their text form;
    /// null and empty values yield `None`.
    pub fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(Self::Text(s.to_string()))
                }
            }
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            Value::Number(n) => Some(Self::Text(n.to_string())),
            Value::Array(items) => {
                let list: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
                if list.is_empty() {
                    None
                } else {
                    Some(Self::List(list))
                }
            }
            Value::Object(map) => {
                let entries: BTreeMap<String, String> = map
                    .iter()
                    .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.clone(), s)))
                    .collect();
                if entries.is_empty() {
                    None
                } else {
                    Some(Self::Map(entries))
                }
            }
        }
    }

    /// The text form, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The list form, if this is a list value
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The map form, if this is a map value
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Open mapping of structured facts about a topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicPayload {
    fields: BTreeMap<String, PayloadValue>,
}

impl TopicPayload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload from arbitrary collaborator JSON
    ///
    /// Non-object input yields an empty payload. Fields that coerce to
    /// nothing (null, empty strings, empty collections) are dropped.
    pub fn from_json(value: &Value) -> Self {
        let mut payload = Self::new();

        if let Value::Object(map) = value {
            for (key, raw) in map {
                if let Some(coerced) = PayloadValue::coerce(raw) {
                    payload.fields.insert(key.clone(), coerced);
                }
            }
        }

        payload
    }

    /// Insert a text field
    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.into(), PayloadValue::Text(value.into()));
        self
    }

    /// Insert a list field
    pub fn with_list(mut self, key: impl Into<String>, items: Vec<String>) -> Self {
        self.fields.insert(key.into(), PayloadValue::List(items));
        self
    }

    /// Insert a map field
    pub fn with_map(mut self, key: impl Into<String>, entries: BTreeMap<String, String>) -> Self {
        self.fields.insert(key.into(), PayloadValue::Map(entries));
        self
    }

    /// Get a field by key
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.fields.get(key)
    }

    /// Get a text field by key
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(PayloadValue::as_text)
    }

    /// Iterate over all fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PayloadValue)> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the payload has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A short human-readable digest used when handing candidates to the
    /// arbiter: title and summary when present, otherwise the field keys.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if let Some(title) = self.text("title") {
            parts.push(title.to_string());
        }

        if let Some(summary) = self.text("summary") {
            let truncated: String = summary.chars().take(280).collect();
            parts.push(truncated);
        }

        if parts.is_empty() {
            parts.push(self.fields.keys().cloned().collect::<Vec<_>>().join(", "));
        }

        parts.join(" - ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_coercion() {
        let payload = TopicPayload::from_json(&json!({
            "title": "Course Registration",
            "summary": "How to register for courses",
            "steps": ["Log in", "Pick courses", "Confirm"],
            "fees": {"credit_hour": "65 JOD"},
            "credit_hours": 132,
            "empty": "",
            "nothing": null,
        }));

        assert_eq!(payload.text("title"), Some("Course Registration"));
        assert_eq!(
            payload.get("steps").unwrap().as_list().unwrap(),
            &["Log in", "Pick courses", "Confirm"]
        );
        assert_eq!(
            payload.get("fees").unwrap().as_map().unwrap()["credit_hour"],
            "65 JOD"
        );
        // numbers coerce to text
        assert_eq!(payload.text("credit_hours"), Some("132"));
        // empty and null fields are dropped
        assert!(payload.get("empty").is_none());
        assert!(payload.get("nothing").is_none());
    }

    #[test]
    fn test_from_json_non_object() {
        let payload = TopicPayload::from_json(&json!("just a string"));
        assert!(payload.is_empty());
    }

    #[test]
    fn test_summary_prefers_title_and_summary() {
        let payload = TopicPayload::new()
            .with_text("title", "Tuition Fees")
            .with_text("summary", "Fees per credit hour by faculty")
            .with_list("deadlines", vec!["Sep 1".into()]);

        let summary = payload.summary();
        assert!(summary.contains("Tuition Fees"));
        assert!(summary.contains("Fees per credit hour"));
    }

    #[test]
    fn test_summary_falls_back_to_keys() {
        let payload = TopicPayload::new().with_list("steps", vec!["a".into()]);
        assert_eq!(payload.summary(), "steps");
    }

    #[test]
    fn test_serde_round_trip() {
        let payload = TopicPayload::new()
            .with_text("title", "Scholarships")
            .with_list("requirements", vec!["GPA above 3.0".into()]);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["title"], "Scholarships");

        let back: TopicPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }
}
