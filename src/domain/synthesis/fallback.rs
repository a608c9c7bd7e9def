//! Deterministic plain-text answer rendering
//!
//! Used when the synthesis collaborator is unavailable: the payload is
//! rendered field by field so the caller still receives a usable answer.

use crate::domain::topic::{PayloadValue, TopicPayload};

const LIST_SECTIONS: &[(&str, &str)] = &[
    ("requirements", "Requirements"),
    ("steps", "Steps"),
    ("deadlines", "Deadlines"),
    ("key_points", "Key points"),
    ("tips", "Tips"),
];

const MAP_SECTIONS: &[(&str, &str)] = &[("fees", "Fees"), ("contact_info", "Contact")];

/// Render a payload as a plain-text answer
pub fn render_fallback(payload: &TopicPayload) -> String {
    let mut parts = vec!["Here's the information you're looking for:".to_string()];

    if let Some(title) = payload.text("title") {
        parts.push(format!("**{}**", title));
    }

    if let Some(summary) = payload.text("summary") {
        parts.push(summary.to_string());
    }

    if let Some(message) = payload.text("message") {
        parts.push(message.to_string());
    }

    for (key, heading) in LIST_SECTIONS {
        if let Some(PayloadValue::List(items)) = payload.get(key) {
            parts.push(format!("{}:", heading));
            for item in items {
                parts.push(format!("- {}", item));
            }
        }
    }

    for (key, heading) in MAP_SECTIONS {
        if let Some(PayloadValue::Map(entries)) = payload.get(key) {
            parts.push(format!("{}:", heading));
            for (name, value) in entries {
                parts.push(format!("- {}: {}", name, value));
            }
        }
    }

    if let Some(url) = payload.text("url").or_else(|| payload.text("website")) {
        parts.push(format!("For more details, visit: {}", url));
    }

    parts.join("\n")
}
