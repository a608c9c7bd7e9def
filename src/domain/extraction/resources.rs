//! Resource hint catalog
//!
//! A small JSON file maps topic keys to helper URLs that are passed to the
//! extractor as context. Lookup is by exact topic key first, then by keyword
//! match against the query.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

/// Catalog of topic key -> helper URL mappings
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    resources: BTreeMap<String, String>,
}

const KEYWORD_FALLBACKS: &[(&str, &[&str])] = &[
    ("course_registration", &["register", "registration", "enroll", "تسجيل"]),
    ("tuition_fees", &["fee", "fees", "payment", "cost", "tuition", "رسوم", "مصاريف"]),
    ("admissions", &["admission", "admissions", "apply", "قبول"]),
    ("academic_calendar", &["calendar", "semester", "تقويم"]),
    ("student_services", &["student service", "services", "خدمات"]),
    ("course_schedule", &["schedule", "timetable", "جدول"]),
];

impl ResourceCatalog {
    /// Build a catalog from explicit mappings
    pub fn new(resources: BTreeMap<String, String>) -> Self {
        Self { resources }
    }

    /// Load a catalog from a JSON file of `{"topic_key": "url", ...}`
    ///
    /// A missing or malformed file yields an empty catalog; hints are an
    /// optimization and their absence only means the extractor works without
    /// context URLs.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no resource catalog loaded");
                return Self::default();
            }
        };

        match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
            Ok(resources) => {
                debug!(path = %path.display(), count = resources.len(), "resource catalog loaded");
                Self { resources }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed resource catalog ignored");
                Self::default()
            }
        }
    }

    /// Select the most relevant helper URL for a topic key and query
    pub fn select(&self, topic_key: &str, query: &str) -> Option<&str> {
        if let Some(url) = self.resources.get(topic_key) {
            return Some(url);
        }

        let query_lower = query.to_lowercase();

        for (resource_key, keywords) in KEYWORD_FALLBACKS {
            if keywords.iter().any(|k| query_lower.contains(k)) {
                if let Some(url) = self.resources.get(*resource_key) {
                    return Some(url);
                }
            }
        }

        None
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
