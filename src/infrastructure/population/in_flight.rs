//! Per-topic population exclusivity

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::domain::topic::TopicId;

/// Process-wide set of topic ids currently undergoing background population
///
/// Membership-test-and-insert happens under one lock acquisition, making it
/// the single in-process mutual-exclusion point: at most one population run
/// per topic id at a time. It does not guarantee exactly-once: a failed run
/// releases membership and a later resolution may retry. Clones share the
/// same underlying set.
#[derive(Debug, Clone, Default)]
pub struct InFlightPopulations {
    active: Arc<Mutex<HashSet<TopicId>>>,
}

impl InFlightPopulations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim a topic for population
    ///
    /// Returns `None` when a run is already active for the id. The returned
    /// guard releases membership on drop, on every exit path including
    /// panics.
    pub fn try_begin(&self, id: TopicId) -> Option<PopulationGuard> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());

        if !active.insert(id.clone()) {
            return None;
        }

        Some(PopulationGuard {
            active: Arc::clone(&self.active),
            id,
        })
    }

    /// Whether a run is active for the id
    pub fn contains(&self, id: &TopicId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    /// Number of active runs
    pub fn len(&self) -> usize {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases an in-flight claim when dropped
#[derive(Debug)]
pub struct PopulationGuard {
    active: Arc<Mutex<HashSet<TopicId>>>,
    id: TopicId,
}

impl Drop for PopulationGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}
