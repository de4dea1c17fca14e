use crate::models::Candidate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Saved-list hooks invoked by the engine on right-commits and their undo
///
/// Calls are fire-and-forget: implementations must not block the caller
/// and report their own failures.
pub trait SavedListProjection: Send + Sync {
    fn add(&self, candidate: &Candidate);

    fn remove(&self, candidate_id: &str);
}

/// In-process saved list keyed by candidate id
#[derive(Debug, Default)]
pub struct InMemorySavedList {
    entries: Mutex<HashMap<String, Candidate>>,
}

impl InMemorySavedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, candidate_id: &str) -> bool {
        self.lock().contains_key(candidate_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Candidate>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SavedListProjection for InMemorySavedList {
    fn add(&self, candidate: &Candidate) {
        self.lock().insert(candidate.id.clone(), candidate.clone());
    }

    fn remove(&self, candidate_id: &str) {
        self.lock().remove(candidate_id);
    }
}

/// Projection that drops every call, for decks without a saved list
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProjection;

impl SavedListProjection for NoopProjection {
    fn add(&self, _candidate: &Candidate) {}

    fn remove(&self, _candidate_id: &str) {}
}
