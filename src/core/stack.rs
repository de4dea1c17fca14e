use crate::core::error::DeckError;
use crate::models::Candidate;
use std::collections::{HashSet, VecDeque};

/// Ordered sequence of undecided candidates
///
/// The head is the visible, interactive card. Insertion order is
/// presentation order and is never re-sorted. No two cards share an id.
#[derive(Debug, Default, Clone)]
pub struct CardStack {
    cards: VecDeque<Candidate>,
    ids: HashSet<String>,
}

impl CardStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stack wholesale
    ///
    /// Rejects a sequence with repeated ids and leaves the current
    /// contents untouched in that case.
    pub fn load(&mut self, candidates: Vec<Candidate>) -> Result<(), DeckError> {
        let mut ids = HashSet::with_capacity(candidates.len());
        for candidate in &candidates {
            if !ids.insert(candidate.id.clone()) {
                return Err(DeckError::InvariantViolation(format!(
                    "load received duplicate candidate id {}",
                    candidate.id
                )));
            }
        }

        self.cards = candidates.into();
        self.ids = ids;
        Ok(())
    }

    #[inline]
    pub fn peek_head(&self) -> Option<&Candidate> {
        self.cards.front()
    }

    pub fn pop_head(&mut self) -> Result<Candidate, DeckError> {
        let candidate = self.cards.pop_front().ok_or(DeckError::EmptyStack)?;
        self.ids.remove(&candidate.id);
        Ok(candidate)
    }

    /// Put a candidate back on top; only undo does this
    pub fn push_front(&mut self, candidate: Candidate) -> Result<(), DeckError> {
        if self.ids.contains(&candidate.id) {
            return Err(DeckError::DuplicateId(candidate.id));
        }
        self.ids.insert(candidate.id.clone());
        self.cards.push_front(candidate);
        Ok(())
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.cards.iter()
    }
}
