use crate::models::DecisionRecord;

/// Append-only log of committed decisions, popped from the tail
#[derive(Debug, Default, Clone)]
pub struct UndoHistory {
    records: Vec<DecisionRecord>,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DecisionRecord) {
        self.records.push(record);
    }

    /// Remove the most recent decision
    pub fn pop(&mut self) -> Option<DecisionRecord> {
        self.records.pop()
    }

    pub fn last(&self) -> Option<&DecisionRecord> {
        self.records.last()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.candidate.id == id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest first
    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }
}
