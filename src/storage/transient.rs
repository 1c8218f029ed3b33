//! In-memory pattern store for isolated runs and tests

use super::types::PatternRecord;

#[derive(Debug, Default)]
pub struct TransientStore {
    records: Vec<PatternRecord>,
}

impl TransientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: PatternRecord) {
        self.records.push(record);
    }

    pub fn load_all(&self) -> Vec<PatternRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
