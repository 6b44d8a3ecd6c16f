//! Per-session answer storage.
//!
//! [`AnswerStore`] keeps the typed answer of every question keyed by question id, in the order
//! the answers arrived. [`SessionRecord`] keeps what was actually said: the prompt text and the
//! answer, in asking order. Both are append-only.

use crate::{IntakeError, IntakeResult};
use intake_types::{AnswerValue, CatalogId};
use std::collections::HashMap;

/// Ordered, append-only mapping from question id to answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerStore {
    entries: Vec<(CatalogId, AnswerValue)>,
    index: HashMap<CatalogId, usize>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the answer for `id`.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::DuplicateAnswer` if `id` already has an answer; stored answers are
    /// never overwritten.
    pub fn insert(&mut self, id: CatalogId, value: AnswerValue) -> IntakeResult<()> {
        if self.index.contains_key(&id) {
            return Err(IntakeError::DuplicateAnswer(id.to_string()));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, value));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&AnswerValue> {
        self.index.get(id).map(|pos| &self.entries[*pos].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Answers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&CatalogId, &AnswerValue)> {
        self.entries.iter().map(|(id, value)| (id, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One asked question and the answer given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub question_id: CatalogId,
    pub prompt: String,
    pub answer: AnswerValue,
}

/// Question/answer pairs in the exact order asked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    exchanges: Vec<Exchange>,
}

impl SessionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Question ids in asking order.
    pub fn question_ids(&self) -> impl Iterator<Item = &str> {
        self.exchanges.iter().map(|e| e.question_id.as_str())
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.question_ids().position(|q| q == id)
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CatalogId {
        CatalogId::new(s).unwrap()
    }

    #[test]
    fn test_answer_store_preserves_insertion_order() {
        let mut store = AnswerStore::new();
        store.insert(id("cough"), AnswerValue::Boolean(true)).unwrap();
        store.insert(id("age"), AnswerValue::Number(40)).unwrap();
        store.insert(id("fever"), AnswerValue::Boolean(false)).unwrap();

        let keys: Vec<&str> = store.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["cough", "age", "fever"]);
        assert_eq!(store.get("age"), Some(&AnswerValue::Number(40)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_answer_store_rejects_overwrite() {
        let mut store = AnswerStore::new();
        store.insert(id("fever"), AnswerValue::Boolean(false)).unwrap();

        let err = store
            .insert(id("fever"), AnswerValue::Boolean(true))
            .expect_err("should reject overwrite");
        assert!(matches!(err, IntakeError::DuplicateAnswer(ref k) if k == "fever"));
        assert_eq!(store.get("fever"), Some(&AnswerValue::Boolean(false)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_session_record_positions() {
        let mut record = SessionRecord::new();
        assert!(record.is_empty());
        for q in ["age", "fever", "chills"] {
            record.push(Exchange {
                question_id: id(q),
                prompt: format!("{}?", q),
                answer: AnswerValue::Boolean(true),
            });
        }
        assert_eq!(record.position_of("fever"), Some(1));
        assert_eq!(record.position_of("nausea"), None);
        assert_eq!(record.exchanges()[2].prompt, "chills?");
    }
}
