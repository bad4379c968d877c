//! Question bank management

use super::{AppState, StateError};
use crate::bank::QuestionBank;
use crate::types::{Question, LEVEL_COUNT};
use std::path::Path;

impl AppState {
    /// Add a single question to the bank
    pub async fn add_question(&self, question: Question) -> Result<Question, StateError> {
        let mut bank = self.bank.write().await;
        let added = bank.add(question)?.clone();
        tracing::info!("Added question {} at level {}", added.id, added.level);
        Ok(added)
    }

    /// Load a JSON question file and merge it into the bank.
    /// Returns how many questions were added.
    pub async fn load_questions(&self, path: impl AsRef<Path>) -> Result<usize, StateError> {
        let loaded = QuestionBank::load(path).await?;

        // Validate the merge on a copy so a bad file leaves the bank untouched
        let mut bank = self.bank.write().await;
        let mut merged = bank.clone();
        let added = merged.extend(loaded.questions().iter().cloned())?;
        *bank = merged;

        Ok(added)
    }

    /// Number of questions per level
    pub async fn question_counts(&self) -> [usize; LEVEL_COUNT] {
        self.bank.read().await.count_by_level()
    }
}
