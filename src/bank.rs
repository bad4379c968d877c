//! Question bank and per-level question selection

use crate::game::GameError;
use crate::rng::{RandomAdapter, RandomSource};
use crate::types::{Question, QuestionId, LEVEL_COUNT, MAX_LEVEL};
use rand::seq::IndexedRandom;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Errors raised while filling the bank
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("Question level {0} is outside 0..={max}", max = MAX_LEVEL)]
    InvalidLevel(u8),

    #[error("Question text must not be empty")]
    EmptyText,

    #[error("Question text already in the bank: {0:?}")]
    DuplicateText(String),

    #[error("Question id already in the bank: {0}")]
    DuplicateId(QuestionId),

    #[error("Failed to read question file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse question file: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk shape of a question. The id is optional so hand-written files
/// can leave it out.
#[derive(Debug, Deserialize)]
struct QuestionRecord {
    #[serde(default)]
    id: Option<QuestionId>,
    level: u8,
    text: String,
    answers: [String; 4],
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        let mut question = Question::new(record.level, record.text, record.answers);
        if let Some(id) = record.id {
            question.id = id;
        }
        question
    }
}

/// Immutable catalogue of trivia questions, looked up by level
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of questions
    pub fn from_json_str(json: &str) -> Result<Self, BankError> {
        let records: Vec<QuestionRecord> = serde_json::from_str(json)?;
        let mut bank = Self::new();
        bank.extend(records.into_iter().map(Question::from))?;
        Ok(bank)
    }

    /// Read a JSON array of questions from disk
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BankError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let bank = Self::from_json_str(&json)?;
        tracing::info!("Loaded {} questions from {}", bank.len(), path.display());
        Ok(bank)
    }

    /// Add a question after checking its level and that its text is new
    pub fn add(&mut self, question: Question) -> Result<&Question, BankError> {
        if question.level > MAX_LEVEL {
            return Err(BankError::InvalidLevel(question.level));
        }
        let text = question.text.trim();
        if text.is_empty() {
            return Err(BankError::EmptyText);
        }
        if self.questions.iter().any(|q| q.text.trim() == text) {
            return Err(BankError::DuplicateText(text.to_string()));
        }
        if self.get(&question.id).is_some() {
            return Err(BankError::DuplicateId(question.id));
        }

        self.questions.push(question);
        Ok(&self.questions[self.questions.len() - 1])
    }

    /// Add many questions, stopping at the first invalid one.
    /// Returns how many were added.
    pub fn extend(
        &mut self,
        questions: impl IntoIterator<Item = Question>,
    ) -> Result<usize, BankError> {
        let mut added = 0;
        for question in questions {
            self.add(question)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Number of questions per level
    pub fn count_by_level(&self) -> [usize; LEVEL_COUNT] {
        let mut counts = [0; LEVEL_COUNT];
        for question in &self.questions {
            counts[usize::from(question.level)] += 1;
        }
        counts
    }

    /// Levels with fewer than `minimum` questions
    pub fn thin_levels(&self, minimum: usize) -> Vec<u8> {
        self.count_by_level()
            .iter()
            .enumerate()
            .filter(|(_, count)| **count < minimum)
            .map(|(level, _)| level as u8)
            .collect()
    }

    /// Pick a random question at `level` whose id is not in `excluded`.
    pub fn select_for_level(
        &self,
        level: u8,
        excluded: &HashSet<QuestionId>,
        rng: &mut dyn RandomSource,
    ) -> Result<&Question, GameError> {
        let candidates: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| q.level == level && !excluded.contains(&q.id))
            .collect();

        match candidates.choose(&mut RandomAdapter::new(rng)) {
            Some(question) => Ok(*question),
            None => {
                tracing::error!("Question bank has no unused question for level {}", level);
                Err(GameError::NoQuestionAvailable { level })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rng::{seeded, ScriptedRandom};

    pub(crate) fn make_question(level: u8, n: usize) -> Question {
        Question::new(
            level,
            format!("Level {} question #{}", level, n),
            [
                format!("right {}-{}", level, n),
                format!("wrong A {}-{}", level, n),
                format!("wrong B {}-{}", level, n),
                format!("wrong C {}-{}", level, n),
            ],
        )
    }

    pub(crate) fn make_bank_with_levels(
        per_level: usize,
        levels: impl IntoIterator<Item = u8>,
    ) -> QuestionBank {
        let mut bank = QuestionBank::new();
        for level in levels {
            for n in 0..per_level {
                bank.add(make_question(level, n)).unwrap();
            }
        }
        bank
    }

    pub(crate) fn make_bank(per_level: usize) -> QuestionBank {
        make_bank_with_levels(per_level, 0..=MAX_LEVEL)
    }

    #[test]
    fn test_add_validates_level() {
        let mut bank = QuestionBank::new();
        let result = bank.add(make_question(15, 0));
        assert!(matches!(result, Err(BankError::InvalidLevel(15))));
        assert!(bank.add(make_question(14, 0)).is_ok());
    }

    #[test]
    fn test_add_rejects_empty_text() {
        let mut bank = QuestionBank::new();
        let mut question = make_question(0, 0);
        question.text = "   ".to_string();
        assert!(matches!(bank.add(question), Err(BankError::EmptyText)));
    }

    #[test]
    fn test_add_rejects_duplicate_text() {
        let mut bank = QuestionBank::new();
        bank.add(make_question(3, 0)).unwrap();

        let mut dup = make_question(7, 1);
        dup.text = "Level 3 question #0".to_string();
        assert!(matches!(bank.add(dup), Err(BankError::DuplicateText(_))));
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut bank = QuestionBank::new();
        let first = bank.add(make_question(3, 0)).unwrap().clone();

        let mut dup = make_question(3, 1);
        dup.id = first.id.clone();
        assert!(matches!(bank.add(dup), Err(BankError::DuplicateId(id)) if id == first.id));
    }

    #[test]
    fn test_count_by_level() {
        let bank = make_bank(4);
        assert_eq!(bank.len(), 60);
        assert!(bank.count_by_level().iter().all(|c| *c == 4));
        assert!(bank.thin_levels(4).is_empty());
        assert_eq!(bank.thin_levels(5).len(), 15);
    }

    #[test]
    fn test_select_for_level_matches_level() {
        let bank = make_bank(4);
        let mut rng = seeded(42);
        for level in 0..=MAX_LEVEL {
            let q = bank.select_for_level(level, &HashSet::new(), &mut rng).unwrap();
            assert_eq!(q.level, level);
        }
    }

    #[test]
    fn test_select_for_level_skips_excluded() {
        let bank = make_bank(2);
        let first = bank
            .select_for_level(5, &HashSet::new(), &mut ScriptedRandom::constant(0))
            .unwrap()
            .clone();

        let excluded: HashSet<QuestionId> = [first.id.clone()].into_iter().collect();
        for seed in 0..20 {
            let q = bank.select_for_level(5, &excluded, &mut seeded(seed)).unwrap();
            assert_ne!(q.id, first.id);
        }
    }

    #[test]
    fn test_select_for_level_exhausted() {
        let bank = make_bank(1);
        let only = bank
            .select_for_level(0, &HashSet::new(), &mut seeded(1))
            .unwrap()
            .clone();
        let excluded: HashSet<QuestionId> = [only.id].into_iter().collect();

        let result = bank.select_for_level(0, &excluded, &mut seeded(1));
        assert_eq!(result.unwrap_err(), GameError::NoQuestionAvailable { level: 0 });
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"[
            {"level": 0, "text": "2 + 2?", "answers": ["4", "3", "5", "22"]},
            {"id": "q-fixed", "level": 1, "text": "Sky colour?", "answers": ["Blue", "Red", "Green", "Black"]}
        ]"#;

        let bank = QuestionBank::from_json_str(json).unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.get("q-fixed").unwrap().correct_answer(), "Blue");
    }

    #[test]
    fn test_from_json_str_rejects_bad_level() {
        let json = r#"[{"level": 20, "text": "?", "answers": ["a", "b", "c", "d"]}]"#;
        assert!(matches!(
            QuestionBank::from_json_str(json),
            Err(BankError::InvalidLevel(20))
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        let json = r#"[{"level": 14, "text": "Final?", "answers": ["yes", "no", "maybe", "never"]}]"#;
        tokio::fs::write(&path, json).await.unwrap();

        let bank = QuestionBank::load(&path).await.unwrap();
        assert_eq!(bank.count_by_level()[14], 1);

        let missing = QuestionBank::load(dir.path().join("nope.json")).await;
        assert!(matches!(missing, Err(BankError::Io(_))));
    }
}
