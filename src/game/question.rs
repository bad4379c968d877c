//! A question as it appears inside one game: shuffled letters plus hint state.

use super::help::{self, AudienceVotes, HelpHash, Hint, HintKind};
use super::GameError;
use crate::rng::{RandomAdapter, RandomSource};
use crate::types::{Letter, Question};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Answer slot holding the correct option (`Question::answers[0]`)
pub const CORRECT_SLOT: u8 = 1;

/// Bijection from display letters to answer slots 1..=4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LetterMapRepr", into = "LetterMapRepr")]
pub struct LetterMap {
    /// slots[letter.index()] is the slot shown under that letter
    slots: [u8; 4],
}

impl LetterMap {
    /// Build a map from the slots shown under a, b, c and d.
    pub fn new(slots: [u8; 4]) -> Result<Self, GameError> {
        let mut sorted = slots;
        sorted.sort_unstable();
        if sorted != [1, 2, 3, 4] {
            return Err(GameError::InvalidLetterMap(slots));
        }
        Ok(Self { slots })
    }

    /// A uniformly random permutation
    pub fn shuffled(rng: &mut dyn RandomSource) -> Self {
        let mut slots = [1, 2, 3, 4];
        slots.shuffle(&mut RandomAdapter::new(rng));
        Self { slots }
    }

    pub fn slot(&self, letter: Letter) -> u8 {
        self.slots[letter.index()]
    }

    pub fn letter_for_slot(&self, slot: u8) -> Option<Letter> {
        self.slots
            .iter()
            .position(|s| *s == slot)
            .map(|i| Letter::ALL[i])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LetterMapRepr {
    a: u8,
    b: u8,
    c: u8,
    d: u8,
}

impl TryFrom<LetterMapRepr> for LetterMap {
    type Error = GameError;

    fn try_from(repr: LetterMapRepr) -> Result<Self, Self::Error> {
        LetterMap::new([repr.a, repr.b, repr.c, repr.d])
    }
}

impl From<LetterMap> for LetterMapRepr {
    fn from(map: LetterMap) -> Self {
        let [a, b, c, d] = map.slots;
        Self { a, b, c, d }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameQuestion {
    question: Question,
    letter_map: LetterMap,
    #[serde(default)]
    help_hash: HelpHash,
}

impl GameQuestion {
    /// Bind a question to a freshly shuffled letter map
    pub fn new(question: Question, rng: &mut dyn RandomSource) -> Self {
        Self::with_letter_map(question, LetterMap::shuffled(rng))
    }

    pub fn with_letter_map(question: Question, letter_map: LetterMap) -> Self {
        Self {
            question,
            letter_map,
            help_hash: HelpHash::default(),
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn level(&self) -> u8 {
        self.question.level
    }

    pub fn text(&self) -> &str {
        &self.question.text
    }

    pub fn letter_map(&self) -> &LetterMap {
        &self.letter_map
    }

    pub fn help_hash(&self) -> &HelpHash {
        &self.help_hash
    }

    /// Answer texts in display order
    pub fn variants(&self) -> [(Letter, &str); 4] {
        Letter::ALL.map(|letter| {
            let slot = usize::from(self.letter_map.slot(letter));
            (letter, self.question.answers[slot - 1].as_str())
        })
    }

    pub fn correct_answer_key(&self) -> Letter {
        // the map is a permutation, so slot 1 is always present
        self.letter_map
            .letter_for_slot(CORRECT_SLOT)
            .unwrap_or(Letter::A)
    }

    pub fn answer_correct(&self, letter: Letter) -> bool {
        letter == self.correct_answer_key()
    }

    /// Letters a hint may still talk about: the fifty-fifty survivors if that
    /// hint was used, otherwise all four
    pub fn keys_for_help(&self) -> Vec<Letter> {
        match self.help_hash.fifty_fifty() {
            Some(pair) => pair.to_vec(),
            None => Letter::ALL.to_vec(),
        }
    }

    fn ensure_unused(&self, kind: HintKind) -> Result<(), GameError> {
        if self.help_hash.contains(kind) {
            Err(GameError::HintAlreadyUsed(kind))
        } else {
            Ok(())
        }
    }

    pub fn add_audience_help(
        &mut self,
        accuracy: f64,
        rng: &mut dyn RandomSource,
    ) -> Result<&Hint, GameError> {
        self.ensure_unused(HintKind::AudienceHelp)?;
        let votes: AudienceVotes = help::audience_distribution(
            &self.keys_for_help(),
            self.correct_answer_key(),
            accuracy,
            rng,
        );
        self.help_hash.insert(Hint::AudienceHelp(votes))
    }

    pub fn add_fifty_fifty(&mut self, rng: &mut dyn RandomSource) -> Result<&Hint, GameError> {
        self.ensure_unused(HintKind::FiftyFifty)?;
        let pair = help::fifty_fifty(self.correct_answer_key(), rng);
        self.help_hash.insert(Hint::FiftyFifty(pair))
    }

    pub fn add_friend_call(
        &mut self,
        accuracy: f64,
        rng: &mut dyn RandomSource,
    ) -> Result<&Hint, GameError> {
        self.ensure_unused(HintKind::FriendCall)?;
        let text = help::friend_call(
            &self.keys_for_help(),
            self.correct_answer_key(),
            accuracy,
            rng,
        );
        self.help_hash.insert(Hint::FriendCall(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{seeded, ScriptedRandom};

    fn make_question() -> Question {
        Question::new(
            6,
            "Which planet is known as the red planet?",
            [
                "Mars".to_string(),
                "Venus".to_string(),
                "Jupiter".to_string(),
                "Saturn".to_string(),
            ],
        )
    }

    /// b holds the correct answer
    fn make_game_question() -> GameQuestion {
        GameQuestion::with_letter_map(make_question(), LetterMap::new([2, 1, 4, 3]).unwrap())
    }

    #[test]
    fn test_variants_follow_letter_map() {
        let gq = make_game_question();
        assert_eq!(
            gq.variants(),
            [
                (Letter::A, "Venus"),
                (Letter::B, "Mars"),
                (Letter::C, "Saturn"),
                (Letter::D, "Jupiter"),
            ]
        );
    }

    #[test]
    fn test_correct_answer_key() {
        let gq = make_game_question();
        assert_eq!(gq.correct_answer_key(), Letter::B);
        assert!(gq.answer_correct(Letter::B));
        assert!(!gq.answer_correct(Letter::A));
    }

    #[test]
    fn test_level_and_text_delegate() {
        let gq = make_game_question();
        assert_eq!(gq.level(), gq.question().level);
        assert_eq!(gq.text(), gq.question().text);
    }

    #[test]
    fn test_letter_map_rejects_non_permutation() {
        assert!(matches!(
            LetterMap::new([1, 1, 2, 3]),
            Err(GameError::InvalidLetterMap(_))
        ));
        assert!(LetterMap::new([0, 1, 2, 3]).is_err());
    }

    #[test]
    fn test_shuffled_letter_map_is_permutation() {
        let mut rng = seeded(99);
        for _ in 0..50 {
            let map = LetterMap::shuffled(&mut rng);
            let mut slots: Vec<u8> = Letter::ALL.iter().map(|l| map.slot(*l)).collect();
            slots.sort();
            assert_eq!(slots, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_letter_map_json_shape() {
        let map = LetterMap::new([2, 1, 4, 3]).unwrap();
        let json = serde_json::to_value(map).unwrap();
        assert_eq!(json, serde_json::json!({"a": 2, "b": 1, "c": 4, "d": 3}));

        let bad = serde_json::json!({"a": 1, "b": 1, "c": 4, "d": 3});
        assert!(serde_json::from_value::<LetterMap>(bad).is_err());
    }

    #[test]
    fn test_help_hash_starts_empty() {
        let gq = GameQuestion::new(make_question(), &mut seeded(1));
        assert!(gq.help_hash().is_empty());
    }

    #[test]
    fn test_add_audience_help() {
        let mut gq = make_game_question();
        assert!(!gq.help_hash().contains(HintKind::AudienceHelp));

        gq.add_audience_help(0.8, &mut seeded(1)).unwrap();

        let votes = gq.help_hash().audience_help().unwrap();
        assert_eq!(votes.keys().copied().collect::<Vec<_>>(), Letter::ALL.to_vec());
    }

    #[test]
    fn test_add_fifty_fifty() {
        let mut gq = make_game_question();
        gq.add_fifty_fifty(&mut seeded(1)).unwrap();

        let pair = gq.help_hash().fifty_fifty().unwrap();
        assert!(pair.contains(&Letter::B));
        assert_eq!(pair.len(), 2);
        assert_eq!(gq.keys_for_help(), pair.to_vec());
    }

    #[test]
    fn test_add_friend_call() {
        let mut gq = make_game_question();
        gq.add_friend_call(0.8, &mut seeded(1)).unwrap();

        let text = gq.help_hash().friend_call().unwrap();
        assert!(text.contains(" thinks it's answer "));
        let last = text.chars().last().unwrap().to_ascii_lowercase().to_string();
        assert!(last.parse::<Letter>().is_ok());
    }

    #[test]
    fn test_hints_are_one_shot() {
        let mut gq = make_game_question();
        let mut rng = ScriptedRandom::constant(0);

        gq.add_fifty_fifty(&mut rng).unwrap();
        let first = gq.help_hash().fifty_fifty().copied();

        let result = gq.add_fifty_fifty(&mut rng);
        assert!(matches!(
            result,
            Err(GameError::HintAlreadyUsed(HintKind::FiftyFifty))
        ));
        assert_eq!(gq.help_hash().fifty_fifty().copied(), first);
    }

    #[test]
    fn test_audience_after_fifty_fifty_zeroes_removed_letters() {
        let mut gq = make_game_question();
        let mut rng = seeded(8);
        gq.add_fifty_fifty(&mut rng).unwrap();
        gq.add_audience_help(0.8, &mut rng).unwrap();

        let pair = gq.keys_for_help();
        let votes = gq.help_hash().audience_help().unwrap();
        for letter in Letter::ALL {
            if !pair.contains(&letter) {
                assert_eq!(votes[&letter], 0);
            }
        }
    }

    #[test]
    fn test_game_question_round_trip_keeps_help() {
        let mut gq = make_game_question();
        let mut rng = seeded(21);
        gq.add_audience_help(0.8, &mut rng).unwrap();
        gq.add_friend_call(0.8, &mut rng).unwrap();

        let json = serde_json::to_string(&gq).unwrap();
        let restored: GameQuestion = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, gq);
        assert!(restored.help_hash().contains(HintKind::AudienceHelp));
        assert!(restored.help_hash().contains(HintKind::FriendCall));
    }
}
