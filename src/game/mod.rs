//! The game aggregate: fifteen questions, the prize ladder, the timer and
//! the hints.
//!
//! Status is never stored. It is derived from `finished_at`, `is_failed`,
//! `current_level` and the elapsed time, so a reloaded game can't disagree
//! with itself.

pub mod help;
pub mod ladder;
pub mod question;

pub use help::{AudienceVotes, HelpHash, Hint, HintKind};
pub use ladder::PrizeLadder;
pub use question::{GameQuestion, LetterMap};

use crate::bank::QuestionBank;
use crate::config::GameConfig;
use crate::rng::RandomSource;
use crate::types::{GameId, Letter, QuestionId, UserId, LEVEL_COUNT, MAX_LEVEL};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Errors raised by game operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("No unused question available for level {level}")]
    NoQuestionAvailable { level: u8 },

    #[error("Game is already finished")]
    GameAlreadyFinished,

    #[error("Hint {0} has already been used")]
    HintAlreadyUsed(HintKind),

    #[error("Game has no current question")]
    NoCurrentQuestion,

    #[error("Invalid answer letter: {0:?}")]
    InvalidLetter(String),

    #[error("Unknown hint kind: {0:?}")]
    InvalidHintKind(String),

    #[error("Letter map is not a permutation of slots 1-4: {0:?}")]
    InvalidLetterMap([u8; 4]),

    #[error("Invalid game config: {0}")]
    InvalidConfig(String),

    #[error("Malformed game record: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    InProgress,
    Won,
    Failed,
    Timeout,
    /// The player cashed out
    Money,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub user_id: UserId,
    config: GameConfig,
    current_level: u8,
    game_questions: Vec<GameQuestion>,
    is_failed: bool,
    finished_at: Option<DateTime<Utc>>,
    prize: u64,
    created_at: DateTime<Utc>,
    audience_help_used: bool,
    fifty_fifty_used: bool,
    friend_call_used: bool,
}

impl Game {
    /// Create a game for `user_id`, drawing one unused question per level
    /// from the bank.
    pub fn new(
        user_id: UserId,
        bank: &QuestionBank,
        config: GameConfig,
        rng: &mut dyn RandomSource,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        let mut used: HashSet<QuestionId> = HashSet::with_capacity(LEVEL_COUNT);
        let mut game_questions = Vec::with_capacity(LEVEL_COUNT);

        for level in 0..=MAX_LEVEL {
            let question = bank.select_for_level(level, &used, rng)?.clone();
            used.insert(question.id.clone());
            game_questions.push(GameQuestion::new(question, rng));
        }

        Self::from_game_questions(user_id, game_questions, config, now)
    }

    /// Assemble a game from prepared questions, one per level in order.
    pub fn from_game_questions(
        user_id: UserId,
        game_questions: Vec<GameQuestion>,
        config: GameConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        let game = Self {
            id: ulid::Ulid::new().to_string(),
            user_id,
            config,
            current_level: 0,
            game_questions,
            is_failed: false,
            finished_at: None,
            prize: 0,
            created_at: now,
            audience_help_used: false,
            fifty_fifty_used: false,
            friend_call_used: false,
        };
        game.validate()?;
        Ok(game)
    }

    /// Check structural invariants of a (possibly reloaded) game
    pub fn validate(&self) -> Result<(), GameError> {
        self.config.validate().map_err(GameError::InvalidConfig)?;

        if self.game_questions.len() != LEVEL_COUNT {
            return Err(GameError::Malformed(format!(
                "expected {} questions, found {}",
                LEVEL_COUNT,
                self.game_questions.len()
            )));
        }
        if let Some((index, gq)) = self
            .game_questions
            .iter()
            .enumerate()
            .find(|(index, gq)| usize::from(gq.level()) != *index)
        {
            return Err(GameError::Malformed(format!(
                "question at position {} has level {}",
                index,
                gq.level()
            )));
        }
        if self.current_level > MAX_LEVEL + 1 {
            return Err(GameError::Malformed(format!(
                "current level {} is past the ladder",
                self.current_level
            )));
        }
        if self.finished_at.is_none() && self.current_level > MAX_LEVEL {
            return Err(GameError::Malformed(
                "unfinished game is past the last level".to_string(),
            ));
        }
        for gq in &self.game_questions {
            if let Some(pair) = gq.help_hash().fifty_fifty() {
                if !pair.contains(&gq.correct_answer_key()) {
                    return Err(GameError::Malformed(format!(
                        "fifty-fifty at level {} dropped the correct answer",
                        gq.level()
                    )));
                }
            }
            if let Some(kind) = HintKind::ALL
                .into_iter()
                .find(|kind| gq.help_hash().contains(*kind) && !self.hint_used(*kind))
            {
                return Err(GameError::Malformed(format!(
                    "{} recorded at level {} but not marked as used",
                    kind,
                    gq.level()
                )));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn status(&self) -> GameStatus {
        let Some(finished_at) = self.finished_at else {
            return GameStatus::InProgress;
        };

        // A timed-out game is also failed, so the timer has to win
        if self.is_failed && finished_at - self.created_at > self.config.time_limit() {
            GameStatus::Timeout
        } else if self.is_failed {
            GameStatus::Failed
        } else if self.current_level > MAX_LEVEL {
            GameStatus::Won
        } else {
            GameStatus::Money
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn current_level(&self) -> u8 {
        self.current_level
    }

    /// Last level answered correctly, `None` before the first correct answer
    pub fn previous_level(&self) -> Option<u8> {
        self.current_level.checked_sub(1)
    }

    /// Rules this game is played under
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn prize(&self) -> u64 {
        self.prize
    }

    pub fn is_failed(&self) -> bool {
        self.is_failed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn game_questions(&self) -> &[GameQuestion] {
        &self.game_questions
    }

    pub fn hint_used(&self, kind: HintKind) -> bool {
        match kind {
            HintKind::AudienceHelp => self.audience_help_used,
            HintKind::FiftyFifty => self.fifty_fifty_used,
            HintKind::FriendCall => self.friend_call_used,
        }
    }

    pub fn current_game_question(&self) -> Result<&GameQuestion, GameError> {
        if self.is_finished() {
            return Err(GameError::NoCurrentQuestion);
        }
        self.game_questions
            .get(usize::from(self.current_level))
            .ok_or(GameError::NoCurrentQuestion)
    }

    fn current_game_question_mut(&mut self) -> Result<&mut GameQuestion, GameError> {
        if self.is_finished() {
            return Err(GameError::NoCurrentQuestion);
        }
        self.game_questions
            .get_mut(usize::from(self.current_level))
            .ok_or(GameError::NoCurrentQuestion)
    }

    /// Whether more than the time limit has passed since creation
    pub fn time_limit_exceeded(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > self.config.time_limit()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        if self.is_finished() {
            Err(GameError::GameAlreadyFinished)
        } else {
            Ok(())
        }
    }

    fn finish(&mut self, prize: u64, failed: bool, now: DateTime<Utc>) {
        self.prize = prize;
        self.is_failed = failed;
        self.finished_at = Some(now);

        tracing::info!(
            "Game {} finished: status={:?}, level={}, prize={}",
            self.id,
            self.status(),
            self.current_level,
            prize
        );
    }

    fn expire(&mut self, now: DateTime<Utc>) -> GameStatus {
        let prize = self.config.ladder.fireproof_prize(self.previous_level());
        self.finish(prize, true, now);
        self.status()
    }

    /// Submit an answer for the current question.
    ///
    /// A game past its time limit times out instead of scoring the answer.
    pub fn answer_current_question(
        &mut self,
        letter: Letter,
        now: DateTime<Utc>,
    ) -> Result<GameStatus, GameError> {
        self.ensure_in_progress()?;

        if self.time_limit_exceeded(now) {
            return Ok(self.expire(now));
        }

        let correct = self.current_game_question()?.answer_correct(letter);
        tracing::debug!(
            "Game {} level {}: answer {} is {}",
            self.id,
            self.current_level,
            letter,
            if correct { "correct" } else { "wrong" }
        );

        if !correct {
            let prize = self.config.ladder.fireproof_prize(self.previous_level());
            self.finish(prize, true, now);
            return Ok(self.status());
        }

        self.prize = self.config.ladder.prize_for(self.current_level);
        self.current_level += 1;

        if self.current_level > MAX_LEVEL {
            let prize = self.config.ladder.max_prize();
            self.finish(prize, false, now);
        }

        Ok(self.status())
    }

    /// End the game if its time limit has passed. No-op otherwise.
    pub fn time_out(&mut self, now: DateTime<Utc>) -> Result<GameStatus, GameError> {
        self.ensure_in_progress()?;

        if self.time_limit_exceeded(now) {
            Ok(self.expire(now))
        } else {
            Ok(GameStatus::InProgress)
        }
    }

    /// Cash out with the prize of the last level answered correctly.
    pub fn take_money(&mut self, now: DateTime<Utc>) -> Result<GameStatus, GameError> {
        self.ensure_in_progress()?;

        if self.time_limit_exceeded(now) {
            return Ok(self.expire(now));
        }

        let prize = self.config.ladder.cash_out_prize(self.previous_level());
        self.finish(prize, false, now);
        Ok(self.status())
    }

    /// Use a hint on the current question. Each kind works once per game.
    pub fn use_help(
        &mut self,
        kind: HintKind,
        rng: &mut dyn RandomSource,
    ) -> Result<&Hint, GameError> {
        self.ensure_in_progress()?;

        if self.hint_used(kind) {
            return Err(GameError::HintAlreadyUsed(kind));
        }

        let audience_accuracy = self.config.audience_accuracy;
        let friend_call_accuracy = self.config.friend_call_accuracy;
        let question = self.current_game_question_mut()?;

        match kind {
            HintKind::AudienceHelp => question.add_audience_help(audience_accuracy, rng),
            HintKind::FiftyFifty => question.add_fifty_fifty(rng),
            HintKind::FriendCall => question.add_friend_call(friend_call_accuracy, rng),
        }?;

        match kind {
            HintKind::AudienceHelp => self.audience_help_used = true,
            HintKind::FiftyFifty => self.fifty_fifty_used = true,
            HintKind::FriendCall => self.friend_call_used = true,
        }
        tracing::debug!("Game {} level {}: used {}", self.id, self.current_level, kind);

        self.current_game_question()?
            .help_hash()
            .get(kind)
            .ok_or(GameError::NoCurrentQuestion)
    }
}
