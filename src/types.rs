use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque ID types for type safety
pub type GameId = String;
pub type UserId = String;
pub type QuestionId = String;

/// Highest question level on the ladder (levels run 0..=MAX_LEVEL)
pub const MAX_LEVEL: u8 = 14;

/// Number of questions in one game, one per level
pub const LEVEL_COUNT: usize = MAX_LEVEL as usize + 1;

/// Display letter of an answer option
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    /// Position of the letter in `ALL`
    pub fn index(self) -> usize {
        match self {
            Letter::A => 0,
            Letter::B => 1,
            Letter::C => 2,
            Letter::D => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Letter::A => "a",
            Letter::B => "b",
            Letter::C => "c",
            Letter::D => "d",
        }
    }

    pub fn to_uppercase(self) -> char {
        self.as_str()
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Letter {
    type Err = crate::game::GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Letter::A),
            "b" => Ok(Letter::B),
            "c" => Ok(Letter::C),
            "d" => Ok(Letter::D),
            _ => Err(crate::game::GameError::InvalidLetter(s.to_string())),
        }
    }
}

/// A trivia item from the question bank.
///
/// `answers[0]` is always the correct option; the display order is decided
/// per game by the question's letter map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub level: u8,
    pub text: String,
    pub answers: [String; 4],
}

impl Question {
    pub fn new(level: u8, text: impl Into<String>, answers: [String; 4]) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            level,
            text: text.into(),
            answers,
        }
    }

    /// The ground-truth correct answer text
    pub fn correct_answer(&self) -> &str {
        &self.answers[0]
    }
}

/// A player account as seen by the engine's collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Accumulated winnings across all finished games
    pub balance: u64,
}
